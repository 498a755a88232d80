//! Shared test utilities for giaoan integration tests.
//!
//! - [`ScriptedGenerator`]: a [`Generator`] that answers from a script
//!   instead of calling a model, records every request, and can hold
//!   selected calls until the test releases them.
//! - [`temp_file_store`]: a [`FileStore`] in a fresh temporary directory.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::{Notify, Semaphore};

use giaoan_core::generation::{GenerationError, GenerationRequest, Generator};
use giaoan_store::FileStore;

/// Prompt fragment unique to the learning-activity prompt.
pub const LEARNING_PROMPT: &str = "Thông tin yêu cầu cụ thể";
/// Prompt fragment unique to the outdoor-activity prompt.
pub const OUTDOOR_PROMPT: &str = "Hoạt động ngoài trời";
/// Prompt fragment unique to the corner-activity prompt.
pub const CORNER_PROMPT: &str = "Hoạt động góc";
/// Prompt fragment unique to the refine prompt.
pub const REFINE_PROMPT: &str = "trợ lý AI chuyên chỉnh sửa giáo án";

enum Reply {
    Text(String),
    Fail(u16),
}

struct Scripted {
    matcher: String,
    reply: Reply,
}

/// Scripted stand-in for a model provider.
///
/// Each call consumes the first scripted reply whose matcher is contained
/// in the prompt (an empty matcher matches anything). A call with no
/// matching reply fails with [`GenerationError::InvalidResponse`].
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<GenerationRequest>>,
    held_matchers: Vec<String>,
    gate: Semaphore,
    held: AtomicUsize,
    held_changed: Notify,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            held_matchers: Vec::new(),
            gate: Semaphore::new(0),
            held: AtomicUsize::new(0),
            held_changed: Notify::new(),
        }
    }

    /// Answer the next call whose prompt contains `matcher` with `text`.
    pub fn with_response(self, matcher: &str, text: impl Into<String>) -> Self {
        self.push(matcher, Reply::Text(text.into()));
        self
    }

    /// Fail the next call whose prompt contains `matcher` with an HTTP status.
    pub fn with_failure(self, matcher: &str, status: u16) -> Self {
        self.push(matcher, Reply::Fail(status));
        self
    }

    /// Hold calls whose prompt contains `matcher` until [`Self::release`].
    pub fn hold(mut self, matcher: &str) -> Self {
        self.held_matchers.push(matcher.to_string());
        self
    }

    /// Let `n` held calls proceed.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Wait until at least `n` calls are parked on the hold.
    pub async fn wait_until_held(&self, n: usize) {
        loop {
            let changed = self.held_changed.notified();
            if self.held.load(Ordering::SeqCst) >= n {
                return;
            }
            changed.await;
        }
    }

    /// Every request received, in call order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.prompt).collect()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    fn push(&self, matcher: &str, reply: Reply) {
        self.script.lock().expect("script lock").push_back(Scripted {
            matcher: matcher.to_string(),
            reply,
        });
    }

    fn take_reply(&self, prompt: &str) -> Option<Reply> {
        let mut script = self.script.lock().expect("script lock");
        let index = script.iter().position(|s| prompt.contains(&s.matcher))?;
        script.remove(index).map(|s| s.reply)
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());

        if self.held_matchers.iter().any(|m| request.prompt.contains(m)) {
            self.held.fetch_add(1, Ordering::SeqCst);
            self.held_changed.notify_waiters();
            self.gate
                .acquire()
                .await
                .expect("gate semaphore is never closed")
                .forget();
            self.held.fetch_sub(1, Ordering::SeqCst);
        }

        match self.take_reply(&request.prompt) {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(status)) => Err(GenerationError::Status {
                status,
                body: "scripted failure".to_string(),
            }),
            None => Err(GenerationError::InvalidResponse(
                "no scripted response for prompt".to_string(),
            )),
        }
    }
}

/// A [`FileStore`] rooted in a new temporary directory.
///
/// Keep the returned [`TempDir`] alive for as long as the store is used.
pub fn temp_file_store() -> (TempDir, FileStore) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let store = FileStore::new(dir.path().join("data"));
    (dir, store)
}
