//! Workspace view-model: the user flows behind every view.
//!
//! A [`Workspace`] owns the planner, the store and the current
//! [`WorkspaceState`]. State is published through a `tokio::sync::watch`
//! channel so a view can render intermediate states (placeholders while
//! secondary sections generate) as they happen.
//!
//! Each [`Workspace::generate`] cancels the generation before it. State
//! writes by a generation are checked against its cancellation token under
//! the `generation` lock, so a superseded run never overwrites newer state.

mod state;

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use giaoan_store::models::{
    ActivityTab, ChatMessage, LessonPlanParts, LessonPlanRequest, SavedLessonPlan,
};
use giaoan_store::queries::plans;
use giaoan_store::{KeyValueStore, StoreError};

use crate::export::Document;
use crate::generation::Generator;
use crate::planner::{LessonPlanner, PlannerError};

pub use state::{PLACEHOLDER, WorkspaceState};

/// Message shown when the form is submitted without topic or subject.
pub const MISSING_FIELDS_MESSAGE: &str = "Vui lòng nhập Chủ đề và Đề tài.";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Vui lòng nhập Chủ đề và Đề tài.")]
    MissingTopicOrSubject,

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error("generation was superseded by a newer request")]
    Superseded,

    #[error("no saved lesson plan is active")]
    NoActivePlan,

    #[error("a chat message is already being processed")]
    ChatBusy,

    #[error("lesson plan {0} not found")]
    PlanNotFound(i64),

    #[error("could not save lesson plans: {0}")]
    Store(#[from] StoreError),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn unless_cancelled<T>(
    token: &CancellationToken,
    work: impl Future<Output = Result<T, PlannerError>>,
) -> Result<T, WorkspaceError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(WorkspaceError::Superseded),
        result = work => result.map_err(WorkspaceError::from),
    }
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

pub struct Workspace<G, S> {
    planner: LessonPlanner<G>,
    store: S,
    state: watch::Sender<WorkspaceState>,
    /// Token of the generation allowed to write state.
    generation: Mutex<CancellationToken>,
    /// Serializes read-modify-write of the saved-plan list.
    plans_lock: Mutex<()>,
}

impl<G: Generator, S: KeyValueStore> Workspace<G, S> {
    /// Create a workspace and load saved plans from `store`.
    ///
    /// A corrupt saved-plan value is logged and treated as empty.
    pub fn open(planner: LessonPlanner<G>, store: S) -> Self {
        let saved_plans = plans::list_plans(&store).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to load saved lesson plans, starting empty");
            Vec::new()
        });
        tracing::debug!(count = saved_plans.len(), "workspace opened");

        let (state, _) = watch::channel(WorkspaceState {
            saved_plans,
            ..WorkspaceState::default()
        });
        Self {
            planner,
            store,
            state,
            generation: Mutex::new(CancellationToken::new()),
            plans_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<WorkspaceState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> WorkspaceState {
        self.state.borrow().clone()
    }

    pub fn saved_plans(&self) -> Vec<SavedLessonPlan> {
        self.state.borrow().saved_plans.clone()
    }

    pub fn active_part(&self, tab: ActivityTab) -> Option<String> {
        self.state.borrow().active_part(tab).map(str::to_owned)
    }

    /// Reject requests with an empty topic or subject.
    pub fn validate_request(request: &LessonPlanRequest) -> Result<(), WorkspaceError> {
        if request.topic.trim().is_empty() || request.subject.trim().is_empty() {
            return Err(WorkspaceError::MissingTopicOrSubject);
        }
        Ok(())
    }

    // -- generation ---------------------------------------------------------

    /// Cancel any running generation and make `token` the current one.
    fn supersede(&self, update: impl FnOnce(&mut WorkspaceState)) -> CancellationToken {
        let mut current = lock(&self.generation);
        current.cancel();
        let token = CancellationToken::new();
        *current = token.clone();
        self.state.send_modify(update);
        token
    }

    /// Apply `update` only if `token` is still the current generation.
    fn publish_if_current(
        &self,
        token: &CancellationToken,
        update: impl FnOnce(&mut WorkspaceState),
    ) -> Result<(), WorkspaceError> {
        let _current = lock(&self.generation);
        if token.is_cancelled() {
            return Err(WorkspaceError::Superseded);
        }
        self.state.send_modify(update);
        Ok(())
    }

    /// Generate a full plan for `request` and save it.
    ///
    /// The learning activity is published first with placeholders for the
    /// other two sections, which are then generated concurrently. Any
    /// failure returns the view to its pre-submission state with the error
    /// message set.
    pub async fn generate(
        &self,
        request: LessonPlanRequest,
    ) -> Result<LessonPlanParts, WorkspaceError> {
        Self::validate_request(&request)?;

        let token = self.supersede(|s| {
            s.clear_view();
            s.request = Some(request.clone());
            s.error = None;
            s.loading = true;
            s.chat_loading = false;
        });
        tracing::info!(subject = %request.subject, format = %request.format, "generating lesson plan");

        match self.run_generation(&request, &token).await {
            Ok(parts) => Ok(parts),
            Err(WorkspaceError::Superseded) => {
                tracing::warn!(subject = %request.subject, "lesson plan generation superseded, result discarded");
                Err(WorkspaceError::Superseded)
            }
            // The generated plan stays on screen; state is already published.
            Err(e @ WorkspaceError::Store(_)) => Err(e),
            Err(e) => {
                let message = e.to_string();
                let restored = self.publish_if_current(&token, |s| {
                    s.clear_view();
                    s.error = Some(message);
                    s.loading = false;
                });
                match restored {
                    Ok(()) => Err(e),
                    Err(superseded) => Err(superseded),
                }
            }
        }
    }

    async fn run_generation(
        &self,
        request: &LessonPlanRequest,
        token: &CancellationToken,
    ) -> Result<LessonPlanParts, WorkspaceError> {
        let learning = unless_cancelled(token, self.planner.learning_activity(request)).await?;

        self.publish_if_current(token, |s| {
            s.plan = Some(LessonPlanParts {
                learning_activity: learning.clone(),
                outdoor_activity: PLACEHOLDER.to_string(),
                corner_activity: PLACEHOLDER.to_string(),
            });
        })?;

        let (outdoor, corner) =
            unless_cancelled(token, self.planner.secondary_activities(request, &learning)).await?;
        let parts = LessonPlanParts {
            learning_activity: learning,
            outdoor_activity: outdoor,
            corner_activity: corner,
        };

        let _current = lock(&self.generation);
        if token.is_cancelled() {
            return Err(WorkspaceError::Superseded);
        }
        let saved = {
            let _plans = lock(&self.plans_lock);
            plans::insert_plan(&self.store, request, &parts)
        };
        match saved {
            Ok(saved) => {
                tracing::info!(plan_id = saved.id, "lesson plan generated");
                self.state.send_modify(|s| {
                    s.plan = Some(parts.clone());
                    s.current_plan_id = Some(saved.id);
                    s.saved_plans.push(saved);
                    s.loading = false;
                });
                Ok(parts)
            }
            Err(e) => {
                // Keep the generated plan on screen; it just is not saved.
                tracing::error!(error = %e, "failed to save generated lesson plan");
                let err = WorkspaceError::Store(e);
                let message = err.to_string();
                self.state.send_modify(|s| {
                    s.plan = Some(parts);
                    s.error = Some(message);
                    s.loading = false;
                });
                Err(err)
            }
        }
    }

    // -- refinement ---------------------------------------------------------

    /// Send a chat message asking for changes to the active plan.
    ///
    /// Returns the model's reply, or `None` if the message was blank. On
    /// failure the user message stays in the transcript, no reply is
    /// appended and the plan is left unchanged.
    pub async fn send_message(&self, message: &str) -> Result<Option<ChatMessage>, WorkspaceError> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(None);
        }

        let mut begin = Err(WorkspaceError::NoActivePlan);
        self.state.send_if_modified(|s| {
            let (Some(plan), Some(id)) = (s.plan.as_ref(), s.current_plan_id) else {
                return false;
            };
            if s.chat_loading {
                begin = Err(WorkspaceError::ChatBusy);
                return false;
            }
            let plan = plan.clone();
            s.chat.push(ChatMessage::user(message));
            s.chat_loading = true;
            s.error = None;
            begin = Ok((plan, id, s.chat.clone()));
            true
        });
        let (plan, plan_id, history) = begin?;

        let response = match self.planner.refine(&plan, &history, message).await {
            Ok(response) => response,
            Err(e) => {
                let message = e.to_string();
                self.state.send_modify(|s| {
                    s.error = Some(message);
                    s.chat_loading = false;
                });
                return Err(e.into());
            }
        };

        let stored = {
            let _plans = lock(&self.plans_lock);
            plans::update_plan_parts(&self.store, plan_id, &response.lesson_plan)
        };
        let reply = ChatMessage::model(response.chat_response);
        let stored = stored.map_err(|e| {
            tracing::error!(error = %e, plan_id, "failed to save refined lesson plan");
            WorkspaceError::Store(e)
        });
        let store_error = stored.as_ref().err().map(ToString::to_string);

        self.state.send_modify(|s| {
            s.chat_loading = false;
            if let Some(entry) = s.saved_plans.iter_mut().find(|p| p.id == plan_id) {
                entry.parts = response.lesson_plan.clone();
            }
            // The teacher may have switched plans while waiting.
            if s.current_plan_id == Some(plan_id) {
                s.plan = Some(response.lesson_plan.clone());
                s.chat.push(reply.clone());
            }
            if store_error.is_some() {
                s.error = store_error;
            }
        });

        stored?;
        tracing::info!(plan_id, "lesson plan refined");
        Ok(Some(reply))
    }

    // -- saved plans --------------------------------------------------------

    /// Show a saved plan. Cancels any running generation.
    pub fn load_plan(&self, id: i64) -> Result<SavedLessonPlan, WorkspaceError> {
        let plan = plans::get_plan(&self.store, id)?.ok_or(WorkspaceError::PlanNotFound(id))?;
        self.supersede(|s| {
            s.request = Some(plan.request.clone());
            s.plan = Some(plan.parts.clone());
            s.current_plan_id = Some(plan.id);
            s.chat.clear();
            s.error = None;
            s.loading = false;
            s.chat_loading = false;
        });
        tracing::info!(plan_id = id, "lesson plan loaded");
        Ok(plan)
    }

    /// Delete a saved plan. Returns `false` if no plan had that id.
    pub fn delete_plan(&self, id: i64) -> Result<bool, WorkspaceError> {
        let removed = {
            let _plans = lock(&self.plans_lock);
            plans::delete_plan(&self.store, id)?
        };
        if removed {
            self.state.send_modify(|s| {
                s.saved_plans.retain(|p| p.id != id);
                if s.current_plan_id == Some(id) {
                    s.clear_view();
                }
            });
        }
        Ok(removed)
    }

    /// Render the active plan as a document.
    pub fn export_document(&self) -> Result<Document, WorkspaceError> {
        let state = self.state.borrow();
        let plan = state.plan.as_ref().ok_or(WorkspaceError::NoActivePlan)?;
        let format = state.request.as_ref().map(|r| r.format).unwrap_or_default();
        Ok(Document::build(plan, format))
    }
}
