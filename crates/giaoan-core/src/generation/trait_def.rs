//! The `Generator` trait: the adapter interface for model providers.

use std::sync::Arc;

use async_trait::async_trait;

use super::types::{GenerationError, GenerationRequest};

/// A model provider that turns a prompt into text.
///
/// The trait is object-safe so callers can hold `Box<dyn Generator>` or
/// `Arc<dyn Generator>` when the provider is chosen at runtime.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Short name used in logs (e.g. "gemini").
    fn name(&self) -> &str;

    /// Run one generation call and return the model's text.
    ///
    /// For JSON requests the returned string is the raw JSON text; parsing
    /// is left to the caller.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Arc<G> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        (**self).generate(request).await
    }
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Box<G> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        (**self).generate(request).await
    }
}

// Compile-time assertion: Generator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Generator) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            Ok(request.prompt.clone())
        }
    }

    #[tokio::test]
    async fn boxed_generator_dispatches() {
        let generator: Box<dyn Generator> = Box::new(EchoGenerator);
        assert_eq!(generator.name(), "echo");
        let out = generator
            .generate(&GenerationRequest::text("Đề tài: Bé tập đếm"))
            .await
            .unwrap();
        assert_eq!(out, "Đề tài: Bé tập đếm");
    }

    #[tokio::test]
    async fn shared_generator_dispatches() {
        let generator: Arc<dyn Generator> = Arc::new(EchoGenerator);
        let shared = Arc::clone(&generator);
        assert_eq!(shared.name(), "echo");
        assert_eq!(
            shared.generate(&GenerationRequest::text("a")).await.unwrap(),
            "a"
        );
    }
}
