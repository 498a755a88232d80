use giaoan_store::models::{ChatMessage, LessonPlanParts, LessonPlanRequest, RefineResponse};

use super::error::{PlannerError, RefineFailure};
use crate::generation::schema::refine_response_schema;
use crate::generation::{Generator, GenerationRequest};
use crate::prompt;

/// Generates and refines lesson plans through a [`Generator`].
#[derive(Debug, Clone)]
pub struct LessonPlanner<G> {
    generator: G,
}

impl<G: Generator> LessonPlanner<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Generate the main learning activity.
    pub async fn learning_activity(
        &self,
        request: &LessonPlanRequest,
    ) -> Result<String, PlannerError> {
        let prompt = prompt::learning_activity_prompt(request);
        self.generator
            .generate(&GenerationRequest::text(prompt))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, generator = self.generator.name(), "learning activity generation failed");
                PlannerError::Learning(e)
            })
    }

    /// Generate the outdoor activity from the learning activity.
    pub async fn outdoor_activity(
        &self,
        request: &LessonPlanRequest,
        learning_activity: &str,
    ) -> Result<String, PlannerError> {
        let prompt = prompt::outdoor_activity_prompt(request, learning_activity);
        self.generator
            .generate(&GenerationRequest::text(prompt))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, generator = self.generator.name(), "outdoor activity generation failed");
                PlannerError::Outdoor(e)
            })
    }

    /// Generate the corner activities from the learning activity.
    pub async fn corner_activity(
        &self,
        request: &LessonPlanRequest,
        learning_activity: &str,
    ) -> Result<String, PlannerError> {
        let prompt = prompt::corner_activity_prompt(request, learning_activity);
        self.generator
            .generate(&GenerationRequest::text(prompt))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, generator = self.generator.name(), "corner activity generation failed");
                PlannerError::Corner(e)
            })
    }

    /// Generate outdoor and corner activities concurrently.
    ///
    /// Both calls are in flight together; the first failure is returned and
    /// the other call is dropped.
    pub async fn secondary_activities(
        &self,
        request: &LessonPlanRequest,
        learning_activity: &str,
    ) -> Result<(String, String), PlannerError> {
        tokio::try_join!(
            self.outdoor_activity(request, learning_activity),
            self.corner_activity(request, learning_activity),
        )
    }

    /// Regenerate the whole plan following a chat message.
    ///
    /// `history` is the transcript including `message` as its last entry.
    pub async fn refine(
        &self,
        plan: &LessonPlanParts,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<RefineResponse, PlannerError> {
        let prompt = prompt::refine_prompt(plan, history, message);
        let request = GenerationRequest::json(prompt, refine_response_schema());

        let result = async {
            let text = self.generator.generate(&request).await?;
            let response: RefineResponse = serde_json::from_str(strip_code_fences(&text))?;
            Ok::<_, RefineFailure>(response)
        }
        .await;

        result.map_err(|e| {
            tracing::error!(error = %e, generator = self.generator.name(), "lesson plan refinement failed");
            PlannerError::Refine(e)
        })
    }
}

/// Trim the answer and drop a surrounding markdown code fence if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string (e.g. "json") on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
