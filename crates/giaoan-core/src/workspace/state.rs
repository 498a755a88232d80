use serde::Serialize;

use giaoan_store::models::{
    ActivityTab, ChatMessage, LessonPlanParts, LessonPlanRequest, SavedLessonPlan,
};

/// Text shown in a section while its generation call is running.
pub const PLACEHOLDER: &str = "AI đang soạn thảo hoạt động này...";

/// Everything a view needs to draw the workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceState {
    /// Request behind the plan on screen (also pre-fills the form).
    pub request: Option<LessonPlanRequest>,
    pub plan: Option<LessonPlanParts>,
    /// Saved entry the plan on screen belongs to. `None` while generating.
    pub current_plan_id: Option<i64>,
    pub chat: Vec<ChatMessage>,
    pub error: Option<String>,
    pub loading: bool,
    pub chat_loading: bool,
    pub saved_plans: Vec<SavedLessonPlan>,
}

impl WorkspaceState {
    /// Text of one plan section, if a plan is shown.
    pub fn active_part(&self, tab: ActivityTab) -> Option<&str> {
        self.plan.as_ref().map(|p| p.part(tab))
    }

    /// Whether any section still shows the placeholder.
    pub fn has_pending_sections(&self) -> bool {
        self.plan.as_ref().is_some_and(|p| {
            ActivityTab::ALL
                .iter()
                .any(|tab| p.part(*tab) == PLACEHOLDER)
        })
    }

    /// Whether the chat can accept a message.
    pub fn can_refine(&self) -> bool {
        self.plan.is_some() && self.current_plan_id.is_some() && !self.chat_loading
    }

    pub(super) fn clear_view(&mut self) {
        self.request = None;
        self.plan = None;
        self.current_plan_id = None;
        self.chat.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_sections_are_pending() {
        let mut state = WorkspaceState {
            plan: Some(LessonPlanParts {
                learning_activity: "L".to_string(),
                outdoor_activity: PLACEHOLDER.to_string(),
                corner_activity: PLACEHOLDER.to_string(),
            }),
            ..WorkspaceState::default()
        };
        assert!(state.has_pending_sections());
        assert_eq!(state.active_part(ActivityTab::Learning), Some("L"));
        assert!(!state.can_refine());

        state.plan = Some(LessonPlanParts {
            learning_activity: "L".to_string(),
            outdoor_activity: "O".to_string(),
            corner_activity: "C".to_string(),
        });
        state.current_plan_id = Some(7);
        assert!(!state.has_pending_sections());
        assert!(state.can_refine());
    }

    #[test]
    fn empty_state_has_no_parts() {
        let state = WorkspaceState::default();
        assert_eq!(state.active_part(ActivityTab::Corner), None);
        assert!(!state.has_pending_sections());
    }

    #[test]
    fn serializes_camel_case_for_views() {
        let value = serde_json::to_value(WorkspaceState::default()).unwrap();
        assert_eq!(value["currentPlanId"], serde_json::Value::Null);
        assert_eq!(value["chatLoading"], false);
        assert!(value["savedPlans"].as_array().unwrap().is_empty());
    }
}
