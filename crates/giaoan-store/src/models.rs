use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Layout of the "III. TỔ CHỨC HOẠT ĐỘNG" section of the learning activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanFormat {
    /// Sequential sub-activities, rendered as flowing paragraphs.
    #[default]
    NoColumns,
    /// Teacher-action / child-action table per numbered sub-activity.
    WithColumns,
}

impl fmt::Display for PlanFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoColumns => "no-columns",
            Self::WithColumns => "with-columns",
        };
        f.write_str(s)
    }
}

impl FromStr for PlanFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no-columns" => Ok(Self::NoColumns),
            "with-columns" => Ok(Self::WithColumns),
            other => Err(ParseEnumError::new("plan format", other)),
        }
    }
}

// ---------------------------------------------------------------------------

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Model,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::User => "user",
            Self::Model => "model",
        };
        f.write_str(s)
    }
}

impl FromStr for ChatRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "model" => Ok(Self::Model),
            other => Err(ParseEnumError::new("chat role", other)),
        }
    }
}

// ---------------------------------------------------------------------------

/// One of the three sections of a plan, shown as separate tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityTab {
    #[default]
    Learning,
    Outdoor,
    Corner,
}

impl ActivityTab {
    /// All tabs in display order.
    pub const ALL: [ActivityTab; 3] = [Self::Learning, Self::Outdoor, Self::Corner];

    /// Vietnamese label shown to teachers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Learning => "Hoạt động học",
            Self::Outdoor => "Hoạt động ngoài trời",
            Self::Corner => "Hoạt động góc",
        }
    }
}

impl fmt::Display for ActivityTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Learning => "learning",
            Self::Outdoor => "outdoor",
            Self::Corner => "corner",
        };
        f.write_str(s)
    }
}

impl FromStr for ActivityTab {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "learning" => Ok(Self::Learning),
            "outdoor" => Ok(Self::Outdoor),
            "corner" => Ok(Self::Corner),
            other => Err(ParseEnumError::new("activity tab", other)),
        }
    }
}

/// Error returned when parsing an invalid enum string.
#[derive(Debug, Clone)]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Form parameters for one lesson plan.
///
/// Field names serialize in camelCase so stored plans keep the layout the
/// browser application wrote to local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlanRequest {
    /// Developmental area ("Lĩnh vực").
    pub activity_type: String,
    pub age_group: String,
    /// Theme ("Chủ đề").
    pub topic: String,
    /// Lesson title ("Đề tài").
    pub subject: String,
    pub duration: String,
    /// ISO `YYYY-MM-DD`, as entered in the form.
    pub preparation_date: String,
    /// ISO `YYYY-MM-DD`, as entered in the form.
    pub teaching_date: String,
    pub teacher_name: String,
    pub school_name: String,
    #[serde(default)]
    pub format: PlanFormat,
}

/// The three generated sections of a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlanParts {
    pub learning_activity: String,
    pub outdoor_activity: String,
    pub corner_activity: String,
}

impl LessonPlanParts {
    /// Text of the section shown under `tab`.
    pub fn part(&self, tab: ActivityTab) -> &str {
        match tab {
            ActivityTab::Learning => &self.learning_activity,
            ActivityTab::Outdoor => &self.outdoor_activity,
            ActivityTab::Corner => &self.corner_activity,
        }
    }
}

/// A single chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}

/// Structured answer to a refinement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineResponse {
    pub lesson_plan: LessonPlanParts,
    pub chat_response: String,
}

/// A generated plan persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLessonPlan {
    /// Creation time in milliseconds since the Unix epoch, unique per store.
    pub id: i64,
    pub request: LessonPlanRequest,
    pub parts: LessonPlanParts,
}
