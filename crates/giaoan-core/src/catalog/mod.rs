//! Form choice lists and defaults.

use chrono::Local;
use giaoan_store::models::{LessonPlanRequest, PlanFormat};

/// Subject areas ("Lĩnh vực") offered by the form.
pub const ACTIVITY_TYPES: [&str; 5] = [
    "Phát triển thể chất",
    "Phát triển nhận thức",
    "Phát triển ngôn ngữ",
    "Phát triển thẩm mỹ",
    "Phát triển tình cảm và kỹ năng xã hội",
];

/// Age groups offered by the form, youngest first.
pub const AGE_GROUPS: [&str; 8] = [
    "Trẻ 3-6 tháng",
    "Trẻ 6-12 tháng",
    "Trẻ 12-18 tháng",
    "Trẻ 18-24 tháng",
    "Trẻ 24-36 tháng",
    "Trẻ 3-4 tuổi",
    "Trẻ 4-5 tuổi",
    "Trẻ 5-6 tuổi",
];

pub const DEFAULT_ACTIVITY_TYPE: &str = ACTIVITY_TYPES[0];
pub const DEFAULT_AGE_GROUP: &str = AGE_GROUPS[2];
pub const DEFAULT_DURATION: &str = "30 - 35 phút";

/// Today's local date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// A request pre-filled with the form defaults. Topic and subject are
/// left empty for the teacher to fill in.
pub fn default_request() -> LessonPlanRequest {
    let today = today();
    LessonPlanRequest {
        activity_type: DEFAULT_ACTIVITY_TYPE.to_string(),
        age_group: DEFAULT_AGE_GROUP.to_string(),
        topic: String::new(),
        subject: String::new(),
        duration: DEFAULT_DURATION.to_string(),
        preparation_date: today.clone(),
        teaching_date: today,
        teacher_name: String::new(),
        school_name: String::new(),
        format: PlanFormat::default(),
    }
}

pub fn is_known_activity_type(value: &str) -> bool {
    ACTIVITY_TYPES.contains(&value)
}

pub fn is_known_age_group(value: &str) -> bool {
    AGE_GROUPS.contains(&value)
}
