//! Prompt construction for the four generation calls.
//!
//! Pure string formatting: no I/O. Each builder takes the structured
//! request (and, for the chained calls, the learning activity already
//! generated) and returns the Vietnamese instructions sent to the model.

mod templates;

use chrono::NaiveDate;
use giaoan_store::models::{ChatMessage, LessonPlanParts, LessonPlanRequest, PlanFormat};

use templates::FormattingRules;

/// Reformat an ISO `YYYY-MM-DD` date as `DD/MM/YYYY`.
///
/// Anything that does not parse is returned unchanged.
pub fn format_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(d) => d.format("%d/%m/%Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Prompt for the main learning activity.
pub fn learning_activity_prompt(request: &LessonPlanRequest) -> String {
    let mut prompt = format!(
        "{preamble}
**Thông tin yêu cầu cụ thể:**
- **Lĩnh vực:** {activity_type}
- **Độ tuổi:** {age_group}
- **Chủ đề:** {topic}
- **Đề tài:** {subject}
- **Thời gian dự kiến:** {duration}
- **Người soạn:** {teacher}
- **Đơn vị:** {school}
- **Ngày soạn:** {prepared}
- **Ngày dạy:** {taught}
",
        preamble = templates::LEARNING_PREAMBLE,
        activity_type = request.activity_type,
        age_group = request.age_group,
        topic = request.topic,
        subject = request.subject,
        duration = request.duration,
        teacher = request.teacher_name,
        school = request.school_name,
        prepared = format_date(&request.preparation_date),
        taught = format_date(&request.teaching_date),
    );

    prompt.push('\n');
    prompt.push_str(&FormattingRules::LEARNING.render());
    prompt.push_str(templates::FORMAT_EXAMPLE);

    match request.format {
        PlanFormat::WithColumns => {
            prompt.push_str(&templates::with_columns_instructions(&request.subject));
        }
        PlanFormat::NoColumns => prompt.push_str(templates::NO_COLUMNS_INSTRUCTIONS),
    }
    prompt
}

/// Prompt for the outdoor activity, chained on the learning activity.
pub fn outdoor_activity_prompt(_request: &LessonPlanRequest, learning_activity: &str) -> String {
    chained_prompt(
        templates::OUTDOOR_BRIEF,
        &FormattingRules::OUTDOOR,
        learning_activity,
        "Bây giờ, hãy viết nội dung đầy đủ cho Hoạt động ngoài trời.",
    )
}

/// Prompt for the corner activities, chained on the learning activity.
pub fn corner_activity_prompt(_request: &LessonPlanRequest, learning_activity: &str) -> String {
    chained_prompt(
        templates::CORNER_BRIEF,
        &FormattingRules::CORNER,
        learning_activity,
        "Bây giờ, hãy viết nội dung đầy đủ và chi tiết cho các Hoạt động góc.",
    )
}

fn chained_prompt(
    brief: &str,
    rules: &FormattingRules,
    learning_activity: &str,
    closing: &str,
) -> String {
    format!(
        "{brief}\n{rules}\n**Giáo án Hoạt động học để phân tích và làm cơ sở:**\n---\n{learning_activity}\n---\n\n{closing}",
        rules = rules.render(),
    )
}

/// Prompt for a chat refinement turn.
///
/// `history` is the transcript as sent, which already ends with the new
/// message; the message is repeated as the latest request.
pub fn refine_prompt(plan: &LessonPlanParts, history: &[ChatMessage], message: &str) -> String {
    // Serializing a struct of three strings cannot fail.
    let plan_json = serde_json::to_string_pretty(plan).unwrap_or_default();
    let history = history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Bạn là một trợ lý AI chuyên chỉnh sửa giáo án mầm non.

**Bộ giáo án hiện tại:**
```json
{plan_json}
```

**Lịch sử trò chuyện (nếu có):**
{history}

**Yêu cầu mới nhất từ người dùng:**
user: {message}

{tasks}
{rules}
{output}",
        tasks = templates::REFINE_TASKS,
        rules = FormattingRules::REFINE.render(),
        output = templates::REFINE_OUTPUT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use giaoan_store::models::ChatRole;

    fn request(format: PlanFormat) -> LessonPlanRequest {
        LessonPlanRequest {
            activity_type: "Phát triển nhận thức".to_string(),
            age_group: "Trẻ 5-6 tuổi".to_string(),
            topic: "Nước và các hiện tượng tự nhiên".to_string(),
            subject: "Sự kỳ diệu của nước".to_string(),
            duration: "30 - 35 phút".to_string(),
            preparation_date: "2024-10-01".to_string(),
            teaching_date: "2024-10-05".to_string(),
            teacher_name: "Nguyễn Thị An".to_string(),
            school_name: "Trường Mầm non Ánh Dương".to_string(),
            format,
        }
    }

    #[test]
    fn format_date_reorders_iso_dates() {
        assert_eq!(format_date("2024-10-05"), "05/10/2024");
        assert_eq!(format_date(" 2025-01-31 "), "31/01/2025");
    }

    #[test]
    fn format_date_passes_through_unparseable_input() {
        assert_eq!(format_date(""), "");
        assert_eq!(format_date("thứ Hai"), "thứ Hai");
        assert_eq!(format_date("2024-13-40"), "2024-13-40");
    }

    #[test]
    fn learning_prompt_embeds_request_fields() {
        let prompt = learning_activity_prompt(&request(PlanFormat::NoColumns));
        assert!(prompt.contains("- **Lĩnh vực:** Phát triển nhận thức"));
        assert!(prompt.contains("- **Đề tài:** Sự kỳ diệu của nước"));
        assert!(prompt.contains("- **Người soạn:** Nguyễn Thị An"));
        assert!(prompt.contains("- **Ngày soạn:** 01/10/2024"));
        assert!(prompt.contains("- **Ngày dạy:** 05/10/2024"));
        assert!(prompt.contains("năm học 2024-2025"));
    }

    #[test]
    fn no_columns_prompt_asks_for_sequential_activities() {
        let prompt = learning_activity_prompt(&request(PlanFormat::NoColumns));
        assert!(prompt.contains("**Hoạt động 1: [Tên hoạt động]**"));
        assert!(!prompt.contains("**Hoạt động của cô:**"));
    }

    #[test]
    fn with_columns_prompt_embeds_subject_in_example() {
        let prompt = learning_activity_prompt(&request(PlanFormat::WithColumns));
        assert!(prompt.contains("**Hoạt động của cô:**"));
        assert!(prompt.contains("**Hoạt động của trẻ:**"));
        assert!(prompt.contains("qua đề tài 'Sự kỳ diệu của nước' nhé!"));
        assert!(prompt.contains("**III. TỔ CHỨC HOẠT ĐỘNG**"));
    }

    #[test]
    fn chained_prompts_fence_the_learning_activity() {
        let learning = "**I. MỤC TIÊU**\nTrẻ biết nước có 3 trạng thái.";
        for prompt in [
            outdoor_activity_prompt(&request(PlanFormat::NoColumns), learning),
            corner_activity_prompt(&request(PlanFormat::NoColumns), learning),
        ] {
            assert!(prompt.contains(&format!("---\n{learning}\n---")));
            assert!(prompt.contains("**BẮT ĐẦU TRỰC TIẾP VÀO NỘI DUNG.**"));
        }
    }

    #[test]
    fn corner_prompt_uses_corner_heading_example() {
        let prompt = corner_activity_prompt(&request(PlanFormat::NoColumns), "x");
        assert!(prompt.contains("`**I. GÓC XÂY DỰNG**`"));
        assert!(prompt.contains("`**1. Mục tiêu:**`"));
    }

    #[test]
    fn refine_prompt_renders_plan_and_history() {
        let plan = LessonPlanParts {
            learning_activity: "L".to_string(),
            outdoor_activity: "O".to_string(),
            corner_activity: "C".to_string(),
        };
        let history = vec![
            ChatMessage::user("Thêm trò chơi"),
            ChatMessage::model("Đã thêm."),
            ChatMessage::user("Rút ngắn phần mở đầu"),
        ];
        assert_eq!(history[1].role, ChatRole::Model);

        let prompt = refine_prompt(&plan, &history, "Rút ngắn phần mở đầu");
        assert!(prompt.contains("\"learningActivity\": \"L\""));
        assert!(prompt.contains("user: Thêm trò chơi\nmodel: Đã thêm.\nuser: Rút ngắn phần mở đầu"));
        assert!(prompt.contains("**Yêu cầu mới nhất từ người dùng:**\nuser: Rút ngắn phần mở đầu"));
        assert!(prompt.contains("`chatResponse`"));
    }
}
