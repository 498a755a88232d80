//! Response schemas in the Gemini schema dialect (`OBJECT` / `STRING`).

use serde_json::{Value, json};

/// Schema for the three plan sections.
pub fn lesson_plan_parts_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "learningActivity": {
                "type": "STRING",
                "description": "Nội dung chi tiết cho giáo án hoạt động học chính"
            },
            "outdoorActivity": {
                "type": "STRING",
                "description": "Nội dung gợi ý cho hoạt động ngoài trời liên quan"
            },
            "cornerActivity": {
                "type": "STRING",
                "description": "Nội dung gợi ý cho các hoạt động góc liên quan"
            }
        },
        "required": ["learningActivity", "outdoorActivity", "cornerActivity"]
    })
}

/// Schema for a refine answer: updated plan plus a chat reply.
pub fn refine_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "lessonPlan": lesson_plan_parts_schema(),
            "chatResponse": {
                "type": "STRING",
                "description": "Câu trả lời dạng trò chuyện cho người dùng"
            }
        },
        "required": ["lessonPlan", "chatResponse"]
    })
}
