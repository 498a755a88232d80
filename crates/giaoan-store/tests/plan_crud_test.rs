//! Integration tests for saved-plan CRUD against the file-backed store.
//!
//! Each test gets its own temporary data directory; "reloading" is done by
//! opening a second `FileStore` on the same directory.

use giaoan_store::config::StoreConfig;
use giaoan_store::models::{LessonPlanParts, LessonPlanRequest, PlanFormat};
use giaoan_store::queries::plans::{
    PLANS_KEY, delete_plan, get_plan, insert_plan, insert_plan_at, list_plans, update_plan_parts,
};
use giaoan_store::{FileStore, KeyValueStore};
use tempfile::TempDir;

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

fn temp_store() -> (TempDir, FileStore) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let store = StoreConfig::new(dir.path().join("giaoan")).open();
    (dir, store)
}

fn sample_request(subject: &str) -> LessonPlanRequest {
    LessonPlanRequest {
        activity_type: "Phát triển nhận thức".to_string(),
        age_group: "Trẻ 5-6 tuổi".to_string(),
        topic: "Nước và các hiện tượng tự nhiên".to_string(),
        subject: subject.to_string(),
        duration: "30-35 phút".to_string(),
        preparation_date: "2023-10-01".to_string(),
        teaching_date: "2023-10-05".to_string(),
        teacher_name: "Nguyễn Thị An".to_string(),
        school_name: "Trường Mầm non Ánh Dương".to_string(),
        format: PlanFormat::WithColumns,
    }
}

fn sample_parts(tag: &str) -> LessonPlanParts {
    LessonPlanParts {
        learning_activity: format!("**I. MỤC TIÊU**\n- Trẻ biết {tag}.\n\t  thụt lề  \n"),
        outdoor_activity: format!("Ngoài trời {tag} \"trích dẫn\" <b>"),
        corner_activity: format!("Góc {tag}\r\n✓ ký tự đặc biệt"),
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[test]
fn saved_plan_survives_reload_byte_for_byte() {
    let (dir, store) = temp_store();
    let request = sample_request("Sự kỳ diệu của nước");
    let parts = sample_parts("nước");

    let saved = insert_plan(&store, &request, &parts).unwrap();

    let reopened = StoreConfig::new(dir.path().join("giaoan")).open();
    let loaded = get_plan(&reopened, saved.id)
        .unwrap()
        .expect("plan should be found after reload");

    assert_eq!(loaded.request, request);
    assert_eq!(loaded.parts, parts);
    assert_eq!(loaded.parts.learning_activity.as_bytes(), parts.learning_activity.as_bytes());
    assert_eq!(loaded.parts.corner_activity.as_bytes(), parts.corner_activity.as_bytes());
}

#[test]
fn delete_removes_exactly_one_and_preserves_order() {
    let (_dir, store) = temp_store();
    for (i, subject) in ["a", "b", "c", "d"].iter().enumerate() {
        insert_plan_at(&store, 1_000 + i as i64, &sample_request(subject), &sample_parts(subject))
            .unwrap();
    }

    assert!(delete_plan(&store, 1_001).unwrap());

    let remaining: Vec<(i64, String)> = list_plans(&store)
        .unwrap()
        .into_iter()
        .map(|p| (p.id, p.request.subject))
        .collect();
    assert_eq!(
        remaining,
        vec![
            (1_000, "a".to_string()),
            (1_002, "c".to_string()),
            (1_003, "d".to_string()),
        ]
    );
}

#[test]
fn update_replaces_parts_in_place() {
    let (_dir, store) = temp_store();
    insert_plan_at(&store, 10, &sample_request("a"), &sample_parts("a")).unwrap();
    insert_plan_at(&store, 20, &sample_request("b"), &sample_parts("b")).unwrap();
    insert_plan_at(&store, 30, &sample_request("c"), &sample_parts("c")).unwrap();

    let new_parts = sample_parts("đã sửa");
    let updated = update_plan_parts(&store, 20, &new_parts)
        .unwrap()
        .expect("plan 20 exists");
    assert_eq!(updated.parts, new_parts);
    assert_eq!(updated.request.subject, "b");

    let plans = list_plans(&store).unwrap();
    let ids: Vec<i64> = plans.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![10, 20, 30]);
    assert_eq!(plans[1].parts, new_parts);
    assert_eq!(plans[0].parts, sample_parts("a"));
}

#[test]
fn stored_layout_matches_browser_local_storage() {
    let (_dir, store) = temp_store();
    insert_plan_at(&store, 1_700_000_000_000, &sample_request("x"), &sample_parts("x")).unwrap();

    let raw = store.get(PLANS_KEY).unwrap().expect("array should be written");
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &value.as_array().expect("top level is an array")[0];

    assert_eq!(entry["id"], 1_700_000_000_000_i64);
    assert_eq!(entry["request"]["activityType"], "Phát triển nhận thức");
    assert_eq!(entry["request"]["format"], "with-columns");
    assert!(entry["parts"]["learningActivity"].is_string());
    assert!(entry["parts"]["outdoorActivity"].is_string());
    assert!(entry["parts"]["cornerActivity"].is_string());
}

#[test]
fn reads_array_written_by_browser_app() {
    let (_dir, store) = temp_store();
    let raw = r#"[{"id":1712345678901,"request":{"activityType":"Phát triển ngôn ngữ","ageGroup":"Trẻ 3-4 tuổi","topic":"Gia đình","subject":"Bé kể về gia đình","duration":"20 phút","preparationDate":"2024-04-01","teachingDate":"2024-04-02","teacherName":"Lê Thị B","schoolName":"MN Sen Hồng","format":"no-columns"},"parts":{"learningActivity":"L","outdoorActivity":"O","cornerActivity":"C"}}]"#;
    store.set(PLANS_KEY, raw).unwrap();

    let plans = list_plans(&store).unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].id, 1_712_345_678_901);
    assert_eq!(plans[0].request.subject, "Bé kể về gia đình");
    assert_eq!(plans[0].parts.corner_activity, "C");
}
