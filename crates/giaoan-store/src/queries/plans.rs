//! Query functions for the saved-plan list stored under `lessonPlans`.
//!
//! The list is a JSON array kept in insertion order. Every mutation reads
//! the whole array, edits it and writes it back. A stored value that does
//! not decode is replaced by the next mutation.

use crate::kv::{KeyValueStore, StoreError, get_json, set_json};
use crate::models::{LessonPlanParts, LessonPlanRequest, SavedLessonPlan};

/// Store key holding the saved-plan array.
pub const PLANS_KEY: &str = "lessonPlans";

/// List all saved plans in insertion order (oldest first).
pub fn list_plans<S: KeyValueStore + ?Sized>(store: &S) -> Result<Vec<SavedLessonPlan>, StoreError> {
    Ok(get_json(store, PLANS_KEY)?.unwrap_or_default())
}

/// The list a mutation starts from. An undecodable value counts as empty.
fn plans_for_write<S: KeyValueStore + ?Sized>(store: &S) -> Result<Vec<SavedLessonPlan>, StoreError> {
    match list_plans(store) {
        Err(StoreError::Decode { key, source }) => {
            tracing::warn!(key = %key, error = %source, "discarding undecodable saved-plan list");
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Fetch a saved plan by id.
pub fn get_plan<S: KeyValueStore + ?Sized>(
    store: &S,
    id: i64,
) -> Result<Option<SavedLessonPlan>, StoreError> {
    Ok(list_plans(store)?.into_iter().find(|p| p.id == id))
}

/// Append a plan stamped with the current time. Returns the stored record.
pub fn insert_plan<S: KeyValueStore + ?Sized>(
    store: &S,
    request: &LessonPlanRequest,
    parts: &LessonPlanParts,
) -> Result<SavedLessonPlan, StoreError> {
    insert_plan_at(store, chrono::Utc::now().timestamp_millis(), request, parts)
}

/// Append a plan using `now_ms` as the preferred id.
///
/// If `now_ms` is not greater than every existing id (two saves within the
/// same millisecond, or a clock step backwards) the id becomes one past the
/// largest existing id.
pub fn insert_plan_at<S: KeyValueStore + ?Sized>(
    store: &S,
    now_ms: i64,
    request: &LessonPlanRequest,
    parts: &LessonPlanParts,
) -> Result<SavedLessonPlan, StoreError> {
    let mut plans = plans_for_write(store)?;
    let id = match plans.iter().map(|p| p.id).max() {
        Some(max) if now_ms <= max => max + 1,
        _ => now_ms,
    };

    let plan = SavedLessonPlan {
        id,
        request: request.clone(),
        parts: parts.clone(),
    };
    plans.push(plan.clone());
    set_json(store, PLANS_KEY, &plans)?;

    tracing::info!(plan_id = id, subject = %request.subject, "lesson plan saved");
    Ok(plan)
}

/// Replace the parts of the plan with `id`, keeping its position.
///
/// Returns the updated record, or `None` if no plan has that id.
pub fn update_plan_parts<S: KeyValueStore + ?Sized>(
    store: &S,
    id: i64,
    parts: &LessonPlanParts,
) -> Result<Option<SavedLessonPlan>, StoreError> {
    let mut plans = plans_for_write(store)?;
    let Some(plan) = plans.iter_mut().find(|p| p.id == id) else {
        return Ok(None);
    };
    plan.parts = parts.clone();
    let updated = plan.clone();
    set_json(store, PLANS_KEY, &plans)?;

    tracing::info!(plan_id = id, "lesson plan updated");
    Ok(Some(updated))
}

/// Remove the plan with `id`. Returns `true` if a plan was removed.
pub fn delete_plan<S: KeyValueStore + ?Sized>(store: &S, id: i64) -> Result<bool, StoreError> {
    let mut plans = plans_for_write(store)?;
    let before = plans.len();
    plans.retain(|p| p.id != id);
    if plans.len() == before {
        return Ok(false);
    }
    set_json(store, PLANS_KEY, &plans)?;

    tracing::info!(plan_id = id, "lesson plan deleted");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use crate::models::PlanFormat;

    fn request(subject: &str) -> LessonPlanRequest {
        LessonPlanRequest {
            activity_type: "Phát triển thể chất".to_string(),
            age_group: "Trẻ 4-5 tuổi".to_string(),
            topic: "Ngành nghề".to_string(),
            subject: subject.to_string(),
            duration: "30 - 35 phút".to_string(),
            preparation_date: "2024-09-01".to_string(),
            teaching_date: "2024-09-03".to_string(),
            teacher_name: "Nguyễn Thị A".to_string(),
            school_name: "Trường Mầm non Họa Mi".to_string(),
            format: PlanFormat::NoColumns,
        }
    }

    #[test]
    fn empty_store_lists_nothing() {
        let store = MemoryStore::new();
        assert!(list_plans(&store).unwrap().is_empty());
        assert!(get_plan(&store, 1).unwrap().is_none());
    }

    #[test]
    fn insert_uses_clock_when_ahead() {
        let store = MemoryStore::new();
        let a = insert_plan_at(&store, 1_000, &request("a"), &LessonPlanParts::default()).unwrap();
        let b = insert_plan_at(&store, 2_000, &request("b"), &LessonPlanParts::default()).unwrap();
        assert_eq!(a.id, 1_000);
        assert_eq!(b.id, 2_000);
    }

    #[test]
    fn insert_bumps_id_on_collision() {
        let store = MemoryStore::new();
        insert_plan_at(&store, 5_000, &request("a"), &LessonPlanParts::default()).unwrap();
        let same_ms = insert_plan_at(&store, 5_000, &request("b"), &LessonPlanParts::default()).unwrap();
        let backwards = insert_plan_at(&store, 10, &request("c"), &LessonPlanParts::default()).unwrap();
        assert_eq!(same_ms.id, 5_001);
        assert_eq!(backwards.id, 5_002);
    }

    #[test]
    fn update_missing_plan_returns_none() {
        let store = MemoryStore::new();
        let result = update_plan_parts(&store, 42, &LessonPlanParts::default()).unwrap();
        assert!(result.is_none());
        // Nothing was written.
        assert!(store.get(PLANS_KEY).unwrap().is_none());
    }

    #[test]
    fn delete_missing_plan_is_noop() {
        let store = MemoryStore::new();
        insert_plan_at(&store, 1, &request("a"), &LessonPlanParts::default()).unwrap();
        assert!(!delete_plan(&store, 99).unwrap());
        assert_eq!(list_plans(&store).unwrap().len(), 1);
    }

    #[test]
    fn corrupt_list_is_a_decode_error() {
        let store = MemoryStore::new();
        store.set(PLANS_KEY, "{oops").unwrap();
        assert!(matches!(list_plans(&store), Err(StoreError::Decode { .. })));
    }

    #[test]
    fn insert_replaces_corrupt_list() {
        let store = MemoryStore::new();
        store.set(PLANS_KEY, "{oops").unwrap();

        let plan = insert_plan_at(&store, 7, &request("a"), &LessonPlanParts::default()).unwrap();
        assert_eq!(list_plans(&store).unwrap(), vec![plan]);
    }

    #[test]
    fn update_and_delete_tolerate_corrupt_list() {
        let store = MemoryStore::new();
        store.set(PLANS_KEY, "{oops").unwrap();
        assert!(update_plan_parts(&store, 7, &LessonPlanParts::default()).unwrap().is_none());
        assert!(!delete_plan(&store, 7).unwrap());
    }
}
