use crate::generation::GenerationError;

/// Failure of a planner operation.
///
/// `Display` is the user-facing Vietnamese message; `source()` carries the
/// technical cause.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("Không thể tạo Hoạt động học. Vui lòng thử lại sau.")]
    Learning(#[source] GenerationError),

    #[error("Không thể tạo Hoạt động ngoài trời. Vui lòng thử lại sau.")]
    Outdoor(#[source] GenerationError),

    #[error("Không thể tạo Hoạt động góc. Vui lòng thử lại sau.")]
    Corner(#[source] GenerationError),

    #[error("Không thể chỉnh sửa giáo án. Vui lòng thử lại sau.")]
    Refine(#[source] RefineFailure),
}

/// Why a refine call failed.
#[derive(Debug, thiserror::Error)]
pub enum RefineFailure {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("model answer is not a valid refine response: {0}")]
    Decode(#[from] serde_json::Error),
}
