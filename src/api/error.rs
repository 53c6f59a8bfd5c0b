// ==========================================
// 高校选课注册系统 - API 层错误类型
// ==========================================
// 约定: HTTP 层外置，调用方按变体映射状态码
//   NotFound → 404, Conflict → 409,
//   InvalidState / Validation → 400, CapacityExceeded → 409
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("资源未找到: {entity} ({id})")]
    NotFound { entity: String, id: String },

    #[error("资源冲突: {0}")]
    Conflict(String),

    #[error("当前状态不允许该操作: {0}")]
    InvalidState(String),

    #[error("教学班容量已满: {0}")]
    CapacityExceeded(String),

    #[error("入参校验失败: {0}")]
    Validation(String),

    #[error("内部错误: {0}")]
    Internal(String),

    #[error(transparent)]
    Database(RepositoryError),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ApiError::NotFound { entity, id },
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::Conflict(msg),
            RepositoryError::BusinessRuleViolation(msg) => ApiError::Conflict(msg),
            RepositoryError::CheckConstraintViolation(msg) => ApiError::CapacityExceeded(msg),
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::InvalidState(format!("不允许的状态转换: {from} → {to}"))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::Validation(format!("{field}: {message}"))
            }
            other => ApiError::Database(other),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let err = ApiError::from(RepositoryError::UniqueConstraintViolation(
            "UNIQUE constraint failed".to_string(),
        ));
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_not_found_passes_through() {
        let err = ApiError::from(RepositoryError::NotFound {
            entity: "Student".to_string(),
            id: "ST1".to_string(),
        });
        assert!(matches!(err, ApiError::NotFound { .. }));
    }
}
