// ==========================================
// RAB 估价引擎 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供 CLI 与外部导出协作方调用
// ==========================================

pub mod error;
pub mod estimate_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult, ValidationViolation};
pub use estimate_api::{EstimateApi, EstimateReport, ImportReport, LinkReport, RecipeCostRow};
pub use validator::{EditValidator, ValidationMode};
