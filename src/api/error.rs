// ==========================================
// RAB 估价引擎 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把导入/配置/会话错误转换为用户可读的错误消息
// 说明: 行级问题不在此处，它们随成功结果一起以诊断形式返回
// ==========================================

use crate::config::ConfigError;
use crate::engine::session::EditError;
use crate::importer::ImportError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 修改校验失败（带违规明细）
    #[error("数据验证失败: {reason}")]
    ValidationError {
        reason: String,
        violations: Vec<ValidationViolation>,
    },

    // ==========================================
    // 协作方错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从下层错误转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidValue { key, value } => {
                ApiError::ConfigError(format!("配置项{}的值无效: {}", key, value))
            }
            other => ApiError::ConfigError(other.to_string()),
        }
    }
}

impl From<EditError> for ApiError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::ResourceNotFound(_) | EditError::LineItemNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            EditError::DuplicateLineNo(line_no) => ApiError::ValidationError {
                reason: err.to_string(),
                violations: vec![ValidationViolation::new(
                    "DUPLICATE_LINE_NO",
                    "line_no",
                    format!("行号{}已存在", line_no),
                )],
            },
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 校验违规详情
// ==========================================

/// 校验违规详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationViolation {
    /// 违规类型（NEGATIVE_VOLUME / INVALID_WEEK / INVALID_PCT / DUPLICATE_LINE_NO ...）
    pub violation_type: String,
    /// 字段名
    pub field: String,
    /// 违规原因
    pub reason: String,
    /// 所在明细行号（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_no: Option<u32>,
}

impl ValidationViolation {
    pub fn new(
        violation_type: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            violation_type: violation_type.into(),
            field: field.into(),
            reason: reason.into(),
            line_no: None,
        }
    }

    pub fn at_line(mut self, line_no: u32) -> Self {
        self.line_no = Some(line_no);
        self
    }
}
