// ==========================================
// RAB 估价引擎 - 配置层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("配置值无效: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("配置序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("锁获取失败: {0}")]
    LockError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
