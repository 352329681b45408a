// ==========================================
// RAB 估价引擎 - 配置层
// ==========================================
// 职责: 费率、项目标识与结构解析配置的读取
// 存储: config_kv 表（scope_id = 'global'）
// ==========================================

pub mod config_manager;
pub mod error;
pub mod estimate_config_trait;
pub mod parser_config;
pub mod static_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use estimate_config_trait::EstimateConfigReader;
pub use parser_config::ParserConfig;
pub use static_config::StaticConfig;
