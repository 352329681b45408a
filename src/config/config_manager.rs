// ==========================================
// RAB 估价引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (scope_id = 'global', key, value)
// 缺省: 键不存在时取默认值；值格式错误时报 InvalidValue
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::estimate_config_trait::EstimateConfigReader;
use crate::config::parser_config::ParserConfig;
use crate::db::{ensure_config_schema, open_sqlite_connection};
use crate::domain::project::{DEFAULT_OVERHEAD_PCT, DEFAULT_TAX_PCT};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 打开（必要时创建）配置库
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_config_schema(&conn)?;
        debug!(db_path = %db_path, "配置库已打开");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA 并确保 config_kv 存在（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&guard)?;
            ensure_config_schema(&guard)?;
        }

        Ok(Self { conn })
    }

    fn lock(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        debug!(key = %key, value = %value, "配置已写入");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式，按键排序）
    ///
    /// # 用途
    /// - 随估价结果一起导出，记录计算时的费率口径
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 读取百分比配置：缺省取默认值；非数值、负数或非有限值报错
    fn get_pct_or_default(&self, key: &str, default: f64) -> ConfigResult<f64> {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => {
                warn!(config_key = key, raw_value = %raw, "百分比配置格式错误");
                Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw,
                })
            }
        }
    }
}

// ==========================================
// EstimateConfigReader Trait 实现
// ==========================================
impl EstimateConfigReader for ConfigManager {
    fn get_overhead_pct(&self) -> ConfigResult<f64> {
        self.get_pct_or_default(config_keys::OVERHEAD_PCT, DEFAULT_OVERHEAD_PCT)
    }

    fn get_tax_pct(&self) -> ConfigResult<f64> {
        self.get_pct_or_default(config_keys::TAX_PCT, DEFAULT_TAX_PCT)
    }

    fn get_project_name(&self) -> ConfigResult<String> {
        Ok(self
            .get_config_value(config_keys::PROJECT_NAME)?
            .unwrap_or_default())
    }

    fn get_project_location(&self) -> ConfigResult<String> {
        Ok(self
            .get_config_value(config_keys::PROJECT_LOCATION)?
            .unwrap_or_default())
    }

    fn get_parser_config(&self) -> ConfigResult<ParserConfig> {
        match self.get_config_value(config_keys::PARSER_CONFIG)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|_| ConfigError::InvalidValue {
                key: config_keys::PARSER_CONFIG.to_string(),
                value: raw,
            }),
            None => Ok(ParserConfig::default()),
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 费率
    pub const OVERHEAD_PCT: &str = "overhead_pct";
    pub const TAX_PCT: &str = "tax_pct";

    // 项目标识
    pub const PROJECT_NAME: &str = "project_name";
    pub const PROJECT_LOCATION: &str = "project_location";

    // 结构解析 (JSON)
    pub const PARSER_CONFIG: &str = "parser_config";
}
