// ==========================================
// RAB 估价引擎 - 估价配置读取 Trait
// ==========================================
// 职责: 定义估价核心所需的只读配置接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::parser_config::ParserConfig;

// ==========================================
// EstimateConfigReader Trait
// ==========================================
// 用途: 汇总引擎与导入管道所需的配置读取接口
// 实现者: ConfigManager（config_kv 表）, StaticConfig（内存）
pub trait EstimateConfigReader: Send + Sync {
    /// 全局间接费率（%）
    ///
    /// # 默认值
    /// - 15.0
    fn get_overhead_pct(&self) -> ConfigResult<f64>;

    /// 全局税率（%）
    ///
    /// # 默认值
    /// - 11.0
    fn get_tax_pct(&self) -> ConfigResult<f64>;

    /// 项目名称（默认空串）
    fn get_project_name(&self) -> ConfigResult<String>;

    /// 项目地点（默认空串）
    fn get_project_location(&self) -> ConfigResult<String>;

    /// 结构解析配置
    ///
    /// # 默认值
    /// - ParserConfig::default()
    fn get_parser_config(&self) -> ConfigResult<ParserConfig>;
}
