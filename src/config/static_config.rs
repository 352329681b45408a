// ==========================================
// RAB 估价引擎 - 内存配置
// ==========================================
// 用途: 未指定配置库时（CLI / 测试）直接提供固定配置
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::estimate_config_trait::EstimateConfigReader;
use crate::config::parser_config::ParserConfig;
use crate::domain::project::{DEFAULT_OVERHEAD_PCT, DEFAULT_TAX_PCT};

#[derive(Debug, Clone)]
pub struct StaticConfig {
    pub overhead_pct: f64,
    pub tax_pct: f64,
    pub project_name: String,
    pub project_location: String,
    pub parser: ParserConfig,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            overhead_pct: DEFAULT_OVERHEAD_PCT,
            tax_pct: DEFAULT_TAX_PCT,
            project_name: String::new(),
            project_location: String::new(),
            parser: ParserConfig::default(),
        }
    }
}

impl EstimateConfigReader for StaticConfig {
    fn get_overhead_pct(&self) -> ConfigResult<f64> {
        Ok(self.overhead_pct)
    }

    fn get_tax_pct(&self) -> ConfigResult<f64> {
        Ok(self.tax_pct)
    }

    fn get_project_name(&self) -> ConfigResult<String> {
        Ok(self.project_name.clone())
    }

    fn get_project_location(&self) -> ConfigResult<String> {
        Ok(self.project_location.clone())
    }

    fn get_parser_config(&self) -> ConfigResult<ParserConfig> {
        Ok(self.parser.clone())
    }
}
