// ==========================================
// RAB 估价引擎 - 核心库
// ==========================================
// 职责: AHSP 单价分析解析、价格解析、RAB 层级成本汇总、S 曲线
// 技术栈: Rust + SQLite（仅配置）
// 系统定位: 纯内存计算核心，导入/导出由协作方负责
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "id");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 外部数据
pub mod importer;

// 引擎层 - 计算规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{MatchKind, ResourceCategory, ScheduleStatus};

// 领域实体
pub use domain::{
    Catalog, DerivedResults, LineItem, Project, ProjectIdentity, Recipe, RecipeBook,
    RecipeComponent, ResourceItem, VolumeRow,
};

// 引擎
pub use engine::{recompute, Edit, EstimateSession, PriceResolver, RecipeLinker};

// 导入
pub use importer::{normalize_name, parse_coefficient, parse_currency, EstimateImporter};

// API
pub use api::{ApiError, ApiResult, EstimateApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "RAB Estimator";
