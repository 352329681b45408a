// ==========================================
// RAB 估价引擎 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 资源类别 (Resource Category)
// ==========================================
// AHSP 分析表的三段: 人工 / 材料 / 机具
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceCategory {
    Labor,     // 人工 (upah / tenaga)
    Material,  // 材料 (bahan)
    Equipment, // 机具 (peralatan)
}

impl ResourceCategory {
    /// 全部类别（固定顺序，用于分类小计）
    pub const ALL: [ResourceCategory; 3] = [
        ResourceCategory::Labor,
        ResourceCategory::Material,
        ResourceCategory::Equipment,
    ];
}

impl Default for ResourceCategory {
    fn default() -> Self {
        ResourceCategory::Material
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceCategory::Labor => write!(f, "LABOR"),
            ResourceCategory::Material => write!(f, "MATERIAL"),
            ResourceCategory::Equipment => write!(f, "EQUIPMENT"),
        }
    }
}

// ==========================================
// 价格匹配方式 (Match Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchKind {
    Exact,      // 规范化名称精确命中
    Fallback,   // 子串回退命中
    Unresolved, // 未命中，单价为 0
}

impl MatchKind {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, MatchKind::Unresolved)
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Exact => write!(f, "EXACT"),
            MatchKind::Fallback => write!(f, "FALLBACK"),
            MatchKind::Unresolved => write!(f, "UNRESOLVED"),
        }
    }
}

// ==========================================
// 进度曲线状态 (Schedule Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Ready,            // 曲线已生成
    InsufficientData, // 总造价为 0，曲线无定义
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleStatus::Ready => write!(f, "READY"),
            ScheduleStatus::InsufficientData => write!(f, "INSUFFICIENT_DATA"),
        }
    }
}
