// ==========================================
// RAB 估价引擎 - 价格解析器
// ==========================================
// 职责: 组成明细名称 → 目录资源（单价 / 单位 / 类别）
// 策略: 1. 规范化名称精确命中
//       2. 子串回退（按目录插入顺序，首个命中即返回）
//       3. 未命中 → (0, "-", 默认类别)，标记 UNRESOLVED
// 红线: 纯函数，同一目录状态下结果恒定；从不报错
// ==========================================

use crate::domain::catalog::{Catalog, ResourceItem};
use crate::domain::types::{MatchKind, ResourceCategory};
use crate::importer::normalizer::normalize_name;
use serde::{Deserialize, Serialize};

/// 子串回退的最小长度（严格大于）
pub const FALLBACK_MIN_LEN: usize = 3;

/// 未命中时的单位占位
pub const UNRESOLVED_UNIT: &str = "-";

/// 解析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub unit_price: f64,
    pub unit: String,
    pub category: ResourceCategory,
    pub match_kind: MatchKind,
    /// 命中的目录名称
    pub matched_name: Option<String>,
}

impl Resolution {
    fn hit(item: &ResourceItem, match_kind: MatchKind) -> Self {
        Self {
            unit_price: item.unit_price,
            unit: item.unit.clone(),
            category: item.category,
            match_kind,
            matched_name: Some(item.name.clone()),
        }
    }

    fn unresolved(default_category: ResourceCategory) -> Self {
        Self {
            unit_price: 0.0,
            unit: UNRESOLVED_UNIT.to_string(),
            category: default_category,
            match_kind: MatchKind::Unresolved,
            matched_name: None,
        }
    }
}

// ==========================================
// PriceResolver - 价格解析器
// ==========================================
pub struct PriceResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> PriceResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// 解析单个组成明细
    ///
    /// # 参数
    /// - component_name: 明细原始名称
    /// - default_category: 未命中时使用的类别（通常为解析时的分段）
    pub fn resolve(&self, component_name: &str, default_category: ResourceCategory) -> Resolution {
        let key = normalize_name(component_name);

        if let Some(item) = self.catalog.get(&key) {
            return Resolution::hit(item, MatchKind::Exact);
        }

        match self.fallback(&key) {
            Some(item) => Resolution::hit(item, MatchKind::Fallback),
            None => Resolution::unresolved(default_category),
        }
    }

    /// 子串回退：名称包含于目录键，或目录键包含于名称（对应一侧长度 > 3）
    fn fallback(&self, key: &str) -> Option<&'a ResourceItem> {
        let key_len = key.chars().count();
        self.catalog
            .iter_keyed()
            .find(|(entry_key, _)| {
                (key_len > FALLBACK_MIN_LEN && entry_key.contains(key))
                    || (entry_key.chars().count() > FALLBACK_MIN_LEN && key.contains(entry_key.as_str()))
            })
            .map(|(_, item)| item)
    }
}

/// 便捷函数：解析单个组成明细
pub fn resolve(
    component_name: &str,
    catalog: &Catalog,
    default_category: ResourceCategory,
) -> Resolution {
    PriceResolver::new(catalog).resolve(component_name, default_category)
}
