// ==========================================
// RAB 估价引擎 - 资源价格目录
// ==========================================
// 职责: 人工/材料/机具基础单价表
// 主键: normalize_name(name)，目录内唯一
// 红线: 同键重复导入时后者覆盖前者（保留首次出现的位置）
// ==========================================

use crate::domain::types::ResourceCategory;
use crate::importer::normalizer::normalize_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// ResourceItem - 资源条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceItem {
    pub code: String,
    pub name: String,
    pub unit: String,
    pub unit_price: f64,
    pub category: ResourceCategory,
}

impl ResourceItem {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        unit_price: f64,
        category: ResourceCategory,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            unit: unit.into(),
            unit_price,
            category,
        }
    }

    /// 目录主键
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }
}

// ==========================================
// Catalog - 资源目录（保持插入顺序）
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<ResourceItem>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由条目列表构建（后出现的同键条目覆盖前者）
    pub fn from_items(items: impl IntoIterator<Item = ResourceItem>) -> Self {
        let mut catalog = Self::new();
        for item in items {
            catalog.upsert(item);
        }
        catalog
    }

    /// 插入或覆盖
    ///
    /// # 返回
    /// - true: 覆盖了已有条目
    /// - false: 新增条目
    pub fn upsert(&mut self, item: ResourceItem) -> bool {
        let key = item.key();
        match self.index.get(&key) {
            Some(&pos) => {
                self.entries[pos] = item;
                true
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(item);
                false
            }
        }
    }

    /// 合并另一份目录（导入时使用，后者覆盖）
    ///
    /// # 返回
    /// 被覆盖的条目数
    pub fn merge(&mut self, other: Catalog) -> usize {
        other
            .entries
            .into_iter()
            .filter(|item| self.upsert(item.clone()))
            .count()
    }

    /// 按名称删除
    pub fn remove(&mut self, name: &str) -> Option<ResourceItem> {
        let key = normalize_name(name);
        let pos = self.index.remove(&key)?;
        let removed = self.entries.remove(pos);
        self.rebuild_index();
        Some(removed)
    }

    /// 按规范化键精确查找
    pub fn get(&self, key: &str) -> Option<&ResourceItem> {
        self.index.get(key).map(|&pos| &self.entries[pos])
    }

    /// 按原始名称查找（内部先规范化）
    pub fn get_by_name(&self, name: &str) -> Option<&ResourceItem> {
        self.get(&normalize_name(name))
    }

    pub fn get_mut_by_name(&mut self, name: &str) -> Option<&mut ResourceItem> {
        let pos = *self.index.get(&normalize_name(name))?;
        self.entries.get_mut(pos)
    }

    /// 按插入顺序遍历 (规范化键, 条目)
    pub fn iter_keyed(&self) -> impl Iterator<Item = (String, &ResourceItem)> {
        self.entries.iter().map(|item| (item.key(), item))
    }

    pub fn items(&self) -> &[ResourceItem] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 名称模糊搜索（不区分大小写的子串）
    pub fn search(&self, term: &str) -> Vec<&ResourceItem> {
        let needle = normalize_name(term);
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|item| item.key().contains(&needle))
            .collect()
    }

    // 反序列化后 index 为空，需要重建
    pub fn rebuild_index(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.key(), pos))
            .collect();
    }
}

impl PartialEq for Catalog {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
