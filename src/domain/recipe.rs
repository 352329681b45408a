// ==========================================
// RAB 估价引擎 - AHSP 分析（单价配方）
// ==========================================
// 职责: 工作项单价分析结构（编码 + 描述 + 分部 + 组成明细）
// 红线: 组成明细的解析单价/单位/类别为派生值，不在此存储
// ==========================================

use crate::domain::types::ResourceCategory;
use crate::importer::normalizer::normalize_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// RecipeComponent - 组成明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeComponent {
    pub recipe_code: String,
    pub component_name: String,
    /// 系数（>= 0）
    pub coefficient: f64,
    /// 解析时所在分段（未命中目录时作为默认类别）
    pub section: ResourceCategory,
}

impl RecipeComponent {
    pub fn new(
        recipe_code: impl Into<String>,
        component_name: impl Into<String>,
        coefficient: f64,
        section: ResourceCategory,
    ) -> Self {
        Self {
            recipe_code: recipe_code.into(),
            component_name: component_name.into(),
            coefficient: coefficient.max(0.0),
            section,
        }
    }
}

// ==========================================
// Recipe - 单价分析
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub code: String,
    pub description: String,
    /// 分部标签（通常为来源工作表名）
    pub division: String,
    pub components: Vec<RecipeComponent>,
}

impl Recipe {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        division: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            division: division.into(),
            components: Vec::new(),
        }
    }

    /// 追加组成明细（recipe_code 自动对齐本分析编码）
    pub fn with_component(
        mut self,
        component_name: impl Into<String>,
        coefficient: f64,
        section: ResourceCategory,
    ) -> Self {
        self.push_component(component_name, coefficient, section);
        self
    }

    pub fn push_component(
        &mut self,
        component_name: impl Into<String>,
        coefficient: f64,
        section: ResourceCategory,
    ) {
        let component =
            RecipeComponent::new(self.code.clone(), component_name, coefficient, section);
        self.components.push(component);
    }

    /// 编码主键（规范化后）
    pub fn key(&self) -> String {
        normalize_name(&self.code)
    }
}

// ==========================================
// RecipeBook - 分析集合（保持导入顺序，编码唯一）
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let mut book = Self::new();
        for recipe in recipes {
            book.upsert(recipe);
        }
        book
    }

    /// 插入或替换（同编码后者覆盖）
    pub fn upsert(&mut self, recipe: Recipe) -> bool {
        let key = recipe.key();
        match self.index.get(&key) {
            Some(&pos) => {
                self.recipes[pos] = recipe;
                true
            }
            None => {
                self.index.insert(key, self.recipes.len());
                self.recipes.push(recipe);
                false
            }
        }
    }

    pub fn extend(&mut self, recipes: impl IntoIterator<Item = Recipe>) -> usize {
        recipes.into_iter().filter(|r| self.upsert(r.clone())).count()
    }

    pub fn remove(&mut self, code: &str) -> Option<Recipe> {
        let pos = self.index.remove(&normalize_name(code))?;
        let removed = self.recipes.remove(pos);
        self.rebuild_index();
        Some(removed)
    }

    /// 按编码查找（规范化匹配）
    pub fn get(&self, code: &str) -> Option<&Recipe> {
        self.index
            .get(&normalize_name(code))
            .map(|&pos| &self.recipes[pos])
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn rebuild_index(&mut self) {
        self.index = self
            .recipes
            .iter()
            .enumerate()
            .map(|(pos, r)| (r.key(), pos))
            .collect();
    }
}

impl PartialEq for RecipeBook {
    fn eq(&self, other: &Self) -> bool {
        self.recipes == other.recipes
    }
}
