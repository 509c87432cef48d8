//! Ingredients and the component edges that compose them.
//!
//! An ingredient is a named preparation step. Its `components` list is the
//! in-memory view of the composition graph; at rest only the flat
//! [`ComponentEdge`] rows exist and the tree is rebuilt from them on read.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned identifier of an ingredient row.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct IngredientId(pub i64);

impl fmt::Display for IngredientId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Ingredient ──────────────────────────────────────────────────────────────

/// A preparation step, possibly composed of other ingredients.
///
/// `ingredient_id` is `None` until the first save assigns one. Saving returns
/// a new value with every id in the tree populated; the input is not mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ingredient_id: Option<IngredientId>,
  #[serde(rename = "ingredient_name", default)]
  pub name:          String,
  #[serde(rename = "ingredient_instruction", default)]
  pub instruction:   String,
  /// Ingredients used when preparing this one, in edge order.
  #[serde(default)]
  pub components:    Vec<Ingredient>,
}

impl Ingredient {
  /// An unpersisted ingredient with no components.
  pub fn new(name: impl Into<String>, instruction: impl Into<String>) -> Self {
    Self {
      ingredient_id: None,
      name:          name.into(),
      instruction:   instruction.into(),
      components:    Vec::new(),
    }
  }

  /// Append `component` and return `self`, for building trees inline.
  pub fn with_component(mut self, component: Ingredient) -> Self {
    self.components.push(component);
    self
  }

  pub fn is_persisted(&self) -> bool { self.ingredient_id.is_some() }

  /// Every id in this tree, the root included. Unpersisted nodes contribute
  /// nothing; shared sub-ingredients are counted once.
  pub fn ids(&self) -> BTreeSet<IngredientId> {
    let mut out = BTreeSet::new();
    let mut stack = vec![self];
    while let Some(node) = stack.pop() {
      out.extend(node.ingredient_id);
      stack.extend(node.components.iter());
    }
    out
  }

  /// Number of nodes in the tree, counting each occurrence.
  pub fn node_count(&self) -> usize {
    let mut count = 0;
    let mut stack = vec![self];
    while let Some(node) = stack.pop() {
      count += 1;
      stack.extend(node.components.iter());
    }
    count
  }

  /// Nesting depth; a leaf has depth 1.
  pub fn depth(&self) -> usize {
    let mut deepest = 0;
    let mut stack = vec![(self, 1)];
    while let Some((node, depth)) = stack.pop() {
      deepest = deepest.max(depth);
      stack.extend(node.components.iter().map(|c| (c, depth + 1)));
    }
    deepest
  }
}

// ─── Edges ───────────────────────────────────────────────────────────────────

/// `base` is used as a component when preparing `result`.
///
/// The ordered pair is the candidate key; at most one row exists per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentEdge {
  pub base_ingredient_id:   IngredientId,
  pub result_ingredient_id: IngredientId,
}
