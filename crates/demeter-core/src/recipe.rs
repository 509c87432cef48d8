//! Recipe: the aggregate that roots an ingredient tree.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::ingredient::{Ingredient, IngredientId};

/// Store-assigned identifier of a recipe row.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecipeId(pub i64);

impl fmt::Display for RecipeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// A titled recipe with timing metadata and one root ingredient.
///
/// `root_ingredient` is only populated when the recipe is hydrated (or when a
/// caller submits a tree to save). `root_ingredient_id` is the stored
/// reference and is overwritten from the embedded tree on save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub recipe_id:          Option<RecipeId>,
  #[serde(rename = "recipe_title", default)]
  pub title:              String,
  #[serde(rename = "recipe_cook_time", default)]
  pub cook_time:          i64,
  #[serde(rename = "recipe_prep_time", default)]
  pub prep_time:          i64,
  #[serde(rename = "recipe_quantity", default)]
  pub quantity:           i64,
  #[serde(default)]
  pub root_ingredient_id: Option<IngredientId>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub root_ingredient:    Option<Ingredient>,
}

impl Recipe {
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into(), ..Self::default() }
  }

  pub fn with_root(mut self, root: Ingredient) -> Self {
    self.root_ingredient = Some(root);
    self
  }

  /// Ids of every ingredient reachable from the root, the root included.
  ///
  /// `None` when the recipe names a root but carries no embedded tree (a row
  /// from a listing, say); the set can only be computed by a store then. A
  /// recipe with no root at all has an empty set.
  pub fn ingredient_ids(&self) -> Option<BTreeSet<IngredientId>> {
    match (&self.root_ingredient, self.root_ingredient_id) {
      (Some(root), _) => Some(root.ids()),
      (None, Some(_)) => None,
      (None, None) => Some(BTreeSet::new()),
    }
  }
}
