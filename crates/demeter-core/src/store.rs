//! The `RecipeStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `demeter-store-sqlite`).
//! Higher layers (`demeter-api`, `demeter-server`) depend on this abstraction,
//! not on any concrete backend.

use std::{collections::BTreeSet, future::Future};

use crate::{
  ingredient::{Ingredient, IngredientId},
  recipe::{Recipe, RecipeId},
  temporal::{RecipeTimestamps, UpsertOutcome},
};

/// Backend errors expose just enough classification for outer layers to map
/// them (e.g. to HTTP status codes) without knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` when the error means a requested id has no row.
  fn is_not_found(&self) -> bool;
}

/// Abstraction over a Demeter recipe store backend.
///
/// Every method is one top-level operation running in its own transaction.
/// Writes are all-or-nothing: a failure anywhere in a tree leaves nothing of
/// that call persisted.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecipeStore: Send + Sync {
  type Error: StoreError;

  // ── Ingredients ───────────────────────────────────────────────────────

  /// Load an ingredient and everything it transitively composes.
  fn get_ingredient(
    &self,
    id: IngredientId,
  ) -> impl Future<Output = Result<Ingredient, Self::Error>> + Send + '_;

  /// Persist an ingredient tree, returning it with every id populated.
  fn save_ingredient(
    &self,
    tree: Ingredient,
  ) -> impl Future<Output = Result<Ingredient, Self::Error>> + Send + '_;

  /// Ids of stored ingredients not reachable from any recipe's root.
  ///
  /// Recomputed from scratch on every call: O(recipes × tree size).
  fn orphaned_ingredients(
    &self,
  ) -> impl Future<Output = Result<BTreeSet<IngredientId>, Self::Error>> + Send + '_;

  // ── Recipes ───────────────────────────────────────────────────────────

  /// Persist a recipe and its embedded root tree, recording temporal facts.
  fn save_recipe(
    &self,
    recipe: Recipe,
  ) -> impl Future<Output = Result<(Recipe, UpsertOutcome), Self::Error>> + Send + '_;

  /// Load a recipe with its root ingredient tree attached.
  fn get_recipe(
    &self,
    id: RecipeId,
  ) -> impl Future<Output = Result<Recipe, Self::Error>> + Send + '_;

  /// Every recipe row, ordered by id, without ingredient trees.
  fn list_recipes(
    &self,
  ) -> impl Future<Output = Result<Vec<Recipe>, Self::Error>> + Send + '_;

  /// Delete a recipe row and its temporal facts. Its ingredients stay.
  fn delete_recipe(
    &self,
    id: RecipeId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Ids of every ingredient reachable from the recipe's root.
  fn recipe_ingredients(
    &self,
    id: RecipeId,
  ) -> impl Future<Output = Result<BTreeSet<IngredientId>, Self::Error>> + Send + '_;

  fn recipe_timestamps(
    &self,
    id: RecipeId,
  ) -> impl Future<Output = Result<RecipeTimestamps, Self::Error>> + Send + '_;
}
