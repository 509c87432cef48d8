//! Error types for `demeter-core`.

use thiserror::Error;

use crate::{ingredient::IngredientId, recipe::RecipeId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("ingredient not found: {0}")]
  IngredientNotFound(IngredientId),

  #[error("recipe not found: {0}")]
  RecipeNotFound(RecipeId),

  /// The component edge `base -> result` closes a cycle, either one already
  /// stored (found on load) or one a save would create.
  #[error("component edge {base} -> {result} closes a cycle")]
  CycleDetected {
    base:   IngredientId,
    result: IngredientId,
  },

  #[error("composition tree is deeper than the limit of {limit}")]
  DepthExceeded { limit: usize },

  #[error("traversal deadline exceeded")]
  DeadlineExceeded,
}

impl Error {
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::IngredientNotFound(_) | Self::RecipeNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
