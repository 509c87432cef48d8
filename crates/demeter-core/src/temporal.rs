//! Semi-temporal facts about recipes and the upsert outcome that drives them.
//!
//! Creation and last-modification times are not columns of the recipe row.
//! They live in two side tables: `recipe_created` is written once, on the
//! insert that first persists a recipe; `recipe_last_updated` holds a single
//! current value that every save overwrites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a row upsert actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
  /// No row existed for the key; one was inserted (and an id assigned if the
  /// caller supplied none).
  Inserted,
  /// An existing row was overwritten.
  Updated,
}

impl UpsertOutcome {
  pub fn is_insert(self) -> bool { matches!(self, Self::Inserted) }
}

/// Both temporal facts for one recipe, as currently stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeTimestamps {
  pub created: Option<DateTime<Utc>>,
  pub updated: Option<DateTime<Utc>>,
}
