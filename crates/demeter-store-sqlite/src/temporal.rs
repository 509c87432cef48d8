//! Temporal fact tracker for recipes.
//!
//! Driven only by the recipe save path in [`crate::recipe`].

use chrono::{DateTime, Utc};
use demeter_core::{recipe::RecipeId, temporal::RecipeTimestamps};
use rusqlite::{OptionalExtension as _, Transaction, params};

use crate::{
  Result,
  encode::{decode_dt, encode_dt},
};

/// Record when `recipe_id` was first inserted.
///
/// Must be called once per recipe. A second call fails on the table's unique
/// key with [`Error::ConstraintViolation`](crate::Error::ConstraintViolation).
pub fn record_created(tx: &Transaction<'_>, recipe_id: RecipeId, at: DateTime<Utc>) -> Result<()> {
  tx.execute(
    "INSERT INTO recipe_created (recipe_id, recipe_created) VALUES (?1, ?2)",
    params![recipe_id.0, encode_dt(at)],
  )?;
  Ok(())
}

/// Set the single current last-updated value for `recipe_id`.
pub fn record_updated(tx: &Transaction<'_>, recipe_id: RecipeId, at: DateTime<Utc>) -> Result<()> {
  tx.execute(
    "INSERT INTO recipe_last_updated (recipe_id, recipe_updated) VALUES (?1, ?2)
     ON CONFLICT (recipe_id) DO UPDATE SET recipe_updated = excluded.recipe_updated",
    params![recipe_id.0, encode_dt(at)],
  )?;
  Ok(())
}

pub fn timestamps(tx: &Transaction<'_>, recipe_id: RecipeId) -> Result<RecipeTimestamps> {
  let created: Option<String> = tx
    .query_row(
      "SELECT recipe_created FROM recipe_created WHERE recipe_id = ?1",
      params![recipe_id.0],
      |row| row.get(0),
    )
    .optional()?;

  let updated: Option<String> = tx
    .query_row(
      "SELECT recipe_updated FROM recipe_last_updated WHERE recipe_id = ?1",
      params![recipe_id.0],
      |row| row.get(0),
    )
    .optional()?;

  Ok(RecipeTimestamps {
    created: created.as_deref().map(decode_dt).transpose()?,
    updated: updated.as_deref().map(decode_dt).transpose()?,
  })
}
