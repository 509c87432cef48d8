//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Ids are stored as SQLite integers. Timestamps are stored as RFC 3339
//! strings. Text columns are nullable in the schema and decode to empty
//! strings.

use chrono::{DateTime, Utc};
use demeter_core::{
  ingredient::{Ingredient, IngredientId},
  recipe::{Recipe, RecipeId},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns of one `ingredient` row.
pub struct RawIngredient {
  pub ingredient_id: i64,
  pub name:          Option<String>,
  pub instruction:   Option<String>,
}

impl RawIngredient {
  pub const COLUMNS: &'static str =
    "ingredient_id, ingredient_name, ingredient_instruction";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      ingredient_id: row.get(0)?,
      name:          row.get(1)?,
      instruction:   row.get(2)?,
    })
  }

  /// A tree node with no components yet; the graph walk attaches them.
  pub fn into_ingredient(self) -> Ingredient {
    Ingredient {
      ingredient_id: Some(IngredientId(self.ingredient_id)),
      name:          self.name.unwrap_or_default(),
      instruction:   self.instruction.unwrap_or_default(),
      components:    Vec::new(),
    }
  }
}

/// Columns of one `recipe` row.
pub struct RawRecipe {
  pub recipe_id:          i64,
  pub title:              Option<String>,
  pub cook_time:          Option<i64>,
  pub prep_time:          Option<i64>,
  pub quantity:           Option<i64>,
  pub root_ingredient_id: Option<i64>,
}

impl RawRecipe {
  pub const COLUMNS: &'static str = "recipe_id, recipe_title, recipe_cook_time, \
                                     recipe_prep_time, recipe_quantity, root_ingredient_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      recipe_id:          row.get(0)?,
      title:              row.get(1)?,
      cook_time:          row.get(2)?,
      prep_time:          row.get(3)?,
      quantity:           row.get(4)?,
      root_ingredient_id: row.get(5)?,
    })
  }

  /// The recipe without its tree; `root_ingredient` is left empty.
  pub fn into_recipe(self) -> Recipe {
    Recipe {
      recipe_id:          Some(RecipeId(self.recipe_id)),
      title:              self.title.unwrap_or_default(),
      cook_time:          self.cook_time.unwrap_or_default(),
      prep_time:          self.prep_time.unwrap_or_default(),
      quantity:           self.quantity.unwrap_or_default(),
      root_ingredient_id: self.root_ingredient_id.map(IngredientId),
      root_ingredient:    None,
    }
  }
}
