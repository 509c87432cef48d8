//! Recipe aggregate store: recipe rows plus the ingredient tree they root.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use demeter_core::{
  Error as CoreError,
  ingredient::IngredientId,
  recipe::{Recipe, RecipeId},
  temporal::{RecipeTimestamps, UpsertOutcome},
};
use rusqlite::{OptionalExtension as _, Transaction, params};

use crate::{
  Result,
  encode::RawRecipe,
  graph::{self, Budget},
  temporal,
};

/// Insert or overwrite the recipe row. The embedded tree is ignored.
fn upsert_recipe(tx: &Transaction<'_>, recipe: &Recipe) -> Result<(RecipeId, UpsertOutcome)> {
  let root = recipe.root_ingredient_id.map(|id| id.0);

  let Some(id) = recipe.recipe_id else {
    tx.execute(
      "INSERT INTO recipe (
         recipe_title, recipe_cook_time, recipe_prep_time, recipe_quantity,
         root_ingredient_id
       ) VALUES (?1, ?2, ?3, ?4, ?5)",
      params![recipe.title, recipe.cook_time, recipe.prep_time, recipe.quantity, root],
    )?;
    return Ok((RecipeId(tx.last_insert_rowid()), UpsertOutcome::Inserted));
  };

  let updated = tx.execute(
    "UPDATE recipe SET
       recipe_title = ?2, recipe_cook_time = ?3, recipe_prep_time = ?4,
       recipe_quantity = ?5, root_ingredient_id = ?6
     WHERE recipe_id = ?1",
    params![id.0, recipe.title, recipe.cook_time, recipe.prep_time, recipe.quantity, root],
  )?;
  if updated > 0 {
    return Ok((id, UpsertOutcome::Updated));
  }

  tx.execute(
    "INSERT INTO recipe (
       recipe_id, recipe_title, recipe_cook_time, recipe_prep_time,
       recipe_quantity, root_ingredient_id
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![id.0, recipe.title, recipe.cook_time, recipe.prep_time, recipe.quantity, root],
  )?;
  Ok((id, UpsertOutcome::Inserted))
}

fn read_recipe(tx: &Transaction<'_>, id: RecipeId) -> Result<Recipe> {
  let sql = format!("SELECT {} FROM recipe WHERE recipe_id = ?1", RawRecipe::COLUMNS);
  tx.query_row(&sql, params![id.0], RawRecipe::from_row)
    .optional()?
    .map(RawRecipe::into_recipe)
    .ok_or_else(|| CoreError::RecipeNotFound(id).into())
}

/// Persist the embedded root tree (if any), then the recipe row, then the
/// temporal facts, all stamped with `at`.
pub fn save(
  tx:     &Transaction<'_>,
  recipe: Recipe,
  at:     DateTime<Utc>,
  budget: &Budget,
) -> Result<(Recipe, UpsertOutcome)> {
  let mut recipe = recipe;

  if let Some(root) = recipe.root_ingredient.take() {
    let root = graph::save(tx, root, budget)?;
    recipe.root_ingredient_id = root.ingredient_id;
    tracing::debug!(
      root_ingredient_id = ?recipe.root_ingredient_id,
      nodes = root.node_count(),
      "saved root ingredient tree"
    );
    recipe.root_ingredient = Some(root);
  }

  let (id, outcome) = upsert_recipe(tx, &recipe)?;
  recipe.recipe_id = Some(id);

  if outcome.is_insert() {
    temporal::record_created(tx, id, at)?;
    tracing::info!(recipe_id = %id, title = %recipe.title, "recipe created");
  }
  temporal::record_updated(tx, id, at)?;

  Ok((recipe, outcome))
}

/// The recipe row with its root tree attached (when it has a root).
pub fn get(tx: &Transaction<'_>, id: RecipeId, budget: &Budget) -> Result<Recipe> {
  let mut recipe = read_recipe(tx, id)?;
  if let Some(root) = recipe.root_ingredient_id {
    recipe.root_ingredient = Some(graph::load(tx, root, budget)?);
  }
  Ok(recipe)
}

pub fn list(tx: &Transaction<'_>) -> Result<Vec<Recipe>> {
  let sql = format!("SELECT {} FROM recipe ORDER BY recipe_id", RawRecipe::COLUMNS);
  let mut stmt = tx.prepare(&sql)?;
  let raws = stmt
    .query_map([], RawRecipe::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(raws.into_iter().map(RawRecipe::into_recipe).collect())
}

/// Remove the recipe row; its temporal facts go with it by cascade.
pub fn delete(tx: &Transaction<'_>, id: RecipeId) -> Result<()> {
  let deleted = tx.execute("DELETE FROM recipe WHERE recipe_id = ?1", params![id.0])?;
  if deleted == 0 {
    return Err(CoreError::RecipeNotFound(id).into());
  }
  Ok(())
}

/// Ids reachable from the recipe's root; empty when it has none.
pub fn ingredients(
  tx:     &Transaction<'_>,
  id:     RecipeId,
  budget: &Budget,
) -> Result<BTreeSet<IngredientId>> {
  match read_recipe(tx, id)?.root_ingredient_id {
    Some(root) => graph::reachable_ids(tx, root, budget),
    None => Ok(BTreeSet::new()),
  }
}

/// All ingredient ids minus those reachable from any recipe root.
///
/// Walks every recipe's graph on each call; no reachability index is kept.
pub fn orphaned(tx: &Transaction<'_>, budget: &Budget) -> Result<BTreeSet<IngredientId>> {
  let mut unreachable = graph::all_ingredient_ids(tx)?;
  for recipe in list(tx)? {
    let Some(root) = recipe.root_ingredient_id else { continue };
    for id in graph::reachable_ids(tx, root, budget)? {
      unreachable.remove(&id);
    }
  }
  Ok(unreachable)
}

pub fn timestamps(tx: &Transaction<'_>, id: RecipeId) -> Result<RecipeTimestamps> {
  read_recipe(tx, id)?;
  temporal::timestamps(tx, id)
}
