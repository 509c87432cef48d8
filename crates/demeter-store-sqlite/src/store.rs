//! [`SqliteStore`], the SQLite implementation of [`RecipeStore`].

use std::{collections::BTreeSet, path::Path};

use chrono::{DateTime, Utc};
use demeter_core::{
  ingredient::{Ingredient, IngredientId},
  limits::TraversalLimits,
  recipe::{Recipe, RecipeId},
  store::RecipeStore,
  temporal::{RecipeTimestamps, UpsertOutcome},
};
use rusqlite::{Transaction, TransactionBehavior};

use crate::{
  Error, Result,
  graph::{self, Budget},
  recipe,
  schema::SCHEMA,
};

// ─── Transactions ────────────────────────────────────────────────────────────

/// Run `body` in a deferred transaction that is always rolled back.
///
/// An error from `body` is returned as-is; the dropped handle rolls back.
fn read<T>(
  conn: &mut rusqlite::Connection,
  body: impl FnOnce(&Transaction<'_>) -> Result<T>,
) -> Result<T> {
  let tx = conn
    .transaction_with_behavior(TransactionBehavior::Deferred)
    .map_err(Error::Transaction)?;
  let out = body(&tx)?;
  tx.rollback().map_err(Error::Transaction)?;
  Ok(out)
}

/// Run `body` in an immediate (write-locking) transaction, committing only if
/// it succeeds.
fn write<T>(
  conn: &mut rusqlite::Connection,
  body: impl FnOnce(&Transaction<'_>) -> Result<T>,
) -> Result<T> {
  let tx = conn
    .transaction_with_behavior(TransactionBehavior::Immediate)
    .map_err(Error::Transaction)?;
  let out = body(&tx)?;
  tx.commit().map_err(Error::Transaction)?;
  Ok(out)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Demeter recipe store backed by a single SQLite file.
///
/// Clones share the inner connection handle.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  limits:          TraversalLimits,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, limits: TraversalLimits::default() };
    store.create_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, limits: TraversalLimits::default() };
    store.create_schema().await?;
    Ok(store)
  }

  /// Replace the bounds applied to every tree walk.
  pub fn with_limits(mut self, limits: TraversalLimits) -> Self {
    self.limits = limits;
    self
  }

  pub fn limits(&self) -> TraversalLimits { self.limits }

  /// Create all tables and indexes if they do not exist yet.
  pub async fn create_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// [`RecipeStore::save_recipe`] with an explicit timestamp for the
  /// temporal facts.
  pub async fn save_recipe_at(
    &self,
    recipe: Recipe,
    at:     DateTime<Utc>,
  ) -> Result<(Recipe, UpsertOutcome)> {
    let budget = Budget::start(self.limits);
    let id     = recipe.recipe_id;

    tracing::debug!(recipe_id = ?id, "saving recipe");
    self
      .conn
      .call(move |conn| {
        let _span = tracing::debug_span!("save_recipe", recipe_id = ?id).entered();
        Ok(write(conn, |tx| recipe::save(tx, recipe, at, &budget)))
      })
      .await?
  }
}

// ─── RecipeStore impl ────────────────────────────────────────────────────────

impl RecipeStore for SqliteStore {
  type Error = Error;

  // ── Ingredients ───────────────────────────────────────────────────────────

  async fn get_ingredient(&self, id: IngredientId) -> Result<Ingredient> {
    let budget = Budget::start(self.limits);

    tracing::debug!(ingredient_id = %id, "loading ingredient tree");
    self
      .conn
      .call(move |conn| {
        let _span = tracing::debug_span!("get_ingredient", ingredient_id = %id).entered();
        Ok(read(conn, |tx| graph::load(tx, id, &budget)))
      })
      .await?
  }

  async fn save_ingredient(&self, tree: Ingredient) -> Result<Ingredient> {
    let budget = Budget::start(self.limits);
    let id     = tree.ingredient_id;

    tracing::debug!(ingredient_id = ?id, nodes = tree.node_count(), "saving ingredient tree");
    self
      .conn
      .call(move |conn| {
        let _span = tracing::debug_span!("save_ingredient", ingredient_id = ?id).entered();
        Ok(write(conn, |tx| graph::save(tx, tree, &budget)))
      })
      .await?
  }

  async fn orphaned_ingredients(&self) -> Result<BTreeSet<IngredientId>> {
    let budget = Budget::start(self.limits);

    let orphans = self
      .conn
      .call(move |conn| {
        let _span = tracing::debug_span!("orphaned_ingredients").entered();
        Ok(read(conn, |tx| recipe::orphaned(tx, &budget)))
      })
      .await??;

    tracing::debug!(count = orphans.len(), "computed orphaned ingredients");
    Ok(orphans)
  }

  // ── Recipes ───────────────────────────────────────────────────────────────

  async fn save_recipe(&self, recipe: Recipe) -> Result<(Recipe, UpsertOutcome)> {
    self.save_recipe_at(recipe, Utc::now()).await
  }

  async fn get_recipe(&self, id: RecipeId) -> Result<Recipe> {
    let budget = Budget::start(self.limits);

    tracing::debug!(recipe_id = %id, "loading recipe");
    self
      .conn
      .call(move |conn| {
        let _span = tracing::debug_span!("get_recipe", recipe_id = %id).entered();
        Ok(read(conn, |tx| recipe::get(tx, id, &budget)))
      })
      .await?
  }

  async fn list_recipes(&self) -> Result<Vec<Recipe>> {
    self
      .conn
      .call(|conn| Ok(read(conn, recipe::list)))
      .await?
  }

  async fn delete_recipe(&self, id: RecipeId) -> Result<()> {
    tracing::debug!(recipe_id = %id, "deleting recipe");
    self
      .conn
      .call(move |conn| Ok(write(conn, |tx| recipe::delete(tx, id))))
      .await?
  }

  async fn recipe_ingredients(&self, id: RecipeId) -> Result<BTreeSet<IngredientId>> {
    let budget = Budget::start(self.limits);

    self
      .conn
      .call(move |conn| {
        let _span = tracing::debug_span!("recipe_ingredients", recipe_id = %id).entered();
        Ok(read(conn, |tx| recipe::ingredients(tx, id, &budget)))
      })
      .await?
  }

  async fn recipe_timestamps(&self, id: RecipeId) -> Result<RecipeTimestamps> {
    self
      .conn
      .call(move |conn| Ok(read(conn, |tx| recipe::timestamps(tx, id))))
      .await?
  }
}
