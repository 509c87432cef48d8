//! Handlers for `/ingredients` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/ingredients/orphaned` | Ids not reachable from any recipe |
//! | `GET`  | `/ingredients/{id}` | Full composition tree; 404 if not found |
//! | `POST` | `/ingredients` | Body: an [`Ingredient`] tree; returns 201 + persisted tree |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use demeter_core::{
  ingredient::{Ingredient, IngredientId},
  store::RecipeStore,
};

use crate::error::ApiError;

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /ingredients/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Ingredient>, ApiError>
where
  S: RecipeStore,
{
  let tree = store
    .get_ingredient(IngredientId(id))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(tree))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /ingredients`: returns 201 and the tree with every id populated.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<Ingredient>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecipeStore,
{
  let saved = store
    .save_ingredient(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(saved)))
}

// ─── Orphans ──────────────────────────────────────────────────────────────────

/// `GET /ingredients/orphaned`, ascending ids.
pub async fn orphaned<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<IngredientId>>, ApiError>
where
  S: RecipeStore,
{
  let ids = store
    .orphaned_ingredients()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(ids.into_iter().collect()))
}
