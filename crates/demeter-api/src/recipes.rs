//! Handlers for `/recipes` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/recipes` | Recipe rows, without ingredient trees |
//! | `POST`   | `/recipes` | Body: [`Recipe`]; 201 on insert, 200 on update |
//! | `GET`    | `/recipes/{id}` | Hydrated recipe; 404 if not found |
//! | `PUT`    | `/recipes/{id}` | Body: [`Recipe`]; saved under the path id |
//! | `DELETE` | `/recipes/{id}` | 204; the ingredient tree is kept |
//! | `GET`    | `/recipes/{id}/ingredients` | Ascending ids reachable from the root |
//! | `GET`    | `/recipes/{id}/timestamps` | `{"created": ..., "updated": ...}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use demeter_core::{
  ingredient::IngredientId,
  recipe::{Recipe, RecipeId},
  store::RecipeStore,
  temporal::{RecipeTimestamps, UpsertOutcome},
};

use crate::error::ApiError;

fn saved_status(outcome: UpsertOutcome) -> StatusCode {
  match outcome {
    UpsertOutcome::Inserted => StatusCode::CREATED,
    UpsertOutcome::Updated => StatusCode::OK,
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /recipes`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Recipe>>, ApiError>
where
  S: RecipeStore,
{
  let recipes = store.list_recipes().await.map_err(ApiError::from_store)?;
  Ok(Json(recipes))
}

// ─── Save ─────────────────────────────────────────────────────────────────────

/// `POST /recipes`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<Recipe>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecipeStore,
{
  let (saved, outcome) = store.save_recipe(body).await.map_err(ApiError::from_store)?;
  Ok((saved_status(outcome), Json(saved)))
}

/// `PUT /recipes/{id}`. A body carrying a different `recipe_id` is rejected.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(mut body): Json<Recipe>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecipeStore,
{
  let id = RecipeId(id);
  if body.recipe_id.is_some_and(|body_id| body_id != id) {
    return Err(ApiError::BadRequest(format!(
      "body recipe_id does not match path id {id}"
    )));
  }
  body.recipe_id = Some(id);

  let (saved, outcome) = store.save_recipe(body).await.map_err(ApiError::from_store)?;
  Ok((saved_status(outcome), Json(saved)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /recipes/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Recipe>, ApiError>
where
  S: RecipeStore,
{
  let recipe = store
    .get_recipe(RecipeId(id))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(recipe))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /recipes/{id}`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: RecipeStore,
{
  store
    .delete_recipe(RecipeId(id))
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Derived facts ────────────────────────────────────────────────────────────

/// `GET /recipes/{id}/ingredients`
pub async fn ingredients<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<IngredientId>>, ApiError>
where
  S: RecipeStore,
{
  let ids = store
    .recipe_ingredients(RecipeId(id))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(ids.into_iter().collect()))
}

/// `GET /recipes/{id}/timestamps`
pub async fn timestamps<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<RecipeTimestamps>, ApiError>
where
  S: RecipeStore,
{
  let facts = store
    .recipe_timestamps(RecipeId(id))
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(facts))
}
