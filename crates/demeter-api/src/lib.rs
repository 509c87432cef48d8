//! JSON REST API for Demeter.
//!
//! Exposes an axum [`Router`] backed by any [`demeter_core::store::RecipeStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", demeter_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod ingredients;
pub mod recipes;

use std::sync::Arc;

use axum::{Router, routing::get};
use demeter_core::store::RecipeStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RecipeStore + 'static,
{
  Router::new()
    // Ingredients
    .route("/ingredients", axum::routing::post(ingredients::create::<S>))
    .route("/ingredients/orphaned", get(ingredients::orphaned::<S>))
    .route("/ingredients/{id}", get(ingredients::get_one::<S>))
    // Recipes
    .route("/recipes", get(recipes::list::<S>).post(recipes::create::<S>))
    .route(
      "/recipes/{id}",
      get(recipes::get_one::<S>)
        .put(recipes::update::<S>)
        .delete(recipes::delete_one::<S>),
    )
    .route("/recipes/{id}/ingredients", get(recipes::ingredients::<S>))
    .route("/recipes/{id}/timestamps", get(recipes::timestamps::<S>))
    .with_state(store)
}
