//! Integration tests for `SqliteStore` against an in-memory database.

use std::{collections::BTreeSet, time::Duration};

use chrono::{TimeZone as _, Utc};
use demeter_core::{
  Error as CoreError,
  ingredient::{Ingredient, IngredientId},
  limits::TraversalLimits,
  recipe::{Recipe, RecipeId},
  store::{RecipeStore, StoreError as _},
  temporal::UpsertOutcome,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn count(s: &SqliteStore, table: &'static str) -> i64 {
  s.conn
    .call(move |conn| {
      Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| {
        r.get::<_, i64>(0)
      })?)
    })
    .await
    .unwrap()
}

async fn exec(s: &SqliteStore, sql: &'static str) {
  s.conn
    .call(move |conn| {
      conn.execute_batch(sql)?;
      Ok(())
    })
    .await
    .unwrap();
}

async fn edges(s: &SqliteStore) -> Vec<(i64, i64)> {
  s.conn
    .call(|conn| {
      let mut stmt = conn.prepare(
        "SELECT base_ingredient_id, result_ingredient_id FROM component_of ORDER BY rowid",
      )?;
      let rows = stmt
        .query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(rows)
    })
    .await
    .unwrap()
}

fn stew() -> Recipe {
  Recipe {
    cook_time: 90,
    prep_time: 20,
    quantity: 4,
    ..Recipe::new("Stew")
  }
  .with_root(
    Ingredient::new("Stew Base", "Combine and simmer")
      .with_component(Ingredient::new("Broth", "Simmer bones for hours"))
      .with_component(Ingredient::new("Vegetables", "Dice")),
  )
}

/// A straight chain `names[0] <- names[1] <- ...`, one component per level.
fn chain(names: &[&str]) -> Ingredient {
  names
    .iter()
    .rev()
    .fold(None, |inner: Option<Ingredient>, name| {
      let node = Ingredient::new(*name, format!("prepare {name}"));
      Some(match inner {
        Some(inner) => node.with_component(inner),
        None => node,
      })
    })
    .unwrap()
}

fn id_of(node: &Ingredient) -> IngredientId { node.ingredient_id.unwrap() }

// ─── Example scenario ────────────────────────────────────────────────────────

#[tokio::test]
async fn stew_scenario_persists_rows_edges_and_facts() {
  let s = store().await;

  let (saved, outcome) = s.save_recipe(stew()).await.unwrap();
  assert_eq!(outcome, UpsertOutcome::Inserted);

  let root = saved.root_ingredient.as_ref().unwrap();
  let broth = &root.components[0];
  let veg = &root.components[1];
  assert_eq!(saved.root_ingredient_id, root.ingredient_id);
  assert_eq!(broth.name, "Broth");
  assert_eq!(veg.name, "Vegetables");

  assert_eq!(count(&s, "ingredient").await, 3);
  assert_eq!(count(&s, "component_of").await, 2);
  assert_eq!(count(&s, "recipe").await, 1);
  assert_eq!(count(&s, "recipe_created").await, 1);
  assert_eq!(count(&s, "recipe_last_updated").await, 1);

  assert_eq!(
    edges(&s).await,
    vec![(id_of(broth).0, id_of(root).0), (id_of(veg).0, id_of(root).0)]
  );

  let recipe_id = saved.recipe_id.unwrap();
  let ids = s.recipe_ingredients(recipe_id).await.unwrap();
  assert_eq!(ids, BTreeSet::from([id_of(root), id_of(broth), id_of(veg)]));
  assert_eq!(saved.ingredient_ids(), Some(ids));

  assert!(s.orphaned_ingredients().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_recipe_hydrates_root_tree() {
  let s = store().await;
  let (saved, _) = s.save_recipe(stew()).await.unwrap();

  let fetched = s.get_recipe(saved.recipe_id.unwrap()).await.unwrap();
  assert_eq!(fetched, saved);
  assert_eq!(fetched.cook_time, 90);
  assert_eq!(fetched.quantity, 4);
}

// ─── Composition graph ───────────────────────────────────────────────────────

#[tokio::test]
async fn saved_tree_loads_back_identically() {
  let s = store().await;
  let tree = Ingredient::new("Lasagne", "Layer and bake")
    .with_component(
      Ingredient::new("Ragu", "Brown then braise")
        .with_component(Ingredient::new("Soffritto", "Sweat slowly"))
        .with_component(Ingredient::new("Tomato", "Crush")),
    )
    .with_component(
      Ingredient::new("Bechamel", "Whisk into milk")
        .with_component(Ingredient::new("Roux", "Cook flour in butter")),
    )
    .with_component(Ingredient::new("Pasta sheets", "Roll thin"));

  let saved = s.save_ingredient(tree.clone()).await.unwrap();
  assert_eq!(saved.node_count(), tree.node_count());
  assert_eq!(saved.ids().len(), 7);

  let loaded = s.get_ingredient(id_of(&saved)).await.unwrap();
  assert_eq!(loaded, saved);
  assert_eq!(loaded.components[0].components[1].name, "Tomato");
  assert_eq!(loaded.components[1].components[0].instruction, "Cook flour in butter");
}

#[tokio::test]
async fn loading_a_component_returns_its_subtree_only() {
  let s = store().await;
  let saved = s.save_ingredient(chain(&["Pie", "Filling", "Apples"])).await.unwrap();

  let filling = s.get_ingredient(id_of(&saved.components[0])).await.unwrap();
  assert_eq!(filling.name, "Filling");
  assert_eq!(filling.components.len(), 1);
  assert_eq!(filling.components[0].name, "Apples");
}

#[tokio::test]
async fn resaving_a_tree_adds_no_edges_or_rows() {
  let s = store().await;
  let first = s.save_ingredient(chain(&["A", "B", "C", "D"])).await.unwrap();
  let edges_after_first = count(&s, "component_of").await;
  assert_eq!(edges_after_first, 3);

  let second = s.save_ingredient(first.clone()).await.unwrap();
  assert_eq!(second, first);
  assert_eq!(count(&s, "component_of").await, edges_after_first);
  assert_eq!(count(&s, "ingredient").await, 4);
}

#[tokio::test]
async fn resave_overwrites_row_fields_in_place() {
  let s = store().await;
  let mut saved = s.save_ingredient(chain(&["Bread", "Dough"])).await.unwrap();
  let dough_id = id_of(&saved.components[0]);

  saved.components[0].instruction = "Knead for ten minutes".into();
  let resaved = s.save_ingredient(saved).await.unwrap();
  assert_eq!(id_of(&resaved.components[0]), dough_id);

  let dough = s.get_ingredient(dough_id).await.unwrap();
  assert_eq!(dough.instruction, "Knead for ten minutes");
  assert_eq!(count(&s, "ingredient").await, 2);
}

#[tokio::test]
async fn new_component_added_to_persisted_tree_gets_linked() {
  let s = store().await;
  let mut saved = s.save_ingredient(chain(&["Salad", "Lettuce"])).await.unwrap();

  saved.components.push(Ingredient::new("Dressing", "Shake"));
  let resaved = s.save_ingredient(saved).await.unwrap();

  assert!(resaved.components[1].is_persisted());
  assert_eq!(count(&s, "component_of").await, 2);
  let loaded = s.get_ingredient(id_of(&resaved)).await.unwrap();
  assert_eq!(loaded.components.len(), 2);
}

#[tokio::test]
async fn caller_supplied_id_without_row_is_inserted() {
  let s = store().await;
  let tree = Ingredient {
    ingredient_id: Some(IngredientId(42)),
    ..Ingredient::new("Imported", "")
  };

  let saved = s.save_ingredient(tree).await.unwrap();
  assert_eq!(saved.ingredient_id, Some(IngredientId(42)));
  assert_eq!(s.get_ingredient(IngredientId(42)).await.unwrap().name, "Imported");
}

#[tokio::test]
async fn shared_component_appears_under_each_parent() {
  let s = store().await;
  let roux = s.save_ingredient(Ingredient::new("Roux", "Stir")).await.unwrap();

  let tree = Ingredient::new("Dinner", "Serve")
    .with_component(Ingredient::new("Gumbo", "Simmer").with_component(roux.clone()))
    .with_component(Ingredient::new("Gravy", "Reduce").with_component(roux.clone()));

  let saved = s.save_ingredient(tree).await.unwrap();
  assert_eq!(count(&s, "ingredient").await, 4);
  assert_eq!(count(&s, "component_of").await, 4);

  let loaded = s.get_ingredient(id_of(&saved)).await.unwrap();
  assert_eq!(loaded.components[0].components[0], roux);
  assert_eq!(loaded.components[1].components[0], roux);
  assert_eq!(loaded.ids().len(), 4);
}

#[tokio::test]
async fn get_missing_ingredient_is_not_found() {
  let s = store().await;
  let err = s.get_ingredient(IngredientId(404)).await.unwrap_err();
  assert!(err.is_not_found());
  assert!(matches!(
    err,
    Error::Core(CoreError::IngredientNotFound(IngredientId(404)))
  ));
}

#[tokio::test]
async fn deleting_an_ingredient_cascades_its_edges() {
  let s = store().await;
  let saved = s
    .save_ingredient(
      Ingredient::new("Soup", "")
        .with_component(Ingredient::new("Leek", ""))
        .with_component(Ingredient::new("Potato", "")),
    )
    .await
    .unwrap();
  assert_eq!(count(&s, "component_of").await, 2);

  let leek = id_of(&saved.components[0]).0;
  s.conn
    .call(move |conn| {
      conn.execute("DELETE FROM ingredient WHERE ingredient_id = ?1", [leek])?;
      Ok(())
    })
    .await
    .unwrap();

  assert_eq!(count(&s, "component_of").await, 1);
  let soup = s.get_ingredient(id_of(&saved)).await.unwrap();
  assert_eq!(soup.components.len(), 1);
  assert_eq!(soup.components[0].name, "Potato");
}

// ─── Cycles and limits ───────────────────────────────────────────────────────

#[tokio::test]
async fn load_refuses_stored_cycle() {
  let s = store().await;
  exec(
    &s,
    "INSERT INTO ingredient (ingredient_id, ingredient_name) VALUES (1, 'Egg'), (2, 'Chicken');
     INSERT INTO component_of (base_ingredient_id, result_ingredient_id) VALUES (2, 1), (1, 2);",
  )
  .await;

  let err = s.get_ingredient(IngredientId(1)).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::CycleDetected { base: IngredientId(1), result: IngredientId(2) })
  ));
}

#[tokio::test]
async fn load_refuses_self_edge() {
  let s = store().await;
  exec(
    &s,
    "INSERT INTO ingredient (ingredient_id, ingredient_name) VALUES (7, 'Sourdough starter');
     INSERT INTO component_of (base_ingredient_id, result_ingredient_id) VALUES (7, 7);",
  )
  .await;

  let err = s.get_ingredient(IngredientId(7)).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::CycleDetected { .. })));
}

#[tokio::test]
async fn save_refuses_edge_that_closes_a_cycle() {
  let s = store().await;
  let cake = s
    .save_ingredient(Ingredient::new("Cake", "").with_component(Ingredient::new("Batter", "")))
    .await
    .unwrap();

  let mut batter = cake.components[0].clone();
  let mut cake_again = cake.clone();
  cake_again.components.clear();
  batter.components.push(cake_again);

  let err = s.save_ingredient(batter).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::CycleDetected { .. })));
  assert_eq!(count(&s, "component_of").await, 1);
}

#[tokio::test]
async fn save_refuses_ingredient_containing_itself() {
  let s = store().await;
  let jam = s.save_ingredient(Ingredient::new("Jam", "")).await.unwrap();

  let looped = jam.clone().with_component(jam);
  let err = s.save_ingredient(looped).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::CycleDetected { .. })));
  assert_eq!(count(&s, "component_of").await, 0);
}

#[tokio::test]
async fn depth_limit_failure_leaves_no_rows() {
  let s = store()
    .await
    .with_limits(TraversalLimits::default().with_max_depth(2));
  s.save_ingredient(Ingredient::new("Existing", "")).await.unwrap();
  let before = count(&s, "ingredient").await;

  let err = s
    .save_ingredient(chain(&["One", "Two", "Three", "Four"]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DepthExceeded { limit: 2 })));

  assert_eq!(count(&s, "ingredient").await, before);
  assert_eq!(count(&s, "component_of").await, 0);
}

/// Thirty levels of two ingredients each, where both ingredients of every
/// level compose both of the level above: 2^29 root-to-leaf paths over 60
/// rows. Recipe 1 is rooted at ingredient 1, so ingredient 2 is unreachable.
const LADDER: &str = "
  WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 60)
  INSERT INTO ingredient (ingredient_id, ingredient_name)
  SELECT i, 'rung ' || ((i + 1) / 2) FROM n;

  WITH RECURSIVE lvl(l) AS (SELECT 1 UNION ALL SELECT l + 1 FROM lvl WHERE l < 29)
  INSERT INTO component_of (base_ingredient_id, result_ingredient_id)
  SELECT 2 * l + 1 + db, 2 * l - 1 + dr
  FROM lvl
  CROSS JOIN (SELECT 0 AS db UNION ALL SELECT 1)
  CROSS JOIN (SELECT 0 AS dr UNION ALL SELECT 1);

  INSERT INTO recipe (recipe_id, recipe_title, root_ingredient_id) VALUES (1, 'Ladder', 1);
";

#[tokio::test]
async fn reachability_visits_shared_components_once() {
  let s = store().await;
  exec(&s, LADDER).await;
  assert_eq!(count(&s, "component_of").await, 116);

  let reachable = s.recipe_ingredients(RecipeId(1)).await.unwrap();
  assert_eq!(reachable.len(), 59);
  assert!(reachable.contains(&IngredientId(1)));
  assert!(reachable.contains(&IngredientId(60)));
  assert!(!reachable.contains(&IngredientId(2)));

  assert_eq!(s.orphaned_ingredients().await.unwrap(), BTreeSet::from([IngredientId(2)]));
}

#[tokio::test]
async fn reachability_honours_depth_limit() {
  let s = store().await;
  exec(&s, LADDER).await;

  let shallow = s.clone().with_limits(TraversalLimits::default().with_max_depth(10));
  let err = shallow.recipe_ingredients(RecipeId(1)).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DepthExceeded { limit: 10 })));
  assert!(matches!(
    shallow.orphaned_ingredients().await,
    Err(Error::Core(CoreError::DepthExceeded { .. }))
  ));
}

#[tokio::test]
async fn reachability_refuses_stored_cycle() {
  let s = store().await;
  exec(
    &s,
    "INSERT INTO ingredient (ingredient_id, ingredient_name)
       VALUES (1, 'Mother sauce'), (2, 'Stock'), (3, 'Bones');
     INSERT INTO component_of (base_ingredient_id, result_ingredient_id)
       VALUES (2, 1), (3, 2), (2, 3);
     INSERT INTO recipe (recipe_id, recipe_title, root_ingredient_id) VALUES (1, 'Sauce', 1);",
  )
  .await;

  let err = s.recipe_ingredients(RecipeId(1)).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::CycleDetected { base: IngredientId(2), result: IngredientId(3) })
  ));
}

#[tokio::test]
async fn depth_limit_applies_to_loads() {
  let s = store().await;
  let saved = s.save_ingredient(chain(&["One", "Two", "Three"])).await.unwrap();

  let shallow = s.clone().with_limits(TraversalLimits::default().with_max_depth(2));
  let err = shallow.get_ingredient(id_of(&saved)).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DepthExceeded { .. })));
  assert!(shallow.get_ingredient(id_of(&saved.components[0])).await.is_ok());
}

#[tokio::test]
async fn failing_third_node_rolls_back_whole_recipe() {
  let s = store().await;
  exec(
    &s,
    "CREATE TRIGGER fail_third BEFORE INSERT ON ingredient
     WHEN NEW.ingredient_name = 'Three'
     BEGIN SELECT RAISE(ABORT, 'forced failure'); END;",
  )
  .await;

  let recipe = Recipe::new("Doomed").with_root(chain(&["One", "Two", "Three", "Four"]));
  let err = s.save_recipe(recipe).await.unwrap_err();
  assert!(matches!(err, Error::ConstraintViolation(_)));

  assert_eq!(count(&s, "ingredient").await, 0);
  assert_eq!(count(&s, "component_of").await, 0);
  assert_eq!(count(&s, "recipe").await, 0);
  assert_eq!(count(&s, "recipe_created").await, 0);
}

#[tokio::test]
async fn expired_deadline_fails_before_writing() {
  let s = store()
    .await
    .with_limits(TraversalLimits::default().with_timeout(Duration::ZERO));

  let err = s.save_ingredient(chain(&["Slow", "Slower"])).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DeadlineExceeded)));
  assert_eq!(count(&s, "ingredient").await, 0);
}

// ─── Recipes ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn recipe_without_root_has_no_ingredients() {
  let s = store().await;
  let (saved, _) = s.save_recipe(Recipe::new("Water")).await.unwrap();
  let id = saved.recipe_id.unwrap();

  let fetched = s.get_recipe(id).await.unwrap();
  assert!(fetched.root_ingredient.is_none());
  assert!(fetched.root_ingredient_id.is_none());
  assert!(s.recipe_ingredients(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn recipe_referencing_missing_root_is_rejected() {
  let s = store().await;
  let recipe = Recipe {
    root_ingredient_id: Some(IngredientId(999)),
    ..Recipe::new("Ghost")
  };

  let err = s.save_recipe(recipe).await.unwrap_err();
  assert!(matches!(err, Error::ConstraintViolation(_)));
  assert_eq!(count(&s, "recipe").await, 0);
  assert_eq!(count(&s, "recipe_last_updated").await, 0);
}

#[tokio::test]
async fn get_missing_recipe_is_not_found() {
  let s = store().await;
  let err = s.get_recipe(RecipeId(1)).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::RecipeNotFound(RecipeId(1)))));
  assert!(s.recipe_ingredients(RecipeId(1)).await.unwrap_err().is_not_found());
  assert!(s.recipe_timestamps(RecipeId(1)).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn list_recipes_returns_rows_without_trees() {
  let s = store().await;
  s.save_recipe(stew()).await.unwrap();
  s.save_recipe(Recipe::new("Toast")).await.unwrap();

  let all = s.list_recipes().await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all[0].title, "Stew");
  assert_eq!(all[1].title, "Toast");
  assert!(all[0].root_ingredient_id.is_some());
  assert!(all.iter().all(|r| r.root_ingredient.is_none()));

  // A listed row names its root but cannot flatten a tree it does not carry.
  assert_eq!(all[0].ingredient_ids(), None);
  assert_eq!(all[1].ingredient_ids(), Some(BTreeSet::new()));
  let stored = s.recipe_ingredients(all[0].recipe_id.unwrap()).await.unwrap();
  assert_eq!(stored.len(), 3);
}

#[tokio::test]
async fn recipe_can_share_an_existing_root() {
  let s = store().await;
  let root = s.save_ingredient(Ingredient::new("Rice", "Steam")).await.unwrap();

  let recipe = Recipe {
    root_ingredient_id: root.ingredient_id,
    ..Recipe::new("Plain rice")
  };
  let (saved, _) = s.save_recipe(recipe).await.unwrap();

  let fetched = s.get_recipe(saved.recipe_id.unwrap()).await.unwrap();
  assert_eq!(fetched.root_ingredient, Some(root));
}

// ─── Temporal facts ──────────────────────────────────────────────────────────

#[tokio::test]
async fn created_fact_written_once_updated_fact_overwritten() {
  let s = store().await;
  let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
  let t2 = Utc.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).unwrap();

  let (saved, outcome) = s.save_recipe_at(stew(), t1).await.unwrap();
  assert_eq!(outcome, UpsertOutcome::Inserted);
  let id = saved.recipe_id.unwrap();

  let facts = s.recipe_timestamps(id).await.unwrap();
  assert_eq!(facts.created, Some(t1));
  assert_eq!(facts.updated, Some(t1));

  let (_, outcome) = s.save_recipe_at(saved, t2).await.unwrap();
  assert_eq!(outcome, UpsertOutcome::Updated);

  let facts = s.recipe_timestamps(id).await.unwrap();
  assert_eq!(facts.created, Some(t1));
  assert_eq!(facts.updated, Some(t2));
  assert_eq!(count(&s, "recipe_created").await, 1);
  assert_eq!(count(&s, "recipe_last_updated").await, 1);
}

#[tokio::test]
async fn saving_under_unknown_recipe_id_inserts_and_records_creation() {
  let s = store().await;
  let recipe = Recipe {
    recipe_id: Some(RecipeId(77)),
    ..Recipe::new("Porridge")
  };

  let (saved, outcome) = s.save_recipe(recipe).await.unwrap();
  assert_eq!(outcome, UpsertOutcome::Inserted);
  assert_eq!(saved.recipe_id, Some(RecipeId(77)));
  assert!(s.recipe_timestamps(RecipeId(77)).await.unwrap().created.is_some());
}

#[tokio::test]
async fn second_created_fact_is_a_constraint_violation() {
  let s = store().await;
  let (saved, _) = s.save_recipe(Recipe::new("Once")).await.unwrap();
  let id = saved.recipe_id.unwrap();

  let result = s
    .conn
    .call(move |conn| {
      let tx = conn.transaction()?;
      Ok(crate::temporal::record_created(&tx, id, Utc::now()))
    })
    .await
    .unwrap();
  assert!(matches!(result, Err(Error::ConstraintViolation(_))));
}

// ─── Orphans and deletion ────────────────────────────────────────────────────

#[tokio::test]
async fn orphaned_lists_only_unreachable_ingredients() {
  let s = store().await;
  let (saved, _) = s.save_recipe(stew()).await.unwrap();
  let loose = s.save_ingredient(Ingredient::new("Garnish", "")).await.unwrap();
  let loose_tree = s.save_ingredient(chain(&["Jus", "Drippings"])).await.unwrap();

  let orphans = s.orphaned_ingredients().await.unwrap();
  let mut expected = loose_tree.ids();
  expected.insert(id_of(&loose));
  assert_eq!(orphans, expected);

  for reachable in saved.ingredient_ids().unwrap() {
    assert!(!orphans.contains(&reachable));
  }
}

#[tokio::test]
async fn ingredient_reachable_through_any_recipe_is_not_orphaned() {
  let s = store().await;
  let shared = s.save_ingredient(Ingredient::new("Stock", "")).await.unwrap();

  let (first, _) = s
    .save_recipe(Recipe::new("Risotto").with_root(
      Ingredient::new("Risotto base", "").with_component(shared.clone()),
    ))
    .await
    .unwrap();
  s.save_recipe(Recipe::new("Soup").with_root(
    Ingredient::new("Soup base", "").with_component(shared.clone()),
  ))
  .await
  .unwrap();

  s.delete_recipe(first.recipe_id.unwrap()).await.unwrap();

  let orphans = s.orphaned_ingredients().await.unwrap();
  assert_eq!(orphans, BTreeSet::from([first.root_ingredient_id.unwrap()]));
  assert!(!orphans.contains(&id_of(&shared)));
}

#[tokio::test]
async fn deleting_a_recipe_keeps_and_orphans_its_tree() {
  let s = store().await;
  let (saved, _) = s.save_recipe(stew()).await.unwrap();
  let id = saved.recipe_id.unwrap();

  s.delete_recipe(id).await.unwrap();

  assert_eq!(count(&s, "recipe").await, 0);
  assert_eq!(count(&s, "recipe_created").await, 0);
  assert_eq!(count(&s, "recipe_last_updated").await, 0);
  assert_eq!(count(&s, "ingredient").await, 3);
  assert_eq!(Some(s.orphaned_ingredients().await.unwrap()), saved.ingredient_ids());

  assert!(s.get_recipe(id).await.unwrap_err().is_not_found());
  assert!(s.delete_recipe(id).await.unwrap_err().is_not_found());
}

// ─── Transactions ────────────────────────────────────────────────────────────

#[tokio::test]
async fn failure_to_begin_is_a_transaction_error() {
  let s = store().await;
  exec(&s, "BEGIN").await;

  assert!(matches!(s.list_recipes().await, Err(Error::Transaction(_))));
  assert!(matches!(s.save_recipe(stew()).await, Err(Error::Transaction(_))));

  exec(&s, "ROLLBACK").await;
  assert!(s.list_recipes().await.unwrap().is_empty());
}

#[tokio::test]
async fn schema_creation_is_idempotent() {
  let s = store().await;
  s.save_recipe(stew()).await.unwrap();
  s.create_schema().await.unwrap();
  assert_eq!(count(&s, "recipe").await, 1);
}
