//! Composition graph store: ingredient trees over the `component_of` table.
//!
//! Both walks are iterative, depth-first, and run entirely inside the caller's
//! transaction. A [`Budget`] is consulted before every node step, so a deep or
//! cyclic graph surfaces as an error instead of exhausting the stack.

use std::{
  collections::{BTreeSet, HashSet},
  time::Instant,
};

use demeter_core::{
  Error as CoreError,
  ingredient::{ComponentEdge, Ingredient, IngredientId},
  limits::TraversalLimits,
  temporal::UpsertOutcome,
};
use rusqlite::{OptionalExtension as _, Transaction, params};

use crate::{Result, encode::RawIngredient};

// ─── Budget ──────────────────────────────────────────────────────────────────

/// [`TraversalLimits`] resolved against the start of one top-level call.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
  max_depth: usize,
  deadline:  Option<Instant>,
}

impl Budget {
  pub fn start(limits: TraversalLimits) -> Self {
    Self {
      max_depth: limits.max_depth,
      deadline:  limits
        .timeout
        .and_then(|timeout| Instant::now().checked_add(timeout)),
    }
  }

  /// Gate for visiting a node at `depth` (the root is depth 1).
  fn step(&self, depth: usize) -> Result<()> {
    if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
      return Err(CoreError::DeadlineExceeded.into());
    }
    if depth > self.max_depth {
      return Err(CoreError::DepthExceeded { limit: self.max_depth }.into());
    }
    Ok(())
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// Read a single ingredient row, without components.
pub fn read_ingredient(tx: &Transaction<'_>, id: IngredientId) -> Result<Ingredient> {
  let sql = format!(
    "SELECT {} FROM ingredient WHERE ingredient_id = ?1",
    RawIngredient::COLUMNS
  );
  tx.query_row(&sql, params![id.0], RawIngredient::from_row)
    .optional()?
    .map(RawIngredient::into_ingredient)
    .ok_or_else(|| CoreError::IngredientNotFound(id).into())
}

/// Ids of the direct components of `result`, in edge insertion order.
fn component_ids(tx: &Transaction<'_>, result: IngredientId) -> Result<Vec<IngredientId>> {
  let mut stmt = tx.prepare_cached(
    "SELECT base_ingredient_id FROM component_of
     WHERE result_ingredient_id = ?1
     ORDER BY rowid",
  )?;
  let ids = stmt
    .query_map(params![result.0], |row| row.get::<_, i64>(0).map(IngredientId))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(ids)
}

/// Every stored ingredient id.
pub fn all_ingredient_ids(tx: &Transaction<'_>) -> Result<BTreeSet<IngredientId>> {
  let mut stmt = tx.prepare("SELECT ingredient_id FROM ingredient")?;
  let ids = stmt
    .query_map([], |row| row.get::<_, i64>(0).map(IngredientId))?
    .collect::<rusqlite::Result<BTreeSet<_>>>()?;
  Ok(ids)
}

/// Insert or overwrite the ingredient's own row. Components are ignored.
///
/// A caller-supplied id with no row behind it is inserted under that id.
pub fn upsert_ingredient(
  tx:         &Transaction<'_>,
  ingredient: &Ingredient,
) -> Result<(IngredientId, UpsertOutcome)> {
  let Some(id) = ingredient.ingredient_id else {
    tx.execute(
      "INSERT INTO ingredient (ingredient_name, ingredient_instruction) VALUES (?1, ?2)",
      params![ingredient.name, ingredient.instruction],
    )?;
    return Ok((IngredientId(tx.last_insert_rowid()), UpsertOutcome::Inserted));
  };

  let updated = tx.execute(
    "UPDATE ingredient SET ingredient_name = ?2, ingredient_instruction = ?3
     WHERE ingredient_id = ?1",
    params![id.0, ingredient.name, ingredient.instruction],
  )?;
  if updated > 0 {
    return Ok((id, UpsertOutcome::Updated));
  }

  tx.execute(
    "INSERT INTO ingredient (ingredient_id, ingredient_name, ingredient_instruction)
     VALUES (?1, ?2, ?3)",
    params![id.0, ingredient.name, ingredient.instruction],
  )?;
  Ok((id, UpsertOutcome::Inserted))
}

/// `true` if `target` is a transitive component of `from`.
fn reaches(tx: &Transaction<'_>, from: IngredientId, target: IngredientId) -> Result<bool> {
  let mut stmt = tx.prepare_cached(
    "WITH RECURSIVE below(id) AS (
       SELECT base_ingredient_id FROM component_of WHERE result_ingredient_id = ?1
       UNION
       SELECT c.base_ingredient_id
       FROM component_of c JOIN below b ON c.result_ingredient_id = b.id
     )
     SELECT EXISTS (SELECT 1 FROM below WHERE id = ?2)",
  )?;
  Ok(stmt.query_row(params![from.0, target.0], |row| row.get(0))?)
}

/// Record `edge`, treating an already-present pair as linked.
///
/// Refuses any edge that would make an ingredient a component of itself,
/// directly or transitively. Returns `true` if a new row was written.
pub fn link_component(tx: &Transaction<'_>, edge: ComponentEdge) -> Result<bool> {
  let ComponentEdge { base_ingredient_id: base, result_ingredient_id: result } = edge;

  if base == result || reaches(tx, base, result)? {
    return Err(CoreError::CycleDetected { base, result }.into());
  }

  let inserted = tx.execute(
    "INSERT INTO component_of (base_ingredient_id, result_ingredient_id)
     VALUES (?1, ?2)
     ON CONFLICT (base_ingredient_id, result_ingredient_id) DO NOTHING",
    params![base.0, result.0],
  )?;
  Ok(inserted > 0)
}

// ─── Load ────────────────────────────────────────────────────────────────────

struct LoadFrame {
  node:    Ingredient,
  pending: std::vec::IntoIter<IngredientId>,
}

impl LoadFrame {
  fn open(tx: &Transaction<'_>, id: IngredientId) -> Result<Self> {
    let node    = read_ingredient(tx, id)?;
    let pending = component_ids(tx, id)?.into_iter();
    Ok(Self { node, pending })
  }

  fn id(&self) -> Option<IngredientId> { self.node.ingredient_id }
}

/// Materialise the ingredient `id` and everything it transitively composes.
///
/// Shared sub-ingredients (a diamond in the graph) appear once per
/// occurrence. An id that reappears on its own root-to-node path is a stored
/// cycle and fails the whole load.
pub fn load(tx: &Transaction<'_>, id: IngredientId, budget: &Budget) -> Result<Ingredient> {
  budget.step(1)?;
  let mut on_path = HashSet::from([id]);
  let mut root    = LoadFrame::open(tx, id)?;
  let mut stack: Vec<LoadFrame> = Vec::new();

  loop {
    let frame = stack.last_mut().unwrap_or(&mut root);

    let Some(child) = frame.pending.next() else {
      let Some(done) = stack.pop() else { break };
      if let Some(done_id) = done.id() {
        on_path.remove(&done_id);
      }
      stack.last_mut().unwrap_or(&mut root).node.components.push(done.node);
      continue;
    };

    let parent = frame.id().unwrap_or(id);
    if !on_path.insert(child) {
      return Err(CoreError::CycleDetected { base: child, result: parent }.into());
    }
    budget.step(stack.len() + 2)?;
    tracing::trace!(ingredient_id = %child, parent_id = %parent, "loading component");
    stack.push(LoadFrame::open(tx, child)?);
  }

  Ok(root.node)
}

// ─── Reachability ────────────────────────────────────────────────────────────

struct WalkFrame {
  id:      IngredientId,
  pending: std::vec::IntoIter<IngredientId>,
}

impl WalkFrame {
  fn open(tx: &Transaction<'_>, id: IngredientId) -> Result<Self> {
    Ok(Self { id, pending: component_ids(tx, id)?.into_iter() })
  }
}

/// Ids of `root` and everything it transitively composes, without building
/// the tree.
///
/// Each ingredient is expanded once however many paths lead to it, so shared
/// sub-ingredients cost one visit. Stored cycles and the budget are enforced
/// as in [`load`].
pub fn reachable_ids(
  tx:     &Transaction<'_>,
  root:   IngredientId,
  budget: &Budget,
) -> Result<BTreeSet<IngredientId>> {
  budget.step(1)?;
  read_ingredient(tx, root)?;

  let mut visited = BTreeSet::new();
  let mut on_path = HashSet::from([root]);
  let mut stack   = vec![WalkFrame::open(tx, root)?];

  while let Some(frame) = stack.last_mut() {
    let parent = frame.id;
    match frame.pending.next() {
      Some(child) if visited.contains(&child) => {}
      Some(child) => {
        if !on_path.insert(child) {
          return Err(CoreError::CycleDetected { base: child, result: parent }.into());
        }
        budget.step(stack.len() + 1)?;
        stack.push(WalkFrame::open(tx, child)?);
      }
      None => {
        on_path.remove(&parent);
        visited.insert(parent);
        stack.pop();
      }
    }
  }

  tracing::trace!(ingredient_id = %root, reachable = visited.len(), "walked components");
  Ok(visited)
}

// ─── Save ────────────────────────────────────────────────────────────────────

struct SaveFrame {
  id:      IngredientId,
  /// The persisted node; components are re-attached as they finish.
  node:    Ingredient,
  pending: std::vec::IntoIter<Ingredient>,
}

impl SaveFrame {
  fn persist(tx: &Transaction<'_>, mut node: Ingredient) -> Result<Self> {
    let pending = std::mem::take(&mut node.components).into_iter();
    let (id, outcome) = upsert_ingredient(tx, &node)?;
    node.ingredient_id = Some(id);
    tracing::trace!(ingredient_id = %id, ?outcome, "saved ingredient row");
    Ok(Self { id, node, pending })
  }
}

/// Persist `tree` pre-order: each row is written before its components, and
/// each component edge after that component's own subtree.
///
/// Returns the persisted tree with every id populated.
pub fn save(tx: &Transaction<'_>, tree: Ingredient, budget: &Budget) -> Result<Ingredient> {
  budget.step(1)?;
  let mut root = SaveFrame::persist(tx, tree)?;
  let mut stack: Vec<SaveFrame> = Vec::new();

  loop {
    let frame = stack.last_mut().unwrap_or(&mut root);

    if let Some(child) = frame.pending.next() {
      budget.step(stack.len() + 2)?;
      stack.push(SaveFrame::persist(tx, child)?);
      continue;
    }

    let Some(done) = stack.pop() else { break };
    let parent = stack.last_mut().unwrap_or(&mut root);
    let edge   = ComponentEdge {
      base_ingredient_id:   done.id,
      result_ingredient_id: parent.id,
    };
    if link_component(tx, edge)? {
      tracing::trace!(base = %done.id, result = %parent.id, "linked component");
    }
    parent.node.components.push(done.node);
  }

  Ok(root.node)
}
