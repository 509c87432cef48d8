//! Bounds applied to every composition-tree walk.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default maximum nesting depth; the root counts as depth 1.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Limits honoured between node steps of a load or save.
///
/// The deadline is `timeout` after the start of each top-level call. It is
/// checked before each node is read or written, never mid-row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalLimits {
  pub max_depth: usize,
  pub timeout:   Option<Duration>,
}

impl Default for TraversalLimits {
  fn default() -> Self { Self { max_depth: DEFAULT_MAX_DEPTH, timeout: None } }
}

impl TraversalLimits {
  pub fn with_max_depth(mut self, max_depth: usize) -> Self {
    self.max_depth = max_depth;
    self
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }
}
