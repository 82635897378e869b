//! Allocator configuration parameters.

/// Configuration for an arena and the allocator running on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
  /// Bytes reserved by a [`BufferArena`](crate::BufferArena).
  ///
  /// Default: 1 MiB. Ignored by sources that grow without a fixed cap.
  pub capacity: usize,

  /// Walk the whole block list after every allocate, release and resize,
  /// and panic on the first broken invariant.
  ///
  /// Default: off. Costs a full traversal per operation.
  pub verify: bool,
}

impl ArenaConfig {
  /// Default buffer capacity: 1 MiB.
  pub const DEFAULT_CAPACITY: usize = 1 << 20;

  pub const fn new(capacity: usize) -> Self {
    Self {
      capacity,
      verify: false,
    }
  }

  /// Same configuration with per-operation verification switched on.
  pub const fn verified(mut self) -> Self {
    self.verify = true;
    self
  }
}

impl Default for ArenaConfig {
  fn default() -> Self {
    Self::new(Self::DEFAULT_CAPACITY)
  }
}
