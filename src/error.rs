//! Error types surfaced to callers.
//!
//! Only recoverable conditions live here. Corruption of the block list and a
//! moved high-water mark are fatal and panic instead.

use thiserror::Error;

use crate::block::Tag;

/// Why an allocation request produced no memory.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
  /// The arena source refused to grow by the requested number of bytes.
  #[error("arena exhausted: could not grow by {requested} bytes")]
  Exhausted { requested: usize },

  /// The request rounds to an empty payload or cannot be represented.
  #[error("invalid allocation size: {size} bytes")]
  InvalidSize { size: usize },
}

/// A structural defect found while walking the block list.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
  #[error("block at offset {offset} links to {next}, expected {expected}")]
  Gap {
    offset: usize,
    next: usize,
    expected: usize,
  },

  #[error("last block ends at offset {end}, arena high-water mark is {arena_len}")]
  TruncatedTail { end: usize, arena_len: usize },

  #[error("blocks at offsets {first} and {second} are both free")]
  AdjacentFree { first: usize, second: usize },

  #[error("block at offset {offset} carries unknown tag {raw:#x}")]
  UnknownTag { offset: usize, raw: u32 },

  #[error("block at offset {offset} is tagged {tag:?} but free={free}")]
  StateMismatch { offset: usize, tag: Tag, free: bool },
}
