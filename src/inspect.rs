//! Read-only views over the block list.

use std::fmt;

use crate::{
  arena::ArenaSource,
  block::{BlockHeader, HEADER_SIZE, Tag},
  error::InvariantViolation,
  first_fit::FirstFitAllocator,
};

/// One block as seen by a walk over the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
  /// Byte offset of the header from the arena origin.
  pub offset: usize,
  /// Address of the header.
  pub address: *mut u8,
  /// Payload capacity, header excluded.
  pub size: usize,
  pub free: bool,
  pub tag: Tag,
}

/// Totals over every block in the arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
  pub blocks: usize,
  pub free_blocks: usize,
  /// Payload bytes held by callers.
  pub used_bytes: usize,
  /// Payload bytes available for reuse.
  pub free_bytes: usize,
  /// Headers and payloads together; equals the arena length.
  pub arena_bytes: usize,
}

/// Iterator over blocks in arena order. Stops early at an unrecognised tag.
pub struct Blocks<'a, S> {
  allocator: &'a FirstFitAllocator<S>,
  next: Option<usize>,
}

impl<S: ArenaSource> Iterator for Blocks<'_, S> {
  type Item = BlockInfo;

  fn next(&mut self) -> Option<Self::Item> {
    let offset = self.next.take()?;
    let address = self.allocator.header_ptr(offset);

    let tag = Tag::from_raw(unsafe { BlockHeader::read_tag(address) })?;
    let header = self.allocator.header(offset);

    self.next = header.next();

    Some(BlockInfo {
      offset,
      address,
      size: header.size,
      free: header.free,
      tag,
    })
  }
}

impl<S: ArenaSource> FirstFitAllocator<S> {
  pub fn blocks(&self) -> Blocks<'_, S> {
    Blocks {
      allocator: self,
      next: self.first(),
    }
  }

  pub fn stats(&self) -> ArenaStats {
    self.blocks().fold(ArenaStats::default(), |mut stats, block| {
      stats.blocks += 1;
      stats.arena_bytes += HEADER_SIZE + block.size;

      if block.free {
        stats.free_blocks += 1;
        stats.free_bytes += block.size;
      } else {
        stats.used_bytes += block.size;
      }

      stats
    })
  }

  /// Walks the list from the origin and reports the first structural defect.
  pub fn check(&self) -> Result<(), InvariantViolation> {
    let arena_len = self.arena_len();

    let mut current = self.first();
    let mut previous = 0;
    let mut previous_free = None;
    let mut end = 0;

    while let Some(offset) = current {
      if offset != end {
        return Err(InvariantViolation::Gap {
          offset: previous,
          next: offset,
          expected: end,
        });
      }

      if offset + HEADER_SIZE > arena_len {
        return Err(InvariantViolation::TruncatedTail { end: offset + HEADER_SIZE, arena_len });
      }

      let raw = unsafe { BlockHeader::read_tag(self.header_ptr(offset)) };
      let Some(tag) = Tag::from_raw(raw) else {
        return Err(InvariantViolation::UnknownTag { offset, raw });
      };

      let header = self.header(offset);

      if header.free == tag.is_allocated() {
        return Err(InvariantViolation::StateMismatch {
          offset,
          tag,
          free: header.free,
        });
      }

      if header.free {
        if let Some(first) = previous_free {
          return Err(InvariantViolation::AdjacentFree { first, second: offset });
        }
      }

      previous_free = header.free.then_some(offset);
      end = offset.saturating_add(HEADER_SIZE).saturating_add(header.size);

      if end > arena_len {
        return Err(InvariantViolation::TruncatedTail { end, arena_len });
      }

      previous = offset;
      current = header.next();
    }

    if end != arena_len {
      return Err(InvariantViolation::TruncatedTail { end, arena_len });
    }

    Ok(())
  }
}

impl<S: ArenaSource> fmt::Debug for FirstFitAllocator<S> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    #[derive(Debug)]
    #[allow(dead_code)]
    struct Block {
      offset: usize,
      size: usize,
      free: bool,
      tag: Tag,
    }

    f.debug_list()
      .entries(self.blocks().map(|block| Block {
        offset: block.offset,
        size: block.size,
        free: block.free,
        tag: block.tag,
      }))
      .finish()
  }
}
