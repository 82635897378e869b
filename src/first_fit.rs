use std::ptr::{self, NonNull};

use log::{debug, trace, warn};

use crate::{
  align::{ALIGNMENT, payload_size},
  arena::ArenaSource,
  block::{BlockHeader, HEADER_SIZE, Tag},
  config::ArenaConfig,
  error::AllocError,
};

/// Outcome of a first-fit scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fit {
  /// Offset of the first free block large enough.
  Found(usize),
  /// Nothing fits; growth appends after `after` (`None` for an empty arena).
  Append { after: Option<usize> },
}

/// A first-fit allocator over a single arena that only ever grows.
///
/// Every block is a header followed by its payload, laid out back to back
/// from the arena origin. Headers link forward by byte offset, so walking
/// from offset 0 reconstructs the whole list.
pub struct FirstFitAllocator<S> {
  source: S,
  origin: NonNull<u8>,
  len: usize,
  verify: bool,
}

// The allocator exclusively owns its arena; nothing else holds the origin.
unsafe impl<S: Send> Send for FirstFitAllocator<S> {}

impl<S: ArenaSource> FirstFitAllocator<S> {
  pub const fn new(source: S) -> Self {
    Self {
      source,
      origin: NonNull::dangling(),
      len: 0,
      verify: false,
    }
  }

  pub const fn with_config(
    source: S,
    config: ArenaConfig,
  ) -> Self {
    Self {
      source,
      origin: NonNull::dangling(),
      len: 0,
      verify: config.verify,
    }
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  /// Address of the first header, once the arena exists.
  pub fn origin(&self) -> Option<NonNull<u8>> {
    (self.len > 0).then_some(self.origin)
  }

  /// Bytes between the origin and the high-water mark.
  pub fn arena_len(&self) -> usize {
    self.len
  }

  /// Allocates at least `size` bytes and returns the payload start.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    if size > isize::MAX as usize {
      return Err(AllocError::InvalidSize { size });
    }

    let payload = payload_size(size);

    if payload == 0 {
      return Err(AllocError::InvalidSize { size });
    }

    let offset = match self.find_free_block(payload) {
      Fit::Found(offset) => {
        self.split(payload, offset);

        let mut header = self.header(offset);
        header.free = false;
        header.set_tag(Tag::Split);
        self.set_header(offset, header);

        offset
      }
      Fit::Append { after } => self.grow(after, payload)?,
    };

    self.verify_if_enabled();

    Ok(self.payload(offset))
  }

  /// Returns a block to the free list and merges it with free neighbours.
  ///
  /// A null pointer is ignored.
  ///
  /// # Panics
  ///
  /// Panics if `ptr` lies outside the arena, is not word aligned, or names a
  /// block that is already free or carries no recognised tag. The check is
  /// best effort: an aligned pointer into the middle of a payload is accepted
  /// if the bytes in front of it happen to look like an allocated header.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or have come from this allocator, and must not be
  /// used after this call.
  pub unsafe fn release(
    &mut self,
    ptr: *mut u8,
  ) {
    if ptr.is_null() {
      return;
    }

    let (offset, mut header) = self.allocated_block(ptr);

    header.free = true;
    header.set_tag(Tag::Freed);
    self.set_header(offset, header);

    debug!("released {} bytes at offset {}", header.size, offset);

    self.coalesce();
    self.verify_if_enabled();
  }

  /// Grows a block to hold `size` bytes, moving it if it has to.
  ///
  /// Blocks are never shrunk: a smaller `size` returns `ptr` unchanged. On
  /// failure the old block is still allocated and untouched.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or an allocated payload from this allocator. If a
  /// new pointer is returned the old one must no longer be used.
  pub unsafe fn resize(
    &mut self,
    ptr: *mut u8,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let Some(old) = NonNull::new(ptr) else {
      return self.allocate(size);
    };

    let (offset, header) = self.allocated_block(ptr);

    if header.size >= size {
      trace!("resize to {} fits in place at offset {}", size, offset);
      return Ok(old);
    }

    let new = self.allocate(size)?;

    unsafe {
      ptr::copy_nonoverlapping(old.as_ptr(), new.as_ptr(), header.size.min(size));
      self.release(old.as_ptr());
    }

    debug!("moved block at offset {} to fit {} bytes", offset, size);

    Ok(new)
  }

  /// Allocates `count * elem_size` bytes, all set to zero.
  pub fn zero_allocate(
    &mut self,
    count: usize,
    elem_size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let size = count
      .checked_mul(elem_size)
      .ok_or(AllocError::InvalidSize { size: count.saturating_mul(elem_size) })?;

    let ptr = self.allocate(size)?;

    unsafe { ptr::write_bytes(ptr.as_ptr(), 0, size) };

    Ok(ptr)
  }

  /// Payload capacity of an allocated block, at least what was requested.
  ///
  /// # Safety
  ///
  /// `ptr` must be an allocated payload from this allocator.
  pub unsafe fn usable_size(
    &self,
    ptr: *mut u8,
  ) -> usize {
    self.allocated_block(ptr).1.size
  }

  fn find_free_block(
    &self,
    size: usize,
  ) -> Fit {
    let mut last = None;
    let mut current = self.first();

    while let Some(offset) = current {
      let header = self.header(offset);

      if header.free && header.size >= size {
        trace!("first fit for {} bytes at offset {}", size, offset);
        return Fit::Found(offset);
      }

      last = Some(offset);
      current = header.next();
    }

    trace!("no free block holds {} bytes", size);

    Fit::Append { after: last }
  }

  /// Appends a new allocated block of `size` payload bytes.
  fn grow(
    &mut self,
    after: Option<usize>,
    size: usize,
  ) -> Result<usize, AllocError> {
    let delta = size + HEADER_SIZE;

    let expected = if self.len == 0 {
      self.aligned_mark()?
    } else {
      self.origin.as_ptr().wrapping_add(self.len)
    };

    let Some(previous) = self.source.grow(delta) else {
      warn!("arena exhausted growing by {} bytes", delta);
      return Err(AllocError::Exhausted { requested: delta });
    };

    assert_eq!(
      previous.as_ptr(),
      expected,
      "arena high-water mark moved outside the allocator"
    );

    if self.len == 0 {
      self.origin = previous;
    }

    let offset = self.len;
    self.len += delta;

    self.set_header(offset, BlockHeader::new(size, false, None, Tag::Grown));

    if let Some(after) = after {
      let mut last = self.header(after);
      last.set_next(Some(offset));
      self.set_header(after, last);
    }

    debug!("grew arena by {} bytes, new block at offset {}", delta, offset);

    Ok(offset)
  }

  /// Pads the source up to the word boundary before the very first block.
  fn aligned_mark(&mut self) -> Result<*mut u8, AllocError> {
    let mark = self.source.high_water_mark();
    let padding = (ALIGNMENT - mark as usize % ALIGNMENT) % ALIGNMENT;

    if padding == 0 {
      return Ok(mark);
    }

    let Some(previous) = self.source.grow(padding) else {
      warn!("arena exhausted aligning the origin by {} bytes", padding);
      return Err(AllocError::Exhausted { requested: padding });
    };

    assert_eq!(
      previous.as_ptr(),
      mark,
      "arena high-water mark moved outside the allocator"
    );

    debug!("padded arena origin by {} bytes", padding);

    Ok(mark.wrapping_add(padding))
  }

  /// Carves a free remainder off the block at `offset`, keeping `size`
  /// payload bytes for the caller.
  fn split(
    &mut self,
    size: usize,
    offset: usize,
  ) {
    let mut block = self.header(offset);

    let leftover = match block.size.checked_sub(size + HEADER_SIZE) {
      Some(leftover) if leftover > 0 => leftover,
      _ => {
        trace!("block at offset {} too small to split for {} bytes", offset, size);
        return;
      }
    };

    let remainder = offset + HEADER_SIZE + size;

    self.set_header(
      remainder,
      BlockHeader::new(leftover, true, block.next(), Tag::Freed),
    );

    block.size = size;
    block.free = false;
    block.set_tag(Tag::Split);
    block.set_next(Some(remainder));
    self.set_header(offset, block);

    debug!(
      "split block at offset {}: kept {} bytes, {} bytes free at offset {}",
      offset, size, leftover, remainder
    );

    self.coalesce();
  }

  /// Merges every run of adjacent free blocks into its first block.
  ///
  /// Returns the number of blocks absorbed.
  pub(crate) fn coalesce(&mut self) -> usize {
    let Some(mut current) = self.first() else {
      return 0;
    };

    let mut header = self.header(current);
    let mut absorbed = 0;

    while let Some(next) = header.next() {
      let next_header = self.header(next);

      if header.free && next_header.free {
        header.size += next_header.size + HEADER_SIZE;
        header.set_next(next_header.next());
        self.set_header(current, header);
        absorbed += 1;
      } else {
        current = next;
        header = next_header;
      }
    }

    if absorbed > 0 {
      debug!("coalesced {} free blocks", absorbed);
    }

    absorbed
  }

  /// Maps a payload pointer to its header, panicking on anything that is not
  /// a live allocation.
  fn allocated_block(
    &self,
    ptr: *mut u8,
  ) -> (usize, BlockHeader) {
    let address = ptr as usize;
    let base = self.origin.as_ptr() as usize;

    assert!(
      self.len > 0 && address >= base + HEADER_SIZE && address < base + self.len,
      "pointer {ptr:?} is outside the arena"
    );

    let offset = address - base - HEADER_SIZE;

    assert!(
      offset % ALIGNMENT == 0,
      "pointer {ptr:?} is not on a block boundary"
    );

    let raw = unsafe { BlockHeader::read_tag(self.header_ptr(offset)) };

    match Tag::from_raw(raw) {
      Some(Tag::Freed) => panic!("double release of block at offset {offset}"),
      Some(_) => {}
      None => panic!("unrecognised block at offset {offset}: tag {raw:#x}"),
    }

    let header = self.header(offset);

    assert!(!header.free, "double release of block at offset {offset}");

    (offset, header)
  }

  fn verify_if_enabled(&self) {
    if !self.verify {
      return;
    }

    if let Err(violation) = self.check() {
      panic!("arena invariant broken: {violation}");
    }
  }

  pub(crate) fn first(&self) -> Option<usize> {
    (self.len > 0).then_some(0)
  }

  pub(crate) fn header_ptr(
    &self,
    offset: usize,
  ) -> *mut u8 {
    self.origin.as_ptr().wrapping_add(offset)
  }

  fn payload(
    &self,
    offset: usize,
  ) -> NonNull<u8> {
    unsafe { self.origin.add(offset + HEADER_SIZE) }
  }

  /// Offsets reaching here come from the list itself or from a checked
  /// pointer, so they always name a header inside the arena.
  pub(crate) fn header(
    &self,
    offset: usize,
  ) -> BlockHeader {
    unsafe { BlockHeader::read(self.header_ptr(offset)) }
  }

  fn set_header(
    &mut self,
    offset: usize,
    header: BlockHeader,
  ) {
    unsafe { BlockHeader::write(self.header_ptr(offset), header) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{arena::BufferArena, inspect::BlockInfo};

  use test_log::test;

  fn new_allocator() -> FirstFitAllocator<BufferArena> {
    let config = ArenaConfig::new(64 * 1024).verified();
    FirstFitAllocator::with_config(BufferArena::from_config(&config), config)
  }

  fn snapshot(allocator: &FirstFitAllocator<BufferArena>) -> Vec<BlockInfo> {
    allocator.blocks().collect()
  }

  #[test]
  fn allocate_returns_aligned_payload_after_header() {
    let mut allocator = new_allocator();

    let ptr = allocator.allocate(13).unwrap();
    let origin = allocator.origin().unwrap();

    assert_eq!(ptr.as_ptr(), origin.as_ptr().wrapping_add(HEADER_SIZE));
    assert_eq!(ptr.as_ptr() as usize % ALIGNMENT, 0);
    assert!(unsafe { allocator.usable_size(ptr.as_ptr()) } >= 13);
    assert_eq!(allocator.arena_len(), HEADER_SIZE + payload_size(13));
  }

  #[test]
  fn zero_size_is_rejected_without_side_effects() {
    let mut allocator = new_allocator();

    assert_eq!(allocator.allocate(0), Err(AllocError::InvalidSize { size: 0 }));
    assert_eq!(allocator.arena_len(), 0);
    assert!(allocator.origin().is_none());
  }

  #[test]
  fn oversized_request_is_invalid() {
    let mut allocator = new_allocator();
    let size = isize::MAX as usize + 1;
    assert_eq!(allocator.allocate(size), Err(AllocError::InvalidSize { size }));
  }

  #[test]
  fn consecutive_allocations_are_contiguous() {
    let mut allocator = new_allocator();

    let first = allocator.allocate(24).unwrap();
    let second = allocator.allocate(8).unwrap();

    assert_eq!(
      second.as_ptr(),
      first.as_ptr().wrapping_add(payload_size(24) + HEADER_SIZE)
    );
  }

  #[test]
  fn writing_full_payload_leaves_neighbours_intact() {
    let mut allocator = new_allocator();

    let sizes = [1, 7, 16, 33, 100];
    let ptrs: Vec<_> = sizes.iter().map(|&size| allocator.allocate(size).unwrap()).collect();

    for (i, (&size, ptr)) in sizes.iter().zip(&ptrs).enumerate() {
      unsafe { ptr::write_bytes(ptr.as_ptr(), 0xA0 + i as u8, size) };
    }

    allocator.check().unwrap();

    for (i, (&size, ptr)) in sizes.iter().zip(&ptrs).enumerate() {
      let bytes = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), size) };
      assert!(bytes.iter().all(|&b| b == 0xA0 + i as u8));
    }
  }

  #[test]
  fn first_fit_reuses_released_block() {
    let mut allocator = new_allocator();

    let first = allocator.allocate(16).unwrap();
    let _second = allocator.allocate(32).unwrap();
    let len = allocator.arena_len();

    unsafe { allocator.release(first.as_ptr()) };

    let third = allocator.allocate(10).unwrap();

    assert_eq!(third, first);
    assert_eq!(allocator.arena_len(), len);
  }

  #[test]
  fn split_leaves_remainder_for_later_requests() {
    let mut allocator = new_allocator();

    let big = allocator.allocate(100).unwrap();
    unsafe { allocator.release(big.as_ptr()) };

    let small = allocator.allocate(10).unwrap();
    assert_eq!(small, big);

    let leftover = payload_size(100) - payload_size(10) - HEADER_SIZE;
    let blocks = snapshot(&allocator);

    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1].offset, HEADER_SIZE + payload_size(10));
    assert_eq!(blocks[1].size, leftover);
    assert!(blocks[1].free);

    let len = allocator.arena_len();
    let reused = allocator.allocate(leftover).unwrap();

    assert_eq!(reused.as_ptr(), small.as_ptr().wrapping_add(payload_size(10) + HEADER_SIZE));
    assert_eq!(allocator.arena_len(), len);
  }

  #[test]
  fn split_boundary_is_a_raw_byte_offset() {
    let cases = [(100, 10), (256, 8), (64, 24), (200, 100), (1000, 1), (4096, 333)];

    for (initial, requested) in cases {
      let mut allocator = new_allocator();

      let block = allocator.allocate(initial).unwrap();
      unsafe { allocator.release(block.as_ptr()) };

      let kept = payload_size(requested);
      let leftover = payload_size(initial) - kept - HEADER_SIZE;
      assert!(leftover > 0);

      let ptr = allocator.allocate(requested).unwrap();
      let blocks = snapshot(&allocator);

      assert_eq!(blocks.len(), 2, "{initial}/{requested}");
      assert_eq!(blocks[0].size, kept);
      assert_eq!(blocks[0].tag, Tag::Split);
      assert!(!blocks[0].free);

      let remainder = &blocks[1];
      assert_eq!(remainder.offset, HEADER_SIZE + kept);
      assert_eq!(remainder.address, ptr.as_ptr().wrapping_add(kept));
      assert_eq!(remainder.size, leftover);
      assert_eq!(remainder.tag, Tag::Freed);
      assert!(remainder.free);
    }
  }

  #[test]
  fn block_without_room_for_a_header_is_handed_over_whole() {
    let mut allocator = new_allocator();

    let block = allocator.allocate(HEADER_SIZE + 16).unwrap();
    let _fence = allocator.allocate(8).unwrap();
    unsafe { allocator.release(block.as_ptr()) };

    let ptr = allocator.allocate(16).unwrap();

    assert_eq!(ptr, block);
    assert_eq!(unsafe { allocator.usable_size(ptr.as_ptr()) }, HEADER_SIZE + 16);
    assert_eq!(snapshot(&allocator).len(), 2);
  }

  #[test]
  fn grows_after_last_block_when_nothing_fits() {
    let mut allocator = new_allocator();

    let _a = allocator.allocate(16).unwrap();
    let b = allocator.allocate(64).unwrap();
    unsafe { allocator.release(b.as_ptr()) };

    let len = allocator.arena_len();
    let c = allocator.allocate(128).unwrap();

    assert_eq!(c.as_ptr(), allocator.origin().unwrap().as_ptr().wrapping_add(len + HEADER_SIZE));

    let blocks = snapshot(&allocator);
    assert_eq!(blocks.len(), 3);
    assert!(blocks[1].free);
    assert_eq!(blocks[2].tag, Tag::Grown);
  }

  #[test]
  fn release_null_is_a_noop() {
    let mut allocator = new_allocator();
    unsafe { allocator.release(ptr::null_mut()) };
    assert_eq!(allocator.arena_len(), 0);

    allocator.allocate(8).unwrap();
    let before = snapshot(&allocator);
    unsafe { allocator.release(ptr::null_mut()) };
    assert_eq!(snapshot(&allocator), before);
  }

  #[test]
  #[should_panic(expected = "double release")]
  fn double_release_is_fatal() {
    let mut allocator = new_allocator();
    let ptr = allocator.allocate(8).unwrap();
    let _fence = allocator.allocate(8).unwrap();

    unsafe {
      allocator.release(ptr.as_ptr());
      allocator.release(ptr.as_ptr());
    }
  }

  #[test]
  #[should_panic(expected = "outside the arena")]
  fn foreign_pointer_is_fatal() {
    let mut allocator = new_allocator();
    allocator.allocate(8).unwrap();

    let mut local = 0u64;
    unsafe { allocator.release((&raw mut local).cast()) };
  }

  #[test]
  #[should_panic(expected = "not on a block boundary")]
  fn interior_pointer_is_fatal() {
    let mut allocator = new_allocator();
    let ptr = allocator.allocate(64).unwrap();
    unsafe { allocator.release(ptr.as_ptr().add(3)) };
  }

  #[test]
  #[should_panic(expected = "unrecognised block")]
  fn aligned_interior_pointer_without_header_is_fatal() {
    let mut allocator = new_allocator();
    let ptr = allocator.allocate(HEADER_SIZE + 32).unwrap();
    let _fence = allocator.allocate(8).unwrap();

    unsafe {
      ptr::write_bytes(ptr.as_ptr(), 0, HEADER_SIZE + 32);
      allocator.release(ptr.as_ptr().add(HEADER_SIZE));
    }
  }

  #[test]
  fn release_merges_both_neighbours() {
    let mut allocator = new_allocator();

    let a = allocator.allocate(16).unwrap();
    let b = allocator.allocate(32).unwrap();
    let c = allocator.allocate(48).unwrap();
    let _d = allocator.allocate(8).unwrap();

    unsafe {
      allocator.release(a.as_ptr());
      allocator.release(c.as_ptr());
    }
    assert_eq!(snapshot(&allocator).len(), 4);

    unsafe { allocator.release(b.as_ptr()) };

    let blocks = snapshot(&allocator);
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].free);
    assert_eq!(blocks[0].size, 16 + 32 + 48 + 2 * HEADER_SIZE);
    assert!(!blocks[1].free);
  }

  #[test]
  fn coalesce_twice_changes_nothing() {
    let mut allocator = new_allocator();

    let ptrs: Vec<_> = (1..=6).map(|i| allocator.allocate(i * 8).unwrap()).collect();
    for ptr in ptrs.iter().step_by(2) {
      unsafe { allocator.release(ptr.as_ptr()) };
    }

    let once = snapshot(&allocator);
    assert_eq!(allocator.coalesce(), 0);
    assert_eq!(allocator.coalesce(), 0);
    assert_eq!(snapshot(&allocator), once);
  }

  #[test]
  fn resize_of_null_allocates() {
    let mut allocator = new_allocator();
    let ptr = unsafe { allocator.resize(ptr::null_mut(), 24) }.unwrap();
    assert!(unsafe { allocator.usable_size(ptr.as_ptr()) } >= 24);
  }

  #[test]
  fn resize_within_capacity_keeps_pointer() {
    let mut allocator = new_allocator();

    let ptr = allocator.allocate(40).unwrap();
    let len = allocator.arena_len();

    assert_eq!(unsafe { allocator.resize(ptr.as_ptr(), 40) }, Ok(ptr));
    assert_eq!(unsafe { allocator.resize(ptr.as_ptr(), 4) }, Ok(ptr));
    assert_eq!(allocator.arena_len(), len);
  }

  #[test]
  fn resize_moves_and_preserves_contents() {
    let mut allocator = new_allocator();

    let ptr = allocator.allocate(16).unwrap();
    let _fence = allocator.allocate(8).unwrap();

    for i in 0..16 {
      unsafe { ptr.as_ptr().add(i).write(i as u8) };
    }

    let moved = unsafe { allocator.resize(ptr.as_ptr(), 200) }.unwrap();
    assert_ne!(moved, ptr);

    let bytes = unsafe { std::slice::from_raw_parts(moved.as_ptr(), 16) };
    assert_eq!(bytes, (0..16).collect::<Vec<u8>>().as_slice());

    let blocks = snapshot(&allocator);
    assert!(blocks[0].free);
    assert!(unsafe { allocator.usable_size(moved.as_ptr()) } >= 200);
  }

  #[test]
  fn failed_resize_keeps_old_block() {
    let config = ArenaConfig::new(256).verified();
    let mut allocator = FirstFitAllocator::with_config(BufferArena::from_config(&config), config);

    let ptr = allocator.allocate(32).unwrap();
    unsafe { ptr::write_bytes(ptr.as_ptr(), 0x5A, 32) };

    let result = unsafe { allocator.resize(ptr.as_ptr(), 1024) };
    assert!(matches!(result, Err(AllocError::Exhausted { .. })));

    let blocks = snapshot(&allocator);
    assert_eq!(blocks.len(), 1);
    assert!(!blocks[0].free);

    let bytes = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), 32) };
    assert!(bytes.iter().all(|&b| b == 0x5A));

    unsafe { allocator.release(ptr.as_ptr()) };
  }

  #[test]
  fn zero_allocate_clears_reused_memory() {
    let mut allocator = new_allocator();

    let dirty = allocator.allocate(40).unwrap();
    let _fence = allocator.allocate(8).unwrap();
    unsafe {
      ptr::write_bytes(dirty.as_ptr(), 0xFF, 40);
      allocator.release(dirty.as_ptr());
    }

    let zeroed = allocator.zero_allocate(10, 4).unwrap();
    assert_eq!(zeroed, dirty);

    let bytes = unsafe { std::slice::from_raw_parts(zeroed.as_ptr(), 40) };
    assert!(bytes.iter().all(|&b| b == 0));
  }

  #[test]
  fn zero_allocate_rejects_empty_and_overflowing_products() {
    let mut allocator = new_allocator();

    assert!(matches!(allocator.zero_allocate(0, 8), Err(AllocError::InvalidSize { .. })));
    assert!(matches!(
      allocator.zero_allocate(usize::MAX, 2),
      Err(AllocError::InvalidSize { .. })
    ));
  }

  #[test]
  fn exhaustion_reports_requested_bytes() {
    let mut allocator = FirstFitAllocator::new(BufferArena::new(128));

    let err = allocator.allocate(512).unwrap_err();
    assert_eq!(err, AllocError::Exhausted { requested: 512 + HEADER_SIZE });
    assert_eq!(allocator.arena_len(), 0);

    allocator.allocate(8).unwrap();
    allocator.check().unwrap();
  }

  #[test]
  fn unaligned_source_is_padded_before_first_block() {
    let mut arena = BufferArena::new(1024);
    arena.grow(3).unwrap();

    let mut allocator = FirstFitAllocator::new(arena);
    let ptr = allocator.allocate(8).unwrap();

    assert_eq!(allocator.origin().unwrap().as_ptr() as usize % ALIGNMENT, 0);
    assert_eq!(ptr.as_ptr() as usize % ALIGNMENT, 0);
    assert_eq!(allocator.source().len(), ALIGNMENT + HEADER_SIZE + 8);
  }

  /// Steals a word from the underlying arena on its second growth.
  struct Interloper {
    inner: BufferArena,
    calls: usize,
  }

  unsafe impl ArenaSource for Interloper {
    fn high_water_mark(&self) -> *mut u8 {
      self.inner.high_water_mark()
    }

    fn grow(
      &mut self,
      delta: usize,
    ) -> Option<NonNull<u8>> {
      if self.calls == 1 {
        self.inner.grow(ALIGNMENT);
      }
      self.calls += 1;
      self.inner.grow(delta)
    }
  }

  #[test]
  #[should_panic(expected = "high-water mark moved")]
  fn foreign_growth_is_fatal() {
    let mut allocator = FirstFitAllocator::new(Interloper {
      inner: BufferArena::new(1024),
      calls: 0,
    });

    allocator.allocate(8).unwrap();
    let _ = allocator.allocate(8);
  }
}
