use std::{mem, ptr};

/// Size in bytes of the metadata prefixed to every payload.
pub const HEADER_SIZE: usize = mem::size_of::<BlockHeader>();

const _: () = assert!(HEADER_SIZE % crate::align::ALIGNMENT == 0);

/// Link value marking the last block of the arena.
const NIL: usize = usize::MAX;

/// Diagnostic marker stamped on every header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Tag {
  /// Appended past the old end of the arena and handed out.
  Grown = 0x1234_5678,
  /// Taken from the free list (split or whole) and handed out.
  Split = 0x7777_7777,
  /// Released, or a remainder carved off by a split.
  Freed = 0x5555_5555,
}

impl Tag {
  pub fn from_raw(raw: u32) -> Option<Self> {
    match raw {
      0x1234_5678 => Some(Self::Grown),
      0x7777_7777 => Some(Self::Split),
      0x5555_5555 => Some(Self::Freed),
      _ => None,
    }
  }

  /// Whether a block carrying this tag is owned by a caller.
  pub fn is_allocated(self) -> bool {
    matches!(self, Self::Grown | Self::Split)
  }
}

/// Header written in-band in front of each payload.
///
/// `next` is a byte offset from the arena origin, never an address, so the
/// list survives without any typed pointer arithmetic.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub(crate) struct BlockHeader {
  pub size: usize,
  next: usize,
  pub free: bool,
  tag: u32,
}

impl BlockHeader {
  pub fn new(
    size: usize,
    free: bool,
    next: Option<usize>,
    tag: Tag,
  ) -> Self {
    Self {
      size,
      next: next.unwrap_or(NIL),
      free,
      tag: tag as u32,
    }
  }

  pub fn next(&self) -> Option<usize> {
    (self.next != NIL).then_some(self.next)
  }

  pub fn set_next(
    &mut self,
    next: Option<usize>,
  ) {
    self.next = next.unwrap_or(NIL);
  }

  pub fn set_tag(
    &mut self,
    tag: Tag,
  ) {
    self.tag = tag as u32;
  }

  /// # Safety
  ///
  /// `at` must be word aligned and point at a header this allocator wrote.
  pub unsafe fn read(at: *const u8) -> Self {
    unsafe { ptr::read(at.cast::<Self>()) }
  }

  /// # Safety
  ///
  /// `at` must be word aligned and valid for `HEADER_SIZE` bytes of writes.
  pub unsafe fn write(
    at: *mut u8,
    header: Self,
  ) {
    unsafe { ptr::write(at.cast::<Self>(), header) }
  }

  /// Reads only the tag word, which is valid for any bit pattern.
  ///
  /// # Safety
  ///
  /// `at` must be word aligned and valid for `HEADER_SIZE` bytes of reads.
  pub unsafe fn read_tag(at: *const u8) -> u32 {
    unsafe { ptr::read(&raw const (*at.cast::<Self>()).tag) }
  }
}
