//! Sources of arena memory: the growth primitive behind the allocator.

use std::ptr::{self, NonNull};

use crate::{align::ALIGNMENT, config::ArenaConfig};

/// A monotonically growing region of raw memory.
///
/// # Safety
///
/// Implementors must guarantee that a successful [`grow`](Self::grow) returns
/// the mark as it was right before the call, that the `delta` bytes from there
/// on are valid for reads and writes, and that no memory handed out ever moves
/// or is reclaimed while the source is alive. The source performs no zeroing.
pub unsafe trait ArenaSource {
  /// Current end of the region. Has no side effects.
  fn high_water_mark(&self) -> *mut u8;

  /// Extends the region by `delta` bytes and returns the previous end, or
  /// `None` if the request cannot be satisfied.
  fn grow(
    &mut self,
    delta: usize,
  ) -> Option<NonNull<u8>>;
}

/// The process data segment, extended with `sbrk(2)`.
#[cfg(unix)]
#[derive(Debug)]
pub struct Sbrk {
  _private: (),
}

#[cfg(unix)]
impl Sbrk {
  /// # Safety
  ///
  /// Nothing else in the process may move the program break for as long as
  /// this value is in use. In practice that means the allocator owning it is
  /// the process's global allocator, and only one such allocator exists.
  pub const unsafe fn new() -> Self {
    Self { _private: () }
  }
}

#[cfg(unix)]
unsafe impl ArenaSource for Sbrk {
  fn high_water_mark(&self) -> *mut u8 {
    unsafe { libc::sbrk(0).cast() }
  }

  fn grow(
    &mut self,
    delta: usize,
  ) -> Option<NonNull<u8>> {
    let increment = libc::intptr_t::try_from(delta).ok()?;

    let previous = unsafe { libc::sbrk(increment) };

    if previous == usize::MAX as *mut libc::c_void {
      return None;
    }

    NonNull::new(previous.cast())
  }
}

/// A fixed-capacity heap buffer with a simulated program break.
///
/// The whole capacity is reserved up front, so addresses handed out stay put
/// while the break moves forward.
pub struct BufferArena {
  base: NonNull<usize>,
  words: usize,
  brk: usize,
}

// The buffer is exclusively owned; the raw base pointer is never shared.
unsafe impl Send for BufferArena {}

impl BufferArena {
  /// Reserves `capacity` bytes, rounded down to a whole number of words.
  pub fn new(capacity: usize) -> Self {
    let words = capacity / ALIGNMENT;
    let buffer: Box<[usize]> = vec![0usize; words].into_boxed_slice();
    let base = NonNull::new(Box::into_raw(buffer).cast::<usize>()).unwrap_or(NonNull::dangling());

    Self { base, words, brk: 0 }
  }

  pub fn from_config(config: &ArenaConfig) -> Self {
    Self::new(config.capacity)
  }

  /// Total bytes the break may advance to.
  pub fn capacity(&self) -> usize {
    self.words * ALIGNMENT
  }

  /// Bytes handed out so far.
  pub fn len(&self) -> usize {
    self.brk
  }

  pub fn is_empty(&self) -> bool {
    self.brk == 0
  }
}

unsafe impl ArenaSource for BufferArena {
  fn high_water_mark(&self) -> *mut u8 {
    self.base.as_ptr().cast::<u8>().wrapping_add(self.brk)
  }

  fn grow(
    &mut self,
    delta: usize,
  ) -> Option<NonNull<u8>> {
    let end = self.brk.checked_add(delta)?;
    if end > self.capacity() {
      return None;
    }

    let previous = self.high_water_mark();
    self.brk = end;

    NonNull::new(previous)
  }
}

impl Drop for BufferArena {
  fn drop(&mut self) {
    let slice = ptr::slice_from_raw_parts_mut(self.base.as_ptr(), self.words);
    drop(unsafe { Box::from_raw(slice) });
  }
}

impl std::fmt::Debug for BufferArena {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    f.debug_struct("BufferArena")
      .field("base", &self.base)
      .field("capacity", &self.capacity())
      .field("len", &self.brk)
      .finish()
  }
}
