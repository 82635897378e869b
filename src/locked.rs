use std::{
  alloc::{GlobalAlloc, Layout},
  ptr::{self, NonNull},
  sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{align::ALIGNMENT, arena::ArenaSource, first_fit::FirstFitAllocator};

/// Puts an allocator behind one lock covering search, split, growth and
/// coalescing together.
///
/// Block boundaries move during a split, so there is no finer-grained lock
/// that stays correct.
#[derive(Debug)]
pub struct Locked<A> {
  inner: Mutex<A>,
}

impl<A> Locked<A> {
  pub const fn new(inner: A) -> Self {
    Self {
      inner: Mutex::new(inner),
    }
  }

  /// A panic while holding the lock leaves the list as the panicking
  /// operation found it, so a poisoned lock is taken over as is.
  pub fn lock(&self) -> MutexGuard<'_, A> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn into_inner(self) -> A {
    self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
  }
}

/// Lets a locked allocator serve as `#[global_allocator]`.
///
/// Layouts aligned beyond one word are refused with a null pointer. Any
/// installed `log` backend must not allocate, or logging from inside the
/// allocator re-enters the lock.
unsafe impl<S: ArenaSource + Send> GlobalAlloc for Locked<FirstFitAllocator<S>> {
  unsafe fn alloc(
    &self,
    layout: Layout,
  ) -> *mut u8 {
    if layout.align() > ALIGNMENT {
      return ptr::null_mut();
    }

    self
      .lock()
      .allocate(layout.size())
      .map_or(ptr::null_mut(), NonNull::as_ptr)
  }

  unsafe fn dealloc(
    &self,
    ptr: *mut u8,
    _layout: Layout,
  ) {
    unsafe { self.lock().release(ptr) }
  }

  unsafe fn alloc_zeroed(
    &self,
    layout: Layout,
  ) -> *mut u8 {
    if layout.align() > ALIGNMENT {
      return ptr::null_mut();
    }

    self
      .lock()
      .zero_allocate(1, layout.size())
      .map_or(ptr::null_mut(), NonNull::as_ptr)
  }

  unsafe fn realloc(
    &self,
    ptr: *mut u8,
    layout: Layout,
    new_size: usize,
  ) -> *mut u8 {
    if layout.align() > ALIGNMENT {
      return ptr::null_mut();
    }

    unsafe { self.lock().resize(ptr, new_size) }.map_or(ptr::null_mut(), NonNull::as_ptr)
  }
}
