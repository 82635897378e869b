use std::mem;

use crate::block::HEADER_SIZE;

/// The fixed boundary every header and payload lands on: one machine word.
pub const ALIGNMENT: usize = mem::size_of::<usize>();

/// Rounds the given size up to the machine word alignment.
///
/// # Examples
///
/// ```rust
/// use std::mem;
/// use firstfit::align;
///
/// match mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + ::std::mem::size_of::<usize>() - 1) & !(::std::mem::size_of::<usize>() - 1)
  };
}

/// Payload capacity for a request of `size` bytes.
///
/// The header plus payload footprint is rounded up to [`ALIGNMENT`] and the
/// header is taken back out, so the block ends on a word boundary. Returns 0
/// for a zero-byte request.
pub fn payload_size(size: usize) -> usize {
  align!(size + HEADER_SIZE) - HEADER_SIZE
}
