//! # firstfit - A First-Fit Free-List Allocator
//!
//! This crate provides a general-purpose **first-fit allocator** that carves
//! allocations out of a single arena which only ever grows, by default the
//! process data segment extended with `sbrk(2)`.
//!
//! ## Overview
//!
//! Every allocation is a header followed by its payload. Blocks sit back to
//! back from the arena origin and each header links forward to the next, so
//! the list lives entirely inside the memory it manages:
//!
//! ```text
//!   Arena Layout:
//!
//!   origin                                                      high-water mark
//!   ▼                                                                         ▼
//!   ┌────────┬──────────┬────────┬─────────────────┬────────┬────────────────┐
//!   │ header │ payload  │ header │     payload     │ header │    payload     │
//!   │ used   │          │ free   │                 │ used   │                │
//!   └────────┴──────────┴────────┴─────────────────┴────────┴────────────────┘
//!      │                  ▲  │                        ▲
//!      └── next ──────────┘  └── next ────────────────┘
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   firstfit
//!   ├── align      - Word alignment (align!, payload_size)
//!   ├── arena      - ArenaSource trait, Sbrk, BufferArena
//!   ├── block      - Block header layout and tags
//!   ├── config     - ArenaConfig
//!   ├── error      - AllocError, InvariantViolation
//!   ├── first_fit  - FirstFitAllocator: search, grow, split, coalesce
//!   ├── inspect    - Block walks, stats and invariant checks
//!   └── locked     - Locked wrapper and GlobalAlloc
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use firstfit::{BufferArena, FirstFitAllocator};
//!
//! let mut allocator = FirstFitAllocator::new(BufferArena::new(4096));
//!
//! let ptr = allocator.allocate(64).unwrap();
//! unsafe {
//!     ptr.as_ptr().write_bytes(0xAB, 64);
//!     let ptr = allocator.resize(ptr.as_ptr(), 256).unwrap();
//!     allocator.release(ptr.as_ptr());
//! }
//!
//! assert_eq!(allocator.check(), Ok(()));
//! ```
//!
//! ## How It Works
//!
//! An allocation request is rounded so that header plus payload ends on a
//! word boundary, then:
//!
//! ```text
//!   allocate(n)
//!     │
//!     ├─ first free block with size ≥ n? ──yes──► split off the tail if a
//!     │                                           header still fits, hand
//!     │                                           out the front
//!     └─ no ──► grow the arena by header + n, append after the last block
//!
//!   Splitting a free block of size S for a request of n:
//!
//!   ┌────────┬──────────────────────────────────────────┐
//!   │ header │                 S bytes                  │
//!   └────────┴──────────────────────────────────────────┘
//!                         becomes
//!   ┌────────┬───────────┬────────┬─────────────────────┐
//!   │ header │  n bytes  │ header │  S - n - header     │
//!   │ used   │           │ free   │                     │
//!   └────────┴───────────┴────────┴─────────────────────┘
//!            ▲           ▲
//!            │           └── origin + offset + header + n (in bytes)
//!            └── returned pointer
//! ```
//!
//! Releasing a block marks it free and merges every run of neighbouring free
//! blocks, so no two free blocks are ever adjacent. Memory is never given
//! back to the source.
//!
//! ## Limitations
//!
//! - **Single owner**: wrap in [`Locked`] to share across threads
//! - **Grow only**: the arena is never shrunk
//! - **Word alignment only**: stronger alignment is refused
//! - **One list**: no size classes, every search is linear
//!
//! ## Safety
//!
//! Releasing and resizing take raw pointers and are `unsafe`. Misuse that the
//! allocator can detect (double release, foreign pointers, a high-water mark
//! moved by someone else) panics rather than continue on a damaged list.

pub mod align;
pub mod arena;
mod block;
pub mod config;
pub mod error;
mod first_fit;
mod inspect;
mod locked;

#[cfg(unix)]
pub use arena::Sbrk;
pub use arena::{ArenaSource, BufferArena};
pub use block::{HEADER_SIZE, Tag};
pub use config::ArenaConfig;
pub use error::{AllocError, InvariantViolation};
pub use first_fit::FirstFitAllocator;
pub use inspect::{ArenaStats, BlockInfo, Blocks};
pub use locked::Locked;
