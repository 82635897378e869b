//! Runs the whole process on the first-fit allocator, growing the real
//! program break with `sbrk(2)`.
//!
//! No logger is installed here: logging from inside the global allocator
//! would allocate while the allocator lock is held.

#[cfg(unix)]
mod demo {
  use std::collections::BTreeMap;

  use firstfit::{FirstFitAllocator, Locked, Sbrk};
  use libc::sbrk;

  #[global_allocator]
  static GLOBAL: Locked<FirstFitAllocator<Sbrk>> =
    Locked::new(FirstFitAllocator::new(unsafe { Sbrk::new() }));

  /// Prints the current program break using `sbrk(0)`.
  fn print_program_break(label: &str) {
    println!(
      "[{}] PID = {}, program break (sbrk(0)) = {:?}",
      label,
      std::process::id(),
      unsafe { sbrk(0) },
    );
  }

  pub fn run() {
    print_program_break("start");

    let words: Vec<String> = (0..1000).map(|i| format!("word-{i}")).collect();
    print_program_break("after 1000 strings");

    let mut counts = BTreeMap::new();
    for word in &words {
      *counts.entry(word.len()).or_insert(0usize) += 1;
    }
    drop(words);
    print_program_break("after dropping the strings");

    let reused: Vec<u64> = (0..500).collect();
    print_program_break("after reusing freed blocks");

    let stats = GLOBAL.lock().stats();
    println!(
      "\n{} blocks, {} free, {} bytes in use, arena {} bytes",
      stats.blocks, stats.free_blocks, stats.used_bytes, stats.arena_bytes
    );
    println!("length histogram: {:?}, last value {:?}", counts, reused.last());
  }
}

fn main() {
  #[cfg(unix)]
  demo::run();
}
