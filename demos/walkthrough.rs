use std::ptr;

use firstfit::{ArenaConfig, BufferArena, FirstFitAllocator};

/// Prints every block in the arena, in address order.
fn print_blocks(
  label: &str,
  allocator: &FirstFitAllocator<BufferArena>,
) {
  let stats = allocator.stats();
  println!(
    "\n[{}] arena = {} bytes, {} blocks ({} free, {} free bytes)",
    label, stats.arena_bytes, stats.blocks, stats.free_blocks, stats.free_bytes
  );

  for block in allocator.blocks() {
    println!(
      "    offset {:>5}  size {:>5}  {:<4}  {:?}",
      block.offset,
      block.size,
      if block.free { "free" } else { "used" },
      block.tag
    );
  }
}

fn main() {
  env_logger::init();

  let config = ArenaConfig::new(64 * 1024).verified();
  let mut allocator = FirstFitAllocator::with_config(BufferArena::from_config(&config), config);

  // 1) Two allocations grow the arena one block at a time.
  let first = allocator.allocate(16).unwrap();
  let second = allocator.allocate(32).unwrap();
  print_blocks("allocate 16 + 32", &allocator);

  // 2) Releasing the first block leaves a hole the next small request fills.
  unsafe { allocator.release(first.as_ptr()) };
  print_blocks("release first", &allocator);

  let reused = allocator.allocate(10).unwrap();
  println!("    reused freed block? {}", reused == first);

  // 3) A large block released and partly reused is split in place.
  let big = allocator.allocate(512).unwrap();
  unsafe { allocator.release(big.as_ptr()) };
  let small = allocator.allocate(40).unwrap();
  print_blocks("split 512 for 40", &allocator);

  // 4) Resizing past capacity moves the data to a new block.
  unsafe { ptr::write_bytes(second.as_ptr(), 0xAB, 32) };
  let moved = unsafe { allocator.resize(second.as_ptr(), 2048) }.unwrap();
  let intact = unsafe { std::slice::from_raw_parts(moved.as_ptr(), 32) }
    .iter()
    .all(|&b| b == 0xAB);
  print_blocks("resize 32 -> 2048", &allocator);
  println!("    contents preserved? {}", intact);

  // 5) Zeroed memory, even when it reuses dirty blocks.
  let zeroed = allocator.zero_allocate(10, 4).unwrap();
  let clean = unsafe { std::slice::from_raw_parts(zeroed.as_ptr(), 40) }
    .iter()
    .all(|&b| b == 0);
  println!("\n[zero_allocate 10 x 4] all zero? {}", clean);

  // 6) Release everything; neighbours merge back together.
  unsafe {
    for ptr in [reused, small, moved, zeroed] {
      allocator.release(ptr.as_ptr());
    }
  }
  print_blocks("release all", &allocator);

  println!("\n{:#?}", allocator);
}
