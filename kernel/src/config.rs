//! Compile-time kernel configuration used by the signal subsystem.

/// Timer interrupts per second driving the monotonic tick counter.
pub const TICKS_PER_SECOND: u64 = 100;

/// Alignment of the signal frame pushed on the user stack.
pub const SIGNAL_FRAME_ALIGN: u64 = 16;

/// Capacity of the reference run queue.
pub const RUN_QUEUE_CAPACITY: usize = 64;

/// First address above user space. User pointers must stay below it.
pub const USER_SPACE_END: u64 = 0x0000_0040_0000_0000;

/// Top of every process's user stack region.
pub const USER_STACK_TOP: u64 = 0x0000_003f_ffff_f000;

/// Size of every process's user stack region.
pub const USER_STACK_SIZE: usize = 16 * 1024;
