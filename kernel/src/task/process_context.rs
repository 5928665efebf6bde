//! Saved user-mode execution context
//!
//! The trap entry path spills every user register into the process's
//! [`TrapFrame`] and reloads it on the way back to user mode. Signal delivery
//! rewrites this frame to enter a handler; sigreturn restores it.

use crate::syscall::userptr::UserCopy;

/// User registers saved on kernel entry (RISC-V integer register file plus
/// the exception program counter).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct TrapFrame {
    /// Exception program counter (where user mode resumes)
    pub epc: u64,
    pub ra: u64, // Return address
    pub sp: u64, // User stack pointer
    pub gp: u64,
    pub tp: u64,
    pub t0: u64,
    pub t1: u64,
    pub t2: u64,
    pub s0: u64, // Frame pointer
    pub s1: u64,
    pub a0: u64, // Argument 1 / return value
    pub a1: u64, // Argument 2
    pub a2: u64,
    pub a3: u64,
    pub a4: u64,
    pub a5: u64,
    pub a6: u64,
    pub a7: u64, // Syscall number
    pub s2: u64,
    pub s3: u64,
    pub s4: u64,
    pub s5: u64,
    pub s6: u64,
    pub s7: u64,
    pub s8: u64,
    pub s9: u64,
    pub s10: u64,
    pub s11: u64,
    pub t3: u64,
    pub t4: u64,
    pub t5: u64,
    pub t6: u64,
}

// SAFETY: repr(C), all fields u64, no padding.
unsafe impl UserCopy for TrapFrame {}

impl TrapFrame {
    /// Size of the frame in bytes
    pub const SIZE: usize = core::mem::size_of::<Self>();

    /// Fresh frame for a program starting at `entry` with stack `sp`
    pub fn new_user(entry: u64, sp: u64) -> Self {
        TrapFrame {
            epc: entry,
            sp,
            ..TrapFrame::default()
        }
    }

    /// Syscall arguments a0..a2
    #[inline]
    pub fn args(&self) -> [u64; 3] {
        [self.a0, self.a1, self.a2]
    }

    /// Syscall number
    #[inline]
    pub fn syscall_num(&self) -> u64 {
        self.a7
    }

    /// Set the syscall return value
    #[inline]
    pub fn set_return(&mut self, value: u64) {
        self.a0 = value;
    }
}
