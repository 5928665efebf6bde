//! User memory access for the signal syscalls
//!
//! Every read or write of a process's user memory goes through a
//! [`UserMemory`] implementation held behind the process's address-space
//! lock. Addresses are validated to prevent:
//! - Reading/writing kernel memory via malicious userspace pointers
//! - Dereferencing unmapped addresses
//! - Integer overflow attacks in pointer arithmetic

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::mem::size_of;
use core::ops::Range;

use crate::config::USER_SPACE_END;
use crate::error::SignalError;

/// Plain-old-data types that may be copied byte-for-byte to and from user
/// memory.
///
/// # Safety
/// Implementors must be `repr(C)` or `repr(transparent)`, contain no padding
/// and no pointers or references, and accept every bit pattern.
pub unsafe trait UserCopy: Copy + 'static {
    fn as_bytes(&self) -> &[u8] {
        // SAFETY: the trait contract guarantees Self is padding-free POD.
        unsafe { core::slice::from_raw_parts(self as *const Self as *const u8, size_of::<Self>()) }
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: any bit pattern written through this slice is a valid Self.
        unsafe { core::slice::from_raw_parts_mut(self as *mut Self as *mut u8, size_of::<Self>()) }
    }

    fn zeroed() -> Self {
        // SAFETY: all-zero is a valid bit pattern per the trait contract.
        unsafe { core::mem::zeroed() }
    }
}

// SAFETY: primitive integer.
unsafe impl UserCopy for u64 {}

/// Raw byte copies into and out of one process's user address space.
pub trait UserMemory: Send {
    /// Copy `src` to user address `addr`.
    fn copy_out(&mut self, addr: u64, src: &[u8]) -> Result<(), SignalError>;

    /// Fill `dst` from user address `addr`.
    fn copy_in(&self, addr: u64, dst: &mut [u8]) -> Result<(), SignalError>;

    /// Duplicate the address space for a forked child.
    fn duplicate(&self) -> Box<dyn UserMemory>;
}

/// Validate that `[addr, addr + len)` is a user range
///
/// # Validation Checks
/// 1. Pointer is not null
/// 2. Pointer is within userspace address range
/// 3. Pointer + size doesn't overflow or cross into kernel space
pub fn validate_user_range(addr: u64, len: usize) -> Result<(), SignalError> {
    if addr == 0 || addr >= USER_SPACE_END {
        return Err(SignalError::BadAddress(addr));
    }
    match addr.checked_add(len as u64) {
        Some(end) if end <= USER_SPACE_END => Ok(()),
        _ => Err(SignalError::BadAddress(addr)),
    }
}

/// Copy a value from kernel to userspace
pub fn copy_to_user<T: UserCopy>(
    mm: &mut dyn UserMemory,
    addr: u64,
    value: &T,
) -> Result<(), SignalError> {
    validate_user_range(addr, size_of::<T>())?;
    mm.copy_out(addr, value.as_bytes())
}

/// Copy a value from userspace to kernel
pub fn copy_from_user<T: UserCopy>(mm: &dyn UserMemory, addr: u64) -> Result<T, SignalError> {
    validate_user_range(addr, size_of::<T>())?;
    let mut value = T::zeroed();
    mm.copy_in(addr, value.as_bytes_mut())?;
    Ok(value)
}

/// A single contiguous, writable user region backed by kernel memory.
///
/// Used as the user stack of processes created by the reference process
/// table; any access outside `[base, base + len)` faults.
#[derive(Clone)]
pub struct UserStackMemory {
    base: u64,
    bytes: Vec<u8>,
}

impl UserStackMemory {
    pub fn new(base: u64, size: usize) -> Self {
        UserStackMemory {
            base,
            bytes: vec![0; size],
        }
    }

    /// Region ending at `top`, `size` bytes long
    pub fn below(top: u64, size: usize) -> Self {
        Self::new(top - size as u64, size)
    }

    fn range(&self, addr: u64, len: usize) -> Result<Range<usize>, SignalError> {
        let start = addr
            .checked_sub(self.base)
            .ok_or(SignalError::BadAddress(addr))? as usize;
        let end = start.checked_add(len).ok_or(SignalError::BadAddress(addr))?;
        if end > self.bytes.len() {
            return Err(SignalError::BadAddress(addr));
        }
        Ok(start..end)
    }
}

impl UserMemory for UserStackMemory {
    fn copy_out(&mut self, addr: u64, src: &[u8]) -> Result<(), SignalError> {
        let range = self.range(addr, src.len())?;
        self.bytes[range].copy_from_slice(src);
        Ok(())
    }

    fn copy_in(&self, addr: u64, dst: &mut [u8]) -> Result<(), SignalError> {
        let range = self.range(addr, dst.len())?;
        dst.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn duplicate(&self) -> Box<dyn UserMemory> {
        Box::new(self.clone())
    }
}
