//! Memory-read transport
//!
//! The core only ever sees [`MemorySource`]: a blocking `read(address, size)`
//! called from the polling thread. Connection handling and retries live here,
//! behind that seam.

pub mod retroarch;
pub mod retry;

pub use retroarch::RetroArchSource;
pub use retry::{ExponentialBackoff, RetryStrategy, RetryingSource};

use crate::domain::{Address, SourceError};

/// Blocking byte-range reader over the monitored process's address space.
///
/// Implementations may be slow and may fail transiently. A successful read is
/// not guaranteed to have the requested length; callers length-check.
pub trait MemorySource {
    /// Read `size` bytes starting at `address`.
    ///
    /// # Errors
    /// Returns an error if the host cannot be reached or rejects the read.
    fn read(&mut self, address: Address, size: usize) -> Result<Vec<u8>, SourceError>;
}

impl<S: MemorySource + ?Sized> MemorySource for Box<S> {
    fn read(&mut self, address: Address, size: usize) -> Result<Vec<u8>, SourceError> {
        (**self).read(address, size)
    }
}
