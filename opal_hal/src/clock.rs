//! System clock resource.

use std::time::SystemTime;

use crate::error::ResourceError;

/// The system clock, exposed as a read-only variable.
///
/// `refresh` samples the wall clock and hands out an owned timestamp;
/// the representation does not allocate, so the call never fails in
/// practice. The `Result` keeps the resource contract uniform with the
/// other hardware resources.
#[derive(Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create the clock resource.
    pub fn new() -> Self {
        Self
    }

    /// Sample the current instant.
    pub fn refresh(&self) -> Result<SystemTime, ResourceError> {
        Ok(SystemTime::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_moves_forward() {
        let clock = SystemClock::new();
        let a = clock.refresh().unwrap();
        let b = clock.refresh().unwrap();
        assert!(b >= a);
    }
}
