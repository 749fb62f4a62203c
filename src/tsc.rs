//! Cycle counter
//!
//! Reads the time-stamp counter on x86-64. Elsewhere nanoseconds from a
//! monotonic clock stand in for cycles.

#[cfg(not(target_arch = "x86_64"))]
use std::time::Instant;

#[derive(Debug)]
pub struct CycleCounter {
    #[cfg(target_arch = "x86_64")]
    start: u64,
    #[cfg(not(target_arch = "x86_64"))]
    start: Instant,
    elapsed: u64,
}

impl Default for CycleCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleCounter {
    pub fn new() -> Self {
        Self {
            #[cfg(target_arch = "x86_64")]
            start: 0,
            #[cfg(not(target_arch = "x86_64"))]
            start: Instant::now(),
            elapsed: 0,
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[inline(always)]
    fn now() -> u64 {
        // SAFETY: rdtsc is available on every x86-64 CPU
        unsafe { std::arch::x86_64::_rdtsc() }
    }

    #[inline(always)]
    pub fn start(&mut self) {
        #[cfg(target_arch = "x86_64")]
        {
            self.start = Self::now();
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            self.start = Instant::now();
        }
    }

    #[inline(always)]
    pub fn stop(&mut self) {
        #[cfg(target_arch = "x86_64")]
        {
            self.elapsed = Self::now().saturating_sub(self.start);
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            self.elapsed = self.start.elapsed().as_nanos() as u64;
        }
    }

    /// Cycles between the last `start` and `stop`
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.elapsed
    }
}
