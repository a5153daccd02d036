//! High-resolution monotonic clock.
//!
//! Tick values are only meaningful relative to each other within one
//! process. Use [`ticks_per_second`] to convert a difference to time.

use std::time::Duration;

/// Current tick count. Never decreases.
#[cfg(target_os = "windows")]
pub fn now() -> u64 {
    use windows::Win32::System::Performance::QueryPerformanceCounter;

    let mut ticks = 0i64;
    // SAFETY: `ticks` is a valid out pointer. The call cannot fail on
    // Windows XP and later.
    let _ = unsafe { QueryPerformanceCounter(&mut ticks) };
    ticks as u64
}

/// Current tick count. Never decreases.
#[cfg(not(target_os = "windows"))]
pub fn now() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

/// Number of ticks in one second.
#[cfg(target_os = "windows")]
pub fn ticks_per_second() -> u64 {
    use windows::Win32::System::Performance::QueryPerformanceFrequency;

    let mut frequency = 0i64;
    // SAFETY: `frequency` is a valid out pointer.
    let _ = unsafe { QueryPerformanceFrequency(&mut frequency) };
    frequency.max(1) as u64
}

/// Number of ticks in one second.
#[cfg(not(target_os = "windows"))]
pub fn ticks_per_second() -> u64 {
    1_000_000_000
}

/// Convert a tick difference to a [`Duration`].
pub fn ticks_to_duration(ticks: u64) -> Duration {
    let frequency = ticks_per_second();
    let seconds = ticks / frequency;
    let remainder = ticks % frequency;
    let nanos = (u128::from(remainder) * 1_000_000_000 / u128::from(frequency)) as u32;
    Duration::new(seconds, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_monotonic() {
        let mut previous = now();
        for _ in 0..1000 {
            let current = now();
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_ticks_advance_with_time() {
        let start = now();
        std::thread::sleep(Duration::from_millis(5));
        let elapsed = ticks_to_duration(now() - start);
        assert!(elapsed >= Duration::from_millis(4));
    }

    #[test]
    fn test_one_second_of_ticks() {
        assert_eq!(ticks_to_duration(ticks_per_second()), Duration::from_secs(1));
        assert_eq!(ticks_to_duration(0), Duration::ZERO);
    }
}
