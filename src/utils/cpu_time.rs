//! Processor time consumed by this process.
//!
//! Reported next to wall-clock time in the run summary. Parsers run on
//! blocking threads, so processor time can exceed wall time on multi-core
//! hosts.

use std::time::Duration;

/// Total user plus system CPU time of the current process.
///
/// `None` where the platform offers no `getrusage`, or if the call fails.
pub fn process_cpu_time() -> Option<Duration> {
    imp::process_cpu_time()
}

/// Processor time spent since an earlier [`process_cpu_time`] reading.
pub fn cpu_time_since(start: Option<Duration>) -> Option<Duration> {
    Some(process_cpu_time()?.saturating_sub(start?))
}

#[cfg(unix)]
mod imp {
    use std::time::Duration;

    fn timeval_to_duration(tv: libc::timeval) -> Duration {
        let secs = if tv.tv_sec < 0 { 0 } else { tv.tv_sec as u64 };
        let usec = tv.tv_usec.clamp(0, 999_999) as u64;
        Duration::from_secs(secs) + Duration::from_micros(usec)
    }

    pub fn process_cpu_time() -> Option<Duration> {
        // SAFETY: a zeroed rusage is a valid out-parameter and the return code is checked.
        unsafe {
            let mut usage: libc::rusage = std::mem::zeroed();
            if libc::getrusage(libc::RUSAGE_SELF, &mut usage) != 0 {
                return None;
            }
            Some(timeval_to_duration(usage.ru_utime) + timeval_to_duration(usage.ru_stime))
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use std::time::Duration;

    pub fn process_cpu_time() -> Option<Duration> {
        None
    }
}
