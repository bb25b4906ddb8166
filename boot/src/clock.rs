/// Clock collaborator: monotonic seconds for the prompt timeout, and a
/// human-readable time of day for `time`.
use core::fmt;

pub trait Clock {
    /// Seconds since the loader started. Never goes backwards.
    fn secs(&self) -> u64;

    /// Write the current date and time (no trailing newline).
    fn write_time(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}
