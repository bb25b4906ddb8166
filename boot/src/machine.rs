/// Machine collaborator: everything that leaves the interpreter for good.
///
/// `reboot` never returns. `exec` hands control to the selected kernel and
/// only comes back if the hand-off failed before anything was overwritten.
use core::fmt;

use crate::cmd::howto::BootHowto;
use crate::fs::FsError;
use crate::param::PathString;

/// What the shell decided to boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootRequest {
    /// Fully qualified `device:path` of the kernel image.
    pub path: PathString,
    /// Boot-mode flags handed to the kernel.
    pub howto: BootHowto,
    /// Load address set with `set addr`.
    pub addr: u64,
}

pub trait Machine {
    /// Restart the machine.
    fn reboot(&mut self) -> !;

    /// Print processor state.
    fn dump_regs(&mut self, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Load and enter the kernel. Returns only on failure.
    fn exec(&mut self, req: &BootRequest) -> ExecError;
}

/// Why a kernel hand-off did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecError {
    /// This platform has no kernel loader linked in.
    NoLoader,
    /// The image could not be read.
    Io(FsError),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::NoLoader => write!(f, "no kernel loader on this platform"),
            ExecError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl core::error::Error for ExecError {}
