/// Command tables.
///
/// Two levels: the top-level commands, and the variables under `set`.
/// Lookup accepts any non-empty prefix of a name and takes the first entry
/// in table order, so `b` is `boot` and `c` is `cd`. Keep that in mind when
/// adding entries: a new name must not be placed before an existing one it
/// shares a prefix with, or the old abbreviation changes meaning.
use super::commands;
use super::{Args, CmdError, Context, Env, Signal};

/// Command implementation. `args[0]` is the entry's full name.
pub type Handler = fn(&mut Context, &mut Env<'_>, &Args<'_>) -> Result<Signal, CmdError>;

pub struct CmdEntry {
    pub name: &'static str,
    pub exec: Handler,
    /// Second-level table; only `set` has one.
    pub sub: Option<&'static [CmdEntry]>,
}

impl CmdEntry {
    const fn new(name: &'static str, exec: Handler) -> Self {
        Self { name, exec, sub: None }
    }
}

impl core::fmt::Debug for CmdEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CmdEntry").field("name", &self.name).finish()
    }
}

#[cfg(feature = "debug-cmd")]
pub const CMD_SET: &[CmdEntry] = &[
    CmdEntry::new("addr", commands::xaddr),
    CmdEntry::new("boothowto", commands::xhowto),
    CmdEntry::new("debug", commands::xdebug),
    CmdEntry::new("device", commands::xdevice),
    CmdEntry::new("tty", commands::xtty),
    CmdEntry::new("image", commands::ximage),
];

#[cfg(not(feature = "debug-cmd"))]
pub const CMD_SET: &[CmdEntry] = &[
    CmdEntry::new("addr", commands::xaddr),
    CmdEntry::new("boothowto", commands::xhowto),
    CmdEntry::new("device", commands::xdevice),
    CmdEntry::new("tty", commands::xtty),
    CmdEntry::new("image", commands::ximage),
];

// `boot` stays first: it is what a bare `b` or a timed-out prompt runs.
pub static CMD_TABLE: &[CmdEntry] = &[
    CmdEntry::new("boot", commands::xboot),
    CmdEntry::new("cd", commands::xcd),
    CmdEntry::new("cp", commands::xcp),
    CmdEntry::new("dmesg", commands::xdmesg),
    CmdEntry::new("echo", commands::xecho),
    CmdEntry::new("help", commands::xhelp),
    CmdEntry::new("ls", commands::xls),
    CmdEntry::new("nope", commands::xnope),
    CmdEntry::new("reboot", commands::xreboot),
    CmdEntry::new("regs", commands::xregs),
    CmdEntry {
        name: "set",
        exec: commands::xset,
        sub: Some(CMD_SET),
    },
    CmdEntry::new("time", commands::xtime),
];

/// First entry of `table` whose name starts with `token`.
pub fn lookup(table: &'static [CmdEntry], token: &str) -> Option<&'static CmdEntry> {
    if token.is_empty() {
        return None;
    }
    table.iter().find(|e| e.name.starts_with(token))
}

pub fn boot_entry() -> &'static CmdEntry {
    &CMD_TABLE[0]
}
