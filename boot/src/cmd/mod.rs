/// HeavenOS boot command interpreter.
///
/// Lines come either from the operator, through the line editor, or from
/// `boot.conf`; both go through the same dispatcher and command tables.
/// The interpreter runs until a command asks to boot. If nobody types
/// anything before the prompt times out, the default kernel is booted.
///
/// All interpreter state lives in one `Context` owned by `Interp` and passed
/// by `&mut` to every command. The devices it talks to are bundled in `Env`.
pub mod commands;
pub mod conf;
pub mod dispatch;
mod error;
pub mod howto;
pub mod line;
mod qualify;
pub mod table;


use crate::clock::Clock;
use crate::console::Console;
use crate::fs::FileSystem;
use crate::machine::{BootRequest, Machine};
use crate::param::{bounded, CwdString, DevString, ImageString, PathString, TtyString};
use crate::{cprint, cprintln};

pub use conf::ConfStatus;
pub use dispatch::{docmd, Args};
pub use error::{ArgError, CmdError, IoError};
pub use howto::BootHowto;
pub use line::{Input, LineEditor};
pub use table::{CmdEntry, Handler, CMD_SET, CMD_TABLE};

const PROMPT: &str = "boot> ";

/// What a command asks the interpreter to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Read the next line.
    Continue,
    /// Stop interpreting and hand `Context::path` to the kernel loader.
    Boot,
}

/// Initial values for a `Context`.
#[derive(Debug, Clone)]
pub struct BootDefaults<'a> {
    pub device: &'a str,
    pub image: &'a str,
    pub tty: &'a str,
    pub conf: &'a str,
    pub timeout: u32,
    pub addr: u64,
}

impl Default for BootDefaults<'static> {
    fn default() -> Self {
        Self {
            device: "hd0a",
            image: "bsd",
            tty: "com0",
            conf: "/etc/boot.conf",
            timeout: 5,
            addr: 0,
        }
    }
}

/// Interpreter state for one boot attempt.
#[derive(Debug, Clone)]
pub struct Context {
    /// Active boot device.
    pub bootdev: DevString,
    /// Default kernel image name.
    pub image: ImageString,
    /// Current directory on `bootdev`; always starts and ends with `/`.
    pub cwd: CwdString,
    /// Path of the configuration file, qualified at use.
    pub conf: PathString,
    pub tty: TtyString,
    pub addr: u64,
    /// Seconds to wait for the first keystroke at the prompt.
    pub timeout: u32,
    pub howto: BootHowto,
    /// Refuse `boot.conf` unless it is root-owned and not group/other writable.
    pub secure: bool,
    #[cfg(feature = "debug-cmd")]
    pub debug: bool,
    /// Result of the most recent qualification. Overwritten by every call
    /// to `qualify`; copy it before qualifying again.
    pub(crate) path: PathString,
}

impl Context {
    pub fn new(defaults: &BootDefaults<'_>) -> Result<Self, CmdError> {
        if defaults.device.contains([':', '/']) {
            return Err(ArgError::BadPath.into());
        }
        let mut cwd = CwdString::new();
        let _ = cwd.push('/');
        Ok(Self {
            bootdev: bounded(defaults.device).ok_or(CmdError::Overflow("device"))?,
            image: bounded(defaults.image).ok_or(CmdError::Overflow("image"))?,
            cwd,
            conf: bounded(defaults.conf).ok_or(CmdError::Overflow("conf"))?,
            tty: bounded(defaults.tty).ok_or(CmdError::Overflow("tty"))?,
            addr: defaults.addr,
            timeout: defaults.timeout,
            howto: BootHowto::empty(),
            secure: !cfg!(feature = "insecure"),
            #[cfg(feature = "debug-cmd")]
            debug: false,
            path: PathString::new(),
        })
    }

    /// The most recent qualification result.
    pub fn path(&self) -> &str {
        &self.path
    }
}

// The scratch path is not interpreter state: two contexts that differ only
// in their last qualification behave identically.
impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        #[cfg(feature = "debug-cmd")]
        if self.debug != other.debug {
            return false;
        }
        self.bootdev == other.bootdev
            && self.image == other.image
            && self.cwd == other.cwd
            && self.conf == other.conf
            && self.tty == other.tty
            && self.addr == other.addr
            && self.timeout == other.timeout
            && self.howto == other.howto
            && self.secure == other.secure
    }
}

impl Eq for Context {}

/// The devices the interpreter works through.
pub struct Env<'e> {
    pub con: &'e mut dyn Console,
    pub fs: &'e mut dyn FileSystem,
    pub clock: &'e dyn Clock,
    pub machine: &'e mut dyn Machine,
}

/// The interactive/batch interpreter loop.
pub struct Interp<'e> {
    pub ctx: Context,
    pub env: Env<'e>,
    editor: LineEditor,
    conf_done: bool,
}

impl<'e> Interp<'e> {
    pub fn new(ctx: Context, env: Env<'e>) -> Self {
        Self {
            ctx,
            env,
            editor: LineEditor::new(),
            conf_done: false,
        }
    }

    /// Prompt for and execute one line. A prompt timeout runs a bare `boot`.
    /// Returns `None` once the console is gone.
    pub fn getcmd(&mut self) -> Option<Signal> {
        let Self { ctx, env, editor, .. } = self;
        cprint!(env.con, "{}", PROMPT);
        match editor.read_line(env.con, env.clock, ctx.timeout) {
            Input::Line(line) => Some(docmd(ctx, env, line)),
            Input::Timeout => {
                cprintln!(env.con);
                log::info!(target: "boot", "prompt timed out after {}s", ctx.timeout);
                Some(dispatch::execute(table::boot_entry(), ctx, env, &Args::new("boot")))
            }
            Input::Closed => None,
        }
    }

    /// Run `boot.conf` through the dispatcher.
    pub fn read_conf(&mut self) -> ConfStatus {
        conf::read_conf(&mut self.ctx, &mut self.env)
    }

    /// Interpret until some command asks to boot. `boot.conf` is consulted
    /// on the first call only. `None` if the console went away first.
    pub fn next_boot(&mut self) -> Option<BootRequest> {
        if !self.conf_done {
            self.conf_done = true;
            if self.read_conf() == ConfStatus::Boot {
                return Some(self.request());
            }
        }
        loop {
            if self.getcmd()? == Signal::Boot {
                return Some(self.request());
            }
        }
    }

    fn request(&self) -> BootRequest {
        BootRequest {
            path: self.ctx.path.clone(),
            howto: self.ctx.howto,
            addr: self.ctx.addr,
        }
    }

    /// Interpret and boot forever. A failed hand-off drops back to the prompt.
    pub fn run(&mut self) -> ! {
        loop {
            let Some(req) = self.next_boot() else {
                log::warn!(target: "boot", "console lost, rebooting");
                self.env.machine.reboot();
            };
            log::info!(target: "boot", "booting {} howto {:#x}", req.path, req.howto.bits());
            let err = self.env.machine.exec(&req);
            cprintln!(self.env.con, "boot {}: {}", req.path, err);
        }
    }
}
