/// Host-side doubles for the interpreter's collaborators.
///
/// `MockConsole` replays a scripted keyboard and records everything
/// printed. `TickingClock` advances one second per reading so timeouts
/// expire after a bounded number of polls. `MockMachine` records hand-offs
/// instead of jumping anywhere. `FaultyFs` wraps a filesystem and fails
/// chosen calls. `Rig` wires them to a `RamFs` and a context.
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use embedded_io::{ErrorType, Read, ReadReady, Write};

use crate::clock::Clock;
use crate::cmd::{docmd, BootDefaults, Context, Env, Interp, Signal};
use crate::console::ConsoleError;
use crate::fs::{Fd, FileSystem, FsError, RamFile, RamFs, Stat};
use crate::param::FileName;
use crate::logger::{self, BootLogger};
use crate::machine::{BootRequest, ExecError, Machine};

/// Scripted console. Reads fail with `Closed` once the script runs out.
#[derive(Default)]
pub struct MockConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl MockConsole {
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: Vec::new(),
        }
    }

    pub fn feed(&mut self, input: &[u8]) {
        self.input.extend(input.iter().copied());
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub fn take_output(&mut self) -> String {
        let out = self.output();
        self.output.clear();
        out
    }

    pub fn pending(&self) -> usize {
        self.input.len()
    }
}

impl ErrorType for MockConsole {
    type Error = ConsoleError;
}

impl Read for MockConsole {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut n = 0;
        while n < buf.len() {
            match self.input.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        if n == 0 {
            return Err(ConsoleError::Closed);
        }
        Ok(n)
    }
}

impl ReadReady for MockConsole {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.input.is_empty())
    }
}

impl Write for MockConsole {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Clock that moves forward one second every time it is read.
#[derive(Default)]
pub struct TickingClock {
    now: Cell<u64>,
}

impl TickingClock {
    pub fn reads(&self) -> u64 {
        self.now.get()
    }
}

impl Clock for TickingClock {
    fn secs(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + 1);
        now
    }

    fn write_time(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "Fri Oct 16 12:00:00 2026")
    }
}

/// Records hand-offs. `reboot` panics so tests can catch it.
#[derive(Default)]
pub struct MockMachine {
    pub execs: Vec<BootRequest>,
    pub regs_dumped: usize,
    /// Make `dump_regs` fail.
    pub regs_fail: bool,
}

impl Machine for MockMachine {
    fn reboot(&mut self) -> ! {
        panic!("reboot requested");
    }

    fn dump_regs(&mut self, out: &mut dyn fmt::Write) -> fmt::Result {
        self.regs_dumped += 1;
        if self.regs_fail {
            return Err(fmt::Error);
        }
        writeln!(out, "cr0=0x80000011 cr3=0x1000 cr4=0x20")
    }

    fn exec(&mut self, req: &BootRequest) -> ExecError {
        self.execs.push(req.clone());
        ExecError::NoLoader
    }
}

/// Which calls `FaultyFs` fails with `FsError::Io`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    /// Fail every `read` once this many have succeeded.
    pub read_after: Option<usize>,
    pub fstat: bool,
    pub opendir: bool,
    pub readdir: bool,
    /// Fail `stat` on paths ending in this name.
    pub stat_suffix: Option<&'static str>,
}

/// Filesystem wrapper that injects I/O errors and counts open handles.
pub struct FaultyFs<'f> {
    inner: &'f mut dyn FileSystem,
    faults: Faults,
    reads: usize,
    open: usize,
}

impl<'f> FaultyFs<'f> {
    pub fn new(inner: &'f mut dyn FileSystem, faults: Faults) -> Self {
        Self {
            inner,
            faults,
            reads: 0,
            open: 0,
        }
    }

    /// Files and directories opened and not yet closed.
    pub fn open_handles(&self) -> usize {
        self.open
    }
}

impl FileSystem for FaultyFs<'_> {
    fn open(&mut self, path: &str) -> Result<Fd, FsError> {
        let fd = self.inner.open(path)?;
        self.open += 1;
        Ok(fd)
    }

    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> Result<usize, FsError> {
        if self.faults.read_after.is_some_and(|n| self.reads >= n) {
            return Err(FsError::Io);
        }
        self.reads += 1;
        self.inner.read(fd, buf)
    }

    fn fstat(&mut self, fd: Fd) -> Result<Stat, FsError> {
        if self.faults.fstat {
            return Err(FsError::Io);
        }
        self.inner.fstat(fd)
    }

    fn close(&mut self, fd: Fd) {
        self.open -= 1;
        self.inner.close(fd);
    }

    fn stat(&mut self, path: &str) -> Result<Stat, FsError> {
        if self.faults.stat_suffix.is_some_and(|name| path.ends_with(name)) {
            return Err(FsError::Io);
        }
        self.inner.stat(path)
    }

    fn opendir(&mut self, path: &str) -> Result<Fd, FsError> {
        if self.faults.opendir {
            return Err(FsError::Io);
        }
        let fd = self.inner.opendir(path)?;
        self.open += 1;
        Ok(fd)
    }

    fn readdir(&mut self, dir: Fd) -> Result<Option<FileName>, FsError> {
        if self.faults.readdir {
            return Err(FsError::Io);
        }
        self.inner.readdir(dir)
    }

    fn closedir(&mut self, dir: Fd) {
        self.open -= 1;
        self.inner.closedir(dir);
    }
}

/// Everything an interpreter needs, owned in one place.
pub struct Rig {
    pub con: MockConsole,
    pub fs: RamFs<'static>,
    pub clock: TickingClock,
    pub machine: MockMachine,
    pub ctx: Context,
}

impl Rig {
    /// A rig on device `hd0a` holding `files`, with the default context.
    pub fn new(files: &[RamFile<'static>]) -> Self {
        let mut fs = RamFs::new("hd0a").unwrap();
        for file in files {
            fs.add(*file).unwrap();
        }
        Self {
            con: MockConsole::default(),
            fs,
            clock: TickingClock::default(),
            machine: MockMachine::default(),
            ctx: Context::new(&BootDefaults::default()).unwrap(),
        }
    }

    /// The usual tree: a kernel, a config directory and a nested kernel.
    pub fn sample() -> Self {
        Self::new(&[
            RamFile::new("/bsd", b"kernel image"),
            RamFile::new("/etc/motd", b"hello\n"),
            RamFile::new("/a/b/bsd.test", b"k"),
            RamFile::dir("/a/b/c"),
        ])
    }

    /// Run one line against the rig's context.
    pub fn run(&mut self, line: &str) -> Signal {
        let Rig { con, fs, clock, machine, ctx } = self;
        let mut env = Env {
            con,
            fs,
            clock: &*clock,
            machine,
        };
        docmd(ctx, &mut env, line)
    }

    /// Run `f` with the rig's filesystem behind a `FaultyFs`. Returns what
    /// `f` returned and the number of handles it left open.
    pub fn with_faults<R>(
        &mut self,
        faults: Faults,
        f: impl FnOnce(&mut Context, &mut Env<'_>) -> R,
    ) -> (R, usize) {
        let Rig { con, fs, clock, machine, ctx } = self;
        let mut faulty = FaultyFs::new(fs, faults);
        let result = {
            let mut env = Env {
                con,
                fs: &mut faulty,
                clock: &*clock,
                machine,
            };
            f(ctx, &mut env)
        };
        (result, faulty.open_handles())
    }

    /// An interpreter over the rig's devices, starting from a copy of `ctx`.
    pub fn interp(&mut self) -> Interp<'_> {
        let env = Env {
            con: &mut self.con,
            fs: &mut self.fs,
            clock: &self.clock,
            machine: &mut self.machine,
        };
        Interp::new(self.ctx.clone(), env)
    }

    pub fn output(&self) -> String {
        self.con.output()
    }

    pub fn take_output(&mut self) -> String {
        self.con.take_output()
    }
}

static TEST_LOGGER: BootLogger = BootLogger::new(None);

/// Install the message-buffer logger once per test binary.
pub fn init_logger() {
    let _ = logger::init(&TEST_LOGGER, log::LevelFilter::Debug);
}
