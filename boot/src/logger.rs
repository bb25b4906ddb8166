/// Loader message buffer behind the `log` facade.
///
/// Every record is formatted as `[LEVEL target] message` and appended to a
/// fixed-size ring (`MSGBUF`), which `dmesg` prints back. The oldest bytes
/// are overwritten once the ring is full. On bare metal the logger also
/// mirrors each line to the serial port through `mirror`.
use core::fmt::{self, Write};

use heapless::String;
use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

use crate::console::Console;

/// Bytes kept by the message buffer.
pub const MSGBUF_SIZE: usize = 4096;

/// Longest single formatted record; longer ones are cut.
const LOG_LINE_MAX: usize = 160;

pub static MSGBUF: Mutex<MsgBuf<MSGBUF_SIZE>> = Mutex::new(MsgBuf::new());

/// Byte ring holding the most recent `N` bytes written to it.
pub struct MsgBuf<const N: usize> {
    data: [u8; N],
    head: usize,
    len: usize,
}

impl<const N: usize> MsgBuf<N> {
    pub const fn new() -> Self {
        Self {
            data: [0u8; N],
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            let tail = (self.head + self.len) % N;
            self.data[tail] = byte;
            if self.len < N {
                self.len += 1;
            } else {
                self.head = (self.head + 1) % N;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Contents, oldest byte first.
    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.len).map(move |i| self.data[(self.head + i) % N])
    }

    pub fn write_to(&self, con: &mut dyn Console) {
        for byte in self.bytes() {
            con.putchar(byte);
        }
    }
}

impl<const N: usize> fmt::Write for MsgBuf<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push(s.as_bytes());
        Ok(())
    }
}

pub struct BootLogger {
    mirror: Option<fn(&str)>,
}

impl BootLogger {
    pub const fn new(mirror: Option<fn(&str)>) -> Self {
        Self { mirror }
    }
}

impl Log for BootLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut line: String<LOG_LINE_MAX> = String::new();
        let _ = write!(
            line,
            "[{} {}] {}",
            record.level(),
            record.target(),
            record.args()
        );
        if line.push('\n').is_err() {
            line.pop();
            let _ = line.push('\n');
        }

        MSGBUF.lock().push(line.as_bytes());
        if let Some(mirror) = self.mirror {
            mirror(&line);
        }
    }

    fn flush(&self) {}
}

/// Install `logger` as the global logger.
pub fn init(logger: &'static BootLogger, level: LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}
