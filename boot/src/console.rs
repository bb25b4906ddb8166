/// Console abstraction for the boot shell.
///
/// The interpreter needs exactly three primitives from a terminal: a
/// non-blocking "is a character waiting" poll, a blocking read, and a write.
/// Any device that speaks `embedded_io` gets them through the blanket impl
/// below, so the COM1 driver and the test console share one code path.
use core::fmt;

use embedded_io::{Read, ReadReady, Write};

pub trait Console {
    /// True if a byte can be read without blocking.
    fn ischar(&mut self) -> bool;

    /// Read one byte, blocking. `None` means the device is gone.
    fn getchar(&mut self) -> Option<u8>;

    /// Write one byte.
    fn putchar(&mut self, byte: u8);

    fn puts(&mut self, s: &str) {
        for byte in s.bytes() {
            self.putchar(byte);
        }
    }
}

impl<T: Read + Write + ReadReady> Console for T {
    fn ischar(&mut self) -> bool {
        self.read_ready().unwrap_or(false)
    }

    fn getchar(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    fn putchar(&mut self, byte: u8) {
        let _ = self.write_all(&[byte]);
    }
}

impl fmt::Write for dyn Console + '_ {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.puts(s);
        Ok(())
    }
}

/// Error type shared by the console devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// The other end went away (end of scripted input, unplugged UART).
    Closed,
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Closed => write!(f, "console closed"),
        }
    }
}

impl core::error::Error for ConsoleError {}

impl embedded_io::Error for ConsoleError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            ConsoleError::Closed => embedded_io::ErrorKind::BrokenPipe,
        }
    }
}

/// Print to a console.
#[macro_export]
macro_rules! cprint {
    ($con:expr, $($arg:tt)*) => {
        {
            use core::fmt::Write as _;
            let _ = write!($con, $($arg)*);
        }
    };
}

/// Print to a console with a newline.
#[macro_export]
macro_rules! cprintln {
    ($con:expr) => ($crate::cprint!($con, "\n"));
    ($con:expr, $($arg:tt)*) => {
        $crate::cprint!($con, "{}\n", format_args!($($arg)*))
    };
}
