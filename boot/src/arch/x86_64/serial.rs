/// Serial port driver (COM1, 0x3F8), the loader's console.
///
/// `SerialConsole` is a handle onto the shared port that speaks
/// `embedded_io`, which makes it a `Console` for the interpreter.
/// `mirror` copies log records to the same port.
use core::convert::Infallible;

use embedded_io::{ErrorType, Read, ReadReady, Write};
use spin::Mutex;

use super::{inb, outb};

const COM1: u16 = 0x3F8;

pub static SERIAL: Mutex<Serial> = Mutex::new(Serial::new(COM1));

pub struct Serial {
    port: u16,
}

impl Serial {
    pub const fn new(port: u16) -> Self {
        Self { port }
    }

    /// Initialize the serial port (8N1, 115200 baud, no interrupts).
    pub fn init(&self) {
        outb(self.port + 1, 0x00); // Disable interrupts
        outb(self.port + 3, 0x80); // Enable DLAB
        outb(self.port, 0x01); // Divisor 1, low byte
        outb(self.port + 1, 0x00); // Divisor 1, high byte
        outb(self.port + 3, 0x03); // 8N1
        outb(self.port + 2, 0xC7); // FIFO on, cleared, 14-byte threshold
        outb(self.port + 4, 0x03); // DTR + RTS
    }

    fn is_transmit_empty(&self) -> bool {
        inb(self.port + 5) & 0x20 != 0
    }

    pub fn write_byte(&self, byte: u8) {
        while !self.is_transmit_empty() {
            core::hint::spin_loop();
        }
        outb(self.port, byte);
    }

    /// Write bytes, expanding `\n` to CR LF.
    pub fn write_bytes(&self, bytes: &[u8]) {
        for &byte in bytes {
            if byte == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(byte);
        }
    }

    /// LSR bit 0: Data Ready.
    pub fn has_data(&self) -> bool {
        inb(self.port + 5) & 0x01 != 0
    }

    pub fn read_byte(&self) -> u8 {
        while !self.has_data() {
            core::hint::spin_loop();
        }
        inb(self.port)
    }
}

/// `Console` over COM1. The port lock is taken per operation.
pub struct SerialConsole;

impl ErrorType for SerialConsole {
    type Error = Infallible;
}

impl Read for SerialConsole {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(first) = buf.first_mut() else {
            return Ok(0);
        };
        *first = SERIAL.lock().read_byte();
        Ok(1)
    }
}

impl ReadReady for SerialConsole {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(SERIAL.lock().has_data())
    }
}

impl Write for SerialConsole {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        SERIAL.lock().write_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Log sink for `BootLogger`.
pub fn mirror(line: &str) {
    SERIAL.lock().write_bytes(line.as_bytes());
}
