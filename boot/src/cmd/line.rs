/// Line editor for the boot prompt.
///
/// Supports:
/// - Printable ASCII input, up to `LINE_MAX` bytes (BEL when full)
/// - Backspace / DEL (0x08 / 0x7F): delete the last character
/// - Enter (CR or LF): submit line
/// - Ctrl-C (0x03): cancel, submit an empty line
/// - Ctrl-U (0x15): clear line
/// - Ctrl-R (0x12): redraw line
///
/// Only the wait for the first keystroke is bounded. Once the operator has
/// started typing, the editor blocks until the line is finished.
use crate::clock::Clock;
use crate::console::Console;
use crate::param::LINE_MAX;

const BS: u8 = 0x08;
const BEL: u8 = 0x07;
const ESC: u8 = 0x1b;

/// Longest escape sequence swallowed after `ESC [`.
const CSI_MAX: usize = 8;

/// Outcome of one `read_line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// A finished line, without its terminator. May be empty.
    Line(&'a str),
    /// Nothing was typed before the timeout.
    Timeout,
    /// The console stopped delivering input.
    Closed,
}

pub struct LineEditor {
    buf: [u8; LINE_MAX],
    len: usize,
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineEditor {
    pub const fn new() -> Self {
        Self {
            buf: [0u8; LINE_MAX],
            len: 0,
        }
    }

    /// Read one line, waiting at most `timeout` seconds for the first byte.
    pub fn read_line(&mut self, con: &mut dyn Console, clock: &dyn Clock, timeout: u32) -> Input<'_> {
        self.len = 0;

        let deadline = clock.secs().saturating_add(u64::from(timeout));
        while !con.ischar() {
            if clock.secs() >= deadline {
                return Input::Timeout;
            }
            core::hint::spin_loop();
        }

        // Byte read past an `ESC` that did not start a CSI sequence.
        let mut pending = None;
        loop {
            let Some(byte) = pending.take().or_else(|| con.getchar()) else {
                return Input::Closed;
            };

            match byte {
                b'\r' | b'\n' => {
                    con.putchar(b'\n');
                    break;
                }

                // Ctrl-C
                0x03 => {
                    con.puts("^C\n");
                    self.len = 0;
                    break;
                }

                // Ctrl-U
                0x15 => {
                    self.erase(con);
                    self.len = 0;
                }

                // Ctrl-R
                0x12 => {
                    self.erase(con);
                    self.redraw(con);
                }

                BS | 0x7f => {
                    if self.len > 0 {
                        self.len -= 1;
                        con.puts("\x08 \x08");
                    }
                }

                // Arrow keys and friends: drop the whole CSI sequence. After a
                // lone ESC or an Alt prefix the next byte is kept.
                ESC => {
                    if !con.ischar() {
                        continue;
                    }
                    match con.getchar() {
                        Some(b'[') => {
                            for _ in 0..CSI_MAX {
                                match con.getchar() {
                                    Some(c) if c.is_ascii_alphabetic() || c == b'~' => break,
                                    Some(_) => {}
                                    None => return Input::Closed,
                                }
                            }
                        }
                        Some(next) => pending = Some(next),
                        None => return Input::Closed,
                    }
                }

                0x20..=0x7e => {
                    if self.len < LINE_MAX {
                        self.buf[self.len] = byte;
                        self.len += 1;
                        con.putchar(byte);
                    } else {
                        con.putchar(BEL);
                    }
                }

                _ => {}
            }
        }

        // Only printable ASCII is ever stored.
        Input::Line(core::str::from_utf8(&self.buf[..self.len]).unwrap_or(""))
    }

    /// Wipe the echoed line from the terminal. The buffer is untouched.
    fn erase(&self, con: &mut dyn Console) {
        for _ in 0..self.len {
            con.puts("\x08 \x08");
        }
    }

    fn redraw(&self, con: &mut dyn Console) {
        for &byte in &self.buf[..self.len] {
            con.putchar(byte);
        }
    }
}
