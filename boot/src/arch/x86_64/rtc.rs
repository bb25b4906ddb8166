/// CMOS real-time clock, read for the `time` command.
use core::fmt;

use super::{inb, outb};

const CMOS_ADDRESS: u16 = 0x70;
const CMOS_DATA: u16 = 0x71;

// Register numbers. Bit 7 of the index keeps NMI disabled.
const SECONDS: u8 = 0x00;
const MINUTES: u8 = 0x02;
const HOURS: u8 = 0x04;
const DAY: u8 = 0x07;
const MONTH: u8 = 0x08;
const YEAR: u8 = 0x09;
const STATUS_A: u8 = 0x0A;
const STATUS_B: u8 = 0x0B;

/// Status B: values are binary rather than BCD.
const SB_BINARY: u8 = 0x04;
/// Status B: 24-hour mode.
const SB_24H: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// `YYYY/MM/DD HH:MM:SS`
impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}/{:02}/{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

fn cmos(reg: u8) -> u8 {
    outb(CMOS_ADDRESS, 0x80 | reg);
    inb(CMOS_DATA)
}

fn update_in_progress() -> bool {
    cmos(STATUS_A) & 0x80 != 0
}

fn bcd(v: u8) -> u8 {
    (v & 0x0f) + (v >> 4) * 10
}

fn snapshot() -> [u8; 6] {
    while update_in_progress() {
        core::hint::spin_loop();
    }
    [cmos(SECONDS), cmos(MINUTES), cmos(HOURS), cmos(DAY), cmos(MONTH), cmos(YEAR)]
}

/// Current wall-clock time. Two equal snapshots in a row guard against an
/// update landing mid-read.
pub fn read() -> DateTime {
    let mut raw = snapshot();
    loop {
        let again = snapshot();
        if again == raw {
            break;
        }
        raw = again;
    }

    let status = cmos(STATUS_B);
    let [mut sec, mut min, mut hour, mut day, mut month, mut year] = raw;
    let pm = hour & 0x80 != 0;
    hour &= 0x7f;
    if status & SB_BINARY == 0 {
        sec = bcd(sec);
        min = bcd(min);
        hour = bcd(hour);
        day = bcd(day);
        month = bcd(month);
        year = bcd(year);
    }
    if status & SB_24H == 0 {
        hour %= 12;
        if pm {
            hour += 12;
        }
    }

    DateTime {
        year: 2000 + year as u16,
        month,
        day,
        hour,
        minute: min,
        second: sec,
    }
}
