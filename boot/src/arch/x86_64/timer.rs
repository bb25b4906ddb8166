/// TSC calibration and the monotonic clock behind the prompt timeout.
///
/// Uses PIT channel 2 (speaker gate) to measure the TSC frequency without
/// interrupts: program a ~10 ms one-shot, read the TSC before and after the
/// countdown, divide.
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use super::cpu::rdtsc;
use super::rtc;
use super::{inb, outb};
use crate::clock::Clock;

/// TSC ticks per millisecond. Default assumes 2 GHz until calibrated.
static TSC_PER_MS: AtomicU64 = AtomicU64::new(2_000_000);

/// TSC value when calibration finished.
static BOOT_TSC: AtomicU64 = AtomicU64::new(0);

const PIT_CH2_DATA: u16 = 0x42;
const PIT_CMD: u16 = 0x43;
const PIT_GATE: u16 = 0x61;

/// PIT oscillator frequency (Hz).
const PIT_FREQ: u64 = 1_193_182;

/// ~10 ms at `PIT_FREQ`.
const PIT_COUNT: u16 = 11_932;

/// Calibrate the TSC against PIT channel 2. Call once, early, with
/// interrupts disabled.
pub fn calibrate_tsc() {
    let expected_us = (PIT_COUNT as u64 * 1_000_000) / PIT_FREQ;

    // Speaker off, gate low.
    let gate = inb(PIT_GATE);
    outb(PIT_GATE, (gate & !0x02) | 0x01);

    // Channel 2, mode 0, lobyte/hibyte, binary.
    outb(PIT_CMD, 0xB0);
    outb(PIT_CH2_DATA, (PIT_COUNT & 0xFF) as u8);
    outb(PIT_CH2_DATA, (PIT_COUNT >> 8) as u8);

    // Raising the gate starts the countdown.
    let gate = inb(PIT_GATE);
    outb(PIT_GATE, gate & !0x01);
    outb(PIT_GATE, gate | 0x01);

    let start = rdtsc();
    while inb(PIT_GATE) & 0x20 == 0 {
        core::hint::spin_loop();
    }
    let end = rdtsc();

    let per_ms = (end.wrapping_sub(start) * 1_000) / expected_us.max(1);
    if per_ms != 0 {
        TSC_PER_MS.store(per_ms, Ordering::Release);
    }
    BOOT_TSC.store(end, Ordering::Release);
    log::info!(target: "timer", "tsc {} kHz", per_ms);
}

/// Milliseconds since calibration.
pub fn monotonic_ms() -> u64 {
    let boot = BOOT_TSC.load(Ordering::Acquire);
    let per_ms = TSC_PER_MS.load(Ordering::Acquire).max(1);
    rdtsc().wrapping_sub(boot) / per_ms
}

/// `Clock` over the calibrated TSC and the CMOS clock.
pub struct TscClock;

impl Clock for TscClock {
    fn secs(&self) -> u64 {
        monotonic_ms() / 1000
    }

    fn write_time(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{}", rtc::read())
    }
}
