/// x86_64 platform backend for the boot shell.
///
/// This module provides:
/// - Port I/O (in/out instructions)
/// - COM1 console
/// - TSC clock and CMOS real-time clock
/// - `Pc`, the `Machine` for a plain PC
pub mod cpu;
pub mod rtc;
pub mod serial;
pub mod timer;

use core::fmt;

use crate::machine::{BootRequest, ExecError, Machine};

/// Keyboard controller command port.
const KBC_CMD: u16 = 0x64;
/// Pulse the CPU reset line.
const KBC_RESET: u8 = 0xfe;

/// Halt the CPU until the next interrupt.
#[inline(always)]
pub fn hlt() {
    unsafe { core::arch::asm!("hlt", options(nostack, nomem)); }
}

/// Disable interrupts.
#[inline(always)]
pub fn cli() {
    unsafe { core::arch::asm!("cli", options(nostack, nomem)); }
}

/// Write a byte to an I/O port.
#[inline(always)]
pub fn outb(port: u16, val: u8) {
    unsafe {
        core::arch::asm!(
            "out dx, al",
            in("dx") port,
            in("al") val,
            options(nostack, preserves_flags),
        );
    }
}

/// Read a byte from an I/O port.
#[inline(always)]
pub fn inb(port: u16) -> u8 {
    let val: u8;
    unsafe {
        core::arch::asm!(
            "in al, dx",
            in("dx") port,
            out("al") val,
            options(nostack, preserves_flags),
        );
    }
    val
}

/// A bare PC: resets through the keyboard controller, has no kernel loader.
pub struct Pc;

impl Machine for Pc {
    fn reboot(&mut self) -> ! {
        outb(KBC_CMD, KBC_RESET);
        // Still here: nothing else to try.
        cli();
        loop {
            hlt();
        }
    }

    fn dump_regs(&mut self, out: &mut dyn fmt::Write) -> fmt::Result {
        let regs = cpu::ControlRegs::read();
        writeln!(out, "cr0={:#018x} cr2={:#018x}", regs.cr0, regs.cr2)?;
        writeln!(out, "cr3={:#018x} cr4={:#018x}", regs.cr3, regs.cr4)?;
        writeln!(out, "rflags={:#018x} rsp={:#018x}", regs.rflags, regs.rsp)
    }

    fn exec(&mut self, req: &BootRequest) -> ExecError {
        log::warn!(target: "exec", "cannot load {}: no loader", req.path);
        ExecError::NoLoader
    }
}
