//! HeavenOS second-stage boot loader, entry point.
//!
//! Loaded by Limine, which also hands over the boot volume's files as
//! modules (kernel images, `/etc/boot.conf`). Those become the RamFs the
//! command interpreter works on; the interpreter then runs on COM1 until
//! a kernel is chosen.
#![no_std]
#![no_main]

use core::panic::PanicInfo;

use limine::request::{ModuleRequest, RequestsEndMarker, RequestsStartMarker};
use limine::BaseRevision;
use log::LevelFilter;

use heavenos_boot::arch::x86_64::serial::{self, SerialConsole};
use heavenos_boot::arch::x86_64::timer::{self, TscClock};
use heavenos_boot::arch::x86_64::{self, Pc};
use heavenos_boot::fs::{RamFile, RamFs};
use heavenos_boot::logger::{self, BootLogger};
use heavenos_boot::{BootDefaults, Context, Env, Interp, VERSION};

// ---- Limine requests ----
// Must be #[used] and in .requests section for Limine to discover them.

#[used]
#[link_section = ".requests"]
static BASE_REVISION: BaseRevision = BaseRevision::new();

#[used]
#[link_section = ".requests"]
static MODULE_REQUEST: ModuleRequest = ModuleRequest::new();

#[used]
#[link_section = ".requests_start_marker"]
static _START_MARKER: RequestsStartMarker = RequestsStartMarker::new();

#[used]
#[link_section = ".requests_end_marker"]
static _END_MARKER: RequestsEndMarker = RequestsEndMarker::new();

static LOGGER: BootLogger = BootLogger::new(Some(serial::mirror));

#[no_mangle]
pub extern "C" fn kmain() -> ! {
    serial::SERIAL.lock().init();
    let _ = logger::init(&LOGGER, LevelFilter::Info);
    log::info!(target: "boot", "HeavenOS boot {}", VERSION);

    if !BASE_REVISION.is_supported() {
        halt("Limine base revision not supported");
    }
    timer::calibrate_tsc();

    let defaults = BootDefaults::default();
    let Ok(mut fs) = RamFs::new(defaults.device) else {
        halt("bad boot device name");
    };
    load_modules(&mut fs);

    let ctx = match Context::new(&defaults) {
        Ok(ctx) => ctx,
        Err(_) => halt("bad boot defaults"),
    };

    let mut con = SerialConsole;
    let clock = TscClock;
    let mut machine = Pc;
    let env = Env {
        con: &mut con,
        fs: &mut fs,
        clock: &clock,
        machine: &mut machine,
    };
    Interp::new(ctx, env).run()
}

/// Every Limine module becomes a root-owned, read-only file at its path on
/// the boot volume.
fn load_modules(fs: &mut RamFs<'static>) {
    let Some(response) = MODULE_REQUEST.get_response() else {
        log::warn!(target: "boot", "no modules");
        return;
    };

    for module in response.modules() {
        let Ok(path) = core::str::from_utf8(module.path()) else {
            log::warn!(target: "boot", "skipping module with non-UTF-8 path");
            continue;
        };
        // Strip a volume prefix such as `boot():`.
        let path = path.rsplit_once(':').map_or(path, |(_, p)| p);
        // Limine maps modules for the lifetime of the loader.
        let data: &'static [u8] =
            unsafe { core::slice::from_raw_parts(module.addr(), module.size() as usize) };

        match fs.add(RamFile::new(path, data)) {
            Ok(()) => log::info!(target: "boot", "module {} ({} bytes)", path, data.len()),
            Err(e) => log::warn!(target: "boot", "module {}: {}", path, e),
        }
    }
}

fn halt(why: &str) -> ! {
    log::error!(target: "boot", "{}", why);
    loop {
        x86_64::hlt();
    }
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    serial::mirror("!!! LOADER PANIC !!!\n");
    log::error!(target: "boot", "{}", info);
    loop {
        x86_64::hlt();
    }
}
