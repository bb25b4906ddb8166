#![no_std]
#![allow(dead_code)]

#[cfg(test)]
extern crate alloc;

// HeavenOS boot loader command shell. Everything that talks to hardware sits
// behind the Console, Clock, FileSystem and Machine traits so the interpreter
// runs under `cargo test --lib` on the host.
pub mod param;
pub mod console;
pub mod clock;
pub mod fs;
pub mod machine;
pub mod logger;
pub mod cmd;

// Hardware-dependent modules, only compiled for the loader target
#[cfg(all(target_arch = "x86_64", not(test)))]
pub mod arch;

#[cfg(test)]
pub mod mock;

/// Loader version, printed by `set` and at startup.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cmd::{BootDefaults, Context, Env, Interp, Signal};
pub use machine::BootRequest;
