/// Capacities of the loader's fixed buffers.
///
/// Nothing in the boot shell allocates: every string the interpreter keeps
/// is a `heapless::String` sized by one of these constants, and every write
/// into one of them is checked.
use heapless::String;

/// Longest command line accepted by the line editor and the config reader.
pub const LINE_MAX: usize = 132;

/// Argument vector slots, including `argv[0]`.
pub const MAXARGV: usize = 8;

/// Longest fully qualified `device:path`.
pub const PATH_MAX: usize = 256;

/// Longest boot device name (`hd0a`, `cd0a`, `tftp0`, ...).
pub const DEV_MAX: usize = 16;

/// Longest current directory.
pub const CWD_MAX: usize = PATH_MAX - DEV_MAX - 1;

/// Longest default kernel image name.
pub const IMAGE_MAX: usize = 64;

/// Longest directory entry name returned by `readdir`.
pub const NAME_MAX: usize = 64;

/// Longest console device name.
pub const TTY_MAX: usize = 16;

/// Longest argument echoed back in an error message.
pub const TOKEN_MAX: usize = 32;

static_assertions::const_assert!(MAXARGV >= 2);
static_assertions::const_assert!(DEV_MAX + 1 + CWD_MAX <= PATH_MAX);
static_assertions::const_assert!(DEV_MAX + 1 + IMAGE_MAX <= PATH_MAX);
static_assertions::const_assert!(LINE_MAX < PATH_MAX);
static_assertions::const_assert!(NAME_MAX < PATH_MAX);

pub type PathString = String<PATH_MAX>;
pub type DevString = String<DEV_MAX>;
pub type CwdString = String<CWD_MAX>;
pub type ImageString = String<IMAGE_MAX>;
pub type TtyString = String<TTY_MAX>;
pub type FileName = String<NAME_MAX>;
pub type Token = String<TOKEN_MAX>;

/// Copy `s` into a fixed-capacity string, or `None` if it does not fit.
pub fn bounded<const N: usize>(s: &str) -> Option<String<N>> {
    let mut out = String::new();
    out.push_str(s).ok()?;
    Some(out)
}

/// Copy as much of `s` as fits. Used only for diagnostics.
pub fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
