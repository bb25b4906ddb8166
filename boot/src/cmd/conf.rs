/// `boot.conf` runner.
///
/// The configuration file is executed line by line through the same
/// dispatcher as the prompt. When the security gate is on, a file that is
/// not owned by root or that group/other can write is refused as a whole.
use super::{docmd, CmdError, Context, Env, Signal};
use crate::cprintln;
use crate::fs::{Fd, FsError};
use crate::param::{truncated, PathString, LINE_MAX};

/// Result of running the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfStatus {
    /// Missing, refused, or aborted by a read error.
    Unavailable,
    /// Every line ran; nothing asked to boot.
    Done,
    /// A line asked to boot.
    Boot,
}

impl ConfStatus {
    /// Classic integer form: -1, 0, 1.
    pub fn code(self) -> i32 {
        match self {
            ConfStatus::Unavailable => -1,
            ConfStatus::Done => 0,
            ConfStatus::Boot => 1,
        }
    }
}

const READ_CHUNK: usize = 64;

pub fn read_conf(ctx: &mut Context, env: &mut Env<'_>) -> ConfStatus {
    let conf = ctx.conf.clone();
    // Copied out: the lines below will qualify names of their own.
    let path: PathString = match ctx.qualify(&conf) {
        Ok(p) => truncated(p),
        Err(e) => {
            cprintln!(env.con, "{}: {}", conf, e);
            return ConfStatus::Unavailable;
        }
    };

    let fd = match env.fs.open(&path) {
        Ok(fd) => fd,
        Err(FsError::NotFound | FsError::NoDevice) => {
            log::debug!(target: "conf", "{} not present", path);
            return ConfStatus::Unavailable;
        }
        Err(e) => {
            cprintln!(env.con, "{}", CmdError::io("open", &path, e));
            return ConfStatus::Unavailable;
        }
    };

    let status = match check_secure(ctx, env, fd, &path) {
        Ok(()) => run_lines(ctx, env, fd, &path),
        Err(e) => {
            log::warn!(target: "conf", "{}", e);
            cprintln!(env.con, "{}", e);
            ConfStatus::Unavailable
        }
    };
    env.fs.close(fd);
    log::info!(target: "conf", "{}: status {}", path, status.code());
    status
}

fn check_secure(ctx: &Context, env: &mut Env<'_>, fd: Fd, path: &PathString) -> Result<(), CmdError> {
    if !ctx.secure {
        return Ok(());
    }
    let sb = env.fs.fstat(fd).map_err(|e| CmdError::io("stat", path, e))?;
    if sb.uid != 0 || sb.mode & 0o022 != 0 {
        return Err(CmdError::Insecure(path.clone()));
    }
    Ok(())
}

fn run_lines(ctx: &mut Context, env: &mut Env<'_>, fd: Fd, path: &str) -> ConfStatus {
    let mut chunk = [0u8; READ_CHUNK];
    let mut line = [0u8; LINE_MAX];
    let mut len = 0;
    let mut too_long = false;
    let mut lineno = 1u32;

    loop {
        let n = match env.fs.read(fd, &mut chunk) {
            Ok(n) => n,
            Err(e) => {
                cprintln!(env.con, "{}", CmdError::io("read", path, e));
                return ConfStatus::Unavailable;
            }
        };

        if n == 0 {
            // Last line without a newline still runs.
            if len > 0 || too_long {
                if run_line(ctx, env, path, lineno, &line[..len], too_long) == Signal::Boot {
                    return ConfStatus::Boot;
                }
            }
            return ConfStatus::Done;
        }

        for &byte in &chunk[..n] {
            if byte != b'\n' {
                if len < LINE_MAX {
                    line[len] = byte;
                    len += 1;
                } else {
                    too_long = true;
                }
                continue;
            }
            if run_line(ctx, env, path, lineno, &line[..len], too_long) == Signal::Boot {
                return ConfStatus::Boot;
            }
            len = 0;
            too_long = false;
            lineno += 1;
        }
    }
}

fn run_line(
    ctx: &mut Context,
    env: &mut Env<'_>,
    path: &str,
    lineno: u32,
    bytes: &[u8],
    too_long: bool,
) -> Signal {
    if too_long {
        cprintln!(env.con, "{}:{}: line too long", path, lineno);
        return Signal::Continue;
    }
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    match core::str::from_utf8(bytes) {
        Ok(text) => {
            log::debug!(target: "conf", "{}:{}: {}", path, lineno, text);
            docmd(ctx, env, text)
        }
        Err(_) => {
            cprintln!(env.con, "{}:{}: bad characters", path, lineno);
            Signal::Continue
        }
    }
}
