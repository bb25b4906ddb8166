/// Command handlers.
///
/// Every handler gets the interpreter context, the devices, and the
/// argument vector (`args[0]` is the command's full name). A handler that
/// fails returns the error without having touched the context; the
/// dispatcher prints it.
use super::howto::bootparse;
use super::table::{CMD_SET, CMD_TABLE};
use super::{ArgError, Args, CmdError, Context, Env, Signal};
use crate::fs::{Stat, S_IFMT, S_ISGID, S_ISUID, S_ISVTX};
use crate::logger::MSGBUF;
use crate::param::{bounded, truncated, CwdString};
use crate::{cprint, cprintln, VERSION};

// ---- boot ----

/// `boot [image] [-flags...]`
pub fn xboot(ctx: &mut Context, _env: &mut Env<'_>, args: &Args<'_>) -> Result<Signal, CmdError> {
    let howto = match args.get(1) {
        Some(image) if !image.starts_with('-') => {
            let howto = ctx.howto.parse(args.rest(2).iter().copied())?;
            ctx.qualify(image)?;
            howto
        }
        _ => {
            let howto = ctx.howto.parse(args.rest(1).iter().copied())?;
            let image = ctx.image.clone();
            ctx.qualify(&image)?;
            howto
        }
    };
    ctx.howto = howto;
    Ok(Signal::Boot)
}

// ---- filesystem ----

pub fn xcd(ctx: &mut Context, env: &mut Env<'_>, args: &Args<'_>) -> Result<Signal, CmdError> {
    let name = match args.argc() {
        1 => {
            ctx.cwd.clear();
            let _ = ctx.cwd.push('/');
            return Ok(Signal::Continue);
        }
        2 => args.arg(1),
        _ => return Err(ArgError::Usage("cd [dir]").into()),
    };

    match name {
        "." => return Ok(Signal::Continue),
        ".." => {
            strip_last(&mut ctx.cwd);
            return Ok(Signal::Continue);
        }
        _ => {}
    }
    // The current directory is relative to the boot device.
    if name.contains(':') {
        return Err(ArgError::BadPath.into());
    }

    let path = ctx.qualify(name)?;
    let sb = env.fs.stat(path).map_err(|e| CmdError::io("stat", name, e))?;
    if !sb.is_dir() {
        return Err(CmdError::NotADirectory(truncated(name)));
    }

    // The qualified form is `device:` + the absolute directory.
    let dir = path.split_once(':').map_or(path, |(_, dir)| dir);
    ctx.cwd = normalize(dir).ok_or(CmdError::Overflow("cwd"))?;
    Ok(Signal::Continue)
}

/// `dir` with empty and `.` segments dropped, ending in `/`.
fn normalize(dir: &str) -> Option<CwdString> {
    let mut cwd = CwdString::new();
    cwd.push('/').ok()?;
    for seg in dir.split('/').filter(|s| !s.is_empty() && *s != ".") {
        cwd.push_str(seg).ok()?;
        cwd.push('/').ok()?;
    }
    Some(cwd)
}

/// Drop the last directory of `cwd`, stopping at `/`.
fn strip_last(cwd: &mut CwdString) {
    let trimmed = cwd.trim_end_matches('/');
    let keep = trimmed.rfind('/').map_or(1, |i| i + 1);
    cwd.truncate(keep);
}

pub fn xls(ctx: &mut Context, env: &mut Env<'_>, args: &Args<'_>) -> Result<Signal, CmdError> {
    if args.argc() > 2 {
        return Err(ArgError::Usage("ls [name]").into());
    }
    ctx.qualify(args.get(1).unwrap_or("/."))?;
    let target = ctx.path.clone();

    let sb = env.fs.stat(&target).map_err(|e| CmdError::io("stat", &target, e))?;
    if !sb.is_dir() {
        lsline(env, &target, &sb);
        return Ok(Signal::Continue);
    }

    let dir = env.fs.opendir(&target).map_err(|e| CmdError::io("opendir", &target, e))?;
    loop {
        let name = match env.fs.readdir(dir) {
            Ok(Some(name)) => name,
            Ok(None) => break,
            Err(e) => {
                cprintln!(env.con, "{}", CmdError::io("readdir", &target, e));
                break;
            }
        };

        let mut entry = target.clone();
        if entry.push('/').and_then(|()| entry.push_str(&name)).is_err() {
            cprintln!(env.con, "ls: {}: {}", name, CmdError::Overflow("path"));
            continue;
        }
        match env.fs.stat(&entry) {
            Ok(sb) => lsline(env, &name, &sb),
            Err(e) => cprintln!(env.con, "{}", CmdError::io("stat", &entry, e)),
        }
    }
    env.fs.closedir(dir);
    Ok(Signal::Continue)
}

/// One `ls` line: `drwxr-xr-x 0,0\t512\tname`.
fn lsline(env: &mut Env<'_>, name: &str, sb: &Stat) {
    let mode = mode_string(sb.mode);
    cprintln!(env.con, "{} {},{}\t{}\t{}", mode, sb.uid, sb.gid, sb.size, name);
}

/// File type character followed by the three permission triads.
pub fn mode_string(mode: u32) -> heapless::String<10> {
    const TYPES: &[u8; 16] = b"-fc-d-b---l-s-w-";

    let mut out = heapless::String::new();
    let _ = out.push(TYPES[((mode & S_IFMT) >> 12) as usize] as char);
    for (shift, special, set) in [(6, S_ISUID, b"sS"), (3, S_ISGID, b"sS"), (0, S_ISVTX, b"tT")] {
        let bits = mode >> shift;
        let exec = if mode & special != 0 { set } else { b"x-" };
        let _ = out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        let _ = out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        let _ = out.push((if bits & 0o1 != 0 { exec[0] } else { exec[1] }) as char);
    }
    out
}

pub fn xcp(_ctx: &mut Context, env: &mut Env<'_>, args: &Args<'_>) -> Result<Signal, CmdError> {
    unsupported(env, args)
}

pub fn xnope(_ctx: &mut Context, env: &mut Env<'_>, args: &Args<'_>) -> Result<Signal, CmdError> {
    unsupported(env, args)
}

fn unsupported(env: &mut Env<'_>, args: &Args<'_>) -> Result<Signal, CmdError> {
    cprintln!(env.con, "{}: unsupported", args.name());
    Ok(Signal::Continue)
}

// ---- set ----

/// `set` with no variable: show everything.
pub fn xset(ctx: &mut Context, env: &mut Env<'_>, _args: &Args<'_>) -> Result<Signal, CmdError> {
    cprintln!(env.con, "HeavenOS boot[{}]", VERSION);
    cprintln!(env.con, "cwd\t{}", ctx.cwd);
    for var in CMD_SET {
        (var.exec)(ctx, env, &Args::new(var.name))?;
    }
    Ok(Signal::Continue)
}

pub fn xdevice(ctx: &mut Context, env: &mut Env<'_>, args: &Args<'_>) -> Result<Signal, CmdError> {
    match args.argc() {
        1 => cprintln!(env.con, "device\t{}", ctx.bootdev),
        2 => {
            let dev = args.arg(1);
            if dev.contains([':', '/']) {
                return Err(ArgError::BadPath.into());
            }
            ctx.bootdev = bounded(dev).ok_or(CmdError::Overflow("device"))?;
        }
        _ => return Err(ArgError::Usage("set device [name]").into()),
    }
    Ok(Signal::Continue)
}

pub fn ximage(ctx: &mut Context, env: &mut Env<'_>, args: &Args<'_>) -> Result<Signal, CmdError> {
    match args.argc() {
        1 => cprintln!(env.con, "image\t{}", ctx.image),
        2 => ctx.image = bounded(args.arg(1)).ok_or(CmdError::Overflow("image"))?,
        _ => return Err(ArgError::Usage("set image [name]").into()),
    }
    Ok(Signal::Continue)
}

pub fn xtty(ctx: &mut Context, env: &mut Env<'_>, args: &Args<'_>) -> Result<Signal, CmdError> {
    match args.argc() {
        1 => cprintln!(env.con, "tty\t{}", ctx.tty),
        2 => ctx.tty = bounded(args.arg(1)).ok_or(CmdError::Overflow("tty"))?,
        _ => return Err(ArgError::Usage("set tty [name]").into()),
    }
    Ok(Signal::Continue)
}

pub fn xaddr(ctx: &mut Context, env: &mut Env<'_>, args: &Args<'_>) -> Result<Signal, CmdError> {
    match args.argc() {
        1 => cprintln!(env.con, "addr\t{:#x}", ctx.addr),
        2 => ctx.addr = parse_hex(args.arg(1))?,
        _ => return Err(ArgError::Usage("set addr [hex]").into()),
    }
    Ok(Signal::Continue)
}

/// Hexadecimal with an optional `0x` prefix.
pub fn parse_hex(s: &str) -> Result<u64, ArgError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ArgError::BadNumber);
    }
    u64::from_str_radix(digits, 16).map_err(|_| ArgError::BadNumber)
}

pub fn xhowto(ctx: &mut Context, env: &mut Env<'_>, args: &Args<'_>) -> Result<Signal, CmdError> {
    if args.argc() < 2 {
        cprintln!(env.con, "boothowto={}", ctx.howto);
    } else {
        bootparse(ctx, args, 1)?;
    }
    Ok(Signal::Continue)
}

#[cfg(feature = "debug-cmd")]
pub fn xdebug(ctx: &mut Context, env: &mut Env<'_>, args: &Args<'_>) -> Result<Signal, CmdError> {
    match args.argc() {
        1 => cprintln!(env.con, "debug\t{}", if ctx.debug { "on" } else { "off" }),
        2 => {
            ctx.debug = !matches!(args.arg(1), "0" | "off");
            log::set_max_level(if ctx.debug {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            });
        }
        _ => return Err(ArgError::Usage("set debug [on|off]").into()),
    }
    Ok(Signal::Continue)
}

// ---- misc ----

pub fn xecho(_ctx: &mut Context, env: &mut Env<'_>, args: &Args<'_>) -> Result<Signal, CmdError> {
    for (i, word) in args.rest(1).iter().enumerate() {
        if i > 0 {
            cprint!(env.con, " ");
        }
        cprint!(env.con, "{}", word);
    }
    cprintln!(env.con);
    Ok(Signal::Continue)
}

pub fn xhelp(_ctx: &mut Context, env: &mut Env<'_>, _args: &Args<'_>) -> Result<Signal, CmdError> {
    cprint!(env.con, "commands:");
    for cmd in CMD_TABLE {
        cprint!(env.con, " {}", cmd.name);
    }
    cprintln!(env.con);
    Ok(Signal::Continue)
}

pub fn xtime(_ctx: &mut Context, env: &mut Env<'_>, args: &Args<'_>) -> Result<Signal, CmdError> {
    if args.argc() != 1 {
        return Err(ArgError::Usage("time").into());
    }
    env.clock.write_time(&mut env.con).map_err(|_| CmdError::Output)?;
    cprintln!(env.con, " (up {}s)", env.clock.secs());
    Ok(Signal::Continue)
}

pub fn xdmesg(_ctx: &mut Context, env: &mut Env<'_>, _args: &Args<'_>) -> Result<Signal, CmdError> {
    MSGBUF.lock().write_to(env.con);
    Ok(Signal::Continue)
}

pub fn xregs(_ctx: &mut Context, env: &mut Env<'_>, _args: &Args<'_>) -> Result<Signal, CmdError> {
    env.machine.dump_regs(&mut env.con).map_err(|_| CmdError::Output)?;
    Ok(Signal::Continue)
}

pub fn xreboot(_ctx: &mut Context, env: &mut Env<'_>, _args: &Args<'_>) -> Result<Signal, CmdError> {
    cprintln!(env.con, "Rebooting...");
    log::info!(target: "cmd", "reboot requested");
    env.machine.reboot()
}
