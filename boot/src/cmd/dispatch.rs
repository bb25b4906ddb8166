/// Line dispatcher: split a line into words, resolve the command through
/// the tables, build the argument vector and run the handler.
use heapless::Vec;

use super::table::{self, lookup, CmdEntry, CMD_TABLE};
use super::{ArgError, CmdError, Context, Env, Signal};
use crate::cprintln;
use crate::param::MAXARGV;

/// Argument vector. Words borrow the line they were split from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args<'l> {
    argv: Vec<&'l str, MAXARGV>,
}

impl<'l> Args<'l> {
    /// A vector holding only `argv[0]`.
    pub fn new(name: &'l str) -> Self {
        let mut argv = Vec::new();
        let _ = argv.push(name);
        Self { argv }
    }

    pub fn push(&mut self, word: &'l str) -> Result<(), ArgError> {
        self.argv.push(word).map_err(|_| ArgError::TooMany)
    }

    pub fn argc(&self) -> usize {
        self.argv.len()
    }

    pub fn name(&self) -> &'l str {
        self.argv[0]
    }

    pub fn get(&self, i: usize) -> Option<&'l str> {
        self.argv.get(i).copied()
    }

    /// `argv[i]`, or `""` past the end. For handlers that checked `argc`.
    pub fn arg(&self, i: usize) -> &'l str {
        self.get(i).unwrap_or("")
    }

    /// `argv[from..]`, empty if `from` is past the end.
    pub fn rest(&self, from: usize) -> &[&'l str] {
        self.argv.get(from..).unwrap_or(&[])
    }
}

/// Blank-separated words of `line`.
pub fn words(line: &str) -> impl Iterator<Item = &str> {
    line.split([' ', '\t']).filter(|w| !w.is_empty())
}

/// Resolve the command on `line`. On failure, returns the name to report
/// the error under.
///
/// A first word that names no command is taken as a kernel path, so the
/// whole line becomes the arguments of `boot`.
pub fn parse(line: &str) -> Result<(&'static CmdEntry, Args<'_>), (&'static str, CmdError)> {
    let mut words = words(line);
    let Some(first) = words.next() else {
        return Err(("", CmdError::Syntax));
    };

    let (entry, mut args) = match lookup(CMD_TABLE, first) {
        None => {
            let boot = table::boot_entry();
            let mut args = Args::new(boot.name);
            args.push(first).map_err(|e| (boot.name, e.into()))?;
            (boot, args)
        }
        Some(cmd) => match cmd.sub {
            Some(sub) => match words.next() {
                Some(word) => {
                    let var = lookup(sub, word).ok_or((cmd.name, CmdError::Syntax))?;
                    (var, Args::new(var.name))
                }
                None => (cmd, Args::new(cmd.name)),
            },
            None => (cmd, Args::new(cmd.name)),
        },
    };

    for word in words {
        args.push(word).map_err(|e| (entry.name, e.into()))?;
    }
    Ok((entry, args))
}

/// Run one line. Blank lines and `#` comments do nothing. Errors are
/// reported on the console and never stop the interpreter.
pub fn docmd(ctx: &mut Context, env: &mut Env<'_>, line: &str) -> Signal {
    let line = line.trim_start_matches([' ', '\t']);
    if line.is_empty() || line.starts_with('#') {
        return Signal::Continue;
    }

    match parse(line) {
        Ok((entry, args)) => execute(entry, ctx, env, &args),
        Err((name, e)) => {
            cprintln!(env.con, "{}: {}", name, e);
            Signal::Continue
        }
    }
}

pub fn execute(entry: &CmdEntry, ctx: &mut Context, env: &mut Env<'_>, args: &Args<'_>) -> Signal {
    log::debug!(target: "cmd", "{} argc={}", entry.name, args.argc());
    match (entry.exec)(ctx, env, args) {
        Ok(signal) => signal,
        Err(e) => {
            log::debug!(target: "cmd", "{} failed: {:?}", entry.name, e);
            cprintln!(env.con, "{}: {}", entry.name, e);
            Signal::Continue
        }
    }
}
