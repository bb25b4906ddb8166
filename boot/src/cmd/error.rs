use core::fmt;

use crate::fs::FsError;
use crate::param::{truncated, PathString, Token};

/// Bad arguments to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    /// Unknown letter in a `-flags` token.
    BadOption(char),
    /// A token where a `-flags` token was expected.
    Illegal(Token),
    /// Wrong number of arguments; carries the usage line.
    Usage(&'static str),
    TooMany,
    BadNumber,
    /// Name that cannot be qualified into `device:path`.
    BadPath,
}

impl ArgError {
    pub fn illegal(tok: &str) -> Self {
        ArgError::Illegal(truncated(tok))
    }
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgError::BadOption(c) => write!(f, "bad option: {}", c),
            ArgError::Illegal(tok) => write!(f, "illegal argument {}", tok),
            ArgError::Usage(usage) => write!(f, "usage: {}", usage),
            ArgError::TooMany => write!(f, "too many arguments"),
            ArgError::BadNumber => write!(f, "bad number"),
            ArgError::BadPath => write!(f, "bad path"),
        }
    }
}

impl core::error::Error for ArgError {}

/// A failed filesystem operation, with what was being done and to what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoError {
    pub op: &'static str,
    pub path: PathString,
    pub cause: FsError,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}): {}", self.op, self.path, self.cause)
    }
}

/// Everything a command can fail with. Reported as `<command>: <error>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdError {
    /// Unknown subcommand.
    Syntax,
    Io(IoError),
    /// Configuration file failed the ownership/permission check.
    Insecure(PathString),
    Argument(ArgError),
    /// A fixed buffer would have overflowed; names the buffer.
    Overflow(&'static str),
    /// The operand exists but is not a directory.
    NotADirectory(PathString),
    /// A collaborator failed while formatting its report.
    Output,
}

impl CmdError {
    pub fn io(op: &'static str, path: &str, cause: FsError) -> Self {
        CmdError::Io(IoError {
            op,
            path: truncated(path),
            cause,
        })
    }
}

impl fmt::Display for CmdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmdError::Syntax => write!(f, "syntax error"),
            CmdError::Io(e) => write!(f, "{}", e),
            CmdError::Insecure(path) => write!(f, "non-secure {}, will not proceed", path),
            CmdError::Argument(e) => write!(f, "{}", e),
            CmdError::Overflow(what) => write!(f, "{} too long", what),
            CmdError::NotADirectory(path) => write!(f, "{}: not a directory", path),
            CmdError::Output => write!(f, "output error"),
        }
    }
}

impl core::error::Error for CmdError {}

impl From<ArgError> for CmdError {
    fn from(e: ArgError) -> Self {
        CmdError::Argument(e)
    }
}
