/// Filesystem collaborator.
///
/// The shell only ever reads: it stats names for `ls`/`cd`, enumerates
/// directories, and reads `boot.conf` a byte at a time. Paths handed to a
/// `FileSystem` are always fully qualified (`device:/path`), so an
/// implementation may serve several devices or reject foreign ones with
/// `FsError::NoDevice`.
use core::fmt;

use crate::param::FileName;

mod ramfs;

pub use ramfs::{RamFile, RamFs, RAMFS_FILES, RAMFS_OPEN};


// st_mode layout, as in <sys/stat.h>.
pub const S_IFMT: u32 = 0o170000;
pub const S_IFIFO: u32 = 0o010000;
pub const S_IFCHR: u32 = 0o020000;
pub const S_IFDIR: u32 = 0o040000;
pub const S_IFBLK: u32 = 0o060000;
pub const S_IFREG: u32 = 0o100000;
pub const S_IFLNK: u32 = 0o120000;
pub const S_IFSOCK: u32 = 0o140000;
pub const S_ISUID: u32 = 0o4000;
pub const S_ISGID: u32 = 0o2000;
pub const S_ISVTX: u32 = 0o1000;

/// Handle returned by `open`/`opendir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fd(pub usize);

/// File metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
}

impl Stat {
    pub fn file_type(&self) -> u32 {
        self.mode & S_IFMT
    }

    pub fn is_dir(&self) -> bool {
        self.file_type() == S_IFDIR
    }
}

/// Filesystem errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// No such file or directory.
    NotFound,
    /// The device part of the path names no attached device.
    NoDevice,
    NotADirectory,
    IsADirectory,
    /// Handle is not open, or is open as the wrong kind.
    BadFd,
    TooManyOpen,
    /// Path is not of the form `device:/path`.
    InvalidPath,
    NoSpace,
    /// Device-level read failure.
    Io,
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsError::NotFound => write!(f, "no such file or directory"),
            FsError::NoDevice => write!(f, "device not configured"),
            FsError::NotADirectory => write!(f, "not a directory"),
            FsError::IsADirectory => write!(f, "is a directory"),
            FsError::BadFd => write!(f, "bad file descriptor"),
            FsError::TooManyOpen => write!(f, "too many open files"),
            FsError::InvalidPath => write!(f, "invalid path"),
            FsError::NoSpace => write!(f, "no space left on device"),
            FsError::Io => write!(f, "input/output error"),
        }
    }
}

impl core::error::Error for FsError {}

pub trait FileSystem {
    /// Open a regular file for reading.
    fn open(&mut self, path: &str) -> Result<Fd, FsError>;

    /// Read up to `buf.len()` bytes. `Ok(0)` is end of file.
    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> Result<usize, FsError>;

    /// Metadata of an open file.
    fn fstat(&mut self, fd: Fd) -> Result<Stat, FsError>;

    fn close(&mut self, fd: Fd);

    /// Metadata by name.
    fn stat(&mut self, path: &str) -> Result<Stat, FsError>;

    fn opendir(&mut self, path: &str) -> Result<Fd, FsError>;

    /// Next entry name, or `Ok(None)` at the end of the directory.
    fn readdir(&mut self, dir: Fd) -> Result<Option<FileName>, FsError>;

    fn closedir(&mut self, dir: Fd);
}
