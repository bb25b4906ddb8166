/// RAM-backed read-only filesystem.
///
/// Serves a fixed table of files that already sit in memory: boot modules
/// handed over by Limine on bare metal, static byte strings in tests. There
/// is no on-disk format: each `RamFile` is a full path plus its bytes.
/// Directories exist implicitly whenever some file lives below them, or
/// explicitly through `RamFile::dir` when they need their own owner/mode.
use heapless::Vec;

use super::{Fd, FileSystem, FsError, Stat, S_IFDIR, S_IFMT, S_IFREG};
use crate::param::{bounded, DevString, FileName, PathString};

/// Maximum files in one RamFs.
pub const RAMFS_FILES: usize = 32;

/// Maximum simultaneously open handles.
pub const RAMFS_OPEN: usize = 4;

/// Size reported for directories.
const DIR_SIZE: u64 = 512;

/// A single file (or explicit directory) in the table.
#[derive(Debug, Clone, Copy)]
pub struct RamFile<'a> {
    /// Absolute path on the device, e.g. `/etc/boot.conf`.
    pub path: &'a str,
    pub data: &'a [u8],
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
}

impl<'a> RamFile<'a> {
    /// A regular file, mode 0644, owned by root.
    pub fn new(path: &'a str, data: &'a [u8]) -> Self {
        Self {
            path,
            data,
            mode: S_IFREG | 0o644,
            uid: 0,
            gid: 0,
        }
    }

    /// An explicit directory, mode 0755, owned by root.
    pub fn dir(path: &'a str) -> Self {
        Self {
            path,
            data: &[],
            mode: S_IFDIR | 0o755,
            uid: 0,
            gid: 0,
        }
    }

    /// Replace the permission bits, keeping the file type.
    pub fn perm(mut self, perm: u32) -> Self {
        self.mode = (self.mode & S_IFMT) | (perm & !S_IFMT);
        self
    }

    pub fn owner(mut self, uid: u32, gid: u32) -> Self {
        self.uid = uid;
        self.gid = gid;
        self
    }

    fn is_dir(&self) -> bool {
        self.mode & S_IFMT == S_IFDIR
    }

    fn stat(&self) -> Stat {
        Stat {
            mode: self.mode,
            uid: self.uid,
            gid: self.gid,
            size: if self.is_dir() { DIR_SIZE } else { self.data.len() as u64 },
        }
    }
}

#[derive(Debug, Clone, Default)]
enum Handle {
    #[default]
    Free,
    File { index: usize, offset: usize },
    Dir { path: PathString, cursor: usize },
}

/// What a path resolved to.
enum Node {
    File(usize),
    /// A directory, with its explicit table entry if it has one.
    Dir(Option<usize>),
}

pub struct RamFs<'a> {
    device: DevString,
    files: Vec<RamFile<'a>, RAMFS_FILES>,
    handles: [Handle; RAMFS_OPEN],
}

impl<'a> RamFs<'a> {
    /// Create an empty filesystem answering for `device`.
    pub fn new(device: &str) -> Result<Self, FsError> {
        Ok(Self {
            device: bounded(device).ok_or(FsError::InvalidPath)?,
            files: Vec::new(),
            handles: Default::default(),
        })
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// Add a file to the table.
    pub fn add(&mut self, file: RamFile<'a>) -> Result<(), FsError> {
        if !file.path.starts_with('/') || file.path.contains(':') {
            return Err(FsError::InvalidPath);
        }
        self.files.push(file).map_err(|_| FsError::NoSpace)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Strip and check the device part of a qualified path.
    fn local<'p>(&self, path: &'p str) -> Result<&'p str, FsError> {
        let (dev, rest) = path.split_once(':').ok_or(FsError::InvalidPath)?;
        if dev != self.device.as_str() {
            return Err(FsError::NoDevice);
        }
        Ok(rest)
    }

    fn resolve(&self, rest: &str) -> Result<Node, FsError> {
        let mut implicit = components(rest).next().is_none();
        for (i, file) in self.files.iter().enumerate() {
            if components(file.path).eq(components(rest)) {
                return Ok(if file.is_dir() { Node::Dir(Some(i)) } else { Node::File(i) });
            }
            if child_of(rest, file.path).is_some() {
                implicit = true;
            }
        }
        if implicit {
            Ok(Node::Dir(None))
        } else {
            Err(FsError::NotFound)
        }
    }

    fn node_stat(&self, node: &Node) -> Stat {
        match *node {
            Node::File(i) | Node::Dir(Some(i)) => self.files[i].stat(),
            Node::Dir(None) => Stat {
                mode: S_IFDIR | 0o755,
                uid: 0,
                gid: 0,
                size: DIR_SIZE,
            },
        }
    }

    fn alloc(&mut self, handle: Handle) -> Result<Fd, FsError> {
        let slot = self
            .handles
            .iter()
            .position(|h| matches!(h, Handle::Free))
            .ok_or(FsError::TooManyOpen)?;
        self.handles[slot] = handle;
        Ok(Fd(slot))
    }

    fn release(&mut self, fd: Fd) {
        if let Some(h) = self.handles.get_mut(fd.0) {
            *h = Handle::Free;
        }
    }
}

impl FileSystem for RamFs<'_> {
    fn open(&mut self, path: &str) -> Result<Fd, FsError> {
        let rest = self.local(path)?;
        match self.resolve(rest)? {
            Node::File(index) => self.alloc(Handle::File { index, offset: 0 }),
            Node::Dir(_) => Err(FsError::IsADirectory),
        }
    }

    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> Result<usize, FsError> {
        let files = &self.files;
        match self.handles.get_mut(fd.0) {
            Some(Handle::File { index, offset }) => {
                let data = files[*index].data;
                let remaining = &data[(*offset).min(data.len())..];
                let n = remaining.len().min(buf.len());
                buf[..n].copy_from_slice(&remaining[..n]);
                *offset += n;
                Ok(n)
            }
            _ => Err(FsError::BadFd),
        }
    }

    fn fstat(&mut self, fd: Fd) -> Result<Stat, FsError> {
        match self.handles.get(fd.0) {
            Some(Handle::File { index, .. }) => Ok(self.files[*index].stat()),
            _ => Err(FsError::BadFd),
        }
    }

    fn close(&mut self, fd: Fd) {
        if let Some(Handle::File { .. }) = self.handles.get(fd.0) {
            self.release(fd);
        }
    }

    fn stat(&mut self, path: &str) -> Result<Stat, FsError> {
        let rest = self.local(path)?;
        let node = self.resolve(rest)?;
        Ok(self.node_stat(&node))
    }

    fn opendir(&mut self, path: &str) -> Result<Fd, FsError> {
        let rest = self.local(path)?;
        match self.resolve(rest)? {
            Node::Dir(_) => {
                let path = bounded(rest).ok_or(FsError::InvalidPath)?;
                self.alloc(Handle::Dir { path, cursor: 0 })
            }
            Node::File(_) => Err(FsError::NotADirectory),
        }
    }

    fn readdir(&mut self, dir: Fd) -> Result<Option<FileName>, FsError> {
        let files = &self.files;
        let (path, cursor) = match self.handles.get_mut(dir.0) {
            Some(Handle::Dir { path, cursor }) => (path.as_str(), cursor),
            _ => return Err(FsError::BadFd),
        };

        while *cursor < files.len() {
            let i = *cursor;
            *cursor += 1;
            let Some(child) = child_of(path, files[i].path) else {
                continue;
            };
            // Several files can share a subdirectory; report it once.
            if files[..i].iter().any(|f| child_of(path, f.path) == Some(child)) {
                continue;
            }
            return bounded(child).map(Some).ok_or(FsError::InvalidPath);
        }
        Ok(None)
    }

    fn closedir(&mut self, dir: Fd) {
        if let Some(Handle::Dir { .. }) = self.handles.get(dir.0) {
            self.release(dir);
        }
    }
}

/// Path components, ignoring empty ones and `.`.
fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty() && *c != ".")
}

/// Name of the entry directly below `dir` on the way to `path`, if `path`
/// lies strictly inside `dir`.
fn child_of<'p>(dir: &str, path: &'p str) -> Option<&'p str> {
    let mut want = components(dir);
    let mut have = components(path);
    loop {
        match (want.next(), have.next()) {
            (Some(w), Some(h)) if w == h => continue,
            (None, Some(h)) => return Some(h),
            _ => return None,
        }
    }
}
