use super::{ArgError, CmdError, Context};

impl Context {
    /// Turn `name` into a full `device:path` in the scratch path buffer.
    ///
    /// | name        | result                  |
    /// |-------------|-------------------------|
    /// | `dev:/p`    | `dev:/p`                |
    /// | `dev:p`     | `dev:` + cwd + `p`      |
    /// | `/p`        | bootdev + `:/p`         |
    /// | `p`         | bootdev + `:` + cwd + `p` |
    ///
    /// The returned slice borrows the buffer; the next call overwrites it.
    pub fn qualify(&mut self, name: &str) -> Result<&str, CmdError> {
        if !name.is_ascii() || name.contains('\0') {
            return Err(ArgError::BadPath.into());
        }

        self.path.clear();
        let joined = match name.split_once(':') {
            Some((dev, rest)) => {
                if dev.is_empty() || dev.contains('/') || rest.contains(':') {
                    return Err(ArgError::BadPath.into());
                }
                if rest.starts_with('/') {
                    join(&mut self.path, &[dev, ":", rest])
                } else {
                    join(&mut self.path, &[dev, ":", self.cwd.as_str(), rest])
                }
            }
            None if name.starts_with('/') => join(&mut self.path, &[self.bootdev.as_str(), ":", name]),
            None => join(&mut self.path, &[self.bootdev.as_str(), ":", self.cwd.as_str(), name]),
        };

        if joined.is_err() {
            self.path.clear();
            return Err(CmdError::Overflow("path"));
        }
        Ok(&self.path)
    }
}

fn join<const N: usize>(out: &mut heapless::String<N>, parts: &[&str]) -> Result<(), ()> {
    for part in parts {
        out.push_str(part)?;
    }
    Ok(())
}
