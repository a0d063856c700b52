//! Encrypted container layout and atomic output files.
//!
//! A container has this layout:
//!
//! ```text
//! [salt: 16 bytes][iv: 16 bytes][AES-CBC ciphertext, PKCS#7 padded]
//! ```
//!
//! There are no magic bytes and no length prefixes: every field size
//! follows from the cipher parameters, so the ciphertext is simply the
//! remainder of the file.

use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::{CryptkitError, Result};

/// Length of the scrypt salt in bytes.
pub const SALT_LEN: usize = 16;

/// Length of the CBC initialization vector (the AES block size).
pub const IV_LEN: usize = 16;

/// Fixed-size prefix: salt + iv.
pub const HEADER_LEN: usize = SALT_LEN + IV_LEN;

/// The parameters stored in front of the ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; IV_LEN],
}

impl ContainerHeader {
    /// Write `salt ‖ iv`.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(&self.salt)?;
        out.write_all(&self.iv)?;
        Ok(())
    }

    /// Read `salt ‖ iv` from the start of a container.
    ///
    /// A stream that ends before the header is complete is reported as an
    /// integrity failure, like any other malformed container.
    pub fn read_from<R: Read>(input: &mut R) -> Result<Self> {
        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; IV_LEN];
        read_exact_or_integrity(input, &mut salt)?;
        read_exact_or_integrity(input, &mut iv)?;
        Ok(Self { salt, iv })
    }
}

fn read_exact_or_integrity<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<()> {
    input.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            CryptkitError::IntegrityFailure
        } else {
            CryptkitError::Io(e)
        }
    })
}

/// Read until `buf` is full or the stream ends; returns bytes read.
///
/// `Interrupted` is retried; every other error is surfaced.
pub(crate) fn read_full<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// An output file that only appears at its final path once committed.
///
/// Data goes to a uniquely named `.<name>.*.tmp` file in the same
/// directory; `commit` flushes, syncs and renames it over the target.
/// If the value is dropped without being committed (an error, a panic),
/// the temp file is removed, so a reader never sees a half-written
/// container or partial plaintext.  Concurrent writers to the same
/// target each get their own temp file; the last commit wins.
pub struct AtomicFile {
    target: PathBuf,
    writer: BufWriter<NamedTempFile>,
}

impl AtomicFile {
    /// Create the temp file next to `target`.
    pub fn create(target: &Path) -> Result<Self> {
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let name = target.file_name().ok_or_else(|| {
            CryptkitError::InvalidParameter(format!(
                "output path '{}' has no file name",
                target.display()
            ))
        })?;

        let tmp = tempfile::Builder::new()
            .prefix(&format!(".{}.", name.to_string_lossy()))
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(CryptkitError::at(parent))?;
        debug!(tmp = %tmp.path().display(), "opened temp output");

        Ok(Self {
            target: target.to_path_buf(),
            writer: BufWriter::new(tmp),
        })
    }

    /// Final destination of this file.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Flush, sync and rename the temp file over the target.
    ///
    /// On failure the temp file is removed and the target is untouched.
    pub fn commit(self) -> Result<()> {
        let Self { target, writer } = self;
        let tmp = writer.into_inner().map_err(|e| {
            let (source, writer) = e.into_parts();
            let path = writer.get_ref().path().to_path_buf();
            CryptkitError::IoFailure { path, source }
        })?;
        tmp.as_file()
            .sync_all()
            .map_err(CryptkitError::at(tmp.path()))?;
        tmp.persist(&target)
            .map_err(|e| CryptkitError::at(&target)(e.error))?;
        debug!(path = %target.display(), "committed output");
        Ok(())
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
