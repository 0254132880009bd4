//! Collision-free destination filename resolution.
//!
//! When a file's desired name already exists in the destination directory, a
//! numeric counter is inserted between the stem and the extension:
//! `report.pdf` becomes `report(1).pdf`, then `report(2).pdf`, and so on. The
//! counter starts at 1 with no separator before the parenthesis.
//!
//! Two entry points exist:
//! - [`preview`] performs a read-only existence probe and is used by dry runs,
//!   where nothing will be created.
//! - [`reserve`] atomically creates the resolved file with `create_new`
//!   (`O_EXCL`), so two concurrent workers targeting the same directory can
//!   never both claim the same name. The classic check-then-create race is
//!   closed by the filesystem itself rather than by a lock.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Upper bound on probe attempts before giving up on a name.
const MAX_PROBES: u32 = 10_000;

/// Splits a filename into (stem, extension-with-dot).
///
/// A dotfile such as `.bashrc` is treated as all stem.
fn split_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}

/// Formats the Nth alternative for a desired name.
fn numbered(file_name: &str, counter: u32) -> String {
    let (stem, extension) = split_name(file_name);
    format!("{}({}){}", stem, counter, extension)
}

/// Resolves a collision-free filename in `directory` without creating
/// anything.
///
/// Returns `desired` unchanged when it does not exist, otherwise the first
/// numbered alternative that does not exist. Intended for dry runs; under
/// concurrent real execution the answer can go stale, which is why real
/// relocation uses [`reserve`] instead.
///
/// # Examples
///
/// ```no_run
/// use dirsift::unique_name::preview;
/// use std::path::Path;
///
/// let name = preview(Path::new("/some/dir"), "report.pdf");
/// println!("would write to {}", name);
/// ```
pub fn preview(directory: &Path, desired: &str) -> String {
    if !directory.join(desired).exists() {
        return desired.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = numbered(desired, counter);
        if !directory.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Resolves a collision-free filename in `directory` and atomically creates
/// it, returning the full path and the open file handle.
///
/// The caller owns the created (empty) file and is expected to either fill it
/// or remove it. Probing stops after a bounded number of attempts so a
/// pathological directory cannot loop forever.
pub fn reserve(directory: &Path, desired: &str) -> io::Result<(PathBuf, File)> {
    let mut counter = 0;
    loop {
        let candidate = if counter == 0 {
            desired.to_string()
        } else {
            numbered(desired, counter)
        };
        let path = directory.join(&candidate);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                counter += 1;
                if counter > MAX_PROBES {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!(
                            "could not find a free name for {} after {} attempts",
                            desired, MAX_PROBES
                        ),
                    ));
                }
            }
            Err(e) => return Err(e),
        }
    }
}
