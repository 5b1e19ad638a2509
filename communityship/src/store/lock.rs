use std::{
    fs::{self, File, OpenOptions},
    io::{self, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use fs2::FileExt;

use crate::store::StoreError;

/// Name of the lock file created in the state directory.
pub const LOCK_FILE: &str = ".lock";

/// Advisory lock over a whole state directory, held for as long as the value lives.
///
/// The lock is taken on an open handle of [`LOCK_FILE`], not on the file's existence, so
/// the operating system releases it when the holding process dies. A lock file left behind
/// by a killed run does not block anyone.
#[derive(Debug)]
pub struct DirLock {
    path: PathBuf,
    file: File,
}

impl DirLock {
    /// Take the lock on `dir`, creating the directory if needed. A lock that is already
    /// held is retried up to `attempts` times, `delay` apart.
    pub fn acquire(dir: &Path, attempts: usize, delay: Duration) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_owned(),
            source,
        })?;
        let path = dir.join(LOCK_FILE);
        let mut file = match OpenOptions::new().read(true).write(true).create(true).open(&path) {
            Ok(file) => file,
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let attempts = attempts.max(1);
        for attempt in 1..=attempts {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    // The pid is informational only.
                    let _ = note_holder(&mut file);
                    log::debug!("locked {}", path.display());
                    return Ok(Self { path, file });
                }
                Err(e) if is_contended(&e) => {
                    log::debug!(
                        "{} is held, attempt {}/{}",
                        path.display(),
                        attempt,
                        attempts
                    );
                    if attempt < attempts {
                        thread::sleep(delay);
                    }
                }
                Err(source) => return Err(StoreError::Io { path, source }),
            }
        }
        Err(StoreError::Locked { path, attempts })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            log::warn!("could not release {}: {}", self.path.display(), e);
        }
    }
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

fn note_holder(file: &mut File) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{}", std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::store::tests::scratch_dir;

    #[test]
    fn second_lock_fails_until_first_is_dropped() {
        let dir = scratch_dir("lock");
        let first = DirLock::acquire(&dir, 1, Duration::from_millis(1)).unwrap();
        assert!(first.path().exists());
        match DirLock::acquire(&dir, 2, Duration::from_millis(1)) {
            Err(StoreError::Locked { attempts, .. }) => assert_eq!(attempts, 2),
            other => panic!("expected lock to be held, got {:?}", other),
        }
        drop(first);
        let again = DirLock::acquire(&dir, 1, Duration::from_millis(1)).unwrap();
        drop(again);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn leftover_lock_file_does_not_block() {
        let dir = scratch_dir("stale");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(LOCK_FILE), "99999\n").unwrap();
        let lock = DirLock::acquire(&dir, 1, Duration::from_millis(1)).unwrap();
        let holder = fs::read_to_string(lock.path()).unwrap();
        assert_eq!(holder.trim(), std::process::id().to_string());
        drop(lock);
        fs::remove_dir_all(&dir).unwrap();
    }
}
