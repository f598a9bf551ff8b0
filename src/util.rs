use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();

/// Install the `tracing` subscriber once. `RUST_LOG` wins; default level is `info`.
/// Logs go to stderr so console output on stdout stays clean.
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .try_init();
    });
}

// -------- robust create/rename with backoff (Windows-friendly) --------

const FS_TRIES: usize = 16;
const FS_DELAY_MS: u64 = 50;

/// Return true for transient I/O errors often seen on Windows when AV/backup
/// filter drivers or sharing violations hold a file briefly.
fn is_retriable_io_error(e: &io::Error) -> bool {
    // 5 = access denied, 32 = sharing violation, 33 = lock violation
    matches!(e.raw_os_error(), Some(5) | Some(32) | Some(33))
}

fn with_backoff<T>(tries: usize, delay_ms: u64, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut last_err: Option<io::Error> = None;
    for i in 0..tries.max(1) {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if is_retriable_io_error(&e) => {
                last_err = Some(e);
                sleep(Duration::from_millis(delay_ms.saturating_mul((i + 1) as u64)));
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "operation failed after retries")))
}

/// Create a file with retries/backoff for transient errors.
pub fn create_with_backoff(path: &Path) -> io::Result<File> {
    with_backoff(FS_TRIES, FS_DELAY_MS, || File::create(path))
}

/// Remove a file with retries/backoff. Succeeds if the file doesn't exist.
pub fn remove_with_backoff(path: &Path) -> io::Result<()> {
    with_backoff(FS_TRIES, FS_DELAY_MS, || match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    })
}

fn rename_with_backoff(src: &Path, dest: &Path) -> io::Result<()> {
    with_backoff(FS_TRIES, FS_DELAY_MS, || fs::rename(src, dest))
}

/// Sibling temp path: `dir/.name.tmp`.
pub fn temp_path_for(dest: &Path) -> PathBuf {
    let name = dest.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    dest.with_file_name(format!(".{name}.tmp"))
}

/// Write `bytes` to `dest` all-or-nothing: write a sibling temp file, sync it, rename it
/// into place. On failure the temp file is removed and `dest` is never created.
pub fn write_file_atomic(dest: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let tmp = temp_path_for(dest);

    let written = (|| -> io::Result<()> {
        let mut f = create_with_backoff(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
        drop(f);
        rename_with_backoff(&tmp, dest)
    })();

    if let Err(e) = written {
        if let Err(rm) = remove_with_backoff(&tmp) {
            tracing::warn!(path = %tmp.display(), error = %rm, "Could not remove temp file");
        }
        return Err(e).with_context(|| format!("write {}", dest.display()));
    }
    Ok(())
}
