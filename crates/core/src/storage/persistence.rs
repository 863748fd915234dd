//! Disk persistence primitives: atomic writes and checksummed snapshots.
//!
//! Every store file is written to a temp file beside its target and renamed
//! into place only after the write succeeded, so a failed rebuild leaves the
//! previous generation readable. Snapshots are bincode payloads followed by a
//! CRC32 footer: `[payload][magic "ZSS1"][u32 CRC32 BE]`.

use crate::error::{EngineError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Magic bytes written before the CRC32 footer.
const SNAPSHOT_CRC_MAGIC: &[u8; 4] = b"ZSS1";

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `path` through a temp file and rename. Returns the bytes written.
///
/// `write` receives a buffered writer on the temp file. On any error the temp
/// file is removed and the existing `path` is left untouched.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<u64>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let tmp = tmp_path(path);

    let result = (|| -> Result<u64> {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        write(&mut writer)?;
        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(file.metadata()?.len())
    })();

    match result {
        Ok(len) => {
            fs::rename(&tmp, path)?;
            Ok(len)
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

/// Map a missing store file to [`EngineError::NotBuilt`].
pub fn not_built_if_missing(err: io::Error, path: &Path) -> EngineError {
    if err.kind() == io::ErrorKind::NotFound {
        EngineError::NotBuilt(path.to_path_buf())
    } else {
        EngineError::Io(err)
    }
}

/// Serialize `value` with bincode and write it atomically with a CRC32 footer.
pub fn save_snapshot<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<u64> {
    let bytes = bincode::serialize(value)?;
    let crc = crc32fast::hash(&bytes);

    let written = write_atomic(path, |w| {
        w.write_all(&bytes)?;
        w.write_all(SNAPSHOT_CRC_MAGIC)?;
        w.write_all(&crc.to_be_bytes())?;
        Ok(())
    })?;

    tracing::info!(
        "Saved snapshot {:?} ({} bytes, CRC32={:#010x})",
        path,
        bytes.len(),
        crc
    );
    Ok(written)
}

/// Load a snapshot written by [`save_snapshot`], verifying its checksum.
pub fn load_snapshot<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read(path).map_err(|e| not_built_if_missing(e, path))?;

    if raw.len() < 8 || &raw[raw.len() - 8..raw.len() - 4] != SNAPSHOT_CRC_MAGIC {
        return Err(EngineError::corrupt(path, "missing snapshot CRC footer"));
    }
    let payload = &raw[..raw.len() - 8];
    let stored_crc = u32::from_be_bytes([
        raw[raw.len() - 4],
        raw[raw.len() - 3],
        raw[raw.len() - 2],
        raw[raw.len() - 1],
    ]);
    let computed_crc = crc32fast::hash(payload);
    if computed_crc != stored_crc {
        return Err(EngineError::corrupt(
            path,
            format!(
                "CRC32 mismatch: expected {:#010x}, got {:#010x}",
                stored_crc, computed_crc
            ),
        ));
    }
    tracing::debug!("Snapshot CRC32 verified: {:#010x}", stored_crc);

    Ok(bincode::deserialize(payload)?)
}
