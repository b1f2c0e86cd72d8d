//! File I/O by full path.
//!
//! The volume opens files by name within the current directory only, so each
//! operation here is an excursion: move to the parent, open the leaf, put
//! the cursor back, then seek and transfer against the open handle. Handles
//! stay valid across cursor movement, and every code path closes them.
//!
//! A seek that fails (offset past end-of-file) transfers zero bytes instead
//! of raising an error; readers at EOF expect a short count, not a fault.

use crate::error::{AdfError, AdfResult};
use crate::mount::AdfMount;
use crate::path;
use crate::vol::{FileHandle, FileMode, Volume};

/// Open the file at `target`, leaving the cursor where it was.
fn open_by_path<V: Volume>(
    mount: &mut AdfMount<V>,
    target: &str,
    mode: FileMode,
) -> AdfResult<FileHandle> {
    let sp = path::split(target);
    if sp.leaf.is_empty() {
        return Err(AdfError::InvalidPath(target.to_string()));
    }
    let mut exc = mount.excursion();
    let dir_target = if target.starts_with('/') {
        format!("/{}", sp.dir_path)
    } else {
        sp.dir_path.clone()
    };
    if !dir_target.is_empty() {
        exc.chdir(&dir_target)
            .map_err(|_| AdfError::NotFound(target.to_string()))?;
    }
    exc.vol.file_open(&sp.leaf, mode).map_err(|e| match e {
        AdfError::NotFound(_) => AdfError::NotFound(target.to_string()),
        other => other,
    })
}

/// Check that the file at `target` can be opened in the given mode.
pub fn open_check<V: Volume>(
    mount: &mut AdfMount<V>,
    target: &str,
    write: bool,
) -> AdfResult<()> {
    let mode = if write { FileMode::Write } else { FileMode::Read };
    let handle = open_by_path(mount, target, mode)?;
    mount.vol.file_close(handle);
    Ok(())
}

/// Size in bytes of the file at `target`.
pub fn file_size<V: Volume>(mount: &mut AdfMount<V>, target: &str) -> AdfResult<u32> {
    let handle = open_by_path(mount, target, FileMode::Read)?;
    let size = mount.vol.file_size(handle);
    mount.vol.file_close(handle);
    size
}

/// Read up to `buf.len()` bytes from `target` starting at `offset`.
///
/// Returns the number of bytes read; an offset at or past end-of-file gives
/// a short or zero count.
pub fn read<V: Volume>(
    mount: &mut AdfMount<V>,
    target: &str,
    offset: u32,
    buf: &mut [u8],
) -> AdfResult<usize> {
    let handle = open_by_path(mount, target, FileMode::Read)?;
    let result = match mount.vol.file_seek(handle, offset) {
        Err(_) => Ok(0),
        Ok(()) => mount.vol.file_read(handle, buf),
    };
    mount.vol.file_close(handle);
    result
}

/// Write `data` into `target` at `offset`, extending the file as needed.
///
/// Returns the number of bytes written; an offset past end-of-file gives
/// zero (writes append at most at the current end).
pub fn write<V: Volume>(
    mount: &mut AdfMount<V>,
    target: &str,
    offset: u32,
    data: &[u8],
) -> AdfResult<usize> {
    let handle = open_by_path(mount, target, FileMode::Write)?;
    let result = match mount.vol.file_seek(handle, offset) {
        Err(_) => Ok(0),
        Ok(()) => mount.vol.file_write(handle, data),
    };
    mount.vol.file_close(handle);
    result
}

/// Resize the file at `target` to exactly `new_size` bytes.
pub fn truncate<V: Volume>(
    mount: &mut AdfMount<V>,
    target: &str,
    new_size: u32,
) -> AdfResult<()> {
    let handle = open_by_path(mount, target, FileMode::Write)?;
    let result = mount.vol.file_truncate(handle, new_size);
    mount.vol.file_close(handle);
    result
}

/// Read the whole file at `target`.
pub fn read_all<V: Volume>(mount: &mut AdfMount<V>, target: &str) -> AdfResult<Vec<u8>> {
    let size = file_size(mount, target)? as usize;
    let mut buf = vec![0u8; size];
    let n = read(mount, target, 0, &mut buf)?;
    buf.truncate(n);
    Ok(buf)
}
