//! Directory listing and mutation.
//!
//! Listing is cursor-neutral: an excursion moves to the directory, reads it,
//! and puts the cursor back. Mutations take the simpler road the original
//! adapter takes: reset to the root, walk down to the parent, run the
//! primitive against the cursor's directory sector, and return to the root.
//! Callers therefore see the cursor at the root after any mutation.

use crate::error::{AdfError, AdfResult};
use crate::mount::AdfMount;
use crate::path;
use crate::perm::HostPerms;
use crate::resolve::{dentry_from_raw, Dentry};
use crate::vol::Volume;

/// List the entries of the directory at `target`.
pub fn list<V: Volume>(mount: &mut AdfMount<V>, target: &str) -> AdfResult<Vec<Dentry>> {
    let mut exc = mount.excursion();
    exc.chdir(target)?;
    let entries = exc.volume().list_current_dir()?;
    Ok(entries.into_iter().map(dentry_from_raw).collect())
}

/// Number of entries in the directory at `target`. Used for directory sizes
/// in stat results.
pub fn count_entries<V: Volume>(mount: &mut AdfMount<V>, target: &str) -> AdfResult<usize> {
    let mut exc = mount.excursion();
    exc.chdir(target)?;
    Ok(exc.volume().list_current_dir()?.len())
}

/// Create an empty file at `target` with the given host mode bits.
pub fn create_file<V: Volume>(mount: &mut AdfMount<V>, target: &str, mode: u32) -> AdfResult<()> {
    create_entry(mount, target, mode, false)
}

/// Create a directory at `target` with the given host mode bits.
pub fn create_dir<V: Volume>(mount: &mut AdfMount<V>, target: &str, mode: u32) -> AdfResult<()> {
    create_entry(mount, target, mode, true)
}

fn create_entry<V: Volume>(
    mount: &mut AdfMount<V>,
    target: &str,
    mode: u32,
    dir: bool,
) -> AdfResult<()> {
    let sp = path::split(target);
    if sp.leaf.is_empty() {
        return Err(AdfError::InvalidPath(target.to_string()));
    }
    with_parent(mount, &sp.dir_path, |m| {
        let parent = m.volume().current_dir_sector();
        if dir {
            m.vol.create_dir(parent, &sp.leaf)?;
        } else {
            m.vol.create_file(parent, &sp.leaf)?;
        }
        // The primitive creates with default (fully granted) access bits;
        // apply the requested mode while the new entry is in sight.
        let access = HostPerms::from_unix_mode(mode).to_access(0);
        if access != 0 {
            let sector = m
                .volume()
                .list_current_dir()?
                .into_iter()
                .find(|e| e.name == sp.leaf)
                .map(|e| e.sector)
                .ok_or_else(|| AdfError::IoFault(format!("created entry {target} vanished")))?;
            m.vol.set_entry_access(sector, access)?;
        }
        Ok(())
    })
}

/// Remove the entry at `target`. Shared by file and directory removal; the
/// volume refuses to remove a non-empty directory.
pub fn remove<V: Volume>(mount: &mut AdfMount<V>, target: &str) -> AdfResult<()> {
    let sp = path::split(target);
    if sp.leaf.is_empty() {
        return Err(AdfError::InvalidPath(target.to_string()));
    }
    with_parent(mount, &sp.dir_path, |m| {
        let parent = m.volume().current_dir_sector();
        let exists = m
            .volume()
            .list_current_dir()?
            .iter()
            .any(|e| e.name == sp.leaf);
        if !exists {
            return Err(AdfError::NotFound(target.to_string()));
        }
        m.vol.remove_entry(parent, &sp.leaf)
    })
}

/// Run `f` with the cursor at `dir_path` (walked from the root), then leave
/// the cursor at the root whatever happened.
fn with_parent<V: Volume, T>(
    mount: &mut AdfMount<V>,
    dir_path: &str,
    f: impl FnOnce(&mut AdfMount<V>) -> AdfResult<T>,
) -> AdfResult<T> {
    mount.to_root();
    let walked = if dir_path.is_empty() {
        Ok(())
    } else {
        mount.chdir(dir_path)
    };
    let result = walked.and_then(|_| f(mount));
    mount.to_root();
    result
}
