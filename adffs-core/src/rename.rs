//! Rename across directories.
//!
//! The rename primitive is sector-scoped: it needs the sector of the source
//! parent directory and of the destination parent directory, plus the two
//! leaf names. Both parents are resolved independently through the entry
//! resolver; the paths are first converted to the volume's native notation
//! so host-style `..` components survive the walk.

use tracing::warn;

use crate::error::{AdfError, AdfResult};
use crate::mount::AdfMount;
use crate::path;
use crate::resolve::{self, DentryKind};
use crate::vol::{Sector, Volume};

/// Sectors 0 and 1 hold the boot area; no directory ever sits there.
const FIRST_ENTRY_SECTOR: Sector = 2;

/// Move and/or relabel the entry at `src` to `dst`.
pub fn rename<V: Volume>(mount: &mut AdfMount<V>, src: &str, dst: &str) -> AdfResult<()> {
    let sp_src = path::split(src);
    let sp_dst = path::split(dst);
    if sp_src.leaf.is_empty() {
        return Err(AdfError::InvalidPath(src.to_string()));
    }
    if sp_dst.leaf.is_empty() {
        return Err(AdfError::InvalidPath(dst.to_string()));
    }

    let src_dir = path::to_volume_notation(&sp_src.dir_path);
    let dst_dir = path::to_volume_notation(&sp_dst.dir_path);

    let src_parent = parent_sector(mount, &src_dir)?;
    let dst_parent = parent_sector(mount, &dst_dir)?;

    mount
        .vol
        .rename_entry(src_parent, &sp_src.leaf, dst_parent, &sp_dst.leaf)
}

/// Sector of the directory named by `dir` (volume notation, relative to the
/// root; empty means the root itself). A hard directory link stands in for
/// the directory it denotes.
fn parent_sector<V: Volume>(mount: &mut AdfMount<V>, dir: &str) -> AdfResult<Sector> {
    let sector = if dir.is_empty() {
        mount.volume().root_entry()?.sector
    } else {
        let dentry = resolve::resolve(mount, &format!("/{dir}"))?
            .ok_or_else(|| AdfError::NotFound(dir.to_string()))?;
        match dentry.kind {
            DentryKind::Dir => dentry.raw.sector,
            DentryKind::LinkDir => dentry.raw.real,
            _ => return Err(AdfError::NotADirectory(dir.to_string())),
        }
    };
    if sector < FIRST_ENTRY_SECTOR {
        warn!(dir, sector, "parent resolves into the reserved boot area");
        return Err(AdfError::IoFault(format!(
            "directory {dir} resolves to reserved sector {sector}"
        )));
    }
    Ok(sector)
}
