//! Entry metadata (stat) and permission writeback (chmod).

use crate::dir_ops;
use crate::error::{AdfError, AdfResult};
use crate::mount::AdfMount;
use crate::perm::HostPerms;
use crate::resolve::{self, DentryKind};
use crate::timeconv::entry_time_to_unix;
use crate::vol::{RawEntry, Volume};

pub const MODE_DIR: u32 = 0o040000;
pub const MODE_FILE: u32 = 0o100000;
pub const MODE_LINK: u32 = 0o120000;

/// Host-side metadata of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    /// File type bits plus permission bits.
    pub mode: u32,
    /// Byte size for files, entry count for directories, target length for
    /// soft links.
    pub size: u64,
    /// 512-byte blocks, counted the way the original adapter does.
    pub blocks: u64,
    pub nlink: u32,
    pub mtime: i64,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.mode & MODE_DIR == MODE_DIR && self.mode & MODE_FILE != MODE_FILE
    }
}

fn entry_mtime(raw: &RawEntry) -> i64 {
    let d = raw.date;
    entry_time_to_unix(d.year, d.month, d.days, d.hour, d.mins, d.secs)
}

fn blocks_for(size: u64) -> u64 {
    size / 512 + 1
}

/// Stat the entry at `target`.
///
/// The root's access bits are not maintained by the volume library, so the
/// root gets a fixed 0755 instead of translated bits.
pub fn stat<V: Volume>(mount: &mut AdfMount<V>, target: &str) -> AdfResult<Metadata> {
    let sp = crate::path::split(target);
    if sp.is_root() {
        let raw = mount.volume().root_entry()?;
        let size = dir_ops::count_entries(mount, "/")? as u64;
        return Ok(Metadata {
            mode: MODE_DIR | 0o755,
            size,
            blocks: blocks_for(size),
            nlink: 1,
            mtime: entry_mtime(&raw),
        });
    }

    let dentry = resolve::resolve(mount, target)?
        .ok_or_else(|| AdfError::NotFound(target.to_string()))?;
    let perms = HostPerms::from_access(dentry.raw.access);
    let mtime = entry_mtime(&dentry.raw);

    match dentry.kind {
        DentryKind::File => {
            let size = dentry.raw.size as u64;
            Ok(Metadata {
                mode: MODE_FILE | perms.file_mode_bits(),
                size,
                blocks: blocks_for(size),
                nlink: 1,
                mtime,
            })
        }
        DentryKind::Dir => {
            let size = dir_ops::count_entries(mount, target)? as u64;
            Ok(Metadata {
                mode: MODE_DIR | perms.dir_mode_bits(),
                size,
                blocks: blocks_for(size),
                nlink: 1,
                mtime,
            })
        }
        DentryKind::SoftLink => {
            let size = dentry
                .raw
                .link_target
                .as_ref()
                .map(|t| t.len() as u64)
                .unwrap_or(0);
            Ok(Metadata {
                mode: MODE_LINK | 0o555,
                size,
                blocks: blocks_for(size),
                nlink: 1,
                mtime,
            })
        }
        DentryKind::LinkFile | DentryKind::LinkDir => Ok(Metadata {
            mode: MODE_LINK | 0o555,
            size: 0,
            blocks: 1,
            nlink: 1,
            mtime,
        }),
        DentryKind::Unknown => Err(AdfError::Unsupported(target.to_string())),
    }
}

/// Write host mode bits back to the entry's protection bits.
///
/// Only the user-level rwx bits are taken from `mode`; the entry's delete
/// and extended bits survive unchanged.
pub fn set_permissions<V: Volume>(
    mount: &mut AdfMount<V>,
    target: &str,
    mode: u32,
) -> AdfResult<()> {
    let dentry = resolve::resolve(mount, target)?
        .ok_or_else(|| AdfError::NotFound(target.to_string()))?;
    if dentry.kind == DentryKind::Unknown {
        return Err(AdfError::Unsupported(target.to_string()));
    }
    let access = HostPerms::from_unix_mode(mode).to_access(dentry.raw.access);
    mount.vol.set_entry_access(dentry.raw.sector, access)
}
