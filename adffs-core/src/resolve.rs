//! Path to directory-entry resolution.
//!
//! The volume can only list the directory its cursor points at, so resolving
//! a full path means an excursion: move to the parent directory, scan its
//! listing for the leaf, and put the cursor back. The root is the one entry
//! with no parent to scan and is answered without touching the cursor.

use tracing::warn;

use crate::error::{AdfError, AdfResult};
use crate::mount::AdfMount;
use crate::path;
use crate::vol::{RawEntry, Volume, ST_DIR, ST_FILE, ST_LDIR, ST_LFILE, ST_LSOFT, ST_ROOT};

/// What kind of thing a directory entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DentryKind {
    File,
    Dir,
    /// Hard link to a file.
    LinkFile,
    /// Hard link to a directory.
    LinkDir,
    SoftLink,
    /// An entry type this adapter does not recognize. Reported, never fatal.
    Unknown,
}

/// A resolved directory entry.
#[derive(Debug, Clone)]
pub struct Dentry {
    pub kind: DentryKind,
    pub raw: RawEntry,
}

impl Dentry {
    pub fn name(&self) -> &str {
        &self.raw.name
    }

    pub fn sector(&self) -> crate::vol::Sector {
        self.raw.sector
    }

    pub fn is_dir(&self) -> bool {
        self.kind == DentryKind::Dir
    }
}

/// Map an on-disk secondary type code to an entry kind.
pub fn classify(type_code: i32) -> DentryKind {
    match type_code {
        ST_ROOT | ST_DIR => DentryKind::Dir,
        ST_FILE => DentryKind::File,
        ST_LFILE => DentryKind::LinkFile,
        ST_LDIR => DentryKind::LinkDir,
        ST_LSOFT => DentryKind::SoftLink,
        _ => DentryKind::Unknown,
    }
}

pub(crate) fn dentry_from_raw(raw: RawEntry) -> Dentry {
    let kind = classify(raw.type_code);
    if kind == DentryKind::Unknown {
        warn!(name = %raw.name, type_code = raw.type_code, "unrecognized entry type");
    }
    Dentry { kind, raw }
}

/// The root directory's own dentry. Answered without moving the cursor.
pub fn root_dentry<V: Volume>(mount: &AdfMount<V>) -> AdfResult<Dentry> {
    let raw = mount.volume().root_entry()?;
    Ok(Dentry {
        kind: DentryKind::Dir,
        raw,
    })
}

/// Resolve a path to its directory entry.
///
/// Returns `Ok(None)` when the path does not exist, including when one of
/// its parent directories does not; only volume faults surface as errors.
/// Leaf comparison is exact and case-sensitive. The cursor is back where it
/// started when this returns, on every path.
pub fn resolve<V: Volume>(mount: &mut AdfMount<V>, target: &str) -> AdfResult<Option<Dentry>> {
    let sp = path::split(target);
    if sp.is_root() {
        return root_dentry(mount).map(Some);
    }

    let mut exc = mount.excursion();
    // An absolute target walks from the root even when its parent part is
    // empty; a bare leaf resolves against the current directory.
    let dir_target = if target.starts_with('/') {
        format!("/{}", sp.dir_path)
    } else {
        sp.dir_path.clone()
    };
    if !dir_target.is_empty() {
        match exc.chdir(&dir_target) {
            Ok(()) => {}
            Err(AdfError::NotFound(_)) | Err(AdfError::NotADirectory(_)) => return Ok(None),
            Err(e) => return Err(e),
        }
    }

    if sp.leaf.is_empty() {
        // Trailing slash or a path ending in a parent marker: the entry is
        // the directory the walk landed in.
        let sector = exc.volume().current_dir_sector();
        let raw = exc.volume().read_entry_at(sector)?;
        return Ok(Some(dentry_from_raw(raw)));
    }

    let entries = exc.volume().list_current_dir()?;
    Ok(entries
        .into_iter()
        .find(|e| e.name == sp.leaf)
        .map(dentry_from_raw))
}

/// Read a link's target.
///
/// Soft links store the target as text and return it verbatim. Hard links
/// carry the sector of the real entry; the target is that entry's name.
pub fn readlink<V: Volume>(mount: &mut AdfMount<V>, target: &str) -> AdfResult<String> {
    let dentry = resolve(mount, target)?
        .ok_or_else(|| AdfError::NotFound(target.to_string()))?;
    match dentry.kind {
        DentryKind::SoftLink => dentry
            .raw
            .link_target
            .ok_or_else(|| AdfError::IoFault(format!("soft link {target} has no target"))),
        DentryKind::LinkFile | DentryKind::LinkDir => {
            let real = mount.volume().read_entry_at(dentry.raw.real)?;
            Ok(real.name)
        }
        _ => Err(AdfError::InvalidPath(format!("{target} is not a link"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vol::MemoryVolume;

    fn mounted() -> AdfMount<MemoryVolume> {
        let mut vol = MemoryVolume::new("ffdisk0049");
        vol.add_file_path("README.list49", b"disk 49 index\n".to_vec());
        vol.add_file_path("Plot/plot.c", b"int main(){}\n".to_vec());
        vol.add_file_path("Polygon/iffwriter/iffwriter.h", b"#pragma once\n".to_vec());
        AdfMount::new(vol)
    }

    #[test]
    fn test_resolve_root() {
        let mut m = mounted();
        let d = resolve(&mut m, "/").unwrap().unwrap();
        assert!(d.is_dir());
        assert_eq!(d.name(), "ffdisk0049");
        assert_eq!(m.cwd(), "/");
    }

    #[test]
    fn test_resolve_file_at_root() {
        let mut m = mounted();
        let d = resolve(&mut m, "/README.list49").unwrap().unwrap();
        assert_eq!(d.kind, DentryKind::File);
        assert_eq!(d.raw.size, 14);
    }

    #[test]
    fn test_resolve_nested_file() {
        let mut m = mounted();
        let d = resolve(&mut m, "/Polygon/iffwriter/iffwriter.h").unwrap().unwrap();
        assert_eq!(d.kind, DentryKind::File);
        assert_eq!(d.name(), "iffwriter.h");
        // cursor neutral
        assert_eq!(m.cwd(), "/");
    }

    #[test]
    fn test_resolve_missing_is_none() {
        let mut m = mounted();
        assert!(resolve(&mut m, "/nosuch").unwrap().is_none());
        assert!(resolve(&mut m, "/nosuch/deeper").unwrap().is_none());
        assert!(resolve(&mut m, "/Plot/nosuch.c").unwrap().is_none());
    }

    #[test]
    fn test_resolve_leaf_is_case_sensitive() {
        let mut m = mounted();
        assert!(resolve(&mut m, "/Plot/PLOT.C").unwrap().is_none());
        assert!(resolve(&mut m, "/Plot/plot.c").unwrap().is_some());
    }

    #[test]
    fn test_resolve_relative_to_cursor() {
        let mut m = mounted();
        m.chdir("/Plot").unwrap();
        let d = resolve(&mut m, "plot.c").unwrap().unwrap();
        assert_eq!(d.kind, DentryKind::File);
        assert_eq!(m.cwd(), "/Plot");
    }

    #[test]
    fn test_resolve_unknown_type() {
        let mut m = mounted();
        m.vol.add_unknown_entry("strange", 99);
        let d = resolve(&mut m, "/strange").unwrap().unwrap();
        assert_eq!(d.kind, DentryKind::Unknown);
    }

    #[test]
    fn test_resolve_links() {
        let mut m = mounted();
        let real = m.vol.sector_of("README.list49").unwrap();
        m.vol.add_link_file("readme-link", real);
        let plot = m.vol.sector_of("Plot").unwrap();
        m.vol.add_link_dir("plot-link", plot);
        m.vol.add_soft_link("soft", "Plot/plot.c");

        assert_eq!(
            resolve(&mut m, "/readme-link").unwrap().unwrap().kind,
            DentryKind::LinkFile
        );
        assert_eq!(
            resolve(&mut m, "/plot-link").unwrap().unwrap().kind,
            DentryKind::LinkDir
        );
        assert_eq!(
            resolve(&mut m, "/soft").unwrap().unwrap().kind,
            DentryKind::SoftLink
        );
    }

    #[test]
    fn test_readlink() {
        let mut m = mounted();
        let real = m.vol.sector_of("README.list49").unwrap();
        m.vol.add_link_file("readme-link", real);
        m.vol.add_soft_link("soft", "Plot/plot.c");

        assert_eq!(readlink(&mut m, "/soft").unwrap(), "Plot/plot.c");
        assert_eq!(readlink(&mut m, "/readme-link").unwrap(), "README.list49");
        assert!(matches!(
            readlink(&mut m, "/README.list49"),
            Err(AdfError::InvalidPath(_))
        ));
        assert!(matches!(
            readlink(&mut m, "/nosuch"),
            Err(AdfError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_trailing_slash_names_directory() {
        let mut m = mounted();
        let d = resolve(&mut m, "/Plot/").unwrap().unwrap();
        assert!(d.is_dir());
        assert_eq!(d.name(), "Plot");
    }
}
