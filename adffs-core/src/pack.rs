//! Volume packs: ZIP archives holding a volume's directory tree.
//!
//! A pack is a plain ZIP with an optional `volume.json` manifest at its root
//! carrying the volume name, filesystem kind and read-only flag. Loading
//! builds a `MemoryVolume`; saving walks a mounted volume through the
//! adapter's own listing and read operations and writes the tree back out.
//! Links cannot be represented in a ZIP and are skipped with a warning.

use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::dir_ops;
use crate::error::AdfResult;
use crate::file_ops;
use crate::mount::AdfMount;
use crate::resolve::DentryKind;
use crate::vol::{MemoryVolume, Volume};

const MANIFEST_NAME: &str = "volume.json";

/// Pack manifest, stored as `volume.json` at the archive root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeManifest {
    pub name: String,
    pub filesystem: String,
    pub read_only: bool,
}

impl Default for VolumeManifest {
    fn default() -> Self {
        Self {
            name: "UNTITLED".to_string(),
            filesystem: "OFS".to_string(),
            read_only: false,
        }
    }
}

/// Load a volume pack from any seekable reader.
///
/// `fallback_name` is used when the archive carries no manifest.
pub fn load_volume_pack<R: Read + Seek>(
    reader: R,
    fallback_name: &str,
) -> AdfResult<MemoryVolume> {
    let mut archive = ZipArchive::new(reader)?;

    let manifest = match archive.by_name(MANIFEST_NAME) {
        Ok(mut entry) => {
            let mut raw = Vec::new();
            entry.read_to_end(&mut raw)?;
            serde_json::from_slice::<VolumeManifest>(&raw)?
        }
        Err(_) => VolumeManifest {
            name: fallback_name.to_string(),
            ..VolumeManifest::default()
        },
    };

    let mut vol = MemoryVolume::new(&manifest.name);
    vol.set_filesystem(&manifest.filesystem);

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        if name == MANIFEST_NAME {
            continue;
        }
        if entry.is_dir() {
            vol.add_dir_path(name.trim_end_matches('/'));
        } else {
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            vol.add_file_path(&name, data);
        }
    }

    // The flag is applied last so the builder calls above are unaffected.
    vol.set_read_only(manifest.read_only);
    debug!(name = %manifest.name, entries = archive.len(), "volume pack loaded");
    Ok(vol)
}

/// Load a volume pack from a file. The file stem names the volume when the
/// pack has no manifest.
pub fn load_volume_from_path(path: &Path) -> AdfResult<MemoryVolume> {
    let fallback = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNTITLED");
    let file = File::open(path)?;
    load_volume_pack(BufReader::new(file), fallback)
}

/// Save a mounted volume as a pack.
///
/// The tree is walked through the adapter, so whatever the adapter can list
/// and read ends up in the archive. Link entries and unrecognized entry
/// types are skipped.
pub fn save_volume_pack<V: Volume, W: Write + Seek>(
    mount: &mut AdfMount<V>,
    writer: W,
) -> AdfResult<()> {
    let info = mount.volume().info();
    let manifest = VolumeManifest {
        name: info.name,
        filesystem: info.filesystem,
        read_only: info.read_only,
    };

    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default();
    zip.start_file(MANIFEST_NAME, options)?;
    zip.write_all(&serde_json::to_vec_pretty(&manifest)?)?;

    save_dir(mount, "/", "", &mut zip, options)?;
    zip.finish()?;
    Ok(())
}

fn save_dir<V: Volume, W: Write + Seek>(
    mount: &mut AdfMount<V>,
    dir_path: &str,
    archive_prefix: &str,
    zip: &mut ZipWriter<W>,
    options: SimpleFileOptions,
) -> AdfResult<()> {
    for dentry in dir_ops::list(mount, dir_path)? {
        let name = dentry.raw.name.clone();
        let full = if dir_path == "/" {
            format!("/{name}")
        } else {
            format!("{dir_path}/{name}")
        };
        let archived = format!("{archive_prefix}{name}");
        match dentry.kind {
            DentryKind::File => {
                let data = file_ops::read_all(mount, &full)?;
                zip.start_file(archived.as_str(), options)?;
                zip.write_all(&data)?;
            }
            DentryKind::Dir => {
                zip.add_directory(archived.as_str(), options)?;
                save_dir(mount, &full, &format!("{archived}/"), zip, options)?;
            }
            DentryKind::LinkFile | DentryKind::LinkDir | DentryKind::SoftLink => {
                warn!(path = %full, "link entries cannot be packed, skipping");
            }
            DentryKind::Unknown => {
                warn!(path = %full, "unrecognized entry type, skipping");
            }
        }
    }
    Ok(())
}
