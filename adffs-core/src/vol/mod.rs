//! Volume access contract.
//!
//! This module defines the interface the adapter consumes from a volume
//! implementation. It deliberately mirrors the shape of a classic Amiga
//! filesystem library: a single mutable "current directory" cursor that can
//! only move one path component at a time, a linear listing of the current
//! directory, file access by name within the current directory, and
//! mutations scoped to an explicit parent sector.

mod memory;

pub use memory::MemoryVolume;

use crate::error::AdfResult;

/// Block/sector number on the volume. Sectors 0 and 1 are the boot area and
/// never hold directory entries.
pub type Sector = i32;

/// AmigaDOS secondary type codes, as stored in entry blocks.
pub const ST_ROOT: i32 = 1;
pub const ST_DIR: i32 = 2;
pub const ST_LSOFT: i32 = 3;
pub const ST_LDIR: i32 = 4;
pub const ST_FILE: i32 = -3;
pub const ST_LFILE: i32 = -4;

/// Creation timestamp fields of an entry, as stored on the volume.
/// Not yet converted to an epoch value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryDate {
    pub year: i32,
    pub month: u32,
    pub days: u32,
    pub hour: u32,
    pub mins: u32,
    pub secs: u32,
}

impl Default for EntryDate {
    fn default() -> Self {
        Self {
            year: 1980,
            month: 1,
            days: 1,
            hour: 0,
            mins: 0,
            secs: 0,
        }
    }
}

/// A directory entry as returned by the volume, before classification.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub name: String,
    /// On-disk secondary type code (`ST_*`, or anything else for entry
    /// types this adapter does not recognize).
    pub type_code: i32,
    /// Sector of the entry's own header block.
    pub sector: Sector,
    /// For hard links: sector of the real entry the link denotes. 0 otherwise.
    pub real: Sector,
    /// Protection bits, exclude semantics (see `perm`).
    pub access: u32,
    /// Byte size; meaningful for files only.
    pub size: u32,
    pub date: EntryDate,
    /// For soft links: the stored textual target path.
    pub link_target: Option<String>,
}

/// Open mode for volume files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
}

/// Opaque handle to a file opened on the volume. Valid until closed;
/// independent of later cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHandle(pub(crate) u64);

/// Static facts about a mounted volume.
#[derive(Debug, Clone)]
pub struct VolumeInfo {
    pub name: String,
    pub filesystem: String,
    pub read_only: bool,
    pub block_size: u32,
    pub total_blocks: u32,
    pub free_blocks: u32,
}

/// Interface to a mounted volume.
///
/// The cursor is shared global state: no two operations on the same volume
/// may be interleaved, and a sequence that moves the cursor must put it back
/// (the adapter's responsibility, see `AdfMount`).
pub trait Volume {
    /// Reposition the cursor at the volume root. Never fails.
    fn to_root(&mut self);

    /// Move the cursor into one child directory of the current directory.
    ///
    /// Name matching is case-insensitive (AmigaDOS behavior). An empty
    /// `name` is the native parent marker and moves one level up.
    fn change_dir(&mut self, name: &str) -> AdfResult<()>;

    /// Sector of the directory the cursor currently points at.
    fn current_dir_sector(&self) -> Sector;

    /// List the entries of the current directory. One linear scan; the
    /// volume offers no indexed lookup through this interface.
    fn list_current_dir(&self) -> AdfResult<Vec<RawEntry>>;

    /// The root directory's own entry.
    fn root_entry(&self) -> AdfResult<RawEntry>;

    /// Read the entry whose header block sits at `sector`.
    fn read_entry_at(&self, sector: Sector) -> AdfResult<RawEntry>;

    /// Open a file by name within the current directory.
    fn file_open(&mut self, name: &str, mode: FileMode) -> AdfResult<FileHandle>;
    fn file_size(&self, handle: FileHandle) -> AdfResult<u32>;
    /// Position for the next read/write. Seeking past end-of-file fails.
    fn file_seek(&mut self, handle: FileHandle, pos: u32) -> AdfResult<()>;
    fn file_read(&mut self, handle: FileHandle, buf: &mut [u8]) -> AdfResult<usize>;
    fn file_write(&mut self, handle: FileHandle, data: &[u8]) -> AdfResult<usize>;
    fn file_truncate(&mut self, handle: FileHandle, new_size: u32) -> AdfResult<()>;
    fn file_close(&mut self, handle: FileHandle);

    /// Create a directory under the directory at `parent`.
    fn create_dir(&mut self, parent: Sector, name: &str) -> AdfResult<()>;
    /// Create an empty file under the directory at `parent`.
    fn create_file(&mut self, parent: Sector, name: &str) -> AdfResult<()>;
    /// Remove the named entry from the directory at `parent`.
    fn remove_entry(&mut self, parent: Sector, name: &str) -> AdfResult<()>;
    /// Move/relabel an entry from one parent directory to another.
    fn rename_entry(
        &mut self,
        src_parent: Sector,
        old_name: &str,
        dst_parent: Sector,
        new_name: &str,
    ) -> AdfResult<()>;

    /// Overwrite the protection bits of the entry at `sector`.
    fn set_entry_access(&mut self, sector: Sector, access: u32) -> AdfResult<()>;

    fn info(&self) -> VolumeInfo;
}
