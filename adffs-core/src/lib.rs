//! Path-addressed adapter over a single-cursor Amiga volume
//!
//! This crate bridges two filesystem models:
//! - The volume side (`Volume` trait): one mutable directory cursor, moved
//!   one path component at a time, with listings and file access scoped to
//!   the directory the cursor points at.
//! - The host side: stateless operations on absolute slash-separated paths.
//!
//! # Architecture
//!
//! The bridge is layered:
//! - `Volume` trait: the raw single-cursor volume contract
//! - `AdfMount`: cursor tracking, checkpoint/restore, scoped excursions
//! - `resolve` / `attr` / `file_ops` / `dir_ops` / `rename`: path-addressed
//!   operations built on the excursion protocol
//! - `pack`: ZIP volume packs for loading and saving whole volumes

pub mod attr;
pub mod dir_ops;
pub mod error;
pub mod file_ops;
pub mod mount;
pub mod pack;
pub mod path;
pub mod perm;
pub mod rename;
pub mod resolve;
pub mod timeconv;
pub mod vol;

pub use attr::{set_permissions, stat, Metadata, MODE_DIR, MODE_FILE, MODE_LINK};
pub use error::{AdfError, AdfResult};
pub use mount::{AdfMount, CursorCheckpoint, Excursion};
pub use pack::{
    load_volume_from_path, load_volume_pack, save_volume_pack, VolumeManifest,
};
pub use perm::HostPerms;
pub use rename::rename;
pub use resolve::{readlink, resolve, root_dentry, Dentry, DentryKind};
pub use vol::{
    EntryDate, FileHandle, FileMode, MemoryVolume, RawEntry, Sector, Volume, VolumeInfo,
};
