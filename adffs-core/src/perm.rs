//! Permission translation between host and volume models.
//!
//! AmigaDOS protection bits use exclude semantics: a bit that is *set* means
//! the permission is *absent*. Host modes are the usual include model. The
//! bridge inverts in both directions and only manages the user-level
//! read/write/execute bits; the volume's delete bit and any extended bits
//! are preserved untouched on writeback.

/// Volume protection masks (exclude semantics: set means denied).
pub const ACCMASK_D: u32 = 0x01;
pub const ACCMASK_E: u32 = 0x02;
pub const ACCMASK_W: u32 = 0x04;
pub const ACCMASK_R: u32 = 0x08;

/// The three managed bits.
const MANAGED: u32 = ACCMASK_R | ACCMASK_W | ACCMASK_E;

/// Host-side view of an entry's permissions (user-level rwx only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostPerms {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl HostPerms {
    /// Translate volume access bits to host permissions.
    pub fn from_access(access: u32) -> Self {
        Self {
            read: access & ACCMASK_R == 0,
            write: access & ACCMASK_W == 0,
            execute: access & ACCMASK_E == 0,
        }
    }

    /// Translate host permissions back to volume access bits, preserving all
    /// unmanaged bits of `prev` (delete, extended flags).
    pub fn to_access(self, prev: u32) -> u32 {
        let mut access = prev & !MANAGED;
        if !self.read {
            access |= ACCMASK_R;
        }
        if !self.write {
            access |= ACCMASK_W;
        }
        if !self.execute {
            access |= ACCMASK_E;
        }
        access
    }

    /// Extract the managed user bits from a host `st_mode`-style value.
    pub fn from_unix_mode(mode: u32) -> Self {
        Self {
            read: mode & 0o400 != 0,
            write: mode & 0o200 != 0,
            execute: mode & 0o100 != 0,
        }
    }

    /// Permission part of a host mode for a regular file.
    ///
    /// Group and other mirror the user's read and execute; write stays
    /// user-only.
    pub fn file_mode_bits(self) -> u32 {
        let mut mode = 0;
        if self.read {
            mode |= 0o444;
        }
        if self.write {
            mode |= 0o200;
        }
        if self.execute {
            mode |= 0o111;
        }
        mode
    }

    /// Permission part of a host mode for a directory.
    ///
    /// Directories are always traversable: execute is granted to everyone
    /// regardless of the volume's execute bit.
    pub fn dir_mode_bits(self) -> u32 {
        let mut mode = 0o111;
        if self.read {
            mode |= 0o444;
        }
        if self.write {
            mode |= 0o200;
        }
        mode
    }
}
