//! Mounted volume with a tracked directory cursor.
//!
//! The volume exposes one mutable cursor and no way to ask where it points
//! beyond the raw sector number. `AdfMount` wraps the volume and mirrors the
//! cursor's position as an absolute path string, kept in lock-step with every
//! cursor movement. Path-addressed operations are built on a
//! checkpoint / walk / act / restore protocol; the `Excursion` guard makes
//! the restore happen on every exit path.

use tracing::warn;

use crate::error::AdfResult;
use crate::path;
use crate::vol::Volume;

/// A saved cursor position, restorable by replaying the path from the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorCheckpoint {
    cwd: String,
}

/// A mounted volume plus the mirrored current-directory path.
///
/// `cwd` always starts with `/` and never ends with one except when it is
/// the root itself. It is the only record of where the cursor sits; every
/// method that moves the cursor updates it in the same step.
pub struct AdfMount<V: Volume> {
    pub(crate) vol: V,
    cwd: String,
}

impl<V: Volume> AdfMount<V> {
    /// Mount a volume. The cursor is placed at the root.
    pub fn new(mut vol: V) -> Self {
        vol.to_root();
        Self {
            vol,
            cwd: "/".to_string(),
        }
    }

    /// The absolute path of the directory the cursor points at.
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn volume(&self) -> &V {
        &self.vol
    }

    pub fn into_volume(self) -> V {
        self.vol
    }

    /// Reset the cursor to the volume root.
    pub fn to_root(&mut self) {
        self.vol.to_root();
        self.cwd.clear();
        self.cwd.push('/');
    }

    /// Move the cursor to `path`.
    ///
    /// A leading slash makes the walk start from the root; otherwise it
    /// starts from the current directory. An empty target or `.` succeeds
    /// with no movement. Components are walked one at a time; an empty
    /// component climbs one level (native parent notation) and `.`
    /// components are skipped. On a failed walk the cursor is put back
    /// where it was before the call.
    pub fn chdir(&mut self, target: &str) -> AdfResult<()> {
        if target.is_empty() || target == "." {
            return Ok(());
        }
        let before = self.checkpoint();
        let rel = if target.starts_with('/') {
            self.to_root();
            path::strip_leading_slashes(target)
        } else {
            target
        };
        if rel.is_empty() {
            return Ok(());
        }
        for comp in rel.split('/') {
            if comp == "." {
                continue;
            }
            if let Err(e) = self.step(comp) {
                self.restore(&before);
                return Err(e);
            }
        }
        Ok(())
    }

    /// One cursor step plus the matching `cwd` update.
    fn step(&mut self, comp: &str) -> AdfResult<()> {
        self.vol.change_dir(comp)?;
        if comp.is_empty() {
            match self.cwd.rfind('/') {
                Some(0) | None => {
                    self.cwd.clear();
                    self.cwd.push('/');
                }
                Some(idx) => self.cwd.truncate(idx),
            }
        } else {
            if self.cwd != "/" {
                self.cwd.push('/');
            }
            self.cwd.push_str(comp);
        }
        Ok(())
    }

    /// Record the current cursor position.
    pub fn checkpoint(&self) -> CursorCheckpoint {
        CursorCheckpoint {
            cwd: self.cwd.clone(),
        }
    }

    /// Replay the cursor back to a saved position.
    ///
    /// If the saved path can no longer be walked (an ancestor was renamed or
    /// removed since), the cursor is left at the root rather than somewhere
    /// undefined.
    pub fn restore(&mut self, saved: &CursorCheckpoint) {
        self.to_root();
        let rel = path::strip_leading_slashes(&saved.cwd).to_string();
        for comp in rel.split('/') {
            if comp.is_empty() {
                continue;
            }
            if self.step(comp).is_err() {
                warn!(path = %saved.cwd, "cursor restore failed, falling back to root");
                self.to_root();
                return;
            }
        }
    }

    /// Start a scoped cursor excursion. When the returned guard drops, the
    /// cursor is restored to where it was at the call.
    pub fn excursion(&mut self) -> Excursion<'_, V> {
        let saved = self.checkpoint();
        Excursion { mount: self, saved }
    }
}

/// Guard over a temporary cursor move. Restores the saved position on drop,
/// on every exit path including early `?` returns.
pub struct Excursion<'a, V: Volume> {
    mount: &'a mut AdfMount<V>,
    saved: CursorCheckpoint,
}

impl<V: Volume> std::ops::Deref for Excursion<'_, V> {
    type Target = AdfMount<V>;

    fn deref(&self) -> &AdfMount<V> {
        self.mount
    }
}

impl<V: Volume> std::ops::DerefMut for Excursion<'_, V> {
    fn deref_mut(&mut self) -> &mut AdfMount<V> {
        self.mount
    }
}

impl<V: Volume> Drop for Excursion<'_, V> {
    fn drop(&mut self) {
        let saved = self.saved.clone();
        self.mount.restore(&saved);
    }
}
