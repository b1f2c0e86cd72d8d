//! In-memory volume implementation.
//!
//! Reference backend with the same access model as the real library: one
//! cursor, relative one-component moves, linear directory listings, and
//! sector-scoped mutations. Sector numbers are synthetic; the root sits at
//! 880 like on a double-density floppy.

use std::collections::HashMap;

use tracing::debug;

use super::{
    EntryDate, FileHandle, FileMode, RawEntry, Sector, Volume, VolumeInfo, ST_DIR, ST_FILE,
    ST_LDIR, ST_LFILE, ST_LSOFT, ST_ROOT,
};
use crate::error::{AdfError, AdfResult};

const ROOT_SECTOR: Sector = 880;
const BLOCK_SIZE: u32 = 512;
const TOTAL_BLOCKS: u32 = 1758;

struct Node {
    name: String,
    type_code: i32,
    parent: Sector,
    real: Sector,
    link_target: Option<String>,
    access: u32,
    date: EntryDate,
    data: Vec<u8>,
    children: Vec<Sector>,
}

impl Node {
    fn new(name: &str, type_code: i32, parent: Sector) -> Self {
        Self {
            name: name.to_string(),
            type_code,
            parent,
            real: 0,
            link_target: None,
            access: 0,
            date: EntryDate::default(),
            data: Vec::new(),
            children: Vec::new(),
        }
    }

    fn is_dir(&self) -> bool {
        self.type_code == ST_ROOT || self.type_code == ST_DIR
    }
}

struct OpenFile {
    sector: Sector,
    pos: u32,
    mode: FileMode,
}

/// In-memory single-cursor volume.
pub struct MemoryVolume {
    nodes: HashMap<Sector, Node>,
    cur: Sector,
    next_sector: Sector,
    name: String,
    filesystem: String,
    read_only: bool,
    open: HashMap<u64, OpenFile>,
    next_handle: u64,
}

impl MemoryVolume {
    pub fn new(name: &str) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(ROOT_SECTOR, Node::new(name, ST_ROOT, 0));
        Self {
            nodes,
            cur: ROOT_SECTOR,
            next_sector: ROOT_SECTOR + 1,
            name: name.to_string(),
            filesystem: "OFS".to_string(),
            read_only: false,
            open: HashMap::new(),
            next_handle: 1,
        }
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn set_filesystem(&mut self, filesystem: &str) {
        self.filesystem = filesystem.to_string();
    }

    /// Sector of the entry at `path` (slash-separated from the root), if any.
    pub fn sector_of(&self, path: &str) -> Option<Sector> {
        let mut cur = ROOT_SECTOR;
        for comp in path.trim_matches('/').split('/') {
            if comp.is_empty() {
                continue;
            }
            cur = self.find_child(cur, comp)?;
        }
        Some(cur)
    }

    /// Create a directory chain from the root; returns the last sector.
    pub fn add_dir_path(&mut self, path: &str) -> Sector {
        let mut cur = ROOT_SECTOR;
        for comp in path.trim_matches('/').split('/') {
            if comp.is_empty() {
                continue;
            }
            cur = match self.find_child(cur, comp) {
                Some(s) => s,
                None => self.insert_node(Node::new(comp, ST_DIR, cur)),
            };
        }
        cur
    }

    /// Create a file (and any missing parent directories) with `data`.
    pub fn add_file_path(&mut self, path: &str, data: impl Into<Vec<u8>>) -> Sector {
        let trimmed = path.trim_matches('/');
        let (dir, leaf) = match trimmed.rfind('/') {
            Some(idx) => (&trimmed[..idx], &trimmed[idx + 1..]),
            None => ("", trimmed),
        };
        let parent = if dir.is_empty() {
            ROOT_SECTOR
        } else {
            self.add_dir_path(dir)
        };
        let mut node = Node::new(leaf, ST_FILE, parent);
        node.data = data.into();
        self.insert_node(node)
    }

    /// Create a soft link storing a textual target path.
    pub fn add_soft_link(&mut self, path: &str, target: &str) -> Sector {
        let mut node = self.link_node(path, ST_LSOFT);
        node.link_target = Some(target.to_string());
        self.insert_node(node)
    }

    /// Create a hard file link pointing at `real`.
    pub fn add_link_file(&mut self, path: &str, real: Sector) -> Sector {
        let mut node = self.link_node(path, ST_LFILE);
        node.real = real;
        self.insert_node(node)
    }

    /// Create a hard directory link pointing at `real`. The target sector is
    /// taken as given, so tests can build dangling or out-of-range links.
    pub fn add_link_dir(&mut self, path: &str, real: Sector) -> Sector {
        let mut node = self.link_node(path, ST_LDIR);
        node.real = real;
        self.insert_node(node)
    }

    /// Create an entry with an unrecognized on-disk type code.
    pub fn add_unknown_entry(&mut self, path: &str, type_code: i32) -> Sector {
        let node = self.link_node(path, type_code);
        self.insert_node(node)
    }

    /// Set the creation date of an existing entry.
    pub fn set_entry_date(&mut self, path: &str, date: EntryDate) {
        if let Some(sector) = self.sector_of(path) {
            if let Some(node) = self.nodes.get_mut(&sector) {
                node.date = date;
            }
        }
    }

    fn link_node(&mut self, path: &str, type_code: i32) -> Node {
        let trimmed = path.trim_matches('/');
        let (dir, leaf) = match trimmed.rfind('/') {
            Some(idx) => (&trimmed[..idx], &trimmed[idx + 1..]),
            None => ("", trimmed),
        };
        let parent = if dir.is_empty() {
            ROOT_SECTOR
        } else {
            self.add_dir_path(dir)
        };
        Node::new(leaf, type_code, parent)
    }

    fn insert_node(&mut self, node: Node) -> Sector {
        let sector = self.next_sector;
        self.next_sector += 1;
        let parent = node.parent;
        self.nodes.insert(sector, node);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(sector);
        }
        sector
    }

    fn node(&self, sector: Sector) -> AdfResult<&Node> {
        self.nodes
            .get(&sector)
            .ok_or_else(|| AdfError::IoFault(format!("no entry block at sector {sector}")))
    }

    fn node_mut(&mut self, sector: Sector) -> AdfResult<&mut Node> {
        self.nodes
            .get_mut(&sector)
            .ok_or_else(|| AdfError::IoFault(format!("no entry block at sector {sector}")))
    }

    /// Case-insensitive child lookup, like the library's name hashing.
    fn find_child(&self, dir: Sector, name: &str) -> Option<Sector> {
        let node = self.nodes.get(&dir)?;
        node.children
            .iter()
            .copied()
            .find(|s| {
                self.nodes
                    .get(s)
                    .is_some_and(|n| n.name.eq_ignore_ascii_case(name))
            })
    }

    fn raw_entry(&self, sector: Sector, node: &Node) -> RawEntry {
        RawEntry {
            name: node.name.clone(),
            type_code: node.type_code,
            sector,
            real: node.real,
            access: node.access,
            size: node.data.len() as u32,
            date: node.date,
            link_target: node.link_target.clone(),
        }
    }

    fn check_writable(&self) -> AdfResult<()> {
        if self.read_only {
            Err(AdfError::ReadOnly)
        } else {
            Ok(())
        }
    }

    /// Resolve a file-open target: plain file, or hard file link followed to
    /// its real entry.
    fn file_sector(&self, name: &str) -> AdfResult<Sector> {
        let sector = self
            .find_child(self.cur, name)
            .ok_or_else(|| AdfError::NotFound(name.to_string()))?;
        let node = self.node(sector)?;
        match node.type_code {
            ST_FILE => Ok(sector),
            ST_LFILE => {
                let real = self.node(node.real)?;
                if real.type_code == ST_FILE {
                    Ok(node.real)
                } else {
                    Err(AdfError::IoFault(format!(
                        "link {name} does not point at a file"
                    )))
                }
            }
            _ => Err(AdfError::NotFound(name.to_string())),
        }
    }

    fn blocks_used(&self) -> u32 {
        self.nodes
            .values()
            .map(|n| 1 + n.data.len() as u32 / BLOCK_SIZE)
            .sum()
    }
}

impl Volume for MemoryVolume {
    fn to_root(&mut self) {
        self.cur = ROOT_SECTOR;
    }

    fn change_dir(&mut self, name: &str) -> AdfResult<()> {
        if name.is_empty() {
            // native parent marker
            let node = self.node(self.cur)?;
            if node.type_code == ST_ROOT {
                return Err(AdfError::NotFound("parent of root".to_string()));
            }
            self.cur = node.parent;
            return Ok(());
        }
        let sector = self
            .find_child(self.cur, name)
            .ok_or_else(|| AdfError::NotFound(name.to_string()))?;
        let node = self.node(sector)?;
        match node.type_code {
            ST_DIR | ST_ROOT => {
                self.cur = sector;
                Ok(())
            }
            ST_LDIR => {
                let real = node.real;
                if self.node(real)?.is_dir() {
                    self.cur = real;
                    Ok(())
                } else {
                    Err(AdfError::IoFault(format!(
                        "link {name} does not point at a directory"
                    )))
                }
            }
            _ => Err(AdfError::NotADirectory(name.to_string())),
        }
    }

    fn current_dir_sector(&self) -> Sector {
        self.cur
    }

    fn list_current_dir(&self) -> AdfResult<Vec<RawEntry>> {
        let node = self.node(self.cur)?;
        node.children
            .iter()
            .map(|&s| Ok(self.raw_entry(s, self.node(s)?)))
            .collect()
    }

    fn root_entry(&self) -> AdfResult<RawEntry> {
        let node = self.node(ROOT_SECTOR)?;
        Ok(self.raw_entry(ROOT_SECTOR, node))
    }

    fn read_entry_at(&self, sector: Sector) -> AdfResult<RawEntry> {
        Ok(self.raw_entry(sector, self.node(sector)?))
    }

    fn file_open(&mut self, name: &str, mode: FileMode) -> AdfResult<FileHandle> {
        if mode == FileMode::Write {
            self.check_writable()?;
        }
        let sector = self.file_sector(name)?;
        let handle = self.next_handle;
        self.next_handle += 1;
        self.open.insert(handle, OpenFile { sector, pos: 0, mode });
        debug!(name, handle, "file opened");
        Ok(FileHandle(handle))
    }

    fn file_size(&self, handle: FileHandle) -> AdfResult<u32> {
        let open = self
            .open
            .get(&handle.0)
            .ok_or_else(|| AdfError::IoFault("stale file handle".to_string()))?;
        Ok(self.node(open.sector)?.data.len() as u32)
    }

    fn file_seek(&mut self, handle: FileHandle, pos: u32) -> AdfResult<()> {
        let size = self.file_size(handle)?;
        let open = self
            .open
            .get_mut(&handle.0)
            .ok_or_else(|| AdfError::IoFault("stale file handle".to_string()))?;
        if pos > size {
            return Err(AdfError::IoFault(format!(
                "seek to {pos} past end of file ({size})"
            )));
        }
        open.pos = pos;
        Ok(())
    }

    fn file_read(&mut self, handle: FileHandle, buf: &mut [u8]) -> AdfResult<usize> {
        let open = self
            .open
            .get(&handle.0)
            .ok_or_else(|| AdfError::IoFault("stale file handle".to_string()))?;
        let (sector, pos) = (open.sector, open.pos as usize);
        let data = &self.node(sector)?.data;
        if pos >= data.len() {
            return Ok(0);
        }
        let n = buf.len().min(data.len() - pos);
        buf[..n].copy_from_slice(&data[pos..pos + n]);
        if let Some(open) = self.open.get_mut(&handle.0) {
            open.pos += n as u32;
        }
        Ok(n)
    }

    fn file_write(&mut self, handle: FileHandle, data: &[u8]) -> AdfResult<usize> {
        self.check_writable()?;
        let open = self
            .open
            .get(&handle.0)
            .ok_or_else(|| AdfError::IoFault("stale file handle".to_string()))?;
        if open.mode != FileMode::Write {
            return Err(AdfError::IoFault("file not opened for writing".to_string()));
        }
        let (sector, pos) = (open.sector, open.pos as usize);
        let node = self.node_mut(sector)?;
        if node.data.len() < pos + data.len() {
            node.data.resize(pos + data.len(), 0);
        }
        node.data[pos..pos + data.len()].copy_from_slice(data);
        if let Some(open) = self.open.get_mut(&handle.0) {
            open.pos += data.len() as u32;
        }
        Ok(data.len())
    }

    fn file_truncate(&mut self, handle: FileHandle, new_size: u32) -> AdfResult<()> {
        self.check_writable()?;
        let open = self
            .open
            .get(&handle.0)
            .ok_or_else(|| AdfError::IoFault("stale file handle".to_string()))?;
        if open.mode != FileMode::Write {
            return Err(AdfError::IoFault("file not opened for writing".to_string()));
        }
        let sector = open.sector;
        let node = self.node_mut(sector)?;
        node.data.resize(new_size as usize, 0);
        Ok(())
    }

    fn file_close(&mut self, handle: FileHandle) {
        self.open.remove(&handle.0);
    }

    fn create_dir(&mut self, parent: Sector, name: &str) -> AdfResult<()> {
        self.check_writable()?;
        if !self.node(parent)?.is_dir() {
            return Err(AdfError::IoFault(format!(
                "sector {parent} is not a directory"
            )));
        }
        if self.find_child(parent, name).is_some() {
            return Err(AdfError::Exists(name.to_string()));
        }
        self.insert_node(Node::new(name, ST_DIR, parent));
        Ok(())
    }

    fn create_file(&mut self, parent: Sector, name: &str) -> AdfResult<()> {
        self.check_writable()?;
        if !self.node(parent)?.is_dir() {
            return Err(AdfError::IoFault(format!(
                "sector {parent} is not a directory"
            )));
        }
        if self.find_child(parent, name).is_some() {
            return Err(AdfError::Exists(name.to_string()));
        }
        self.insert_node(Node::new(name, ST_FILE, parent));
        Ok(())
    }

    fn remove_entry(&mut self, parent: Sector, name: &str) -> AdfResult<()> {
        self.check_writable()?;
        let sector = self
            .find_child(parent, name)
            .ok_or_else(|| AdfError::IoFault(format!("no entry {name} to remove")))?;
        if !self.node(sector)?.children.is_empty() {
            return Err(AdfError::IoFault(format!("directory {name} not empty")));
        }
        self.nodes.remove(&sector);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|&s| s != sector);
        }
        Ok(())
    }

    fn rename_entry(
        &mut self,
        src_parent: Sector,
        old_name: &str,
        dst_parent: Sector,
        new_name: &str,
    ) -> AdfResult<()> {
        self.check_writable()?;
        if !self.node(dst_parent)?.is_dir() {
            return Err(AdfError::IoFault(format!(
                "sector {dst_parent} is not a directory"
            )));
        }
        let sector = self
            .find_child(src_parent, old_name)
            .ok_or_else(|| AdfError::IoFault(format!("no entry {old_name} to rename")))?;
        if self.find_child(dst_parent, new_name).is_some() {
            return Err(AdfError::Exists(new_name.to_string()));
        }
        if let Some(p) = self.nodes.get_mut(&src_parent) {
            p.children.retain(|&s| s != sector);
        }
        let node = self.node_mut(sector)?;
        node.name = new_name.to_string();
        node.parent = dst_parent;
        if let Some(p) = self.nodes.get_mut(&dst_parent) {
            p.children.push(sector);
        }
        Ok(())
    }

    fn set_entry_access(&mut self, sector: Sector, access: u32) -> AdfResult<()> {
        self.check_writable()?;
        self.node_mut(sector)?.access = access;
        Ok(())
    }

    fn info(&self) -> VolumeInfo {
        VolumeInfo {
            name: self.name.clone(),
            filesystem: self.filesystem.clone(),
            read_only: self.read_only,
            block_size: BLOCK_SIZE,
            total_blocks: TOTAL_BLOCKS,
            free_blocks: TOTAL_BLOCKS.saturating_sub(self.blocks_used()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryVolume {
        let mut vol = MemoryVolume::new("ffdisk0049");
        vol.add_file_path("README.list49", b"disk 49 index\n".to_vec());
        vol.add_file_path("Plot/plot.c", b"int main(){}\n".to_vec());
        vol
    }

    #[test]
    fn test_change_dir_and_list() {
        let mut vol = sample();
        assert_eq!(vol.list_current_dir().unwrap().len(), 2);
        vol.change_dir("Plot").unwrap();
        let names: Vec<_> = vol
            .list_current_dir()
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["plot.c"]);
    }

    #[test]
    fn test_change_dir_case_insensitive() {
        let mut vol = sample();
        vol.change_dir("plot").unwrap();
        assert_eq!(vol.current_dir_sector(), vol.sector_of("Plot").unwrap());
    }

    #[test]
    fn test_change_dir_parent_marker() {
        let mut vol = sample();
        vol.change_dir("Plot").unwrap();
        vol.change_dir("").unwrap();
        assert_eq!(vol.current_dir_sector(), ROOT_SECTOR);
        assert!(vol.change_dir("").is_err()); // no parent of root
    }

    #[test]
    fn test_change_dir_into_file_fails() {
        let mut vol = sample();
        assert!(matches!(
            vol.change_dir("README.list49"),
            Err(AdfError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_file_read_write() {
        let mut vol = sample();
        let h = vol.file_open("README.list49", FileMode::Read).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(vol.file_read(h, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"disk");
        vol.file_close(h);

        let h = vol.file_open("README.list49", FileMode::Write).unwrap();
        vol.file_seek(h, 0).unwrap();
        vol.file_write(h, b"DISK").unwrap();
        vol.file_close(h);

        let h = vol.file_open("README.list49", FileMode::Read).unwrap();
        let mut buf = [0u8; 4];
        vol.file_read(h, &mut buf).unwrap();
        assert_eq!(&buf, b"DISK");
        vol.file_close(h);
    }

    #[test]
    fn test_seek_past_end_fails() {
        let mut vol = sample();
        let h = vol.file_open("README.list49", FileMode::Read).unwrap();
        assert!(vol.file_seek(h, 10_000).is_err());
        vol.file_close(h);
    }

    #[test]
    fn test_read_only_blocks_writes() {
        let mut vol = sample();
        vol.set_read_only(true);
        assert!(matches!(
            vol.file_open("README.list49", FileMode::Write),
            Err(AdfError::ReadOnly)
        ));
        let root = ROOT_SECTOR;
        assert!(matches!(
            vol.create_dir(root, "new"),
            Err(AdfError::ReadOnly)
        ));
    }

    #[test]
    fn test_remove_non_empty_dir_fails() {
        let mut vol = sample();
        assert!(vol.remove_entry(ROOT_SECTOR, "Plot").is_err());
        let plot = vol.sector_of("Plot").unwrap();
        vol.remove_entry(plot, "plot.c").unwrap();
        vol.remove_entry(ROOT_SECTOR, "Plot").unwrap();
        assert!(vol.sector_of("Plot").is_none());
    }

    #[test]
    fn test_rename_across_directories() {
        let mut vol = sample();
        let plot = vol.sector_of("Plot").unwrap();
        vol.rename_entry(ROOT_SECTOR, "README.list49", plot, "README")
            .unwrap();
        assert!(vol.sector_of("README.list49").is_none());
        assert!(vol.sector_of("Plot/README").is_some());
    }

    #[test]
    fn test_hard_link_open_follows_real() {
        let mut vol = sample();
        let real = vol.sector_of("README.list49").unwrap();
        vol.add_link_file("Plot/readme-link", real);
        vol.change_dir("Plot").unwrap();
        let h = vol.file_open("readme-link", FileMode::Read).unwrap();
        assert_eq!(vol.file_size(h).unwrap(), 14);
        vol.file_close(h);
    }
}
