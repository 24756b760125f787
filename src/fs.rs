use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, info};

use crate::bitmap::{alloc_inode_id, count_set};
use crate::config::*;
use crate::directory::{
    append_entry, create_root_directory, name_to_inode, read_dir_entries, release_inode,
    remove_item_from_directory_file,
};
use crate::error::{FsError, Result};
use crate::file::{fit_to_size, read_i, write_i};
use crate::inode::{get_inode, resolve_blocks, write_inode};
use crate::path::{components, parent_and_name};
use crate::structs::{DirEntry, FileKind, Inode, SuperBlock};
use crate::superblock::{read_superblock, write_superblock};
use crate::{BlockDevice, DeviceStats};

/// Per-inode usage report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InodeStat {
    pub valid: bool,
    pub size: u32,
    pub blocks_in_use: u32,
    pub direct_in_use: u32,
    pub indirect_in_use: u32,
}

/// Volume-wide utilization plus the device's I/O counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStats {
    pub inodes_used: u32,
    pub inodes_total: u32,
    pub data_blocks_used: u32,
    pub data_blocks_total: u32,
    pub device: DeviceStats,
}

/// A mounted volume. All operations go through this handle; there is no
/// process-wide mounted state, so independent volumes can coexist.
///
/// Single-threaded by design: operations are synchronous, run to
/// completion, and make no atomicity guarantees across the several
/// block writes one call may perform.
#[derive(Debug)]
pub struct FileSystem<D: BlockDevice> {
    device: Arc<D>,
    superblock: SuperBlock,
}

impl<D: BlockDevice> FileSystem<D> {
    /// Lays out and persists a fresh filesystem on the device: writes
    /// the superblock, zero-fills both bitmaps and the inode table
    /// (every inode starts invalid), and leaves the data region
    /// untouched. The root directory is created by [`Self::mount`] with
    /// `init_root`.
    pub fn format(device: Arc<D>) -> Result<Self> {
        let superblock = SuperBlock::for_volume(device.num_blocks())?;
        write_superblock(&*device, &superblock)?;

        let zero = [0u8; BLOCK_SIZE];
        for block in superblock.inode_bitmap_idx..superblock.data_block_idx {
            device.write_block(block, &zero)?;
        }

        info!(
            "formatted volume: {} blocks, {} inodes, {} data blocks",
            superblock.blocks, superblock.inodes, superblock.data_blocks
        );
        Ok(Self { device, superblock })
    }

    /// Mounts an already-formatted device, validating the superblock
    /// magic. With `init_root`, the root directory is (re)initialized,
    /// discarding any prior root contents.
    pub fn mount(device: Arc<D>, init_root: bool) -> Result<Self> {
        let superblock = read_superblock(&*device)?;
        if init_root {
            create_root_directory(&*device, &superblock)?;
        }
        debug!("mounted volume with {} blocks", superblock.blocks);
        Ok(Self { device, superblock })
    }

    /// Allocates and initializes a fresh inode, returning its inumber.
    /// The inode is not linked into any directory.
    pub fn create_file(&self) -> Result<u32> {
        let inumber = alloc_inode_id(&*self.device, &self.superblock)?;
        write_inode(&*self.device, &self.superblock, inumber, &Inode::empty())?;
        Ok(inumber)
    }

    /// Releases an inode and all of its data blocks. Any directory
    /// entry still naming the inode is left in place; dropping the
    /// entry is the caller's explicit step.
    pub fn remove_file(&self, inumber: u32) -> Result<()> {
        release_inode(&*self.device, &self.superblock, inumber)
    }

    pub fn stat(&self, inumber: u32) -> Result<InodeStat> {
        let inode = get_inode(&*self.device, &self.superblock, inumber)?;
        if inode.valid == 0 {
            return Ok(InodeStat {
                valid: false,
                size: 0,
                blocks_in_use: 0,
                direct_in_use: 0,
                indirect_in_use: 0,
            });
        }

        let blocks = resolve_blocks(&*self.device, &self.superblock, &inode)?;
        let in_use = blocks
            .iter()
            .filter(|&&b| b < self.superblock.data_blocks)
            .count() as u32;
        Ok(InodeStat {
            valid: true,
            size: inode.size,
            blocks_in_use: in_use,
            direct_in_use: in_use.min(NUM_DIRECT_PTRS as u32),
            indirect_in_use: in_use.saturating_sub(NUM_DIRECT_PTRS as u32),
        })
    }

    /// Reads up to `buf.len()` bytes from the file at `offset`.
    pub fn read(&self, inumber: u32, buf: &mut [u8], offset: u32) -> Result<usize> {
        read_i(&*self.device, &self.superblock, inumber, buf, offset)
    }

    /// Writes `data` to the file at `offset`. Returns the bytes
    /// written; a short count means the volume ran out of data blocks.
    pub fn write(&self, inumber: u32, data: &[u8], offset: u32) -> Result<usize> {
        write_i(&*self.device, &self.superblock, inumber, data, offset)
    }

    /// Shrinks the file to `new_size`; a no-op for sizes at or past the
    /// current one.
    pub fn truncate(&self, inumber: u32, new_size: u32) -> Result<()> {
        fit_to_size(&*self.device, &self.superblock, inumber, new_size)
    }

    pub fn read_path(&self, path: &str, buf: &mut [u8], offset: u32) -> Result<usize> {
        let inumber = name_to_inode(&*self.device, &self.superblock, path, FileKind::File)?;
        self.read(inumber, buf, offset)
    }

    /// Writes to the file at `path`, creating it first if it does not
    /// exist (its parent directory must).
    pub fn write_path(&self, path: &str, data: &[u8], offset: u32) -> Result<usize> {
        let inumber =
            match name_to_inode(&*self.device, &self.superblock, path, FileKind::File) {
                Ok(inumber) => inumber,
                Err(FsError::NotFound) => self.add_file_to_directory(path)?,
                Err(e) => return Err(e),
            };
        self.write(inumber, data, offset)
    }

    /// Creates an empty file at `path` and links it into its parent
    /// directory. Fails with `AlreadyExists` if the path already
    /// resolves to a file.
    pub fn add_file_to_directory(&self, path: &str) -> Result<u32> {
        if name_to_inode(&*self.device, &self.superblock, path, FileKind::File).is_ok() {
            return Err(FsError::AlreadyExists);
        }
        let (parent, name) = parent_and_name(path)?;
        let parent_inumber =
            name_to_inode(&*self.device, &self.superblock, parent, FileKind::Directory)?;

        self.link_new_entry(parent_inumber, name, FileKind::File)
    }

    /// Creates a directory at `path`. The root cannot be created this
    /// way; it is initialized internally at mount time.
    pub fn make_dir(&self, path: &str) -> Result<u32> {
        if components(path).is_empty() {
            return Err(FsError::InvalidArgument);
        }
        if name_to_inode(&*self.device, &self.superblock, path, FileKind::Directory).is_ok() {
            return Err(FsError::AlreadyExists);
        }
        let (parent, name) = parent_and_name(path)?;
        let parent_inumber =
            name_to_inode(&*self.device, &self.superblock, parent, FileKind::Directory)?;

        debug!("mkdir {path:?}");
        self.link_new_entry(parent_inumber, name, FileKind::Directory)
    }

    /// Removes the directory at `path` and everything beneath it.
    ///
    /// The target's entry is dropped from its parent, then the subtree
    /// is walked breadth-first: each dequeued directory has its file
    /// entries released immediately, its subdirectories enqueued, and
    /// its own inode released last.
    pub fn remove_dir(&self, path: &str) -> Result<()> {
        let target =
            name_to_inode(&*self.device, &self.superblock, path, FileKind::Directory)?;

        if let Ok((parent, name)) = parent_and_name(path) {
            let parent_inumber =
                name_to_inode(&*self.device, &self.superblock, parent, FileKind::Directory)?;
            remove_item_from_directory_file(
                &*self.device,
                &self.superblock,
                parent_inumber,
                name.as_bytes(),
                FileKind::Directory,
            )?;
        }

        debug!("removing directory subtree at {path:?}");
        let mut queue = VecDeque::from([target]);
        while let Some(dir) = queue.pop_front() {
            // A stale entry can name an already-released inode; its
            // listing is unreadable but the inode itself still goes.
            let entries =
                read_dir_entries(&*self.device, &self.superblock, dir).unwrap_or_default();
            for entry in entries {
                if entry.valid != 1 {
                    continue;
                }
                match entry.kind {
                    FileKind::File => {
                        release_inode(&*self.device, &self.superblock, entry.inumber)?;
                    }
                    FileKind::Directory => queue.push_back(entry.inumber),
                }
            }
            release_inode(&*self.device, &self.superblock, dir)?;
        }
        Ok(())
    }

    /// Reads a directory's content as entry records.
    pub fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>> {
        let inumber =
            name_to_inode(&*self.device, &self.superblock, path, FileKind::Directory)?;
        read_dir_entries(&*self.device, &self.superblock, inumber)
    }

    /// Inode and data-block utilization plus device I/O counters.
    pub fn stats(&self) -> Result<FsStats> {
        let sb = &self.superblock;
        Ok(FsStats {
            inodes_used: count_set(&*self.device, sb.inode_bitmap_idx, sb.inodes)?,
            inodes_total: sb.inodes,
            data_blocks_used: count_set(&*self.device, sb.data_bitmap_idx, sb.data_blocks)?,
            data_blocks_total: sb.data_blocks,
            device: self.device.stats(),
        })
    }

    pub fn flush(&self) -> Result<()> {
        self.device.flush()
    }

    pub fn root_inode_id(&self) -> u32 {
        ROOT_INODE_ID
    }

    pub fn superblock(&self) -> &SuperBlock {
        &self.superblock
    }

    pub fn device(&self) -> Arc<D> {
        Arc::clone(&self.device)
    }

    // Creates a fresh inode and links it under the parent; the inode is
    // released again if the entry cannot be appended.
    fn link_new_entry(&self, parent: u32, name: &str, kind: FileKind) -> Result<u32> {
        let name = name.as_bytes();
        if name.is_empty() || name.len() > MAX_FILE_NAME_LEN {
            return Err(FsError::InvalidFileName);
        }

        let inumber = self.create_file()?;
        let entry = DirEntry::new(inumber, name, kind)?;
        if let Err(e) = append_entry(&*self.device, &self.superblock, parent, &entry) {
            release_inode(&*self.device, &self.superblock, inumber)?;
            return Err(e);
        }
        Ok(inumber)
    }
}
