//! On-disk record types and their byte codecs.
//!
//! Every record has a fixed little-endian layout and explicit
//! encode/decode functions, so the in-memory representation never
//! depends on how the compiler lays structs out.

use crate::config::*;
use crate::error::{FsError, Result};

fn get_u32(buf: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

fn put_u32(buf: &mut [u8], off: usize, v: u32) {
    buf[off..off + 4].copy_from_slice(&v.to_le_bytes());
}

/// Persisted description of a volume's region layout. Lives in block 0,
/// written once by format and treated as immutable until reformat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperBlock {
    pub magic: u32,
    pub blocks: u32,       // usable blocks, excluding the superblock itself
    pub inode_blocks: u32, // blocks reserved for the inode table
    pub inodes: u32,       // total inode count
    pub inode_bitmap_idx: u32,
    pub inode_block_idx: u32, // first block of the inode table
    pub data_bitmap_idx: u32,
    pub data_block_idx: u32, // first block of the data region
    pub data_blocks: u32,
}

impl SuperBlock {
    pub const DISK_SIZE: usize = 36;

    pub fn encode(&self, buf: &mut [u8]) {
        put_u32(buf, 0, self.magic);
        put_u32(buf, 4, self.blocks);
        put_u32(buf, 8, self.inode_blocks);
        put_u32(buf, 12, self.inodes);
        put_u32(buf, 16, self.inode_bitmap_idx);
        put_u32(buf, 20, self.inode_block_idx);
        put_u32(buf, 24, self.data_bitmap_idx);
        put_u32(buf, 28, self.data_block_idx);
        put_u32(buf, 32, self.data_blocks);
    }

    pub fn decode(buf: &[u8]) -> Self {
        Self {
            magic: get_u32(buf, 0),
            blocks: get_u32(buf, 4),
            inode_blocks: get_u32(buf, 8),
            inodes: get_u32(buf, 12),
            inode_bitmap_idx: get_u32(buf, 16),
            inode_block_idx: get_u32(buf, 20),
            data_bitmap_idx: get_u32(buf, 24),
            data_block_idx: get_u32(buf, 28),
            data_blocks: get_u32(buf, 32),
        }
    }
}

/// Fixed-size record describing one file or directory. All block
/// pointers are data-region-relative; [`SENTINEL`] marks an unused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    pub valid: u32,
    pub size: u32, // logical size in bytes
    pub direct: [u32; NUM_DIRECT_PTRS],
    pub indirect: u32,
}

impl Inode {
    /// A fresh, empty inode: valid, size 0, every pointer unused.
    pub fn empty() -> Self {
        Self {
            valid: 1,
            size: 0,
            direct: [SENTINEL; NUM_DIRECT_PTRS],
            indirect: SENTINEL,
        }
    }

    pub fn encode(&self, buf: &mut [u8]) {
        put_u32(buf, 0, self.valid);
        put_u32(buf, 4, self.size);
        for (i, ptr) in self.direct.iter().enumerate() {
            put_u32(buf, 8 + i * 4, *ptr);
        }
        put_u32(buf, 28, self.indirect);
    }

    pub fn decode(buf: &[u8]) -> Self {
        let mut direct = [SENTINEL; NUM_DIRECT_PTRS];
        for (i, ptr) in direct.iter_mut().enumerate() {
            *ptr = get_u32(buf, 8 + i * 4);
        }
        Self {
            valid: get_u32(buf, 0),
            size: get_u32(buf, 4),
            direct,
            indirect: get_u32(buf, 28),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File = 0,
    Directory = 1,
}

impl FileKind {
    pub fn from_u32(v: u32) -> Result<Self> {
        match v {
            0 => Ok(FileKind::File),
            1 => Ok(FileKind::Directory),
            _ => Err(FsError::InvalidArgument),
        }
    }
}

/// One record of a directory's content. A directory file is nothing but
/// a run of these, with no separators.
#[derive(Debug, Clone, Copy)]
pub struct DirEntry {
    pub valid: u32,
    pub kind: FileKind,
    pub name: [u8; MAX_FILE_NAME_LEN],
    pub name_len: u32,
    pub inumber: u32,
}

impl DirEntry {
    pub fn new(inumber: u32, name: &[u8], kind: FileKind) -> Result<Self> {
        if name.is_empty() || name.len() > MAX_FILE_NAME_LEN {
            return Err(FsError::InvalidFileName);
        }
        let mut arr = [0u8; MAX_FILE_NAME_LEN];
        arr[..name.len()].copy_from_slice(name);
        Ok(Self {
            valid: 1,
            kind,
            name: arr,
            name_len: name.len() as u32,
            inumber,
        })
    }

    pub fn name_bytes(&self) -> &[u8] {
        let len = (self.name_len as usize).min(MAX_FILE_NAME_LEN);
        &self.name[..len]
    }

    pub fn name_eq(&self, name: &[u8]) -> bool {
        self.name_bytes() == name
    }

    pub fn encode(&self, buf: &mut [u8]) {
        put_u32(buf, 0, self.valid);
        put_u32(buf, 4, self.kind as u32);
        buf[8..8 + MAX_FILE_NAME_LEN].copy_from_slice(&self.name);
        put_u32(buf, 28, self.name_len);
        put_u32(buf, 32, self.inumber);
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut name = [0u8; MAX_FILE_NAME_LEN];
        name.copy_from_slice(&buf[8..8 + MAX_FILE_NAME_LEN]);
        Ok(Self {
            valid: get_u32(buf, 0),
            kind: FileKind::from_u32(get_u32(buf, 4))?,
            name,
            name_len: get_u32(buf, 28),
            inumber: get_u32(buf, 32),
        })
    }
}
