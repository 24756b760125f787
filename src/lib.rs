//! Quark is a small single-volume, inode-based file system layered on a
//! fixed-block-size backing store. No permissions, links, journaling,
//! or concurrent access.
//!
//! Quark's linear on-disk layout:
//! - Superblock
//! - Inode Bitmap
//! - Data Bitmap
//! - Inode Table
//! - Data Blocks
//!
//! Quark's layers (from bottom to top):
//! 1. Block Device: Abstraction for low level storage.              | User implemented (hardware/file-specific)
//! 2. Bitmap: Free-space tracking for inodes and data blocks.       | Fs implemented
//! 3. Inode: File metadata, block-map resolution.                  | Fs implemented
//! 4. File: Byte-range read/write/truncate over resolved blocks.   | Fs implemented
//! 5. Directory/Path: Entry records, path walks, subtree removal.  | Fs implemented
//! 6. FileSystem: The mounted-volume handle users operate through. | Fs implemented

mod bitmap;
mod block_dev;
mod config;
mod directory;
mod error;
mod file;
mod fs;
mod inode;
mod path;
mod structs;
mod superblock;

pub use bitmap::{
    alloc_bit, alloc_data_block, alloc_inode_id, clear_bit, count_set, free_data_block,
    free_inode_id, set_bit, test_bit,
};
pub use block_dev::{BlockDevice, DeviceStats};
pub use config::*;
pub use directory::{
    append_entry, create_root_directory, name_to_inode, read_dir_entries, release_inode,
    remove_item_from_directory_file,
};
pub use error::FsError as Error;
pub use error::Result;
pub use file::{fit_to_size, read_i, write_i};
pub use fs::{FileSystem, FsStats, InodeStat};
pub use inode::{get_inode, resolve_blocks, write_inode};
pub use path::{components, parent_and_name};
pub use structs::{DirEntry, FileKind, Inode, SuperBlock};
pub use superblock::{read_superblock, write_superblock};
