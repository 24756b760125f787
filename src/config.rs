pub const MAGIC: u32 = 0x5146_5331; // "QFS1"

pub const BLOCK_SIZE: usize = 4096;
pub const SUPERBLOCK_ID: u32 = 0; // Block ID for the superblock
pub const ROOT_INODE_ID: u32 = 0; // Inode ID for the root directory

/// Invalid (out of range) block pointer slot.
pub const SENTINEL: u32 = u32::MAX;

pub const NUM_DIRECT_PTRS: usize = 5; // Number of direct pointers in an inode
pub const PTRS_PER_BLOCK: usize = BLOCK_SIZE / 4; // Number of pointers per block (32-bit pointers)
pub const MAX_FILE_BLOCKS: usize = NUM_DIRECT_PTRS + PTRS_PER_BLOCK; // 1029
pub const MAX_FILE_SIZE: usize = MAX_FILE_BLOCKS * BLOCK_SIZE;

pub const INODE_SIZE: usize = 32;
pub const INODES_PER_BLOCK: usize = BLOCK_SIZE / INODE_SIZE; // 128

pub const MAX_FILE_NAME_LEN: usize = 20;
pub const DIR_ENTRY_SIZE: usize = 36; // valid + kind + name[20] + name_len + inumber

pub const BITS_PER_BLOCK: usize = BLOCK_SIZE * 8; // Bitmap bits held by one block
