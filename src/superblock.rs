use crate::config::*;
use crate::error::{FsError, Result};
use crate::structs::SuperBlock;
use crate::BlockDevice;

impl SuperBlock {
    /// Derives the volume layout for a device of `total_blocks` blocks.
    ///
    /// One block is reserved for the superblock; a tenth of the rest
    /// holds the inode table; each bitmap takes as many blocks as its
    /// bit count requires; everything left is data. Regions are
    /// contiguous in the fixed order: superblock, inode bitmap, data
    /// bitmap, inode table, data.
    pub fn for_volume(total_blocks: u32) -> Result<Self> {
        if total_blocks < 2 {
            return Err(FsError::VolumeTooSmall);
        }
        let m = total_blocks - 1;
        let inode_blocks = m / 10;
        let inodes = inode_blocks * INODES_PER_BLOCK as u32;
        let inode_bitmap_blocks = inodes.div_ceil(BITS_PER_BLOCK as u32);
        if inode_blocks == 0 || m <= inode_blocks + inode_bitmap_blocks {
            return Err(FsError::VolumeTooSmall);
        }
        let rest = m - inode_blocks - inode_bitmap_blocks;
        let data_bitmap_blocks = rest.div_ceil(BITS_PER_BLOCK as u32);
        if rest <= data_bitmap_blocks {
            return Err(FsError::VolumeTooSmall);
        }
        let data_blocks = rest - data_bitmap_blocks;

        Ok(Self {
            magic: MAGIC,
            blocks: m,
            inode_blocks,
            inodes,
            inode_bitmap_idx: 1,
            data_bitmap_idx: 1 + inode_bitmap_blocks,
            inode_block_idx: 1 + inode_bitmap_blocks + data_bitmap_blocks,
            data_block_idx: 1 + inode_bitmap_blocks + data_bitmap_blocks + inode_blocks,
            data_blocks,
        })
    }

    pub fn inode_bitmap_blocks(&self) -> u32 {
        self.data_bitmap_idx - self.inode_bitmap_idx
    }

    pub fn data_bitmap_blocks(&self) -> u32 {
        self.inode_block_idx - self.data_bitmap_idx
    }
}

pub fn read_superblock<D: BlockDevice>(device: &D) -> Result<SuperBlock> {
    let mut buf = [0u8; BLOCK_SIZE];
    device.read_block(SUPERBLOCK_ID, &mut buf)?;
    let superblock = SuperBlock::decode(&buf);
    if superblock.magic != MAGIC {
        return Err(FsError::InvalidSuperBlock);
    }
    Ok(superblock)
}

pub fn write_superblock<D: BlockDevice>(device: &D, superblock: &SuperBlock) -> Result<()> {
    let mut buf = [0u8; BLOCK_SIZE];
    superblock.encode(&mut buf);
    device.write_block(SUPERBLOCK_ID, &buf)?;
    Ok(())
}
