//! Free-space bitmaps for inodes and data blocks.
//!
//! One bit per allocatable unit, most-significant bit first within each
//! byte; bit set means allocated. Every operation is a read-modify-write
//! of a single bitmap block.

use log::trace;

use crate::config::*;
use crate::error::{FsError, Result};
use crate::structs::SuperBlock;
use crate::BlockDevice;

fn locate(index: u32) -> (u32, usize, u8) {
    let block = index / BITS_PER_BLOCK as u32;
    let byte = (index as usize % BITS_PER_BLOCK) / 8;
    let mask = 1u8 << (7 - (index % 8));
    (block, byte, mask)
}

pub fn test_bit(
    device: &impl BlockDevice,
    bitmap_base: u32,
    index: u32,
    total_items: u32,
) -> Result<bool> {
    if index >= total_items {
        return Err(FsError::OutOfBounds);
    }
    let (block, byte, mask) = locate(index);
    let mut buf = [0u8; BLOCK_SIZE];
    device.read_block(bitmap_base + block, &mut buf)?;
    Ok(buf[byte] & mask != 0)
}

fn update_bit(
    device: &impl BlockDevice,
    bitmap_base: u32,
    index: u32,
    total_items: u32,
    value: bool,
) -> Result<()> {
    if index >= total_items {
        return Err(FsError::OutOfBounds);
    }
    let (block, byte, mask) = locate(index);
    let mut buf = [0u8; BLOCK_SIZE];
    device.read_block(bitmap_base + block, &mut buf)?;
    if value {
        buf[byte] |= mask;
    } else {
        buf[byte] &= !mask;
    }
    device.write_block(bitmap_base + block, &buf)?;
    Ok(())
}

pub fn set_bit(
    device: &impl BlockDevice,
    bitmap_base: u32,
    index: u32,
    total_items: u32,
) -> Result<()> {
    update_bit(device, bitmap_base, index, total_items, true)
}

pub fn clear_bit(
    device: &impl BlockDevice,
    bitmap_base: u32,
    index: u32,
    total_items: u32,
) -> Result<()> {
    update_bit(device, bitmap_base, index, total_items, false)
}

/// Scans the region in ascending index order, sets the first clear bit
/// and returns its index. `Err(DiskFull)` once every bit is taken.
pub fn alloc_bit(
    device: &impl BlockDevice,
    bitmap_base: u32,
    total_items: u32,
) -> Result<u32> {
    let bitmap_blocks = total_items.div_ceil(BITS_PER_BLOCK as u32);
    let mut buf = [0u8; BLOCK_SIZE];

    for block in 0..bitmap_blocks {
        device.read_block(bitmap_base + block, &mut buf)?;
        for byte in 0..BLOCK_SIZE {
            if buf[byte] == 0xff {
                continue;
            }
            for bit in 0..8u32 {
                let index = block * BITS_PER_BLOCK as u32 + byte as u32 * 8 + bit;
                if index >= total_items {
                    return Err(FsError::DiskFull);
                }
                let mask = 1u8 << (7 - bit);
                if buf[byte] & mask == 0 {
                    buf[byte] |= mask;
                    device.write_block(bitmap_base + block, &buf)?;
                    return Ok(index);
                }
            }
        }
    }

    Err(FsError::DiskFull)
}

/// Number of set bits in `[0, total_items)`.
pub fn count_set(
    device: &impl BlockDevice,
    bitmap_base: u32,
    total_items: u32,
) -> Result<u32> {
    let bitmap_blocks = total_items.div_ceil(BITS_PER_BLOCK as u32);
    let mut buf = [0u8; BLOCK_SIZE];
    let mut count = 0;

    for block in 0..bitmap_blocks {
        device.read_block(bitmap_base + block, &mut buf)?;
        for byte in 0..BLOCK_SIZE {
            let index = block * BITS_PER_BLOCK as u32 + byte as u32 * 8;
            if index >= total_items {
                break;
            }
            if index + 8 <= total_items {
                count += buf[byte].count_ones();
            } else {
                for bit in 0..(total_items - index) {
                    if buf[byte] & (1 << (7 - bit)) != 0 {
                        count += 1;
                    }
                }
            }
        }
    }

    Ok(count)
}

// Region-bound wrappers over a superblock's layout.

pub fn alloc_inode_id(device: &impl BlockDevice, sb: &SuperBlock) -> Result<u32> {
    let inumber = alloc_bit(device, sb.inode_bitmap_idx, sb.inodes)?;
    trace!("allocated inode {inumber}");
    Ok(inumber)
}

pub fn free_inode_id(device: &impl BlockDevice, sb: &SuperBlock, inumber: u32) -> Result<()> {
    trace!("freeing inode {inumber}");
    clear_bit(device, sb.inode_bitmap_idx, inumber, sb.inodes)
}

/// Allocates a data block, returning its data-region-relative index.
pub fn alloc_data_block(device: &impl BlockDevice, sb: &SuperBlock) -> Result<u32> {
    let block = alloc_bit(device, sb.data_bitmap_idx, sb.data_blocks)?;
    trace!("allocated data block {block}");
    Ok(block)
}

pub fn free_data_block(device: &impl BlockDevice, sb: &SuperBlock, block: u32) -> Result<()> {
    trace!("freeing data block {block}");
    clear_bit(device, sb.data_bitmap_idx, block, sb.data_blocks)
}
