//! The inode store and the block-map resolver.
//!
//! Inodes are packed 128 to a block across the inode table. There is no
//! caching layer: every call re-reads the containing block from the
//! device.

use crate::config::*;
use crate::error::{FsError, Result};
use crate::structs::{Inode, SuperBlock};
use crate::BlockDevice;

fn inode_location(sb: &SuperBlock, inumber: u32) -> (u32, usize) {
    let block = sb.inode_block_idx + inumber / INODES_PER_BLOCK as u32;
    let offset = (inumber as usize % INODES_PER_BLOCK) * INODE_SIZE;
    (block, offset)
}

pub fn get_inode(device: &impl BlockDevice, sb: &SuperBlock, inumber: u32) -> Result<Inode> {
    if inumber >= sb.inodes {
        return Err(FsError::OutOfBounds);
    }
    let (block, offset) = inode_location(sb, inumber);
    let mut buf = [0u8; BLOCK_SIZE];
    device.read_block(block, &mut buf)?;
    Ok(Inode::decode(&buf[offset..offset + INODE_SIZE]))
}

pub fn write_inode(
    device: &impl BlockDevice,
    sb: &SuperBlock,
    inumber: u32,
    inode: &Inode,
) -> Result<()> {
    if inumber >= sb.inodes {
        return Err(FsError::OutOfBounds);
    }
    let (block, offset) = inode_location(sb, inumber);
    let mut buf = [0u8; BLOCK_SIZE];
    device.read_block(block, &mut buf)?;
    inode.encode(&mut buf[offset..offset + INODE_SIZE]);
    device.write_block(block, &buf)?;
    Ok(())
}

/// Expands an inode's direct and indirect pointers into the ordered list
/// of data-region-relative block indices backing the file.
///
/// The result is always `MAX_FILE_BLOCKS` long, sentinel-padded past the
/// last block the file's size requires; entry `k / BLOCK_SIZE` holds byte
/// offset `k`. A size of zero yields all sentinels.
pub fn resolve_blocks(
    device: &impl BlockDevice,
    sb: &SuperBlock,
    inode: &Inode,
) -> Result<Vec<u32>> {
    let mut blocks = vec![SENTINEL; MAX_FILE_BLOCKS];
    if inode.size == 0 {
        return Ok(blocks);
    }

    let mut count = 0usize;
    let mut covered = 0u64;

    for &ptr in &inode.direct {
        if ptr < sb.data_blocks {
            blocks[count] = ptr;
            count += 1;
            covered += BLOCK_SIZE as u64;
            if covered >= inode.size as u64 {
                return Ok(blocks);
            }
        }
    }

    if inode.indirect < sb.data_blocks {
        let mut buf = [0u8; BLOCK_SIZE];
        device.read_block(sb.data_block_idx + inode.indirect, &mut buf)?;
        for i in 0..PTRS_PER_BLOCK {
            let ptr = u32::from_le_bytes([
                buf[i * 4],
                buf[i * 4 + 1],
                buf[i * 4 + 2],
                buf[i * 4 + 3],
            ]);
            if ptr < sb.data_blocks {
                blocks[count] = ptr;
                count += 1;
                covered += BLOCK_SIZE as u64;
                if covered >= inode.size as u64 {
                    break;
                }
            }
        }
    }

    Ok(blocks)
}
