//! Byte-range file I/O: read, write, truncate.
//!
//! All three operate by inumber and re-read the inode on every call.
//! Writes allocate data blocks lazily and never shrink a file; running
//! out of data blocks mid-write degrades to a short write rather than a
//! hard failure.

use log::debug;

use crate::bitmap::{alloc_data_block, free_data_block};
use crate::config::*;
use crate::error::{FsError, Result};
use crate::inode::{get_inode, resolve_blocks, write_inode};
use crate::structs::SuperBlock;
use crate::BlockDevice;

fn fill_sentinel(buf: &mut [u8; BLOCK_SIZE]) {
    buf.fill(0xff);
}

/// Reads up to `buf.len()` bytes starting at `offset`, clamped to the
/// file's size. Returns the number of bytes actually read.
pub fn read_i(
    device: &impl BlockDevice,
    sb: &SuperBlock,
    inumber: u32,
    buf: &mut [u8],
    offset: u32,
) -> Result<usize> {
    let inode = get_inode(device, sb, inumber)?;
    if inode.valid == 0 || offset > inode.size {
        return Err(FsError::InvalidArgument);
    }

    let to_read = buf.len().min((inode.size - offset) as usize);
    if to_read == 0 {
        return Ok(0);
    }

    let blocks = resolve_blocks(device, sb, &inode)?;
    let mut block_buf = [0u8; BLOCK_SIZE];
    let mut pos = offset as usize;
    let mut copied = 0usize;

    while copied < to_read {
        let index = pos / BLOCK_SIZE;
        let inner = pos % BLOCK_SIZE;
        let chunk = (to_read - copied).min(BLOCK_SIZE - inner);
        device.read_block(sb.data_block_idx + blocks[index], &mut block_buf)?;
        buf[copied..copied + chunk].copy_from_slice(&block_buf[inner..inner + chunk]);
        copied += chunk;
        pos += chunk;
    }

    Ok(copied)
}

/// Writes `data` starting at `offset`, growing the file as needed.
///
/// Returns the number of bytes written, which is less than `data.len()`
/// only when the data bitmap runs out mid-write; the file's size then
/// reflects exactly the committed bytes.
pub fn write_i(
    device: &impl BlockDevice,
    sb: &SuperBlock,
    inumber: u32,
    data: &[u8],
    offset: u32,
) -> Result<usize> {
    let mut inode = get_inode(device, sb, inumber)?;
    if inode.valid == 0 || offset > inode.size {
        return Err(FsError::InvalidArgument);
    }
    if data.is_empty() {
        return Ok(0);
    }
    if offset as u64 + data.len() as u64 > MAX_FILE_SIZE as u64 {
        return Err(FsError::FileTooLarge);
    }

    let mut blocks = resolve_blocks(device, sb, &inode)?;
    let mut indirect = inode.indirect;
    let mut fresh_indirect = false;
    let mut block_buf = [0u8; BLOCK_SIZE];
    let mut pos = offset as usize;
    let mut written = 0usize;

    while written < data.len() {
        let index = pos / BLOCK_SIZE;
        let inner = pos % BLOCK_SIZE;

        // The overflow list needs an indirect block before any entry
        // past the direct pointers can be persisted.
        if index >= NUM_DIRECT_PTRS && indirect >= sb.data_blocks {
            match alloc_data_block(device, sb) {
                Ok(block) => {
                    indirect = block;
                    fresh_indirect = true;
                }
                Err(FsError::DiskFull) => break,
                Err(e) => return Err(e),
            }
        }

        if blocks[index] == SENTINEL {
            match alloc_data_block(device, sb) {
                Ok(block) => blocks[index] = block,
                Err(FsError::DiskFull) => break,
                Err(e) => return Err(e),
            }
        }

        let chunk = (data.len() - written).min(BLOCK_SIZE - inner);
        device.read_block(sb.data_block_idx + blocks[index], &mut block_buf)?;
        block_buf[inner..inner + chunk].copy_from_slice(&data[written..written + chunk]);
        device.write_block(sb.data_block_idx + blocks[index], &block_buf)?;
        written += chunk;
        pos += chunk;
    }

    if written < data.len() {
        debug!("short write on inode {inumber}: {written} of {} bytes", data.len());
    }

    // Fold the (possibly extended) block list back into the inode: the
    // first five entries become the direct pointers, the rest go into
    // the indirect block.
    inode.direct.copy_from_slice(&blocks[..NUM_DIRECT_PTRS]);

    let mut overflow_buf = [0u8; BLOCK_SIZE];
    fill_sentinel(&mut overflow_buf);
    let mut overflow = 0usize;
    for &block in &blocks[NUM_DIRECT_PTRS..] {
        if block < sb.data_blocks {
            overflow_buf[overflow * 4..overflow * 4 + 4].copy_from_slice(&block.to_le_bytes());
            overflow += 1;
        }
    }

    if overflow > 0 {
        device.write_block(sb.data_block_idx + indirect, &overflow_buf)?;
        inode.indirect = indirect;
    } else {
        if fresh_indirect {
            free_data_block(device, sb, indirect)?;
        }
        inode.indirect = SENTINEL;
    }

    inode.size = inode.size.max(offset + written as u32);
    write_inode(device, sb, inumber, &inode)?;

    Ok(written)
}

/// Shrinks the file to `new_size`, releasing every block past the
/// retained range. A no-op when `new_size` is not smaller than the
/// current size.
pub fn fit_to_size(
    device: &impl BlockDevice,
    sb: &SuperBlock,
    inumber: u32,
    new_size: u32,
) -> Result<()> {
    let mut inode = get_inode(device, sb, inumber)?;
    if new_size >= inode.size {
        return Ok(());
    }

    let retained = new_size.div_ceil(BLOCK_SIZE as u32) as usize;
    debug!("truncating inode {inumber} to {new_size} bytes ({retained} blocks)");

    for slot in retained.min(NUM_DIRECT_PTRS)..NUM_DIRECT_PTRS {
        if inode.direct[slot] < sb.data_blocks {
            free_data_block(device, sb, inode.direct[slot])?;
            inode.direct[slot] = SENTINEL;
        }
    }

    if inode.indirect < sb.data_blocks {
        let mut buf = [0u8; BLOCK_SIZE];
        device.read_block(sb.data_block_idx + inode.indirect, &mut buf)?;
        let keep = retained.saturating_sub(NUM_DIRECT_PTRS);

        let mut scratch = [0u8; BLOCK_SIZE];
        fill_sentinel(&mut scratch);
        for i in 0..PTRS_PER_BLOCK {
            let ptr = u32::from_le_bytes([
                buf[i * 4],
                buf[i * 4 + 1],
                buf[i * 4 + 2],
                buf[i * 4 + 3],
            ]);
            if i < keep {
                scratch[i * 4..i * 4 + 4].copy_from_slice(&ptr.to_le_bytes());
            } else if ptr < sb.data_blocks {
                free_data_block(device, sb, ptr)?;
            }
        }

        if keep == 0 {
            // No overflow entries survive: the indirect block itself
            // goes back to the bitmap.
            free_data_block(device, sb, inode.indirect)?;
            inode.indirect = SENTINEL;
        } else {
            device.write_block(sb.data_block_idx + inode.indirect, &scratch)?;
        }
    }

    inode.size = new_size;
    write_inode(device, sb, inumber, &inode)?;
    Ok(())
}
