//! Directory content management and the path→inode walk.
//!
//! A directory is an ordinary file whose content is a run of fixed-size
//! [`DirEntry`] records, so everything here goes through the file I/O
//! layer; the content length stays a multiple of the record size.

use log::{debug, trace};

use crate::bitmap::{free_data_block, free_inode_id, set_bit};
use crate::config::*;
use crate::error::{FsError, Result};
use crate::file::{fit_to_size, read_i, write_i};
use crate::inode::{get_inode, resolve_blocks, write_inode};
use crate::path::components;
use crate::structs::{DirEntry, FileKind, Inode, SuperBlock};
use crate::BlockDevice;

/// Releases an inode and every data block reachable from it: the inode
/// is marked invalid, its bitmap bit cleared, and all direct blocks,
/// indirect-block contents and the indirect block itself returned to
/// the data bitmap.
///
/// Directory entries pointing at the inode are NOT removed; entry
/// removal is a separate, explicit step.
pub fn release_inode(device: &impl BlockDevice, sb: &SuperBlock, inumber: u32) -> Result<()> {
    let mut inode = get_inode(device, sb, inumber)?;
    inode.valid = 0;

    free_inode_id(device, sb, inumber)?;

    let blocks = resolve_blocks(device, sb, &inode)?;
    for block in blocks {
        if block < sb.data_blocks {
            free_data_block(device, sb, block)?;
        }
    }
    if inode.indirect < sb.data_blocks {
        free_data_block(device, sb, inode.indirect)?;
    }

    write_inode(device, sb, inumber, &inode)
}

/// Reads and decodes a directory's full content. Every stored record is
/// returned, including ones whose valid flag is clear.
pub fn read_dir_entries(
    device: &impl BlockDevice,
    sb: &SuperBlock,
    dir_inumber: u32,
) -> Result<Vec<DirEntry>> {
    let inode = get_inode(device, sb, dir_inumber)?;
    let mut content = vec![0u8; inode.size as usize];
    let read = read_i(device, sb, dir_inumber, &mut content, 0)?;

    let mut entries = Vec::with_capacity(read / DIR_ENTRY_SIZE);
    for record in content[..read].chunks_exact(DIR_ENTRY_SIZE) {
        entries.push(DirEntry::decode(record)?);
    }
    Ok(entries)
}

/// Resolves a path to an inumber, expecting the final component to be
/// of `kind`. Every non-final component must resolve as a directory
/// regardless of `kind`. `"/"` resolves to the root for directory
/// lookups only.
pub fn name_to_inode(
    device: &impl BlockDevice,
    sb: &SuperBlock,
    path: &str,
    kind: FileKind,
) -> Result<u32> {
    let comps = components(path);
    if comps.is_empty() {
        return match kind {
            FileKind::Directory => Ok(ROOT_INODE_ID),
            FileKind::File => Err(FsError::NotFound),
        };
    }

    let mut inumber = ROOT_INODE_ID;
    let last = comps.len() - 1;
    for (level, comp) in comps.iter().enumerate() {
        let wanted = if level < last { FileKind::Directory } else { kind };
        let entries = read_dir_entries(device, sb, inumber)?;
        let hit = entries
            .iter()
            .find(|e| e.kind == wanted && e.name_eq(comp.as_bytes()));
        match hit {
            Some(entry) => {
                trace!("resolved {comp:?} -> inode {}", entry.inumber);
                inumber = entry.inumber;
            }
            None => return Err(FsError::NotFound),
        }
    }
    Ok(inumber)
}

/// Appends an entry at the directory's end of content. A short write
/// (data bitmap exhausted) is rolled back so the content length stays a
/// record multiple.
pub fn append_entry(
    device: &impl BlockDevice,
    sb: &SuperBlock,
    dir_inumber: u32,
    entry: &DirEntry,
) -> Result<()> {
    let dir = get_inode(device, sb, dir_inumber)?;
    let mut record = [0u8; DIR_ENTRY_SIZE];
    entry.encode(&mut record);

    let written = write_i(device, sb, dir_inumber, &record, dir.size)?;
    if written != DIR_ENTRY_SIZE {
        fit_to_size(device, sb, dir_inumber, dir.size)?;
        return Err(FsError::DiskFull);
    }
    Ok(())
}

/// Rewrites a directory's content excluding every record matching
/// `(name, kind)`.
pub fn remove_item_from_directory_file(
    device: &impl BlockDevice,
    sb: &SuperBlock,
    dir_inumber: u32,
    name: &[u8],
    kind: FileKind,
) -> Result<()> {
    let entries = read_dir_entries(device, sb, dir_inumber)?;

    let mut filtered = Vec::with_capacity(entries.len() * DIR_ENTRY_SIZE);
    for entry in &entries {
        if entry.kind == kind && entry.name_eq(name) {
            continue;
        }
        let mut record = [0u8; DIR_ENTRY_SIZE];
        entry.encode(&mut record);
        filtered.extend_from_slice(&record);
    }

    fit_to_size(device, sb, dir_inumber, 0)?;
    write_i(device, sb, dir_inumber, &filtered, 0)?;
    Ok(())
}

/// (Re)initializes the root directory at its reserved inode.
///
/// An existing root is released first; its old entries are discarded
/// wholesale, orphaning whatever they pointed at.
pub fn create_root_directory(device: &impl BlockDevice, sb: &SuperBlock) -> Result<()> {
    let inode = get_inode(device, sb, ROOT_INODE_ID)?;
    if inode.valid != 0 {
        debug!("discarding existing root directory");
        release_inode(device, sb, ROOT_INODE_ID)?;
    }

    set_bit(device, sb.inode_bitmap_idx, ROOT_INODE_ID, sb.inodes)?;
    write_inode(device, sb, ROOT_INODE_ID, &Inode::empty())
}
