//! Common fixtures for integration tests.
#![allow(dead_code)]

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use quark::{BLOCK_SIZE, BlockDevice, DeviceStats, Error};

pub const ORANGE: &str = "\x1b[38;5;214m";
pub const RESET: &str = "\x1b[0m";

/// Provides a macro for logging messages during tests.
/// e.g. log!("placeholder") -> println!("[test] placeholder");
#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        println!("{}[test] {}{}", crate::common::ORANGE, format!($($arg)*), crate::common::RESET)
    };
}

/// In-memory block device.
#[derive(Debug)]
pub struct RamDisk {
    inner: Mutex<Vec<u8>>,
    num_blocks: u32,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl RamDisk {
    /// Creates a new RamDisk of `num_blocks` blocks, all zeroed.
    pub fn new(num_blocks: u32) -> Self {
        RamDisk {
            inner: Mutex::new(vec![0u8; num_blocks as usize * BLOCK_SIZE]),
            num_blocks,
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }
}

impl BlockDevice for RamDisk {
    fn num_blocks(&self) -> u32 {
        self.num_blocks
    }

    fn read_block(&self, block_id: u32, buf: &mut [u8; BLOCK_SIZE]) -> Result<(), Error> {
        if block_id >= self.num_blocks {
            return Err(Error::OutOfBounds);
        }
        let start = block_id as usize * BLOCK_SIZE;
        let data = self.inner.lock().unwrap();
        buf.copy_from_slice(&data[start..start + BLOCK_SIZE]);
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn write_block(&self, block_id: u32, buf: &[u8; BLOCK_SIZE]) -> Result<(), Error> {
        if block_id >= self.num_blocks {
            return Err(Error::OutOfBounds);
        }
        let start = block_id as usize * BLOCK_SIZE;
        let mut data = self.inner.lock().unwrap();
        data[start..start + BLOCK_SIZE].copy_from_slice(buf);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn stats(&self) -> DeviceStats {
        DeviceStats {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }
}

const HEADER_SIZE: u64 = 16; // capacity, blocks, reads, writes (u32 LE each)

/// File-backed block device that persists a small header (capacity,
/// block count, cumulative I/O counters) ahead of the block array, so
/// reopening the same file restores the device's state.
pub struct FileDisk {
    inner: Mutex<File>,
    num_blocks: u32,
    capacity: u32,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl FileDisk {
    /// Opens (or creates, sized to `nbytes`) a disk backed by `path`.
    pub fn open(path: &Path, nbytes: u32) -> std::io::Result<Self> {
        if path.exists() {
            let mut file = OpenOptions::new().read(true).write(true).open(path)?;
            let mut header = [0u8; HEADER_SIZE as usize];
            file.seek(SeekFrom::Start(0))?;
            file.read_exact(&mut header)?;
            let field =
                |i: usize| u32::from_le_bytes([header[i], header[i + 1], header[i + 2], header[i + 3]]);
            Ok(FileDisk {
                inner: Mutex::new(file),
                capacity: field(0),
                num_blocks: field(4),
                reads: AtomicU64::new(field(8) as u64),
                writes: AtomicU64::new(field(12) as u64),
            })
        } else {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(path)?;
            let num_blocks = (nbytes as u64 - HEADER_SIZE) as u32 / BLOCK_SIZE as u32;
            file.set_len(HEADER_SIZE + num_blocks as u64 * BLOCK_SIZE as u64)?;
            let disk = FileDisk {
                inner: Mutex::new(file),
                capacity: nbytes,
                num_blocks,
                reads: AtomicU64::new(0),
                writes: AtomicU64::new(0),
            };
            disk.persist_header()?;
            Ok(disk)
        }
    }

    fn persist_header(&self) -> std::io::Result<()> {
        let mut header = [0u8; HEADER_SIZE as usize];
        header[0..4].copy_from_slice(&self.capacity.to_le_bytes());
        header[4..8].copy_from_slice(&self.num_blocks.to_le_bytes());
        header[8..12].copy_from_slice(&(self.reads.load(Ordering::Relaxed) as u32).to_le_bytes());
        header[12..16].copy_from_slice(&(self.writes.load(Ordering::Relaxed) as u32).to_le_bytes());
        let mut file = self.inner.lock().unwrap();
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&header)?;
        file.flush()
    }
}

impl BlockDevice for FileDisk {
    fn num_blocks(&self) -> u32 {
        self.num_blocks
    }

    fn read_block(&self, block_id: u32, buf: &mut [u8; BLOCK_SIZE]) -> Result<(), Error> {
        if block_id >= self.num_blocks {
            return Err(Error::OutOfBounds);
        }
        let mut file = self.inner.lock().unwrap();
        file.seek(SeekFrom::Start(HEADER_SIZE + block_id as u64 * BLOCK_SIZE as u64))
            .map_err(|_| Error::Io)?;
        file.read_exact(buf).map_err(|_| Error::Io)?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn write_block(&self, block_id: u32, buf: &[u8; BLOCK_SIZE]) -> Result<(), Error> {
        if block_id >= self.num_blocks {
            return Err(Error::OutOfBounds);
        }
        let mut file = self.inner.lock().unwrap();
        file.seek(SeekFrom::Start(HEADER_SIZE + block_id as u64 * BLOCK_SIZE as u64))
            .map_err(|_| Error::Io)?;
        file.write_all(buf).map_err(|_| Error::Io)?;
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn stats(&self) -> DeviceStats {
        DeviceStats {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }

    fn flush(&self) -> Result<(), Error> {
        self.persist_header().map_err(|_| Error::Io)
    }
}

impl Drop for FileDisk {
    fn drop(&mut self) {
        let _ = self.persist_header();
    }
}

/// Deterministic but non-repeating test payload.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}
