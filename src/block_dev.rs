use crate::config::BLOCK_SIZE;
use crate::error::FsError;

/// Cumulative I/O counters a device keeps across its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub reads: u64,
    pub writes: u64,
}

pub trait BlockDevice: Send + Sync {
    /// Returns the number of blocks in the block device.
    fn num_blocks(&self) -> u32;

    /// Reads a block of data from the block device.
    fn read_block(&self, block_id: u32, buf: &mut [u8; BLOCK_SIZE]) -> Result<(), FsError>;

    /// Writes a block of data to the block device.
    fn write_block(&self, block_id: u32, buf: &[u8; BLOCK_SIZE]) -> Result<(), FsError>;

    /// Cumulative read/write counters for this device.
    fn stats(&self) -> DeviceStats;

    /// Flushes any buffered data to the backing storage.
    fn flush(&self) -> Result<(), FsError> {
        Ok(())
    }

    /// Returns the size of each block in bytes.
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }
}
