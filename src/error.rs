use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("block device I/O failure")]
    Io,
    #[error("superblock missing or corrupt")]
    InvalidSuperBlock,
    #[error("inode or block index out of range")]
    OutOfBounds,
    #[error("no free inodes or data blocks left")]
    DiskFull,
    #[error("no such file or directory")]
    NotFound,
    #[error("entry already exists")]
    AlreadyExists,
    #[error("not a directory")]
    NotDirectory,
    #[error("not a regular file")]
    NotFile,
    #[error("invalid file name")]
    InvalidFileName,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("file exceeds maximum size")]
    FileTooLarge,
    #[error("volume too small to format")]
    VolumeTooSmall,
}

pub type Result<T> = core::result::Result<T, FsError>;
