use std::error::Error;

use crate::storage::buffer::FrameId;
use crate::storage::PageId;

#[derive(Debug)]
pub enum DiskError {
    IoError(std::io::Error),
    /// The requested page lies past the end of the file.
    UnexpectedEof { page_no: PageId },
}

#[derive(Debug)]
pub enum BufferPoolError {
    /// Every frame in the pool is pinned; the caller must unpin pages and retry.
    PoolExhausted,
    /// Unpin was called on a resident page whose pin count is already zero.
    PageNotPinned {
        file: String,
        page_no: PageId,
        frame_no: FrameId,
    },
    /// The operation needs the page out of the pool, but a caller still pins it.
    PagePinned {
        file: String,
        page_no: PageId,
        frame_no: FrameId,
    },
    /// A frame's recorded state is internally inconsistent.
    BadFrame {
        frame_no: FrameId,
        dirty: bool,
        valid: bool,
        refbit: bool,
    },
    /// The handle refers to a frame that no longer holds that page.
    StaleHandle { frame_no: FrameId, page_no: PageId },
    /// Derived error from the disk manager
    Disk(DiskError),
}

impl std::fmt::Display for BufferPoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferPoolError::PoolExhausted => {
                write!(f, "Buffer pool exhausted: every frame is pinned")
            }
            BufferPoolError::PageNotPinned {
                file,
                page_no,
                frame_no,
            } => {
                write!(
                    f,
                    "Page {page_no} of '{file}' (frame {frame_no}) is not pinned"
                )
            }
            BufferPoolError::PagePinned {
                file,
                page_no,
                frame_no,
            } => {
                write!(
                    f,
                    "Page {page_no} of '{file}' (frame {frame_no}) is still pinned"
                )
            }
            BufferPoolError::BadFrame {
                frame_no,
                dirty,
                valid,
                refbit,
            } => {
                write!(
                    f,
                    "Frame {frame_no} is in a bad state (dirty={dirty}, valid={valid}, refbit={refbit})"
                )
            }
            BufferPoolError::StaleHandle { frame_no, page_no } => {
                write!(
                    f,
                    "Stale handle: frame {frame_no} no longer holds page {page_no}"
                )
            }
            BufferPoolError::Disk(disk_error) => {
                write!(f, "Disk error: {disk_error}")
            }
        }
    }
}

impl std::fmt::Display for DiskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiskError::IoError(err) => write!(f, "IO error: {err}"),
            DiskError::UnexpectedEof { page_no } => {
                write!(f, "Unexpected EOF reading page {page_no}")
            }
        }
    }
}

impl std::convert::From<std::io::Error> for DiskError {
    fn from(err: std::io::Error) -> Self {
        DiskError::IoError(err)
    }
}

impl std::convert::From<DiskError> for BufferPoolError {
    fn from(err: DiskError) -> Self {
        BufferPoolError::Disk(err)
    }
}

impl std::convert::From<BufferPoolError> for std::io::Error {
    fn from(err: BufferPoolError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err)
    }
}

impl Error for BufferPoolError {}
impl Error for DiskError {}
