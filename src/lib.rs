mod config;
mod macros;

pub mod errors;

pub mod shared {
    pub mod logger;
}

// For submodules I only expose the public API to the parent module

pub mod storage {
    mod page;

    pub mod disk {
        pub mod manager;
    }

    pub mod buffer {
        mod buffer_pool;
        mod frame;
        mod page_table;

        pub use buffer_pool::{BufferPoolManager, FrameInfo, PageHandle, PoolSnapshot};
        pub use frame::{FrameDescriptor, FrameId};
        pub use page_table::PageTable;
    }

    pub use disk::manager::{DiskManager, FileId, FileRef, PageStore};
    pub use page::{Page, PageId, INVALID_PAGE_ID};
}

pub use config::{DEFAULT_POOL_FRAMES, PAGE_SIZE};
