use crate::macros::static_assert;

/// The size (in bytes) of a page, both on disk and in a buffer frame
pub const PAGE_SIZE: usize = 4096;

/// The number of frames a buffer pool holds when no capacity is given.
/// The more frames, the more pages we can cache in memory. Increasing this
/// value will generally improve performance, but will also increase memory usage.
pub const DEFAULT_POOL_FRAMES: usize = 64;

pub const CARGO_PKG_NAME: &str = env!("CARGO_PKG_NAME");

static_assert!(PAGE_SIZE % 8 == 0);
static_assert!(DEFAULT_POOL_FRAMES > 0);
