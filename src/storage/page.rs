use crate::config::PAGE_SIZE;

/// Logical page number within a single file.
pub type PageId = u32;

/// Page number of a frame slot that holds no page. No real page ever gets it.
pub const INVALID_PAGE_ID: PageId = PageId::MAX;

/// One page worth of bytes plus the page number it lives at on disk.
/// The page number travels with the bytes so a write-back always knows
/// where the content belongs.
#[derive(Debug)]
pub struct Page {
    page_no: PageId,
    /// Heap allocated buffer of size PAGE_SIZE.
    data: Box<[u8]>,
}

impl Page {
    /// A zeroed page carrying the given page number.
    pub fn new(page_no: PageId) -> Self {
        Page {
            page_no,
            data: vec![0u8; PAGE_SIZE].into_boxed_slice(),
        }
    }

    pub(crate) fn from_parts(page_no: PageId, data: Box<[u8]>) -> Self {
        debug_assert_eq!(data.len(), PAGE_SIZE);
        Page { page_no, data }
    }

    pub fn page_no(&self) -> PageId {
        self.page_no
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}
