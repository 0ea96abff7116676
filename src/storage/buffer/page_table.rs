use std::collections::HashMap;

use crate::storage::disk::manager::FileId;
use crate::storage::page::PageId;

use super::frame::FrameId;

/// Maps (file, page number) to the frame where that page is resident.
///
/// The pool keeps this in lockstep with its frame descriptors: at most one
/// frame per key, and every valid frame has exactly one entry here.
pub struct PageTable {
    entries: HashMap<(FileId, PageId), FrameId>,
}

impl PageTable {
    pub fn with_capacity(capacity: usize) -> Self {
        PageTable {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Where the page is resident, or None on a cache miss.
    pub fn lookup(&self, file: FileId, page_no: PageId) -> Option<FrameId> {
        self.entries.get(&(file, page_no)).copied()
    }

    pub fn insert(&mut self, file: FileId, page_no: PageId, frame_no: FrameId) {
        self.entries.insert((file, page_no), frame_no);
    }

    pub fn remove(&mut self, file: FileId, page_no: PageId) -> Option<FrameId> {
        self.entries.remove(&(file, page_no))
    }

    /// The number of resident pages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
