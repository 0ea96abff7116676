use crate::storage::disk::manager::{FileId, FileRef, PageStore};
use crate::storage::page::{PageId, INVALID_PAGE_ID};

/// The Buffer Pool frame id for internal use only. It is not associated with the page id.
pub type FrameId = u16;

/// Bookkeeping for one pool slot: which page occupies it and in what state.
///
/// A frame is born invalid, becomes valid when a page is loaded into its
/// slot, and goes back to invalid when that page is evicted or disposed.
/// The slot bytes themselves live in the pool and stay put until the next
/// load overwrites them.
pub struct FrameDescriptor {
    /// The frame's own index in the pool. Never changes.
    frame_no: FrameId,
    /// The open file whose page occupies this slot, if any.
    pub(crate) file: Option<FileRef>,
    pub(crate) page_no: PageId,
    /// True while the slot holds a real page.
    pub(crate) valid: bool,
    /// Set on every access, cleared by a passing clock hand. A set refbit
    /// buys the page a second chance before eviction.
    pub(crate) refbit: bool,
    /// The slot content was modified and must be written back before reuse.
    pub(crate) dirty: bool,
    /// How many callers hold this page. Only a frame with pin_count == 0
    /// can be evicted.
    pub(crate) pin_count: u32,
}

impl FrameDescriptor {
    pub(crate) fn new(frame_no: FrameId) -> Self {
        FrameDescriptor {
            frame_no,
            file: None,
            page_no: INVALID_PAGE_ID,
            valid: false,
            refbit: false,
            dirty: false,
            pin_count: 0,
        }
    }

    pub fn frame_no(&self) -> FrameId {
        self.frame_no
    }

    /// Identity of the file whose page occupies this slot, if any.
    pub(crate) fn file_id(&self) -> Option<FileId> {
        self.file.as_ref().map(|file| file.borrow().identity())
    }

    /// Whether this frame currently holds `page_no` of the given file.
    pub(crate) fn holds(&self, file_id: FileId, page_no: PageId) -> bool {
        self.valid && self.page_no == page_no && self.file_id() == Some(file_id)
    }

    /// Marks the slot as holding `page_no` of `file`, pinned once by the
    /// caller that triggered the load.
    pub(crate) fn set(&mut self, file: FileRef, page_no: PageId) {
        self.file = Some(file);
        self.page_no = page_no;
        self.valid = true;
        self.refbit = true;
        self.dirty = false;
        self.pin_count = 1;
    }

    /// Returns the slot to its never-used state.
    pub(crate) fn clear(&mut self) {
        self.file = None;
        self.page_no = INVALID_PAGE_ID;
        self.valid = false;
        self.refbit = false;
        self.dirty = false;
        self.pin_count = 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::disk::manager::DiskManager;
    use std::io::Cursor;

    fn memory_file() -> FileRef {
        DiskManager::new("frames.db", Cursor::new(Vec::new()))
            .unwrap()
            .into_shared()
    }

    #[test]
    fn test_frame_lifecycle() {
        let file = memory_file();
        let file_id = file.borrow().identity();

        let mut frame = FrameDescriptor::new(7);
        assert_eq!(frame.frame_no(), 7);
        assert!(!frame.valid);
        assert_eq!(frame.pin_count, 0);
        assert_eq!(frame.page_no, INVALID_PAGE_ID);
        assert!(frame.file_id().is_none());

        frame.set(file.clone(), 42);
        assert!(frame.valid);
        assert!(frame.refbit);
        assert!(!frame.dirty);
        assert_eq!(frame.pin_count, 1);
        assert!(frame.holds(file_id, 42));
        assert!(!frame.holds(file_id, 41));

        frame.clear();
        assert!(!frame.valid);
        assert_eq!(frame.pin_count, 0);
        assert!(frame.file.is_none());
        assert!(!frame.holds(file_id, 42));
    }

    #[test]
    fn test_set_resets_previous_state() {
        let file = memory_file();
        let mut frame = FrameDescriptor::new(0);

        frame.set(file.clone(), 1);
        frame.dirty = true;
        frame.pin_count = 3;

        frame.set(file, 2);
        assert_eq!(frame.page_no, 2);
        assert!(!frame.dirty);
        assert_eq!(frame.pin_count, 1);
    }
}
