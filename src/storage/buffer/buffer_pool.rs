use core::fmt;

use log::{debug, trace, warn};

use crate::config::DEFAULT_POOL_FRAMES;
use crate::errors::BufferPoolError;
use crate::storage::disk::manager::{FileId, FileRef, PageStore};
use crate::storage::page::{Page, PageId, INVALID_PAGE_ID};

use super::frame::{FrameDescriptor, FrameId};
use super::page_table::PageTable;

/// Caller-held ticket for a page in the pool. Accessors check it against
/// current residency, so a handle kept past its page's eviction cannot
/// reach bytes that now belong to another page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHandle {
    frame_no: FrameId,
    file_id: FileId,
    page_no: PageId,
}

impl PageHandle {
    pub fn page_no(&self) -> PageId {
        self.page_no
    }

    pub fn frame_no(&self) -> FrameId {
        self.frame_no
    }
}

/// The buffer pool manager: a fixed number of page-sized slots, a descriptor
/// per slot, and a clock hand picking eviction victims.
///
/// Callers fetch or allocate pages through it and get back a [`PageHandle`];
/// a fetched page stays in its slot until the caller unpins it and the clock
/// later reclaims the frame. All access is single-threaded; every operation
/// runs to completion before returning.
pub struct BufferPoolManager {
    frames: Vec<FrameDescriptor>,
    /// Page slots, index-aligned with `frames`.
    pool: Vec<Page>,
    page_table: PageTable,
    clock_hand: usize,
}

impl BufferPoolManager {
    /// Creates a pool with `pool_size` frames, all empty.
    pub fn new(pool_size: usize) -> Self {
        assert!(pool_size > 0, "pool must have at least one frame");
        assert!(
            pool_size <= FrameId::MAX as usize + 1,
            "pool size exceeds the frame id range"
        );

        let frames = (0..pool_size)
            .map(|frame_no| FrameDescriptor::new(frame_no as FrameId))
            .collect();
        let pool = (0..pool_size).map(|_| Page::new(INVALID_PAGE_ID)).collect();

        BufferPoolManager {
            frames,
            pool,
            page_table: PageTable::with_capacity(pool_size),
            // The first advance lands on frame 0
            clock_hand: pool_size - 1,
        }
    }

    /// The number of frames in the pool
    pub fn pool_size(&self) -> usize {
        self.frames.len()
    }

    /// The number of resident pages
    pub fn len(&self) -> usize {
        self.page_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.page_table.is_empty()
    }

    fn advance_clock(&mut self) {
        self.clock_hand = (self.clock_hand + 1) % self.frames.len();
    }

    /// Clock sweep: finds a frame ready to receive a new page, evicting its
    /// previous occupant if there is one.
    ///
    /// Each visited frame gets one of four treatments: an invalid frame wins
    /// immediately; a set refbit is cleared and the frame skipped (second
    /// chance); a pinned frame is counted and skipped; anything else is the
    /// victim. Counting pinned frames bounds the sweep: once the counter
    /// reaches the pool size every frame is pinned and the sweep fails.
    fn allocate_frame(&mut self) -> Result<FrameId, BufferPoolError> {
        let mut pinned_seen = 0;

        while pinned_seen < self.frames.len() {
            self.advance_clock();
            let hand = self.clock_hand;

            if !self.frames[hand].valid {
                return Ok(hand as FrameId);
            }
            if self.frames[hand].refbit {
                self.frames[hand].refbit = false;
                continue;
            }
            if self.frames[hand].pin_count > 0 {
                pinned_seen += 1;
                continue;
            }

            // Found a victim: valid, unreferenced, unpinned
            if self.frames[hand].dirty {
                if let Some(file) = self.frames[hand].file.clone() {
                    file.borrow_mut().write_page(&self.pool[hand])?;
                }
                self.frames[hand].dirty = false;
            }

            debug!(
                "evicting page {} from frame {hand}",
                self.frames[hand].page_no
            );
            if let Some(file_id) = self.frames[hand].file_id() {
                self.page_table.remove(file_id, self.frames[hand].page_no);
            }
            self.frames[hand].clear();
            return Ok(hand as FrameId);
        }

        Err(BufferPoolError::PoolExhausted)
    }

    /// Returns a pinned handle to `page_no` of `file`, reading it from disk
    /// if it is not already resident. The caller must release the page with
    /// [`unpin_page`](Self::unpin_page).
    pub fn fetch_page(
        &mut self,
        file: &FileRef,
        page_no: PageId,
    ) -> Result<PageHandle, BufferPoolError> {
        let file_id = file.borrow().identity();

        match self.page_table.lookup(file_id, page_no) {
            Some(frame_no) => {
                let frame = &mut self.frames[frame_no as usize];
                frame.refbit = true;
                frame.pin_count += 1;
                trace!("page {page_no} hit in frame {frame_no}");

                Ok(PageHandle {
                    frame_no,
                    file_id,
                    page_no,
                })
            }
            None => {
                let frame_no = self.allocate_frame()?;
                let page = file.borrow_mut().read_page(page_no)?;

                self.pool[frame_no as usize] = page;
                self.page_table.insert(file_id, page_no, frame_no);
                self.frames[frame_no as usize].set(file.clone(), page_no);
                debug!(
                    "loaded page {page_no} of '{}' into frame {frame_no}",
                    file.borrow().display_name()
                );

                Ok(PageHandle {
                    frame_no,
                    file_id,
                    page_no,
                })
            }
        }
    }

    /// Releases one pin on `page_no` of `file`, marking the frame dirty if
    /// the caller modified the content. Unpinning a page that is no longer
    /// resident is tolerated silently; unpinning a resident page with no
    /// pins is a caller protocol violation.
    pub fn unpin_page(
        &mut self,
        file: &FileRef,
        page_no: PageId,
        dirty: bool,
    ) -> Result<(), BufferPoolError> {
        let file_id = file.borrow().identity();

        let frame_no = match self.page_table.lookup(file_id, page_no) {
            Some(frame_no) => frame_no,
            // Already evicted or never cached; nothing to do
            None => return Ok(()),
        };

        let frame = &mut self.frames[frame_no as usize];
        if dirty {
            frame.dirty = true;
        }

        if frame.pin_count == 0 {
            return Err(BufferPoolError::PageNotPinned {
                file: file.borrow().display_name(),
                page_no,
                frame_no,
            });
        }

        frame.pin_count -= 1;
        Ok(())
    }

    /// Allocates a new durable page in `file` and pins it into the pool.
    /// Returns the new page number along with the handle.
    pub fn allocate_page(
        &mut self,
        file: &FileRef,
    ) -> Result<(PageId, PageHandle), BufferPoolError> {
        let page = file.borrow_mut().allocate_page()?;
        let page_no = page.page_no();
        let file_id = file.borrow().identity();

        let frame_no = self.allocate_frame()?;
        self.page_table.insert(file_id, page_no, frame_no);
        self.frames[frame_no as usize].set(file.clone(), page_no);
        self.pool[frame_no as usize] = page;
        debug!(
            "allocated page {page_no} of '{}' in frame {frame_no}",
            file.borrow().display_name()
        );

        Ok((
            page_no,
            PageHandle {
                frame_no,
                file_id,
                page_no,
            },
        ))
    }

    /// Destroys `page_no` of `file`: drops it from the pool without a
    /// write-back (the content is moot) and deletes it durably. Disposing a
    /// page a caller still pins fails with `PagePinned`; disposing a page
    /// that was never cached just forwards the deletion.
    pub fn dispose_page(
        &mut self,
        file: &FileRef,
        page_no: PageId,
    ) -> Result<(), BufferPoolError> {
        let file_id = file.borrow().identity();

        if let Some(frame_no) = self.page_table.lookup(file_id, page_no) {
            if self.frames[frame_no as usize].pin_count > 0 {
                return Err(BufferPoolError::PagePinned {
                    file: file.borrow().display_name(),
                    page_no,
                    frame_no,
                });
            }
            self.page_table.remove(file_id, page_no);
            self.frames[frame_no as usize].clear();
        }

        file.borrow_mut().delete_page(page_no)?;
        Ok(())
    }

    /// Forces every resident page of `file` out of the pool, writing dirty
    /// ones back first. Used when a file is being closed. A still-pinned
    /// page aborts the whole flush with `PagePinned`.
    pub fn flush_file(&mut self, file: &FileRef) -> Result<(), BufferPoolError> {
        let file_id = file.borrow().identity();

        for frame_no in 0..self.frames.len() {
            if self.frames[frame_no].file_id() != Some(file_id) {
                continue;
            }

            let frame = &self.frames[frame_no];
            if frame.pin_count > 0 {
                return Err(BufferPoolError::PagePinned {
                    file: file.borrow().display_name(),
                    page_no: frame.page_no,
                    frame_no: frame_no as FrameId,
                });
            }
            if frame.page_no == INVALID_PAGE_ID {
                return Err(BufferPoolError::BadFrame {
                    frame_no: frame_no as FrameId,
                    dirty: frame.dirty,
                    valid: frame.valid,
                    refbit: frame.refbit,
                });
            }

            if self.frames[frame_no].dirty {
                file.borrow_mut().write_page(&self.pool[frame_no])?;
                self.frames[frame_no].dirty = false;
            }

            self.page_table.remove(file_id, self.frames[frame_no].page_no);
            self.frames[frame_no].clear();
        }

        debug!("flushed '{}' out of the pool", file.borrow().display_name());
        Ok(())
    }

    /// Read access to the page behind a handle, after checking the page is
    /// still resident in that frame.
    pub fn page(&self, handle: &PageHandle) -> Result<&Page, BufferPoolError> {
        self.check_handle(handle)?;
        Ok(&self.pool[handle.frame_no as usize])
    }

    /// Write access to the page behind a handle. Modifications must still be
    /// declared through `unpin_page(.., dirty: true)` to reach disk.
    pub fn page_mut(&mut self, handle: &PageHandle) -> Result<&mut Page, BufferPoolError> {
        self.check_handle(handle)?;
        Ok(&mut self.pool[handle.frame_no as usize])
    }

    fn check_handle(&self, handle: &PageHandle) -> Result<(), BufferPoolError> {
        let stale = BufferPoolError::StaleHandle {
            frame_no: handle.frame_no,
            page_no: handle.page_no,
        };

        match self.frames.get(handle.frame_no as usize) {
            Some(frame) if frame.holds(handle.file_id, handle.page_no) => Ok(()),
            _ => Err(stale),
        }
    }

    /// Read-only snapshot of every frame descriptor, for observability.
    pub fn snapshot(&self) -> PoolSnapshot {
        let frames: Vec<FrameInfo> = self
            .frames
            .iter()
            .map(|frame| FrameInfo {
                frame_no: frame.frame_no(),
                file: frame.file.as_ref().map(|file| file.borrow().display_name()),
                page_no: frame.page_no,
                valid: frame.valid,
                refbit: frame.refbit,
                dirty: frame.dirty,
                pin_count: frame.pin_count,
            })
            .collect();
        let valid_frames = frames.iter().filter(|frame| frame.valid).count();

        PoolSnapshot {
            frames,
            valid_frames,
        }
    }
}

impl Default for BufferPoolManager {
    fn default() -> Self {
        BufferPoolManager::new(DEFAULT_POOL_FRAMES)
    }
}

impl Drop for BufferPoolManager {
    /// Writes every valid dirty page back to its file. Best effort: a failed
    /// write-back is logged, not propagated.
    fn drop(&mut self) {
        for frame_no in 0..self.frames.len() {
            let frame = &self.frames[frame_no];
            if !(frame.valid && frame.dirty) {
                continue;
            }
            if let Some(file) = frame.file.clone() {
                let written = file.borrow_mut().write_page(&self.pool[frame_no]);
                if let Err(err) = written {
                    warn!(
                        "failed to write back page {} of '{}' on teardown: {err}",
                        self.pool[frame_no].page_no(),
                        file.borrow().display_name()
                    );
                }
            }
        }
    }
}

/// One frame descriptor's fields as of a [`BufferPoolManager::snapshot`] call.
pub struct FrameInfo {
    pub frame_no: FrameId,
    pub file: Option<String>,
    pub page_no: PageId,
    pub valid: bool,
    pub refbit: bool,
    pub dirty: bool,
    pub pin_count: u32,
}

pub struct PoolSnapshot {
    pub frames: Vec<FrameInfo>,
    pub valid_frames: usize,
}

impl fmt::Display for PoolSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            writeln!(
                f,
                "frame {:>3}: file={} page_no={} valid={} refbit={} dirty={} pin_count={}",
                frame.frame_no,
                frame.file.as_deref().unwrap_or("-"),
                frame.page_no,
                frame.valid,
                frame.refbit,
                frame.dirty,
                frame.pin_count,
            )?;
        }
        write!(f, "valid frames: {}", self.valid_frames)
    }
}
