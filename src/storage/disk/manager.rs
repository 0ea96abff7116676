use std::cell::RefCell;
use std::fs;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::PAGE_SIZE;
use crate::errors::DiskError;
use crate::storage::page::{Page, PageId};

/// Stable identity of one open file, usable as a map key.
pub type FileId = u64;

/// Shared handle to an open file. The buffer pool keeps clones of this in
/// its frame descriptors but never owns the file exclusively.
pub type FileRef = Rc<RefCell<dyn PageStore>>;

static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(0);

/// The durable side of the buffer pool: everything the pool needs from one
/// open file holding fixed-size pages.
pub trait PageStore {
    fn read_page(&mut self, page_no: PageId) -> Result<Page, DiskError>;

    /// Writes the page back at the offset given by its embedded page number.
    fn write_page(&mut self, page: &Page) -> Result<(), DiskError>;

    /// Allocates a fresh (zeroed) page and returns it. Page numbers of
    /// previously deleted pages are reused before the file grows.
    fn allocate_page(&mut self) -> Result<Page, DiskError>;

    fn delete_page(&mut self, page_no: PageId) -> Result<(), DiskError>;

    fn identity(&self) -> FileId;

    fn display_name(&self) -> String;
}

pub struct DiskManager<R: Read + Write + Seek> {
    io: R,
    name: String,
    file_id: FileId,
    /// First page number past the end of the file.
    next_page_no: PageId,
    /// Page numbers freed by delete_page, handed out again on allocation.
    free_pages: Vec<PageId>,
}

impl<R: Read + Write + Seek> DiskManager<R> {
    pub fn new(name: impl Into<String>, mut io: R) -> Result<Self, DiskError> {
        let len = io.seek(SeekFrom::End(0))?;

        Ok(DiskManager {
            io,
            name: name.into(),
            file_id: NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed),
            next_page_no: (len / PAGE_SIZE as u64) as PageId,
            free_pages: Vec::new(),
        })
    }

    /// Wraps the manager in the shared handle the buffer pool works with.
    pub fn into_shared(self) -> FileRef
    where
        R: 'static,
    {
        Rc::new(RefCell::new(self))
    }
}

impl DiskManager<fs::File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DiskError> {
        let path = path.as_ref();
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        DiskManager::new(path.display().to_string(), file)
    }
}

impl<R: Read + Write + Seek> PageStore for DiskManager<R> {
    fn read_page(&mut self, page_no: PageId) -> Result<Page, DiskError> {
        if page_no >= self.next_page_no {
            return Err(DiskError::UnexpectedEof { page_no });
        }

        self.io.seek(SeekFrom::Start(page_id_to_file_offset(page_no)))?;

        let mut data = vec![0u8; PAGE_SIZE].into_boxed_slice();
        self.io.read_exact(&mut data).map_err(|err| match err.kind() {
            ErrorKind::UnexpectedEof => DiskError::UnexpectedEof { page_no },
            _ => DiskError::IoError(err),
        })?;

        Ok(Page::from_parts(page_no, data))
    }

    fn write_page(&mut self, page: &Page) -> Result<(), DiskError> {
        self.io
            .seek(SeekFrom::Start(page_id_to_file_offset(page.page_no())))?;
        self.io.write_all(page.data())?;
        self.io.flush()?;
        Ok(())
    }

    fn allocate_page(&mut self) -> Result<Page, DiskError> {
        let page_no = match self.free_pages.pop() {
            Some(recycled) => recycled,
            None => {
                let fresh = self.next_page_no;
                self.next_page_no += 1;
                fresh
            }
        };

        // Materialize the page so a later read cannot run past EOF
        let page = Page::new(page_no);
        self.write_page(&page)?;
        Ok(page)
    }

    fn delete_page(&mut self, page_no: PageId) -> Result<(), DiskError> {
        if page_no < self.next_page_no && !self.free_pages.contains(&page_no) {
            self.free_pages.push(page_no);
        }
        Ok(())
    }

    fn identity(&self) -> FileId {
        self.file_id
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

/* Utils */

fn page_id_to_file_offset(id: PageId) -> u64 {
    id as u64 * PAGE_SIZE as u64
}
