//! Fixed set of `M` page frames, the only memory the join algorithms may use.

use log::debug;

use crate::buffer::page::{PageId, RecordPage};
use crate::error::{QuillJoinError, QuillJoinResult};
use crate::storage::PageStore;

pub type FrameId = usize;

#[derive(Debug)]
pub struct BufferPool {
    frames: Vec<RecordPage>,
    page_capacity: usize,
}

impl BufferPool {
    pub fn new(num_frames: usize, page_capacity: usize) -> Self {
        let frames = (0..num_frames)
            .map(|_| RecordPage::new(page_capacity))
            .collect();
        Self {
            frames,
            page_capacity,
        }
    }

    /// Number of frames, `M`.
    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    pub fn page_capacity(&self) -> usize {
        self.page_capacity
    }

    pub fn frame(&self, frame_id: FrameId) -> QuillJoinResult<&RecordPage> {
        let capacity = self.capacity();
        self.frames
            .get(frame_id)
            .ok_or_else(|| Self::no_such_frame(frame_id, capacity))
    }

    pub fn frame_mut(&mut self, frame_id: FrameId) -> QuillJoinResult<&mut RecordPage> {
        let capacity = self.capacity();
        self.frames
            .get_mut(frame_id)
            .ok_or_else(|| Self::no_such_frame(frame_id, capacity))
    }

    /// Overwrites the frame with the page stored under `page_id`.
    pub fn load_from_storage(
        &mut self,
        store: &dyn PageStore,
        page_id: PageId,
        frame_id: FrameId,
    ) -> QuillJoinResult<()> {
        // validate the slot before touching storage
        self.frame(frame_id)?;
        let page = store.read_page(page_id)?;
        if page.capacity() > self.page_capacity {
            return Err(QuillJoinError::CapacityViolation(format!(
                "page {} has capacity {}, frames hold {}",
                page_id,
                page.capacity(),
                self.page_capacity
            )));
        }
        self.frames[frame_id] = page;
        Ok(())
    }

    /// Writes the frame as a new storage page and leaves the frame empty.
    pub fn flush_to_storage(
        &mut self,
        store: &dyn PageStore,
        frame_id: FrameId,
    ) -> QuillJoinResult<PageId> {
        let frame = self.frame_mut(frame_id)?;
        if frame.is_empty() {
            return Err(QuillJoinError::CapacityViolation(format!(
                "flush of empty frame {}",
                frame_id
            )));
        }
        let page_id = store.write_page(frame)?;
        debug!(
            "flushed frame {} ({} entries) to page {}",
            frame_id,
            frame.len(),
            page_id
        );
        frame.reset();
        Ok(page_id)
    }

    pub fn reset_frame(&mut self, frame_id: FrameId) -> QuillJoinResult<()> {
        self.frame_mut(frame_id)?.reset();
        Ok(())
    }

    /// Drops whatever the frames hold, e.g. after an aborted join.
    pub fn reset(&mut self) {
        for frame in self.frames.iter_mut() {
            frame.reset();
        }
    }

    /// A phase takes over the pool only when no frame holds unflushed entries.
    pub fn ensure_empty(&self) -> QuillJoinResult<()> {
        match self.frames.iter().position(|frame| !frame.is_empty()) {
            Some(frame_id) => Err(QuillJoinError::CapacityViolation(format!(
                "frame {} still holds {} unflushed entries",
                frame_id,
                self.frames[frame_id].len()
            ))),
            None => Ok(()),
        }
    }

    fn no_such_frame(frame_id: FrameId, capacity: usize) -> QuillJoinError {
        QuillJoinError::CapacityViolation(format!(
            "frame {} out of range, pool holds {} frames",
            frame_id, capacity
        ))
    }
}
