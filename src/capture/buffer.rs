use crate::assets::source::ImageSource;
use crate::foundation::error::{BoothError, BoothResult};

/// Ordered, fixed-length slots of frame sources for one session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaptureBuffer {
    slots: Vec<Option<ImageSource>>,
}

impl CaptureBuffer {
    pub fn new(frame_count: usize) -> Self {
        Self {
            slots: vec![None; frame_count],
        }
    }

    pub(crate) fn from_slots(slots: Vec<Option<ImageSource>>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn check(&self, index: usize) -> BoothResult<()> {
        if index >= self.slots.len() {
            return Err(BoothError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        Ok(())
    }

    /// Store `source` at `index`, replacing whatever was there (retake).
    pub fn set_frame(&mut self, index: usize, source: ImageSource) -> BoothResult<()> {
        self.check(index)?;
        self.slots[index] = Some(source);
        Ok(())
    }

    /// Empty slot `index`, returning the previous source.
    pub fn clear_frame(&mut self, index: usize) -> BoothResult<Option<ImageSource>> {
        self.check(index)?;
        Ok(self.slots[index].take())
    }

    pub fn frame(&self, index: usize) -> Option<&ImageSource> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn frames(&self) -> &[Option<ImageSource>] {
        &self.slots
    }

    /// Lowest empty slot, or `None` when every slot is filled.
    pub fn first_empty_index(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/buffer.rs"]
mod tests;
