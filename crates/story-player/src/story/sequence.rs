use super::types::{Direction, StoryItem};
use crate::error::{Result, StoryError};

/// Ordered items for one user plus the per-item finish markers.
///
/// Markers only drive progress-bar rendering of non-current items: everything
/// before `current` is finished, everything after is not, and `current` stays
/// unfinished while it plays.
#[derive(Debug, Clone)]
pub struct StorySequence {
    items: Vec<StoryItem>,
    finished: Vec<bool>,
    current: usize,
}

impl StorySequence {
    pub fn new(user_id: &str, items: Vec<StoryItem>) -> Result<Self> {
        if items.is_empty() {
            return Err(StoryError::EmptySequence {
                user_id: user_id.to_string(),
            });
        }
        let finished = vec![false; items.len()];
        Ok(Self {
            items,
            finished,
            current: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; construction rejects empty sequences.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_at(&self, index: usize) -> Option<&StoryItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[StoryItem] {
        &self.items
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_item(&self) -> &StoryItem {
        &self.items[self.current]
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.items.len()
    }

    pub fn mark_finished(&mut self, index: usize) {
        if let Some(f) = self.finished.get_mut(index) {
            *f = true;
        }
    }

    pub fn mark_unfinished(&mut self, index: usize) {
        if let Some(f) = self.finished.get_mut(index) {
            *f = false;
        }
    }

    pub fn clear_finished(&mut self) {
        self.finished.fill(false);
    }

    pub fn is_finished(&self, index: usize) -> bool {
        self.finished.get(index).copied().unwrap_or(false)
    }

    /// Stored marker as a bar fill value (0.0 or 1.0).
    pub fn finish_marker(&self, index: usize) -> f32 {
        if self.is_finished(index) { 1.0 } else { 0.0 }
    }

    pub fn finish_markers(&self) -> Vec<f32> {
        (0..self.items.len()).map(|i| self.finish_marker(i)).collect()
    }

    /// Reset position for a page entered in `direction`.
    ///
    /// Forward entry starts at 0 with nothing watched; backward entry lands on
    /// the last item with every earlier item already watched.
    pub fn reinitialize(&mut self, direction: Direction) -> usize {
        let last = self.items.len() - 1;
        match direction {
            Direction::Next => {
                self.current = 0;
                self.finished.fill(false);
            }
            Direction::Previous => {
                self.current = last;
                self.finished.fill(true);
                self.finished[last] = false;
            }
        }
        self.current
    }

    /// Finish the current item and step forward. `None` at the last item.
    pub fn step_forward(&mut self) -> Option<usize> {
        if self.is_last() {
            return None;
        }
        self.mark_finished(self.current);
        self.current += 1;
        Some(self.current)
    }

    /// Unfinish the current item and step back. `None` at index 0.
    ///
    /// The item stepped onto becomes current again, so its marker is cleared too.
    pub fn step_back(&mut self) -> Option<usize> {
        if self.current == 0 {
            return None;
        }
        self.mark_unfinished(self.current);
        self.current -= 1;
        self.mark_unfinished(self.current);
        Some(self.current)
    }
}
