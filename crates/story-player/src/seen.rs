use serde::Serialize;

use crate::story::StoryItem;

/// Payload handed to the host when an item is shown on the active page.
#[derive(Debug, Clone, Serialize)]
pub struct SeenEvent {
    pub user_id: String,
    pub profile_image: String,
    pub profile_name: String,
    pub item: StoryItem,
}

/// Emits once per distinct (active page, current index) pair.
#[derive(Debug)]
pub struct SeenReporter {
    page_index: usize,
    last_observed: Option<(Option<usize>, usize)>,
}

impl SeenReporter {
    pub fn new(page_index: usize) -> Self {
        Self {
            page_index,
            last_observed: None,
        }
    }

    /// Record the pair; true when a seen event should be emitted for it.
    pub fn observe(&mut self, active_page: Option<usize>, index: usize) -> bool {
        let pair = (active_page, index);
        if self.last_observed == Some(pair) {
            return false;
        }
        self.last_observed = Some(pair);
        active_page == Some(self.page_index)
    }
}
