pub mod feed;
pub mod sequence;
pub mod types;

pub use sequence::StorySequence;
pub use types::{ActionHandler, Direction, MediaKind, StoryItem, UserStories};
