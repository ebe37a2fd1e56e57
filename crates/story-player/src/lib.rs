//! Playback and navigation core for one page of an ephemeral-story viewer.
//!
//! A page plays a user's items in order on a progress clock, pauses while a
//! tap zone is held, navigates on taps, and reports boundaries, closes and
//! seen items to the carousel that hosts it. Rendering, media decoding and
//! gesture geometry stay with the host.

pub mod clock;
pub mod error;
pub mod gesture;
pub mod page;
pub mod playback;
pub mod seen;
pub mod settings;
pub mod story;

pub use error::StoryError;
pub use gesture::{GestureEvent, SwipeDirection, Zone};
pub use page::{PageEvent, PageHandle, StoryHost, StoryPage};
pub use playback::{MediaSignal, PlaybackSnapshot, PlaybackState};
pub use seen::SeenEvent;
pub use settings::{PlayerConfig, SwipeConfig};
pub use story::{Direction, MediaKind, StoryItem, UserStories};
