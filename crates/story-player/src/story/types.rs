use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// What kind of media an item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            MediaKind::Image => "Image",
            MediaKind::Video => "Video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Host callback attached to an item, run on swipe-up / action tap.
#[derive(Clone)]
pub struct ActionHandler(Rc<dyn Fn()>);

impl ActionHandler {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn invoke(&self) {
        (self.0)();
    }
}

impl fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionHandler(..)")
    }
}

/// One media unit of a user's story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryItem {
    pub media_uri: String,
    pub media_kind: MediaKind,
    #[serde(skip)]
    pub action: Option<ActionHandler>,
    #[serde(default)]
    pub swipe_up_label: Option<String>,
}

impl StoryItem {
    pub fn image(uri: &str) -> Self {
        Self {
            media_uri: uri.to_string(),
            media_kind: MediaKind::Image,
            action: None,
            swipe_up_label: None,
        }
    }

    pub fn video(uri: &str) -> Self {
        Self {
            media_uri: uri.to_string(),
            media_kind: MediaKind::Video,
            action: None,
            swipe_up_label: None,
        }
    }

    pub fn with_action(mut self, f: impl Fn() + 'static) -> Self {
        self.action = Some(ActionHandler::new(f));
        self
    }

    pub fn with_swipe_label(mut self, label: &str) -> Self {
        self.swipe_up_label = Some(label.to_string());
        self
    }

    pub fn is_video(&self) -> bool {
        self.media_kind == MediaKind::Video
    }

    /// Same media source, so a fresh ready signal is not needed.
    pub fn shares_media_with(&self, other: &StoryItem) -> bool {
        self.media_uri == other.media_uri && self.media_kind == other.media_kind
    }
}

/// Everything the host supplies for one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStories {
    pub user_id: String,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub profile_name: String,
    pub stories: Vec<StoryItem>,
}

/// Direction of travel across a session boundary or page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Next,
    Previous,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Next => "next",
            Direction::Previous => "previous",
        })
    }
}
