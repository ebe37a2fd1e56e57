use serde::Serialize;

use crate::story::{Direction, MediaKind};

/// Runtime playback state of one page.
///
/// Advancing between items is resolved inside a single transition, so it is
/// never observable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackState {
    /// Waiting for the media-ready signal of the current item; clock idle.
    Loading,
    /// Clock running toward completion.
    Playing,
    /// Clock frozen by a sustained press.
    Paused { remaining_ms: u64 },
}

impl PlaybackState {
    pub fn display_name(&self) -> &'static str {
        match self {
            PlaybackState::Loading => "Loading",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused { .. } => "Paused",
        }
    }
}

/// Ready signal from the media collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaSignal {
    ImageLoaded,
    VideoLoaded { duration_secs: f64 },
}

impl MediaSignal {
    pub fn kind(&self) -> MediaKind {
        match self {
            MediaSignal::ImageLoaded => MediaKind::Image,
            MediaSignal::VideoLoaded { .. } => MediaKind::Video,
        }
    }

    /// Resolved playback duration, `None` for a nonsensical reported duration.
    pub fn duration_ms(&self, image_duration_ms: u64) -> Option<u64> {
        match *self {
            MediaSignal::ImageLoaded => Some(image_duration_ms),
            MediaSignal::VideoLoaded { duration_secs } => {
                if duration_secs.is_finite() && duration_secs >= 0.0 {
                    Some((duration_secs * 1000.0).round() as u64)
                } else {
                    None
                }
            }
        }
    }
}

/// Change notifications queued by the machine and drained by the page.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// The (active page, current index) pair changed.
    PositionChanged {
        active_page: Option<usize>,
        index: usize,
    },
    StateChanged(PlaybackState),
    /// The sequence is exhausted in `Direction`; the host decides what happens next.
    SessionFinished(Direction),
}

/// Read-only view for rendering layers.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackSnapshot {
    pub page_index: usize,
    pub active: bool,
    pub current_index: usize,
    pub item_count: usize,
    pub state: PlaybackState,
    pub media_ready: bool,
    pub is_paused: bool,
    pub effective_duration_ms: u64,
    pub progress: f64,
    /// One fill value per item; the current item carries the live clock value.
    pub bars: Vec<f32>,
}
