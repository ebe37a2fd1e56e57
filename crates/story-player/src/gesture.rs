//! Maps recognised gestures onto playback commands.
//!
//! Recognition geometry lives in the platform layer; this only sees swipes
//! that were already classified and raw press/long-press/release per zone.

/// Tap zone on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    Up,
    Down,
}

/// Raw input delivered by the platform gesture layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    Swipe(SwipeDirection),
    PressIn { zone: Zone, at_ms: u64 },
    /// The recogniser crossed its long-press threshold for this zone.
    LongPress { zone: Zone },
    PressOut { zone: Zone, at_ms: u64 },
    /// Close icon tapped.
    CloseTap,
    /// Swipe-up affordance tapped.
    ActionTap,
}

/// Abstract command for the playback machine or the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    Next,
    Previous,
    SwipeUp,
    Close,
}

#[derive(Debug, Clone, Copy)]
struct ActivePress {
    zone: Zone,
    started_at_ms: u64,
    long: bool,
}

/// Tracks the press in progress so a release can be classified as tap or hold.
#[derive(Debug)]
pub struct GestureBridge {
    long_press_ms: u64,
    press: Option<ActivePress>,
}

impl GestureBridge {
    pub fn new(long_press_ms: u64) -> Self {
        Self {
            long_press_ms,
            press: None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn handle(&mut self, event: GestureEvent) -> Option<Command> {
        match event {
            GestureEvent::Swipe(SwipeDirection::Up) | GestureEvent::ActionTap => {
                Some(Command::SwipeUp)
            }
            GestureEvent::Swipe(SwipeDirection::Down) | GestureEvent::CloseTap => {
                Some(Command::Close)
            }
            GestureEvent::PressIn { zone, at_ms } => {
                // Pause optimistically; the release decides whether this was a tap.
                self.press = Some(ActivePress {
                    zone,
                    started_at_ms: at_ms,
                    long: false,
                });
                Some(Command::Pause)
            }
            GestureEvent::LongPress { zone } => {
                if let Some(press) = self.press.as_mut().filter(|p| p.zone == zone) {
                    press.long = true;
                }
                None
            }
            GestureEvent::PressOut { zone, at_ms } => {
                let press = self.press.filter(|p| p.zone == zone)?;
                self.press = None;
                let held_ms = at_ms.saturating_sub(press.started_at_ms);
                let held = press.long || held_ms >= self.long_press_ms;
                if held {
                    return Some(Command::Resume);
                }
                Some(match zone {
                    Zone::Left => Command::Previous,
                    Zone::Right => Command::Next,
                })
            }
        }
    }
}
