//! One user's page: playback machine, gesture bridge and seen reporter wired
//! to the host carousel.

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::clock::ClockCompletion;
use crate::error::Result;
use crate::gesture::{Command, GestureBridge, GestureEvent};
use crate::playback::{MediaSignal, PlaybackEvent, PlaybackMachine, PlaybackSnapshot};
use crate::seen::{SeenEvent, SeenReporter};
use crate::settings::{FALLBACK_SWIPE_LABEL, PlayerConfig};
use crate::story::{Direction, StoryItem, StorySequence, UserStories};

/// Callbacks into the carousel that owns the pages.
pub trait StoryHost {
    /// The page exhausted its sequence; the host decides whether to change page.
    fn on_session_finish(&mut self, page_index: usize, direction: Direction);
    fn on_close(&mut self, page_index: usize);
    fn on_story_seen(&mut self, _event: &SeenEvent) {}
    /// Swipe-up on an item without its own action handler.
    fn on_swipe_action(&mut self, _item: &StoryItem) {}
}

/// Input delivered to a page's inbox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageEvent {
    ActivePage(usize),
    Media(MediaSignal),
    /// The video at this item index reached its end.
    MediaEnded { index: usize },
    Gesture(GestureEvent),
    ClockComplete(ClockCompletion),
}

/// Cloneable sender for collaborators (media layer, gesture layer, carousel).
#[derive(Debug, Clone)]
pub struct PageHandle {
    tx: Sender<PageEvent>,
}

impl PageHandle {
    /// Queue an event; false once the page is gone.
    pub fn send(&self, event: PageEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn media_loaded(&self, signal: MediaSignal) -> bool {
        self.send(PageEvent::Media(signal))
    }

    pub fn media_ended(&self, index: usize) -> bool {
        self.send(PageEvent::MediaEnded { index })
    }

    pub fn gesture(&self, event: GestureEvent) -> bool {
        self.send(PageEvent::Gesture(event))
    }

    pub fn set_active_page(&self, active_page: usize) -> bool {
        self.send(PageEvent::ActivePage(active_page))
    }
}

#[derive(Debug, Clone)]
struct Profile {
    user_id: String,
    profile_image: String,
    profile_name: String,
}

pub struct StoryPage {
    profile: Profile,
    machine: PlaybackMachine,
    gestures: GestureBridge,
    seen: SeenReporter,
    default_swipe_label: Option<String>,
    tx: Sender<PageEvent>,
    rx: Receiver<PageEvent>,
}

impl StoryPage {
    pub fn new(page_index: usize, user: UserStories, config: &PlayerConfig) -> Result<Self> {
        let UserStories {
            user_id,
            profile_image,
            profile_name,
            stories,
        } = user;
        config.validate()?;
        let sequence = StorySequence::new(&user_id, stories)?;
        let (tx, rx) = unbounded();
        log::debug!(
            "page {}: created for user {} with {} items",
            page_index,
            user_id,
            sequence.len()
        );

        Ok(Self {
            profile: Profile {
                user_id,
                profile_image,
                profile_name,
            },
            machine: PlaybackMachine::new(page_index, sequence, config.default_duration_ms),
            gestures: GestureBridge::new(config.long_press_ms),
            seen: SeenReporter::new(page_index),
            default_swipe_label: config.swipe_label.clone(),
            tx,
            rx,
        })
    }

    pub fn handle(&self) -> PageHandle {
        PageHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn page_index(&self) -> usize {
        self.machine.page_index()
    }

    pub fn user_id(&self) -> &str {
        &self.profile.user_id
    }

    pub fn profile_name(&self) -> &str {
        &self.profile.profile_name
    }

    pub fn machine(&self) -> &PlaybackMachine {
        &self.machine
    }

    pub fn current_item(&self) -> &StoryItem {
        self.machine.current_item()
    }

    pub fn progress_bars(&self) -> Vec<f32> {
        self.machine.progress_bars()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.machine.snapshot()
    }

    pub fn swipe_label(&self) -> &str {
        self.current_item()
            .swipe_up_label
            .as_deref()
            .or(self.default_swipe_label.as_deref())
            .unwrap_or(FALLBACK_SWIPE_LABEL)
    }

    /// Drive the clock, then process everything queued so far in FIFO order.
    ///
    /// A completion is handled after input that arrived earlier, so navigation
    /// already in the inbox wins and the completion is discarded as stale.
    pub fn update<H: StoryHost>(&mut self, now_ms: u64, host: &mut H) -> usize {
        let completion = self.machine.tick(now_ms);
        let mut processed = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.dispatch(event, now_ms, host);
            processed += 1;
        }
        if let Some(completion) = completion {
            self.dispatch(PageEvent::ClockComplete(completion), now_ms, host);
            processed += 1;
        }
        processed
    }

    /// Apply a single event immediately.
    pub fn dispatch<H: StoryHost>(&mut self, event: PageEvent, now_ms: u64, host: &mut H) {
        match event {
            PageEvent::ActivePage(active) => self.machine.set_active_page(active, now_ms),
            PageEvent::Media(signal) => self.machine.media_loaded(signal, now_ms),
            PageEvent::MediaEnded { index } => self.machine.media_ended(index, now_ms),
            PageEvent::Gesture(gesture) => {
                if let Some(command) = self.gestures.handle(gesture) {
                    self.run_command(command, now_ms, host);
                }
            }
            PageEvent::ClockComplete(completion) => {
                self.machine.on_clock_complete(completion, now_ms);
            }
        }
        self.flush(host);
    }

    pub fn set_active_page<H: StoryHost>(&mut self, active_page: usize, now_ms: u64, host: &mut H) {
        self.dispatch(PageEvent::ActivePage(active_page), now_ms, host);
    }

    pub fn media_loaded<H: StoryHost>(&mut self, signal: MediaSignal, now_ms: u64, host: &mut H) {
        self.dispatch(PageEvent::Media(signal), now_ms, host);
    }

    pub fn gesture<H: StoryHost>(&mut self, event: GestureEvent, now_ms: u64, host: &mut H) {
        self.dispatch(PageEvent::Gesture(event), now_ms, host);
    }

    /// Replay the current item; for hosts that ignore a session boundary.
    pub fn restart_current<H: StoryHost>(&mut self, now_ms: u64, host: &mut H) {
        self.machine.restart_current(now_ms);
        self.flush(host);
    }

    fn run_command<H: StoryHost>(&mut self, command: Command, now_ms: u64, host: &mut H) {
        log::debug!("page {}: command {:?}", self.page_index(), command);
        match command {
            Command::Pause => self.machine.pause(now_ms),
            Command::Resume => self.machine.resume(now_ms),
            Command::Next => self.machine.advance_next(now_ms),
            Command::Previous => self.machine.advance_previous(now_ms),
            Command::Close => host.on_close(self.page_index()),
            Command::SwipeUp => {
                let item = self.current_item().clone();
                match &item.action {
                    Some(action) => action.invoke(),
                    None => host.on_swipe_action(&item),
                }
                host.on_close(self.page_index());
            }
        }
    }

    fn flush<H: StoryHost>(&mut self, host: &mut H) {
        for event in self.machine.drain_events() {
            match event {
                PlaybackEvent::PositionChanged { active_page, index } => {
                    if self.seen.observe(active_page, index) {
                        let seen = self.seen_event(index);
                        host.on_story_seen(&seen);
                    }
                }
                PlaybackEvent::SessionFinished(direction) => {
                    host.on_session_finish(self.page_index(), direction);
                }
                PlaybackEvent::StateChanged(state) => {
                    log::trace!("page {}: state {}", self.page_index(), state.display_name());
                }
            }
        }
    }

    fn seen_event(&self, index: usize) -> SeenEvent {
        let item = self
            .machine
            .session()
            .sequence
            .item_at(index)
            .unwrap_or_else(|| self.current_item())
            .clone();
        SeenEvent {
            user_id: self.profile.user_id.clone(),
            profile_image: self.profile.profile_image.clone(),
            profile_name: self.profile.profile_name.clone(),
            item,
        }
    }
}
