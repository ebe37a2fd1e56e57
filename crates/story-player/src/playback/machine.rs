use super::types::{MediaSignal, PlaybackEvent, PlaybackSnapshot, PlaybackState};
use crate::clock::{ClockCompletion, ProgressClock};
use crate::story::{Direction, StoryItem, StorySequence};

/// Mutable runtime state of one page. Reset, never destroyed, on page changes.
#[derive(Debug)]
pub struct PlaybackSession {
    pub sequence: StorySequence,
    /// The current item's media has reported ready.
    pub media_ready: bool,
    /// A zone is being held.
    pub is_paused: bool,
    pub effective_duration_ms: u64,
}

/// Orchestrates the progress clock and the story sequence for one page.
///
/// The machine is the only writer of its clock. Every operation is a complete
/// transition; observers learn about changes through [`PlaybackMachine::drain_events`].
#[derive(Debug)]
pub struct PlaybackMachine {
    page_index: usize,
    active_page: Option<usize>,
    session: PlaybackSession,
    state: PlaybackState,
    clock: ProgressClock,
    image_duration_ms: u64,
    events: Vec<PlaybackEvent>,
}

impl PlaybackMachine {
    pub fn new(page_index: usize, sequence: StorySequence, image_duration_ms: u64) -> Self {
        Self {
            page_index,
            active_page: None,
            session: PlaybackSession {
                sequence,
                media_ready: false,
                is_paused: false,
                effective_duration_ms: image_duration_ms,
            },
            state: PlaybackState::Loading,
            clock: ProgressClock::new(),
            image_duration_ms,
            events: Vec::new(),
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn active_page(&self) -> Option<usize> {
        self.active_page
    }

    pub fn is_active(&self) -> bool {
        self.active_page == Some(self.page_index)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn current_index(&self) -> usize {
        self.session.sequence.current_index()
    }

    pub fn current_item(&self) -> &StoryItem {
        self.session.sequence.current_item()
    }

    pub fn progress(&self) -> f64 {
        self.clock.current_value()
    }

    /// Stored finish markers with the live clock value at the current index.
    pub fn progress_bars(&self) -> Vec<f32> {
        let mut bars = self.session.sequence.finish_markers();
        bars[self.current_index()] = self.clock.current_value() as f32;
        bars
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            page_index: self.page_index,
            active: self.is_active(),
            current_index: self.current_index(),
            item_count: self.session.sequence.len(),
            state: self.state,
            media_ready: self.session.media_ready,
            is_paused: self.session.is_paused,
            effective_duration_ms: self.session.effective_duration_ms,
            progress: self.clock.current_value(),
            bars: self.progress_bars(),
        }
    }

    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }

    /// Host moved its active-page pointer.
    pub fn set_active_page(&mut self, active_page: usize, now_ms: u64) {
        let previous = self.active_page;
        if previous == Some(active_page) {
            return;
        }
        self.active_page = Some(active_page);

        let was_active = previous == Some(self.page_index);
        let is_active = active_page == self.page_index;
        if was_active || is_active {
            let direction = if previous.is_some_and(|p| p > active_page) {
                Direction::Previous
            } else {
                Direction::Next
            };
            self.enter_page(direction, now_ms);
        }

        self.events.push(PlaybackEvent::PositionChanged {
            active_page: self.active_page,
            index: self.current_index(),
        });
    }

    /// Media-ready signal for the current item.
    pub fn media_loaded(&mut self, signal: MediaSignal, now_ms: u64) {
        if self.state != PlaybackState::Loading {
            log::debug!(
                "page {}: ignoring {:?} while {}",
                self.page_index,
                signal,
                self.state.display_name()
            );
            return;
        }
        let kind = self.current_item().media_kind;
        if signal.kind() != kind {
            log::warn!(
                "page {}: {:?} does not match current {} item {}",
                self.page_index,
                signal,
                kind,
                self.current_index()
            );
            return;
        }
        let Some(duration_ms) = signal.duration_ms(self.image_duration_ms) else {
            log::warn!("page {}: unusable media duration in {:?}", self.page_index, signal);
            return;
        };

        self.session.media_ready = true;
        self.session.effective_duration_ms = duration_ms;
        log::debug!(
            "page {}: item {} ready, duration {}ms",
            self.page_index,
            self.current_index(),
            duration_ms
        );
        self.begin_playback(now_ms);
    }

    /// The media collaborator reports that the video at `index` ran to its end.
    ///
    /// Ignored once the sequence has moved past `index`, so a clip end that
    /// loses the race against clock completion cannot skip the next item.
    pub fn media_ended(&mut self, index: usize, now_ms: u64) {
        if index != self.current_index() {
            log::debug!(
                "page {}: discarded end of item {} (current {})",
                self.page_index,
                index,
                self.current_index()
            );
            return;
        }
        if !self.current_item().is_video() || self.state == PlaybackState::Loading {
            return;
        }
        if !self.is_active() {
            return;
        }
        self.clock.reset();
        self.advance_next(now_ms);
    }

    /// Sustained press: freeze the clock and capture the time left.
    pub fn pause(&mut self, now_ms: u64) {
        self.session.is_paused = true;
        if self.state != PlaybackState::Playing {
            return;
        }
        self.clock.pause(now_ms);
        let remaining =
            self.session.effective_duration_ms as f64 * (1.0 - self.clock.current_value());
        let remaining_ms = remaining.max(0.0).round() as u64;
        self.set_state(PlaybackState::Paused { remaining_ms });
    }

    /// Press released: continue with exactly the captured remaining time.
    pub fn resume(&mut self, now_ms: u64) {
        self.session.is_paused = false;
        if let PlaybackState::Paused { remaining_ms } = self.state {
            self.clock.resume(remaining_ms, now_ms);
            self.set_state(PlaybackState::Playing);
        }
    }

    /// Drive the clock. The returned completion must come back through
    /// [`PlaybackMachine::on_clock_complete`].
    pub fn tick(&mut self, now_ms: u64) -> Option<ClockCompletion> {
        self.clock.tick(now_ms)
    }

    /// Returns false when the completion belonged to a superseded run.
    pub fn on_clock_complete(&mut self, completion: ClockCompletion, now_ms: u64) -> bool {
        if !self.clock.acknowledge(completion) {
            log::debug!(
                "page {}: discarded stale clock completion (gen {} vs current {})",
                self.page_index,
                completion.generation,
                self.clock.generation()
            );
            return false;
        }
        if self.state != PlaybackState::Playing || !self.is_active() {
            return false;
        }
        self.advance_next(now_ms);
        true
    }

    /// Skip to the next item, or finish the session at the last one.
    pub fn advance_next(&mut self, now_ms: u64) {
        self.clock.reset();
        let from = self.current_index();
        match self.session.sequence.step_forward() {
            Some(_) => self.enter_item(from, now_ms),
            None => self.finish_session(Direction::Next),
        }
    }

    /// Go back one item, or finish the session backward at index 0.
    pub fn advance_previous(&mut self, now_ms: u64) {
        self.clock.reset();
        let from = self.current_index();
        match self.session.sequence.step_back() {
            Some(_) => self.enter_item(from, now_ms),
            None => self.finish_session(Direction::Previous),
        }
    }

    /// Replay the current item from 0 when its media is already loaded.
    pub fn restart_current(&mut self, now_ms: u64) {
        self.clock.reset();
        self.session.is_paused = false;
        if self.session.media_ready {
            self.begin_playback(now_ms);
        } else {
            self.set_state(PlaybackState::Loading);
        }
    }

    fn enter_page(&mut self, direction: Direction, now_ms: u64) {
        let before = self.current_index();
        self.clock.reset();
        self.session.is_paused = false;
        let after = self.session.sequence.reinitialize(direction);
        if after != before {
            self.session.media_ready = false;
        }
        log::debug!(
            "page {}: reset entering {} at item {} (active={})",
            self.page_index,
            direction,
            after,
            self.is_active()
        );
        if self.session.media_ready && self.is_active() {
            self.begin_playback(now_ms);
        } else {
            self.set_state(PlaybackState::Loading);
        }
    }

    fn enter_item(&mut self, from: usize, now_ms: u64) {
        let to = self.current_index();
        self.session.is_paused = false;

        let reuse = self.session.media_ready
            && self
                .session
                .sequence
                .item_at(from)
                .is_some_and(|prev| prev.shares_media_with(self.current_item()));

        log::debug!(
            "page {}: item {} -> {}{}",
            self.page_index,
            from,
            to,
            if reuse { " (same media)" } else { "" }
        );
        self.events.push(PlaybackEvent::PositionChanged {
            active_page: self.active_page,
            index: to,
        });

        if reuse {
            if !self.current_item().is_video() {
                self.session.effective_duration_ms = self.image_duration_ms;
            }
            self.begin_playback(now_ms);
        } else {
            self.session.media_ready = false;
            self.set_state(PlaybackState::Loading);
        }
    }

    fn finish_session(&mut self, direction: Direction) {
        self.session.sequence.clear_finished();
        self.session.is_paused = false;
        self.set_state(PlaybackState::Loading);
        if self.is_active() {
            log::info!("page {}: session finished ({})", self.page_index, direction);
            self.events.push(PlaybackEvent::SessionFinished(direction));
        }
    }

    fn begin_playback(&mut self, now_ms: u64) {
        if !self.is_active() {
            self.set_state(PlaybackState::Loading);
            return;
        }
        let duration_ms = self.session.effective_duration_ms;
        if self.session.is_paused {
            self.clock.reset();
            self.set_state(PlaybackState::Paused {
                remaining_ms: duration_ms,
            });
        } else {
            self.clock.start(duration_ms, now_ms);
            self.set_state(PlaybackState::Playing);
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.events.push(PlaybackEvent::StateChanged(state));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: u64 = 10_000;

    fn images(n: usize) -> Vec<StoryItem> {
        (0..n).map(|i| StoryItem::image(&format!("img-{i}"))).collect()
    }

    fn make_machine(items: Vec<StoryItem>) -> PlaybackMachine {
        let seq = StorySequence::new("u", items).unwrap();
        let mut m = PlaybackMachine::new(0, seq, D);
        m.set_active_page(0, 0);
        m.drain_events();
        m
    }

    fn run_clock(m: &mut PlaybackMachine, now_ms: u64) -> bool {
        match m.tick(now_ms) {
            Some(c) => m.on_clock_complete(c, now_ms),
            None => false,
        }
    }

    fn finished(events: &[PlaybackEvent]) -> Vec<Direction> {
        events
            .iter()
            .filter_map(|e| match e {
                PlaybackEvent::SessionFinished(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn starts_loading_until_ready() {
        let mut m = make_machine(images(2));
        assert_eq!(m.state(), PlaybackState::Loading);
        assert!(m.tick(50_000).is_none());
        m.media_loaded(MediaSignal::ImageLoaded, 100);
        assert_eq!(m.state(), PlaybackState::Playing);
        assert_eq!(m.session().effective_duration_ms, D);
    }

    #[test]
    fn three_images_play_through() {
        let mut m = make_machine(images(3));
        m.media_loaded(MediaSignal::ImageLoaded, 0);
        assert_eq!(m.progress_bars(), vec![0.0, 0.0, 0.0]);

        assert!(run_clock(&mut m, 10_000));
        assert_eq!(m.current_index(), 1);
        assert_eq!(m.progress_bars(), vec![1.0, 0.0, 0.0]);
        assert_eq!(m.state(), PlaybackState::Loading);
        m.media_loaded(MediaSignal::ImageLoaded, 10_000);

        assert!(run_clock(&mut m, 20_000));
        assert_eq!(m.current_index(), 2);
        assert_eq!(m.progress_bars(), vec![1.0, 1.0, 0.0]);
        m.media_loaded(MediaSignal::ImageLoaded, 20_000);
        m.drain_events();

        assert!(run_clock(&mut m, 30_000));
        let events = m.drain_events();
        assert_eq!(finished(&events), vec![Direction::Next]);
        assert_eq!(m.current_index(), 2);
        assert_eq!(m.progress_bars(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn manual_next_skips_timer() {
        let mut m = make_machine(images(3));
        m.media_loaded(MediaSignal::ImageLoaded, 0);
        m.advance_next(1_000);
        assert_eq!(m.current_index(), 1);
        assert_eq!(m.progress_bars(), vec![1.0, 0.0, 0.0]);
        assert!(!m.clock.is_running());
    }

    #[test]
    fn previous_at_zero_finishes_each_time() {
        let mut m = make_machine(images(3));
        m.media_loaded(MediaSignal::ImageLoaded, 0);
        m.advance_previous(500);
        assert_eq!(finished(&m.drain_events()), vec![Direction::Previous]);
        m.advance_previous(600);
        assert_eq!(finished(&m.drain_events()), vec![Direction::Previous]);
        assert_eq!(m.current_index(), 0);
    }

    #[test]
    fn previous_unmarks_current() {
        let mut m = make_machine(images(3));
        m.advance_next(0);
        m.advance_next(0);
        assert_eq!(m.progress_bars(), vec![1.0, 1.0, 0.0]);
        m.advance_previous(0);
        assert_eq!(m.current_index(), 1);
        assert_eq!(m.session().sequence.finish_markers(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn video_waits_for_reported_duration() {
        let mut m = make_machine(vec![StoryItem::video("clip.mp4"), StoryItem::image("b")]);
        assert!(m.tick(2_000).is_none());
        m.media_loaded(MediaSignal::VideoLoaded { duration_secs: 3.5 }, 2_000);
        assert_eq!(m.session().effective_duration_ms, 3_500);
        assert!(!run_clock(&mut m, 5_499));
        assert!(run_clock(&mut m, 5_500));
        assert_eq!(m.current_index(), 1);
    }

    #[test]
    fn mismatched_signal_is_ignored() {
        let mut m = make_machine(vec![StoryItem::video("clip.mp4")]);
        m.media_loaded(MediaSignal::ImageLoaded, 0);
        assert_eq!(m.state(), PlaybackState::Loading);
        m.media_loaded(MediaSignal::VideoLoaded { duration_secs: f64::NAN }, 0);
        assert_eq!(m.state(), PlaybackState::Loading);
    }

    #[test]
    fn pause_resume_preserves_remaining() {
        let mut m = make_machine(images(3));
        m.advance_next(0);
        m.media_loaded(MediaSignal::ImageLoaded, 0);
        m.tick(4_000);
        m.pause(4_000);
        assert_eq!(m.state(), PlaybackState::Paused { remaining_ms: 6_000 });
        assert!(m.tick(60_000).is_none());

        m.resume(90_000);
        assert_eq!(m.state(), PlaybackState::Playing);
        assert!(!run_clock(&mut m, 95_999));
        assert!(run_clock(&mut m, 96_000));
        assert_eq!(m.current_index(), 2);
    }

    #[test]
    fn completion_superseded_by_navigation_is_discarded() {
        let mut m = make_machine(images(3));
        m.media_loaded(MediaSignal::ImageLoaded, 0);
        let late = m.tick(10_000).unwrap();
        m.advance_next(10_000);
        m.media_loaded(MediaSignal::ImageLoaded, 10_000);
        assert!(!m.on_clock_complete(late, 10_001));
        assert_eq!(m.current_index(), 1);
    }

    #[test]
    fn hold_during_loading_enters_paused() {
        let mut m = make_machine(images(2));
        m.pause(0);
        m.media_loaded(MediaSignal::ImageLoaded, 100);
        assert_eq!(m.state(), PlaybackState::Paused { remaining_ms: D });
        m.resume(5_000);
        assert!(run_clock(&mut m, 15_000));
    }

    #[test]
    fn same_media_skips_loading() {
        let mut m = make_machine(vec![StoryItem::image("dup"), StoryItem::image("dup")]);
        m.media_loaded(MediaSignal::ImageLoaded, 0);
        m.advance_next(3_000);
        assert_eq!(m.current_index(), 1);
        assert_eq!(m.state(), PlaybackState::Playing);
        assert!(run_clock(&mut m, 13_000));
    }

    #[test]
    fn same_uri_different_kind_still_loads() {
        let mut m = make_machine(vec![StoryItem::image("x"), StoryItem::video("x")]);
        m.media_loaded(MediaSignal::ImageLoaded, 0);
        m.advance_next(1_000);
        assert_eq!(m.state(), PlaybackState::Loading);
    }

    #[test]
    fn backward_entry_lands_on_last() {
        let seq = StorySequence::new("u", images(3)).unwrap();
        let mut m = PlaybackMachine::new(1, seq, D);
        m.set_active_page(2, 0);
        m.set_active_page(1, 100);
        assert_eq!(m.current_index(), 2);
        assert_eq!(m.progress_bars(), vec![1.0, 1.0, 0.0]);
        assert_eq!(m.progress(), 0.0);
        m.media_loaded(MediaSignal::ImageLoaded, 200);
        assert_eq!(m.state(), PlaybackState::Playing);
    }

    #[test]
    fn inactive_page_does_not_play() {
        let seq = StorySequence::new("u", images(2)).unwrap();
        let mut m = PlaybackMachine::new(1, seq, D);
        m.set_active_page(0, 0);
        m.media_loaded(MediaSignal::ImageLoaded, 0);
        assert_eq!(m.state(), PlaybackState::Loading);
        assert!(m.session().media_ready);

        m.set_active_page(1, 500);
        assert_eq!(m.state(), PlaybackState::Playing);
    }

    #[test]
    fn leaving_page_cancels_clock() {
        let mut m = make_machine(images(2));
        m.media_loaded(MediaSignal::ImageLoaded, 0);
        let pending = m.tick(10_000).unwrap();
        m.set_active_page(1, 10_000);
        assert!(!m.on_clock_complete(pending, 10_000));
        assert_eq!(m.state(), PlaybackState::Loading);
        assert!(m.drain_events().iter().all(|e| !matches!(e, PlaybackEvent::SessionFinished(_))));
    }

    #[test]
    fn video_end_advances_once() {
        let mut m = make_machine(vec![StoryItem::video("a.mp4"), StoryItem::image("b")]);
        m.media_loaded(MediaSignal::VideoLoaded { duration_secs: 2.0 }, 0);
        let pending = m.tick(2_000).unwrap();
        m.media_ended(0, 2_000);
        assert_eq!(m.current_index(), 1);
        assert!(!m.on_clock_complete(pending, 2_001));
        assert_eq!(m.current_index(), 1);
    }

    #[test]
    fn late_video_end_does_not_skip_repeated_clip() {
        let mut m = make_machine(vec![
            StoryItem::video("clip.mp4"),
            StoryItem::video("clip.mp4"),
            StoryItem::image("after"),
        ]);
        m.media_loaded(MediaSignal::VideoLoaded { duration_secs: 5.0 }, 0);
        assert!(run_clock(&mut m, 5_000));
        assert_eq!(m.current_index(), 1);
        assert_eq!(m.state(), PlaybackState::Playing);

        m.media_ended(0, 5_016);
        assert_eq!(m.current_index(), 1);
        assert_eq!(m.state(), PlaybackState::Playing);
        assert!(!run_clock(&mut m, 9_999));
        assert!(run_clock(&mut m, 10_000));
        assert_eq!(m.current_index(), 2);
    }

    #[test]
    fn video_end_ignored_for_images_and_while_loading() {
        let mut m = make_machine(vec![StoryItem::image("a"), StoryItem::video("b.mp4")]);
        m.media_loaded(MediaSignal::ImageLoaded, 0);
        m.media_ended(0, 1_000);
        assert_eq!(m.current_index(), 0);
        assert_eq!(m.state(), PlaybackState::Playing);

        m.advance_next(2_000);
        assert_eq!(m.state(), PlaybackState::Loading);
        m.media_ended(1, 2_500);
        assert_eq!(m.current_index(), 1);
        assert!(m.drain_events().iter().all(|e| !matches!(e, PlaybackEvent::SessionFinished(_))));
    }

    #[test]
    fn video_end_ignored_after_leaving_page() {
        let seq = StorySequence::new("u", vec![StoryItem::video("a.mp4"), StoryItem::image("b")])
            .unwrap();
        let mut m = PlaybackMachine::new(0, seq, D);
        m.set_active_page(0, 0);
        m.media_loaded(MediaSignal::VideoLoaded { duration_secs: 2.0 }, 0);
        m.pause(500);
        m.set_active_page(1, 600);
        m.media_ended(0, 700);
        assert_eq!(m.current_index(), 0);
        assert_eq!(m.state(), PlaybackState::Loading);
    }

    #[test]
    fn restart_replays_loaded_item() {
        let mut m = make_machine(images(1));
        m.media_loaded(MediaSignal::ImageLoaded, 0);
        m.tick(5_000);
        m.restart_current(5_000);
        assert_eq!(m.progress(), 0.0);
        assert!(!run_clock(&mut m, 14_999));
        assert!(run_clock(&mut m, 15_000));
    }

    #[test]
    fn index_stays_in_range() {
        let mut m = make_machine(images(3));
        for step in 0..20u64 {
            if step % 3 == 0 {
                m.advance_previous(step);
            } else {
                m.advance_next(step);
            }
            assert!(m.current_index() < 3);
        }
    }
}
