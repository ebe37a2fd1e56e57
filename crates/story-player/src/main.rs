use std::path::PathBuf;

use anyhow::{Context, Result};
use story_player::story::feed::load_feed;
use story_player::{
    Direction, MediaKind, MediaSignal, PageHandle, PlaybackState, PlayerConfig, SeenEvent,
    StoryHost, StoryItem, StoryPage,
};

/// Virtual time step of the simulated event loop.
const STEP_MS: u64 = 100;
/// Simulated media load latency.
const LOAD_DELAY_MS: u64 = 200;
/// Duration the simulated video player reports for every clip.
const VIDEO_DURATION_SECS: f64 = 5.0;
/// Give up after this much virtual time.
const MAX_RUN_MS: u64 = 60 * 60 * 1000;

/// Requests the pages made during one update, applied by the carousel afterwards.
#[derive(Default)]
struct CarouselRequests {
    finished: Vec<(usize, Direction)>,
    closed: bool,
    seen: usize,
}

impl StoryHost for CarouselRequests {
    fn on_session_finish(&mut self, page_index: usize, direction: Direction) {
        self.finished.push((page_index, direction));
    }

    fn on_close(&mut self, page_index: usize) {
        log::info!("page {page_index}: close requested");
        self.closed = true;
    }

    fn on_story_seen(&mut self, event: &SeenEvent) {
        self.seen += 1;
        log::info!(
            "seen: user={} name={:?} {} {}",
            event.user_id,
            event.profile_name,
            event.item.media_kind,
            event.item.media_uri
        );
    }

    fn on_swipe_action(&mut self, item: &StoryItem) {
        log::info!("swipe action for {}", item.media_uri);
    }
}

/// Minimal stand-in for the host carousel: owns the pages and the active index.
struct Carousel {
    pages: Vec<StoryPage>,
    handles: Vec<PageHandle>,
    active: usize,
    /// (page, item index, due time) of the media load in flight.
    pending_load: Option<(usize, usize, u64)>,
    requests: CarouselRequests,
}

impl Carousel {
    fn new(pages: Vec<StoryPage>) -> Self {
        let handles = pages.iter().map(StoryPage::handle).collect();
        Self {
            pages,
            handles,
            active: 0,
            pending_load: None,
            requests: CarouselRequests::default(),
        }
    }

    fn activate(&mut self, index: usize) {
        self.active = index;
        for handle in &self.handles {
            handle.set_active_page(index);
        }
        log::info!(
            "carousel: showing page {} ({})",
            index,
            self.pages[index].profile_name()
        );
    }

    fn simulate_media(&mut self, now_ms: u64) {
        let page = &self.pages[self.active];
        let snapshot = page.snapshot();
        if snapshot.state != PlaybackState::Loading {
            self.pending_load = None;
            return;
        }
        let key = (self.active, snapshot.current_index);
        match self.pending_load {
            Some((p, i, due)) if (p, i) == key => {
                if now_ms >= due {
                    let signal = match page.current_item().media_kind {
                        MediaKind::Image => MediaSignal::ImageLoaded,
                        MediaKind::Video => MediaSignal::VideoLoaded {
                            duration_secs: VIDEO_DURATION_SECS,
                        },
                    };
                    self.handles[self.active].media_loaded(signal);
                    self.pending_load = None;
                }
            }
            _ => self.pending_load = Some((key.0, key.1, now_ms + LOAD_DELAY_MS)),
        }
    }

    /// Returns false once the viewer should close.
    fn apply_requests(&mut self, now_ms: u64) -> bool {
        if self.requests.closed {
            return false;
        }
        for (page, direction) in std::mem::take(&mut self.requests.finished) {
            if page != self.active {
                continue;
            }
            match direction {
                Direction::Next if self.active + 1 < self.pages.len() => {
                    self.activate(self.active + 1);
                }
                Direction::Next => {
                    log::info!("carousel: last user finished");
                    return false;
                }
                Direction::Previous if self.active > 0 => self.activate(self.active - 1),
                Direction::Previous => {
                    log::info!("carousel: already at first user, replaying");
                    self.pages[0].restart_current(now_ms, &mut self.requests);
                }
            }
        }
        true
    }

    fn run(&mut self) -> u64 {
        self.activate(0);
        let mut now_ms = 0;
        while now_ms <= MAX_RUN_MS {
            self.simulate_media(now_ms);
            for page in &mut self.pages {
                page.update(now_ms, &mut self.requests);
            }
            if !self.apply_requests(now_ms) {
                break;
            }
            now_ms += STEP_MS;
        }
        now_ms
    }
}

fn print_usage() {
    println!("Usage: story-player <feed.json>");
    println!();
    println!("Replays a story feed (JSON array of users) through a simulated carousel.");
    println!("Set RUST_LOG=debug to see playback transitions.");
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(feed_arg) = args.first().filter(|a| !a.starts_with('-')) else {
        print_usage();
        return Ok(());
    };

    let config = PlayerConfig::load();
    let path = PathBuf::from(feed_arg);
    let users = load_feed(&path).with_context(|| format!("loading feed {}", path.display()))?;
    if users.is_empty() {
        anyhow::bail!("feed {} contains no users", path.display());
    }

    let pages = users
        .into_iter()
        .enumerate()
        .map(|(i, user)| StoryPage::new(i, user, &config))
        .collect::<Result<Vec<_>, _>>()?;

    let mut carousel = Carousel::new(pages);
    let elapsed = carousel.run();
    log::info!(
        "done after {:.1}s of virtual time, {} items seen",
        elapsed as f64 / 1000.0,
        carousel.requests.seen
    );
    Ok(())
}
