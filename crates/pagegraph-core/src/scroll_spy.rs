//! Scroll spy: which table of contents entry is currently being read.
//!
//! The active heading is the last one whose top edge has scrolled above an
//! activation line. Recomputation is rate limited with a leading and
//! trailing edge throttle: a scroll after a quiet window updates at once,
//! a scroll inside the window schedules exactly one deferred update.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::config::RenderConfig;
use crate::defaults::ACTIVATION_GAP_DIVISOR;
use crate::traits::AnchorSource;

// =============================================================================
// ACTIVE SECTION
// =============================================================================

/// Vertical extent of an element relative to the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
}

/// A rendered heading and where it currently is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingAnchor {
    /// Anchor id; matches [`crate::toc::TocEntry::id`]. Headings rendered
    /// without one have `None`.
    pub id: Option<String>,
    pub rect: Rect,
}

impl HeadingAnchor {
    pub fn new(id: impl Into<String>, top: f64, bottom: f64) -> Self {
        Self {
            id: Some(id.into()),
            rect: Rect { top, bottom },
        }
    }
}

/// Pick the active heading.
///
/// Anchors are walked in document order. Each one is active once its top is
/// above `max(offset_floor, gap / 4)`, where `gap` is the distance from the
/// previous active heading's bottom; the walk stops at the first anchor
/// still below its line. When nothing is active yet the first anchor is
/// taken, so a page scrolled to the very top highlights its first heading.
pub fn active_section(
    anchors: &[HeadingAnchor],
    current: Option<&str>,
    offset_floor: f64,
) -> Option<String> {
    let mut active = current.map(str::to_string);
    let mut previous: Option<Rect> = None;

    for anchor in anchors {
        if active.is_none() {
            active = anchor.id.clone();
        }

        let gap = previous.map_or(0.0, |prev| anchor.rect.top - prev.bottom);
        let offset = offset_floor.max(gap / ACTIVATION_GAP_DIVISOR);

        if anchor.rect.top - offset < 0.0 {
            active = anchor.id.clone();
            previous = Some(anchor.rect);
            continue;
        }
        break;
    }

    active
}

// =============================================================================
// THROTTLE
// =============================================================================

/// What to do with a recomputation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// The window has elapsed: run now.
    RunNow,
    /// Schedule one trailing run after this delay.
    Deferred(Duration),
    /// A trailing run is already scheduled and will cover this request.
    Coalesced,
}

/// Leading and trailing edge rate limiter.
///
/// This only decides; scheduling the deferred run is up to the caller, who
/// reports back with [`Throttle::fire_pending`] when the delay elapses.
#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    last_run: Option<Instant>,
    pending: bool,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_run: None,
            pending: false,
        }
    }

    pub fn request(&mut self, now: Instant) -> ThrottleDecision {
        let remaining = match self.last_run {
            Some(last) => self
                .window
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        };

        if remaining.is_zero() {
            self.pending = false;
            self.last_run = Some(now);
            ThrottleDecision::RunNow
        } else if !self.pending {
            self.pending = true;
            ThrottleDecision::Deferred(remaining)
        } else {
            ThrottleDecision::Coalesced
        }
    }

    /// The deferred delay elapsed. Returns whether the trailing run should
    /// still happen.
    pub fn fire_pending(&mut self, now: Instant) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        self.last_run = Some(now);
        true
    }

    /// Drop the pending trailing run, if any.
    pub fn cancel(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

// =============================================================================
// TRACKER
// =============================================================================

struct SpyState {
    listening: bool,
    throttle: Throttle,
    /// Bumped on every cancellation; a trailing run from an older
    /// generation does nothing.
    generation: u64,
    trailing: Option<JoinHandle<()>>,
}

struct Inner {
    source: Option<Arc<dyn AnchorSource>>,
    window: Duration,
    offset_floor: f64,
    state: Mutex<SpyState>,
    active: watch::Sender<Option<String>>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, SpyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recompute the active section. Called with the state lock held so a
    /// concurrent detach cannot interleave.
    fn recompute(&self, _state: &SpyState) {
        let Some(source) = &self.source else {
            return;
        };
        let anchors = source.anchors();
        let current = self.active.borrow().clone();
        let next = active_section(&anchors, current.as_deref(), self.offset_floor);

        trace!(anchors = anchors.len(), "Scroll spy recomputed");
        self.set_active(next);
    }

    fn set_active(&self, next: Option<String>) {
        self.active.send_if_modified(|active| {
            if *active == next {
                return false;
            }
            debug!(
                subsystem = "core",
                component = "scroll_spy",
                from = active.as_deref().unwrap_or_default(),
                to = next.as_deref().unwrap_or_default(),
                "Active section changed"
            );
            *active = next;
            true
        });
    }

    fn cancel_trailing(state: &mut SpyState) {
        state.throttle.cancel();
        state.generation += 1;
        if let Some(task) = state.trailing.take() {
            task.abort();
        }
    }
}

/// Tracks the active table of contents entry while the page scrolls.
///
/// The tracker listens only while the page has a table of contents (see
/// [`ScrollSpy::set_has_toc`]). Without an anchor source, as when
/// rendering without a viewport, it never activates anything.
///
/// Trailing updates are spawned on the current tokio runtime. Anchor sources
/// must not call back into the tracker.
pub struct ScrollSpy {
    inner: Arc<Inner>,
}

impl ScrollSpy {
    pub fn new(source: Option<Arc<dyn AnchorSource>>, config: &RenderConfig) -> Self {
        let window = config.scroll_spy_window();
        let (active, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                source,
                window,
                offset_floor: config.activation_offset_floor_px,
                state: Mutex::new(SpyState {
                    listening: false,
                    throttle: Throttle::new(window),
                    generation: 0,
                    trailing: None,
                }),
                active,
            }),
        }
    }

    /// Attach while the page has a table of contents, detach and clear the
    /// active section otherwise.
    pub fn set_has_toc(&self, has_toc: bool) {
        if has_toc {
            self.attach();
        } else {
            self.detach();
            self.inner.set_active(None);
        }
    }

    fn attach(&self) {
        if self.inner.source.is_none() {
            return;
        }
        {
            let mut state = self.inner.lock();
            if state.listening {
                return;
            }
            state.listening = true;
            state.throttle = Throttle::new(self.inner.window);
        }
        debug!(subsystem = "core", component = "scroll_spy", "Scroll spy attached");
        self.on_scroll();
    }

    /// Stop listening and drop any pending trailing update. The active
    /// section is left as is.
    pub fn detach(&self) {
        let mut state = self.inner.lock();
        if !state.listening {
            return;
        }
        state.listening = false;
        Inner::cancel_trailing(&mut state);
        debug!(subsystem = "core", component = "scroll_spy", "Scroll spy detached");
    }

    pub fn is_listening(&self) -> bool {
        self.inner.lock().listening
    }

    /// Scroll signal from the viewport.
    pub fn on_scroll(&self) {
        let mut state = self.inner.lock();
        if !state.listening {
            return;
        }

        match state.throttle.request(Instant::now()) {
            ThrottleDecision::RunNow => {
                if let Some(task) = state.trailing.take() {
                    task.abort();
                }
                state.generation += 1;
                self.inner.recompute(&state);
            }
            ThrottleDecision::Deferred(delay) => {
                let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                    warn!(
                        subsystem = "core",
                        component = "scroll_spy",
                        "No async runtime, trailing update dropped"
                    );
                    state.throttle.cancel();
                    return;
                };
                let generation = state.generation;
                let inner = Arc::downgrade(&self.inner);
                state.trailing = Some(runtime.spawn(trailing_update(inner, generation, delay)));
            }
            ThrottleDecision::Coalesced => {}
        }
    }

    /// Currently active anchor id.
    pub fn active_section(&self) -> Option<String> {
        self.inner.active.borrow().clone()
    }

    /// Watch the active anchor id.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.inner.active.subscribe()
    }
}

impl Drop for ScrollSpy {
    fn drop(&mut self) {
        self.detach();
    }
}

async fn trailing_update(inner: Weak<Inner>, generation: u64, delay: Duration) {
    tokio::time::sleep(delay).await;

    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut state = inner.lock();
    if !state.listening || state.generation != generation {
        return;
    }
    if state.throttle.fire_pending(Instant::now()) {
        state.trailing = None;
        inner.recompute(&state);
    }
}
