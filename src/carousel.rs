//! Project carousel state and input interpretation.
//!
//! The carousel holds a slide index over a fixed, non-empty list of projects.
//! Navigation always wraps around. Keyboard and touch input are translated
//! into at most one [`Step`] per event; the layout script applies the same
//! rules in the browser, and the build uses [`Carousel::slides`] to pre-render
//! anchor navigation.

use serde::Serialize;

/// Horizontal drag distance a touch gesture must exceed to change slides.
pub const SWIPE_THRESHOLD: f64 = 60.0;

/// Move `index` by `delta` positions over `count` slides, wrapping at both ends.
///
/// `count` must be non-zero.
pub fn cycle(index: usize, delta: isize, count: usize) -> usize {
    debug_assert!(count > 0, "carousel must hold at least one slide");
    let count = count as isize;
    (index as isize + delta).rem_euclid(count) as usize
}

/// A single navigation transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next,
    Prev,
}

impl Step {
    fn delta(self) -> isize {
        match self {
            Step::Next => 1,
            Step::Prev => -1,
        }
    }

    /// Key that triggers this step.
    pub fn key(self) -> Key {
        match self {
            Step::Next => Key::ArrowRight,
            Step::Prev => Key::ArrowLeft,
        }
    }
}

/// Keys the carousel listens to. Anything else arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Other,
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` value.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_dom(key: &str) -> Self {
        match key {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            _ => Key::Other,
        }
    }

    /// DOM `KeyboardEvent.key` value, empty for `Other`.
    pub fn dom_name(self) -> &'static str {
        match self {
            Key::ArrowLeft => "ArrowLeft",
            Key::ArrowRight => "ArrowRight",
            Key::Other => "",
        }
    }
}

/// Raw input delivered to the carousel. Pages replay these rules in script.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Key(Key),
    TouchStart { x: f64 },
    TouchMove { x: f64 },
    TouchEnd,
}

/// Turns a touch drag into at most one step.
#[derive(Debug, Clone, Copy)]
pub struct SwipeTracker {
    threshold: f64,
    start_x: Option<f64>,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(SWIPE_THRESHOLD)
    }
}

impl SwipeTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            start_x: None,
        }
    }

    pub fn start(&mut self, x: f64) {
        self.start_x = Some(x);
    }

    /// Feed a move event. Returns a step once the displacement passes the
    /// threshold, after which the capture is cleared until the next start.
    pub fn update(&mut self, x: f64) -> Option<Step> {
        let start = self.start_x?;
        let delta = x - start;

        if delta.abs() <= self.threshold {
            return None;
        }

        self.start_x = None;
        if delta > 0.0 {
            Some(Step::Prev)
        } else {
            Some(Step::Next)
        }
    }

    pub fn end(&mut self) {
        self.start_x = None;
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_tracking(&self) -> bool {
        self.start_x.is_some()
    }
}

/// Carousel controller over `count` slides.
#[derive(Debug, Clone)]
pub struct Carousel {
    index: usize,
    count: usize,
    swipe: SwipeTracker,
}

impl Carousel {
    /// Create a carousel positioned at the first slide.
    ///
    /// Returns `None` when there are no slides to show.
    pub fn new(count: usize) -> Option<Self> {
        Self::with_threshold(count, SWIPE_THRESHOLD)
    }

    pub fn with_threshold(count: usize, threshold: f64) -> Option<Self> {
        if count == 0 {
            return None;
        }

        Some(Self {
            index: 0,
            count,
            swipe: SwipeTracker::new(threshold),
        })
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn next(&mut self) -> usize {
        self.step(Step::Next)
    }

    pub fn prev(&mut self) -> usize {
        self.step(Step::Prev)
    }

    pub fn step(&mut self, step: Step) -> usize {
        self.index = cycle(self.index, step.delta(), self.count);
        self.index
    }

    /// Jump straight to slide `index`. Out-of-range targets are refused.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.count {
            tracing::debug!(index, count = self.count, "ignoring out-of-range jump");
            return false;
        }
        self.index = index;
        true
    }

    /// Apply one input event, returning the transition it caused, if any.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn handle(&mut self, input: Input) -> Option<Step> {
        let step = match input {
            Input::Key(key) => [Step::Next, Step::Prev]
                .into_iter()
                .find(|step| step.key() == key),
            Input::TouchStart { x } => {
                self.swipe.start(x);
                None
            }
            Input::TouchMove { x } => self.swipe.update(x),
            Input::TouchEnd => {
                self.swipe.end();
                None
            }
        };

        if let Some(step) = step {
            self.step(step);
            tracing::trace!(?step, index = self.index, "carousel moved");
        }

        step
    }

    /// Describe every slide with its neighbours, for pre-rendered navigation.
    pub fn slides(&self) -> Vec<Slide> {
        (0..self.count)
            .map(|index| Slide {
                index,
                number: index + 1,
                prev: cycle(index, -1, self.count),
                next: cycle(index, 1, self.count),
                active: index == self.index,
            })
            .collect()
    }
}

/// Position of one slide, as exposed to templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slide {
    pub index: usize,
    /// One-based position for display
    pub number: usize,
    pub prev: usize,
    pub next: usize,
    pub active: bool,
}
