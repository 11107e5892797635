//! Which layout regime the page is in, derived from the viewport width.
//!
//! Every layout-sensitive view asks this module instead of comparing widths
//! itself. Classification is pure; [`observe`] wraps it for live sources.

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Upper bounds (exclusive) of each band, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Thresholds {
    pub nano: u32,
    pub xxs: u32,
    pub xs: u32,
    pub sm: u32,
    pub md: u32,
    pub lg: u32,
    pub xl: u32,
    pub xxl: u32,
    pub ultrawide: u32,
}

pub const BREAKPOINTS: Thresholds = Thresholds {
    nano: 60,
    xxs: 300,
    xs: 480,
    sm: 640,
    md: 768,
    lg: 1024,
    xl: 1280,
    xxl: 1440,
    ultrawide: 1920,
};

/// Ordered by ascending width, so `Breakpoint::Sm < Breakpoint::Md`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    strum::AsRefStr,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Breakpoint {
    Nano,
    Xxs,
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
    Xxl,
    Ultrawide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width_px: u32,
    pub height_px: u32,
}

impl Dimensions {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }
}

/// Mobile-first size used until a real measurement arrives.
pub const DEFAULT_DIMENSIONS: Dimensions = Dimensions {
    width_px: 375,
    height_px: 667,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub width_px: u32,
    pub height_px: u32,
    pub breakpoint: Breakpoint,
    pub is_nano_screen: bool,
    pub is_ultra_small: bool,
    pub is_extra_small: bool,
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub is_desktop: bool,
    pub is_large_desktop: bool,
    pub is_ultrawide: bool,
}

impl Default for ViewportState {
    fn default() -> Self {
        BREAKPOINTS.classify(DEFAULT_DIMENSIONS)
    }
}

impl Thresholds {
    pub fn breakpoint(&self, width_px: u32) -> Breakpoint {
        match width_px {
            w if w < self.nano => Breakpoint::Nano,
            w if w < self.xxs => Breakpoint::Xxs,
            w if w < self.xs => Breakpoint::Xs,
            w if w < self.sm => Breakpoint::Sm,
            w if w < self.md => Breakpoint::Md,
            w if w < self.lg => Breakpoint::Lg,
            w if w < self.xl => Breakpoint::Xl,
            w if w < self.xxl => Breakpoint::Xxl,
            _ => Breakpoint::Ultrawide,
        }
    }

    pub fn classify(&self, dimensions: Dimensions) -> ViewportState {
        let w = dimensions.width_px;
        ViewportState {
            width_px: w,
            height_px: dimensions.height_px,
            breakpoint: self.breakpoint(w),
            is_nano_screen: w < self.nano,
            is_ultra_small: (self.nano..self.xxs).contains(&w),
            is_extra_small: w < self.xs,
            is_mobile: w < self.md,
            is_tablet: (self.md..self.lg).contains(&w),
            is_desktop: (self.lg..self.xxl).contains(&w),
            is_large_desktop: (self.xxl..self.ultrawide).contains(&w),
            is_ultrawide: w >= self.ultrawide,
        }
    }
}

/// Classify a width alone; height is reported as 0.
pub fn classify(width_px: u32) -> ViewportState {
    BREAKPOINTS.classify(Dimensions::new(width_px, 0))
}

pub fn classify_dimensions(dimensions: Dimensions) -> ViewportState {
    BREAKPOINTS.classify(dimensions)
}

/// Something that can report the live viewport size.
pub trait ViewportSource {
    /// `None` when nothing can be measured (headless or server-rendered).
    fn dimensions(&self) -> Option<watch::Receiver<Dimensions>>;
}

/// A source with no display attached.
pub struct Headless;

impl ViewportSource for Headless {
    fn dimensions(&self) -> Option<watch::Receiver<Dimensions>> {
        None
    }
}

impl ViewportSource for watch::Receiver<Dimensions> {
    fn dimensions(&self) -> Option<watch::Receiver<Dimensions>> {
        Some(self.clone())
    }
}

/// Handle returned by [`observe`]. Dropping it stops delivery.
pub struct Observation {
    initial: ViewportState,
    task: Option<JoinHandle<()>>,
}

impl Observation {
    /// What to render before any measurement is delivered.
    pub fn initial(&self) -> ViewportState {
        self.initial
    }

    pub fn is_live(&self) -> bool {
        self.task.is_some()
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Observation {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Two-phase delivery: render [`Observation::initial`] (the default state)
/// synchronously, then `on_change` receives the mount-time measurement and
/// every later change. The first delivered value can differ from the
/// default, so views may visibly re-layout right after mounting.
///
/// With no measurable source the default holds forever and `on_change` is
/// never called. Live sources need a running tokio runtime.
pub fn observe<S, F>(source: &S, mut on_change: F) -> Observation
where
    S: ViewportSource + ?Sized,
    F: FnMut(ViewportState) + Send + 'static,
{
    let initial = ViewportState::default();
    let Some(mut dimensions) = source.dimensions() else {
        tracing::debug!("No measurable viewport, holding the default state");
        return Observation {
            initial,
            task: None,
        };
    };

    let task = tokio::spawn(async move {
        let mut last: Option<ViewportState> = None;
        loop {
            let state = classify_dimensions(*dimensions.borrow_and_update());
            if last != Some(state) {
                if last.map(|s| s.breakpoint) != Some(state.breakpoint) {
                    tracing::debug!(
                        breakpoint = %state.breakpoint,
                        width = state.width_px,
                        "Viewport breakpoint changed"
                    );
                }
                on_change(state);
                last = Some(state);
            }
            // Sender gone means the window is gone
            if dimensions.changed().await.is_err() {
                break;
            }
        }
    });

    Observation {
        initial,
        task: Some(task),
    }
}
