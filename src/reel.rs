use std::{cell::RefCell, collections::VecDeque, rc::Rc, sync::Arc, time::Duration};

use crate::{
    animation::spring::Spring,
    assets::{
        fetch::FrameFetcher,
        loader::{Dispatch, FrameLoader, LoadEvent},
        sequence::LoadProgress,
    },
    config::ReelConfig,
    foundation::{
        core::{FrameIndex, Viewport, ViewportClass},
        error::FilmrollResult,
    },
    host::{Host, Subscription},
    render::{
        canvas::{Canvas2d, CanvasStats, FrameRGBA},
        fit::FitMode,
        painter::{FramePainter, PaintOutcome},
    },
    scroll::{FrameTimeline, OverlayState},
};

#[derive(Clone, Copy, Debug)]
enum HostEvent {
    Scroll(f64),
    Resize(Viewport),
}

type Inbox = Rc<RefCell<VecDeque<HostEvent>>>;

/// What one [`ScrollReel::tick`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Loader events applied during this tick.
    pub load_events: Vec<LoadEvent>,
    /// Set when a resize moved the reel to another viewport class.
    pub class_changed: Option<ViewportClass>,
    /// Smoothed frame position after stepping the spring.
    pub frame_position: f64,
    /// Repaint attempted this tick, if any.
    pub paint: Option<PaintOutcome>,
}

/// Everything the page needs to present the reel at the current scroll position.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ReelState {
    pub progress: f64,
    pub raw_frame: f64,
    pub frame_position: f64,
    pub frame_index: u32,
    pub canvas_opacity: f64,
    pub load: LoadProgress,
    /// Loading bar shown until every slot of the current class is populated.
    pub loading_bar: bool,
    pub class: ViewportClass,
    pub overlays: Vec<OverlayState>,
}

/// The scroll-driven frame scrubber, mounted into a [`Host`].
///
/// Host notifications are queued and applied by [`ScrollReel::tick`], which the page
/// calls once per animation frame.
pub struct ScrollReel {
    config: ReelConfig,
    timeline: FrameTimeline,
    loader: FrameLoader,
    spring: Spring,
    painter: Option<FramePainter>,
    viewport: Viewport,
    progress: f64,
    inbox: Inbox,
    repaint_pending: bool,
    shown_index: Option<FrameIndex>,
    _subscriptions: [Subscription; 2],
}

impl ScrollReel {
    /// Subscribe to `host`, classify its viewport and start loading that class.
    ///
    /// `canvas = None` models a host without a 2D context: scrolling and loading still
    /// work, nothing is painted.
    #[tracing::instrument(skip_all, fields(frames = config.frame_count))]
    pub fn mount(
        host: &Host,
        config: ReelConfig,
        fetcher: Arc<dyn FrameFetcher>,
        dispatch: Dispatch,
        canvas: Option<Box<dyn Canvas2d>>,
    ) -> FilmrollResult<Self> {
        config.validate()?;

        let inbox: Inbox = Rc::new(RefCell::new(VecDeque::new()));
        let scroll_sub = {
            let inbox = Rc::clone(&inbox);
            host.scroll
                .subscribe(move |p: &f64| inbox.borrow_mut().push_back(HostEvent::Scroll(*p)))
        };
        let resize_sub = {
            let inbox = Rc::clone(&inbox);
            host.resize
                .subscribe(move |v: &Viewport| inbox.borrow_mut().push_back(HostEvent::Resize(*v)))
        };

        if canvas.is_none() {
            tracing::warn!("no 2D drawing context, frames will not be painted");
        }

        let timeline = FrameTimeline::from_config(&config);
        let progress = host.scroll_progress();
        let spring = Spring::new(config.spring, timeline.raw_frame(progress));
        let viewport = host.viewport();

        let mut loader = FrameLoader::new(
            fetcher,
            config.conventions.clone(),
            config.frame_count,
            dispatch,
        );
        loader.ensure_class(viewport.class(config.breakpoint_px));

        Ok(Self {
            config,
            timeline,
            loader,
            spring,
            painter: canvas.map(FramePainter::new),
            viewport,
            progress,
            inbox,
            repaint_pending: false,
            shown_index: None,
            _subscriptions: [scroll_sub, resize_sub],
        })
    }

    pub fn config(&self) -> &ReelConfig {
        &self.config
    }

    pub fn loader(&self) -> &FrameLoader {
        &self.loader
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn class(&self) -> ViewportClass {
        self.loader
            .class()
            .unwrap_or_else(|| self.viewport.class(self.config.breakpoint_px))
    }

    pub fn frame_position(&self) -> f64 {
        self.spring.position()
    }

    pub fn frame_index(&self) -> FrameIndex {
        FrameIndex::clamp_position(self.spring.position(), self.config.frame_count)
    }

    /// Spring at rest on its target and the selected frame already handed to the painter.
    pub fn is_settled(&self) -> bool {
        self.spring.is_at_rest()
            && !self.repaint_pending
            && self.inbox.borrow().is_empty()
            && self.shown_index == Some(self.frame_index())
    }

    /// Advance the reel by `dt_secs`.
    pub fn tick(&mut self, dt_secs: f64) -> FilmrollResult<TickReport> {
        let mut report = TickReport::default();

        let events: Vec<HostEvent> = self.inbox.borrow_mut().drain(..).collect();
        for event in events {
            match event {
                HostEvent::Scroll(progress) => {
                    self.progress = progress;
                    self.spring.set_target(self.timeline.raw_frame(progress));
                }
                HostEvent::Resize(viewport) => {
                    self.viewport = viewport;
                    let class = viewport.class(self.config.breakpoint_px);
                    if self.loader.ensure_class(class) {
                        tracing::debug!(%class, "viewport class changed");
                        report.class_changed = Some(class);
                    }
                    self.repaint_pending = true;
                }
            }
        }

        report.load_events = self.loader.drain();
        report.frame_position = self.spring.step(dt_secs);
        self.absorb(&report.load_events);

        let index = self.frame_index();
        if self.repaint_pending || self.shown_index != Some(index) {
            report.paint = self.repaint()?;
        }
        Ok(report)
    }

    /// Block until the loader has nothing in flight or `timeout` elapses. Frames that
    /// arrive are painted on the next tick.
    pub fn wait_for_frames(&mut self, timeout: Duration) -> Vec<LoadEvent> {
        let events = self.loader.drain_until_idle(timeout);
        self.absorb(&events);
        events
    }

    /// Tick at `dt_secs` until settled, at least once and at most `max_ticks` times.
    /// Returns the number of ticks taken.
    pub fn settle(&mut self, dt_secs: f64, max_ticks: usize) -> FilmrollResult<usize> {
        let mut ticks = 0;
        while ticks < max_ticks.max(1) {
            self.tick(dt_secs)?;
            ticks += 1;
            if self.is_settled() {
                break;
            }
        }
        if !self.is_settled() {
            tracing::warn!(ticks, position = self.spring.position(), "reel did not settle");
        }
        Ok(ticks)
    }

    fn absorb(&mut self, events: &[LoadEvent]) {
        let selected = self.frame_index();
        let arrived = events.iter().any(|e| match *e {
            LoadEvent::Ready { index, first } => first || index == selected,
            _ => false,
        });
        if arrived {
            self.repaint_pending = true;
        }
    }

    fn repaint(&mut self) -> FilmrollResult<Option<PaintOutcome>> {
        let index = self.frame_index();
        self.shown_index = Some(index);
        self.repaint_pending = false;

        let (Some(painter), Some(sequence)) = (self.painter.as_mut(), self.loader.sequence())
        else {
            return Ok(None);
        };
        let fit = FitMode::for_class(sequence.class(), self.config.compact_margin);
        let outcome = painter.repaint(sequence, self.spring.position(), self.viewport, fit)?;
        Ok(Some(outcome))
    }

    pub fn state(&self) -> ReelState {
        let load = self.loader.progress();
        ReelState {
            progress: self.progress,
            raw_frame: self.timeline.raw_frame(self.progress),
            frame_position: self.spring.position(),
            frame_index: self.frame_index().0,
            canvas_opacity: self.timeline.canvas_opacity(self.progress),
            load,
            loading_bar: load.indicator_visible(),
            class: self.class(),
            overlays: self.timeline.overlays(self.progress),
        }
    }

    /// Raw canvas contents, `None` without a drawing context.
    pub fn snapshot(&self) -> Option<FrameRGBA> {
        self.painter.as_ref().map(FramePainter::snapshot)
    }

    /// Canvas as seen on the page: faded by the scroll opacity over the page background.
    pub fn composite(&self) -> Option<FrameRGBA> {
        let opacity = self.timeline.canvas_opacity(self.progress);
        self.snapshot()
            .map(|frame| frame.flatten_over(self.config.background_rgba, opacity))
    }

    pub fn canvas_stats(&self) -> Option<CanvasStats> {
        self.painter.as_ref().map(FramePainter::stats)
    }

    pub fn last_painted(&self) -> Option<FrameIndex> {
        self.painter.as_ref().and_then(FramePainter::last_painted)
    }
}

#[cfg(test)]
#[path = "../tests/unit/reel.rs"]
mod tests;
