//! Filmroll is a scroll-driven frame scrubbing engine.
//!
//! A sequence of N pre-rendered frames is loaded in the background, a normalized scroll
//! position is mapped through a spring to a fractional frame position, and the nearest
//! loaded frame is painted onto a device-pixel canvas.
//!
//! # Pipeline overview
//!
//! 1. **Load**: `ViewportClass -> FrameSequence` (one request per slot, png->jpg retry once)
//! 2. **Map**: `scroll progress -> raw frame -> spring -> frame position`
//! 3. **Paint**: `frame position -> nearest loaded frame -> Canvas2d` (cover or width fit)
//!
//! Overlays and the canvas fade are pure functions of scroll progress, see
//! [`FrameTimeline`].
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Caller-thread state**: loader completions and host events are queued and applied
//!   only inside [`ScrollReel::tick`]; fetch and decode may run on a thread pool.
//! - **Deterministic spring**: the frame position depends only on the targets and time
//!   steps it was fed, never on a wall clock.
//! - **Premultiplied RGBA8** on the canvas; [`FrameRGBA::flatten_over`] produces straight
//!   output for PNG encoding.
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod config;
mod foundation;
mod host;
mod reel;
mod render;
mod scroll;

pub use animation::ramp::Ramp;
pub use animation::spring::{Spring, SpringParams};
pub use assets::convention::{AssetConvention, ConventionTable, fallback_extension};
pub use assets::decode::{PreparedFrame, decode_frame};
pub use assets::fetch::{DirFetcher, FrameFetcher, MemoryFetcher};
pub use assets::loader::{Dispatch, FrameLoader, LoadEvent};
pub use assets::sequence::{FrameSequence, LoadProgress};
pub use config::{MAX_FRAME_COUNT, OverlayConfig, ReelConfig};
pub use foundation::core::{Affine, BackingSize, FrameIndex, Vec2, Viewport, ViewportClass};
pub use foundation::error::{FilmrollError, FilmrollResult};
pub use host::{Host, Signal, Subscription};
pub use reel::{ReelState, ScrollReel, TickReport};
pub use render::canvas::{Canvas2d, CanvasKind, CanvasStats, CpuCanvas, FrameRGBA, create_canvas};
pub use render::fit::{FitMode, Placement};
pub use render::painter::{FramePainter, PaintOutcome};
pub use scroll::{FrameTimeline, OverlayState, ScrollRegion};
