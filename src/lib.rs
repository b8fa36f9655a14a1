//! Stackpane is a layered image compositing and hit-testing engine for
//! interactive product previews.
//!
//! A preview is an arbitrary, dynamically changing set of semi-transparent
//! part images stacked in a stable visual order. Stackpane keeps that stack
//! consistent while selections change, redraws it efficiently, and answers
//! "which part is under the cursor" even when parts overlap with irregular,
//! non-rectangular silhouettes.
//!
//! # Engine overview
//!
//! 1. **Registry**: the authoritative set of layers and their load state
//!    ([`LayerRegistry`])
//! 2. **Load**: asynchronous bitmap resolution with generation-counter
//!    cancellation ([`ImageLoader`])
//! 3. **Schedule**: bursts of mutations coalesce into one repaint per frame
//!    window ([`RenderScheduler`])
//! 4. **Compose**: visible, loaded layers draw bottom-up onto the surface,
//!    then the hover highlight on top ([`compose`])
//! 5. **Hit test**: pointer queries walk cached per-layer alpha buffers
//!    topmost-first ([`HitTester`])
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single writer**: all mutation happens on one cooperative thread; async
//!   load results are applied through explicit completion calls.
//! - **No IO in the engine**: the host resolves URLs to bytes; the engine
//!   only decodes and composites.
//! - **Premultiplied RGBA8** end-to-end: the compositor blends premultiplied
//!   pixels and un-premultiplies only at PNG export.
//!
//! [`PreviewEngine`] ties the pieces together behind the surface-facing API.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod engine;
mod foundation;
mod hit;
mod registry;
mod render;

pub use assets::decode::decode_bitmap;
pub use assets::loader::{ImageLoader, LoadRequest, LoadSettled};
pub use engine::{PreviewEngine, TickOutcome};
pub use foundation::core::{Bitmap, LayerId, Point, Rgba8Premul, SurfaceSize};
pub use foundation::error::{StackpaneError, StackpaneResult};
pub use hit::alpha::{AlphaBuffer, HitTester};
pub use registry::layers::{Layer, LayerRegistry, LoadState, SelectedPart, SettleOutcome};
pub use render::compose::{Composite, CompositeFrame, compose};
pub use render::highlight::HighlightCache;
pub use render::sched::{FRAME_WINDOW, RenderScheduler};
