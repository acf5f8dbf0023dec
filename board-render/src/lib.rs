//! # Drawboard Renderer
//!
//! Deterministic CPU replay engine: renders a single stroke, a live segment,
//! or a whole session log (plus optional background image) onto a raster
//! surface. Given the same inputs it always produces bit-identical output,
//! which is what lets every participant reconstruct the same image from the
//! shared stroke log.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod background;
pub mod error;
pub mod replay;
pub mod surface;

pub use background::Background;
pub use error::{RenderError, RenderResult};
pub use replay::{render_segment, render_session, render_stroke, Pen};
pub use surface::Surface;
