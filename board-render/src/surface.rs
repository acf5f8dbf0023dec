//! Client-local raster target.

use tiny_skia::{Color, Pixmap};

use crate::error::{RenderError, RenderResult};

/// The raster target one client draws onto.
///
/// Not shared state: each client owns its own surface and derives its content
/// entirely from the session stroke log plus an optional local background.
#[derive(Debug, Clone)]
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    /// Create a transparent surface of the given pixel dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidSurfaceSize`] if either dimension is zero
    /// or the pixel buffer would overflow.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or(RenderError::InvalidSurfaceSize { width, height })?;
        Ok(Self { pixmap })
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Reset every pixel to fully transparent.
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    /// Borrow the underlying pixmap.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Mutably borrow the underlying pixmap.
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Raw premultiplied RGBA bytes, row-major.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Alpha of the pixel at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        self.pixmap.pixel(x, y).map(|p| p.alpha())
    }
}
