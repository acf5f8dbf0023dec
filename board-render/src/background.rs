//! Background image decoding and placement.

use tiny_skia::{IntSize, Pixmap, PixmapPaint, Transform};

use crate::error::{RenderError, RenderResult};
use crate::surface::Surface;

/// A decoded background image ready for compositing.
#[derive(Debug, Clone)]
pub struct Background {
    pixmap: Pixmap,
}

impl Background {
    /// Decode an image (PNG, JPEG, ...) from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ImageDecode`] if the bytes are not a decodable
    /// image.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_bytes(data: &[u8]) -> RenderResult<Self> {
        let img = image::load_from_memory(data)
            .map_err(|e| RenderError::ImageDecode(e.to_string()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        // tiny-skia stores premultiplied alpha; image gives straight alpha.
        let mut data = rgba.into_raw();
        for px in data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            px[0] = ((u16::from(px[0]) * a) / 255) as u8;
            px[1] = ((u16::from(px[1]) * a) / 255) as u8;
            px[2] = ((u16::from(px[2]) * a) / 255) as u8;
        }

        let size = IntSize::from_wh(width, height).ok_or(RenderError::ImageDecode(format!(
            "invalid image size {width}x{height}"
        )))?;
        let pixmap = Pixmap::from_vec(data, size)
            .ok_or_else(|| RenderError::ImageDecode("pixel buffer size mismatch".to_string()))?;
        Ok(Self { pixmap })
    }

    /// Wrap an already rasterized pixmap.
    #[must_use]
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Draw the image onto the surface with "contain" semantics: scaled to
    /// fit entirely while preserving aspect ratio, centered on the leftover
    /// axis.
    #[allow(clippy::cast_precision_loss)]
    pub fn draw_contained(&self, surface: &mut Surface) {
        let sw = surface.width() as f32;
        let sh = surface.height() as f32;
        let iw = self.pixmap.width() as f32;
        let ih = self.pixmap.height() as f32;

        let scale = (sw / iw).min(sh / ih);
        let draw_w = iw * scale;
        let draw_h = ih * scale;
        let offset_x = (sw - draw_w) / 2.0;
        let offset_y = (sh - draw_h) / 2.0;

        surface.pixmap_mut().draw_pixmap(
            0,
            0,
            self.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::from_row(scale, 0.0, 0.0, scale, offset_x, offset_y),
            None,
        );
    }
}
