use std::cell::Cell;
use std::panic;

use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
};
use tracing::warn;

/// Backend wrapper that keeps drawing when no usable system font exists.
///
/// Headless hosts often lack fonts; plotters then fails (or panics inside the
/// font loader) on the first label. Text is dropped and sizes are estimated
/// from the requested point size so the rest of the chart still renders.
pub struct TextTolerantBackend<DB> {
    inner: DB,
    warned: Cell<bool>,
}

impl<DB> TextTolerantBackend<DB> {
    pub fn new(inner: DB) -> Self {
        Self {
            inner,
            warned: Cell::new(false),
        }
    }

    fn note_font_failure(&self) {
        if !self.warned.replace(true) {
            warn!("font rendering unavailable; chart text will be omitted");
        }
    }
}

/// Rough box for `text` at `size` pixels when real metrics are unavailable.
pub(crate) fn approximate_text_size(text: &str, size: f64) -> (u32, u32) {
    let size = size.max(1.0);
    let width = text.chars().count() as f64 * size * 0.6;
    (width.ceil() as u32, size.ceil() as u32)
}

impl<DB: DrawingBackend> DrawingBackend for TextTolerantBackend<DB> {
    type ErrorType = DB::ErrorType;

    fn get_size(&self) -> (u32, u32) {
        self.inner.get_size()
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.ensure_prepared()
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.present()
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        self.inner.draw_pixel(point, color)
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        self.inner.draw_line(from, to, style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        self.inner.draw_rect(upper_left, bottom_right, style, fill)
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        self.inner.draw_path(path, style)
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_circle(center, radius, style, fill)
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.fill_polygon(vert, style)
    }

    fn blit_bitmap(
        &mut self,
        pos: BackendCoord,
        (iw, ih): (u32, u32),
        src: &[u8],
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.blit_bitmap(pos, (iw, ih), src)
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        let inner = &mut self.inner;
        match panic::catch_unwind(panic::AssertUnwindSafe(|| inner.draw_text(text, style, pos))) {
            Ok(Err(DrawingErrorKind::FontError(_))) | Err(_) => {
                self.note_font_failure();
                Ok(())
            }
            Ok(result) => result,
        }
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        match panic::catch_unwind(panic::AssertUnwindSafe(|| {
            self.inner.estimate_text_size(text, style)
        })) {
            Ok(Err(DrawingErrorKind::FontError(_))) | Err(_) => {
                self.note_font_failure();
                Ok(approximate_text_size(text, style.size()))
            }
            Ok(result) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approximate_size_scales_with_text_and_font() {
        assert_eq!(approximate_text_size("", 10.0), (0, 10));
        let (w_short, h) = approximate_text_size("ab", 20.0);
        let (w_long, _) = approximate_text_size("abcd", 20.0);
        assert_eq!(h, 20);
        assert!(w_long > w_short);
        assert_eq!(approximate_text_size("x", 0.0).1, 1);
    }
}
