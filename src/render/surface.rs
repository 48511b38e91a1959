use crate::board::SquareRect;
use crate::render::{Image, Rgb};
use std::path::Path;
use thiserror::Error;
use tiny_skia::{
    Color, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

/// Identifier of the surface the board is painted on.
pub const CHESSBOARD_ID: &str = "chessboard";

#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Surface '{0}' has not been sized yet")]
    Unsized(String),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Canvas-style drawing target used by the board renderer.
pub trait Surface {
    fn id(&self) -> &str;

    /// Sets the pixel size and discards everything drawn so far, outer border included.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError>;

    fn fill_rect(&mut self, rect: SquareRect, color: Rgb);

    fn stroke_rect(&mut self, rect: SquareRect, line_width: f32, color: Rgb);

    /// Blits `image` scaled to exactly cover `rect`.
    fn draw_image(&mut self, image: &Image, rect: SquareRect);

    /// Solid border drawn around the outside of the surface.
    fn set_outer_border(&mut self, width: f32);
}

pub struct PixmapSurface {
    id: String,
    pixmap: Option<Pixmap>,
    outer_border: Option<f32>,
}

impl PixmapSurface {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pixmap: None,
            outer_border: None,
        }
    }

    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    pub fn outer_border(&self) -> Option<f32> {
        self.outer_border
    }

    /// Encodes the canvas as PNG. With `framed`, the outer border is included
    /// as a black frame around the canvas.
    pub fn encode_png(&self, framed: bool) -> Result<Vec<u8>, SurfaceError> {
        let pixmap = self
            .pixmap
            .as_ref()
            .ok_or_else(|| SurfaceError::Unsized(self.id.clone()))?;

        let encoded = match self.outer_border.filter(|b| framed && *b > 0.0) {
            Some(border) => {
                let pad = border.ceil() as u32;
                let (width, height) = (pixmap.width() + 2 * pad, pixmap.height() + 2 * pad);
                let mut frame =
                    Pixmap::new(width, height).ok_or(SurfaceError::InvalidSize { width, height })?;
                frame.fill(Color::BLACK);
                frame.draw_pixmap(
                    pad as i32,
                    pad as i32,
                    pixmap.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
                frame.encode_png()
            }
            None => pixmap.encode_png(),
        };

        encoded.map_err(|e| SurfaceError::Encode(e.to_string()))
    }

    pub fn save_png(&self, path: &Path, framed: bool) -> Result<(), SurfaceError> {
        let data = self.encode_png(framed)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    fn paint(color: Rgb) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(color.to_color());
        paint.anti_alias = true;
        paint
    }
}

impl Surface for PixmapSurface {
    fn id(&self) -> &str {
        &self.id
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        let pixmap = Pixmap::new(width, height).ok_or(SurfaceError::InvalidSize { width, height })?;
        self.pixmap = Some(pixmap);
        self.outer_border = None;
        Ok(())
    }

    fn fill_rect(&mut self, rect: SquareRect, color: Rgb) {
        let (Some(pixmap), Some(rect)) = (self.pixmap.as_mut(), rect.to_skia()) else {
            return;
        };
        pixmap.fill_rect(rect, &Self::paint(color), Transform::identity(), None);
    }

    fn stroke_rect(&mut self, rect: SquareRect, line_width: f32, color: Rgb) {
        let (Some(pixmap), Some(rect)) = (self.pixmap.as_mut(), rect.to_skia()) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width: line_width,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &Self::paint(color), &stroke, Transform::identity(), None);
    }

    fn draw_image(&mut self, image: &Image, rect: SquareRect) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        if image.width() == 0 || image.height() == 0 {
            return;
        }

        let sx = rect.width / image.width() as f32;
        let sy = rect.height / image.height() as f32;
        let transform = Transform::from_row(sx, 0.0, 0.0, sy, rect.x, rect.y);
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        pixmap.draw_pixmap(0, 0, image.pixmap().as_ref(), &paint, transform, None);
    }

    fn set_outer_border(&mut self, width: f32) {
        self.outer_border = Some(width);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Palette;

    fn rgb_at(surface: &PixmapSurface, x: u32, y: u32) -> (u8, u8, u8) {
        let px = surface.pixmap().unwrap().pixel(x, y).unwrap().demultiply();
        (px.red(), px.green(), px.blue())
    }

    #[test]
    fn test_resize_discards_content() {
        let mut surface = PixmapSurface::new(CHESSBOARD_ID);
        surface.resize(8, 8).unwrap();
        surface.fill_rect(SquareRect::new(0.0, 0.0, 8.0, 8.0), Palette::CLASSIC.dark_square);
        surface.set_outer_border(1.5);
        surface.resize(8, 8).unwrap();
        let px = surface.pixmap().unwrap().pixel(4, 4).unwrap();
        assert_eq!(px.alpha(), 0);
        assert_eq!(surface.outer_border(), None);
        // nothing to frame until a border is set again
        let framed = Pixmap::decode_png(&surface.encode_png(true).unwrap()).unwrap();
        assert_eq!((framed.width(), framed.height()), (8, 8));
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let mut surface = PixmapSurface::new(CHESSBOARD_ID);
        assert!(matches!(
            surface.resize(0, 480),
            Err(SurfaceError::InvalidSize { width: 0, height: 480 })
        ));
        assert!(matches!(surface.encode_png(false), Err(SurfaceError::Unsized(_))));
    }

    #[test]
    fn test_fill_and_stroke() {
        let mut surface = PixmapSurface::new(CHESSBOARD_ID);
        surface.resize(20, 20).unwrap();
        surface.fill_rect(SquareRect::new(0.0, 0.0, 20.0, 20.0), Rgb(240, 217, 181));
        surface.stroke_rect(SquareRect::new(1.0, 1.0, 18.0, 18.0), 2.0, Rgb(0, 0, 0));
        assert_eq!(rgb_at(&surface, 10, 10), (240, 217, 181));
        assert_eq!(rgb_at(&surface, 1, 10), (0, 0, 0));
    }

    #[test]
    fn test_draw_image_scales_to_rect() {
        let mut piece = Pixmap::new(2, 2).unwrap();
        piece.fill(Color::from_rgba8(0, 0, 255, 255));
        let image = Image::from_pixmap(piece);

        let mut surface = PixmapSurface::new(CHESSBOARD_ID);
        surface.resize(40, 40).unwrap();
        surface.draw_image(&image, SquareRect::new(20.0, 20.0, 20.0, 20.0));
        assert_eq!(rgb_at(&surface, 30, 30), (0, 0, 255));
        assert_eq!(surface.pixmap().unwrap().pixel(10, 10).unwrap().alpha(), 0);
    }

    #[test]
    fn test_framed_png_adds_border() {
        let mut surface = PixmapSurface::new(CHESSBOARD_ID);
        surface.resize(16, 16).unwrap();
        surface.set_outer_border(2.5);

        let plain = Pixmap::decode_png(&surface.encode_png(false).unwrap()).unwrap();
        assert_eq!((plain.width(), plain.height()), (16, 16));

        let framed = Pixmap::decode_png(&surface.encode_png(true).unwrap()).unwrap();
        assert_eq!((framed.width(), framed.height()), (22, 22));
        let corner = framed.pixel(0, 0).unwrap().demultiply();
        assert_eq!((corner.red(), corner.green(), corner.blue(), corner.alpha()), (0, 0, 0, 255));
    }
}
