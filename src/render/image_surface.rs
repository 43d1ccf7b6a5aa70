//! Software raster surface backed by an RGBA image

use std::path::Path;

use image::{ImageEncoder, Rgba, RgbaImage};

use crate::core::types::Vec2;
use crate::render::surface::{Color, DrawSurface, SurfaceError};

/// CPU rasterizer for headless rendering and PNG export
pub struct ImageSurface {
    image: RgbaImage,
}

impl ImageSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        (x < self.image.width() && y < self.image.height()).then(|| {
            let [r, g, b, a] = self.image.get_pixel(x, y).0;
            Color::rgba(r, g, b, a)
        })
    }

    /// Encode the current frame as PNG bytes
    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut png_data = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png_data).write_image(
            self.image.as_raw(),
            self.image.width(),
            self.image.height(),
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(png_data)
    }

    /// Write the current frame to a PNG file
    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.image.save_with_format(path, image::ImageFormat::Png)
    }

    fn blend(&mut self, x: u32, y: u32, color: Color) {
        let pixel = self.image.get_pixel_mut(x, y);
        if color.a == 255 {
            *pixel = Rgba(color.to_array());
            return;
        }
        let alpha = color.a as u32;
        let src = color.to_array();
        for (dst, src) in pixel.0.iter_mut().zip(src).take(3) {
            *dst = ((src as u32 * alpha + *dst as u32 * (255 - alpha)) / 255) as u8;
        }
        pixel.0[3] = pixel.0[3].max(color.a);
    }

    /// Fill the pixel span [x0, x1) on row y, clipped to the image
    fn fill_span(&mut self, y: u32, x0: f32, x1: f32, color: Color) {
        let width = self.image.width() as f32;
        // Pixel centers inside [x0, x1)
        let start = (x0 - 0.5).ceil().max(0.0);
        let end = (x1 - 0.5).ceil().min(width);
        if start >= end {
            return;
        }
        for x in start as u32..end as u32 {
            self.blend(x, y, color);
        }
    }
}

impl DrawSurface for ImageSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn clear(&mut self, color: Color) -> Result<(), SurfaceError> {
        let rgba = Rgba(color.to_array());
        for pixel in self.image.pixels_mut() {
            *pixel = rgba;
        }
        Ok(())
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) -> Result<(), SurfaceError> {
        if !(x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite()) {
            return Err(SurfaceError::NonFinite);
        }
        let height = self.image.height() as f32;
        let row_start = (y - 0.5).ceil().max(0.0);
        let row_end = (y + h - 0.5).ceil().min(height);
        if row_start >= row_end {
            return Ok(());
        }
        for row in row_start as u32..row_end as u32 {
            self.fill_span(row, x, x + w, color);
        }
        Ok(())
    }

    /// Even-odd scanline fill sampled at pixel centers
    fn fill_polygon(&mut self, points: &[Vec2], color: Color) -> Result<(), SurfaceError> {
        if points.len() < 3 {
            return Err(SurfaceError::DegeneratePolygon(points.len()));
        }
        if !points.iter().all(|p| p.is_finite()) {
            return Err(SurfaceError::NonFinite);
        }

        let height = self.image.height() as f32;
        let (min_y, max_y) = points
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        let row_start = (min_y - 0.5).ceil().max(0.0);
        let row_end = (max_y - 0.5).ceil().min(height);
        if row_start >= row_end {
            return Ok(());
        }

        let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
        for row in row_start as u32..row_end as u32 {
            let sample_y = row as f32 + 0.5;
            crossings.clear();

            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                // Half-open test so shared vertices are counted once
                if (a.y <= sample_y) != (b.y <= sample_y) {
                    let t = (sample_y - a.y) / (b.y - a.y);
                    crossings.push(a.x + t * (b.x - a.x));
                }
            }

            crossings.sort_by(f32::total_cmp);
            for pair in crossings.chunks_exact(2) {
                self.fill_span(row, pair[0], pair[1], color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    #[test]
    fn test_clear_and_size() {
        let mut surface = ImageSurface::new(4, 3);
        assert_eq!(surface.size(), (4, 3));
        surface.clear(RED).unwrap();
        assert_eq!(surface.pixel(3, 2), Some(RED));
        assert_eq!(surface.pixel(4, 0), None);
    }

    #[test]
    fn test_fill_rect_clipped() {
        let mut surface = ImageSurface::new(10, 10);
        surface.clear(Color::BLACK).unwrap();
        surface.fill_rect(-5.0, 8.0, 8.0, 10.0, RED).unwrap();

        assert_eq!(surface.pixel(0, 9), Some(RED));
        assert_eq!(surface.pixel(2, 8), Some(RED));
        assert_eq!(surface.pixel(3, 8), Some(Color::BLACK));
        assert_eq!(surface.pixel(0, 7), Some(Color::BLACK));
    }

    #[test]
    fn test_fill_polygon_square() {
        let mut surface = ImageSurface::new(10, 10);
        surface.clear(Color::BLACK).unwrap();
        let square = [
            Vec2::new(2.0, 2.0),
            Vec2::new(6.0, 2.0),
            Vec2::new(6.0, 6.0),
            Vec2::new(2.0, 6.0),
        ];
        surface.fill_polygon(&square, RED).unwrap();

        let filled = (0..10)
            .flat_map(|y| (0..10).map(move |x| (x, y)))
            .filter(|&(x, y)| surface.pixel(x, y) == Some(RED))
            .count();
        assert_eq!(filled, 16);
        assert_eq!(surface.pixel(2, 2), Some(RED));
        assert_eq!(surface.pixel(6, 6), Some(Color::BLACK));
    }

    #[test]
    fn test_fill_polygon_rejects_degenerate() {
        let mut surface = ImageSurface::new(4, 4);
        assert_eq!(
            surface.fill_polygon(&[Vec2::ZERO, Vec2::ONE], RED),
            Err(SurfaceError::DegeneratePolygon(2))
        );
        assert_eq!(
            surface.fill_polygon(&[Vec2::ZERO, Vec2::ONE, Vec2::new(f32::INFINITY, 0.0)], RED),
            Err(SurfaceError::NonFinite)
        );
    }

    #[test]
    fn test_alpha_blend() {
        let mut surface = ImageSurface::new(1, 1);
        surface.clear(Color::BLACK).unwrap();
        surface.fill_rect(0.0, 0.0, 1.0, 1.0, Color::rgba(255, 255, 255, 51)).unwrap();
        assert_eq!(surface.pixel(0, 0), Some(Color::rgba(51, 51, 51, 255)));
    }

    #[test]
    fn test_png_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        let mut surface = ImageSurface::new(8, 8);
        surface.clear(RED).unwrap();
        surface.save_png(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (8, 8));
        assert_eq!(loaded.get_pixel(4, 4).0, [255, 0, 0, 255]);

        let bytes = surface.encode_png().unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
