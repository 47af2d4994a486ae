//! Модуль шрифтов и растеризации глифов
//!
//! `Typeface` отделяет геометрию печати от конкретного движка шрифтов:
//! раскладке нужны только метрики, композиции — тайл с одним глифом
//! и горизонтальная строка для названия компании.

use ab_glyph::{Font, FontVec, InvalidFont, OutlinedGlyph, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::layout::{GlyphMetrics, MetricsSource, Point2D};

/// Шрифт, способный измерять и рисовать символы заданного размера (px)
pub trait Typeface: Send + Sync {
    /// Габариты глифа (bounding box закрашенной части)
    fn glyph_metrics(&self, ch: char, size: f32) -> GlyphMetrics;

    /// Глиф на прозрачном тайле размером 2×bbox, глиф по центру тайла
    fn render_glyph(&self, ch: char, size: f32, color: Rgba<u8>) -> RgbaImage;

    /// Ширина и высота горизонтальной строки
    fn text_size(&self, text: &str, size: f32) -> (u32, u32);

    /// Горизонтальная строка, `(x, y)` — левый верхний угол
    fn draw_text(&self, canvas: &mut RgbaImage, x: i32, y: i32, text: &str, size: f32, color: Rgba<u8>);

    /// Строка с якорем в середине (по обеим осям)
    fn draw_centered_text(&self, canvas: &mut RgbaImage, center: Point2D, text: &str, size: f32, color: Rgba<u8>) {
        let (w, h) = self.text_size(text, size);
        let x = (center.x - w as f64 / 2.0).round() as i32;
        let y = (center.y - h as f64 / 2.0).round() as i32;
        self.draw_text(canvas, x, y, text, size, color);
    }
}

/// Пустой тайл под глиф: вдвое больше bbox, чтобы поворот не обрезал края.
///
/// Прозрачные пиксели несут цвет чернил, чтобы интерполяция при повороте
/// не давала светлой каймы.
pub fn blank_tile(metrics: GlyphMetrics, color: Rgba<u8>) -> RgbaImage {
    let [r, g, b, _] = color.0;
    let width = (metrics.width * 2).max(1);
    let height = (metrics.height * 2).max(1);
    RgbaImage::from_pixel(width, height, Rgba([r, g, b, 0]))
}

/// Шрифт фиксированного размера — источник метрик для раскладки
#[derive(Clone, Copy)]
pub struct SizedFace<'a> {
    pub typeface: &'a dyn Typeface,
    pub size: f32,
}

impl<'a> SizedFace<'a> {
    pub fn new(typeface: &'a dyn Typeface, size: f32) -> Self {
        Self { typeface, size }
    }

    pub fn render(&self, ch: char, color: Rgba<u8>) -> RgbaImage {
        self.typeface.render_glyph(ch, self.size, color)
    }
}

impl MetricsSource for SizedFace<'_> {
    fn glyph_metrics(&self, ch: char) -> GlyphMetrics {
        self.typeface.glyph_metrics(ch, self.size)
    }
}

/// Векторный шрифт (TrueType/OpenType) через ab_glyph
pub struct OutlineTypeface {
    font: FontVec,
}

impl OutlineTypeface {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, InvalidFont> {
        Ok(Self {
            font: FontVec::try_from_vec(data)?,
        })
    }

    fn outline(&self, ch: char, size: f32) -> Option<OutlinedGlyph> {
        let glyph = self.font.glyph_id(ch).with_scale(PxScale::from(size));
        self.font.outline_glyph(glyph)
    }
}

impl Typeface for OutlineTypeface {
    fn glyph_metrics(&self, ch: char, size: f32) -> GlyphMetrics {
        match self.outline(ch, size) {
            Some(outlined) => {
                let bounds = outlined.px_bounds();
                GlyphMetrics::new(bounds.width().round() as u32, bounds.height().round() as u32)
            }
            None => {
                // Пробелы и прочие глифы без контура занимают только advance
                let scaled = self.font.as_scaled(PxScale::from(size));
                let advance = scaled.h_advance(self.font.glyph_id(ch));
                GlyphMetrics::new(advance.round().max(0.0) as u32, 0)
            }
        }
    }

    fn render_glyph(&self, ch: char, size: f32, color: Rgba<u8>) -> RgbaImage {
        let metrics = self.glyph_metrics(ch, size);
        let mut tile = blank_tile(metrics, color);
        let Some(outlined) = self.outline(ch, size) else {
            return tile;
        };

        let offset_x = metrics.width / 2;
        let offset_y = metrics.height / 2;
        let [r, g, b, a] = color.0;
        outlined.draw(|x, y, coverage| {
            let px = offset_x + x;
            let py = offset_y + y;
            if px < tile.width() && py < tile.height() {
                let alpha = (coverage.clamp(0.0, 1.0) * a as f32).round() as u8;
                tile.put_pixel(px, py, Rgba([r, g, b, alpha]));
            }
        });
        tile
    }

    /// Та же раскладка, что и у `draw_text_mut`
    fn text_size(&self, text: &str, size: f32) -> (u32, u32) {
        text_size(PxScale::from(size), &self.font, text)
    }

    fn draw_text(&self, canvas: &mut RgbaImage, x: i32, y: i32, text: &str, size: f32, color: Rgba<u8>) {
        draw_text_mut(canvas, color, x, y, PxScale::from(size), &self.font, text);
    }
}

/// Шрифт без файла: каждый глиф — сплошной прямоугольник.
///
/// Нужен для отладки раскладки и для тестов, которые не должны зависеть
/// от системных шрифтов. Пробел имеет ширину, но не рисуется.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockTypeface;

impl Typeface for BlockTypeface {
    fn glyph_metrics(&self, ch: char, size: f32) -> GlyphMetrics {
        if ch.is_whitespace() {
            GlyphMetrics::new((size * 0.3).round() as u32, 0)
        } else {
            GlyphMetrics::new((size * 0.55).round() as u32, (size * 0.7).round() as u32)
        }
    }

    fn render_glyph(&self, ch: char, size: f32, color: Rgba<u8>) -> RgbaImage {
        let metrics = self.glyph_metrics(ch, size);
        let mut tile = blank_tile(metrics, color);
        if metrics.width > 0 && metrics.height > 0 {
            let rect = Rect::at((metrics.width / 2) as i32, (metrics.height / 2) as i32)
                .of_size(metrics.width, metrics.height);
            draw_filled_rect_mut(&mut tile, rect, color);
        }
        tile
    }

    fn text_size(&self, text: &str, size: f32) -> (u32, u32) {
        text.chars().fold((0, 0), |(w, h), ch| {
            let m = self.glyph_metrics(ch, size);
            (w + m.width, h.max(m.height))
        })
    }

    fn draw_text(&self, canvas: &mut RgbaImage, x: i32, y: i32, text: &str, size: f32, color: Rgba<u8>) {
        let mut cursor = x;
        for ch in text.chars() {
            let m = self.glyph_metrics(ch, size);
            if m.width > 0 && m.height > 0 {
                draw_filled_rect_mut(canvas, Rect::at(cursor, y).of_size(m.width, m.height), color);
            }
            cursor += m.width as i32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn test_blank_tile_is_transparent() {
        let tile = blank_tile(GlyphMetrics::new(6, 9), INK);
        assert_eq!(tile.dimensions(), (12, 18));
        assert!(tile.pixels().all(|p| p.0[3] == 0));

        let zero = blank_tile(GlyphMetrics::new(0, 0), INK);
        assert_eq!(zero.dimensions(), (1, 1));
    }

    #[test]
    fn test_block_glyph_is_centered_in_tile() {
        let face = BlockTypeface;
        let m = face.glyph_metrics('Щ', 20.0);
        assert_eq!(m, GlyphMetrics::new(11, 14));

        let tile = face.render_glyph('Щ', 20.0, INK);
        assert_eq!(tile.dimensions(), (22, 28));
        assert_eq!(tile.get_pixel(11, 14).0[3], 255);
        assert_eq!(tile.get_pixel(0, 0).0[3], 0);
        assert_eq!(tile.get_pixel(21, 27).0[3], 0);
        let opaque = tile.pixels().filter(|p| p.0[3] == 255).count() as u32;
        assert_eq!(opaque, m.width * m.height);
    }

    #[test]
    fn test_block_centered_text() {
        let face = BlockTypeface;
        let mut canvas = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        face.draw_centered_text(&mut canvas, Point2D::new(50.0, 50.0), "АБ", 20.0, INK);
        assert_eq!(*canvas.get_pixel(50, 50), INK);
        assert_eq!(*canvas.get_pixel(5, 5), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_sized_face_reports_metrics() {
        let face = BlockTypeface;
        let sized = SizedFace::new(&face, 14.0);
        assert_eq!(sized.glyph_metrics('7'), face.glyph_metrics('7', 14.0));
    }
}
