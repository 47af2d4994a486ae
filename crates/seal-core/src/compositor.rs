//! Композиция глифов на дуге
//!
//! Геометрия и растр разделены: `place_glyphs` строит список повёрнутых
//! тайлов с координатами, `blit` накладывает их на холст альфа-смешиванием.

use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::Interpolation;

use crate::geometry::rotate_expanded_rgba;
use crate::glyph::SizedFace;
use crate::layout::{layout_on_arc, Arc, GlyphSlot, LayoutPlan, Point2D};
use crate::Result;

/// Повёрнутый тайл глифа, привязанный к точке на дуге
#[derive(Debug, Clone)]
pub struct PlacedGlyph {
    pub ch: char,
    /// Точка на окружности, совпадающая с центром тайла
    pub anchor: Point2D,
    /// Применённый поворот, градусы по часовой
    pub rotation_degrees: f64,
    pub tile: RgbaImage,
}

impl PlacedGlyph {
    /// Левый верхний угол тайла на холсте (с усечением к нулю)
    pub fn top_left(&self) -> (i64, i64) {
        let x = (self.anchor.x - self.tile.width() as f64 / 2.0) as i64;
        let y = (self.anchor.y - self.tile.height() as f64 / 2.0) as i64;
        (x, y)
    }
}

/// Тайл одного слота раскладки
pub fn place_glyph(slot: &GlyphSlot, arc: &Arc, face: &SizedFace<'_>, color: Rgba<u8>) -> PlacedGlyph {
    let anchor = arc.point_at(slot.angle);
    let rotation_degrees = arc.glyph_rotation_degrees(slot.angle);

    let tile = face.render(slot.ch, color);
    let [r, g, b, _] = color.0;
    let tile = rotate_expanded_rgba(
        &tile,
        rotation_degrees.to_radians(),
        Interpolation::Bicubic,
        Rgba([r, g, b, 0]),
    );

    PlacedGlyph {
        ch: slot.ch,
        anchor,
        rotation_degrees,
        tile,
    }
}

pub fn place_glyphs(plan: &LayoutPlan, arc: &Arc, face: &SizedFace<'_>, color: Rgba<u8>) -> Vec<PlacedGlyph> {
    plan.iter().map(|slot| place_glyph(slot, arc, face, color)).collect()
}

/// Наложение тайлов по порядку (поверх, без перезаписи уже нарисованного)
pub fn blit(canvas: &mut RgbaImage, glyphs: &[PlacedGlyph]) {
    for glyph in glyphs {
        let (x, y) = glyph.top_left();
        image::imageops::overlay(canvas, &glyph.tile, x, y);
    }
}

/// Раскладка, растеризация и наложение строки на дугу
pub fn draw_text_on_arc(
    canvas: &mut RgbaImage,
    text: &str,
    arc: &Arc,
    face: &SizedFace<'_>,
    color: Rgba<u8>,
) -> Result<LayoutPlan> {
    let plan = layout_on_arc(text, arc, face)?;
    let glyphs = place_glyphs(&plan, arc, face, color);
    blit(canvas, &glyphs);
    log::trace!("Placed {} glyphs on arc r={:.1}", glyphs.len(), arc.radius);
    Ok(plan)
}
