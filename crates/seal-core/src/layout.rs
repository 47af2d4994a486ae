//! Модуль раскладки текста по дуге
//!
//! Строка превращается в последовательность слотов: для каждого символа
//! вычисляется угол размещения на окружности. Ширина глифа переводится в
//! угловую ширину через длину окружности (хорда считается равной дуге,
//! что допустимо для мелких шрифтов и радиусов печати).
//!
//! Углы в радианах, 0 — ось +x, рост по часовой стрелке в экранных
//! координатах (ось y направлена вниз).

use std::f64::consts::TAU;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{Result, SealError};

/// Точка на холсте
pub type Point2D = Point2<f64>;

/// Направление обхода дуги
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// +1 по часовой, -1 против
    pub fn sign(self) -> f64 {
        match self {
            Direction::Clockwise => 1.0,
            Direction::CounterClockwise => -1.0,
        }
    }
}

/// Дуга, вдоль которой раскладывается текст
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub center: Point2D,
    pub radius: f64,
    /// Угол, относительно которого центрируется строка (радианы)
    pub start_angle: f64,
    pub direction: Direction,
    /// `false` — низ глифов к центру, `true` — верх глифов к ободу
    pub flip: bool,
}

impl Arc {
    /// Дуга по часовой стрелке без переворота
    pub fn new(center: Point2D, radius: f64, start_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            direction: Direction::Clockwise,
            flip: false,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn flipped(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    pub fn circumference(&self) -> f64 {
        TAU * self.radius
    }

    /// Угловая ширина глифа шириной `width` px
    pub fn angular_width(&self, width: f64) -> f64 {
        width / self.circumference() * TAU
    }

    /// Точка окружности под углом `angle`
    pub fn point_at(&self, angle: f64) -> Point2D {
        Point2D::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    /// Поворот тайла глифа (градусы, по часовой) для угла размещения.
    ///
    /// Знаки подобраны эмпирически: `+90` при перевороте, `-90` без него.
    pub fn glyph_rotation_degrees(&self, angle: f64) -> f64 {
        if self.flip {
            angle.to_degrees() + 90.0
        } else {
            angle.to_degrees() - 90.0
        }
    }

    fn ensure_positive(&self) -> Result<()> {
        if !(self.radius > 0.0) || !self.radius.is_finite() {
            return Err(SealError::DegenerateArc { radius: self.radius });
        }
        Ok(())
    }
}

/// Габариты глифа в пикселях при заданном шрифте и размере
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub width: u32,
    pub height: u32,
}

impl GlyphMetrics {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Источник метрик глифов
pub trait MetricsSource {
    fn glyph_metrics(&self, ch: char) -> GlyphMetrics;
}

impl<F> MetricsSource for F
where
    F: Fn(char) -> GlyphMetrics,
{
    fn glyph_metrics(&self, ch: char) -> GlyphMetrics {
        self(ch)
    }
}

/// Один символ в раскладке
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphSlot {
    pub ch: char,
    /// Угол размещения (середина слота), радианы
    pub angle: f64,
    /// Угловая ширина слота, радианы
    pub angular_width: f64,
    pub metrics: GlyphMetrics,
}

/// Раскладка строки: слоты в порядке текста
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPlan {
    pub slots: Vec<GlyphSlot>,
    /// Суммарная угловая ширина строки
    pub total_angle: f64,
}

impl LayoutPlan {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GlyphSlot> {
        self.slots.iter()
    }
}

impl<'a> IntoIterator for &'a LayoutPlan {
    type Item = &'a GlyphSlot;
    type IntoIter = std::slice::Iter<'a, GlyphSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

/// Раскладка строки по дуге.
///
/// Строка центрируется относительно `arc.start_angle`: курсор стартует
/// на половине суммарной ширины до стартового угла (против направления
/// обхода), каждый глиф ставится в середину своего слота.
///
/// Радиус проверяется до всего остального, так что даже пустая строка
/// на вырожденной дуге даёт `DegenerateArc`.
pub fn layout_on_arc<M>(text: &str, arc: &Arc, metrics: &M) -> Result<LayoutPlan>
where
    M: MetricsSource + ?Sized,
{
    arc.ensure_positive()?;

    let measured: Vec<(char, GlyphMetrics, f64)> = text
        .chars()
        .map(|ch| {
            let m = metrics.glyph_metrics(ch);
            (ch, m, arc.angular_width(m.width as f64))
        })
        .collect();

    let total_angle: f64 = measured.iter().map(|(_, _, theta)| theta).sum();
    let sign = arc.direction.sign();

    let mut cursor = arc.start_angle - sign * total_angle / 2.0;
    let mut slots = Vec::with_capacity(measured.len());

    for (ch, m, theta) in measured {
        slots.push(GlyphSlot {
            ch,
            angle: cursor + sign * theta / 2.0,
            angular_width: theta,
            metrics: m,
        });
        cursor += sign * theta;
    }

    Ok(LayoutPlan { slots, total_angle })
}
