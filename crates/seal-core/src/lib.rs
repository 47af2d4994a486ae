//! Seal Core - генератор синтетических изображений печатей
//!
//! Библиотека для построения размеченного датасета круглых печатей:
//! - Раскладка текста по дуге окружности (направление, переворот, центрирование)
//! - Растеризация и композиция повёрнутых глифов
//! - Сборка печати (кольца, название, ИНН, декоративный текст)
//! - Постобработка (поворот, шум, размытие) с записью параметров
//! - Сборка датасета `images/` + `labels.json`

pub mod config;
pub mod layout;
pub mod glyph;
pub mod fonts;
pub mod compositor;
pub mod geometry;
pub mod seal;
pub mod postprocess;
pub mod dataset;

pub use config::{CanvasConfig, GeneratorConfig, RingConfig, Span, TextConfig};
pub use layout::{layout_on_arc, Arc, Direction, GlyphMetrics, GlyphSlot, LayoutPlan, MetricsSource, Point2D};
pub use glyph::{BlockTypeface, OutlineTypeface, SizedFace, Typeface};
pub use fonts::{FontLibrary, FontLoader, LoadedFont, OutlineFontLoader};
pub use compositor::{blit, draw_text_on_arc, place_glyphs, PlacedGlyph};
pub use seal::{ComposedSeal, SealComposer, SealMetadata, SealSpec};
pub use postprocess::{Distortion, PostProcessConfig, PostProcessor};
pub use dataset::{Dataset, DatasetBuilder};

use thiserror::Error;

/// Основные ошибки модуля
#[derive(Error, Debug)]
pub enum SealError {
    /// Нет папки со шрифтами, нет ни одного файла шрифта или файл не читается
    #[error("Font asset missing: {0}")]
    AssetMissing(String),

    /// Неположительный радиус дошёл до раскладки или отрисовки колец
    #[error("Degenerate arc: radius {radius} must be positive")]
    DegenerateArc { radius: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = SealError> = std::result::Result<T, E>;
