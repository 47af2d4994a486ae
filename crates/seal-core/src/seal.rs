//! Модуль сборки печати
//!
//! Порядок отрисовки важен — поздние слои ложатся поверх ранних:
//! внешнее кольцо, внутреннее кольцо, название компании в центре,
//! ИНН по внутренней дуге, декоративный текст между кольцами.

use image::{DynamicImage, RgbImage, RgbaImage};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::compositor::draw_text_on_arc;
use crate::config::GeneratorConfig;
use crate::fonts::FontLibrary;
use crate::geometry::draw_ring;
use crate::glyph::SizedFace;
use crate::layout::{Arc, Point2D};
use crate::postprocess::PostProcessor;
use crate::{Result, SealError};

/// Первая и последняя буквы алфавита названий (А–Я, без Ё)
pub const ALPHABET_FIRST: char = 'А';
pub const ALPHABET_LAST: char = 'Я';

/// Случайная заглавная буква кириллицы
pub fn random_letter<R: Rng + ?Sized>(rng: &mut R) -> char {
    rng.gen_range(ALPHABET_FIRST..=ALPHABET_LAST)
}

pub fn random_letters<R: Rng + ?Sized>(rng: &mut R, count: usize) -> String {
    (0..count).map(|_| random_letter(rng)).collect()
}

pub fn random_digits<R: Rng + ?Sized>(rng: &mut R, count: usize) -> String {
    (0..count)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Название компании в кавычках-«ёлочках»
pub fn random_company_name<R: Rng + ?Sized>(rng: &mut R, letters: usize) -> String {
    format!("«{}»", random_letters(rng, letters))
}

/// Параметры одной печати, выбранные до отрисовки
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SealSpec {
    pub company_name: String,
    /// Цифры ИНН
    pub inn: String,
    /// Декоративный текст внешнего кольца
    pub outer_text: String,
    /// Индекс шрифта в `FontLibrary`
    pub font_index: usize,
    pub font_name: String,
    pub label_size: f32,
    pub id_size: f32,
    pub filler_size: f32,
    pub inner_radius: i64,
    pub outer_radius: i64,
    pub id_radius: i64,
    pub stroke_width: u32,
}

impl SealSpec {
    /// Случайная печать в рамках конфигурации
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, config: &GeneratorConfig, fonts: &FontLibrary) -> Result<Self> {
        if fonts.is_empty() {
            return Err(SealError::AssetMissing("font library is empty".into()));
        }

        let max_radius = config.canvas.max_radius();
        let inner_radius = max_radius - config.rings.inner_offset.sample(rng) as i64;
        let stroke_width = config.rings.stroke_width.sample(rng);
        let outer_radius = (inner_radius + config.rings.ring_gap as i64).min(max_radius);

        let company_name = random_company_name(rng, config.text.company_letters);
        let inn = random_digits(rng, config.text.id_digits);

        let font_index = fonts.choose_index(rng);
        let font_name = fonts
            .get(font_index)
            .map(|f| f.name.clone())
            .unwrap_or_default();
        let label_size = config.text.label_size.sample(rng) as f32;

        let outer_text = random_letters(rng, config.text.filler_letters);

        let spec = Self {
            company_name,
            inn,
            outer_text,
            font_index,
            font_name,
            label_size,
            id_size: config.text.id_size,
            filler_size: config.text.filler_size,
            inner_radius,
            outer_radius,
            id_radius: inner_radius - config.rings.id_inset as i64,
            stroke_width,
        };
        spec.check_radii()?;
        Ok(spec)
    }

    fn check_radii(&self) -> Result<()> {
        for radius in [self.inner_radius, self.outer_radius, self.id_radius] {
            if radius <= 0 {
                return Err(SealError::DegenerateArc { radius: radius as f64 });
            }
        }
        Ok(())
    }

    /// Радиус декоративного текста: середина между кольцами плюс сдвиг
    pub fn filler_radius(&self, bump: f64) -> f64 {
        (self.inner_radius + self.outer_radius) as f64 / 2.0 + bump
    }
}

/// Разметка одного изображения (ground truth)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SealMetadata {
    pub company_name: String,
    pub inn: String,
    pub outer_text: String,
    /// Имя файла шрифта без пути
    pub font: String,
    /// Угол поворота, градусы (положительный — против часовой)
    pub rotation_angle: f64,
    /// СКО шума как доля диапазона 0–255
    pub noise_level: f64,
    pub blur_radius: f64,
    pub filename: String,
}

/// Готовая печать
#[derive(Debug, Clone)]
pub struct ComposedSeal {
    pub image: RgbImage,
    pub spec: SealSpec,
    pub metadata: SealMetadata,
}

/// Сборщик печатей
pub struct SealComposer<'a> {
    config: &'a GeneratorConfig,
    fonts: &'a FontLibrary,
    post: PostProcessor,
}

impl<'a> SealComposer<'a> {
    pub fn new(config: &'a GeneratorConfig, fonts: &'a FontLibrary) -> Self {
        Self {
            config,
            fonts,
            post: PostProcessor::new(config.post.clone()),
        }
    }

    /// Отрисовка печати без постобработки
    pub fn render(&self, spec: &SealSpec) -> Result<RgbaImage> {
        spec.check_radii()?;
        let font = self
            .fonts
            .get(spec.font_index)
            .ok_or_else(|| SealError::AssetMissing(format!("font #{} not loaded", spec.font_index)))?;
        let typeface = font.typeface.as_ref();

        let canvas_cfg = &self.config.canvas;
        let ink = canvas_cfg.ink_rgba();
        let mut canvas = RgbaImage::from_pixel(canvas_cfg.width, canvas_cfg.height, canvas_cfg.background_rgba());
        let center = Point2D::new((canvas_cfg.width / 2) as f64, (canvas_cfg.height / 2) as f64);

        draw_ring(&mut canvas, center, spec.outer_radius as f64, spec.stroke_width, ink)?;
        draw_ring(&mut canvas, center, spec.inner_radius as f64, spec.stroke_width, ink)?;

        typeface.draw_centered_text(&mut canvas, center, &spec.company_name, spec.label_size, ink);

        let text_cfg = &self.config.text;
        let id_arc = Arc::new(center, spec.id_radius as f64, text_cfg.id_start_angle.to_radians());
        let id_face = SizedFace::new(typeface, spec.id_size);
        draw_text_on_arc(&mut canvas, &spec.inn, &id_arc, &id_face, ink)?;

        let filler_arc = Arc::new(
            center,
            spec.filler_radius(text_cfg.filler_radius_bump),
            text_cfg.filler_start_angle.to_radians(),
        )
        .flipped(true);
        let filler_face = SizedFace::new(typeface, spec.filler_size);
        draw_text_on_arc(&mut canvas, &spec.outer_text, &filler_arc, &filler_face, ink)?;

        Ok(canvas)
    }

    /// Новая случайная печать с постобработкой и разметкой
    pub fn compose<R: Rng + ?Sized>(&self, rng: &mut R, filename: &str) -> Result<ComposedSeal> {
        let spec = SealSpec::generate(rng, self.config, self.fonts)?;
        log::debug!(
            "Seal geometry: inner={} outer={} stroke={} font={} label_size={}",
            spec.inner_radius,
            spec.outer_radius,
            spec.stroke_width,
            spec.font_name,
            spec.label_size
        );

        let rendered = DynamicImage::ImageRgba8(self.render(&spec)?).to_rgb8();
        let (image, distortion) = self.post.process(&rendered, rng, self.config.canvas.background_rgb());

        let metadata = SealMetadata {
            company_name: spec.company_name.clone(),
            inn: spec.inn.clone(),
            outer_text: spec.outer_text.clone(),
            font: spec.font_name.clone(),
            rotation_angle: distortion.rotation_angle,
            noise_level: distortion.noise_level,
            blur_radius: distortion.blur_radius,
            filename: filename.to_string(),
        };

        Ok(ComposedSeal { image, spec, metadata })
    }
}
