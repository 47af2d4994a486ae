//! Конфигурация генератора
//!
//! Все значения по умолчанию совпадают с параметрами эталонного генератора:
//! холст 256×256, кольца на 20–35 px внутри допустимого радиуса,
//! ИНН из 10 цифр, 50 букв декоративного текста.

use std::path::Path;

use image::{Rgb, Rgba};
use rand::distributions::uniform::SampleUniform;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::postprocess::PostProcessConfig;
use crate::{Result, SealError};

/// Замкнутый диапазон `[min, max]` для равномерной выборки
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Span<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy + PartialOrd> Span<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Равномерная выборка из `[min, max]` (обе границы включены)
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T
    where
        T: SampleUniform,
    {
        rng.gen_range(self.min..=self.max)
    }

    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    fn check(&self, name: &str) -> Result<()> {
        // `!(a <= b)` also rejects NaN bounds
        if !(self.min <= self.max) {
            return Err(SealError::InvalidConfig(format!(
                "{name}: range minimum exceeds maximum"
            )));
        }
        Ok(())
    }
}

/// Параметры холста
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    /// Ширина холста до поворота
    pub width: u32,
    /// Высота холста до поворота
    pub height: u32,
    /// Отступ внешнего кольца от края холста
    pub margin: u32,
    /// Цвет фона (RGB)
    pub background: [u8; 3],
    /// Цвет чернил (RGB)
    pub ink: [u8; 3],
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            margin: 10,
            background: [255, 255, 255],
            ink: [0, 0, 255],
        }
    }
}

impl CanvasConfig {
    pub fn background_rgb(&self) -> Rgb<u8> {
        Rgb(self.background)
    }

    pub fn background_rgba(&self) -> Rgba<u8> {
        let [r, g, b] = self.background;
        Rgba([r, g, b, 255])
    }

    pub fn ink_rgba(&self) -> Rgba<u8> {
        let [r, g, b] = self.ink;
        Rgba([r, g, b, 255])
    }

    /// Максимальный радиус кольца с учётом отступа
    pub fn max_radius(&self) -> i64 {
        let half = (self.width / 2).min(self.height / 2) as i64;
        half - self.margin as i64
    }
}

/// Геометрия колец
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RingConfig {
    /// Насколько внутреннее кольцо меньше максимального радиуса
    pub inner_offset: Span<u32>,
    /// Расстояние от внутреннего кольца до внешнего
    pub ring_gap: u32,
    /// Толщина линии колец
    pub stroke_width: Span<u32>,
    /// Насколько кольцо ИНН лежит внутри внутреннего кольца
    pub id_inset: u32,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            inner_offset: Span::new(20, 35),
            ring_gap: 15,
            stroke_width: Span::new(2, 5),
            id_inset: 10,
        }
    }
}

/// Тексты печати и их шрифты
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    /// Размер шрифта названия компании (px)
    pub label_size: Span<u32>,
    /// Размер шрифта цифр ИНН (px)
    pub id_size: f32,
    /// Размер шрифта декоративного текста (px)
    pub filler_size: f32,
    pub company_letters: usize,
    pub id_digits: usize,
    pub filler_letters: usize,
    /// Центр строки ИНН на дуге, градусы
    pub id_start_angle: f64,
    /// Центр декоративного текста на дуге, градусы
    pub filler_start_angle: f64,
    /// Сдвиг декоративного текста наружу от середины между кольцами
    pub filler_radius_bump: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            label_size: Span::new(20, 25),
            id_size: 14.0,
            filler_size: 14.0,
            company_letters: 7,
            id_digits: 10,
            filler_letters: 50,
            id_start_angle: 90.0,
            filler_start_angle: 270.0,
            filler_radius_bump: 1.0,
        }
    }
}

/// Полная конфигурация генератора
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub canvas: CanvasConfig,
    pub rings: RingConfig,
    pub text: TextConfig,
    pub post: PostProcessConfig,
    /// Зерно генератора. Без него берётся случайное и пишется в лог.
    pub seed: Option<u64>,
}

impl GeneratorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SealError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Проверка конфигурации до генерации первого изображения.
    ///
    /// Радиусы проверяются для худшего случая выборки, поэтому вырожденная
    /// дуга обнаруживается до записи файлов.
    pub fn validate(&self) -> Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(SealError::InvalidConfig("canvas must not be empty".into()));
        }
        self.rings.inner_offset.check("rings.inner_offset")?;
        self.rings.stroke_width.check("rings.stroke_width")?;
        self.text.label_size.check("text.label_size")?;
        self.post.validate()?;

        if self.rings.stroke_width.min == 0 {
            return Err(SealError::InvalidConfig(
                "rings.stroke_width must be at least 1 px".into(),
            ));
        }
        if self.text.label_size.min == 0 || self.text.id_size <= 0.0 || self.text.filler_size <= 0.0 {
            return Err(SealError::InvalidConfig("font sizes must be positive".into()));
        }

        let smallest_inner = self.canvas.max_radius() - self.rings.inner_offset.max as i64;
        let smallest_id = smallest_inner - self.rings.id_inset as i64;
        let worst = smallest_inner.min(smallest_id);
        if worst <= 0 {
            return Err(SealError::DegenerateArc { radius: worst as f64 });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_config_is_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.canvas.max_radius(), 118);
    }

    #[test]
    fn test_span_sample_stays_in_range() {
        let span = Span::new(20u32, 35);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(span.contains(span.sample(&mut rng)));
        }
    }

    #[test]
    fn test_small_canvas_is_degenerate() {
        let mut config = GeneratorConfig::default();
        config.canvas.width = 80;
        config.canvas.height = 80;
        assert!(matches!(config.validate(), Err(SealError::DegenerateArc { .. })));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = GeneratorConfig::default();
        config.rings.stroke_width = Span::new(5, 2);
        assert!(matches!(config.validate(), Err(SealError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GeneratorConfig::from_json_str(r#"{"seed": 42, "canvas": {"width": 300}}"#).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.canvas.width, 300);
        assert_eq!(config.canvas.height, 256);
        assert_eq!(config.text.id_digits, 10);
    }
}
