//! Модуль постобработки
//!
//! Имитация артефактов сканирования в фиксированном порядке:
//! - Поворот на случайный угол с расширением холста
//! - Аддитивный гауссов шум (каналы ограничиваются диапазоном 0–255)
//! - Гауссово размытие
//!
//! Каждый выбранный параметр возвращается в `Distortion` и попадает в разметку.

use image::{Rgb, RgbImage};
use imageproc::filter::separable_filter_equal;
use imageproc::geometric_transformations::Interpolation;
use imageproc::noise::gaussian_noise_mut;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Span;
use crate::geometry::rotate_expanded_rgb;
use crate::{Result, SealError};

/// Радиус размытия, ниже которого фильтр не применяется
pub const MIN_BLUR_RADIUS: f64 = 1e-3;

/// Конфигурация постобработки
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PostProcessConfig {
    /// Угол поворота, градусы (положительный — против часовой)
    pub rotation_degrees: Span<f64>,
    /// СКО шума как доля диапазона канала 0–255
    pub noise_level: Span<f64>,
    /// Радиус (sigma) гауссова размытия, px
    pub blur_radius: Span<f64>,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            rotation_degrees: Span::new(-5.0, 5.0),
            noise_level: Span::new(0.1, 0.3),
            blur_radius: Span::new(0.0, 0.5),
        }
    }
}

impl PostProcessConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, span) in [
            ("post.rotation_degrees", &self.rotation_degrees),
            ("post.noise_level", &self.noise_level),
            ("post.blur_radius", &self.blur_radius),
        ] {
            if !span.min.is_finite() || !span.max.is_finite() || span.min > span.max {
                return Err(SealError::InvalidConfig(format!("{name}: invalid range")));
            }
        }
        if self.noise_level.min < 0.0 || self.blur_radius.min < 0.0 {
            return Err(SealError::InvalidConfig(
                "noise level and blur radius must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// Параметры, применённые к одному изображению
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Distortion {
    pub rotation_angle: f64,
    pub noise_level: f64,
    pub blur_radius: f64,
    /// Зерно генератора шума
    pub noise_seed: u64,
}

/// Нормированное одномерное ядро Гаусса радиусом `ceil(3 * sigma)`; сумма весов равна 1
pub fn gaussian_kernel(sigma: f64) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil().max(1.0) as i64;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-((x * x) as f64) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / sum) as f32).collect()
}

/// Процессор постобработки
pub struct PostProcessor {
    config: PostProcessConfig,
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::new(PostProcessConfig::default())
    }
}

impl PostProcessor {
    pub fn new(config: PostProcessConfig) -> Self {
        Self { config }
    }

    /// Выбор параметров искажений
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Distortion {
        Distortion {
            rotation_angle: self.config.rotation_degrees.sample(rng),
            noise_level: self.config.noise_level.sample(rng),
            blur_radius: self.config.blur_radius.sample(rng),
            noise_seed: rng.gen(),
        }
    }

    /// Выбор параметров и полная обработка
    pub fn process<R: Rng + ?Sized>(&self, img: &RgbImage, rng: &mut R, background: Rgb<u8>) -> (RgbImage, Distortion) {
        let distortion = self.sample(rng);
        log::debug!(
            "Distortion: rotation={:.3} noise={:.3} blur={:.3}",
            distortion.rotation_angle,
            distortion.noise_level,
            distortion.blur_radius
        );
        (self.apply(img, &distortion, background), distortion)
    }

    /// Применение заданных параметров: поворот, шум, размытие
    pub fn apply(&self, img: &RgbImage, distortion: &Distortion, background: Rgb<u8>) -> RgbImage {
        let rotated = self.rotate(img, distortion.rotation_angle, background);
        let noisy = self.add_noise(rotated, distortion.noise_level, distortion.noise_seed);
        self.blur(noisy, distortion.blur_radius)
    }

    /// Поворот против часовой на `degrees`, холст расширяется и заливается фоном
    pub fn rotate(&self, img: &RgbImage, degrees: f64, background: Rgb<u8>) -> RgbImage {
        if degrees == 0.0 {
            return img.clone();
        }
        rotate_expanded_rgb(img, -degrees.to_radians(), Interpolation::Bilinear, background)
    }

    /// Аддитивный гауссов шум, СКО = `level * 255`
    pub fn add_noise(&self, mut img: RgbImage, level: f64, seed: u64) -> RgbImage {
        if level <= 0.0 {
            return img;
        }
        gaussian_noise_mut(&mut img, 0.0, level * 255.0, seed);
        img
    }

    /// Гауссово размытие с `sigma = radius`, яркость сохраняется
    pub fn blur(&self, img: RgbImage, radius: f64) -> RgbImage {
        if radius < MIN_BLUR_RADIUS {
            return img;
        }
        separable_filter_equal(&img, &gaussian_kernel(radius))
    }
}
