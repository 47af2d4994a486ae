//! Сборка датасета
//!
//! Структура результата:
//! - `<output>/images/seal_<i>.png` (i с единицы, без ведущих нулей)
//! - `<output>/labels.json` — список `SealMetadata` в порядке индексов
//!
//! Печати генерируются параллельно (rayon), у каждой свой генератор
//! случайных чисел, выведенный из общего зерна и индекса, поэтому
//! результат не зависит от числа потоков.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::GeneratorConfig;
use crate::fonts::FontLibrary;
use crate::seal::{ComposedSeal, SealComposer, SealMetadata};
use crate::{Result, SealError};

pub const IMAGES_DIR: &str = "images";
pub const LABELS_FILE: &str = "labels.json";

/// Имя файла печати с индексом `index` (с единицы)
pub fn seal_filename(index: usize) -> String {
    format!("seal_{index}.png")
}

/// SplitMix64: независимые зёрна для соседних индексов
fn mix_seed(master: u64, index: u64) -> u64 {
    let mut z = master.wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Генератор случайных чисел для печати с индексом `index`
pub fn seal_rng(master_seed: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(mix_seed(master_seed, index as u64))
}

/// Результат одного запуска
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<SealMetadata>,
    pub images_dir: PathBuf,
    pub labels_path: PathBuf,
    pub seed: u64,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Запись разметки: UTF-8, отступ 4 пробела, кириллица без экранирования
pub fn write_labels(path: &Path, records: &[SealMetadata]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    records.serialize(&mut serializer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_labels(path: &Path) -> Result<Vec<SealMetadata>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Генератор датасета
pub struct DatasetBuilder {
    config: GeneratorConfig,
    fonts: FontLibrary,
    seed: u64,
    jobs: Option<usize>,
}

impl DatasetBuilder {
    /// Конфигурация проверяется сразу, до записи файлов
    pub fn new(config: GeneratorConfig, fonts: FontLibrary) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self {
            config,
            fonts,
            seed,
            jobs: None,
        })
    }

    /// Загрузка всех шрифтов папки и проверка конфигурации
    pub fn from_font_dir(config: GeneratorConfig, font_dir: &Path) -> Result<Self> {
        let fonts = FontLibrary::open(font_dir)?;
        log::info!("Loaded {} font(s) from {}", fonts.len(), font_dir.display());
        Self::new(config, fonts)
    }

    /// Число рабочих потоков (по умолчанию — глобальный пул rayon)
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    /// Печать с индексом `index`; для одного зерна результат всегда одинаков
    pub fn generate_one(&self, index: usize) -> Result<ComposedSeal> {
        let composer = SealComposer::new(&self.config, &self.fonts);
        let mut rng = seal_rng(self.seed, index);
        composer.compose(&mut rng, &seal_filename(index))
    }

    /// Генерация `count` печатей в `output_dir`.
    ///
    /// Первая ошибка прерывает запуск: уже записанные изображения остаются,
    /// `labels.json` не создаётся.
    pub fn build(&self, count: usize, output_dir: &Path) -> Result<Dataset> {
        let images_dir = output_dir.join(IMAGES_DIR);
        fs::create_dir_all(&images_dir)?;
        log::info!(
            "Generating {} seal(s) into {} (seed {})",
            count,
            output_dir.display(),
            self.seed
        );

        let records = match self.jobs {
            Some(jobs) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .build()
                    .map_err(|e| SealError::InvalidConfig(format!("thread pool: {e}")))?;
                pool.install(|| self.generate_all(count, &images_dir))?
            }
            None => self.generate_all(count, &images_dir)?,
        };

        let labels_path = output_dir.join(LABELS_FILE);
        write_labels(&labels_path, &records)?;
        log::info!("Wrote {} label(s) to {}", records.len(), labels_path.display());

        Ok(Dataset {
            records,
            images_dir,
            labels_path,
            seed: self.seed,
        })
    }

    fn generate_all(&self, count: usize, images_dir: &Path) -> Result<Vec<SealMetadata>> {
        // collect() сохраняет порядок индексов независимо от порядка завершения
        (1..=count)
            .into_par_iter()
            .map(|index| {
                let seal = self.generate_one(index)?;
                seal.image.save(images_dir.join(&seal.metadata.filename))?;
                log::info!("Seal {}/{} generated", index, count);
                Ok(seal.metadata)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::BlockTypeface;
    use std::sync::Arc;

    fn builder(seed: u64) -> DatasetBuilder {
        let config = GeneratorConfig {
            seed: Some(seed),
            ..GeneratorConfig::default()
        };
        DatasetBuilder::new(config, FontLibrary::single("block.ttf", Arc::new(BlockTypeface))).unwrap()
    }

    #[test]
    fn test_filename_format() {
        assert_eq!(seal_filename(1), "seal_1.png");
        assert_eq!(seal_filename(12), "seal_12.png");
    }

    #[test]
    fn test_seal_rngs_differ_per_index() {
        assert_ne!(mix_seed(7, 1), mix_seed(7, 2));
        assert_ne!(mix_seed(7, 1), mix_seed(8, 1));
        assert_eq!(mix_seed(7, 1), mix_seed(7, 1));
    }

    #[test]
    fn test_generate_one_is_deterministic() {
        let a = builder(5).generate_one(3).unwrap();
        let b = builder(5).generate_one(3).unwrap();
        assert_eq!(a.metadata, b.metadata);
        assert_eq!(a.image, b.image);

        let c = builder(5).generate_one(4).unwrap();
        assert_ne!(a.metadata.inn, c.metadata.inn);
    }

    #[test]
    fn test_labels_keep_cyrillic_literal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LABELS_FILE);
        let record = SealMetadata {
            company_name: "«АБВГДЕЖ»".into(),
            inn: "0123456789".into(),
            outer_text: "ЯЮЭ".into(),
            font: "block.ttf".into(),
            rotation_angle: 1.5,
            noise_level: 0.2,
            blur_radius: 0.25,
            filename: "seal_1.png".into(),
        };
        write_labels(&path, &[record.clone()]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("«АБВГДЕЖ»"));
        assert!(!raw.contains("\\u"));
        assert!(raw.contains("\n        \"inn\": \"0123456789\""));
        assert_eq!(read_labels(&path).unwrap(), vec![record]);
    }

    #[test]
    fn test_invalid_config_fails_before_output() {
        let mut config = GeneratorConfig::default();
        config.canvas.width = 40;
        let result = DatasetBuilder::new(config, FontLibrary::single("block.ttf", Arc::new(BlockTypeface)));
        assert!(matches!(result, Err(SealError::DegenerateArc { .. })));
    }
}
