//! Поиск и загрузка шрифтов
//!
//! Папка шрифтов читается один раз: все `.ttf`/`.otf` загружаются заранее,
//! после этого библиотека только читается и разделяется между потоками.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;

use crate::glyph::{OutlineTypeface, Typeface};
use crate::{Result, SealError};

/// Расширения файлов шрифтов (без учёта регистра)
pub const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// Загрузчик шрифта из файла
pub trait FontLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Arc<dyn Typeface>>;
}

/// Загрузчик TrueType/OpenType через ab_glyph
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineFontLoader;

impl FontLoader for OutlineFontLoader {
    fn load(&self, path: &Path) -> Result<Arc<dyn Typeface>> {
        let data = std::fs::read(path).map_err(|e| {
            SealError::AssetMissing(format!("unreadable font {}: {e}", path.display()))
        })?;
        let typeface = OutlineTypeface::from_bytes(data).map_err(|e| {
            SealError::AssetMissing(format!("unreadable font {}: {e}", path.display()))
        })?;
        Ok(Arc::new(typeface))
    }
}

/// Загруженный шрифт
#[derive(Clone)]
pub struct LoadedFont {
    /// Имя файла без пути (попадает в разметку)
    pub name: String,
    pub path: PathBuf,
    pub typeface: Arc<dyn Typeface>,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn is_font_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| FONT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
            .unwrap_or(false)
}

/// Файлы шрифтов в папке, отсортированные по имени
pub fn discover_font_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SealError::AssetMissing(format!(
            "font directory not found: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if is_font_file(&path) {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(SealError::AssetMissing(format!(
            "no .ttf/.otf font files in {}",
            dir.display()
        )));
    }
    Ok(files)
}

/// Набор шрифтов, из которого выбирается шрифт каждой печати
#[derive(Debug, Clone)]
pub struct FontLibrary {
    fonts: Vec<LoadedFont>,
}

impl FontLibrary {
    /// Загрузка всех шрифтов папки через ab_glyph
    pub fn open(dir: &Path) -> Result<Self> {
        Self::open_with(dir, &OutlineFontLoader)
    }

    pub fn open_with(dir: &Path, loader: &dyn FontLoader) -> Result<Self> {
        let files = discover_font_files(dir)?;
        let mut fonts = Vec::with_capacity(files.len());
        for path in files {
            let typeface = loader.load(&path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            log::debug!("Loaded font {}", name);
            fonts.push(LoadedFont { name, path, typeface });
        }
        Self::from_fonts(fonts)
    }

    pub fn from_fonts(fonts: Vec<LoadedFont>) -> Result<Self> {
        if fonts.is_empty() {
            return Err(SealError::AssetMissing("font library is empty".into()));
        }
        Ok(Self { fonts })
    }

    /// Библиотека из одного шрифта (без файла на диске)
    pub fn single(name: impl Into<String>, typeface: Arc<dyn Typeface>) -> Self {
        let name = name.into();
        Self {
            fonts: vec![LoadedFont {
                path: PathBuf::from(&name),
                name,
                typeface,
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LoadedFont> {
        self.fonts.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LoadedFont> {
        self.fonts.iter()
    }

    /// Равномерный выбор индекса шрифта
    pub fn choose_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..self.fonts.len())
    }
}
