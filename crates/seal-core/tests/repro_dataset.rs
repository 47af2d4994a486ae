use std::path::{Path, PathBuf};

use seal_core::{DatasetBuilder, GeneratorConfig, SizedFace, Typeface};

const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
];

/// Папка с одним системным шрифтом, если он есть на машине
fn system_font_dir() -> Option<(tempfile::TempDir, PathBuf)> {
    let source = SYSTEM_FONT_CANDIDATES.iter().map(Path::new).find(|p| p.is_file())?;
    let dir = tempfile::tempdir().ok()?;
    let target = dir.path().join("DejaVuSans.ttf");
    std::fs::copy(source, &target).ok()?;
    Some((dir, target))
}

#[test]
fn test_real_font_reproducible_dataset() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init();

    let Some((fonts, _)) = system_font_dir() else {
        println!("No system TrueType font found, skipping");
        return;
    };

    let config = GeneratorConfig {
        seed: Some(123),
        ..GeneratorConfig::default()
    };
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let a = DatasetBuilder::from_font_dir(config.clone(), fonts.path())
        .unwrap()
        .build(2, first.path())
        .unwrap();
    let b = DatasetBuilder::from_font_dir(config, fonts.path())
        .unwrap()
        .build(2, second.path())
        .unwrap();

    assert_eq!(a.records, b.records);
    assert!(a.records.iter().all(|r| r.font == "DejaVuSans.ttf"));
    for record in &a.records {
        let img_a = std::fs::read(a.images_dir.join(&record.filename)).unwrap();
        let img_b = std::fs::read(b.images_dir.join(&record.filename)).unwrap();
        assert_eq!(img_a, img_b);
    }
}

#[test]
fn test_real_font_metrics() {
    let Some((_dir, path)) = system_font_dir() else {
        println!("No system TrueType font found, skipping");
        return;
    };

    let data = std::fs::read(path).unwrap();
    let typeface = seal_core::OutlineTypeface::from_bytes(data).unwrap();
    let face = SizedFace::new(&typeface, 14.0);

    let wide = face.typeface.glyph_metrics('Ж', 14.0);
    let narrow = face.typeface.glyph_metrics('1', 14.0);
    assert!(wide.width > narrow.width);
    assert!(wide.height > 0);

    let tile = typeface.render_glyph('Ж', 14.0, image::Rgba([0, 0, 255, 255]));
    assert_eq!(tile.dimensions(), (wide.width * 2, wide.height * 2));
    assert!(tile.pixels().any(|p| p.0[3] > 200));
}

#[test]
fn test_real_font_centered_label() {
    let Some((_dir, path)) = system_font_dir() else {
        println!("No system TrueType font found, skipping");
        return;
    };

    let data = std::fs::read(path).unwrap();
    let typeface = seal_core::OutlineTypeface::from_bytes(data).unwrap();
    let (short_w, short_h) = typeface.text_size("«АБ»", 22.0);
    let (long_w, long_h) = typeface.text_size("«АБВГДЕЖ»", 22.0);
    assert!(long_w > short_w);
    assert!(short_h > 0 && long_h > 0);

    let white = image::Rgba([255, 255, 255, 255]);
    let mut canvas = image::RgbaImage::from_pixel(200, 200, white);
    let center = seal_core::layout::Point2D::new(100.0, 100.0);
    typeface.draw_centered_text(&mut canvas, center, "«АБВГДЕЖ»", 22.0, image::Rgba([0, 0, 255, 255]));

    // Чернила ложатся примерно симметрично относительно центра
    let inked: Vec<(u32, u32)> = canvas
        .enumerate_pixels()
        .filter(|(_, _, p)| **p != white)
        .map(|(x, y, _)| (x, y))
        .collect();
    assert!(!inked.is_empty());
    let min_x = inked.iter().map(|p| p.0).min().unwrap() as i64;
    let max_x = inked.iter().map(|p| p.0).max().unwrap() as i64;
    let min_y = inked.iter().map(|p| p.1).min().unwrap() as i64;
    let max_y = inked.iter().map(|p| p.1).max().unwrap() as i64;
    assert!(((min_x + max_x) / 2 - 100).abs() <= 6, "x span {min_x}..{max_x}");
    assert!(((min_y + max_y) / 2 - 100).abs() <= 8, "y span {min_y}..{max_y}");
    assert!(max_x - min_x <= long_w as i64 + 2);
}
