use image::{ImageBuffer, Pixel, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

use crate::layout::Point2D;
use crate::{Result, SealError};

/// Размер холста, вмещающего изображение `width×height` после поворота на `theta`
pub fn expanded_size(width: u32, height: u32, theta: f64) -> (u32, u32) {
    let (sin, cos) = theta.sin_cos();
    let (w, h) = (width as f64, height as f64);
    // Small epsilon keeps exact multiples of 90° from growing by one pixel
    let new_w = (w * cos.abs() + h * sin.abs() - 1e-6).ceil().max(w) as u32;
    let new_h = (w * sin.abs() + h * cos.abs() - 1e-6).ceil().max(h) as u32;
    (new_w, new_h)
}

/// Изображение по центру холста `width×height`, залитого `fill`
pub fn pad_to<P: Pixel>(
    img: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
    fill: P,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let mut out = ImageBuffer::from_pixel(width, height, fill);
    let x = (width as i64 - img.width() as i64) / 2;
    let y = (height as i64 - img.height() as i64) / 2;
    image::imageops::replace(&mut out, img, x, y);
    out
}

/// Поворот RGBA по часовой стрелке на `theta` радиан с расширением холста
pub fn rotate_expanded_rgba(img: &RgbaImage, theta: f64, interpolation: Interpolation, fill: Rgba<u8>) -> RgbaImage {
    let (w, h) = expanded_size(img.width(), img.height(), theta);
    let padded = pad_to(img, w, h, fill);
    rotate_about_center(&padded, theta as f32, interpolation, fill)
}

/// Поворот RGB по часовой стрелке на `theta` радиан с расширением холста
pub fn rotate_expanded_rgb(img: &RgbImage, theta: f64, interpolation: Interpolation, fill: Rgb<u8>) -> RgbImage {
    let (w, h) = expanded_size(img.width(), img.height(), theta);
    let padded = pad_to(img, w, h, fill);
    rotate_about_center(&padded, theta as f32, interpolation, fill)
}

/// Кольцо толщиной `stroke` px, внешняя граница на расстоянии `radius`.
///
/// Линия растёт внутрь от радиуса, как у контура эллипса с заданной шириной.
pub fn draw_ring(canvas: &mut RgbaImage, center: Point2D, radius: f64, stroke: u32, color: Rgba<u8>) -> Result<()> {
    if !(radius > 0.0) {
        return Err(SealError::DegenerateArc { radius });
    }
    let inner = (radius - stroke as f64).max(0.0);

    let (width, height) = canvas.dimensions();
    let x0 = (center.x - radius).floor().max(0.0) as u32;
    let y0 = (center.y - radius).floor().max(0.0) as u32;
    let x1 = ((center.x + radius).ceil() as u32).min(width.saturating_sub(1));
    let y1 = ((center.y + radius).ceil() as u32).min(height.saturating_sub(1));

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f64 - center.x;
            let dy = y as f64 - center.y;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist <= radius && dist > inner {
                canvas.put_pixel(x, y, color);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn test_expanded_size() {
        assert_eq!(expanded_size(256, 256, 0.0), (256, 256));
        assert_eq!(expanded_size(20, 10, FRAC_PI_2), (20, 20));
        let (w, h) = expanded_size(256, 256, 5f64.to_radians());
        assert!(w > 256 && h > 256);
        assert_eq!(w, h);
    }

    #[test]
    fn test_pad_centers_content() {
        let img = RgbaImage::from_pixel(2, 2, BLUE);
        let padded = pad_to(&img, 6, 6, WHITE);
        assert_eq!(*padded.get_pixel(2, 2), BLUE);
        assert_eq!(*padded.get_pixel(3, 3), BLUE);
        assert_eq!(*padded.get_pixel(1, 1), WHITE);
        assert_eq!(*padded.get_pixel(4, 4), WHITE);
    }

    #[test]
    fn test_rotation_keeps_content() {
        let mut img = RgbImage::from_pixel(40, 40, Rgb([255, 255, 255]));
        for y in 4..8 {
            for x in 4..8 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let rotated = rotate_expanded_rgb(&img, 30f64.to_radians(), Interpolation::Nearest, Rgb([255, 255, 255]));
        assert!(rotated.width() > 40);
        assert!(rotated.pixels().any(|p| p.0[0] < 128));
    }

    #[test]
    fn test_ring_pixels_lie_in_band() {
        let mut canvas = RgbaImage::from_pixel(64, 64, WHITE);
        let center = Point2D::new(32.0, 32.0);
        draw_ring(&mut canvas, center, 20.0, 3, BLUE).unwrap();

        assert_eq!(*canvas.get_pixel(52, 32), BLUE);
        assert_eq!(*canvas.get_pixel(50, 32), BLUE);
        assert_eq!(*canvas.get_pixel(49, 32), WHITE);
        assert_eq!(*canvas.get_pixel(32, 32), WHITE);
        for (x, y, p) in canvas.enumerate_pixels() {
            if *p == BLUE {
                let d = ((x as f64 - 32.0).powi(2) + (y as f64 - 32.0).powi(2)).sqrt();
                assert!(d > 17.0 && d <= 20.0);
            }
        }
    }

    #[test]
    fn test_ring_rejects_non_positive_radius() {
        let mut canvas = RgbaImage::from_pixel(8, 8, WHITE);
        let err = draw_ring(&mut canvas, Point2D::new(4.0, 4.0), 0.0, 2, BLUE).unwrap_err();
        assert!(matches!(err, SealError::DegenerateArc { .. }));
    }
}
