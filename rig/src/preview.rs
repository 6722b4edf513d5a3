//! Landmark overlay for the desktop preview.

use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{Rgb, RgbImage};
use sensor::{Detection, HAND_CONNECTIONS, Hand};

pub const LANDMARK_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const CONNECTION_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
pub const LANDMARK_RADIUS: i64 = 3;

/// Decode a base64 JPEG or PNG frame.
pub fn decode_frame(encoded: &str) -> anyhow::Result<RgbImage> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .context("frame is not valid base64")?;
    let image = image::load_from_memory(&bytes).context("frame is not a readable image")?;
    Ok(image.to_rgb8())
}

/// Draw the skeleton of `hand` and a dot on every landmark.
///
/// Edges are clipped to the image first, so landmarks far outside the frame
/// cost nothing to draw.
pub fn draw_hand(image: &mut RgbImage, hand: &Hand) {
    for &(a, b) in HAND_CONNECTIONS.iter() {
        if let (Some(start), Some(end)) = (hand.landmarks.get(a), hand.landmarks.get(b)) {
            let clipped = clip_segment(
                (start.x, start.y),
                (end.x, end.y),
                image.width(),
                image.height(),
            );
            if let Some((from, to)) = clipped {
                draw_line(image, from, to, CONNECTION_COLOR);
            }
        }
    }
    for lm in &hand.landmarks {
        draw_dot(image, (lm.x, lm.y), LANDMARK_RADIUS, LANDMARK_COLOR);
    }
}

/// Decode the detection's frame and draw every hand on it.
///
/// Returns `None` when the detector did not attach a frame.
pub fn annotate(detection: &Detection) -> anyhow::Result<Option<RgbImage>> {
    let Some(encoded) = detection.frame.as_deref() else {
        return Ok(None);
    };
    let mut image = decode_frame(encoded)?;
    for hand in &detection.hands {
        draw_hand(&mut image, hand);
    }
    Ok(Some(image))
}

/// Liang-Barsky clip of a segment to the pixel grid of a `width` x `height`
/// image. Returns pixel endpoints, or `None` when nothing is visible.
fn clip_segment(
    (x0, y0): (f32, f32),
    (x1, y1): (f32, f32),
    width: u32,
    height: u32,
) -> Option<((i64, i64), (i64, i64))> {
    if width == 0 || height == 0 || ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (x0, y0, x1, y1) = (f64::from(x0), f64::from(y0), f64::from(x1), f64::from(y1));
    let (max_x, max_y) = (f64::from(width - 1), f64::from(height - 1));
    let (dx, dy) = (x1 - x0, y1 - y0);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [(-dx, x0), (dx, max_x - x0), (-dy, y0), (dy, max_y - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    let pixel = |t: f64| {
        let x = (x0 + t * dx).round().clamp(0.0, max_x) as i64;
        let y = (y0 + t * dy).round().clamp(0.0, max_y) as i64;
        (x, y)
    };
    Some((pixel(t0), pixel(t1)))
}

/// Bresenham line between two in-image points.
fn draw_line(image: &mut RgbImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    loop {
        put_pixel(image, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn draw_dot(image: &mut RgbImage, (x, y): (f32, f32), radius: i64, color: Rgb<u8>) {
    let reach = radius as f32;
    let visible = x.is_finite()
        && y.is_finite()
        && x >= -reach
        && y >= -reach
        && x <= image.width() as f32 + reach
        && y <= image.height() as f32 + reach;
    if !visible {
        return;
    }
    let (cx, cy) = (x.round() as i64, y.round() as i64);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel(image, cx + dx, cy + dy, color);
            }
        }
    }
}

fn put_pixel(image: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < i64::from(image.width()) && y < i64::from(image.height()) {
        image.put_pixel(x as u32, y as u32, color);
    }
}
