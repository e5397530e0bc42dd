//! Fill-crop around the most interesting region.
//!
//! The crop window is the largest box with the target aspect ratio that fits
//! in the source. It slides along whichever axis has slack. Positions are
//! scored on a luma preview no larger than [`PREVIEW_EDGE`] on its long side:
//! the window with the most edge energy (sum of absolute luma differences to
//! the right and below neighbours) wins, and among equal windows the one
//! closest to the centre is taken, so flat images crop centred. Only the
//! chosen window is resized to the target, so work is bounded by the source
//! and the target, never by the aspect ratio between them.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage};

/// Longest edge of the scoring preview.
pub const PREVIEW_EDGE: u32 = 512;

/// Largest `target_w:target_h` window that fits in `(width, height)`.
pub fn crop_window(width: u32, height: u32, target_w: u32, target_h: u32) -> (u32, u32) {
    let (w, h) = (u64::from(width), u64::from(height));
    let (tw, th) = (u64::from(target_w), u64::from(target_h));

    if w * th >= h * tw {
        let win_w = ((h * tw + th / 2) / th).clamp(1, w);
        (win_w as u32, height)
    } else {
        let win_h = ((w * th + tw / 2) / tw).clamp(1, h);
        (width, win_h as u32)
    }
}

/// `(width, height)` shrunk uniformly so the long edge is at most [`PREVIEW_EDGE`].
pub fn preview_dimensions(width: u32, height: u32) -> (u32, u32) {
    let long = width.max(height);
    if long <= PREVIEW_EDGE {
        return (width, height);
    }
    (scale_len(width, PREVIEW_EDGE, long), scale_len(height, PREVIEW_EDGE, long))
}

/// `len * num / den`, rounded, at least 1.
fn scale_len(len: u32, num: u32, den: u32) -> u32 {
    let scaled = (u64::from(len) * u64::from(num) + u64::from(den) / 2) / u64::from(den);
    scaled.max(1) as u32
}

/// Edge energy per column and per row.
pub fn edge_profiles(gray: &GrayImage) -> (Vec<u64>, Vec<u64>) {
    let (width, height) = gray.dimensions();
    let mut columns = vec![0u64; width as usize];
    let mut rows = vec![0u64; height as usize];

    for y in 0..height {
        for x in 0..width {
            let here = i32::from(gray.get_pixel(x, y)[0]);
            let mut energy = 0u64;
            if x + 1 < width {
                energy += u64::from((i32::from(gray.get_pixel(x + 1, y)[0]) - here).unsigned_abs());
            }
            if y + 1 < height {
                energy += u64::from((i32::from(gray.get_pixel(x, y + 1)[0]) - here).unsigned_abs());
            }
            columns[x as usize] += energy;
            rows[y as usize] += energy;
        }
    }

    (columns, rows)
}

/// Start of the `window`-long run of `profile` with the largest sum.
pub fn interesting_offset(profile: &[u64], window: usize) -> usize {
    let len = profile.len();
    if window == 0 || window >= len {
        return 0;
    }

    let centre = (len - window) / 2;
    let mut sum: u64 = profile[..window].iter().sum();
    let mut best = (sum, 0usize);

    for start in 1..=(len - window) {
        sum = sum + profile[start + window - 1] - profile[start - 1];
        let closer = start.abs_diff(centre) < best.1.abs_diff(centre);
        if sum > best.0 || (sum == best.0 && closer) {
            best = (sum, start);
        }
    }

    best.1
}

/// Position of a `window`-long run along an axis of length `len`, scored on a
/// preview `profile` and mapped back to source coordinates.
fn source_offset(profile: &[u64], len: u32, window: u32) -> u32 {
    if window >= len {
        return 0;
    }
    let preview_len = profile.len() as u32;
    let preview_window = scale_len(window, preview_len, len).min(preview_len);
    let offset = interesting_offset(profile, preview_window as usize) as u32;

    let mapped = (u64::from(offset) * u64::from(len) + u64::from(preview_len) / 2) / u64::from(preview_len);
    (mapped as u32).min(len - window)
}

/// Crop the most interesting target-shaped window and resize it to exactly
/// `target_w` x `target_h`.
pub fn fill_crop(image: &DynamicImage, target_w: u32, target_h: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let (win_w, win_h) = crop_window(width, height, target_w, target_h);

    let (x, y) = if (win_w, win_h) == (width, height) {
        (0, 0)
    } else {
        let (preview_w, preview_h) = preview_dimensions(width, height);
        let preview = if (preview_w, preview_h) == (width, height) {
            image.to_luma8()
        } else {
            image.resize_exact(preview_w, preview_h, FilterType::Triangle).to_luma8()
        };
        let (columns, rows) = edge_profiles(&preview);
        (
            source_offset(&columns, width, win_w),
            source_offset(&rows, height, win_h),
        )
    };

    let window = image.crop_imm(x, y, win_w, win_h);
    if (win_w, win_h) == (target_w, target_h) {
        window
    } else {
        window.resize_exact(target_w, target_h, FilterType::Lanczos3)
    }
}
