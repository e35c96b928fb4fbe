//! Single-channel 8-bit filters used by the NIR preprocessing chain.
//!
//! All buffers are row-major `width * height` slices. Neighborhood filters
//! replicate edge pixels outside the frame.

/// Lookup table for `255 * (v / 255)^gamma`, truncated.
pub fn gamma_lut(gamma: f64) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = ((i as f64 / 255.0).powf(gamma) * 255.0).clamp(0.0, 255.0) as u8;
    }
    lut
}

pub fn apply_lut(data: &mut [u8], lut: &[u8; 256]) {
    for v in data {
        *v = lut[*v as usize];
    }
}

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    i.max(0).min(len as isize - 1) as usize
}

/// Edge-preserving smoothing over a circular window of diameter `d`.
///
/// Each neighbor is weighted by spatial distance and by intensity
/// difference to the center pixel, both Gaussian.
pub fn bilateral(
    src: &[u8],
    width: usize,
    height: usize,
    d: u32,
    sigma_color: f64,
    sigma_space: f64,
) -> Vec<u8> {
    let radius = (d / 2) as isize;
    if radius == 0 || width == 0 || height == 0 {
        return src.to_vec();
    }

    let color_coeff = -0.5 / (sigma_color * sigma_color);
    let space_coeff = -0.5 / (sigma_space * sigma_space);
    let color_weight: Vec<f64> = (0..256)
        .map(|diff| ((diff * diff) as f64 * color_coeff).exp())
        .collect();

    let mut taps = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f64;
            if r2.sqrt() > radius as f64 {
                continue;
            }
            taps.push((dx, dy, (r2 * space_coeff).exp()));
        }
    }

    let mut out = vec![0u8; src.len()];
    for y in 0..height {
        for x in 0..width {
            let center = src[y * width + x];
            let mut sum = 0.0;
            let mut wsum = 0.0;
            for &(dx, dy, space_w) in &taps {
                let sx = clamp_index(x as isize + dx, width);
                let sy = clamp_index(y as isize + dy, height);
                let v = src[sy * width + sx];
                let w = space_w * color_weight[v.abs_diff(center) as usize];
                sum += w * v as f64;
                wsum += w;
            }
            out[y * width + x] = (sum / wsum).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Contrast-limited adaptive histogram equalization on a `grid` x `grid`
/// tile layout.
///
/// Frames not divisible by the grid are padded by edge replication. Each
/// tile's histogram is clipped at `clip_limit * tile_area / 256` (at least 1)
/// with the excess spread evenly, and output pixels interpolate bilinearly
/// between the mappings of the four nearest tile centers.
pub fn clahe(src: &[u8], width: usize, height: usize, clip_limit: f64, grid: usize) -> Vec<u8> {
    if width == 0 || height == 0 || grid == 0 {
        return src.to_vec();
    }
    let tiles_x = grid.min(width);
    let tiles_y = grid.min(height);
    let tile_w = width.div_ceil(tiles_x);
    let tile_h = height.div_ceil(tiles_y);
    let tile_area = tile_w * tile_h;
    let limit = ((clip_limit * tile_area as f64 / 256.0) as usize).max(1);
    let lut_scale = 255.0 / tile_area as f64;

    let mut luts = vec![[0u8; 256]; tiles_x * tiles_y];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = [0usize; 256];
            for y in ty * tile_h..(ty + 1) * tile_h {
                let sy = y.min(height - 1);
                for x in tx * tile_w..(tx + 1) * tile_w {
                    let sx = x.min(width - 1);
                    hist[src[sy * width + sx] as usize] += 1;
                }
            }
            clip_histogram(&mut hist, limit);

            let lut = &mut luts[ty * tiles_x + tx];
            let mut cdf = 0usize;
            for (bin, &count) in hist.iter().enumerate() {
                cdf += count;
                lut[bin] = (cdf as f64 * lut_scale).round().min(255.0) as u8;
            }
        }
    }

    // Neighbor tile indices and the weight of the second one
    let neighbors = |pos: usize, tile: usize, tiles: usize| -> (usize, usize, f64) {
        let f = pos as f64 / tile as f64 - 0.5;
        let lo = f.floor();
        let w = f - lo;
        let lo = lo as isize;
        (
            clamp_index(lo, tiles),
            clamp_index(lo + 1, tiles),
            w,
        )
    };

    let mut out = vec![0u8; src.len()];
    for y in 0..height {
        let (ty1, ty2, wy) = neighbors(y, tile_h, tiles_y);
        for x in 0..width {
            let (tx1, tx2, wx) = neighbors(x, tile_w, tiles_x);
            let v = src[y * width + x] as usize;
            let m = |ty: usize, tx: usize| luts[ty * tiles_x + tx][v] as f64;
            let top = m(ty1, tx1) * (1.0 - wx) + m(ty1, tx2) * wx;
            let bottom = m(ty2, tx1) * (1.0 - wx) + m(ty2, tx2) * wx;
            out[y * width + x] = (top * (1.0 - wy) + bottom * wy).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Cap every bin at `limit`, then redistribute the clipped mass so the
/// histogram total is unchanged.
fn clip_histogram(hist: &mut [usize; 256], limit: usize) {
    let mut excess = 0;
    for count in hist.iter_mut() {
        if *count > limit {
            excess += *count - limit;
            *count = limit;
        }
    }
    let batch = excess / 256;
    let residual = excess % 256;
    for count in hist.iter_mut() {
        *count += batch;
    }
    if residual > 0 {
        let step = (256 / residual).max(1);
        for bin in (0..256).step_by(step).take(residual) {
            hist[bin] += 1;
        }
    }
}

/// `|alpha * v + beta|`, rounded and saturated to 8 bits.
pub fn convert_scale_abs(data: &mut [u8], alpha: f64, beta: f64) {
    for v in data {
        *v = (alpha * *v as f64 + beta).abs().round().min(255.0) as u8;
    }
}

fn morph_3x3(src: &[u8], width: usize, height: usize, pick: fn(u8, u8) -> u8) -> Vec<u8> {
    let mut out = vec![0u8; src.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = src[y * width + x];
            for dy in -1..=1isize {
                let sy = clamp_index(y as isize + dy, height);
                for dx in -1..=1isize {
                    let sx = clamp_index(x as isize + dx, width);
                    acc = pick(acc, src[sy * width + sx]);
                }
            }
            out[y * width + x] = acc;
        }
    }
    out
}

pub fn dilate_3x3(src: &[u8], width: usize, height: usize) -> Vec<u8> {
    morph_3x3(src, width, height, u8::max)
}

pub fn erode_3x3(src: &[u8], width: usize, height: usize) -> Vec<u8> {
    morph_3x3(src, width, height, u8::min)
}

/// Closing (dilate then erode) with a 3x3 square; fills dark specks.
pub fn morph_close_3x3(src: &[u8], width: usize, height: usize) -> Vec<u8> {
    if width == 0 || height == 0 {
        return src.to_vec();
    }
    let dilated = dilate_3x3(src, width, height);
    erode_3x3(&dilated, width, height)
}
