use noise::{NoiseFn, Simplex};

pub const GRID_WIDTH: usize = 6;
pub const GRID_HEIGHT: usize = 6;

/// Grid coordinates are divided by this before sampling, so neighbouring
/// cells land close together in noise space and produce smooth ramps.
const NOISE_FREQUENCY: f64 = 10.0;

const LEVEL_BUCKET: f64 = 0.25;
pub const LEVEL_COUNT: u8 = 5;

/// Sample a `width` x `height` grid of discretized color levels, row-major.
pub fn sample_grid(noise: &Simplex, width: usize, height: usize) -> Vec<u8> {
    let mut raw = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            raw.push(noise.get([x as f64 / NOISE_FREQUENCY, y as f64 / NOISE_FREQUENCY]));
        }
    }
    bucket_levels(&raw)
}

/// Rescale a batch of raw samples to [-1, 1] over the batch's own range, then
/// bucket into levels {0..4}. An all-equal batch has no range to stretch and
/// maps every cell to level 0.
pub fn bucket_levels(raw: &[f64]) -> Vec<u8> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if raw.is_empty() || (max - min).abs() < f64::EPSILON {
        return vec![0; raw.len()];
    }

    raw.iter()
        .map(|&value| {
            let stretched = translate_value(value, min, max, -1.0, 1.0);
            if stretched <= 0.0 {
                0
            } else {
                ((stretched / LEVEL_BUCKET).ceil() as u8).min(LEVEL_COUNT - 1)
            }
        })
        .collect()
}

/// Linear rescale of `value` from [left_min, left_max] to [right_min, right_max].
pub fn translate_value(
    value: f64,
    left_min: f64,
    left_max: f64,
    right_min: f64,
    right_max: f64,
) -> f64 {
    let left_span = left_max - left_min;
    let right_span = right_max - right_min;
    right_min + (value - left_min) / left_span * right_span
}
