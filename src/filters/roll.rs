// In: src/filters/roll.rs

//! The row/column rotation kernels behind the `roll-*` filters.
//!
//! A shift sequence is a smoothed random walk keyed by the seed image: one
//! uniform draw per line, a moving average over a window, reflect padding back
//! to at least the line count, truncation and a min-subtract so every shift is
//! non-negative.

use ndarray::{s, Array3, ArrayViewMut2, Axis};
use rand::Rng;

use crate::kernels::seeded_generator;
use crate::types::Image;

/// The axis whose lines are rotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollAxis {
    /// Each row is rotated along the width.
    Rows,
    /// Each column is rotated along the height.
    Columns,
}

/// Parameters of one roll family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollParams {
    pub axis: RollAxis,
    /// Maximum raw shift, as a percentage of the extent being rotated.
    pub percent: u32,
    /// Moving-average window.
    pub window: usize,
}

pub const HORIZONTAL: RollParams = RollParams {
    axis: RollAxis::Rows,
    percent: 10,
    window: 40,
};

pub const VERTICAL: RollParams = RollParams {
    axis: RollAxis::Columns,
    percent: 5,
    window: 13,
};

//==================================================================================
// 1. Private Core Logic
//==================================================================================

/// Moving average of `values` over `window`, `len - window + 1` entries long.
fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(values.len() + 1);
    cumulative.push(0.0);
    for v in values {
        let last = cumulative[cumulative.len() - 1];
        cumulative.push(last + v);
    }
    (window..cumulative.len())
        .map(|i| (cumulative[i] - cumulative[i - window]) / window as f64)
        .collect()
}

/// Reflect padding that mirrors around the edge samples without repeating
/// them, `[a b c] -> [c b | a b c | b a]`.
fn reflect_pad(values: &[f64], before: usize, after: usize) -> Vec<f64> {
    let n = values.len();
    if n <= 1 {
        return vec![values.first().copied().unwrap_or(0.0); before + n + after];
    }
    let period = 2 * (n - 1) as isize;
    (-(before as isize)..(n + after) as isize)
        .map(|i| {
            let m = i.rem_euclid(period) as usize;
            if m < n {
                values[m]
            } else {
                values[period as usize - m]
            }
        })
        .collect()
}

fn roll_line(mut line: ArrayViewMut2<'_, u16>, shift: i64) {
    let len = line.len_of(Axis(0));
    if len == 0 {
        return;
    }
    let shift = shift.rem_euclid(len as i64) as usize;
    if shift == 0 {
        return;
    }
    let source = line.to_owned();
    for k in 0..len {
        line.slice_mut(s![(k + shift) % len, ..])
            .assign(&source.slice(s![k, ..]));
    }
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Builds the non-negative shift for each line of a `(height, width)` grid
/// along `params.axis`, keyed by `seed_image`.
pub fn shift_sequence(params: RollParams, shape: (usize, usize), seed_image: &Image) -> Vec<i64> {
    let (height, width) = shape;
    let (length, extent) = match params.axis {
        RollAxis::Rows => (height, width),
        RollAxis::Columns => (width, height),
    };
    if length == 0 {
        return Vec::new();
    }

    let mut rng = seeded_generator(seed_image.samples());
    let scale = f64::from(params.percent) / 100.0 * extent as f64;
    let draws: Vec<f64> = (0..length).map(|_| rng.random::<f64>() * scale).collect();

    let window = params.window.min(length);
    let smoothed = if window > 1 {
        let half = window / 2;
        reflect_pad(&moving_average(&draws, window), half, half + 1)
    } else {
        draws
    };

    let truncated: Vec<i64> = smoothed.iter().map(|&v| v as i64).collect();
    let floor = truncated.iter().copied().min().unwrap_or(0);
    truncated
        .into_iter()
        .take(length)
        .map(|v| v - floor)
        .collect()
}

/// Rotates every line of `samples` along `axis` by the matching entry of
/// `shifts`: output index `(k + shift) mod n` receives input index `k`.
pub fn roll(samples: &Array3<u16>, axis: RollAxis, shifts: &[i64]) -> Array3<u16> {
    let mut rolled = samples.clone();
    let line_axis = match axis {
        RollAxis::Rows => Axis(0),
        RollAxis::Columns => Axis(1),
    };
    for (line, &shift) in rolled.axis_iter_mut(line_axis).zip(shifts) {
        roll_line(line, shift);
    }
    rolled
}

/// `shifts` with the sign flipped, undoing `roll` with the original shifts.
pub fn negated(shifts: &[i64]) -> Vec<i64> {
    shifts.iter().map(|s| -s).collect()
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
