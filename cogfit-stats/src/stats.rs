//! Fit statistics over paired model/reference sequences.
//!
//! Degenerate input (empty, length mismatch, a single point, zero variance)
//! yields 0 rather than an error, so one sparse cell never aborts a batch.
//! The 2-D variants are the exception: a shape mismatch there is a bug in
//! the task definition and is reported as [`StatsError`].

use crate::error::{Shape, StatsError};

pub fn sum(xs: &[f64]) -> f64 {
    xs.iter().sum()
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    sum(xs) / xs.len() as f64
}

/// Largest element; `NEG_INFINITY` for an empty slice.
pub fn max(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Smallest element; `INFINITY` for an empty slice.
pub fn min(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Sample standard deviation (`n - 1` denominator); 0 for an empty slice.
///
/// A single element divides by zero and yields NaN. Callers that may hold a
/// single observation must guard for it.
pub fn stddev(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (xs.len() - 1) as f64).sqrt()
}

/// Square root of [`stddev`].
///
/// This is not the standard error of the mean. Confidence widths in existing
/// reports were produced with this definition and stay comparable only while
/// it is kept as is.
pub fn stderr(xs: &[f64]) -> f64 {
    stddev(xs).sqrt()
}

/// Half-width of the 95% interval built on [`stderr`].
pub fn confidence_width(xs: &[f64]) -> f64 {
    1.96 * stderr(xs)
}

fn paired(xs: &[f64], ys: &[f64]) -> bool {
    xs.len() == ys.len() && xs.len() > 1
}

/// Pearson correlation. 0 when the lengths differ, when there are fewer than
/// two points, or when either side is constant.
pub fn correlation(xs: &[f64], ys: &[f64]) -> f64 {
    if !paired(xs, ys) {
        return 0.0;
    }
    let mx = mean(xs);
    let my = mean(ys);
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return 0.0;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Root-mean-square error, 0 under the same conditions as [`correlation`]
/// rejects its input.
pub fn rmse(xs: &[f64], ys: &[f64]) -> f64 {
    if !paired(xs, ys) {
        return 0.0;
    }
    let ss: f64 = xs.iter().zip(ys).map(|(x, y)| (x - y).powi(2)).sum();
    (ss / xs.len() as f64).sqrt()
}

/// RMSE scaled by the largest reference value.
///
/// A reference whose maximum is 0 divides by zero; the result is then
/// infinite or NaN and shows up as such in the report.
pub fn normalized_error(model: &[f64], human: &[f64]) -> f64 {
    (rmse(model, human) / max(human)).abs()
}

/// Row count and column count, failing on ragged rows.
pub fn shape<R: AsRef<[f64]>>(rows: &[R]) -> Result<Shape, StatsError> {
    let expected = rows.first().map_or(0, |r| r.as_ref().len());
    for (row, r) in rows.iter().enumerate() {
        let found = r.as_ref().len();
        if found != expected {
            return Err(StatsError::Ragged {
                row,
                expected,
                found,
            });
        }
    }
    Ok((rows.len(), expected))
}

/// Row-major flatten of a rectangular 2-D array.
pub fn flatten<R: AsRef<[f64]>>(rows: &[R]) -> Result<Vec<f64>, StatsError> {
    let (r, c) = shape(rows)?;
    let mut out = Vec::with_capacity(r * c);
    for row in rows {
        out.extend_from_slice(row.as_ref());
    }
    Ok(out)
}

/// Flattens both operands, requiring identical shapes.
pub fn flatten_pair<R, S>(xs: &[R], ys: &[S]) -> Result<(Vec<f64>, Vec<f64>), StatsError>
where
    R: AsRef<[f64]>,
    S: AsRef<[f64]>,
{
    let left = shape(xs)?;
    let right = shape(ys)?;
    if left != right {
        return Err(StatsError::ShapeMismatch { left, right });
    }
    Ok((flatten(xs)?, flatten(ys)?))
}

pub fn correlation_2d<R, S>(xs: &[R], ys: &[S]) -> Result<f64, StatsError>
where
    R: AsRef<[f64]>,
    S: AsRef<[f64]>,
{
    let (x, y) = flatten_pair(xs, ys)?;
    Ok(correlation(&x, &y))
}

pub fn rmse_2d<R, S>(xs: &[R], ys: &[S]) -> Result<f64, StatsError>
where
    R: AsRef<[f64]>,
    S: AsRef<[f64]>,
{
    let (x, y) = flatten_pair(xs, ys)?;
    Ok(rmse(&x, &y))
}

pub fn normalized_error_2d<R, S>(model: &[R], human: &[S]) -> Result<f64, StatsError>
where
    R: AsRef<[f64]>,
    S: AsRef<[f64]>,
{
    let (m, h) = flatten_pair(model, human)?;
    Ok(normalized_error(&m, &h))
}
