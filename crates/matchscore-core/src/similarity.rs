use crate::error::{Error, Result};

const MIN_NORM: f64 = 1e-12;

/// Cosine of the angle between `a` and `b`, clamped to `[-1, 1]`.
///
/// Sums run in `f64` so identical inputs land on 1.0 instead of drifting by an
/// ulp or two. A zero-length, zero-norm or non-finite vector is an error,
/// never NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch { left: a.len(), right: b.len() });
    }
    if a.is_empty() {
        return Err(Error::DegenerateInput("embedding has no components".into()));
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if !(dot.is_finite() && norm_a.is_finite() && norm_b.is_finite()) {
        return Err(Error::Embedding("embedding has non-finite components".into()));
    }
    let (norm_a, norm_b) = (norm_a.sqrt(), norm_b.sqrt());
    if norm_a < MIN_NORM || norm_b < MIN_NORM {
        return Err(Error::DegenerateInput("embedding has zero norm".into()));
    }

    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32)
}
