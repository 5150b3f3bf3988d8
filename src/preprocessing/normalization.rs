//! Window standardization
//!
//! Rescales a captured window to zero mean and unit (population) standard
//! deviation before it is handed to the spectrogram generator.

/// Mean and standard deviation measured over a window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Arithmetic mean
    pub mean: f32,
    /// Population standard deviation (divides by `n`)
    pub std_dev: f32,
}

/// Compute mean and population standard deviation
///
/// Sums are accumulated in `f64`. Returns `None` for an empty slice.
pub fn window_stats(samples: &[f32]) -> Option<WindowStats> {
    let (mean, std_dev) = moments(samples)?;
    Some(WindowStats {
        mean: mean as f32,
        std_dev: std_dev as f32,
    })
}

fn moments(samples: &[f32]) -> Option<(f64, f64)> {
    if samples.is_empty() {
        return None;
    }

    let n = samples.len() as f64;
    let mean = samples.iter().map(|&x| f64::from(x)).sum::<f64>() / n;
    let sq_sum: f64 = samples
        .iter()
        .map(|&x| {
            let d = f64::from(x) - mean;
            d * d
        })
        .sum();

    Some((mean, (sq_sum / n).sqrt()))
}

/// Largest standard deviation still treated as zero variance
///
/// Rounding in the mean can leave a constant window with a tiny non-zero
/// spread; anything at that scale is not signal.
fn zero_variance_tolerance(mean: f64, n: usize) -> f64 {
    f64::EPSILON * mean.abs().max(1.0) * (n as f64).sqrt()
}

/// Standardize samples in place to zero mean and unit standard deviation
///
/// A constant window has zero variance and cannot be scaled; it is set to
/// all zeros (its mean-centered value) and a warning is logged. The output
/// never contains NaN or infinity produced by this step.
///
/// # Returns
///
/// The statistics measured before rescaling, `None` for an empty slice.
pub fn standardize(samples: &mut [f32]) -> Option<WindowStats> {
    let (mean, std_dev) = moments(samples)?;
    let stats = WindowStats {
        mean: mean as f32,
        std_dev: std_dev as f32,
    };

    if !std_dev.is_finite() || std_dev <= zero_variance_tolerance(mean, samples.len()) {
        log::warn!(
            "Window has zero or non-finite variance (mean={}, std={}), returning zeros",
            mean,
            std_dev
        );
        samples.iter_mut().for_each(|x| *x = 0.0);
        return Some(stats);
    }

    for sample in samples.iter_mut() {
        *sample = ((f64::from(*sample) - mean) / std_dev) as f32;
    }

    Some(stats)
}
