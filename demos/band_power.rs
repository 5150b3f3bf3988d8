//! Band-power spectrogram generator shared by the demo and integration tests
//!
//! A centered STFT (zero padding of half a frame at each end, Hann window)
//! whose power bins are summed into equal-width bands. Frame count is
//! `1 + len / hop`, so 32000 samples at hop 128 give 251 frames.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use spectral_sentinel::{MonitorError, SpectralMatrix, SpectrogramGenerator, SpectrogramParams};
use std::sync::Arc;

/// Centered STFT power spectrogram pooled into equal-width bands
pub struct BandPowerSpectrogram {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    frame: Vec<Complex<f32>>,
}

impl BandPowerSpectrogram {
    /// Plan an FFT of `fft_size` points
    pub fn new(fft_size: usize) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(fft_size);
        let window = (0..fft_size)
            .map(|i| {
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / fft_size as f32).cos())
            })
            .collect();
        Self {
            fft,
            window,
            frame: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }
}

impl SpectrogramGenerator for BandPowerSpectrogram {
    fn generate(
        &mut self,
        samples: &[f32],
        params: &SpectrogramParams,
    ) -> Result<SpectralMatrix, MonitorError> {
        if params.fft_size != self.window.len() {
            return Err(MonitorError::Generator(format!(
                "Planned for FFT size {}, asked for {}",
                self.window.len(),
                params.fft_size
            )));
        }

        let n_fft = params.fft_size;
        let bins = n_fft / 2 + 1;
        let frames = 1 + samples.len() / params.hop_length;
        let pad = (n_fft / 2) as isize;
        let mut grid = vec![0.0f32; params.n_bands * frames];

        for t in 0..frames {
            let start = (t * params.hop_length) as isize - pad;
            for (i, slot) in self.frame.iter_mut().enumerate() {
                let idx = start + i as isize;
                let sample = usize::try_from(idx)
                    .ok()
                    .and_then(|idx| samples.get(idx))
                    .copied()
                    .unwrap_or(0.0);
                *slot = Complex::new(sample * self.window[i], 0.0);
            }
            self.fft.process(&mut self.frame);

            for (bin, value) in self.frame.iter().take(bins).enumerate() {
                let band = (bin * params.n_bands / bins).min(params.n_bands - 1);
                grid[band * frames + t] += value.norm_sqr();
            }
        }

        SpectralMatrix::new(params.n_bands, frames, grid)
    }
}
