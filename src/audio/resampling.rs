// Audio Processing - Downmix and Resampling
//
// Converts an arbitrary capture buffer (any rate, 1+ channels) into the
// canonical mono waveform the speech model expects. The high-quality sinc
// path is preferred; linear interpolation is the guaranteed fallback.

use anyhow::Result;
use log::{debug, warn};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::audio::buffer::{AudioBuffer, Waveform};
use crate::error::{MemoError, MemoResult};

/// Equal-weight downmix of interleaved channels to mono, before any rate
/// conversion.
pub fn downmix_to_mono(buffer: &AudioBuffer) -> Vec<f32> {
    let channels = buffer.channels.max(1) as usize;
    if channels == 1 {
        return buffer.samples.clone();
    }

    let mut mono_samples = Vec::with_capacity(buffer.samples.len() / channels);
    for frame in buffer.samples.chunks(channels) {
        let sum: f32 = frame.iter().sum();
        mono_samples.push(sum / frame.len() as f32);
    }
    mono_samples
}

/// Convert a capture buffer to a mono waveform at `target_rate`.
///
/// Already-mono input at the target rate is returned as a straight copy.
/// The sinc path failing falls back to linear interpolation; both failing
/// reports a decode error and no waveform is produced.
pub fn resample_to_mono(buffer: &AudioBuffer, target_rate: u32) -> MemoResult<Waveform> {
    if buffer.sample_rate == 0 || buffer.channels == 0 {
        return Err(MemoError::decode(format!(
            "invalid buffer: {} Hz, {} channels",
            buffer.sample_rate, buffer.channels
        )));
    }

    let mono = downmix_to_mono(buffer);

    if buffer.sample_rate == target_rate {
        return Ok(Waveform::new(mono, target_rate));
    }

    let samples = match resample_sinc(&mono, buffer.sample_rate, target_rate) {
        Ok(samples) => samples,
        Err(e) => {
            warn!(
                "Sinc resampling failed ({}), falling back to linear interpolation",
                e
            );
            resample_linear(&mono, buffer.sample_rate, target_rate)
        }
    };

    Ok(Waveform::new(samples, target_rate))
}

/// High-quality sinc resampling with adaptive parameters.
fn resample_sinc(input: &[f32], from_sample_rate: u32, to_sample_rate: u32) -> Result<Vec<f32>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let ratio = to_sample_rate as f64 / from_sample_rate as f64;

    let (sinc_len, interpolation_type, oversampling) = if ratio >= 2.0 {
        (512, SincInterpolationType::Cubic, 512)
    } else if ratio >= 1.5 {
        (384, SincInterpolationType::Cubic, 384)
    } else if ratio > 1.0 {
        (256, SincInterpolationType::Linear, 256)
    } else if ratio <= 0.5 {
        (512, SincInterpolationType::Cubic, 512)
    } else {
        (384, SincInterpolationType::Linear, 384)
    };

    debug!(
        "Resampling {}Hz -> {}Hz (ratio {:.3}, sinc_len {})",
        from_sample_rate, to_sample_rate, ratio, sinc_len
    );

    let params = SincInterpolationParameters {
        sinc_len,
        f_cutoff: 0.95,
        interpolation: interpolation_type,
        oversampling_factor: oversampling,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, input.len(), 1)?;

    let waves_in = vec![input.to_vec()];
    let waves_out = resampler.process(&waves_in, None)?;

    waves_out
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("resampler produced no output channel"))
}

/// Linear-interpolation fallback.
///
/// Output index `i` reads source position `s = i * from/to`, blending the two
/// neighboring samples; output length is `round(len * to/from)`.
pub fn resample_linear(input: &[f32], from_sample_rate: u32, to_sample_rate: u32) -> Vec<f32> {
    if input.is_empty() || from_sample_rate == to_sample_rate {
        return input.to_vec();
    }

    let out_len = (input.len() as f64 * to_sample_rate as f64 / from_sample_rate as f64).round()
        as usize;
    let step = from_sample_rate as f64 / to_sample_rate as f64;

    let mut output = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let s = i as f64 * step;
        let idx = s.floor() as usize;
        let frac = (s - s.floor()) as f32;

        let a = input[idx.min(input.len() - 1)];
        let b = input[(idx + 1).min(input.len() - 1)];
        output.push(a * (1.0 - frac) + b * frac);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_at_target_rate_is_identity() {
        let samples: Vec<f32> = (0..1600).map(|i| (i as f32 * 0.01).sin() * 0.5).collect();
        let buf = AudioBuffer::new(samples.clone(), 16000, 1);
        let wave = resample_to_mono(&buf, 16000).unwrap();
        assert_eq!(wave.sample_rate, 16000);
        assert_eq!(wave.samples, samples);
    }

    #[test]
    fn test_downmix_is_arithmetic_mean() {
        // L = [0.2, 0.4], R = [0.6, 0.0]
        let buf = AudioBuffer::new(vec![0.2, 0.6, 0.4, 0.0], 16000, 2);
        let mono = downmix_to_mono(&buf);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.4).abs() < 1e-6);
        assert!((mono[1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_linear_output_length() {
        let input = vec![0.0f32; 44100]; // 1 second
        let output = resample_linear(&input, 44100, 16000);
        assert_eq!(output.len(), 16000);
    }

    #[test]
    fn test_linear_interpolates_between_neighbors() {
        // Halving the rate reads every second source position exactly.
        let input = vec![0.0, 1.0, 0.0, 1.0];
        let output = resample_linear(&input, 8000, 4000);
        assert_eq!(output.len(), 2);
        assert!((output[0] - 0.0).abs() < 1e-6);
        assert!((output[1] - 0.0).abs() < 1e-6);

        // Doubling interpolates midpoints.
        let output = resample_linear(&[0.0, 1.0], 4000, 8000);
        assert_eq!(output.len(), 4);
        assert!((output[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_last_sample_clamped() {
        let output = resample_linear(&[0.0, 1.0], 4000, 8000);
        // Positions past the final source sample clamp to it.
        assert!((output[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_resample_stereo_to_mono_target() {
        let samples: Vec<f32> = (0..8820).map(|i| (i as f32 * 0.02).sin() * 0.3).collect();
        let buf = AudioBuffer::new(samples, 44100, 2);
        let wave = resample_to_mono(&buf, 16000).unwrap();
        assert_eq!(wave.sample_rate, 16000);
        assert!(!wave.samples.is_empty());
    }

    #[test]
    fn test_zero_rate_buffer_rejected() {
        let buf = AudioBuffer::new(vec![0.0; 100], 0, 1);
        assert!(resample_to_mono(&buf, 16000).is_err());
    }
}
