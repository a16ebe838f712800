// Audio Processing - Amplitude Normalization and Silence Gate

use log::debug;

use crate::audio::buffer::Waveform;
use crate::error::{MemoError, MemoResult};

/// Peak below this is treated as silence and left untouched; the RMS gate
/// rejects it afterwards.
const SILENCE_PEAK_FLOOR: f32 = 0.001;

/// Peak target after scaling, leaving headroom against clipping.
const PEAK_TARGET: f32 = 0.95;

/// Scale the waveform so its peak lands at 0.95.
///
/// Already well-scaled audio (peak in [0.1, 1.0]) and near-silent audio are
/// returned unchanged.
pub fn normalize(mut waveform: Waveform) -> Waveform {
    let peak = waveform.peak();

    if (0.1..=1.0).contains(&peak) || peak < SILENCE_PEAK_FLOOR {
        return waveform;
    }

    let scale = PEAK_TARGET / peak;
    debug!("Normalizing waveform: peak {:.4} -> {:.2}", peak, PEAK_TARGET);
    for sample in &mut waveform.samples {
        *sample *= scale;
    }
    waveform
}

/// Root-mean-square signal energy, the cheap silence detector.
pub fn rms(waveform: &Waveform) -> f32 {
    if waveform.samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = waveform.samples.iter().map(|&x| x * x).sum();
    (sum_sq / waveform.samples.len() as f32).sqrt()
}

/// Reject waveforms with negligible energy before paying for transcription.
///
/// Runs strictly after normalization. The caller must not invoke the
/// transcription capability when this returns `SilentAudio`.
pub fn gate_silence(waveform: &Waveform, threshold: f32) -> MemoResult<()> {
    let energy = rms(waveform);
    if energy < threshold {
        debug!("Silence gate tripped: rms {:.6} < {:.6}", energy, threshold);
        return Err(MemoError::SilentAudio {
            rms: energy,
            threshold,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(amplitude: f32, len: usize) -> Waveform {
        let samples = (0..len)
            .map(|i| (i as f32 * 0.1).sin() * amplitude)
            .collect();
        Waveform::new(samples, 16000)
    }

    #[test]
    fn test_quiet_audio_scaled_to_peak_target() {
        let wave = normalize(sine(0.02, 1600));
        let peak = wave.peak();
        assert!(peak <= PEAK_TARGET + 1e-4, "peak {} exceeds target", peak);
        assert!(peak > PEAK_TARGET - 0.01, "peak {} not boosted", peak);
    }

    #[test]
    fn test_well_scaled_audio_untouched() {
        let original = sine(0.5, 1600);
        let wave = normalize(original.clone());
        assert_eq!(wave.samples, original.samples);
    }

    #[test]
    fn test_near_silence_untouched() {
        let original = sine(0.0001, 1600);
        let wave = normalize(original.clone());
        assert_eq!(wave.samples, original.samples);
    }

    #[test]
    fn test_clipping_input_scaled_down() {
        let wave = normalize(sine(1.8, 1600));
        assert!(wave.peak() <= PEAK_TARGET + 1e-4);
    }

    #[test]
    fn test_rms_of_zeros_is_zero() {
        let wave = Waveform::new(vec![0.0; 32000], 16000);
        assert_eq!(rms(&wave), 0.0);
    }

    #[test]
    fn test_silence_gate_rejects_zeros() {
        let wave = Waveform::new(vec![0.0; 32000], 16000);
        let err = gate_silence(&wave, 0.001).unwrap_err();
        assert!(matches!(err, MemoError::SilentAudio { .. }));
        assert!(err.is_soft_rejection());
    }

    #[test]
    fn test_silence_gate_passes_speech_level_audio() {
        let wave = sine(0.5, 32000);
        assert!(gate_silence(&wave, 0.001).is_ok());
    }
}
