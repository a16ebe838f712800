// Audio buffer types.

use serde::{Deserialize, Serialize};

/// A decoded capture buffer: interleaved samples at an arbitrary rate with
/// one or more channels. Produced by the capture layer or a file decode.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Interleaved samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Frames = interleaved samples / channels.
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frame_count() as f64 / self.sample_rate as f64
        }
    }
}

/// A model-ready waveform: mono samples at a single known rate.
///
/// Consumed by the transcription capability immediately after creation and
/// discarded afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.samples.len() as f64 / self.sample_rate as f64
        }
    }

    /// Peak absolute amplitude.
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .fold(0.0f32, |max, &sample| max.max(sample.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_interleaved() {
        let buf = AudioBuffer::new(vec![0.0; 800], 8000, 2);
        assert_eq!(buf.frame_count(), 400);
        assert!((buf.duration_secs() - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_waveform_peak() {
        let wave = Waveform::new(vec![0.1, -0.6, 0.3], 16000);
        assert!((wave.peak() - 0.6).abs() < 1e-6);
    }
}
