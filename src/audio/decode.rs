// Audio Processing - WAV Decode/Encode
//
// File uploads arrive as WAV; the remote capability also wants WAV bytes in
// its multipart body. Both directions go through hound.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use log::debug;

use crate::audio::buffer::{AudioBuffer, Waveform};
use crate::error::{MemoError, MemoResult};

/// Decode a WAV file into an interleaved capture buffer.
pub fn decode_wav_file(path: &Path) -> MemoResult<AudioBuffer> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| MemoError::decode(format!("cannot open {}: {}", path.display(), e)))?;
    decode_reader(reader)
}

/// Decode WAV bytes already in memory.
pub fn decode_wav_bytes(bytes: &[u8]) -> MemoResult<AudioBuffer> {
    let reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| MemoError::decode(format!("invalid wav data: {}", e)))?;
    decode_reader(reader)
}

fn decode_reader<R: std::io::Read>(mut reader: hound::WavReader<R>) -> MemoResult<AudioBuffer> {
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| MemoError::decode(format!("wav read failed: {}", e)))?,
        (SampleFormat::Int, bits) => {
            let max = (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<Result<_, _>>()
                .map_err(|e| MemoError::decode(format!("wav read failed: {}", e)))?
        }
        (format, bits) => {
            return Err(MemoError::decode(format!(
                "unsupported wav format: {:?} {} bits",
                format, bits
            )));
        }
    };

    debug!(
        "Decoded wav: {} samples, {} Hz, {} channels",
        samples.len(),
        spec.sample_rate,
        spec.channels
    );

    Ok(AudioBuffer::new(samples, spec.sample_rate, spec.channels))
}

/// Encode a mono waveform as 16-bit PCM WAV bytes.
pub fn encode_wav_bytes(waveform: &Waveform) -> MemoResult<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)
            .map_err(|e| MemoError::decode(format!("wav encode failed: {}", e)))?;
        for &sample in &waveform.samples {
            let clamped = sample.clamp(-1.0, 1.0);
            writer
                .write_sample((clamped * i16::MAX as f32) as i16)
                .map_err(|e| MemoError::decode(format!("wav encode failed: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| MemoError::decode(format!("wav encode failed: {}", e)))?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_then_decode_preserves_shape() {
        let wave = Waveform::new(vec![0.0, 0.5, -0.5, 0.25], 16000);
        let bytes = encode_wav_bytes(&wave).unwrap();
        let buf = decode_wav_bytes(&bytes).unwrap();
        assert_eq!(buf.sample_rate, 16000);
        assert_eq!(buf.channels, 1);
        assert_eq!(buf.samples.len(), 4);
        assert!((buf.samples[1] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_garbage_bytes_report_decode_error() {
        let err = decode_wav_bytes(b"definitely not a wav file").unwrap_err();
        assert!(matches!(err, MemoError::Decode { .. }));
    }
}
