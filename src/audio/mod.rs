// Audio Module
//
// Split into focused files:
// - buffer.rs: capture buffer and mono waveform types
// - decode.rs: WAV decode/encode
// - resampling.rs: downmix + sample rate conversion
// - normalizer.rs: amplitude normalization and the RMS silence gate

pub mod buffer;
pub mod decode;
pub mod normalizer;
pub mod resampling;

pub use buffer::{AudioBuffer, Waveform};
pub use decode::{decode_wav_bytes, decode_wav_file, encode_wav_bytes};
pub use normalizer::{gate_silence, normalize, rms};
pub use resampling::{downmix_to_mono, resample_linear, resample_to_mono};
