// Pipeline configuration.
//
// The blacklist and decode preset deliberately live here as data: observed
// variants of this pipeline ship different phrase lists and decoding
// parameters, so both are swappable per deployment rather than hardcoded.

use serde::{Deserialize, Serialize};

/// Canonical sample rate expected by speech models.
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Configuration for the audio + text pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Sample rate every waveform is converted to before transcription.
    pub target_sample_rate: u32,

    /// RMS below this is treated as silence and never transcribed.
    pub silence_rms_threshold: f32,

    /// Cleaned text shorter than this many characters is rejected.
    pub min_text_chars: usize,

    /// Preferred transcription language (None = auto-detect).
    pub language: Option<String>,

    /// Known hallucination phrases; any sentence containing one is dropped.
    pub blacklist_phrases: Vec<String>,

    /// Single backchannel words rejected when they are the entire transcript.
    pub backchannel_words: Vec<String>,

    /// Decoding parameters handed to local transcription engines.
    pub decode: DecodePreset,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: TARGET_SAMPLE_RATE,
            silence_rms_threshold: 0.001,
            min_text_chars: 3,
            language: None,
            blacklist_phrases: default_blacklist(),
            backchannel_words: default_backchannels(),
            decode: DecodePreset::default(),
        }
    }
}

/// Decode parameters chosen to suppress hallucinated loops on silence/noise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodePreset {
    pub temperature: f32,
    pub entropy_threshold: f32,
    pub no_speech_threshold: f32,
    pub max_text_tokens: u32,
    pub suppress_blank: bool,
    pub suppress_non_speech_tokens: bool,
}

impl Default for DecodePreset {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            entropy_threshold: 2.4,
            no_speech_threshold: 0.55,
            max_text_tokens: 224,
            suppress_blank: true,
            suppress_non_speech_tokens: true,
        }
    }
}

/// Subtitle/credit boilerplate and filler closings known to appear on
/// silent or noisy input.
fn default_blacklist() -> Vec<String> {
    [
        // Japanese subtitle/credit boilerplate
        "ご視聴ありがとうございました",
        "ご視聴ありがとうございます",
        "チャンネル登録",
        "最後までご覧いただき",
        "字幕は",
        // English equivalents
        "thanks for watching",
        "thank you for watching",
        "please subscribe",
        "like and subscribe",
        "subtitles by",
        "subs by",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_backchannels() -> Vec<String> {
    [
        "yeah", "uh-huh", "um", "uh", "hmm", "mm-hmm", "はい", "うん", "ええ", "あー", "えー",
        "えっと", "えーと", "あの",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.target_sample_rate, 16000);
        assert!(config.silence_rms_threshold > 0.0);
        assert_eq!(config.min_text_chars, 3);
        assert!(!config.blacklist_phrases.is_empty());
    }

    #[test]
    fn test_decode_preset_suppresses_loops() {
        let preset = DecodePreset::default();
        assert_eq!(preset.temperature, 0.0);
        assert!(preset.suppress_non_speech_tokens);
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.blacklist_phrases, config.blacklist_phrases);
        assert_eq!(back.decode.no_speech_threshold, config.decode.no_speech_threshold);
    }
}
