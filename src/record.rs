// Transcription records: the persisted note built from cleaned text.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::MemoResult;

/// Preview length in characters before the ellipsis.
const PREVIEW_CHARS: usize = 30;

/// A saved voice memo. Immutable after creation except for deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptionRecord {
    /// Time-derived id (epoch milliseconds), practically monotonic within a
    /// session.
    pub id: String,
    /// Local timestamp formatted as `YYYY/MM/DD HH:MM`.
    pub date: String,
    /// First 30 characters of the text, with "..." when truncated.
    pub preview: String,
    pub full_text: String,
}

/// Build a record from cleaned text and a timestamp.
pub fn build_record(text: &str, now: DateTime<Local>) -> TranscriptionRecord {
    TranscriptionRecord {
        id: now.timestamp_millis().to_string(),
        date: now.format("%Y/%m/%d %H:%M").to_string(),
        preview: make_preview(text),
        full_text: text.to_string(),
    }
}

fn make_preview(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let mut preview: String = chars[..PREVIEW_CHARS].iter().collect();
        preview.push_str("...");
        preview
    }
}

/// Write the record's full text as a UTF-8 `.txt` named from its timestamp.
/// Returns the written path.
pub fn export_record(record: &TranscriptionRecord, dir: &Path) -> MemoResult<PathBuf> {
    // An id that is not a valid epoch-millis timestamp names the file as-is.
    let stamp = record
        .id
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<chrono::Utc>::from_timestamp_millis)
        .map(|utc| utc.with_timezone(&Local).format("%Y%m%d_%H%M").to_string())
        .unwrap_or_else(|| record.id.clone());

    let path = dir.join(format!("memo_{}.txt", stamp));
    std::fs::write(&path, &record.full_text)?;
    info!("Exported memo to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 25, 14, 30, 5).unwrap()
    }

    #[test]
    fn test_date_format() {
        let record = build_record("会議メモ", fixed_now());
        assert_eq!(record.date, "2026/08/25 14:30");
    }

    #[test]
    fn test_id_is_timestamp_millis() {
        let now = fixed_now();
        let record = build_record("memo", now);
        assert_eq!(record.id, now.timestamp_millis().to_string());
    }

    #[test]
    fn test_short_text_preview_untruncated() {
        let record = build_record("short note", fixed_now());
        assert_eq!(record.preview, "short note");
    }

    #[test]
    fn test_long_text_preview_truncated() {
        let text: String = std::iter::repeat('あ').take(45).collect();
        let record = build_record(&text, fixed_now());
        assert_eq!(record.preview.chars().count(), 33);
        assert!(record.preview.ends_with("..."));
        assert_eq!(record.full_text.chars().count(), 45);
    }

    #[test]
    fn test_exactly_thirty_chars_untruncated() {
        let text: String = std::iter::repeat('x').take(30).collect();
        let record = build_record(&text, fixed_now());
        assert_eq!(record.preview, text);
    }

    #[test]
    fn test_export_with_unparseable_id_uses_raw_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = build_record("メモ", fixed_now());
        record.id = "not-a-timestamp".to_string();

        let path = export_record(&record, dir.path()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "memo_not-a-timestamp.txt"
        );
    }

    #[test]
    fn test_export_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let record = build_record("エクスポート対象のメモ", fixed_now());
        let path = export_record(&record, dir.path()).unwrap();

        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("memo_20260825_1430"));
        assert!(name.ends_with(".txt"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "エクスポート対象のメモ"
        );
    }
}
