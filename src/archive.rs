/// Module `archive` - flat-file audit log of published characters.
///
/// Append-only; one record per successful cycle, delimited by `---`.
/// The pipeline never re-reads the archive, only the dashboard volume
/// listing does, by splitting on the same delimiter.
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub const RECORD_DELIMITER: &str = "\n---\n";

#[derive(Debug, Clone)]
pub struct PostRecord {
    pub timestamp: DateTime<Local>,
    pub text: String,
    pub post_id: Option<String>,
    pub drive_link: Option<String>,
}

impl PostRecord {
    fn header(&self) -> String {
        format!(
            "[{}] post={} drive={}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.post_id.as_deref().unwrap_or("-"),
            self.drive_link.as_deref().unwrap_or("-"),
        )
    }
}

/// Append one record. Creates the file on first use.
pub fn append(path: &Path, record: &PostRecord) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    write!(
        file,
        "{}\n{}{}",
        record.header(),
        record.text.trim(),
        RECORD_DELIMITER
    )?;
    Ok(())
}

/// Last `n` archived entries in file order, oldest first. A missing
/// archive is an empty volume, not an error.
pub fn read_recent(path: &Path, n: usize) -> Vec<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };

    let entries: Vec<String> = content
        .split(RECORD_DELIMITER)
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect();

    let skip = entries.len().saturating_sub(n);
    entries.into_iter().skip(skip).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str, post_id: Option<&str>) -> PostRecord {
        PostRecord {
            timestamp: Local::now(),
            text: text.to_string(),
            post_id: post_id.map(str::to_string),
            drive_link: None,
        }
    }

    #[test]
    fn append_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.txt");

        append(&path, &record("Name: Dorn\nRace & Class: Dwarf Cleric", Some("123"))).unwrap();
        append(&path, &record("Name: Elowen", None)).unwrap();

        let entries = read_recent(&path, 10);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].contains("post=123"));
        assert!(entries[0].contains("Race & Class: Dwarf Cleric"));
        assert!(entries[1].contains("post=-"));
        assert!(entries[1].contains("Name: Elowen"));
    }

    #[test]
    fn read_recent_returns_last_n() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.txt");

        for i in 0..5 {
            append(&path, &record(&format!("NPC {}", i), None)).unwrap();
        }

        let entries = read_recent(&path, 2);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].contains("NPC 3"));
        assert!(entries[1].contains("NPC 4"));
    }

    #[test]
    fn missing_archive_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_recent(&dir.path().join("nope.txt"), 3).is_empty());
    }
}
