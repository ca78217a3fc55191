use crate::domain::model::RelocationEntry;
use crate::utils::error::{Result, ZooError};

const HEADER: [&str; 7] = [
    "created_at",
    "animal_id",
    "animal",
    "from",
    "to",
    "notes",
    "id",
];

/// 將歷史紀錄輸出成 CSV
pub fn history_to_csv(entries: &[RelocationEntry]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for entry in entries {
        writer
            .write_record([
                entry.record.created_at.to_rfc3339().as_str(),
                entry.record.animal_id.as_str(),
                entry.animal_label(),
                entry.from_label(),
                entry.to_label(),
                entry.record.notes.as_deref().unwrap_or(""),
                entry.record.id.as_str(),
            ])?;
    }

    let bytes = writer.into_inner().map_err(|e| ZooError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| ZooError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Fixed-width rows for the terminal.
pub fn history_to_table(entries: &[RelocationEntry]) -> String {
    let mut lines = vec![format!(
        "{:<20} {:<20} {:<18} {:<18} {}",
        "WHEN", "ANIMAL", "FROM", "TO", "NOTES"
    )];

    for entry in entries {
        lines.push(format!(
            "{:<20} {:<20} {:<18} {:<18} {}",
            entry.record.created_at.format("%Y-%m-%d %H:%M"),
            entry.animal_label(),
            entry.from_label(),
            entry.to_label(),
            entry.record.notes.as_deref().unwrap_or("")
        ));
    }

    lines.join("\n")
}
