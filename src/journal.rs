use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::path::Path;
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::api::{SubmissionId, SubmissionStatus};
use crate::app_dirs::AppDirs;

/// One submission as remembered locally.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub submission_id: String,
    pub problem_id: String,
    pub language: String,
    pub submitted_at: DateTime<Utc>,
    pub status: Option<String>,
    pub time: Option<f64>,
    pub memory: Option<f64>,
}

/// Local record of submissions and their verdicts
#[derive(Debug)]
pub struct SubmissionJournal {
    conn: Connection,
}

impl SubmissionJournal {
    /// Open the journal under the state directory, creating it if needed
    pub fn open_default() -> Result<Self> {
        let path = AppDirs::journal_path()
            .unwrap_or_else(|| std::path::PathBuf::from("judgeterm_submissions.db"));
        Self::open(&path)
    }

    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS submissions (
                submission_id TEXT PRIMARY KEY,
                problem_id TEXT NOT NULL,
                language TEXT NOT NULL,
                submitted_at TEXT NOT NULL,
                status TEXT,
                time REAL,
                memory REAL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_submissions_submitted_at ON submissions(submitted_at)",
            [],
        )?;

        Ok(SubmissionJournal { conn })
    }

    /// `submitted_at` is stored as fixed-width UTC text so it sorts by instant.
    pub fn record_submission<Tz: TimeZone>(
        &self,
        id: &SubmissionId,
        problem_id: &str,
        language: &str,
        at: DateTime<Tz>,
    ) -> Result<()> {
        let at = at
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Micros, true);
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO submissions (submission_id, problem_id, language, submitted_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![id.0, problem_id, language, at],
        )?;
        Ok(())
    }

    /// Store the terminal verdict. Returns false if the id was never recorded.
    pub fn record_verdict(&self, id: &SubmissionId, status: &SubmissionStatus) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE submissions SET status = ?2, time = ?3, memory = ?4 WHERE submission_id = ?1",
            params![id.0, status.status.description, status.time, status.memory],
        )?;
        Ok(updated > 0)
    }

    pub fn get(&self, id: &SubmissionId) -> Result<Option<JournalEntry>> {
        self.conn
            .query_row(
                r#"
                SELECT submission_id, problem_id, language, submitted_at, status, time, memory
                FROM submissions WHERE submission_id = ?1
                "#,
                [&id.0],
                Self::row_to_entry,
            )
            .optional()
    }

    /// Most recent submissions first
    pub fn recent(&self, limit: usize) -> Result<Vec<JournalEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT submission_id, problem_id, language, submitted_at, status, time, memory
            FROM submissions
            ORDER BY submitted_at DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], Self::row_to_entry)?;
        rows.collect()
    }

    fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<JournalEntry> {
        let submitted_at: String = row.get(3)?;
        let submitted_at = DateTime::parse_from_rfc3339(&submitted_at)
            .map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    3,
                    "submitted_at".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?
            .with_timezone(&Utc);

        Ok(JournalEntry {
            submission_id: row.get(0)?,
            problem_id: row.get(1)?,
            language: row.get(2)?,
            submitted_at,
            status: row.get(4)?,
            time: row.get(5)?,
            memory: row.get(6)?,
        })
    }
}

/// One line of `history` output.
pub fn format_entry(entry: &JournalEntry, now: DateTime<Utc>) -> String {
    let age = (now - entry.submitted_at).to_std().unwrap_or_default();
    let age = HumanTime::from(age).to_text_en(Accuracy::Rough, Tense::Past);
    let number = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_else(|| "N/A".into());
    format!(
        "{:<38} {:<16} {:<10} {:<22} time {:<8} mem {:<8} {}",
        entry.submission_id,
        entry.problem_id,
        entry.language,
        entry.status.as_deref().unwrap_or("(no verdict)"),
        number(entry.time),
        number(entry.memory),
        age
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::scripted::status;
    use chrono::{Duration, FixedOffset, Local};

    #[test]
    fn submission_then_verdict() {
        let journal = SubmissionJournal::in_memory().unwrap();
        let id = SubmissionId::from("abc");
        journal
            .record_submission(&id, "two-sum", "python", Local::now())
            .unwrap();

        let entry = journal.get(&id).unwrap().unwrap();
        assert_eq!(entry.status, None);

        let mut s = status(3, "Accepted");
        s.time = Some(0.02);
        s.memory = Some(2048.0);
        assert!(journal.record_verdict(&id, &s).unwrap());

        let entry = journal.get(&id).unwrap().unwrap();
        assert_eq!(entry.status.as_deref(), Some("Accepted"));
        assert_eq!(entry.time, Some(0.02));
        assert_eq!(entry.memory, Some(2048.0));
    }

    #[test]
    fn verdict_for_unknown_id_is_reported() {
        let journal = SubmissionJournal::in_memory().unwrap();
        let updated = journal
            .record_verdict(&"missing".into(), &status(4, "Wrong Answer"))
            .unwrap();
        assert!(!updated);
    }

    #[test]
    fn recent_is_newest_first_and_limited() {
        let journal = SubmissionJournal::in_memory().unwrap();
        let base = Local::now();
        for i in 0..5 {
            journal
                .record_submission(
                    &SubmissionId(format!("s{i}")),
                    "p",
                    "c",
                    base + Duration::seconds(i),
                )
                .unwrap();
        }
        let recent = journal.recent(3).unwrap();
        let ids: Vec<&str> = recent.iter().map(|e| e.submission_id.as_str()).collect();
        assert_eq!(ids, vec!["s4", "s3", "s2"]);
    }

    #[test]
    fn recent_orders_by_instant_across_offsets() {
        let journal = SubmissionJournal::in_memory().unwrap();
        let india = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();

        // 10:00+05:30 is 04:30Z, before 06:00Z despite the larger local clock.
        let earlier = india.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap();
        let later = utc.with_ymd_and_hms(2024, 3, 10, 6, 0, 0).unwrap();
        journal
            .record_submission(&"earlier".into(), "p", "c", earlier)
            .unwrap();
        journal
            .record_submission(&"later".into(), "p", "c", later)
            .unwrap();

        let recent = journal.recent(10).unwrap();
        let ids: Vec<&str> = recent.iter().map(|e| e.submission_id.as_str()).collect();
        assert_eq!(ids, vec!["later", "earlier"]);
        assert_eq!(recent[1].submitted_at, earlier.with_timezone(&Utc));
    }

    #[test]
    fn journal_persists_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("submissions.db");
        {
            let journal = SubmissionJournal::open(&path).unwrap();
            journal
                .record_submission(&"x".into(), "p", "java", Local::now())
                .unwrap();
        }
        let journal = SubmissionJournal::open(&path).unwrap();
        assert_eq!(journal.recent(10).unwrap().len(), 1);
    }

    #[test]
    fn formatted_entry_mentions_verdict_and_problem() {
        let now = Utc::now();
        let entry = JournalEntry {
            submission_id: "id-1".into(),
            problem_id: "two-sum".into(),
            language: "python".into(),
            submitted_at: now - Duration::minutes(5),
            status: None,
            time: None,
            memory: Some(512.0),
        };
        let line = format_entry(&entry, now);
        assert!(line.contains("two-sum"));
        assert!(line.contains("(no verdict)"));
        assert!(line.contains("N/A"));
        assert!(line.contains("512"));
    }
}
