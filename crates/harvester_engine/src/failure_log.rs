use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use harvester_core::Failure;

const TIME_FORMAT: &str = "%I:%M%p %B %d, %Y";

/// Append-only, human-readable record of failed attempts, one line each.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, failure: &Failure) -> io::Result<()> {
        self.append_at(&Local::now(), &failure.to_string())
    }

    pub fn append_at<Tz: TimeZone>(&self, when: &DateTime<Tz>, message: &str) -> io::Result<()>
    where
        Tz::Offset: std::fmt::Display,
    {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format_entry(when, message).as_bytes())?;
        file.flush()
    }
}

/// `<local time> :\t<message>\n`, with line breaks in the message flattened.
pub fn format_entry<Tz: TimeZone>(when: &DateTime<Tz>, message: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let message = message.replace(['\r', '\n'], " ");
    format!("{} :\t{}\n", when.format(TIME_FORMAT), message)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{format_entry, FailureLog};

    #[test]
    fn entry_matches_log_line_format() {
        let when = Utc.with_ymd_and_hms(2024, 3, 7, 14, 5, 0).unwrap();
        assert_eq!(
            format_entry(&when, "search failure:\nconnection reset"),
            "02:05PM March 07, 2024 :\tsearch failure: connection reset\n"
        );
    }

    #[test]
    fn entries_are_appended() {
        let temp = tempfile::TempDir::new().unwrap();
        let log = FailureLog::new(temp.path().join("logs").join("errors.txt"));
        let when = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        log.append_at(&when, "first").unwrap();
        log.append_at(&when, "second").unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" :\tfirst"));
        assert!(lines[1].ends_with(" :\tsecond"));
    }
}
