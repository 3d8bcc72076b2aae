//! Article files and publish schedules.
//!
//! Articles are flat UTF-8 text files written by the generation side:
//! a `제목:` title line, a metadata line, a 50-`=` separator, a blank line,
//! then the body verbatim.

use crate::{Error, Result};
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Title prefix on the first header line.
pub const TITLE_PREFIX: &str = "제목:";

/// Fixed-width header/body separator.
pub const SEPARATOR: &str = "==================================================";

/// One unit of generated content, immutable once read.
#[derive(Debug, Clone)]
pub struct ArticleFile {
    pub title: String,
    pub body: String,
    pub source: PathBuf,
}

impl ArticleFile {
    /// Read and parse an article file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(path, &content))
    }

    /// Parse article content. A missing title line falls back to the file's
    /// base name; a missing separator means the whole file is the body.
    pub fn parse(path: &Path, content: &str) -> Self {
        let title = content
            .lines()
            .find_map(|line| line.strip_prefix(TITLE_PREFIX))
            .map(|rest| rest.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| file_stem(path));

        let body = match content.find(SEPARATOR) {
            Some(offset) => content[offset + SEPARATOR.len()..].trim(),
            None => content.trim(),
        };

        Self {
            title,
            body: body.to_string(),
            source: path.to_path_buf(),
        }
    }

    /// Write an article in the standard header/separator format, under a
    /// sanitized `{title}_{timestamp}.txt` name. The result parses back
    /// through [`ArticleFile::parse`].
    pub fn save(dir: &Path, title: &str, body: &str) -> Result<PathBuf> {
        let now = Local::now();
        let filename = format!(
            "{}_{}.txt",
            sanitize_filename(title),
            now.format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(filename);
        let content = format!(
            "{} {}\n생성일시: {}\n{}\n\n{}",
            TITLE_PREFIX,
            title,
            now.format("%Y-%m-%d %H:%M:%S"),
            SEPARATOR,
            body
        );
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn sanitize_filename(title: &str) -> String {
    let safe: String = title
        .chars()
        .map(|c| {
            if c.is_control() || r#"\/:*?"<>|"#.contains(c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    safe.trim().to_string()
}

/// Scheduled publish time. Only validated values exist: a malformed date
/// never reaches any UI interaction because it cannot be constructed, and
/// out-of-range hour/minute are clamped rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSchedule {
    date: NaiveDate,
    hour: u32,
    minute: u32,
}

impl PublishSchedule {
    /// Build a schedule from user-supplied values. The date must match
    /// `YYYY-MM-DD` and name a real calendar date; hour is clamped to
    /// [0,23] and minute to [0,59].
    pub fn new(date: &str, hour: i64, minute: i64) -> Result<Self> {
        static DATE_PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = DATE_PATTERN
            .get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

        if !pattern.is_match(date) {
            return Err(Error::Schedule(format!(
                "invalid date '{}': expected YYYY-MM-DD",
                date
            )));
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| Error::Schedule(format!("'{}' is not a calendar date", date)))?;

        Ok(Self {
            date,
            hour: hour.clamp(0, 23) as u32,
            minute: minute.clamp(0, 59) as u32,
        })
    }

    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_title_and_body() {
        let content = format!(
            "제목: 여름 휴가 꿀팁\n생성일시: 2024-07-01 09:00:00\n{}\n\n내용본문",
            SEPARATOR
        );
        let article = ArticleFile::parse(Path::new("/tmp/a.txt"), &content);
        assert_eq!(article.title, "여름 휴가 꿀팁");
        assert_eq!(article.body, "내용본문");
    }

    #[test]
    fn missing_title_falls_back_to_file_stem() {
        let content = format!("no header here\n{}\n\nbody text", SEPARATOR);
        let article = ArticleFile::parse(Path::new("/tmp/my_article.txt"), &content);
        assert_eq!(article.title, "my_article");
        assert_eq!(article.body, "body text");
    }

    #[test]
    fn missing_separator_keeps_whole_content_as_body() {
        let article = ArticleFile::parse(Path::new("/tmp/raw.txt"), "  plain body only  ");
        assert_eq!(article.title, "raw");
        assert_eq!(article.body, "plain body only");
    }

    #[test]
    fn body_excludes_header_block() {
        let content = format!("제목: t\nmeta\n{}\n\nline one\nline two\n", SEPARATOR);
        let article = ArticleFile::parse(Path::new("/tmp/t.txt"), &content);
        assert_eq!(article.body, "line one\nline two");
    }

    #[test]
    fn save_round_trips_through_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = ArticleFile::save(dir.path(), "제주 여행 #1: 코스?", "본문\n\n둘째 줄").unwrap();
        let article = ArticleFile::load(&path).unwrap();
        assert_eq!(article.title, "제주 여행 #1: 코스?");
        assert_eq!(article.body, "본문\n\n둘째 줄");
        // path itself carries no forbidden filename characters
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(!name.contains(':'));
        assert!(!name.contains('?'));
    }

    #[test]
    fn schedule_rejects_malformed_date() {
        assert!(PublishSchedule::new("2024/06/01", 9, 0).is_err());
        assert!(PublishSchedule::new("24-06-01", 9, 0).is_err());
        assert!(PublishSchedule::new("", 9, 0).is_err());
    }

    #[test]
    fn schedule_rejects_impossible_calendar_date() {
        // matches the pattern but is no real date
        assert!(PublishSchedule::new("2024-13-01", 9, 0).is_err());
        assert!(PublishSchedule::new("2024-02-30", 9, 0).is_err());
    }

    #[test]
    fn schedule_clamps_hour_and_minute() {
        let s = PublishSchedule::new("2024-06-01", 30, -5).unwrap();
        assert_eq!(s.hour(), 23);
        assert_eq!(s.minute(), 0);

        let s = PublishSchedule::new("2024-06-01", -1, 99).unwrap();
        assert_eq!(s.hour(), 0);
        assert_eq!(s.minute(), 59);
    }

    #[test]
    fn schedule_formats_date() {
        let s = PublishSchedule::new("2024-06-01", 9, 30).unwrap();
        assert_eq!(s.date_string(), "2024-06-01");
    }
}
