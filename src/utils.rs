use crate::error::RenderError;
use chrono::{DateTime, FixedOffset, Local};
use std::io::Write;
use std::path::Path;
use tracing::debug;

pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";
pub const COMMIT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// 以提交時的時區格式化 git 時間
pub fn format_git_time(time: &git2::Time) -> String {
    let utc = match DateTime::from_timestamp(time.seconds(), 0) {
        Some(utc) => utc,
        None => return time.seconds().to_string(),
    };
    match FixedOffset::east_opt(time.offset_minutes() * 60) {
        Some(offset) => utc.with_timezone(&offset).format(COMMIT_DATE_FORMAT).to_string(),
        None => utc.format(COMMIT_DATE_FORMAT).to_string(),
    }
}

/// 報告標頭使用的目前本地時間
pub fn report_timestamp() -> String {
    Local::now().format(REPORT_DATE_FORMAT).to_string()
}

/// 先寫入同目錄的臨時檔，再改名為 `path`，避免留下寫到一半的報告
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), RenderError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|source| RenderError::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| RenderError::FileCreate {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.write_all(contents)
        .and_then(|()| tmp.flush())
        .map_err(|source| RenderError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
    tmp.persist(path).map_err(|e| RenderError::FileWrite {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    debug!(path = %path.display(), bytes = contents.len(), "檔案已寫入");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn git_time_keeps_author_offset() {
        let time = git2::Time::new(1_700_000_000, -300);
        assert_eq!(format_git_time(&time), "2023-11-14 17:13:20 -0500");
    }

    #[test]
    fn atomic_write_creates_parents_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/nested/latest.md");

        write_atomically(&path, b"first").unwrap();
        write_atomically(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn directory_error_when_parent_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let err = write_atomically(&blocker.join("report.md"), b"x").unwrap_err();
        assert!(matches!(err, RenderError::DirectoryCreate { .. }), "{err}");
    }
}
