//! Temporary files of a download session, all named `{stem}.*`.

use std::path::{Path, PathBuf};

/// Suffixes yt-dlp uses for unfinished or intermediate files
const PARTIAL_SUFFIXES: [&str; 4] = [".part", ".ytdl", ".temp", ".tmp"];

fn is_partial(name: &str) -> bool {
    PARTIAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) || name.contains(".part-Frag")
}

/// Finds the finished file for `stem` when yt-dlp did not report its path.
///
/// Intermediate files are ignored; with several candidates (unmerged streams)
/// the largest wins.
pub fn find_actual_downloaded_file(output_dir: &Path, stem: &str) -> Option<PathBuf> {
    let prefix = format!("{}.", stem);
    let entries = fs_err::read_dir(output_dir).ok()?;

    entries
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(&prefix) && !is_partial(&name)
        })
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            metadata.is_file().then(|| (metadata.len(), entry.path()))
        })
        .max_by_key(|(len, _)| *len)
        .map(|(_, path)| path)
}

/// Removes every file in `output_dir` named `{stem}.*`.
///
/// Runs after every download regardless of outcome. A missing directory and
/// individual removal failures are not errors. Returns the number of files
/// removed.
pub fn cleanup_stem(output_dir: &Path, stem: &str) -> usize {
    let entries = match fs_err::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("Nothing to clean for {}: {}", stem, e);
            return 0;
        }
    };

    let prefix = format!("{}.", stem);
    let mut removed = 0;
    for entry in entries.filter_map(Result::ok) {
        if !entry.file_name().to_string_lossy().starts_with(&prefix) {
            continue;
        }

        match fs_err::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => log::debug!("Failed to remove temporary file: {}", e),
        }
    }

    if removed > 0 {
        log::info!("Cleaned up {} file(s) for download {}", removed, stem);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cleanup_removes_only_matching_stem() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("1700000000000.mp4"), b"video").unwrap();
        fs::write(dir.path().join("1700000000000.f140.m4a.part"), b"partial").unwrap();
        fs::write(dir.path().join("1700000000001.mp4"), b"other").unwrap();
        fs::write(dir.path().join("notes.txt"), b"keep").unwrap();

        assert_eq!(cleanup_stem(dir.path(), "1700000000000"), 2);

        let mut left: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(left, vec!["1700000000001.mp4", "notes.txt"]);
    }

    #[test]
    fn test_cleanup_leaves_sessions_sharing_a_prefix() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("1700000000000-1.mp4"), b"mine").unwrap();
        fs::write(dir.path().join("1700000000000-1.mp4.part"), b"mine").unwrap();
        fs::write(dir.path().join("1700000000000-10.mp4"), b"other session").unwrap();
        fs::write(dir.path().join("1700000000000-2.mp4"), b"other session").unwrap();

        assert_eq!(cleanup_stem(dir.path(), "1700000000000-1"), 2);
        assert!(dir.path().join("1700000000000-10.mp4").exists());
        assert!(dir.path().join("1700000000000-2.mp4").exists());
        assert_eq!(
            find_actual_downloaded_file(dir.path(), "1700000000000-1"),
            None
        );
    }

    #[test]
    fn test_cleanup_missing_dir_is_noop() {
        let dir = TempDir::new().unwrap();
        assert_eq!(cleanup_stem(&dir.path().join("absent"), "123"), 0);
    }

    #[test]
    fn test_find_skips_partials_and_picks_largest() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("555.mp4.part"), vec![0u8; 4096]).unwrap();
        fs::write(dir.path().join("555.f140.m4a"), vec![0u8; 10]).unwrap();
        fs::write(dir.path().join("555.mp4"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("5556.mp4"), vec![0u8; 9999]).unwrap();

        let found = find_actual_downloaded_file(dir.path(), "555").unwrap();
        assert_eq!(found.file_name().unwrap(), "555.mp4");
    }

    #[test]
    fn test_find_returns_none_without_candidates() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("555.webm.part"), b"x").unwrap();
        assert!(find_actual_downloaded_file(dir.path(), "555").is_none());
        assert!(find_actual_downloaded_file(&dir.path().join("nope"), "555").is_none());
    }
}
