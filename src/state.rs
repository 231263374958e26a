use crate::error::StateError;
use crate::post::Post;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Posts known as of the last run. Anything other than a readable JSON
/// array of posts counts as no prior state.
pub fn load(path: &Path) -> Vec<Post> {
    let Ok(data) = std::fs::read_to_string(path) else {
        debug!(path = %path.display(), "No state file, starting from empty state");
        return Vec::new();
    };
    match serde_json::from_str(&data) {
        Ok(posts) => posts,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable state file");
            Vec::new()
        }
    }
}

/// Replaces the state file with `posts`. Writes a sibling file first and
/// renames it over the target.
pub fn save(path: &Path, posts: &[Post]) -> Result<(), StateError> {
    let data = encode(posts)?;
    let tmp = tmp_path(path);
    std::fs::write(&tmp, data).map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        StateError::Write {
            path: tmp.display().to_string(),
            source,
        }
    })?;
    std::fs::rename(&tmp, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        StateError::Write {
            path: path.display().to_string(),
            source,
        }
    })
}

fn encode(posts: &[Post]) -> Result<Vec<u8>, StateError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    posts.serialize(&mut ser)?;
    Ok(buf)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("state.json")).is_empty());
    }

    #[test]
    fn invalid_content_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        for content in ["{ broken", r#"{"title":"T","link":"/a"}"#, r#"[1, 2]"#, "\"text\""] {
            std::fs::write(&path, content).unwrap();
            assert!(load(&path).is_empty(), "content {:?}", content);
        }
    }

    #[test]
    fn save_then_load_keeps_order_and_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let posts = vec![Post::new("فیلم جدید", "/b"), Post::new("T1", "/a")];

        save(&path, &posts).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("فیلم جدید"));
        assert!(raw.contains("\n    {"));
        assert!(!dir.path().join("state.json.tmp").exists());
        assert_eq!(load(&path), posts);
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        save(&path, &[Post::new("Old", "/old")]).unwrap();
        save(&path, &[Post::new("New", "/new")]).unwrap();
        assert_eq!(load(&path), vec![Post::new("New", "/new")]);
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("state.json");

        let err = save(&path, &[Post::new("T1", "/a")]).unwrap_err();

        assert!(matches!(err, StateError::Write { .. }));
        assert!(!dir.path().join("missing").join("state.json.tmp").exists());
        assert!(!path.exists());
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        // a non-empty directory cannot be replaced by a file
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let err = save(&path, &[Post::new("T1", "/a")]).unwrap_err();

        assert!(matches!(err, StateError::Write { .. }));
        assert!(!dir.path().join("state.json.tmp").exists());
    }

    #[test]
    fn reads_state_written_by_earlier_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let written = r#"[
    {
        "title": "T1",
        "link": "https:\/\/site\/a"
    }
]"#;
        std::fs::write(&path, written).unwrap();
        assert_eq!(load(&path), vec![Post::new("T1", "https://site/a")]);
    }
}
