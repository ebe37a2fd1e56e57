use std::path::Path;

use super::types::UserStories;
use crate::error::{Result, StoryError};

/// Read a JSON array of users (one page each) from disk.
pub fn load_feed(path: &Path) -> Result<Vec<UserStories>> {
    let contents = std::fs::read_to_string(path).map_err(|source| StoryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let users: Vec<UserStories> =
        serde_json::from_str(&contents).map_err(|source| StoryError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    for user in &users {
        if user.stories.is_empty() {
            return Err(StoryError::EmptySequence {
                user_id: user.user_id.clone(),
            });
        }
    }

    log::info!("Loaded {} users from {}", users.len(), path.display());
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_feed(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_users_in_order() {
        let (_dir, path) = write_feed(
            r#"[
                {"user_id": "a", "stories": [{"media_uri": "1.jpg", "media_kind": "image"}]},
                {"user_id": "b", "stories": [{"media_uri": "2.mp4", "media_kind": "video"}]}
            ]"#,
        );
        let users = load_feed(&path).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].user_id, "a");
        assert!(users[1].stories[0].is_video());
    }

    #[test]
    fn rejects_user_without_stories() {
        let (_dir, path) = write_feed(r#"[{"user_id": "empty", "stories": []}]"#);
        let err = load_feed(&path).unwrap_err();
        assert!(matches!(err, StoryError::EmptySequence { ref user_id } if user_id == "empty"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_feed(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, StoryError::Io { .. }));
    }

    #[test]
    fn bad_json_is_parse_error() {
        let (_dir, path) = write_feed("[{");
        assert!(matches!(load_feed(&path), Err(StoryError::Parse { .. })));
    }
}
