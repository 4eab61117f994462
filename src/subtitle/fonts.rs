use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Environment override consulted before any other candidate.
pub const FONTS_DIR_ENV: &str = "JIMAKU_FONTS_DIR";

/// Resolve the fonts directory handed to the render filter.
///
/// Candidates are tried in order: environment override, a `fonts` directory
/// under the media root, then OS-specific system directories. The first
/// existing directory wins. `None` means the encoder relies on system font
/// discovery.
pub fn resolve_fonts_dir(media_root: &Path) -> Option<PathBuf> {
    let found = candidate_dirs(media_root).into_iter().find(|dir| dir.is_dir());
    match &found {
        Some(dir) => debug!("Using fonts directory: {}", dir.display()),
        None => debug!("No fonts directory found; relying on system fonts"),
    }
    found
}

fn candidate_dirs(media_root: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(dir) = env::var(FONTS_DIR_ENV) {
        candidates.push(PathBuf::from(dir));
    }
    candidates.push(media_root.join("fonts"));

    if cfg!(target_os = "macos") {
        candidates.push(PathBuf::from("/System/Library/Fonts"));
        candidates.push(PathBuf::from("/Library/Fonts"));
        if let Ok(home) = env::var("HOME") {
            candidates.push(PathBuf::from(home).join("Library/Fonts"));
        }
    } else if cfg!(target_os = "windows") {
        candidates.push(PathBuf::from("C:/Windows/Fonts"));
    } else {
        candidates.push(PathBuf::from("/usr/share/fonts"));
        candidates.push(PathBuf::from("/usr/local/share/fonts"));
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test so the env override cannot race a parallel case.
    #[test]
    fn test_candidate_ordering() {
        let media_root = tempfile::tempdir().unwrap();
        let override_dir = tempfile::tempdir().unwrap();

        unsafe { env::set_var(FONTS_DIR_ENV, override_dir.path()) };
        let dirs = candidate_dirs(media_root.path());
        assert_eq!(dirs[0], override_dir.path());
        assert_eq!(dirs[1], media_root.path().join("fonts"));
        assert_eq!(resolve_fonts_dir(media_root.path()), Some(override_dir.path().to_path_buf()));
        unsafe { env::remove_var(FONTS_DIR_ENV) };

        // Without the override, the media root's fonts directory wins once
        // it exists.
        std::fs::create_dir(media_root.path().join("fonts")).unwrap();
        assert_eq!(
            resolve_fonts_dir(media_root.path()),
            Some(media_root.path().join("fonts"))
        );
    }
}
