//! Prompt context gathering for processes.

use std::path::Path;

/// Maximum README excerpt length fed into summary prompts.
const README_EXCERPT_LEN: usize = 3000;

/// README filenames checked in a process workdir, in priority order.
const README_NAMES: &[&str] = &["README.md", "readme.md", "README.txt", "readme.txt"];

/// Read a README excerpt from a process workdir. Best-effort.
pub async fn find_readme(workdir: &Path) -> Option<String> {
    for name in README_NAMES {
        let path = workdir.join(name);
        if let Ok(mut content) = tokio::fs::read_to_string(&path).await {
            if content.len() > README_EXCERPT_LEN {
                let mut end = README_EXCERPT_LEN;
                while !content.is_char_boundary(end) {
                    end -= 1;
                }
                content.truncate(end);
            }
            return Some(content);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_first_matching_readme() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.md"), "# lower").unwrap();
        std::fs::write(dir.path().join("README.md"), "# upper").unwrap();

        assert_eq!(find_readme(dir.path()).await.as_deref(), Some("# upper"));
    }

    #[tokio::test]
    async fn missing_readme_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_readme(dir.path()).await.is_none());
    }

    #[tokio::test]
    async fn long_readme_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "x".repeat(10_000)).unwrap();

        let excerpt = find_readme(dir.path()).await.unwrap();
        assert_eq!(excerpt.len(), README_EXCERPT_LEN);
    }
}
