// src/wordlist.rs
// =============================================================================
// Loads candidate words from a newline-delimited file.
//
// Each line is trimmed and blank lines are skipped. A file that can't be
// read, or that yields no words, is an input error: there is nothing to do.
// =============================================================================

use std::path::Path;

use crate::config::InputError;

pub async fn load_wordlist(path: &Path) -> Result<Vec<String>, InputError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| InputError::WordlistUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let words = parse_wordlist(&content);
    if words.is_empty() {
        return Err(InputError::EmptyWordlist {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!("Loaded {} words from {}", words.len(), path.display());
    Ok(words)
}

fn parse_wordlist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_wordlist(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_trims_and_skips_blank_lines() {
        let words = parse_wordlist("admin\n  login \r\n\n\t\nbackup.zip\n");
        assert_eq!(words, vec!["admin", "login", "backup.zip"]);
    }

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        let words = parse_wordlist("b\na\nb\n");
        assert_eq!(words, vec!["b", "a", "b"]);
    }

    #[tokio::test]
    async fn test_load_wordlist() {
        let file = temp_wordlist("admin\nlogin\n");
        let words = load_wordlist(file.path()).await.unwrap();
        assert_eq!(words, vec!["admin", "login"]);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = load_wordlist(Path::new("/definitely/not/here.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::WordlistUnreadable { .. }));
    }

    #[tokio::test]
    async fn test_empty_file() {
        let file = temp_wordlist("\n   \n");
        let err = load_wordlist(file.path()).await.unwrap_err();
        assert!(matches!(err, InputError::EmptyWordlist { ref path } if path == file.path()));
    }
}
