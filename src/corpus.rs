//! Repository file indexing: walk a source tree and read it into an ordered
//! list of `FileRecord`s. Thin I/O layer: the analyzer core treats the
//! result as an immutable input.

use std::path::Path;

use ignore::WalkBuilder;

use crate::config::CorpusConfig;
use crate::models::{FileContent, FileRecord, SourceLanguage};

/// Walk `root` and index every regular file into a `FileRecord`, sorted by
/// relative path so downstream output is deterministic.
pub fn index_repo(root: &Path, config: &CorpusConfig) -> Vec<FileRecord> {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true);

    let mut overrides = ignore::overrides::OverrideBuilder::new(root);
    for pattern in &config.ignore {
        // Negate pattern: !pattern means "ignore this"
        let _ = overrides.add(&format!("!{}", pattern));
    }
    if let Ok(ov) = overrides.build() {
        builder.overrides(ov);
    }

    let mut records = Vec::new();
    for entry in builder.build().flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let rel = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        records.push(read_record(path, rel, config.max_file_size));
    }

    records.sort_by(|a, b| a.path.cmp(&b.path));
    records
}

/// Read one file into a record. Read failures and binary content become an
/// explicit unreadable marker, never an error.
fn read_record(path: &Path, rel: String, max_size: u64) -> FileRecord {
    let language = SourceLanguage::from_path(path);
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    if size > max_size {
        return FileRecord {
            path: rel,
            language,
            content: FileContent::Unreadable(format!(
                "file exceeds size limit ({} > {} bytes)",
                size, max_size
            )),
            size,
            content_hash: String::new(),
        };
    }

    let content = match std::fs::read(path) {
        Ok(bytes) => {
            let hash = blake3::hash(&bytes).to_hex().to_string();
            let content = decode_content(bytes);
            return FileRecord {
                path: rel,
                language,
                content,
                size,
                content_hash: hash,
            };
        }
        Err(e) => FileContent::Unreadable(format!("read failed: {}", e)),
    };

    FileRecord {
        path: rel,
        language,
        content,
        size,
        content_hash: String::new(),
    }
}

/// Decode file bytes. NUL bytes mark binary content; invalid UTF-8 sequences
/// in otherwise-textual files are replaced so the pattern scanner can still
/// see whatever decodable text exists.
fn decode_content(bytes: Vec<u8>) -> FileContent {
    if bytes.contains(&0) {
        return FileContent::Unreadable("binary content".to_string());
    }
    match String::from_utf8(bytes) {
        Ok(text) => FileContent::Text(text),
        Err(e) => FileContent::Text(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &[u8]) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_index_is_sorted_and_tagged() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.py", b"def f():\n    pass\n");
        write(dir.path(), "a.md", b"# readme\n");

        let records = index_repo(dir.path(), &CorpusConfig::default());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, "a.md");
        assert_eq!(records[0].language, Some(SourceLanguage::Markdown));
        assert_eq!(records[1].path, "b.py");
        assert_eq!(records[1].language, Some(SourceLanguage::Python));
        assert!(records[1].extractable());
    }

    #[test]
    fn test_binary_file_marked_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "blob.py", &[0u8, 159, 146, 150]);

        let records = index_repo(dir.path(), &CorpusConfig::default());
        assert_eq!(records.len(), 1);
        assert!(matches!(records[0].content, FileContent::Unreadable(_)));
        assert!(!records[0].extractable());
        // Hash is still computed from the raw bytes.
        assert!(!records[0].content_hash.is_empty());
    }

    #[test]
    fn test_oversized_file_marked_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "big.txt", b"0123456789");

        let config = CorpusConfig {
            ignore: Vec::new(),
            max_file_size: 4,
        };
        let records = index_repo(dir.path(), &config);
        assert_eq!(records.len(), 1);
        assert!(matches!(records[0].content, FileContent::Unreadable(_)));
        assert_eq!(records[0].size, 10);
    }

    #[test]
    fn test_ignore_patterns_applied() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("vendor")).unwrap();
        write(dir.path(), "app.py", b"print('hi')\n");
        write(&dir.path().join("vendor"), "dep.py", b"print('dep')\n");

        let config = CorpusConfig {
            ignore: vec!["vendor".to_string()],
            max_file_size: default_size(),
        };
        let records = index_repo(dir.path(), &config);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "app.py");
    }

    #[test]
    fn test_mixed_encoding_still_yields_text() {
        let dir = tempfile::tempdir().unwrap();
        // Valid prefix, invalid UTF-8 continuation byte, no NULs.
        let mut bytes = b"app.run(".to_vec();
        bytes.push(0xFF);
        write(dir.path(), "server.py", &bytes);

        let records = index_repo(dir.path(), &CorpusConfig::default());
        let text = records[0].content.as_text().unwrap();
        assert!(text.contains("app.run("));
    }

    fn default_size() -> u64 {
        CorpusConfig::default().max_file_size
    }
}
