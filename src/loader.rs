//! Repository acquisition: clone a git URL or unpack a .tar.gz archive into
//! a managed working directory. Thin I/O layer, outside the analyzer core.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Git clone failed: {0}")]
    Clone(#[from] git2::Error),
    #[error("Archive error: {0}")]
    Archive(std::io::Error),
    #[error("Workdir error: {0}")]
    Workdir(std::io::Error),
    #[error("Unsupported archive format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, LoaderError>;

/// Where an analysis subject comes from.
#[derive(Debug, Clone)]
pub enum RepoSource {
    Git(String),
    Archive(PathBuf),
    Local(PathBuf),
}

impl RepoSource {
    /// Repository identifier recorded in report metadata.
    pub fn reference(&self) -> String {
        match self {
            Self::Git(url) => url.clone(),
            Self::Archive(path) => format!("archive:{}", path.display()),
            Self::Local(path) => path.display().to_string(),
        }
    }
}

/// Working directory manager for acquired repositories.
pub struct RepoLoader {
    work_dir: PathBuf,
}

impl RepoLoader {
    pub fn new(work_dir: PathBuf) -> Self {
        Self { work_dir }
    }

    /// Materialize `source` on disk and return its local path. Local paths
    /// pass through untouched; git and archive sources land under the work
    /// dir, replacing any previous checkout of the same name.
    pub fn acquire(&self, source: &RepoSource, dest_name: Option<&str>) -> Result<PathBuf> {
        match source {
            RepoSource::Local(path) => Ok(path.clone()),
            RepoSource::Git(url) => {
                let dest = self.fresh_dest(dest_name.unwrap_or(&stem_of(url)))?;
                tracing::info!("Cloning {} into {}", url, dest.display());
                git2::build::RepoBuilder::new().clone(url, &dest)?;
                Ok(dest)
            }
            RepoSource::Archive(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                if !name.ends_with(".tar.gz") && !name.ends_with(".tgz") {
                    return Err(LoaderError::UnsupportedFormat(name));
                }
                let dest = self.fresh_dest(dest_name.unwrap_or(&stem_of(&name)))?;
                tracing::info!("Unpacking {} into {}", path.display(), dest.display());
                unpack_tar_gz(path, &dest)?;
                Ok(dest)
            }
        }
    }

    /// Create an empty destination directory, removing any previous one.
    fn fresh_dest(&self, name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.work_dir).map_err(LoaderError::Workdir)?;
        let dest = self.work_dir.join(name);
        if dest.exists() {
            std::fs::remove_dir_all(&dest).map_err(LoaderError::Workdir)?;
        }
        Ok(dest)
    }
}

fn unpack_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let file = std::fs::File::open(archive).map_err(LoaderError::Archive)?;
    let decoder = flate2::read::GzDecoder::new(file);
    let mut tar = tar::Archive::new(decoder);
    tar.unpack(dest).map_err(LoaderError::Archive)?;
    Ok(())
}

/// Last path/URL segment without archive or `.git` suffixes.
fn stem_of(reference: &str) -> String {
    let tail = reference
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(reference);
    tail.trim_end_matches(".git")
        .trim_end_matches(".tar.gz")
        .trim_end_matches(".tgz")
        .to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_of() {
        assert_eq!(stem_of("https://example.com/org/repo.git"), "repo");
        assert_eq!(stem_of("bundle.tar.gz"), "bundle");
        assert_eq!(stem_of("dir/snapshot.tgz"), "snapshot");
        assert_eq!(stem_of("plain"), "plain");
    }

    #[test]
    fn test_source_reference() {
        assert_eq!(
            RepoSource::Git("https://x/y.git".to_string()).reference(),
            "https://x/y.git"
        );
        assert_eq!(
            RepoSource::Archive(PathBuf::from("a.tar.gz")).reference(),
            "archive:a.tar.gz"
        );
    }

    #[test]
    fn test_local_source_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let loader = RepoLoader::new(dir.path().join("work"));
        let source = RepoSource::Local(dir.path().to_path_buf());
        let got = loader.acquire(&source, None).unwrap();
        assert_eq!(got, dir.path());
        // Local sources never create the work dir.
        assert!(!dir.path().join("work").exists());
    }

    #[test]
    fn test_unsupported_archive_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let loader = RepoLoader::new(dir.path().join("work"));
        let source = RepoSource::Archive(dir.path().join("repo.zip"));
        let err = loader.acquire(&source, None).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_tar_gz_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        // Build a small archive in-process.
        let archive_path = dir.path().join("repo.tar.gz");
        {
            let file = std::fs::File::create(&archive_path).unwrap();
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let mut header = tar::Header::new_gnu();
            let data = b"def add(a, b):\n    return a + b\n";
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, "app.py", data.as_slice())
                .unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }

        let loader = RepoLoader::new(dir.path().join("work"));
        let dest = loader
            .acquire(&RepoSource::Archive(archive_path), Some("unpacked"))
            .unwrap();
        assert!(dest.join("app.py").exists());
        let content = std::fs::read_to_string(dest.join("app.py")).unwrap();
        assert!(content.contains("def add"));
    }
}
