//! Output persistence.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Destination for the assembled document. Called once per successful run.
pub trait OutputSink: Send + Sync {
    fn write(&self, file_name: &str, content: &[u8]) -> io::Result<()>;
}

/// Writes documents into a directory.
///
/// Content goes to a sibling temp file first and is renamed over the
/// destination, so readers see either the old file or the complete new one.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn destination(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl OutputSink for FileSink {
    fn write(&self, file_name: &str, content: &[u8]) -> io::Result<()> {
        if !is_bare_file_name(file_name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("output must be a bare file name, got {file_name:?}"),
            ));
        }

        let dest = self.destination(file_name);
        let tmp = self.dir.join(format!(".{file_name}.envpull-tmp"));

        let result = write_private(&tmp, content).and_then(|()| fs::rename(&tmp, &dest));
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result?;

        debug!("wrote {} bytes to {}", content.len(), dest.display());
        Ok(())
    }
}

/// True when `name` is a single normal path component, so both the
/// destination and the temp file stay inside the sink directory.
fn is_bare_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    ) && !name.contains(['/', '\\'])
}

/// Creates (or truncates) `path` readable by the owner only.
fn write_private(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(content)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "OLD=1").unwrap();

        let sink = FileSink::new(dir.path());
        sink.write(".env", b"NEW=2").unwrap();

        assert_eq!(std::fs::read(dir.path().join(".env")).unwrap(), b"NEW=2");
        assert!(!dir.path().join("..env.envpull-tmp").exists());
    }

    #[test]
    fn empty_content_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        FileSink::new(dir.path()).write(".env", b"").unwrap();
        assert_eq!(std::fs::metadata(dir.path().join(".env")).unwrap().len(), 0);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("nope"));
        assert!(sink.write(".env", b"A=1").is_err());
    }

    #[test]
    fn non_bare_names_are_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        let sink = FileSink::new(dir.path());

        for name in ["a/b", "../escape", "/abs", "a\\b", "", ".", ".."] {
            let err = sink.write(name, b"A=1").unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "{name}");
        }
        assert!(!dir.path().join("a").join("b").exists());
        assert!(!dir.path().join("a").join(".b.envpull-tmp").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn dotfile_names_are_accepted() {
        assert!(is_bare_file_name(".env"));
        assert!(is_bare_file_name("prod.env"));
        assert!(!is_bare_file_name("./.env"));
    }

    #[cfg(unix)]
    #[test]
    fn output_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        FileSink::new(dir.path()).write("secrets.env", b"A=1").unwrap();
        let mode = std::fs::metadata(dir.path().join("secrets.env"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
