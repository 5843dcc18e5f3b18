use std::fs;
use std::io::{Cursor, ErrorKind, Write};
use std::path::{Path, PathBuf};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::{Archive, ArchiveError};

const MAX_COMPRESSION_LEVEL: i64 = 9;

/// Check the source directory preconditions, in order.
///
/// Returns the canonical source directory on success.
pub fn validate_source(source: &Path, project: Option<&Path>) -> Result<PathBuf, ArchiveError> {
    if source.as_os_str().is_empty() {
        return Err(ArchiveError::EmptyPath);
    }

    let metadata = match fs::metadata(source) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ArchiveError::NotFound(source.to_path_buf()));
        }
        Err(e) => {
            return Err(ArchiveError::Unreadable {
                path: source.to_path_buf(),
                source: e,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(ArchiveError::NotADirectory(source.to_path_buf()));
    }

    fs::read_dir(source).map_err(|e| ArchiveError::Unreadable {
        path: source.to_path_buf(),
        source: e,
    })?;

    let canonical = fs::canonicalize(source).map_err(|e| ArchiveError::Unreadable {
        path: source.to_path_buf(),
        source: e,
    })?;

    if let Some(project) = project {
        if !canonical.starts_with(project_root(project)) {
            return Err(ArchiveError::OutsideProject {
                source_path: source.to_path_buf(),
                project: project.to_path_buf(),
            });
        }
    }

    Ok(canonical)
}

fn project_root(project: &Path) -> PathBuf {
    fs::canonicalize(project).unwrap_or_else(|_| project.to_path_buf())
}

/// Build the archive on the blocking pool.
pub async fn build_archive(source: &Path, project: Option<&Path>) -> Result<Archive, ArchiveError> {
    let source = source.to_path_buf();
    let project = project.map(Path::to_path_buf);

    tokio::task::spawn_blocking(move || build_archive_blocking(&source, project.as_deref()))
        .await
        .map_err(|e| ArchiveError::Join(e.to_string()))?
}

/// Zip every file under `source` at maximum compression.
///
/// Files that disappear while walking are skipped with a warning; any
/// other I/O failure aborts the build.
pub fn build_archive_blocking(
    source: &Path,
    project: Option<&Path>,
) -> Result<Archive, ArchiveError> {
    let root = validate_source(source, project)?;
    let confine = project.map(project_root);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(MAX_COMPRESSION_LEVEL));

    let mut walk = Walk {
        options,
        confine: confine.as_deref(),
        file_count: 0,
    };
    walk.add_dir(&mut writer, &root, "")?;
    let file_count = walk.file_count;

    let bytes = writer.finish()?.into_inner();

    tracing::debug!(
        source = %root.display(),
        files = file_count,
        size_bytes = bytes.len(),
        "Built archive"
    );

    Ok(Archive::new(bytes, file_count))
}

/// Recursive walk state; `confine` is the canonical project root, if any.
struct Walk<'a> {
    options: SimpleFileOptions,
    confine: Option<&'a Path>,
    file_count: usize,
}

impl Walk<'_> {
    fn add_dir(
        &mut self,
        writer: &mut ZipWriter<Cursor<Vec<u8>>>,
        dir: &Path,
        base: &str,
    ) -> Result<(), ArchiveError> {
        let entries = fs::read_dir(dir).map_err(|e| ArchiveError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut sorted_entries: Vec<_> = entries
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ArchiveError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
        sorted_entries.sort_by_key(|e| e.file_name());

        for entry in sorted_entries {
            let path = entry.path();
            let name = entry.file_name();
            let rel_path = if base.is_empty() {
                name.to_string_lossy().to_string()
            } else {
                format!("{}/{}", base, name.to_string_lossy())
            };

            // Follow symlinks to their target; a dangling link is skipped.
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::warn!(path = %path.display(), "Skipping missing or dangling entry");
                    continue;
                }
                Err(e) => return Err(ArchiveError::Io { path, source: e }),
            };

            let is_symlink = entry
                .file_type()
                .map(|ty| ty.is_symlink())
                .unwrap_or(false);

            if is_symlink && !self.link_stays_inside(&path) {
                tracing::warn!(path = %path.display(), "Skipping symlink that leaves the project");
                continue;
            }

            if metadata.is_dir() {
                if is_symlink {
                    tracing::warn!(path = %path.display(), "Skipping symlinked directory");
                    continue;
                }
                writer.add_directory(format!("{}/", rel_path), self.options)?;
                match self.add_dir(writer, &path, &rel_path) {
                    Err(ArchiveError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                        tracing::warn!(path = %path.display(), "Directory vanished while archiving");
                    }
                    other => other?,
                }
            } else if metadata.is_file() {
                let content = match fs::read(&path) {
                    Ok(content) => content,
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        tracing::warn!(path = %path.display(), "File vanished while archiving");
                        continue;
                    }
                    Err(e) => return Err(ArchiveError::Io { path, source: e }),
                };

                writer.start_file(rel_path.as_str(), file_options(self.options, &metadata))?;
                writer
                    .write_all(&content)
                    .map_err(|e| ArchiveError::Io { path, source: e })?;
                self.file_count += 1;
            } else {
                tracing::warn!(path = %path.display(), "Skipping unsupported filesystem entry");
            }
        }

        Ok(())
    }

    /// A link target must resolve inside the project when one is set.
    fn link_stays_inside(&self, link: &Path) -> bool {
        match self.confine {
            None => true,
            Some(root) => fs::canonicalize(link).is_ok_and(|target| target.starts_with(root)),
        }
    }
}

#[cfg(unix)]
fn file_options(options: SimpleFileOptions, metadata: &fs::Metadata) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;
    options.unix_permissions(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn file_options(options: SimpleFileOptions, _metadata: &fs::Metadata) -> SimpleFileOptions {
    options
}
