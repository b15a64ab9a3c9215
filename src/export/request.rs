use crate::error::{Result, ScoreWdError};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// A validated score path and the working directory derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRequest {
    pub source_path: PathBuf,
    pub output_directory: PathBuf,
}

impl ExportRequest {
    /// Validate `source_path` and derive its output directory.
    ///
    /// Touches nothing on disk beyond reading metadata.
    pub fn new<P: AsRef<Path>>(
        source_path: P,
        score_extension: &str,
        directory_suffix: &str,
    ) -> Result<Self> {
        let source_path = source_path.as_ref();

        if !source_path.to_string_lossy().ends_with(score_extension) {
            return Err(ScoreWdError::InvalidExtension {
                path: source_path.display().to_string(),
                expected: score_extension.to_string(),
            });
        }

        if !source_path.exists() || source_path.is_dir() {
            return Err(ScoreWdError::SourceNotFound {
                path: source_path.display().to_string(),
            });
        }

        Ok(Self {
            source_path: source_path.to_path_buf(),
            output_directory: output_directory_for(source_path, directory_suffix),
        })
    }
}

/// `song.mscz` + `.wd` -> `song.mscz.wd`. Pure string concatenation on the path.
pub fn output_directory_for(source_path: &Path, directory_suffix: &str) -> PathBuf {
    let mut directory = OsString::from(source_path.as_os_str());
    directory.push(directory_suffix);
    PathBuf::from(directory)
}
