use serde::Serialize;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

pub const EXPORT_TO_FLAG: &str = "--export-to";
pub const SCORE_META_FLAG: &str = "--score-meta";
pub const JOB_FLAG: &str = "--job";

/// Where the artifact of an invocation ends up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpectedOutput {
    /// The tool writes this file itself.
    File { path: PathBuf },
    /// Standard output is the artifact and is written here by the caller.
    Captured { path: PathBuf },
    /// A primary file plus siblings named `<prefix>...<suffix>`.
    Pattern {
        primary: PathBuf,
        prefix: String,
        suffix: String,
    },
}

impl ExpectedOutput {
    pub fn primary_path(&self) -> &Path {
        match self {
            ExpectedOutput::File { path } | ExpectedOutput::Captured { path } => path,
            ExpectedOutput::Pattern { primary, .. } => primary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub executable: PathBuf,
    pub arguments: Vec<OsString>,
    pub expected_output: ExpectedOutput,
}

impl ToolInvocation {
    /// `<exe> --export-to <target> <source>`; the tool picks the format from the target extension.
    pub fn export_to(executable: &Path, source: &Path, target: &Path) -> Self {
        Self {
            executable: executable.to_path_buf(),
            arguments: vec![
                OsString::from(EXPORT_TO_FLAG),
                target.as_os_str().to_os_string(),
                source.as_os_str().to_os_string(),
            ],
            expected_output: ExpectedOutput::File {
                path: target.to_path_buf(),
            },
        }
    }

    pub fn score_meta(executable: &Path, source: &Path, target: &Path) -> Self {
        Self {
            executable: executable.to_path_buf(),
            arguments: vec![
                OsString::from(SCORE_META_FLAG),
                source.as_os_str().to_os_string(),
            ],
            expected_output: ExpectedOutput::Captured {
                path: target.to_path_buf(),
            },
        }
    }

    pub fn job(
        executable: &Path,
        job_file: &Path,
        primary: &Path,
        prefix: &str,
        suffix: &str,
    ) -> Self {
        Self {
            executable: executable.to_path_buf(),
            arguments: vec![OsString::from(JOB_FLAG), job_file.as_os_str().to_os_string()],
            expected_output: ExpectedOutput::Pattern {
                primary: primary.to_path_buf(),
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            },
        }
    }

    pub fn captures_stdout(&self) -> bool {
        matches!(self.expected_output, ExpectedOutput::Captured { .. })
    }

    /// Shell-like rendering for dry runs and logs. Not meant to be pasted into a shell verbatim.
    pub fn display_command(&self) -> String {
        let mut parts = vec![quote(self.executable.as_os_str())];
        parts.extend(self.arguments.iter().map(|arg| quote(arg)));
        let command = parts.join(" ");

        if let ExpectedOutput::Captured { path } = &self.expected_output {
            format!("{} > {}", command, quote(path.as_os_str()))
        } else {
            command
        }
    }
}

fn quote(value: &OsStr) -> String {
    let text = value.to_string_lossy();
    if text.is_empty() || text.contains(char::is_whitespace) {
        format!("\"{}\"", text)
    } else {
        text.into_owned()
    }
}
