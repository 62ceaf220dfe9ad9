use std::path::PathBuf;
use thiserror::Error;

/// 倉庫分析階段的錯誤
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("failed to clone repository {url}")]
    Clone {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to open repository at {}", path.display())]
    RepositoryOpen {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("failed to get HEAD reference")]
    HeadResolution(#[source] git2::Error),

    #[error("failed to load latest commit")]
    CommitLoad(#[source] git2::Error),

    #[error("failed to load {what} tree")]
    TreeLoad {
        what: &'static str,
        #[source]
        source: git2::Error,
    },

    #[error("failed to build diff for commit {commit}")]
    PatchConstruction {
        commit: String,
        #[source]
        source: git2::Error,
    },
}

/// 產生或寫入報告時的錯誤
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to render report template")]
    TemplateParse(#[from] askama::Error),

    #[error("failed to create output directory {}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create report file {}", path.display())]
    FileCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report file {}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report")]
    Serialize(#[from] serde_json::Error),
}

/// 外部複雜度分析器的錯誤
#[derive(Debug, Error)]
pub enum ComplexityError {
    #[error("complexity command is empty")]
    EmptyCommand,

    #[error("failed to run complexity command `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("complexity command `{program}` exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("unrecognized complexity output line: {0:?}")]
    Parse(String),
}
