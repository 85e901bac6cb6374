use std::path::PathBuf;
use thiserror::Error;

/// Why an action did not complete.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0} not found")]
    MissingTool(&'static str),

    #[error("build folder does not exist: {}", .0.display())]
    MissingBuildFolder(PathBuf),

    #[error("executable not found: {}", .0.display())]
    MissingExecutable(PathBuf),

    #[error("folder does not exist: {}", .0.display())]
    MissingFolder(PathBuf),

    #[error("no files to format found in {0:?}")]
    NoSources(Vec<String>),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}", describe_code(.code))]
    Failed { program: String, code: Option<i32> },

    #[error("interrupted")]
    Interrupted,

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {c}"),
        None => "no exit code".to_string(),
    }
}

impl ActionError {
    pub fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> ActionError {
        let context = context.into();
        move |source| ActionError::Io { context, source }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            ActionError::Interrupted => 130,
            _ => 1,
        }
    }
}
