use colored::*;
use std::collections::HashMap;
use std::path::Path;
use std::process::ExitStatus;
use tracing::debug;

use super::command::CommandLine;
use super::error::ActionError;

/// NTSTATUS reported by a console process stopped with Ctrl-C.
#[cfg(windows)]
const STATUS_CONTROL_C_EXIT: i32 = 0xC000013A_u32 as i32;

fn was_interrupted(status: &ExitStatus) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        status.signal() == Some(2) || status.code() == Some(130)
    }

    #[cfg(windows)]
    {
        status.code() == Some(STATUS_CONTROL_C_EXIT)
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = status;
        false
    }
}

/// Runs `cmd` in `cwd` with inherited stdio and waits for it.
///
/// With `env`, the child sees exactly that environment.
pub fn run_command(
    cmd: &CommandLine,
    cwd: &Path,
    env: Option<&HashMap<String, String>>,
) -> Result<(), ActionError> {
    println!("\n{} Executing: {}\n", "→".blue(), cmd);

    let mut command = cmd.to_command();
    command.current_dir(cwd);
    if let Some(vars) = env {
        command.env_clear().envs(vars);
    }

    let status = command.status().map_err(|source| ActionError::Spawn {
        program: cmd.program_name(),
        source,
    })?;
    debug!(?status, program = %cmd.program.display(), "command finished");

    if status.success() {
        Ok(())
    } else if was_interrupted(&status) {
        Err(ActionError::Interrupted)
    } else {
        Err(ActionError::Failed {
            program: cmd.program_name(),
            code: status.code(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandLine {
        let mut cmd = CommandLine::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn test_success_and_failure() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_command(&sh("exit 0"), dir.path(), None).is_ok());

        let err = run_command(&sh("exit 4"), dir.path(), None).unwrap_err();
        assert!(matches!(err, ActionError::Failed { code: Some(4), .. }));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = CommandLine::new("/definitely/not/a/program");
        let err = run_command(&cmd, dir.path(), None).unwrap_err();
        assert!(matches!(err, ActionError::Spawn { .. }));
    }

    #[test]
    fn test_sigint_is_interruption() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_command(&sh("kill -INT $$"), dir.path(), None).unwrap_err();
        assert!(matches!(err, ActionError::Interrupted));
        assert_eq!(err.exit_code(), 130);
    }

    #[test]
    fn test_runs_in_cwd_with_given_env() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = HashMap::new();
        env.insert("PATH".to_string(), std::env::var("PATH").unwrap_or_default());
        env.insert("HUY_MARKER".to_string(), "42".to_string());

        let script = "test \"$HUY_MARKER\" = 42 && touch marker";
        run_command(&sh(script), dir.path(), Some(&env)).unwrap();
        assert!(dir.path().join("marker").exists());
    }
}
