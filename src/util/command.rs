use std::process::Command;

use tracing::{debug, info};

use crate::error::{BackuperError, Result};
use crate::types::RunMode;

/// Exit status and captured output of an external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn failed(code: i32, stdout: &str) -> Self {
        Self {
            code,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn with_stdout(stdout: &str) -> Self {
        Self {
            code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Last `lines` non-empty lines of stdout followed by stderr.
    pub fn tail(&self, lines: usize) -> String {
        let all: Vec<&str> = self
            .stdout
            .lines()
            .chain(self.stderr.lines())
            .filter(|line| !line.trim().is_empty())
            .collect();
        let start = all.len().saturating_sub(lines);
        all[start..].join("\n")
    }
}

pub trait CommandRunner {
    fn run(&self, cmd: &mut Command) -> Result<CommandOutput>;
}

pub struct SystemRunner {
    run_mode: RunMode,
}

impl SystemRunner {
    pub fn new(run_mode: RunMode) -> Self {
        Self { run_mode }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &mut Command) -> Result<CommandOutput> {
        if self.run_mode.dry_run {
            info!("dry-run: {}", describe_command(cmd));
            return Ok(CommandOutput::ok());
        }
        if self.run_mode.verbose {
            info!("{}", describe_command(cmd));
        } else {
            debug!("{}", describe_command(cmd));
        }
        let output = cmd.output().map_err(|e| {
            BackuperError::message(format!("{}: {}", cmd.get_program().to_string_lossy(), e))
        })?;
        Ok(CommandOutput {
            code: output.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

pub fn describe_command(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().to_string())
        .collect();
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
