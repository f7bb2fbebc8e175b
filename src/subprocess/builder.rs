use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A command line to be interpreted by a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub command_line: String,
    /// Shell to run; the configured shell is used when unset.
    pub shell: Option<PathBuf>,
    pub env: HashMap<String, String>,
    pub working_dir: Option<PathBuf>,
}

impl ShellCommand {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            shell: None,
            env: HashMap::new(),
            working_dir: None,
        }
    }

    /// `<shell> -c <command line>` with this command's environment and
    /// working directory. Standard streams are left for the caller.
    pub(crate) fn to_command(&self, default_shell: &Path) -> Command {
        let shell = self.shell.as_deref().unwrap_or(default_shell);
        let mut cmd = Command::new(shell);
        cmd.arg("-c").arg(&self.command_line);
        cmd.envs(&self.env);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

pub struct ShellCommandBuilder {
    command: ShellCommand,
}

impl ShellCommandBuilder {
    pub fn new(command_line: &str) -> Self {
        Self {
            command: ShellCommand::new(command_line),
        }
    }

    /// Build the command line from separate words, quoting each one.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(&shell_words::join(words))
    }

    pub fn shell(mut self, shell: &Path) -> Self {
        self.command.shell = Some(shell.to_path_buf());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.command.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            self.command
                .env
                .insert(key.as_ref().to_string(), value.as_ref().to_string());
        }
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.command.working_dir = Some(dir.to_path_buf());
        self
    }

    pub fn build(self) -> ShellCommand {
        self.command
    }
}
