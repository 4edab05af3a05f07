//! Session launcher
//!
//! Turns the finalized host list into one of: an interactive ssh session, a
//! file copy, or a multiplexed session with one pane per host. The child
//! inherits this process's standard streams.

use std::fmt;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::Settings;

/// ssh reports its own connection failures with this status
pub const SSH_CONNECTION_FAILURE: i32 = 255;

/// Failures while running the session. All of them are fatal to the caller.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no remote username configured (set ssh.user, UPTIME_USER or USER)")]
    NoUser,

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} could not connect to {target}")]
    Connection { program: String, target: String },

    #[error("{program} exited with {status}")]
    Exited { program: String, status: String },
}

/// What kind of session a command opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Shell,
    Copy,
    Multiplex,
}

/// A fully prepared command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCommand {
    pub kind: SessionKind,
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for PreparedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Builds and runs session commands
#[derive(Debug, Clone)]
pub struct Launcher {
    user: String,
    ssh_program: String,
    ssh_args: Vec<String>,
    multiplexer: String,
    multiplexer_args: Vec<String>,
    copy_program: String,
}

impl Launcher {
    pub fn new(user: impl Into<String>) -> Self {
        let defaults = crate::config::settings::SshSettings::default();
        Self {
            user: user.into(),
            ssh_program: defaults.ssh_program,
            ssh_args: defaults.ssh_args,
            multiplexer: defaults.multiplexer,
            multiplexer_args: defaults.multiplexer_args,
            copy_program: defaults.copy_program,
        }
    }

    /// Launcher for the configured programs and user
    pub fn from_settings(settings: &Settings) -> Result<Self, LaunchError> {
        let user = settings.user().ok_or(LaunchError::NoUser)?;
        Ok(Self {
            user: user.to_string(),
            ssh_program: settings.ssh.ssh_program.clone(),
            ssh_args: settings.ssh.ssh_args.clone(),
            multiplexer: settings.ssh.multiplexer.clone(),
            multiplexer_args: settings.ssh.multiplexer_args.clone(),
            copy_program: settings.ssh.copy_program.clone(),
        })
    }

    /// `user@host`
    pub fn destination(&self, host: &str) -> String {
        format!("{}@{}", self.user, host)
    }

    /// Decide what to run for `targets`; `None` when there is nothing to do
    pub fn plan(&self, targets: &[String], copy_file: Option<&str>) -> Option<PreparedCommand> {
        match targets {
            [] => None,
            [target] => Some(match copy_file {
                Some(file) => PreparedCommand {
                    kind: SessionKind::Copy,
                    program: self.copy_program.clone(),
                    args: vec![file.to_string(), format!("{}:", self.destination(target))],
                },
                None => {
                    let mut args = self.ssh_args.clone();
                    args.push(self.destination(target));
                    PreparedCommand {
                        kind: SessionKind::Shell,
                        program: self.ssh_program.clone(),
                        args,
                    }
                }
            }),
            targets => {
                let mut args = self.multiplexer_args.clone();
                args.extend(targets.iter().map(|t| self.destination(t)));
                Some(PreparedCommand {
                    kind: SessionKind::Multiplex,
                    program: self.multiplexer.clone(),
                    args,
                })
            }
        }
    }

    /// Plan and run the session, waiting for it to finish
    pub async fn launch(&self, targets: &[String], copy_file: Option<&str>) -> Result<(), LaunchError> {
        let Some(command) = self.plan(targets, copy_file) else {
            debug!("no targets selected, nothing to launch");
            return Ok(());
        };
        if copy_file.is_some() && command.kind == SessionKind::Multiplex {
            info!("file copy only applies to a single host, opening a multiplexed session instead");
        }
        let target = targets.first().cloned().unwrap_or_default();
        run(&command, &target).await
    }
}

/// Run `command` with inherited stdio and check how it ended
pub async fn run(command: &PreparedCommand, target: &str) -> Result<(), LaunchError> {
    info!(command = %command, "launching session");

    let status = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|source| LaunchError::Spawn {
            program: command.program.clone(),
            source,
        })?;

    check_status(command, target, status.success(), status.code(), &status.to_string())
}

/// Map an exit status onto the launcher's error policy.
///
/// An interactive shell's non-zero status is usually just the last remote
/// command's status; only ssh's own connection failure counts as an error.
pub fn check_status(
    command: &PreparedCommand,
    target: &str,
    success: bool,
    code: Option<i32>,
    description: &str,
) -> Result<(), LaunchError> {
    if success {
        return Ok(());
    }

    match (command.kind, code) {
        (SessionKind::Shell, Some(SSH_CONNECTION_FAILURE)) => Err(LaunchError::Connection {
            program: command.program.clone(),
            target: target.to_string(),
        }),
        (SessionKind::Shell, Some(code)) => {
            debug!(code, "remote shell exited with non-zero status");
            Ok(())
        }
        _ => Err(LaunchError::Exited {
            program: command.program.clone(),
            status: description.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_targets_no_plan() {
        let launcher = Launcher::new("deploy");
        assert_eq!(launcher.plan(&[], None), None);
        assert_eq!(launcher.plan(&[], Some("notes.txt")), None);
    }

    #[test]
    fn test_single_target_opens_shell() {
        let launcher = Launcher::new("deploy");
        let command = launcher.plan(&hosts(&["web1.example.com"]), None).unwrap();
        assert_eq!(command.kind, SessionKind::Shell);
        insta::assert_snapshot!(command.to_string(), @"ssh deploy@web1.example.com");
    }

    #[test]
    fn test_single_target_with_file_copies() {
        let launcher = Launcher::new("deploy");
        let command = launcher
            .plan(&hosts(&["web1.example.com"]), Some("./notes.txt"))
            .unwrap();
        assert_eq!(command.kind, SessionKind::Copy);
        insta::assert_snapshot!(command.to_string(), @"scp ./notes.txt deploy@web1.example.com:");
    }

    #[test]
    fn test_many_targets_multiplex_in_order() {
        let launcher = Launcher::new("ops");
        let command = launcher.plan(&hosts(&["db1", "web2", "web1"]), None).unwrap();
        assert_eq!(command.kind, SessionKind::Multiplex);
        insta::assert_snapshot!(command.to_string(), @"cssh ops@db1 ops@web2 ops@web1");
    }

    #[test]
    fn test_configured_programs_and_args() {
        let mut settings = Settings::default();
        settings.ssh.user = Some("root".to_string());
        settings.ssh.ssh_args = vec!["-A".to_string()];
        settings.ssh.multiplexer = "tmux-cssh".to_string();
        settings.ssh.multiplexer_args = vec!["-ns".to_string()];
        let launcher = Launcher::from_settings(&settings).unwrap();

        let shell = launcher.plan(&hosts(&["a"]), None).unwrap();
        assert_eq!(shell.args, vec!["-A", "root@a"]);

        let multi = launcher.plan(&hosts(&["a", "b"]), None).unwrap();
        assert_eq!(multi.program, "tmux-cssh");
        assert_eq!(multi.args, vec!["-ns", "root@a", "root@b"]);
    }

    #[test]
    fn test_from_settings_requires_user() {
        let settings = Settings::default();
        assert!(matches!(
            Launcher::from_settings(&settings),
            Err(LaunchError::NoUser)
        ));
    }

    #[test]
    fn test_shell_status_policy() {
        let launcher = Launcher::new("u");
        let shell = launcher.plan(&hosts(&["h"]), None).unwrap();

        assert!(check_status(&shell, "h", true, Some(0), "exit status: 0").is_ok());
        assert!(check_status(&shell, "h", false, Some(1), "exit status: 1").is_ok());
        assert!(matches!(
            check_status(&shell, "h", false, Some(255), "exit status: 255"),
            Err(LaunchError::Connection { .. })
        ));
        assert!(matches!(
            check_status(&shell, "h", false, None, "signal: 9"),
            Err(LaunchError::Exited { .. })
        ));
    }

    #[test]
    fn test_copy_and_multiplex_fail_on_any_error() {
        let launcher = Launcher::new("u");
        let copy = launcher.plan(&hosts(&["h"]), Some("f")).unwrap();
        let multi = launcher.plan(&hosts(&["h", "i"]), None).unwrap();

        for command in [copy, multi] {
            let err = check_status(&command, "h", false, Some(1), "exit status: 1").unwrap_err();
            assert_eq!(err.to_string(), format!("{} exited with exit status: 1", command.program));
        }
    }

    #[tokio::test]
    async fn test_launch_without_targets_is_noop() {
        let launcher = Launcher::new("u");
        assert!(launcher.launch(&[], None).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let command = PreparedCommand {
            kind: SessionKind::Shell,
            program: "/nonexistent/upssh-test-ssh".to_string(),
            args: vec!["u@h".to_string()],
        };
        assert!(matches!(
            run(&command, "h").await,
            Err(LaunchError::Spawn { .. })
        ));
    }
}
