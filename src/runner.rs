use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use tracing::info;

use crate::error::{Result, SpecterError};

/// External binaries driven by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Application {
    Nmap,
    Masscan,
    EyeWitness,
}

impl Application {
    pub fn binary(&self) -> &'static str {
        match self {
            Application::Nmap => "nmap",
            Application::Masscan => "masscan",
            Application::EyeWitness => "eyewitness",
        }
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Something that runs a scan given its argument list and succeeds only if
/// the scan finished cleanly.
pub trait Scanner {
    fn run(&self, args: &[String]) -> Result<()>;
}

/// Runs the real binary. stdout and stderr go straight to the terminal.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    application: Application,
    operation: &'static str,
    program: PathBuf,
}

impl ExternalTool {
    /// Locate `application` on `PATH`. `operation` names the CLI step in
    /// progress messages.
    pub fn locate(application: Application, operation: &'static str) -> Result<Self> {
        let program = find_on_path(application.binary()).ok_or_else(|| {
            SpecterError::AppDependencyNotFound {
                application: application.binary().to_string(),
            }
        })?;
        Ok(Self {
            application,
            operation,
            program,
        })
    }
}

impl Scanner for ExternalTool {
    fn run(&self, args: &[String]) -> Result<()> {
        info!("Running {} operation...", self.operation);
        info!(
            "Calling {} with the following command:\n\n{} {}\n",
            self.application,
            self.program.display(),
            args.join(" ")
        );

        let status = Command::new(&self.program)
            .args(args)
            .status()
            .map_err(|source| SpecterError::Spawn {
                application: self.application.to_string(),
                source,
            })?;
        if !status.success() {
            return Err(SpecterError::SubprocessExecution {
                operation: self.operation.to_string(),
                application: self.application.to_string(),
                status,
            });
        }

        info!("Successfully finished '{}' operation.", self.operation);
        Ok(())
    }
}

fn find_on_path(binary: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &std::path::Path) -> bool {
    path.is_file()
}
