//! Buildah-backed container engine.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use tracing::info;

use super::ContainerEngine;
use crate::error::{Result, StackwrightError};
use crate::runner::{RunOptions, RunOutput};

/// Drives working containers through the `buildah` CLI.
#[derive(Debug, Clone)]
pub struct Buildah {
    program: String,
}

impl Buildah {
    /// Use `buildah` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("buildah")
    }

    /// Use a specific buildah executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build the argument list for `buildah run`.
    pub fn run_args(
        container: &str,
        command: &str,
        env: &[(String, String)],
        user: Option<&str>,
    ) -> Vec<String> {
        let mut args = vec!["run".to_string()];
        if let Some(user) = user {
            args.extend(["--user".to_string(), user.to_string()]);
        }
        for (name, value) in env {
            args.extend(["--env".to_string(), format!("{}={}", name, value)]);
        }
        args.extend([
            container.to_string(),
            "--".to_string(),
            "sh".to_string(),
            "-c".to_string(),
            command.to_string(),
        ]);
        args
    }

    fn invoke(&self, args: &[String], capture_stdout: bool, capture_stderr: bool) -> Result<Output> {
        info!("Running command: {} {}", self.program, args.join(" "));

        Command::new(&self.program)
            .args(args)
            .stdout(if capture_stdout {
                Stdio::piped()
            } else {
                Stdio::inherit()
            })
            .stderr(if capture_stderr {
                Stdio::piped()
            } else {
                Stdio::inherit()
            })
            .output()
            .map_err(|e| StackwrightError::Container {
                message: format!("Unable to run '{}': {}", self.program, e),
            })
    }

    fn checked(&self, args: &[String]) -> Result<String> {
        let output = self.invoke(args, true, true)?;
        if !output.status.success() {
            return Err(StackwrightError::Container {
                message: format!(
                    "'{} {}' failed: {}",
                    self.program,
                    args.first().map(String::as_str).unwrap_or_default(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for Buildah {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerEngine for Buildah {
    fn create(&self, image: &str, name: Option<&str>) -> Result<String> {
        let mut args = vec!["from".to_string()];
        if let Some(name) = name {
            args.extend(["--name".to_string(), name.to_string()]);
        }
        args.push(image.to_string());

        let container = self.checked(&args)?;
        info!("Created '{}' from image '{}'", container, image);
        Ok(container)
    }

    fn copy(&self, container: &str, src: &Path, dst: &str, chown: Option<&str>) -> Result<()> {
        let mut args = vec!["copy".to_string()];
        if let Some(chown) = chown {
            args.extend(["--chown".to_string(), chown.to_string()]);
        }
        args.extend([
            container.to_string(),
            src.to_string_lossy().to_string(),
            dst.to_string(),
        ]);
        self.checked(&args).map(|_| ())
    }

    fn run(
        &self,
        container: &str,
        command: &str,
        env: &[(String, String)],
        options: &RunOptions,
    ) -> Result<RunOutput> {
        let args = Self::run_args(container, command, env, options.user.as_deref());
        let output = self.invoke(&args, options.capture_stdout, options.capture_stderr)?;

        let code = output.status.code();
        if !options.ignore_failure && !output.status.success() {
            return Err(StackwrightError::CommandFailed {
                command: command.to_string(),
                code,
            });
        }

        Ok(RunOutput {
            exit_code: code,
            stdout: options
                .capture_stdout
                .then(|| String::from_utf8_lossy(&output.stdout).to_string()),
            stderr: options
                .capture_stderr
                .then(|| String::from_utf8_lossy(&output.stderr).to_string()),
        })
    }

    fn commit(&self, container: &str, image_name: Option<&str>) -> Result<String> {
        let mut args = vec!["commit".to_string(), container.to_string()];
        if let Some(image_name) = image_name {
            args.push(image_name.to_string());
        }
        let image = self.checked(&args)?;
        info!("Committed image '{}'", image_name.unwrap_or(&image));
        Ok(image)
    }

    fn remove(&self, container: &str) -> Result<()> {
        self.checked(&["rm".to_string(), container.to_string()])
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_args_place_options_before_container() {
        let env = vec![("JAVA_HOME".to_string(), "/opt/java".to_string())];
        let args = Buildah::run_args("work", "apt update", &env, Some("root"));

        assert_eq!(
            args,
            [
                "run",
                "--user",
                "root",
                "--env",
                "JAVA_HOME=/opt/java",
                "work",
                "--",
                "sh",
                "-c",
                "apt update"
            ]
        );
    }

    #[test]
    fn run_args_without_user_or_env() {
        let args = Buildah::run_args("work", "true", &[], None);
        assert_eq!(args, ["run", "work", "--", "sh", "-c", "true"]);
    }

    #[test]
    fn missing_program_is_a_container_error() {
        let engine = Buildah::with_program("this-buildah-does-not-exist-12345");
        let err = engine.create("fedora:latest", None).unwrap_err();
        assert!(matches!(err, StackwrightError::Container { .. }));
    }
}
