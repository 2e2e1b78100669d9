//! Invocation of the host service manager.
//!
//! Service names only ever reach the external tool as discrete arguments or
//! environment values. Nothing here builds a command line by concatenation.

use std::{
    collections::HashMap,
    process::{Command, Stdio},
    sync::Arc,
};

#[cfg(windows)]
use std::os::windows::process::CommandExt;

use serde::Deserialize;
use tracing::debug;
#[cfg(windows)]
use winapi::um::winbase::CREATE_NO_WINDOW;

use crate::constants::{ServiceInfo, NAMES_ENV, NAME_ENV};
use crate::error::ServiceError;

const POWERSHELL: &str = "powershell";
const SYSTEMCTL: &str = "systemctl";

const START_SCRIPT: &str = "Start-Service -Name $env:SERVICE_PANEL_NAME -ErrorAction Stop";
const STOP_SCRIPT: &str = "Stop-Service -Name $env:SERVICE_PANEL_NAME -ErrorAction Stop";
const LIST_SCRIPT: &str = "[Console]::OutputEncoding = [System.Text.Encoding]::UTF8; \
    Get-Service -Name ($env:SERVICE_PANEL_NAMES -split \"`n\") -ErrorAction Stop | \
    Select-Object @{n='name'; e={$_.Name}}, @{n='display_name'; e={$_.DisplayName}}, @{n='state'; e={[string]$_.Status}} | \
    ConvertTo-Json";

const SHOW_PROPERTIES: &str = "--property=Id,Description,ActiveState";

/// Which service manager the panel drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    PowerShell,
    Systemd,
}

impl Backend {
    /// The service manager of the platform this binary was built for
    pub fn native() -> Self {
        if cfg!(windows) {
            Backend::PowerShell
        } else {
            Backend::Systemd
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
}

impl Action {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "start" => Some(Action::Start),
            "stop" => Some(Action::Stop),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Stop => "stop",
        }
    }
}

/// A fully argument-separated external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl Invocation {
    fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }
}

/// Runs an [`Invocation`] to completion and returns its stdout.
///
/// A spawn failure or non-zero exit is an error.
pub trait CommandRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> Result<Vec<u8>, ServiceError>;
}

/// Runs commands as real child processes, blocking until they exit
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<Vec<u8>, ServiceError> {
        debug!(
            program = %invocation.program,
            args = ?invocation.args,
            "Executing service manager"
        );

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.envs.iter().map(|(key, value)| (key, value)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        let output = command.output().map_err(|source| ServiceError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ServiceError::Failed {
                program: invocation.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

pub struct ServiceManager {
    backend: Backend,
    runner: Arc<dyn CommandRunner>,
}

impl ServiceManager {
    pub fn new(backend: Backend, runner: Arc<dyn CommandRunner>) -> Self {
        Self { backend, runner }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Start or stop `name`, blocking until the service manager returns
    pub fn control(&self, action: Action, name: &str) -> Result<(), ServiceError> {
        let invocation = self.control_invocation(action, name);
        self.runner.run(&invocation)?;
        Ok(())
    }

    /// Query the state of every service in `names` with a single invocation
    pub fn list(&self, names: &[String]) -> Result<Vec<ServiceInfo>, ServiceError> {
        // Get-Service without names lists the whole host
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let invocation = self.list_invocation(names);
        let output = self.runner.run(&invocation)?;

        match self.backend {
            Backend::PowerShell => decode_services(&output),
            Backend::Systemd => parse_systemctl_show(&String::from_utf8_lossy(&output), names),
        }
    }

    fn control_invocation(&self, action: Action, name: &str) -> Invocation {
        match self.backend {
            Backend::PowerShell => {
                let script = match action {
                    Action::Start => START_SCRIPT,
                    Action::Stop => STOP_SCRIPT,
                };
                powershell(script).env(NAME_ENV, name)
            }
            Backend::Systemd => Invocation::new(SYSTEMCTL).args([action.as_str(), "--", name]),
        }
    }

    fn list_invocation(&self, names: &[String]) -> Invocation {
        match self.backend {
            Backend::PowerShell => powershell(LIST_SCRIPT).env(NAMES_ENV, &names.join("\n")),
            Backend::Systemd => Invocation::new(SYSTEMCTL)
                .args(["show", SHOW_PROPERTIES, "--"])
                .args(names),
        }
    }
}

fn powershell(script: &str) -> Invocation {
    Invocation::new(POWERSHELL).args(["-NoProfile", "-NonInteractive", "-Command", script])
}

/// `ConvertTo-Json` emits a bare object for one service and an array for several
#[derive(Deserialize)]
#[serde(untagged)]
enum ServiceOutput {
    Many(Vec<ServiceInfo>),
    One(ServiceInfo),
}

/// Decode PowerShell's service listing, always yielding a sequence
pub fn decode_services(output: &[u8]) -> Result<Vec<ServiceInfo>, ServiceError> {
    let output = output.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(output);

    match serde_json::from_slice(output) {
        Ok(ServiceOutput::Many(services)) => Ok(services),
        Ok(ServiceOutput::One(service)) => Ok(vec![service]),
        Err(e) => Err(ServiceError::Decode {
            message: e.to_string(),
        }),
    }
}

/// Parse `systemctl show` output: one blank-line separated block per unit,
/// in the order the units were requested
pub fn parse_systemctl_show(
    output: &str,
    names: &[String],
) -> Result<Vec<ServiceInfo>, ServiceError> {
    let mut blocks: Vec<HashMap<&str, &str>> = Vec::new();
    let mut current = HashMap::new();

    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            current.insert(key, value);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    if blocks.len() != names.len() {
        return Err(ServiceError::Decode {
            message: format!(
                "expected {} units from systemctl, got {}",
                names.len(),
                blocks.len()
            ),
        });
    }

    Ok(names
        .iter()
        .zip(blocks)
        .map(|(name, block)| ServiceInfo {
            name: name.clone(),
            display_name: block.get("Description").unwrap_or(&"").to_string(),
            state: block.get("ActiveState").unwrap_or(&"unknown").to_string(),
        })
        .collect())
}
