//! Starting external programs.
//!
//! Skills never call `std::process` directly; they describe the program
//! and arguments and hand them to a [`Launcher`]. That keeps the
//! platform-specific command tables testable.

use std::fmt;
use std::io;
use std::process::{Command, Stdio};

use tokio::runtime::{Handle, RuntimeFlavor};

/// The operating system family, which decides the command tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    /// The program that opens a URL or file with its default handler.
    pub fn opener(self, target: &str) -> ProgramCall {
        match self {
            Self::Linux => ProgramCall::new("xdg-open", [target]),
            Self::MacOs => ProgramCall::new("open", [target]),
            Self::Windows => ProgramCall::new("cmd", ["/C", "start", "", target]),
        }
    }
}

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramCall {
    pub program: String,
    pub args: Vec<String>,
}

impl ProgramCall {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for ProgramCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

pub trait Launcher: Send + fmt::Debug {
    /// Start a program in the background without waiting for it.
    fn spawn(&mut self, call: &ProgramCall) -> io::Result<()>;

    /// Run a program to completion; a non-zero exit is an error.
    fn run(&mut self, call: &ProgramCall) -> io::Result<()>;

    /// Open a URL or file with the platform's default handler.
    fn open(&mut self, target: &str) -> io::Result<()> {
        let call = Platform::current().opener(target);
        self.spawn(&call)
    }
}

/// Launches real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn spawn(&mut self, call: &ProgramCall) -> io::Result<()> {
        tracing::debug!("Spawning: {}", call);
        let mut child = Command::new(&call.program)
            .args(&call.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        // Reap the child so it does not linger as a zombie.
        std::thread::spawn(move || {
            if let Err(e) = child.wait() {
                tracing::debug!("Failed to wait for child: {}", e);
            }
        });
        Ok(())
    }

    fn run(&mut self, call: &ProgramCall) -> io::Result<()> {
        tracing::debug!("Running: {}", call);
        let status = outside_runtime(|| {
            Command::new(&call.program)
                .args(&call.args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("{} exited with {status}", call.program)))
        }
    }
}

/// Run a blocking wait without stalling a multi-threaded tokio runtime.
fn outside_runtime<T>(wait: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(wait)
        }
        _ => wait(),
    }
}

/// Records calls instead of running them.
#[derive(Debug, Default, Clone)]
pub struct RecordingLauncher {
    calls: Vec<ProgramCall>,
    fail: bool,
}

impl RecordingLauncher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A launcher whose every call fails as if the program were missing.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            calls: Vec::new(),
            fail: true,
        }
    }

    pub fn calls(&self) -> &[ProgramCall] {
        &self.calls
    }

    pub fn last(&self) -> Option<&ProgramCall> {
        self.calls.last()
    }

    fn record(&mut self, call: &ProgramCall) -> io::Result<()> {
        self.calls.push(call.clone());
        if self.fail {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", call.program),
            ));
        }
        Ok(())
    }
}

impl Launcher for RecordingLauncher {
    fn spawn(&mut self, call: &ProgramCall) -> io::Result<()> {
        self.record(call)
    }

    fn run(&mut self, call: &ProgramCall) -> io::Result<()> {
        self.record(call)
    }
}
