//! Shutdown, restart, sleep and screen lock.

use matrix_core::command::PowerAction;

use crate::error::{SkillError, SkillResult};
use crate::launcher::{Launcher, Platform, ProgramCall};

pub fn power_call(platform: Platform, action: PowerAction) -> ProgramCall {
    match (platform, action) {
        (Platform::Linux, PowerAction::Shutdown) => ProgramCall::new("systemctl", ["poweroff"]),
        (Platform::Linux, PowerAction::Restart) => ProgramCall::new("systemctl", ["reboot"]),
        (Platform::Linux, PowerAction::Sleep) => ProgramCall::new("systemctl", ["suspend"]),
        (Platform::Linux, PowerAction::Lock) => ProgramCall::new("loginctl", ["lock-session"]),
        (Platform::MacOs, PowerAction::Shutdown) => ProgramCall::new(
            "osascript",
            ["-e", "tell application \"System Events\" to shut down"],
        ),
        (Platform::MacOs, PowerAction::Restart) => ProgramCall::new(
            "osascript",
            ["-e", "tell application \"System Events\" to restart"],
        ),
        (Platform::MacOs, PowerAction::Sleep) => ProgramCall::new("pmset", ["sleepnow"]),
        (Platform::MacOs, PowerAction::Lock) => ProgramCall::new("pmset", ["displaysleepnow"]),
        (Platform::Windows, PowerAction::Shutdown) => {
            ProgramCall::new("shutdown", ["/s", "/t", "1"])
        }
        (Platform::Windows, PowerAction::Restart) => {
            ProgramCall::new("shutdown", ["/r", "/t", "1"])
        }
        (Platform::Windows, PowerAction::Sleep) => ProgramCall::new(
            "rundll32.exe",
            ["powrprof.dll,SetSuspendState", "0,1,0"],
        ),
        (Platform::Windows, PowerAction::Lock) => {
            ProgramCall::new("rundll32.exe", ["user32.dll,LockWorkStation"])
        }
    }
}

pub const fn power_reply(action: PowerAction) -> &'static str {
    match action {
        PowerAction::Shutdown => "Shutting down the computer",
        PowerAction::Restart => "Restarting the computer",
        PowerAction::Sleep => "Putting the computer to sleep",
        PowerAction::Lock => "Locking the computer",
    }
}

/// Performs power actions, refusing the destructive ones unless allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerControl {
    allow_power: bool,
}

impl PowerControl {
    #[must_use]
    pub const fn new(allow_power: bool) -> Self {
        Self { allow_power }
    }

    /// Locking is always allowed.
    pub const fn is_allowed(&self, action: PowerAction) -> bool {
        self.allow_power || matches!(action, PowerAction::Lock)
    }

    pub fn perform(&self, launcher: &mut dyn Launcher, action: PowerAction) -> SkillResult<String> {
        if !self.is_allowed(action) {
            tracing::warn!("Refusing power action {:?}; allow_power is off", action);
            return Err(SkillError::Disabled(String::from(
                "Power actions are disabled. Set allow_power to true in the config to enable them.",
            )));
        }

        let call = power_call(Platform::current(), action);
        tracing::info!("Power action: {}", call);
        launcher.run(&call).map_err(|source| SkillError::Launch {
            program: call.program.clone(),
            source,
        })?;
        Ok(power_reply(action).to_string())
    }
}
