//! Media playback and volume control.

use matrix_core::command::MediaAction;

use crate::error::{SkillError, SkillResult};
use crate::launcher::{Launcher, Platform, ProgramCall};

/// The program that performs `action` on `platform`.
pub fn media_call(platform: Platform, action: MediaAction) -> ProgramCall {
    match platform {
        Platform::Linux => match action {
            MediaAction::PlayPause => ProgramCall::new("playerctl", ["play-pause"]),
            MediaAction::Next => ProgramCall::new("playerctl", ["next"]),
            MediaAction::Previous => ProgramCall::new("playerctl", ["previous"]),
            MediaAction::VolumeUp => {
                ProgramCall::new("pactl", ["set-sink-volume", "@DEFAULT_SINK@", "+5%"])
            }
            MediaAction::VolumeDown => {
                ProgramCall::new("pactl", ["set-sink-volume", "@DEFAULT_SINK@", "-5%"])
            }
            MediaAction::Mute => {
                ProgramCall::new("pactl", ["set-sink-mute", "@DEFAULT_SINK@", "toggle"])
            }
        },
        Platform::MacOs => {
            let script = match action {
                MediaAction::PlayPause => "tell application \"Music\" to playpause",
                MediaAction::Next => "tell application \"Music\" to next track",
                MediaAction::Previous => "tell application \"Music\" to previous track",
                MediaAction::VolumeUp => {
                    "set volume output volume ((output volume of (get volume settings)) + 5)"
                }
                MediaAction::VolumeDown => {
                    "set volume output volume ((output volume of (get volume settings)) - 5)"
                }
                MediaAction::Mute => {
                    "set volume output muted (not (output muted of (get volume settings)))"
                }
            };
            ProgramCall::new("osascript", ["-e", script])
        }
        Platform::Windows => {
            let args: &[&str] = match action {
                MediaAction::PlayPause => &["sendkeypress", "0xB3"],
                MediaAction::Next => &["sendkeypress", "0xB0"],
                MediaAction::Previous => &["sendkeypress", "0xB1"],
                MediaAction::VolumeUp => &["changesysvolume", "3277"],
                MediaAction::VolumeDown => &["changesysvolume", "-3277"],
                MediaAction::Mute => &["mutesysvolume", "2"],
            };
            ProgramCall::new("nircmd", args.iter().copied())
        }
    }
}

pub const fn media_reply(action: MediaAction) -> &'static str {
    match action {
        MediaAction::PlayPause => "Playing or pausing music",
        MediaAction::Next => "Playing next track",
        MediaAction::Previous => "Playing previous track",
        MediaAction::VolumeUp => "Volume increased",
        MediaAction::VolumeDown => "Volume decreased",
        MediaAction::Mute => "Toggling mute",
    }
}

pub fn control(launcher: &mut dyn Launcher, action: MediaAction) -> SkillResult<String> {
    let call = media_call(Platform::current(), action);
    launcher.run(&call).map_err(|source| SkillError::Launch {
        program: call.program.clone(),
        source,
    })?;
    Ok(media_reply(action).to_string())
}
