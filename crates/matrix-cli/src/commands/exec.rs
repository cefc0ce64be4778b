use anyhow::Result;
use matrix_core::{Assistant, AssistantConfig, Config, ConsoleSpeech, Outcome};
use matrix_skills::Skills;

/// Process one command as if it had followed the wake word.
///
/// Returns whether the command was handled. Follow-up questions (such as
/// "What's the message?") are still asked on the console.
pub async fn run_exec(config: &Config, text: &str) -> Result<bool> {
    let tts = config
        .voice_feedback
        .then(|| config.tts_command.clone())
        .flatten();
    let speech = ConsoleSpeech::new().with_tts(tts);
    let skills = Skills::from_config(config);

    let mut assistant = Assistant::new(AssistantConfig::from(config), speech, skills);
    match super::open_database(&config.database_path) {
        Ok(db) => assistant = assistant.with_history(db)?,
        Err(e) => tracing::warn!("Not recording history: {:#}", e),
    }

    let outcome = assistant.handle(text).await;
    if let Outcome::Failed { error, .. } = &outcome {
        tracing::debug!("Command failed: {}", error);
    }
    Ok(outcome.is_success())
}
