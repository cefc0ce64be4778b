//! End-to-end conversations through the assistant with real skills.
//!
//! External programs are recorded instead of started, so these tests run
//! without a browser, media player or desktop session.

use matrix_core::schema::Database;
use matrix_core::{Assistant, AssistantConfig, Config, Outcome, ScriptedSpeech};
use matrix_skills::{RecordingLauncher, Skills};
use tempfile::TempDir;

fn config(dir: &TempDir) -> Config {
    Config {
        app_paths_file: dir.path().join("app_paths.json"),
        contacts_file: dir.path().join("contacts.json"),
        files_base_dir: dir.path().join("workspace"),
        ..Config::default()
    }
}

fn assistant(
    config: &Config,
    inputs: &[&str],
) -> Assistant<ScriptedSpeech, Skills<RecordingLauncher>> {
    Assistant::new(
        AssistantConfig::from(config),
        ScriptedSpeech::new(inputs.iter().copied()),
        Skills::with_launcher(config, RecordingLauncher::new()),
    )
}

#[tokio::test]
async fn test_conversation_with_files_and_browser() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    std::fs::create_dir_all(&config.files_base_dir).unwrap();

    let mut assistant = assistant(
        &config,
        &[
            "matrix",
            "create folder projects",
            "search for rust async",
            "go to sleep",
        ],
    );
    assistant.run().await;

    let spoken = assistant.speech().spoken();
    assert!(spoken.contains(&String::from("Folder 'projects' created.")));
    assert!(spoken.contains(&String::from("Searching for rust async")));
    assert!(spoken.contains(&String::from("Going to sleep mode.")));
    assert!(config.files_base_dir.join("projects").is_dir());
    assert_eq!(assistant.executor().launcher().calls().len(), 1);
}

#[tokio::test]
async fn test_missing_parameter_asks_again() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let mut assistant = assistant(&config, &[]);

    let outcome = assistant.handle("create folder").await;
    assert!(!outcome.is_success());
    assert_eq!(outcome.reply(), Some("Please tell me the name."));
}

#[tokio::test]
async fn test_unknown_app_is_a_failure() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let mut assistant = assistant(&config, &[]);

    let outcome = assistant.handle("open spotify").await;
    assert!(matches!(outcome, Outcome::Failed { .. }));
    assert_eq!(outcome.reply(), Some("Spotify not found on your system"));
    assert_eq!(assistant.processor().stats().stats.failed, 1);
}

#[tokio::test]
async fn test_message_flow_is_recorded() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let db = Database::open(dir.path().join("matrix.db")).unwrap();

    let mut skills = Skills::with_launcher(&config, RecordingLauncher::new());
    skills
        .messages_mut()
        .add_contact("Mom", "+15550100100", None)
        .unwrap();

    let mut assistant = Assistant::new(
        AssistantConfig::from(&config),
        ScriptedSpeech::new(["mom", "on my way", "yes"]),
        skills,
    )
    .with_history(db)
    .unwrap();

    let outcome = assistant.handle("send message").await;
    assert_eq!(outcome.reply(), Some("Message sent to Mom"));

    let db = Database::open(dir.path().join("matrix.db")).unwrap();
    let history = db.recent_commands(10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].command, "send message");
    assert!(history[0].success);
}
