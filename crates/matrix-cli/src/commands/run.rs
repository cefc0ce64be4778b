use anyhow::Result;
use matrix_core::{Assistant, AssistantConfig, Config, ConsoleSpeech};
use matrix_skills::Skills;

/// Overrides given on the `run` command line.
#[derive(Debug, Default)]
pub struct RunOptions {
    pub wake_word: Option<String>,
    pub timeout: Option<u64>,
    pub no_context: bool,
    pub no_history: bool,
}

fn print_banner(config: &AssistantConfig) {
    println!();
    println!("  ███╗   ███╗ █████╗ ████████╗██████╗ ██╗██╗  ██╗");
    println!("  ████╗ ████║██╔══██╗╚══██╔══╝██╔══██╗██║╚██╗██╔╝");
    println!("  ██╔████╔██║███████║   ██║   ██████╔╝██║ ╚███╔╝ ");
    println!("  ██║╚██╔╝██║██╔══██║   ██║   ██╔══██╗██║ ██╔██╗ ");
    println!("  ██║ ╚═╝ ██║██║  ██║   ██║   ██║  ██║██║██╔╝ ██╗");
    println!("  ╚═╝     ╚═╝╚═╝  ╚═╝   ╚═╝   ╚═╝  ╚═╝╚═╝╚═╝  ╚═╝");
    println!();
    println!("  Wake word: \"{}\"", config.wake_word);
    println!("  Say \"{} help\" for what I can do, \"exit\" to quit.", config.wake_word);
    println!();
}

pub async fn run_assistant(mut config: Config, options: RunOptions) -> Result<()> {
    if let Some(wake_word) = options.wake_word {
        config.wake_word = wake_word;
    }
    if let Some(timeout) = options.timeout {
        config.timeout_secs = timeout;
    }
    if options.no_context {
        config.enable_context = false;
    }
    config.validate()?;

    let assistant_config = AssistantConfig::from(&config);
    print_banner(&assistant_config);

    let tts = config
        .voice_feedback
        .then(|| config.tts_command.clone())
        .flatten();
    let speech = ConsoleSpeech::new().with_tts(tts);
    let skills = Skills::from_config(&config);

    let mut assistant = Assistant::new(assistant_config, speech, skills);
    if !options.no_history {
        let db = super::open_database(&config.database_path)?;
        assistant = assistant.with_history(db)?;
    }

    assistant.run().await;

    let stats = assistant.processor().stats();
    if stats.stats.total_processed > 0 {
        println!("\nSession summary");
        println!("{stats}");
    }

    Ok(())
}
