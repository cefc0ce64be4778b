//! Core of the Matrix assistant.
//!
//! This crate holds the command registry and matcher, the command
//! processor, conversation context, the wake-word conversation loop,
//! configuration, and the SQLite command history.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod assistant;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod helpers;
pub mod ids;
pub mod matcher;
pub mod params;
pub mod processor;
pub mod schema;
pub mod skill;
pub mod speech;

pub use assistant::{Assistant, AssistantConfig, State};
pub use command::{Action, Argument, Category, Command, Invocation, Registry};
pub use config::Config;
pub use context::ContextManager;
pub use error::{Error, Result};
pub use processor::{CommandProcessor, Outcome};
pub use skill::SkillExecutor;
pub use speech::{ConsoleSpeech, Heard, ScriptedSpeech, Speech};
