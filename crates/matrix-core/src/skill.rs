use async_trait::async_trait;

use crate::command::Invocation;
use crate::error::Result;
use crate::speech::Speech;

/// Runs matched invocations.
///
/// The returned string is the reply to speak. Skills that need a
/// follow-up conversation (asking for a contact, confirming) use `speech`.
#[async_trait]
pub trait SkillExecutor: Send {
    async fn execute(&mut self, invocation: &Invocation, speech: &mut dyn Speech) -> Result<String>;
}
