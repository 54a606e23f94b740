//! One-shot chat and history commands.

use anyhow::Result;
use console::style;

use twinchat_core::chat::repository::ConversationRepository;
use twinchat_core::storage::box_store::BoxConversationStore;
use twinchat_types::chat::MessageRole;

use crate::state::AppState;

/// Run one turn through the pipeline and print the reply.
///
/// # Examples
///
/// ```bash
/// twinchat chat "What do you work on?"
/// twinchat chat --session 3f2a... "And before that?"
/// ```
pub async fn send_message(
    state: &AppState,
    session: Option<&str>,
    message: &str,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let outcome = state.chat_service.handle_turn(session, message).await?;

    if json {
        let out = serde_json::json!({
            "response": outcome.reply,
            "session_id": outcome.session_id.as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if quiet {
        println!("{}", outcome.reply);
        return Ok(());
    }

    println!();
    println!("  {}", outcome.reply);
    println!();
    println!(
        "  {} {}",
        style("session").dim(),
        style(outcome.session_id.as_str()).cyan()
    );
    println!();
    Ok(())
}

/// Print the stored log for a session.
pub async fn show_history(
    repository: &ConversationRepository<BoxConversationStore>,
    session_id: &str,
    json: bool,
) -> Result<()> {
    let turns = repository.history(session_id).await?;

    if json {
        let out = serde_json::json!({
            "session_id": session_id,
            "messages": turns,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if turns.is_empty() {
        println!();
        println!(
            "  {} No messages stored for session '{}'.",
            style("i").blue().bold(),
            style(session_id).cyan()
        );
        println!();
        return Ok(());
    }

    println!();
    for turn in &turns {
        let who = match turn.role {
            MessageRole::User => style("you").green().bold(),
            MessageRole::Assistant => style("twin").magenta().bold(),
        };
        println!("  {} {}", who, style(&turn.timestamp).dim());
        for line in turn.content.lines() {
            println!("    {line}");
        }
        println!();
    }
    Ok(())
}
