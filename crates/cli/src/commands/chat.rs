//! `dostbot chat` - Interactive or single-message chat mode.

use std::io::Write;

use dostbot_agent::{ChatSession, TurnOutcome};
use dostbot_config::AppConfig;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub async fn run(config: &AppConfig, message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let assistant = super::build_assistant(config)?;
    let knowledge_docs = assistant.knowledge().map_or(0, |kb| kb.document_count());
    let mut session = ChatSession::new(assistant);

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let outcome = session.submit(&msg).await?;
        eprint!("\r              \r");
        return match outcome {
            TurnOutcome::Answered(reply) => {
                println!("{reply}");
                Ok(())
            }
            TurnOutcome::Failed { reason } => Err(format!("Error: {reason}").into()),
        };
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║       🌱 Dostbin AI Assistant — Chat          ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.provider);
    println!("  Model:     {}", config.model);
    if knowledge_docs > 0 {
        println!("  Knowledge: {knowledge_docs} documents");
    } else {
        println!("  Knowledge: none (generic assistant)");
    }
    println!();
    println!("  Type your message and press Enter.");
    println!("  /clear resets the chat, /usage shows token totals.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let rx = spawn_stdin_reader();
    let mut stdout = std::io::stdout();
    drive(&mut session, rx, &mut stdout).await?;

    println!();
    println!("  Goodbye! 🌱");
    println!();

    Ok(())
}

/// One line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Clear,
    Usage,
    Message(String),
}

fn parse_line(line: &str) -> Input {
    match line {
        "/clear" => Input::Clear,
        "/usage" => Input::Usage,
        _ => Input::Message(line.to_string()),
    }
}

fn is_exit(line: &str) -> bool {
    matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q")
}

/// Read stdin lines on a separate task. Blank lines are skipped; the channel
/// closes on EOF or an exit word.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let mut lines = BufReader::new(io::stdin()).lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    if is_exit(&line) {
                        break;
                    }
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF (Ctrl+D)
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read from stdin");
                    break;
                }
            }
        }
    });

    rx
}

/// Run the interactive loop until the input channel closes.
async fn drive<W: Write>(
    session: &mut ChatSession,
    mut rx: mpsc::Receiver<String>,
    out: &mut W,
) -> std::io::Result<()> {
    session.await_input();
    write!(out, "  You > ")?;
    out.flush()?;

    while let Some(line) = rx.recv().await {
        match parse_line(&line) {
            Input::Clear => {
                session.clear();
                writeln!(out, "  Chat cleared.")?;
            }
            Input::Usage => {
                let usage = session.usage_snapshot();
                writeln!(
                    out,
                    "  Tokens: {} in / {} out ({} total), ~${:.6} over {} answered turn(s)",
                    usage.input_tokens,
                    usage.output_tokens,
                    usage.total_tokens,
                    usage.estimated_cost_usd,
                    usage.answered_turns
                )?;
            }
            Input::Message(text) => match session.submit(&text).await {
                Ok(TurnOutcome::Answered(reply)) => {
                    writeln!(out)?;
                    for line in reply.lines() {
                        writeln!(out, "  Assistant > {line}")?;
                    }
                }
                Ok(TurnOutcome::Failed { reason }) => writeln!(out, "  [Error] {reason}")?,
                Err(e) => writeln!(out, "  [Error] {e}")?,
            },
        }

        writeln!(out)?;
        session.await_input();
        write!(out, "  You > ")?;
        out.flush()?;
    }

    Ok(())
}
