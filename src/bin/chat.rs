//! Terminal chat client
//!
//! Reads one message per line from stdin and prints the assistant's reply.
//! `/reset` starts a new conversation, `/quit` (or EOF) exits.

use paige::runtime::{ChatSession, HttpRelayClient};
use paige::state_machine::{SessionConfig, SessionStatus};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paige=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let relay_url =
        std::env::var("PAIGE_RELAY_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
    let config = SessionConfig::from_env();

    let relay = HttpRelayClient::new(&relay_url);
    tracing::info!(endpoint = %relay.endpoint(), model = ?config.model, "Starting chat session");
    let session = ChatSession::spawn(relay, config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/reset" => {
                session.reset().await?;
                println!("-- new conversation --");
                continue;
            }
            _ => {}
        }

        if !session.submit(line).await? {
            continue;
        }

        let settled = session.wait_until_settled().await?;
        match &settled.status {
            SessionStatus::Failed { reason, .. } => eprintln!("error: {reason}"),
            _ => {
                if let Some(reply) = settled.messages.last() {
                    println!("{}", reply.content);
                }
            }
        }
    }

    Ok(())
}
