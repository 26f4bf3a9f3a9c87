//! Ask command implementation

use anyhow::Result;
use clap::Args;
use console::style;
use std::io::{self, Write};
use std::path::Path;

use super::utils::{block_on, end_partial_echo, fetch_context, load_config, RepoSourceArgs};
use crate::client::{AnalyzeClient, ChatError, ChatSession, TurnOutcome};

#[derive(Args)]
pub struct AskArgs {
    #[command(flatten)]
    pub source: RepoSourceArgs,

    /// Question about the repository
    #[arg(value_name = "QUESTION")]
    pub question: String,

    /// Answer relay base URL
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,
}

pub fn run(args: AskArgs, config_path: Option<&Path>) -> Result<()> {
    // Reject before any tree is fetched.
    if args.question.trim().is_empty() {
        return Err(ChatError::EmptyQuestion.into());
    }

    let config = load_config(config_path)?;
    let server_url = args.server.unwrap_or(config.client.server_url);

    block_on(async move {
        let context = fetch_context(&args.source, &config.github).await?;
        let client = AnalyzeClient::new(reqwest::Client::new(), &server_url);
        let mut session = ChatSession::new(context, client);

        let mut stdout = io::stdout();
        let mut streamed = false;
        let outcome = session
            .ask_with(&args.question, |fragment| {
                streamed = true;
                let _ = write!(stdout, "{fragment}");
                let _ = stdout.flush();
            })
            .await?;

        match outcome {
            TurnOutcome::Completed => println!(),
            TurnOutcome::BackendError(message) => {
                end_partial_echo(streamed);
                anyhow::bail!("{message}");
            }
            TurnOutcome::FellBack(reason) => {
                end_partial_echo(streamed);
                eprintln!("{} {}", style("relay unavailable:").yellow(), reason);
                if let Some(reply) = session.last_reply() {
                    println!("{}", reply.display_text());
                }
            }
        }
        Ok::<_, anyhow::Error>(())
    })?
}
