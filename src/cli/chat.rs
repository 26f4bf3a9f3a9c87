//! Interactive chat REPL

use anyhow::Result;
use clap::Args;
use console::{style, StyledObject};
use dialoguer::{theme::ColorfulTheme, Input};
use std::io::{self, Write};
use std::path::Path;

use super::utils::{block_on, end_partial_echo, fetch_context, load_config, RepoSourceArgs};
use crate::client::{AnalyzeClient, ChatError, ChatSession, TurnOutcome};
use crate::domain::Role;

const QUIT_COMMANDS: [&str; 3] = ["exit", "quit", "/q"];

#[derive(Args)]
pub struct ChatArgs {
    #[command(flatten)]
    pub source: RepoSourceArgs,

    /// Answer relay base URL
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,
}

fn role_label(role: Role) -> StyledObject<String> {
    match role {
        Role::User => style(format!("{role}>")).green().bold(),
        Role::Assistant => style(format!("{role}>")).cyan().bold(),
    }
}

pub fn run(args: ChatArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let server_url = args.server.unwrap_or(config.client.server_url);

    block_on(async move {
        let context = fetch_context(&args.source, &config.github).await?;
        println!(
            "{} {} ({} entries)",
            style("Repository:").bold(),
            context.repo,
            context.entries.len()
        );
        let client = AnalyzeClient::new(reqwest::Client::new(), &server_url);
        let mut session = ChatSession::new(context, client);

        for message in session.messages() {
            println!("{} {}", role_label(message.role), message.display_text());
        }

        let theme = ColorfulTheme::default();
        loop {
            let line = Input::<String>::with_theme(&theme)
                .with_prompt("you")
                .allow_empty(true)
                .interact_text()?;
            if QUIT_COMMANDS.contains(&line.trim()) {
                break;
            }
            if line.trim().is_empty() {
                println!("{}", style(ChatError::EmptyQuestion).yellow());
                continue;
            }

            print!("{} ", role_label(Role::Assistant));
            io::stdout().flush()?;
            let mut stdout = io::stdout();
            let mut streamed = false;
            let outcome = session
                .ask_with(&line, |fragment| {
                    streamed = true;
                    let _ = write!(stdout, "{fragment}");
                    let _ = stdout.flush();
                })
                .await;

            match outcome {
                Ok(TurnOutcome::Completed) => println!(),
                Ok(TurnOutcome::BackendError(message)) => {
                    end_partial_echo(streamed);
                    println!("{}", style(message).red());
                }
                Ok(TurnOutcome::FellBack(reason)) => {
                    tracing::debug!("Chat turn fell back: {}", reason);
                    end_partial_echo(streamed);
                    if let Some(reply) = session.last_reply() {
                        println!("{}", style(reply.display_text()).dim());
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok::<_, anyhow::Error>(())
    })?
}
