//! scholar-chat - terminal front end for the research assistant
//!
//! Architecture:
//! - Main thread: reads stdin and prints rendered answers
//! - Backend thread: runs a Tokio runtime for the HTTP requests
//! - Communication via crossbeam channels

use std::io::{self, BufRead, Read, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use scholar_chat::backend::{spawn_backend, HttpApi};
use scholar_chat::commands::{parse_command, Command, HELP_TEXT};
use scholar_chat::config::{save_settings, Settings};
use scholar_chat::events::wait_for_reply;
use scholar_chat::logging::init_logging;
use scholar_chat::message::Sender;
use scholar_chat::protocol::QueryMode;
use scholar_chat::state::{Action, ClientState};
use scholar_chat::ui::messages::{html, render, terminal};

/// Extra time granted to the worker beyond the HTTP timeout
const REPLY_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "scholar-chat", version, about = "Research assistant chat client")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render message text given as an argument or on stdin
    Render {
        text: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Terminal)]
        format: Format,
        #[arg(long)]
        no_color: bool,
    },
    /// Start an interactive chat session
    Chat {
        /// Research backend base URL (overrides settings and environment)
        #[arg(long)]
        backend_url: Option<String>,
        /// fast, specific or deep
        #[arg(long, value_parser = parse_mode)]
        mode: Option<QueryMode>,
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Terminal,
    Json,
}

fn parse_mode(s: &str) -> std::result::Result<QueryMode, String> {
    QueryMode::parse(s).ok_or_else(|| format!("unknown mode '{}' (expected fast or deep)", s))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            text,
            format,
            no_color,
        } => run_render(text, format, !no_color),
        Commands::Chat {
            backend_url,
            mode,
            no_color,
        } => run_chat(backend_url, mode, !no_color),
    }
}

fn run_render(text: Option<String>, format: Format, styled: bool) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading message text from stdin")?;
            buf
        }
    };

    let markup = render(&text);
    let out = match format {
        Format::Html => html::to_html(&markup),
        Format::Terminal => terminal::to_terminal(&markup, styled),
        Format::Json => serde_json::to_string_pretty(&markup)?,
    };
    println!("{}", out);
    Ok(())
}

fn run_chat(backend_url: Option<String>, mode: Option<QueryMode>, styled: bool) -> Result<()> {
    let mut settings = Settings::load_or_default();
    settings.apply_env()?;
    if let Some(url) = backend_url {
        settings.set_backend_url(&url)?;
    }
    if let Some(mode) = mode {
        settings.mode = mode;
    }
    settings.validate()?;

    let timeout = Duration::from_secs(settings.request_timeout_secs);
    let api = HttpApi::new(&settings.backend_url, timeout)?;
    let backend = spawn_backend(api, timeout).context("starting backend worker")?;
    let mut state = ClientState::from_settings(&settings);

    info!(backend = %settings.backend_url, mode = ?state.mode, "chat session started");
    println!(
        "Research assistant at {} ({} mode). Type /help for commands.",
        settings.backend_url,
        state.mode.label()
    );

    let stdin = io::stdin();
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line?;

        if let Some(command) = parse_command(&line) {
            match &command {
                Command::Quit => break,
                Command::Help => println!("{}", HELP_TEXT),
                Command::Unknown(msg) => eprintln!("{}", msg),
                Command::Save => {
                    settings.mode = state.mode;
                    match save_settings(&settings) {
                        Ok(path) => println!("Settings saved to {}", path.display()),
                        Err(e) => eprintln!("error: {}", e),
                    }
                }
                Command::SetMode(_) | Command::Clear => {
                    if let Some(action) = command.action() {
                        state = state.update(action).0;
                    }
                    if command == Command::Clear {
                        println!("Conversation cleared.");
                    } else {
                        println!("Mode: {}", state.mode.label());
                    }
                }
            }
            prompt()?;
            continue;
        }

        let (next, action) = state.update(Action::EditInput(line)).0.update(Action::Submit);
        state = next;
        if let Some(action) = action {
            backend.send(action)?;
            state = wait_for_reply(backend.events(), state, timeout + REPLY_GRACE);
            match state.last_error.clone() {
                Some(err) => {
                    eprintln!("error: {}", err);
                    state = state.update(Action::DismissError).0;
                }
                None => {
                    if let Some(reply) = state.log.last().filter(|m| m.sender() == Sender::Bot) {
                        println!("{}\n", terminal::format_message(reply, styled));
                    }
                }
            }
        } else if let Some(err) = state.last_error.clone() {
            eprintln!("error: {}", err);
            state = state.update(Action::DismissError).0;
        }
        prompt()?;
    }

    backend.shutdown();
    info!(messages = state.log.len(), "chat session ended");
    Ok(())
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}
