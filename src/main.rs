use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use saathi_voice::{
    ActivityKind, Config, FileDevices, GeminiLive, JsonStore, SessionState, Speaker, VoiceSession,
};

#[derive(Parser)]
#[command(name = "saathi-voice", about = "Realtime voice study assistant")]
struct Cli {
    /// Config file (without extension)
    #[arg(long, default_value = "config/saathi-voice")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a live voice session fed from a WAV file, writing the spoken
    /// reply to another WAV file
    Run {
        /// 16kHz mono 16-bit WAV file used as captured speech
        #[arg(long)]
        input: PathBuf,
        /// Where to write the assistant's reply audio (24kHz mono WAV)
        #[arg(long, default_value = "reply.wav")]
        output: PathBuf,
    },
    /// Manage saved study notes
    Notes {
        #[command(subcommand)]
        action: NotesAction,
    },
    /// Manage the activity history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum NotesAction {
    /// List saved notes, newest first
    List,
    /// Delete a note by id
    Delete { id: String },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List activity records, newest first
    List,
    /// Remove all activity records
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;
    let store = JsonStore::open(&cfg.storage.path)?;

    match cli.command {
        Command::Run { input, output } => run_session(&cfg, &store, input, output).await,
        Command::Notes { action } => match action {
            NotesAction::List => {
                for note in store.notes()? {
                    println!("{}  [{}] {}: {}", note.id, note.subject, note.title, note.content);
                }
                Ok(())
            }
            NotesAction::Delete { id } => {
                store.delete_note(&id)?;
                info!("Deleted note {}", id);
                Ok(())
            }
        },
        Command::History { action } => match action {
            HistoryAction::List => {
                for item in store.history()? {
                    println!("{}  {:?}  {}", item.id, item.kind, item.action);
                }
                Ok(())
            }
            HistoryAction::Clear => store.clear_history(),
        },
    }
}

async fn run_session(
    cfg: &Config,
    store: &JsonStore,
    input: PathBuf,
    output: PathBuf,
) -> Result<()> {
    let api_key =
        std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY environment variable is not set")?;

    info!("{} starting", cfg.service.name);

    let connector = Arc::new(GeminiLive::new(api_key));
    let devices = Arc::new(FileDevices::new(input, output));
    let session = Arc::new(VoiceSession::new(cfg.session_config(), connector, devices));

    let mut states = session.subscribe();

    if let Err(e) = session.start().await {
        anyhow::bail!("{}", e.user_message());
    }
    store.record_activity("Started AI voice session", ActivityKind::Voice)?;

    info!("Session running; press Ctrl-C to stop");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow().clone();
                match state {
                    SessionState::Idle => break,
                    SessionState::Failed(message) => {
                        error!("Session ended: {}", message);
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    session.stop().await;

    for turn in session.transcript().await {
        let speaker = match turn.speaker {
            Speaker::Assistant => "assistant",
            Speaker::Student => "student",
        };
        println!("{}: {}", speaker, turn.text);
    }

    Ok(())
}
