use std::path::PathBuf;

use agrobot::{AgroBot, UserProfile};
use clap::{Parser, Subcommand};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "agrobot", version, about = "Multilingual farming assistant")]
struct Cli {
    /// Knowledge base JSON file (overrides AGROBOT_KB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    kb: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer a farming question
    Ask {
        /// Reply language, e.g. hi, ta, kn
        #[arg(long, value_name = "CODE")]
        lang: Option<String>,

        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Summarize a document or image
    Summarize { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("agrobot=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let bot = AgroBot::from_env(cli.kb).inspect_err(|e| error!("startup failed: {e}"))?;

    let output = match cli.command {
        Command::Ask { lang, message } => {
            let profile = match lang {
                Some(code) => UserProfile::new().with_preferred_language(code),
                None => UserProfile::new(),
            };
            bot.answer(&profile, &message.join(" ")).await
        }
        Command::Summarize { path } => {
            info!(path = %path.display(), "summarizing");
            bot.summarize_file(&path).await
        }
    };

    println!("{output}");
    Ok(())
}
