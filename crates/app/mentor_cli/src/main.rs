// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use std::io::{BufRead, Write};

use clap::Parser;
use cli::{Cli, Commands};
use mentor_core::model::Provider;
use mentor_core::{ChatRelay, RelayConfig};

mod cli;
mod logging;

const EXIT_WORD: &str = "bye";

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init()?;

    let args = Cli::parse();

    match args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
        Commands::Chat {
            user_type,
            session,
            provider,
        } => {
            let provider = Provider::parse(&provider)
                .ok_or_else(|| Error::Custom(format!("unknown provider: {provider}")))?;
            let session = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            chat(provider, &user_type, &session)?;
        }
    }

    Ok(())
}

/// Read lines from stdin and relay each one until `bye` or end of input.
fn chat(provider: Provider, user_type: &str, session: &str) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let model = mentor_core::model::from_env(provider)?;
    log::info!("chatting with {} as session {session}", model.name());
    let relay = ChatRelay::new(model, RelayConfig::from_env());

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        write!(stdout, "You: ")?;
        stdout.flush()?;

        let Some(line) = lines.next().transpose()? else {
            writeln!(stdout)?;
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case(EXIT_WORD) {
            writeln!(stdout, "Chatbot: Goodbye!")?;
            break;
        }

        match runtime.block_on(relay.submit_message(message, Some(user_type), Some(session))) {
            Ok(reply) => writeln!(stdout, "AI: {}", reply.reply)?,
            Err(e) => writeln!(stdout, "Error: {e}")?,
        }
    }

    Ok(())
}
