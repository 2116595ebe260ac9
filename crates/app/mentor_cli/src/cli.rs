use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mentor", version, about = "Talk to the entrepreneurship mentor from a terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive conversation. Type `bye` to leave.
    Chat {
        /// User category: aspiring, existing or general.
        #[arg(long, default_value = "general")]
        user_type: String,

        /// Session id (random when omitted).
        #[arg(long)]
        session: Option<String>,

        /// Upstream model provider: gemini or local.
        #[arg(long, env = "CHAT_PROVIDER", default_value = "gemini")]
        provider: String,
    },

    /// Print the version.
    Version,
}
