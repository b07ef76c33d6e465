use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "botpro", about = "Trade-notes knowledge base and brokerage session service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Listen address (overrides BOTPRO_BIND)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Ingest a text file, one document per non-blank line
    Ingest {
        /// Path to the file
        file: String,
        /// Source label stored with every line
        #[arg(long, default_value = "trades")]
        source: String,
    },
    /// Show the most recent documents
    Recent {
        #[arg(long, default_value = "6", allow_hyphen_values = true)]
        limit: i64,
    },
    /// Ask a question against the most recent documents
    Ask {
        question: String,
        #[arg(long, default_value = "6", allow_hyphen_values = true)]
        limit: i64,
    },
    /// Keyword search
    Search {
        text: String,
        #[arg(long, default_value = "10", allow_hyphen_values = true)]
        limit: i64,
    },
    /// Document counts by source
    Stats,
    /// Log in to the broker and report the outcome
    Connect,
    /// Fetch account balance (RMS)
    Balance,
    /// Last traded price for an instrument
    Ltp {
        /// Exchange (e.g. NSE)
        exchange: String,
        /// Trading symbol (e.g. "NIFTY 50")
        symbol: String,
        /// Symbol token (e.g. 26000)
        token: String,
    },
    /// Option greeks / chain for an underlying
    OptionChain {
        /// Underlying name (e.g. NIFTY)
        name: String,
        /// Expiry date as the broker expects it (e.g. 25JAN2024)
        expiry: String,
    },
}

impl Commands {
    /// Whether the command talks to the broker and so needs credentials.
    pub fn needs_broker(&self) -> bool {
        matches!(
            self,
            Commands::Serve { .. }
                | Commands::Connect
                | Commands::Balance
                | Commands::Ltp { .. }
                | Commands::OptionChain { .. }
        )
    }
}
