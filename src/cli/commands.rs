pub(crate) use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use card_ledger::Config;

#[derive(Parser, Debug)]
#[command(
    name = "card-ledger",
    author,
    version,
    about = "A toy card banking ledger served over HTTP",
    long_about = None,
    after_help = "SEEDING:\n    Without --accounts the two demo cards are created.\n    An accounts file is a CSV with columns: card_number, pin, balance\n\n    card-ledger --accounts cards.csv --ledger-out ledger.csv"
)]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "CARD_LEDGER_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Seed accounts CSV
    #[arg(long, env = "CARD_LEDGER_ACCOUNTS", value_name = "FILE")]
    pub accounts: Option<PathBuf>,

    /// Administrator username
    #[arg(long, env = "CARD_LEDGER_ADMIN_USER", default_value = "admin")]
    pub admin_user: String,

    /// Administrator password
    #[arg(
        long,
        env = "CARD_LEDGER_ADMIN_PASSWORD",
        default_value = "admin",
        hide_env_values = true
    )]
    pub admin_password: String,

    /// Minutes before a login session expires
    #[arg(long, env = "CARD_LEDGER_SESSION_TTL_MINUTES", default_value_t = 30)]
    pub session_ttl_minutes: u64,

    /// Only card numbers starting with this prefix are routed to the ledger
    #[arg(long, env = "CARD_LEDGER_CARD_PREFIX", default_value = "4")]
    pub card_prefix: String,

    /// Write the transaction log to this CSV file on shutdown
    #[arg(long, env = "CARD_LEDGER_LEDGER_OUT", value_name = "FILE")]
    pub ledger_out: Option<PathBuf>,
}

impl Args {
    pub fn config(&self) -> Config {
        Config {
            admin_username: self.admin_user.clone(),
            admin_password: self.admin_password.clone(),
            session_ttl: Duration::from_secs(self.session_ttl_minutes.saturating_mul(60)),
            card_prefix: self.card_prefix.clone(),
        }
    }
}
