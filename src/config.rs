//! Command line and environment configuration.
//!
//! Every setting has a flag, an environment variable and a default. A `.env`
//! file in the working directory is loaded before parsing.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub const DEFAULT_HTTP_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8000));
pub const DEFAULT_DATAGRAM_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8001));
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
pub const DEFAULT_SITE_ROOT: &str = "site";
pub const DEFAULT_DATABASE_PATH: &str = "data/formcast.db";
pub const DEFAULT_COLLECTION: &str = "messages";

#[derive(Debug, Parser)]
#[command(
    name = "formcast",
    version,
    about = "Serve a small site and persist its form submissions via a UDP hand-off.",
    long_about = None,
)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Which component to run; both when omitted.
    #[command(subcommand)]
    pub component: Option<Component>,
}

/// Settings shared by both components. Each component reads only its part.
#[derive(Clone, Debug, Args)]
pub struct Config {
    /// Address the HTTP front end listens on.
    #[arg(long, env = "FORMCAST_HTTP_ADDR", default_value_t = DEFAULT_HTTP_ADDR, global = true)]
    pub http_addr: SocketAddr,

    /// Address the datagram listener binds and the front end sends to.
    #[arg(long, env = "FORMCAST_DATAGRAM_ADDR", default_value_t = DEFAULT_DATAGRAM_ADDR, global = true)]
    pub datagram_addr: SocketAddr,

    /// Receive buffer size; longer datagrams are truncated.
    #[arg(long, env = "FORMCAST_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE, global = true)]
    pub chunk_size: usize,

    /// Directory holding index.html, error.html, templates/ and db/.
    #[arg(long, env = "FORMCAST_SITE_ROOT", default_value = DEFAULT_SITE_ROOT, global = true)]
    pub site_root: PathBuf,

    /// libSQL database file for persisted submissions.
    #[arg(long, env = "FORMCAST_DATABASE_PATH", default_value = DEFAULT_DATABASE_PATH, global = true)]
    pub database_path: PathBuf,

    /// Collection (table) submissions are stored in.
    #[arg(long, env = "FORMCAST_COLLECTION", default_value = DEFAULT_COLLECTION, global = true)]
    pub collection: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR,
            datagram_addr: DEFAULT_DATAGRAM_ADDR,
            chunk_size: DEFAULT_CHUNK_SIZE,
            site_root: PathBuf::from(DEFAULT_SITE_ROOT),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            collection: DEFAULT_COLLECTION.to_owned(),
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Components that can run in this process.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Subcommand)]
pub enum Component {
    /// HTTP front end and datagram listener together.
    #[default]
    All,
    /// Only the HTTP front end.
    Http,
    /// Only the datagram listener and persister.
    Listener,
}

impl Component {
    pub fn runs_http(self) -> bool {
        matches!(self, Self::All | Self::Http)
    }

    pub fn runs_listener(self) -> bool {
        matches!(self, Self::All | Self::Listener)
    }
}
