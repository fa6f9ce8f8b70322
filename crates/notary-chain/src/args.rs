#![doc(hidden)]

use std::path::PathBuf;

use clap::Parser;

/// Arguments for the notary CLI
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Timestamp a file with a chain of Roughtime attestations, or verify one",
    after_help = "Build mode writes the chain to stdout. Verify mode (--verify) reads a chain \
                  from stdin and prints what it attests to."
)]
pub struct Args {
    #[clap(
        value_name = "FILE",
        required_unless_present = "hash",
        help = "File to timestamp; its SHA-512 is the nonce of the first link"
    )]
    pub file: Option<PathBuf>,

    #[clap(
        long,
        value_name = "HEX",
        help = "Precomputed SHA-512 of the artifact, 128 hex characters, used instead of FILE"
    )]
    pub hash: Option<String>,

    #[clap(
        short = 's',
        long,
        env = "NOTARY_SERVERS",
        value_name = "FILE",
        help = "JSON server directory [default: built-in Google and Cloudflare servers]"
    )]
    pub servers: Option<PathBuf>,

    #[clap(
        short = 'n',
        long = "server",
        value_name = "NAME",
        help = "Server to query, in order; repeat to build a longer chain [default: every \
                server in the directory]"
    )]
    pub server_names: Vec<String>,

    #[clap(
        long,
        help = "Verify a chain read from stdin instead of building one",
        default_value_t = false
    )]
    pub verify: bool,

    #[clap(
        short = 'a',
        long,
        value_name = "N",
        help = "Attempts per server before giving up",
        default_value_t = 3
    )]
    pub attempts: u32,

    #[clap(
        short = 't',
        long,
        value_name = "SECS",
        help = "Seconds to wait for each reply (1 to 3600)",
        value_parser = clap::value_parser!(u64).range(1..=3600),
        default_value_t = 2
    )]
    pub timeout: u64,

    #[clap(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Don't print any messages except for errors",
        default_value_t = false
    )]
    pub quiet: bool,

    #[clap(
        short = 'v',
        long,
        conflicts_with = "quiet",
        action = clap::ArgAction::Count,
        help = "Log details about requests and replies; specify twice to hex dump packets"
    )]
    pub verbose: u8,
}
