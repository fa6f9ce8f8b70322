//! The notary CLI

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use notary_chain::args::Args;
use notary_chain::{
    ChainBuilder, ChainVerifier, RetryPolicy, Server, ServerDirectory, UdpTransport, codec,
};
use notary_common::crypto::sha512_reader;
use notary_common::encoding::nonce_from_hex;
use notary_protocol::tags::Nonce;
use tracing::{debug, error, info, warn};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Directory(#[from] notary_chain::DirectoryError),

    #[error("{0}")]
    Chain(#[from] notary_chain::ChainError),

    #[error("{0}")]
    Verification(#[from] notary_chain::VerificationError),

    #[error("{0}")]
    Codec(#[from] notary_chain::CodecError),

    #[error("--hash must be 128 hex characters: {0}")]
    Hash(#[from] data_encoding::DecodeError),

    #[error("unable to install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

fn main() {
    let args = Args::parse();

    enable_logging(&args);
    debug!("command line: {:?}", args);

    let result = if args.verify {
        verify(&args)
    } else {
        build(&args)
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

fn build(args: &Args) -> Result<(), CliError> {
    let nonce = expected_nonce(args)?;
    let directory = load_directory(args)?;
    let servers = chosen_servers(args, &directory)?;

    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("interrupted, cancelling");
        handler_flag.store(true, Ordering::Relaxed);
    })?;

    let transport = UdpTransport::new().with_cancel(cancel.clone());
    let policy = RetryPolicy::new(args.attempts, Duration::from_secs(args.timeout));

    let chain = ChainBuilder::new(transport)
        .retry_policy(policy)
        .cancel_flag(cancel)
        .build(&nonce, &servers)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    codec::encode_to(&chain, &mut out)?;
    writeln!(out)?;

    Ok(())
}

fn verify(args: &Args) -> Result<(), CliError> {
    let nonce = expected_nonce(args)?;
    let directory = load_directory(args)?;

    let chain = codec::decode_from(BufReader::new(io::stdin().lock()))?;
    debug!("read chain of {} links", chain.len());

    let report = ChainVerifier::new(&directory).verify(&chain, &nonce)?;
    info!("chain of {} links verified", report.links().len());
    println!("{}", report.info());

    Ok(())
}

fn expected_nonce(args: &Args) -> Result<Nonce, CliError> {
    if let Some(hash) = &args.hash {
        return Ok(nonce_from_hex(hash)?);
    }

    match &args.file {
        Some(path) => {
            let file = File::open(path)?;
            let nonce = sha512_reader(BufReader::new(file))?;
            debug!("{} hashes to {:?}", path.display(), nonce);
            Ok(nonce)
        }
        None => {
            let msg = "a FILE or --hash is required";
            Err(io::Error::new(io::ErrorKind::InvalidInput, msg).into())
        }
    }
}

fn load_directory(args: &Args) -> Result<ServerDirectory, CliError> {
    let directory = match &args.servers {
        Some(path) => ServerDirectory::from_file(path)?,
        None => ServerDirectory::builtin(),
    };

    debug!("directory has {} servers", directory.len());
    Ok(directory)
}

fn chosen_servers(args: &Args, directory: &ServerDirectory) -> Result<Vec<Server>, CliError> {
    if args.server_names.is_empty() {
        Ok(directory.servers().to_vec())
    } else {
        Ok(directory.select(&args.server_names)?)
    }
}

fn enable_logging(args: &Args) {
    // stdout carries the chain or the report, so logs go to stderr
    let mut builder = tracing_subscriber::fmt().compact().with_writer(io::stderr);

    if args.quiet {
        builder = builder.with_max_level(tracing::Level::ERROR);
    } else {
        match args.verbose {
            2.. => builder = builder.with_max_level(tracing::Level::TRACE),
            1 => builder = builder.with_max_level(tracing::Level::DEBUG),
            _ => builder = builder.with_max_level(tracing::Level::INFO),
        }
    }

    builder.init();
}
