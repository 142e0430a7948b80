use clap::Parser;
use std::process;

use gzstatic::args::Args;
use gzstatic::errors::log_error_chain;
use gzstatic::logging::setup_logging;
use gzstatic::server::start_server;

fn main() {
    setup_logging();
    let args = Args::parse();
    if let Err(e) = start_server(args) {
        log_error_chain(e.to_string());
        process::exit(1);
    }
}
