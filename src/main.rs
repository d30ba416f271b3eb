use std::{io, process};

use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    // Quiet by default; stderr must carry nothing but the diagnostic line.
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    process::exit(sol25::cli::run());
}
