mod command;
mod config;
mod report;
mod track;
mod util;

fn main() -> anyhow::Result<()> {
    init_tracing();
    command::run()
}

/// Installs the `RUST_LOG`-driven subscriber. Logs go to stderr so JSON on stdout stays clean.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
