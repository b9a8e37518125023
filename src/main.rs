use clap::Parser;
use stratbuilder::cli::{run, Cli};
use tracing_subscriber::FmtSubscriber;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: failed to install logger: {e}");
    }

    run(cli)
}
