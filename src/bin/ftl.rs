use clap::Parser;

use ftl_cli::commands::{
    build::BuildCommand, deploy::DeployCommand, oci::OciCommands, synth::SynthCommand,
    validate::ValidateCommand,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();

    let result = Cli::parse().run().await;
    if let Err(err) = result {
        terminal::error!("{:#}", err.error);
        std::process::exit(err.code as i32);
    }
}

/// The FTL CLI.
#[derive(Parser, Debug)]
#[clap(name = "ftl", version)]
enum Cli {
    Validate(ValidateCommand),
    Synth(SynthCommand),
    Build(BuildCommand),
    Deploy(DeployCommand),
    /// Manage registry credentials.
    #[clap(subcommand)]
    Oci(OciCommands),
}

impl Cli {
    async fn run(self) -> Result<(), ftl_cli::commands::CommandError> {
        match self {
            Self::Validate(cmd) => cmd.run(),
            Self::Synth(cmd) => cmd.run(),
            Self::Build(cmd) => cmd.run(),
            Self::Deploy(cmd) => cmd.run().await,
            Self::Oci(cmd) => cmd.run().await,
        }
    }
}
