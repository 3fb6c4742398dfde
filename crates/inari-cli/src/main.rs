use self::args::{ToolArgs, ToolSubcommand};
use clap::Parser;
use std::env;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

mod args;
mod digest;
mod generate_key;
mod parse_header;
mod sign;
mod util;

fn initialise_logging() {
    let env_filter = env::var("RUST_LOG")
        .ok()
        .and_then(|targets| targets.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::default().with_default(LevelFilter::INFO));

    Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(env_filter),
        )
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    initialise_logging();

    let args = ToolArgs::parse();
    match args.subcommand {
        ToolSubcommand::ParseHeader(args) => parse_header::do_it(args.header, args.scheme),
        ToolSubcommand::Digest(args) => digest::do_it(&args.file).await,
        ToolSubcommand::GenerateKey(args) => generate_key::do_it(&args.out_dir).await,
        ToolSubcommand::Sign(args) => sign::do_it(args).await,
    }
}
