use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Copy, PartialEq, ValueEnum)]
pub enum SignatureScheme {
    Cavage,
}

#[derive(Args)]
pub struct ParseHeaderArgs {
    /// The header to parse
    pub header: String,

    /// The scheme this header uses
    #[arg(
        default_value_t = SignatureScheme::Cavage,
        long,
        short,
        value_enum,
    )]
    pub scheme: SignatureScheme,
}

#[derive(Args)]
pub struct DigestArgs {
    /// File containing the request body
    pub file: PathBuf,
}

#[derive(Args)]
pub struct GenerateKeyArgs {
    /// Directory the `private.pem` and `public.pem` files are written to
    #[arg(default_value = ".", long, short)]
    pub out_dir: PathBuf,
}

#[derive(Args)]
pub struct SignArgs {
    /// PEM file containing the private key
    #[arg(long, short)]
    pub key: PathBuf,

    /// Key ID put into the signature (usually `<actor URL>#main-key`)
    #[arg(long)]
    pub key_id: String,

    /// Absolute URL of the request
    #[arg(long, short)]
    pub url: String,

    /// HTTP method of the request
    #[arg(default_value = "POST", long, short)]
    pub method: String,

    /// File containing the request body
    #[arg(long, short)]
    pub body: Option<PathBuf>,

    /// Actually send the request and print the response
    #[arg(long)]
    pub send: bool,

    /// Configuration file for the HTTP client
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ToolSubcommand {
    /// Parse the HTTP Signature header and report any format errors
    ParseHeader(ParseHeaderArgs),

    /// Compute the `Digest` header value of a request body
    Digest(DigestArgs),

    /// Generate a new RSA key pair
    GenerateKey(GenerateKeyArgs),

    /// Sign a request and print the resulting headers
    Sign(SignArgs),
}

#[derive(Parser)]
#[command(about, version)]
pub struct ToolArgs {
    #[clap(subcommand)]
    pub subcommand: ToolSubcommand,
}
