//! Command line arguments.
use std::path::PathBuf;

use aamva_barcodes::{logging::LogFormat, FormatVersion};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser)]
#[command(
    name = "aamva-barcodes",
    version,
    about = "Encode AAMVA DL/ID card data for PDF417 barcodes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand)]
pub enum Command {
    /// Encode card attributes (JSON) into a card data stream.
    Encode(EncodeArgs),

    /// Show the header, elements and bytes of a card data stream.
    Inspect(InspectArgs),

    /// List the known issuing jurisdictions.
    Jurisdictions,
}

#[derive(Parser)]
pub struct EncodeArgs {
    /// JSON file holding the card attributes.
    #[arg(value_name = "ATTRIBUTES")]
    pub input: PathBuf,

    /// Issuing jurisdiction code, such as `CO`.
    #[arg(short, long)]
    pub jurisdiction: String,

    /// Header layout.
    #[arg(long, value_enum, default_value = "standard")]
    pub format: FormatArg,

    /// Write the stream to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Leave an optional element out of the stream. Accepts an identifier
    /// (`DAU`) or a name (`height`).
    #[arg(long = "exclude", value_name = "ELEMENT")]
    pub exclude: Vec<String>,

    /// JSON file mapping element names or identifiers to visibility.
    #[arg(long, value_name = "FILE")]
    pub visibility: Option<PathBuf>,

    /// Value written for empty elements that have no default.
    #[arg(long, value_name = "TOKEN")]
    pub substitute: Option<String>,

    /// Print a hex dump of the stream.
    #[arg(long)]
    pub hex: bool,

    /// PDF417 data columns the stream must fit in.
    #[arg(long, default_value_t = 15)]
    pub columns: u8,

    /// PDF417 error correction level the stream must fit with.
    #[arg(long = "ecc-level", default_value_t = 5)]
    pub ecc_level: u8,

    /// Render the PDF417 symbol to this PNG file.
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// Pixels per symbol module in the rendered image.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub scale: u32,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Card data stream file.
    #[arg(value_name = "STREAM")]
    pub input: PathBuf,

    /// Skip the hex dump.
    #[arg(long = "no-hex")]
    pub no_hex: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// 21 byte header with AAMVA version, jurisdiction version and entry
    /// count.
    Standard,

    /// 26 byte header with a control field declaring the total length.
    ControlField,
}

impl From<FormatArg> for FormatVersion {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Standard => Self::Standard,
            FormatArg::ControlField => Self::ControlField,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}
