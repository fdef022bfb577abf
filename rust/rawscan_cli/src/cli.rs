use clap::{
    Parser,
    Subcommand,
};
use rawscan::ParserFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import raw files and print a summary of their scans.
    Import(ImportArgs),
    /// Extract the data points of one scan.
    Extract(ExtractArgs),
    /// Write a template import configuration file.
    WriteTemplate(WriteTemplateArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FormatArg {
    Auto,
    Mgf,
    Tdf,
}

impl From<FormatArg> for ParserFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Auto => ParserFormat::Auto,
            FormatArg::Mgf => ParserFormat::Mgf,
            FormatArg::Tdf => ParserFormat::Tdf,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum SerializationFormat {
    Json,
    #[default]
    PrettyJson,
}

/// Import settings shared by every subcommand that reads raw files.
#[derive(Parser, Debug, Clone)]
pub struct ImportOptions {
    /// Path to a json import configuration, see `write-template`.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Raw file format, overrides the configuration.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Do not create scans for spectra without data points.
    #[arg(long)]
    pub skip_empty: bool,

    /// Number of worker threads.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Hide the progress bar.
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ImportArgs {
    /// Raw files to import.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub import: ImportOptions,

    /// Only report files whose name matches this wildcard pattern.
    #[arg(long)]
    pub name_pattern: Option<String>,

    /// Where to write the summary, stdout when missing.
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    #[arg(short = 'f', long, default_value_t, value_enum)]
    pub output_format: SerializationFormat,
}

#[derive(Parser, Debug, Clone)]
pub struct ExtractArgs {
    /// Raw file containing the scan.
    #[arg(short, long)]
    pub raw_file_path: PathBuf,

    /// Scan number to extract.
    #[arg(short, long, conflicts_with = "spectrum_id", required_unless_present = "spectrum_id")]
    pub scan_number: Option<u32>,

    /// Native spectrum identifier to extract.
    #[arg(long)]
    pub spectrum_id: Option<String>,

    /// Inclusive m/z window.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pub mz_range: Option<Vec<f64>>,

    /// Inclusive intensity window.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pub intensity_range: Option<Vec<f32>>,

    #[command(flatten)]
    pub import: ImportOptions,

    /// Where to write the points, stdout when missing.
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    #[arg(short = 'f', long, default_value_t, value_enum)]
    pub output_format: SerializationFormat,
}

#[derive(Parser, Debug)]
pub struct WriteTemplateArgs {
    /// The path to the output file.
    #[arg(short, long)]
    pub output_path: PathBuf,
}
