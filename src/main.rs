use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::info;

use sublink_convert::{ConvertError, GeneratorSettings, convert_subscription};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Clash YAML config
    Clash,
    /// sing-box JSON config
    Singbox,
    /// Base64 subscription of the accepted links
    Generic,
}

/// Convert proxy share links into Clash, sing-box or base64 subscriptions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Share links, a base64 subscription or a Clash config (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Clash)]
    format: Format,

    /// Write the result to this file instead of stdout
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    output: Option<PathBuf>,

    /// JSON file with generator settings
    #[arg(short, long, value_name = "FILE")]
    settings: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading settings from {}", path.display()))?;
            GeneratorSettings::from_json(&json)
                .with_context(|| format!("parsing settings in {}", path.display()))?
        }
        None => GeneratorSettings::default(),
    };

    let content = match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading input from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading input from stdin")?;
            buf
        }
    };

    let conversion = match convert_subscription(&content) {
        Ok(conversion) => conversion,
        Err(err) => {
            if let ConvertError::EmptyBatch { diagnostics } = &err {
                for diagnostic in diagnostics {
                    eprintln!("  {}", diagnostic);
                }
            }
            return Err(err).context("converting share links");
        }
    };
    eprintln!("{}", conversion.summary());

    let rendered = match args.format {
        Format::Clash => conversion.clash_config(&settings)?,
        Format::Singbox => conversion.singbox_config(&settings)?,
        Format::Generic => conversion
            .generic_subscription()
            .context("generic output needs share links; Clash config input has none")?,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("writing output to {}", path.display()))?;
            info!("wrote {:?} output to {}", args.format, path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
