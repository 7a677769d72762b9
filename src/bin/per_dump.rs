//! Decode a UPER PDU against an ASN.1 module and print the value.
//!
//! Usage:
//!   per_dump --schema rrc.asn --type UL-CCCH-Message --hex 1dec89d05766
//!   per_dump --schema rrc.asn --type UL-CCCH-Message --input pdu.bin --format json

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use log::{debug, warn};
use rrc_uper::dump::{to_json_pretty, value_to_dump};
use rrc_uper::{parse_file, Codec, ResolvedModule};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(short, long, help = "ASN.1 module with the type definitions")]
    schema: PathBuf,

    #[arg(short = 't', long = "type", help = "Name of the top-level type")]
    type_name: String,

    #[arg(long, conflicts_with = "input", help = "PDU as hex (spaces allowed)")]
    hex: Option<String>,

    #[arg(short, long, help = "File holding the raw PDU")]
    input: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "text", help = "Output format")]
    format: OutputFormat,

    #[arg(short, long, help = "Show debug messages")]
    debug: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn read_pdu(args: &Args) -> anyhow::Result<Vec<u8>> {
    match (&args.hex, &args.input) {
        (Some(text), _) => {
            let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            hex::decode(&compact).with_context(|| format!("invalid hex {text:?}"))
        }
        (None, Some(path)) => {
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))
        }
        (None, None) => bail!("one of --hex or --input is required"),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new().filter_level(level).init();

    let module = parse_file(&args.schema)
        .with_context(|| format!("parsing {}", args.schema.display()))?;
    let resolved = ResolvedModule::resolve(module).context("resolving schema")?;
    debug!("{} types loaded", resolved.type_names().count());
    let codec = Codec::new(resolved);

    let pdu = read_pdu(&args)?;
    let (bits, value) = codec.decode_with_extent(&args.type_name, &pdu);
    let value = value.with_context(|| format!("decoding {} at bit {bits}", args.type_name))?;
    let padding = (pdu.len() * 8).saturating_sub(bits);
    if padding >= 8 {
        warn!("{} trailing octets not consumed", padding / 8);
    }

    match args.format {
        OutputFormat::Text => println!("{}", value_to_dump(&value, 0)),
        OutputFormat::Json => println!("{}", to_json_pretty(&value)?),
    }
    Ok(())
}
