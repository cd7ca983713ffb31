use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::*;
use log::LevelFilter;
use wpanctl::args::parse_unsigned;
use wpanctl::{Dispatcher, Error, Registry, ReplayTransport, SysfsResolver, Transport};
use wpanctl_cli::ReportPrinter;

/// Control IEEE 802.15.4 interfaces through nl802154.
///
/// Without `--response` the encoded request is printed as hex.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The generic netlink family ID of nl802154.
    #[arg(long, value_parser = parse_family, required_unless_present = "list")]
    family_id: Option<u16>,

    /// The sequence number of the request. Random by default.
    #[arg(long, value_parser = parse_sequence)]
    sequence: Option<u32>,

    /// A response message, hex encoded. Repeat for a multipart response.
    #[arg(long = "response", value_name = "HEX")]
    responses: Vec<String>,

    /// Where network devices and wpan phys are looked up.
    #[arg(long, default_value = "/sys/class")]
    sysfs: PathBuf,

    /// List the available commands.
    #[arg(long)]
    list: bool,

    /// Log more, up to `-vv`. `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// The command section, e.g. `set`.
    #[arg(required_unless_present = "list")]
    section: Option<String>,

    /// The command verb, e.g. `channel`.
    #[arg(required_unless_present = "list")]
    verb: Option<String>,

    /// The identifier and arguments of the command.
    #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
    args: Vec<String>,
}

fn parse_family(s: &str) -> Result<u16, String> {
    parse_unsigned(s)
        .and_then(|id| u16::try_from(id).ok())
        .ok_or_else(|| format!("`{s}` is not a 16 bit family ID"))
}

fn parse_sequence(s: &str) -> Result<u32, String> {
    parse_unsigned(s)
        .and_then(|seq| u32::try_from(seq).ok())
        .ok_or_else(|| format!("`{s}` is not a 32 bit sequence number"))
}

fn run(args: Args) -> Result<String, Error> {
    let registry = Registry::standard()?;
    if args.list {
        return Ok(ReportPrinter::render_commands(&registry));
    }

    let family = args.family_id.unwrap_or_default();
    let resolver = SysfsResolver::new(args.sysfs);
    let mut dispatcher = match args.sequence {
        Some(sequence) => Dispatcher::with_sequence(&registry, resolver, family, sequence),
        None => Dispatcher::new(&registry, resolver, family),
    };

    let section = args.section.as_deref().unwrap_or_default();
    let verb = args.verb.as_deref().unwrap_or_default();
    let tokens: Vec<&str> = args.args.iter().map(String::as_str).collect();
    let request = dispatcher.dispatch_tokens(section, verb, &tokens)?;

    if args.responses.is_empty() {
        return Ok(format!("{}\n", hex::encode(&request.bytes)));
    }

    let mut transport = ReplayTransport::new();
    transport.push_hex(&args.responses)?;
    let responses = transport.send_and_await(&request.bytes, request.dump)?;
    let reports = request.complete(&responses)?;

    Ok(ReportPrinter::render_all(&reports))
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .parse_default_env()
        .init();

    match run(args) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::from(err.exit_code())
        }
    }
}
