use clap::{Parser, Subcommand};
use gmid_lookup::inverse::{self, InverseRequest};
use gmid_lookup::lookup;
use gmid_lookup::output;
use gmid_lookup::parser::{self, Polarity};
use gmid_lookup::request::LookupRequest;
use gmid_lookup::stats::Stats;
use gmid_lookup::Method;
use std::io;
use std::time::Instant;

/// gm/ID lookup over MOSFET characterization tables
#[derive(Parser)]
#[command(name = "gmid-lookup", version)]
struct Cli {
    /// Characterization table file
    table: String,

    /// Device block to use (defaults to NCH, else PCH)
    #[arg(long)]
    device: Option<Polarity>,

    /// Print performance stats to stderr
    #[arg(long)]
    stats: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Forward lookup of a quantity or ratio, e.g. `lookup GM_ID -a L=0.18`
    Lookup {
        /// Output quantity (ID, GM, ...) or ratio (GM_ID, ID_W, ...)
        output: String,

        /// Bound argument NAME=VALUE; VALUE is a number, list or start:step:end
        #[arg(short = 'a', long = "arg", value_parser = parse_binding)]
        args: Vec<(String, String)>,

        /// Interpolation method: pchip, linear, nearest, cubic
        #[arg(long)]
        method: Option<Method>,
    },
    /// Solve for VGS at a GM_ID or ID_W target
    Vgs {
        /// Argument NAME=VALUE (GM_ID, ID_W, L, VDS, VSB, VGB, VDB)
        #[arg(short = 'a', long = "arg", value_parser = parse_binding)]
        args: Vec<(String, String)>,

        /// Interpolation method: pchip, linear, nearest, cubic
        #[arg(long)]
        method: Option<Method>,
    },
    /// Show table axes, width and available quantities
    Info,
}

fn parse_binding(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut stats = if cli.stats { Some(Stats::new()) } else { None };

    let start = Instant::now();
    let file = parser::load(&cli.table).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", cli.table, e);
        std::process::exit(1);
    });
    if let Some(ref mut s) = stats {
        s.add_phase("Parse", start.elapsed());
    }

    let (polarity, table) = match cli.device {
        Some(p) => match file.device(p) {
            Some(table) => (p, table),
            None => {
                eprintln!("No {} device in {}", p, cli.table);
                std::process::exit(1);
            }
        },
        None => file.primary().unwrap_or_else(|| {
            eprintln!("No device data in {}", cli.table);
            std::process::exit(1);
        }),
    };
    tracing::info!(device = %polarity, "table loaded");

    let mut stdout = io::stdout();

    match &cli.command {
        Command::Lookup {
            output: name,
            args,
            method,
        } => {
            let pairs: Vec<(&str, &str)> =
                args.iter().map(|(n, v)| (n.as_str(), v.as_str())).collect();
            let mut request = LookupRequest::from_args(name, &pairs).unwrap_or_else(|e| {
                eprintln!("Request error: {}", e);
                std::process::exit(1);
            });
            if let Some(m) = method {
                request = request.with_method(*m);
            }
            let result =
                lookup::forward_lookup(table, &request, stats.as_mut()).unwrap_or_else(|e| {
                    eprintln!("Lookup error: {}", e);
                    std::process::exit(1);
                });
            output::write_csv(&result, &mut stdout).unwrap_or_else(|e| {
                eprintln!("Output error: {}", e);
                std::process::exit(1);
            });
        }
        Command::Vgs { args, method } => {
            let pairs: Vec<(&str, &str)> =
                args.iter().map(|(n, v)| (n.as_str(), v.as_str())).collect();
            let mut request = InverseRequest::from_args(&pairs).unwrap_or_else(|e| {
                eprintln!("Request error: {}", e);
                std::process::exit(1);
            });
            if let Some(m) = method {
                request = request.with_method(*m);
            }
            let result =
                inverse::inverse_vgs(table, &request, stats.as_mut()).unwrap_or_else(|e| {
                    eprintln!("VGS lookup error: {}", e);
                    std::process::exit(1);
                });
            output::write_csv(&result.into_dyn(), &mut stdout).unwrap_or_else(|e| {
                eprintln!("Output error: {}", e);
                std::process::exit(1);
            });
        }
        Command::Info => {
            output::write_info(table, &mut stdout).unwrap_or_else(|e| {
                eprintln!("Output error: {}", e);
                std::process::exit(1);
            });
        }
    }

    if let Some(ref stats) = stats {
        stats.display();
    }
}
