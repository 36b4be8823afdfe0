//! Implied volatility surface from a saved option chain
//!
//! Loads an `OptionChainSnapshot` JSON file (as written by the chain cache)
//! and prints the call and put surfaces as days x moneyness tables.
//!
//! Usage: iv_surface <CHAIN_JSON> [RATE] [DIVIDEND_YIELD] [--strike]

use std::env;
use std::fs::File;
use std::io::BufReader;

use tracing_subscriber::EnvFilter;

use options_pricer::prelude::*;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> PricerResult<()> {
    let config = AppConfig::from_env()?;
    let args: Vec<String> = env::args().skip(1).collect();
    let use_strike = args.iter().any(|a| a == "--strike");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    let path = positional
        .first()
        .ok_or_else(|| PricerError::config("usage: iv_surface <CHAIN_JSON> [RATE] [DIVIDEND_YIELD] [--strike]"))?;
    let parse = |idx: usize, default: f64| -> PricerResult<f64> {
        match positional.get(idx) {
            Some(raw) => raw
                .parse()
                .map_err(|_| PricerError::config(format!("invalid number: {}", raw))),
            None => Ok(default),
        }
    };
    let rate = parse(1, config.fallback_rate)?;
    let dividend_yield = parse(2, 0.0)?;

    println!("Implied Volatility Surface");
    println!("==========================\n");

    let reader = BufReader::new(File::open(path.as_str())?);
    let chain: OptionChainSnapshot = serde_json::from_reader(reader)?;

    println!("Loaded {} option chain", chain.symbol);
    println!("  Spot: ${:.2}", chain.spot);
    println!("  Timestamp: {}", chain.timestamp);
    println!("  Quotes: {}  Expiries: {}", chain.len(), chain.expiries().len());
    println!("  Rate: {:.2}%  Dividend yield: {:.2}%", rate * 100.0, dividend_yield * 100.0);

    let surface_config = if use_strike {
        SurfaceConfig::strike_filter_from_percent(chain.spot, 80.0, 120.0)
    } else {
        SurfaceConfig::new(true, Some((0.8, 1.2)))
    };

    let surfaces = build_surface_for_chain(Some(&chain), rate, dividend_yield, &surface_config);

    for side in [OptionType::Call, OptionType::Put] {
        println!("\n--- {} ---\n", side.as_str().to_uppercase());
        match surfaces.side(side) {
            Some(grid) => print_grid(grid),
            None => println!("No {} quotes survived solving and filtering", side),
        }
    }

    Ok(())
}

fn print_grid(grid: &SurfaceGrid) {
    println!("{}", grid.title());

    let corner = match grid.axis {
        SurfaceAxis::Moneyness => "K/S\\Days",
        SurfaceAxis::Strike => "K\\Days",
    };
    print!("{:>10} |", corner);
    for d in &grid.days {
        print!(" {:>6}", d);
    }
    println!();
    print!("-----------+");
    for _ in &grid.days {
        print!("-------");
    }
    println!();

    for &y in &grid.y_values {
        print!("{:>10.2} |", y);
        for &d in &grid.days {
            match grid.get(d, y) {
                Some(iv) => print!(" {:>6.1}", iv * 100.0),
                None => print!("      -"),
            }
        }
        println!();
    }

    if let Some((lo, hi)) = grid.vol_range() {
        println!("\nIV range: {:.1}% - {:.1}% over {} cells", lo * 100.0, hi * 100.0, grid.len());
    }
}
