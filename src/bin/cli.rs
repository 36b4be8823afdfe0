//! Options pricer CLI
//!
//! Text dashboard: prices and Greeks for one contract on a live underlying,
//! a PnL scenario summary and the implied volatility surface.
//!
//! Usage: cli [TICKER] [STRIKE] [DAYS] [PURCHASE_PRICE]

use std::env;

use tracing_subscriber::EnvFilter;

use options_pricer::data::YahooClient;
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

fn arg_or<T: std::str::FromStr>(args: &[String], idx: usize, default: T) -> PricerResult<T> {
    match args.get(idx) {
        Some(raw) => raw
            .parse()
            .map_err(|_| PricerError::config(format!("invalid argument: {}", raw))),
        None => Ok(default),
    }
}

fn run() -> PricerResult<()> {
    let config = AppConfig::from_env()?;
    let args: Vec<String> = env::args().collect();

    let ticker = args
        .get(1)
        .map(|s| s.to_ascii_uppercase())
        .unwrap_or_else(|| config.default_ticker.clone());

    println!("Options Pricing Dashboard");
    println!("=========================\n");

    let yahoo = YahooClient::new(config.http_timeout)?;
    let stock = yahoo.stock_snapshot(&ticker).unwrap_or_else(|e| {
        tracing::warn!("error fetching stock data for {}: {}", ticker, e);
        StockSnapshot::fallback(&ticker)
    });

    println!("{} ({})", stock.company_name, stock.symbol);
    println!("  Spot:       ${:.2}", stock.current_price);
    println!("  Hist. vol:  {:.2}%", stock.volatility * 100.0);
    println!("  Div. yield: {:.2}%\n", stock.dividend_yield * 100.0);

    if stock.current_price <= 0.0 {
        println!("No price available for {}; nothing to price.", ticker);
        return Ok(());
    }

    let strike: f64 = arg_or(&args, 2, stock.current_price.round())?;
    let days: f64 = arg_or(&args, 3, 30.0)?;
    let purchase_price: f64 = arg_or(&args, 4, 0.0)?;
    let time_to_expiry = days / 365.0;

    let rates: Box<dyn RateSource> = match &config.fred_api_key {
        Some(key) => Box::new(
            FredClient::new(key.clone(), config.http_timeout)?
                .with_fallback_rate(config.fallback_rate),
        ),
        None => Box::new(FlatRate(config.fallback_rate)),
    };
    let rate = rates.risk_free_rate(time_to_expiry);

    // Historical vol can be zero on a thin history; fall back to a neutral guess
    let vol = if stock.volatility > 0.0 { stock.volatility } else { 0.3 };

    let contract = OptionContract::new(
        stock.current_price,
        strike,
        time_to_expiry,
        rate,
        vol,
        stock.dividend_yield,
    );

    println!("Contract:");
    println!("  Strike: ${:.2}  Days: {:.0}  Rate: {:.2}%  Vol: {:.2}%\n", strike, days, rate * 100.0, vol * 100.0);

    let (call, put) = bs_prices(&contract)?;
    let greeks = bs_greeks(&contract)?;

    println!("{:<8} {:>10} {:>10}", "", "Call", "Put");
    println!("{:<8} {:>10.4} {:>10.4}", "Price", call, put);
    for ((name, c), (_, p)) in greeks.call.named().iter().zip(greeks.put.named().iter()) {
        println!("{:<8} {:>10.4} {:>10.4}", name, c, p);
    }

    let status_call = PricingStatus::assess(purchase_price, call, FAIR_PRICE_THRESHOLD);
    if status_call != PricingStatus::Unpriced {
        let status_put = PricingStatus::assess(purchase_price, put, FAIR_PRICE_THRESHOLD);
        println!("\nAt ${:.2}: call {}, put {}", purchase_price, status_call, status_put);
    }

    let scenarios = ScenarioConfig::default();
    let heatmap = pnl_heatmap(&contract, OptionType::Call, purchase_price, &scenarios)?;
    println!("\nCall PnL heatmap ({}x{}):", heatmap.vols.len(), heatmap.spots.len());
    if let (Some(best), Some(worst)) = (heatmap.max_pnl(), heatmap.min_pnl()) {
        println!("  Best:  {:>9.2} at spot ${:.2}, vol {:.2}%", best.2, best.0, best.1 * 100.0);
        println!("  Worst: {:>9.2} at spot ${:.2}, vol {:.2}%", worst.2, worst.0, worst.1 * 100.0);
    }

    if purchase_price > 0.0 {
        let spots = scenarios.profile_spots(strike);
        if let Some(spots) = spots.as_slice() {
            for side in [OptionType::Call, OptionType::Put] {
                let expiry = expiry_pnl(strike, side, purchase_price, spots);
                if let Some(be) = expiry.break_even {
                    println!("  {} break-even at expiry: ${:.2}", side, be);
                }
            }
        }
    }

    println!("\n--- Implied Volatility Surface ---\n");

    let source = CachedChainSource::new(yahoo, config.cache_config())?;
    let surface_config = SurfaceConfig::new(true, Some((0.8, 1.2)));
    let (surfaces, spot) = volatility_surface(
        &source,
        &ticker,
        rate,
        stock.dividend_yield,
        &surface_config,
    );

    if surfaces.is_empty() {
        println!("No surface data available for {} (spot {:.2})", ticker, spot);
        return Ok(());
    }

    for side in [OptionType::Call, OptionType::Put] {
        match surfaces.side(side) {
            Some(grid) => {
                println!("{}", grid.title());
                println!("  Expiries: {}  {} points: {}  Cells: {}", grid.days.len(), grid.axis.label(), grid.y_values.len(), grid.len());
                if let Some((lo, hi)) = grid.vol_range() {
                    println!("  IV range: {:.2}% - {:.2}%", lo * 100.0, hi * 100.0);
                }
            }
            None => println!("No {} quotes survived filtering", side),
        }
    }

    Ok(())
}
