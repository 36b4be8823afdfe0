//! Example: Basic options pricing with Black-Scholes-Merton
//!
//! Run with: cargo run --example basic_pricing

use options_pricer::prelude::*;

fn main() -> PricerResult<()> {
    // Option parameters
    let spot = 500.0;
    let strike = 505.0;
    let time = 0.25; // 3 months
    let rate = 0.05; // 5% risk-free rate
    let div = 0.01; // 1% dividend yield
    let vol = 0.20; // 20% volatility

    let contract = OptionContract::new(spot, strike, time, rate, vol, div);

    println!("=== Black-Scholes-Merton Pricing ===\n");
    println!("Spot:     ${:.2}", spot);
    println!("Strike:   ${:.2}", strike);
    println!("Time:     {:.2} years ({:.0} days)", time, time * 365.0);
    println!("Rate:     {:.1}%", rate * 100.0);
    println!("Div:      {:.1}%", div * 100.0);
    println!("Vol:      {:.1}%\n", vol * 100.0);

    let (call_price, put_price) = bs_prices(&contract)?;
    println!("Call Price: ${:.4}", call_price);
    println!("Put Price:  ${:.4}", put_price);

    // C - P = S*e^(-qT) - K*e^(-rT)
    let parity_lhs = call_price - put_price;
    let parity_rhs = contract.parity_value();
    println!("\nPut-Call Parity Check:");
    println!("  C - P = {:.4}", parity_lhs);
    println!("  S*e^(-qT) - K*e^(-rT) = {:.4}", parity_rhs);
    println!("  Difference: {:.2e}", (parity_lhs - parity_rhs).abs());

    println!("\n=== Greeks ===\n");
    let greeks = bs_greeks(&contract)?;
    println!("{:<6} {:>10} {:>10}", "", "Call", "Put");
    for ((name, c), (_, p)) in greeks.call.named().iter().zip(greeks.put.named().iter()) {
        println!("{:<6} {:>10.4} {:>10.4}", name, c, p);
    }
    println!("\n(vega and rho per 1% move, theta per calendar day)");

    println!("\n=== Implied Volatility ===\n");
    let market_price = call_price + 0.50; // Simulated market price
    match implied_volatility(market_price, &contract, OptionType::Call) {
        Ok(iv) => println!("Market price ${:.4} implies vol: {:.2}%", market_price, iv * 100.0),
        Err(e) => println!("Could not solve for IV: {}", e),
    }

    let refined = SolverConfig::refined();
    let iv = implied_volatility_with(market_price, &contract, OptionType::Call, &refined)?;
    println!("Refined search: {:.4}%", iv * 100.0);

    println!("\n=== Pricing Status ===\n");
    for paid in [call_price, call_price * 1.1, call_price * 0.9] {
        println!(
            "Paid ${:.4}: {}",
            paid,
            PricingStatus::assess(paid, call_price, FAIR_PRICE_THRESHOLD)
        );
    }

    Ok(())
}
