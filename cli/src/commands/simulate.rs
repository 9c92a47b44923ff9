use anyhow::{ensure, Result};
use dronedemand::simulate_deliveries;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::SimulateArgs) -> Result<()> {
    ensure!(args.lambda.is_finite() && args.lambda >= 0.0, "[simulate] rate must be a non-negative number");

    let counts = simulate_deliveries(args.lambda, args.days, args.seed);
    let total: u64 = counts.iter().sum();
    for (day, count) in counts.iter().enumerate() {
        println!("day {:>4}: {count}", day + 1);
    }
    println!("total {total}, mean {:.2}", total as f64 / counts.len().max(1) as f64);

    Ok(())
}
