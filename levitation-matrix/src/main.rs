use anyhow::Context;
use levitation_matrix::{Config, Simulation};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "LEVITATION_CONFIG";

fn main() -> anyhow::Result<()> {
    setup_logging();

    // Single fixed run: optional TOML file, otherwise the built-in levitator
    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => Config::from_file(&path)?,
        Err(_) => Config::default(),
    };
    config.print_summary();

    let sim = Simulation::new(config).context("Invalid levitator setup")?;
    let (result, _images) = sim
        .run_with_visualisation()
        .context("Failed to compute the pressure field")?;

    let (lo, hi) = result.field.color_limits();
    tracing::info!(
        "Real pressure minimum {:.2} Pa, colour range [{:.2}, {:.2}] Pa",
        result.field.min_real(),
        lo,
        hi
    );
    for (order, magnitude) in result.scattering.mean_magnitudes().iter().enumerate() {
        tracing::info!("Order {}: mean |p| = {:.3} Pa", order, magnitude);
    }

    let nodes = result.field.pressure_nodes();
    if nodes.is_empty() {
        tracing::warn!("No pressure node found on the transducer axis");
    }
    for z in nodes {
        tracing::info!("Pressure node on axis at z = {:.2} mm", z * 1e3);
    }
    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
