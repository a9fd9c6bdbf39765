//! Block price CLI
//!
//! Loads a fixture set, prices the cart under the block discount and prints a receipt.
//!
//! Use `-d` to choose the fixture directory
//! Use `-f` to load a fixture set by name
//! Use `-l` to set the log level (overridden by `RUST_LOG`)

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blockprice::{fixtures::Fixture, lookup::PricingSession, receipt::Receipt, utils::CartArgs};

fn main() -> Result<()> {
    // Load .env file if present (ignore if missing)
    _ = dotenvy::dotenv();

    let args = CartArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let mut fixture = Fixture::with_base_path(&args.dir);

    fixture.load_config(&args.fixture)?.load_cart(&args.fixture)?;

    let snapshot = fixture.cart()?.snapshot();
    let mut session = PricingSession::new(fixture.config()?.clone());
    let lookup = session.lookup(&snapshot)?;

    info!(
        fixture = %args.fixture,
        lines = snapshot.lines().len(),
        discounted_units = lookup.allocation().discounted_units(),
        "priced cart"
    );

    let receipt = Receipt::from_allocation(&snapshot, lookup.allocation())?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    receipt.write_to(&mut handle, &snapshot, fixture.product_names())?;

    Ok(())
}
