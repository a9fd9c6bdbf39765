//! Utils

use std::path::PathBuf;

use clap::Parser;

/// Arguments for the `blockprice` command
#[derive(Debug, Parser)]
#[command(
    name = "blockprice",
    about = "Price a cart fixture under a block discount",
    long_about = None
)]
pub struct CartArgs {
    /// Directory holding the `config/` and `carts/` fixture folders
    #[arg(short, long, env = "BLOCKPRICE_FIXTURES", default_value = "./fixtures")]
    pub dir: PathBuf,

    /// Fixture set to use for the config & cart
    #[arg(short, long, default_value = "sample")]
    pub fixture: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_short_flags() -> TestResult {
        let args = CartArgs::try_parse_from([
            "blockprice",
            "-d",
            "/tmp/fixtures",
            "-f",
            "steps",
            "-l",
            "debug",
        ])?;

        assert_eq!(args.dir, PathBuf::from("/tmp/fixtures"));
        assert_eq!(args.fixture, "steps");
        assert_eq!(args.log_level, "debug");

        Ok(())
    }

    #[test]
    fn fixture_defaults_to_sample() -> TestResult {
        let args = CartArgs::try_parse_from(["blockprice"])?;

        assert_eq!(args.fixture, "sample");

        Ok(())
    }
}
