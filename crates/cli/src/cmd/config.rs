//! Show the effective configuration

use anyhow::Result;
use throttle::ThrottleConfig;

/// Print `config` as TOML on stdout
pub fn run(config: &ThrottleConfig) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}
