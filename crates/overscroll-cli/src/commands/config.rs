use std::fs;
use std::path::PathBuf;

use clap::Subcommand;

use overscroll_core::PullConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the default configuration as TOML
    Show,
    /// Parse and validate a TOML configuration file
    Check {
        /// Path to the configuration file
        path: PathBuf,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(&PullConfig::default())?);
        }
        ConfigAction::Check { path } => {
            let config: PullConfig = toml::from_str(&fs::read_to_string(&path)?)?;
            config.validate()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&PullConfig::default()).unwrap();
        let parsed: PullConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, PullConfig::default());
        assert!(parsed.validate().is_ok());
    }
}
