//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{Config, ConfigColorMode, ConfigSortOrder};

use super::commands::Commands;

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub(crate) enum SortOrder {
    /// Oldest month first (default)
    #[default]
    Asc,
    /// Newest month first
    Desc,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum ColorMode {
    /// Auto-detect based on terminal (default)
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Parser)]
#[command(name = "studiostats")]
#[command(about = "Fitness studio analytics from exported data snapshots", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Directory holding sessions*.json, sales*.json, leads*.json, ... (default: current dir)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub(crate) data_dir: Option<PathBuf>,

    /// Filter from date (YYYYMMDD or YYYY-MM-DD)
    #[arg(short, long, global = true)]
    pub(crate) since: Option<String>,

    /// Filter until date (YYYYMMDD or YYYY-MM-DD); also anchors monthly windows
    #[arg(short, long, global = true)]
    pub(crate) until: Option<String>,

    /// Only include these locations (repeatable)
    #[arg(long = "location", global = true, value_name = "NAME")]
    pub(crate) locations: Vec<String>,

    /// Only include these trainers (repeatable)
    #[arg(long = "trainer", global = true, value_name = "NAME")]
    pub(crate) trainers: Vec<String>,

    /// Only include these classes (repeatable)
    #[arg(long = "class", global = true, value_name = "NAME")]
    pub(crate) classes: Vec<String>,

    /// Output as JSON
    #[arg(short, long, global = true)]
    pub(crate) json: bool,

    /// Month order for monthly tables
    #[arg(short, long, global = true, value_enum, default_value = "asc")]
    pub(crate) order: SortOrder,

    /// Color output mode
    #[arg(long, global = true, value_enum, default_value = "auto")]
    pub(crate) color: ColorMode,

    /// Disable colored output (shorthand for --color=never)
    #[arg(long, global = true)]
    pub(crate) no_color: bool,

    /// Enable debug output (show processing details)
    #[arg(long, global = true)]
    pub(crate) debug: bool,

    /// Suppress progress output on stderr
    #[arg(short, long, global = true)]
    pub(crate) quiet: bool,

    /// Timezone deciding which day is "today" (e.g., "Asia/Kolkata", "UTC")
    #[arg(long, global = true, value_name = "TZ")]
    pub(crate) timezone: Option<String>,

    /// Locale for number formatting (e.g., "en", "de", "fr")
    #[arg(long, global = true, value_name = "LOCALE")]
    pub(crate) locale: Option<String>,

    /// Currency symbol for amounts in tables
    #[arg(long, global = true, value_name = "SYMBOL")]
    pub(crate) currency: Option<String>,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        // For boolean flags, config only applies if CLI is false (default)
        if !self.no_color && config.no_color {
            self.no_color = true;
        }
        if !self.debug && config.debug {
            self.debug = true;
        }
        if !self.quiet && config.quiet {
            self.quiet = true;
        }

        // For enum values, only override if CLI is at default
        if let Some(order) = config.order
            && self.order == SortOrder::Asc
        {
            self.order = match order {
                ConfigSortOrder::Asc => SortOrder::Asc,
                ConfigSortOrder::Desc => SortOrder::Desc,
            };
        }

        if let Some(color) = config.color
            && self.color == ColorMode::Auto
        {
            self.color = match color {
                ConfigColorMode::Auto => ColorMode::Auto,
                ConfigColorMode::Always => ColorMode::Always,
                ConfigColorMode::Never => ColorMode::Never,
            };
        }

        // String options: only apply if CLI didn't set them
        if self.data_dir.is_none() {
            self.data_dir = config.data_dir.clone();
        }
        if self.timezone.is_none() {
            self.timezone = config.timezone.clone();
        }
        if self.locale.is_none() {
            self.locale = config.locale.clone();
        }
        if self.currency.is_none() {
            self.currency = config.currency.clone();
        }

        self
    }

    pub(crate) fn use_color(&self) -> bool {
        if self.no_color || self.json {
            return false;
        }
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }

    pub(crate) fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub(crate) fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or("$")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("studiostats").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn repeatable_filters_collect() {
        let cli = parse(&["--location", "Kemps", "--location", "Bandra", "--class", "Barre 57"]);
        assert_eq!(cli.locations, ["Kemps", "Bandra"]);
        assert_eq!(cli.classes, ["Barre 57"]);
        assert!(cli.trainers.is_empty());
    }

    #[test]
    fn cli_flags_win_over_config() {
        let config = Config {
            data_dir: Some(PathBuf::from("/from/config")),
            currency: Some("₹".into()),
            order: Some(ConfigSortOrder::Desc),
            locale: Some("de".into()),
            quiet: true,
            ..Config::default()
        };
        let cli = parse(&["--data-dir", "/from/cli", "--locale", "fr"]).with_config(&config);
        assert_eq!(cli.data_dir(), PathBuf::from("/from/cli"));
        assert_eq!(cli.locale.as_deref(), Some("fr"));
        assert_eq!(cli.currency(), "₹");
        assert_eq!(cli.order, SortOrder::Desc);
        assert!(cli.quiet);
    }

    #[test]
    fn defaults_without_config() {
        let cli = parse(&[]).with_config(&Config::default());
        assert_eq!(cli.data_dir(), PathBuf::from("."));
        assert_eq!(cli.currency(), "$");
        assert!(cli.command.is_none());
    }

    #[test]
    fn json_output_never_colored() {
        let cli = parse(&["--json", "--color", "always"]);
        assert!(!cli.use_color());
    }
}
