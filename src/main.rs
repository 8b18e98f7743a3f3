mod app;
mod cli;
mod config;
mod output;

use clap::Parser;

use studiostats::core::{DateFilter, RecordFilter};
use studiostats::error::AppError;
use studiostats::utils::{Timezone, parse_date, set_parse_debug};

use app::{CommandContext, handle_command};
use cli::{Cli, parse_command};
use config::Config;
use output::{NumberFormat, TableOptions};

fn run(cli: Cli, config: &Config) -> Result<(), AppError> {
    set_parse_debug(cli.debug);

    let since = cli.since.as_deref().map(parse_date).transpose()?;
    let until = cli.until.as_deref().map(parse_date).transpose()?;
    let timezone = Timezone::parse(cli.timezone.as_deref())?;
    let number_format = NumberFormat::from_locale(cli.locale.as_deref())?;

    let filter = RecordFilter {
        dates: DateFilter::new(since, until),
        locations: cli.locations.clone(),
        trainers: cli.trainers.clone(),
        classes: cli.classes.clone(),
    };
    let command = parse_command(cli.command.clone());

    let ctx = CommandContext {
        cli: &cli,
        filter,
        as_of: until.unwrap_or_else(|| timezone.today()),
        segments: config.segments,
        trends: config.trends,
        table: TableOptions {
            use_color: cli.use_color(),
            number_format,
            currency: cli.currency(),
        },
    };
    handle_command(&command, &ctx)
}

fn main() {
    let cli = Cli::parse();

    // No "Loaded config" notice for JSON or quiet runs
    let config = if cli.json || cli.quiet {
        Config::load_quiet()
    } else {
        Config::load()
    };
    let cli = cli.with_config(&config);

    if let Err(e) = run(cli, &config) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
