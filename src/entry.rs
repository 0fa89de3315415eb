use std::ffi::OsString;

use clap::Parser;
use tracing::info;

use crate::app::run_schedule;
use crate::args::BenchArgs;
use crate::config::{BenchConfig, CONFIG_PATH_ENV, load_config};
use crate::error::AppResult;

pub(crate) fn run() -> AppResult<()> {
    let Some(args) = parse_args(std::env::args_os())? else {
        return Ok(());
    };

    crate::logger::init_logging();

    let config_path = std::env::var(CONFIG_PATH_ENV).ok();
    let file = load_config(config_path.as_deref())?;
    let config = BenchConfig::resolve(file, args.port)?;
    info!(
        server = %config.target,
        tiers = config.tiers.len(),
        "starting benchmark"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let mut stdout = std::io::stdout().lock();
    runtime.block_on(run_schedule(&config, &mut stdout))?;
    Ok(())
}

/// Parses the command line. `--help` and `--version` are printed here and yield `None`.
fn parse_args<I, T>(raw_args: I) -> AppResult<Option<BenchArgs>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match BenchArgs::try_parse_from(raw_args) {
        Ok(args) => Ok(Some(args)),
        Err(err) if !err.use_stderr() => {
            err.print()?;
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
