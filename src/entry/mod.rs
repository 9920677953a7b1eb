mod run;


use std::ffi::OsString;
use std::path::Path;

use clap::{CommandFactory, FromArgMatches};

use crate::args::LoadArgs;
use crate::config::DEFAULT_CONFIG_FILES;
use crate::error::AppResult;

/// Parses the command line and runs one scenario to completion.
///
/// # Errors
///
/// Returns an error when configuration, setup or the runtime fails, or when
/// any threshold is crossed.
pub fn run() -> AppResult<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    crate::system::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run::run_async(&args))
}

fn parse_args() -> AppResult<Option<LoadArgs>> {
    let mut cmd = LoadArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    Ok(Some(LoadArgs::from_arg_matches(&matches)?))
}

/// A bare invocation prints help unless something else can supply a base URL.
fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    std::env::var_os("BASE_URL").is_none() && !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}
