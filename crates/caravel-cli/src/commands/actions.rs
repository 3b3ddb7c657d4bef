use caravel_client::Action;

use crate::cli::OutputFormat;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::print_log;

/// Runs one backend action and prints the dispatch log afterwards, even when
/// the dispatch failed; progress and error entries still reach the user
/// before the error does.
pub(crate) async fn run_action(
    ctx: &mut AppContext,
    action: Action,
    output: OutputFormat,
) -> CliResult<()> {
    let result = ctx.dispatcher.dispatch(&ctx.session, action).await;
    print_log(ctx.dispatcher.log(), output)?;
    result.map_err(CliError::failure)
}
