use crate::cli::{DeliverableGetArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::print_log;

pub(crate) async fn handle_deliverable_get(
    ctx: &mut AppContext,
    args: DeliverableGetArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let DeliverableGetArgs { file, dest } = args;
    let filename = file.trim();
    if filename.is_empty() {
        return Err(CliError::validation("file must not be empty"));
    }

    let result = ctx.dispatcher.download(&ctx.session, filename, &dest).await;
    print_log(ctx.dispatcher.log(), output)?;
    result.map(|_| ()).map_err(CliError::failure)
}
