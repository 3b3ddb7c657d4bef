use std::io::{self, IsTerminal};

use anyhow::anyhow;
use caravel_client::{LoginOutcome, SessionError};

use crate::cli::{LoginArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_session;

pub(crate) async fn handle_login(ctx: &mut AppContext, args: LoginArgs) -> CliResult<()> {
    let LoginArgs { name, password } = args;
    let password = resolve_password(password)?;

    let outcome = match ctx
        .session
        .login(ctx.dispatcher.gateway(), &name, &password)
        .await
    {
        Ok(outcome) => outcome,
        Err(SessionError::NameRequired) => {
            return Err(CliError::validation("name must not be empty"));
        }
        Err(err) => return Err(CliError::failure(err)),
    };

    match outcome {
        LoginOutcome::Accepted => {
            if let Some(profile) = ctx.session.profile() {
                println!("Signed in as {}.", profile.display_label());
            }
            Ok(())
        }
        LoginOutcome::Rejected { message } => {
            Err(CliError::validation(format!("login rejected: {message}")))
        }
    }
}

pub(crate) fn handle_logout(ctx: &mut AppContext) -> CliResult<()> {
    ctx.session.logout().map_err(CliError::failure)?;
    println!("Signed out.");
    Ok(())
}

pub(crate) fn handle_whoami(ctx: &AppContext, output: OutputFormat) -> CliResult<()> {
    render_session(&ctx.session, output)
}

/// Resolves the password from the flag value or an interactive prompt.
///
/// An empty password is passed through as entered; the backend treats it as
/// legal input. Only a missing password on a non-interactive stdin is an
/// error.
pub(crate) fn resolve_password(flag: Option<String>) -> CliResult<String> {
    if let Some(value) = flag {
        return Ok(value);
    }

    if io::stdin().is_terminal() {
        rpassword::prompt_password("Password: ")
            .map_err(|err| CliError::failure(anyhow!("failed to read password from stdin: {err}")))
    } else {
        Err(CliError::validation(
            "password required; supply via --password or CARAVEL_PASSWORD when running non-interactively",
        ))
    }
}
