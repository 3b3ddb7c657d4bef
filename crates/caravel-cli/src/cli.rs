//! Command-line client for the Caravel copilot backend.

use std::path::PathBuf;

use caravel_client::{Action, Dispatcher, Gateway, SessionController, SessionStore};
use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Url;
use uuid::Uuid;

use crate::client::{
    AppContext, CliDependencies, CliError, CliResult, parse_url, resolve_session_dir,
};
use crate::commands::actions::run_action;
use crate::commands::auth::{handle_login, handle_logout, handle_whoami};
use crate::commands::deliverables::handle_deliverable_get;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_PROPOSAL_CLIENT_ID: i64 = 1;
const DEFAULT_PROPOSAL_AMOUNT: i64 = 19_990;
const DEFAULT_WELLBEING_ISSUE: &str = "estresse demo";

/// Parses the command line, runs the requested command, and emits the
/// optional outcome telemetry. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();
    let deps = match CliDependencies::from_env(&cli, &trace_id) {
        Ok(deps) => deps,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };
    let telemetry = deps.telemetry.clone();

    let result = dispatch(cli, &deps).await;

    let (exit_code, message, outcome) = match result {
        Ok(()) => (0, None, "success"),
        Err(err) => {
            let exit_code = err.exit_code();
            let message = err.display_message();
            eprintln!("error: {message}");
            (exit_code, Some(message), "error")
        }
    };

    if let Some(emitter) = &telemetry {
        emitter
            .emit(
                &trace_id,
                command_name,
                outcome,
                exit_code,
                message.as_deref(),
            )
            .await;
    }

    exit_code
}

async fn dispatch(cli: Cli, deps: &CliDependencies) -> CliResult<()> {
    let session_dir = resolve_session_dir(cli.session_dir)?;
    let session = SessionController::bootstrap(SessionStore::new(session_dir))
        .map_err(CliError::failure)?;
    let gateway = Gateway::new(deps.client.clone(), cli.api_url);
    let mut ctx = AppContext {
        session,
        dispatcher: Dispatcher::new(gateway),
    };

    match cli.command {
        Command::Login(args) => handle_login(&mut ctx, args).await,
        Command::Logout => handle_logout(&mut ctx),
        Command::Whoami => handle_whoami(&ctx, cli.output),
        Command::Seed => run_action(&mut ctx, Action::Seed, cli.output).await,
        Command::Proposal(args) => {
            run_action(
                &mut ctx,
                Action::GenerateProposal {
                    client_id: args.client,
                    amount: args.amount,
                },
                cli.output,
            )
            .await
        }
        Command::Wellbeing(args) => {
            run_action(
                &mut ctx,
                Action::RegisterWellbeing { issue: args.issue },
                cli.output,
            )
            .await
        }
        Command::Report => run_action(&mut ctx, Action::RunReport, cli.output).await,
        Command::Deliverables(deliverables) => match deliverables {
            DeliverablesCommand::Ls => {
                run_action(&mut ctx, Action::ListDeliverables, cli.output).await
            }
            DeliverablesCommand::Get(args) => {
                handle_deliverable_get(&mut ctx, args, cli.output).await
            }
        },
    }
}

#[derive(Parser)]
#[command(
    name = "caravel",
    about = "Command-line copilot client for the Caravel demo backend"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "CARAVEL_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(long, global = true, env = "CARAVEL_SESSION_DIR")]
    pub(crate) session_dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "CARAVEL_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    Login(LoginArgs),
    Logout,
    Whoami,
    Seed,
    Proposal(ProposalArgs),
    Wellbeing(WellbeingArgs),
    Report,
    #[command(subcommand)]
    Deliverables(DeliverablesCommand),
}

#[derive(Subcommand)]
pub(crate) enum DeliverablesCommand {
    Ls,
    Get(DeliverableGetArgs),
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long, env = "CARAVEL_PASSWORD")]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct ProposalArgs {
    #[arg(long, default_value_t = DEFAULT_PROPOSAL_CLIENT_ID)]
    pub(crate) client: i64,
    #[arg(long, default_value_t = DEFAULT_PROPOSAL_AMOUNT)]
    pub(crate) amount: i64,
}

#[derive(Args)]
pub(crate) struct WellbeingArgs {
    #[arg(long, default_value = DEFAULT_WELLBEING_ISSUE)]
    pub(crate) issue: String,
}

#[derive(Args)]
pub(crate) struct DeliverableGetArgs {
    pub(crate) file: String,
    #[arg(long, default_value = ".")]
    pub(crate) dest: PathBuf,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Login(_) => "login",
        Command::Logout => "logout",
        Command::Whoami => "whoami",
        Command::Seed => "seed",
        Command::Proposal(_) => "proposal",
        Command::Wellbeing(_) => "wellbeing",
        Command::Report => "report",
        Command::Deliverables(DeliverablesCommand::Ls) => "deliverables_ls",
        Command::Deliverables(DeliverablesCommand::Get(_)) => "deliverables_get",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_applies_global_defaults() {
        let cli = Cli::try_parse_from(["caravel", "seed"]).expect("parse seed");
        assert_eq!(cli.api_url.as_str(), "http://127.0.0.1:5000/");
        assert_eq!(cli.timeout, DEFAULT_TIMEOUT_SECS);
        assert!(matches!(cli.output, OutputFormat::Table));
        assert!(matches!(cli.command, Command::Seed));
    }

    #[test]
    fn parse_proposal_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "caravel", "proposal", "--client", "9", "--amount", "555", "--output", "json",
        ])
        .expect("parse proposal");
        assert!(matches!(cli.output, OutputFormat::Json));
        match cli.command {
            Command::Proposal(args) => {
                assert_eq!(args.client, 9);
                assert_eq!(args.amount, 555);
            }
            _ => panic!("expected proposal command"),
        }
    }

    #[test]
    fn parse_wellbeing_defaults_the_issue() {
        let cli = Cli::try_parse_from(["caravel", "wellbeing"]).expect("parse wellbeing");
        match cli.command {
            Command::Wellbeing(args) => assert_eq!(args.issue, DEFAULT_WELLBEING_ISSUE),
            _ => panic!("expected wellbeing command"),
        }
    }

    #[test]
    fn parse_deliverables_get_takes_a_positional_file() {
        let cli = Cli::try_parse_from(["caravel", "deliverables", "get", "contrato.pdf"])
            .expect("parse get");
        match cli.command {
            Command::Deliverables(DeliverablesCommand::Get(args)) => {
                assert_eq!(args.file, "contrato.pdf");
                assert_eq!(args.dest, PathBuf::from("."));
            }
            _ => panic!("expected deliverables get"),
        }
    }

    #[test]
    fn command_label_matches_variants() {
        assert_eq!(command_label(&Command::Seed), "seed");
        assert_eq!(command_label(&Command::Whoami), "whoami");
        assert_eq!(
            command_label(&Command::Deliverables(DeliverablesCommand::Ls)),
            "deliverables_ls"
        );
        assert_eq!(
            command_label(&Command::Login(LoginArgs {
                name: "Ana".to_string(),
                password: None,
            })),
            "login"
        );
    }
}
