//! Best-effort dispatch of backend actions and deliverable downloads.
//!
//! No action is blocked locally on authentication. Payloads are built from
//! whatever identity is available: the signed-in user's id, or a placeholder
//! when nobody is signed in. The backend stays the sole authority on what an
//! anonymous caller may do.

use std::io::Write;
use std::path::{Path, PathBuf};

use caravel_api_models::{DeliverableListResponse, ProposalRequest, WellbeingRequest};
use futures_util::StreamExt;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::{DispatchError, DispatchResult, GatewayError};
use crate::gateway::{ApiRequest, Gateway, decode_json};
use crate::log::{OutputEntry, OutputLog};
use crate::session::SessionController;

/// Actor id used in payloads when nobody is signed in.
const ANONYMOUS_ACTOR_ID: i64 = 1;
const LIST_ENDPOINT: &str = "deliverables";
const GENERIC_LISTING_ERROR: &str = "listing failed";
const FALLBACK_LOCAL_NAME: &str = "deliverable.bin";

/// Backend action reachable from the command surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Ask the backend to seed demo data.
    Seed,
    /// Generate a commercial proposal.
    GenerateProposal {
        /// Client the proposal is addressed to.
        client_id: i64,
        /// Proposal value in cents.
        amount: i64,
    },
    /// Register a wellbeing report for the acting employee.
    RegisterWellbeing {
        /// Free-form description of the issue.
        issue: String,
    },
    /// Run the consolidated report.
    RunReport,
    /// List deliverable files available for download.
    ListDeliverables,
}

impl Action {
    /// Stable label used in log context and error reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::GenerateProposal { .. } => "proposal",
            Self::RegisterWellbeing { .. } => "wellbeing",
            Self::RunReport => "report",
            Self::ListDeliverables => "deliverables",
        }
    }
}

/// Sends actions through the gateway and records every outcome in the log.
#[derive(Debug)]
pub struct Dispatcher {
    gateway: Gateway,
    log: OutputLog,
}

impl Dispatcher {
    /// Dispatcher with an empty output log.
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            log: OutputLog::new(),
        }
    }

    /// Entries recorded so far.
    #[must_use]
    pub const fn log(&self) -> &OutputLog {
        &self.log
    }

    /// Gateway used for outgoing requests.
    #[must_use]
    pub const fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Runs `action`, pushing a progress entry before the request and the
    /// rendered outcome after it.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Gateway`] for transport failures or a response
    /// outside the JSON protocol, [`DispatchError::Backend`] when the
    /// listing endpoint reports `ok:false`. Failures are recorded in the
    /// log before they are returned.
    pub async fn dispatch(
        &mut self,
        session: &SessionController,
        action: Action,
    ) -> DispatchResult<()> {
        match action {
            Action::Seed => {
                self.render_json_action(session, "Running seed...", ApiRequest::post("seed"))
                    .await
            }
            Action::GenerateProposal { client_id, amount } => {
                let payload = ProposalRequest {
                    client_id,
                    amount,
                    owner_id: actor_id(session),
                };
                let request = ApiRequest::post("generate_proposal")
                    .with_json(&payload)
                    .map_err(|source| DispatchError::Gateway { source })?;
                self.render_json_action(session, "Generating proposal...", request)
                    .await
            }
            Action::RegisterWellbeing { issue } => {
                let payload = WellbeingRequest {
                    employee_id: actor_id(session),
                    issue,
                };
                let request = ApiRequest::post("register_wellbeing")
                    .with_json(&payload)
                    .map_err(|source| DispatchError::Gateway { source })?;
                self.render_json_action(session, "Registering wellbeing...", request)
                    .await
            }
            Action::RunReport => {
                self.render_json_action(
                    session,
                    "Running report...",
                    ApiRequest::post("run_report"),
                )
                .await
            }
            Action::ListDeliverables => self.list_deliverables(session).await,
        }
    }

    /// Downloads `filename` into `dest_dir`.
    ///
    /// The body streams through a tempfile inside the destination directory
    /// and is renamed into place only after the last byte, so a failed
    /// transfer never leaves a partial file and the temp resource is
    /// released in the same scope. The local name is the final path segment
    /// of `filename`; a remote name cannot place the file outside
    /// `dest_dir`.
    ///
    /// # Errors
    ///
    /// [`DispatchError::DownloadRejected`] for a non-success status (nothing
    /// is written), [`DispatchError::Gateway`] for transport failures,
    /// [`DispatchError::DownloadIo`] for local filesystem failures.
    pub async fn download(
        &mut self,
        session: &SessionController,
        filename: &str,
        dest_dir: &Path,
    ) -> DispatchResult<PathBuf> {
        self.log
            .push(OutputEntry::text(format!("Preparing download: {filename}")));
        let response = self
            .gateway
            .fetch_deliverable(filename, session.credential())
            .await
            .map_err(|source| DispatchError::Gateway { source })?;

        let status = response.status();
        if !status.is_success() {
            self.log.push(OutputEntry::text(format!(
                "Download failed: {}",
                status.as_u16()
            )));
            return Err(DispatchError::DownloadRejected {
                filename: filename.to_string(),
                status: status.as_u16(),
            });
        }

        let local_name = Path::new(filename)
            .file_name()
            .map_or_else(|| FALLBACK_LOCAL_NAME.into(), ToOwned::to_owned);
        std::fs::create_dir_all(dest_dir).map_err(|source| DispatchError::DownloadIo {
            filename: filename.to_string(),
            source,
        })?;
        let mut temp =
            NamedTempFile::new_in(dest_dir).map_err(|source| DispatchError::DownloadIo {
                filename: filename.to_string(),
                source,
            })?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| DispatchError::Gateway {
                source: GatewayError::Transport {
                    endpoint: format!("/deliverables/{filename}"),
                    source,
                },
            })?;
            temp.write_all(&chunk)
                .map_err(|source| DispatchError::DownloadIo {
                    filename: filename.to_string(),
                    source,
                })?;
        }

        let dest = dest_dir.join(local_name);
        temp.persist(&dest)
            .map_err(|source| DispatchError::DownloadIo {
                filename: filename.to_string(),
                source: source.error,
            })?;
        self.log
            .push(OutputEntry::text(format!("Saved {}", dest.display())));
        Ok(dest)
    }

    /// Sends `request` and records the raw JSON response body.
    async fn render_json_action(
        &mut self,
        session: &SessionController,
        progress: &str,
        request: ApiRequest,
    ) -> DispatchResult<()> {
        self.log.push(OutputEntry::text(progress));
        let endpoint = request.endpoint.clone();
        let response = self
            .gateway
            .send(request, session.credential())
            .await
            .map_err(|source| DispatchError::Gateway { source })?;
        let body: Value = decode_json(&endpoint, response)
            .await
            .map_err(|source| DispatchError::Gateway { source })?;
        self.log.push(OutputEntry::json(body));
        Ok(())
    }

    async fn list_deliverables(&mut self, session: &SessionController) -> DispatchResult<()> {
        self.log.push(OutputEntry::text("Listing deliverables..."));
        let response = self
            .gateway
            .send(ApiRequest::get(LIST_ENDPOINT), session.credential())
            .await
            .map_err(|source| DispatchError::Gateway { source })?;
        let listing: DeliverableListResponse = decode_json(LIST_ENDPOINT, response)
            .await
            .map_err(|source| DispatchError::Gateway { source })?;

        if listing.ok {
            self.log.push(OutputEntry::text(format!(
                "Files: {}",
                listing.files.join(", ")
            )));
            self.log.push(OutputEntry::downloads(listing.files));
            return Ok(());
        }

        let message = listing
            .error
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| GENERIC_LISTING_ERROR.to_string());
        self.log.push(OutputEntry::text(format!("Error: {message}")));
        Err(DispatchError::Backend {
            action: Action::ListDeliverables.label(),
            message,
        })
    }
}

fn actor_id(session: &SessionController) -> i64 {
    session
        .profile()
        .map_or(ANONYMOUS_ACTOR_ID, |profile| profile.id)
}
