//! Pull pipeline.
//!
//! One run walks `Idle -> CredentialResolved -> BundleFetched ->
//! KeyRecovered -> PayloadsDecrypted -> Assembled -> Persisted`, or drops to
//! `Failed` from wherever it is. The sink is only touched after every
//! payload has been verified and assembled. Runs are not resumable: each
//! call starts from `Idle` and fetches again.

use crate::api_client::{BundleApiClient, BundleFetcher};
use crate::assembler::assemble;
use crate::config::PullConfig;
use crate::credential_manager::{Credential, CredentialProvider, FileCredentialStore};
use crate::envelope::{decrypt_payloads, recover_key};
use crate::error::{AuthError, PullError, PullResult};
use crate::sink::{FileSink, OutputSink};
use crate::types::{Bundle, PullMode};
use crate::workspace::read_workspace_id;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pipeline position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PullState {
    Idle,
    CredentialResolved,
    BundleFetched,
    KeyRecovered,
    PayloadsDecrypted,
    Assembled,
    Persisted,
    Failed(String),
}

impl PullState {
    /// The state a successful step moves to. Terminal states have none.
    pub fn successor(&self) -> Option<PullState> {
        match self {
            PullState::Idle => Some(PullState::CredentialResolved),
            PullState::CredentialResolved => Some(PullState::BundleFetched),
            PullState::BundleFetched => Some(PullState::KeyRecovered),
            PullState::KeyRecovered => Some(PullState::PayloadsDecrypted),
            PullState::PayloadsDecrypted => Some(PullState::Assembled),
            PullState::Assembled => Some(PullState::Persisted),
            PullState::Persisted | PullState::Failed(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.successor().is_none()
    }
}

/// Records the states one run visits.
#[derive(Debug)]
struct StateTrail {
    states: Vec<PullState>,
}

impl StateTrail {
    fn new() -> Self {
        Self {
            states: vec![PullState::Idle],
        }
    }

    fn current(&self) -> &PullState {
        // Never empty: starts with Idle.
        &self.states[self.states.len() - 1]
    }

    fn advance(&mut self) {
        if let Some(next) = self.current().successor() {
            debug!("pull state -> {next:?}");
            self.states.push(next);
        }
    }

    fn fail(&mut self, err: &PullError) {
        if !self.current().is_terminal() {
            warn!("pull failed after {:?}: {err}", self.current());
            self.states.push(PullState::Failed(err.to_string()));
        }
    }
}

/// Summary of a successful pull.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullReport {
    pub mode: PullMode,
    pub workspace_id: String,
    /// Sealed payloads decrypted (a secrets bundle counts name and value).
    pub payload_count: usize,
    pub bytes_written: usize,
    pub file_name: String,
}

/// A finished run: the states it visited and how it ended.
#[derive(Debug)]
pub struct PullOutcome {
    pub states: Vec<PullState>,
    pub result: PullResult<PullReport>,
}

/// Settings that address one pull.
#[derive(Clone, Debug)]
pub struct PullTarget {
    /// Keys host the credential is looked up under.
    pub host: String,
    /// Marker file holding the workspace id.
    pub workspace_file: PathBuf,
    /// File name handed to the sink.
    pub output_file: String,
}

impl PullTarget {
    pub fn from_config(config: &PullConfig) -> Self {
        Self {
            host: config.keys_host.clone(),
            workspace_file: config.workspace_file.clone(),
            output_file: config.output_file.clone(),
        }
    }
}

/// Wires the collaborators of a pull together.
pub struct PullPipeline<C, F, S> {
    credentials: Arc<C>,
    fetcher: F,
    sink: S,
    target: PullTarget,
}

impl<C, F, S> PullPipeline<C, F, S>
where
    C: CredentialProvider + 'static,
    F: BundleFetcher,
    S: OutputSink,
{
    pub fn new(credentials: C, fetcher: F, sink: S, target: PullTarget) -> Self {
        Self {
            credentials: Arc::new(credentials),
            fetcher,
            sink,
            target,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Runs one pull to completion.
    pub async fn run(&self, mode: PullMode) -> PullResult<PullReport> {
        self.run_traced(mode).await.result
    }

    /// Runs one pull and also returns the visited states.
    pub async fn run_traced(&self, mode: PullMode) -> PullOutcome {
        let mut trail = StateTrail::new();
        let result = self.execute(mode, &mut trail).await;
        if let Err(err) = &result {
            trail.fail(err);
        }
        PullOutcome {
            states: trail.states,
            result,
        }
    }

    /// Credential stores read from disk, so the lookup runs on the blocking
    /// pool and overlaps the fetch instead of stalling the runtime thread.
    async fn resolve_credential(&self) -> PullResult<Credential> {
        let credentials = Arc::clone(&self.credentials);
        let host = self.target.host.clone();
        let credential = tokio::task::spawn_blocking(move || credentials.get_credentials(&host))
            .await
            .map_err(|e| AuthError::LookupAborted(e.to_string()))??;
        Ok(credential)
    }

    async fn fetch(&self, mode: PullMode, workspace_id: &str) -> PullResult<Bundle> {
        let bundle = match mode {
            PullMode::File => Bundle::File(self.fetcher.get_file(workspace_id).await?),
            PullMode::Secrets => Bundle::Secrets(self.fetcher.get_secrets(workspace_id).await?),
        };
        Ok(bundle)
    }

    async fn execute(&self, mode: PullMode, trail: &mut StateTrail) -> PullResult<PullReport> {
        let workspace_id = read_workspace_id(&self.target.workspace_file)?;
        info!("pulling {mode} bundle for workspace {workspace_id}");

        let (credential, bundle) = tokio::join!(
            self.resolve_credential(),
            self.fetch(mode, &workspace_id),
        );
        let credential = credential?;
        trail.advance();
        let bundle = bundle?;
        trail.advance();

        let key = recover_key(&bundle, &credential)?;
        drop(credential);
        trail.advance();

        let decrypted = decrypt_payloads(&bundle, &key)?;
        drop(key);
        trail.advance();

        let document = assemble(decrypted);
        trail.advance();

        self.sink.write(&self.target.output_file, document.as_bytes())?;
        trail.advance();

        info!(
            "pulled {} payloads ({} bytes) into {}",
            bundle.payload_count(),
            document.len(),
            self.target.output_file
        );

        Ok(PullReport {
            mode,
            workspace_id,
            payload_count: bundle.payload_count(),
            bytes_written: document.len(),
            file_name: self.target.output_file.clone(),
        })
    }
}

impl PullPipeline<FileCredentialStore, BundleApiClient, FileSink> {
    /// Pipeline backed by the credential file, the HTTP API and a file
    /// sink writing into `output_dir`.
    pub fn from_config(config: &PullConfig, output_dir: &Path) -> PullResult<Self> {
        config.validate()?;
        Ok(Self::new(
            FileCredentialStore::new(&config.credentials_path),
            BundleApiClient::new(config)?,
            FileSink::new(output_dir),
            PullTarget::from_config(config),
        ))
    }
}
