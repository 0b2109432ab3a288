//! Report lifecycle manager.
//!
//! Owns the `pending -> approved | rejected` state machine and is the only
//! code that creates or updates records. Approval runs the configured
//! transform on the opaque score exactly once; rejection leaves the score
//! untouched.
//!
//! ## Operation Order
//!
//! Mutating operations check the caller, then store availability, then act.
//! Reads only check availability. Nothing is retried here; index appends
//! retry inside the store when it supports conditional writes.

use tracing::{debug, info, warn};

use cipherscore_crypto::{ScoreCodec, TaggedCodec, TransformEngine};
use cipherscore_protocol::{ChallengeSigner, RevealedScore, SessionParams};
use cipherscore_store::{
    KvStore, Report, ReportId, ReportStatus, ReportStore, VersionedReport,
};

use crate::config::ManagerConfig;
use crate::error::{CoreError, Result};
use crate::principal::Principal;
use crate::query;
use crate::stats::ReportStats;

/// Lifecycle manager over a key-value store.
pub struct ReportManager<S, C = TaggedCodec> {
    store: ReportStore<S>,
    engine: TransformEngine<C>,
    config: ManagerConfig,
}

impl<S, C> std::fmt::Debug for ReportManager<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: KvStore> ReportManager<S, TaggedCodec> {
    /// Create a manager using the default tagged codec.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Configuration` if `config` fails validation.
    pub fn new(kv: S, config: ManagerConfig) -> Result<Self> {
        Self::with_codec(kv, TaggedCodec, config)
    }
}

impl<S: KvStore, C: ScoreCodec> ReportManager<S, C> {
    /// Create a manager with a custom codec.
    pub fn with_codec(kv: S, codec: C, config: ManagerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: ReportStore::new(kv).with_index_retry_limit(config.index_retry_limit),
            engine: TransformEngine::new(codec),
            config,
        })
    }

    /// The record collection.
    pub fn store(&self) -> &ReportStore<S> {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The score codec.
    pub fn codec(&self) -> &C {
        self.engine.codec()
    }

    /// Start a reveal session with the configured default window.
    pub fn new_session(&self, contract_address: impl Into<String>, chain_id: u64) -> SessionParams {
        SessionParams::new(contract_address, chain_id)
            .with_duration_days(self.config.default_reveal_window_days)
    }

    // =======================================================================
    // Mutations
    // =======================================================================

    /// Create a pending report owned by `caller`.
    ///
    /// Blank source labels are dropped and the rest trimmed. The record is
    /// written before the index; if the index append then fails the record
    /// is orphaned, logged, and the report is still returned.
    ///
    /// # Errors
    ///
    /// - `CoreError::NotAuthenticated` if `caller` is `None`
    /// - `CoreError::StoreUnavailable` if the store availability check fails
    /// - `CoreError::InvalidReport` for no usable sources or a non-finite score
    /// - `CoreError::Conflict` if no unused id could be generated
    pub async fn submit(
        &self,
        caller: Option<&Principal>,
        sources: Vec<String>,
        plain_score: f64,
    ) -> Result<Report> {
        let owner = caller.ok_or(CoreError::NotAuthenticated)?;
        self.store.ensure_available().await?;

        let sources = normalize_sources(sources)?;
        if !plain_score.is_finite() {
            return Err(CoreError::InvalidReport(
                "score must be a finite number".into(),
            ));
        }

        let id = self.generate_id().await?;
        let opaque = self.codec().encode(plain_score);
        let report = Report::new(id, opaque, owner.as_str(), sources);

        self.store.save_record(&report).await?;

        if let Err(e) = self.store.append_to_index(&report.id).await {
            warn!(
                id = %report.id,
                error = %e,
                "Report saved but index append failed; record is orphaned"
            );
        }

        info!(id = %report.id, owner = %owner, "Report submitted");
        Ok(report)
    }

    /// Approve a pending report, transforming its score.
    ///
    /// # Errors
    ///
    /// - `CoreError::NotAuthenticated`, `CoreError::StoreUnavailable`
    /// - `CoreError::NotFound` if no record exists
    /// - `CoreError::Forbidden` if `caller` is not the owner
    /// - `CoreError::InvalidTransition` if the report is not pending
    /// - `CoreError::Decode` if the stored score is malformed
    /// - `CoreError::Conflict` if another writer changed the record first
    pub async fn approve(&self, id: &ReportId, caller: Option<&Principal>) -> Result<Report> {
        self.transition(id, caller, ReportStatus::Approved).await
    }

    /// Reject a pending report. The score is left untouched.
    ///
    /// Fails under the same conditions as [`ReportManager::approve`], minus
    /// decode errors.
    pub async fn reject(&self, id: &ReportId, caller: Option<&Principal>) -> Result<Report> {
        self.transition(id, caller, ReportStatus::Rejected).await
    }

    async fn transition(
        &self,
        id: &ReportId,
        caller: Option<&Principal>,
        next: ReportStatus,
    ) -> Result<Report> {
        let caller = caller.ok_or(CoreError::NotAuthenticated)?;
        self.store.ensure_available().await?;

        let VersionedReport { report, raw } = self
            .store
            .load_versioned(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;

        if !caller.matches(&report.owner) {
            return Err(CoreError::Forbidden(id.clone()));
        }
        if !report.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                id: id.clone(),
                from: report.status,
                to: next,
            });
        }

        let mut updated = report;
        if next == ReportStatus::Approved {
            updated.opaque_score = self
                .engine
                .apply(&updated.opaque_score, self.config.approval_operation)?;
        }
        updated.status = next;

        if self.uses_conditional_writes() {
            self.store.replace_record(&updated, &raw).await?;
        } else {
            self.store.save_record(&updated).await?;
        }

        info!(id = %id, status = %next, "Report status changed");
        Ok(updated)
    }

    fn uses_conditional_writes(&self) -> bool {
        self.config.optimistic_writes && self.store.kv().supports_conditional_writes()
    }

    async fn generate_id(&self) -> Result<ReportId> {
        let existing = self.store.list_ids().await?;
        for attempt in 1..=self.config.id_generation_attempts {
            let id = ReportId::generate();
            if !existing.contains(&id) {
                return Ok(id);
            }
            debug!(id = %id, attempt, "Generated id already indexed, retrying");
        }
        Err(CoreError::Conflict(format!(
            "no unused report id after {} attempts",
            self.config.id_generation_attempts
        )))
    }

    // =======================================================================
    // Reads
    // =======================================================================

    /// All reachable reports, newest first. Corrupt records are skipped.
    pub async fn list_reports(&self) -> Result<Vec<Report>> {
        self.store.ensure_available().await?;
        Ok(self.store.load_all().await?)
    }

    /// A single report.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if no record exists.
    pub async fn get_report(&self, id: &ReportId) -> Result<Report> {
        self.store.ensure_available().await?;
        self.store
            .load_record(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.clone()))
    }

    /// Reports whose id or any source contains `term`, ignoring case.
    pub async fn search(&self, term: &str) -> Result<Vec<Report>> {
        Ok(query::filter(self.list_reports().await?, term))
    }

    /// Status counts and the approved-score range.
    pub async fn stats(&self) -> Result<ReportStats> {
        let reports = self.list_reports().await?;
        Ok(ReportStats::compute(&reports, self.codec()))
    }

    /// Reveal a report's score to its owner after they sign the challenge.
    ///
    /// # Errors
    ///
    /// - `CoreError::NotAuthenticated`, `CoreError::StoreUnavailable`
    /// - `CoreError::NotFound`, `CoreError::Forbidden`
    /// - `CoreError::UserRejected` if the signer declines (no decode runs)
    /// - `CoreError::Decode` if the score is malformed
    pub async fn reveal_report<G>(
        &self,
        id: &ReportId,
        caller: Option<&Principal>,
        session: &SessionParams,
        signer: &G,
    ) -> Result<RevealedScore>
    where
        G: ChallengeSigner + ?Sized,
    {
        let caller = caller.ok_or(CoreError::NotAuthenticated)?;
        self.store.ensure_available().await?;

        let report = self
            .store
            .load_record(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;
        if !report.is_owned_by(caller.as_str()) {
            return Err(CoreError::Forbidden(id.clone()));
        }

        let revealed =
            cipherscore_protocol::reveal(self.codec(), &report.opaque_score, session, signer)
                .await?;
        debug!(id = %id, "Reveal authorized");
        Ok(revealed)
    }
}

fn normalize_sources(sources: Vec<String>) -> Result<Vec<String>> {
    let sources: Vec<String> = sources
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if sources.is_empty() {
        return Err(CoreError::InvalidReport(
            "at least one source is required".into(),
        ));
    }
    Ok(sources)
}
