//! Partial clone: filter negotiation, the promisor table and the
//! deterministic backfill that drains it into the object store.

use girt_protocol::{check_filter_support, normalize_capabilities};
use girt_state::{
    files, load_state, store_state, validate_promisor_payload, PartialCloneState,
};
use girt_types::{ObjectId, ObjectKind};

use crate::error::{RepoError, RepoResult};
use crate::ports::ProgressEvent;
use crate::repo::Repo;
use crate::ProgressCallback;

/// Options for a backfill run.
#[derive(Clone, Debug, Default)]
pub struct BackfillOptions {
    /// Intersect candidates with sparse-selected index blobs.
    pub sparse: bool,
    /// Smallest batch worth fetching; defaults to 1.
    pub min_batch_size: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackfillStatus {
    Completed,
    SkippedMinBatchSize,
}

/// What a backfill run touched. All lists are lex-sorted hex.
#[derive(Clone, Debug)]
pub struct BackfillOutcome {
    pub status: BackfillStatus,
    pub requested_oids: Vec<String>,
    pub fetched_oids: Vec<String>,
    pub remaining_promisor_oids: Vec<String>,
}

impl Repo {
    fn partial_state(&self) -> RepoResult<PartialCloneState> {
        Ok(load_state(&self.state_path(files::PARTIAL_CLONE))?)
    }

    fn store_partial_state(&self, state: &PartialCloneState) -> RepoResult<()> {
        Ok(store_state(&self.state_path(files::PARTIAL_CLONE), state)?)
    }

    /// Negotiate a partial-clone filter against peer capabilities and
    /// persist the accepted filter plus the normalized capability set.
    pub fn negotiate_partial_clone_filter(
        &self,
        filter: &str,
        peer_caps: &[String],
    ) -> RepoResult<()> {
        let accepted = check_filter_support(filter, peer_caps)?;
        let mut state = self.partial_state()?;
        state.filter_spec = Some(accepted);
        state.capabilities = normalize_capabilities(peer_caps);
        self.store_partial_state(&state)
    }

    /// Record a deferred payload for an OID (key lowercased).
    pub fn set_promisor_object(&self, oid_hex: &str, payload: &[u8]) -> RepoResult<()> {
        let normalized = oid_hex.to_ascii_lowercase();
        ObjectId::from_hex(&normalized)
            .map_err(|e| RepoError::InvalidArgument(format!("promisor oid: {e}")))?;
        let mut state = self.partial_state()?;
        state.set_promisor(&normalized, payload);
        self.store_partial_state(&state)
    }

    /// Resolve deferred content: promisor bytes if present, else the
    /// object store, and only then an integrity failure.
    pub fn resolve_promised_object(&self, oid_hex: &str) -> RepoResult<Vec<u8>> {
        let normalized = oid_hex.to_ascii_lowercase();
        let state = self.partial_state()?;
        if let Some(payload) = state.promisor_objects.get(&normalized) {
            return Ok(validate_promisor_payload(&normalized, payload)?);
        }
        let oid = ObjectId::from_hex(&normalized)
            .map_err(|e| RepoError::InvalidArgument(format!("oid: {e}")))?;
        match self.odb().read_object(&oid) {
            Ok(bytes) => Ok(bytes),
            Err(girt_odb::OdbError::NotFound(_)) => Err(RepoError::Odb(
                girt_odb::OdbError::Integrity(format!(
                    "object {normalized} is neither promised nor stored"
                )),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Materialize promisor objects into loose storage.
    ///
    /// Candidates are the sorted promisor OIDs, optionally intersected
    /// with the sparse-selected index blobs. A batch smaller than
    /// `min_batch_size` is skipped wholesale, leaving state untouched.
    pub fn backfill(
        &self,
        options: &BackfillOptions,
        progress: Option<ProgressCallback>,
    ) -> RepoResult<BackfillOutcome> {
        let min_batch = match options.min_batch_size {
            None => 1,
            Some(n) if n >= 0 => n as usize,
            Some(n) => {
                return Err(RepoError::InvalidArgument(format!(
                    "min_batch_size must be non-negative, got {n}"
                )))
            }
        };

        let mut state = self.partial_state()?;
        let mut candidates = state.promisor_oids();

        if options.sparse && self.sparse_checkout()?.is_some() {
            let index = self.read_index()?;
            let selected = self.sparse_selected_paths()?;
            let selected_oids: std::collections::BTreeSet<String> = index
                .entries
                .iter()
                .filter(|e| selected.binary_search(&e.path).is_ok())
                .map(|e| e.oid.to_hex())
                .collect();
            candidates.retain(|oid| selected_oids.contains(oid));
        }

        if candidates.len() < min_batch {
            return Ok(BackfillOutcome {
                status: BackfillStatus::SkippedMinBatchSize,
                requested_oids: candidates,
                fetched_oids: Vec::new(),
                remaining_promisor_oids: state.promisor_oids(),
            });
        }

        let mut fetched = Vec::new();
        for (i, oid_hex) in candidates.iter().enumerate() {
            let Some(payload) = state.promisor_objects.get(oid_hex) else {
                continue;
            };
            let bytes = validate_promisor_payload(oid_hex, payload)?;
            let oid = ObjectId::from_hex(oid_hex)
                .map_err(|e| RepoError::InvalidArgument(format!("promisor oid: {e}")))?;
            self.odb().write_loose_at(&oid, ObjectKind::Blob, &bytes)?;
            state.promisor_objects.remove(oid_hex);
            fetched.push(oid_hex.clone());
            if let Some(cb) = progress {
                cb(&ProgressEvent {
                    phase: "backfill".into(),
                    transferred: (i + 1) as u64,
                    total: Some(candidates.len() as u64),
                    message: Some(oid_hex.clone()),
                });
            }
        }

        self.store_partial_state(&state)?;
        tracing::info!(fetched = fetched.len(), "backfill batch completed");

        Ok(BackfillOutcome {
            status: BackfillStatus::Completed,
            requested_oids: candidates,
            fetched_oids: fetched,
            remaining_promisor_oids: state.promisor_oids(),
        })
    }
}
