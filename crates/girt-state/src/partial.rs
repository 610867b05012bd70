//! Partial-clone state: the accepted filter, the negotiated
//! capabilities and the promisor object table.
//!
//! Promisor entries hold deferred object payloads that have not yet
//! been materialized into the object store. Payloads are persisted as
//! JSON arrays of integers and validated to the byte range at every
//! use — a table edited out from under us must not inject garbage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};

/// Persisted partial-clone state (`partial-clone-codex.json`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialCloneState {
    pub filter_spec: Option<String>,
    pub capabilities: Vec<String>,
    /// Deferred payloads keyed by lowercase hex OID.
    pub promisor_objects: BTreeMap<String, Vec<i64>>,
}

impl PartialCloneState {
    /// Record a deferred payload under its (lowercased) OID.
    pub fn set_promisor(&mut self, oid_hex: &str, payload: &[u8]) {
        self.promisor_objects.insert(
            oid_hex.to_ascii_lowercase(),
            payload.iter().map(|&b| i64::from(b)).collect(),
        );
    }

    /// The promisor OIDs, lexicographically sorted (BTreeMap order).
    pub fn promisor_oids(&self) -> Vec<String> {
        self.promisor_objects.keys().cloned().collect()
    }
}

/// Check a promisor payload: every element must be an integer in
/// `0..=255`. Any deviation is an integrity failure.
pub fn validate_promisor_payload(oid_hex: &str, payload: &[i64]) -> StateResult<Vec<u8>> {
    payload
        .iter()
        .map(|&v| {
            u8::try_from(v).map_err(|_| {
                StateError::Integrity(format!(
                    "promisor payload for {oid_hex} holds non-byte value {v}"
                ))
            })
        })
        .collect()
}
