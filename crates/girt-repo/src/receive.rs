//! Receive-pack over the reference store: the advertisement, the
//! request framing and the CAS-guarded update.
//!
//! The update is the concurrency gate of the whole ref surface: of two
//! writers racing with the same `old`, the one that lands second sees
//! a moved ref and fails with a lock conflict.

use std::collections::BTreeMap;

use girt_refs::{normalize_ref_name, Head};
use girt_types::ObjectId;

use crate::error::{RepoError, RepoResult};
use crate::ports::HookRequest;
use crate::repo::Repo;

/// One requested ref transition.
#[derive(Clone, Debug)]
pub struct ReceivePackUpdate {
    pub ref_name: String,
    pub old_oid: String,
    pub new_oid: String,
}

impl Repo {
    /// Build the ref advertisement for this repository: HEAD's target
    /// first when HEAD is symbolic and resolves among the refs.
    pub fn receive_pack_advertise_refs(&self, extra_caps: &[String]) -> RepoResult<Vec<u8>> {
        let refs = self.refs().list_refs("refs")?;
        let head_target = match self.refs().read_head() {
            Ok(Head::Symbolic(target)) => Some(target),
            _ => None,
        };
        Ok(girt_protocol::advertise_refs(
            &refs,
            head_target.as_deref(),
            self.algorithm(),
            extra_caps,
        )?)
    }

    /// Frame a client-side update request.
    pub fn receive_pack_request(
        &self,
        update: &ReceivePackUpdate,
        caps: &[String],
    ) -> RepoResult<Vec<u8>> {
        let (old, new) = self.parse_update_oids(update)?;
        let refname = normalize_ref_name(&update.ref_name);
        Ok(girt_protocol::build_update_request(&old, &new, &refname, caps)?)
    }

    /// Apply an update with compare-and-swap semantics.
    ///
    /// The current value must equal `old_oid` (all-zero when the ref
    /// is absent); otherwise the update fails with a lock conflict. A
    /// zero `new_oid` deletes the ref.
    pub fn receive_pack_update(&self, update: &ReceivePackUpdate) -> RepoResult<()> {
        let (old, new) = self.parse_update_oids(update)?;
        let refname = normalize_ref_name(&update.ref_name);
        if update.ref_name.trim().is_empty() {
            return Err(RepoError::InvalidArgument("empty ref name".into()));
        }

        self.dispatch_hook("pre-receive", &refname, &old, &new)?;

        let current = self
            .refs()
            .resolve_ref(&refname)?
            .unwrap_or_else(|| ObjectId::zero(self.algorithm()));
        if current != old {
            return Err(RepoError::LockConflict {
                refname,
                expected: old.to_hex(),
                actual: current.to_hex(),
            });
        }

        if new.is_zero() {
            self.refs().delete_ref(&refname, "receive-pack: delete")?;
        } else {
            self.refs().update_ref(&refname, &new, "receive-pack: update")?;
        }

        self.dispatch_hook("post-receive", &refname, &old, &new)?;
        tracing::debug!(refname = %update.ref_name, old = %old, new = %new, "receive-pack update applied");
        Ok(())
    }

    fn parse_update_oids(&self, update: &ReceivePackUpdate) -> RepoResult<(ObjectId, ObjectId)> {
        let old = ObjectId::from_hex(&update.old_oid)
            .map_err(|e| RepoError::InvalidArgument(format!("old oid: {e}")))?;
        let new = ObjectId::from_hex(&update.new_oid)
            .map_err(|e| RepoError::InvalidArgument(format!("new oid: {e}")))?;
        if old.algorithm() != new.algorithm() {
            return Err(RepoError::InvalidArgument(
                "old and new oids differ in length".into(),
            ));
        }
        Ok((old, new))
    }

    /// Run a receive hook when a hook port is configured. A non-zero
    /// pre-receive exit vetoes the update.
    fn dispatch_hook(
        &self,
        name: &str,
        refname: &str,
        old: &ObjectId,
        new: &ObjectId,
    ) -> RepoResult<()> {
        let Some(hooks) = self.hooks.as_ref() else {
            return Ok(());
        };
        let mut env = BTreeMap::new();
        env.insert("GIRT_REF".to_string(), refname.to_string());
        let outcome = hooks.execute(HookRequest {
            name: name.to_string(),
            argv: Vec::new(),
            stdin: format!("{old} {new} {refname}\n"),
            env,
        })?;
        if name == "pre-receive" && outcome.exit_code != 0 {
            return Err(RepoError::PermissionDenied(format!(
                "pre-receive hook rejected {refname}: {}",
                outcome.stderr.trim()
            )));
        }
        Ok(())
    }
}
