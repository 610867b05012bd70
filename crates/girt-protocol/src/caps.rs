//! Capability normalization and parity.

use crate::error::{ProtoError, ProtoResult};

/// Trim every capability and drop empties. Order is preserved.
pub fn normalize_capabilities(caps: &[String]) -> Vec<String> {
    caps.iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// The sorted intersection of two capability lists.
pub fn capability_parity(ours: &[String], theirs: &[String]) -> Vec<String> {
    let ours = normalize_capabilities(ours);
    let theirs = normalize_capabilities(theirs);
    let mut shared: Vec<String> = ours
        .into_iter()
        .filter(|c| theirs.contains(c))
        .collect();
    shared.sort();
    shared.dedup();
    shared
}

/// Validate a partial-clone filter negotiation: the filter must be a
/// non-empty trimmed spec and the peer must advertise `filter` (bare
/// or `filter=<spec>`).
pub fn check_filter_support(filter: &str, peer_caps: &[String]) -> ProtoResult<String> {
    let filter = filter.trim();
    if filter.is_empty() {
        return Err(ProtoError::InvalidArgument(
            "partial-clone filter must be non-empty".into(),
        ));
    }
    let caps = normalize_capabilities(peer_caps);
    let supported = caps
        .iter()
        .any(|c| c == "filter" || c.starts_with("filter="));
    if !supported {
        return Err(ProtoError::Unsupported(
            "peer does not advertise the filter capability".into(),
        ));
    }
    Ok(filter.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize_trims_and_drops() {
        let raw = caps(&["  side-band-64k ", "", "  ", "ofs-delta"]);
        assert_eq!(
            normalize_capabilities(&raw),
            caps(&["side-band-64k", "ofs-delta"])
        );
    }

    #[test]
    fn parity_is_sorted_intersection() {
        let ours = caps(&["ofs-delta", "side-band-64k", "report-status"]);
        let theirs = caps(&["side-band-64k ", "ofs-delta", "delete-refs"]);
        assert_eq!(
            capability_parity(&ours, &theirs),
            caps(&["ofs-delta", "side-band-64k"])
        );
    }

    #[test]
    fn parity_empty_when_disjoint() {
        assert!(capability_parity(&caps(&["a"]), &caps(&["b"])).is_empty());
    }

    #[test]
    fn filter_accepts_bare_and_assigned() {
        assert_eq!(
            check_filter_support("blob:none", &caps(&["filter"])).unwrap(),
            "blob:none"
        );
        assert!(check_filter_support("blob:none", &caps(&["filter=blob:none"])).is_ok());
        assert_eq!(
            check_filter_support("  tree:0  ", &caps(&["filter"])).unwrap(),
            "tree:0"
        );
    }

    #[test]
    fn filter_rejects_empty_spec() {
        let err = check_filter_support("   ", &caps(&["filter"])).unwrap_err();
        assert!(matches!(err, ProtoError::InvalidArgument(_)));
    }

    #[test]
    fn filter_rejects_unsupporting_peer() {
        let err = check_filter_support("blob:none", &caps(&["ofs-delta"])).unwrap_err();
        assert!(matches!(err, ProtoError::Unsupported(_)));
        // "filtered" must not count as "filter".
        let err = check_filter_support("blob:none", &caps(&["filtered"])).unwrap_err();
        assert!(matches!(err, ProtoError::Unsupported(_)));
    }
}
