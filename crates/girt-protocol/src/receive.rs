//! Receive-pack framing: the ref advertisement a server sends and the
//! update request a client builds. The CAS-guarded update itself is
//! layered over the reference store by the repository facade.

use girt_types::{HashAlgorithm, ObjectId};

use crate::caps::normalize_capabilities;
use crate::error::ProtoResult;
use crate::pktline::{flush_pkt, make_pkt_line};

/// The default receive-pack capability set for a repository, plus any
/// extras, deduplicated and sorted.
pub fn default_capabilities(algo: HashAlgorithm, extra: &[String]) -> Vec<String> {
    let mut caps = vec![
        "report-status".to_string(),
        "report-status-v2".to_string(),
        "delete-refs".to_string(),
        "side-band-64k".to_string(),
        "ofs-delta".to_string(),
        format!("object-format={algo}"),
    ];
    caps.extend(normalize_capabilities(extra));
    caps.sort();
    caps.dedup();
    caps
}

/// Build the ref advertisement.
///
/// One pkt-line per ref, ending with a flush. The first line carries
/// the capability list after a NUL. When `head_target` names one of
/// the refs, that ref is advertised first; the rest keep the caller's
/// order.
pub fn advertise_refs(
    refs: &[(String, ObjectId)],
    head_target: Option<&str>,
    algo: HashAlgorithm,
    extra_caps: &[String],
) -> ProtoResult<Vec<u8>> {
    let caps = default_capabilities(algo, extra_caps);

    let mut ordered: Vec<&(String, ObjectId)> = Vec::with_capacity(refs.len());
    if let Some(target) = head_target {
        if let Some(head_ref) = refs.iter().find(|(name, _)| name == target) {
            ordered.push(head_ref);
        }
    }
    for r in refs {
        if head_target != Some(r.0.as_str()) {
            ordered.push(r);
        }
    }

    let mut out = Vec::new();
    for (i, (name, oid)) in ordered.iter().enumerate() {
        let line = if i == 0 {
            format!("{oid} {name}\0{}\n", caps.join(" "))
        } else {
            format!("{oid} {name}\n")
        };
        out.extend_from_slice(&make_pkt_line(line.as_bytes())?);
    }
    out.extend_from_slice(&flush_pkt());
    Ok(out)
}

/// Build a client update request: one pkt-line
/// `<old> SP <new> SP <refname>` (with NUL-joined capabilities when
/// given), then a flush.
pub fn build_update_request(
    old: &ObjectId,
    new: &ObjectId,
    refname: &str,
    caps: &[String],
) -> ProtoResult<Vec<u8>> {
    let caps = normalize_capabilities(caps);
    let line = if caps.is_empty() {
        format!("{old} {new} {refname}")
    } else {
        format!("{old} {new} {refname}\0{}", caps.join(" "))
    };
    let mut out = make_pkt_line(line.as_bytes())?;
    out.extend_from_slice(&flush_pkt());
    Ok(out)
}
