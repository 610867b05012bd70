//! Smart-HTTP discovery URL validation.

use crate::error::{ProtoError, ProtoResult};

/// Extract the service name from a smart-HTTP discovery URL.
///
/// The URL must carry exactly one query parameter, named `service`.
pub fn discovery_service(url: &str) -> ProtoResult<String> {
    let (_, query) = url
        .split_once('?')
        .ok_or_else(|| ProtoError::InvalidArgument("discovery URL has no query".into()))?;
    let params: Vec<&str> = query.split('&').collect();
    if params.len() != 1 {
        return Err(ProtoError::InvalidArgument(format!(
            "discovery URL must carry exactly one query parameter, got {}",
            params.len()
        )));
    }
    let (name, value) = params[0]
        .split_once('=')
        .ok_or_else(|| ProtoError::InvalidArgument("query parameter has no value".into()))?;
    if name != "service" {
        return Err(ProtoError::InvalidArgument(format!(
            "expected a 'service' parameter, got {name:?}"
        )));
    }
    Ok(value.to_string())
}
