//! Registry JSON codec.
//!
//! The file is a JSON object keyed by fully qualified site name. A value is
//! either a bare target string or a tuple:
//!
//! ```json
//! {
//!     "blog.example.com": ["https://example.org", "abc123", "URL", true],
//!     "api.example.com": "198.51.100.7"
//! }
//! ```
//!
//! Tuple slots are `[target, provider_record_id, kind, proxied]`; only the
//! target is required. An empty id means "not created yet".

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::error::{CoreError, CoreResult};
use crate::state::SiteState;
use crate::types::{ReconciledRecord, RecordKind, SiteEntry, TargetForm};

/// One site read from the registry file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSite {
    pub entry: SiteEntry,
    pub record: ReconciledRecord,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSite {
    Shorthand(String),
    Tuple(Vec<Value>),
}

/// Decode the registry file, keeping its key order. `self_ip` becomes the record content of `URL` sites.
pub fn decode_registry(json: &str, self_ip: &str) -> CoreResult<Vec<DecodedSite>> {
    let raw: IndexMap<String, RawSite> = serde_json::from_str(json)
        .map_err(|e| CoreError::RegistryDecodeFailed(e.to_string()))?;

    raw.into_iter()
        .map(|(name, site)| decode_site(name, site, self_ip))
        .collect()
}

fn decode_site(name: String, raw: RawSite, self_ip: &str) -> CoreResult<DecodedSite> {
    let (target, id, kind, proxied) = match raw {
        RawSite::Shorthand(target) => (target, None, RecordKind::A, true),
        RawSite::Tuple(values) => decode_tuple(&name, &values)?,
    };

    let entry = SiteEntry {
        name,
        target,
        provider_record_id: id.clone(),
        kind,
        proxied,
    };
    let record = ReconciledRecord::desired(entry.desired_content(self_ip), id, proxied);
    Ok(DecodedSite { entry, record })
}

fn decode_tuple(
    name: &str,
    values: &[Value],
) -> CoreResult<(String, Option<String>, RecordKind, bool)> {
    let invalid = |what: &str| CoreError::RegistryDecodeFailed(format!("'{name}': {what}"));

    if values.is_empty() || values.len() > 4 {
        return Err(invalid("expected 1 to 4 elements"));
    }

    let target = values[0]
        .as_str()
        .ok_or_else(|| invalid("target must be a string"))?
        .to_string();

    let id = match values.get(1) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(invalid("record id must be a string")),
    };

    let kind = match values.get(2) {
        None | Some(Value::Null) => RecordKind::A,
        Some(Value::String(s)) => {
            RecordKind::parse(s).ok_or_else(|| invalid(&format!("unknown record kind '{s}'")))?
        }
        Some(_) => return Err(invalid("record kind must be a string")),
    };

    let proxied = match values.get(3) {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(invalid("proxied must be a boolean")),
    };

    Ok((target, id, kind, proxied))
}

/// Encode the registry as pretty JSON with 4-space indentation, in registry
/// order.
///
/// A site whose record points at this server and whose target is an absolute
/// URL is written as `URL` so the next decode re-synthesizes the same record.
pub fn encode_registry(state: &SiteState) -> CoreResult<String> {
    let mut out = IndexMap::new();
    for (name, entry) in state.entries() {
        out.insert(
            name.as_str(),
            encode_site(entry, state.record(name), state.self_ip()),
        );
    }

    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    out.serialize(&mut ser)
        .map_err(|e| CoreError::StorageError(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| CoreError::StorageError(e.to_string()))
}

fn encode_site(entry: &SiteEntry, record: Option<&ReconciledRecord>, self_ip: &str) -> Value {
    let (id, proxied, points_here) = match record {
        Some(r) => (
            r.provider_record_id.clone().or_else(|| entry.provider_record_id.clone()),
            r.proxied,
            r.content == self_ip,
        ),
        None => (
            entry.provider_record_id.clone(),
            entry.proxied,
            entry.kind == RecordKind::Url,
        ),
    };

    let kind = if points_here && entry.target_form() == TargetForm::RedirectUrl {
        RecordKind::Url
    } else {
        entry.kind
    };

    Value::Array(vec![
        Value::String(entry.target.clone()),
        Value::String(id.unwrap_or_default()),
        Value::String(kind.as_str().to_string()),
        Value::Bool(proxied),
    ])
}
