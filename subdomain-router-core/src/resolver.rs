//! Host/path to redirect resolution.

use crate::error::{CoreError, CoreResult};
use crate::state::SiteState;
use crate::types::{SiteEntry, TargetForm};

/// Where an incoming request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The request hit the root domain itself.
    Index,
    /// `302 Found` to this location.
    Redirect(String),
}

/// Resolve `host` (optionally with a port) and `path` against the registry.
///
/// The leading label of `host` is matched case-sensitively against the leading
/// label of each site name.
pub fn resolve(state: &SiteState, root_domain: &str, host: &str, path: &str) -> CoreResult<Resolution> {
    if is_root_host(host, root_domain) {
        return Ok(Resolution::Index);
    }
    let host = strip_port(host).trim_end_matches('.');

    let label = host.split('.').next().unwrap_or_default();
    let entry = state
        .find_by_label(label)
        .ok_or_else(|| CoreError::SubdomainNotFound(label.to_string()))?;

    Ok(Resolution::Redirect(redirect_location(entry, path)))
}

/// Whether `host` (optionally with a port) names the root domain itself.
///
/// An empty host counts as the root.
pub fn is_root_host(host: &str, root_domain: &str) -> bool {
    let host = strip_port(host).trim_end_matches('.');
    host.is_empty() || host.eq_ignore_ascii_case(root_domain.trim_end_matches('.'))
}

/// Location for a visit to `entry` at `path`.
///
/// Redirect URLs lose one level of trailing slashes before a non-empty path is
/// appended and are returned verbatim otherwise; base hosts always get
/// `/` + path appended.
pub fn redirect_location(entry: &SiteEntry, path: &str) -> String {
    let path = path.strip_prefix('/').unwrap_or(path);
    match entry.target_form() {
        TargetForm::RedirectUrl if path.is_empty() => entry.target.clone(),
        TargetForm::RedirectUrl => format!("{}/{path}", entry.target.trim_end_matches('/')),
        TargetForm::BaseHost => format!("{}/{path}", entry.target),
    }
}

fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or_default();
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReconciledRecord, RecordKind};

    const ROOT: &str = "example.com";

    fn state() -> SiteState {
        let mut state = SiteState::new("203.0.113.1");
        for (name, target) in [
            ("blog.example.com", "https://example.org"),
            ("docs.example.com", "https://docs.example.org/"),
            ("lab.example.com", "10.0.0.5:8080"),
            ("raw.example.com", "http://10.0.0.5:8080"),
        ] {
            state.insert(
                SiteEntry::new(name, target, RecordKind::Url),
                ReconciledRecord::desired("203.0.113.1", None, true),
            );
        }
        state
    }

    fn location(host: &str, path: &str) -> String {
        match resolve(&state(), ROOT, host, path).unwrap() {
            Resolution::Redirect(location) => location,
            Resolution::Index => panic!("expected a redirect for {host}"),
        }
    }

    #[test]
    fn test_redirect_url_appends_path() {
        assert_eq!(location("blog.example.com", "/post/1"), "https://example.org/post/1");
        assert_eq!(location("docs.example.com", "guide"), "https://docs.example.org/guide");
    }

    #[test]
    fn test_redirect_url_without_path_is_verbatim() {
        assert_eq!(location("blog.example.com", "/"), "https://example.org");
        assert_eq!(location("docs.example.com", ""), "https://docs.example.org/");
    }

    #[test]
    fn test_base_host_always_gets_slash() {
        assert_eq!(location("lab.example.com", "/x"), "10.0.0.5:8080/x");
        assert_eq!(location("lab.example.com", "/"), "10.0.0.5:8080/");
        assert_eq!(location("raw.example.com", ""), "http://10.0.0.5:8080/");
    }

    #[test]
    fn test_port_is_ignored() {
        assert_eq!(location("blog.example.com:5678", "/a"), "https://example.org/a");
        assert_eq!(
            resolve(&state(), ROOT, "example.com:5678", "/").unwrap(),
            Resolution::Index
        );
    }

    #[test]
    fn test_root_and_unknown_hosts() {
        assert_eq!(resolve(&state(), ROOT, "EXAMPLE.com", "/").unwrap(), Resolution::Index);
        assert!(matches!(
            resolve(&state(), ROOT, "nope.example.com", "/"),
            Err(CoreError::SubdomainNotFound(label)) if label == "nope"
        ));
        assert!(matches!(
            resolve(&state(), ROOT, "Blog.example.com", "/"),
            Err(CoreError::SubdomainNotFound(_))
        ));
    }

    #[test]
    fn test_is_root_host() {
        assert!(is_root_host("example.com:8080", ROOT));
        assert!(is_root_host("Example.COM.", ROOT));
        assert!(is_root_host("", ROOT));
        assert!(!is_root_host("blog.example.com", ROOT));
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("a.example.com:80"), "a.example.com");
        assert_eq!(strip_port("a.example.com"), "a.example.com");
        assert_eq!(strip_port("[::1]:8080"), "::1");
    }
}
