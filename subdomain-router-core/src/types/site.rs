use std::fmt;

use serde::{Deserialize, Serialize};
use url::{Host, Url};

/// How a site is represented at the provider.
///
/// `A` points the name straight at its target; `Url` points the name at this
/// server so incoming visits can be redirected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    #[default]
    #[serde(rename = "A")]
    A,
    #[serde(rename = "URL")]
    Url,
}

impl RecordKind {
    /// Registry file spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Url => "URL",
        }
    }

    /// Parse the registry file spelling (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("A") {
            Some(Self::A)
        } else if raw.eq_ignore_ascii_case("URL") {
            Some(Self::Url)
        } else {
            None
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a redirect location is built from a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetForm {
    /// `http(s)` URL whose host is a domain name.
    RedirectUrl,
    /// Anything else (`host:port`, IP-literal URLs, bare strings).
    BaseHost,
}

impl TargetForm {
    /// Classify a raw target string.
    pub fn of(target: &str) -> Self {
        match Url::parse(target) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => match url.host() {
                Some(Host::Domain(_)) => Self::RedirectUrl,
                _ => Self::BaseHost,
            },
            _ => Self::BaseHost,
        }
    }
}

/// One registered site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteEntry {
    /// Fully qualified name (`blog.example.com`).
    pub name: String,
    /// Redirect URL, `host:port`, or an IPv4 address for direct records.
    pub target: String,
    /// Identifier of the backing record at the provider, once known.
    pub provider_record_id: Option<String>,
    pub kind: RecordKind,
    pub proxied: bool,
}

impl SiteEntry {
    /// A new entry with no provider record yet. Sites are proxied by default.
    pub fn new(name: impl Into<String>, target: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            provider_record_id: None,
            kind,
            proxied: true,
        }
    }

    /// Record content this entry should have at the provider.
    pub fn desired_content(&self, self_ip: &str) -> String {
        match self.kind {
            RecordKind::A => self.target.clone(),
            RecordKind::Url => self_ip.to_string(),
        }
    }

    pub fn target_form(&self) -> TargetForm {
        TargetForm::of(&self.target)
    }

    /// First DNS label of the name (`blog` for `blog.example.com`).
    pub fn leading_label(&self) -> &str {
        self.name.split('.').next().unwrap_or_default()
    }
}
