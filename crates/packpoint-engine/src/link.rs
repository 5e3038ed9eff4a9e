//! Deep link handed to clients so they can locate the bootstrap record.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::EngineError;

/// Default URL scheme of bootstrap links.
pub const DEFAULT_LINK_SCHEME: &str = "packpoint";

const LINK_HOST: &str = "bootstrap";

/// `<scheme>://bootstrap?container=<container>&record=<record>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapLink {
    /// URL scheme.
    pub scheme: String,
    /// Store container the bootstrap record lives in.
    pub container: String,
    /// Identity of the bootstrap record.
    pub record: String,
}

impl BootstrapLink {
    /// Build a link with the default scheme.
    pub fn new(container: impl Into<String>, record: impl Into<String>) -> Self {
        Self {
            scheme: DEFAULT_LINK_SCHEME.to_string(),
            container: container.into(),
            record: record.into(),
        }
    }

    /// Replace the scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Render the link as a URL.
    pub fn to_url(&self) -> Result<Url, EngineError> {
        let mut url = Url::parse(&format!("{}://{LINK_HOST}", self.scheme))
            .map_err(|e| EngineError::InvalidLink(format!("scheme {:?}: {e}", self.scheme)))?;
        url.query_pairs_mut()
            .append_pair("container", &self.container)
            .append_pair("record", &self.record);
        Ok(url)
    }
}

impl fmt::Display for BootstrapLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_url() {
            Ok(url) => f.write_str(url.as_str()),
            Err(_) => write!(
                f,
                "{}://{LINK_HOST}?container={}&record={}",
                self.scheme, self.container, self.record
            ),
        }
    }
}

impl FromStr for BootstrapLink {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s).map_err(|e| EngineError::InvalidLink(e.to_string()))?;
        if url.host_str() != Some(LINK_HOST) {
            return Err(EngineError::InvalidLink(format!(
                "expected host {LINK_HOST:?}, got {:?}",
                url.host_str().unwrap_or("")
            )));
        }

        let mut container = None;
        let mut record = None;
        for (name, value) in url.query_pairs() {
            match name.as_ref() {
                "container" => container = Some(value.into_owned()),
                "record" => record = Some(value.into_owned()),
                _ => {}
            }
        }

        match (container, record) {
            (Some(container), Some(record)) if !container.is_empty() && !record.is_empty() => {
                Ok(Self {
                    scheme: url.scheme().to_string(),
                    container,
                    record,
                })
            }
            _ => Err(EngineError::InvalidLink(
                "missing container or record parameter".to_string(),
            )),
        }
    }
}
