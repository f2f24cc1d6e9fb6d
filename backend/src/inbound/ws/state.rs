//! Shared WebSocket adapter state.

use std::sync::Arc;

use url::Url;

use crate::domain::ports::ChangeFeed;

/// Origins allowed to open the change feed.
///
/// `http://localhost:<port>` is always accepted for local front-end
/// development. HTTPS origins are accepted when their host is one of the
/// configured domains or a subdomain of one.
#[derive(Debug, Clone, Default)]
pub struct OriginAllowList {
    domains: Vec<String>,
}

impl OriginAllowList {
    /// Build from bare domain names such as `adopt.example`.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|domain| domain.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|domain| !domain.is_empty())
                .collect(),
        }
    }

    /// Parse a comma-separated list, e.g. from configuration.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn allows(&self, origin: &Url) -> bool {
        let Some(host) = origin.host_str() else {
            return false;
        };
        match origin.scheme() {
            "http" if host == "localhost" => matches!(origin.port(), Some(port) if port != 0),
            "https" => self.domains.iter().any(|domain| {
                host == domain
                    || host
                        .strip_suffix(domain.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }),
            _ => false,
        }
    }
}

/// Dependency bundle for the WebSocket handler.
#[derive(Clone)]
pub struct WsState {
    pub feed: Arc<dyn ChangeFeed>,
    pub origins: OriginAllowList,
}

impl WsState {
    pub fn new(feed: Arc<dyn ChangeFeed>, origins: OriginAllowList) -> Self {
        Self { feed, origins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:4000", true)]
    #[case("http://localhost:0", false)]
    #[case("http://localhost", false)]
    #[case("https://adopt.example", true)]
    #[case("https://www.adopt.example", true)]
    #[case("https://adopt.example.evil.com", false)]
    #[case("https://notadopt.example", false)]
    #[case("http://adopt.example", false)]
    #[case("wss://adopt.example", false)]
    fn evaluates_allow_list(#[case] origin: &str, #[case] expected: bool) {
        let list = OriginAllowList::from_csv(" adopt.example , ");
        let parsed = Url::parse(origin).expect("url should parse");
        assert_eq!(list.allows(&parsed), expected);
    }
}
