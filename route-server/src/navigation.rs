//! Navigation deep links.
//!
//! Builds a path-style directions URL from an ordered list of addresses:
//!
//! ```text
//! https://www.google.com/maps/dir/<origin>/<waypoint 1>/.../<destination>
//! ```
//!
//! Each segment is a percent-encoded, trimmed address.

use crate::domain::Stop;

/// Default directions base URL.
pub const DEFAULT_NAV_BASE: &str = "https://www.google.com/maps/dir";

/// Generates directions links under a configurable base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLinkBuilder {
    base: String,
}

impl Default for NavigationLinkBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_NAV_BASE)
    }
}

impl NavigationLinkBuilder {
    /// Create a builder for `base`. A trailing slash is ignored.
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Link for `addresses` in travel order.
    ///
    /// Returns an empty string if the first (origin) or last (destination)
    /// entry is blank. Blank waypoints in between are dropped.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let nav = NavigationLinkBuilder::new("scheme://dir");
    /// assert_eq!(nav.build(&["100 A St", "200 B Ave"]), "scheme://dir/100%20A%20St/200%20B%20Ave");
    /// ```
    pub fn build<S: AsRef<str>>(&self, addresses: &[S]) -> String {
        let (Some(first), Some(last)) = (addresses.first(), addresses.last()) else {
            return String::new();
        };
        if addresses.len() < 2 || first.as_ref().trim().is_empty() || last.as_ref().trim().is_empty() {
            return String::new();
        }

        let mut url = self.base.clone();
        for address in addresses.iter().map(|a| a.as_ref().trim()).filter(|a| !a.is_empty()) {
            url.push('/');
            url.push_str(&urlencoding::encode(address));
        }
        url
    }

    /// Link for stops in route order.
    pub fn for_stops(&self, stops: &[Stop]) -> String {
        let addresses: Vec<&str> = stops.iter().map(|s| s.address.as_str()).collect();
        self.build(&addresses)
    }

    /// Decode the address segments of a link produced by this builder.
    ///
    /// Returns `None` if the link has a different base or a segment is not
    /// valid UTF-8 once decoded.
    pub fn decode_segments(&self, url: &str) -> Option<Vec<String>> {
        let path = url.strip_prefix(&self.base)?.strip_prefix('/')?;
        path.split('/')
            .map(|segment| urlencoding::decode(segment).ok().map(|s| s.into_owned()))
            .collect()
    }
}
