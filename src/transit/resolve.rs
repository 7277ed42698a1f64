//! Station name → site id.

use crate::error::FeedError;
use crate::source::TransitSource;

use super::types::{Site, SiteId};

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Pick the site for `name`.
///
/// An exact (trimmed, case-folded) match wins over a substring match, so
/// "Duvbo" finds the metro station and not the "Duvbo torg" bus stop.
pub fn find_site(sites: &[Site], name: &str) -> Option<SiteId> {
    let needle = normalize(name);
    if needle.is_empty() {
        return None;
    }

    let named = || {
        sites
            .iter()
            .filter_map(|s| s.name.as_deref().map(|n| (s.id, normalize(n))))
    };

    named()
        .find(|(_, n)| *n == needle)
        .or_else(|| named().find(|(_, n)| n.contains(&needle)))
        .map(|(id, _)| SiteId(id))
}

/// Fetch the site list once and resolve `name` against it.
pub async fn resolve_station<S: TransitSource>(source: &S, name: &str) -> Result<SiteId, FeedError> {
    let sites = source.sites().await?;
    tracing::debug!(candidates = sites.len(), station = name, "resolving station");
    find_site(&sites, name).ok_or_else(|| FeedError::StationNotFound(name.to_string()))
}
