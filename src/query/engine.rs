use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use super::FilterPredicate;
use crate::metadata::Metadata;

/// Stored file name to metadata, ordered by name.
pub type Listing = BTreeMap<String, Metadata>;

/// Narrows `listing` down to the files matching every predicate.
///
/// Each predicate intersects the surviving set with the files it matches, so
/// the result for `{p1, p2}` is exactly the intersection of the results for
/// `{p1}` and `{p2}`. With no predicates the listing is returned unchanged.
pub fn filter_listing(mut listing: Listing, predicates: &[FilterPredicate]) -> Listing {
    if predicates.is_empty() {
        return listing;
    }

    let mut surviving: BTreeSet<String> = listing.keys().cloned().collect();
    for predicate in predicates {
        let matching: BTreeSet<String> = listing
            .iter()
            .filter(|(_, metadata)| predicate.matches(metadata))
            .map(|(name, _)| name.clone())
            .collect();
        surviving = surviving.intersection(&matching).cloned().collect();
        trace!(
            "Filter {} kept {} file(s)",
            predicate.key(),
            surviving.len()
        );
        if surviving.is_empty() {
            break;
        }
    }

    listing.retain(|name, _| surviving.contains(name));
    listing
}
