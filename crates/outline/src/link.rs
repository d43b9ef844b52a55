// ABOUTME: Fuzzy linking of content targets to the TOC listings that name them.
// ABOUTME: Exact text lookup, indel-ratio fallback above a threshold, and a must-precede positional rule.

use std::collections::BTreeMap;

use tracing::debug;

use crate::extract::{ContentTarget, TocListing};
use crate::options::{FuzzyTieBreak, Options};

/// Outcome counts of a linking pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub linked: usize,
    pub orphan_targets: usize,
    pub orphan_listings: usize,
}

/// Normalized indel similarity in `[0, 1]`.
///
/// `2 * lcs / (|a| + |b|)` over chars, which equals
/// `(|a| + |b| - indel) / (|a| + |b|)`. Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * lcs_len(&a, &b)) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Pick the lookup key closest to `text` among those strictly above the threshold.
///
/// Only a strictly better ratio replaces the current pick, so equal ratios
/// resolve to whichever key `keys` yields first.
fn closest_key<'a>(
    text: &str,
    keys: impl Iterator<Item = &'a String>,
    opts: &Options,
) -> Option<&'a String> {
    let mut best: Option<(f64, &String)> = None;
    for key in keys {
        let ratio = similarity(key, text);
        if ratio <= opts.fuzzy_threshold {
            continue;
        }
        let better = match (best, opts.fuzzy_tie_break) {
            (None, _) => true,
            (Some((current, _)), FuzzyTieBreak::Highest) => ratio > current,
            (Some((current, _)), FuzzyTieBreak::Lowest) => ratio < current,
        };
        if better {
            best = Some((ratio, key));
        }
    }
    best.map(|(_, key)| key)
}

/// Link every target to the listing that names it.
///
/// Both slices are sorted by address first; the `target`/`listing` index
/// fields set on success refer to positions in the sorted slices. Each
/// listing resolves at most one target, and only a listing that precedes the
/// target can name it.
pub fn link_listings_to_targets(
    listings: &mut [TocListing],
    targets: &mut [ContentTarget],
    opts: &Options,
) -> LinkReport {
    listings.sort_by(|a, b| a.address.cmp(&b.address));
    targets.sort_by(|a, b| a.address.cmp(&b.address));
    for listing in listings.iter_mut() {
        listing.target = None;
    }
    for target in targets.iter_mut() {
        target.listing = None;
    }

    let mut lookup: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut key_order: Vec<String> = Vec::new();
    for (i, listing) in listings.iter().enumerate() {
        if !lookup.contains_key(&listing.text) {
            key_order.push(listing.text.clone());
        }
        lookup.entry(listing.text.clone()).or_default().push(i);
    }

    let mut report = LinkReport::default();
    for ti in 0..targets.len() {
        let text = targets[ti].text.clone();
        // Lowest mode retries fuzzily once an exact key is spent and breaks
        // ratio ties by first listing; Highest stays on the exact key and
        // breaks ties by sorted key.
        let exact = lookup.get(&text).map(|c| !c.is_empty());
        let key = match (exact, opts.fuzzy_tie_break) {
            (Some(true), _) | (Some(false), FuzzyTieBreak::Highest) => Some(text),
            (_, FuzzyTieBreak::Highest) => closest_key(&text, lookup.keys(), opts).cloned(),
            (_, FuzzyTieBreak::Lowest) => closest_key(&text, key_order.iter(), opts).cloned(),
        };
        let Some(candidates) = key.and_then(|k| lookup.get_mut(&k)) else {
            continue;
        };
        let address = &targets[ti].address;
        let Some(pos) = candidates
            .iter()
            .rposition(|li| listings[*li].address < *address)
        else {
            continue;
        };
        let li = candidates.remove(pos);
        listings[li].target = Some(ti);
        targets[ti].listing = Some(li);
        report.linked += 1;
    }

    for target in targets.iter().filter(|t| t.listing.is_none()) {
        report.orphan_targets += 1;
        debug!(text = %target.text, address = %target.address, "unlinked content target");
    }
    for listing in listings.iter().filter(|l| l.target.is_none()) {
        report.orphan_listings += 1;
        debug!(text = %listing.text, address = %listing.address, "unlinked toc listing");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Address, Document};
    use crate::extract::EntrySource;
    use pretty_assertions::assert_eq;

    fn listing(text: &str, root: usize) -> TocListing {
        let node = Document::parse("").root();
        TocListing::new(node, Address::new(vec![root]), 1, text, EntrySource::Toc)
    }

    fn target(text: &str, root: usize) -> ContentTarget {
        let node = Document::parse("").root();
        ContentTarget::new(node, Address::new(vec![root]), text, EntrySource::Toc)
    }

    fn pairs(listings: &[TocListing], targets: &[ContentTarget]) -> Vec<(String, usize, usize)> {
        let mut out: Vec<_> = targets
            .iter()
            .filter_map(|t| {
                let l = &listings[t.listing?];
                Some((l.text.clone(), l.address.root_index(), t.address.root_index()))
            })
            .collect();
        out.sort();
        out
    }

    #[test]
    fn similarity_is_indel_ratio() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
        let typo = similarity("Summry", "Summary");
        assert!((typo - 12.0 / 13.0).abs() < 1e-9, "got {}", typo);
    }

    #[test]
    fn exact_matches_link_in_order() {
        let mut listings = vec![listing("Introduction", 10), listing("Background", 20)];
        let mut targets = vec![target("Introduction", 15), target("Background", 25)];
        let report = link_listings_to_targets(&mut listings, &mut targets, &Options::default());
        assert_eq!(report.linked, 2);
        assert_eq!(
            pairs(&listings, &targets),
            vec![
                ("Background".to_string(), 20, 25),
                ("Introduction".to_string(), 10, 15),
            ]
        );
    }

    #[test]
    fn typo_below_threshold_stays_orphaned() {
        let mut listings = vec![listing("Summary", 1)];
        let mut targets = vec![target("Summry", 5)];
        let report = link_listings_to_targets(&mut listings, &mut targets, &Options::default());
        assert_eq!(report.linked, 0);
        assert_eq!(report.orphan_targets, 1);
        assert_eq!(report.orphan_listings, 1);
        assert!(targets[0].listing.is_none());
    }

    #[test]
    fn near_identical_text_links_fuzzily() {
        let long = "Understanding Your Rights When Applying For Public Housing Programs";
        let near = "Understanding Your Rights When Applying For Public Housing Program";
        let mut listings = vec![listing(long, 1)];
        let mut targets = vec![target(near, 5)];
        let report = link_listings_to_targets(&mut listings, &mut targets, &Options::default());
        assert_eq!(report.linked, 1);
        assert_eq!(listings[0].target, Some(0));
    }

    #[test]
    fn listing_must_precede_target() {
        let mut listings = vec![listing("Voting", 30)];
        let mut targets = vec![target("Voting", 10)];
        let report = link_listings_to_targets(&mut listings, &mut targets, &Options::default());
        assert_eq!(report.linked, 0);
    }

    #[test]
    fn greatest_preceding_listing_wins_and_is_consumed() {
        let mut listings = vec![listing("Overview", 1), listing("Overview", 50)];
        let mut targets = vec![target("Overview", 60), target("Overview", 70)];
        link_listings_to_targets(&mut listings, &mut targets, &Options::default());
        assert_eq!(
            pairs(&listings, &targets),
            vec![("Overview".to_string(), 1, 70), ("Overview".to_string(), 50, 60)]
        );
    }

    #[test]
    fn exhausted_key_leaves_target_orphaned() {
        let mut listings = vec![listing("Overview", 1)];
        let mut targets = vec![target("Overview", 5), target("Overview", 9)];
        let report = link_listings_to_targets(&mut listings, &mut targets, &Options::default());
        assert_eq!(report.linked, 1);
        assert_eq!(report.orphan_targets, 1);
        assert_eq!(targets[0].listing, Some(0));
    }

    #[test]
    fn tie_break_selects_by_ratio() {
        let base = "abcdefghijklmnopqrstuvwxyz0123456789abcdefghijklmnopqrstuvwxyz";
        let one_off = format!("{}X", base);
        let two_off = format!("{}XY", base);
        let keys = vec![one_off.clone(), two_off.clone()];
        let high = closest_key(base, keys.iter(), &Options::default());
        assert_eq!(high, Some(&one_off));
        let parity = Options {
            fuzzy_tie_break: FuzzyTieBreak::Lowest,
            ..Options::default()
        };
        let low = closest_key(base, keys.iter(), &parity);
        assert_eq!(low, Some(&two_off));
    }

    #[test]
    fn equal_ratios_break_by_sorted_key_or_first_listing() {
        let base = "abcdefghijklmnopqrstuvwxyz0123456789abcdefghijklmnopqrstuvwxyz";
        let make = || {
            (
                vec![listing(&format!("{}X", base), 1), listing(&format!("{}A", base), 2)],
                vec![target(base, 10)],
            )
        };
        let (mut listings, mut targets) = make();
        link_listings_to_targets(&mut listings, &mut targets, &Options::default());
        assert_eq!(listings[targets[0].listing.unwrap()].address.root_index(), 2);

        let parity = Options {
            fuzzy_tie_break: FuzzyTieBreak::Lowest,
            ..Options::default()
        };
        let (mut listings, mut targets) = make();
        link_listings_to_targets(&mut listings, &mut targets, &parity);
        assert_eq!(listings[targets[0].listing.unwrap()].address.root_index(), 1);
    }

    #[test]
    fn lowest_mode_retries_fuzzily_when_exact_key_is_spent() {
        let base = "abcdefghijklmnopqrstuvwxyz0123456789abcdefghijklmnopqrstuvwxyz";
        let make = || {
            (
                vec![listing(base, 1), listing(&format!("{}X", base), 2)],
                vec![target(base, 10), target(base, 20)],
            )
        };
        let (mut listings, mut targets) = make();
        let report = link_listings_to_targets(&mut listings, &mut targets, &Options::default());
        assert_eq!(report.linked, 1);

        let parity = Options {
            fuzzy_tie_break: FuzzyTieBreak::Lowest,
            ..Options::default()
        };
        let (mut listings, mut targets) = make();
        let report = link_listings_to_targets(&mut listings, &mut targets, &parity);
        assert_eq!(report.linked, 2);
        assert_eq!(listings[targets[1].listing.unwrap()].address.root_index(), 2);
    }

    #[test]
    fn linking_is_independent_of_input_order() {
        let make = || {
            (
                vec![
                    listing("Jobs", 1),
                    listing("Housing", 2),
                    listing("Jobs", 3),
                    listing("Family", 4),
                ],
                vec![
                    target("Housing", 12),
                    target("Jobs", 10),
                    target("Jobs", 20),
                    target("Family", 30),
                    target("Unknown", 40),
                ],
            )
        };
        let (mut l1, mut t1) = make();
        link_listings_to_targets(&mut l1, &mut t1, &Options::default());
        let expected = pairs(&l1, &t1);

        let (mut l2, mut t2) = make();
        l2.reverse();
        t2.rotate_left(2);
        link_listings_to_targets(&mut l2, &mut t2, &Options::default());
        assert_eq!(pairs(&l2, &t2), expected);

        let (mut l3, mut t3) = make();
        l3.swap(0, 3);
        t3.reverse();
        link_listings_to_targets(&mut l3, &mut t3, &Options::default());
        assert_eq!(pairs(&l3, &t3), expected);
    }
}
