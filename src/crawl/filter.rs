// src/crawl/filter.rs
// =============================================================================
// Link filter: decides which discovered links go into the next frontier.
//
// A candidate survives only if
// 1. it hasn't been visited yet,
// 2. it has the same origin (scheme + host + port) as the seed, and
// 3. its path doesn't end with a blacklisted suffix (".pdf", ".jpg", ...).
//
// The checks run on a page key: the link reduced to scheme://host/path, so
// "/a#top" and "/a?x=1" count as the same page as "/a". What goes into the
// frontier is still the link that was discovered (minus its fragment), so
// the crawler never requests a URL no page pointed to. When several links
// share a key, the smallest one by string order is kept.
//
// The filter is a pure function: same inputs, same output, no matter how
// many times it runs. The output is a BTreeSet so the next frontier comes
// out sorted by URL string and batching is reproducible.
//
// Rust concepts:
// - Iterator adapters: filter() chains one predicate per rule
// - BTreeMap entry API: insert-or-compare in a single lookup
// =============================================================================

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use url::{Origin, Url};

// Reduces a URL to the page it identifies: no fragment, no query
pub fn normalize(url: &Url) -> Url {
    let mut url = strip_fragment(url);
    url.set_query(None);
    url
}

// The fragment never reaches the server, so it is dropped before fetching
pub fn strip_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

// True if the URL's path ends with one of the blacklisted suffixes.
// Comparison ignores ASCII case, so ".PDF" is caught by ".pdf".
pub fn is_blacklisted(url: &Url, blacklist: &[String]) -> bool {
    let path = url.path().to_ascii_lowercase();
    blacklist
        .iter()
        .filter(|suffix| !suffix.is_empty())
        .any(|suffix| path.ends_with(&suffix.to_ascii_lowercase()))
}

// `visited` holds page keys (see normalize)
pub fn filter_links<'a, I>(
    candidates: I,
    visited: &HashSet<Url>,
    origin: &Origin,
    blacklist: &[String],
) -> BTreeSet<Url>
where
    I: IntoIterator<Item = &'a Url>,
{
    let mut pages: BTreeMap<Url, Url> = BTreeMap::new();

    candidates
        .into_iter()
        .map(|link| (normalize(link), strip_fragment(link)))
        .filter(|(key, _)| !visited.contains(key))
        .filter(|(key, _)| key.origin() == *origin)
        .filter(|(key, _)| !is_blacklisted(key, blacklist))
        .for_each(|(key, link)| match pages.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(link);
            }
            Entry::Occupied(mut slot) => {
                if link < *slot.get() {
                    slot.insert(link);
                }
            }
        });

    pages.into_values().collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a page key and a link?
//    - The key answers "have we seen this page?" and ignores ?query and #frag
//    - The link is what actually gets requested, so it keeps its query
//    - Keeping both apart means dedup is coarse but fetching stays faithful
//
// 2. Why BTreeSet/BTreeMap instead of HashSet/HashMap?
//    - B-tree collections iterate in sorted order
//    - Hash collections iterate in an order that changes from run to run
//    - A sorted frontier gives the same batches every time
//
// 3. What does `Entry` do?
//    - map.entry(key) looks the key up once and hands back a slot
//    - Vacant: nothing there yet, we can insert
//    - Occupied: a value exists, we can read or replace it
// -----------------------------------------------------------------------------
