//! Adaptive source resolution.
//!
//! The matcher resolves raw bytes to a registered source in two phases:
//!
//! 1. **Hint path**: the position of the most recently matched source is
//!    kept in an atomically-swapped slot. Production traffic is usually
//!    dominated by a few message shapes, so re-checking that source first
//!    turns the average cost from O(sources) to O(1).
//! 2. **Full search**: the default group in registration order, then each
//!    custom group in registration order. Within a group the bytes are
//!    inspected exactly once; each source's discriminator is then tested
//!    against the shared view.
//!
//! The hint is never trusted as ground truth: it is bounds-checked and
//! its discriminator re-evaluated against a live view on every use, so a
//! stale hint costs a fallback search, never a misroute.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use courier_core::{Inspector, Source, View};

/// Sources sharing one inspector, checked in registration order.
pub(crate) struct Group {
    pub(crate) inspector: Arc<dyn Inspector>,
    pub(crate) sources: Vec<Arc<dyn Source>>,
}

/// Position of the most recently matched source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LastMatch {
    group: usize,
    index: usize,
}

/// Per-dispatch memoization of inspector results.
///
/// Keyed by inspector identity (the `Arc` data pointer), so an inspector
/// shared across groups still runs at most once per message. A failed
/// inspection is cached too: the format doesn't apply, and asking again
/// won't change that.
pub(crate) struct ViewCache<'r> {
    raw: &'r [u8],
    views: HashMap<usize, Option<Box<dyn View>>>,
}

impl<'r> ViewCache<'r> {
    fn new(raw: &'r [u8]) -> Self {
        Self {
            raw,
            views: HashMap::new(),
        }
    }

    fn view(&mut self, inspector: &Arc<dyn Inspector>) -> Option<&dyn View> {
        let key = Arc::as_ptr(inspector) as *const () as usize;
        let raw = self.raw;
        self.views
            .entry(key)
            .or_insert_with(|| match inspector.inspect(raw) {
                Ok(view) => Some(view),
                Err(error) => {
                    tracing::debug!(%error, "inspector rejected message, skipping its group");
                    None
                }
            })
            .as_deref()
    }
}

/// Resolves raw bytes to a source via the hint path plus full search.
pub(crate) struct Matcher {
    groups: Vec<Group>,
    last_match: ArcSwapOption<LastMatch>,
}

impl Matcher {
    /// `groups[0]` is the default group; custom groups follow in
    /// registration order.
    pub(crate) fn new(groups: Vec<Group>) -> Self {
        Self {
            groups,
            last_match: ArcSwapOption::const_empty(),
        }
    }

    /// Find the first source whose discriminator accepts `raw`.
    pub(crate) fn resolve(&self, raw: &[u8]) -> Option<Arc<dyn Source>> {
        let mut cache = ViewCache::new(raw);

        if let Some(hint) = self.last_match.load_full() {
            if let Some(source) = self.check_hint(&mut cache, *hint) {
                return Some(source);
            }
        }

        let (source, position) = self.match_all(&mut cache)?;
        self.last_match.store(Some(Arc::new(position)));
        Some(source)
    }

    /// Revalidate the hint: still in bounds, and its discriminator still
    /// accepts the current message.
    fn check_hint(&self, cache: &mut ViewCache<'_>, hint: LastMatch) -> Option<Arc<dyn Source>> {
        let group = self.groups.get(hint.group)?;
        let source = group.sources.get(hint.index)?;
        let view = cache.view(&group.inspector)?;
        source
            .discriminator()
            .matches(view)
            .then(|| Arc::clone(source))
    }

    fn match_all(&self, cache: &mut ViewCache<'_>) -> Option<(Arc<dyn Source>, LastMatch)> {
        for (group_idx, group) in self.groups.iter().enumerate() {
            if group.sources.is_empty() {
                continue;
            }
            let Some(view) = cache.view(&group.inspector) else {
                continue;
            };
            for (source_idx, source) in group.sources.iter().enumerate() {
                if source.discriminator().matches(view) {
                    let position = LastMatch {
                        group: group_idx,
                        index: source_idx,
                    };
                    return Some((Arc::clone(source), position));
                }
            }
        }
        None
    }
}
