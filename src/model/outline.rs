//! Flat, depth-tagged document outlines.
//!
//! Outline producers discover headings in a single top-to-bottom pass, so the
//! table of contents arrives as a flat list where each entry carries its depth.
//! An entry at depth `d` is a child of the nearest preceding entry at `d - 1`.
//! This module normalizes such lists and rebuilds the implied forest.

use crate::error::{Error, Result};

/// One heading in the document's table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
pub struct OutlineEntry {
    /// Nesting depth, 1 = top level.
    pub depth: usize,
    /// Display text, already escaped for markup.
    pub title: String,
    /// Link target: a file plus optional `#fragment`.
    pub target: String,
}

impl OutlineEntry {
    pub fn new(depth: usize, title: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            depth,
            title: title.into(),
            target: target.into(),
        }
    }
}

/// How to treat entries that descend more than one level at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "snake_case"))]
pub enum DepthPolicy {
    /// Fail with [`Error::MalformedOutline`].
    #[default]
    Reject,
    /// Cap the entry at one level below its predecessor.
    Clamp,
}

/// An explicit node of the rebuilt outline tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPoint {
    pub depth: usize,
    pub title: String,
    pub target: String,
    pub children: Vec<NavPoint>,
}

/// Ordered sequence of outline entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(transparent))]
pub struct Outline {
    entries: Vec<OutlineEntry>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: OutlineEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deepest level present, or 0 for an empty outline.
    pub fn max_depth(&self) -> usize {
        self.entries.iter().map(|e| e.depth).max().unwrap_or(0)
    }

    /// Enforce the depth invariants.
    ///
    /// Each entry must sit between depth 1 and one level below its
    /// predecessor (the first entry must be at depth 1). Upward jumps of any
    /// size are always valid. Under [`DepthPolicy::Clamp`] out-of-range
    /// depths are pulled into range instead of rejected; no intermediate
    /// levels are ever synthesized.
    pub fn normalize(mut self, policy: DepthPolicy) -> Result<Self> {
        let mut previous = 0;
        for (index, entry) in self.entries.iter_mut().enumerate() {
            let allowed = previous + 1;
            if entry.depth == 0 || entry.depth > allowed {
                match policy {
                    DepthPolicy::Reject => {
                        return Err(Error::MalformedOutline {
                            index,
                            depth: entry.depth,
                            previous,
                        });
                    }
                    DepthPolicy::Clamp => {
                        let clamped = entry.depth.clamp(1, allowed);
                        tracing::debug!(
                            index,
                            from = entry.depth,
                            to = clamped,
                            "clamped outline depth"
                        );
                        entry.depth = clamped;
                    }
                }
            }
            previous = entry.depth;
        }
        Ok(self)
    }

    /// Drop every entry deeper than `max_depth`.
    ///
    /// Removing a suffix of levels never breaks the depth invariant, so a
    /// normalized outline stays normalized.
    pub fn truncate_depth(mut self, max_depth: usize) -> Self {
        self.entries.retain(|e| e.depth <= max_depth);
        self
    }

    /// Rebuild the implicit forest.
    ///
    /// Uses an explicit stack of open parents: an entry pops every frame at
    /// its own depth or deeper, then becomes the child of whatever frame is
    /// left on top. Expects a normalized outline; an unnormalized deep jump
    /// is attached to the nearest shallower entry rather than padded.
    pub fn to_nested(&self) -> Vec<NavPoint> {
        let mut roots: Vec<NavPoint> = Vec::new();
        let mut stack: Vec<NavPoint> = Vec::new();

        for entry in &self.entries {
            while stack.last().is_some_and(|top| top.depth >= entry.depth) {
                close_frame(&mut stack, &mut roots);
            }
            stack.push(NavPoint {
                depth: entry.depth,
                title: entry.title.clone(),
                target: entry.target.clone(),
                children: Vec::new(),
            });
        }
        while !stack.is_empty() {
            close_frame(&mut stack, &mut roots);
        }

        roots
    }
}

/// Pop the top frame and attach it to its parent (or the root list).
fn close_frame(stack: &mut Vec<NavPoint>, roots: &mut Vec<NavPoint>) {
    if let Some(node) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}

impl From<Vec<OutlineEntry>> for Outline {
    fn from(entries: Vec<OutlineEntry>) -> Self {
        Self { entries }
    }
}

impl FromIterator<OutlineEntry> for Outline {
    fn from_iter<I: IntoIterator<Item = OutlineEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Outline {
    type Item = &'a OutlineEntry;
    type IntoIter = std::slice::Iter<'a, OutlineEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn outline(depths: &[usize]) -> Outline {
        depths
            .iter()
            .enumerate()
            .map(|(i, &d)| OutlineEntry::new(d, format!("E{i}"), format!("f.xhtml#e{i}")))
            .collect()
    }

    fn depths(outline: &Outline) -> Vec<usize> {
        outline.entries().iter().map(|e| e.depth).collect()
    }

    fn flatten(points: &[NavPoint], out: &mut Vec<(usize, String)>) {
        for p in points {
            out.push((p.depth, p.title.clone()));
            flatten(&p.children, out);
        }
    }

    /// Random valid depth sequences: start at 1, step down at most one level.
    fn valid_depths() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(0usize..6, 0..40).prop_map(|raw| {
            let mut out = Vec::with_capacity(raw.len());
            let mut prev = 0;
            for r in raw {
                // r == 0 goes deeper, anything else picks a shallower-or-equal level
                let d = if r == 0 { prev + 1 } else { r.min(prev).max(1) };
                out.push(d);
                prev = d;
            }
            out
        })
    }

    #[test]
    fn normalize_accepts_valid_outline() {
        let o = outline(&[1, 2, 3, 1, 2, 2, 1]);
        let n = o.clone().normalize(DepthPolicy::Reject).unwrap();
        assert_eq!(n, o);
    }

    #[test]
    fn normalize_rejects_skip() {
        let err = outline(&[1, 3]).normalize(DepthPolicy::Reject).unwrap_err();
        match err {
            Error::MalformedOutline {
                index,
                depth,
                previous,
            } => {
                assert_eq!((index, depth, previous), (1, 3, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn normalize_rejects_first_entry_below_top() {
        assert!(matches!(
            outline(&[2, 1]).normalize(DepthPolicy::Reject),
            Err(Error::MalformedOutline { index: 0, .. })
        ));
    }

    #[test]
    fn normalize_rejects_zero_depth() {
        assert!(matches!(
            outline(&[1, 0]).normalize(DepthPolicy::Reject),
            Err(Error::MalformedOutline { index: 1, depth: 0, .. })
        ));
    }

    #[test]
    fn normalize_clamps_skip() {
        let n = outline(&[1, 3, 4, 1]).normalize(DepthPolicy::Clamp).unwrap();
        assert_eq!(depths(&n), vec![1, 2, 3, 1]);
    }

    #[test]
    fn normalize_clamps_first_and_zero() {
        let n = outline(&[3, 0, 2]).normalize(DepthPolicy::Clamp).unwrap();
        assert_eq!(depths(&n), vec![1, 1, 2]);
    }

    #[test]
    fn upward_jumps_are_valid() {
        let o = outline(&[1, 2, 3, 4, 1]);
        assert!(o.normalize(DepthPolicy::Reject).is_ok());
    }

    #[test]
    fn truncate_depth_drops_deep_entries() {
        let o = outline(&[1, 2, 3, 2, 1]).truncate_depth(2);
        assert_eq!(depths(&o), vec![1, 2, 2, 1]);
    }

    #[test]
    fn to_nested_example() {
        let o: Outline = vec![
            OutlineEntry::new(1, "A", "a.xhtml"),
            OutlineEntry::new(2, "A.1", "a.xhtml#s1"),
            OutlineEntry::new(2, "A.2", "a.xhtml#s2"),
            OutlineEntry::new(1, "B", "b.xhtml"),
        ]
        .into();
        let tree = o.to_nested();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].title, "A");
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[1].target, "a.xhtml#s2");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn to_nested_multi_level_close() {
        let tree = outline(&[1, 2, 3, 1]).to_nested();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].children[0].children[0].depth, 3);
    }

    #[test]
    fn to_nested_empty() {
        assert!(Outline::new().to_nested().is_empty());
        assert_eq!(Outline::new().max_depth(), 0);
    }

    proptest! {
        #[test]
        fn prop_valid_outlines_survive_reject(d in valid_depths()) {
            let o = outline(&d);
            prop_assert_eq!(o.clone().normalize(DepthPolicy::Reject).unwrap(), o);
        }

        #[test]
        fn prop_clamp_output_is_valid(d in prop::collection::vec(0usize..8, 0..40)) {
            let n = outline(&d).normalize(DepthPolicy::Clamp).unwrap();
            prop_assert!(n.clone().normalize(DepthPolicy::Reject).is_ok());
            prop_assert_eq!(n.len(), d.len());
        }

        #[test]
        fn prop_nested_preorder_matches_input(d in valid_depths()) {
            let o = outline(&d);
            let mut flat = Vec::new();
            flatten(&o.to_nested(), &mut flat);
            let expected: Vec<_> = o.entries().iter().map(|e| (e.depth, e.title.clone())).collect();
            prop_assert_eq!(flat, expected);
        }
    }
}
