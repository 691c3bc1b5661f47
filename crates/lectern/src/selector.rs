//! Readable block selection.
//!
//! Given a document snapshot, [`select`] finds the smallest set of
//! "top-level readable" elements: blocks a listener would want read aloud as
//! a unit. The rules, applied to every element below the root:
//!
//! 1. **Eligibility.** The element's category is not ignored and its trimmed
//!    text is non-empty.
//! 2. **Sole-child promotion.** An element that is the only element child of
//!    a non-root parent is absorbed: the parent stands for it.
//! 3. **Leaf preference.** An element's *readable children* are its eligible,
//!    non-absorbed element children. With none, or with several, the element
//!    is a candidate. With exactly one, it defers to that child. An element
//!    whose only child was absorbed takes that child's decision.
//! 4. **Containment.** Candidates are accepted in pre-order, skipping those
//!    inside an already accepted element, then any accepted element that is a
//!    strict ancestor of another is dropped.
//!
//! The resulting [`ReadableSet`] never contains two members where one is an
//! ancestor of the other.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use lectern_core::NodeId;
use lectern_core::logging::span_names;

use crate::document::{Category, DocumentTree, NodeKind};

const TARGET: &str = "lectern::selector";

/// Categories ignored by default: headings, controls, inline spans, images
/// and preformatted or script content.
pub const DEFAULT_IGNORE: &[&str] = &[
    "H1", "H2", "H3", "H4", "H5", "H6", "BUTTON", "LABEL", "SPAN", "IMG", "PRE", "SCRIPT",
];

/// A set of categories that can never be selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSet(HashSet<Category>);

impl IgnoreSet {
    /// An ignore-set that ignores nothing.
    pub fn empty() -> Self {
        Self(HashSet::new())
    }

    /// Whether `category` is ignored.
    pub fn contains(&self, category: &Category) -> bool {
        self.0.contains(category)
    }

    pub fn insert(&mut self, category: impl Into<Category>) -> bool {
        self.0.insert(category.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        DEFAULT_IGNORE.iter().copied().collect()
    }
}

impl<C: Into<Category>> FromIterator<C> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Identity of one [`ReadableSet`]. Every selection gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadableSetId(u64);

impl ReadableSetId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ReadableSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "readable-set#{}", self.0)
    }
}

/// The ordered set of top-level readable nodes of one document snapshot.
#[derive(Debug, Clone)]
pub struct ReadableSet {
    id: ReadableSetId,
    nodes: Vec<NodeId>,
    members: HashSet<NodeId>,
}

impl ReadableSet {
    fn from_nodes(nodes: Vec<NodeId>) -> Self {
        let members = nodes.iter().copied().collect();
        Self {
            id: ReadableSetId::next(),
            nodes,
            members,
        }
    }

    /// A set with no members.
    pub fn empty() -> Self {
        Self::from_nodes(Vec::new())
    }

    pub fn id(&self) -> ReadableSetId {
        self.id
    }

    /// Members in document order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `node` is itself a member.
    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    /// The member that is `node` or one of its ancestors.
    pub fn member_containing(&self, doc: &DocumentTree, node: NodeId) -> Option<NodeId> {
        doc.ancestors(node).find(|id| self.members.contains(id))
    }

    /// Whether `node` lies inside any member, members themselves included.
    pub fn contains_inclusive(&self, doc: &DocumentTree, node: NodeId) -> bool {
        self.member_containing(doc, node).is_some()
    }
}

impl PartialEq for ReadableSet {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ReadableSet {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Candidate,
    Defer,
}

/// Select the readable set of the whole document.
pub fn select_document(doc: &DocumentTree, ignore: &IgnoreSet) -> ReadableSet {
    select(doc, &doc.elements(), ignore)
}

/// Select the readable set among `nodes`, which should list element
/// descendants of the root in pre-order.
///
/// Nodes no longer in the document, text nodes and the root are skipped.
#[tracing::instrument(name = "lectern::select", level = "debug", skip_all, fields(nodes = nodes.len()))]
pub fn select(doc: &DocumentTree, nodes: &[NodeId], ignore: &IgnoreSet) -> ReadableSet {
    let _perf = lectern_core::PerfSpan::new(span_names::SELECT);
    let root = doc.root();

    let all = doc.descendants(root);
    let has_text = text_flags(doc, &all);

    let is_eligible = |node: NodeId| {
        doc.category(node)
            .is_some_and(|category| !ignore.contains(category))
            && has_text.get(&node).copied().unwrap_or(false)
    };

    // Children come after their parent in pre-order, so walking backwards
    // decides every child before its parent.
    let mut decisions: HashMap<NodeId, Decision> = HashMap::new();
    let mut element_counts: HashMap<NodeId, usize> = HashMap::new();
    for &node in all.iter().rev() {
        if !doc.is_element(node) {
            continue;
        }
        let children: Vec<NodeId> = doc.element_children(node).collect();
        element_counts.insert(node, children.len());
        let decision = match children.as_slice() {
            [only] if is_eligible(*only) => decisions
                .get(only)
                .copied()
                .unwrap_or(Decision::Candidate),
            // A lone child only lands here when it is ineligible, so absorbed
            // children never count.
            _ => {
                let readable = children
                    .iter()
                    .filter(|&&child| is_eligible(child))
                    .count();
                if readable == 1 {
                    Decision::Defer
                } else {
                    Decision::Candidate
                }
            }
        };
        decisions.insert(node, decision);
    }

    let is_absorbed = |node: NodeId| match doc.parent(node) {
        Some(parent) if parent != root => element_counts.get(&parent) == Some(&1),
        _ => false,
    };

    let mut accepted: Vec<NodeId> = Vec::new();
    let mut accepted_set: HashSet<NodeId> = HashSet::new();
    for &node in nodes {
        if node == root || !doc.is_element(node) {
            continue;
        }
        if !is_eligible(node) || is_absorbed(node) {
            continue;
        }
        if decisions.get(&node) != Some(&Decision::Candidate) {
            continue;
        }
        if doc.ancestors(node).any(|id| accepted_set.contains(&id)) {
            tracing::trace!(target: TARGET, ?node, "candidate inside accepted block");
            continue;
        }
        accepted.push(node);
        accepted_set.insert(node);
    }

    // Closure pass: drop strict ancestors of other accepted nodes.
    let mut ancestors_of_members: HashSet<NodeId> = HashSet::new();
    for &node in &accepted {
        ancestors_of_members.extend(
            doc.ancestors(node)
                .skip(1)
                .filter(|id| accepted_set.contains(id)),
        );
    }
    if !ancestors_of_members.is_empty() {
        tracing::debug!(
            target: TARGET,
            removed = ancestors_of_members.len(),
            "dropping accepted ancestors"
        );
        accepted.retain(|node| !ancestors_of_members.contains(node));
    }

    let set = ReadableSet::from_nodes(accepted);
    tracing::debug!(target: TARGET, id = %set.id(), members = set.len(), "selected readable set");
    set
}

/// Whether each node has non-whitespace text somewhere beneath it.
fn text_flags(doc: &DocumentTree, preorder: &[NodeId]) -> HashMap<NodeId, bool> {
    let mut flags: HashMap<NodeId, bool> = HashMap::with_capacity(preorder.len());
    for &node in preorder.iter().rev() {
        let flag = match doc.kind(node) {
            Some(NodeKind::Text(text)) => !text.trim().is_empty(),
            Some(NodeKind::Element(_)) => doc
                .children(node)
                .iter()
                .any(|child| flags.get(child).copied().unwrap_or(false)),
            None => false,
        };
        flags.insert(node, flag);
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(doc: &DocumentTree, set: &ReadableSet) -> Vec<String> {
        set.iter()
            .filter_map(|node| doc.category(node).map(|c| c.to_string()))
            .collect()
    }

    fn select_markup(markup: &str) -> (DocumentTree, ReadableSet) {
        let doc = DocumentTree::from_markup(markup).unwrap();
        let set = select_document(&doc, &IgnoreSet::default());
        (doc, set)
    }

    #[test]
    fn test_sole_child_promotes_to_parent() {
        let (doc, set) = select_markup("<div><blockquote>quoted text</blockquote></div>");
        assert_eq!(categories(&doc, &set), vec!["DIV"]);
    }

    #[test]
    fn test_multi_block_container() {
        let (doc, set) = select_markup("<div><p>one</p><p>two</p></div>");
        assert_eq!(categories(&doc, &set), vec!["DIV"]);
    }

    #[test]
    fn test_single_readable_child_defers() {
        let (doc, set) = select_markup(
            r#"<div id="root"></div><article><h1>Title</h1><p>Hello world</p></article>"#,
        );
        assert_eq!(categories(&doc, &set), vec!["P"]);
    }

    #[test]
    fn test_ignored_sole_child_leaves_parent_eligible() {
        let (doc, set) = select_markup("<section><h2>Heading only</h2></section>");
        assert_eq!(categories(&doc, &set), vec!["SECTION"]);
    }

    #[test]
    fn test_whitespace_only_is_excluded() {
        let (doc, set) = select_markup("<div>   </div><p> \n </p><p>real</p>");
        assert_eq!(categories(&doc, &set), vec!["P"]);
        assert_eq!(doc.trimmed_text(set.nodes()[0]), "real");
    }

    #[test]
    fn test_ignored_categories_never_selected() {
        let (_, set) = select_markup("<h1>Title</h1><button>Click</button><pre>code</pre>");
        assert!(set.is_empty());
    }

    #[test]
    fn test_promotion_chains_through_wrappers() {
        let (doc, set) =
            select_markup("<main><section><div><p>a</p><p>b</p></div></section></main>");
        assert_eq!(categories(&doc, &set), vec!["MAIN"]);
    }

    #[test]
    fn test_defer_through_absorbed_child() {
        let (doc, set) = select_markup(
            "<div><section><article><p>a</p><p>b</p></article><aside></aside></section></div>",
        );
        assert_eq!(categories(&doc, &set), vec!["ARTICLE"]);
    }

    #[test]
    fn test_header_wrapping_heading_and_paragraph() {
        let (doc, set) = select_markup(
            r#"<div id="content"><header><h1>A title</h1><p>A paragraph</p></header></div>"#,
        );
        assert_eq!(categories(&doc, &set), vec!["P"]);
    }

    #[test]
    fn test_no_member_contains_another() {
        let (doc, set) = select_markup(
            "<article><p>one</p><div><p>two</p><p>three</p></div><ul><li>x</li><li>y</li></ul></article>\
             <footer><small>fine print</small></footer>",
        );
        for a in set.iter() {
            for b in set.iter() {
                if a != b {
                    assert!(!doc.is_inclusive_ancestor(a, b));
                }
            }
        }
        assert!(!set.is_empty());
    }

    #[test]
    fn test_closure_pass_handles_out_of_order_input() {
        let doc = DocumentTree::from_markup("<article><p>one</p><p>two</p></article>").unwrap();
        let mut nodes = doc.elements();
        nodes.reverse();

        // Leaves arrive first, so the container is accepted too and must be
        // removed again.
        let set = select(&doc, &nodes, &IgnoreSet::empty());
        assert_eq!(categories(&doc, &set), vec!["P", "P"]);
    }

    #[test]
    fn test_removed_nodes_are_skipped() {
        let mut doc = DocumentTree::from_markup("<p>one</p><p>two</p>").unwrap();
        let nodes = doc.elements();
        doc.remove(nodes[0]).unwrap();

        let set = select(&doc, &nodes, &IgnoreSet::default());
        assert_eq!(set.nodes(), &[nodes[1]]);
    }

    #[test]
    fn test_selection_is_deterministic_with_fresh_identity() {
        let doc = DocumentTree::from_markup("<div><p>a</p><p>b</p></div><p>c</p>").unwrap();
        let first = select_document(&doc, &IgnoreSet::default());
        let second = select_document(&doc, &IgnoreSet::default());

        assert_eq!(first.nodes(), second.nodes());
        assert_ne!(first.id(), second.id());
        assert_ne!(first, second);
    }

    #[test]
    fn test_wide_list_selects_container() {
        let mut doc = DocumentTree::new();
        let list = doc.append_element(doc.root(), "ul").unwrap();
        for i in 0..10_000 {
            let item = doc.append_element(list, "li").unwrap();
            doc.append_text(item, format!("item {i}")).unwrap();
        }

        let set = select_document(&doc, &IgnoreSet::default());
        assert_eq!(categories(&doc, &set), vec!["UL"]);
    }

    #[test]
    fn test_ignore_set_is_case_insensitive() {
        let ignore: IgnoreSet = ["p", "Div"].into_iter().collect();
        assert!(ignore.contains(&Category::new("P")));
        assert!(ignore.contains(&Category::new("div")));
        assert!(!ignore.contains(&Category::new("SPAN")));
        assert_eq!(IgnoreSet::default().len(), DEFAULT_IGNORE.len());
    }
}
