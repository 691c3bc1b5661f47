//! Debug views of a document tree.
//!
//! [`DocumentTreeDebug`] renders the element hierarchy as text, marking the
//! members of a readable set with `*`. Handy when a page selects something
//! unexpected:
//!
//! ```
//! use lectern::{DocumentTree, IgnoreSet, select_document};
//! use lectern::debug::{DocumentTreeDebug, TreeFormatOptions, TreeStyle};
//!
//! let doc = DocumentTree::from_markup("<article><h1>Title</h1><p>Body</p></article>")?;
//! let set = select_document(&doc, &IgnoreSet::default());
//!
//! let debug = DocumentTreeDebug::with_options(TreeFormatOptions {
//!     style: TreeStyle::Ascii,
//!     ..TreeFormatOptions::minimal()
//! });
//! print!("{}", debug.format_tree(&doc, Some(&set)));
//! // BODY
//! // `-- ARTICLE
//! //    +-- H1
//! //    `-- P *
//! # Ok::<(), lectern::DocumentError>(())
//! ```

use std::fmt;

use lectern_core::NodeId;

use crate::document::DocumentTree;
use crate::selector::ReadableSet;

/// Characters used to draw branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Dashes only.
    Compact,
}

/// Configuration for tree output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Show node keys.
    pub show_ids: bool,
    /// Show a preview of each element's trimmed text.
    pub show_text: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_text: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Categories and markers only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_text: false,
            ..Default::default()
        }
    }
}

const TEXT_PREVIEW: usize = 32;

/// Renders document trees as text.
#[derive(Debug, Clone, Default)]
pub struct DocumentTreeDebug {
    options: TreeFormatOptions,
}

impl DocumentTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole document.
    pub fn format_tree(&self, doc: &DocumentTree, readable: Option<&ReadableSet>) -> String {
        self.format_subtree(doc, doc.root(), readable)
    }

    /// Format the subtree rooted at `root`.
    pub fn format_subtree(
        &self,
        doc: &DocumentTree,
        root: NodeId,
        readable: Option<&ReadableSet>,
    ) -> String {
        TreeDisplay {
            debug: self,
            doc,
            root,
            readable,
        }
        .to_string()
    }

    fn write_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        doc: &DocumentTree,
        node: NodeId,
        readable: Option<&ReadableSet>,
        trail: &mut Vec<bool>,
    ) -> fmt::Result {
        if self.options.max_depth.is_some_and(|max| trail.len() > max) {
            return Ok(());
        }
        let Some(category) = doc.category(node) else {
            return Ok(());
        };

        f.write_str(&self.build_prefix(trail))?;
        write!(f, "{category}")?;
        if let Some(id) = doc.attribute(node, "id") {
            write!(f, "#{id}")?;
        }
        if self.options.show_ids {
            write!(f, " [{node:?}]")?;
        }
        if self.options.show_text {
            let text = doc.trimmed_text(node);
            if !text.is_empty() {
                let preview: String = text.chars().take(TEXT_PREVIEW).collect();
                let ellipsis = if text.chars().count() > TEXT_PREVIEW { "..." } else { "" };
                write!(f, " {preview:?}{ellipsis}")?;
            }
        }
        if readable.is_some_and(|set| set.contains(node)) {
            f.write_str(" *")?;
        }
        f.write_str("\n")?;

        let children: Vec<NodeId> = doc.element_children(node).collect();
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            trail.push(i + 1 == count);
            let written = self.write_node(f, doc, child, readable, trail);
            trail.pop();
            written?;
        }
        Ok(())
    }

    /// `trail` holds, for each level below the root, whether the node on
    /// the path at that level is the last of its siblings.
    fn build_prefix(&self, trail: &[bool]) -> String {
        let Some((&is_last, ancestors)) = trail.split_last() else {
            return String::new();
        };

        let (branch, tee, elbow) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for &ancestor_last in ancestors {
            if ancestor_last {
                prefix.extend(std::iter::repeat_n(' ', branch.chars().count()));
            } else {
                prefix.push_str(branch);
            }
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix.push_str(if is_last { elbow } else { tee });
        prefix.push(' ');
        prefix
    }
}

struct TreeDisplay<'a> {
    debug: &'a DocumentTreeDebug,
    doc: &'a DocumentTree,
    root: NodeId,
    readable: Option<&'a ReadableSet>,
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.debug
            .write_node(f, self.doc, self.root, self.readable, &mut Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{IgnoreSet, select_document};

    fn sample() -> (DocumentTree, ReadableSet) {
        let doc = DocumentTree::from_markup(
            r#"<article id="post"><h1>Title</h1><p>Body text</p></article><footer></footer>"#,
        )
        .unwrap();
        let set = select_document(&doc, &IgnoreSet::default());
        (doc, set)
    }

    #[test]
    fn test_ascii_tree_marks_members() {
        let (doc, set) = sample();
        let debug = DocumentTreeDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        });

        let output = debug.format_tree(&doc, Some(&set));
        assert_eq!(
            output,
            "BODY\n+-- ARTICLE#post\n|  +-- H1\n|  `-- P *\n`-- FOOTER\n"
        );
    }

    #[test]
    fn test_last_child_levels_have_no_branch() {
        let doc = DocumentTree::from_markup(
            "<main><section><p>one</p><p>two</p></section></main><aside><p>three</p></aside>",
        )
        .unwrap();
        let debug = DocumentTreeDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        });

        assert_eq!(
            debug.format_tree(&doc, None),
            "BODY\n+-- MAIN\n|  `-- SECTION\n|     +-- P\n|     `-- P\n`-- ASIDE\n   `-- P\n"
        );
    }

    #[test]
    fn test_text_preview_and_ids() {
        let (doc, _) = sample();
        let p = doc.elements()[2];
        let output = DocumentTreeDebug::new().format_subtree(&doc, p, None);

        assert!(output.starts_with("P ["));
        assert!(output.contains("\"Body text\""));
        assert!(!output.contains('*'));
    }

    #[test]
    fn test_max_depth() {
        let (doc, _) = sample();
        let debug = DocumentTreeDebug::with_options(TreeFormatOptions {
            max_depth: Some(1),
            ..TreeFormatOptions::minimal()
        });

        let output = debug.format_tree(&doc, None);
        assert_eq!(output.lines().count(), 3);
    }
}
