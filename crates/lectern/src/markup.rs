//! Loading a [`DocumentTree`] from XHTML markup.
//!
//! The loader reads well-formed markup with `quick-xml`. Top-level elements
//! become children of the document root; a top-level `<body>` maps onto the
//! root itself. Layout and style are left at their defaults for the host to
//! fill in.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::document::{Category, DocumentResult, DocumentTree};
use crate::error::DocumentError;
use lectern_core::NodeId;

impl DocumentTree {
    /// Build a document from XHTML markup.
    ///
    /// # Example
    ///
    /// ```
    /// use lectern::DocumentTree;
    ///
    /// let doc = DocumentTree::from_markup("<article><p>Hello <em>world</em></p></article>")?;
    /// assert_eq!(doc.elements().len(), 3);
    /// # Ok::<(), lectern::DocumentError>(())
    /// ```
    pub fn from_markup(markup: &str) -> DocumentResult<Self> {
        let mut doc = Self::new();
        let mut reader = Reader::from_str(markup);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<NodeId> = vec![doc.root()];

        loop {
            let event = reader
                .read_event()
                .map_err(|err| DocumentError::markup(reader.error_position(), err.to_string()))?;
            let position = reader.buffer_position();
            let parent = stack.last().copied().unwrap_or(doc.root());

            match event {
                Event::Start(start) => {
                    let node = open_element(&mut doc, parent, stack.len() == 1, &start, position)?;
                    stack.push(node);
                }
                Event::Empty(start) => {
                    open_element(&mut doc, parent, stack.len() == 1, &start, position)?;
                }
                Event::End(_) => {
                    if stack.len() <= 1 {
                        return Err(DocumentError::markup(position, "unmatched closing tag"));
                    }
                    stack.pop();
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|err| DocumentError::markup(position, err.to_string()))?;
                    if !text.is_empty() {
                        doc.append_text(parent, text.into_owned())?;
                    }
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    doc.append_text(parent, text)?;
                }
                Event::Eof => break,
                // Comments, declarations, processing instructions, doctype.
                _ => {}
            }
        }

        if stack.len() > 1 {
            let open = stack
                .last()
                .and_then(|&node| doc.category(node))
                .map(|category| category.to_string())
                .unwrap_or_default();
            return Err(DocumentError::markup(
                reader.buffer_position(),
                format!("unclosed element <{open}>"),
            ));
        }

        tracing::debug!(target: "lectern::document", nodes = doc.len(), "loaded markup");
        Ok(doc)
    }
}

fn open_element(
    doc: &mut DocumentTree,
    parent: NodeId,
    top_level: bool,
    start: &BytesStart<'_>,
    position: u64,
) -> DocumentResult<NodeId> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let category = Category::new(&name);

    let node = if top_level && category.as_str() == Category::ROOT {
        doc.root()
    } else {
        doc.append_element(parent, category)?
    };

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| DocumentError::markup(position, err.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|err| DocumentError::markup(position, err.to_string()))?;
        doc.set_attribute(node, key, value.into_owned())?;
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_top_level_elements() {
        let doc = DocumentTree::from_markup(
            r#"<div id="root"></div><article><h1>Title</h1><p>Hello world</p></article>"#,
        )
        .unwrap();

        let top: Vec<_> = doc.element_children(doc.root()).collect();
        assert_eq!(top.len(), 2);
        assert_eq!(doc.element_by_id("root"), Some(top[0]));
        assert_eq!(doc.category(top[1]).map(Category::as_str), Some("ARTICLE"));
        assert_eq!(doc.trimmed_text(top[1]), "TitleHello world");
    }

    #[test]
    fn test_body_maps_to_root() {
        let doc = DocumentTree::from_markup(r#"<body class="page"><p>x</p></body>"#).unwrap();
        assert_eq!(doc.attribute(doc.root(), "class"), Some("page"));
        assert_eq!(doc.elements().len(), 1);
    }

    #[test]
    fn test_entities_and_self_closing() {
        let doc = DocumentTree::from_markup("<p>Fish &amp; chips<br/></p>").unwrap();
        let p = doc.elements()[0];
        assert_eq!(doc.trimmed_text(p), "Fish & chips");
        assert_eq!(doc.element_children(p).count(), 1);
    }

    #[test]
    fn test_whitespace_text_is_kept() {
        let doc = DocumentTree::from_markup("<div> <p>a</p> </div>").unwrap();
        let div = doc.elements()[0];
        assert_eq!(doc.children(div).len(), 3);
    }

    #[test]
    fn test_unclosed_element_is_an_error() {
        let err = DocumentTree::from_markup("<div><p>text</p>").unwrap_err();
        assert!(matches!(err, DocumentError::Markup { .. }));
    }

    #[test]
    fn test_mismatched_end_is_an_error() {
        assert!(DocumentTree::from_markup("<div><p>text</div></p>").is_err());
    }
}
