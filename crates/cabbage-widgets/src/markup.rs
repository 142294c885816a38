//! Render output as a plain value tree.
//!
//! Widgets describe what they look like; a thin adapter outside this crate
//! turns the tree into DOM nodes. `to_svg` produces the equivalent markup
//! string for adapters that insert HTML directly.

use std::fmt::{self, Write};

use serde::Serialize;
use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Markup {
    Empty,
    Text { text: String },
    Element(Element),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub tag: SmolStr,
    pub attributes: Vec<(SmolStr, String)>,
    pub children: Vec<Markup>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.attributes.push((name.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn child(mut self, child: impl Into<Markup>) -> Self {
        let child = child.into();
        if child != Markup::Empty {
            self.children.push(child);
        }
        self
    }

    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Markup::Text { text: text.into() })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl From<Element> for Markup {
    fn from(element: Element) -> Self {
        Markup::Element(element)
    }
}

impl Markup {
    pub fn is_empty(&self) -> bool {
        matches!(self, Markup::Empty)
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Markup::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Depth-first search for the first element with `tag`.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        let element = self.as_element()?;
        if element.tag == tag {
            return Some(element);
        }
        element.children.iter().find_map(|child| child.find(tag))
    }

    /// Concatenated text content.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Markup::Empty => {}
            Markup::Text { text } => out.push_str(text),
            Markup::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_svg(&mut out);
        out
    }

    fn write_svg(&self, out: &mut String) -> fmt::Result {
        match self {
            Markup::Empty => Ok(()),
            Markup::Text { text } => write_escaped(out, text),
            Markup::Element(element) => {
                write!(out, "<{}", element.tag)?;
                for (name, value) in &element.attributes {
                    write!(out, " {name}=\"")?;
                    write_escaped(out, value)?;
                    out.push('"');
                }
                if element.children.is_empty() {
                    out.push_str("/>");
                    return Ok(());
                }
                out.push('>');
                for child in &element.children {
                    child.write_svg(out)?;
                }
                write!(out, "</{}>", element.tag)
            }
        }
    }
}

fn write_escaped(out: &mut String, text: &str) -> fmt::Result {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    Ok(())
}
