////////////////////////////////////////////////////////////////////////////////////
// Copyright (c) 2020 DasEtwas - All Rights Reserved                               /
//      Unauthorized copying of this file, via any medium is strictly prohibited   /
//      Proprietary and confidential                                               /
////////////////////////////////////////////////////////////////////////////////////

//! A minimal XML tree for the Khronos registry.
//!
//! Only the subset of XML that actually appears in `gl.xml` is understood: a fixed prologue,
//! elements with quoted attributes, text, comments and the five predefined entity references.
//! Every name, value and text run borrows from the source buffer; nothing is copied until the
//! generators decode it into their output.

use std::{fmt, hash, ops::Deref};

pub mod entities;
mod parse;

pub use self::parse::{parse, ParseError, ParseErrorKind, PROLOGUE};

/// A slice of the source document together with its byte offset.
///
/// Equality and hashing only look at the text, so two spans taken from different places compare
/// equal when they spell the same thing.
#[derive(Clone, Copy)]
pub struct StrSpan<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> StrSpan<'a> {
    pub fn new(text: &'a str, offset: usize) -> StrSpan<'a> {
        StrSpan { text, offset }
    }

    /// Byte offset of the first character inside the source document.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The raw text, entity references untouched.
    #[inline]
    pub fn as_str(&self) -> &'a str {
        self.text
    }
}

impl<'a> Deref for StrSpan<'a> {
    type Target = str;

    fn deref(&self) -> &str {
        self.text
    }
}

impl PartialEq for StrSpan<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for StrSpan<'_> {}

impl PartialEq<str> for StrSpan<'_> {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for StrSpan<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl hash::Hash for StrSpan<'_> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.text.hash(state)
    }
}

impl fmt::Debug for StrSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.text, self.offset)
    }
}

impl fmt::Display for StrSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute<'a> {
    pub name: StrSpan<'a>,
    pub value: StrSpan<'a>,
}

/// A node of the document tree. Children keep document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    Text(StrSpan<'a>),
    Element(Element<'a>),
}

impl<'a> Node<'a> {
    pub fn as_element(&self) -> Option<&Element<'a>> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<StrSpan<'a>> {
        match self {
            Node::Text(text) => Some(*text),
            Node::Element(_) => None,
        }
    }

    /// Appends the decoded text of this node and all of its descendants.
    pub fn write_inner_text(&self, dest: &mut String) {
        match self {
            Node::Text(text) => entities::decode_into(text, dest),
            Node::Element(element) => element.write_inner_text(dest),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element<'a> {
    pub name: StrSpan<'a>,
    pub attributes: Vec<Attribute<'a>>,
    pub children: Vec<Node<'a>>,
}

impl<'a> Element<'a> {
    /// Value of the first attribute called `name`, if any.
    pub fn attribute(&self, name: &str) -> Option<StrSpan<'a>> {
        self.attributes.iter().find(|attr| attr.name == name).map(|attr| attr.value)
    }

    pub fn child_elements<'s>(&'s self) -> impl Iterator<Item = &'s Element<'a>> + 's {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn children_named<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s Element<'a>> + 's {
        self.child_elements().filter(move |child| child.name == name)
    }

    pub fn first_child(&self, name: &str) -> Option<&Element<'a>> {
        self.child_elements().find(|child| child.name == name)
    }

    pub fn write_inner_text(&self, dest: &mut String) {
        for child in &self.children {
            child.write_inner_text(dest);
        }
    }

    /// Decoded text content of the element, markup stripped.
    pub fn inner_text(&self) -> String {
        let mut text = String::new();
        self.write_inner_text(&mut text);
        text
    }
}
