////////////////////////////////////////////////////////////////////////////////////
// Copyright (c) 2020 DasEtwas - All Rights Reserved                               /
//      Unauthorized copying of this file, via any medium is strictly prohibited   /
//      Proprietary and confidential                                               /
////////////////////////////////////////////////////////////////////////////////////

use memchr::{memchr, memmem};
use thiserror::Error;

use super::{Attribute, Element, Node, StrSpan};

/// The only prologue the registry files use.
pub const PROLOGUE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected the prologue `{}`", PROLOGUE)]
    BadPrologue,
    #[error("expected `{0}`")]
    ExpectedChar(char),
    #[error("expected an element name")]
    ExpectedIdent,
    #[error("unterminated attribute value")]
    UnterminatedString,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("end of input before `</{0}>`")]
    UnclosedElement(String),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected content after the root element")]
    TrailingContent,
}

/// A structural error. The whole parse is abandoned; there is no partial tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("XML error: {kind} (byte {offset})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
}

type ParseResult<T> = Result<T, ParseError>;

/// Parses a registry document into its root node.
pub fn parse(text: &str) -> Result<Node<'_>, ParseError> {
    let mut parser = Parser { src: text, pos: 0 };

    parser.eat_str("\u{feff}");
    parser.skip_whitespace();
    if !parser.eat_str(PROLOGUE) {
        return Err(parser.error(ParseErrorKind::BadPrologue));
    }
    parser.skip_misc()?;

    if parser.peek().is_none() {
        return Err(parser.error(ParseErrorKind::UnexpectedEof));
    }
    if parser.peek() != Some(b'<') {
        return Err(parser.error(ParseErrorKind::ExpectedChar('<')));
    }
    let root = parser.parse_element()?;

    parser.skip_misc()?;
    if parser.peek().is_some() {
        return Err(parser.error(ParseErrorKind::TrailingContent));
    }

    trace!("parsed {} bytes of XML", text.len());
    Ok(Node::Element(root))
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError { kind, offset: self.pos }
    }

    #[inline]
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn span(&self, start: usize, end: usize) -> StrSpan<'a> {
        StrSpan::new(&self.src[start..end], start)
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: char) -> ParseResult<()> {
        let mut buf = [0; 4];
        if self.eat_str(ch.encode_utf8(&mut buf)) {
            Ok(())
        } else {
            Err(self.error(ParseErrorKind::ExpectedChar(ch)))
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if !b.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
    }

    /// Whitespace and comments around the root element.
    fn skip_misc(&mut self) -> ParseResult<()> {
        loop {
            self.skip_whitespace();
            if self.rest().starts_with(COMMENT_START) {
                self.skip_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_comment(&mut self) -> ParseResult<()> {
        let start = self.pos;
        self.pos += COMMENT_START.len();
        match memmem::find(self.rest().as_bytes(), COMMENT_END.as_bytes()) {
            Some(end) => {
                self.pos += end + COMMENT_END.len();
                Ok(())
            },
            None => Err(ParseError { kind: ParseErrorKind::UnterminatedComment, offset: start }),
        }
    }

    fn parse_ident(&mut self) -> StrSpan<'a> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !(b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':')) {
                break;
            }
            self.pos += 1;
        }
        self.span(start, self.pos)
    }

    fn parse_quoted(&mut self) -> ParseResult<StrSpan<'a>> {
        self.expect('"')?;
        let start = self.pos;
        match memchr(b'"', self.rest().as_bytes()) {
            Some(len) => {
                self.pos += len + 1;
                Ok(self.span(start, start + len))
            },
            None => Err(ParseError { kind: ParseErrorKind::UnterminatedString, offset: start }),
        }
    }

    fn parse_attribute(&mut self) -> ParseResult<Attribute<'a>> {
        let name = self.parse_ident();
        self.expect('=')?;
        let value = self.parse_quoted()?;
        Ok(Attribute { name, value })
    }

    /// Consumes `</name>` if it is next; leaves the cursor alone otherwise.
    fn attempt_end_tag(&mut self, name: &str) -> bool {
        let rest = self.rest();
        let matches = rest.starts_with("</") && rest[2..].starts_with(name) && rest[2 + name.len()..].starts_with('>');
        if matches {
            self.pos += name.len() + 3;
        }
        matches
    }

    /// Text is taken verbatim up to the next `<`.
    fn parse_text(&mut self) -> StrSpan<'a> {
        let start = self.pos;
        let len = memchr(b'<', self.rest().as_bytes()).unwrap_or_else(|| self.rest().len());
        self.pos += len;
        self.span(start, self.pos)
    }

    fn parse_element(&mut self) -> ParseResult<Element<'a>> {
        self.expect('<')?;
        self.skip_whitespace();
        let name = self.parse_ident();
        if name.is_empty() {
            return Err(self.error(ParseErrorKind::ExpectedIdent));
        }
        self.skip_whitespace();

        let mut element = Element { name, attributes: Vec::new(), children: Vec::new() };

        while !matches!(self.peek(), Some(b'>') | Some(b'/')) {
            let attribute = self.parse_attribute()?;
            element.attributes.push(attribute);
            self.skip_whitespace();
        }

        if self.peek() == Some(b'/') {
            if !self.eat_str("/>") {
                return Err(self.error(ParseErrorKind::ExpectedChar('>')));
            }
            return Ok(element);
        }
        self.expect('>')?;

        while !self.attempt_end_tag(&name) {
            match self.peek() {
                None => return Err(self.error(ParseErrorKind::UnclosedElement(name.to_string()))),
                Some(b'<') if self.rest().starts_with(COMMENT_START) => self.skip_comment()?,
                Some(b'<') => {
                    let child = self.parse_element()?;
                    element.children.push(Node::Element(child));
                },
                Some(_) => {
                    let text = self.parse_text();
                    element.children.push(Node::Text(text));
                },
            }
        }

        Ok(element)
    }
}
