////////////////////////////////////////////////////////////////////////////////////
// Copyright (c) 2020 DasEtwas - All Rights Reserved                               /
//      Unauthorized copying of this file, via any medium is strictly prohibited   /
//      Proprietary and confidential                                               /
////////////////////////////////////////////////////////////////////////////////////

//! Decoding of the predefined entity references.
//!
//! The parser keeps `&lt;` and friends in the tree verbatim; they are only turned into
//! characters here, when text is copied into generated output.

use memchr::memchr;
use std::borrow::Cow;

const ENTITIES: [(&str, char); 5] = [("&quot;", '"'), ("&apos;", '\''), ("&lt;", '<'), ("&gt;", '>'), ("&amp;", '&')];

/// Decodes `raw`, borrowing it when there is nothing to decode.
pub fn decode(raw: &str) -> Cow<'_, str> {
    if memchr(b'&', raw.as_bytes()).is_none() {
        return Cow::Borrowed(raw);
    }
    let mut decoded = String::with_capacity(raw.len());
    decode_into(raw, &mut decoded);
    Cow::Owned(decoded)
}

/// Appends `raw` to `dest` with entity references replaced.
///
/// An `&` that does not start one of the five known references is copied as is.
pub fn decode_into(raw: &str, dest: &mut String) {
    let mut rest = raw;
    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        dest.push_str(&rest[..amp]);
        rest = &rest[amp..];

        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, ch)) => {
                dest.push(*ch);
                rest = &rest[entity.len()..];
            },
            None => {
                dest.push('&');
                rest = &rest[1..];
            },
        }
    }
    dest.push_str(rest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_borrowed() {
        let decoded = decode("GLuint *buffers");
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(decoded, "GLuint *buffers");
    }

    #[test]
    fn decodes_all_five_references() {
        assert_eq!(decode("&lt;a&gt; &amp; &quot;b&quot; &apos;c&apos;"), "<a> & \"b\" 'c'");
    }

    #[test]
    fn does_not_over_consume() {
        // `&amp;lt;` is an escaped ampersand followed by the letters `lt;`.
        assert_eq!(decode("&amp;lt;"), "&lt;");
        assert_eq!(decode("x&lt;y"), "x<y");
        assert_eq!(decode("&ltx"), "&ltx");
    }

    #[test]
    fn unknown_references_pass_through() {
        assert_eq!(decode("&nbsp;&#65;&"), "&nbsp;&#65;&");
    }

    #[test]
    fn appends_to_existing_buffer() {
        let mut out = String::from("const ");
        decode_into("GLchar *&amp;", &mut out);
        assert_eq!(out, "const GLchar *&");
    }
}
