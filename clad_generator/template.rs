////////////////////////////////////////////////////////////////////////////////////
// Copyright (c) 2020 DasEtwas - All Rights Reserved                               /
//      Unauthorized copying of this file, via any medium is strictly prohibited   /
//      Proprietary and confidential                                               /
////////////////////////////////////////////////////////////////////////////////////

//! Fills `%NAME%` placeholders in a skeleton file.
//!
//! A placeholder is a `%`, an identifier made of uppercase ASCII letters, digits and `_` (not
//! starting with a digit), and a closing `%`. Every other `%` is copied as is, so `printf`
//! formats and percentages in a skeleton need no escaping.

use std::{borrow::Cow, collections::HashMap};

use memchr::memchr;

use crate::error::{Error, Result};

/// What to do with a placeholder that has no value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaceholderPolicy {
    /// Fail the build.
    Abort,
    /// Log a warning and substitute nothing.
    Warn,
}

impl Default for PlaceholderPolicy {
    fn default() -> PlaceholderPolicy {
        PlaceholderPolicy::Abort
    }
}

#[derive(Debug, Default)]
pub struct Template<'v> {
    values: HashMap<String, Cow<'v, str>>,
    policy: PlaceholderPolicy,
}

impl<'v> Template<'v> {
    pub fn new(policy: PlaceholderPolicy) -> Template<'v> {
        Template { values: HashMap::new(), policy }
    }

    /// Registers `value` for `%name%`, replacing an earlier definition.
    pub fn define<V>(&mut self, name: &str, value: V) -> &mut Self
    where V: Into<Cow<'v, str>> {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// Copies `skeleton`, substituting every placeholder.
    pub fn build(&self, skeleton: &str) -> Result<String> {
        let bytes = skeleton.as_bytes();
        let mut built = String::with_capacity(skeleton.len() + self.values.values().map(|v| v.len()).sum::<usize>());
        let mut cursor = 0;

        while let Some(found) = memchr(b'%', &bytes[cursor..]) {
            let start = cursor + found;
            built.push_str(&skeleton[cursor..start]);

            let name = match placeholder_at(skeleton, start) {
                Some(name) => name,
                None => {
                    built.push('%');
                    cursor = start + 1;
                    continue;
                },
            };
            cursor = start + name.len() + 2;

            match self.values.get(name) {
                Some(value) => built.push_str(value),
                None => match self.policy {
                    PlaceholderPolicy::Abort => {
                        return Err(Error::UndefinedPlaceholder { name: name.to_string(), offset: start });
                    },
                    PlaceholderPolicy::Warn => {
                        warn!("template references undefined placeholder `%{}%` at byte {}", name, start)
                    },
                },
            }
        }

        built.push_str(&skeleton[cursor..]);
        Ok(built)
    }
}

/// The placeholder name if `%IDENT%` starts at `start`.
fn placeholder_at(skeleton: &str, start: usize) -> Option<&str> {
    let rest = &skeleton[start + 1..];
    let len = rest.bytes().take_while(|&b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_').count();
    let name = &rest[..len];

    let starts_well = name.bytes().next().map_or(false, |b| !b.is_ascii_digit());
    if starts_well && rest[len..].starts_with('%') {
        Some(name)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_defined_placeholders() {
        let mut template = Template::new(PlaceholderPolicy::Abort);
        template.define("TYPES", "typedef int GLint;\n").define("ENUMS", String::from("#define GL_ONE 1\n"));

        let built = template.build("/* types */\n%TYPES%/* enums */\n%ENUMS%").unwrap();
        assert_eq!(built, "/* types */\ntypedef int GLint;\n/* enums */\n#define GL_ONE 1\n");
    }

    #[test]
    fn value_is_not_rescanned() {
        let mut template = Template::new(PlaceholderPolicy::Abort);
        template.define("A", "%B%");
        assert_eq!(template.build("[%A%]").unwrap(), "[%B%]");
    }

    #[test]
    fn non_placeholder_percent_signs_are_literal() {
        let mut template = Template::new(PlaceholderPolicy::Abort);
        template.define("X", "1");
        let skeleton = r#"printf("%d%s", a, b); /* 100% */ %% %1A% %X%"#;
        assert_eq!(template.build(skeleton).unwrap(), r#"printf("%d%s", a, b); /* 100% */ %% %1A% 1"#);
    }

    #[test]
    fn undefined_placeholder_aborts_by_default() {
        let template = Template::default();
        match template.build("abc %MISSING% def") {
            Err(Error::UndefinedPlaceholder { name, offset }) => {
                assert_eq!(name, "MISSING");
                assert_eq!(offset, 4);
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn undefined_placeholder_leaves_gap_when_warning() {
        let mut template = Template::new(PlaceholderPolicy::Warn);
        template.define("KNOWN", "k");
        assert_eq!(template.build("<%UNKNOWN%|%KNOWN%>").unwrap(), "<|k>");
    }

    #[test]
    fn redefinition_replaces_value() {
        let mut template = Template::new(PlaceholderPolicy::Abort);
        template.define("A", "old").define("A", "new");
        assert_eq!(template.build("%A%").unwrap(), "new");
    }

    #[test]
    fn utf8_around_placeholders_survives() {
        let mut template = Template::new(PlaceholderPolicy::Abort);
        template.define("N", "ü");
        assert_eq!(template.build("ä%N%ö%").unwrap(), "äüö%");
    }
}
