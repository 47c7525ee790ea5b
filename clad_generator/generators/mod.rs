////////////////////////////////////////////////////////////////////////////////////
// Copyright (c) 2019 DasEtwas - All Rights Reserved                               /
//      Unauthorized copying of this file, via any medium is strictly prohibited   /
//      Proprietary and confidential                                               /
////////////////////////////////////////////////////////////////////////////////////

use std::{fmt, io};

use crate::{
    error::{Error, Result},
    registry::Registry,
    xml::{entities, Element, Node, StrSpan},
};

pub mod c_loader_gen;
mod context;

pub use self::context::{synthesize, GenerationContext};

/// Trait for a loader generator.
pub trait Generator {
    /// Builds the loader, writing the header to `header` and the implementation to `source`.
    ///
    /// Nothing is written unless both artifacts could be built.
    fn write<H, S>(&self, registry: &Registry, header: &mut H, source: &mut S) -> Result<()>
    where
        H: io::Write,
        S: io::Write;
}

/// How the public identifier of a command is spelled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Naming {
    /// As in the registry, e.g. `glClearColor`.
    Registry,
    /// Run through [`snake_case`], e.g. `gl_clear_color`.
    SnakeCase,
}

/// How the header exposes the generated wrappers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeclarationStyle {
    /// The wrapper carries the public name and is declared with a prototype.
    Prototype,
    /// The wrapper is named `{prefix}{registry name}`; a function-like macro maps the public
    /// name onto it.
    Macro,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub naming: Naming,
    pub declarations: DeclarationStyle,
    /// Prepended to wrapper names under [`DeclarationStyle::Macro`]; ignored otherwise.
    pub wrapper_prefix: String,
}

impl GeneratorOptions {
    pub const DEFAULT_MACRO_PREFIX: &'static str = "clad_";

    /// Macro redirection onto `clad_`-prefixed wrappers.
    pub fn macros() -> GeneratorOptions {
        GeneratorOptions {
            naming: Naming::Registry,
            declarations: DeclarationStyle::Macro,
            wrapper_prefix: GeneratorOptions::DEFAULT_MACRO_PREFIX.to_string(),
        }
    }

    /// The name the user calls, e.g. `glClear` or `gl_clear`.
    pub fn public_ident(&self, name: &str) -> String {
        match self.naming {
            Naming::Registry => name.to_string(),
            Naming::SnakeCase => snake_case(name),
        }
    }

    /// The name of the generated wrapper function. Only macro declarations apply the prefix.
    pub fn wrapper_ident(&self, name: &str) -> String {
        match self.declarations {
            DeclarationStyle::Prototype => self.public_ident(name),
            DeclarationStyle::Macro => format!("{}{}", self.wrapper_prefix, name),
        }
    }
}

impl Default for GeneratorOptions {
    fn default() -> GeneratorOptions {
        GeneratorOptions { naming: Naming::Registry, declarations: DeclarationStyle::Prototype, wrapper_prefix: String::new() }
    }
}

/// Inserts `_` before every uppercase letter that follows a lowercase one and lowercases it.
///
/// `glClearColor` becomes `gl_clear_color`; `glTexImage2D` becomes `gl_tex_image2D`.
pub fn snake_case(name: &str) -> String {
    let mut snake = String::with_capacity(name.len() + 8);
    let mut previous = None;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() && previous.map_or(false, |p: char| p.is_ascii_lowercase()) {
            snake.push('_');
            snake.push(ch.to_ascii_lowercase());
        } else {
            snake.push(ch);
        }
        previous = Some(ch);
    }
    snake
}

/// Generates a `#define NAME VALUE` line. The value is copied as a token, with the registry's
/// `type` suffix (`u`, `ull`) appended when there is one.
pub fn gen_enum_item<W>(name: &str, value: &str, suffix: Option<&str>, dest: &mut W) -> fmt::Result
where W: fmt::Write {
    writeln!(dest, "#define {} {}{}", name, entities::decode(value), suffix.unwrap_or(""))
}

/// A `<param>` of a command, decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    /// Everything before `<name>`, trailing whitespace removed, e.g. `const GLchar *`.
    pub ty: String,
    pub ident: String,
    /// The whole declaration as written, e.g. `const GLchar *name`.
    pub declaration: String,
}

/// A `<command>` with its prototype pieces pulled out and decoded.
#[derive(Clone, Debug)]
pub struct Command<'a> {
    pub name: StrSpan<'a>,
    /// Everything in `<proto>` before `<name>`, e.g. `void ` or `const GLubyte *`.
    pub return_type: String,
    pub params: Vec<Param>,
}

impl<'a> Command<'a> {
    pub fn from_element(command: &Element<'a>) -> Result<Command<'a>> {
        let malformed = |reason| Error::MalformedCommand { offset: command.name.offset(), reason };

        let proto = command.first_child("proto").ok_or_else(|| malformed("missing <proto>"))?;
        let name = command_name(command).ok_or_else(|| malformed("<proto> has no plain-text <name>"))?;
        let return_type = text_before_name(proto);

        let params = command
            .children_named("param")
            .map(|param| -> Result<Param> {
                let ident = param.first_child("name").ok_or_else(|| malformed("<param> has no <name>"))?;
                Ok(Param {
                    ty: text_before_name(param).trim_end().to_string(),
                    ident: ident.inner_text(),
                    declaration: param.inner_text(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Command { name, return_type, params })
    }

    pub fn returns_void(&self) -> bool {
        self.return_type.trim() == "void"
    }

    /// `{return type}{ident}({params})`; an empty parameter list is spelled `void`.
    pub fn gen_prototype(&self, ident: &str) -> String {
        let mut proto = self.return_type.clone();
        if proto.ends_with(|ch: char| ch.is_ascii_alphanumeric() || ch == '_') {
            proto.push(' ');
        }
        proto.push_str(ident);
        proto.push('(');
        if self.params.is_empty() {
            proto.push_str("void");
        } else {
            proto.push_str(&self.params.iter().map(|p| p.declaration.as_str()).collect::<Vec<_>>().join(", "));
        }
        proto.push(')');
        proto
    }

    /// The function pointer type of the command, parameter names dropped, e.g.
    /// `void (*)(GLenum, GLuint)`.
    pub fn gen_fn_ptr_type(&self) -> String {
        let ret = self.return_type.trim_end();
        let types = if self.params.is_empty() {
            "void".to_string()
        } else {
            self.params.iter().map(|p| p.ty.as_str()).collect::<Vec<_>>().join(", ")
        };
        let separator = if ret.ends_with('*') { "" } else { " " };
        format!("{}{}(*)({})", ret, separator, types)
    }

    /// Comma separated parameter names, as passed on by a wrapper.
    pub fn gen_parameter_names(&self) -> String {
        self.params.iter().map(|p| p.ident.as_str()).collect::<Vec<_>>().join(", ")
    }
}

/// The registry name of a command, without decoding the rest of it.
pub fn command_name<'a>(command: &Element<'a>) -> Option<StrSpan<'a>> {
    let name = command.first_child("proto")?.first_child("name")?;
    match name.children.as_slice() {
        [Node::Text(text)] => Some(*text),
        _ => None,
    }
}

/// Decoded text of the children in front of the `<name>` child.
fn text_before_name(element: &Element) -> String {
    let mut text = String::new();
    for child in &element.children {
        if let Node::Element(child) = child {
            if child.name == "name" {
                break;
            }
        }
        child.write_inner_text(&mut text);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{parse, PROLOGUE};

    fn with_command(xml: &str, check: impl FnOnce(Command)) {
        let src = format!("{}{}", PROLOGUE, xml);
        let root = parse(&src).unwrap();
        let command = Command::from_element(root.as_element().unwrap()).unwrap();
        check(command);
    }

    #[test]
    fn snake_case_transform() {
        assert_eq!(snake_case("glClearColor"), "gl_clear_color");
        assert_eq!(snake_case("glGetIntegeri_v"), "gl_get_integeri_v");
        assert_eq!(snake_case("glTexImage2D"), "gl_tex_image2D");
        assert_eq!(snake_case("GL"), "GL");
        assert_eq!(snake_case(""), "");
    }

    #[test]
    fn identifiers_follow_options() {
        let default = GeneratorOptions::default();
        assert_eq!(default.wrapper_ident("glClear"), "glClear");

        let snake = GeneratorOptions { naming: Naming::SnakeCase, ..GeneratorOptions::default() };
        assert_eq!(snake.public_ident("glClearColor"), "gl_clear_color");
        assert_eq!(snake.wrapper_ident("glClearColor"), "gl_clear_color");

        let prefixed = GeneratorOptions { wrapper_prefix: "my_".to_string(), ..GeneratorOptions::default() };
        assert_eq!(prefixed.wrapper_ident("glClear"), "glClear");

        let macros = GeneratorOptions { naming: Naming::SnakeCase, ..GeneratorOptions::macros() };
        assert_eq!(macros.public_ident("glClearColor"), "gl_clear_color");
        assert_eq!(macros.wrapper_ident("glClearColor"), "clad_glClearColor");
    }

    #[test]
    fn enum_item_keeps_value_token() {
        let mut out = String::new();
        gen_enum_item("GL_COLOR_BUFFER_BIT", "0x00004000", None, &mut out).unwrap();
        gen_enum_item("GL_TIMEOUT_IGNORED", "0xFFFFFFFFFFFFFFFF", Some("ull"), &mut out).unwrap();
        assert_eq!(out, "#define GL_COLOR_BUFFER_BIT 0x00004000\n#define GL_TIMEOUT_IGNORED 0xFFFFFFFFFFFFFFFFull\n");
    }

    #[test]
    fn void_command_with_params() {
        with_command(
            r#"<command><proto>void <name>glBindBuffer</name></proto><param group="BufferTargetARB"><ptype>GLenum</ptype> <name>target</name></param><param><ptype>GLuint</ptype> <name>buffer</name></param></command>"#,
            |cmd| {
                assert_eq!(cmd.name, "glBindBuffer");
                assert!(cmd.returns_void());
                assert_eq!(cmd.gen_prototype("glBindBuffer"), "void glBindBuffer(GLenum target, GLuint buffer)");
                assert_eq!(cmd.gen_fn_ptr_type(), "void (*)(GLenum, GLuint)");
                assert_eq!(cmd.gen_parameter_names(), "target, buffer");
            },
        );
    }

    #[test]
    fn zero_params_render_void() {
        with_command(r#"<command><proto><ptype>GLenum</ptype> <name>glGetError</name></proto></command>"#, |cmd| {
            assert!(!cmd.returns_void());
            assert_eq!(cmd.gen_prototype("glGetError"), "GLenum glGetError(void)");
            assert_eq!(cmd.gen_fn_ptr_type(), "GLenum (*)(void)");
            assert_eq!(cmd.gen_parameter_names(), "");
        });
    }

    #[test]
    fn pointer_return_and_entities() {
        with_command(
            r#"<command><proto>const <ptype>GLubyte</ptype> *<name>glGetStringi</name></proto><param><ptype>GLenum</ptype> <name>name</name></param><param>const <ptype>GLchar</ptype> *const&amp;<name>strings</name></param><param>&lt;<ptype>GLint</ptype>&gt; <name>v</name></param></command>"#,
            |cmd| {
                assert_eq!(
                    cmd.gen_prototype("glGetStringi"),
                    "const GLubyte *glGetStringi(GLenum name, const GLchar *const&strings, <GLint> v)"
                );
                assert_eq!(cmd.gen_fn_ptr_type(), "const GLubyte *(*)(GLenum, const GLchar *const&, <GLint>)");
                assert_eq!(cmd.params[1].ty, "const GLchar *const&");
                assert_eq!(cmd.gen_parameter_names(), "name, strings, v");
            },
        );
    }

    #[test]
    fn return_type_without_trailing_space_gets_one() {
        with_command(r#"<command><proto><ptype>GLuint</ptype><name>glCreateProgram</name></proto></command>"#, |cmd| {
            assert_eq!(cmd.gen_prototype("glCreateProgram"), "GLuint glCreateProgram(void)");
        });
    }

    #[test]
    fn malformed_commands_are_errors() {
        let cases = [
            "<command><param><name>x</name></param></command>",
            "<command><proto>void </proto></command>",
            "<command><proto>void <name>glX</name></proto><param><ptype>GLint</ptype></param></command>",
        ];
        for case in cases.iter() {
            let src = format!("{}{}", PROLOGUE, case);
            let root = parse(&src).unwrap();
            match Command::from_element(root.as_element().unwrap()) {
                Err(Error::MalformedCommand { .. }) => {},
                other => panic!("expected a malformed command for {}: {:?}", case, other),
            }
        }
    }
}
