////////////////////////////////////////////////////////////////////////////////////
// Copyright (c) 2020 DasEtwas - All Rights Reserved                               /
//      Unauthorized copying of this file, via any medium is strictly prohibited   /
//      Proprietary and confidential                                               /
////////////////////////////////////////////////////////////////////////////////////

use std::{borrow::Cow, io};

use super::{synthesize, GenerationContext, GeneratorOptions};
use crate::{
    error::Result,
    registry::Registry,
    template::{PlaceholderPolicy, Template},
};

pub const DEFAULT_HEADER_TEMPLATE: &str = include_str!("templates/gl.h");
pub const DEFAULT_SOURCE_TEMPLATE: &str = include_str!("templates/gl.c");

/// Generates a C header and a C source file that load the target's commands at run time
/// through a table of function pointers.
///
/// Header skeleton placeholders: `TYPES`, `ENUMS`, `COMMAND_DECLARATIONS`.
/// Source skeleton placeholders: `HEADER_INCLUDE`, `COMMAND_LOOKUP`, `COMMAND_WRAPPERS`.
#[derive(Clone, Debug)]
pub struct CLoaderGenerator {
    pub options: GeneratorOptions,
    pub header_template: Cow<'static, str>,
    pub source_template: Cow<'static, str>,
    pub placeholders: PlaceholderPolicy,
    /// What the source `#include`s to reach the header.
    pub header_include: String,
}

impl CLoaderGenerator {
    pub fn new(options: GeneratorOptions) -> CLoaderGenerator {
        CLoaderGenerator { options, ..CLoaderGenerator::default() }
    }

    pub fn with_header_template<T>(mut self, template: T) -> CLoaderGenerator
    where T: Into<Cow<'static, str>> {
        self.header_template = template.into();
        self
    }

    pub fn with_source_template<T>(mut self, template: T) -> CLoaderGenerator
    where T: Into<Cow<'static, str>> {
        self.source_template = template.into();
        self
    }

    pub fn with_placeholder_policy(mut self, policy: PlaceholderPolicy) -> CLoaderGenerator {
        self.placeholders = policy;
        self
    }

    pub fn with_header_include<S>(mut self, include: S) -> CLoaderGenerator
    where S: Into<String> {
        self.header_include = include.into();
        self
    }

    /// Fills both skeletons from `ctx`, returning `(header, source)`.
    pub fn build(&self, ctx: &GenerationContext) -> Result<(String, String)> {
        let mut header = Template::new(self.placeholders);
        header
            .define("TYPES", ctx.types.as_str())
            .define("ENUMS", ctx.enums.as_str())
            .define("COMMAND_DECLARATIONS", ctx.command_decls.as_str());

        let mut source = Template::new(self.placeholders);
        source
            .define("HEADER_INCLUDE", self.header_include.as_str())
            .define("COMMAND_LOOKUP", ctx.command_lookup.as_str())
            .define("COMMAND_WRAPPERS", ctx.command_wrappers.as_str());

        Ok((header.build(&self.header_template)?, source.build(&self.source_template)?))
    }
}

impl Default for CLoaderGenerator {
    fn default() -> CLoaderGenerator {
        CLoaderGenerator {
            options: GeneratorOptions::default(),
            header_template: Cow::Borrowed(DEFAULT_HEADER_TEMPLATE),
            source_template: Cow::Borrowed(DEFAULT_SOURCE_TEMPLATE),
            placeholders: PlaceholderPolicy::default(),
            header_include: "gl.h".to_string(),
        }
    }
}

impl super::Generator for CLoaderGenerator {
    fn write<H, S>(&self, registry: &Registry, header: &mut H, source: &mut S) -> Result<()>
    where
        H: io::Write,
        S: io::Write,
    {
        let requirements = registry.resolve();
        let ctx = synthesize(registry.root(), &requirements, &self.options, registry.target().api)?;
        let (header_text, source_text) = self.build(&ctx)?;

        header.write_all(header_text.as_bytes())?;
        source.write_all(source_text.as_bytes())?;
        info!("generated {} commands for {}", ctx.command_count, registry.target());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Error,
        generators::Generator,
        registry::{Api, Profile, Target, Version},
        xml::PROLOGUE,
    };

    const REGISTRY: &str = r#"
<registry>
    <types><type>typedef float <name>GLfloat</name>;</type></types>
    <enums><enum name="GL_ONE" value="1"/></enums>
    <commands>
        <command><proto>void <name>glFlush</name></proto></command>
    </commands>
    <feature api="gl" name="GL_VERSION_1_0">
        <require><enum name="GL_ONE"/><command name="glFlush"/></require>
    </feature>
</registry>
"#;

    fn generate(generator: &CLoaderGenerator) -> Result<(String, String)> {
        let src = format!("{}{}", PROLOGUE, REGISTRY);
        let registry = Registry::parse(&src, Target::new(Api::Gl, Profile::Core, Version::V1_0))?;
        let (mut header, mut source) = (Vec::new(), Vec::new());
        generator.write(&registry, &mut header, &mut source)?;
        Ok((String::from_utf8(header).unwrap(), String::from_utf8(source).unwrap()))
    }

    #[test]
    fn default_skeletons() {
        let (header, source) = generate(&CLoaderGenerator::default()).unwrap();

        assert!(header.contains("const char *clad_init_gl(CladProcAddrLoader load_proc);"));
        assert!(header.contains("typedef float GLfloat;\n\n#define GL_ONE 1\n\nvoid glFlush(void);\n"));
        assert!(!header.contains('%'));

        assert!(source.starts_with("#include \"gl.h\"\n"));
        assert!(source.contains("static Proc lookup[] = {\n    { NULL, \"glFlush\" },\n    { NULL, NULL }\n};"));
        assert!(source.contains("void glFlush(void)\n{\n    ((void (*)(void))(lookup[0].proc))();\n}\n"));
    }

    #[test]
    fn custom_skeletons_and_include() {
        let generator = CLoaderGenerator::default()
            .with_header_template("/* %ENUMS% */")
            .with_source_template(String::from("#include <%HEADER_INCLUDE%>\n%COMMAND_LOOKUP%"))
            .with_header_include("clad/gl.h");
        let (header, source) = generate(&generator).unwrap();
        assert_eq!(header, "/* #define GL_ONE 1\n */");
        assert_eq!(source, "#include <clad/gl.h>\n    { NULL, \"glFlush\" },\n");
    }

    #[test]
    fn undefined_placeholder_writes_nothing() {
        let src = format!("{}{}", PROLOGUE, REGISTRY);
        let registry = Registry::parse(&src, Target::new(Api::Gl, Profile::Core, Version::V1_0)).unwrap();
        let generator = CLoaderGenerator::default().with_source_template("%COMMAND_TABLE%");
        let (mut header, mut source) = (Vec::new(), Vec::new());

        match generator.write(&registry, &mut header, &mut source) {
            Err(Error::UndefinedPlaceholder { name, .. }) => assert_eq!(name, "COMMAND_TABLE"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(header.is_empty());
        assert!(source.is_empty());
    }

    #[test]
    fn warn_policy_leaves_gaps() {
        let generator = CLoaderGenerator::default()
            .with_source_template("[%COMMAND_TABLE%]")
            .with_placeholder_policy(PlaceholderPolicy::Warn);
        let (_, source) = generate(&generator).unwrap();
        assert_eq!(source, "[]");
    }
}
