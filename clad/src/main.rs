////////////////////////////////////////////////////////////////////////////////////
// Copyright (c) 2019 DasEtwas - All Rights Reserved                               /
//      Unauthorized copying of this file, via any medium is strictly prohibited   /
//      Proprietary and confidential                                               /
////////////////////////////////////////////////////////////////////////////////////

//! Generates `gl.h` and `gl.c` for one API, profile and version from the Khronos `gl.xml`.

#[macro_use]
extern crate log;

use std::{
    fs,
    io::{self, IsTerminal},
    path::{Path, PathBuf},
    process,
};

use anyhow::{Context, Result};
use clad_generator::{
    Api,
    CLoaderGenerator,
    GeneratorOptions,
    Naming,
    PlaceholderPolicy,
    Profile,
    Registry,
    Target,
    Version,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "clad")]
#[command(about = "Generate a C OpenGL loader from the Khronos XML registry")]
struct Cli {
    /// The registry, usually gl.xml
    #[arg(long)]
    in_xml: PathBuf,

    /// Where to write the generated header
    #[arg(long)]
    out_header: PathBuf,

    /// Where to write the generated source
    #[arg(long)]
    out_source: PathBuf,

    /// gl, gles1, gles2 or glsc2
    #[arg(long, default_value = "gl")]
    api: Api,

    /// core or compatibility
    #[arg(long, default_value = "core")]
    profile: Profile,

    /// Highest version to include, e.g. 3.3
    #[arg(long = "version")]
    gl_version: Version,

    /// Header skeleton, instead of the built-in one
    #[arg(long)]
    header_template: Option<PathBuf>,

    /// Source skeleton, instead of the built-in one
    #[arg(long)]
    source_template: Option<PathBuf>,

    /// Name the wrappers gl_clear_color instead of glClearColor
    #[arg(long)]
    snake_case: bool,

    /// Declare wrappers under a prefix and map the public names onto them with macros
    #[arg(long)]
    macros: bool,

    /// Wrapper prefix for --macros, "clad_" by default
    #[arg(long, requires = "macros")]
    prefix: Option<String>,

    /// Leave unknown %PLACEHOLDERS% empty instead of failing
    #[arg(long)]
    allow_undefined_placeholders: bool,
}

impl Cli {
    fn generator_options(&self) -> GeneratorOptions {
        let mut options = if self.macros { GeneratorOptions::macros() } else { GeneratorOptions::default() };
        if self.snake_case {
            options.naming = Naming::SnakeCase;
        }
        if let Some(prefix) = &self.prefix {
            options.wrapper_prefix = prefix.clone();
        }
        options
    }

    fn generator(&self) -> Result<CLoaderGenerator> {
        let mut generator = CLoaderGenerator::new(self.generator_options());
        if let Some(path) = &self.header_template {
            generator = generator.with_header_template(read(path)?);
        }
        if let Some(path) = &self.source_template {
            generator = generator.with_source_template(read(path)?);
        }
        if self.allow_undefined_placeholders {
            generator = generator.with_placeholder_policy(PlaceholderPolicy::Warn);
        }
        if let Some(file_name) = self.out_header.file_name() {
            generator = generator.with_header_include(file_name.to_string_lossy());
        }
        Ok(generator)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        error!("{:#}", err);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let target = Target::new(cli.api, cli.profile, cli.gl_version);
    let generator = cli.generator()?;

    info!("reading {}", cli.in_xml.display());
    let xml = read(&cli.in_xml)?;
    let registry = Registry::parse(&xml, target).with_context(|| format!("failed to parse {}", cli.in_xml.display()))?;

    // Nothing touches the disk until both artifacts are built.
    let (mut header, mut source) = (Vec::new(), Vec::new());
    registry
        .write_bindings(generator, &mut header, &mut source)
        .with_context(|| format!("failed to generate {}", target))?;

    write_if_changed(&cli.out_header, &header)?;
    write_if_changed(&cli.out_source, &source)?;
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Writes `contents` unless `path` already holds exactly these bytes.
fn write_if_changed(path: &Path, contents: &[u8]) -> Result<()> {
    if let Ok(existing) = fs::read(path) {
        if existing == contents {
            debug!("{} is up to date", path.display());
            return Ok(());
        }
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}
