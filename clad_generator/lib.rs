////////////////////////////////////////////////////////////////////////////////////
// Copyright (c) 2019 DasEtwas - All Rights Reserved                               /
//      Unauthorized copying of this file, via any medium is strictly prohibited   /
//      Proprietary and confidential                                               /
////////////////////////////////////////////////////////////////////////////////////

//! A C OpenGL loader generator. It reads the Khronos XML registry (`gl.xml`), works out which
//! enums and commands a given API, profile and version consist of, and writes a header and a
//! source file that load exactly those commands at run time.
//!
//! # Example
//!
//! ```no_run
//! extern crate clad_generator;
//!
//! use clad_generator::{Api, CLoaderGenerator, Profile, Registry, Target, Version};
//! use std::fs::{self, File};
//!
//! fn main() -> clad_generator::Result<()> {
//!     let xml = fs::read_to_string("gl.xml")?;
//!     let registry = Registry::parse(&xml, Target::new(Api::Gl, Profile::Core, Version::V3_3))?;
//!
//!     let mut header = File::create("gl.h")?;
//!     let mut source = File::create("gl.c")?;
//!     registry.write_bindings(CLoaderGenerator::default(), &mut header, &mut source)
//! }
//! ```
//!
//! The generated source starts with `#include "gl.h"`; call `clad_init_gl` with your platform's
//! `GetProcAddress` before the first GL call.

extern crate lazy_static;
#[macro_use]
extern crate log;

mod error;
pub mod registry;
pub mod template;
pub mod xml;

#[cfg(feature = "unstable_generator_utils")]
pub mod generators;
#[cfg(not(feature = "unstable_generator_utils"))]
mod generators;

pub use error::{Error, Result};
pub use generators::{
    c_loader_gen::CLoaderGenerator,
    snake_case,
    synthesize,
    DeclarationStyle,
    GenerationContext,
    Generator,
    GeneratorOptions,
    Naming,
};
pub use registry::{resolve, Api, Profile, Registry, RequirementKind, RequirementSet, Target, UnknownToken, Version};
pub use template::{PlaceholderPolicy, Template};
