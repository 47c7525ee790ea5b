////////////////////////////////////////////////////////////////////////////////////
// Copyright (c) 2019 DasEtwas - All Rights Reserved                               /
//      Unauthorized copying of this file, via any medium is strictly prohibited   /
//      Proprietary and confidential                                               /
////////////////////////////////////////////////////////////////////////////////////

use std::{collections::HashMap, fmt, io, str::FromStr};

use indexmap::{map::MutableKeys, IndexMap};
use lazy_static::lazy_static;
use thiserror::Error;

use crate::{
    error::Result,
    generators::Generator,
    xml::{self, Node, StrSpan},
};

mod resolve;

pub use self::resolve::resolve;

/// A registry token (API, profile or version name) that is not part of the known vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what} `{token}`")]
pub struct UnknownToken {
    pub what: &'static str,
    pub token: String,
}

impl UnknownToken {
    fn new(what: &'static str, token: &str) -> UnknownToken {
        UnknownToken { what, token: token.to_string() }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Api {
    Gl,
    Gles1,
    Gles2,
    Glsc2,
}

impl FromStr for Api {
    type Err = UnknownToken;

    fn from_str(s: &str) -> std::result::Result<Api, UnknownToken> {
        match s {
            "gl" => Ok(Api::Gl),
            "gles1" => Ok(Api::Gles1),
            "gles2" => Ok(Api::Gles2),
            "glsc2" => Ok(Api::Glsc2),
            _ => Err(UnknownToken::new("API", s)),
        }
    }
}

impl fmt::Display for Api {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Api::Gl => write!(fmt, "gl"),
            Api::Gles1 => write!(fmt, "gles1"),
            Api::Gles2 => write!(fmt, "gles2"),
            Api::Glsc2 => write!(fmt, "glsc2"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Profile {
    Core,
    Compatibility,
}

impl FromStr for Profile {
    type Err = UnknownToken;

    fn from_str(s: &str) -> std::result::Result<Profile, UnknownToken> {
        match s {
            "core" => Ok(Profile::Core),
            "compatibility" => Ok(Profile::Compatibility),
            _ => Err(UnknownToken::new("profile", s)),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Profile::Core => write!(fmt, "core"),
            Profile::Compatibility => write!(fmt, "compatibility"),
        }
    }
}

/// The versions a feature can declare, in ascending order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    V1_0,
    V1_1,
    V1_2,
    V1_3,
    V1_4,
    V1_5,
    V2_0,
    V2_1,
    V3_0,
    V3_1,
    V3_2,
    V3_3,
    V4_0,
    V4_1,
    V4_2,
    V4_3,
    V4_4,
    V4_5,
    V4_6,
}

impl Version {
    pub const ALL: [Version; 19] = [
        Version::V1_0,
        Version::V1_1,
        Version::V1_2,
        Version::V1_3,
        Version::V1_4,
        Version::V1_5,
        Version::V2_0,
        Version::V2_1,
        Version::V3_0,
        Version::V3_1,
        Version::V3_2,
        Version::V3_3,
        Version::V4_0,
        Version::V4_1,
        Version::V4_2,
        Version::V4_3,
        Version::V4_4,
        Version::V4_5,
        Version::V4_6,
    ];

    pub fn major_minor(self) -> (u8, u8) {
        match self {
            Version::V1_0 => (1, 0),
            Version::V1_1 => (1, 1),
            Version::V1_2 => (1, 2),
            Version::V1_3 => (1, 3),
            Version::V1_4 => (1, 4),
            Version::V1_5 => (1, 5),
            Version::V2_0 => (2, 0),
            Version::V2_1 => (2, 1),
            Version::V3_0 => (3, 0),
            Version::V3_1 => (3, 1),
            Version::V3_2 => (3, 2),
            Version::V3_3 => (3, 3),
            Version::V4_0 => (4, 0),
            Version::V4_1 => (4, 1),
            Version::V4_2 => (4, 2),
            Version::V4_3 => (4, 3),
            Version::V4_4 => (4, 4),
            Version::V4_5 => (4, 5),
            Version::V4_6 => (4, 6),
        }
    }

    /// Reads the version out of a `<feature name="...">`, e.g. `GL_VERSION_3_3` or
    /// `GL_ES_VERSION_3_0`.
    pub fn from_feature_name(name: &str) -> std::result::Result<Version, UnknownToken> {
        FEATURE_PREFIXES
            .iter()
            .find_map(|prefix| name.strip_prefix(prefix))
            .and_then(|number| VERSIONS.get(number.replace('_', ".").as_str()).copied())
            .ok_or_else(|| UnknownToken::new("version", name))
    }
}

// `GL_VERSION_ES_CM_` has to be tried before `GL_VERSION_`.
const FEATURE_PREFIXES: [&str; 4] = ["GL_VERSION_ES_CM_", "GL_VERSION_", "GL_ES_VERSION_", "GL_SC_VERSION_"];

lazy_static! {
    static ref VERSIONS: HashMap<String, Version> =
        Version::ALL.iter().map(|&version| (version.to_string(), version)).collect();
}

/// Parses the short form used on the command line, e.g. `3.3`.
impl FromStr for Version {
    type Err = UnknownToken;

    fn from_str(s: &str) -> std::result::Result<Version, UnknownToken> {
        VERSIONS.get(s).copied().ok_or_else(|| UnknownToken::new("version", s))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let (major, minor) = self.major_minor();
        write!(fmt, "{}.{}", major, minor)
    }
}

/// The API, profile and version bindings are generated for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub api: Api,
    pub profile: Profile,
    pub version: Version,
}

impl Target {
    pub fn new(api: Api, profile: Profile, version: Version) -> Target {
        Target { api, profile, version }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{} {} ({})", self.api, self.version, self.profile)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RequirementKind {
    Enum,
    Command,
}

impl RequirementKind {
    /// The element that references this kind inside `<require>`/`<remove>`.
    pub fn from_tag(tag: &str) -> Option<RequirementKind> {
        match tag {
            "enum" => Some(RequirementKind::Enum),
            "command" => Some(RequirementKind::Command),
            _ => None,
        }
    }
}

/// Which enums and commands end up in the bindings.
///
/// Entries keep the position of their first insertion. Inserting an existing `(kind, name)`
/// only overwrites its flag, so a removal never frees a slot and a later re-add reuses it.
/// The stored name span always points at the latest reference to the name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequirementSet<'a> {
    entries: IndexMap<(RequirementKind, StrSpan<'a>), bool>,
}

impl<'a> RequirementSet<'a> {
    pub fn new() -> RequirementSet<'a> {
        RequirementSet { entries: IndexMap::new() }
    }

    pub fn insert(&mut self, kind: RequirementKind, name: StrSpan<'a>, required: bool) {
        match self.entries.get_full_mut2(&(kind, name)) {
            // Same text, same hash; only the offset moves.
            Some((_, (_, stored), flag)) => {
                *stored = name;
                *flag = required;
            },
            None => {
                self.entries.insert((kind, name), required);
            },
        }
    }

    pub fn get(&self, kind: RequirementKind, name: &str) -> Option<bool> {
        let entries: &IndexMap<(RequirementKind, StrSpan), bool> = &self.entries;
        entries.get(&(kind, StrSpan::new(name, 0))).copied()
    }

    pub fn is_required(&self, kind: RequirementKind, name: &str) -> bool {
        self.get(kind, name).unwrap_or(false)
    }

    /// Every entry in insertion order, removed ones included.
    pub fn iter<'s>(&'s self) -> impl Iterator<Item = (RequirementKind, StrSpan<'a>, bool)> + 's {
        self.entries.iter().map(|(&(kind, name), &required)| (kind, name, required))
    }

    /// The entries that are still required, in insertion order.
    pub fn required<'s>(&'s self) -> impl Iterator<Item = (RequirementKind, StrSpan<'a>)> + 's {
        self.iter().filter(|&(_, _, required)| required).map(|(kind, name, _)| (kind, name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed registry document together with the target bindings are generated for.
pub struct Registry<'a> {
    root: Node<'a>,
    target: Target,
}

impl<'a> Registry<'a> {
    /// Parses `src`. Structural errors abort; nothing of the document is kept.
    pub fn parse(src: &'a str, target: Target) -> Result<Registry<'a>> {
        let root = xml::parse(src)?;
        debug!("parsed registry <{}> for {}", root.as_element().map_or("?", |root| root.name.as_str()), target);
        Ok(Registry { root, target })
    }

    pub fn root(&self) -> &Node<'a> {
        &self.root
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn resolve(&self) -> RequirementSet<'a> {
        resolve(&self.root, self.target.api, self.target.profile, self.target.version)
    }

    /// Generates the loader into `header` and `source`.
    pub fn write_bindings<G, H, S>(&self, generator: G, header: &mut H, source: &mut S) -> Result<()>
    where
        G: Generator,
        H: io::Write,
        S: io::Write,
    {
        generator.write(self, header, source)
    }
}
