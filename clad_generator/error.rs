////////////////////////////////////////////////////////////////////////////////////
// Copyright (c) 2020 DasEtwas - All Rights Reserved                               /
//      Unauthorized copying of this file, via any medium is strictly prohibited   /
//      Proprietary and confidential                                               /
////////////////////////////////////////////////////////////////////////////////////

use std::{fmt, io};

use thiserror::Error;

use crate::xml::ParseError;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that stops a generator run.
///
/// Problems the resolver can step over (a feature without an `api`, an unknown API, profile or
/// version token) are only logged and never surface here.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("the registry has no <{0}> section")]
    MissingSection(&'static str),

    /// `offset` is where the name was last referenced by a `<require>`.
    #[error("enum `{name}` required at byte {offset} is not defined in the registry")]
    MissingEnum { name: String, offset: usize },

    #[error("command `{name}` required at byte {offset} is not defined in the registry")]
    MissingCommand { name: String, offset: usize },

    #[error("malformed <command> at byte {offset}: {reason}")]
    MalformedCommand { offset: usize, reason: &'static str },

    #[error("enum `{name}` has no `value` attribute")]
    MalformedEnum { name: String },

    #[error("template references undefined placeholder `%{name}%` at byte {offset}")]
    UndefinedPlaceholder { name: String, offset: usize },

    #[error(transparent)]
    Fmt(#[from] fmt::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}
