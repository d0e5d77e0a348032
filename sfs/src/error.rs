//! Errors reported by the parser, the scalar codec and the path resolver.

use std::ops::Range;

use thiserror::Error;

use crate::path::{Path, Segment};

/// A structural failure that aborts the whole parse. No partial tree is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed input on line {line}: {kind}")]
    MalformedInput {
        kind: Malformation,
        /// 1-based line on which the mismatch was detected.
        line: usize,
        /// Byte range of the offending token.
        span: Range<usize>,
    },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::MalformedInput { line, .. } => *line,
        }
    }

    pub fn span(&self) -> Range<usize> {
        match self {
            ParseError::MalformedInput { span, .. } => span.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Malformation {
    #[error("unmatched `}}` with no open block")]
    UnmatchedClose,
    #[error("block `{0}` is never closed")]
    UnclosedBlock(String),
    #[error("expected `{{` after block name `{0}`")]
    MissingOpen(String),
    #[error("`{{` without a block name")]
    StrayOpen,
    #[error("{0}")]
    Unexpected(String),
}

/// A token that has numeric shape but cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("numeric value `{raw}` is out of range")]
    NumericOverflow { raw: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no `{segment}` found (resolved so far: `{resolved}`)")]
    NotFound {
        /// The first segment that could not be matched.
        segment: Segment,
        /// The segments matched before it.
        resolved: Path,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },
}
