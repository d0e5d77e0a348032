//! Addressing nodes by name, with indices to pick among same-name siblings.
//!
//! A path is written as segment names separated by `/`. An integer segment selects which
//! occurrence of the preceding name to follow, counting from 0, so `SCENARIO/Moon/1/id` is the
//! `id` of the second `Moon` inside the first `SCENARIO`. Without an integer the first
//! occurrence is used.
//!
//! `ALL` as the last segment selects the whole subtree at the starting point. Under a
//! [`Section`] this is the entire section, which for `GAME` or `FLIGHTSTATE` is most of the save
//! file.

use std::fmt;
use std::str::FromStr;

use tracing::*;

use crate::error::{PathError, ResolveError};
use crate::node::{Block, Leaf, Node};

/// Marker requesting the whole subtree.
pub const ALL: &str = "ALL";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub name: String,
    pub index: usize,
}

impl Segment {
    pub fn new(name: impl Into<String>) -> Self {
        Segment::nth(name, 0)
    }

    pub fn nth(name: impl Into<String>, index: usize) -> Self {
        Segment {
            name: name.into(),
            index,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index == 0 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.name, self.index)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Path {
    /// The whole subtree at the starting point.
    All,
    Segments(Vec<Segment>),
}

impl Path {
    pub fn parse(text: &str) -> Result<Path, PathError> {
        let invalid = |reason| PathError::InvalidPath {
            path: text.to_string(),
            reason,
        };

        let trimmed = text.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(invalid("the path is empty"));
        }

        let steps: Vec<&str> = trimmed.split('/').collect();
        if steps.last() == Some(&ALL) {
            return Ok(Path::All);
        }

        let mut segments: Vec<Segment> = Vec::with_capacity(steps.len());
        let mut indexed = false;
        for step in steps {
            if step.is_empty() {
                return Err(invalid("the path has an empty segment"));
            }
            match step.parse::<usize>() {
                Ok(index) => {
                    let Some(last) = segments.last_mut() else {
                        return Err(invalid("an index must follow a name"));
                    };
                    if indexed {
                        return Err(invalid("a name can only take one index"));
                    }
                    last.index = index;
                    indexed = true;
                }
                Err(_) => {
                    segments.push(Segment::new(step));
                    indexed = false;
                }
            }
        }
        Ok(Path::Segments(segments))
    }

    /// Build a path from `(name, occurrence)` pairs, where `None` means the first occurrence.
    pub fn from_segments<I, S>(segments: I) -> Path
    where
        I: IntoIterator<Item = (S, Option<usize>)>,
        S: Into<String>,
    {
        Path::Segments(
            segments
                .into_iter()
                .map(|(name, index)| Segment::nth(name, index.unwrap_or(0)))
                .collect(),
        )
    }

    /// The segments to follow; empty for [`Path::All`].
    pub fn segments(&self) -> &[Segment] {
        match self {
            Path::All => &[],
            Path::Segments(segments) => segments,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Path::All)
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::All => f.write_str(ALL),
            Path::Segments(segments) => {
                for (i, segment) in segments.iter().enumerate() {
                    if i > 0 {
                        f.write_str("/")?;
                    }
                    write!(f, "{segment}")?;
                }
                Ok(())
            }
        }
    }
}

/// What a path led to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'t> {
    Subtree(&'t Block),
    /// The path ended on a leaf; its decoded value is [`Leaf::value`].
    Value(&'t Leaf),
}

impl<'t> From<&'t Node> for Resolved<'t> {
    fn from(node: &'t Node) -> Self {
        match node {
            Node::Block(b) => Resolved::Subtree(b),
            Node::Leaf(l) => Resolved::Value(l),
        }
    }
}

/// Follow `path` from `start`.
pub fn resolve<'t>(start: &'t Block, path: &Path) -> Result<Resolved<'t>, ResolveError> {
    let mut current = Resolved::Subtree(start);

    for (depth, segment) in path.segments().iter().enumerate() {
        let next = match current {
            Resolved::Subtree(block) => block.find(&segment.name, segment.index),
            Resolved::Value(_) => None,
        };
        current = match next {
            Some(node) => node.into(),
            None => {
                let resolved = Path::Segments(path.segments()[..depth].to_vec());
                trace!(%segment, %resolved, "path segment not found");
                return Err(ResolveError::NotFound {
                    segment: segment.clone(),
                    resolved,
                });
            }
        };
    }

    Ok(current)
}

/// The top-level sections a save file is organised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Parameters,
    Game,
    FlightState,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Parameters, Section::Game, Section::FlightState];

    pub fn name(self) -> &'static str {
        match self {
            Section::Parameters => "PARAMETERS",
            Section::Game => "GAME",
            Section::FlightState => "FLIGHTSTATE",
        }
    }

    pub fn from_name(name: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|section| section.name() == name)
    }

    /// Where the section lives, starting from the root of a parsed file.
    pub fn branch(self) -> Vec<Segment> {
        match self {
            Section::Game => vec![Segment::new("GAME")],
            Section::Parameters | Section::FlightState => {
                vec![Segment::new("GAME"), Segment::new(self.name())]
            }
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Follow `path` from the root of a parsed file, relative to `section`.
pub fn resolve_in<'t>(
    root: &'t Block,
    section: Section,
    path: &Path,
) -> Result<Resolved<'t>, ResolveError> {
    let mut full = section.branch();
    if path.is_all() {
        debug!(%section, "resolving the whole section");
    } else {
        full.extend_from_slice(path.segments());
    }
    resolve(root, &Path::Segments(full))
}
