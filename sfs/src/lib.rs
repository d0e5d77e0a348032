//! Reading Kerbal Space Program save files (`.sfs`).
//!
//! A save file is a tree of named blocks holding `key = value` lines. This crate lexes that text
//! into a [`Block`] tree, infers types for values when asked to, looks nodes up by path, and
//! exports trees as JSON or writes them back out as save-file text.
//!
//! The tree only describes the *shape* of the data. Nothing here knows what a vessel or an
//! orbit is; values are strings unless type inference is requested, either for a handful of
//! well-known keys ([`Coercion::KnownKeys`], the default) or for every leaf
//! ([`Coercion::Recursive`]).
//!
//! Block names are not unique among siblings (a save has many `VESSEL` blocks, for instance),
//! and their order is kept everywhere: in the tree, in [`Path`] indices, and in exported JSON.

mod error;
mod export;
mod lexer;
mod node;
mod parser;
mod path;
mod scalar;
mod span;
mod summary;
mod write;

pub use error::{CodecError, Malformation, ParseError, PathError, ResolveError};
pub use export::{
    block_to_json, leaf_to_json, node_to_json, to_json, DuplicateKeys, ExportOptions, JsonView,
};
pub use lexer::{lexer, Token};
pub use node::{Block, Leaf, Node};
pub use parser::{parse, DepthTruncated, ParseOptions, Parsed};
pub use path::{resolve, resolve_in, Path, Resolved, Section, Segment, ALL};
pub use scalar::{decode, encode, try_decode, Coercion, Number, Scalar, Tuple, KNOWN_KEYS};
pub use span::{LineIndex, Spanned};
pub use summary::SaveSummary;
pub use write::{node_to_sfs, to_sfs};
