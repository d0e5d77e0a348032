//! Builds the node tree from the lexed tokens in a single pass.

use chumsky::prelude::*;
use tracing::*;

use crate::error::{Malformation, ParseError};
use crate::lexer::{lexer, Token};
use crate::node::{Block, Leaf, Node};
use crate::path::Section;
use crate::scalar::{self, Coercion, Scalar, KNOWN_KEYS};
use crate::span::{LineIndex, Spanned};

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Deepest nesting level to keep; the root's children are depth 1. `None` and `Some(0)` keep
    /// everything.
    pub max_depth: Option<usize>,
    pub coercion: Coercion,
}

/// A subtree dropped because it was deeper than [`ParseOptions::max_depth`]. Only the topmost
/// omitted node is reported; everything below it is gone as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthTruncated {
    pub name: String,
    pub line: usize,
    pub depth: usize,
}

#[derive(Debug, Clone)]
pub struct Parsed {
    /// Unnamed block holding the top-level blocks of the file.
    pub root: Block,
    /// Empty unless a depth limit dropped something, in which case the tree is partial.
    pub truncations: Vec<DepthTruncated>,
}

impl Parsed {
    pub fn is_partial(&self) -> bool {
        !self.truncations.is_empty()
    }
}

struct Frame {
    /// `None` while inside a subtree that the depth limit is dropping.
    block: Option<Block>,
    open: SimpleSpan<usize>,
}

struct TreeBuilder<'o> {
    options: &'o ParseOptions,
    lines: LineIndex,
    stack: Vec<Frame>,
    pending: Option<Spanned<String>>,
    truncations: Vec<DepthTruncated>,
}

impl<'o> TreeBuilder<'o> {
    fn new(src: &str, options: &'o ParseOptions) -> Self {
        TreeBuilder {
            options,
            lines: LineIndex::new(src),
            stack: vec![Frame {
                block: Some(Block::new("")),
                open: SimpleSpan::new(0, 0),
            }],
            pending: None,
            truncations: Vec::new(),
        }
    }

    fn malformed(&self, kind: Malformation, span: SimpleSpan<usize>) -> ParseError {
        ParseError::MalformedInput {
            kind,
            line: self.lines.line_of(span.start),
            span: span.into_range(),
        }
    }

    /// The depth a node gets if it is added now.
    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn within_limit(&self, depth: usize) -> bool {
        match self.options.max_depth {
            None | Some(0) => true,
            Some(max) => depth <= max,
        }
    }

    /// The block new children go into, or `None` when the current subtree is being dropped.
    fn parent(&mut self) -> Option<&mut Block> {
        self.stack.last_mut().and_then(|frame| frame.block.as_mut())
    }

    fn truncate(&mut self, name: &str, span: SimpleSpan<usize>, depth: usize) {
        let line = self.lines.line_of(span.start);
        debug!(name, line, depth, "dropping subtree beyond the depth limit");
        self.truncations.push(DepthTruncated {
            name: name.to_string(),
            line,
            depth,
        });
    }

    fn expect_no_pending(&mut self) -> Result<(), ParseError> {
        match self.pending.take() {
            Some(name) => Err(self.malformed(Malformation::MissingOpen(name.val), name.span)),
            None => Ok(()),
        }
    }

    fn token(&mut self, token: Spanned<Token>) -> Result<(), ParseError> {
        let Spanned { span, val } = token;
        match val {
            Token::Name(name) => {
                self.expect_no_pending()?;
                self.pending = Some(Spanned { span, val: name });
            }
            Token::Open => {
                let Some(name) = self.pending.take() else {
                    return Err(self.malformed(Malformation::StrayOpen, span));
                };
                let depth = self.depth();
                let keep = self.within_limit(depth);
                let block = if self.parent().is_some() && keep {
                    let mut block = Block::new(name.val);
                    block.line = self.lines.line_of(name.span.start);
                    Some(block)
                } else {
                    if self.parent().is_some() {
                        self.truncate(&name.val, name.span, depth);
                    }
                    None
                };
                self.stack.push(Frame { block, open: span });
            }
            Token::Assign { key, value } => {
                self.expect_no_pending()?;
                let depth = self.depth();
                if !self.within_limit(depth) {
                    if self.parent().is_some() {
                        self.truncate(&key, span, depth);
                    }
                    return Ok(());
                }
                let line = self.lines.line_of(span.start);
                let coercion = self.options.coercion;
                if let Some(parent) = self.parent() {
                    let decoded = decodes(coercion, &parent.name, &key)
                        .then(|| scalar::decode(&value))
                        .unwrap_or_else(|| Scalar::Str(value.clone()));
                    parent.children.push(Node::Leaf(Leaf {
                        name: key,
                        line,
                        raw: value,
                        value: decoded,
                    }));
                }
            }
            Token::Close => {
                self.expect_no_pending()?;
                if self.stack.len() == 1 {
                    return Err(self.malformed(Malformation::UnmatchedClose, span));
                }
                if let Some(Frame {
                    block: Some(block), ..
                }) = self.stack.pop()
                {
                    if let Some(parent) = self.parent() {
                        parent.children.push(Node::Block(block));
                    }
                }
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Parsed, ParseError> {
        self.expect_no_pending()?;
        if self.stack.len() > 1 {
            let name = self
                .stack
                .last()
                .and_then(|frame| frame.block.as_ref())
                .map(|block| block.name.clone())
                .unwrap_or_default();
            let open = self
                .stack
                .last()
                .map(|frame| frame.open)
                .unwrap_or(SimpleSpan::new(0, 0));
            return Err(self.malformed(Malformation::UnclosedBlock(name), open));
        }
        let root = self
            .stack
            .pop()
            .and_then(|frame| frame.block)
            .unwrap_or_default();
        Ok(Parsed {
            root,
            truncations: self.truncations,
        })
    }
}

/// Whether a leaf is run through the scalar codec under `coercion`.
fn decodes(coercion: Coercion, parent: &str, key: &str) -> bool {
    match coercion {
        Coercion::Recursive => true,
        Coercion::KnownKeys => Section::from_name(parent).is_some() && KNOWN_KEYS.contains(&key),
    }
}

/// Parse save-file text into a tree.
///
/// Fails with [`ParseError::MalformedInput`] on the first nesting error; there is no recovery
/// and no partial tree.
#[instrument(level = "debug", skip_all, fields(len = src.len()))]
pub fn parse(src: &str, options: &ParseOptions) -> Result<Parsed, ParseError> {
    let tokens = lexer().parse(src).into_result().map_err(|errors| {
        let lines = LineIndex::new(src);
        let first = errors.into_iter().next();
        let span = first
            .as_ref()
            .map(|e| *e.span())
            .unwrap_or(SimpleSpan::new(0, 0));
        ParseError::MalformedInput {
            kind: Malformation::Unexpected(
                first.map(|e| e.to_string()).unwrap_or_else(|| "unexpected input".to_string()),
            ),
            line: lines.line_of(span.start),
            span: span.into_range(),
        }
    })?;

    trace!(tokens = tokens.len(), "lexed save file");

    let mut builder = TreeBuilder::new(src, options);
    for token in tokens {
        builder.token(token)?;
    }
    let parsed = builder.finish()?;

    debug!(
        nodes = parsed.root.descendant_count(),
        truncated = parsed.truncations.len(),
        "parsed save file"
    );
    Ok(parsed)
}
