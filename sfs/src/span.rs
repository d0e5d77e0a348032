use chumsky::span::SimpleSpan;

/// A lexed value together with the byte range of the input it was read from.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Spanned<T> {
    pub span: SimpleSpan<usize>,
    pub val: T,
}

/// Maps byte offsets of the input back to 1-based line numbers. The offsets of each line start
/// are kept sorted, which is what makes the binary search in [`LineIndex::line_of`] valid.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(src.match_indices('\n').map(|(i, _)| i + 1));
        LineIndex { starts }
    }

    /// The 1-based line containing `offset`. Offsets past the end land on the last line.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_of_offsets() {
        let index = LineIndex::new("GAME\n{\n\tx = 1\n}\n");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(3), 1);
        assert_eq!(index.line_of(4), 1);
        assert_eq!(index.line_of(5), 2);
        assert_eq!(index.line_of(8), 3);
        assert_eq!(index.line_of(16), 5);
    }

    #[test]
    fn single_line_input() {
        let index = LineIndex::new("BLOCK { } }");
        assert_eq!(index.line_of(10), 1);
    }
}
