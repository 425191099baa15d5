//! Source locations: positions, spans and the tracker that advances them

use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A trait that can provide the [Span] of something taken from a source
pub trait Spanned {
    fn span(&self) -> Span;
}

/// The identity of a source. Streams are not self-naming, so their identity is anonymous.
#[derive(Debug, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SourceId(Option<Arc<Path>>);

impl SourceId {
    /// An anonymous source
    pub const fn anonymous() -> Self {
        Self(None)
    }

    /// A source backed by a file at the given path
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self(Some(Arc::from(path.as_ref())))
    }

    /// Gets the file path of this source, if it's named
    pub fn path(&self) -> Option<&Path> {
        self.0.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_none()
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            None => f.write_str("<anonymous>"),
            Some(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A line and column in a source, both 1-based
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Creates a new position
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The first position of any source
    pub const fn start() -> Self {
        Self::new(1, 1)
    }

    /// Moves this position past `text`. Every line break moves to the first column of the next
    /// line, anything else moves one column to the right.
    pub fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An immutable range `[begin, end)` within a source
#[derive(Debug, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Span {
    source: SourceId,
    begin: Position,
    end: Position,
}

impl Span {
    /// Creates a new span
    pub fn new(source: SourceId, begin: Position, end: Position) -> Self {
        debug_assert!(begin <= end, "span must not end before it begins");
        Self { source, begin, end }
    }

    /// Creates an empty span at a position
    pub fn point(source: SourceId, at: Position) -> Self {
        Self::new(source, at, at)
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    pub fn begin(&self) -> Position {
        self.begin
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Creates a span that encompasses both. Returns `None` if the spans come from different
    /// sources.
    pub fn join(&self, other: &Self) -> Option<Self> {
        if self.source != other.source {
            None
        } else {
            Some(Self {
                source: self.source.clone(),
                begin: self.begin.min(other.begin),
                end: self.end.max(other.end),
            })
        }
    }

    /// Number of columns this span covers on its first line
    pub fn width(&self) -> usize {
        if self.begin.line == self.end.line {
            self.end.column - self.begin.column
        } else {
            0
        }
    }
}

impl Spanned for Span {
    fn span(&self) -> Span {
        self.clone()
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.source, self.begin)?;
        if self.begin.line == self.end.line {
            if self.end.column > self.begin.column + 1 {
                write!(f, "-{}", self.end.column - 1)?;
            }
        } else {
            write!(f, "-{}", self.end)?;
        }
        Ok(())
    }
}

/// Tracks the location of the token currently being scanned.
///
/// The tracker is owned by whoever owns the input and lent to the tokenizer, which calls
/// [`step`](Self::step) before a token and [`advance`](Self::advance) over the text it
/// consumes. [`span`](Self::span) then freezes the current range.
#[derive(Debug, Clone, Default)]
pub struct LocationTracker {
    source: SourceId,
    begin: Position,
    end: Position,
}

impl LocationTracker {
    /// Creates a tracker at the start of a source
    pub fn new(source: SourceId) -> Self {
        Self {
            source,
            begin: Position::start(),
            end: Position::start(),
        }
    }

    /// Resets this tracker to the start of a (possibly new) source
    pub fn initialize(&mut self, source: SourceId) {
        *self = Self::new(source);
    }

    /// Starts a new range at the current end position
    pub fn step(&mut self) {
        self.begin = self.end;
    }

    /// Advances the end position over consumed text
    pub fn advance(&mut self, consumed: &str) {
        self.end.advance(consumed);
    }

    /// Freezes the current range into a span
    pub fn span(&self) -> Span {
        Span::new(self.source.clone(), self.begin, self.end)
    }

    /// The current end position
    pub fn position(&self) -> Position {
        self.end
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }
}

/// A line reader struct that's responsible for getting lines surrounding a span from its file
#[derive(Debug, Default)]
pub struct LineReader {
    before: usize,
    after: usize,
}

impl LineReader {
    /// Creates a new line reader that gets `before` number of lines before a span and `after`
    /// number of lines after.
    pub fn new(before: usize, after: usize) -> Self {
        Self { before, after }
    }

    /// Gets the lines around a span. Fails for anonymous sources, which can't be re-read.
    pub fn lines(&self, span: &Span) -> io::Result<Vec<Line>> {
        let path = span
            .source()
            .path()
            .map(PathBuf::from)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "anonymous source"))?;
        let string = std::fs::read_to_string(path)?;
        let base = span.begin().line;
        let first = base.saturating_sub(self.before).max(1);
        let last = base.saturating_add(self.after);
        let lines = string
            .lines()
            .enumerate()
            .map(|(idx, src)| (idx + 1, src))
            .filter(|(line, _)| (first..=last).contains(line))
            .map(|(line, src)| Line {
                line,
                src: src.to_string(),
            })
            .collect::<Vec<_>>();
        if lines.iter().all(|line| line.line != base) {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "line out of bounds",
            ));
        }
        Ok(lines)
    }
}

#[derive(Debug)]
pub struct Line {
    pub line: usize,
    pub src: String,
}
