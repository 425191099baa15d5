//! The driver owns the input source and hands it to a tokenizer and a grammar-reducer

use crate::lexer::{Lexer, Tokenizer};
use crate::parser::{ErrorKind, Grammar, GrammarReducer, ParseContext, SyntaxError, SyntaxResult};
use etapa_ast::{SymbolTable, SyntaxNode};
use etapa_tokens::location::Span;
use etapa_tokens::{LocationTracker, Position, SourceId};
use std::fmt::{Debug, Formatter};
use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, Read, Stdin, Write};
use std::path::Path;
use tracing::{debug, debug_span, trace};

/// Where the driver reads from. Standard input is only locked for the length of each read.
enum Source {
    Stdin(BufReader<Stdin>),
    File(BufReader<File>),
    Reader(BufReader<Box<dyn Read>>),
}

impl Source {
    fn stdin() -> Self {
        Source::Stdin(BufReader::new(io::stdin()))
    }

    fn reader(&mut self) -> &mut dyn BufRead {
        match self {
            Source::Stdin(stdin) => stdin,
            Source::File(file) => file,
            Source::Reader(reader) => reader,
        }
    }
}

impl Debug for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Stdin(_) => f.write_str("Stdin"),
            Source::File(file) => f.debug_tuple("File").field(file.get_ref()).finish(),
            Source::Reader(_) => f.write_str("Reader"),
        }
    }
}

/// The outcome of a successful parse
#[derive(Debug, Clone)]
pub struct Parsed {
    /// The root of the syntax tree
    pub tree: SyntaxNode,
    /// Every global declaration, functions included
    pub symbols: SymbolTable,
}

/// Drives the parsing of one source at a time.
///
/// A new driver reads standard input until it's bound to something else. Dropping the
/// driver, or binding another source, closes the current one.
///
/// # Examples
/// ```
/// # use etapa_parsing::Driver;
/// let mut driver = Driver::new();
/// driver.bind_reader("int main() { output 42; }".as_bytes());
/// driver.run_parse().unwrap();
/// let parsed = driver.take_result().unwrap();
/// assert_eq!(parsed.tree.next().unwrap().to_string(), "main");
/// ```
pub struct Driver<T: Tokenizer = Lexer, G: GrammarReducer = Grammar> {
    source: Source,
    location: LocationTracker,
    tokenizer: T,
    reducer: G,
    result: Option<Parsed>,
}

impl Driver {
    /// Creates a driver using the reference tokenizer and grammar, reading standard input
    pub fn new() -> Self {
        Self::with_parts(Lexer::new(), Grammar::new())
    }

    /// Creates a driver bound to a file
    pub fn with_path(path: impl AsRef<Path>) -> SyntaxResult<Self> {
        let mut driver = Self::new();
        driver.bind_path(path)?;
        Ok(driver)
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Tokenizer, G: GrammarReducer> Driver<T, G> {
    /// Creates a driver with a custom tokenizer and grammar-reducer, reading standard input
    pub fn with_parts(tokenizer: T, reducer: G) -> Self {
        Self {
            source: Source::stdin(),
            location: LocationTracker::new(SourceId::anonymous()),
            tokenizer,
            reducer,
            result: None,
        }
    }

    /// Binds this driver to a file.
    ///
    /// On failure the previously bound source stays bound.
    pub fn bind_path(&mut self, path: impl AsRef<Path>) -> SyntaxResult {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(SyntaxError::new(
                ErrorKind::invalid_input("no input file name given"),
                None,
                None,
                None,
            ));
        }
        let file = File::open(path).map_err(|e| {
            SyntaxError::new(
                ErrorKind::Io(e),
                Span::point(SourceId::file(path), Position::start()),
                None,
                None,
            )
        })?;
        debug!("binding driver to {path:?}");
        self.rebind(Source::File(BufReader::new(file)), SourceId::file(path));
        Ok(())
    }

    /// Binds this driver to an already open stream. Streams don't have a name, so every
    /// location in it is anonymous.
    pub fn bind_reader<R: Read + 'static>(&mut self, reader: R) {
        debug!("binding driver to an anonymous stream");
        let reader: Box<dyn Read> = Box::new(reader);
        self.rebind(Source::Reader(BufReader::new(reader)), SourceId::anonymous());
    }

    /// Releases the current source and goes back to reading standard input
    pub fn unbind(&mut self) {
        debug!("unbinding driver");
        self.rebind(Source::stdin(), SourceId::anonymous());
    }

    fn rebind(&mut self, source: Source, id: SourceId) {
        self.source = source;
        self.location.initialize(id);
        self.tokenizer.reset();
    }

    /// Parses the bound source.
    ///
    /// On success the tree replaces whatever result this driver held. On failure the previous
    /// result is left untouched.
    pub fn run_parse(&mut self) -> SyntaxResult {
        let parsed = self.parse()?;
        self.result = Some(parsed);
        Ok(())
    }

    pub(crate) fn parse(&mut self) -> SyntaxResult<Parsed> {
        let span = debug_span!("parse", source = %self.location.source());
        let _enter = span.enter();
        let mut cx = ParseContext::new(
            self.source.reader(),
            &mut self.tokenizer,
            &mut self.location,
        );
        let tree = match self.reducer.reduce(&mut cx) {
            Ok(tree) => tree,
            Err(e) => {
                debug!("parse failed: {e}");
                return Err(e);
            }
        };
        let symbols = cx.into_symbols();
        debug!(
            "parsed {} nodes and {} global symbols",
            tree.len(),
            symbols.len()
        );
        trace!("global symbols:\n{symbols}");
        Ok(Parsed { tree, symbols })
    }

    /// Renders the tree of the last successful parse. Does nothing if there is none.
    pub fn render_result<W: Write>(&self, out: W) -> io::Result<()> {
        match &self.result {
            Some(parsed) => parsed.tree.render_to(out),
            None => Ok(()),
        }
    }

    /// Gets the result of the last successful parse
    pub fn result(&self) -> Option<&Parsed> {
        self.result.as_ref()
    }

    /// Takes the result of the last successful parse out of this driver
    pub fn take_result(&mut self) -> Option<Parsed> {
        self.result.take()
    }

    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    /// The identity of the bound source
    pub fn source_id(&self) -> &SourceId {
        self.location.source()
    }
}

impl<T: Tokenizer + Debug, G: GrammarReducer + Debug> Debug for Driver<T, G> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("source", &self.source)
            .field("location", &self.location)
            .field("tokenizer", &self.tokenizer)
            .field("reducer", &self.reducer)
            .field("has_result", &self.result.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::LexResult;
    use crate::parse_path;
    use etapa_tokens::{LexicalValue, Spanned, Token};
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::NamedTempFile;
    use test_log::test;

    /// Reduces the first token to a single node
    #[derive(Debug, Default)]
    struct FirstToken;

    impl GrammarReducer for FirstToken {
        fn reduce(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<SyntaxNode> {
            match cx.next_token()? {
                Some(token) => {
                    let (value, span) = token.into_parts();
                    Ok(SyntaxNode::new(value, span))
                }
                None => Err(cx.unexpected(["token"])),
            }
        }
    }

    /// Counts how many tokens were requested from it
    #[derive(Debug, Default)]
    struct Counting {
        requests: Rc<Cell<usize>>,
        inner: Lexer,
    }

    impl Tokenizer for Counting {
        fn next_token(
            &mut self,
            input: &mut dyn BufRead,
            location: &mut LocationTracker,
        ) -> LexResult<Option<Token>> {
            self.requests.set(self.requests.get() + 1);
            self.inner.next_token(input, location)
        }

        fn reset(&mut self) {
            self.inner.reset()
        }
    }

    fn source_file(src: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("could not create temp file");
        file.write_all(src.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_stub_reducer_single_token() {
        let file = source_file("42");
        let mut driver = Driver::with_parts(Lexer::new(), FirstToken);
        driver.bind_path(file.path()).unwrap();
        assert_eq!(driver.source_id(), &SourceId::file(file.path()));
        driver.run_parse().unwrap();
        let parsed = driver.take_result().unwrap();
        assert_eq!(parsed.tree.len(), 1);
        assert_eq!(parsed.tree.value(), &LexicalValue::IntLiteral(42));
        assert_eq!(parsed.tree.to_string(), "42");
        assert!(!driver.has_result());
    }

    #[test]
    fn test_empty_path_fails_before_any_token() {
        let counting = Counting::default();
        let requests = counting.requests.clone();
        let mut driver = Driver::with_parts(counting, FirstToken);
        driver.bind_reader("7".as_bytes());

        let err = driver.bind_path("").unwrap_err();
        assert!(matches!(err.error_kind(), ErrorKind::InvalidInput(_)));
        assert_eq!(requests.get(), 0);

        // the previous source is still bound
        assert!(driver.source_id().is_anonymous());
        driver.run_parse().unwrap();
        assert_eq!(
            driver.result().map(|parsed| parsed.tree.value().clone()),
            Some(LexicalValue::IntLiteral(7))
        );
    }

    #[test]
    fn test_missing_file_keeps_previous_source() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.e");
        let mut driver = Driver::with_parts(Lexer::new(), FirstToken);
        driver.bind_reader("x".as_bytes());
        let err = driver.bind_path(&missing).unwrap_err();
        assert!(matches!(err.error_kind(), ErrorKind::Io(_)));
        assert_eq!(
            err.location().map(|span| span.source()),
            Some(&SourceId::file(&missing))
        );
        assert!(driver.source_id().is_anonymous());
        driver.run_parse().unwrap();
        assert_eq!(
            driver.result().unwrap().tree.value(),
            &LexicalValue::string("x")
        );
    }

    #[test]
    fn test_failure_keeps_previous_result() {
        let mut driver = Driver::new();
        driver.bind_reader("int main() { output 1; }".as_bytes());
        driver.run_parse().unwrap();
        driver.bind_reader("int main() { output 1 }".as_bytes());
        let err = driver.run_parse().unwrap_err();
        assert!(matches!(err.error_kind(), ErrorKind::ParseFailure { .. }));
        let kept = driver.result().unwrap();
        assert_eq!(kept.tree.next().unwrap().to_string(), "main");
        assert!(kept.symbols.contains("main"));
    }

    #[test]
    fn test_rebinding_resets_location() {
        let mut driver = Driver::with_parts(Lexer::new(), FirstToken);
        driver.bind_reader("\n\n  a b".as_bytes());
        driver.run_parse().unwrap();
        assert_eq!(driver.result().unwrap().tree.span().begin(), Position::new(3, 3));
        // the lexer buffer is dropped along with the old stream
        driver.bind_reader("c".as_bytes());
        driver.run_parse().unwrap();
        let tree = &driver.result().unwrap().tree;
        assert_eq!(tree.value(), &LexicalValue::string("c"));
        assert_eq!(tree.span().begin(), Position::new(1, 1));
    }

    #[test]
    fn test_unbind_fresh_driver() {
        let mut driver = Driver::new();
        driver.unbind();
        driver.unbind();
        assert!(driver.source_id().is_anonymous());
        assert!(!driver.has_result());
    }

    #[test]
    fn test_unbind_after_file() {
        let file = source_file("int main() { output 1; }");
        let mut driver = Driver::with_path(file.path()).unwrap();
        assert_eq!(driver.source_id(), &SourceId::file(file.path()));
        driver.run_parse().unwrap();
        driver.unbind();
        assert!(driver.source_id().is_anonymous());
        // unbinding leaves the last result alone
        assert!(driver.has_result());
        // and the next source starts over from the first line
        driver.bind_reader("\nint g() {}".as_bytes());
        driver.run_parse().unwrap();
        let tree = &driver.result().unwrap().tree;
        assert_eq!(tree.next().unwrap().span().begin(), Position::new(2, 5));
    }

    #[test]
    fn test_drivers_are_independent() {
        let mut first = Driver::new();
        let mut second = Driver::new();
        first.unbind();
        second.bind_reader("int b() {}".as_bytes());
        second.run_parse().unwrap();

        let file = source_file("int t() {}");
        let path = file.path().to_path_buf();
        let parsed = std::thread::spawn(move || parse_path(path))
            .join()
            .unwrap()
            .unwrap();
        assert_eq!(parsed.tree.next().unwrap().to_string(), "t");
        assert!(!first.has_result());
        assert_eq!(second.result().unwrap().tree.next().unwrap().to_string(), "b");
    }

    #[test]
    fn test_read_failure_is_io_error() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk gone"))
            }
        }
        let mut driver = Driver::new();
        driver.bind_reader(Failing);
        let err = driver.run_parse().unwrap_err();
        match err.error_kind() {
            ErrorKind::Io(e) => assert_eq!(e.to_string(), "disk gone"),
            other => panic!("unexpected error kind {other:?}"),
        }
        assert!(err.location().is_some());
        assert!(!driver.has_result());
    }

    #[test]
    fn test_render_result() {
        let mut driver = Driver::new();
        let mut out = vec![];
        driver.render_result(&mut out).unwrap();
        assert!(out.is_empty());

        driver.bind_reader("int f() { output 1; }".as_bytes());
        driver.run_parse().unwrap();
        driver.render_result(&mut out).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert_eq!(
            rendered,
            "n0 [label=\"\"]\nn1 [label=\"f\"]\nn2 [label=\"output\"]\nn3 [label=\"1\"]\nn0, n1\nn1, n2\nn2, n3\n"
        );
    }
}
