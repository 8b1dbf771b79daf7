//! Named, shareable parsers.

use std::fmt;
use std::sync::Arc;

use crate::cursor::ParseContext;
use crate::outcome::ParseResult;

type RunFn<T> = dyn Fn(&ParseContext) -> ParseResult<T> + Send + Sync;

/// A named function from cursor to [`ParseResult`].
///
/// Parsers are immutable and cheap to clone (two `Arc`s). Combinators hold
/// clones of their children and derive their own name from the children's
/// names; that name is what a failure reports as `expected`.
pub struct Parser<T> {
    name: Arc<str>,
    run: Arc<RunFn<T>>,
}

impl<T> Parser<T> {
    pub fn new(
        name: impl Into<Arc<str>>,
        run: impl Fn(&ParseContext) -> ParseResult<T> + Send + Sync + 'static,
    ) -> Self {
        Parser {
            name: name.into(),
            run: Arc::new(run),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn parse(&self, cursor: &ParseContext) -> ParseResult<T> {
        (self.run)(cursor)
    }

    /// Same behavior under a different name.
    ///
    /// Failures of the renamed parser report the new name and keep the
    /// original failure as their cause.
    #[must_use]
    pub fn named(self, name: impl Into<Arc<str>>) -> Self
    where
        T: 'static,
    {
        let name: Arc<str> = name.into();
        let inner = self;
        let expected = Arc::clone(&name);
        Parser {
            name,
            run: Arc::new(move |cursor| match inner.parse(cursor) {
                ParseResult::Failure(f) => {
                    ParseResult::failure_with_cause(&*expected, cursor.clone(), f)
                }
                success => success,
            }),
        }
    }
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Parser {
            name: Arc::clone(&self.name),
            run: Arc::clone(&self.run),
        }
    }
}

impl<T> fmt::Debug for Parser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parser({})", self.name)
    }
}

impl<T> fmt::Display for Parser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
