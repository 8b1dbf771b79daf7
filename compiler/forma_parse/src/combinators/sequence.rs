use crate::cursor::ParseContext;
use crate::outcome::{ParseFailure, ParseResult};
use crate::parser::Parser;

/// A tuple of parsers run one after another.
///
/// Implemented for tuples of up to eight [`Parser`]s; the output is the tuple
/// of their values.
pub trait SequenceParsers: Send + Sync + 'static {
    type Output;

    fn names(&self) -> Vec<&str>;

    /// Run every parser in order, threading the cursor.
    fn run(&self, cursor: &ParseContext) -> Result<(Self::Output, ParseContext), ParseFailure>;
}

macro_rules! impl_sequence {
    ($($T:ident $value:ident $idx:tt),+) => {
        impl<$($T: 'static),+> SequenceParsers for ($(Parser<$T>,)+) {
            type Output = ($($T,)+);

            fn names(&self) -> Vec<&str> {
                vec![$(self.$idx.name()),+]
            }

            fn run(
                &self,
                cursor: &ParseContext,
            ) -> Result<(Self::Output, ParseContext), ParseFailure> {
                let next = cursor.clone();
                $(
                    let ($value, next) = match self.$idx.parse(&next) {
                        ParseResult::Success(success) => (success.value, success.cursor),
                        ParseResult::Failure(failure) => return Err(failure),
                    };
                )+
                Ok((($($value,)+), next))
            }
        }
    };
}

impl_sequence!(A a 0);
impl_sequence!(A a 0, B b 1);
impl_sequence!(A a 0, B b 1, C c 2);
impl_sequence!(A a 0, B b 1, C c 2, D d 3);
impl_sequence!(A a 0, B b 1, C c 2, D d 3, E e 4);
impl_sequence!(A a 0, B b 1, C c 2, D d 3, E e 4, F f 5);
impl_sequence!(A a 0, B b 1, C c 2, D d 3, E e 4, F f 5, G g 6);
impl_sequence!(A a 0, B b 1, C c 2, D d 3, E e 4, F f 5, G g 6, H h 7);

/// Runs `parsers` in order; fails as a whole if any of them fails.
///
/// The failure's cause is the failing child's failure and its cursor is the
/// sequence's start, so no partial progress is visible.
pub fn sequence<S: SequenceParsers>(parsers: S) -> Parser<S::Output> {
    let name = format!("sequence({})", parsers.names().join(", "));
    let expected = name.clone();
    Parser::new(name, move |cursor| match parsers.run(cursor) {
        Ok((value, next)) => ParseResult::success(value, next),
        Err(f) => ParseResult::failure_with_cause(expected.as_str(), cursor.clone(), f),
    })
}
