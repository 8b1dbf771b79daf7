//! Parser combinators.
//!
//! Every combinator takes its children by value (parsers are cheap clones),
//! never mutates them, and names the parser it builds after them:
//!
//! | Combinator | Name |
//! |------------|------|
//! | [`literal`] | `"text"` |
//! | [`sequence`] | `sequence(a, b)` |
//! | [`alternation`] | `alternation(a, b)` |
//! | [`repetition`] | `repetition(a)` |
//! | [`option`] | `option(a)` |
//! | [`non_empty`] | `non-empty(a)` |
//! | [`lookahead`] / [`negative_lookahead`] | `lookahead(a)` / `negative-lookahead(a)` |
//! | [`switch`] | `switch(g => b)` |
//! | [`until`] / [`not_in`] | `until(a)` / `not-in(a, b)` |
//!
//! Those names are what failures report as `expected`, so they are part of
//! the diagnostic format.
//!
//! Every failing combinator returns the cursor it was called with.

mod choice;
mod indirect;
mod lexical;
mod literal;
mod lookahead;
mod sequence;
mod switch;
mod text;
mod transform;

pub use choice::{alternation, non_empty, option, repetition};
pub use indirect::{indirect, Rule};
pub use lexical::{eof, identifier, keyword, nothing, whitespace};
pub(crate) use lexical::{is_identifier_continue, is_identifier_start};
pub use literal::{find_mismatch, literal};
pub use lookahead::{lookahead, negative_lookahead};
pub use sequence::{sequence, SequenceParsers};
pub use switch::{case, switch, SwitchCase};
pub use text::{delimited, munch, munch_while, not_in, until};
pub use transform::{transform_consumed, transform_located, transform_result, transform_success};
