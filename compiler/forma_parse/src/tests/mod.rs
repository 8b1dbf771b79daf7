//! Parser tests.
//!
//! - `combinator_tests`: each combinator's results, names and failure causes
//! - `expression_tests`: expression grammar shapes, literals and errors
//! - `template_tests`: segments, control blocks and custom syntax

mod expression_tests;
