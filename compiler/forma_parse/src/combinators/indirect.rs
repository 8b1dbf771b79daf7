use std::sync::{Arc, OnceLock, Weak};

use forma_stack::ensure_sufficient_stack;

use crate::outcome::ParseResult;
use crate::parser::Parser;

/// A grammar rule that can be referenced before it is defined.
///
/// Recursive rules (parenthesized expressions, nested comments, template
/// bodies inside control blocks) reference themselves through
/// [`Rule::parser`] while being built, then [`Rule::define`] fills the slot.
///
/// References hold the slot weakly; the parser returned by `define` owns it.
/// Keep that parser (not a bare reference) as the entry point.
pub struct Rule<T> {
    name: Arc<str>,
    slot: Arc<OnceLock<Parser<T>>>,
}

impl<T: 'static> Rule<T> {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Rule {
            name: name.into(),
            slot: Arc::new(OnceLock::new()),
        }
    }

    /// Late-bound reference to this rule.
    pub fn parser(&self) -> Parser<T> {
        indirect(self)
    }

    /// Fill the rule and return its owning entry point.
    ///
    /// A rule is defined once; later calls keep the first definition.
    pub fn define(self, parser: Parser<T>) -> Parser<T> {
        if self.slot.set(parser).is_err() {
            tracing::warn!(rule = %self.name, "grammar rule defined twice; keeping the first definition");
        }
        let slot = self.slot;
        Parser::new(self.name, move |cursor| match slot.get() {
            Some(parser) => parser.parse(cursor),
            None => ParseResult::failure("defined rule", cursor.clone()),
        })
    }
}

/// Parser that resolves `rule` at parse time.
///
/// Fails with the rule's name if the rule was never defined or its owning
/// parser has been dropped.
pub fn indirect<T: 'static>(rule: &Rule<T>) -> Parser<T> {
    let slot: Weak<OnceLock<Parser<T>>> = Arc::downgrade(&rule.slot);
    let expected = Arc::clone(&rule.name);
    Parser::new(Arc::clone(&rule.name), move |cursor| {
        let target = slot.upgrade().and_then(|s| s.get().cloned());
        match target {
            Some(parser) => ensure_sufficient_stack(|| parser.parse(cursor)),
            None => ParseResult::failure(&*expected, cursor.clone()),
        }
    })
}
