//! Variable lookup during simplification.
//!
//! Callers hand in a flat [`Variables`] map. Binding constructs (`lambda`,
//! `for`, `with`) must not substitute outer values for the names they bind,
//! so the simplifier walks a [`Scope`]: the caller's map with a stack of
//! hidden names on top. Hiding borrows the parent scope instead of copying
//! the map.

use forma_ir::Value;
use rustc_hash::FxHashMap;

/// Variable bindings supplied by the caller.
pub type Variables = FxHashMap<String, Value>;

/// Read-only view of the variables visible at one point of a tree.
#[derive(Clone, Copy, Debug)]
pub enum Scope<'a> {
    Root(&'a Variables),
    /// `parent` minus `names`.
    Hiding {
        parent: &'a Scope<'a>,
        names: &'a [String],
    },
}

impl<'a> Scope<'a> {
    pub fn new(variables: &'a Variables) -> Self {
        Scope::Root(variables)
    }

    pub fn get(&self, name: &str) -> Option<&'a Value> {
        match *self {
            Scope::Root(variables) => variables.get(name),
            Scope::Hiding { parent, names } => {
                if names.iter().any(|n| n == name) {
                    None
                } else {
                    parent.get(name)
                }
            }
        }
    }

    /// This scope with `names` shadowed.
    pub fn without<'b>(&'b self, names: &'b [String]) -> Scope<'b>
    where
        'a: 'b,
    {
        Scope::Hiding {
            parent: self,
            names,
        }
    }
}
