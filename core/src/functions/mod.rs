//! Function registry.
//!
//! Operators and named functions share one representation: a [`Function`]
//! owns one or more fixed-arity [`Variant`]s, a precedence rank (lower binds
//! tighter), an associativity and a purity flag. Dispatch looks for an exact
//! parameter signature first and falls back to the first variant (in
//! declaration order) whose parameters are reachable by casting.

mod standard;

#[cfg(test)]
mod registry_test;

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use rand::RngCore;
use smallvec::SmallVec;
use tracing::trace;

use crate::casting::{self, signature_hash};
use crate::values::{LiteralKind, Value};

pub use standard::STANDARD_KEYWORDS;

/// Registry name of the synthetic unary minus operator.
///
/// The lexer rewrites a standalone `-` into this marker; it never appears in
/// user input.
pub const UNARY_MINUS: &str = "~";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    LeftToRight,
    RightToLeft,
}

/// Runtime services available to a variant while it executes.
pub struct CallContext<'a> {
    pub rng: &'a mut dyn RngCore,
    /// Upper bound on the number of dice a single `roll` may throw.
    pub max_roll_count: i64,
}

/// Computation of a variant over already-cast arguments.
///
/// Returning `Err` reports a runtime fault with the given message.
pub type VariantFn = fn(&[Value], &mut CallContext<'_>) -> Result<Value, String>;

#[derive(Debug, Clone)]
pub struct Variant {
    pub params: SmallVec<[LiteralKind; 2]>,
    pub returns: LiteralKind,
    pub apply: VariantFn,
}

pub struct Function {
    name: String,
    variants: Vec<Variant>,
    by_signature: HashMap<u64, usize>,
    allow_cast: bool,
    associativity: Associativity,
    precedence: u8,
    is_static: bool,
}

impl Function {
    pub fn new(name: impl Into<String>, precedence: u8, associativity: Associativity) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            by_signature: HashMap::new(),
            allow_cast: true,
            associativity,
            precedence,
            is_static: true,
        }
    }

    /// Add a variant. A later variant with the same signature replaces the
    /// earlier one for exact lookup.
    pub fn variant(mut self, params: &[LiteralKind], returns: LiteralKind, apply: VariantFn) -> Self {
        self.by_signature
            .insert(signature_hash(params), self.variants.len());
        self.variants.push(Variant {
            params: params.iter().copied().collect(),
            returns,
            apply,
        });
        self
    }

    /// Mark the function as drawing on randomness.
    pub fn impure(mut self) -> Self {
        self.is_static = false;
        self
    }

    /// Only accept exact signatures.
    pub fn without_casts(mut self) -> Self {
        self.allow_cast = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn precedence(&self) -> u8 {
        self.precedence
    }

    pub fn associativity(&self) -> Associativity {
        self.associativity
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Arity shared by every variant, or `None` when variants disagree.
    pub fn parameter_count(&self) -> Option<usize> {
        let (first, rest) = self.variants.split_first()?;
        let count = first.params.len();
        rest.iter()
            .all(|v| v.params.len() == count)
            .then_some(count)
    }

    pub fn resolve_variant(&self, kinds: &[LiteralKind]) -> Option<&Variant> {
        if let Some(&index) = self.by_signature.get(&signature_hash(kinds)) {
            let variant = &self.variants[index];
            if variant.params.as_slice() == kinds {
                return Some(variant);
            }
        }
        if !self.allow_cast {
            return None;
        }
        self.variants
            .iter()
            .find(|v| casting::can_cast_all(kinds, &v.params))
    }

    /// Cast `args` to the matching variant and run it.
    pub fn apply(&self, args: &[Value], ctx: &mut CallContext<'_>) -> Result<Value, FunctionError> {
        let kinds: Vec<LiteralKind> = args.iter().map(Value::kind).collect();
        let variant = self
            .resolve_variant(&kinds)
            .ok_or_else(|| FunctionError::TypeMismatch {
                name: self.name.clone(),
                kinds: kinds.clone(),
            })?;
        let cast = casting::cast_all(args, &variant.params).map_err(|_| {
            FunctionError::TypeMismatch {
                name: self.name.clone(),
                kinds: kinds.clone(),
            }
        })?;
        trace!(function = %self.name, ?kinds, "Applying variant");
        (variant.apply)(&cast, ctx).map_err(|message| FunctionError::RuntimeFault {
            name: self.name.clone(),
            kinds,
            values: args.to_vec(),
            message,
        })
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("precedence", &self.precedence)
            .field("associativity", &self.associativity)
            .field("is_static", &self.is_static)
            .field("variants", &self.variants.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FunctionError {
    #[error("function \"{name}\" has no variant accepting [ {} ]", join(.kinds))]
    TypeMismatch { name: String, kinds: Vec<LiteralKind> },
    #[error("function \"{name}\" with parameter types [ {} ], given [ {} ], failed: {message}", join(.kinds), join(.values))]
    RuntimeFault {
        name: String,
        kinds: Vec<LiteralKind>,
        values: Vec<Value>,
        message: String,
    },
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Named functions and operators available to the lexer and evaluator.
///
/// The registry is filled once when an engine is built and shared through
/// `Arc`s afterwards.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<Function>>,
}

impl FunctionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog: arithmetic operators, rounding, `max`/`min`,
    /// `sqrt`, and the impure `random` and `roll`.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        standard::register_all(&mut registry);
        registry
    }

    /// Register `function`, replacing any function with the same name.
    pub fn register(&mut self, function: Function) -> Arc<Function> {
        let function = Arc::new(function);
        self.functions
            .insert(function.name.clone(), Arc::clone(&function));
        function
    }

    pub fn get(&self, name: &str) -> Option<Arc<Function>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Whether `word` lexes as a function call keyword.
    ///
    /// Operators are single punctuation characters and never qualify.
    pub fn is_keyword(&self, word: &str) -> bool {
        word.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && self.contains(word)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
