//! The evaluation engine.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use super::EngineOptions;
use crate::evaluator::{self, EvalError, Evaluation, ReferenceValues, refresh_reference};
use crate::functions::{CallContext, FunctionRegistry};
use crate::lexer::{self, LexError, Lexeme};
use crate::model::{ExpressionId, ParseResult};
use crate::snapshot::{ParserSnapshot, SnapshotCache};
use crate::source::ExpressionSource;
use crate::token::{self, Reference, ReferenceError, Token};
use crate::values::Value;

/// Lexes, resolves and reduces expressions.
///
/// The engine owns:
/// - the function registry, frozen after construction
/// - the snapshot cache used by [`Engine::try_reevaluate`]
/// - the random source behind `random` and `roll`
///
/// Stores are never written through the engine; it only reads them through an
/// [`ExpressionSource`]. Persisting results and edges is the caller's job.
///
/// # Example
///
/// ```
/// use reckon_core::api::{Engine, EngineOptions};
/// use reckon_core::functions::{Associativity, Function};
/// use reckon_core::source::Detached;
/// use reckon_core::values::{LiteralKind, Value};
///
/// let mut engine = Engine::new(EngineOptions::default(), |registry| {
///     registry.register(
///         Function::new("twice", 1, Associativity::LeftToRight).variant(
///             &[LiteralKind::Integer],
///             LiteralKind::Integer,
///             |args, _| Ok(Value::Integer(args[0].as_int().unwrap_or(0) * 2)),
///         ),
///     );
/// });
///
/// let result = engine.evaluate_in("", "twice(21)", &Detached);
/// assert_eq!(result.value, Value::Integer(42));
/// ```
pub struct Engine {
    registry: FunctionRegistry,
    snapshots: SnapshotCache,
    rng: ChaCha8Rng,
    options: EngineOptions,
}

impl Engine {
    /// Create an engine with the standard functions plus whatever `init`
    /// registers.
    pub fn new(options: EngineOptions, init: impl FnOnce(&mut FunctionRegistry)) -> Self {
        Self::with_snapshots(options, init, SnapshotCache::new())
    }

    /// Create an engine around an existing snapshot cache.
    pub fn with_snapshots(
        options: EngineOptions,
        init: impl FnOnce(&mut FunctionRegistry),
        snapshots: SnapshotCache,
    ) -> Self {
        let mut registry = FunctionRegistry::standard();
        init(&mut registry);
        let rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            registry,
            snapshots,
            rng,
            options,
        }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn snapshots(&self) -> &SnapshotCache {
        &self.snapshots
    }

    /// Split `text` using the registered function names as keywords.
    pub fn lex(&self, text: &str) -> Result<Vec<Lexeme>, LexError> {
        lexer::lex_with(text, |word| self.registry.is_keyword(word))
    }

    /// Lex and resolve `text` as it would be inside `group_path`.
    pub fn tokenize(
        &self,
        text: &str,
        group_path: &str,
        source: &dyn ExpressionSource,
    ) -> Result<Vec<Token>, EvalError> {
        self.lex(text)?
            .iter()
            .map(|lexeme| token::resolve(lexeme, &self.registry, source, group_path))
            .collect()
    }

    /// Evaluate `text` as the new text of expression `id`.
    ///
    /// References to `id` itself or to any expression already depending on
    /// `id` are rejected before any value is pulled.
    pub fn try_evaluate(
        &mut self,
        id: ExpressionId,
        text: &str,
        source: &dyn ExpressionSource,
    ) -> Result<Evaluation, EvalError> {
        let group_path = source.current_group_path(id);
        self.evaluate_text(Some(id), text, &group_path, source, 0)
    }

    pub fn evaluate(
        &mut self,
        id: ExpressionId,
        text: &str,
        source: &dyn ExpressionSource,
    ) -> ParseResult {
        fold(self.try_evaluate(id, text, source))
    }

    /// Evaluate text that belongs to no expression, as if it lived in
    /// `group_path`. Nothing is cached.
    pub fn try_evaluate_in(
        &mut self,
        group_path: &str,
        text: &str,
        source: &dyn ExpressionSource,
    ) -> Result<Evaluation, EvalError> {
        self.evaluate_text(None, text, group_path, source, 0)
    }

    pub fn evaluate_in(
        &mut self,
        group_path: &str,
        text: &str,
        source: &dyn ExpressionSource,
    ) -> ParseResult {
        fold(self.try_evaluate_in(group_path, text, source))
    }

    /// Evaluate the persisted text of `id` again.
    ///
    /// When a snapshot for the same text exists, lexing and resolution are
    /// skipped and only reference values are refreshed.
    pub fn try_reevaluate(
        &mut self,
        id: ExpressionId,
        source: &dyn ExpressionSource,
    ) -> Result<Evaluation, EvalError> {
        self.reevaluate_at(id, source, 0)
    }

    pub fn reevaluate(&mut self, id: ExpressionId, source: &dyn ExpressionSource) -> ParseResult {
        fold(self.try_reevaluate(id, source))
    }

    /// Drop the snapshot of a deleted expression.
    pub fn forget(&mut self, id: ExpressionId) {
        self.snapshots.remove(id);
    }

    /// Record that the text of `id` changed without changing its meaning.
    pub fn retext(&mut self, id: ExpressionId, text: &str) {
        self.snapshots.retext(id, text);
    }

    fn reevaluate_at(
        &mut self,
        id: ExpressionId,
        source: &dyn ExpressionSource,
        depth: usize,
    ) -> Result<Evaluation, EvalError> {
        let expression = source
            .fetch(id)
            .ok_or(ReferenceError::Missing { id })?;

        let replay = self
            .snapshots
            .get(id)
            .filter(|snapshot| snapshot.text == expression.text)
            .cloned();
        let Some(snapshot) = replay else {
            trace!(%id, "Snapshot miss");
            let group_path = source.current_group_path(id);
            return self.evaluate_text(Some(id), &expression.text, &group_path, source, depth);
        };

        trace!(%id, "Snapshot hit");
        let tokens = self.refresh(&snapshot.tokens, source, depth)?;
        let is_static = tokens.iter().all(Token::is_static);
        let value = self.reduce(&tokens)?;
        let evaluation = Evaluation {
            value,
            is_static,
            global: snapshot.global.clone(),
            local: snapshot.local.clone(),
        };
        self.snapshots.store(
            id,
            ParserSnapshot {
                tokens,
                is_static,
                ..snapshot
            },
        );
        Ok(evaluation)
    }

    fn evaluate_text(
        &mut self,
        id: Option<ExpressionId>,
        text: &str,
        group_path: &str,
        source: &dyn ExpressionSource,
        depth: usize,
    ) -> Result<Evaluation, EvalError> {
        if text.trim().is_empty() {
            if let Some(id) = id {
                self.snapshots.remove(id);
            }
            return Ok(Evaluation::empty());
        }

        let tokens = self.tokenize(text, group_path, source)?;
        let (global, local) = token::dependencies(&tokens);

        if let Some(id) = id {
            check_references(id, &global, &local, source)?;
        }

        let tokens = self.refresh(&tokens, source, depth)?;
        let is_static = tokens.iter().all(Token::is_static);
        let value = self.reduce(&tokens)?;
        debug!(?id, %value, is_static, "Evaluated expression");

        if let Some(id) = id {
            self.snapshots.store(
                id,
                ParserSnapshot {
                    text: text.to_string(),
                    tokens,
                    is_static,
                    global: global.clone(),
                    local: local.clone(),
                },
            );
        }

        Ok(Evaluation {
            value,
            is_static,
            global,
            local,
        })
    }

    fn refresh(
        &mut self,
        tokens: &[Token],
        source: &dyn ExpressionSource,
        depth: usize,
    ) -> Result<Vec<Token>, EvalError> {
        let mut refresher = Refresher {
            engine: self,
            source,
            depth,
        };
        tokens
            .iter()
            .map(|token| refresh_reference(token, &mut refresher))
            .collect()
    }

    fn reduce(&mut self, tokens: &[Token]) -> Result<Value, EvalError> {
        let mut ctx = CallContext {
            rng: &mut self.rng,
            max_roll_count: self.options.max_roll_count,
        };
        evaluator::reduce(tokens, &mut ctx)
    }
}

/// Reject self references and references that would close a cycle.
fn check_references(
    id: ExpressionId,
    global: &[ExpressionId],
    local: &[ExpressionId],
    source: &dyn ExpressionSource,
) -> Result<(), EvalError> {
    let dependencies: Vec<ExpressionId> = global.iter().chain(local).copied().collect();
    if dependencies.contains(&id) {
        return Err(EvalError::SelfReference { id });
    }
    if dependencies.is_empty() {
        return Ok(());
    }
    let conflicts = source.overlap(id, &dependencies);
    if !conflicts.is_empty() {
        return Err(EvalError::CyclicDependency { id, conflicts });
    }
    Ok(())
}

fn fold(result: Result<Evaluation, EvalError>) -> ParseResult {
    match result {
        Ok(evaluation) => evaluation.into(),
        Err(err) => {
            debug!(%err, "Evaluation failed");
            err.into()
        }
    }
}

/// Pulls reference values out of the store, reevaluating impure or stale
/// targets on the spot.
struct Refresher<'e, 's> {
    engine: &'e mut Engine,
    source: &'s dyn ExpressionSource,
    depth: usize,
}

impl ReferenceValues for Refresher<'_, '_> {
    fn current(&mut self, reference: &Reference) -> Result<(Value, bool), EvalError> {
        let target = self
            .source
            .fetch(reference.target)
            .ok_or(ReferenceError::Missing {
                id: reference.target,
            })?;
        if target.result.is_error() {
            return Err(ReferenceError::Failed {
                path: reference.path.display(),
                message: target.result.error_text,
            }
            .into());
        }
        if target.result.is_static && target.updated {
            return Ok((target.result.value, true));
        }

        let max_depth = self.engine.options.max_depth;
        if self.depth >= max_depth {
            return Err(EvalError::DepthExceeded {
                depth: self.depth + 1,
                max_depth,
            });
        }
        let evaluation = self
            .engine
            .reevaluate_at(reference.target, self.source, self.depth + 1)?;
        Ok((evaluation.value, evaluation.is_static))
    }
}
