// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use super::RuntimeState;

/// A named boolean condition over [`RuntimeState`].
#[derive(Clone, Copy)]
pub enum Condition {
    SessionExists,
    EagerExecutionEnabled,
    SessionInitialized,
    /// Host-defined condition.
    Custom {
        name: &'static str,
        eval: fn(&RuntimeState) -> bool,
    },
}

impl Condition {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionExists => "session_exists",
            Self::EagerExecutionEnabled => "eager_execution_enabled",
            Self::SessionInitialized => "session_initialized",
            Self::Custom { name, .. } => *name,
        }
    }

    pub fn eval(&self, state: &RuntimeState) -> bool {
        match self {
            Self::SessionExists => state.session_exists,
            Self::EagerExecutionEnabled => state.eager_execution_enabled,
            Self::SessionInitialized => state.session_initialized,
            Self::Custom { eval, .. } => eval(state),
        }
    }
}

/// Composable predicate. Build with `&`, `|` and `!`:
///
/// ```
/// use globalfn::core::dispatch::Predicate;
///
/// let lazy = Predicate::session_exists()
///     & !Predicate::eager_execution_enabled()
///     & !Predicate::session_initialized();
/// assert_eq!(
///     lazy.to_string(),
///     "((session_exists & !eager_execution_enabled) & !session_initialized)"
/// );
/// ```
#[derive(Clone)]
pub enum Predicate {
    Condition(Condition),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn session_exists() -> Self {
        Self::Condition(Condition::SessionExists)
    }

    pub fn eager_execution_enabled() -> Self {
        Self::Condition(Condition::EagerExecutionEnabled)
    }

    pub fn session_initialized() -> Self {
        Self::Condition(Condition::SessionInitialized)
    }

    pub fn custom(name: &'static str, eval: fn(&RuntimeState) -> bool) -> Self {
        Self::Condition(Condition::Custom { name, eval })
    }

    pub fn eval(&self, state: &RuntimeState) -> bool {
        match self {
            Self::Condition(c) => c.eval(state),
            Self::And(a, b) => a.eval(state) && b.eval(state),
            Self::Or(a, b) => a.eval(state) || b.eval(state),
            Self::Not(p) => !p.eval(state),
        }
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(rhs))
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Condition(c) => f.write_str(c.name()),
            Self::And(a, b) => write!(f, "({} & {})", a, b),
            Self::Or(a, b) => write!(f, "({} | {})", a, b),
            Self::Not(p) => write!(f, "!{}", p),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
