//! Structured errors for caller misuse of handles.
//!
//! The engine is total and synchronous modulo invariant violations: a
//! negative solver result is a normal query outcome, and variable overflow
//! is silently collapsed to `default_data`, not an error. What *is* an
//! error is a caller or engine bug - in practice, a stale or foreign handle
//! (a `NodeId`/`VariableId`/`BindingId` from a different `Program`, or one
//! that predates it). Those are surfaced as a structured [`EngineError`]
//! rather than a panic so an embedding type inferencer can recover a
//! diagnostic instead of losing the whole analysis process. Everything
//! else the original design's error taxonomy names (duplicate goals,
//! mismatched origin/where pairs) is made unrepresentable by construction
//! instead: `SourceSet` dedups on creation, and `add_binding`'s `(SourceSet,
//! NodeId)` pairing can't be supplied half-complete.

use crate::ids::{BindingId, NodeId, VariableId};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    UnknownNode(NodeId),
    UnknownVariable(VariableId),
    UnknownBinding(BindingId),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::UnknownNode(node) => write!(f, "node {node} does not exist in this program"),
            EngineError::UnknownVariable(variable) => {
                write!(f, "variable {variable} does not exist in this program")
            }
            EngineError::UnknownBinding(binding) => {
                write!(f, "binding {binding} does not exist in this program")
            }
        }
    }
}

impl std::error::Error for EngineError {}

pub type EngineResult<T> = Result<T, EngineError>;
