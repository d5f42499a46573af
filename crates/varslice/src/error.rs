// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Extraction errors.
//!
//! Every failure is terminal for the current extraction call and carries the
//! textual fragment (slice spec, expression or type name) the user typed or
//! the debugger reported, so the command layer can print it and carry on.

use thiserror::Error;

use crate::target::TargetError;

/// Errors produced while resolving, slicing, walking or densifying a value.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Malformed slice text: wrong component count, non-integer component,
    /// or a zero step.
    #[error("Invalid slice component: {spec}")]
    SliceSyntax { spec: String },

    /// A base variable or slice expression failed to evaluate.
    #[error("Invalid expression `{expr}`: {source}")]
    Expression {
        expr: String,
        #[source]
        source: TargetError,
    },

    /// No registered handler accepts a type met during traversal.
    #[error("Cannot handle type: {type_name}")]
    UnknownType { type_name: String },

    /// The result's shape is unsuitable for the caller.
    #[error("Unsuitable shape: {message}")]
    Shape { message: String },

    /// Memory or layout failure while walking an already resolved value.
    #[error(transparent)]
    Target(#[from] TargetError),
}

impl ExtractError {
    pub(crate) fn slice_syntax(spec: impl Into<String>) -> Self {
        Self::SliceSyntax { spec: spec.into() }
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }
}
