// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Variable references: `name`, `name[slice]`, `obj.field[a:b, c]`.
//!
//! The trailing bracket pair is the slice; everything before it is handed
//! to the debugger as an expression. Only the last `[` and last `]` are
//! considered, so a base expression containing its own subscript
//! (`grid[i][0:4]`) is split correctly but a slice can never contain
//! brackets.

use crate::config::ExtractConfig;
use crate::dense::{densify, DenseArray};
use crate::engine::{Extractor, Nested};
use crate::error::ExtractError;
use crate::handler::TypeSet;
use crate::slice::{parse_slice, SliceSpec};
use crate::target::TargetValueSource;

/// Split a reference into its base expression and slice text.
///
/// A reference without a `[ ... ]` pair, or whose last `]` comes before its
/// last `[`, has no slice.
pub fn split_variable_and_slice(reference: &str) -> (&str, Option<&str>) {
    match (reference.rfind('['), reference.rfind(']')) {
        (Some(open), Some(close)) if open < close => {
            (&reference[..open], Some(&reference[open + 1..close]))
        }
        _ => (reference, None),
    }
}

/// Split and parse a reference. An empty slice (`v[]`) means no slicing.
pub fn parse_var<'r>(
    reference: &'r str,
    source: &dyn TargetValueSource,
) -> Result<(&'r str, Vec<SliceSpec>), ExtractError> {
    let (base, slice) = split_variable_and_slice(reference);
    let slices = match slice.map(str::trim) {
        Some(text) if !text.is_empty() => parse_slice(text, source)?,
        _ => Vec::new(),
    };
    Ok((base.trim(), slices))
}

/// Identifier-safe name for a reference (`m.data[0:4]` -> `mdata04`).
pub fn array_name(reference: &str) -> String {
    reference
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Resolves variable references into dense arrays.
pub struct VariableResolver<'a> {
    source: &'a dyn TargetValueSource,
    types: &'a TypeSet,
    config: ExtractConfig,
}

impl<'a> VariableResolver<'a> {
    /// Resolver with the default configuration.
    pub fn new(source: &'a dyn TargetValueSource, types: &'a TypeSet) -> Self {
        Self::with_config(source, types, ExtractConfig::default())
    }

    pub fn with_config(
        source: &'a dyn TargetValueSource,
        types: &'a TypeSet,
        config: ExtractConfig,
    ) -> Self {
        Self {
            source,
            types,
            config,
        }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Resolve a reference without densifying.
    pub fn resolve_nested(&self, reference: &str) -> Result<Nested, ExtractError> {
        let (base, slices) = parse_var(reference, self.source)?;
        let value = self
            .source
            .evaluate(base)
            .map_err(|source| ExtractError::Expression {
                expr: base.to_string(),
                source,
            })?;

        log::debug!(
            "[RESOLVE] {} ({}) with {} slice(s)",
            base,
            value.ty(),
            slices.len()
        );

        let extractor = Extractor::new(self.source, self.types, &self.config);
        let nested = extractor.extract_value(&value, &slices)?;
        log::trace!("[RESOLVE] {} decoded {} element(s)", base, extractor.leaves());
        Ok(nested)
    }

    /// Resolve a reference into a dense array.
    pub fn resolve(&self, reference: &str) -> Result<DenseArray, ExtractError> {
        let nested = self.resolve_nested(reference)?;
        densify(&nested, self.config.squeeze)
    }

    /// Resolve whitespace-separated references, stopping at the first
    /// failure.
    pub fn resolve_all(&self, args: &str) -> Result<Vec<(String, DenseArray)>, ExtractError> {
        args.split_whitespace()
            .map(|reference| {
                self.resolve(reference)
                    .map(|array| (reference.to_string(), array))
            })
            .collect()
    }
}
