// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recursive extraction.
//!
//! A value is walked handler by handler: the first slices apply to the
//! outermost container's dimensions, the rest are handed down to every
//! element. Missing slices select everything. The result mirrors the
//! selection as nested lists of scalars.

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::handler::{Element, ExtractContext, TypeHandler, TypeSet};
use crate::indices::DimIndices;
use crate::scalar::Scalar;
use crate::slice::SliceSpec;
use crate::target::{TargetValueSource, Value};
use std::cell::Cell;

/// Extraction result before densification.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested {
    Leaf(Scalar),
    List(Vec<Nested>),
}

impl Nested {
    /// Total number of leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::List(items) => items.iter().map(Nested::leaf_count).sum(),
        }
    }
}

/// Walks values through a [`TypeSet`].
///
/// The element budget (`max_elements`) covers everything extracted through
/// one extractor.
pub struct Extractor<'a> {
    cx: ExtractContext<'a>,
    leaves: Cell<usize>,
}

impl<'a> Extractor<'a> {
    pub fn new(
        source: &'a dyn TargetValueSource,
        types: &'a TypeSet,
        config: &'a ExtractConfig,
    ) -> Self {
        Self {
            cx: ExtractContext {
                source,
                types,
                config,
            },
            leaves: Cell::new(0),
        }
    }

    /// Context handed to handlers.
    pub fn context(&self) -> &ExtractContext<'a> {
        &self.cx
    }

    /// Leaves decoded so far.
    pub fn leaves(&self) -> usize {
        self.leaves.get()
    }

    /// Extract `value` with whatever handler its canonical type selects.
    pub fn extract_value(
        &self,
        value: &Value,
        slices: &[SliceSpec],
    ) -> Result<Nested, ExtractError> {
        let ty = self.cx.source.basic_type(value.ty());
        let handler = self.cx.types.get_handler(&ty)?;
        log::debug!("[EXTRACT] {} handled by {}", ty, handler.name());
        self.extract_all(value, handler, slices)
    }

    /// Extract `value` through `handler`, applying `slices` outermost first.
    pub fn extract_all(
        &self,
        value: &Value,
        handler: &dyn TypeHandler,
        slices: &[SliceSpec],
    ) -> Result<Nested, ExtractError> {
        let dims = handler.shape(&self.cx, value)?;
        let Some(element_ty) = handler.contained_type(&self.cx, value)? else {
            let element = handler.extract(&self.cx, value, &[])?;
            return match element {
                Element::Scalar(scalar) => self.leaf(scalar),
                Element::Value(inner) => {
                    let ty = self.cx.source.basic_type(value.ty());
                    if self.cx.source.basic_type(inner.ty()).name == ty.name {
                        return Err(ExtractError::shape(format!(
                            "{} returned a {} for a {} without decoding it",
                            handler.name(),
                            inner.ty(),
                            ty
                        )));
                    }
                    self.extract_value(&inner, &[])
                }
            };
        };

        let element_ty = self.cx.source.basic_type(&element_ty);
        let element_handler = self.cx.types.get_handler(&element_ty)?;

        let split = dims.len().min(slices.len());
        let (own, remaining) = slices.split_at(split);
        let selections = dims
            .iter()
            .enumerate()
            .map(|(axis, len)| {
                let spec = own.get(axis).copied().unwrap_or_default();
                DimIndices::new(&spec, *len)
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::trace!(
            "[EXTRACT] {} -> {} over {} dim(s), {} slice(s) passed down",
            handler.name(),
            element_handler.name(),
            dims.len(),
            remaining.len()
        );

        let mut index = Vec::with_capacity(selections.len());
        self.walk(
            value,
            handler,
            element_handler,
            &selections,
            &mut index,
            remaining,
        )
    }

    fn walk(
        &self,
        value: &Value,
        handler: &dyn TypeHandler,
        element_handler: &dyn TypeHandler,
        selections: &[DimIndices],
        index: &mut Vec<i64>,
        remaining: &[SliceSpec],
    ) -> Result<Nested, ExtractError> {
        let Some((dim, inner)) = selections.split_first() else {
            return match handler.extract(&self.cx, value, index)? {
                Element::Value(element) => self.extract_all(&element, element_handler, remaining),
                Element::Scalar(scalar) => self.leaf(scalar),
            };
        };

        let mut items = Vec::with_capacity(dim.len().min(4096));
        for i in *dim {
            index.push(i);
            let item = self.walk(value, handler, element_handler, inner, index, remaining);
            index.pop();
            items.push(item?);
        }
        Ok(Nested::List(items))
    }

    fn leaf(&self, scalar: Scalar) -> Result<Nested, ExtractError> {
        let count = self.leaves.get() + 1;
        if let Some(max) = self.cx.config.max_elements {
            if count > max {
                return Err(ExtractError::shape(format!(
                    "selection exceeds the {} element budget",
                    max
                )));
            }
        }
        self.leaves.set(count);
        Ok(Nested::Leaf(scalar))
    }
}
