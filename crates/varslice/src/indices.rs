// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Index sequences for one sliced dimension.

use crate::error::ExtractError;
use crate::slice::SliceSpec;

/// Resolved `start`/`stop`/`step` for one dimension.
///
/// `DimIndices` is `Copy`; every call to `into_iter()` starts over, so the
/// same selection can be walked once per parent element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimIndices {
    start: i64,
    stop: i64,
    step: i64,
}

impl DimIndices {
    /// Resolve `spec` against a dimension of `len` elements.
    ///
    /// A known length counts negative bounds from the end and clamps them to
    /// the dimension. An unknown length (pointer dimensions) takes bounds
    /// verbatim, and an omitted stop selects nothing.
    pub fn new(spec: &SliceSpec, len: Option<usize>) -> Result<Self, ExtractError> {
        let step = spec.step.unwrap_or(1);
        if step == 0 {
            return Err(ExtractError::slice_syntax(spec.to_string()));
        }

        let (start, stop) = match len {
            None => (spec.start.unwrap_or(0), spec.stop.unwrap_or(0)),
            Some(len) => {
                let len = i64::try_from(len).unwrap_or(i64::MAX);
                let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
                let clamp = |bound: i64| {
                    if bound < 0 {
                        (bound + len).max(lower)
                    } else {
                        bound.min(upper)
                    }
                };
                let start = spec
                    .start
                    .map_or(if step < 0 { upper } else { lower }, clamp);
                let stop = spec
                    .stop
                    .map_or(if step < 0 { lower } else { upper }, clamp);
                (start, stop)
            }
        };

        Ok(Self { start, stop, step })
    }

    /// Number of indices in the sequence.
    pub fn len(&self) -> usize {
        let span = if self.step > 0 {
            self.stop.saturating_sub(self.start)
        } else {
            self.start.saturating_sub(self.stop)
        };
        if span <= 0 {
            return 0;
        }
        let step = self.step.unsigned_abs();
        usize::try_from((span as u64).div_ceil(step)).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IntoIterator for DimIndices {
    type Item = i64;
    type IntoIter = DimIndicesIter;

    fn into_iter(self) -> DimIndicesIter {
        DimIndicesIter {
            next: self.start,
            stop: self.stop,
            step: self.step,
        }
    }
}

/// Iterator over a [`DimIndices`].
#[derive(Debug, Clone)]
pub struct DimIndicesIter {
    next: i64,
    stop: i64,
    step: i64,
}

impl Iterator for DimIndicesIter {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let in_range = if self.step > 0 {
            self.next < self.stop
        } else {
            self.next > self.stop
        };
        if !in_range {
            return None;
        }
        let current = self.next;
        match self.next.checked_add(self.step) {
            Some(next) => self.next = next,
            None => self.next = self.stop,
        }
        Some(current)
    }
}
