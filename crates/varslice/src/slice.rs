// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Slice syntax: `start:stop:step` per dimension, dimensions separated by
//! commas. Every bound is an integer expression evaluated in the inspected
//! process, so `v[0:n/2]` works when `n` is a local.

use crate::error::ExtractError;
use crate::target::TargetValueSource;
use std::fmt;

/// Selection along one dimension. Omitted fields take slice defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceSpec {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl SliceSpec {
    /// `::`, select everything.
    pub fn full() -> Self {
        Self::default()
    }

    /// Create a slice from explicit bounds.
    pub fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        Self { start, stop, step }
    }

    /// Select exactly index `k`: `[k, k+1)`.
    pub fn index(k: i64) -> Self {
        Self::new(Some(k), Some(k.saturating_add(1)), None)
    }
}

impl fmt::Display for SliceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_default();
        write!(f, "{}:{}", part(self.start), part(self.stop))?;
        if let Some(step) = self.step {
            write!(f, ":{}", step)?;
        }
        Ok(())
    }
}

/// Parse one dimension spec (`"k"`, `"a:b"` or `"a:b:c"`).
pub fn parse_subslice(
    subslice: &str,
    source: &dyn TargetValueSource,
) -> Result<SliceSpec, ExtractError> {
    let components = subslice
        .split(':')
        .map(|c| parse_component(c, subslice, source))
        .collect::<Result<Vec<_>, _>>()?;

    match components.as_slice() {
        [Some(k)] => Ok(SliceSpec::index(*k)),
        // A lone empty component has no index to select.
        [None] => Err(ExtractError::slice_syntax(subslice)),
        [start, stop] => Ok(SliceSpec::new(*start, *stop, None)),
        [start, stop, step] => Ok(SliceSpec::new(*start, *stop, *step)),
        _ => Err(ExtractError::slice_syntax(subslice)),
    }
}

fn parse_component(
    component: &str,
    subslice: &str,
    source: &dyn TargetValueSource,
) -> Result<Option<i64>, ExtractError> {
    let component = component.trim();
    if component.is_empty() {
        return Ok(None);
    }
    let value = source
        .evaluate(component)
        .map_err(|_| ExtractError::slice_syntax(subslice))?;
    value
        .to_i64(source)
        .map(Some)
        .map_err(|_| ExtractError::slice_syntax(subslice))
}

/// Parse a full multi-dimensional slice (`"a:b:c,d:e,f"`).
pub fn parse_slice(
    full_slice: &str,
    source: &dyn TargetValueSource,
) -> Result<Vec<SliceSpec>, ExtractError> {
    full_slice
        .split(',')
        .map(|dim| parse_subslice(dim, source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::sim::{ctype, SimTarget};

    #[test]
    fn test_single_component_selects_one_index() {
        let target = SimTarget::new();
        assert_eq!(
            parse_subslice("3", &target).unwrap(),
            SliceSpec::new(Some(3), Some(4), None)
        );
    }

    #[test]
    fn test_two_and_three_components() {
        let target = SimTarget::new();
        assert_eq!(
            parse_subslice("1:4", &target).unwrap(),
            SliceSpec::new(Some(1), Some(4), None)
        );
        assert_eq!(
            parse_subslice("::-1", &target).unwrap(),
            SliceSpec::new(None, None, Some(-1))
        );
        assert_eq!(parse_subslice(":", &target).unwrap(), SliceSpec::full());
    }

    #[test]
    fn test_components_are_expressions() {
        let mut target = SimTarget::new();
        target.define("n", ctype("int").unwrap(), &10i32.to_le_bytes());

        let spec = parse_subslice(" n/2 : n : 2 ", &target).unwrap();
        assert_eq!(spec, SliceSpec::new(Some(5), Some(10), Some(2)));
    }

    #[test]
    fn test_bad_component_count() {
        let target = SimTarget::new();
        let err = parse_subslice("1:2:3:4", &target).unwrap_err();
        assert!(matches!(err, ExtractError::SliceSyntax { ref spec } if spec == "1:2:3:4"));
        assert!(parse_subslice("", &target).is_err());
    }

    #[test]
    fn test_non_integer_component() {
        let mut target = SimTarget::new();
        target.define("x", ctype("double").unwrap(), &1.5f64.to_le_bytes());

        assert!(matches!(
            parse_subslice("0:x", &target),
            Err(ExtractError::SliceSyntax { .. })
        ));
        assert!(matches!(
            parse_subslice("0:undefined", &target),
            Err(ExtractError::SliceSyntax { .. })
        ));
    }

    #[test]
    fn test_parse_multi_dimensional() {
        let target = SimTarget::new();
        let slices = parse_slice("0:2,1:3,4", &target).unwrap();
        assert_eq!(
            slices,
            vec![
                SliceSpec::new(Some(0), Some(2), None),
                SliceSpec::new(Some(1), Some(3), None),
                SliceSpec::index(4),
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(SliceSpec::new(Some(1), None, Some(2)).to_string(), "1::2");
        assert_eq!(SliceSpec::full().to_string(), ":");
        assert_eq!(SliceSpec::index(-1).to_string(), "-1:0");
    }
}
