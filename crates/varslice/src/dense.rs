// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dense n-dimensional arrays built from nested extraction results.

use crate::engine::Nested;
use crate::error::ExtractError;
use crate::scalar::{Scalar, ScalarKind};
use ndarray::{ArrayD, IxDyn};
use num::complex::{Complex32, Complex64};
use std::fmt;

/// A rectangular array of one scalar kind.
#[derive(Debug, Clone, PartialEq)]
pub enum DenseArray {
    Bool(ArrayD<bool>),
    I8(ArrayD<i8>),
    I16(ArrayD<i16>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    U32(ArrayD<u32>),
    U64(ArrayD<u64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    C32(ArrayD<Complex32>),
    C64(ArrayD<Complex64>),
}

macro_rules! each_array {
    ($self:expr, $a:ident => $body:expr) => {
        match $self {
            DenseArray::Bool($a) => $body,
            DenseArray::I8($a) => $body,
            DenseArray::I16($a) => $body,
            DenseArray::I32($a) => $body,
            DenseArray::I64($a) => $body,
            DenseArray::U8($a) => $body,
            DenseArray::U16($a) => $body,
            DenseArray::U32($a) => $body,
            DenseArray::U64($a) => $body,
            DenseArray::F32($a) => $body,
            DenseArray::F64($a) => $body,
            DenseArray::C32($a) => $body,
            DenseArray::C64($a) => $body,
        }
    };
}

impl DenseArray {
    /// Length of each axis.
    pub fn shape(&self) -> &[usize] {
        each_array!(self, a => a.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        each_array!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element kind.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::I8(_) => ScalarKind::I8,
            Self::I16(_) => ScalarKind::I16,
            Self::I32(_) => ScalarKind::I32,
            Self::I64(_) => ScalarKind::I64,
            Self::U8(_) => ScalarKind::U8,
            Self::U16(_) => ScalarKind::U16,
            Self::U32(_) => ScalarKind::U32,
            Self::U64(_) => ScalarKind::U64,
            Self::F32(_) => ScalarKind::F32,
            Self::F64(_) => ScalarKind::F64,
            Self::C32(_) => ScalarKind::C32,
            Self::C64(_) => ScalarKind::C64,
        }
    }

    pub fn is_complex(&self) -> bool {
        self.kind().is_complex()
    }

    /// Fail with a shape error unless the array has one of `allowed`
    /// dimensionalities.
    pub fn ensure_ndim(&self, allowed: &[usize], what: &str) -> Result<(), ExtractError> {
        if allowed.contains(&self.ndim()) {
            return Ok(());
        }
        Err(ExtractError::shape(format!(
            "{} needs {} dimension(s), got shape {:?}",
            what,
            allowed
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(" or "),
            self.shape()
        )))
    }

    /// Real values widened to `f64`; `None` for complex arrays.
    pub fn to_f64(&self) -> Option<ArrayD<f64>> {
        Some(match self {
            Self::Bool(a) => a.mapv(|v| f64::from(u8::from(v))),
            Self::I8(a) => a.mapv(f64::from),
            Self::I16(a) => a.mapv(f64::from),
            Self::I32(a) => a.mapv(f64::from),
            Self::I64(a) => a.mapv(|v| v as f64),
            Self::U8(a) => a.mapv(f64::from),
            Self::U16(a) => a.mapv(f64::from),
            Self::U32(a) => a.mapv(f64::from),
            Self::U64(a) => a.mapv(|v| v as f64),
            Self::F32(a) => a.mapv(f64::from),
            Self::F64(a) => a.clone(),
            Self::C32(_) | Self::C64(_) => return None,
        })
    }
}

impl fmt::Display for DenseArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        each_array!(self, a => write!(f, "{}", a))
    }
}

/// Shape implied by the first element at every depth.
fn probe_shape(nested: &Nested) -> Vec<usize> {
    let mut shape = Vec::new();
    let mut node = nested;
    while let Nested::List(items) = node {
        shape.push(items.len());
        match items.first() {
            Some(first) => node = first,
            None => break,
        }
    }
    shape
}

fn collect_leaves<'n>(
    node: &'n Nested,
    shape: &[usize],
    out: &mut Vec<&'n Scalar>,
) -> Result<(), ExtractError> {
    match (node, shape.split_first()) {
        (Nested::Leaf(scalar), None) => {
            out.push(scalar);
            Ok(())
        }
        (Nested::List(items), Some((len, rest))) if items.len() == *len => {
            items.iter().try_for_each(|item| collect_leaves(item, rest, out))
        }
        _ => Err(ExtractError::shape("elements have irregular lengths")),
    }
}

/// Convert a nested result into a dense array.
///
/// Every list at a given depth must have the same length and every leaf the
/// same kind. With `squeeze`, axes of length 1 are dropped; a single scalar
/// becomes a zero-dimensional array. An empty selection yields an empty
/// `f64` array.
pub fn densify(nested: &Nested, squeeze: bool) -> Result<DenseArray, ExtractError> {
    let shape = probe_shape(nested);
    let mut leaves = Vec::new();
    collect_leaves(nested, &shape, &mut leaves)?;

    let shape: Vec<usize> = if squeeze {
        shape.into_iter().filter(|len| *len != 1).collect()
    } else {
        shape
    };

    let Some(kind) = leaves.first().map(|s| s.kind()) else {
        let empty = ArrayD::from_shape_vec(IxDyn(&shape), Vec::new())
            .map_err(|e| ExtractError::shape(e.to_string()))?;
        return Ok(DenseArray::F64(empty));
    };
    if let Some(other) = leaves.iter().find(|s| s.kind() != kind) {
        return Err(ExtractError::shape(format!(
            "mixed element kinds {} and {}",
            kind.name(),
            other.kind().name()
        )));
    }

    macro_rules! build {
        ($variant:ident) => {{
            let data = leaves
                .iter()
                .filter_map(|s| match s {
                    Scalar::$variant(v) => Some(*v),
                    _ => None,
                })
                .collect();
            DenseArray::$variant(
                ArrayD::from_shape_vec(IxDyn(&shape), data)
                    .map_err(|e| ExtractError::shape(e.to_string()))?,
            )
        }};
    }

    Ok(match kind {
        ScalarKind::Bool => build!(Bool),
        ScalarKind::I8 => build!(I8),
        ScalarKind::I16 => build!(I16),
        ScalarKind::I32 => build!(I32),
        ScalarKind::I64 => build!(I64),
        ScalarKind::U8 => build!(U8),
        ScalarKind::U16 => build!(U16),
        ScalarKind::U32 => build!(U32),
        ScalarKind::U64 => build!(U64),
        ScalarKind::F32 => build!(F32),
        ScalarKind::F64 => build!(F64),
        ScalarKind::C32 => build!(C32),
        ScalarKind::C64 => build!(C64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(v: i32) -> Nested {
        Nested::Leaf(Scalar::I32(v))
    }

    fn row(values: &[i32]) -> Nested {
        Nested::List(values.iter().copied().map(leaf).collect())
    }

    #[test]
    fn test_two_dimensional() {
        let nested = Nested::List(vec![row(&[1, 2]), row(&[4, 5])]);
        let dense = densify(&nested, true).unwrap();

        assert_eq!(dense.shape(), &[2, 2]);
        assert_eq!(dense.kind(), ScalarKind::I32);
        let DenseArray::I32(a) = dense else {
            panic!("expected int32 array");
        };
        assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_squeeze_drops_unit_axes() {
        let nested = Nested::List(vec![row(&[1, 2, 3, 4, 5])]);
        assert_eq!(densify(&nested, true).unwrap().shape(), &[5]);
        assert_eq!(densify(&nested, false).unwrap().shape(), &[1, 5]);
    }

    #[test]
    fn test_scalar_is_zero_dimensional() {
        let dense = densify(&leaf(-7), true).unwrap();
        assert_eq!(dense.ndim(), 0);
        assert_eq!(dense.len(), 1);
        assert_eq!(dense.to_f64().unwrap().into_raw_vec(), vec![-7.0]);
    }

    #[test]
    fn test_irregular_rejected() {
        let nested = Nested::List(vec![row(&[1, 2]), row(&[3])]);
        assert!(matches!(densify(&nested, true), Err(ExtractError::Shape { .. })));

        let nested = Nested::List(vec![row(&[1]), leaf(2)]);
        assert!(matches!(densify(&nested, true), Err(ExtractError::Shape { .. })));
    }

    #[test]
    fn test_mixed_kinds_rejected() {
        let nested = Nested::List(vec![leaf(1), Nested::Leaf(Scalar::F64(2.0))]);
        let err = densify(&nested, true).unwrap_err();
        assert!(err.to_string().contains("mixed element kinds"));
    }

    #[test]
    fn test_empty_selection() {
        let nested = Nested::List(vec![]);
        let dense = densify(&nested, true).unwrap();
        assert!(dense.is_empty());
        assert_eq!(dense.shape(), &[0]);
        assert_eq!(dense.kind(), ScalarKind::F64);

        let nested = Nested::List(vec![row(&[]), row(&[])]);
        assert_eq!(densify(&nested, true).unwrap().shape(), &[2, 0]);
    }

    #[test]
    fn test_ensure_ndim() {
        let dense = densify(&Nested::List(vec![row(&[1, 2]), row(&[3, 4])]), true).unwrap();
        assert!(dense.ensure_ndim(&[2], "image").is_ok());
        let err = dense.ensure_ndim(&[1], "plot").unwrap_err();
        assert!(err.to_string().contains("plot needs 1 dimension(s)"));
    }

    #[test]
    fn test_complex_has_no_real_view() {
        let nested = Nested::Leaf(Scalar::C64(Complex64::new(1.0, 2.0)));
        let dense = densify(&nested, true).unwrap();
        assert!(dense.is_complex());
        assert!(dense.to_f64().is_none());
    }
}
