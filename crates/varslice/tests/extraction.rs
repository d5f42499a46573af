// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// End-to-end extraction against the in-memory target: reference text in,
// dense array out.

#![allow(clippy::float_cmp)]

use num::complex::Complex64;
use std::sync::Arc;
use varslice::target::sim::{
    array_of, complex_type, ctype, std_array_type, vector_bool_type, vector_type, SimTarget,
};
use varslice::target::StructBuilder;
use varslice::{
    split_variable_and_slice, DenseArray, Element, ExtractConfig, ExtractContext, ExtractError,
    TypeDesc, TypeHandler, TypeSet, Value, VariableResolver,
};

fn ints(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn doubles(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn int_values(array: &DenseArray) -> Vec<i32> {
    match array {
        DenseArray::I32(a) => a.iter().copied().collect(),
        other => panic!("expected int32 array, got {:?}", other.kind()),
    }
}

fn resolve(target: &SimTarget, reference: &str) -> Result<DenseArray, ExtractError> {
    let types = TypeSet::with_defaults();
    VariableResolver::new(target, &types).resolve(reference)
}

#[test]
fn test_vector_slice() {
    let mut target = SimTarget::new();
    target.define_vector("v", &ctype("int").unwrap(), &ints(&[1, 2, 3, 4, 5]));

    let array = resolve(&target, "v[1:4]").unwrap();
    assert_eq!(array.shape(), &[3]);
    assert_eq!(int_values(&array), vec![2, 3, 4]);

    let reversed = resolve(&target, "v[::-2]").unwrap();
    assert_eq!(int_values(&reversed), vec![5, 3, 1]);

    let tail = resolve(&target, "v[-2:]").unwrap();
    assert_eq!(int_values(&tail), vec![4, 5]);
}

#[test]
fn test_two_dimensional_array() {
    let mut target = SimTarget::new();
    let int = ctype("int").unwrap();
    let values: Vec<i32> = (0..9).collect();
    target.define("m", array_of(&array_of(&int, 3), 3), &ints(&values));

    let array = resolve(&target, "m[0:2,1:3]").unwrap();
    assert_eq!(array.shape(), &[2, 2]);
    assert_eq!(int_values(&array), vec![1, 2, 4, 5]);

    let column = resolve(&target, "m[:,1]").unwrap();
    assert_eq!(column.shape(), &[3]);
    assert_eq!(int_values(&column), vec![1, 4, 7]);
}

#[test]
fn test_scalar_ignores_slice_text() {
    let mut target = SimTarget::new();
    target.define("x", ctype("long").unwrap(), &(-7i64).to_le_bytes());

    for reference in ["x", "x[0:5]", "x[1,2,3]"] {
        let array = resolve(&target, reference).unwrap();
        assert_eq!(array.ndim(), 0);
        match array {
            DenseArray::I64(a) => assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![-7]),
            other => panic!("expected int64, got {:?}", other.kind()),
        }
    }
}

#[test]
fn test_slice_bounds_are_expressions() {
    let mut target = SimTarget::new();
    target.define_vector("v", &ctype("int").unwrap(), &ints(&[10, 20, 30, 40, 50, 60]));
    target.define("n", ctype("int").unwrap(), &4i32.to_le_bytes());

    let array = resolve(&target, "v[n/2 : n+1]").unwrap();
    assert_eq!(int_values(&array), vec![30, 40, 50]);
}

#[test]
fn test_nested_vectors() {
    let mut target = SimTarget::new();
    let int = ctype("int").unwrap();
    let mut rows = Vec::new();
    for row in [[1, 2, 3], [4, 5, 6]] {
        rows.extend(target.vector_image(&int, &ints(&row)));
    }
    let inner = vector_type(&int);
    let outer = target.vector_image(&inner, &rows);
    target.define("vv", vector_type(&inner), &outer);

    let all = resolve(&target, "vv").unwrap();
    assert_eq!(all.shape(), &[2, 3]);
    assert_eq!(int_values(&all), vec![1, 2, 3, 4, 5, 6]);

    let picked = resolve(&target, "vv[:, 0:3:2]").unwrap();
    assert_eq!(int_values(&picked), vec![1, 3, 4, 6]);
}

#[test]
fn test_ragged_vectors_rejected() {
    let mut target = SimTarget::new();
    let int = ctype("int").unwrap();
    let mut rows = target.vector_image(&int, &ints(&[1, 2]));
    rows.extend(target.vector_image(&int, &ints(&[3])));
    let inner = vector_type(&int);
    let outer = target.vector_image(&inner, &rows);
    target.define("ragged", vector_type(&inner), &outer);

    let err = resolve(&target, "ragged").unwrap_err();
    assert!(matches!(err, ExtractError::Shape { .. }));
    // Slicing to a common length makes it rectangular.
    assert_eq!(int_values(&resolve(&target, "ragged[:, 0:1]").unwrap()), vec![1, 3]);
}

#[test]
fn test_vector_bool() {
    let mut target = SimTarget::new();
    let bits: Vec<bool> = (0..100).map(|i| i % 7 == 0).collect();
    target.define_vector_bool("flags", &bits);

    let array = resolve(&target, "flags[60:72]").unwrap();
    let DenseArray::Bool(a) = array else {
        panic!("expected bool array");
    };
    assert_eq!(a.iter().copied().collect::<Vec<_>>(), bits[60..72].to_vec());
}

#[test]
fn test_pointer_needs_explicit_stop() {
    let mut target = SimTarget::new();
    let double = ctype("double").unwrap();
    target.define_pointer("p", &double, &doubles(&[0.5, 1.5, 2.5, 3.5]));

    let array = resolve(&target, "p[1:3]").unwrap();
    assert_eq!(array.to_f64().unwrap().into_raw_vec(), vec![1.5, 2.5]);

    let empty = resolve(&target, "p[2:]").unwrap();
    assert!(empty.is_empty());
    let empty = resolve(&target, "p").unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_huge_pointer_bounds_fail_cleanly() {
    let mut target = SimTarget::new();
    target.define_pointer("p", &ctype("int").unwrap(), &ints(&[1, 2, 3]));

    let err = resolve(&target, "p[4611686018427387904:4611686018427387905]").unwrap_err();
    assert!(matches!(err, ExtractError::Target(_)));
    let err = resolve(&target, "p[-4611686018427387904:-4611686018427387903]").unwrap_err();
    assert!(matches!(err, ExtractError::Target(_)));
}

#[test]
fn test_uninitialised_vector_bool_fails_cleanly() {
    let mut target = SimTarget::new();
    let mut image = target.vector_bool_image(&[true, true, false]);
    // _M_finish._M_p far past _M_start._M_p.
    let far = target.pointer_bytes(0x7fff_ffff_ffff_f000);
    image[16..24].copy_from_slice(&far);
    target.define("g", vector_bool_type(), &image);

    assert!(resolve(&target, "g[0:1]").is_err());
    assert!(resolve(&target, "g").is_err());
}

#[test]
fn test_std_array_of_complex() {
    let mut target = SimTarget::new();
    let cplx = complex_type(&ctype("double").unwrap());
    let bytes = doubles(&[1.0, 2.0, -0.5, 4.0, 3.0, -1.25]);
    target.define("z", std_array_type(&cplx, 3), &bytes);

    let array = resolve(&target, "z[1:]").unwrap();
    assert!(array.is_complex());
    let DenseArray::C64(a) = array else {
        panic!("expected complex128 array");
    };
    assert_eq!(
        a.iter().copied().collect::<Vec<_>>(),
        vec![Complex64::new(-0.5, 4.0), Complex64::new(3.0, -1.25)]
    );
}

#[test]
fn test_outer_unit_dimension_squeezed() {
    let mut target = SimTarget::new();
    let int = ctype("int").unwrap();
    let values: Vec<i32> = (0..10).collect();
    target.define("m", array_of(&array_of(&int, 5), 2), &ints(&values));

    let array = resolve(&target, "m[1]").unwrap();
    assert_eq!(array.shape(), &[5]);
    assert_eq!(int_values(&array), vec![5, 6, 7, 8, 9]);

    let types = TypeSet::with_defaults();
    let config = ExtractConfig {
        squeeze: false,
        ..ExtractConfig::default()
    };
    let kept = VariableResolver::with_config(&target, &types, config)
        .resolve("m[1]")
        .unwrap();
    assert_eq!(kept.shape(), &[1, 5]);
}

#[test]
fn test_element_budget() {
    let mut target = SimTarget::new();
    target.define_pointer("p", &ctype("int").unwrap(), &ints(&[0; 16]));
    let types = TypeSet::with_defaults();
    let resolver = VariableResolver::with_config(
        &target,
        &types,
        ExtractConfig::default().with_max_elements(8),
    );

    assert_eq!(resolver.resolve("p[0:8]").unwrap().len(), 8);
    let err = resolver.resolve("p[0:1000000]").unwrap_err();
    assert!(matches!(err, ExtractError::Shape { .. }));
}

#[test]
fn test_split_examples() {
    assert_eq!(split_variable_and_slice("arr[1:3]"), ("arr", Some("1:3")));
    assert_eq!(split_variable_and_slice("arr"), ("arr", None));
}

/// Exposes `Point { x, y }` as a two-element sequence.
struct PointHandler;

impl TypeHandler for PointHandler {
    fn name(&self) -> &'static str {
        "Point"
    }

    fn can_handle(&self, ty: &TypeDesc) -> bool {
        ty.name == "Point"
    }

    fn shape(
        &self,
        _cx: &ExtractContext<'_>,
        _value: &Value,
    ) -> Result<Vec<Option<usize>>, ExtractError> {
        Ok(vec![Some(2)])
    }

    fn contained_type(
        &self,
        _cx: &ExtractContext<'_>,
        value: &Value,
    ) -> Result<Option<Arc<TypeDesc>>, ExtractError> {
        Ok(value.ty().field("x").map(|f| Arc::clone(&f.type_desc)))
    }

    fn extract(
        &self,
        _cx: &ExtractContext<'_>,
        value: &Value,
        index: &[i64],
    ) -> Result<Element, ExtractError> {
        let field = if index[0] == 0 { "x" } else { "y" };
        Ok(Element::Value(value.field(field)?))
    }
}

#[test]
fn test_unknown_type_then_custom_handler() {
    let int = ctype("int").unwrap();
    let point = Arc::new(
        StructBuilder::new("Point")
            .field("x", Arc::clone(&int))
            .field("y", int)
            .build(),
    );
    let mut target = SimTarget::new();
    target.define("pts", array_of(&point, 2), &ints(&[1, 2, 3, 4]));

    let mut types = TypeSet::with_defaults();
    let err = VariableResolver::new(&target, &types)
        .resolve("pts")
        .unwrap_err();
    assert!(matches!(err, ExtractError::UnknownType { ref type_name } if type_name == "Point"));

    types.register(PointHandler);
    let array = VariableResolver::new(&target, &types)
        .resolve("pts[:, 1]")
        .unwrap();
    assert_eq!(int_values(&array), vec![2, 4]);
}

#[test]
fn test_typedef_resolves_to_handler() {
    let mut target = SimTarget::new();
    let real = Arc::new(TypeDesc::typedef("real_t", ctype("double").unwrap()));
    target.define("r", array_of(&real, 3), &doubles(&[1.0, 2.0, 3.0]));

    let array = resolve(&target, "r[::2]").unwrap();
    assert_eq!(array.to_f64().unwrap().into_raw_vec(), vec![1.0, 3.0]);
}

/// Views a `Grid { T d[6]; }` as a 2x3 matrix of `T`.
struct GridHandler;

impl TypeHandler for GridHandler {
    fn name(&self) -> &'static str {
        "Grid"
    }

    fn can_handle(&self, ty: &TypeDesc) -> bool {
        ty.name == "Grid"
    }

    fn shape(
        &self,
        _cx: &ExtractContext<'_>,
        _value: &Value,
    ) -> Result<Vec<Option<usize>>, ExtractError> {
        Ok(vec![Some(2), Some(3)])
    }

    fn contained_type(
        &self,
        _cx: &ExtractContext<'_>,
        value: &Value,
    ) -> Result<Option<Arc<TypeDesc>>, ExtractError> {
        Ok(value
            .ty()
            .field("d")
            .and_then(|d| d.type_desc.target().cloned()))
    }

    fn extract(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
        index: &[i64],
    ) -> Result<Element, ExtractError> {
        let cell = index[0] * 3 + index[1];
        Ok(Element::Value(value.field("d")?.element(cx.source, cell)?))
    }
}

fn grid_of(cell: Arc<TypeDesc>) -> Arc<TypeDesc> {
    Arc::new(StructBuilder::new("Grid").field("d", array_of(&cell, 6)).build())
}

#[test]
fn test_handler_owning_two_dimensions() {
    let mut target = SimTarget::new();
    let int = ctype("int").unwrap();
    target.define("g", grid_of(Arc::clone(&int)), &ints(&[0, 1, 2, 3, 4, 5]));
    let pairs: Vec<i32> = (0..12).collect();
    target.define("h", grid_of(array_of(&int, 2)), &ints(&pairs));

    let mut types = TypeSet::with_defaults();
    types.register(GridHandler);
    let resolver = VariableResolver::new(&target, &types);

    let array = resolver.resolve("g[:, 1:3]").unwrap();
    assert_eq!(array.shape(), &[2, 2]);
    assert_eq!(int_values(&array), vec![1, 2, 4, 5]);

    let whole = resolver.resolve("g").unwrap();
    assert_eq!(whole.shape(), &[2, 3]);

    // The third slice goes to each `int[2]` cell.
    let seconds = resolver.resolve("h[:, 1:3, 1]").unwrap();
    assert_eq!(seconds.shape(), &[2, 2]);
    assert_eq!(int_values(&seconds), vec![3, 5, 9, 11]);
}
