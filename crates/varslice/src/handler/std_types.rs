// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in handlers: libstdc++ containers, C arrays and pointers, and the
//! primitive scalars.

use super::{Element, ExtractContext, TypeHandler};
use crate::config::ComplexDecode;
use crate::error::ExtractError;
use crate::scalar::{Scalar, ScalarKind};
use crate::target::{Encoding, TargetError, TypeDesc, Value};
use num::complex::{Complex32, Complex64};
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// Integer type names as GDB prints them.
const INTEGRAL_NAMES: &[&str] = &[
    "char",
    "signed char",
    "unsigned char",
    "short",
    "short int",
    "unsigned short",
    "short unsigned int",
    "int",
    "unsigned",
    "unsigned int",
    "long",
    "long int",
    "unsigned long",
    "long unsigned int",
    "long long",
    "long long int",
    "unsigned long long",
    "long long unsigned int",
];

fn unsupported(message: String) -> ExtractError {
    ExtractError::Target(TargetError::Unsupported(message))
}

fn first_index(index: &[i64]) -> Result<i64, ExtractError> {
    index
        .first()
        .copied()
        .ok_or_else(|| ExtractError::shape("one-dimensional element requested without an index"))
}

fn length(count: i64, ty: &TypeDesc) -> Result<usize, ExtractError> {
    usize::try_from(count).map_err(|_| unsupported(format!("negative length {} for {}", count, ty)))
}

fn element_type(ty: &TypeDesc) -> Result<Arc<TypeDesc>, ExtractError> {
    ty.template_type(0)
        .cloned()
        .ok_or_else(|| unsupported(format!("{} has no element type argument", ty)))
}

fn decode(cx: &ExtractContext<'_>, value: &Value, kind: ScalarKind) -> Result<Element, ExtractError> {
    let bytes = value.read_bytes(cx.source)?;
    let scalar = Scalar::decode(kind, &bytes, cx.source.byte_order())?;
    Ok(Element::Scalar(scalar))
}

fn is_std_vector(ty: &TypeDesc) -> bool {
    ty.name.starts_with("std::vector<")
}

// ============================================================================
// Containers
// ============================================================================

/// `std::vector<bool>`: bits packed into machine words, addressed by a
/// word pointer plus a bit offset at each end.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdVectorBoolHandler;

/// Resolved storage of a bit vector.
struct BitStorage {
    words: Value,
    word_bits: i64,
    first_bit: i64,
    len: i64,
}

impl StdVectorBoolHandler {
    fn storage(cx: &ExtractContext<'_>, value: &Value) -> Result<BitStorage, ExtractError> {
        let imp = value.field("_M_impl")?;
        let start = imp.field("_M_start")?;
        let finish = imp.field("_M_finish")?;
        let words = start.field("_M_p")?;

        let word_bits = words
            .ty()
            .target()
            .map(|word| word.size as i64 * 8)
            .filter(|bits| *bits > 0)
            .ok_or_else(|| unsupported(format!("{} has no word type", words.ty())))?;
        let word_count = finish.field("_M_p")?.pointer_diff(&words, cx.source)?;
        let first_bit = start.field("_M_offset")?.to_i64(cx.source)?;
        let last_bit = finish.field("_M_offset")?.to_i64(cx.source)?;

        let len = word_count
            .checked_mul(word_bits)
            .and_then(|bits| bits.checked_add(last_bit))
            .and_then(|bits| bits.checked_sub(first_bit))
            .ok_or_else(|| {
                unsupported(format!(
                    "{} spans {} words, storage is corrupt",
                    value.ty(),
                    word_count
                ))
            })?;

        Ok(BitStorage {
            words,
            word_bits,
            first_bit,
            len,
        })
    }
}

impl TypeHandler for StdVectorBoolHandler {
    fn name(&self) -> &'static str {
        "std::vector<bool>"
    }

    fn can_handle(&self, ty: &TypeDesc) -> bool {
        is_std_vector(ty)
            && ty
                .template_type(0)
                .is_some_and(|elem| elem.basic().name == "bool")
    }

    fn shape(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
    ) -> Result<Vec<Option<usize>>, ExtractError> {
        let storage = Self::storage(cx, value)?;
        Ok(vec![Some(length(storage.len, value.ty())?)])
    }

    fn contained_type(
        &self,
        _cx: &ExtractContext<'_>,
        value: &Value,
    ) -> Result<Option<Arc<TypeDesc>>, ExtractError> {
        element_type(value.ty()).map(Some)
    }

    fn extract(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
        index: &[i64],
    ) -> Result<Element, ExtractError> {
        let storage = Self::storage(cx, value)?;
        let bit = storage
            .first_bit
            .checked_add(first_index(index)?)
            .ok_or_else(|| unsupported(format!("bit index past {}", value.ty())))?;

        let word = storage
            .words
            .element(cx.source, bit.div_euclid(storage.word_bits))?;
        let order = cx.source.byte_order();
        let raw = order.read_uint(&word.read_bytes(cx.source)?);
        let set = (raw >> bit.rem_euclid(storage.word_bits)) & 1;

        let ty = element_type(value.ty())?;
        let bytes = order.write_uint(set, ty.size.max(1));
        Ok(Element::Value(Value::immediate(ty, bytes)))
    }
}

/// `std::vector<T>`: contiguous storage between `_M_start` and
/// `_M_finish`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdVectorHandler;

impl TypeHandler for StdVectorHandler {
    fn name(&self) -> &'static str {
        "std::vector"
    }

    fn can_handle(&self, ty: &TypeDesc) -> bool {
        is_std_vector(ty)
    }

    fn shape(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
    ) -> Result<Vec<Option<usize>>, ExtractError> {
        let imp = value.field("_M_impl")?;
        let count = imp
            .field("_M_finish")?
            .pointer_diff(&imp.field("_M_start")?, cx.source)?;
        Ok(vec![Some(length(count, value.ty())?)])
    }

    fn contained_type(
        &self,
        _cx: &ExtractContext<'_>,
        value: &Value,
    ) -> Result<Option<Arc<TypeDesc>>, ExtractError> {
        element_type(value.ty()).map(Some)
    }

    fn extract(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
        index: &[i64],
    ) -> Result<Element, ExtractError> {
        let start = value.field("_M_impl")?.field("_M_start")?;
        Ok(Element::Value(start.element(cx.source, first_index(index)?)?))
    }
}

/// `std::array<T, N>`: length from the second template argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdArrayHandler;

impl TypeHandler for StdArrayHandler {
    fn name(&self) -> &'static str {
        "std::array"
    }

    fn can_handle(&self, ty: &TypeDesc) -> bool {
        ty.name.starts_with("std::array<")
    }

    fn shape(
        &self,
        _cx: &ExtractContext<'_>,
        value: &Value,
    ) -> Result<Vec<Option<usize>>, ExtractError> {
        let ty = value.ty();
        let count = ty
            .template_value(1)
            .ok_or_else(|| unsupported(format!("{} has no length argument", ty)))?;
        Ok(vec![Some(length(count, ty)?)])
    }

    fn contained_type(
        &self,
        _cx: &ExtractContext<'_>,
        value: &Value,
    ) -> Result<Option<Arc<TypeDesc>>, ExtractError> {
        element_type(value.ty()).map(Some)
    }

    fn extract(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
        index: &[i64],
    ) -> Result<Element, ExtractError> {
        let elems = value.field("_M_elems")?;
        Ok(Element::Value(elems.element(cx.source, first_index(index)?)?))
    }
}

/// Raw pointers: one dimension with no known end.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerHandler;

impl TypeHandler for PointerHandler {
    fn name(&self) -> &'static str {
        "pointer"
    }

    fn can_handle(&self, ty: &TypeDesc) -> bool {
        ty.is_pointer()
    }

    fn shape(
        &self,
        _cx: &ExtractContext<'_>,
        _value: &Value,
    ) -> Result<Vec<Option<usize>>, ExtractError> {
        Ok(vec![None])
    }

    fn contained_type(
        &self,
        _cx: &ExtractContext<'_>,
        value: &Value,
    ) -> Result<Option<Arc<TypeDesc>>, ExtractError> {
        Ok(value.ty().target().cloned())
    }

    fn extract(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
        index: &[i64],
    ) -> Result<Element, ExtractError> {
        Ok(Element::Value(value.element(cx.source, first_index(index)?)?))
    }
}

/// Fixed-size C arrays. Selections are zero-based whatever the declared
/// lower bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayHandler;

impl TypeHandler for ArrayHandler {
    fn name(&self) -> &'static str {
        "array"
    }

    fn can_handle(&self, ty: &TypeDesc) -> bool {
        ty.is_array()
    }

    fn shape(
        &self,
        _cx: &ExtractContext<'_>,
        value: &Value,
    ) -> Result<Vec<Option<usize>>, ExtractError> {
        let ty = value.ty();
        let (low, high) = ty
            .range()
            .ok_or_else(|| unsupported(format!("{} has no index range", ty)))?;
        Ok(vec![Some(length(high - low + 1, ty)?)])
    }

    fn contained_type(
        &self,
        _cx: &ExtractContext<'_>,
        value: &Value,
    ) -> Result<Option<Arc<TypeDesc>>, ExtractError> {
        Ok(value.ty().target().cloned())
    }

    fn extract(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
        index: &[i64],
    ) -> Result<Element, ExtractError> {
        let low = value.ty().range().map_or(0, |(low, _)| low);
        let element = value.element(cx.source, low + first_index(index)?)?;
        Ok(Element::Value(element))
    }
}

// ============================================================================
// Scalars
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleHandler;

impl TypeHandler for DoubleHandler {
    fn name(&self) -> &'static str {
        "double"
    }

    fn can_handle(&self, ty: &TypeDesc) -> bool {
        ty.name == "double"
    }

    fn extract(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
        _index: &[i64],
    ) -> Result<Element, ExtractError> {
        decode(cx, value, ScalarKind::F64)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatHandler;

impl TypeHandler for FloatHandler {
    fn name(&self) -> &'static str {
        "float"
    }

    fn can_handle(&self, ty: &TypeDesc) -> bool {
        ty.name == "float"
    }

    fn extract(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
        _index: &[i64],
    ) -> Result<Element, ExtractError> {
        decode(cx, value, ScalarKind::F32)
    }
}

/// `std::complex<double>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexDoubleHandler;

impl TypeHandler for ComplexDoubleHandler {
    fn name(&self) -> &'static str {
        "std::complex<double>"
    }

    fn can_handle(&self, ty: &TypeDesc) -> bool {
        ty.name == "std::complex<double>"
    }

    fn extract(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
        _index: &[i64],
    ) -> Result<Element, ExtractError> {
        extract_complex(cx, value, ScalarKind::C64)
    }
}

/// `std::complex<float>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexFloatHandler;

impl TypeHandler for ComplexFloatHandler {
    fn name(&self) -> &'static str {
        "std::complex<float>"
    }

    fn can_handle(&self, ty: &TypeDesc) -> bool {
        ty.name == "std::complex<float>"
    }

    fn extract(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
        _index: &[i64],
    ) -> Result<Element, ExtractError> {
        extract_complex(cx, value, ScalarKind::C32)
    }
}

fn extract_complex(
    cx: &ExtractContext<'_>,
    value: &Value,
    kind: ScalarKind,
) -> Result<Element, ExtractError> {
    let inner = value.field("_M_value")?;
    let scalar = match cx.config.complex_decode {
        ComplexDecode::Layout => complex_from_layout(cx, &inner, kind)?,
        ComplexDecode::Text => complex_from_text(cx, &inner, kind)?,
        ComplexDecode::Auto => match complex_from_layout(cx, &inner, kind) {
            Ok(scalar) => scalar,
            Err(err) => {
                log::debug!(
                    "[EXTRACT] {} layout not decodable ({}), parsing its rendering",
                    value.ty(),
                    err
                );
                complex_from_text(cx, &inner, kind)?
            }
        },
    };
    Ok(Element::Scalar(scalar))
}

fn complex_from_layout(
    cx: &ExtractContext<'_>,
    inner: &Value,
    kind: ScalarKind,
) -> Result<Scalar, ExtractError> {
    let ty = inner.ty();
    if ty.encoding() != Some(Encoding::Complex) || ty.size != kind.size() {
        return Err(unsupported(format!(
            "{} is not a {} byte complex",
            ty,
            kind.size()
        )));
    }
    let bytes = inner.read_bytes(cx.source)?;
    Ok(Scalar::decode(kind, &bytes, cx.source.byte_order())?)
}

fn complex_from_text(
    cx: &ExtractContext<'_>,
    inner: &Value,
    kind: ScalarKind,
) -> Result<Scalar, ExtractError> {
    let text = cx.source.render(inner)?;
    let (re, im) = parse_complex(&text)?
        .ok_or_else(|| unsupported(format!("cannot parse complex value `{}`", text)))?;
    Ok(match kind {
        ScalarKind::C32 => Scalar::C32(Complex32::new(re as f32, im as f32)),
        _ => Scalar::C64(Complex64::new(re, im)),
    })
}

/// Decimal, exponent or `inf`/`nan` literal with an optional sign.
const FLOAT: &str = r"[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?|[+-]?(?:inf|nan)";

fn complex_pattern() -> Result<&'static Regex, ExtractError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(&format!(
                r"^\s*({FLOAT})\s*([+-])\s*({FLOAT})\s*(?:\*\s*)?[iI]\s*$"
            ))
        })
        .as_ref()
        .map_err(|err| unsupported(format!("complex rendering pattern: {}", err)))
}

/// Parse a debugger rendering such as `1.5 - 2i` or `1 + 2 * I`.
pub(crate) fn parse_complex(text: &str) -> Result<Option<(f64, f64)>, ExtractError> {
    let Some(caps) = complex_pattern()?.captures(text) else {
        return Ok(None);
    };
    let (Ok(re), Ok(im)) = (caps[1].parse::<f64>(), caps[3].parse::<f64>()) else {
        return Ok(None);
    };
    let im = if &caps[2] == "-" { -im } else { im };
    Ok(Some((re, im)))
}

/// Signed and unsigned integers of any width.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegralHandler;

impl TypeHandler for IntegralHandler {
    fn name(&self) -> &'static str {
        "integral"
    }

    fn can_handle(&self, ty: &TypeDesc) -> bool {
        INTEGRAL_NAMES.contains(&ty.name.as_str())
    }

    fn extract(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
        _index: &[i64],
    ) -> Result<Element, ExtractError> {
        let ty = value.ty().basic();
        let signed = match ty.encoding() {
            Some(Encoding::Signed) => true,
            Some(Encoding::Unsigned) => false,
            _ => !ty.name.contains("unsigned"),
        };
        let kind = ScalarKind::integer(ty.size, signed)
            .ok_or_else(|| unsupported(format!("{} byte integer {}", ty.size, ty)))?;
        decode(cx, value, kind)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolHandler;

impl TypeHandler for BoolHandler {
    fn name(&self) -> &'static str {
        "bool"
    }

    fn can_handle(&self, ty: &TypeDesc) -> bool {
        ty.name == "bool"
    }

    fn extract(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
        _index: &[i64],
    ) -> Result<Element, ExtractError> {
        decode(cx, value, ScalarKind::Bool)
    }
}
