// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive leaf values.

use crate::target::{ByteOrder, TargetError};
use num::complex::{Complex32, Complex64};
use std::fmt;

/// Primitive scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    C32,
    C64,
}

impl ScalarKind {
    /// Size in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 | Self::C32 => 8,
            Self::C64 => 16,
        }
    }

    /// NumPy-style dtype name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::C32 => "complex64",
            Self::C64 => "complex128",
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Self::C32 | Self::C64)
    }

    /// Integer kind of the given width in bytes.
    pub fn integer(size: usize, signed: bool) -> Option<Self> {
        Some(match (size, signed) {
            (1, true) => Self::I8,
            (2, true) => Self::I16,
            (4, true) => Self::I32,
            (8, true) => Self::I64,
            (1, false) => Self::U8,
            (2, false) => Self::U16,
            (4, false) => Self::U32,
            (8, false) => Self::U64,
            _ => return None,
        })
    }
}

/// A decoded primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    C32(Complex32),
    C64(Complex64),
}

impl Scalar {
    /// Decode `kind` from raw target bytes.
    pub fn decode(kind: ScalarKind, bytes: &[u8], order: ByteOrder) -> Result<Self, TargetError> {
        if bytes.len() < kind.size() {
            return Err(TargetError::Unsupported(format!(
                "{} bytes are too few for {}",
                bytes.len(),
                kind.name()
            )));
        }
        let bytes = &bytes[..kind.size()];
        let int = |b: &[u8]| order.read_int(b);
        let uint = |b: &[u8]| order.read_uint(b);

        Ok(match kind {
            ScalarKind::Bool => Self::Bool(uint(bytes) != 0),
            ScalarKind::I8 => Self::I8(int(bytes) as i8),
            ScalarKind::I16 => Self::I16(int(bytes) as i16),
            ScalarKind::I32 => Self::I32(int(bytes) as i32),
            ScalarKind::I64 => Self::I64(int(bytes)),
            ScalarKind::U8 => Self::U8(uint(bytes) as u8),
            ScalarKind::U16 => Self::U16(uint(bytes) as u16),
            ScalarKind::U32 => Self::U32(uint(bytes) as u32),
            ScalarKind::U64 => Self::U64(uint(bytes)),
            ScalarKind::F32 => Self::F32(f32::from_bits(uint(bytes) as u32)),
            ScalarKind::F64 => Self::F64(f64::from_bits(uint(bytes))),
            ScalarKind::C32 => Self::C32(Complex32::new(
                f32::from_bits(uint(&bytes[..4]) as u32),
                f32::from_bits(uint(&bytes[4..]) as u32),
            )),
            ScalarKind::C64 => Self::C64(Complex64::new(
                f64::from_bits(uint(&bytes[..8])),
                f64::from_bits(uint(&bytes[8..])),
            )),
        })
    }

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

    /// Real value as `f64` (None for complex).
    pub fn as_f64(&self) -> Option<f64> {
        Some(match *self {
            Self::Bool(v) => f64::from(u8::from(v)),
            Self::I8(v) => f64::from(v),
            Self::I16(v) => f64::from(v),
            Self::I32(v) => f64::from(v),
            Self::I64(v) => v as f64,
            Self::U8(v) => f64::from(v),
            Self::U16(v) => f64::from(v),
            Self::U32(v) => f64::from(v),
            Self::U64(v) => v as f64,
            Self::F32(v) => f64::from(v),
            Self::F64(v) => v,
            Self::C32(_) | Self::C64(_) => return None,
        })
    }

    /// Integer value (None for floating point and complex).
    pub fn as_i64(&self) -> Option<i64> {
        Some(match *self {
            Self::Bool(v) => i64::from(v),
            Self::I8(v) => i64::from(v),
            Self::I16(v) => i64::from(v),
            Self::I32(v) => i64::from(v),
            Self::I64(v) => v,
            Self::U8(v) => i64::from(v),
            Self::U16(v) => i64::from(v),
            Self::U32(v) => i64::from(v),
            Self::U64(v) => v as i64,
            _ => return None,
        })
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::I8(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::U8(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::C32(v) => write!(f, "{}", v),
            Self::C64(v) => write!(f, "{}", v),
        }
    }
}
