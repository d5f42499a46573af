// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Access to the inspected process.
//!
//! The extraction core never talks to a debugger directly. Everything it needs
//! (evaluating expressions, reading raw memory, the host's byte order) goes
//! through [`TargetValueSource`]. Types and values are described with
//! [`TypeDesc`] and [`Value`], which the source produces and the handlers walk.
//!
//! [`sim::SimTarget`] is a deterministic in-memory implementation that lays
//! out libstdc++ containers the way GDB sees them.

pub mod sim;
mod types;
mod value;

pub use types::{Encoding, FieldDesc, StructBuilder, TemplateArg, TypeDesc, TypeKind};
pub use value::{Location, Value};

use std::sync::Arc;
use thiserror::Error;

/// Errors reported by a [`TargetValueSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("No symbol \"{0}\" in current context")]
    UnknownSymbol(String),

    #[error("Syntax error in expression: {0}")]
    Syntax(String),

    #[error("Cannot access memory at address {addr:#x} ({len} bytes)")]
    InvalidAddress { addr: u64, len: usize },

    #[error("There is no member named {field} in {type_name}")]
    MissingField { field: String, type_name: String },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Byte order of the inspected process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    /// Read an unsigned integer of `bytes.len()` bytes (at most 8).
    pub fn read_uint(self, bytes: &[u8]) -> u64 {
        let bytes = &bytes[..bytes.len().min(8)];
        match self {
            Self::Little => bytes
                .iter()
                .rev()
                .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)),
            Self::Big => bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)),
        }
    }

    /// Read a two's complement signed integer of `bytes.len()` bytes.
    pub fn read_int(self, bytes: &[u8]) -> i64 {
        let width = bytes.len().min(8);
        let raw = self.read_uint(bytes);
        if width == 0 || width == 8 {
            return raw as i64;
        }
        let shift = 64 - 8 * width as u32;
        ((raw << shift) as i64) >> shift
    }

    /// Encode the low `width` bytes of `value`.
    pub fn write_uint(self, value: u64, width: usize) -> Vec<u8> {
        let le = value.to_le_bytes();
        let mut out = le[..width.min(8)].to_vec();
        if self == Self::Big {
            out.reverse();
        }
        out
    }
}

/// The host debugger's view of the inspected process.
///
/// All calls are blocking and made from the extracting thread. Failures are
/// terminal for the extraction in progress; nothing is retried.
pub trait TargetValueSource {
    /// Evaluate an expression in the current frame: a variable reference or
    /// an integer expression used as a slice bound.
    fn evaluate(&self, expr: &str) -> Result<Value, TargetError>;

    /// Read `len` raw bytes at `addr`.
    fn read_memory(&self, addr: u64, len: usize) -> Result<Vec<u8>, TargetError>;

    /// Byte order used to decode scalars and pointers.
    fn byte_order(&self) -> ByteOrder {
        ByteOrder::Little
    }

    /// Render a value the way the host prints it.
    fn render(&self, value: &Value) -> Result<String, TargetError> {
        Err(TargetError::Unsupported(format!(
            "cannot render value of type {}",
            value.ty()
        )))
    }

    /// Canonical form of a type used for handler matching (typedefs and
    /// cv-qualifiers stripped).
    fn basic_type(&self, ty: &Arc<TypeDesc>) -> Arc<TypeDesc> {
        TypeDesc::basic_arc(ty)
    }
}
