// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sliced extraction of debugger variables into dense arrays
//!
//! Turns references such as `samples[0:100:2]` or `grid[1:3, ::-1]` into
//! rectangular n-dimensional arrays by walking the inspected process's
//! values through a catalogue of type handlers.
//!
//! # Features
//!
//! - **Slice syntax**: `start:stop:step` per dimension, bounds are debugger
//!   expressions
//! - **Containers**: `std::vector`, `std::vector<bool>`, `std::array`, C
//!   arrays and raw pointers, nested to any depth
//! - **Scalars**: integers, `float`, `double`, `bool`, `std::complex`
//! - **Extensible**: register custom [`TypeHandler`]s ahead of the defaults
//!
//! # Quick Start
//!
//! ```ignore
//! use varslice::{TypeSet, VariableResolver};
//!
//! let types = TypeSet::with_defaults();
//! let resolver = VariableResolver::new(&debugger, &types);
//! let array = resolver.resolve("frames[0:10, 2]")?;
//! println!("{:?} {}", array.shape(), array);
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! max_elements = 1000000
//! complex_decode = "auto"
//! squeeze = true
//! ```

pub mod config;
pub mod dense;
pub mod engine;
pub mod error;
pub mod handler;
pub mod indices;
pub mod resolver;
pub mod scalar;
pub mod slice;
pub mod target;

pub use config::{ComplexDecode, ConfigError, ExtractConfig};
pub use dense::{densify, DenseArray};
pub use engine::{Extractor, Nested};
pub use error::ExtractError;
pub use handler::{Element, ExtractContext, TypeHandler, TypeSet};
pub use indices::DimIndices;
pub use resolver::{array_name, parse_var, split_variable_and_slice, VariableResolver};
pub use scalar::{Scalar, ScalarKind};
pub use slice::{parse_slice, parse_subslice, SliceSpec};
pub use target::{TargetError, TargetValueSource, TypeDesc, Value};
