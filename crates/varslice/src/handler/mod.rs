// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type handlers and the catalogue that selects them.
//!
//! A handler knows one family of inspected types: how many dimensions it
//! exposes, what its elements are, and how to fetch one element. Scalar
//! handlers expose zero dimensions and decode the value itself.
//!
//! The catalogue is an ordered list; the first handler whose
//! [`TypeHandler::can_handle`] accepts a type wins. Register specific
//! handlers before general ones (`std::vector<bool>` before `std::vector`).

mod std_types;

pub use std_types::{
    ArrayHandler, BoolHandler, ComplexDoubleHandler, ComplexFloatHandler, DoubleHandler,
    FloatHandler, IntegralHandler, PointerHandler, StdArrayHandler, StdVectorBoolHandler,
    StdVectorHandler,
};

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::scalar::Scalar;
use crate::target::{TargetValueSource, TypeDesc, Value};
use std::fmt;
use std::sync::Arc;

/// Shared state handed to every handler call.
#[derive(Clone, Copy)]
pub struct ExtractContext<'a> {
    pub source: &'a dyn TargetValueSource,
    pub types: &'a TypeSet,
    pub config: &'a ExtractConfig,
}

/// What [`TypeHandler::extract`] produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A value in the inspected process, walked further by the engine.
    Value(Value),
    /// A decoded primitive.
    Scalar(Scalar),
}

/// Knowledge of one family of inspected types.
///
/// The default methods describe a scalar: no dimensions and no element
/// type. Container handlers override both.
pub trait TypeHandler: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Check if this handler accepts `ty` (already canonicalised).
    fn can_handle(&self, ty: &TypeDesc) -> bool;

    /// Length of each dimension exposed by `value`. `None` marks a dimension
    /// with no known end (raw pointers).
    fn shape(
        &self,
        _cx: &ExtractContext<'_>,
        _value: &Value,
    ) -> Result<Vec<Option<usize>>, ExtractError> {
        Ok(Vec::new())
    }

    /// Element type, or `None` for a scalar.
    fn contained_type(
        &self,
        _cx: &ExtractContext<'_>,
        _value: &Value,
    ) -> Result<Option<Arc<TypeDesc>>, ExtractError> {
        Ok(None)
    }

    /// Fetch the element at `index` (one entry per dimension of
    /// [`TypeHandler::shape`]). Scalars receive an empty index and return
    /// their decoded value; handing back a value of their own type is a
    /// shape error.
    fn extract(
        &self,
        cx: &ExtractContext<'_>,
        value: &Value,
        index: &[i64],
    ) -> Result<Element, ExtractError>;
}

/// Ordered handler catalogue.
#[derive(Default)]
pub struct TypeSet {
    handlers: Vec<Box<dyn TypeHandler>>,
}

impl TypeSet {
    /// Create an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalogue holding the built-in handlers, most specific first.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.register(StdVectorBoolHandler);
        set.register(StdVectorHandler);
        set.register(StdArrayHandler);
        set.register(PointerHandler);
        set.register(ArrayHandler);
        set.register(DoubleHandler);
        set.register(FloatHandler);
        set.register(ComplexDoubleHandler);
        set.register(ComplexFloatHandler);
        set.register(IntegralHandler);
        set.register(BoolHandler);
        set
    }

    /// Append a handler. Earlier registrations take precedence.
    pub fn register<H: TypeHandler + 'static>(&mut self, handler: H) {
        log::debug!("[TYPESET] Registered handler {}", handler.name());
        self.handlers.push(Box::new(handler));
    }

    /// First handler accepting `ty`.
    pub fn get_handler(&self, ty: &TypeDesc) -> Result<&dyn TypeHandler, ExtractError> {
        self.handlers
            .iter()
            .find(|h| h.can_handle(ty))
            .map(|h| &**h)
            .ok_or_else(|| ExtractError::UnknownType {
                type_name: ty.name.clone(),
            })
    }

    /// Handler names in precedence order.
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSet")
            .field("handlers", &self.handler_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::sim::{ctype, vector_bool_type, vector_type};
    use crate::target::StructBuilder;

    struct Named(&'static str, &'static str);

    impl TypeHandler for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn can_handle(&self, ty: &TypeDesc) -> bool {
            ty.name == self.1
        }

        fn extract(
            &self,
            _cx: &ExtractContext<'_>,
            _value: &Value,
            _index: &[i64],
        ) -> Result<Element, ExtractError> {
            Ok(Element::Scalar(Scalar::I32(0)))
        }
    }

    #[test]
    fn test_first_registered_wins() {
        let mut set = TypeSet::new();
        set.register(Named("first", "int"));
        set.register(Named("second", "int"));

        let int = ctype("int").unwrap();
        assert_eq!(set.get_handler(&int).unwrap().name(), "first");
    }

    #[test]
    fn test_unknown_then_registered() {
        let mut set = TypeSet::with_defaults();
        let point = StructBuilder::new("Point")
            .field("x", ctype("int").unwrap())
            .build();

        let err = set.get_handler(&point).err().unwrap();
        assert!(matches!(err, ExtractError::UnknownType { ref type_name } if type_name == "Point"));

        set.register(Named("point", "Point"));
        assert_eq!(set.get_handler(&point).unwrap().name(), "point");
    }

    #[test]
    fn test_default_precedence() {
        let set = TypeSet::with_defaults();
        assert_eq!(set.len(), 11);

        let bits = vector_bool_type();
        assert_eq!(set.get_handler(&bits).unwrap().name(), "std::vector<bool>");

        let ints = vector_type(&ctype("int").unwrap());
        assert_eq!(set.get_handler(&ints).unwrap().name(), "std::vector");
    }

    #[test]
    fn test_empty_set_rejects_everything() {
        let set = TypeSet::new();
        assert!(set.is_empty());
        assert!(set.get_handler(&ctype("int").unwrap()).is_err());
    }
}
