// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptors as reported by the debug information.

use std::fmt;
use std::sync::Arc;

/// Encoding of a base (non-aggregate) type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Signed,
    Unsigned,
    Float,
    Bool,
    /// Two consecutive floats: real part then imaginary part.
    Complex,
}

/// Type kind enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Incomplete type (`void`).
    Void,
    /// Base type.
    Base(Encoding),
    /// Pointer to target type.
    Pointer(Arc<TypeDesc>),
    /// Fixed array with inclusive index range.
    Array {
        element: Arc<TypeDesc>,
        low: i64,
        high: i64,
    },
    /// Struct or class, with template arguments for instantiations.
    Struct {
        fields: Vec<FieldDesc>,
        template_args: Vec<TemplateArg>,
    },
    /// Typedef of target type.
    Typedef(Arc<TypeDesc>),
    /// cv-qualified target type.
    Qualified(Arc<TypeDesc>),
}

/// Struct member at a fixed byte offset.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDesc {
    pub name: String,
    pub offset: usize,
    pub type_desc: Arc<TypeDesc>,
}

/// Template argument of a class template instantiation.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArg {
    Type(Arc<TypeDesc>),
    Value(i64),
}

/// A complete type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDesc {
    /// Type name, spelled the way the host prints it.
    pub name: String,
    /// Size in bytes.
    pub size: usize,
    /// Type kind.
    pub kind: TypeKind,
}

impl TypeDesc {
    /// Create a new type descriptor.
    pub fn new(name: impl Into<String>, size: usize, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            size,
            kind,
        }
    }

    /// The `void` type.
    pub fn void() -> Self {
        Self::new("void", 0, TypeKind::Void)
    }

    /// Create a base type descriptor.
    pub fn base(name: impl Into<String>, size: usize, encoding: Encoding) -> Self {
        Self::new(name, size, TypeKind::Base(encoding))
    }

    /// Create a pointer to `target` with the given pointer width.
    pub fn pointer(target: Arc<TypeDesc>, size: usize) -> Self {
        Self::new(format!("{} *", target.name), size, TypeKind::Pointer(target))
    }

    /// Create a zero-based array of `length` elements.
    ///
    /// Names follow the C declarator order, so an array of `int [3]` is
    /// spelled `int [2][3]`.
    pub fn array(element: Arc<TypeDesc>, length: usize) -> Self {
        let name = match element.name.find(" [") {
            Some(pos) => format!(
                "{} [{}]{}",
                &element.name[..pos],
                length,
                &element.name[pos + 1..]
            ),
            None => format!("{} [{}]", element.name, length),
        };
        let size = element.size * length;
        Self::new(
            name,
            size,
            TypeKind::Array {
                element,
                low: 0,
                high: length as i64 - 1,
            },
        )
    }

    /// Create a typedef.
    pub fn typedef(name: impl Into<String>, target: Arc<TypeDesc>) -> Self {
        let size = target.size;
        Self::new(name, size, TypeKind::Typedef(target))
    }

    /// Create a `const` qualified type.
    pub fn constant(target: Arc<TypeDesc>) -> Self {
        let size = target.size;
        Self::new(
            format!("const {}", target.name),
            size,
            TypeKind::Qualified(target),
        )
    }

    /// Strip typedefs and qualifiers.
    pub fn basic(&self) -> &TypeDesc {
        let mut ty = self;
        while let TypeKind::Typedef(inner) | TypeKind::Qualified(inner) = &ty.kind {
            ty = inner;
        }
        ty
    }

    /// Shared-pointer flavour of [`TypeDesc::basic`].
    pub fn basic_arc(ty: &Arc<TypeDesc>) -> Arc<TypeDesc> {
        let mut ty = ty;
        while let TypeKind::Typedef(inner) | TypeKind::Qualified(inner) = &ty.kind {
            ty = inner;
        }
        Arc::clone(ty)
    }

    /// Base encoding, if this is a base type.
    pub fn encoding(&self) -> Option<Encoding> {
        match self.basic().kind {
            TypeKind::Base(encoding) => Some(encoding),
            _ => None,
        }
    }

    /// Check if this is a pointer type.
    pub fn is_pointer(&self) -> bool {
        matches!(self.basic().kind, TypeKind::Pointer(_))
    }

    /// Check if this is an array type.
    pub fn is_array(&self) -> bool {
        matches!(self.basic().kind, TypeKind::Array { .. })
    }

    /// Pointed-to type of a pointer, element type of an array.
    pub fn target(&self) -> Option<&Arc<TypeDesc>> {
        match &self.basic().kind {
            TypeKind::Pointer(target) => Some(target),
            TypeKind::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Inclusive index range of an array.
    pub fn range(&self) -> Option<(i64, i64)> {
        match self.basic().kind {
            TypeKind::Array { low, high, .. } => Some((low, high)),
            _ => None,
        }
    }

    /// Get member by name.
    pub fn field(&self, name: &str) -> Option<&FieldDesc> {
        match &self.basic().kind {
            TypeKind::Struct { fields, .. } => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }

    /// Get template argument by position.
    pub fn template_argument(&self, index: usize) -> Option<&TemplateArg> {
        match &self.basic().kind {
            TypeKind::Struct { template_args, .. } => template_args.get(index),
            _ => None,
        }
    }

    /// Template argument as a type.
    pub fn template_type(&self, index: usize) -> Option<&Arc<TypeDesc>> {
        match self.template_argument(index)? {
            TemplateArg::Type(ty) => Some(ty),
            TemplateArg::Value(_) => None,
        }
    }

    /// Template argument as an integer constant.
    pub fn template_value(&self, index: usize) -> Option<i64> {
        match self.template_argument(index)? {
            TemplateArg::Value(v) => Some(*v),
            TemplateArg::Type(_) => None,
        }
    }

    /// Natural alignment.
    pub fn alignment(&self) -> usize {
        match &self.kind {
            TypeKind::Void => 1,
            TypeKind::Base(Encoding::Complex) => (self.size / 2).max(1),
            TypeKind::Base(_) | TypeKind::Pointer(_) => self.size.max(1),
            TypeKind::Array { element, .. } => element.alignment(),
            TypeKind::Struct { fields, .. } => fields
                .iter()
                .map(|f| f.type_desc.alignment())
                .max()
                .unwrap_or(1),
            TypeKind::Typedef(inner) | TypeKind::Qualified(inner) => inner.alignment(),
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Builder for struct and class template layouts.
///
/// Members are placed at their natural alignment, in declaration order.
#[derive(Debug)]
pub struct StructBuilder {
    name: String,
    fields: Vec<FieldDesc>,
    template_args: Vec<TemplateArg>,
    size: usize,
    align: usize,
}

impl StructBuilder {
    /// Create a new builder for a struct type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            template_args: Vec::new(),
            size: 0,
            align: 1,
        }
    }

    /// Append a member.
    pub fn field(mut self, name: impl Into<String>, type_desc: Arc<TypeDesc>) -> Self {
        let align = type_desc.alignment();
        let offset = self.size.div_ceil(align) * align;
        self.size = offset + type_desc.size;
        self.align = self.align.max(align);
        self.fields.push(FieldDesc {
            name: name.into(),
            offset,
            type_desc,
        });
        self
    }

    /// Append a type template argument.
    pub fn template_type(mut self, ty: Arc<TypeDesc>) -> Self {
        self.template_args.push(TemplateArg::Type(ty));
        self
    }

    /// Append a non-type template argument.
    pub fn template_value(mut self, value: i64) -> Self {
        self.template_args.push(TemplateArg::Value(value));
        self
    }

    /// Build the TypeDesc.
    pub fn build(self) -> TypeDesc {
        let size = self.size.div_ceil(self.align) * self.align;
        TypeDesc::new(
            self.name,
            size,
            TypeKind::Struct {
                fields: self.fields,
                template_args: self.template_args,
            },
        )
    }
}
