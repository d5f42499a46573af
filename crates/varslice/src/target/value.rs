// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Located values in the inspected process.

use super::{Encoding, TargetError, TargetValueSource, TypeDesc, TypeKind};
use std::sync::Arc;

/// Where a value's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// In the inspected process.
    Address(u64),
    /// Synthesized by the host or by a handler (expression results, unpacked
    /// bits).
    Immediate(Vec<u8>),
}

/// A typed value. Cheap to clone; bytes are only read on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    ty: Arc<TypeDesc>,
    location: Location,
}

impl Value {
    /// Value stored at `addr`.
    pub fn at(ty: Arc<TypeDesc>, addr: u64) -> Self {
        Self {
            ty,
            location: Location::Address(addr),
        }
    }

    /// Value held by its bytes.
    pub fn immediate(ty: Arc<TypeDesc>, bytes: Vec<u8>) -> Self {
        Self {
            ty,
            location: Location::Immediate(bytes),
        }
    }

    /// Declared type.
    pub fn ty(&self) -> &Arc<TypeDesc> {
        &self.ty
    }

    /// Location of the bytes.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Address in the inspected process, if the value lives there.
    pub fn address(&self) -> Option<u64> {
        match self.location {
            Location::Address(addr) => Some(addr),
            Location::Immediate(_) => None,
        }
    }

    /// Read the value's bytes.
    pub fn read_bytes(&self, source: &dyn TargetValueSource) -> Result<Vec<u8>, TargetError> {
        match &self.location {
            Location::Address(addr) => source.read_memory(*addr, self.ty.size),
            Location::Immediate(bytes) if bytes.len() >= self.ty.size => {
                Ok(bytes[..self.ty.size].to_vec())
            }
            Location::Immediate(bytes) => Err(TargetError::Unsupported(format!(
                "{} byte immediate for {} byte type {}",
                bytes.len(),
                self.ty.size,
                self.ty
            ))),
        }
    }

    /// Member of a struct value.
    pub fn field(&self, name: &str) -> Result<Value, TargetError> {
        let field = self
            .ty
            .field(name)
            .ok_or_else(|| TargetError::MissingField {
                field: name.to_string(),
                type_name: self.ty.name.clone(),
            })?;
        let ty = Arc::clone(&field.type_desc);

        match &self.location {
            Location::Address(addr) => {
                let addr = addr
                    .checked_add(field.offset as u64)
                    .ok_or_else(|| overflow(&self.ty, field.offset as i64))?;
                Ok(Value::at(ty, addr))
            }
            Location::Immediate(bytes) => {
                let end = field.offset.saturating_add(ty.size);
                let slice = bytes.get(field.offset..end).ok_or_else(|| {
                    TargetError::Unsupported(format!("truncated immediate of type {}", self.ty))
                })?;
                Ok(Value::immediate(ty, slice.to_vec()))
            }
        }
    }

    /// Address held by a pointer value.
    pub fn read_pointer(&self, source: &dyn TargetValueSource) -> Result<u64, TargetError> {
        if !self.ty.is_pointer() {
            return Err(TargetError::Unsupported(format!(
                "{} is not a pointer",
                self.ty
            )));
        }
        let bytes = self.read_bytes(source)?;
        Ok(source.byte_order().read_uint(&bytes))
    }

    /// Integer held by an integral or boolean value.
    pub fn to_i64(&self, source: &dyn TargetValueSource) -> Result<i64, TargetError> {
        let bytes = self.read_bytes(source)?;
        let order = source.byte_order();
        match self.ty.encoding() {
            Some(Encoding::Signed) => Ok(order.read_int(&bytes)),
            Some(Encoding::Unsigned) | Some(Encoding::Bool) => Ok(order.read_uint(&bytes) as i64),
            _ => Err(TargetError::Unsupported(format!(
                "{} is not an integer type",
                self.ty
            ))),
        }
    }

    /// Element `index` of an array, or `*(ptr + index)` for a pointer.
    pub fn element(
        &self,
        source: &dyn TargetValueSource,
        index: i64,
    ) -> Result<Value, TargetError> {
        match &self.ty.basic().kind {
            TypeKind::Array { element, low, .. } => {
                let offset = index
                    .checked_sub(*low)
                    .and_then(|i| i.checked_mul(i64::try_from(element.size).ok()?))
                    .ok_or_else(|| overflow(&self.ty, index))?;
                match &self.location {
                    Location::Address(addr) => {
                        let addr = addr
                            .checked_add_signed(offset)
                            .ok_or_else(|| overflow(&self.ty, index))?;
                        Ok(Value::at(Arc::clone(element), addr))
                    }
                    Location::Immediate(bytes) => {
                        let start = usize::try_from(offset).map_err(|_| {
                            TargetError::Unsupported(format!("index {index} before array start"))
                        })?;
                        let end = start.saturating_add(element.size);
                        let slice = bytes.get(start..end).ok_or_else(|| {
                            TargetError::Unsupported(format!(
                                "index {index} past immediate array {}",
                                self.ty
                            ))
                        })?;
                        Ok(Value::immediate(Arc::clone(element), slice.to_vec()))
                    }
                }
            }
            TypeKind::Pointer(target) => {
                if target.size == 0 {
                    return Err(TargetError::Unsupported(format!(
                        "arithmetic on pointer to incomplete type {}",
                        target
                    )));
                }
                let base = self.read_pointer(source)?;
                let addr = i64::try_from(target.size)
                    .ok()
                    .and_then(|size| index.checked_mul(size))
                    .and_then(|offset| base.checked_add_signed(offset))
                    .ok_or_else(|| overflow(&self.ty, index))?;
                Ok(Value::at(Arc::clone(target), addr))
            }
            _ => Err(TargetError::Unsupported(format!(
                "cannot subscript value of type {}",
                self.ty
            ))),
        }
    }

    /// Number of elements between two pointers of the same type
    /// (`self - origin`).
    pub fn pointer_diff(
        &self,
        origin: &Value,
        source: &dyn TargetValueSource,
    ) -> Result<i64, TargetError> {
        let elem_size = self
            .ty
            .target()
            .map(|t| t.size)
            .filter(|size| *size > 0)
            .ok_or_else(|| {
                TargetError::Unsupported(format!("pointer difference on {}", self.ty))
            })?;
        let end = self.read_pointer(source)?;
        let start = origin.read_pointer(source)?;
        Ok((end as i64).wrapping_sub(start as i64) / elem_size as i64)
    }
}

fn overflow(ty: &TypeDesc, index: i64) -> TargetError {
    TargetError::Unsupported(format!("offset {index} into {ty} leaves the address space"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::sim::{ctype, SimTarget};
    use crate::target::StructBuilder;

    #[test]
    fn test_field_of_immediate() {
        let source = SimTarget::new();
        let int = ctype("int").unwrap();
        let ty = Arc::new(
            StructBuilder::new("Pair")
                .field("a", int.clone())
                .field("b", int)
                .build(),
        );
        let mut bytes = 5i32.to_le_bytes().to_vec();
        bytes.extend(9i32.to_le_bytes());
        let value = Value::immediate(ty, bytes);

        let b = value.field("b").unwrap();
        assert_eq!(b.to_i64(&source).unwrap(), 9);
        assert!(matches!(
            value.field("c"),
            Err(TargetError::MissingField { .. })
        ));
    }

    #[test]
    fn test_pointer_element_and_diff() {
        let mut source = SimTarget::new();
        let int = ctype("int").unwrap();
        let data: Vec<u8> = [10i32, 20, 30].iter().flat_map(|v| v.to_le_bytes()).collect();
        let p = source.define_pointer("p", &int, &data);

        let second = p.element(&source, 1).unwrap();
        assert_eq!(second.to_i64(&source).unwrap(), 20);

        let end = p.element(&source, 3).unwrap().address().unwrap();
        let end_ptr = Value::immediate(
            Arc::clone(p.ty()),
            source.byte_order().write_uint(end, 8),
        );
        assert_eq!(end_ptr.pointer_diff(&p, &source).unwrap(), 3);
    }

    #[test]
    fn test_huge_pointer_index_is_an_error() {
        let mut source = SimTarget::new();
        let int = ctype("int").unwrap();
        let p = source.define_pointer("p", &int, &0i32.to_le_bytes());

        for index in [1i64 << 62, i64::MAX, i64::MIN] {
            assert!(matches!(
                p.element(&source, index),
                Err(TargetError::Unsupported(_))
            ));
        }
    }

    #[test]
    fn test_float_is_not_integer() {
        let source = SimTarget::new();
        let value = Value::immediate(ctype("double").unwrap(), 1.5f64.to_le_bytes().to_vec());
        assert!(value.to_i64(&source).is_err());
    }
}
