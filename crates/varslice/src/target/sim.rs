// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Simulated inspected process.
//!
//! `SimTarget` keeps a flat byte arena, a symbol table and a small integer
//! expression evaluator. The layout helpers reproduce what GDB reports for a
//! libstdc++ build on LP64 targets (64-bit pointers, `std::vector<bool>`
//! packed into `unsigned long` words), so handlers can be exercised without a
//! live debugger.
//!
//! # Example
//!
//! ```rust
//! use varslice::target::sim::{ctype, SimTarget};
//! use varslice::target::TargetValueSource;
//!
//! let mut target = SimTarget::new();
//! let int = ctype("int").unwrap();
//! let data: Vec<u8> = [1i32, 2, 3].iter().flat_map(|v| v.to_le_bytes()).collect();
//! target.define_vector("v", &int, &data);
//!
//! let v = target.evaluate("v").unwrap();
//! assert!(v.ty().name.starts_with("std::vector<int"));
//! assert_eq!(target.evaluate("2 * (1 + 2)").unwrap().to_i64(&target).unwrap(), 6);
//! ```

use super::{ByteOrder, Encoding, StructBuilder, TargetError, TargetValueSource, TypeDesc, TypeKind, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// First address handed out by the arena.
pub const BASE_ADDRESS: u64 = 0x1000;

/// Pointer width of the simulated target.
pub const POINTER_SIZE: usize = 8;

const WORD_BITS: usize = 64;

/// C base types known to the simulator, as GDB spells them.
const BASE_TYPES: &[(&str, usize, Encoding)] = &[
    ("char", 1, Encoding::Signed),
    ("signed char", 1, Encoding::Signed),
    ("unsigned char", 1, Encoding::Unsigned),
    ("short", 2, Encoding::Signed),
    ("unsigned short", 2, Encoding::Unsigned),
    ("int", 4, Encoding::Signed),
    ("unsigned int", 4, Encoding::Unsigned),
    ("long", 8, Encoding::Signed),
    ("unsigned long", 8, Encoding::Unsigned),
    ("long long", 8, Encoding::Signed),
    ("unsigned long long", 8, Encoding::Unsigned),
    ("bool", 1, Encoding::Bool),
    ("float", 4, Encoding::Float),
    ("double", 8, Encoding::Float),
    ("__complex__ float", 8, Encoding::Complex),
    ("__complex__ double", 16, Encoding::Complex),
];

/// Look up a C base type (or `void`) by name.
pub fn ctype(name: &str) -> Option<Arc<TypeDesc>> {
    if name == "void" {
        return Some(Arc::new(TypeDesc::void()));
    }
    BASE_TYPES
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(n, size, encoding)| Arc::new(TypeDesc::base(*n, *size, *encoding)))
}

/// Pointer to `target`.
pub fn pointer_to(target: &Arc<TypeDesc>) -> Arc<TypeDesc> {
    Arc::new(TypeDesc::pointer(Arc::clone(target), POINTER_SIZE))
}

/// Fixed C array of `target`.
pub fn array_of(target: &Arc<TypeDesc>, length: usize) -> Arc<TypeDesc> {
    Arc::new(TypeDesc::array(Arc::clone(target), length))
}

fn allocator_type(elem: &Arc<TypeDesc>) -> Arc<TypeDesc> {
    Arc::new(
        StructBuilder::new(format!("std::allocator<{}>", elem.name))
            .template_type(Arc::clone(elem))
            .build(),
    )
}

fn base(name: &str, size: usize, encoding: Encoding) -> Arc<TypeDesc> {
    Arc::new(TypeDesc::base(name, size, encoding))
}

/// `std::vector<T>` with libstdc++'s `_M_impl` layout.
pub fn vector_type(elem: &Arc<TypeDesc>) -> Arc<TypeDesc> {
    let ptr = pointer_to(elem);
    let imp = StructBuilder::new(format!(
        "std::_Vector_base<{0}, std::allocator<{0}> >::_Vector_impl",
        elem.name
    ))
    .field("_M_start", Arc::clone(&ptr))
    .field("_M_finish", Arc::clone(&ptr))
    .field("_M_end_of_storage", ptr)
    .build();

    Arc::new(
        StructBuilder::new(format!(
            "std::vector<{0}, std::allocator<{0}> >",
            elem.name
        ))
        .field("_M_impl", Arc::new(imp))
        .template_type(Arc::clone(elem))
        .template_type(allocator_type(elem))
        .build(),
    )
}

/// `std::vector<bool>` with libstdc++'s bit iterator layout.
pub fn vector_bool_type() -> Arc<TypeDesc> {
    let word_ptr = pointer_to(&base("unsigned long", 8, Encoding::Unsigned));
    let bit_iter = Arc::new(
        StructBuilder::new("std::_Bit_iterator")
            .field("_M_p", Arc::clone(&word_ptr))
            .field("_M_offset", base("unsigned int", 4, Encoding::Unsigned))
            .build(),
    );
    let imp = StructBuilder::new("std::_Bvector_base<std::allocator<bool> >::_Bvector_impl")
        .field("_M_start", Arc::clone(&bit_iter))
        .field("_M_finish", bit_iter)
        .field("_M_end_of_storage", word_ptr)
        .build();

    let boolean = base("bool", 1, Encoding::Bool);
    Arc::new(
        StructBuilder::new("std::vector<bool, std::allocator<bool> >")
            .field("_M_impl", Arc::new(imp))
            .template_type(Arc::clone(&boolean))
            .template_type(allocator_type(&boolean))
            .build(),
    )
}

/// `std::array<T, N>`.
pub fn std_array_type(elem: &Arc<TypeDesc>, length: usize) -> Arc<TypeDesc> {
    Arc::new(
        StructBuilder::new(format!("std::array<{}, {}>", elem.name, length))
            .field("_M_elems", array_of(elem, length))
            .template_type(Arc::clone(elem))
            .template_value(length as i64)
            .build(),
    )
}

/// `std::complex<T>` for `float` or `double` parts.
pub fn complex_type(part: &Arc<TypeDesc>) -> Arc<TypeDesc> {
    let value = base(
        &format!("__complex__ {}", part.name),
        part.size * 2,
        Encoding::Complex,
    );
    Arc::new(
        StructBuilder::new(format!("std::complex<{}>", part.name))
            .field("_M_value", value)
            .template_type(Arc::clone(part))
            .build(),
    )
}

/// In-memory inspected process.
#[derive(Debug, Default)]
pub struct SimTarget {
    memory: Vec<u8>,
    symbols: HashMap<String, Value>,
    byte_order: ByteOrder,
}

impl SimTarget {
    /// Create an empty little-endian target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty target with the given byte order.
    pub fn with_byte_order(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            ..Self::default()
        }
    }

    /// Copy `bytes` into the arena at the next `align`-aligned address.
    pub fn alloc(&mut self, bytes: &[u8], align: usize) -> u64 {
        let align = align.max(1);
        let padded = self.memory.len().div_ceil(align) * align;
        self.memory.resize(padded, 0);
        let addr = BASE_ADDRESS + padded as u64;
        self.memory.extend_from_slice(bytes);
        addr
    }

    /// Store `bytes` as a variable of type `ty`.
    pub fn define(&mut self, name: impl Into<String>, ty: Arc<TypeDesc>, bytes: &[u8]) -> Value {
        let addr = self.alloc(bytes, ty.alignment());
        let value = Value::at(ty, addr);
        self.symbols.insert(name.into(), value.clone());
        value
    }

    /// Bind an existing value (for instance an immediate) to a name.
    pub fn define_value(&mut self, name: impl Into<String>, value: Value) {
        self.symbols.insert(name.into(), value);
    }

    /// Look up a symbol.
    pub fn symbol(&self, name: &str) -> Option<&Value> {
        self.symbols.get(name)
    }

    /// Encode an address the way the target stores pointers.
    pub fn pointer_bytes(&self, addr: u64) -> Vec<u8> {
        self.byte_order.write_uint(addr, POINTER_SIZE)
    }

    /// Allocate `data` and return a pointer variable to it.
    pub fn define_pointer(
        &mut self,
        name: impl Into<String>,
        elem: &Arc<TypeDesc>,
        data: &[u8],
    ) -> Value {
        let addr = self.alloc(data, elem.alignment());
        let bytes = self.pointer_bytes(addr);
        self.define(name, pointer_to(elem), &bytes)
    }

    /// Allocate the storage of a `std::vector<T>` holding `data` (raw element
    /// bytes) and return the bytes of the vector object itself.
    pub fn vector_image(&mut self, elem: &Arc<TypeDesc>, data: &[u8]) -> Vec<u8> {
        let start = self.alloc(data, elem.alignment());
        let finish = start + data.len() as u64;
        let mut image = self.pointer_bytes(start);
        image.extend(self.pointer_bytes(finish));
        image.extend(self.pointer_bytes(finish));
        image
    }

    /// Define a `std::vector<T>` variable holding `data`.
    pub fn define_vector(
        &mut self,
        name: impl Into<String>,
        elem: &Arc<TypeDesc>,
        data: &[u8],
    ) -> Value {
        let image = self.vector_image(elem, data);
        self.define(name, vector_type(elem), &image)
    }

    /// Allocate the words of a `std::vector<bool>` and return the bytes of
    /// the vector object itself.
    pub fn vector_bool_image(&mut self, bits: &[bool]) -> Vec<u8> {
        let words: Vec<u8> = bits
            .chunks(WORD_BITS)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u64, |acc, (i, bit)| acc | (u64::from(*bit) << i))
            })
            .flat_map(|word| self.byte_order.write_uint(word, 8))
            .collect();
        let start = self.alloc(&words, 8);
        let finish = start + (bits.len() / WORD_BITS * 8) as u64;
        let finish_offset = (bits.len() % WORD_BITS) as u64;

        let mut image = self.pointer_bytes(start);
        image.extend(self.byte_order.write_uint(0, 8));
        image.extend(self.pointer_bytes(finish));
        image.extend(self.byte_order.write_uint(finish_offset, 4));
        image.extend([0u8; 4]);
        image.extend(self.pointer_bytes(start + words.len() as u64));
        image
    }

    /// Define a `std::vector<bool>` variable.
    pub fn define_vector_bool(&mut self, name: impl Into<String>, bits: &[bool]) -> Value {
        let image = self.vector_bool_image(bits);
        self.define(name, vector_bool_type(), &image)
    }

    fn parse_expression(&self, expr: &str) -> Result<Value, TargetError> {
        let tokens = tokenize(expr)?;
        if tokens.is_empty() {
            return Err(TargetError::Syntax("empty expression".into()));
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            target: self,
        };
        let result = parser.expr()?;
        if let Some(token) = parser.peek() {
            return Err(TargetError::Syntax(format!(
                "unexpected {token:?} in `{expr}`"
            )));
        }
        match result {
            Operand::Value(value) => Ok(value),
            Operand::Int(v) => {
                let long = base("long", 8, Encoding::Signed);
                Ok(Value::immediate(long, self.byte_order.write_uint(v as u64, 8)))
            }
        }
    }
}

impl TargetValueSource for SimTarget {
    fn evaluate(&self, expr: &str) -> Result<Value, TargetError> {
        self.parse_expression(expr)
    }

    fn read_memory(&self, addr: u64, len: usize) -> Result<Vec<u8>, TargetError> {
        let invalid = TargetError::InvalidAddress { addr, len };
        let offset = addr
            .checked_sub(BASE_ADDRESS)
            .and_then(|o| usize::try_from(o).ok())
            .ok_or_else(|| invalid.clone())?;
        offset
            .checked_add(len)
            .and_then(|end| self.memory.get(offset..end))
            .map(<[u8]>::to_vec)
            .ok_or(invalid)
    }

    fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    fn render(&self, value: &Value) -> Result<String, TargetError> {
        let ty = value.ty().basic();
        let bytes = value.read_bytes(self)?;
        let order = self.byte_order;
        let float = |b: &[u8]| match b.len() {
            4 => f64::from(f32::from_bits(order.read_uint(b) as u32)),
            _ => f64::from_bits(order.read_uint(b)),
        };

        match ty.kind {
            TypeKind::Base(Encoding::Complex) => {
                let half = ty.size / 2;
                let re = float(&bytes[..half]);
                let im = float(&bytes[half..]);
                if im.is_sign_negative() {
                    Ok(format!("{} - {}i", re, -im))
                } else {
                    Ok(format!("{} + {}i", re, im))
                }
            }
            TypeKind::Base(Encoding::Float) => Ok(float(&bytes).to_string()),
            TypeKind::Base(Encoding::Signed) => Ok(order.read_int(&bytes).to_string()),
            TypeKind::Base(Encoding::Unsigned) => Ok(order.read_uint(&bytes).to_string()),
            TypeKind::Base(Encoding::Bool) => Ok((order.read_uint(&bytes) != 0).to_string()),
            _ => Err(TargetError::Unsupported(format!(
                "cannot render value of type {}",
                value.ty()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Ident(String),
    Op(char),
}

fn tokenize(expr: &str) -> Result<Vec<Token>, TargetError> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                Some(hex) => i64::from_str_radix(hex, 16),
                None => text.parse(),
            };
            let value = parsed
                .map_err(|_| TargetError::Syntax(format!("invalid number `{text}`")))?;
            tokens.push(Token::Int(value));
        } else if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() {
                if chars[i].is_alphanumeric() || chars[i] == '_' {
                    i += 1;
                } else if chars[i] == ':' && chars.get(i + 1) == Some(&':') {
                    i += 2;
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else if "+-*/().".contains(c) {
            tokens.push(Token::Op(c));
            i += 1;
        } else {
            return Err(TargetError::Syntax(format!(
                "unexpected character '{c}' in `{expr}`"
            )));
        }
    }
    Ok(tokens)
}

enum Operand {
    Int(i64),
    Value(Value),
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    target: &'a SimTarget,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, op: char) -> bool {
        if self.peek() == Some(&Token::Op(op)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn int(&self, operand: Operand) -> Result<i64, TargetError> {
        match operand {
            Operand::Int(v) => Ok(v),
            Operand::Value(value) => value.to_i64(self.target),
        }
    }

    fn expr(&mut self) -> Result<Operand, TargetError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Op(op @ ('+' | '-'))) => *op,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let a = self.int(lhs)?;
            let b = self.term()?;
            let b = self.int(b)?;
            lhs = Operand::Int(if op == '+' {
                a.wrapping_add(b)
            } else {
                a.wrapping_sub(b)
            });
        }
    }

    fn term(&mut self) -> Result<Operand, TargetError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Op(op @ ('*' | '/'))) => *op,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let a = self.int(lhs)?;
            let b = self.unary()?;
            let b = self.int(b)?;
            lhs = Operand::Int(if op == '*' {
                a.wrapping_mul(b)
            } else {
                a.checked_div(b)
                    .ok_or_else(|| TargetError::Syntax("Division by zero".into()))?
            });
        }
    }

    fn unary(&mut self) -> Result<Operand, TargetError> {
        if self.eat('-') {
            let operand = self.unary()?;
            return Ok(Operand::Int(self.int(operand)?.wrapping_neg()));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Operand, TargetError> {
        let mut operand = self.primary()?;
        while self.eat('.') {
            let member = match self.next() {
                Some(Token::Ident(name)) => name,
                other => {
                    return Err(TargetError::Syntax(format!(
                        "expected member name, found {other:?}"
                    )))
                }
            };
            operand = match operand {
                Operand::Value(value) => Operand::Value(value.field(&member)?),
                Operand::Int(_) => {
                    return Err(TargetError::Syntax(format!(
                        "member `{member}` of a non-aggregate"
                    )))
                }
            };
        }
        Ok(operand)
    }

    fn primary(&mut self) -> Result<Operand, TargetError> {
        match self.next() {
            Some(Token::Int(v)) => Ok(Operand::Int(v)),
            Some(Token::Ident(name)) => self
                .target
                .symbol(&name)
                .cloned()
                .map(Operand::Value)
                .ok_or(TargetError::UnknownSymbol(name)),
            Some(Token::Op('(')) => {
                let inner = self.expr()?;
                if !self.eat(')') {
                    return Err(TargetError::Syntax("missing ')'".into()));
                }
                Ok(inner)
            }
            other => Err(TargetError::Syntax(format!(
                "unexpected {}",
                other.map_or("end of expression".to_string(), |t| format!("{t:?}"))
            ))),
        }
    }
}
