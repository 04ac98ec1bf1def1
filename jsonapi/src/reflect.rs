//! Read and write views over field values.
//!
//! The walker only sees fields as `&dyn Reflect`. [`Reflect::peek`] and
//! [`Reflect::poke`] tell the engines what a field holds: a scalar, an
//! optional value, a nested record, a list of records, links, or an opaque
//! value that only a registered codec understands.

use core::any::Any;

use crate::{Links, Shaped};

/// A scalar field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Usize(usize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    Isize(isize),
    F32(f32),
    F64(f64),
    Str(&'a str),
}

/// A mutable scalar field.
#[derive(Debug)]
pub enum ScalarMut<'a> {
    Bool(&'a mut bool),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    U128(&'a mut u128),
    Usize(&'a mut usize),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    I128(&'a mut i128),
    Isize(&'a mut isize),
    F32(&'a mut f32),
    F64(&'a mut f64),
    String(&'a mut String),
}

impl ScalarMut<'_> {
    /// The Rust type name of the scalar.
    pub const fn type_name(&self) -> &'static str {
        match self {
            ScalarMut::Bool(_) => "bool",
            ScalarMut::U8(_) => "u8",
            ScalarMut::U16(_) => "u16",
            ScalarMut::U32(_) => "u32",
            ScalarMut::U64(_) => "u64",
            ScalarMut::U128(_) => "u128",
            ScalarMut::Usize(_) => "usize",
            ScalarMut::I8(_) => "i8",
            ScalarMut::I16(_) => "i16",
            ScalarMut::I32(_) => "i32",
            ScalarMut::I64(_) => "i64",
            ScalarMut::I128(_) => "i128",
            ScalarMut::Isize(_) => "isize",
            ScalarMut::F32(_) => "f32",
            ScalarMut::F64(_) => "f64",
            ScalarMut::String(_) => "String",
        }
    }
}

/// Read view of a field.
pub enum Peek<'a> {
    Scalar(Scalar<'a>),
    /// `Option<T>`; `Some` carries the inner value
    Option(Option<&'a dyn Reflect>),
    /// A derived record
    Struct(&'a dyn Shaped),
    /// `Vec<T>` of derived records
    List(Vec<&'a dyn Shaped>),
    Links(&'a Links),
    /// Only a registered codec can handle this value
    Opaque,
}

/// Write view of a field.
pub enum Poke<'a> {
    Scalar(ScalarMut<'a>),
    Option(&'a mut dyn OptionSlot),
    Struct(&'a mut dyn Shaped),
    List(&'a mut dyn ListSlot),
    Links(&'a mut Links),
    Opaque,
}

/// A value the mapping engines can look into.
///
/// Implemented for the scalar types, `String`, `Option<T>`, `Box<T>`,
/// `Vec<T>` of records, [`Links`], and every `#[derive(JsonApi)]` type.
/// Other types can be made mappable with [`opaque!`](crate::opaque) and a
/// registered codec.
pub trait Reflect: Any {
    /// Read view.
    fn peek(&self) -> Peek<'_>;

    /// Write view.
    fn poke(&mut self) -> Poke<'_>;

    /// The Rust type name, for error messages.
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Type-erased access to an `Option<T>` field.
pub trait OptionSlot {
    /// Returns the inner value, storing `T::default()` first if empty.
    fn insert(&mut self) -> &mut dyn Reflect;

    /// Resets the field to `None`.
    fn clear(&mut self);
}

/// Type-erased access to a `Vec<T>` of records.
pub trait ListSlot {
    /// Removes every element.
    fn clear(&mut self);

    /// Appends `T::default()` and returns it.
    fn push_default(&mut self) -> &mut dyn Shaped;
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn peek(&self) -> Peek<'_> {
                    Peek::Scalar(Scalar::$variant(*self))
                }

                fn poke(&mut self) -> Poke<'_> {
                    Poke::Scalar(ScalarMut::$variant(self))
                }
            }
        )*
    };
}

impl_scalar! {
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    f32 => F32,
    f64 => F64,
}

impl Reflect for String {
    fn peek(&self) -> Peek<'_> {
        Peek::Scalar(Scalar::Str(self))
    }

    fn poke(&mut self) -> Poke<'_> {
        Poke::Scalar(ScalarMut::String(self))
    }
}

impl<T: Reflect + Default> Reflect for Option<T> {
    fn peek(&self) -> Peek<'_> {
        Peek::Option(self.as_ref().map(|v| v as &dyn Reflect))
    }

    fn poke(&mut self) -> Poke<'_> {
        Poke::Option(self)
    }
}

impl<T: Reflect + Default> OptionSlot for Option<T> {
    fn insert(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }

    fn clear(&mut self) {
        *self = None;
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn peek(&self) -> Peek<'_> {
        (**self).peek()
    }

    fn poke(&mut self) -> Poke<'_> {
        (**self).poke()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

impl<T: Shaped + Default> Reflect for Vec<T> {
    fn peek(&self) -> Peek<'_> {
        Peek::List(self.iter().map(|v| v as &dyn Shaped).collect())
    }

    fn poke(&mut self) -> Poke<'_> {
        Poke::List(self)
    }
}

impl<T: Shaped + Default> ListSlot for Vec<T> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn push_default(&mut self) -> &mut dyn Shaped {
        self.push(T::default());
        let last = self.len() - 1;
        &mut self[last]
    }
}

impl Reflect for Links {
    fn peek(&self) -> Peek<'_> {
        Peek::Links(self)
    }

    fn poke(&mut self) -> Poke<'_> {
        Poke::Links(self)
    }
}

/// Makes a type usable as a field whose encoding comes from a registered codec.
///
/// ```
/// #[derive(Debug, Default, PartialEq)]
/// struct Color(u8, u8, u8);
///
/// jsonapi::opaque!(Color);
/// ```
#[macro_export]
macro_rules! opaque {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Reflect for $ty {
                fn peek(&self) -> $crate::Peek<'_> {
                    $crate::Peek::Opaque
                }

                fn poke(&mut self) -> $crate::Poke<'_> {
                    $crate::Poke::Opaque
                }
            }
        )+
    };
}
