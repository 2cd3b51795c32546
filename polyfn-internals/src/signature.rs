//! Call signatures and the portable variadic argument pack.
//!
//! A [`Signature`] is a type-level description of how a wrapped callable is
//! invoked. It is implemented for plain function-pointer types such as
//! `fn(i32, &'static str) -> bool` and for [`Variadic`] signatures, which
//! append one synthetic trailing [`VarArgs`] parameter.
//!
//! The signature is pure compile-time classification: it never appears as a
//! runtime value inside a wrapper, except through its [`Pointer`] type when a
//! bare function pointer is stored.
//!
//! [`Pointer`]: Signature::Pointer

use alloc::vec::Vec;
use core::marker::PhantomData;

use crate::util::count_idents;

/// A normalized call signature.
///
/// # Implementations
///
/// This trait is implemented for:
///
/// - `fn(A1, .., An) -> R` for `n` in `0..=6`
/// - [`Variadic<fn(A1, .., An) -> R>`](Variadic) for `n` in `0..=6`
///
/// All parameter and return types must be `'static`, because the vtables
/// generated for a signature are `&'static` values.
///
/// # Examples
///
/// ```
/// use polyfn_internals::signature::{Signature, Variadic};
///
/// assert_eq!(<fn(i32, i32) -> i32 as Signature>::ARITY, 2);
/// assert!(!<fn(i32, i32) -> i32 as Signature>::VARIADIC);
///
/// // The variadic pack counts as one extra parameter
/// assert_eq!(<Variadic<fn(i32) -> i32> as Signature>::ARITY, 2);
/// assert!(<Variadic<fn(i32) -> i32> as Signature>::VARIADIC);
/// ```
pub trait Signature: Sized + 'static {
    /// The arguments of the signature, as a tuple.
    type Args: 'static;
    /// The return type of the signature.
    type Output: 'static;
    /// The function-pointer type that can be stored directly as a target.
    type Pointer: FnPointer;
    /// The number of parameters, including the variadic pack if any.
    const ARITY: usize;
    /// Whether the signature ends in a [`VarArgs`] pack.
    const VARIADIC: bool;

    /// Calls a function pointer of this signature with an argument tuple.
    fn invoke_pointer(pointer: Self::Pointer, args: Self::Args) -> Self::Output;
}

/// Marker for a signature that accepts a trailing [`VarArgs`] pack.
///
/// `Variadic<fn(A) -> R>` describes callables with the shape
/// `Fn(A, VarArgs) -> R`. This is the portable stand-in for a C-variadic
/// signature such as `R(A, ...)`: the trailing arguments are gathered into an
/// owned pack and forwarded as one value.
pub struct Variadic<F>(PhantomData<F>);

/// Sealing for [`FnPointer`].
mod sealed {
    /// Prevents implementations of [`FnPointer`](super::FnPointer) outside
    /// this crate.
    pub trait Sealed {}
}

/// Function-pointer types that can be stored in a
/// [`RawHandle`](crate::handle::RawHandle).
///
/// This trait is sealed. It is implemented for `fn(A1, .., An) -> R` with up
/// to seven parameters, which covers the pointer type of every [`Signature`],
/// including variadic ones.
pub trait FnPointer: Copy + 'static + sealed::Sealed {}

macro_rules! impl_fn_pointer {
    ($($A:ident $a:ident),*) => {
        impl<R: 'static, $($A: 'static),*> sealed::Sealed for fn($($A),*) -> R {}
        impl<R: 'static, $($A: 'static),*> FnPointer for fn($($A),*) -> R {}
    };
}

crate::for_each_arity!(impl_fn_pointer);
// The pointer of a six-parameter variadic signature has seven parameters
impl_fn_pointer!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);

macro_rules! impl_signature {
    ($($A:ident $a:ident),*) => {
        impl<R: 'static, $($A: 'static),*> Signature for fn($($A),*) -> R {
            type Args = ($($A,)*);
            type Output = R;
            type Pointer = fn($($A),*) -> R;
            const ARITY: usize = count_idents!($($A)*);
            const VARIADIC: bool = false;

            #[inline]
            fn invoke_pointer(pointer: Self::Pointer, ($($a,)*): Self::Args) -> R {
                pointer($($a),*)
            }
        }

        impl<R: 'static, $($A: 'static),*> Signature for Variadic<fn($($A),*) -> R> {
            type Args = ($($A,)* VarArgs,);
            type Output = R;
            type Pointer = fn($($A,)* VarArgs) -> R;
            const ARITY: usize = count_idents!($($A)*) + 1;
            const VARIADIC: bool = true;

            #[inline]
            fn invoke_pointer(pointer: Self::Pointer, ($($a,)* rest,): Self::Args) -> R {
                pointer($($a,)* rest)
            }
        }
    };
}

crate::for_each_arity!(impl_signature);

/// A single promoted argument inside a [`VarArgs`] pack.
///
/// The variants mirror the C default argument promotions: every integer
/// narrower than 64 bits is widened, `f32` becomes `f64`, and pointers are
/// passed as untyped addresses.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum VarArg {
    /// A signed integer, `bool` or `char`.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A floating-point number.
    Double(f64),
    /// An untyped pointer.
    Ptr(*const ()),
}

macro_rules! impl_var_arg {
    ($variant:ident as $wide:ty: $($ty:ty),*) => {
        $(
            impl From<$ty> for VarArg {
                #[inline]
                fn from(value: $ty) -> Self {
                    VarArg::$variant(value as $wide)
                }
            }

            impl FromVarArg for $ty {
                #[inline]
                fn from_var_arg(arg: VarArg) -> Option<Self> {
                    match arg {
                        VarArg::$variant(value) => <$ty>::try_from(value).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

/// Types that can be read back out of a [`VarArg`].
///
/// Reading is checked: a mismatched variant, or a value that does not fit the
/// requested type, yields `None`.
pub trait FromVarArg: Sized {
    /// Converts the argument, if it has a compatible kind and range.
    fn from_var_arg(arg: VarArg) -> Option<Self>;
}

impl_var_arg!(Int as i64: i8, i16, i32, i64, isize);
impl_var_arg!(UInt as u64: u8, u16, u32, u64, usize);

impl From<bool> for VarArg {
    #[inline]
    fn from(value: bool) -> Self {
        VarArg::Int(i64::from(value))
    }
}

impl FromVarArg for bool {
    #[inline]
    fn from_var_arg(arg: VarArg) -> Option<Self> {
        match arg {
            VarArg::Int(0) => Some(false),
            VarArg::Int(1) => Some(true),
            _ => None,
        }
    }
}

impl From<char> for VarArg {
    #[inline]
    fn from(value: char) -> Self {
        VarArg::Int(i64::from(u32::from(value)))
    }
}

impl FromVarArg for char {
    #[inline]
    fn from_var_arg(arg: VarArg) -> Option<Self> {
        match arg {
            VarArg::Int(value) => u32::try_from(value).ok().and_then(char::from_u32),
            _ => None,
        }
    }
}

impl From<f32> for VarArg {
    #[inline]
    fn from(value: f32) -> Self {
        VarArg::Double(f64::from(value))
    }
}

impl From<f64> for VarArg {
    #[inline]
    fn from(value: f64) -> Self {
        VarArg::Double(value)
    }
}

impl FromVarArg for f64 {
    #[inline]
    fn from_var_arg(arg: VarArg) -> Option<Self> {
        match arg {
            VarArg::Double(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<*const T> for VarArg {
    #[inline]
    fn from(value: *const T) -> Self {
        VarArg::Ptr(value.cast::<()>())
    }
}

impl<T> From<*mut T> for VarArg {
    #[inline]
    fn from(value: *mut T) -> Self {
        VarArg::Ptr(value.cast_const().cast::<()>())
    }
}

impl<T> FromVarArg for *const T {
    #[inline]
    fn from_var_arg(arg: VarArg) -> Option<Self> {
        match arg {
            VarArg::Ptr(value) => Some(value.cast::<T>()),
            _ => None,
        }
    }
}

/// An owned pack of trailing arguments for a [`Variadic`] signature.
///
/// The pack is read front to back, like a `va_list`: every successful call to
/// [`arg`](VarArgs::arg) consumes one argument.
///
/// # Examples
///
/// ```
/// use polyfn_internals::signature::{VarArg, VarArgs};
///
/// let mut args: VarArgs = [VarArg::from(1i32), VarArg::from(2.5f32)].into_iter().collect();
/// assert_eq!(args.len(), 2);
/// assert_eq!(args.arg::<i32>(), Some(1));
/// assert_eq!(args.arg::<f64>(), Some(2.5));
/// assert_eq!(args.arg::<i32>(), None);
/// ```
#[derive(Clone, Default, PartialEq, Debug)]
pub struct VarArgs {
    /// The promoted arguments, in call order.
    args: Vec<VarArg>,
    /// Index of the next argument returned by [`VarArgs::arg`].
    cursor: usize,
}

impl VarArgs {
    /// Creates an empty pack.
    #[inline]
    pub const fn new() -> Self {
        Self {
            args: Vec::new(),
            cursor: 0,
        }
    }

    /// Appends an argument to the end of the pack.
    #[inline]
    pub fn push(&mut self, arg: impl Into<VarArg>) {
        self.args.push(arg.into());
    }

    /// Reads the next argument as a `T`.
    ///
    /// Returns `None` without consuming anything if the pack is exhausted or
    /// the next argument cannot be represented as a `T`.
    #[inline]
    pub fn arg<T: FromVarArg>(&mut self) -> Option<T> {
        let value = T::from_var_arg(*self.args.get(self.cursor)?)?;
        self.cursor += 1;
        Some(value)
    }

    /// Returns the next argument without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<VarArg> {
        self.args.get(self.cursor).copied()
    }

    /// Returns the arguments that have not been read yet.
    #[inline]
    pub fn remaining(&self) -> &[VarArg] {
        &self.args[self.cursor..]
    }

    /// Returns the total number of arguments in the pack, read or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns `true` if the pack holds no arguments at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

impl From<Vec<VarArg>> for VarArgs {
    #[inline]
    fn from(args: Vec<VarArg>) -> Self {
        Self { args, cursor: 0 }
    }
}

impl FromIterator<VarArg> for VarArgs {
    #[inline]
    fn from_iter<I: IntoIterator<Item = VarArg>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
