////////////////////////////////////////////////////////////////////////////////
// This file is part of "Ad Astra", an embeddable scripting programming       //
// language platform.                                                         //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/ad-astra/blob/master/EULA.md               //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use std::fmt::{Debug, Formatter};

use crate::{
    host::HostCell,
    runtime::{BoxedValue, Heap, MarshalResult, NativeType, TypeMeta},
};

/// A Rust type that can be loaded from a host cell.
///
/// The trait is implemented for the trivial types (`bool`, integers, floats),
/// [String], [Vec], [Duration](std::time::Duration), and the types exported
/// with the [export](crate::export) macro.
///
/// The downcast never reinterprets a cell as another type. Trivial types
/// require a `1x1` cell of exactly their host class. Exported struct types
/// require a handle cell that refers to a heap value of exactly their type.
pub trait Downcast: NativeType {
    /// Converts the host cell into a Rust value.
    ///
    /// The function reads object handles through the `heap`.
    fn downcast(cell: &HostCell, heap: &Heap) -> MarshalResult<Self>;

    /// Reads the value from a default value of a function parameter.
    #[inline(always)]
    fn from_boxed(value: &BoxedValue) -> MarshalResult<Self> {
        value.get::<Self>()
    }

    /// Returns the descriptor of this type.
    #[inline(always)]
    fn hint() -> TypeMeta {
        TypeMeta::of::<Self>()
    }
}

/// A Rust type that can be converted into a host cell.
///
/// Non-trivial values are moved into the `heap`, and the host receives their
/// handles.
pub trait Upcast: Sized {
    /// Converts the Rust value into a host cell.
    fn upcast(heap: &mut Heap, this: Self) -> MarshalResult<HostCell>;
}

/// A return type of a Rust function that spreads over the host output cells.
///
/// - `()` produces no outputs.
/// - Any [Upcast] type produces one output.
/// - Tuples of two or more Upcast types produce one output per component.
/// - `Result<T, E>` produces the outputs of `T`, or a fatal error.
pub trait Outputs: Sized {
    /// The number of outputs this type produces.
    const COUNT: usize;

    /// Writes the outputs into the cells requested by the caller.
    ///
    /// The function writes at most `min(COUNT, cells.len())` cells, starting
    /// from the first one, and leaves the rest untouched. The components that
    /// the caller did not request are dropped without conversion.
    fn wrap(heap: &mut Heap, this: Self, cells: &mut [Option<HostCell>]) -> MarshalResult<()>;
}

/// A Rust type that can be an element of a [Vec] crossing the host boundary.
///
/// Trivial elements form numeric (or logical) host arrays. Strings form cell
/// arrays of character cells. Exported struct elements form `UInt64` arrays of
/// handles, or cell arrays of handle cells if the type's
/// [Trampoline](crate::runtime::Trampoline) sets the
/// [USE_CELLS](crate::runtime::Trampoline::USE_CELLS) flag.
pub trait Element: NativeType + Clone {
    /// Converts a host array into a vector of elements.
    fn read_array(cell: &HostCell, heap: &Heap) -> MarshalResult<Vec<Self>>;

    /// Converts a vector of elements into a host array.
    fn write_array(heap: &mut Heap, items: Vec<Self>) -> MarshalResult<HostCell>;
}

/// A loader of a single function argument.
///
/// The Caster tries to load the argument from the host cell first, and falls
/// back to the parameter's default value if the cell is missing or does not
/// fit the type.
///
/// ```
/// use hostbind::{
///     host::HostCell,
///     runtime::{BoxedValue, Caster, Heap},
/// };
///
/// let heap = Heap::new();
/// let default = BoxedValue::new(5i32);
///
/// let mut caster = Caster::<i32>::new();
///
/// // A character cell does not fit the i32 type.
/// assert!(!caster.load(&HostCell::from_string("foo"), &heap).unwrap());
/// assert!(caster.load_default(Some(&default)).unwrap());
///
/// assert_eq!(caster.into_inner(), Some(5));
/// ```
pub struct Caster<T> {
    value: Option<T>,
}

impl<T: Debug> Debug for Caster<T> {
    #[inline]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Caster")
            .field("value", &self.value)
            .finish()
    }
}

impl<T: Downcast> Default for Caster<T> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Downcast> Caster<T> {
    #[inline(always)]
    pub const fn new() -> Self {
        Self { value: None }
    }

    /// Loads the argument from the host cell.
    ///
    /// Returns false if the cell does not fit the type. Fails only if the
    /// conversion fails for a reason other than the type mismatch.
    pub fn load(&mut self, cell: &HostCell, heap: &Heap) -> MarshalResult<bool> {
        match T::downcast(cell, heap) {
            Ok(value) => {
                self.value = Some(value);
                Ok(true)
            }

            Err(error) if error.is_recoverable() => Ok(false),

            Err(error) => Err(error),
        }
    }

    /// Loads the argument from the parameter's default value, unless the
    /// argument has already been loaded.
    ///
    /// Returns false if the argument is still missing.
    pub fn load_default(&mut self, default: Option<&BoxedValue>) -> MarshalResult<bool> {
        if self.value.is_some() {
            return Ok(true);
        }

        let Some(default) = default else {
            return Ok(false);
        };

        if !default.can_convert::<T>() {
            return Ok(false);
        }

        self.value = Some(T::from_boxed(default)?);

        Ok(true)
    }

    #[inline(always)]
    pub fn is_loaded(&self) -> bool {
        self.value.is_some()
    }

    #[inline(always)]
    pub fn into_inner(self) -> Option<T> {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        host::HostCell,
        runtime::{BoxedValue, Caster, Heap},
    };

    #[test]
    fn test_default_never_overwrites() {
        let heap = Heap::new();
        let default = BoxedValue::new(100u8);

        let mut caster = Caster::<u8>::new();

        assert!(caster.load(&HostCell::from_scalar(7u8), &heap).unwrap());
        assert!(caster.load_default(Some(&default)).unwrap());
        assert_eq!(caster.into_inner(), Some(7));
    }

    #[test]
    fn test_default_type_check() {
        let default = BoxedValue::new(100u16);

        let mut caster = Caster::<u8>::new();

        assert!(!caster.load_default(Some(&default)).unwrap());
        assert!(!caster.load_default(None).unwrap());
        assert!(!caster.is_loaded());
    }

    #[test]
    fn test_load_rejections() {
        let heap = Heap::new();

        let mut caster = Caster::<i64>::new();

        assert!(!caster.load(&HostCell::from_scalar(7i32), &heap).unwrap());
        assert!(!caster.load(&HostCell::from_vec(vec![1i64, 2]), &heap).unwrap());
        assert!(!caster.load(&HostCell::empty(), &heap).unwrap());
        assert!(caster.load(&HostCell::from_scalar(-1i64), &heap).unwrap());
        assert_eq!(caster.into_inner(), Some(-1));
    }
}
