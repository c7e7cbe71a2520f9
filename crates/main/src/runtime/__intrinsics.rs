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

use crate::{
    host::{ClassId, HostCell, HostScalar},
    runtime::{
        BoxedValue,
        Handle,
        Heap,
        MarshalError,
        MarshalResult,
        NativeType,
        Payload,
        Scalar,
        Trampoline,
        Upcast,
    },
};

/// A host scalar type that is stored inline in the [Payload].
pub trait ScalarRepr: HostScalar {
    fn into_scalar(self) -> Scalar;

    fn from_scalar(scalar: &Scalar) -> Option<Self>;
}

/// An integer type that can be a fieldless enum discriminant.
pub trait IntRepr: ScalarRepr + PartialEq {
    fn widen(self) -> i128;
}

/// A fieldless enum exported with the `__export_enum` macro.
pub trait ExportedEnum: Sized {
    type Repr: IntRepr;

    fn into_repr(self) -> Self::Repr;

    fn from_repr(repr: Self::Repr) -> Option<Self>;
}

/// Reads a single element of a `1x1` cell of exactly the `T` host class.
pub fn read_scalar<T: HostScalar>(cell: &HostCell) -> MarshalResult<T> {
    let Some(values) = cell.slice::<T>() else {
        return Err(MarshalError::ClassMismatch {
            expected: T::CLASS,
            actual: cell.class(),
        });
    };

    match values {
        [value] => Ok(*value),

        _ => Err(MarshalError::NonScalar {
            class: T::CLASS,
            actual: values.len(),
        }),
    }
}

/// Reads the elements of an array of exactly the `T` host class.
pub fn read_slice<T: HostScalar>(cell: &HostCell) -> MarshalResult<&[T]> {
    match cell.slice::<T>() {
        Some(values) => Ok(values),

        None => Err(MarshalError::ClassMismatch {
            expected: T::CLASS,
            actual: cell.class(),
        }),
    }
}

/// Reads the nested cells of a cell array.
pub fn read_cells(cell: &HostCell) -> MarshalResult<&[HostCell]> {
    match cell.cells() {
        Some(cells) => Ok(cells),

        None => Err(MarshalError::ClassMismatch {
            expected: ClassId::Cell,
            actual: cell.class(),
        }),
    }
}

#[inline]
pub fn scalar_into_payload<T: ScalarRepr>(this: T) -> Payload {
    Payload::Scalar(this.into_scalar())
}

pub fn scalar_from_payload<T: NativeType + ScalarRepr>(payload: &Payload) -> MarshalResult<T> {
    let Payload::Scalar(scalar) = payload else {
        return Err(MarshalError::TypeMismatch {
            expected: T::type_name(),
            actual: payload.kind(),
        });
    };

    match T::from_scalar(scalar) {
        Some(value) => Ok(value),

        None => Err(MarshalError::TypeMismatch {
            expected: T::type_name(),
            actual: scalar.kind(),
        }),
    }
}

#[inline]
pub fn object_into_payload<T: Trampoline>(this: T) -> Payload {
    Payload::Object(Some(this.to_internal()))
}

pub fn object_from_payload<T: Trampoline>(payload: &Payload) -> MarshalResult<T> {
    match payload {
        Payload::Object(Some(internal)) => T::from_internal(internal),

        Payload::Object(None) => Err(MarshalError::EmptyValue {
            ty: T::type_name(),
        }),

        Payload::Scalar(scalar) => Err(MarshalError::TypeMismatch {
            expected: T::type_name(),
            actual: scalar.kind(),
        }),
    }
}

#[inline]
pub fn object_dispose<T: Trampoline>(payload: Payload) {
    if let Payload::Object(Some(internal)) = payload {
        T::destroy(internal);
    }
}

/// Reads a copy of the heap object referred to by the handle cell.
pub fn downcast_handle<T: Trampoline>(cell: &HostCell, heap: &Heap) -> MarshalResult<T> {
    heap.resolve(cell)?.get::<T>()
}

/// Moves the object into the heap and returns its handle cell.
#[inline]
pub fn upcast_handle<T: Trampoline>(heap: &mut Heap, this: T) -> HostCell {
    heap.insert(BoxedValue::new(this)).to_cell()
}

/// Reads copies of the heap objects referred to by an array of handles.
pub fn read_handles<T: Trampoline>(cell: &HostCell, heap: &Heap) -> MarshalResult<Vec<T>> {
    if T::USE_CELLS {
        return read_cells(cell)?
            .iter()
            .map(|cell| downcast_handle::<T>(cell, heap))
            .collect();
    }

    read_slice::<u64>(cell)?
        .iter()
        .map(|bits| {
            let invalid = MarshalError::InvalidHandle { bits: *bits };

            let handle = Handle::from_bits(*bits).ok_or(invalid.clone())?;

            heap.get(handle).ok_or(invalid)?.get::<T>()
        })
        .collect()
}

/// Moves the objects into the heap and returns an array of their handles.
pub fn write_handles<T: Trampoline>(heap: &mut Heap, items: Vec<T>) -> HostCell {
    if T::USE_CELLS {
        return HostCell::cell_array(
            items
                .into_iter()
                .map(|item| upcast_handle(heap, item))
                .collect(),
        );
    }

    HostCell::from_vec(
        items
            .into_iter()
            .map(|item| heap.insert(BoxedValue::new(item)).to_bits())
            .collect(),
    )
}

pub fn enum_from_payload<T: ExportedEnum + NativeType>(payload: &Payload) -> MarshalResult<T> {
    let Payload::Scalar(scalar) = payload else {
        return Err(MarshalError::TypeMismatch {
            expected: T::type_name(),
            actual: payload.kind(),
        });
    };

    let Some(repr) = <T::Repr as ScalarRepr>::from_scalar(scalar) else {
        return Err(MarshalError::TypeMismatch {
            expected: T::type_name(),
            actual: scalar.kind(),
        });
    };

    enum_from_repr(repr)
}

pub fn enum_from_repr<T: ExportedEnum + NativeType>(repr: T::Repr) -> MarshalResult<T> {
    match T::from_repr(repr) {
        Some(value) => Ok(value),

        None => Err(MarshalError::UnknownVariant {
            ty: T::type_name(),
            value: repr.widen(),
        }),
    }
}

#[inline]
pub fn enum_downcast<T: ExportedEnum + NativeType>(cell: &HostCell) -> MarshalResult<T> {
    enum_from_repr(read_scalar::<T::Repr>(cell)?)
}

pub fn enum_read_array<T: ExportedEnum + NativeType>(cell: &HostCell) -> MarshalResult<Vec<T>> {
    read_slice::<T::Repr>(cell)?
        .iter()
        .map(|repr| enum_from_repr::<T>(*repr))
        .collect()
}

pub fn enum_write_array<T: ExportedEnum>(items: Vec<T>) -> HostCell {
    HostCell::from_vec(items.into_iter().map(T::into_repr).collect())
}

/// Writes a single output into the first requested cell, if any.
pub fn wrap_single<T: Upcast>(
    heap: &mut Heap,
    this: T,
    cells: &mut [Option<HostCell>],
) -> MarshalResult<()> {
    let Some(first) = cells.first_mut() else {
        return Ok(());
    };

    *first = Some(T::upcast(heap, this)?);

    Ok(())
}

/// Exports a struct type whose [Trampoline] is implemented.
///
/// The values of the type cross the host boundary as handles of heap
/// objects.
#[macro_export]
#[doc(hidden)]
macro_rules! __export_boxed {
    ($ty:ty, $name:expr) => {
        impl ::hostbind::runtime::NativeType for $ty {
            const TRIVIAL: bool = false;

            #[inline(always)]
            fn type_name() -> &'static str {
                $name
            }

            #[inline(always)]
            fn into_payload(self) -> ::hostbind::runtime::Payload {
                ::hostbind::runtime::__intrinsics::object_into_payload(self)
            }

            #[inline(always)]
            fn from_payload(
                payload: &::hostbind::runtime::Payload,
            ) -> ::hostbind::runtime::MarshalResult<Self> {
                ::hostbind::runtime::__intrinsics::object_from_payload(payload)
            }

            #[inline(always)]
            fn dispose(payload: ::hostbind::runtime::Payload) {
                ::hostbind::runtime::__intrinsics::object_dispose::<Self>(payload)
            }
        }

        impl ::hostbind::runtime::Downcast for $ty {
            #[inline(always)]
            fn downcast(
                cell: &::hostbind::host::HostCell,
                heap: &::hostbind::runtime::Heap,
            ) -> ::hostbind::runtime::MarshalResult<Self> {
                ::hostbind::runtime::__intrinsics::downcast_handle(cell, heap)
            }
        }

        impl ::hostbind::runtime::Upcast for $ty {
            #[inline(always)]
            fn upcast(
                heap: &mut ::hostbind::runtime::Heap,
                this: Self,
            ) -> ::hostbind::runtime::MarshalResult<::hostbind::host::HostCell> {
                ::std::result::Result::Ok(::hostbind::runtime::__intrinsics::upcast_handle(
                    heap, this,
                ))
            }
        }

        impl ::hostbind::runtime::Outputs for $ty {
            const COUNT: usize = 1;

            #[inline(always)]
            fn wrap(
                heap: &mut ::hostbind::runtime::Heap,
                this: Self,
                cells: &mut [::std::option::Option<::hostbind::host::HostCell>],
            ) -> ::hostbind::runtime::MarshalResult<()> {
                ::hostbind::runtime::__intrinsics::wrap_single(heap, this, cells)
            }
        }

        impl ::hostbind::runtime::Element for $ty {
            #[inline(always)]
            fn read_array(
                cell: &::hostbind::host::HostCell,
                heap: &::hostbind::runtime::Heap,
            ) -> ::hostbind::runtime::MarshalResult<::std::vec::Vec<Self>> {
                ::hostbind::runtime::__intrinsics::read_handles(cell, heap)
            }

            #[inline(always)]
            fn write_array(
                heap: &mut ::hostbind::runtime::Heap,
                items: ::std::vec::Vec<Self>,
            ) -> ::hostbind::runtime::MarshalResult<::hostbind::host::HostCell> {
                ::std::result::Result::Ok(::hostbind::runtime::__intrinsics::write_handles(
                    heap, items,
                ))
            }
        }
    };
}

/// Exports a fieldless enum type with an integer representation.
///
/// The values of the type cross the host boundary as `1x1` numeric cells of
/// the representation's host class.
#[macro_export]
#[doc(hidden)]
macro_rules! __export_enum {
    ($ty:ident, $name:expr, $repr:ty, [$($variant:ident),* $(,)?]) => {
        impl ::hostbind::runtime::__intrinsics::ExportedEnum for $ty {
            type Repr = $repr;

            #[inline(always)]
            fn into_repr(self) -> $repr {
                self as $repr
            }

            #[allow(unreachable_code)]
            fn from_repr(repr: $repr) -> ::std::option::Option<Self> {
                $(
                if repr == $ty::$variant as $repr {
                    return ::std::option::Option::Some($ty::$variant);
                }
                )*

                ::std::option::Option::None
            }
        }

        impl ::hostbind::runtime::NativeType for $ty {
            const TRIVIAL: bool = true;

            #[inline(always)]
            fn type_name() -> &'static str {
                $name
            }

            #[inline(always)]
            fn into_payload(self) -> ::hostbind::runtime::Payload {
                ::hostbind::runtime::__intrinsics::scalar_into_payload(
                    <Self as ::hostbind::runtime::__intrinsics::ExportedEnum>::into_repr(self),
                )
            }

            #[inline(always)]
            fn from_payload(
                payload: &::hostbind::runtime::Payload,
            ) -> ::hostbind::runtime::MarshalResult<Self> {
                ::hostbind::runtime::__intrinsics::enum_from_payload(payload)
            }
        }

        impl ::hostbind::runtime::Downcast for $ty {
            #[inline(always)]
            fn downcast(
                cell: &::hostbind::host::HostCell,
                _heap: &::hostbind::runtime::Heap,
            ) -> ::hostbind::runtime::MarshalResult<Self> {
                ::hostbind::runtime::__intrinsics::enum_downcast(cell)
            }
        }

        impl ::hostbind::runtime::Upcast for $ty {
            #[inline(always)]
            fn upcast(
                _heap: &mut ::hostbind::runtime::Heap,
                this: Self,
            ) -> ::hostbind::runtime::MarshalResult<::hostbind::host::HostCell> {
                ::std::result::Result::Ok(::hostbind::host::HostCell::from_scalar(
                    <Self as ::hostbind::runtime::__intrinsics::ExportedEnum>::into_repr(this),
                ))
            }
        }

        impl ::hostbind::runtime::Outputs for $ty {
            const COUNT: usize = 1;

            #[inline(always)]
            fn wrap(
                heap: &mut ::hostbind::runtime::Heap,
                this: Self,
                cells: &mut [::std::option::Option<::hostbind::host::HostCell>],
            ) -> ::hostbind::runtime::MarshalResult<()> {
                ::hostbind::runtime::__intrinsics::wrap_single(heap, this, cells)
            }
        }

        impl ::hostbind::runtime::Element for $ty {
            #[inline(always)]
            fn read_array(
                cell: &::hostbind::host::HostCell,
                _heap: &::hostbind::runtime::Heap,
            ) -> ::hostbind::runtime::MarshalResult<::std::vec::Vec<Self>> {
                ::hostbind::runtime::__intrinsics::enum_read_array(cell)
            }

            #[inline(always)]
            fn write_array(
                _heap: &mut ::hostbind::runtime::Heap,
                items: ::std::vec::Vec<Self>,
            ) -> ::hostbind::runtime::MarshalResult<::hostbind::host::HostCell> {
                ::std::result::Result::Ok(::hostbind::runtime::__intrinsics::enum_write_array(
                    items,
                ))
            }
        }
    };
}
