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

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt::{Debug, Formatter},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use ahash::RandomState;
use lady_deirdre::sync::Lazy;

use crate::{
    report::system_panic,
    runtime::{MarshalError, MarshalResult, NativeType},
};

static LOCKS_TOTAL: AtomicUsize = AtomicUsize::new(0);

static LOCKS: Lazy<Mutex<HashMap<TypeId, usize, RandomState>>> =
    Lazy::new(|| Mutex::default());

/// Returns the number of live objects that currently keep the module loaded.
///
/// The counter is incremented when the default [Trampoline] path moves a
/// value into an [Internal] representation and decremented when that
/// representation is destroyed. While the counter is positive, the hosting
/// module must not be unloaded.
#[inline(always)]
pub fn lock_count() -> usize {
    LOCKS_TOTAL.load(Ordering::Acquire)
}

/// Returns the number of live objects of type `T` that currently keep the
/// module loaded.
pub fn lock_count_of<T: 'static>() -> usize {
    let locks = LOCKS.lock().unwrap_or_else(|poison| poison.into_inner());

    locks.get(&TypeId::of::<T>()).copied().unwrap_or_default()
}

/// Returns true if at least one live object keeps the module loaded.
#[inline(always)]
pub fn is_locked() -> bool {
    lock_count() > 0
}

// An owned keep-alive lock of a single object.
struct KeepAlive {
    ty: TypeId,
}

impl Drop for KeepAlive {
    fn drop(&mut self) {
        let mut locks = LOCKS.lock().unwrap_or_else(|poison| poison.into_inner());

        let Some(count) = locks.get_mut(&self.ty) else {
            system_panic!("Missing keep-alive lock entry.");
        };

        *count -= 1;

        if *count == 0 {
            let _ = locks.remove(&self.ty);
        }

        LOCKS_TOTAL.fetch_sub(1, Ordering::AcqRel);
    }
}

impl KeepAlive {
    fn acquire(ty: TypeId) -> Self {
        let mut locks = LOCKS.lock().unwrap_or_else(|poison| poison.into_inner());

        *locks.entry(ty).or_default() += 1;

        LOCKS_TOTAL.fetch_add(1, Ordering::AcqRel);

        Self { ty }
    }
}

/// An opaque internal representation of a non-trivial value.
///
/// The [Trampoline] of a type produces this object when the value enters a
/// [BoxedValue](crate::runtime::BoxedValue), and reads the value back from it
/// when the host passes the value into a Rust function.
///
/// The Internal object may optionally hold a keep-alive lock, which keeps the
/// hosting module loaded for as long as the object exists
/// (see [lock_count]).
pub struct Internal {
    data: Box<dyn Any + Send + Sync>,
    lock: Option<KeepAlive>,
}

impl Debug for Internal {
    #[inline]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Internal")
            .field("retained", &self.is_retained())
            .finish_non_exhaustive()
    }
}

impl Internal {
    /// Creates an internal representation that does not keep the module
    /// loaded.
    #[inline(always)]
    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self {
            data: Box::new(data),
            lock: None,
        }
    }

    /// Creates an internal representation that keeps the module loaded until
    /// it is dropped.
    #[inline(always)]
    pub fn retained<T: Any + Send + Sync>(data: T) -> Self {
        Self {
            data: Box::new(data),
            lock: Some(KeepAlive::acquire(TypeId::of::<T>())),
        }
    }

    /// Returns true if this object holds a keep-alive lock.
    #[inline(always)]
    pub fn is_retained(&self) -> bool {
        self.lock.is_some()
    }

    #[inline(always)]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    #[inline(always)]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data.downcast_mut::<T>()
    }

    /// Moves the stored data out, releasing the keep-alive lock.
    ///
    /// Returns the object back if the stored data is not of type `T`.
    pub fn into_inner<T: Any>(self) -> Result<T, Self> {
        let Self { data, lock } = self;

        match data.downcast::<T>() {
            Ok(data) => {
                drop(lock);

                Ok(*data)
            }

            Err(data) => Err(Self { data, lock }),
        }
    }
}

/// A customization point that maps a non-trivial Rust type to and from its
/// [Internal] representation.
///
/// Every method of the trait has a default implementation. Implementing the
/// trait with an empty body selects the default path:
///
/// - [to_internal](Self::to_internal) moves the value into a heap allocation
///   and acquires a keep-alive lock (see [lock_count]).
/// - [from_internal](Self::from_internal) clones the stored value.
/// - [destroy](Self::destroy) frees the allocation and releases the lock.
///
/// Overriding the methods selects custom behavior, which is useful for types
/// that need special construction or destruction, or that should be stored in
/// a different form.
///
/// ```
/// use hostbind::runtime::{Internal, MarshalError, MarshalResult, Trampoline};
///
/// #[hostbind::export(custom)]
/// #[derive(Clone, Debug, PartialEq)]
/// struct Celsius(f64);
///
/// impl Trampoline for Celsius {
///     fn to_internal(self) -> Internal {
///         // Stored as a plain number without a keep-alive lock.
///         Internal::new(self.0)
///     }
///
///     fn from_internal(internal: &Internal) -> MarshalResult<Self> {
///         match internal.downcast_ref::<f64>() {
///             Some(degrees) => Ok(Self(*degrees)),
///             None => Err(MarshalError::TypeMismatch {
///                 expected: "Celsius",
///                 actual: "unknown",
///             }),
///         }
///     }
/// }
///
/// let internal = Celsius(36.6).to_internal();
///
/// assert!(!internal.is_retained());
/// assert_eq!(Celsius::from_internal(&internal).unwrap(), Celsius(36.6));
/// ```
pub trait Trampoline: NativeType + Clone {
    /// If true, arrays of this type cross the host boundary as host cell
    /// arrays of handles. Otherwise, arrays of this type cross the boundary
    /// as `UInt64` arrays of handles.
    const USE_CELLS: bool = false;

    /// Moves the value into its internal representation.
    #[inline(always)]
    fn to_internal(self) -> Internal {
        Internal::retained(self)
    }

    /// Reads a copy of the value from its internal representation.
    #[inline]
    fn from_internal(internal: &Internal) -> MarshalResult<Self> {
        match internal.downcast_ref::<Self>() {
            Some(value) => Ok(value.clone()),

            None => Err(MarshalError::TypeMismatch {
                expected: Self::type_name(),
                actual: "unknown",
            }),
        }
    }

    /// Provides mutable access to the value inside its internal
    /// representation.
    ///
    /// The default implementation fails with [MarshalError::ReadOnly] if the
    /// internal representation does not store the value as is.
    #[inline]
    fn borrow_mut(internal: &mut Internal) -> MarshalResult<&mut Self> {
        match internal.downcast_mut::<Self>() {
            Some(value) => Ok(value),

            None => Err(MarshalError::ReadOnly {
                ty: Self::type_name(),
            }),
        }
    }

    /// Releases the internal representation.
    #[inline(always)]
    fn destroy(internal: Internal) {
        drop(internal);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::{
        export,
        runtime::{
            lock_count,
            lock_count_of,
            BoxedValue,
            Heap,
            Internal,
            MarshalError,
            MarshalResult,
            Trampoline,
        },
    };

    #[derive(Clone, PartialEq, Debug)]
    struct Token(usize);

    static GAUGES_DESTROYED: AtomicUsize = AtomicUsize::new(0);

    // Stored as a bare number without a keep-alive lock.
    #[export(custom)]
    #[derive(Clone, PartialEq, Debug)]
    struct Gauge(u32);

    impl Trampoline for Gauge {
        fn to_internal(self) -> Internal {
            Internal::new(self.0)
        }

        fn from_internal(internal: &Internal) -> MarshalResult<Self> {
            match internal.downcast_ref::<u32>() {
                Some(value) => Ok(Self(*value)),

                None => Err(MarshalError::TypeMismatch {
                    expected: "Gauge",
                    actual: "unknown",
                }),
            }
        }

        fn destroy(internal: Internal) {
            let _ = GAUGES_DESTROYED.fetch_add(1, Ordering::SeqCst);

            drop(internal);
        }
    }

    fn destroyed() -> usize {
        GAUGES_DESTROYED.load(Ordering::SeqCst)
    }

    #[test]
    fn test_keep_alive_counter() {
        let before = lock_count_of::<Token>();

        let first = Internal::retained(Token(1));
        let second = Internal::retained(Token(2));
        let plain = Internal::new(Token(3));

        assert_eq!(lock_count_of::<Token>(), before + 2);
        assert!(lock_count() >= 2);
        assert!(first.is_retained());
        assert!(!plain.is_retained());

        drop(first);

        assert_eq!(lock_count_of::<Token>(), before + 1);

        let value = second.into_inner::<Token>().unwrap();

        assert_eq!(value, Token(2));
        assert_eq!(lock_count_of::<Token>(), before);

        drop(plain);

        assert_eq!(lock_count_of::<Token>(), before);
    }

    #[test]
    fn test_internal_downcast() {
        let mut internal = Internal::new(Token(5));

        assert_eq!(internal.downcast_ref::<Token>(), Some(&Token(5)));
        assert!(internal.downcast_ref::<usize>().is_none());

        if let Some(token) = internal.downcast_mut::<Token>() {
            token.0 = 6;
        }

        let internal = internal.into_inner::<usize>().unwrap_err();

        assert_eq!(internal.into_inner::<Token>().unwrap(), Token(6));
    }

    #[test]
    fn test_custom_destroy() {
        let boxed = BoxedValue::new(Gauge(1));

        assert_eq!(boxed.get::<Gauge>().unwrap(), Gauge(1));
        assert_eq!(lock_count_of::<Gauge>(), 0);
        assert_eq!(destroyed(), 0);

        drop(boxed);

        assert_eq!(destroyed(), 1);

        let mut boxed = BoxedValue::new(Gauge(2));

        assert_eq!(boxed.take::<Gauge>().unwrap(), Gauge(2));
        assert_eq!(destroyed(), 2);

        drop(boxed);

        assert_eq!(destroyed(), 2);

        let mut heap = Heap::new();
        let handle = heap.insert(BoxedValue::new(Gauge(3)));

        assert!(matches!(
            heap.destroy::<String>(handle),
            Err(MarshalError::TypeMismatch { .. }),
        ));
        assert_eq!(destroyed(), 2);

        heap.destroy::<Gauge>(handle).unwrap();

        assert_eq!(destroyed(), 3);

        assert!(matches!(
            heap.destroy::<Gauge>(handle),
            Err(MarshalError::InvalidHandle { .. }),
        ));

        let _ = heap.insert(BoxedValue::new(Gauge(4)));

        heap.clear();

        assert_eq!(destroyed(), 4);

        drop(heap);

        assert_eq!(destroyed(), 4);

        // The internal form is not the value itself, so it cannot be mutated
        // in place.
        let mut boxed = BoxedValue::new(Gauge(5));

        assert!(matches!(
            boxed.borrow_mut::<Gauge>(),
            Err(MarshalError::ReadOnly { ty: "Gauge" }),
        ));
        assert_eq!(boxed.get::<Gauge>().unwrap(), Gauge(5));

        drop(boxed);

        assert_eq!(destroyed(), 5);
    }
}
