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

use std::fmt::{Debug, Display, Formatter};

use log::debug;
use slotmap::{DefaultKey, Key, KeyData, SlotMap};

use crate::{
    host::{ClassId, HostCell},
    runtime::{BoxedValue, MarshalError, MarshalResult, NativeType, Trampoline},
};

static HEAP_LOG: &str = "hostbind::$heap";

/// A host-visible reference to a [BoxedValue] owned by the [Heap].
///
/// On the wire, the handle is a single non-zero `u64` number: the slot
/// version in the high 32 bits and the slot index in the low 32 bits
/// (see [to_bits](Self::to_bits)). The version changes whenever the slot is
/// released, so stale handles never resolve to a newer value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Handle(DefaultKey);

impl Display for Handle {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("#{:x}", self.to_bits()))
    }
}

impl Handle {
    /// Encodes this handle into the wire representation.
    #[inline(always)]
    pub fn to_bits(self) -> u64 {
        self.0.data().as_ffi()
    }

    /// Decodes a handle from the wire representation.
    ///
    /// Returns None for the numbers that can never denote a handle.
    #[inline]
    pub fn from_bits(bits: u64) -> Option<Self> {
        // Slot index zero is reserved by the arena, and occupied slots always
        // have odd versions.
        if bits as u32 == 0 || (bits >> 32) & 1 == 0 {
            return None;
        }

        Some(Self(KeyData::from_ffi(bits).into()))
    }

    /// Decodes a handle from a host cell.
    ///
    /// The cell must be a `1x1` [UInt64](ClassId::UInt64) cell.
    pub fn from_cell(cell: &HostCell) -> MarshalResult<Self> {
        if cell.class() != ClassId::UInt64 {
            return Err(MarshalError::ClassMismatch {
                expected: ClassId::UInt64,
                actual: cell.class(),
            });
        }

        let Some(bits) = cell.scalar::<u64>() else {
            return Err(MarshalError::NonScalar {
                class: ClassId::UInt64,
                actual: cell.len(),
            });
        };

        Self::from_bits(bits).ok_or(MarshalError::InvalidHandle { bits })
    }

    /// Encodes this handle into a host cell.
    #[inline(always)]
    pub fn to_cell(self) -> HostCell {
        HostCell::from_handle(self.to_bits())
    }
}

/// An arena of the [BoxedValue]s that the host refers to by [Handle]s.
///
/// Each dispatch [Module](crate::dispatch::Module) owns one heap. The heap
/// exclusively owns its values: a value is destroyed exactly once, either
/// when the host explicitly releases its handle, or when the heap is
/// [cleared](Self::clear) or dropped.
pub struct Heap {
    values: SlotMap<DefaultKey, BoxedValue>,
}

impl Default for Heap {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Heap {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Heap")
            .field("live", &self.values.len())
            .field("capacity", &self.values.capacity())
            .finish_non_exhaustive()
    }
}

impl Heap {
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            values: SlotMap::new(),
        }
    }

    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: SlotMap::with_capacity(capacity),
        }
    }

    /// Returns the number of live values.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Moves the value into the heap and returns its handle.
    pub fn insert(&mut self, value: BoxedValue) -> Handle {
        let ty = value.ty();
        let handle = Handle(self.values.insert(value));

        debug!(target: HEAP_LOG, "Allocated {handle} of '{ty}' type.");

        handle
    }

    /// Returns the value referred to by the handle, or None if the handle is
    /// stale or foreign.
    #[inline(always)]
    pub fn get(&self, handle: Handle) -> Option<&BoxedValue> {
        self.values.get(handle.0)
    }

    #[inline(always)]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut BoxedValue> {
        self.values.get_mut(handle.0)
    }

    /// Resolves the handle stored in a host cell.
    pub fn resolve(&self, cell: &HostCell) -> MarshalResult<&BoxedValue> {
        let handle = Handle::from_cell(cell)?;

        self.get(handle).ok_or(MarshalError::InvalidHandle {
            bits: handle.to_bits(),
        })
    }

    /// Provides mutable access to the object referred to by the handle.
    pub fn borrow_mut<T: Trampoline>(&mut self, handle: Handle) -> MarshalResult<&mut T> {
        match self.get_mut(handle) {
            Some(value) => value.borrow_mut::<T>(),

            None => Err(MarshalError::InvalidHandle {
                bits: handle.to_bits(),
            }),
        }
    }

    /// Removes the value from the heap and returns it to the caller.
    ///
    /// The handle and all of its copies become stale.
    pub fn release(&mut self, handle: Handle) -> Option<BoxedValue> {
        let value = self.values.remove(handle.0)?;

        debug!(target: HEAP_LOG, "Released {handle} of '{}' type.", value.ty());

        Some(value)
    }

    /// Destroys the value of type `T` referred to by the handle.
    ///
    /// The value's type is checked before the destruction. The heap is left
    /// untouched if the check fails.
    pub fn destroy<T: NativeType>(&mut self, handle: Handle) -> MarshalResult<()> {
        let Some(value) = self.get(handle) else {
            return Err(MarshalError::InvalidHandle {
                bits: handle.to_bits(),
            });
        };

        if !value.can_convert::<T>() {
            return Err(MarshalError::TypeMismatch {
                expected: T::type_name(),
                actual: value.ty().name(),
            });
        }

        drop(self.release(handle));

        Ok(())
    }

    /// Destroys every live value. All previously issued handles become stale.
    pub fn clear(&mut self) {
        if !self.values.is_empty() {
            debug!(target: HEAP_LOG, "Cleared {} values.", self.values.len());
        }

        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        host::HostCell,
        runtime::{BoxedValue, Handle, Heap, MarshalError},
    };

    #[test]
    fn test_handle_bits() {
        assert_eq!(Handle::from_bits(0), None);
        assert_eq!(Handle::from_bits(1 << 32), None);

        let handle = Handle::from_bits(0x0000_0003_0000_0008).unwrap();

        assert_eq!(handle.to_bits(), 0x0000_0003_0000_0008);

        let mut heap = Heap::new();
        let live = heap.insert(BoxedValue::new(1u8));

        assert_ne!(live.to_bits() as u32, 0);
        assert_eq!(Handle::from_bits(live.to_bits()), Some(live));
    }

    #[test]
    fn test_foreign_numbers() {
        let mut heap = Heap::new();
        let first = heap.insert(BoxedValue::new(String::from("first")));

        assert_eq!(first.to_bits(), 0x0000_0001_0000_0001);
        assert_eq!(Handle::from_bits(1), None);
        assert_eq!(Handle::from_bits(0x0000_0002_0000_0001), None);

        assert!(matches!(
            heap.resolve(&HostCell::from_handle(1)),
            Err(MarshalError::InvalidHandle { bits: 1 }),
        ));

        drop(heap.release(first));

        let second = heap.insert(BoxedValue::new(String::from("second")));

        assert_eq!(second.to_bits() as u32, first.to_bits() as u32);
        assert_ne!(second, first);
        assert!(heap.get(first).is_none());

        let vacant = second.to_bits() - (1 << 32);

        assert_eq!(Handle::from_bits(vacant), None);

        assert!(matches!(
            heap.resolve(&HostCell::from_handle(vacant)),
            Err(MarshalError::InvalidHandle { .. }),
        ));

        assert_eq!(
            heap.resolve(&second.to_cell()).unwrap().get::<String>().unwrap(),
            "second",
        );
    }

    #[test]
    fn test_handle_cells() {
        assert!(matches!(
            Handle::from_cell(&HostCell::from_scalar(1.0)),
            Err(MarshalError::ClassMismatch { .. }),
        ));

        assert!(matches!(
            Handle::from_cell(&HostCell::from_vec(vec![1u64, 2])),
            Err(MarshalError::NonScalar { actual: 2, .. }),
        ));

        assert!(matches!(
            Handle::from_cell(&HostCell::from_handle(0)),
            Err(MarshalError::InvalidHandle { bits: 0 }),
        ));
    }

    #[test]
    fn test_stale_handles() {
        let mut heap = Heap::new();

        let first = heap.insert(BoxedValue::new(String::from("first")));

        assert_ne!(first.to_bits(), 0);
        assert_eq!(heap.len(), 1);

        assert!(heap.release(first).is_some());
        assert!(heap.release(first).is_none());
        assert!(heap.is_empty());

        let second = heap.insert(BoxedValue::new(String::from("second")));

        assert_ne!(first, second);
        assert!(heap.get(first).is_none());

        let value = heap.resolve(&second.to_cell()).unwrap();

        assert_eq!(value.get::<String>().unwrap(), "second");

        assert!(matches!(
            heap.resolve(&first.to_cell()),
            Err(MarshalError::InvalidHandle { .. }),
        ));
    }

    #[test]
    fn test_checked_destroy() {
        let mut heap = Heap::new();

        let handle = heap.insert(BoxedValue::new(String::from("text")));

        assert!(matches!(
            heap.destroy::<Vec<u8>>(handle),
            Err(MarshalError::TypeMismatch { .. }),
        ));

        assert_eq!(heap.len(), 1);
        assert!(heap.destroy::<String>(handle).is_ok());
        assert!(heap.is_empty());

        assert!(matches!(
            heap.destroy::<String>(handle),
            Err(MarshalError::InvalidHandle { .. }),
        ));
    }

    #[test]
    fn test_clear() {
        let mut heap = Heap::with_capacity(4);

        let handles = (0..3)
            .map(|index| heap.insert(BoxedValue::new(index as i32)))
            .collect::<Vec<_>>();

        heap.clear();

        assert!(heap.is_empty());

        for handle in handles {
            assert!(heap.get(handle).is_none());
        }

        let reused = heap.insert(BoxedValue::new(7i32));

        assert_eq!(heap.get(reused).unwrap().get::<i32>().unwrap(), 7);
    }
}
