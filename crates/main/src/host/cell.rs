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

use compact_str::CompactString;

use crate::host::{ClassId, HostScalar};

/// A payload of the [HostCell].
#[derive(Clone, Debug, PartialEq)]
pub enum HostData {
    /// No data.
    Void,

    /// Boolean elements.
    Logical(Vec<bool>),

    /// A character string. The cell dimensions are `1 x <char count>`.
    Char(String),

    /// 64-bit floating-point elements.
    Double(Vec<f64>),

    /// 32-bit floating-point elements.
    Single(Vec<f32>),

    /// `i8` elements.
    Int8(Vec<i8>),

    /// `u8` elements.
    UInt8(Vec<u8>),

    /// `i16` elements.
    Int16(Vec<i16>),

    /// `u16` elements.
    UInt16(Vec<u16>),

    /// `i32` elements.
    Int32(Vec<i32>),

    /// `u32` elements.
    UInt32(Vec<u32>),

    /// `i64` elements.
    Int64(Vec<i64>),

    /// `u64` elements.
    UInt64(Vec<u64>),

    /// Nested cells.
    Cell(Vec<HostCell>),

    /// Named fields of a single struct record.
    Struct(Vec<(CompactString, HostCell)>),
}

/// A host environment value.
///
/// Every value the host passes into or receives from the dispatch entry
/// point is a HostCell: a `rows x cols` array tagged with a dynamic
/// [class](Self::class).
///
/// ```
/// use hostbind::host::{ClassId, HostCell};
///
/// let cell = HostCell::from_vec(vec![1.0, 2.0, 3.0]);
///
/// assert_eq!(cell.class(), ClassId::Double);
/// assert_eq!(cell.dims(), (1, 3));
/// assert_eq!(cell.scalar::<f64>(), None);
/// assert_eq!(cell.slice::<f64>(), Some(&[1.0, 2.0, 3.0][..]));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HostCell {
    rows: usize,
    cols: usize,
    data: HostData,
}

impl Default for HostCell {
    #[inline(always)]
    fn default() -> Self {
        Self::empty()
    }
}

impl HostCell {
    /// Creates a `0x0` cell of the [Void](ClassId::Void) class.
    #[inline(always)]
    pub const fn empty() -> Self {
        Self {
            rows: 0,
            cols: 0,
            data: HostData::Void,
        }
    }

    /// Creates a `1x1` numeric or logical cell.
    #[inline]
    pub fn from_scalar<T: HostScalar>(value: T) -> Self {
        Self {
            rows: 1,
            cols: 1,
            data: T::array(vec![value]),
        }
    }

    /// Creates a `1xN` numeric or logical row vector.
    #[inline]
    pub fn from_vec<T: HostScalar>(values: Vec<T>) -> Self {
        Self {
            rows: 1,
            cols: values.len(),
            data: T::array(values),
        }
    }

    /// Creates a `rows x cols` numeric or logical matrix from the elements
    /// in column-major order.
    ///
    /// Returns None if the number of elements does not match the dimensions.
    pub fn from_matrix<T: HostScalar>(rows: usize, cols: usize, values: Vec<T>) -> Option<Self> {
        if rows.checked_mul(cols)? != values.len() {
            return None;
        }

        Some(Self {
            rows,
            cols,
            data: T::array(values),
        })
    }

    /// Creates a character cell.
    #[inline]
    pub fn from_string(text: impl Into<String>) -> Self {
        let text = text.into();

        Self {
            rows: 1,
            cols: text.chars().count(),
            data: HostData::Char(text),
        }
    }

    /// Creates an object handle cell: a `1x1` [UInt64](ClassId::UInt64)
    /// cell.
    #[inline(always)]
    pub fn from_handle(bits: u64) -> Self {
        Self::from_scalar(bits)
    }

    /// Creates a `1xN` cell array.
    #[inline]
    pub fn cell_array(cells: Vec<HostCell>) -> Self {
        Self {
            rows: 1,
            cols: cells.len(),
            data: HostData::Cell(cells),
        }
    }

    /// Creates a `1x1` struct cell with the specified fields.
    ///
    /// If the same field name occurs more than once, the last value wins.
    pub fn structure<K: Into<CompactString>>(
        fields: impl IntoIterator<Item = (K, HostCell)>,
    ) -> Self {
        let mut result = Vec::<(CompactString, HostCell)>::new();

        for (key, value) in fields {
            let key = key.into();

            match result.iter_mut().find(|(name, _)| name == &key) {
                Some((_, previous)) => *previous = value,
                None => result.push((key, value)),
            }
        }

        Self {
            rows: 1,
            cols: 1,
            data: HostData::Struct(result),
        }
    }

    /// Returns the dynamic class of this cell.
    pub fn class(&self) -> ClassId {
        match &self.data {
            HostData::Void => ClassId::Void,
            HostData::Logical(_) => ClassId::Logical,
            HostData::Char(_) => ClassId::Char,
            HostData::Double(_) => ClassId::Double,
            HostData::Single(_) => ClassId::Single,
            HostData::Int8(_) => ClassId::Int8,
            HostData::UInt8(_) => ClassId::UInt8,
            HostData::Int16(_) => ClassId::Int16,
            HostData::UInt16(_) => ClassId::UInt16,
            HostData::Int32(_) => ClassId::Int32,
            HostData::UInt32(_) => ClassId::UInt32,
            HostData::Int64(_) => ClassId::Int64,
            HostData::UInt64(_) => ClassId::UInt64,
            HostData::Cell(_) => ClassId::Cell,
            HostData::Struct(_) => ClassId::Struct,
        }
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `(rows, cols)`.
    #[inline(always)]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the number of elements: `rows * cols`.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the cell holds exactly one element.
    #[inline(always)]
    pub fn is_scalar(&self) -> bool {
        self.len() == 1
    }

    #[inline(always)]
    pub fn data(&self) -> &HostData {
        &self.data
    }

    #[inline(always)]
    pub fn into_data(self) -> HostData {
        self.data
    }

    /// Returns the array elements if this cell's class is exactly the class
    /// of `T`.
    #[inline(always)]
    pub fn slice<T: HostScalar>(&self) -> Option<&[T]> {
        T::slice(&self.data)
    }

    /// Returns the single element if this cell's class is exactly the class
    /// of `T` and the cell holds exactly one element.
    #[inline]
    pub fn scalar<T: HostScalar>(&self) -> Option<T> {
        match self.slice::<T>()? {
            [value] => Some(*value),
            _ => None,
        }
    }

    /// Returns the text of a character cell.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            HostData::Char(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Returns the nested cells of a cell array.
    #[inline]
    pub fn cells(&self) -> Option<&[HostCell]> {
        match &self.data {
            HostData::Cell(cells) => Some(cells.as_slice()),
            _ => None,
        }
    }

    /// Returns a field of a struct cell.
    pub fn field(&self, name: &str) -> Option<&HostCell> {
        let HostData::Struct(fields) = &self.data else {
            return None;
        };

        fields
            .iter()
            .find(|(key, _)| key.as_str() == name)
            .map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use crate::host::{ClassId, HostCell};

    #[test]
    fn test_scalar_access() {
        let cell = HostCell::from_scalar(10i32);

        assert_eq!(cell.class(), ClassId::Int32);
        assert!(cell.is_scalar());
        assert_eq!(cell.scalar::<i32>(), Some(10));
        assert_eq!(cell.scalar::<i64>(), None);
        assert_eq!(cell.scalar::<u32>(), None);

        let handle = HostCell::from_handle(0x1_0000_0001);

        assert_eq!(handle.class(), ClassId::UInt64);
        assert_eq!(handle.scalar::<u64>(), Some(0x1_0000_0001));
    }

    #[test]
    fn test_char_cells() {
        let cell = HostCell::from_string("héllo");

        assert_eq!(cell.class(), ClassId::Char);
        assert_eq!(cell.dims(), (1, 5));
        assert_eq!(cell.as_str(), Some("héllo"));

        let empty = HostCell::from_string("");

        assert!(empty.is_empty());
        assert_eq!(empty.class(), ClassId::Char);
    }

    #[test]
    fn test_matrix_dims() {
        assert!(HostCell::from_matrix(2, 2, vec![1u8, 2, 3]).is_none());

        let matrix = HostCell::from_matrix(2, 3, vec![1u8, 2, 3, 4, 5, 6]).unwrap();

        assert_eq!(matrix.dims(), (2, 3));
        assert_eq!(matrix.len(), 6);
        assert_eq!(matrix.scalar::<u8>(), None);
    }

    #[test]
    fn test_structure_fields() {
        let cell = HostCell::structure([
            ("x", HostCell::from_scalar(1.0)),
            ("y", HostCell::from_scalar(2.0)),
            ("x", HostCell::from_scalar(3.0)),
        ]);

        assert_eq!(cell.class(), ClassId::Struct);
        assert!(cell.is_scalar());
        assert_eq!(cell.field("x").and_then(HostCell::scalar::<f64>), Some(3.0));
        assert_eq!(cell.field("y").and_then(HostCell::scalar::<f64>), Some(2.0));
        assert!(cell.field("z").is_none());
    }

    #[test]
    fn test_cell_arrays() {
        let cell = HostCell::cell_array(vec![
            HostCell::from_string("a"),
            HostCell::from_scalar(true),
        ]);

        assert_eq!(cell.class(), ClassId::Cell);
        assert_eq!(cell.len(), 2);
        assert_eq!(cell.cells().map(<[HostCell]>::len), Some(2));
        assert_eq!(HostCell::empty().class(), ClassId::Void);
    }
}
