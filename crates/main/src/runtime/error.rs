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
    error::Error as StdError,
    fmt::{Debug, Display, Formatter},
    result::Result as StdResult,
    sync::Arc,
};

use compact_str::CompactString;

use crate::host::ClassId;

/// A result of a marshalling operation, which can either be a normal value or
/// a [MarshalError].
pub type MarshalResult<T> = StdResult<T, MarshalError>;

/// An error that occurs when converting between host cells and Rust values,
/// or when a called Rust function reports a failure.
///
/// The errors are divided into two groups:
///
/// - Recoverable errors indicate that a host cell does not fit the expected
///   Rust type. The argument caster treats them as a load failure, which
///   drives the fallback to the parameter's default value.
/// - Fatal errors abort the current dispatch and are reported to the host.
///
/// See [MarshalError::is_recoverable].
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum MarshalError {
    /// The cell's dynamic class differs from the class the Rust type expects.
    ClassMismatch {
        /// The class of the expected Rust type.
        expected: ClassId,

        /// The class of the provided cell.
        actual: ClassId,
    },

    /// A scalar was expected, but the cell holds zero or more than one
    /// element.
    NonScalar {
        /// The class of the provided cell.
        class: ClassId,

        /// The number of elements in the provided cell.
        actual: usize,
    },

    /// A boxed value's type differs from the requested Rust type.
    TypeMismatch {
        /// The name of the requested type.
        expected: &'static str,

        /// The name of the type of the boxed value.
        actual: &'static str,
    },

    /// The cell holds a handle that does not refer to a live value.
    InvalidHandle {
        /// The raw handle bits.
        bits: u64,
    },

    /// The integer discriminant does not denote any variant of the enum type.
    UnknownVariant {
        /// The name of the enum type.
        ty: &'static str,

        /// The provided discriminant.
        value: i128,
    },

    /// The number cannot be represented by the target numeric type.
    NumberCast {
        /// The name of the target type.
        to: &'static str,

        /// The cause of the failure.
        cause: NumberCastCause,

        /// The source value.
        value: f64,
    },

    /// The boxed value has no payload because its object has been moved out.
    EmptyValue {
        /// The name of the boxed value's type.
        ty: &'static str,
    },

    /// The boxed value's object cannot be accessed for mutation.
    ReadOnly {
        /// The name of the boxed value's type.
        ty: &'static str,
    },

    /// The called Rust function returned an error.
    Native {
        /// The error object returned by the function.
        cause: Arc<dyn StdError + Send + Sync + 'static>,
    },
}

impl Display for MarshalError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClassMismatch { expected, actual } => formatter.write_fmt(format_args!(
                "expected a value of '{expected}' class, but '{actual}' provided"
            )),

            Self::NonScalar { class, actual } => formatter.write_fmt(format_args!(
                "expected a single '{class}' value, but the array with {actual} elements \
                provided"
            )),

            Self::TypeMismatch { expected, actual } => formatter.write_fmt(format_args!(
                "expected an object of '{expected}' type, but '{actual}' provided"
            )),

            Self::InvalidHandle { bits } => formatter.write_fmt(format_args!(
                "handle {bits:#x} does not refer to a live object"
            )),

            Self::UnknownVariant { ty, value } => formatter.write_fmt(format_args!(
                "{value} is not a valid discriminant of '{ty}'"
            )),

            Self::NumberCast { to, cause, value } => {
                use NumberCastCause::*;

                match cause {
                    Infinite => formatter
                        .write_fmt(format_args!("cannot cast infinity value to '{to}'")),

                    NAN => formatter.write_fmt(format_args!("cannot cast NAN value to '{to}'")),

                    Overflow | Underflow => {
                        formatter.write_fmt(format_args!("cannot cast {value} to '{to}' type"))
                    }
                }
            }

            Self::EmptyValue { ty } => {
                formatter.write_fmt(format_args!("the object of '{ty}' type has been moved out"))
            }

            Self::ReadOnly { ty } => formatter.write_fmt(format_args!(
                "the object of '{ty}' type cannot be borrowed for write"
            )),

            Self::Native { cause } => Display::fmt(cause, formatter),
        }
    }
}

impl StdError for MarshalError {
    #[inline]
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Native { cause } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl MarshalError {
    /// Returns true if the error means that a host cell does not fit the
    /// expected Rust type.
    ///
    /// Argument casters turn recoverable errors into load failures. All other
    /// errors abort the dispatch.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ClassMismatch { .. }
            | Self::NonScalar { .. }
            | Self::TypeMismatch { .. }
            | Self::InvalidHandle { .. }
            | Self::UnknownVariant { .. }
            | Self::NumberCast { .. } => true,

            Self::EmptyValue { .. } | Self::ReadOnly { .. } | Self::Native { .. } => false,
        }
    }

    /// Wraps an error returned by a Rust function.
    #[inline(always)]
    pub fn native(cause: impl StdError + Send + Sync + 'static) -> Self {
        Self::Native {
            cause: Arc::new(cause),
        }
    }
}

/// A type of the [MarshalError::NumberCast] error.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NumberCastCause {
    /// The target type does not support representation of infinite numbers.
    Infinite,

    /// The target type does not support representation of NaN numbers.
    NAN,

    /// The source numeric value is too large for the range of the target type.
    Overflow,

    /// The source numeric value is too small for the range of the target type.
    Underflow,
}

impl From<cast::Error> for NumberCastCause {
    #[inline]
    fn from(value: cast::Error) -> Self {
        match value {
            cast::Error::Infinite => Self::Infinite,
            cast::Error::NaN => Self::NAN,
            cast::Error::Overflow => Self::Overflow,
            cast::Error::Underflow => Self::Underflow,
        }
    }
}

/// An error returned by the [Module::call](crate::dispatch::Module::call)
/// dispatch function.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum DispatchError {
    /// The registry has no function with the requested class and function
    /// names.
    NotFound {
        /// The requested class name.
        class: CompactString,

        /// The requested function name.
        function: CompactString,

        /// A similarly named registered entry, if any.
        suggestion: Option<CompactString>,
    },

    /// The number of input cells is outside the function's arity bounds.
    Arity {
        /// The function's signature.
        signature: String,

        /// The minimum number of inputs.
        min: usize,

        /// The maximum number of inputs.
        max: usize,

        /// The number of provided inputs.
        actual: usize,
    },

    /// The caller requested more outputs than the function produces.
    ExcessOutputs {
        /// The number of outputs the function produces.
        declared: usize,

        /// The number of requested outputs.
        requested: usize,
    },

    /// At least one input cell could not be converted into the corresponding
    /// parameter's type, and the parameter has no default value.
    Rejected {
        /// The function's signature.
        signature: String,
    },

    /// A fatal marshalling error.
    Marshal(MarshalError),
}

impl Display for DispatchError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound {
                class,
                function,
                suggestion,
            } => {
                formatter.write_fmt(format_args!("unknown function '{class}::{function}'"))?;

                if let Some(suggestion) = suggestion {
                    formatter.write_fmt(format_args!(", did you mean '{suggestion}'?"))?;
                }

                Ok(())
            }

            Self::Arity {
                signature,
                min,
                max,
                actual,
            } => match min == max {
                true => formatter.write_fmt(format_args!(
                    "{signature} expects {min} arguments, but {actual} provided"
                )),

                false => formatter.write_fmt(format_args!(
                    "{signature} expects {min} to {max} arguments, but {actual} provided"
                )),
            },

            Self::ExcessOutputs {
                declared,
                requested,
            } => formatter.write_fmt(format_args!(
                "{requested} outputs requested, but the function produces {declared}"
            )),

            Self::Rejected { signature } => formatter.write_fmt(format_args!(
                "the arguments do not match the signature {signature}"
            )),

            Self::Marshal(error) => Display::fmt(error, formatter),
        }
    }
}

impl StdError for DispatchError {
    #[inline]
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Marshal(error) => Some(error),
            _ => None,
        }
    }
}

impl From<MarshalError> for DispatchError {
    #[inline(always)]
    fn from(value: MarshalError) -> Self {
        Self::Marshal(value)
    }
}

/// An error that occurs when building function records or filling the
/// registry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistrationError {
    /// The class already has a function with this name.
    Duplicate {
        /// The class name.
        class: CompactString,

        /// The function name.
        function: CompactString,
    },

    /// More default values provided than the function has optional slots.
    TooManyDefaults {
        /// The number of provided defaults.
        given: usize,

        /// The number of parameters that may have a default value.
        available: usize,
    },

    /// The type of a default value differs from the parameter type.
    DefaultMismatch {
        /// The parameter position (zero-based, the method receiver included).
        position: usize,

        /// The name of the parameter type.
        expected: &'static str,

        /// The name of the default value's type.
        actual: &'static str,
    },

    /// The minimum input count exceeds the maximum input count.
    InvalidBounds {
        /// The minimum input count.
        min: usize,

        /// The maximum input count.
        max: usize,
    },
}

impl Display for RegistrationError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate { class, function } => formatter.write_fmt(format_args!(
                "function '{class}::{function}' is already registered"
            )),

            Self::TooManyDefaults { given, available } => formatter.write_fmt(format_args!(
                "{given} default values provided, but only {available} parameters may have \
                defaults"
            )),

            Self::DefaultMismatch {
                position,
                expected,
                actual,
            } => formatter.write_fmt(format_args!(
                "the default value of parameter {position} has '{actual}' type, but '{expected}' \
                expected"
            )),

            Self::InvalidBounds { min, max } => formatter.write_fmt(format_args!(
                "invalid input bounds: {min} is greater than {max}"
            )),
        }
    }
}

impl StdError for RegistrationError {}

#[cfg(test)]
mod tests {
    use std::{error::Error as StdError, fmt::Display};

    use crate::{
        host::ClassId,
        runtime::{DispatchError, MarshalError, NumberCastCause},
    };

    #[derive(Debug)]
    struct Failure;

    impl Display for Failure {
        fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("device failure")
        }
    }

    impl StdError for Failure {}

    #[test]
    fn test_recoverable_errors() {
        assert!(MarshalError::ClassMismatch {
            expected: ClassId::Double,
            actual: ClassId::Char,
        }
        .is_recoverable());

        assert!(MarshalError::InvalidHandle { bits: 7 }.is_recoverable());
        assert!(!MarshalError::EmptyValue { ty: "Foo" }.is_recoverable());
        assert!(!MarshalError::native(Failure).is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        let error = MarshalError::ClassMismatch {
            expected: ClassId::Double,
            actual: ClassId::Char,
        };

        assert_eq!(
            error.to_string(),
            "expected a value of 'double' class, but 'char' provided",
        );

        let error = DispatchError::from(MarshalError::native(Failure));

        assert_eq!(error.to_string(), "device failure");
        assert!(error.source().is_some());

        let error = DispatchError::NotFound {
            class: "Widget".into(),
            function: "aera".into(),
            suggestion: Some("area".into()),
        };

        assert_eq!(
            error.to_string(),
            "unknown function 'Widget::aera', did you mean 'area'?",
        );
    }

    #[test]
    fn test_number_cast_cause() {
        assert_eq!(
            NumberCastCause::from(cast::Error::NaN),
            NumberCastCause::NAN
        );
    }
}
