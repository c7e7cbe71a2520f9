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
    fmt::{Debug, Display, Formatter},
    iter::{once, repeat_with},
};

use crate::{
    host::HostCell,
    runtime::{
        BoxedValue,
        Caster,
        Downcast,
        Handle,
        Heap,
        MarshalResult,
        NativeType,
        Outputs,
        RegistrationError,
        Trampoline,
        TypeMeta,
    },
};

type Callable = Box<
    dyn Fn(&mut ArgLoader<'_>, &mut [Option<HostCell>]) -> MarshalResult<bool>
        + Send
        + Sync
        + 'static,
>;

#[inline(always)]
fn erase<F>(function: F) -> Callable
where
    F: Fn(&mut ArgLoader<'_>, &mut [Option<HostCell>]) -> MarshalResult<bool>
        + Send
        + Sync
        + 'static,
{
    Box::new(function)
}

/// A positional loader of function arguments.
///
/// For each parameter position, the loader attempts to load the argument
/// from the corresponding host cell, and falls back to the parameter's
/// default value if the cell is missing or does not fit the parameter type.
pub struct ArgLoader<'a> {
    heap: &'a mut Heap,
    inputs: &'a [HostCell],
    defaults: &'a [Option<BoxedValue>],
    position: usize,
}

impl<'a> Debug for ArgLoader<'a> {
    #[inline]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ArgLoader")
            .field("inputs", &self.inputs.len())
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl<'a> ArgLoader<'a> {
    #[inline(always)]
    pub fn new(
        heap: &'a mut Heap,
        inputs: &'a [HostCell],
        defaults: &'a [Option<BoxedValue>],
    ) -> Self {
        Self {
            heap,
            inputs,
            defaults,
            position: 0,
        }
    }

    /// Returns the position of the next parameter to load.
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline(always)]
    pub fn inputs(&self) -> &'a [HostCell] {
        self.inputs
    }

    #[inline(always)]
    pub fn heap(&self) -> &Heap {
        self.heap
    }

    #[inline(always)]
    pub fn heap_mut(&mut self) -> &mut Heap {
        self.heap
    }

    /// Loads the argument of the next parameter.
    ///
    /// Returns None if neither the host cell nor the default value fits the
    /// parameter type.
    pub fn next<T: Downcast>(&mut self) -> MarshalResult<Option<T>> {
        let mut caster = Caster::<T>::new();

        if let Some(cell) = self.inputs.get(self.position) {
            let _ = caster.load(cell, &*self.heap)?;
        }

        let default = self.defaults.get(self.position).and_then(Option::as_ref);

        if !caster.load_default(default)? {
            return Ok(None);
        }

        self.position += 1;

        Ok(caster.into_inner())
    }

    /// Loads the next argument as a handle of a live heap value of type `T`,
    /// without copying the value.
    ///
    /// Returns None if the host cell is missing or does not refer to a value
    /// of type `T`.
    pub fn receiver<T: NativeType>(&mut self) -> MarshalResult<Option<Handle>> {
        let Some(cell) = self.inputs.get(self.position) else {
            return Ok(None);
        };

        let handle = match Handle::from_cell(cell) {
            Ok(handle) => handle,
            Err(error) if error.is_recoverable() => return Ok(None),
            Err(error) => return Err(error),
        };

        match self.heap.get(handle) {
            Some(value) if value.can_convert::<T>() => (),
            _ => return Ok(None),
        }

        self.position += 1;

        Ok(Some(handle))
    }
}

/// A tuple of function parameter types.
///
/// The trait is implemented for tuples of up to 8 [Downcast] types.
pub trait Params: Sized + 'static {
    /// The number of parameters.
    const ARITY: usize;

    /// Returns the descriptors of the parameter types.
    fn types() -> Vec<TypeMeta>;

    /// Loads all arguments in order.
    ///
    /// Returns None as soon as any argument cannot be loaded.
    fn load(loader: &mut ArgLoader<'_>) -> MarshalResult<Option<Self>>;
}

/// A Rust function that accepts the `Args` parameters.
///
/// The trait is automatically implemented for the [Fn] functions with up to
/// 8 [Downcast] parameters and an [Outputs] return type.
pub trait NativeFn<Args>: Send + Sync + 'static {
    /// The return type of the function.
    type Output: Outputs;

    /// Calls the function.
    fn call(&self, args: Args) -> Self::Output;
}

/// A Rust function that accepts a `&T` receiver and the `Args` parameters.
///
/// The trait is automatically implemented for the [Fn] functions with up to
/// 8 [Downcast] parameters after the receiver and an [Outputs] return type.
pub trait NativeMethod<T, Args>: Send + Sync + 'static {
    /// The return type of the method.
    type Output: Outputs;

    /// Calls the method.
    fn call(&self, receiver: &T, args: Args) -> Self::Output;
}

/// A Rust function that accepts a `&mut T` receiver and the `Args`
/// parameters.
///
/// The trait is automatically implemented for the [Fn] functions with up to
/// 8 [Downcast] parameters after the receiver and an [Outputs] return type.
pub trait NativeMethodMut<T, Args>: Send + Sync + 'static {
    /// The return type of the method.
    type Output: Outputs;

    /// Calls the method.
    fn call(&self, receiver: &mut T, args: Args) -> Self::Output;
}

macro_rules! count {
    () => {
        0
    };

    ($head:ident $($tail:ident)*) => {
        1 + count!($($tail)*)
    };
}

macro_rules! impl_fn {
    ($($arg:ident $value:ident),*) => {
        impl<$($arg: Downcast),*> Params for ($($arg,)*) {
            const ARITY: usize = count!($($arg)*);

            #[inline]
            fn types() -> Vec<TypeMeta> {
                vec![$(<$arg as Downcast>::hint()),*]
            }

            #[allow(unused_variables)]
            fn load(loader: &mut ArgLoader<'_>) -> MarshalResult<Option<Self>> {
                $(
                let Some($value) = loader.next::<$arg>()? else {
                    return Ok(None);
                };
                )*

                Ok(Some(($($value,)*)))
            }
        }

        impl<F, R, $($arg),*> NativeFn<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: Outputs,
            $($arg: Downcast,)*
        {
            type Output = R;

            #[inline(always)]
            fn call(&self, ($($value,)*): ($($arg,)*)) -> R {
                (self)($($value),*)
            }
        }

        impl<F, T, R, $($arg),*> NativeMethod<T, ($($arg,)*)> for F
        where
            F: Fn(&T, $($arg),*) -> R + Send + Sync + 'static,
            T: Downcast,
            R: Outputs,
            $($arg: Downcast,)*
        {
            type Output = R;

            #[inline(always)]
            fn call(&self, receiver: &T, ($($value,)*): ($($arg,)*)) -> R {
                (self)(receiver, $($value),*)
            }
        }

        impl<F, T, R, $($arg),*> NativeMethodMut<T, ($($arg,)*)> for F
        where
            F: Fn(&mut T, $($arg),*) -> R + Send + Sync + 'static,
            T: Trampoline,
            R: Outputs,
            $($arg: Downcast,)*
        {
            type Output = R;

            #[inline(always)]
            fn call(&self, receiver: &mut T, ($($value,)*): ($($arg,)*)) -> R {
                (self)(receiver, $($value),*)
            }
        }
    };
}

impl_fn!();
impl_fn!(A a);
impl_fn!(A a, B b);
impl_fn!(A a, B b, C c);
impl_fn!(A a, B b, C c, D d);
impl_fn!(A a, B b, C c, D d, E e);
impl_fn!(A a, B b, C c, D d, E e, G g);
impl_fn!(A a, B b, C c, D d, E e, G g, H h);
impl_fn!(A a, B b, C c, D d, E e, G g, H h, I i);

/// A kind of the [FunctionRecord].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum RecordKind {
    /// A record that does nothing. The registry returns it for unknown names.
    Empty,

    /// A free function.
    Function,

    /// A method. The first parameter is the receiver.
    Method,

    /// A function with the raw uniform signature.
    Raw,
}

/// A Rust function bound to the uniform dynamic signature
/// `(output cells, input cells) -> success`.
///
/// The record derives its input arity and output count from the Rust
/// function's signature once, at construction time:
///
/// - [function](Self::function) binds a free function.
/// - [method](Self::method) binds a method with a `&T` receiver. The receiver
///   is the first input and is loaded as a copy.
/// - [method_mut](Self::method_mut) binds a method with a `&mut T` receiver.
///   The receiver is the first input and is mutated in place inside the heap.
/// - [raw](Self::raw) binds a function that reads the host cells directly.
/// - [destructor](Self::destructor) creates a function that destroys a heap
///   value of type `T`.
///
/// Trailing parameters may have default values
/// (see [with_defaults](Self::with_defaults)). The record's input bounds
/// satisfy `input_min <= input_max`, where `input_max` is the number of
/// declared parameters (the receiver included).
///
/// ```
/// use hostbind::{
///     host::HostCell,
///     runtime::{BoxedValue, FunctionRecord, Heap},
/// };
///
/// fn clamp(value: f64, min: f64, max: f64) -> f64 {
///     value.max(min).min(max)
/// }
///
/// let record = FunctionRecord::function(clamp)
///     .with_defaults([BoxedValue::new(0.0), BoxedValue::new(1.0)])
///     .unwrap();
///
/// assert_eq!(record.input_min(), 1);
/// assert_eq!(record.input_max(), 3);
/// assert_eq!(record.outputs(), 1);
///
/// let mut heap = Heap::new();
/// let mut outputs = [None];
///
/// assert!(record
///     .invoke(&mut heap, &mut outputs, &[HostCell::from_scalar(1.5)])
///     .unwrap());
///
/// assert_eq!(outputs[0].as_ref().unwrap().scalar::<f64>(), Some(1.0));
/// ```
pub struct FunctionRecord {
    kind: RecordKind,
    callable: Option<Callable>,
    outputs: usize,
    input_min: usize,
    input_max: usize,
    defaults: Vec<Option<BoxedValue>>,
    params: Vec<TypeMeta>,
}

impl Default for FunctionRecord {
    #[inline(always)]
    fn default() -> Self {
        Self::empty()
    }
}

impl Debug for FunctionRecord {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FunctionRecord")
            .field("kind", &self.kind)
            .field("outputs", &self.outputs)
            .field("input_min", &self.input_min)
            .field("input_max", &self.input_max)
            .field("defaults", &self.defaults)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Display for FunctionRecord {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        if self.kind == RecordKind::Empty {
            return formatter.write_str("<empty>");
        }

        match self.params.len() == self.input_max {
            true => {
                formatter.write_str("(")?;

                for (position, param) in self.params.iter().enumerate() {
                    if position > 0 {
                        formatter.write_str(", ")?;
                    }

                    match position < self.input_min {
                        true => formatter.write_fmt(format_args!("{param}"))?,
                        false => formatter.write_fmt(format_args!("[{param}]"))?,
                    }
                }

                formatter.write_str(")")?;
            }

            false => match self.input_min == self.input_max {
                true => formatter.write_fmt(format_args!("({} inputs)", self.input_max))?,

                false => formatter.write_fmt(format_args!(
                    "({}..{} inputs)",
                    self.input_min, self.input_max,
                ))?,
            },
        }

        match self.outputs {
            1 => formatter.write_str(" -> 1 output"),
            outputs => formatter.write_fmt(format_args!(" -> {outputs} outputs")),
        }
    }
}

impl FunctionRecord {
    /// Creates a record that does nothing and accepts no inputs.
    #[inline(always)]
    pub const fn empty() -> Self {
        Self {
            kind: RecordKind::Empty,
            callable: None,
            outputs: 0,
            input_min: 0,
            input_max: 0,
            defaults: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Binds a free function.
    pub fn function<F, Args>(function: F) -> Self
    where
        F: NativeFn<Args>,
        Args: Params,
    {
        let callable = erase(move |loader, outputs| {
            let Some(args) = Args::load(loader)? else {
                return Ok(false);
            };

            let result = function.call(args);

            <<F as NativeFn<Args>>::Output as Outputs>::wrap(
                loader.heap_mut(),
                result,
                outputs,
            )?;

            Ok(true)
        });

        Self::typed(
            RecordKind::Function,
            callable,
            <<F as NativeFn<Args>>::Output as Outputs>::COUNT,
            Args::types(),
        )
    }

    /// Binds a method with a `&T` receiver.
    pub fn method<T, F, Args>(method: F) -> Self
    where
        T: Downcast,
        F: NativeMethod<T, Args>,
        Args: Params,
    {
        let callable = erase(move |loader, outputs| {
            let Some(receiver) = loader.next::<T>()? else {
                return Ok(false);
            };

            let Some(args) = Args::load(loader)? else {
                return Ok(false);
            };

            let result = method.call(&receiver, args);

            <<F as NativeMethod<T, Args>>::Output as Outputs>::wrap(
                loader.heap_mut(),
                result,
                outputs,
            )?;

            Ok(true)
        });

        Self::typed(
            RecordKind::Method,
            callable,
            <<F as NativeMethod<T, Args>>::Output as Outputs>::COUNT,
            once(T::hint()).chain(Args::types()).collect(),
        )
    }

    /// Binds a method with a `&mut T` receiver.
    ///
    /// The receiver must be a handle of a heap value. The method mutates the
    /// value in place.
    pub fn method_mut<T, F, Args>(method: F) -> Self
    where
        T: Trampoline,
        F: NativeMethodMut<T, Args>,
        Args: Params,
    {
        let callable = erase(move |loader, outputs| {
            let Some(handle) = loader.receiver::<T>()? else {
                return Ok(false);
            };

            let Some(args) = Args::load(loader)? else {
                return Ok(false);
            };

            let result = {
                let receiver = loader.heap_mut().borrow_mut::<T>(handle)?;

                method.call(receiver, args)
            };

            <<F as NativeMethodMut<T, Args>>::Output as Outputs>::wrap(
                loader.heap_mut(),
                result,
                outputs,
            )?;

            Ok(true)
        });

        Self::typed(
            RecordKind::Method,
            callable,
            <<F as NativeMethodMut<T, Args>>::Output as Outputs>::COUNT,
            once(TypeMeta::of::<T>()).chain(Args::types()).collect(),
        )
    }

    /// Binds a function with the raw uniform signature.
    ///
    /// The function receives the heap, the output cells requested by the
    /// caller, and the input cells. It returns false to reject the inputs.
    pub fn raw<F>(
        outputs: usize,
        input_min: usize,
        input_max: usize,
        function: F,
    ) -> Result<Self, RegistrationError>
    where
        F: Fn(&mut Heap, &mut [Option<HostCell>], &[HostCell]) -> MarshalResult<bool>
            + Send
            + Sync
            + 'static,
    {
        if input_min > input_max {
            return Err(RegistrationError::InvalidBounds {
                min: input_min,
                max: input_max,
            });
        }

        let callable = erase(move |loader, cells| {
            let inputs = loader.inputs();

            function(loader.heap_mut(), cells, inputs)
        });

        Ok(Self {
            kind: RecordKind::Raw,
            callable: Some(callable),
            outputs,
            input_min,
            input_max,
            defaults: repeat_with(|| None).take(input_max).collect(),
            params: Vec::new(),
        })
    }

    /// Creates a function that destroys the heap value of type `T` referred
    /// to by its only input.
    pub fn destructor<T: NativeType>() -> Self {
        let callable = erase(|loader, _| {
            let Some(handle) = loader.receiver::<T>()? else {
                return Ok(false);
            };

            loader.heap_mut().destroy::<T>(handle)?;

            Ok(true)
        });

        Self {
            kind: RecordKind::Raw,
            callable: Some(callable),
            outputs: 0,
            input_min: 1,
            input_max: 1,
            defaults: vec![None],
            params: vec![TypeMeta::of::<T>()],
        }
    }

    /// Installs default values for the trailing parameters.
    ///
    /// The last `defaults.len()` parameters become optional, and the
    /// record's minimum input count decreases accordingly. The previously
    /// installed defaults are discarded.
    ///
    /// Fails if a default value's type differs from the parameter type, or if
    /// there are more defaults than the parameters that may have one. The
    /// method receiver and the parameters of raw functions never have
    /// defaults.
    pub fn with_defaults(
        mut self,
        defaults: impl IntoIterator<Item = BoxedValue>,
    ) -> Result<Self, RegistrationError> {
        let defaults = defaults.into_iter().collect::<Vec<_>>();

        let available = match self.kind {
            RecordKind::Function => self.input_max,
            RecordKind::Method => self.input_max - 1,
            RecordKind::Empty | RecordKind::Raw => 0,
        };

        if defaults.len() > available {
            return Err(RegistrationError::TooManyDefaults {
                given: defaults.len(),
                available,
            });
        }

        let first = self.input_max - defaults.len();

        self.defaults = repeat_with(|| None).take(self.input_max).collect();

        for (offset, value) in defaults.into_iter().enumerate() {
            let position = first + offset;
            let expected = self.params[position];

            if value.ty() != expected {
                return Err(RegistrationError::DefaultMismatch {
                    position,
                    expected: expected.name(),
                    actual: value.ty().name(),
                });
            }

            self.defaults[position] = Some(value);
        }

        self.input_min = first;

        Ok(self)
    }

    #[inline(always)]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Returns true if this record does nothing.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.callable.is_none()
    }

    /// Returns the number of outputs the function produces.
    #[inline(always)]
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    #[inline(always)]
    pub fn input_min(&self) -> usize {
        self.input_min
    }

    #[inline(always)]
    pub fn input_max(&self) -> usize {
        self.input_max
    }

    /// Returns true if the function accepts `inputs` input cells.
    #[inline(always)]
    pub fn accepts(&self, inputs: usize) -> bool {
        self.input_min <= inputs && inputs <= self.input_max
    }

    /// Returns the descriptors of the declared parameter types.
    ///
    /// The slice is empty for raw functions.
    #[inline(always)]
    pub fn params(&self) -> &[TypeMeta] {
        &self.params
    }

    /// Returns the default values, one slot per declared parameter.
    #[inline(always)]
    pub fn defaults(&self) -> &[Option<BoxedValue>] {
        &self.defaults
    }

    /// Calls the function.
    ///
    /// Returns false if the inputs could not be loaded into the function's
    /// parameters. In this case, the function is not called, and no output
    /// is written.
    ///
    /// The arity bounds are not checked here.
    pub fn invoke(
        &self,
        heap: &mut Heap,
        outputs: &mut [Option<HostCell>],
        inputs: &[HostCell],
    ) -> MarshalResult<bool> {
        let Some(callable) = &self.callable else {
            return Ok(false);
        };

        let mut loader = ArgLoader::new(heap, inputs, &self.defaults);

        callable(&mut loader, outputs)
    }

    #[inline(always)]
    fn typed(kind: RecordKind, callable: Callable, outputs: usize, params: Vec<TypeMeta>) -> Self {
        let input_max = params.len();

        Self {
            kind,
            callable: Some(callable),
            outputs,
            input_min: input_max,
            input_max,
            defaults: repeat_with(|| None).take(input_max).collect(),
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        export,
        host::HostCell,
        runtime::{BoxedValue, FunctionRecord, Heap, RecordKind, RegistrationError},
    };

    #[export]
    #[derive(Clone, Debug, PartialEq)]
    struct Gauge {
        level: f64,
    }

    impl Gauge {
        fn new(level: f64) -> Self {
            Self { level }
        }

        fn reading(&self, scale: f64, offset: f64) -> f64 {
            self.level * scale + offset
        }

        fn set(&mut self, level: f64) {
            self.level = level;
        }

        fn split(&self) -> (f64, f64) {
            (self.level.trunc(), self.level.fract())
        }
    }

    fn sentinel() -> Option<HostCell> {
        Some(HostCell::from_string("untouched"))
    }

    #[test]
    fn test_record_arity() {
        let record = FunctionRecord::method(Gauge::reading);

        assert_eq!(record.kind(), RecordKind::Method);
        assert_eq!(record.input_min(), 3);
        assert_eq!(record.input_max(), 3);
        assert_eq!(record.outputs(), 1);
        assert_eq!(record.defaults().len(), 3);

        let record = record.with_defaults([BoxedValue::new(0.0)]).unwrap();

        assert_eq!(record.input_min(), 2);
        assert!(!record.accepts(1));
        assert!(record.accepts(2));
        assert!(record.accepts(3));
        assert!(!record.accepts(4));
        assert!(record.defaults()[0].is_none());
        assert!(record.defaults()[1].is_none());
        assert!(record.defaults()[2].is_some());
        assert_eq!(record.to_string(), "(Gauge, f64, [f64]) -> 1 output");
    }

    #[test]
    fn test_defaults_validation() {
        assert_eq!(
            FunctionRecord::method(Gauge::reading)
                .with_defaults([BoxedValue::new(1.0), BoxedValue::new(0.0), BoxedValue::new(0.0)])
                .unwrap_err(),
            RegistrationError::TooManyDefaults {
                given: 3,
                available: 2,
            },
        );

        assert_eq!(
            FunctionRecord::function(Gauge::new)
                .with_defaults([BoxedValue::new(1i32)])
                .unwrap_err(),
            RegistrationError::DefaultMismatch {
                position: 0,
                expected: "f64",
                actual: "i32",
            },
        );

        assert!(FunctionRecord::raw(0, 2, 1, |_, _, _| Ok(true)).is_err());
    }

    #[test]
    fn test_default_fallback() {
        let mut heap = Heap::new();

        let constructor = FunctionRecord::function(Gauge::new);
        let reading = FunctionRecord::method(Gauge::reading)
            .with_defaults([BoxedValue::new(0.5)])
            .unwrap();

        let mut outputs = [None];

        assert!(constructor
            .invoke(&mut heap, &mut outputs, &[HostCell::from_scalar(2.0)])
            .unwrap());

        let gauge = outputs[0].take().unwrap();

        let mut outputs = [None];

        assert!(reading
            .invoke(
                &mut heap,
                &mut outputs,
                &[gauge.clone(), HostCell::from_scalar(10.0)],
            )
            .unwrap());

        assert_eq!(outputs[0].as_ref().unwrap().scalar::<f64>(), Some(20.5));

        // A present cell of a wrong class falls back to the default as well.
        let mut outputs = [None];

        assert!(reading
            .invoke(
                &mut heap,
                &mut outputs,
                &[
                    gauge,
                    HostCell::from_scalar(10.0),
                    HostCell::from_string("x"),
                ],
            )
            .unwrap());

        assert_eq!(outputs[0].as_ref().unwrap().scalar::<f64>(), Some(20.5));
    }

    #[test]
    fn test_rejection_without_default() {
        let mut heap = Heap::new();

        let reading = FunctionRecord::method(Gauge::reading);
        let gauge = heap.insert(BoxedValue::new(Gauge::new(1.0))).to_cell();

        let mut outputs = [sentinel()];

        assert!(!reading
            .invoke(
                &mut heap,
                &mut outputs,
                &[gauge, HostCell::from_string("x"), HostCell::from_scalar(1.0)],
            )
            .unwrap());

        assert_eq!(outputs[0], sentinel());
    }

    #[test]
    fn test_zero_outputs() {
        let mut heap = Heap::new();

        let set = FunctionRecord::method_mut(Gauge::set);
        let gauge = heap.insert(BoxedValue::new(Gauge::new(1.0))).to_cell();

        assert_eq!(set.outputs(), 0);

        let mut outputs = [sentinel(), sentinel()];

        assert!(set
            .invoke(
                &mut heap,
                &mut outputs,
                &[gauge.clone(), HostCell::from_scalar(3.0)],
            )
            .unwrap());

        assert_eq!(outputs, [sentinel(), sentinel()]);

        let stored = heap.resolve(&gauge).unwrap().get::<Gauge>().unwrap();

        assert_eq!(stored, Gauge::new(3.0));
    }

    #[test]
    fn test_truncated_outputs() {
        let mut heap = Heap::new();

        let split = FunctionRecord::method(Gauge::split);
        let gauge = heap.insert(BoxedValue::new(Gauge::new(2.25))).to_cell();

        assert_eq!(split.outputs(), 2);

        let mut outputs = [None, sentinel()];

        assert!(split
            .invoke(&mut heap, &mut outputs[..1], &[gauge.clone()])
            .unwrap());

        assert_eq!(outputs[0].as_ref().unwrap().scalar::<f64>(), Some(2.0));
        assert_eq!(outputs[1], sentinel());

        let mut outputs = [None, None];

        assert!(split.invoke(&mut heap, &mut outputs, &[gauge]).unwrap());

        assert_eq!(outputs[1].as_ref().unwrap().scalar::<f64>(), Some(0.25));
    }

    #[test]
    fn test_raw_and_destructor() {
        let mut heap = Heap::new();

        let sum = FunctionRecord::raw(1, 0, 8, |_, outputs, inputs| {
            let mut total = 0.0;

            for input in inputs {
                match input.scalar::<f64>() {
                    Some(value) => total += value,
                    None => return Ok(false),
                }
            }

            if let Some(output) = outputs.first_mut() {
                *output = Some(HostCell::from_scalar(total));
            }

            Ok(true)
        })
        .unwrap();

        assert_eq!(sum.to_string(), "(0..8 inputs) -> 1 output");

        let mut outputs = [None];

        assert!(sum
            .invoke(
                &mut heap,
                &mut outputs,
                &[HostCell::from_scalar(1.0), HostCell::from_scalar(2.0)],
            )
            .unwrap());

        assert_eq!(outputs[0].as_ref().unwrap().scalar::<f64>(), Some(3.0));

        let destructor = FunctionRecord::destructor::<Gauge>();
        let text = heap.insert(BoxedValue::new(String::from("text"))).to_cell();
        let gauge = heap.insert(BoxedValue::new(Gauge::new(0.0))).to_cell();

        assert!(!destructor.invoke(&mut heap, &mut [], &[text]).unwrap());
        assert!(destructor.invoke(&mut heap, &mut [], &[gauge.clone()]).unwrap());
        assert!(!destructor.invoke(&mut heap, &mut [], &[gauge]).unwrap());
        assert_eq!(heap.len(), 1);
    }

    #[test]
    fn test_empty_record() {
        let record = FunctionRecord::empty();

        assert!(record.is_empty());
        assert_eq!(record.to_string(), "<empty>");
        assert!(!record.invoke(&mut Heap::new(), &mut [], &[]).unwrap());
    }
}
