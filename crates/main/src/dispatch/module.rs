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

use log::{debug, error, warn};

use crate::{
    dispatch::ModuleConfig,
    host::HostCell,
    runtime::{is_locked, DispatchError, Heap, Registry},
};

static DISPATCH_LOG: &str = "hostbind::$dispatch";

/// A loaded module: the registry of the exported functions and the heap of
/// the Rust objects that the host refers to.
///
/// The host calls the [invoke](Self::invoke) function, which is the module's
/// single dispatch entry point:
///
/// 1. The function record is looked up by class and function names.
/// 2. The number of input cells is checked against the record's arity
///    bounds.
/// 3. The record loads the input cells into the Rust function's parameters
///    (falling back to the default values), calls the function, and wraps
///    the result into the output cells.
///
/// Any failure is reported as `false`, and the failure's description is
/// available through [last_error](Self::last_error). A failed call never
/// corrupts the registry.
///
/// The module owns its heap. Dropping the module (or calling
/// [shutdown](Self::shutdown)) destroys every Rust object that is still
/// referred to by the host.
pub struct Module {
    config: ModuleConfig,
    registry: Registry,
    heap: Heap,
    last_error: Option<DispatchError>,
}

impl Debug for Module {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Module")
            .field("config", &self.config)
            .field("functions", &self.registry.len())
            .field("heap", &self.heap)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl Module {
    /// Creates a module with the default configuration.
    #[inline(always)]
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, ModuleConfig::new())
    }

    pub fn with_config(registry: Registry, config: ModuleConfig) -> Self {
        debug!(
            target: DISPATCH_LOG,
            "Module loaded with {} functions.",
            registry.len(),
        );

        Self {
            config,
            registry,
            heap: Heap::with_capacity(config.heap_capacity),
            last_error: None,
        }
    }

    /// The dispatch entry point.
    ///
    /// Calls the `function` of the `class` with the `inputs` cells, and writes
    /// the results into the `outputs` cells. The length of the `outputs`
    /// slice is the number of outputs the caller requested.
    ///
    /// Returns false if the call fails. In this case, the failure is
    /// available through [last_error](Self::last_error).
    pub fn invoke(
        &mut self,
        class: &str,
        function: &str,
        outputs: &mut [Option<HostCell>],
        inputs: &[HostCell],
    ) -> bool {
        debug!(
            target: DISPATCH_LOG,
            "Call '{class}::{function}' with {} inputs and {} outputs.",
            inputs.len(),
            outputs.len(),
        );

        match self.call(class, function, outputs, inputs) {
            Ok(()) => {
                self.last_error = None;

                true
            }

            Err(failure) => {
                match &failure {
                    DispatchError::Marshal(_) => {
                        error!(target: DISPATCH_LOG, "'{class}::{function}' failed: {failure}.")
                    }

                    _ => warn!(target: DISPATCH_LOG, "'{class}::{function}' failed: {failure}."),
                }

                self.last_error = Some(failure);

                false
            }
        }
    }

    /// Same as [invoke](Self::invoke), but returns the failure to the caller.
    pub fn call(
        &mut self,
        class: &str,
        function: &str,
        outputs: &mut [Option<HostCell>],
        inputs: &[HostCell],
    ) -> Result<(), DispatchError> {
        let Some(record) = self.registry.find(class, function) else {
            let suggestion = match self.config.suggestions {
                true => self
                    .registry
                    .suggest(class, function, self.config.suggestion_threshold),
                false => None,
            };

            return Err(DispatchError::NotFound {
                class: class.into(),
                function: function.into(),
                suggestion,
            });
        };

        if !record.accepts(inputs.len()) {
            return Err(DispatchError::Arity {
                signature: record.to_string(),
                min: record.input_min(),
                max: record.input_max(),
                actual: inputs.len(),
            });
        }

        if self.config.reject_excess_outputs && outputs.len() > record.outputs() {
            return Err(DispatchError::ExcessOutputs {
                declared: record.outputs(),
                requested: outputs.len(),
            });
        }

        match record.invoke(&mut self.heap, outputs, inputs) {
            Ok(true) => Ok(()),

            Ok(false) => Err(DispatchError::Rejected {
                signature: record.to_string(),
            }),

            Err(error) => Err(DispatchError::Marshal(error)),
        }
    }

    /// Returns the failure of the last [invoke](Self::invoke) call, if it
    /// failed.
    #[inline(always)]
    pub fn last_error(&self) -> Option<&DispatchError> {
        self.last_error.as_ref()
    }

    #[inline(always)]
    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    #[inline(always)]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline(always)]
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    #[inline(always)]
    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// Returns true if the hosting environment must not unload the module.
    ///
    /// The module is locked while its heap holds any object, or while any
    /// object with a keep-alive lock exists in the process.
    #[inline]
    pub fn is_locked(&self) -> bool {
        !self.heap.is_empty() || is_locked()
    }

    /// Destroys every object in the module's heap. All previously issued
    /// handles become stale.
    pub fn shutdown(&mut self) {
        debug!(
            target: DISPATCH_LOG,
            "Module shutdown with {} live objects.",
            self.heap.len(),
        );

        self.heap.clear();
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        dispatch::{Module, ModuleConfig},
        export,
        host::HostCell,
        runtime::{
            BoxedValue,
            ClassRegistry,
            DispatchError,
            FunctionRecord,
            Handle,
            Internal,
            MarshalError,
            MarshalResult,
            Registry,
            Trampoline,
        },
    };

    #[export]
    #[derive(Clone, Debug, PartialEq)]
    struct Widget {
        size: f64,
    }

    impl Widget {
        fn new(size: f64) -> Self {
            Self { size }
        }

        fn scale(&self, factor: f64, offset: f64) -> f64 {
            self.size * factor + offset
        }

        fn resize(&mut self, size: f64) {
            self.size = size;
        }

        fn bounds(&self) -> (f64, f64) {
            (-self.size / 2.0, self.size / 2.0)
        }

        fn size(&self) -> f64 {
            self.size
        }
    }

    #[export(name "Mode")]
    #[derive(Clone, Copy, Debug, PartialEq)]
    #[repr(u8)]
    enum WidgetMode {
        Solid = 1,
        Hollow = 2,
    }

    fn flip(mode: WidgetMode) -> WidgetMode {
        match mode {
            WidgetMode::Solid => WidgetMode::Hollow,
            WidgetMode::Hollow => WidgetMode::Solid,
        }
    }

    fn registry() -> Registry {
        let mut class = ClassRegistry::new("Widget");

        class
            .function("new", Widget::new)
            .unwrap()
            .insert(
                "scale",
                FunctionRecord::method(Widget::scale)
                    .with_defaults([BoxedValue::new(0.0)])
                    .unwrap(),
            )
            .unwrap()
            .method_mut("resize", Widget::resize)
            .unwrap()
            .method("bounds", Widget::bounds)
            .unwrap()
            .method("size", Widget::size)
            .unwrap()
            .function("flip", flip)
            .unwrap()
            .destructor::<Widget>("delete")
            .unwrap();

        let mut registry = Registry::new();

        registry.record(class).unwrap();

        registry
    }

    fn create(module: &mut Module, size: f64) -> HostCell {
        let mut outputs = [None];

        assert!(module.invoke("Widget", "new", &mut outputs, &[HostCell::from_scalar(size)]));

        outputs[0].take().unwrap()
    }

    fn sentinel() -> Option<HostCell> {
        Some(HostCell::from_string("untouched"))
    }

    #[test]
    fn test_default_parameters() {
        let mut module = Module::new(registry());
        let widget = create(&mut module, 3.0);

        let mut outputs = [None];

        assert!(module.invoke(
            "Widget",
            "scale",
            &mut outputs,
            &[widget.clone(), HostCell::from_scalar(2.0)],
        ));

        assert_eq!(outputs[0].as_ref().unwrap().scalar::<f64>(), Some(6.0));

        assert!(!module.invoke("Widget", "scale", &mut outputs, &[widget.clone()]));

        assert!(matches!(
            module.last_error(),
            Some(DispatchError::Arity {
                min: 2,
                max: 3,
                actual: 1,
                ..
            }),
        ));

        let four = [
            widget,
            HostCell::from_scalar(1.0),
            HostCell::from_scalar(1.0),
            HostCell::from_scalar(1.0),
        ];

        assert!(!module.invoke("Widget", "scale", &mut outputs, &four));

        assert!(matches!(
            module.last_error(),
            Some(DispatchError::Arity { actual: 4, .. }),
        ));
    }

    #[test]
    fn test_output_counts() {
        let mut module = Module::new(registry());
        let widget = create(&mut module, 4.0);

        let mut outputs = [sentinel(), sentinel()];

        assert!(module.invoke(
            "Widget",
            "resize",
            &mut outputs,
            &[widget.clone(), HostCell::from_scalar(8.0)],
        ));

        assert_eq!(outputs, [sentinel(), sentinel()]);

        let mut outputs = [None, sentinel()];

        assert!(module.invoke("Widget", "bounds", &mut outputs[..1], &[widget.clone()]));

        assert_eq!(outputs[0].as_ref().unwrap().scalar::<f64>(), Some(-4.0));
        assert_eq!(outputs[1], sentinel());

        let mut outputs = [None, None];

        assert!(module.invoke("Widget", "bounds", &mut outputs, &[widget]));

        assert_eq!(outputs[1].as_ref().unwrap().scalar::<f64>(), Some(4.0));
    }

    #[test]
    fn test_missing_method() {
        let mut module = Module::new(registry());
        let functions = module.registry().len();

        let mut outputs = [sentinel()];

        assert!(!module.invoke("Widget", "missing_method", &mut outputs, &[]));
        assert_eq!(outputs[0], sentinel());
        assert_eq!(module.registry().len(), functions);
        assert!(module.registry().find("Widget", "missing_method").is_none());

        match module.last_error() {
            Some(DispatchError::NotFound { suggestion, .. }) => assert!(suggestion.is_none()),
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(!module.invoke("Widget", "sise", &mut outputs, &[]));

        match module.last_error() {
            Some(DispatchError::NotFound { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("size"));
            }

            other => panic!("unexpected error: {other:?}"),
        }

        assert!(!module.invoke("Gadget", "new", &mut outputs, &[]));
    }

    #[test]
    fn test_rejected_arguments() {
        let mut module = Module::new(registry());

        let mut outputs = [None];

        assert!(!module.invoke("Widget", "new", &mut outputs, &[HostCell::from_string("big")]));
        assert!(matches!(module.last_error(), Some(DispatchError::Rejected { .. })));
        assert!(outputs[0].is_none());
        assert!(module.heap().is_empty());

        let text = module.heap_mut().insert(BoxedValue::new(String::from("text")));

        assert!(!module.invoke("Widget", "size", &mut outputs, &[text.to_cell()]));
        assert!(matches!(module.last_error(), Some(DispatchError::Rejected { .. })));
    }

    #[test]
    fn test_trivial_enums() {
        let mut module = Module::new(registry());

        let mut outputs = [None];

        assert!(module.invoke("Widget", "flip", &mut outputs, &[HostCell::from_scalar(1u8)]));
        assert_eq!(outputs[0].as_ref().unwrap().scalar::<u8>(), Some(2));

        assert!(!module.invoke("Widget", "flip", &mut outputs, &[HostCell::from_scalar(7u8)]));
        assert!(!module.invoke("Widget", "flip", &mut outputs, &[HostCell::from_scalar(1.0)]));
    }

    #[test]
    fn test_object_lifecycle() {
        let mut module = Module::new(registry());

        let first = create(&mut module, 1.0);
        let second = create(&mut module, 2.0);

        assert_eq!(module.heap().len(), 2);
        assert!(module.is_locked());

        assert!(module.invoke("Widget", "delete", &mut [], &[first.clone()]));
        assert_eq!(module.heap().len(), 1);

        // The handle is stale after the destruction.
        assert!(!module.invoke("Widget", "delete", &mut [], &[first.clone()]));

        let mut outputs = [None];

        assert!(!module.invoke("Widget", "size", &mut outputs, &[first]));

        module.shutdown();

        assert!(module.heap().is_empty());
        assert!(!module.invoke("Widget", "size", &mut outputs, &[second]));
    }

    #[test]
    fn test_excess_outputs() {
        let mut config = ModuleConfig::new();

        config.reject_excess_outputs = true;
        config.suggestions = false;

        let mut module = Module::with_config(registry(), config);
        let widget = create(&mut module, 1.0);

        let mut outputs = [None, None];

        assert!(!module.invoke("Widget", "size", &mut outputs, &[widget.clone()]));

        assert!(matches!(
            module.last_error(),
            Some(DispatchError::ExcessOutputs {
                declared: 1,
                requested: 2,
            }),
        ));

        assert!(module.invoke("Widget", "size", &mut outputs[..1], &[widget]));
        assert!(module.last_error().is_none());
    }

    #[test]
    fn test_emptied_receiver() {
        let mut module = Module::new(registry());
        let widget = create(&mut module, 5.0);
        let handle = Handle::from_cell(&widget).unwrap();

        let taken = module
            .heap_mut()
            .get_mut(handle)
            .unwrap()
            .take::<Widget>()
            .unwrap();

        assert_eq!(taken, Widget::new(5.0));

        let mut outputs = [sentinel()];

        assert!(!module.invoke("Widget", "size", &mut outputs, &[widget.clone()]));
        assert_eq!(outputs[0], sentinel());

        assert!(matches!(
            module.last_error(),
            Some(DispatchError::Marshal(MarshalError::EmptyValue { ty: "Widget" })),
        ));

        let resize = [widget, HostCell::from_scalar(1.0)];

        assert!(!module.invoke("Widget", "resize", &mut [], &resize));

        assert!(matches!(
            module.last_error(),
            Some(DispatchError::Marshal(MarshalError::EmptyValue { .. })),
        ));
    }

    #[export(custom)]
    #[derive(Clone, Debug, PartialEq)]
    struct Meter(f64);

    impl Trampoline for Meter {
        fn to_internal(self) -> Internal {
            Internal::new(self.0)
        }

        fn from_internal(internal: &Internal) -> MarshalResult<Self> {
            match internal.downcast_ref::<f64>() {
                Some(value) => Ok(Self(*value)),

                None => Err(MarshalError::TypeMismatch {
                    expected: "Meter",
                    actual: "unknown",
                }),
            }
        }
    }

    impl Meter {
        fn new(value: f64) -> Self {
            Self(value)
        }

        fn value(&self) -> f64 {
            self.0
        }

        fn reset(&mut self) {
            self.0 = 0.0;
        }
    }

    #[test]
    fn test_read_only_receiver() {
        let mut class = ClassRegistry::new("Meter");

        class
            .function("new", Meter::new)
            .unwrap()
            .method("value", Meter::value)
            .unwrap()
            .method_mut("reset", Meter::reset)
            .unwrap();

        let mut registry = Registry::new();

        registry.record(class).unwrap();

        let mut module = Module::new(registry);

        let mut outputs = [None];

        assert!(module.invoke("Meter", "new", &mut outputs, &[HostCell::from_scalar(2.5)]));

        let meter = outputs[0].take().unwrap();

        assert!(!module.invoke("Meter", "reset", &mut [], &[meter.clone()]));

        assert!(matches!(
            module.last_error(),
            Some(DispatchError::Marshal(MarshalError::ReadOnly { ty: "Meter" })),
        ));

        assert!(module.invoke("Meter", "value", &mut outputs, &[meter]));
        assert_eq!(outputs[0].as_ref().unwrap().scalar::<f64>(), Some(2.5));
    }
}
