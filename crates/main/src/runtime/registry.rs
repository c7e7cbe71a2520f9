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
    collections::hash_map::Entry,
    fmt::{Debug, Formatter},
};

use ahash::AHashMap;
use compact_str::CompactString;
use log::debug;

use crate::{
    host::HostCell,
    runtime::{
        Downcast,
        FunctionRecord,
        Heap,
        MarshalResult,
        NativeFn,
        NativeMethod,
        NativeMethodMut,
        NativeType,
        Params,
        RegistrationError,
        Trampoline,
    },
};

static REGISTRY_LOG: &str = "hostbind::$registry";

static EMPTY: FunctionRecord = FunctionRecord::empty();

/// A set of [FunctionRecord]s exported under a single class name.
///
/// The class is a registration unit. Build it with the chained registration
/// methods, and then [record](Registry::record) it into the [Registry]:
///
/// ```
/// use hostbind::runtime::{ClassRegistry, Registry};
///
/// fn twice(value: f64) -> f64 {
///     value * 2.0
/// }
///
/// let mut class = ClassRegistry::new("Math");
///
/// class.function("twice", twice).unwrap();
///
/// let mut registry = Registry::new();
///
/// registry.record(class).unwrap();
///
/// assert!(!registry.lookup("Math", "twice").is_empty());
/// assert!(registry.lookup("Math", "thrice").is_empty());
/// ```
pub struct ClassRegistry {
    name: CompactString,
    functions: AHashMap<CompactString, FunctionRecord>,
}

impl Debug for ClassRegistry {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug_map = formatter.debug_map();

        for (name, record) in &self.functions {
            debug_map.entry(name, record);
        }

        debug_map.finish()
    }
}

impl ClassRegistry {
    #[inline]
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            functions: AHashMap::new(),
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the number of the class functions.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Returns the function record by name.
    #[inline(always)]
    pub fn get(&self, function: &str) -> Option<&FunctionRecord> {
        self.functions.get(function)
    }

    /// Iterates over the class function names.
    #[inline(always)]
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.functions.keys().map(CompactString::as_str)
    }

    /// Adds a prepared function record under the specified name.
    ///
    /// Fails if the class already has a function with this name.
    pub fn insert(
        &mut self,
        function: impl Into<CompactString>,
        record: FunctionRecord,
    ) -> Result<&mut Self, RegistrationError> {
        let function = function.into();

        match self.functions.entry(function) {
            Entry::Occupied(entry) => Err(RegistrationError::Duplicate {
                class: self.name.clone(),
                function: entry.key().clone(),
            }),

            Entry::Vacant(entry) => {
                let _ = entry.insert(record);

                Ok(self)
            }
        }
    }

    /// Adds a free function.
    #[inline]
    pub fn function<F, Args>(
        &mut self,
        name: impl Into<CompactString>,
        function: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        F: NativeFn<Args>,
        Args: Params,
    {
        self.insert(name, FunctionRecord::function(function))
    }

    /// Adds a method with a `&T` receiver.
    #[inline]
    pub fn method<T, F, Args>(
        &mut self,
        name: impl Into<CompactString>,
        method: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        T: Downcast,
        F: NativeMethod<T, Args>,
        Args: Params,
    {
        self.insert(name, FunctionRecord::method(method))
    }

    /// Adds a method with a `&mut T` receiver.
    #[inline]
    pub fn method_mut<T, F, Args>(
        &mut self,
        name: impl Into<CompactString>,
        method: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        T: Trampoline,
        F: NativeMethodMut<T, Args>,
        Args: Params,
    {
        self.insert(name, FunctionRecord::method_mut(method))
    }

    /// Adds a function that destroys the heap values of type `T`.
    #[inline]
    pub fn destructor<T: NativeType>(
        &mut self,
        name: impl Into<CompactString>,
    ) -> Result<&mut Self, RegistrationError> {
        self.insert(name, FunctionRecord::destructor::<T>())
    }

    /// Adds a function with the raw uniform signature
    /// (see [FunctionRecord::raw]).
    pub fn raw<F>(
        &mut self,
        name: impl Into<CompactString>,
        outputs: usize,
        input_min: usize,
        input_max: usize,
        function: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        F: Fn(&mut Heap, &mut [Option<HostCell>], &[HostCell]) -> MarshalResult<bool>
            + Send
            + Sync
            + 'static,
    {
        let record = FunctionRecord::raw(outputs, input_min, input_max, function)?;

        self.insert(name, record)
    }
}

/// A two-level index of the exported functions: class name, then function
/// name.
///
/// The registry is built once, before the first dispatch, and is read-only
/// afterwards.
///
/// A [lookup](Self::lookup) of an unknown name is not an error. It returns
/// an [empty](FunctionRecord::empty) record, which accepts no inputs and
/// does nothing.
#[derive(Default)]
pub struct Registry {
    classes: AHashMap<CompactString, ClassRegistry>,
}

impl Debug for Registry {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug_map = formatter.debug_map();

        for (name, class) in &self.classes {
            debug_map.entry(name, class);
        }

        debug_map.finish()
    }
}

impl Registry {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges the class functions into the registry.
    ///
    /// If the registry already has a class with the same name, the new
    /// functions are added to it. Fails if any function name is already
    /// registered, in which case the registry remains unchanged.
    pub fn record(&mut self, class: ClassRegistry) -> Result<&mut Self, RegistrationError> {
        let ClassRegistry { name, functions } = class;

        if let Some(existing) = self.classes.get(&name) {
            for function in functions.keys() {
                if existing.functions.contains_key(function) {
                    return Err(RegistrationError::Duplicate {
                        class: name,
                        function: function.clone(),
                    });
                }
            }
        }

        debug!(
            target: REGISTRY_LOG,
            "Registered {} functions of '{name}' class.",
            functions.len(),
        );

        match self.classes.entry(name) {
            Entry::Occupied(mut entry) => entry.get_mut().functions.extend(functions),

            Entry::Vacant(entry) => {
                let name = entry.key().clone();

                let _ = entry.insert(ClassRegistry { name, functions });
            }
        }

        Ok(self)
    }

    /// Returns the function record by class and function names, if any.
    #[inline]
    pub fn find(&self, class: &str, function: &str) -> Option<&FunctionRecord> {
        self.classes.get(class)?.get(function)
    }

    /// Returns the function record by class and function names, or an empty
    /// record if there is no such function.
    #[inline]
    pub fn lookup(&self, class: &str, function: &str) -> &FunctionRecord {
        self.find(class, function).unwrap_or(&EMPTY)
    }

    #[inline(always)]
    pub fn class(&self, class: &str) -> Option<&ClassRegistry> {
        self.classes.get(class)
    }

    /// Iterates over the registered classes.
    #[inline(always)]
    pub fn classes(&self) -> impl Iterator<Item = &ClassRegistry> + '_ {
        self.classes.values()
    }

    /// Returns the total number of the registered functions.
    #[inline]
    pub fn len(&self) -> usize {
        self.classes.values().map(ClassRegistry::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Suggests a registered name that is close to a misspelled one.
    ///
    /// If the class exists, the suggestion is one of its function names.
    /// Otherwise, it is one of the class names. Only the candidates whose
    /// Jaro-Winkler similarity is at least `threshold` are considered.
    pub fn suggest(&self, class: &str, function: &str, threshold: f64) -> Option<CompactString> {
        match self.classes.get(class) {
            Some(class) => closest(class.names(), function, threshold),
            None => closest(self.classes.keys().map(CompactString::as_str), class, threshold),
        }
    }
}

fn closest<'a>(
    candidates: impl Iterator<Item = &'a str>,
    pattern: &str,
    threshold: f64,
) -> Option<CompactString> {
    let mut best = None;
    let mut best_score = threshold;

    for candidate in candidates {
        let score = strsim::jaro_winkler(candidate, pattern);

        if score < best_score {
            continue;
        }

        // Equal scores resolve to the lexicographically smaller candidate.
        if score == best_score {
            if let Some(current) = best {
                if current <= candidate {
                    continue;
                }
            }
        }

        best = Some(candidate);
        best_score = score;
    }

    best.map(CompactString::from)
}

#[cfg(test)]
mod tests {
    use crate::runtime::{ClassRegistry, FunctionRecord, Registry, RegistrationError};

    fn one() -> f64 {
        1.0
    }

    fn two() -> f64 {
        2.0
    }

    fn sample() -> Registry {
        let mut class = ClassRegistry::new("Numbers");

        class
            .function("one", one)
            .unwrap()
            .function("two", two)
            .unwrap();

        let mut registry = Registry::new();

        registry.record(class).unwrap();

        registry
    }

    #[test]
    fn test_duplicates() {
        let mut class = ClassRegistry::new("Numbers");

        class.function("one", one).unwrap();

        assert_eq!(
            class.function("one", two).unwrap_err(),
            RegistrationError::Duplicate {
                class: "Numbers".into(),
                function: "one".into(),
            },
        );

        let mut registry = sample();

        let mut extra = ClassRegistry::new("Numbers");

        extra
            .insert("three", FunctionRecord::function(one))
            .unwrap()
            .insert("two", FunctionRecord::function(one))
            .unwrap();

        assert!(registry.record(extra).is_err());
        assert!(registry.find("Numbers", "three").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_merge() {
        let mut registry = sample();

        let mut extra = ClassRegistry::new("Numbers");

        extra.function("three", one).unwrap();

        registry.record(extra).unwrap();

        assert_eq!(registry.class("Numbers").unwrap().len(), 3);
        assert_eq!(registry.classes().count(), 1);
    }

    #[test]
    fn test_lookup_miss() {
        let registry = sample();

        assert!(!registry.lookup("Numbers", "one").is_empty());
        assert!(registry.lookup("Numbers", "three").is_empty());
        assert!(registry.lookup("Letters", "one").is_empty());
        assert_eq!(registry.lookup("Letters", "one").input_max(), 0);
    }

    #[test]
    fn test_suggestions() {
        let registry = sample();

        assert_eq!(
            registry.suggest("Numbers", "onr", 0.7).as_deref(),
            Some("one"),
        );

        assert_eq!(
            registry.suggest("Numbrs", "one", 0.8).as_deref(),
            Some("Numbers"),
        );

        assert_eq!(registry.suggest("Numbers", "zzzzz", 0.8), None);
    }
}
