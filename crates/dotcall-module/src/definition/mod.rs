//! The module registry: qualified type names mapped to type definitions.
//!
//! [`ModuleDefinition`] is what a module exports in place of runtime type
//! metadata. Types are keyed by qualified name and listed in lexicographic
//! order. Validation happens once in [`ModuleBuilder::build`]; a built
//! definition is immutable.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{DefinitionError, MethodFailure};
use crate::method::{Instance, MethodDefinition};

type Constructor = Box<dyn Fn() -> Result<Instance, MethodFailure> + Send + Sync>;

/// An invocable type: qualified name, default constructor, and methods.
pub struct TypeDefinition {
    name: String,
    constructor: Constructor,
    methods: Vec<MethodDefinition>,
}

impl TypeDefinition {
    /// Defines a type constructed through its [`Default`] implementation.
    #[must_use]
    pub fn new<T>(name: impl Into<String>) -> Self
    where
        T: Default + 'static,
    {
        Self::with_constructor(name, || Ok::<_, MethodFailure>(T::default()))
    }

    /// Defines a type whose parameterless constructor may fail.
    #[must_use]
    pub fn with_constructor<T, E, F>(name: impl Into<String>, constructor: F) -> Self
    where
        T: 'static,
        E: Into<MethodFailure> + 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            constructor: Box::new(move || {
                constructor()
                    .map(|value| Box::new(value) as Instance)
                    .map_err(Into::<MethodFailure>::into)
            }),
            methods: Vec::new(),
        }
    }

    /// Adds a method to the type.
    #[must_use]
    pub fn method(mut self, method: MethodDefinition) -> Self {
        self.methods.push(method);
        self
    }

    /// Returns the qualified type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a fresh instance through the parameterless constructor.
    ///
    /// # Errors
    ///
    /// Propagates the constructor's failure.
    pub fn construct(&self) -> Result<Instance, MethodFailure> {
        (self.constructor)()
    }

    /// Looks up a method by exact name.
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<&MethodDefinition> {
        self.methods.iter().find(|method| method.name() == name)
    }

    /// Returns the methods in registration order.
    #[must_use]
    pub fn methods(&self) -> &[MethodDefinition] {
        &self.methods
    }

    fn validate(&self) -> Result<(), DefinitionError> {
        for (index, method) in self.methods.iter().enumerate() {
            if method.name().trim().is_empty() {
                return Err(DefinitionError::EmptyMethodName {
                    type_name: self.name.clone(),
                });
            }
            let duplicate = self
                .methods
                .iter()
                .take(index)
                .any(|earlier| earlier.name() == method.name());
            if duplicate {
                return Err(DefinitionError::DuplicateMethod {
                    type_name: self.name.clone(),
                    method: method.name().to_owned(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// Registry of the types a module exports.
///
/// # Example
///
/// ```
/// use dotcall_module::{ModuleDefinition, TypeDefinition};
///
/// #[derive(Default)]
/// struct Clock;
///
/// let module = ModuleDefinition::builder("Timekeeping")
///     .with_type(TypeDefinition::new::<Clock>("Time.Clock"))
///     .build()
///     .expect("definition is valid");
/// assert_eq!(module.type_names().collect::<Vec<_>>(), ["Time.Clock"]);
/// ```
#[derive(Debug)]
pub struct ModuleDefinition {
    name: String,
    types: BTreeMap<String, TypeDefinition>,
}

impl ModuleDefinition {
    /// Starts assembling a module with the given name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder {
            name: name.into(),
            types: Vec::new(),
        }
    }

    /// Returns the module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a type by its qualified name.
    #[must_use]
    pub fn find_type(&self, qualified_name: &str) -> Option<&TypeDefinition> {
        self.types.get(qualified_name)
    }

    /// Iterates over the qualified names of every type, in sorted order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Returns the number of exported types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` when the module exports no types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Collects type definitions and validates them into a [`ModuleDefinition`].
#[derive(Debug)]
pub struct ModuleBuilder {
    name: String,
    types: Vec<TypeDefinition>,
}

impl ModuleBuilder {
    /// Adds a type to the module.
    #[must_use]
    pub fn with_type(mut self, definition: TypeDefinition) -> Self {
        self.types.push(definition);
        self
    }

    /// Validates the collected types and produces the registry.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] for blank names, duplicate types, or
    /// duplicate method names within a type.
    pub fn build(self) -> Result<ModuleDefinition, DefinitionError> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::EmptyModuleName);
        }

        let mut types = BTreeMap::new();
        for definition in self.types {
            if definition.name.trim().is_empty() {
                return Err(DefinitionError::EmptyTypeName {
                    module: self.name,
                });
            }
            definition.validate()?;
            if types.contains_key(&definition.name) {
                return Err(DefinitionError::DuplicateType {
                    module: self.name,
                    type_name: definition.name,
                });
            }
            types.insert(definition.name.clone(), definition);
        }

        Ok(ModuleDefinition {
            name: self.name,
            types,
        })
    }
}
