//! Canonical model keys.
//!
//! # Responsibilities
//! - Normalize every supported reference to a model into one `ModelKey`
//! - Keep `resolve` total: unmapped values fall back to their type name
//!
//! # Resolution order
//! ```text
//! Descriptor(AbstractModel) → wrapped model name
//! Type(TypeHandle)          → handle name
//! Name(str)                 → used as-is
//! Instance / Value          → runtime type name
//! ```

use std::borrow::{Borrow, Cow};
use std::fmt;
use std::sync::Arc;

use crate::model::abstract_model::AbstractModel;

/// Namespace separator used inside model keys.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Canonical identifier of a model in the registry.
///
/// Case-preserving; namespaces are joined with `::`. A leading `::`
/// (absolute path form) is stripped so `::Team` and `Team` are one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelKey(Arc<str>);

impl ModelKey {
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        let name = name.strip_prefix(NAMESPACE_SEPARATOR).unwrap_or(name);
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(NAMESPACE_SEPARATOR)
    }

    /// The last namespace segment (`Blog::Post` → `Post`).
    pub fn demodulized(&self) -> &str {
        self.0
            .rsplit(NAMESPACE_SEPARATOR)
            .next()
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Borrow<str> for ModelKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ModelKey {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// A host application type that can be administered.
pub trait Model: 'static {
    /// Fully qualified model name, e.g. `Blog::Post`.
    const NAME: &'static str;
}

/// Anything that can report the name of the model it is an instance of.
pub trait Entity {
    fn model_name(&self) -> &str;
}

impl<T: Model> Entity for T {
    fn model_name(&self) -> &str {
        T::NAME
    }
}

/// Handle to a host model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeHandle {
    name: &'static str,
}

impl TypeHandle {
    pub fn of<T: Model>() -> Self {
        Self { name: T::NAME }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Every form in which a caller may refer to a model.
#[derive(Clone, Copy)]
pub enum ModelRef<'a> {
    /// A wrapped model descriptor.
    Descriptor(&'a AbstractModel),
    /// A model type handle.
    Type(TypeHandle),
    /// A model name (string or key).
    Name(&'a str),
    /// An instance of a host model.
    Instance(&'a dyn Entity),
    /// Any other value, identified by its Rust type name.
    Value(&'static str),
}

impl<'a> ModelRef<'a> {
    pub fn of_type<T: Model>() -> ModelRef<'static> {
        ModelRef::Type(TypeHandle::of::<T>())
    }

    pub fn instance(entity: &'a dyn Entity) -> Self {
        ModelRef::Instance(entity)
    }

    /// Refer to an arbitrary value by its runtime type name.
    pub fn of_value<T: ?Sized>(value: &T) -> ModelRef<'static> {
        ModelRef::Value(std::any::type_name_of_val(value))
    }

    /// The descriptor carried by this reference, if any.
    pub fn descriptor(&self) -> Option<&'a AbstractModel> {
        match self {
            ModelRef::Descriptor(model) => Some(*model),
            _ => None,
        }
    }
}

impl fmt::Debug for ModelRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelRef::Descriptor(model) => f.debug_tuple("Descriptor").field(model.key()).finish(),
            ModelRef::Type(handle) => f.debug_tuple("Type").field(&handle.name()).finish(),
            ModelRef::Name(name) => f.debug_tuple("Name").field(name).finish(),
            ModelRef::Instance(entity) => f.debug_tuple("Instance").field(&entity.model_name()).finish(),
            ModelRef::Value(type_name) => f.debug_tuple("Value").field(type_name).finish(),
        }
    }
}

impl<'a> From<&'a str> for ModelRef<'a> {
    fn from(name: &'a str) -> Self {
        ModelRef::Name(name)
    }
}

impl<'a> From<&'a String> for ModelRef<'a> {
    fn from(name: &'a String) -> Self {
        ModelRef::Name(name.as_str())
    }
}

impl<'a> From<&'a ModelKey> for ModelRef<'a> {
    fn from(key: &'a ModelKey) -> Self {
        ModelRef::Name(key.as_str())
    }
}

impl<'a> From<&'a AbstractModel> for ModelRef<'a> {
    fn from(model: &'a AbstractModel) -> Self {
        ModelRef::Descriptor(model)
    }
}

impl<'a> From<&'a Arc<AbstractModel>> for ModelRef<'a> {
    fn from(model: &'a Arc<AbstractModel>) -> Self {
        ModelRef::Descriptor(model.as_ref())
    }
}

impl From<TypeHandle> for ModelRef<'_> {
    fn from(handle: TypeHandle) -> Self {
        ModelRef::Type(handle)
    }
}

/// Resolve any model reference to its canonical key. Never fails.
pub fn resolve(entity: &ModelRef<'_>) -> ModelKey {
    let name: Cow<'_, str> = match entity {
        ModelRef::Descriptor(model) => Cow::Borrowed(model.key().as_str()),
        ModelRef::Type(handle) => Cow::Borrowed(handle.name()),
        ModelRef::Name(name) => Cow::Borrowed(name),
        ModelRef::Instance(entity) => Cow::Owned(entity.model_name().to_string()),
        // Not a model at all: degrade to the value's own type name.
        ModelRef::Value(type_name) => Cow::Borrowed(type_name),
    };
    ModelKey::new(name)
}
