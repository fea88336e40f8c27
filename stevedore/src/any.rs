use std::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    sync::Arc,
};

/// Shared, type-erased service instance.
///
/// The erased value is always an `Arc<S>` where `S` is the service type, which
/// lets trait objects travel through the container unchanged.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Owned, type-erased value of a concrete implementation before it is shared.
pub type AnyValue = Box<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let name = self.name;
        let path_end = name.find('<').unwrap_or(name.len());
        match name[..path_end].rfind("::") {
            Some(index) => &name[index + 2..],
            None => name,
        }
    }

    /// Returns the open generic definition of a closed generic type.
    ///
    /// `dyn app::Repository<app::User>` maps to `dyn app::Repository`.
    /// Types whose outermost path carries no generic arguments return `None`.
    /// An empty definition is returned for names that start with generic
    /// arguments and can't be mapped.
    #[must_use]
    pub fn generic_definition(&self) -> Option<&'static str> {
        let name = self.name;
        let index = name.find('<')?;
        let prefix = name[..index].trim_end();
        let path = prefix.strip_prefix("dyn ").unwrap_or(prefix);

        if path.is_empty() {
            return Some("");
        }
        if path.chars().all(|char| char.is_alphanumeric() || char == '_' || char == ':') {
            Some(prefix)
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub fn is_closed_generic(&self) -> bool {
        matches!(self.generic_definition(), Some(definition) if !definition.is_empty())
    }

    /// Matches a type name written in configuration, with or without the `dyn ` prefix.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.name == name || self.name.strip_prefix("dyn ") == Some(name)
    }
}

#[inline]
#[must_use]
pub(crate) fn erase<S>(value: Arc<S>) -> Instance
where
    S: ?Sized + Send + Sync + 'static,
{
    Arc::new(value)
}

#[inline]
#[must_use]
pub(crate) fn unerase<S>(instance: &Instance) -> Option<Arc<S>>
where
    S: ?Sized + Send + Sync + 'static,
{
    instance.downcast_ref::<Arc<S>>().cloned()
}
