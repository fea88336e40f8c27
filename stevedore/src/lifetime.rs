/// How long a resolved instance lives once the backend has built it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Lifetime {
    /// A new instance for every resolution.
    #[default]
    Transient,
    /// One instance per execution context (thread, for the default backend).
    #[cfg_attr(feature = "config", serde(alias = "per_thread"))]
    PerExecutionContext,
    /// One instance for the whole container.
    Singleton,
}

impl Lifetime {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::PerExecutionContext => "per_execution_context",
            Self::Singleton => "singleton",
        }
    }
}
