//! Repository factory trait
//!
//! Concrete repositories are built from a database client through a factory so
//! callers stay agnostic of the backing implementation.

/// A factory for repository instances, generic over the repository and its input.
pub trait RepositoryFactory<R, C> {
    /// Create a new repository instance from `config`.
    fn create_repository(&self, config: C) -> R;
}
