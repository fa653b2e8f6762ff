use super::Scope;

/// A compiled [`Template`] that can be rendered with a `Store`.
///
/// Structurally immutable after compilation, and may be rendered any
/// number of times, from any number of threads, without synchronization.
#[derive(Debug, Clone)]
pub struct Template {
    /// The name of the [`Template`], if it was compiled with one.
    pub name: Option<String>,
    /// The Abstract Syntax Tree generated during compilation.
    pub scope: Scope,
    /// The source text from which this [`Template`] was generated.
    ///
    /// All regions within the tree index into this text.
    pub source: String,
}

impl Template {
    /// Return the name of the [`Template`].
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
