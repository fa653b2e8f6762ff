use crate::{compile::Scope, region::Region};

/// The Abstract Syntax Tree.
#[derive(Debug, Clone)]
pub enum Tree {
    /// Raw text.
    Raw(Region),
    /// Render the value of an attribute path.
    Output(Variable),
    /// Render another template by name.
    Include(Include),
    /// Invoke a callable value with an explicit argument.
    Apply(Apply),
    /// Conditional rendering.
    If(IfElse),
    /// Render a body once for every element of a list.
    Map(Map),
    /// Render the elements of a list with a separator between them.
    Join(Join),
    /// A localizable literal string.
    Txt(Txt),
}

/// Set of Key instances that can be used to locate data within the
/// data context.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// The path segments, always at least one.
    pub path: Vec<Key>,
}

impl Variable {
    /// Get a Region spanning the area from the first and last Key instances.
    pub fn get_region(&self) -> Region {
        self.path
            .first()
            .unwrap()
            .get_region()
            .combine(self.path.last().unwrap().get_region())
    }
}

/// Path segment in a larger identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    /// The area that contains the name of this segment.
    pub identifier: Identifier,
}

impl Key {
    /// Get a Region from the internal Identifier.
    pub fn get_region(&self) -> Region {
        self.identifier.region
    }
}

impl From<Identifier> for Key {
    /// Create a Key from the given Identifier.
    fn from(value: Identifier) -> Self {
        Self { identifier: value }
    }
}

/// Area that contains an identifying value.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub region: Region,
}

/// Command to render another template.
#[derive(Debug, Clone)]
pub struct Include {
    /// Area that contains the name of the template.
    pub name: Region,
}

/// Command to invoke a callable value.
#[derive(Debug, Clone)]
pub struct Apply {
    /// Path expected to lead to the callable.
    pub function: Variable,
    /// Path to the argument handed to the callable.
    pub argument: Variable,
}

/// Conditional rendering expression.
#[derive(Debug, Clone)]
pub struct IfElse {
    /// Path to the checked value.
    pub condition: Variable,
    /// Rendered when the condition is truthy.
    pub then_branch: Scope,
    /// Rendered when the condition is falsy.
    pub else_branch: Option<Scope>,
}

/// Command to render a body once for every element of a list.
#[derive(Debug, Clone)]
pub struct Map {
    /// The body rendered per element.
    pub body: MapBody,
    /// Path to the list.
    pub path: Variable,
}

/// The body of a [`Map`], either a reference to a named template or an
/// inline sub-template compiled from a brace block.
#[derive(Debug, Clone)]
pub enum MapBody {
    /// Area that contains the name of a template known to the engine.
    Named(Region),
    /// An inline sub-template.
    Inline(Scope),
}

/// Command to render the elements of a list with a separator between them.
#[derive(Debug, Clone)]
pub struct Join {
    /// Area that contains the literal separator text.
    pub separator: Region,
    /// Path to the list.
    pub path: Variable,
}

/// A localizable literal string.
#[derive(Debug, Clone)]
pub struct Txt {
    /// Area that contains the localization key.
    pub key: Region,
}
