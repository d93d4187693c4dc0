//! Discriminators: cheap boolean predicates over a [`View`].
//!
//! A discriminator decides whether a source should handle a message based
//! on the message's shape, without paying for full envelope parsing.
//! Combinators compose: field presence, field equality, conjunction and
//! disjunction, plus any closure over a view.

use crate::view::View;

/// A predicate over a parsed [`View`].
///
/// Discriminators are evaluated during source matching, before a source's
/// parse step runs. They must be cheap relative to parsing.
///
/// Closures implement the trait directly:
///
/// ```rust,ignore
/// let custom = |view: &dyn View| view.has_field("meta.trace_id");
/// ```
pub trait Discriminate: Send + Sync + 'static {
    /// Returns true if the source this discriminator guards applies.
    fn matches(&self, view: &dyn View) -> bool;
}

impl<F> Discriminate for F
where
    F: Fn(&dyn View) -> bool + Send + Sync + 'static,
{
    fn matches(&self, view: &dyn View) -> bool {
        self(view)
    }
}

/// Matches when every listed path exists.
///
/// An empty path list matches vacuously. Sources guarded by a vacuous
/// discriminator must be registered last or they will shadow more
/// specific sources.
pub struct HasFields {
    paths: Vec<String>,
}

impl HasFields {
    /// Build a presence check over the given dotted paths.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl Discriminate for HasFields {
    fn matches(&self, view: &dyn View) -> bool {
        self.paths.iter().all(|p| view.has_field(p))
    }
}

/// Matches when the path exists and holds exactly the given string.
pub struct FieldEquals {
    path: String,
    value: String,
}

impl FieldEquals {
    /// Build an equality check for a dotted path.
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

impl Discriminate for FieldEquals {
    fn matches(&self, view: &dyn View) -> bool {
        view.get_string(&self.path).as_deref() == Some(self.value.as_str())
    }
}

/// Matches when all inner discriminators match. Empty matches vacuously.
pub struct All {
    checks: Vec<Box<dyn Discriminate>>,
}

impl All {
    /// Build a conjunction of discriminators.
    pub fn new(checks: Vec<Box<dyn Discriminate>>) -> Self {
        Self { checks }
    }
}

impl Discriminate for All {
    fn matches(&self, view: &dyn View) -> bool {
        self.checks.iter().all(|c| c.matches(view))
    }
}

/// Matches when any inner discriminator matches. Empty never matches.
pub struct AnyOf {
    checks: Vec<Box<dyn Discriminate>>,
}

impl AnyOf {
    /// Build a disjunction of discriminators.
    pub fn new(checks: Vec<Box<dyn Discriminate>>) -> Self {
        Self { checks }
    }
}

impl Discriminate for AnyOf {
    fn matches(&self, view: &dyn View) -> bool {
        self.checks.iter().any(|c| c.matches(view))
    }
}
