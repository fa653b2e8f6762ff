use std::collections::HashMap;

/// The translation domain used when none is configured.
pub const DEFAULT_DOMAIN: &str = "messages";

/// Source of translated text for the `txt` directive.
///
/// The `Engine` consults its catalog with the literal key of each `txt`
/// directive. Returning `None` makes the key render verbatim, which is
/// never an error, untranslated templates stay usable.
pub trait Translate: Send + Sync {
    /// Translate the given key.
    ///
    /// The `locale` is the one requested for the render call, if any, and
    /// `domain` is the translation domain of the calling `Engine`.
    fn translate(&self, key: &str, locale: Option<&str>, domain: &str) -> Option<String>;
}

/// An in-memory [`Translate`] implementation.
///
/// Holds translated text per locale for a single domain. A [`Catalog`]
/// only answers for its own domain, and falls back to its default locale
/// when the requested locale does not carry a key.
///
/// # Examples
///
/// ```
/// use stencil::{Catalog, Translate, DEFAULT_DOMAIN};
///
/// let catalog = Catalog::new()
///     .with_default_locale("en")
///     .with("en", "Sign in", "Sign in")
///     .with("it", "Sign in", "Accedi");
///
/// assert_eq!(
///     catalog.translate("Sign in", Some("it"), DEFAULT_DOMAIN),
///     Some("Accedi".to_owned())
/// );
/// ```
pub struct Catalog {
    /// The domain this Catalog answers for.
    domain: String,
    /// Locale consulted when no locale is requested, or when the
    /// requested locale does not carry a key.
    default_locale: Option<String>,
    /// Translated text stored by locale, then key.
    entries: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    /// Create a new Catalog for [`DEFAULT_DOMAIN`].
    #[inline]
    pub fn new() -> Self {
        Self::for_domain(DEFAULT_DOMAIN)
    }

    /// Create a new Catalog for the given domain.
    pub fn for_domain<T>(domain: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            domain: domain.into(),
            default_locale: None,
            entries: HashMap::new(),
        }
    }

    /// Set the default locale.
    ///
    /// Returns the Catalog, so additional methods may be chained.
    pub fn with_default_locale<T>(mut self, locale: T) -> Self
    where
        T: Into<String>,
    {
        self.default_locale = Some(locale.into());
        self
    }

    /// Insert translated text for the given locale and key.
    pub fn insert<L, K, T>(&mut self, locale: L, key: K, text: T)
    where
        L: Into<String>,
        K: Into<String>,
        T: Into<String>,
    {
        self.entries
            .entry(locale.into())
            .or_default()
            .insert(key.into(), text.into());
    }

    /// Insert translated text for the given locale and key.
    ///
    /// Returns the Catalog, so additional methods may be chained.
    pub fn with<L, K, T>(mut self, locale: L, key: K, text: T) -> Self
    where
        L: Into<String>,
        K: Into<String>,
        T: Into<String>,
    {
        self.insert(locale, key, text);
        self
    }

    /// Return the translated text for the given locale and key, if any.
    fn lookup(&self, locale: &str, key: &str) -> Option<&String> {
        self.entries.get(locale).and_then(|keys| keys.get(key))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str, locale: Option<&str>, domain: &str) -> Option<String> {
        if domain != self.domain {
            return None;
        }
        if let Some(locale) = locale {
            if let Some(text) = self.lookup(locale, key) {
                return Some(text.clone());
            }
        }

        self.default_locale
            .as_deref()
            .and_then(|locale| self.lookup(locale, key))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::{Catalog, Translate, DEFAULT_DOMAIN};

    #[test]
    fn test_translate() {
        let catalog = Catalog::new().with("it", "Sign in", "Accedi");

        assert_eq!(
            catalog.translate("Sign in", Some("it"), DEFAULT_DOMAIN),
            Some("Accedi".to_owned())
        );
        assert_eq!(catalog.translate("Sign out", Some("it"), DEFAULT_DOMAIN), None);
    }

    #[test]
    fn test_translate_default_locale() {
        let catalog = Catalog::new()
            .with_default_locale("en")
            .with("en", "Sign in", "Sign in");

        // No locale requested, and a locale without the key, both fall
        // back to the default locale.
        assert_eq!(
            catalog.translate("Sign in", None, DEFAULT_DOMAIN),
            Some("Sign in".to_owned())
        );
        assert_eq!(
            catalog.translate("Sign in", Some("fr"), DEFAULT_DOMAIN),
            Some("Sign in".to_owned())
        );
    }

    #[test]
    fn test_translate_wrong_domain() {
        let catalog = Catalog::for_domain("emails").with("en", "Sign in", "Accedi");

        assert_eq!(catalog.translate("Sign in", Some("en"), DEFAULT_DOMAIN), None);
    }
}
