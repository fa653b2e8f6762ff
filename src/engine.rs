use crate::{
    compile::{Parser, Template},
    locale::{Translate, DEFAULT_DOMAIN},
    log::Error,
    render::{RenderOptions, Rendered, Renderer},
    Store,
};
use std::collections::HashMap;

/// Facade for compiling and rendering [`Template`] instances.
///
/// An [`Engine`] owns the set of named templates available to the
/// `include` and `map` directives, and the localization catalog consulted
/// by `txt`. It hands out shared references only, so a configured engine
/// may serve render calls from many threads at once.
pub struct Engine {
    /// Templates stored by name.
    templates: HashMap<String, Template>,
    /// Localization catalog consulted by the `txt` directive.
    catalog: Option<Box<dyn Translate>>,
    /// The translation domain this Engine renders for.
    domain: String,
}

impl Engine {
    /// Create a new Engine.
    #[inline]
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
            catalog: None,
            domain: DEFAULT_DOMAIN.to_owned(),
        }
    }

    /// Compile a new [`Template`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when compilation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use stencil::Engine;
    ///
    /// let engine = Engine::new();
    /// let template = engine.compile("hello, $name$!");
    /// assert!(template.is_ok());
    /// ```
    #[inline]
    pub fn compile(&self, text: &str) -> Result<Template, Error> {
        Parser::new(text).compile(None)
    }

    /// Compile a new [`Template`].
    ///
    /// # Panics
    ///
    /// Will panic when compilation fails.
    #[inline]
    pub fn compile_must(&self, text: &str) -> Template {
        self.compile(text).unwrap()
    }

    /// Compile and store a [`Template`] under the given name.
    ///
    /// Stored templates are available to the `include` directive, and to
    /// `map` when it names a template as its body.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a template with the same name already
    /// exists, or when compilation fails.
    pub fn add_template(&mut self, name: &str, text: &str) -> Result<(), Error> {
        if self.templates.contains_key(name) {
            return Err(Error::build(format!(
                "template `{name}` already exists in engine"
            ))
            .with_help("templates must have unique names, remove or rename the existing entry"));
        }
        let template = Parser::new(text)
            .compile(Some(name))
            .map_err(|error| error.with_name(name))?;

        self.templates.insert(name.to_owned(), template);
        Ok(())
    }

    /// Compile and store a [`Template`] under the given name.
    ///
    /// # Panics
    ///
    /// Will panic when the name is taken, or when compilation fails.
    #[inline]
    pub fn add_template_must(&mut self, name: &str, text: &str) {
        self.add_template(name, text).unwrap()
    }

    /// Return the [`Template`] with the given name, if any.
    #[inline]
    pub fn get_template(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Set the localization catalog consulted by the `txt` directive.
    pub fn set_catalog<T>(&mut self, catalog: T)
    where
        T: Translate + 'static,
    {
        self.catalog = Some(Box::new(catalog));
    }

    /// Set the localization catalog consulted by the `txt` directive.
    ///
    /// Returns the Engine, so additional methods may be chained.
    pub fn with_catalog<T>(mut self, catalog: T) -> Self
    where
        T: Translate + 'static,
    {
        self.set_catalog(catalog);
        self
    }

    /// Set the translation domain.
    ///
    /// Defaults to [`DEFAULT_DOMAIN`].
    pub fn set_domain<T>(&mut self, domain: T)
    where
        T: Into<String>,
    {
        self.domain = domain.into();
    }

    /// Set the translation domain.
    ///
    /// Returns the Engine, so additional methods may be chained.
    pub fn with_domain<T>(mut self, domain: T) -> Self
    where
        T: Into<String>,
    {
        self.set_domain(domain);
        self
    }

    /// Translate the given key through the catalog, if one is set.
    pub(crate) fn translate(&self, key: &str, locale: Option<&str>) -> Option<String> {
        self.catalog
            .as_ref()
            .and_then(|catalog| catalog.translate(key, locale, &self.domain))
    }

    /// Render a [`Template`] with the given [`Store`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when writing to the output buffer fails.
    /// Template-level failures are collected in the returned [`Rendered`]
    /// instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use stencil::{Engine, Store};
    ///
    /// let engine = Engine::new();
    /// let template = engine.compile("hello, $name$!").unwrap();
    /// let rendered = engine
    ///     .render(&template, &Store::new().with_must("name", "taylor"))
    ///     .unwrap();
    ///
    /// assert_eq!(rendered.text, "hello, taylor!");
    /// assert!(rendered.errors.is_empty());
    /// ```
    #[inline]
    pub fn render(&self, template: &Template, store: &Store) -> Result<Rendered, Error> {
        self.render_with(template, store, &RenderOptions::default())
    }

    /// Render a [`Template`] with the given [`Store`] and [`RenderOptions`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when writing to the output buffer fails.
    pub fn render_with(
        &self,
        template: &Template,
        store: &Store,
        options: &RenderOptions,
    ) -> Result<Rendered, Error> {
        Renderer::new(self, template, store, options).render()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
