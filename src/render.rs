use crate::{
    compile::{
        tree::{MapBody, Tree, Variable},
        Scope, Template,
    },
    log::{
        error_max_depth, error_missing_template, error_write, Error, INVALID_LIST, NOT_INDEXABLE,
        UNDEFINED_VALUE,
    },
    pipe::Pipe,
    value::{Mapping, Value},
    Engine, Store,
};
use std::{borrow::Cow, fmt::Write};

/// Maximum depth of nested template expansion.
///
/// An `include` or named `map` body past this depth stops rendering and
/// reports a diagnostic, which keeps templates that expand each other
/// from recursing forever.
const MAX_DEPTH: usize = 64;

/// Render a [`Template`].
///
/// Provides a shortcut to quickly render a `Template` when no advanced features
/// are needed. Diagnostics are discarded; create an [`Engine`][`crate::Engine`]
/// to receive them, or to use named templates and localization.
///
/// # Examples
///
/// ```
/// use stencil::{compile, render, Store};
///
/// let template = compile("hello, $name$!");
/// assert!(template.is_ok());
///
/// let output = render(&template.unwrap(), &Store::new().with_must("name", "taylor"));
/// assert_eq!(output.unwrap(), "hello, taylor!");
/// ```
pub fn render(template: &Template, store: &Store) -> Result<String, Error> {
    let engine = Engine::default();
    let options = RenderOptions::default();
    let rendered = Renderer::new(&engine, template, store, &options).render()?;

    Ok(rendered.text)
}

/// Options that adjust a single render call.
#[derive(Debug, Default, Clone)]
pub struct RenderOptions {
    /// When true, render-time diagnostics are suppressed.
    ///
    /// Unresolved attributes still render as empty text, quiet only
    /// controls whether the failure is surfaced.
    pub quiet: bool,
    /// Locale code handed to the localization catalog for `txt`
    /// directives.
    pub locale: Option<String>,
}

impl RenderOptions {
    /// Create a new RenderOptions.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress render-time diagnostics.
    ///
    /// Returns the RenderOptions, so additional methods may be chained.
    pub fn with_quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Set the locale code.
    ///
    /// Returns the RenderOptions, so additional methods may be chained.
    pub fn with_locale<T>(mut self, locale: T) -> Self
    where
        T: Into<String>,
    {
        self.locale = Some(locale.into());
        self
    }
}

/// The result of a render call.
///
/// Rendering is best-effort, output text is always produced. Failures
/// such as unresolved attributes render as empty text and are collected
/// here instead of aborting the render.
#[derive(Debug)]
pub struct Rendered {
    /// The output text.
    pub text: String,
    /// Diagnostics collected during the render.
    ///
    /// Empty when the render was clean, or when
    /// [`RenderOptions::quiet`] is set.
    pub errors: Vec<Error>,
}

pub struct Renderer<'render> {
    /// An engine containing any registered templates and the
    /// localization catalog.
    engine: &'render Engine,
    /// The template being rendered.
    template: &'render Template,
    /// The Store that the Template is rendered with.
    store: &'render Store,
    /// Options for this render call.
    options: &'render RenderOptions,
    /// Depth of nested template expansion, zero for the root template.
    depth: usize,
}

impl<'render> Renderer<'render> {
    /// Create a new Renderer.
    pub fn new(
        engine: &'render Engine,
        template: &'render Template,
        store: &'render Store,
        options: &'render RenderOptions,
    ) -> Self {
        Renderer {
            engine,
            template,
            store,
            options,
            depth: 0,
        }
    }

    /// Create a Renderer for a template expanded from within this one.
    fn nested(&self, template: &'render Template) -> Self {
        Renderer {
            engine: self.engine,
            template,
            store: self.store,
            options: self.options,
            depth: self.depth + 1,
        }
    }

    /// Render the [`Template`] stored inside the [`Renderer`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when writing to the output buffer fails.
    /// Template-level failures never abort the render, they are collected
    /// in the returned [`Rendered`].
    pub fn render(&self) -> Result<Rendered, Error> {
        let mut buffer = String::with_capacity(self.template.source.len());
        let mut errors = vec![];
        {
            let mut pipe = Pipe::new(&mut buffer);
            let chain = [self.store.mapping()];
            self.render_scope(&self.template.scope, &chain, &mut pipe, &mut errors)?;
        }
        if self.options.quiet {
            errors.clear();
        }

        Ok(Rendered {
            text: buffer,
            errors,
        })
    }

    /// Render the given [`Scope`] against the given scope chain.
    ///
    /// The chain is ordered outermost first. Directives such as `map` push
    /// an additional scope for the duration of their body.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when writing to the buffer fails.
    fn render_scope(
        &self,
        scope: &Scope,
        chain: &[&Mapping],
        pipe: &mut Pipe,
        errors: &mut Vec<Error>,
    ) -> Result<(), Error> {
        let source = self.template.source.as_str();

        for tree in scope.data.iter() {
            match tree {
                Tree::Raw(region) => pipe
                    .write_str(region.literal(source))
                    .map_err(|_| error_write())?,
                Tree::Output(variable) => match self.evaluate_keys(variable, chain, true) {
                    Ok(value) => pipe.write_value(&value).map_err(|_| error_write())?,
                    Err(error) => errors.push(error),
                },
                Tree::Include(include) => {
                    let name = include.name.literal(source);
                    match self.engine.get_template(name) {
                        Some(_) if self.depth >= MAX_DEPTH => {
                            errors.push(error_max_depth(name).with_pointer(source, include.name))
                        }
                        Some(template) => {
                            let sub = self.nested(template);
                            sub.render_scope(&template.scope, chain, pipe, errors)?;
                        }
                        None => errors
                            .push(error_missing_template(name).with_pointer(source, include.name)),
                    }
                }
                Tree::Apply(apply) => match self.evaluate_keys(&apply.function, chain, false) {
                    Ok(function) => match function.as_ref() {
                        Value::Callable(callable) => {
                            match self.evaluate_keys(&apply.argument, chain, true) {
                                Ok(argument) => {
                                    let result = callable.call(&argument);
                                    pipe.write_value(&result).map_err(|_| error_write())?;
                                }
                                Err(error) => errors.push(error),
                            }
                        }
                        // A non-callable renders as-is, the argument is
                        // never resolved.
                        other => pipe.write_value(other).map_err(|_| error_write())?,
                    },
                    Err(error) => errors.push(error),
                },
                Tree::If(ifelse) => {
                    let truthy = self
                        .evaluate_keys(&ifelse.condition, chain, true)
                        .map(|value| value.is_truthy())
                        .unwrap_or(false);

                    if truthy {
                        self.render_scope(&ifelse.then_branch, chain, pipe, errors)?;
                    } else if let Some(else_branch) = &ifelse.else_branch {
                        self.render_scope(else_branch, chain, pipe, errors)?;
                    }
                }
                Tree::Map(map) => match self.evaluate_keys(&map.path, chain, true) {
                    Ok(value) => match value.as_ref() {
                        Value::List(items) => {
                            for item in items {
                                match item {
                                    Value::Mapping(mapping) => {
                                        let mut inner = chain.to_vec();
                                        inner.push(mapping);

                                        match &map.body {
                                            MapBody::Inline(scope) => {
                                                self.render_scope(scope, &inner, pipe, errors)?
                                            }
                                            MapBody::Named(name) => {
                                                let name = name.literal(source);
                                                match self.engine.get_template(name) {
                                                    Some(_) if self.depth >= MAX_DEPTH => errors
                                                        .push(error_max_depth(name).with_pointer(
                                                            source,
                                                            map.path.get_region(),
                                                        )),
                                                    Some(template) => {
                                                        let sub = self.nested(template);
                                                        sub.render_scope(
                                                            &template.scope,
                                                            &inner,
                                                            pipe,
                                                            errors,
                                                        )?;
                                                    }
                                                    None => errors.push(
                                                        error_missing_template(name)
                                                            .with_pointer(source, map.path.get_region()),
                                                    ),
                                                }
                                            }
                                        }
                                    }
                                    other => errors.push(
                                        Error::build(INVALID_LIST)
                                            .with_pointer(source, map.path.get_region())
                                            .with_help(format!(
                                                "`map` expects a list of mappings, \
                                                found a {} item",
                                                other.kind()
                                            )),
                                    ),
                                }
                            }
                        }
                        other => errors.push(
                            Error::build(INVALID_LIST)
                                .with_pointer(source, map.path.get_region())
                                .with_help(format!(
                                    "`map` expects a list, found a {}",
                                    other.kind()
                                )),
                        ),
                    },
                    Err(error) => errors.push(error),
                },
                Tree::Join(join) => match self.evaluate_keys(&join.path, chain, true) {
                    Ok(value) => match value.as_ref() {
                        Value::List(items) => {
                            let separator = join.separator.literal(source);
                            for (index, item) in items.iter().enumerate() {
                                if index > 0 {
                                    pipe.write_str(separator).map_err(|_| error_write())?;
                                }
                                pipe.write_value(item).map_err(|_| error_write())?;
                            }
                        }
                        other => errors.push(
                            Error::build(INVALID_LIST)
                                .with_pointer(source, join.path.get_region())
                                .with_help(format!(
                                    "`join` expects a list, found a {}",
                                    other.kind()
                                )),
                        ),
                    },
                    Err(error) => errors.push(error),
                },
                Tree::Txt(txt) => {
                    let key = txt.key.literal(source);
                    match self.engine.translate(key, self.options.locale.as_deref()) {
                        Some(text) => pipe.write_str(&text).map_err(|_| error_write())?,
                        // An untranslated key renders verbatim, never an error.
                        None => pipe.write_str(key).map_err(|_| error_write())?,
                    }
                }
            }
        }

        Ok(())
    }

    /// Evaluate a [`Variable`] to return a [`Value`] from the scope chain.
    ///
    /// The first segment is searched innermost scope outward. Every
    /// following segment descends into a [`Value::Mapping`].
    ///
    /// When `invoke` is set and the final value is a [`Value::Callable`],
    /// it is invoked once with the outermost mapping of the data context
    /// and the result takes its place. The result is never re-invoked,
    /// even if it is itself callable.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a segment is not found, or when a
    /// segment attempts to descend into a value that is not a mapping.
    fn evaluate_keys<'value>(
        &'value self,
        variable: &Variable,
        chain: &[&'value Mapping],
        invoke: bool,
    ) -> Result<Cow<'value, Value>, Error> {
        let source = self.template.source.as_str();
        let first = variable
            .path
            .first()
            .expect("path should always have at least one key");
        let first_name = first.get_region().literal(source);

        let mut value: Cow<Value> = match chain
            .iter()
            .rev()
            .find_map(|mapping| mapping.get(first_name))
        {
            Some(value) => Cow::Borrowed(value),
            None => {
                return Err(Error::build(UNDEFINED_VALUE)
                    .with_pointer(source, first.get_region())
                    .with_help(format!(
                        "`{first_name}` is not present in the data context"
                    )))
            }
        };

        for key in variable.path.iter().skip(1) {
            let name = key.get_region().literal(source);
            match value.as_ref() {
                Value::Mapping(mapping) => match mapping.get(name) {
                    Some(next) => value = Cow::Owned(next.clone()),
                    None => {
                        return Err(Error::build(UNDEFINED_VALUE)
                            .with_pointer(source, key.get_region())
                            .with_help(format!(
                                "`{name}` is not present in the enclosing mapping"
                            )))
                    }
                },
                other => {
                    return Err(Error::build(NOT_INDEXABLE)
                        .with_pointer(source, key.get_region())
                        .with_help(format!(
                            "cannot descend into a {} value with `{name}`",
                            other.kind()
                        )))
                }
            }
        }

        if invoke {
            if let Value::Callable(callable) = value.as_ref() {
                value = Cow::Owned(callable.call(self.store.as_value()));
            }
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{render, RenderOptions, Renderer};
    use crate::{
        compile::Parser,
        log::{EXCEEDED_MAX_DEPTH, INVALID_LIST, MISSING_TEMPLATE, NOT_INDEXABLE, UNDEFINED_VALUE},
        Engine, Store, Value,
    };
    use serde_json::json;

    #[test]
    fn test_render_raw() {
        let template = Parser::new("hello there").compile(None).unwrap();

        assert_eq!(render(&template, &Store::new()).unwrap(), "hello there");
    }

    #[test]
    fn test_render_output() {
        let template = Parser::new("Hello $name$!").compile(None).unwrap();
        let store = Store::new().with_must("name", "Filippo");

        assert_eq!(render(&template, &store).unwrap(), "Hello Filippo!");
    }

    #[test]
    fn test_render_escaped_marker() {
        let template = Parser::new("cost: $$5").compile(None).unwrap();

        assert_eq!(render(&template, &Store::new()).unwrap(), "cost: $5");
    }

    #[test]
    fn test_render_nested_path() {
        let template = Parser::new("$foo.bar.baz$").compile(None).unwrap();
        let store = Store::new().with_must("foo", json!({"bar": {"baz": "a string"}}));

        assert_eq!(render(&template, &store).unwrap(), "a string");
    }

    #[test]
    fn test_render_undefined_is_empty_with_diagnostic() {
        let engine = Engine::default();
        let template = engine.compile("$foo.bar.baz$").unwrap();
        let rendered = engine.render(&template, &Store::new()).unwrap();

        assert_eq!(rendered.text, "");
        assert_eq!(rendered.errors.len(), 1);
        assert_eq!(rendered.errors[0].get_reason(), UNDEFINED_VALUE);
    }

    #[test]
    fn test_render_quiet_suppresses_diagnostics() {
        let engine = Engine::default();
        let template = engine.compile("$missing$").unwrap();
        let rendered = engine
            .render_with(&template, &Store::new(), &RenderOptions::new().with_quiet())
            .unwrap();

        assert_eq!(rendered.text, "");
        assert!(rendered.errors.is_empty());
    }

    #[test]
    fn test_render_not_indexable() {
        let engine = Engine::default();
        let template = engine.compile("$name.first$").unwrap();
        let store = Store::new().with_must("name", "taylor");
        let rendered = engine.render(&template, &store).unwrap();

        assert_eq!(rendered.text, "");
        assert_eq!(rendered.errors[0].get_reason(), NOT_INDEXABLE);
    }

    #[test]
    fn test_render_apply_callable() {
        let template = Parser::new("$apply myFun aVar$").compile(None).unwrap();
        let store = Store::new()
            .with_must("aVar", "abc")
            .with_callable("myFun", |value| match value {
                Value::Scalar(text) => Value::Scalar(text.to_uppercase()),
                other => other.clone(),
            });

        assert_eq!(render(&template, &store).unwrap(), "ABC");
    }

    #[test]
    fn test_render_apply_non_callable() {
        // A non-callable function value renders directly, the argument
        // is ignored even when it does not exist.
        let template = Parser::new("$apply myFun missing$").compile(None).unwrap();
        let store = Store::new().with_must("myFun", "X");

        assert_eq!(render(&template, &store).unwrap(), "X");
    }

    #[test]
    fn test_render_auto_invoke() {
        // A terminal callable reached by plain resolution is invoked with
        // the outermost mapping of the data context.
        let template = Parser::new("$greeting$").compile(None).unwrap();
        let store = Store::new()
            .with_must("name", "taylor")
            .with_callable("greeting", |context| match context {
                Value::Mapping(mapping) => match mapping.get("name") {
                    Some(Value::Scalar(name)) => Value::Scalar(format!("hello, {name}")),
                    _ => Value::from(""),
                },
                _ => Value::from(""),
            });

        assert_eq!(render(&template, &store).unwrap(), "hello, taylor");
    }

    #[test]
    fn test_render_auto_invoke_is_not_recursive() {
        // The result of an auto-invocation is not invoked again.
        let template = Parser::new("a$fun$b").compile(None).unwrap();
        let store = Store::new()
            .with_callable("fun", |_| Value::Callable(crate::Callable::new(|_| Value::from("x"))));

        assert_eq!(render(&template, &store).unwrap(), "ab");
    }

    #[test]
    fn test_render_if_truthy() {
        let template = Parser::new("$if title$<h1>$title$</h1>$else$<h1>default</h1>$end if$")
            .compile(None)
            .unwrap();
        let store = Store::new().with_must("title", "T");

        assert_eq!(render(&template, &store).unwrap(), "<h1>T</h1>");
    }

    #[test]
    fn test_render_if_falsy() {
        let template = Parser::new("$if title$<h1>$title$</h1>$else$<h1>default</h1>$end if$")
            .compile(None)
            .unwrap();

        assert_eq!(
            render(&template, &Store::new()).unwrap(),
            "<h1>default</h1>"
        );
    }

    #[test]
    fn test_render_if_empty_scalar_is_falsy() {
        let template = Parser::new("$if title$yes$else$no$end if$")
            .compile(None)
            .unwrap();
        let store = Store::new().with_must("title", "");

        assert_eq!(render(&template, &store).unwrap(), "no");
    }

    #[test]
    fn test_render_if_without_else() {
        let template = Parser::new("a$if missing$x$end if$b").compile(None).unwrap();

        assert_eq!(render(&template, &Store::new()).unwrap(), "ab");
    }

    #[test]
    fn test_render_map_inline() {
        let template = Parser::new("$map:{<li>$username$</li>} names$")
            .compile(None)
            .unwrap();
        let store = Store::new().with_must(
            "names",
            json!([{"username": "a"}, {"username": "b"}]),
        );

        assert_eq!(
            render(&template, &store).unwrap(),
            "<li>a</li><li>b</li>"
        );
    }

    #[test]
    fn test_render_map_empty_list() {
        let template = Parser::new("$map:{<li>$username$</li>} names$")
            .compile(None)
            .unwrap();
        let store = Store::new().with_must("names", json!([]));

        assert_eq!(render(&template, &store).unwrap(), "");
    }

    #[test]
    fn test_render_map_outer_attributes_visible() {
        // The element scope is pushed over the current context, outer
        // attributes stay visible unless shadowed.
        let template = Parser::new("$map:{$host$/$page$ } pages$")
            .compile(None)
            .unwrap();
        let store = Store::new()
            .with_must("host", "example.com")
            .with_must("pages", json!([{"page": "a"}, {"page": "b"}]));

        assert_eq!(
            render(&template, &store).unwrap(),
            "example.com/a example.com/b "
        );
    }

    #[test]
    fn test_render_map_shadowing() {
        let template = Parser::new("$map:{$name$} people$").compile(None).unwrap();
        let store = Store::new()
            .with_must("name", "outer")
            .with_must("people", json!([{"name": "inner"}]));

        assert_eq!(render(&template, &store).unwrap(), "inner");
    }

    #[test]
    fn test_render_map_named_template() {
        let mut engine = Engine::default();
        engine.add_template_must("row", "<td>$cell$</td>");

        let template = engine.compile("$map row cells$").unwrap();
        let store = Store::new().with_must("cells", json!([{"cell": "1"}, {"cell": "2"}]));
        let rendered = engine.render(&template, &store).unwrap();

        assert_eq!(rendered.text, "<td>1</td><td>2</td>");
        assert!(rendered.errors.is_empty());
    }

    #[test]
    fn test_render_map_non_list() {
        let engine = Engine::default();
        let template = engine.compile("$map:{x} name$").unwrap();
        let store = Store::new().with_must("name", "scalar");
        let rendered = engine.render(&template, &store).unwrap();

        assert_eq!(rendered.text, "");
        assert_eq!(rendered.errors[0].get_reason(), INVALID_LIST);
    }

    #[test]
    fn test_render_join() {
        let template = Parser::new("$join:{,} columns$").compile(None).unwrap();
        let store = Store::new().with_must("columns", json!(["c1", "c2", "c3"]));

        assert_eq!(render(&template, &store).unwrap(), "c1,c2,c3");
    }

    #[test]
    fn test_render_join_single_item() {
        let template = Parser::new("$join:{, } columns$").compile(None).unwrap();
        let store = Store::new().with_must("columns", json!(["only"]));

        assert_eq!(render(&template, &store).unwrap(), "only");
    }

    #[test]
    fn test_render_join_empty_list() {
        let template = Parser::new("$join:{,} columns$").compile(None).unwrap();
        let store = Store::new().with_must("columns", json!([]));

        assert_eq!(render(&template, &store).unwrap(), "");
    }

    #[test]
    fn test_render_include() {
        let mut engine = Engine::default();
        engine.add_template_must("header", "<h1>$title$</h1>");

        // The included template sees the caller's data context.
        let template = engine.compile("$include header$ body").unwrap();
        let store = Store::new().with_must("title", "T");
        let rendered = engine.render(&template, &store).unwrap();

        assert_eq!(rendered.text, "<h1>T</h1> body");
        assert!(rendered.errors.is_empty());
    }

    #[test]
    fn test_render_include_missing() {
        let engine = Engine::default();
        let template = engine.compile("a$include ghost$b").unwrap();
        let rendered = engine.render(&template, &Store::new()).unwrap();

        assert_eq!(rendered.text, "ab");
        assert_eq!(rendered.errors[0].get_reason(), MISSING_TEMPLATE);
    }

    #[test]
    fn test_render_include_cycle() {
        // Two templates that include each other. Each is valid on its own,
        // expansion stops with a diagnostic instead of recursing forever.
        let mut engine = Engine::default();
        engine.add_template_must("a", "x$include b$");
        engine.add_template_must("b", "y$include a$");

        let template = engine.compile("$include a$").unwrap();
        let rendered = engine.render(&template, &Store::new()).unwrap();

        assert!(rendered.text.starts_with("xyxy"));
        assert_eq!(rendered.errors[0].get_reason(), EXCEEDED_MAX_DEPTH);
    }

    #[test]
    fn test_render_map_named_cycle() {
        // A named map body that maps the same template over a list the
        // element scope does not shadow.
        let mut engine = Engine::default();
        engine.add_template_must("row", "$map row items$");

        let template = engine.compile("$map row items$").unwrap();
        let store = Store::new().with_must("items", json!([{"x": "1"}]));
        let rendered = engine.render(&template, &store).unwrap();

        assert_eq!(rendered.errors[0].get_reason(), EXCEEDED_MAX_DEPTH);
    }

    #[test]
    fn test_render_txt_without_catalog() {
        let template = Parser::new("$txt:{Sign in}$").compile(None).unwrap();

        assert_eq!(render(&template, &Store::new()).unwrap(), "Sign in");
    }

    #[test]
    fn test_render_nested_control() {
        let template = Parser::new("$map:{$if admin$[$name$]$else$$name$$end if$ } users$")
            .compile(None)
            .unwrap();
        let store = Store::new().with_must(
            "users",
            json!([
                {"name": "a", "admin": "yes"},
                {"name": "b", "admin": ""},
            ]),
        );

        assert_eq!(render(&template, &store).unwrap(), "[a] b ");
    }

    #[test]
    fn test_render_idempotent() {
        let engine = Engine::default();
        let template = engine.compile("$title$ / $join:{-} parts$").unwrap();
        let store = Store::new()
            .with_must("title", "t")
            .with_must("parts", json!(["a", "b"]));

        let first = engine.render(&template, &store).unwrap();
        let second = engine.render(&template, &store).unwrap();

        assert_eq!(first.text, second.text);
    }

    #[test]
    fn test_render_concurrent() {
        let engine = Engine::default();
        let template = engine.compile("hello, $name$!").unwrap();

        std::thread::scope(|scope| {
            let mut handles = vec![];
            for i in 0..8 {
                let engine = &engine;
                let template = &template;
                handles.push(scope.spawn(move || {
                    let store = Store::new().with_must("name", format!("caller-{i}"));
                    let rendered = engine.render(template, &store).unwrap();

                    assert_eq!(rendered.text, format!("hello, caller-{i}!"));
                }));
            }
            for handle in handles {
                handle.join().unwrap();
            }
        });
    }

    #[test]
    fn test_renderer_direct() {
        let engine = Engine::default();
        let options = RenderOptions::default();
        let template = Parser::new("one $two$ three").compile(None).unwrap();
        let store = Store::new().with_must("two", "2");
        let rendered = Renderer::new(&engine, &template, &store, &options)
            .render()
            .unwrap();

        assert_eq!(rendered.text, "one 2 three");
    }
}
