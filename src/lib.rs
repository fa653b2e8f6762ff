//! A compiler and renderer for a small text template language.
//!
//! Template text is compiled once into an immutable [`Template`], which may
//! then be rendered any number of times, from any number of threads, against
//! a [`Store`] of data.
//!
//! Directives are delimited by `$` markers. An attribute path renders a
//! value from the store, and a handful of keywords provide control flow,
//! template composition and localization:
//!
//! ```text
//! Hello $user.name$!
//! $if admin$You are an administrator.$end if$
//! $map:{<li>$title$</li>} pages$
//! $join:{, } tags$
//! $txt:{Sign in}$
//! ```
//!
//! # Usage
//!
//! Compile and render a template directly:
//!
//! ```
//! use stencil::{compile, render, Store};
//!
//! let template = compile("hello, $name$!").unwrap();
//! let store = Store::new().with_must("name", "taylor");
//!
//! assert_eq!(render(&template, &store).unwrap(), "hello, taylor!");
//! ```
//!
//! Or create an [`Engine`] to share named templates between render calls,
//! receive render diagnostics, and translate `txt` directives through a
//! [`Catalog`]:
//!
//! ```
//! use stencil::{Engine, Store};
//!
//! let mut engine = Engine::new();
//! engine.add_template_must("header", "<h1>$title$</h1>");
//!
//! let template = engine.compile("$include header$").unwrap();
//! let store = Store::new().with_must("title", "home");
//! let rendered = engine.render(&template, &store).unwrap();
//!
//! assert_eq!(rendered.text, "<h1>home</h1>");
//! assert!(rendered.errors.is_empty());
//! ```
mod adapter;
mod compile;
mod engine;
mod extract;
mod locale;
mod log;
mod pipe;
mod region;
mod render;
mod store;
mod value;

pub use crate::{
    adapter::{record_to_mapping, records_to_list},
    compile::{compile, compile_from_file, Template},
    engine::Engine,
    extract::{build_catalog, extract_keys, extract_keys_from_file, ExtractedKey},
    locale::{Catalog, Translate, DEFAULT_DOMAIN},
    log::Error,
    region::Region,
    render::{render, RenderOptions, Rendered, Renderer},
    store::Store,
    value::{Callable, Mapping, Value},
};
