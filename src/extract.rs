use crate::{
    compile::{
        tree::{MapBody, Tree},
        Parser, Scope,
    },
    locale::DEFAULT_DOMAIN,
    log::Error,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// A localization key discovered in template source.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedKey {
    /// The literal key text.
    pub key: String,
    /// One-based line number of the `txt` directive in the source.
    pub line: usize,
}

/// Extract the localization keys from the given template source.
///
/// Keys are reported in source order, including keys inside `if` branches
/// and inline `map` bodies. Duplicate keys are preserved.
///
/// # Errors
///
/// Returns an [`Error`] when the source does not compile.
///
/// # Examples
///
/// ```
/// use stencil::extract_keys;
///
/// let keys = extract_keys("$txt:{Sign in}$").unwrap();
/// assert_eq!(keys[0].key, "Sign in");
/// assert_eq!(keys[0].line, 1);
/// ```
pub fn extract_keys(text: &str) -> Result<Vec<ExtractedKey>, Error> {
    let template = Parser::new(text).compile(None)?;
    let mut keys = vec![];
    collect_keys(&template.scope, &template.source, &mut keys);

    Ok(keys)
}

/// Extract the localization keys from the template file at the given path.
///
/// # Errors
///
/// Returns an [`Error`] when the file cannot be read, or when the source
/// does not compile.
pub fn extract_keys_from_file<P>(path: P) -> Result<Vec<ExtractedKey>, Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = read_source(path)?;

    extract_keys(&text).map_err(|error| error.with_name(path.to_string_lossy()))
}

/// Extract the localization keys from the given template files and write
/// a gettext `.pot` catalog for them to the target directory.
///
/// The catalog file is named `<domain>.pot`, where the domain defaults to
/// [`DEFAULT_DOMAIN`]. Occurrences of the same key are merged into one
/// entry carrying a reference comment per occurrence. Returns the path of
/// the written file.
///
/// # Errors
///
/// Returns an [`Error`] when a source file cannot be read or compiled, or
/// when the catalog cannot be written.
pub fn build_catalog<P>(
    target: P,
    sources: &[PathBuf],
    domain: Option<&str>,
) -> Result<PathBuf, Error>
where
    P: AsRef<Path>,
{
    let domain = domain.unwrap_or(DEFAULT_DOMAIN);
    let mut entries: Vec<(String, Vec<String>)> = vec![];

    for path in sources {
        let text = read_source(path)?;
        let template = Parser::new(&text)
            .compile(None)
            .map_err(|error| error.with_name(path.to_string_lossy()))?;

        let mut keys = vec![];
        collect_keys(&template.scope, &template.source, &mut keys);
        for found in keys {
            let reference = format!("{}:{}", path.display(), found.line);
            match entries.iter_mut().find(|(key, _)| *key == found.key) {
                Some((_, references)) => references.push(reference),
                None => entries.push((found.key, vec![reference])),
            }
        }
    }

    let mut catalog = String::from(
        "msgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain; charset=UTF-8\\n\"\n",
    );
    for (key, references) in entries {
        catalog.push('\n');
        for reference in references {
            catalog.push_str(&format!("#: {reference}\n"));
        }
        catalog.push_str(&format!("msgid {key:?}\nmsgstr \"\"\n"));
    }

    let target = target.as_ref();
    fs::create_dir_all(target).map_err(|error| {
        Error::build(format!(
            "unable to create catalog directory `{}`: {error}",
            target.display()
        ))
    })?;
    let path = target.join(format!("{domain}.pot"));
    fs::write(&path, catalog).map_err(|error| {
        Error::build(format!(
            "unable to write catalog file `{}`: {error}",
            path.display()
        ))
    })?;

    Ok(path)
}

/// Collect the `txt` keys within a [`Scope`] in source order.
fn collect_keys(scope: &Scope, source: &str, keys: &mut Vec<ExtractedKey>) {
    for tree in scope.data.iter() {
        match tree {
            Tree::Txt(txt) => keys.push(ExtractedKey {
                key: txt.key.literal(source).to_owned(),
                line: txt.key.line(source),
            }),
            Tree::If(ifelse) => {
                collect_keys(&ifelse.then_branch, source, keys);
                if let Some(else_branch) = &ifelse.else_branch {
                    collect_keys(else_branch, source, keys);
                }
            }
            Tree::Map(map) => {
                if let MapBody::Inline(body) = &map.body {
                    collect_keys(body, source, keys);
                }
            }
            _ => {}
        }
    }
}

fn read_source(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|error| {
        Error::build(format!(
            "unable to read template file `{}`: {error}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::{build_catalog, extract_keys};
    use std::fs;

    #[test]
    fn test_extract() {
        let keys = extract_keys("$txt:{Sign in}$\nplain text\n$txt:{Sign out}$").unwrap();

        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].key, "Sign in");
        assert_eq!(keys[0].line, 1);
        assert_eq!(keys[1].key, "Sign out");
        assert_eq!(keys[1].line, 3);
    }

    #[test]
    fn test_extract_nested() {
        let keys = extract_keys(
            "$if user$$txt:{Welcome}$$else$$txt:{Sign in}$$end if$\
             $map:{$txt:{Row}$} rows$",
        )
        .unwrap();

        let found: Vec<&str> = keys.iter().map(|key| key.key.as_str()).collect();
        assert_eq!(found, vec!["Welcome", "Sign in", "Row"]);
    }

    #[test]
    fn test_extract_duplicates_preserved() {
        let keys = extract_keys("$txt:{Sign in}$ $txt:{Sign in}$").unwrap();

        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_extract_invalid_source() {
        assert!(extract_keys("$if a$unclosed").is_err());
    }

    #[test]
    fn test_build_catalog() {
        let directory = std::env::temp_dir().join("stencil_test_build_catalog");
        let _ = fs::remove_dir_all(&directory);
        fs::create_dir_all(&directory).unwrap();

        let source = directory.join("login.txt");
        fs::write(&source, "$txt:{Sign in}$\n$txt:{Sign in}$\n$txt:{Sign out}$").unwrap();

        let path = build_catalog(&directory, &[source.clone()], None).unwrap();
        assert_eq!(path.file_name().unwrap(), "messages.pot");

        let catalog = fs::read_to_string(&path).unwrap();
        assert!(catalog.contains("msgid \"Sign in\""));
        assert!(catalog.contains("msgid \"Sign out\""));
        assert!(catalog.contains(&format!("#: {}:1", source.display())));
        assert!(catalog.contains(&format!("#: {}:2", source.display())));
        // Occurrences of the same key merge into one entry.
        assert_eq!(catalog.matches("msgid \"Sign in\"").count(), 1);

        let _ = fs::remove_dir_all(&directory);
    }
}
