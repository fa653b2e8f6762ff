use super::Error;

pub const UNEXPECTED_TOKEN: &str = "unexpected token";
pub const UNEXPECTED_BLOCK: &str = "unexpected block";
pub const UNEXPECTED_EOF: &str = "unexpected eof";
pub const INVALID_SYNTAX: &str = "invalid syntax";
pub const UNDEFINED_VALUE: &str = "undefined value";
pub const NOT_INDEXABLE: &str = "not indexable";
pub const INVALID_LIST: &str = "invalid list";
pub const MISSING_TEMPLATE: &str = "missing template";
pub const EXCEEDED_MAX_DEPTH: &str = "exceeded maximum depth";
pub const NOT_ENOUGH_KEYS: &str = "not enough keys";
pub const TOO_MANY_KEYS: &str = "too many keys";

/// Return an [`Error`] explaining that the end of source was not expected.
pub fn error_eof(source: &str) -> Error {
    let source_len = source.len();
    Error::build(UNEXPECTED_EOF)
        .with_pointer(source, source_len..source_len)
        .with_help("expected additional tokens, did you close all directives?")
}

/// Return an [`Error`] explaining that the write operation failed.
///
/// This is likely caused by a failure during a `write!` macro operation.
pub fn error_write() -> Error {
    Error::build("write failure").with_help("failed to write result of render, are you low on memory?")
}

/// Return an [`Error`] describing a missing template.
pub fn error_missing_template(name: &str) -> Error {
    Error::build(MISSING_TEMPLATE).with_help(format!(
        "template `{}` not found in engine, add it with `.add_template`",
        name
    ))
}

/// Return an [`Error`] describing template expansion that nests too deeply.
pub fn error_max_depth(name: &str) -> Error {
    Error::build(EXCEEDED_MAX_DEPTH).with_help(format!(
        "template `{name}` expands too deeply, do these templates include each other?"
    ))
}
