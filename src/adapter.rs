use crate::{
    log::{Error, NOT_ENOUGH_KEYS, TOO_MANY_KEYS},
    value::{Mapping, Value},
};

/// Build a [`Mapping`] by pairing record fields with key names.
///
/// Useful for turning delimited rows, such as a parsed CSV record, into
/// a shape that templates can resolve attributes against.
///
/// # Errors
///
/// Returns an [`Error`] when the number of fields and names differ.
///
/// # Examples
///
/// ```
/// use stencil::{record_to_mapping, Store, Value};
///
/// let mapping = record_to_mapping(&["taylor", "admin"], &["name", "role"]).unwrap();
/// let store = Store::new().with_value("user", Value::Mapping(mapping));
/// ```
pub fn record_to_mapping<F, N>(fields: &[F], names: &[N]) -> Result<Mapping, Error>
where
    F: AsRef<str>,
    N: AsRef<str>,
{
    if fields.len() > names.len() {
        return Err(Error::build(NOT_ENOUGH_KEYS).with_help(format!(
            "record has {} fields but only {} names are available",
            fields.len(),
            names.len()
        )));
    }
    if fields.len() < names.len() {
        return Err(Error::build(TOO_MANY_KEYS).with_help(format!(
            "record has {} fields but {} names were given",
            fields.len(),
            names.len()
        )));
    }

    Ok(names
        .iter()
        .zip(fields.iter())
        .map(|(name, field)| (name.as_ref().to_owned(), Value::from(field.as_ref())))
        .collect())
}

/// Build a [`Value::List`] of mappings by pairing each record with the
/// same key names.
///
/// The result is suitable as the iteration source of a `map` directive.
///
/// # Errors
///
/// Returns an [`Error`] when any record does not match the names in
/// length.
pub fn records_to_list<F, N>(records: &[Vec<F>], names: &[N]) -> Result<Value, Error>
where
    F: AsRef<str>,
    N: AsRef<str>,
{
    let mut items = Vec::with_capacity(records.len());
    for record in records {
        items.push(Value::Mapping(record_to_mapping(record, names)?));
    }

    Ok(Value::List(items))
}
