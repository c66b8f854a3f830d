// Variable Substitution Engine
// Rewrites `{type:name}` placeholders in a generated SQL string into
// escaped literals. Replacements are computed up front and applied in a
// single pass over the original template, so the output of one
// substitution is never re-scanned for further placeholders.

use crate::error::DatabaseError;
use crate::generator::SqlGenerator;
use crate::options::{Value, Variables};

/// A placeholder occurrence found in the template.
#[derive(Debug, PartialEq)]
struct Placeholder<'a> {
    start: usize,
    end: usize,
    tag: &'a str,
    name: &'a str,
}

/// Replaces every `{type:name}` placeholder in `query` with the escaped
/// literal for the matching entry of `variables`.
///
/// The dialect's `escape_string` is used for `string`-typed values, so the
/// same options can substitute differently per engine. An empty variables
/// map short-circuits and returns the template unchanged.
pub fn replace_variables(
    query: &str,
    variables: &Variables,
    generator: &dyn SqlGenerator,
) -> Result<String, DatabaseError> {
    if variables.is_empty() {
        return Ok(query.to_string());
    }

    let placeholders = scan_placeholders(query);
    if placeholders.is_empty() {
        return Ok(query.to_string());
    }

    let mut output = String::with_capacity(query.len());
    let mut cursor = 0;
    for placeholder in &placeholders {
        output.push_str(&query[cursor..placeholder.start]);
        output.push_str(&replacement_for(placeholder, variables, generator)?);
        cursor = placeholder.end;
    }
    output.push_str(&query[cursor..]);

    Ok(output)
}

/// Scans the template for well-formed `{tag:name}` tokens. Anything that
/// does not complete the grammar (empty tag/name, stray characters) is not
/// a placeholder and is left alone.
fn scan_placeholders(query: &str) -> Vec<Placeholder<'_>> {
    let bytes = query.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }

        let tag_start = i + 1;
        let tag_end = word_end(bytes, tag_start);
        if tag_end == tag_start || tag_end >= bytes.len() || bytes[tag_end] != b':' {
            i += 1;
            continue;
        }

        let name_start = tag_end + 1;
        let name_end = word_end(bytes, name_start);
        if name_end == name_start || name_end >= bytes.len() || bytes[name_end] != b'}' {
            i += 1;
            continue;
        }

        found.push(Placeholder {
            start: i,
            end: name_end + 1,
            tag: &query[tag_start..tag_end],
            name: &query[name_start..name_end],
        });
        i = name_end + 1;
    }

    found
}

fn word_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    i
}

fn replacement_for(
    placeholder: &Placeholder<'_>,
    variables: &Variables,
    generator: &dyn SqlGenerator,
) -> Result<String, DatabaseError> {
    let value = variables
        .get(placeholder.name)
        .ok_or_else(|| DatabaseError::UndefinedVariable(placeholder.name.to_string()))?;

    // Unknown tags are rejected even for NULL values.
    if !matches!(
        placeholder.tag,
        "int" | "double" | "string" | "raw" | "array_int" | "array_double" | "array_string"
    ) {
        return Err(DatabaseError::UnknownDataType(placeholder.tag.to_string()));
    }

    // NULL substitutes unconditionally, skipping type validation.
    if matches!(value, Value::Null) {
        return Ok("NULL".to_string());
    }

    match placeholder.tag {
        "int" => process_int(placeholder.name, value),
        "double" => process_double(placeholder.name, value),
        "string" => process_string(placeholder.name, value, generator),
        "raw" => process_raw(placeholder.name, value),
        "array_int" => process_array(placeholder.name, value, "array of integers", process_int),
        "array_double" => process_array(placeholder.name, value, "array of doubles", process_double),
        "array_string" => process_array(placeholder.name, value, "array of strings", |name, v| {
            process_string(name, v, generator)
        }),
        _ => unreachable!("tag validated above"),
    }
}

/// Integers must round-trip losslessly: `"5"` is fine, `"5.5"` and `"5 "`
/// are not. Integral doubles are accepted.
fn process_int(name: &str, value: &Value) -> Result<String, DatabaseError> {
    match value {
        Value::Int(i) => Ok(i.to_string()),
        Value::Double(d) if d.is_finite() && d.fract() == 0.0 => Ok((*d as i64).to_string()),
        Value::Str(s) => s
            .parse::<i64>()
            .ok()
            .filter(|parsed| parsed.to_string() == *s)
            .map(|parsed| parsed.to_string())
            .ok_or_else(|| DatabaseError::type_mismatch(name, "integer", value.type_name())),
        _ => Err(DatabaseError::type_mismatch(name, "integer", value.type_name())),
    }
}

fn process_double(name: &str, value: &Value) -> Result<String, DatabaseError> {
    match value {
        Value::Int(i) => Ok(i.to_string()),
        Value::Double(d) if d.is_finite() => Ok(format!("{}", d)),
        Value::Str(s) => s
            .parse::<f64>()
            .ok()
            .filter(|parsed| parsed.is_finite() && format!("{}", parsed) == *s)
            .map(|parsed| format!("{}", parsed))
            .ok_or_else(|| DatabaseError::type_mismatch(name, "double", value.type_name())),
        _ => Err(DatabaseError::type_mismatch(name, "double", value.type_name())),
    }
}

/// Strings are entity-escaped first (a defense for contexts that re-render
/// query text as HTML or log output), then dialect-escaped, then quoted.
fn process_string(
    name: &str,
    value: &Value,
    generator: &dyn SqlGenerator,
) -> Result<String, DatabaseError> {
    let raw = match value {
        Value::Str(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Double(d) => format!("{}", d),
        _ => return Err(DatabaseError::type_mismatch(name, "string", value.type_name())),
    };

    Ok(format!("'{}'", generator.escape_string(&html_escape(&raw))))
}

/// Raw values are the caller's assertion that the fragment is already safe
/// SQL; they pass through untouched.
fn process_raw(name: &str, value: &Value) -> Result<String, DatabaseError> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Double(d) => Ok(format!("{}", d)),
        _ => Err(DatabaseError::type_mismatch(name, "raw", value.type_name())),
    }
}

fn process_array(
    name: &str,
    value: &Value,
    expected: &str,
    mut element: impl FnMut(&str, &Value) -> Result<String, DatabaseError>,
) -> Result<String, DatabaseError> {
    let items = match value {
        Value::Array(items) => items,
        _ => return Err(DatabaseError::type_mismatch(name, expected, value.type_name())),
    };

    let parts = items
        .iter()
        .map(|item| element(name, item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(parts.join(", "))
}

/// Entity-escapes `& < > " '`. Runs in one pass so ampersands in the
/// input are never double-escaped.
fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
