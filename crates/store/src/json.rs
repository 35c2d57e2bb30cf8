//! Schema-specific JSON reading and writing.
//!
//! Article records are flat objects with string and integer fields, so instead of
//! building a parse tree the store looks fields up by key inside the record text and
//! writes records with a fixed key order. The array holding the records is walked by
//! brace depth, yielding each top-level object verbatim.
//!
//! Absent or mistyped fields read as empty strings or zero. Text that is not a
//! well-formed array enumerates as `None`, which callers treat as an empty collection.

use std::fmt::Write;

use crate::article::Article;

/// Returns the string value of a top-level `key`, or an empty string when the key is
/// absent or its value is not a string.
pub fn get_string(object: &str, key: &str) -> String {
    let Some(start) = find_value(object, key) else {
        return String::new();
    };
    let bytes = object.as_bytes();
    if bytes.get(start) != Some(&b'"') {
        return String::new();
    }
    match string_end(bytes, start) {
        Some(end) => unescape(&object[start + 1..end]),
        None => String::new(),
    }
}

/// Returns the integer value of a top-level `key`, or 0 when the key is absent or its
/// value does not start with a base-10 integer. A fractional part is ignored.
pub fn get_number(object: &str, key: &str) -> i64 {
    let Some(start) = find_value(object, key) else {
        return 0;
    };
    let bytes = object.as_bytes();
    let mut end = start;
    if bytes.get(end) == Some(&b'-') {
        end += 1;
    }
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    object[start..end].parse().unwrap_or(0)
}

/// `true` when `key` appears as a top-level key of `object`.
pub fn has_key(object: &str, key: &str) -> bool {
    find_value(object, key).is_some()
}

/// Escapes `value` for use inside a JSON string literal.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() && (c as u32) < 0x20 => {
                let _ = write!(escaped, "\\u{:04x}", c as u32);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Serializes an article with the fixed key order
/// `id, title, author, body, thumb, createdAt[, updatedAt]`.
///
/// `updatedAt` is written only when it is set and positive.
pub fn build_record(article: &Article) -> String {
    let mut record = String::with_capacity(96 + article.title.len() + article.author.len() + article.body.len() + article.thumb.len());
    record.push('{');
    push_field(&mut record, "id", &article.id);
    record.push(',');
    push_field(&mut record, "title", &article.title);
    record.push(',');
    push_field(&mut record, "author", &article.author);
    record.push(',');
    push_field(&mut record, "body", &article.body);
    record.push(',');
    push_field(&mut record, "thumb", &article.thumb);
    let _ = write!(record, ",\"createdAt\":{}", article.created_at);
    if let Some(updated_at) = article.updated_at.filter(|t| *t > 0) {
        let _ = write!(record, ",\"updatedAt\":{updated_at}");
    }
    record.push('}');
    record
}

fn push_field(record: &mut String, key: &str, value: &str) {
    record.push('"');
    record.push_str(key);
    record.push_str("\":\"");
    record.push_str(&escape(value));
    record.push('"');
}

/// Splits a JSON array into the verbatim text of its top-level objects, in order.
///
/// Braces inside string literals do not count. Non-object elements are skipped.
/// Returns `None` when `text` is not enclosed in `[` `]` or the braces do not balance.
pub fn enumerate_array(text: &str) -> Option<Vec<&str>> {
    let trimmed = text.trim();
    let inner = trimmed.strip_prefix('[')?.strip_suffix(']')?;
    let bytes = inner.as_bytes();

    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i = string_end(bytes, i)?;
            }
            b'{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    objects.push(&inner[start..=i]);
                }
            }
            _ => {}
        }
        i += 1;
    }

    if depth == 0 { Some(objects) } else { None }
}

/// Writes `[a,b,...]` from already serialized records.
pub fn join_array<I, S>(records: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut array = String::from("[");
    for (index, record) in records.into_iter().enumerate() {
        if index > 0 {
            array.push(',');
        }
        array.push_str(record.as_ref());
    }
    array.push(']');
    array
}

/// Byte offset of the value that follows `"key":` at the top level of `object`.
///
/// Only strings in key position directly inside the outermost object are compared,
/// so a string value that happens to equal `key` never matches.
fn find_value(object: &str, key: &str) -> Option<usize> {
    let bytes = object.as_bytes();
    let mut depth = 0usize;
    let mut expect_key = false;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                let end = string_end(bytes, i)?;
                if depth == 1 && expect_key {
                    expect_key = false;
                    let colon = skip_whitespace(bytes, end + 1);
                    if bytes.get(colon) == Some(&b':') && unescape(&object[i + 1..end]) == key {
                        return Some(skip_whitespace(bytes, colon + 1));
                    }
                }
                i = end;
            }
            b @ (b'{' | b'[') => {
                depth += 1;
                expect_key = depth == 1 && b == b'{';
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                expect_key = false;
            }
            b',' => expect_key = depth == 1,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the quote closing the string literal that opens at `start`.
fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    i
}

/// Decodes the escapes of a JSON string body (without its quotes).
fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => out.push(unescape_unicode(&mut chars)),
            // covers \" \\ \/ and unknown escapes
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn unescape_unicode(chars: &mut std::str::Chars<'_>) -> char {
    let Some(high) = read_hex4(chars) else {
        return char::REPLACEMENT_CHARACTER;
    };
    if !(0xD800..0xDC00).contains(&high) {
        return char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER);
    }

    let mut lookahead = chars.clone();
    if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
        if let Some(low) = read_hex4(&mut lookahead).filter(|low| (0xDC00..0xE000).contains(low)) {
            *chars = lookahead;
            let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER);
        }
    }
    char::REPLACEMENT_CHARACTER
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..4 {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}
