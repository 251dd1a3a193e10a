//! Selector codec
//!
//! Maps a function description to its 4-byte selector. Descriptions are
//! normalized first: a leading `function` keyword, parameter names, data
//! locations and anything after the parameter list are dropped, and the
//! integer aliases `uint`/`int` (also inside arrays and tuples) are widened
//! to their 256-bit canonical types. The selector is the first four bytes of
//! keccak256 of the canonical form.
//!
//! The codec does not guard against two canonical signatures hashing to the
//! same selector; the manifest builder detects that.

use std::fmt;

use diamond_types::{keccak256, Selector};

use crate::error::{ManifestError, Result};

/// A normalized function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub name: String,
    pub inputs: Vec<String>,
}

impl Signature {
    /// Parse and normalize a function description.
    pub fn parse(description: &str) -> Result<Self> {
        let malformed = |reason: &str| ManifestError::MalformedSignature {
            signature: description.to_string(),
            reason: reason.to_string(),
        };

        let text = description.trim();
        let text = strip_keyword(text, "function").unwrap_or(text);

        let open = text
            .find('(')
            .ok_or_else(|| malformed("missing parameter list"))?;
        let close = matching_paren(text, open).ok_or_else(|| malformed("unbalanced parentheses"))?;
        if !balanced(&text[close + 1..]) {
            return Err(malformed("unbalanced parentheses"));
        }

        let name = text[..open].trim();
        if name.is_empty() {
            return Err(malformed("empty name"));
        }
        if !is_identifier(name) {
            return Err(malformed("invalid name"));
        }

        let inputs = parse_params(&text[open + 1..close]).map_err(|reason| malformed(reason.as_str()))?;

        Ok(Self {
            name: name.to_string(),
            inputs,
        })
    }

    /// `name(type1,type2,...)`
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    pub fn selector(&self) -> Selector {
        let hash = keccak256(self.canonical().as_bytes());
        Selector::new([hash[0], hash[1], hash[2], hash[3]])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.inputs.join(","))
    }
}

impl std::str::FromStr for Signature {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Normalize a function description to its canonical form.
pub fn canonicalize(description: &str) -> Result<String> {
    Signature::parse(description).map(|signature| signature.canonical())
}

/// Compute the selector of a function description.
pub fn selector(description: &str) -> Result<Selector> {
    Signature::parse(description).map(|signature| signature.selector())
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Index of the `)` closing the `(` at `open`.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices().skip_while(|(i, _)| *i < open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn balanced(text: &str) -> bool {
    let mut depth = 0i64;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

/// Split on commas at nesting depth zero.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i64;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn parse_params(list: &str) -> std::result::Result<Vec<String>, String> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }
    split_top_level(list)
        .into_iter()
        .map(canonical_param)
        .collect()
}

/// Canonical type of one parameter declaration, dropping its name.
fn canonical_param(param: &str) -> std::result::Result<String, String> {
    let param = param.trim();
    if param.is_empty() {
        return Err("empty parameter".to_string());
    }

    let tuple_body = param
        .strip_prefix("tuple")
        .filter(|rest| rest.trim_start().starts_with('('))
        .map(str::trim_start)
        .or_else(|| param.starts_with('(').then_some(param));

    if let Some(body) = tuple_body {
        let close = matching_paren(body, 0).ok_or("unbalanced parentheses")?;
        let components = parse_params(&body[1..close])?;
        let (suffix, rest) = array_suffix(&body[close + 1..])?;
        check_trailing(rest)?;
        return Ok(format!("({}){}", components.join(","), suffix));
    }

    let end = param
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(param.len());
    let (base, rest) = param.split_at(end);
    let separated =
        rest.is_empty() || rest.starts_with('[') || rest.starts_with(char::is_whitespace);
    if base.is_empty() || !separated {
        return Err(format!("invalid type {param:?}"));
    }
    let (suffix, rest) = array_suffix(rest)?;
    check_trailing(rest)?;
    Ok(format!("{}{}", widen(base), suffix))
}

/// Leading `[..]` groups of a type, whitespace allowed around and inside
/// the brackets. Returns the canonical suffix and the unparsed remainder.
fn array_suffix(text: &str) -> std::result::Result<(String, &str), String> {
    let mut rest = text.trim_start();
    let mut suffix = String::new();
    while let Some(body) = rest.strip_prefix('[') {
        let end = body.find(']').ok_or("unterminated array dimension")?;
        let size = body[..end].trim();
        if !size.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("invalid array dimension {size:?}"));
        }
        suffix.push('[');
        suffix.push_str(size);
        suffix.push(']');
        rest = body[end + 1..].trim_start();
    }
    Ok((suffix, rest))
}

/// After the type only a data location and a parameter name may follow.
fn check_trailing(rest: &str) -> std::result::Result<(), String> {
    match rest.split_whitespace().find(|word| !is_identifier(word)) {
        Some(word) => Err(format!("unexpected {word:?} after type")),
        None => Ok(()),
    }
}

fn widen(base: &str) -> &str {
    match base {
        "uint" => "uint256",
        "int" => "int256",
        "byte" => "bytes1",
        "fixed" => "fixed128x18",
        "ufixed" => "ufixed128x18",
        other => other,
    }
}
