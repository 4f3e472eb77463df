//! URN surface syntax and the per-type template matcher
//!
//! A template is the URN prefix followed by slash-delimited segments:
//!
//! ```text
//! urn:ccrn:<ccrn>/<cluster>/<namespace>/<name>
//! urn:ccrn:pod.k8s-registry.ccrn.example.com/v1/<cluster>/<namespace>/<name>
//! ```
//!
//! The head of the template stands for the type key, written either as a
//! single `<ccrn>` placeholder or as the two literal halves of the key.
//! Either way the type key is read from the first two segments of the
//! input. The remaining segments are matched positionally; a trailing
//! placeholder absorbs the rest of the input, slashes included.

use std::collections::HashSet;

use crate::error::{CcrnError, Result};
use crate::resource::{CCRN_FIELD, Fields, Format, ParsedResource};

/// Literal prefix of every URN and every URN template
pub const URN_PREFIX: &str = "urn:ccrn:";

/// Template that only extracts the type key
pub const DEFAULT_URN_TEMPLATE: &str = "urn:ccrn:<ccrn>";

const CCRN_PLACEHOLDER: &str = "<ccrn>";

/// Parse a URN using `template`
pub fn parse_urn(input: &str, template: &str) -> Result<ParsedResource> {
    let body = input.strip_prefix(URN_PREFIX).ok_or_else(|| {
        CcrnError::malformed(format!("URN '{}' must start with '{}'", input, URN_PREFIX))
    })?;
    let template_body = template.strip_prefix(URN_PREFIX).ok_or_else(|| {
        CcrnError::malformed(format!(
            "URN template '{}' must start with '{}'",
            template, URN_PREFIX
        ))
    })?;

    let (type_key, rest) = split_type_key(input, body)?;
    let tail = template_tail(template, template_body)?;

    let mut fields = Fields::new();
    fields.insert(CCRN_FIELD.to_string(), type_key);

    if !tail.is_empty() {
        let segments: Vec<&str> = match rest {
            Some(rest) if !rest.is_empty() => rest.splitn(tail.len(), '/').collect(),
            _ => Vec::new(),
        };

        if segments.len() < tail.len() {
            return Err(CcrnError::SegmentCountMismatch {
                template: template.to_string(),
                input: input.to_string(),
                expected: tail.len(),
                found: segments.len(),
            });
        }

        for (expected, actual) in tail.iter().zip(segments) {
            match placeholder_name(expected) {
                Some(name) => {
                    if actual.is_empty() {
                        return Err(CcrnError::malformed(format!(
                            "URN '{}' has an empty segment for '{}'",
                            input, expected
                        )));
                    }
                    fields.insert(name.to_string(), actual.to_string());
                }
                None if *expected != actual => {
                    return Err(CcrnError::TemplateMismatch {
                        expected: expected.to_string(),
                        actual: actual.to_string(),
                    });
                }
                None => {}
            }
        }
    }

    let mut parsed = ParsedResource::new(Format::Urn, fields, input)?;
    parsed.urn_template_used = template.to_string();
    Ok(parsed)
}

/// Extract only the type key from a URN
///
/// Used when the per-type template is not known yet and has to be looked
/// up from the type key first.
pub fn parse_urn_type_key(input: &str) -> Result<String> {
    parse_urn(input, DEFAULT_URN_TEMPLATE).map(|parsed| parsed.type_key().to_string())
}

/// Substitute `<name>` placeholders in `template` with field values
///
/// Only the first occurrence of each placeholder is substituted. A
/// placeholder without a matching field stays in the output untouched.
/// Values are inserted literally.
pub fn render_urn(fields: &Fields, template: &str) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut substituted: HashSet<&str> = HashSet::new();

    scan_placeholders(template, |piece| match piece {
        Piece::Text(text) => out.push_str(text),
        Piece::Placeholder(name) => match fields.get(name) {
            Some(value) if substituted.insert(name) => out.push_str(value),
            _ => {
                out.push('<');
                out.push_str(name);
                out.push('>');
            }
        },
    });

    out
}

/// Names of `<placeholder>` tokens still present in a rendered URN
pub fn unresolved_placeholders(rendered: &str) -> Vec<String> {
    let mut names = Vec::new();
    scan_placeholders(rendered, |piece| {
        if let Piece::Placeholder(name) = piece {
            names.push(name.to_string());
        }
    });
    names
}

fn split_type_key<'a>(input: &str, body: &'a str) -> Result<(String, Option<&'a str>)> {
    let mut parts = body.splitn(3, '/');
    let type_name = parts.next().unwrap_or("");
    let version = parts.next().unwrap_or("");
    if type_name.is_empty() || version.is_empty() {
        return Err(CcrnError::malformed(format!(
            "URN '{}' must contain '<type>.<group>/<version>' after '{}'",
            input, URN_PREFIX
        )));
    }
    Ok((format!("{}/{}", type_name, version), parts.next()))
}

/// Template segments following the type-key head
fn template_tail<'a>(template: &str, template_body: &'a str) -> Result<Vec<&'a str>> {
    let segments: Vec<&str> = template_body.split('/').collect();

    let tail = if segments[0] == CCRN_PLACEHOLDER {
        &segments[1..]
    } else if segments.len() >= 2 && !segments[0].is_empty() && !segments[1].is_empty() {
        &segments[2..]
    } else {
        return Err(CcrnError::malformed(format!(
            "URN template '{}' must begin with '{}' or '<type>.<group>/<version>'",
            template, CCRN_PLACEHOLDER
        )));
    };

    if tail.contains(&CCRN_PLACEHOLDER) {
        return Err(CcrnError::malformed(format!(
            "URN template '{}' may only use '{}' as its first segment",
            template, CCRN_PLACEHOLDER
        )));
    }

    Ok(tail.to_vec())
}

fn placeholder_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .filter(|name| !name.is_empty())
}

enum Piece<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

/// Split `s` into literal text and `<name>` tokens
fn scan_placeholders<'a>(s: &'a str, mut visit: impl FnMut(Piece<'a>)) {
    let mut rest = s;
    while let Some(start) = rest.find('<') {
        visit(Piece::Text(&rest[..start]));
        let candidate = &rest[start + 1..];
        match candidate.find(['<', '>']) {
            Some(end) if end > 0 && candidate.as_bytes()[end] == b'>' => {
                visit(Piece::Placeholder(&candidate[..end]));
                rest = &candidate[end + 1..];
            }
            _ => {
                visit(Piece::Text("<"));
                rest = candidate;
            }
        }
    }
    visit(Piece::Text(rest));
}
