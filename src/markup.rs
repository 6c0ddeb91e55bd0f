//! Minimal HTML-fragment parser for building test pages.
//!
//! Handles tags with quoted/unquoted attributes, void elements, comments,
//! and a small entity set. Whitespace-only text runs are dropped so sibling
//! positions stay predictable. Closing tags that match nothing are ignored.

use std::collections::HashMap;

use crate::dom::{Dom, NodeId};
use crate::{Error, Result};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(crate) fn parse_fragment(dom: &mut Dom, parent: NodeId, src: &str) -> Result<()> {
    let chars = src.chars().collect::<Vec<_>>();
    let mut stack = vec![parent];
    let mut text = String::new();
    let mut i = 0usize;

    while i < chars.len() {
        if chars[i] != '<' {
            text.push(chars[i]);
            i += 1;
            continue;
        }

        flush_text(dom, &stack, &mut text);

        if starts_with(&chars, i, "<!--") {
            i = skip_past(&chars, i + 4, "-->")
                .ok_or_else(|| Error::MarkupParse("unterminated comment".into()))?;
            continue;
        }

        if starts_with(&chars, i, "<!") {
            i = skip_past(&chars, i + 2, ">")
                .ok_or_else(|| Error::MarkupParse("unterminated declaration".into()))?;
            continue;
        }

        if starts_with(&chars, i, "</") {
            let (name, next) = read_tag_name(&chars, i + 2)?;
            i = skip_past(&chars, next, ">")
                .ok_or_else(|| Error::MarkupParse("unterminated closing tag".into()))?;
            close_open_tag(dom, &mut stack, parent, &name);
            continue;
        }

        let (name, mut cursor) = read_tag_name(&chars, i + 1)?;
        let mut attrs = HashMap::new();
        let mut self_closing = false;

        loop {
            while cursor < chars.len() && chars[cursor].is_whitespace() {
                cursor += 1;
            }
            match chars.get(cursor) {
                None => return Err(Error::MarkupParse("unterminated tag".into())),
                Some('>') => {
                    cursor += 1;
                    break;
                }
                Some('/') => {
                    self_closing = true;
                    cursor += 1;
                }
                Some(_) => {
                    let (attr_name, attr_value, next) = read_attribute(&chars, cursor)?;
                    attrs.insert(attr_name, attr_value);
                    cursor = next;
                }
            }
        }

        let current = *stack.last().unwrap_or(&parent);
        let element = dom.create_element(current, name.clone(), attrs);
        if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
            stack.push(element);
        }
        i = cursor;
    }

    flush_text(dom, &stack, &mut text);
    Ok(())
}

fn flush_text(dom: &mut Dom, stack: &[NodeId], text: &mut String) {
    if text.trim().is_empty() {
        text.clear();
        return;
    }
    let decoded = decode_entities(text);
    if let Some(parent) = stack.last() {
        dom.create_text(*parent, decoded);
    }
    text.clear();
}

fn close_open_tag(dom: &Dom, stack: &mut Vec<NodeId>, floor: NodeId, name: &str) {
    // Pop to the nearest matching open tag; leave the stack alone when the
    // closing tag matches nothing currently open.
    let Some(pos) = stack
        .iter()
        .enumerate()
        .rev()
        .take_while(|(_, node)| **node != floor)
        .find(|(_, node)| {
            dom.tag_name(**node)
                .map(|tag| tag.eq_ignore_ascii_case(name))
                .unwrap_or(false)
        })
        .map(|(idx, _)| idx)
    else {
        return;
    };
    stack.truncate(pos);
}

fn starts_with(chars: &[char], at: usize, needle: &str) -> bool {
    needle
        .chars()
        .enumerate()
        .all(|(offset, ch)| chars.get(at + offset) == Some(&ch))
}

fn skip_past(chars: &[char], mut at: usize, needle: &str) -> Option<usize> {
    while at < chars.len() {
        if starts_with(chars, at, needle) {
            return Some(at + needle.chars().count());
        }
        at += 1;
    }
    None
}

fn read_tag_name(chars: &[char], mut at: usize) -> Result<(String, usize)> {
    let mut name = String::new();
    while let Some(ch) = chars.get(at) {
        if ch.is_ascii_alphanumeric() || *ch == '-' {
            name.push(ch.to_ascii_lowercase());
            at += 1;
        } else {
            break;
        }
    }
    if name.is_empty() {
        return Err(Error::MarkupParse("missing tag name".into()));
    }
    Ok((name, at))
}

fn read_attribute(chars: &[char], mut at: usize) -> Result<(String, String, usize)> {
    let mut name = String::new();
    while let Some(ch) = chars.get(at) {
        if ch.is_whitespace() || *ch == '=' || *ch == '>' || *ch == '/' {
            break;
        }
        name.push(ch.to_ascii_lowercase());
        at += 1;
    }
    if name.is_empty() {
        return Err(Error::MarkupParse("missing attribute name".into()));
    }

    while at < chars.len() && chars[at].is_whitespace() {
        at += 1;
    }
    if chars.get(at) != Some(&'=') {
        return Ok((name, String::new(), at));
    }
    at += 1;
    while at < chars.len() && chars[at].is_whitespace() {
        at += 1;
    }

    let mut value = String::new();
    match chars.get(at) {
        Some(quote @ ('"' | '\'')) => {
            let quote = *quote;
            at += 1;
            while let Some(ch) = chars.get(at) {
                if *ch == quote {
                    at += 1;
                    return Ok((name, decode_entities(&value), at));
                }
                value.push(*ch);
                at += 1;
            }
            Err(Error::MarkupParse("unterminated attribute value".into()))
        }
        Some(_) => {
            while let Some(ch) = chars.get(at) {
                if ch.is_whitespace() || *ch == '>' || *ch == '/' {
                    break;
                }
                value.push(*ch);
                at += 1;
            }
            Ok((name, decode_entities(&value), at))
        }
        None => Err(Error::MarkupParse("unterminated attribute".into())),
    }
}

fn decode_entities(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }

    let chars = src.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(src.len());
    let mut i = 0usize;

    while i < chars.len() {
        if chars[i] != '&' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let Some(end) = (i + 1..chars.len().min(i + 12)).find(|idx| chars[*idx] == ';') else {
            out.push('&');
            i += 1;
            continue;
        };
        let entity = chars[i + 1..end].iter().collect::<String>();
        if let Some(decoded) = decode_entity(&entity) {
            out.push(decoded);
            i = end + 1;
        } else {
            out.push('&');
            i += 1;
        }
    }
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let codepoint = if let Some(hex) = numeric
            .strip_prefix('x')
            .or_else(|| numeric.strip_prefix('X'))
        {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            numeric.parse::<u32>().ok()?
        };
        return char::from_u32(codepoint);
    }
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        _ => None,
    }
}
