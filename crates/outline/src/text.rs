//! Word-level scanning of reconstructed declaration text.
//!
//! Node text is rendered with single spaces between tokens (see
//! [`render_text`](crate::syntax::render_text)), so splitting on whitespace
//! yields source tokens, with qualified names, array suffixes and generic
//! arguments kept whole.

use std::collections::BTreeSet;

use crate::types::{Modifier, ParameterInfo, TypeRef};

/// Words of a declaration header that precede its name
///
/// Only the header is searched, i.e. words before the first `(` or `{`. The
/// name must match a whole word, ignoring type parameters glued to it
/// (`Box<T>` matches `Box`). An absent name yields no words.
#[must_use]
pub fn declaration_prefix<'a>(text: &'a str, name: &str) -> Vec<&'a str> {
    let header: Vec<&str> = text
        .split_whitespace()
        .take_while(|w| *w != "(" && *w != "{")
        .collect();
    header
        .iter()
        .position(|w| w.split('<').next() == Some(name))
        .map(|index| header[..index].to_vec())
        .unwrap_or_default()
}

/// Split prefix words into recognized modifiers and the first word that is
/// not one
#[must_use]
pub fn split_modifiers<'a>(words: &[&'a str]) -> (BTreeSet<Modifier>, Option<&'a str>) {
    let mut modifiers = BTreeSet::new();
    let mut first_other = None;
    for word in words {
        match Modifier::from_keyword(word) {
            Some(modifier) => {
                modifiers.insert(modifier);
            }
            None if first_other.is_none() => first_other = Some(*word),
            None => {}
        }
    }
    (modifiers, first_other)
}

/// Formal parameters from a method header
///
/// Reads the text between the first `(` and its matching `)` and splits it
/// on commas that are not inside generic arguments. A lone word is an
/// untyped parameter. Otherwise the last word is the name and the other
/// non-modifier words form the type.
#[must_use]
pub fn parameters(text: &str) -> Vec<ParameterInfo> {
    let Some(open) = text.find('(') else {
        return Vec::new();
    };
    let inner = &text[open + 1..];

    let mut segments = Vec::new();
    let mut paren_depth = 0usize;
    let mut angle_depth = 0usize;
    let mut segment_start = 0;
    for (index, c) in inner.char_indices() {
        match c {
            '(' => paren_depth += 1,
            ')' if paren_depth == 0 => {
                segments.push(&inner[segment_start..index]);
                segment_start = inner.len();
                break;
            }
            ')' => paren_depth -= 1,
            '<' => angle_depth += 1,
            '>' => angle_depth = angle_depth.saturating_sub(1),
            ',' if paren_depth == 0 && angle_depth == 0 => {
                segments.push(&inner[segment_start..index]);
                segment_start = index + 1;
            }
            _ => {}
        }
    }
    if segment_start < inner.len() {
        segments.push(&inner[segment_start..]);
    }

    segments.into_iter().filter_map(parameter).collect()
}

fn parameter(segment: &str) -> Option<ParameterInfo> {
    let words: Vec<&str> = segment.split_whitespace().collect();
    let (last, rest) = words.split_last()?;
    if rest.is_empty() {
        return Some(ParameterInfo::new(*last, TypeRef::Loose));
    }

    let mut name = *last;
    let mut type_name = rest
        .iter()
        .filter(|w| Modifier::from_keyword(w).is_none())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(" ...", "...");
    while let Some(stripped) = name.strip_suffix("[]") {
        name = stripped;
        type_name.push_str("[]");
    }

    if type_name.is_empty() {
        Some(ParameterInfo::new(name, TypeRef::Loose))
    } else {
        Some(ParameterInfo::new(name, TypeRef::from_token(type_name)))
    }
}

/// The type after the first `extends` outside angle brackets, with an
/// attached `{` stripped
///
/// Bounds of type parameters (`class Pair<K extends Number>`) are skipped.
/// Type arguments of the superclass are kept, e.g. `Base<List<? extends T>>`.
#[must_use]
pub fn super_class(text: &str) -> Option<String> {
    let mut words = text.split_whitespace();
    let mut depth = 0isize;
    words.find(|w| {
        let found = depth == 0 && *w == "extends";
        depth += angle_balance(w);
        found
    })?;

    let mut parts = Vec::new();
    for word in words {
        let word = word.trim_end_matches('{');
        if !word.is_empty() {
            parts.push(word);
        }
        depth += angle_balance(word);
        if depth <= 0 {
            break;
        }
    }
    let super_class = parts.join(" ");
    (!super_class.is_empty()).then_some(super_class)
}

fn angle_balance(word: &str) -> isize {
    word.chars()
        .map(|c| match c {
            '<' => 1,
            '>' => -1,
            _ => 0,
        })
        .sum()
}
