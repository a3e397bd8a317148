// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable labels from type names.

use alloc::string::String;
use alloc::vec::Vec;

/// Turns a type name into a label by inserting spaces.
///
/// Three passes run in order, each left to right without overlap:
///
/// 1. before a capitalised word (`Arc` in `CircularArc`),
/// 2. before a run of digits,
/// 3. between a lowercase letter or digit and a following capital.
///
/// ```rust
/// use arbor_node::display_name;
///
/// assert_eq!(display_name("CircularArc"), "Circular Arc");
/// assert_eq!(display_name("NACA4Digits"), "NACA 4 Digits");
/// assert_eq!(display_name("Profile"), "Profile");
/// ```
#[must_use]
pub fn display_name(type_name: &str) -> String {
    let chars: Vec<char> = type_name.chars().collect();
    let chars = split_after(&chars, capitalised_word);
    let chars = split_after(&chars, digit_run);
    let chars = split_after(&chars, lower_then_upper);
    chars.into_iter().collect()
}

/// Copies `chars`, inserting a space after position `i` wherever `matcher`
/// reports a match starting at `i` (returning where the match ends).
fn split_after(chars: &[char], matcher: fn(&[char], usize) -> Option<usize>) -> Vec<char> {
    let mut out = Vec::with_capacity(chars.len() + 4);
    let mut i = 0;
    while i < chars.len() {
        match matcher(chars, i) {
            Some(end) => {
                out.push(chars[i]);
                out.push(' ');
                out.extend_from_slice(&chars[i + 1..end]);
                i = end;
            }
            None => {
                out.push(chars[i]);
                i += 1;
            }
        }
    }
    out
}

fn run_end(chars: &[char], start: usize, pred: fn(&char) -> bool) -> usize {
    start + chars[start..].iter().take_while(|&c| pred(c)).count()
}

fn capitalised_word(chars: &[char], i: usize) -> Option<usize> {
    let upper = *chars.get(i + 1)?;
    let lower = *chars.get(i + 2)?;
    if chars[i] == '\n' || !upper.is_ascii_uppercase() || !lower.is_ascii_lowercase() {
        return None;
    }
    Some(run_end(chars, i + 2, char::is_ascii_lowercase))
}

fn digit_run(chars: &[char], i: usize) -> Option<usize> {
    let digit = *chars.get(i + 1)?;
    if chars[i] == '\n' || !digit.is_ascii_digit() {
        return None;
    }
    Some(run_end(chars, i + 1, char::is_ascii_digit))
}

fn lower_then_upper(chars: &[char], i: usize) -> Option<usize> {
    let upper = *chars.get(i + 1)?;
    let c = chars[i];
    ((c.is_ascii_lowercase() || c.is_ascii_digit()) && upper.is_ascii_uppercase()).then_some(i + 2)
}
