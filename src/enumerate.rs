use log::debug;

use crate::ast::{Node, Repeat};
use crate::charset::CharSet;
use crate::error::EnumerationError;

/// Largest number of strings an enumeration may produce.
pub const MAX_STRINGS: usize = 1_000_000;

/// Largest combined length, in bytes, of the strings an enumeration may
/// produce.
pub const MAX_BYTES: usize = 64 << 20;

/// Every string matched by `node`, in match order.
///
/// Examples:
/// - `(a|b){2}` → `["aa", "ab", "ba", "bb"]`
/// - `ab?` → `["a", "ab"]`
/// - `a*` → `Err(Unbounded)`
/// - `a{0,100000}` → `Err(TooLarge(MAX_BYTES))`
pub fn enumerate(node: &Node) -> Result<Vec<String>, EnumerationError> {
    let result = strings(node);
    match &result {
        Ok(found) => debug!("enumerated {} strings", found.len()),
        Err(err) => debug!("enumeration failed: {}", err),
    }
    result
}

fn strings(node: &Node) -> Result<Vec<String>, EnumerationError> {
    match node {
        Node::Epsilon => Ok(vec![String::new()]),
        Node::Literal(text) => Ok(vec![text.clone()]),
        Node::Primitive(p) if p.is_zero_width() => Ok(vec![String::new()]),
        Node::Primitive(p) => Err(EnumerationError::NotEnumerable(p.rx())),
        Node::Sequence(elts) => {
            // Every element is visited, so an unbounded repeat after a
            // failing element is still reported.
            let mut acc = vec![String::new()];
            for elt in elts {
                acc = product(&acc, &strings(elt)?)?;
            }
            Ok(acc)
        }
        Node::Choice(elts) => {
            let mut all = Vec::new();
            let mut bytes = 0;
            for elt in elts {
                let found = strings(elt)?;
                check_size(all.len().saturating_add(found.len()))?;
                bytes = check_bytes(bytes, total_len(&found))?;
                all.extend(found);
            }
            Ok(all)
        }
        Node::Repeat(repeat) => repetition(repeat),
        Node::Submatch(body) => strings(body),
        Node::CharSet(set) => char_set(set),
        Node::Backref(_) => Err(EnumerationError::NotEnumerable("a backreference")),
        Node::SyntaxClass(_) => Err(EnumerationError::NotEnumerable("a syntax class")),
        Node::CharCategory(_) => Err(EnumerationError::NotEnumerable("a character category")),
        Node::Negation(_) => Err(EnumerationError::NotEnumerable("a negated class")),
        Node::Intersection(_) => Err(EnumerationError::NotEnumerable("an intersection")),
    }
}

/// Concatenates every string of `left` with every string of `right`,
/// `left` varying slowest.
fn product(left: &[String], right: &[String]) -> Result<Vec<String>, EnumerationError> {
    check_size(left.len().saturating_mul(right.len()))?;
    check_bytes(
        total_len(left).saturating_mul(right.len()),
        total_len(right).saturating_mul(left.len()),
    )?;
    let mut out = Vec::with_capacity(left.len() * right.len());
    for l in left {
        for r in right {
            out.push(format!("{}{}", l, r));
        }
    }
    Ok(out)
}

/// Strings for `from` copies of the body, then `from + 1`, up to `to`.
fn repetition(repeat: &Repeat) -> Result<Vec<String>, EnumerationError> {
    let Some(to) = repeat.to else {
        return Err(EnumerationError::Unbounded);
    };
    let body = strings(&repeat.body)?;

    let mut frontier = vec![String::new()];
    for _ in 0..repeat.from {
        frontier = product(&frontier, &body)?;
    }
    let mut results = frontier.clone();
    let mut bytes = total_len(&results);
    for _ in repeat.from..to {
        if frontier.is_empty() {
            break;
        }
        frontier = product(&frontier, &body)?;
        check_size(results.len().saturating_add(frontier.len()))?;
        bytes = check_bytes(bytes, total_len(&frontier))?;
        results.extend(frontier.iter().cloned());
    }
    Ok(results)
}

fn char_set(set: &CharSet) -> Result<Vec<String>, EnumerationError> {
    if let Some(&class) = set.classes().first() {
        return Err(EnumerationError::PosixClass(class.name()));
    }
    let span: usize = set
        .ranges()
        .iter()
        .map(|&(lo, hi)| (hi as usize).saturating_sub(lo as usize) + 1)
        .sum();
    check_size(set.chars().len().saturating_add(span))?;

    let mut out: Vec<String> = set.chars().iter().map(|c| c.to_string()).collect();
    for &(lo, hi) in set.ranges() {
        // Surrogate code points are skipped.
        out.extend(((lo as u32)..=(hi as u32)).filter_map(char::from_u32).map(String::from));
    }
    Ok(out)
}

fn check_size(len: usize) -> Result<(), EnumerationError> {
    if len > MAX_STRINGS {
        Err(EnumerationError::TooMany(MAX_STRINGS))
    } else {
        Ok(())
    }
}

/// Adds two byte counts, failing past [`MAX_BYTES`].
fn check_bytes(a: usize, b: usize) -> Result<usize, EnumerationError> {
    let total = a.saturating_add(b);
    if total > MAX_BYTES {
        Err(EnumerationError::TooLarge(MAX_BYTES))
    } else {
        Ok(total)
    }
}

fn total_len(strings: &[String]) -> usize {
    strings.iter().map(String::len).sum()
}
