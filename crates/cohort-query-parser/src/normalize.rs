//! Outer parenthesis normalization

use std::borrow::Cow;

/// Whether `text` (already trimmed) is enclosed by a single pair of
/// parentheses: it opens with `(` and the nesting depth first returns to
/// zero at its final character.
pub fn has_outer_parens(text: &str) -> bool {
    if !text.starts_with('(') || !text.ends_with(')') {
        return false;
    }

    let last = text.len() - 1;
    let mut depth: usize = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == last;
                }
            }
            _ => {}
        }
    }

    false
}

/// Trim `text` and wrap it in one synthetic pair of parentheses unless it
/// already has outer parentheses.
///
/// Afterwards every expression the grammar sees begins with `(`, `has`,
/// `val(` or `not `.
pub fn ensure_outer_parens(text: &str) -> Cow<'_, str> {
    let trimmed = text.trim();
    if has_outer_parens(trimmed) {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("({})", trimmed))
    }
}
