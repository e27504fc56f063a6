use tracing::trace;

use crate::lexer;
use crate::path::{self, parse_reference};

/// Rewrite the references in `text` after the entity at path `from` moved to
/// `to`.
///
/// `old_group` and `new_group` are the paths of the group holding `text`
/// before and after the move; they differ when the owner of the text moved
/// with the entity. Local references stay local while their target remains
/// under the owner's group and become absolute otherwise. References that
/// still mean the same thing are left untouched.
///
/// Returns `None` when the text comes out unchanged.
pub fn rewrite_references(
    text: &str,
    old_group: &str,
    new_group: &str,
    from: &str,
    to: &str,
) -> Option<String> {
    let mut rewritten = String::with_capacity(text.len());
    let mut last = 0;
    let mut changed = false;

    for (span, reference) in lexer::references(text) {
        let Some(parsed) = parse_reference(reference) else {
            continue;
        };
        let old_target = parsed.qualify(old_group);
        let new_target = path::map_path(&old_target, from, to);
        let owner_moved = parsed.local && old_group != new_group;
        if new_target.is_none() && !owner_moved {
            continue;
        }
        let target = new_target.unwrap_or(old_target);
        let replacement = path::render_reference(&target, parsed.local, new_group);
        trace!(%reference, %replacement, "Rewriting reference");
        rewritten.push_str(&text[last..span.start]);
        rewritten.push_str(&replacement);
        last = span.end;
        changed = true;
    }

    if !changed {
        return None;
    }
    rewritten.push_str(&text[last..]);
    (rewritten != text).then_some(rewritten)
}
