//! Reference paths.
//!
//! A reference `@(stats/str)` names an expression by its absolute path from
//! the root group. `@(..str)` is local: the body is resolved against the group
//! of the expression that contains the reference. Qualified paths always start
//! with `/`, and the root group's own path is the empty string.

/// The parsed inside of a reference token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePath {
    pub local: bool,
    pub body: String,
}

/// Parse `@( [..]body )`, tolerating whitespace inside the parentheses.
pub fn parse_reference(text: &str) -> Option<ReferencePath> {
    let inner = text.strip_prefix("@(")?.strip_suffix(')')?.trim();
    let (local, body) = match inner.strip_prefix("..") {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let valid = !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-'));
    valid.then(|| ReferencePath {
        local,
        body: body.to_string(),
    })
}

impl ReferencePath {
    /// The absolute path this reference points at from inside `group_path`.
    pub fn qualify(&self, group_path: &str) -> String {
        qualify(&self.body, self.local, group_path)
    }

    /// The path as written, with the locality marker reproduced.
    pub fn display(&self) -> String {
        if self.local {
            format!("..{}", self.body)
        } else {
            self.body.clone()
        }
    }
}

pub fn qualify(body: &str, local: bool, group_path: &str) -> String {
    let body = body.trim_start_matches('/');
    if local {
        join(group_path, body)
    } else {
        format!("/{}", body)
    }
}

pub fn join(parent: &str, name: &str) -> String {
    format!("{}/{}", parent, name)
}

/// Render the reference to `target` as written from inside `group_path`.
///
/// A local reference stays local when `target` is still under `group_path`,
/// otherwise it becomes absolute.
pub fn render_reference(target: &str, local: bool, group_path: &str) -> String {
    if local {
        if let Some(relative) = target
            .strip_prefix(group_path)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            return format!("@(..{})", relative);
        }
    }
    format!("@({})", target.trim_start_matches('/'))
}

/// Replace the prefix `from` of `path` with `to`, when `path` is `from` itself
/// or lies under it.
pub fn map_path(path: &str, from: &str, to: &str) -> Option<String> {
    if path == from {
        return Some(to.to_string());
    }
    let rest = path.strip_prefix(from)?;
    rest.starts_with('/').then(|| format!("{}{}", to, rest))
}
