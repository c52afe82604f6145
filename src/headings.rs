//! Role markers stored at the top of every exported cell.
//!
//! Notebooks have no role field, so the speaker of a cell is recovered from
//! its leading heading.

use agent_session::Role;

pub const USER_HEADING: &str = "##### User:\n";
pub const ASSISTANT_HEADING: &str = "##### Assistant:\n";

#[must_use]
pub fn heading_for(role: Role) -> &'static str {
    match role {
        Role::User => USER_HEADING,
        Role::Assistant => ASSISTANT_HEADING,
    }
}

/// Prefixes `body` with the heading for `role`.
#[must_use]
pub fn with_heading(role: Role, body: &str) -> String {
    let heading = heading_for(role);
    let mut text = String::with_capacity(heading.len() + body.len());
    text.push_str(heading);
    text.push_str(body);
    text
}

/// Splits a leading role heading off cell text.
///
/// Text without a recognized heading is attributed to the user and returned whole.
#[must_use]
pub fn split_heading(text: &str) -> (Role, &str) {
    if let Some(body) = text.strip_prefix(ASSISTANT_HEADING) {
        return (Role::Assistant, body);
    }

    if let Some(body) = text.strip_prefix(USER_HEADING) {
        return (Role::User, body);
    }

    (Role::User, text)
}
