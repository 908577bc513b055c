//! # Collision-free private topic namespaces.
//!
//! A [`Scope`] is an opaque prefix minted from a process-global counter.
//! Independent call sites can namespace their topics without coordinating
//! string constants: two freshly minted scopes never collide.
//!
//! ```text
//! scope.of("hello/world")      ──► "__scope_7/hello/world"
//! un_scope("__scope_7/x/y")    ──► "x/y"
//! un_scope("plain/topic")      ──► "plain/topic"   (identity)
//! ```
//!
//! `un_scope` is the exact structural inverse of [`Scope::of`] for any scope
//! minted here, and the identity function for topics without a recognized
//! token.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::topics::pattern::SEPARATOR;

/// Global counter for scope tokens.
static SCOPE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Marker that scope tokens start with.
const SCOPE_PREFIX: &str = "__scope_";

/// An opaque topic-namespace token.
///
/// Minted once per [`Emitter::get_scope`](crate::Emitter::get_scope) call;
/// every topic passed through [`Scope::of`] gets the token prefixed.
#[derive(Clone, Debug)]
pub struct Scope {
    token: String,
}

impl Scope {
    /// Mints a fresh, process-unique scope.
    pub(crate) fn mint() -> Self {
        let n = SCOPE_SEQ.fetch_add(1, Ordering::Relaxed);
        Self {
            token: format!("{SCOPE_PREFIX}{n}"),
        }
    }

    /// Prepends this scope's token to a topic.
    ///
    /// The raw topic text is preserved; normalization happens later, at
    /// subscribe/publish time.
    pub fn of(&self, topic: &str) -> String {
        format!("{}{}{}", self.token, SEPARATOR, topic)
    }

    /// The raw token, e.g. for diagnostics.
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Strips a leading scope token from a topic, if one is present.
///
/// Recognizes exactly the shape produced by [`Scope::of`]:
/// `__scope_<digits>/rest`. Topics without that shape are returned unchanged.
pub fn un_scope(topic: &str) -> &str {
    let Some(rest) = topic.strip_prefix(SCOPE_PREFIX) else {
        return topic;
    };
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return topic;
    }
    match rest[digits..].strip_prefix(SEPARATOR) {
        Some(stripped) => stripped,
        None => topic,
    }
}
