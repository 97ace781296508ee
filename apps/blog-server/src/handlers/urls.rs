//! Site URLs used as redirect targets.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use uuid::Uuid;

/// Characters escaped in a query value; path separators stay readable.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub const INDEX: &str = "/";
pub const LOGIN: &str = "/auth/login/";

pub fn post_detail(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

pub fn profile(username: &str) -> String {
    format!("/profile/{}/", utf8_percent_encode(username, QUERY_VALUE))
}

pub fn edit_profile(username: &str) -> String {
    format!("/profile/{}/edit/", utf8_percent_encode(username, QUERY_VALUE))
}

/// The login page, remembering where to go afterwards.
pub fn login(next: Option<&str>) -> String {
    match next {
        Some(next) => format!("{LOGIN}?next={}", utf8_percent_encode(next, QUERY_VALUE)),
        None => LOGIN.to_string(),
    }
}

/// `next` if it points inside this site, so login cannot bounce to another host.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.map(str::trim).filter(|next| {
        next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')
    })
}
