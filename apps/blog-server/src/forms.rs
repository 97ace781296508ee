//! Form cleaning: turns submitted payloads into domain values or a list of
//! field errors (answered with 422).

use std::fmt::Display;

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use blogicum_core::domain::{PostContent, ProfileChanges};
use blogicum_shared::dto::{
    AdminPostForm, CategoryForm, CommentForm, LocationForm, PostForm, ProfileForm, RegisterForm,
};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Title, name and username limit.
pub const MAX_TITLE_LENGTH: usize = 256;
pub const MAX_NAME_LENGTH: usize = 150;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Accumulates `field: message` errors.
#[derive(Debug, Default)]
struct FormErrors(Vec<String>);

impl FormErrors {
    fn add(&mut self, field: &str, message: impl Display) {
        self.0.push(format!("{field}: {message}"));
    }

    /// Trimmed value, or an error when it is blank.
    fn required<'a>(&mut self, field: &str, value: &'a str) -> &'a str {
        let value = value.trim();
        if value.is_empty() {
            self.add(field, REQUIRED);
        }
        value
    }

    fn max_length(&mut self, field: &str, value: &str, max: usize) {
        let len = value.chars().count();
        if len > max {
            self.add(
                field,
                format!("Ensure this value has at most {max} characters (it has {len})."),
            );
        }
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> AppResult<T> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}

/// HTML checkbox semantics: absent is unchecked.
pub fn checkbox(value: Option<&str>) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => false,
        Some(v) => !matches!(v.as_str(), "" | "false" | "0" | "off"),
    }
}

/// RFC 3339, or an HTML `datetime-local` value read as UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// An optional select value: blank means no choice.
fn optional_choice(raw: Option<&str>) -> Result<Option<Uuid>, ()> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Uuid::parse_str(value).map(Some).map_err(|_| ()),
    }
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '@' | '.' | '+' | '-'))
}

fn is_valid_slug(slug: &str) -> bool {
    slug.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Resolve the category and location selects against stored rows.
async fn clean_placement(
    state: &AppState,
    errors: &mut FormErrors,
    category: &str,
    location: Option<&str>,
) -> AppResult<(Option<Uuid>, Option<Uuid>)> {
    let category_id = match errors.required("category", category) {
        "" => None,
        raw => {
            let found = match Uuid::parse_str(raw) {
                Ok(id) => state.categories.find_by_id(id).await?.map(|c| c.id),
                Err(_) => None,
            };
            if found.is_none() {
                errors.add("category", INVALID_CHOICE);
            }
            found
        }
    };

    let location_id = match optional_choice(location) {
        Ok(None) => None,
        Ok(Some(id)) => {
            let found = state.locations.find_by_id(id).await?.map(|l| l.id);
            if found.is_none() {
                errors.add("location", INVALID_CHOICE);
            }
            found
        }
        Err(()) => {
            errors.add("location", INVALID_CHOICE);
            None
        }
    };

    Ok((category_id, location_id))
}

/// Clean the post create/edit form.
pub async fn clean_post(state: &AppState, form: &PostForm) -> AppResult<PostContent> {
    let mut errors = FormErrors::default();

    let title = errors.required("title", &form.title).to_string();
    errors.max_length("title", &title, MAX_TITLE_LENGTH);
    let text = errors.required("text", &form.text).to_string();

    let pub_date = match errors.required("pub_date", &form.pub_date) {
        "" => None,
        raw => {
            let parsed = parse_datetime(raw);
            if parsed.is_none() {
                errors.add("pub_date", "Enter a valid date/time.");
            }
            parsed
        }
    };

    let (category_id, location_id) =
        clean_placement(state, &mut errors, &form.category, form.location.as_deref()).await?;

    match (pub_date, category_id) {
        (Some(pub_date), Some(category_id)) => errors.finish(|| PostContent {
            title,
            text,
            pub_date,
            is_published: checkbox(form.is_published.as_deref()),
            category_id,
            location_id,
        }),
        _ => Err(AppError::Validation(errors.0)),
    }
}

/// Clean the admin quick-edit form: `(category, location, is_published)`.
pub async fn clean_admin_post(
    state: &AppState,
    form: &AdminPostForm,
) -> AppResult<(Uuid, Option<Uuid>, bool)> {
    let mut errors = FormErrors::default();
    let (category_id, location_id) =
        clean_placement(state, &mut errors, &form.category, form.location.as_deref()).await?;

    match category_id {
        Some(category_id) => errors.finish(|| {
            (
                category_id,
                location_id,
                checkbox(form.is_published.as_deref()),
            )
        }),
        None => Err(AppError::Validation(errors.0)),
    }
}

/// Clean the comment form, returning the comment text.
pub fn clean_comment(form: &CommentForm) -> AppResult<String> {
    let mut errors = FormErrors::default();
    let text = errors.required("text", &form.text).to_string();
    errors.finish(|| text)
}

/// Username rules shared by registration and profile editing. `owner` is the
/// user allowed to already hold the name.
async fn clean_username(
    state: &AppState,
    errors: &mut FormErrors,
    raw: &str,
    owner: Option<Uuid>,
) -> AppResult<String> {
    let username = errors.required("username", raw).to_string();
    if username.is_empty() {
        return Ok(username);
    }
    errors.max_length("username", &username, MAX_NAME_LENGTH);
    if !is_valid_username(&username) {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    } else if let Some(existing) = state.users.find_by_username(&username).await?
        && Some(existing.id) != owner
    {
        errors.add("username", "A user with that username already exists.");
    }
    Ok(username)
}

fn clean_email(errors: &mut FormErrors, raw: &str) -> String {
    let email = raw.trim().to_string();
    if !email.is_empty() && !is_valid_email(&email) {
        errors.add("email", "Enter a valid email address.");
    }
    email
}

/// Clean the profile form of user `user_id`.
pub async fn clean_profile(
    state: &AppState,
    user_id: Uuid,
    form: &ProfileForm,
) -> AppResult<ProfileChanges> {
    let mut errors = FormErrors::default();

    let first_name = form.first_name.trim().to_string();
    errors.max_length("first_name", &first_name, MAX_NAME_LENGTH);
    let last_name = form.last_name.trim().to_string();
    errors.max_length("last_name", &last_name, MAX_NAME_LENGTH);
    let username = clean_username(state, &mut errors, &form.username, Some(user_id)).await?;
    let email = clean_email(&mut errors, &form.email);

    errors.finish(|| ProfileChanges {
        first_name,
        last_name,
        username,
        email,
    })
}

/// Clean the registration form: `(username, email)`; the password is only
/// checked, hashing happens in the handler.
pub async fn clean_registration(
    state: &AppState,
    form: &RegisterForm,
) -> AppResult<(String, String)> {
    let mut errors = FormErrors::default();

    let username = clean_username(state, &mut errors, &form.username, None).await?;
    let email = clean_email(&mut errors, &form.email);
    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."),
        );
    }

    errors.finish(|| (username, email))
}

/// Cleaned category fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFields {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
}

/// Clean the category form. `existing` is the category being edited.
pub async fn clean_category(
    state: &AppState,
    existing: Option<Uuid>,
    form: &CategoryForm,
) -> AppResult<CategoryFields> {
    let mut errors = FormErrors::default();

    let title = errors.required("title", &form.title).to_string();
    errors.max_length("title", &title, MAX_TITLE_LENGTH);
    let slug = errors.required("slug", &form.slug).to_string();
    if !slug.is_empty() {
        if !is_valid_slug(&slug) {
            errors.add(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            );
        } else if let Some(other) = state.categories.find_by_slug(&slug).await?
            && Some(other.id) != existing
        {
            errors.add("slug", "Category with this slug already exists.");
        }
    }

    errors.finish(|| CategoryFields {
        title,
        description: form.description.trim().to_string(),
        slug,
        is_published: checkbox(form.is_published.as_deref()),
    })
}

/// Clean the location form: `(name, is_published)`.
pub fn clean_location(form: &LocationForm) -> AppResult<(String, bool)> {
    let mut errors = FormErrors::default();
    let name = errors.required("name", &form.name).to_string();
    errors.max_length("name", &name, MAX_TITLE_LENGTH);
    errors.finish(|| (name, checkbox(form.is_published.as_deref())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_checkbox_values() {
        assert!(!checkbox(None));
        assert!(!checkbox(Some("")));
        assert!(!checkbox(Some("off")));
        assert!(!checkbox(Some("False")));
        assert!(checkbox(Some("on")));
        assert!(checkbox(Some("true")));
        assert!(checkbox(Some("1")));
    }

    #[test]
    fn test_parse_datetime_formats() {
        let local = parse_datetime("2024-03-01T18:30").unwrap();
        assert_eq!((local.year(), local.month(), local.day()), (2024, 3, 1));
        assert_eq!((local.hour(), local.minute()), (18, 30));

        let rfc = parse_datetime("2024-03-01T18:30:00+03:00").unwrap();
        assert_eq!(rfc.hour(), 15);

        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn test_username_and_slug_rules() {
        assert!(is_valid_username("leo.tolstoy+blog@ya-ru_1"));
        assert!(!is_valid_username("leo tolstoy"));
        assert!(!is_valid_username("leo/tolstoy"));

        assert!(is_valid_slug("travel-notes_2024"));
        assert!(!is_valid_slug("travel notes"));
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("leo@example.com"));
        assert!(!is_valid_email("leo@localhost"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("leo@@example.com"));
        assert!(!is_valid_email("leo @example.com"));
    }

    #[test]
    fn test_clean_comment_requires_text() {
        let err = clean_comment(&CommentForm {
            text: "   ".into(),
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e == &["text: This field is required."]));

        let text = clean_comment(&CommentForm {
            text: "  Nice post  ".into(),
        })
        .unwrap();
        assert_eq!(text, "Nice post");
    }

    #[test]
    fn test_clean_location_limits_name() {
        let long = "x".repeat(MAX_TITLE_LENGTH + 1);
        let err = clean_location(&LocationForm {
            name: long,
            is_published: None,
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert_eq!(
            clean_location(&LocationForm {
                name: "Moscow".into(),
                is_published: Some("on".into()),
            })
            .unwrap(),
            ("Moscow".to_string(), true)
        );
    }
}
