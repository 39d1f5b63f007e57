//! Input validators returning typed results, aggregated by handlers before
//! any storage write.

use crate::error::ApiError;

pub const USERNAME_MAX_LEN: usize = 150;
pub const NAME_MAX_LEN: usize = 256;
pub const SLUG_MAX_LEN: usize = 50;
pub const SCORE_MIN: i16 = 1;
pub const SCORE_MAX: i16 = 10;

/// Usernames: unicode letters/digits plus `.` `@` `+` `-` `_`, at most 150
/// chars, and never the reserved literal `me` (case-insensitive).
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::field_error("username", "Username cannot be empty"));
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(ApiError::field_error(
            "username",
            format!("Username must be at most {} characters", USERNAME_MAX_LEN),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'))
    {
        return Err(ApiError::field_error(
            "username",
            "Username may only contain letters, digits and . @ + - _",
        ));
    }
    if username.eq_ignore_ascii_case("me") {
        return Err(ApiError::field_error(
            "username",
            "Username 'me' is reserved",
        ));
    }
    Ok(())
}

/// Minimal shape check; real deliverability is the mail sink's problem.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(ApiError::field_error("email", "Invalid email address"));
    }
    Ok(())
}

/// Titles may carry the current UTC year but nothing later.
pub fn validate_year(year: i32) -> Result<(), ApiError> {
    use chrono::Datelike;
    let current = chrono::Utc::now().year();
    if year > current {
        return Err(ApiError::field_error(
            "year",
            format!("Year {} is in the future", year),
        ));
    }
    Ok(())
}

pub fn validate_score(score: i16) -> Result<(), ApiError> {
    if !(SCORE_MIN..=SCORE_MAX).contains(&score) {
        return Err(ApiError::field_error(
            "score",
            format!("Score must be between {} and {}", SCORE_MIN, SCORE_MAX),
        ));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::field_error("name", "Name cannot be empty"));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(ApiError::field_error(
            "name",
            format!("Name must be at most {} characters", NAME_MAX_LEN),
        ));
    }
    Ok(())
}

/// Slugs are external lookup keys: lowercase ascii letters, digits, `-` `_`.
pub fn validate_slug(slug: &str) -> Result<(), ApiError> {
    if slug.is_empty() {
        return Err(ApiError::field_error("slug", "Slug cannot be empty"));
    }
    if slug.chars().count() > SLUG_MAX_LEN {
        return Err(ApiError::field_error(
            "slug",
            format!("Slug must be at most {} characters", SLUG_MAX_LEN),
        ));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(ApiError::field_error(
            "slug",
            "Slug may only contain lowercase letters, digits, - and _",
        ));
    }
    Ok(())
}

pub fn validate_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::field_error("text", "Text cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_original_character_class() {
        for name in ["alice", "a.b@c+d-e_f", "Пользователь42", "x"] {
            assert!(validate_username(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn rejects_bad_usernames() {
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());
        assert!(validate_username(&"a".repeat(151)).is_err());
    }

    #[test]
    fn reserved_me_is_rejected_in_any_case() {
        for name in ["me", "Me", "mE", "ME"] {
            assert!(validate_username(name).is_err(), "{}", name);
        }
        // Not a substring rule
        assert!(validate_username("me2").is_ok());
        assert!(validate_username("home").is_ok());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("a@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@nodot").is_err());
    }

    #[test]
    fn year_boundary_is_current_year_inclusive() {
        use chrono::Datelike;
        let current = chrono::Utc::now().year();
        assert!(validate_year(current).is_ok());
        assert!(validate_year(current - 30).is_ok());
        assert!(validate_year(current + 1).is_err());
    }

    #[test]
    fn score_bounds() {
        assert!(validate_score(1).is_ok());
        assert!(validate_score(10).is_ok());
        assert!(validate_score(0).is_err());
        assert!(validate_score(11).is_err());
    }

    #[test]
    fn slug_charset() {
        assert!(validate_slug("sci-fi_2").is_ok());
        assert!(validate_slug("Sci-Fi").is_err());
        assert!(validate_slug("").is_err());
        assert!(validate_slug(&"a".repeat(51)).is_err());
    }
}
