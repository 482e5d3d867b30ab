//! Input rules checked before anything reaches the store.

use email_address::EmailAddress;
use thiserror::Error;
use url::{Host, Url};

use crate::api::{
    CreateCommentRequest, CreatePostRequest, CreateUserRequest, UpdatePostRequest,
    UpdateUserRequest,
};

pub const MIN_PASSWORD_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("email must be a valid email address")]
    InvalidEmail,

    #[error("password must be at least {} characters", MIN_PASSWORD_LEN)]
    PasswordTooShort,

    #[error("post_url must be a valid URL")]
    InvalidUrl,

    #[error("update must set at least one field")]
    EmptyUpdate,

    #[error("{0} does not refer to an existing record")]
    UnknownReference(&'static str),
}

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), ValidationError> {
    required("email", value)?;
    if !EmailAddress::is_valid(value) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn password(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Accepts absolute http(s)/ftp URLs, and bare hosts such as
/// `example.com/page` which are read as `http://`. Returns the normalized
/// URL, which is what gets stored.
pub fn post_url(value: &str) -> Result<Url, ValidationError> {
    required("post_url", value)?;
    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidUrl);
    }

    let parsed = match Url::parse(value) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("http://{value}")).map_err(|_| ValidationError::InvalidUrl)?
        }
        Err(_) => return Err(ValidationError::InvalidUrl),
    };

    if !matches!(parsed.scheme(), "http" | "https" | "ftp") {
        return Err(ValidationError::InvalidUrl);
    }

    match parsed.host() {
        // Require a dotted name so "http://foo" does not pass as a link.
        Some(Host::Domain(domain)) if domain.contains('.') && !domain.ends_with('.') => {}
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {}
        _ => return Err(ValidationError::InvalidUrl),
    }
    Ok(parsed)
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("username", &self.username)?;
        email(&self.email)?;
        password(&self.password)
    }
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(username) = &self.username {
            required("username", username)?;
        }
        if let Some(value) = &self.email {
            email(value)?;
        }
        if let Some(value) = &self.password {
            password(value)?;
        }
        Ok(())
    }
}

impl CreatePostRequest {
    /// On success, yields the link to store in place of `post_url`.
    pub fn validate(&self) -> Result<Url, ValidationError> {
        required("title", &self.title)?;
        post_url(&self.post_url)
    }
}

impl UpdatePostRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)
    }
}

impl CreateCommentRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("comment_text", &self.comment_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: "alice".into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn accepts_well_formed_user() {
        assert_eq!(user("alice@example.com", "pw1234").validate(), Ok(()));
    }

    #[test]
    fn rejects_malformed_email() {
        assert_eq!(
            user("alice.example.com", "pw1234").validate(),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            user("", "pw1234").validate(),
            Err(ValidationError::Required("email"))
        );
    }

    #[test]
    fn password_length_counts_characters() {
        assert_eq!(
            user("alice@example.com", "abc").validate(),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(user("alice@example.com", "abcd").validate(), Ok(()));
        // 4 characters, more than 4 bytes
        assert_eq!(user("alice@example.com", "ñañá").validate(), Ok(()));
    }

    #[test]
    fn blank_username_is_required() {
        let req = CreateUserRequest {
            username: "   ".into(),
            email: "alice@example.com".into(),
            password: "pw1234".into(),
        };
        assert_eq!(req.validate(), Err(ValidationError::Required("username")));
    }

    #[test]
    fn post_urls() {
        assert!(post_url("https://www.rust-lang.org/learn").is_ok());
        assert!(post_url("http://127.0.0.1:8080/x").is_ok());
        assert!(post_url("news.ycombinator.com/item?id=1").is_ok());

        assert_eq!(post_url("not a url"), Err(ValidationError::InvalidUrl));
        assert_eq!(post_url("http://localhost"), Err(ValidationError::InvalidUrl));
        assert_eq!(post_url("javascript:alert(1)"), Err(ValidationError::InvalidUrl));
        assert_eq!(post_url(""), Err(ValidationError::Required("post_url")));
    }

    #[test]
    fn scheme_less_urls_are_stored_as_http() {
        let url = post_url("example.com/x").unwrap();
        assert_eq!(url.as_str(), "http://example.com/x");

        let url = post_url("https://www.rust-lang.org/learn").unwrap();
        assert_eq!(url.as_str(), "https://www.rust-lang.org/learn");
    }

    #[test]
    fn empty_user_update_is_rejected() {
        assert_eq!(
            UpdateUserRequest::default().validate(),
            Err(ValidationError::EmptyUpdate)
        );

        let short = UpdateUserRequest {
            password: Some("pw".into()),
            ..Default::default()
        };
        assert_eq!(short.validate(), Err(ValidationError::PasswordTooShort));

        let rename = UpdateUserRequest {
            username: Some("bob".into()),
            ..Default::default()
        };
        assert_eq!(rename.validate(), Ok(()));
    }
}
