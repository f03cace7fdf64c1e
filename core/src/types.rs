//! Domain types for the Akismet API.
//!
//! # Design
//! `Comment` field names match the wire keys so a comment can be built
//! from JSON fixtures as easily as from code. Every field is plain text and
//! an empty string means "not provided": only `user_ip` and `user_agent` are
//! always sent, everything else is left out of the request when empty.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::{Error, Result};

/// Attributes of a single comment reported to Akismet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub user_ip: String,
    pub user_agent: String,
    pub referrer: String,
    pub permalink: String,
    pub comment_type: String,
    pub comment_author: String,
    pub comment_author_email: String,
    pub comment_author_url: String,
    pub comment_content: String,
    pub blog_lang: String,
    pub blog_charset: String,
    pub user_role: String,
    /// Creation time, RFC 3339.
    pub comment_date_gmt: String,
    /// Last modification time of the commented post, RFC 3339.
    pub comment_post_modified_gmt: String,
    pub is_test: String,
    pub recheck_reason: String,
}

impl Comment {
    pub fn new(user_ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            user_ip: user_ip.into(),
            user_agent: user_agent.into(),
            ..Self::default()
        }
    }

    /// Check required fields and timestamp formats.
    pub fn validate(&self) -> Result<()> {
        if self.user_ip.is_empty() {
            return Err(Error::missing_field("user ip"));
        }
        if self.user_agent.is_empty() {
            return Err(Error::missing_field("user agent"));
        }
        if !self.comment_date_gmt.is_empty() {
            check_rfc3339(&self.comment_date_gmt)
                .map_err(|e| Error::invalid_date("created", e))?;
        }
        if !self.comment_post_modified_gmt.is_empty() {
            check_rfc3339(&self.comment_post_modified_gmt)
                .map_err(|e| Error::invalid_date("modified", e))?;
        }
        Ok(())
    }

    /// Serialize into form fields, skipping empty optional values.
    pub fn to_form(&self) -> Form {
        let mut form = Form::new();
        form.insert("user_ip", &self.user_ip);
        form.insert("user_agent", &self.user_agent);

        let optional = [
            ("referrer", &self.referrer),
            ("permalink", &self.permalink),
            ("comment_type", &self.comment_type),
            ("comment_author", &self.comment_author),
            ("comment_author_email", &self.comment_author_email),
            ("comment_author_url", &self.comment_author_url),
            ("comment_content", &self.comment_content),
            ("blog_lang", &self.blog_lang),
            ("blog_charset", &self.blog_charset),
            ("user_role", &self.user_role),
            ("comment_date_gmt", &self.comment_date_gmt),
            ("comment_post_modified_gmt", &self.comment_post_modified_gmt),
            ("is_test", &self.is_test),
            ("recheck_reason", &self.recheck_reason),
        ];
        for (key, value) in optional {
            if !value.is_empty() {
                form.insert(key, value);
            }
        }
        form
    }
}

/// Timestamp layout rejected even though chrono can read it.
#[derive(Debug, thiserror::Error)]
#[error("{0:?} is not in YYYY-MM-DDTHH:MM:SS[.frac](Z|+HH:MM) layout")]
pub struct DateLayoutError(String);

type DateCheck = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Strict RFC 3339. chrono also takes a space or lowercase `t` as the
/// separator and a lowercase `z` zone; those are rejected here.
fn check_rfc3339(value: &str) -> DateCheck {
    DateTime::parse_from_rfc3339(value)?;
    if value.as_bytes().get(10) != Some(&b'T') || value.ends_with('z') {
        return Err(Box::new(DateLayoutError(value.to_string())));
    }
    Ok(())
}

/// Form payload with unique keys, encoded in alphabetical key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: BTreeMap<&'static str, String>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any previous value.
    pub fn insert(&mut self, key: &'static str, value: impl Into<String>) {
        self.fields.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.fields {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn valid() -> Comment {
        Comment::new("8.8.8.8", "Mozilla/6.1.6")
    }

    #[test]
    fn empty_comment_fails_on_user_ip() {
        let err = Comment::default().validate().unwrap_err();
        assert!(err.is(ErrorKind::MissingField));
        assert_eq!(err.to_string(), "field user ip is required");
    }

    #[test]
    fn user_ip_is_checked_before_everything_else() {
        let comment = Comment {
            comment_date_gmt: "garbage".to_string(),
            comment_content: "hello".to_string(),
            ..Comment::default()
        };
        let err = comment.validate().unwrap_err();
        assert_eq!(err.to_string(), "field user ip is required");
    }

    #[test]
    fn missing_user_agent() {
        let comment = Comment {
            user_ip: "8.8.8.8".to_string(),
            ..Comment::default()
        };
        let err = comment.validate().unwrap_err();
        assert!(err.is(ErrorKind::MissingField));
        assert_eq!(err.to_string(), "field user agent is required");
    }

    #[test]
    fn invalid_created_date() {
        let comment = Comment {
            comment_date_gmt: "asdad".to_string(),
            ..valid()
        };
        let err = comment.validate().unwrap_err();
        assert!(err.is(ErrorKind::InvalidDate));
        let msg = err.to_string();
        assert!(msg.starts_with("cannot parse created date: "), "{msg}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn invalid_modified_date() {
        let comment = Comment {
            comment_post_modified_gmt: "2019-06-30 13:43".to_string(),
            ..valid()
        };
        let err = comment.validate().unwrap_err();
        assert!(err.is(ErrorKind::InvalidDate));
        assert!(err.to_string().starts_with("cannot parse modified date: "));
    }

    #[test]
    fn space_separator_is_rejected() {
        let comment = Comment {
            comment_date_gmt: "2019-06-30 13:43:12Z".to_string(),
            ..valid()
        };
        let err = comment.validate().unwrap_err();
        assert!(err.is(ErrorKind::InvalidDate));
        assert!(err.to_string().starts_with("cannot parse created date: "));
    }

    #[test]
    fn lowercase_separator_and_zone_are_rejected() {
        let comment = Comment {
            comment_post_modified_gmt: "2019-06-30t13:43:12z".to_string(),
            ..valid()
        };
        let err = comment.validate().unwrap_err();
        assert!(err.is(ErrorKind::InvalidDate));
        assert!(err.to_string().starts_with("cannot parse modified date: "));

        let comment = Comment {
            comment_date_gmt: "2019-06-30T13:43:12z".to_string(),
            ..valid()
        };
        assert!(comment.validate().is_err());
    }

    #[test]
    fn valid_dates_pass() {
        let comment = Comment {
            comment_date_gmt: "2019-06-30T13:43:12Z".to_string(),
            comment_post_modified_gmt: "2019-06-30T14:43:12.5+02:00".to_string(),
            ..valid()
        };
        assert!(comment.validate().is_ok());
    }

    #[test]
    fn required_fields_always_serialized() {
        let form = Comment::default().to_form();
        assert_eq!(form.keys().collect::<Vec<_>>(), vec!["user_agent", "user_ip"]);
        assert_eq!(form.get("user_ip"), Some(""));
    }

    #[test]
    fn empty_optionals_are_omitted() {
        let comment = Comment {
            comment_author: "viagra-test-123".to_string(),
            comment_type: "comment".to_string(),
            ..valid()
        };
        let form = comment.to_form();
        assert_eq!(
            form.keys().collect::<Vec<_>>(),
            vec!["comment_author", "comment_type", "user_agent", "user_ip"]
        );
        assert!(form.get("referrer").is_none());
    }

    #[test]
    fn encode_is_alphabetical_and_escaped() {
        let mut form = Comment::new("0.0.0.0", "Mozilla/6.16").to_form();
        form.insert("blog", "http://some-blog.com");
        assert_eq!(
            form.encode(),
            "blog=http%3A%2F%2Fsome-blog.com&user_agent=Mozilla%2F6.16&user_ip=0.0.0.0"
        );
    }

    #[test]
    fn insert_replaces_existing_key() {
        let mut form = Form::new();
        form.insert("blog", "a");
        form.insert("blog", "b");
        assert_eq!(form.len(), 1);
        assert_eq!(form.encode(), "blog=b");
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let comment: Comment =
            serde_json::from_str(r#"{"user_ip":"1.2.3.4","user_agent":"curl"}"#).unwrap();
        assert_eq!(comment, Comment::new("1.2.3.4", "curl"));
    }
}
