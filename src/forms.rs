//! Form payloads submitted by the site's pages.
//!
//! Every field defaults to an empty string so a missing field is reported by
//! validation like an empty one instead of failing extraction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::database::models::post::{BlogPost, PostContent};

/// Field name to the messages shown next to it
pub type FormErrors = BTreeMap<String, Vec<String>>;

pub(crate) const REQUIRED: &str = "This field is required.";

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct PostForm {
    #[validate(length(min = 1, message = "This field is required."))]
    pub title: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub subtitle: String,
    #[validate(url(message = "Invalid URL."))]
    pub img_url: String,
    /// Rich text, kept exactly as submitted
    #[validate(custom(function = "not_blank", message = "This field is required."))]
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct CommentForm {
    #[validate(length(min = 1, message = "This field is required."))]
    pub body: String,
}

impl RegisterForm {
    /// Trims surrounding whitespace and lower-cases the email. Passwords are kept verbatim.
    pub fn normalized(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self.name = self.name.trim().to_string();
        self
    }
}

impl LoginForm {
    pub fn normalized(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self
    }
}

impl PostForm {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.subtitle = self.subtitle.trim().to_string();
        self.img_url = self.img_url.trim().to_string();
        self
    }

    pub fn content(&self) -> PostContent<'_> {
        PostContent {
            title: &self.title,
            subtitle: &self.subtitle,
            body: &self.body,
            img_url: &self.img_url,
        }
    }
}

/// Pre-populates the edit form.
impl From<&BlogPost> for PostForm {
    fn from(post: &BlogPost) -> Self {
        PostForm {
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            img_url: post.img_url.clone(),
            body: post.body.clone(),
        }
    }
}

impl CommentForm {
    pub fn normalized(mut self) -> Self {
        self.body = self.body.trim().to_string();
        self
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }

    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates `form`, turning failures into per-field messages.
pub fn check<F: Validate>(form: &F) -> Result<(), FormErrors> {
    form.validate().map_err(|errors| field_errors(&errors))
}

fn field_errors(errors: &ValidationErrors) -> FormErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| REQUIRED.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}
