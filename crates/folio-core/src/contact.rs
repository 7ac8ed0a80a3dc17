#![forbid(unsafe_code)]

//! Contact form.
//!
//! Three required fields posted as a standard urlencoded form to a
//! third-party endpoint. Validation is limited to what native form inputs
//! enforce: every field present, and the email field shaped like an
//! address. Delivery is delegated to a [`FormTransport`]; its outcome is
//! reported as-is and never retried.

use std::fmt;

use url::form_urlencoded;

/// Form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    /// Form parameter name.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Message => "Message",
        }
    }

    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Name => "Your Name",
            Self::Email => "you@example.com",
            Self::Message => "Write your message here...",
        }
    }

    /// Next field in tab order, wrapping.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Name => Self::Email,
            Self::Email => Self::Message,
            Self::Message => Self::Name,
        }
    }

    /// Previous field in tab order, wrapping.
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Name => Self::Message,
            Self::Email => Self::Name,
            Self::Message => Self::Email,
        }
    }
}

/// Why a field was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Missing(Field),
    MalformedEmail,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "{} is required", field.label()),
            Self::MalformedEmail => write!(f, "Email must be an address like you@example.com"),
        }
    }
}

/// Editable form values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    name: String,
    email: String,
    message: String,
}

impl ContactForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Message => &self.message,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Message => &mut self.message,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot(field) = value.into();
    }

    pub fn push(&mut self, field: Field, ch: char) {
        self.slot(field).push(ch);
    }

    pub fn pop(&mut self, field: Field) -> Option<char> {
        self.slot(field).pop()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Check required fields and build a submission.
    ///
    /// # Errors
    ///
    /// Every failing check, in field order.
    pub fn validate(&self) -> Result<Submission, Vec<FieldError>> {
        let mut errors = Vec::new();
        for field in Field::ALL {
            if self.get(field).trim().is_empty() {
                errors.push(FieldError::Missing(field));
            }
        }
        let email = self.email.trim();
        if !email.is_empty() && !looks_like_email(email) {
            errors.push(FieldError::MalformedEmail);
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Submission {
            name: self.name.trim().to_string(),
            email: email.to_string(),
            message: self.message.trim().to_string(),
        })
    }
}

/// `local@domain` with no whitespace and a non-empty part on each side.
fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// A validated form, ready to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl Submission {
    /// `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair(Field::Name.key(), &self.name)
            .append_pair(Field::Email.key(), &self.email)
            .append_pair(Field::Message.key(), &self.message)
            .finish()
    }
}

/// What the endpoint said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    /// The endpoint answered with a non-success status.
    Rejected { status: u16 },
}

/// Delivery failure before any answer arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Could not build a client or request.
    Setup(String),
    /// Network-level failure.
    Network(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup(msg) => write!(f, "cannot prepare request: {msg}"),
            Self::Network(msg) => write!(f, "request failed: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Posts a submission to the form endpoint.
pub trait FormTransport {
    /// # Errors
    ///
    /// [`TransportError`] when no answer could be obtained.
    fn submit(&self, endpoint: &str, submission: &Submission)
    -> Result<SubmitOutcome, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled() -> ContactForm {
        let mut f = ContactForm::new();
        f.set(Field::Name, "Ada");
        f.set(Field::Email, "ada@example.com");
        f.set(Field::Message, "Hello & welcome");
        f
    }

    #[test]
    fn empty_form_reports_every_missing_field() {
        let errs = ContactForm::new().validate().unwrap_err();
        assert_eq!(
            errs,
            vec![
                FieldError::Missing(Field::Name),
                FieldError::Missing(Field::Email),
                FieldError::Missing(Field::Message),
            ]
        );
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let mut f = filled();
        f.set(Field::Message, "   \n");
        assert_eq!(
            f.validate().unwrap_err(),
            vec![FieldError::Missing(Field::Message)]
        );
    }

    #[test]
    fn malformed_email_is_refused() {
        for bad in ["ada", "ada@", "@example.com", "a b@example.com", "a@b@c"] {
            let mut f = filled();
            f.set(Field::Email, bad);
            assert_eq!(
                f.validate().unwrap_err(),
                vec![FieldError::MalformedEmail],
                "{bad}"
            );
        }
    }

    #[test]
    fn submission_is_urlencoded_in_field_order() {
        let body = filled().validate().unwrap().encode();
        assert_eq!(
            body,
            "name=Ada&email=ada%40example.com&message=Hello+%26+welcome"
        );
    }

    #[test]
    fn editing_helpers() {
        let mut f = ContactForm::new();
        f.push(Field::Name, 'x');
        f.push(Field::Name, 'y');
        assert_eq!(f.pop(Field::Name), Some('y'));
        assert_eq!(f.get(Field::Name), "x");
        f.clear();
        assert_eq!(f, ContactForm::new());
        assert_eq!(Field::Message.next(), Field::Name);
        assert_eq!(Field::Name.prev(), Field::Message);
    }
}
