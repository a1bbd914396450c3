//! Registration and login inputs.
//!
//! Handlers pass raw, possibly absent, JSON values in; the constructors here
//! decide what counts as missing and validate the rest before any port is
//! called. Plaintext passwords are held in [`Zeroizing`] buffers.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, UserValidationError, person_name};

/// Fields a registration payload must carry.
pub const REGISTRATION_REQUIRED_FIELDS: [&str; 3] = ["firstName", "email", "password"];
/// Fields a login payload must carry.
pub const LOGIN_REQUIRED_FIELDS: [&str; 2] = ["email", "password"];

/// Domain error returned when registration or login values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    /// At least one required field was absent or blank.
    #[error("Required fields are missing")]
    MissingFields { required: &'static [&'static str] },
    /// The email address is malformed.
    #[error("Invalid email address")]
    InvalidEmail(#[source] UserValidationError),
    /// A name field failed validation.
    #[error("{0}")]
    InvalidName(#[source] UserValidationError),
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

/// Validated registration request.
///
/// ## Invariants
/// - `first_name` is trimmed and non-empty; `last_name` is trimmed and
///   dropped when blank.
/// - `password` is non-blank; surrounding whitespace is preserved.
///
/// # Examples
/// ```
/// use docvault::domain::RegistrationDetails;
///
/// let details = RegistrationDetails::try_from_parts(
///     Some("Ada"),
///     None,
///     Some("ada@example.com"),
///     Some("analytical"),
/// )
/// .expect("valid registration");
/// assert_eq!(details.email().as_str(), "ada@example.com");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationDetails {
    first_name: String,
    last_name: Option<String>,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl RegistrationDetails {
    /// Build registration details from raw inputs.
    pub fn try_from_parts(
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, CredentialValidationError> {
        let (Some(first_name), Some(email), Some(password)) =
            (present(first_name), present(email), present(password))
        else {
            return Err(CredentialValidationError::MissingFields {
                required: &REGISTRATION_REQUIRED_FIELDS,
            });
        };

        let first_name = person_name("firstName", first_name)
            .map_err(CredentialValidationError::InvalidName)?;
        let last_name = present(last_name)
            .map(|value| person_name("lastName", value))
            .transpose()
            .map_err(CredentialValidationError::InvalidName)?;
        let email = EmailAddress::new(email).map_err(CredentialValidationError::InvalidEmail)?;

        Ok(Self {
            first_name,
            last_name,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for RegistrationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationDetails")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use docvault::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(Some(" ada@example.com "), Some("pw"))
///     .expect("valid credentials");
/// assert_eq!(creds.email().as_str(), "ada@example.com");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, CredentialValidationError> {
        let (Some(email), Some(password)) = (present(email), present(password)) else {
            return Err(CredentialValidationError::MissingFields {
                required: &LOGIN_REQUIRED_FIELDS,
            });
        };
        let email = EmailAddress::new(email).map_err(CredentialValidationError::InvalidEmail)?;
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the user lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
