//! Conversions from external infrastructure errors into domain errors.

use keyring::Error as KeyringError;
use reqwest::Error as HttpError;
use sprout_domain::SproutError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SproutError);

impl From<InfraError> for SproutError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SproutError> for InfraError {
    fn from(value: SproutError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSproutError {
    fn into_sprout(self) -> SproutError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SproutError */
/* -------------------------------------------------------------------------- */

impl IntoSproutError for HttpError {
    fn into_sprout(self) -> SproutError {
        if self.is_timeout() {
            SproutError::Network(format!("http request timed out: {self}"))
        } else if self.is_connect() {
            SproutError::Network(format!("http connection failed: {self}"))
        } else if self.is_builder() {
            SproutError::Config(format!("invalid http request: {self}"))
        } else if self.is_decode() {
            SproutError::Store(format!("failed to decode http response: {self}"))
        } else {
            SproutError::Network(format!("http error: {self}"))
        }
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_sprout())
    }
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → SproutError */
/* -------------------------------------------------------------------------- */

impl IntoSproutError for KeyringError {
    fn into_sprout(self) -> SproutError {
        match self {
            KeyringError::NoEntry => {
                SproutError::NotFound("no credential stored in keychain".into())
            }
            KeyringError::Ambiguous(_) => {
                SproutError::Auth("ambiguous keychain entry".into())
            }
            other => SproutError::Auth(format!("keychain error: {other}")),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_sprout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyring_missing_entry_maps_to_not_found() {
        let err: InfraError = KeyringError::NoEntry.into();
        assert!(matches!(SproutError::from(err), SproutError::NotFound(_)));
    }
}
