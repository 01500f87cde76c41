//! Credential broker contract plus the request and response shapes it exchanges.
//!
//! The platform credential manager is never reached through a global: callers inject a
//! [`CredentialBroker`] so sign-in logic can run against a test double. Responses arrive as an
//! opaque [`Credential`] union; [`GoogleIdTokenCredential::decode`] turns the one variant this
//! crate understands into typed data and rejects everything else with a typed error.

pub mod google_id;

pub use google_id::*;

// self
use crate::{_prelude::*, secret::Secret};

/// Boxed future returned by [`CredentialBroker`] operations.
pub type CredentialFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, CredentialError>> + 'a + Send>>;

/// Platform component that shows the account picker and returns the chosen credential.
pub trait CredentialBroker
where
	Self: Send + Sync,
{
	/// Presents the request to the user and resolves with the selected credential.
	fn get_credential<'a>(
		&'a self,
		request: &'a CredentialRequest,
	) -> CredentialFuture<'a, Credential>;

	/// Clears any credential state the platform keeps for this application.
	fn clear_credential_state(&self) -> CredentialFuture<'_, ()>;
}

/// Failures reported by a [`CredentialBroker`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialError {
	/// The user dismissed the picker.
	#[error("The user cancelled the credential request.")]
	Cancelled,
	/// No stored credential matched the request.
	#[error("No credential is available for this request.")]
	NoCredential,
	/// The request was interrupted and may be retried by the caller.
	#[error("The credential request was interrupted.")]
	Interrupted,
	/// The platform does not support the requested credential type.
	#[error("The credential request is not supported on this device.")]
	Unsupported,
	/// The credential provider is missing or misconfigured.
	#[error("The credential provider is not configured.")]
	ProviderConfiguration,
	/// Any other platform failure.
	#[error("Credential broker failed: {message}.")]
	Unknown {
		/// Platform-supplied message.
		message: String,
	},
}
impl CredentialError {
	/// Convenience constructor for [`CredentialError::Unknown`].
	pub fn unknown(message: impl Into<String>) -> Self {
		Self::Unknown { message: message.into() }
	}
}

/// Option describing one kind of credential the caller accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialOption {
	/// Sign in with a Google ID token.
	GoogleId(GoogleIdOption),
}

/// Request handed to [`CredentialBroker::get_credential`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRequest {
	/// Accepted credential options, in preference order.
	pub options: Vec<CredentialOption>,
}
impl CredentialRequest {
	/// Creates an empty request.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an accepted credential option.
	pub fn with_option(mut self, option: impl Into<CredentialOption>) -> Self {
		self.options.push(option.into());

		self
	}
}

/// Credential returned by the broker, not yet interpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credential {
	/// Username/password pair.
	Password {
		/// Account identifier.
		id: String,
		/// Stored password.
		password: Secret,
	},
	/// Passkey assertion.
	PublicKey {
		/// WebAuthn authentication response as JSON.
		authentication_response_json: String,
	},
	/// Provider-defined credential identified by a type string and a key/value payload.
	Custom {
		/// Provider type tag.
		kind: String,
		/// Provider payload.
		data: BTreeMap<String, String>,
	},
}
impl Credential {
	/// Platform type tag for password credentials.
	pub const PASSWORD_TYPE: &'static str = "android.credentials.TYPE_PASSWORD_CREDENTIAL";
	/// Platform type tag for passkey credentials.
	pub const PUBLIC_KEY_TYPE: &'static str = "androidx.credentials.TYPE_PUBLIC_KEY_CREDENTIAL";

	/// Returns the declared type tag.
	pub fn kind(&self) -> &str {
		match self {
			Credential::Password { .. } => Self::PASSWORD_TYPE,
			Credential::PublicKey { .. } => Self::PUBLIC_KEY_TYPE,
			Credential::Custom { kind, .. } => kind,
		}
	}
}
