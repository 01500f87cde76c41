//! Crate-level error types shared by the façade, configuration, and key-set transport.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by fallible public APIs.
///
/// Sign-in attempts never return this type; they fold every failure into
/// [`SignInResult::Failure`](crate::result::SignInResult::Failure). It surfaces from
/// construction and from [`GoogleSignIn::sign_out`](crate::client::GoogleSignIn::sign_out).
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Credential broker failure.
	#[error(transparent)]
	Credential(#[from] crate::credential::CredentialError),
}

/// Configuration and validation failures raised while assembling a sign-in client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// No server client identifier was supplied.
	#[error("Server client ID is required.")]
	MissingServerClientId,
	/// The server client identifier is malformed.
	#[error("Server client ID `{value}` must not contain whitespace.")]
	InvalidServerClientId {
		/// Rejected value.
		value: String,
	},
	/// No credential broker was injected.
	#[error("A credential broker is required.")]
	MissingCredentialBroker,
	/// No token verifier was injected and no default transport is compiled in.
	#[error("A token verifier is required when the `reqwest` feature is disabled.")]
	MissingTokenVerifier,
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures raised while fetching the provider's signing keys.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while fetching the signing key set.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Key-set endpoint answered with a non-success status.
	#[error("Signing key set endpoint returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
	},
	/// Key-set endpoint returned a body that is not a JSON Web Key Set.
	#[error("Signing key set endpoint returned malformed JSON.")]
	KeySetParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;

	#[test]
	fn reqwest_builder_failures_become_config_errors() {
		let reqwest_error = ReqwestClient::new()
			.get("not a url")
			.build()
			.expect_err("Relative URL must not build a request.");
		let err = ConfigError::from(reqwest_error);

		assert!(matches!(err, ConfigError::HttpClientBuild { .. }));
		assert_eq!(err.to_string(), "HTTP client could not be constructed.");
		assert!(std::error::Error::source(&err).is_some());
	}
}
