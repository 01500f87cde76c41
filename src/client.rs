//! Caller-facing façade: build once, then `sign_in`/`sign_out`.

// self
#[cfg(feature = "reqwest")] use crate::verify::GoogleTokenVerifier;
use crate::{
	_prelude::*,
	config::{SignInConfig, SignInConfigBuilder, SignInSettings},
	credential::CredentialBroker,
	error::ConfigError,
	flows::SignInFlow,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	result::SignInResult,
	verify::TokenVerifier,
};

/// Google sign-in client bound to one config, broker, and verifier.
#[derive(Clone, Debug)]
pub struct GoogleSignIn {
	flow: SignInFlow,
}
impl GoogleSignIn {
	/// Creates an empty builder.
	pub fn builder() -> GoogleSignInBuilder {
		GoogleSignInBuilder::default()
	}

	/// Assembles a client from already-validated parts.
	pub fn with_parts(
		config: SignInConfig,
		broker: Arc<dyn CredentialBroker>,
		verifier: Arc<dyn TokenVerifier>,
	) -> Self {
		Self { flow: SignInFlow::new(config, broker, verifier) }
	}

	/// Config used by every attempt.
	pub fn config(&self) -> &SignInConfig {
		self.flow.config()
	}

	/// Runs one sign-in attempt. Never fails; errors are reported as
	/// [`SignInResult::Failure`].
	pub async fn sign_in(&self) -> SignInResult {
		self.flow.run().await
	}

	/// Clears the broker's credential state.
	///
	/// Unlike [`sign_in`](Self::sign_in), broker failures are returned to the caller as
	/// [`Error::Credential`].
	pub async fn sign_out(&self) -> Result<()> {
		const KIND: FlowKind = FlowKind::SignOut;

		let span = FlowSpan::new(KIND, "sign_out");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.flow.broker().clear_credential_state()).await;

		match &result {
			Ok(()) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(e) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				obs::log_flow_failure(KIND, "broker", e);
			},
		}

		result.map_err(Error::from)
	}
}

/// Builder for [`GoogleSignIn`].
///
/// `server_client_id` and `credential_broker` are required. Without an explicit
/// `token_verifier`, a [`GoogleTokenVerifier`](crate::verify::GoogleTokenVerifier) backed by
/// reqwest is used when the `reqwest` feature is enabled.
///
/// Setters apply in call order. [`settings`](Self::settings) overwrites both flags set before it,
/// and overwrites the server client ID only when the settings carry one.
#[derive(Default)]
pub struct GoogleSignInBuilder {
	config: SignInConfigBuilder,
	broker: Option<Arc<dyn CredentialBroker>>,
	verifier: Option<Arc<dyn TokenVerifier>>,
}
impl GoogleSignInBuilder {
	/// Applies loaded settings; see the type-level docs for precedence.
	pub fn settings(mut self, settings: SignInSettings) -> Self {
		self.config = self.config.settings(settings);

		self
	}

	/// Sets the server client ID (required).
	pub fn server_client_id(mut self, id: impl Into<String>) -> Self {
		self.config = self.config.server_client_id(id);

		self
	}

	/// Overrides the authorized-accounts filter (defaults to `true`).
	pub fn filter_by_authorized_accounts(mut self, filter: bool) -> Self {
		self.config = self.config.filter_by_authorized_accounts(filter);

		self
	}

	/// Overrides auto-selection (defaults to `true`).
	pub fn auto_select_enabled(mut self, auto_select: bool) -> Self {
		self.config = self.config.auto_select_enabled(auto_select);

		self
	}

	/// Injects the platform credential broker (required).
	pub fn credential_broker(mut self, broker: Arc<dyn CredentialBroker>) -> Self {
		self.broker = Some(broker);

		self
	}

	/// Injects a token verifier.
	pub fn token_verifier(mut self, verifier: Arc<dyn TokenVerifier>) -> Self {
		self.verifier = Some(verifier);

		self
	}

	/// Validates the configuration and assembles the client.
	pub fn build(self) -> Result<GoogleSignIn> {
		let config = self.config.build()?;
		let broker = self.broker.ok_or(ConfigError::MissingCredentialBroker)?;
		let verifier = match self.verifier {
			Some(verifier) => verifier,
			None => default_verifier()?,
		};

		Ok(GoogleSignIn::with_parts(config, broker, verifier))
	}
}
impl Debug for GoogleSignInBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GoogleSignInBuilder")
			.field("config", &self.config)
			.field("broker_set", &self.broker.is_some())
			.field("verifier_set", &self.verifier.is_some())
			.finish()
	}
}

#[cfg(feature = "reqwest")]
fn default_verifier() -> Result<Arc<dyn TokenVerifier>, ConfigError> {
	Ok(Arc::new(GoogleTokenVerifier::new()?))
}

#[cfg(not(feature = "reqwest"))]
fn default_verifier() -> Result<Arc<dyn TokenVerifier>, ConfigError> {
	Err(ConfigError::MissingTokenVerifier)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		credential::{Credential, CredentialError, CredentialFuture, CredentialRequest},
		verify::VerifyFuture,
	};

	struct RefusingBroker;
	impl CredentialBroker for RefusingBroker {
		fn get_credential<'a>(
			&'a self,
			_request: &'a CredentialRequest,
		) -> CredentialFuture<'a, Credential> {
			Box::pin(async { Err(CredentialError::NoCredential) })
		}

		fn clear_credential_state(&self) -> CredentialFuture<'_, ()> {
			Box::pin(async { Ok(()) })
		}
	}

	struct RefusingVerifier;
	impl TokenVerifier for RefusingVerifier {
		fn verify<'a>(&'a self, _id_token: &'a str, _audience: &'a str) -> VerifyFuture<'a> {
			Box::pin(async { None })
		}
	}

	#[test]
	fn build_requires_client_id_and_broker() {
		let err = GoogleSignIn::builder()
			.credential_broker(Arc::new(RefusingBroker))
			.token_verifier(Arc::new(RefusingVerifier))
			.build()
			.expect_err("Missing client ID must fail fast.");

		assert!(matches!(err, Error::Config(ConfigError::MissingServerClientId)));

		let err = GoogleSignIn::builder()
			.server_client_id("abc.apps.googleusercontent.com")
			.token_verifier(Arc::new(RefusingVerifier))
			.build()
			.expect_err("Missing broker must fail fast.");

		assert!(matches!(err, Error::Config(ConfigError::MissingCredentialBroker)));
	}

	#[test]
	fn builder_forwards_settings_and_flags() {
		let settings = SignInSettings {
			server_client_id: Some("abc.apps.googleusercontent.com".into()),
			filter_by_authorized_accounts: false,
			auto_select_enabled: true,
		};
		let client = GoogleSignIn::builder()
			.settings(settings)
			.auto_select_enabled(false)
			.credential_broker(Arc::new(RefusingBroker))
			.token_verifier(Arc::new(RefusingVerifier))
			.build()
			.expect("Client should build.");

		assert_eq!(client.config().server_client_id(), "abc.apps.googleusercontent.com");
		assert!(!client.config().filter_by_authorized_accounts());
		assert!(!client.config().auto_select_enabled());
	}

	#[test]
	fn settings_do_not_drop_an_earlier_client_id() {
		let client = GoogleSignIn::builder()
			.server_client_id("abc.apps.googleusercontent.com")
			.settings(SignInSettings::default())
			.credential_broker(Arc::new(RefusingBroker))
			.token_verifier(Arc::new(RefusingVerifier))
			.build()
			.expect("Client should build.");

		assert_eq!(client.config().server_client_id(), "abc.apps.googleusercontent.com");
	}

	#[cfg(not(feature = "reqwest"))]
	#[test]
	fn build_requires_verifier_without_reqwest() {
		let err = GoogleSignIn::builder()
			.server_client_id("abc.apps.googleusercontent.com")
			.credential_broker(Arc::new(RefusingBroker))
			.build()
			.expect_err("No default verifier exists without reqwest.");

		assert!(matches!(err, Error::Config(ConfigError::MissingTokenVerifier)));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn build_defaults_to_google_verifier() {
		GoogleSignIn::builder()
			.server_client_id("abc.apps.googleusercontent.com")
			.credential_broker(Arc::new(RefusingBroker))
			.build()
			.expect("Default verifier should be available with reqwest.");
	}
}
