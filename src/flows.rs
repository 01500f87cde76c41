//! Sign-in orchestration: one attempt from credential request to normalized result.
//!
//! [`SignInFlow::run`] performs a single attempt and never fails: every error is folded into
//! [`SignInResult::Failure`]. The steps are fixed and there is no retry:
//!
//! 1. build the credential request from the config;
//! 2. ask the broker for a credential;
//! 3. decode it as a Google ID token credential (other types are rejected);
//! 4. verify the token with the server client ID as audience;
//! 5. merge verified claims with the credential's profile hints.
//!
//! [`SignInFlow::attempt`] exposes the same pipeline with the typed [`SignInError`].

// self
use crate::{
	_prelude::*,
	config::SignInConfig,
	credential::{
		CredentialBroker, CredentialDecodeError, CredentialError, GoogleIdTokenCredential,
		IdTokenParseError,
	},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	result::{SignInResult, SignInSuccess},
	verify::TokenVerifier,
};

/// Why a sign-in attempt failed.
///
/// The `Display` output is the message carried by [`SignInResult::Failure`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SignInError {
	/// The broker reported an error.
	#[error("broker error: {0}")]
	Broker(#[source] CredentialError),
	/// The broker returned a credential this crate cannot use.
	#[error("unexpected credential type")]
	UnexpectedCredentialType {
		/// Type tag that was received.
		kind: String,
	},
	/// The credential payload is malformed.
	#[error("token parse error: {0}")]
	TokenParse(#[source] IdTokenParseError),
	/// The token failed verification.
	#[error("token invalid or unverified")]
	Unverified,
}
impl SignInError {
	/// Stable label suitable for metric or log fields.
	pub const fn reason(&self) -> &'static str {
		match self {
			SignInError::Broker(_) => "broker",
			SignInError::UnexpectedCredentialType { .. } => "credential_type",
			SignInError::TokenParse(_) => "token_parse",
			SignInError::Unverified => "unverified",
		}
	}
}
impl From<CredentialDecodeError> for SignInError {
	fn from(e: CredentialDecodeError) -> Self {
		match e {
			CredentialDecodeError::UnexpectedType { kind } =>
				Self::UnexpectedCredentialType { kind },
			CredentialDecodeError::Parse(e) => Self::TokenParse(e),
		}
	}
}

/// Runs sign-in attempts for one config against injected collaborators.
///
/// The flow holds no per-attempt state, so it can be shared and driven concurrently; each
/// attempt builds its own request.
#[derive(Clone)]
pub struct SignInFlow {
	config: SignInConfig,
	broker: Arc<dyn CredentialBroker>,
	verifier: Arc<dyn TokenVerifier>,
}
impl SignInFlow {
	/// Creates a flow from a validated config and its collaborators.
	pub fn new(
		config: SignInConfig,
		broker: Arc<dyn CredentialBroker>,
		verifier: Arc<dyn TokenVerifier>,
	) -> Self {
		Self { config, broker, verifier }
	}

	/// Config driving every attempt.
	pub fn config(&self) -> &SignInConfig {
		&self.config
	}

	/// Credential broker used by the flow.
	pub fn broker(&self) -> &Arc<dyn CredentialBroker> {
		&self.broker
	}

	/// Runs one attempt, converting any failure into [`SignInResult::Failure`].
	pub async fn run(&self) -> SignInResult {
		const KIND: FlowKind = FlowKind::SignIn;

		let span = FlowSpan::new(KIND, "sign_in");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		match span.instrument(self.attempt()).await {
			Ok(success) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);

				SignInResult::Success(success)
			},
			Err(e) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				obs::record_sign_in_failure(e.reason());
				obs::log_flow_failure(KIND, e.reason(), &e);

				SignInResult::failure(e)
			},
		}
	}

	/// Runs one attempt and returns the typed failure reason.
	pub async fn attempt(&self) -> Result<SignInSuccess, SignInError> {
		let request = self.config.to_credential_request();
		let credential =
			self.broker.get_credential(&request).await.map_err(SignInError::Broker)?;
		let credential = GoogleIdTokenCredential::decode(&credential)?;

		obs::log_credential_decoded(&credential.id_token.fingerprint());

		let claims = self
			.verifier
			.verify(credential.id_token.expose(), self.config.server_client_id())
			.await
			.ok_or(SignInError::Unverified)?;

		Ok(SignInSuccess::from_verified(credential, claims))
	}
}
impl Debug for SignInFlow {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignInFlow").field("config", &self.config).finish_non_exhaustive()
	}
}
