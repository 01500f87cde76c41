//! Normalized outcome of a sign-in attempt.

// self
use crate::{
	_prelude::*,
	credential::GoogleIdTokenCredential,
	secret::Secret,
	verify::VerifiedClaims,
};

/// Result of one sign-in attempt.
///
/// Built fresh per attempt and never persisted by this crate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignInResult {
	/// The token passed verification.
	Success(SignInSuccess),
	/// The attempt failed; the message is human-readable, not a machine code.
	Failure {
		/// Description of what went wrong.
		error_message: String,
	},
}
impl SignInResult {
	/// Builds a failure from any displayable error.
	pub fn failure(message: impl Display) -> Self {
		Self::Failure { error_message: message.to_string() }
	}

	/// Whether the attempt succeeded.
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success(_))
	}

	/// Borrows the success payload, if any.
	pub fn success(&self) -> Option<&SignInSuccess> {
		match self {
			Self::Success(success) => Some(success),
			Self::Failure { .. } => None,
		}
	}

	/// Borrows the failure message, if any.
	pub fn error_message(&self) -> Option<&str> {
		match self {
			Self::Success(_) => None,
			Self::Failure { error_message } => Some(error_message),
		}
	}
}

/// Identity data of a verified sign-in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInSuccess {
	/// Raw ID token, for the caller's backend to re-verify.
	pub id_token: Secret,
	/// Account e-mail address.
	pub email: Option<String>,
	/// Given name.
	pub given_name: Option<String>,
	/// Family name.
	pub family_name: Option<String>,
	/// Full display name.
	pub display_name: Option<String>,
	/// Avatar URL.
	pub profile_picture_uri: Option<String>,
	/// Stable account identifier (`sub`).
	pub subject_id: String,
	/// Token issuer (`iss`).
	pub issuer: String,
	/// Audience the token was verified for (`aud`).
	pub audience: String,
}
impl SignInSuccess {
	/// Merges verified claims with the credential's profile hints.
	///
	/// Claims win for e-mail and names; display name and avatar only exist on the credential;
	/// subject, issuer, and audience only ever come from the claims.
	pub fn from_verified(credential: GoogleIdTokenCredential, claims: VerifiedClaims) -> Self {
		Self {
			id_token: credential.id_token,
			email: claims.email.or(Some(credential.id)),
			given_name: claims.given_name.or(credential.given_name),
			family_name: claims.family_name.or(credential.family_name),
			display_name: credential.display_name,
			profile_picture_uri: credential.profile_picture_uri.map(String::from),
			subject_id: claims.subject,
			issuer: claims.issuer,
			audience: claims.audience,
		}
	}
}
