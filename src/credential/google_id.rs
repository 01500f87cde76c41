//! Google ID-token credential decoding and validation of its payload shape.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{
	_prelude::*,
	credential::{Credential, CredentialOption},
	secret::Secret,
};

const BUNDLE_KEY_ID: &str = "com.google.android.libraries.identity.googleid.BUNDLE_KEY_ID";
const BUNDLE_KEY_ID_TOKEN: &str =
	"com.google.android.libraries.identity.googleid.BUNDLE_KEY_ID_TOKEN";
const BUNDLE_KEY_DISPLAY_NAME: &str =
	"com.google.android.libraries.identity.googleid.BUNDLE_KEY_DISPLAY_NAME";
const BUNDLE_KEY_GIVEN_NAME: &str =
	"com.google.android.libraries.identity.googleid.BUNDLE_KEY_GIVEN_NAME";
const BUNDLE_KEY_FAMILY_NAME: &str =
	"com.google.android.libraries.identity.googleid.BUNDLE_KEY_FAMILY_NAME";
const BUNDLE_KEY_PROFILE_PICTURE_URI: &str =
	"com.google.android.libraries.identity.googleid.BUNDLE_KEY_PROFILE_PICTURE_URI";
const BUNDLE_KEY_PHONE_NUMBER: &str =
	"com.google.android.libraries.identity.googleid.BUNDLE_KEY_PHONE_NUMBER";

/// Provider options for requesting a Google ID token credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleIdOption {
	/// Server client ID the token will be issued for.
	pub server_client_id: String,
	/// Only offer accounts that previously authorized this client.
	pub filter_by_authorized_accounts: bool,
	/// Allow the platform to auto-select a single matching account.
	pub auto_select_enabled: bool,
	/// Nonce the provider embeds in the issued token.
	pub nonce: String,
}
impl From<GoogleIdOption> for CredentialOption {
	fn from(option: GoogleIdOption) -> Self {
		Self::GoogleId(option)
	}
}

/// Reasons a broker credential cannot be turned into a [`GoogleIdTokenCredential`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialDecodeError {
	/// The broker returned some other credential type.
	#[error("Unexpected credential type `{kind}`.")]
	UnexpectedType {
		/// Type tag that was received.
		kind: String,
	},
	/// The credential claims the right type but its payload is malformed.
	#[error(transparent)]
	Parse(#[from] IdTokenParseError),
}

/// Malformed Google ID token credential payloads.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdTokenParseError {
	/// A mandatory payload entry is absent or blank.
	#[error("Credential payload is missing `{field}`.")]
	MissingField {
		/// Short name of the missing entry.
		field: &'static str,
	},
	/// The ID token is not a compact JWT.
	#[error("ID token is malformed: {reason}.")]
	MalformedToken {
		/// What was wrong with the token.
		reason: &'static str,
	},
	/// The profile picture URI does not parse.
	#[error("Profile picture URI is invalid.")]
	InvalidPictureUri {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Google ID token credential decoded from a broker response.
///
/// Profile fields are hints supplied by the platform; they are not covered by the token
/// signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoogleIdTokenCredential {
	/// Account identifier (the account e-mail address).
	pub id: String,
	/// Raw, unverified ID token.
	pub id_token: Secret,
	/// Full display name.
	pub display_name: Option<String>,
	/// Given name.
	pub given_name: Option<String>,
	/// Family name.
	pub family_name: Option<String>,
	/// Avatar URL.
	pub profile_picture_uri: Option<Url>,
	/// Phone number, when the account exposes one.
	pub phone_number: Option<String>,
}
impl GoogleIdTokenCredential {
	/// Type tag the broker attaches to Google ID token credentials.
	pub const TYPE: &'static str =
		"com.google.android.libraries.identity.googleid.TYPE_GOOGLE_ID_TOKEN_CREDENTIAL";

	/// Decodes a broker credential, rejecting every other credential type.
	pub fn decode(credential: &Credential) -> Result<Self, CredentialDecodeError> {
		match credential {
			Credential::Custom { kind, data } if kind == Self::TYPE =>
				Ok(Self::from_data(data)?),
			other => Err(CredentialDecodeError::UnexpectedType { kind: other.kind().to_owned() }),
		}
	}

	/// Parses the key/value payload of a Google ID token credential.
	pub fn from_data(data: &BTreeMap<String, String>) -> Result<Self, IdTokenParseError> {
		let id =
			optional(data, BUNDLE_KEY_ID).ok_or(IdTokenParseError::MissingField { field: "id" })?;
		// Kept byte-for-byte as the broker returned it.
		let id_token = data
			.get(BUNDLE_KEY_ID_TOKEN)
			.filter(|token| !token.trim().is_empty())
			.cloned()
			.ok_or(IdTokenParseError::MissingField { field: "id_token" })?;

		check_compact_jwt(&id_token)?;

		let profile_picture_uri = optional(data, BUNDLE_KEY_PROFILE_PICTURE_URI)
			.map(|raw| Url::parse(&raw))
			.transpose()
			.map_err(|source| IdTokenParseError::InvalidPictureUri { source })?;

		Ok(Self {
			id,
			id_token: Secret::new(id_token),
			display_name: optional(data, BUNDLE_KEY_DISPLAY_NAME),
			given_name: optional(data, BUNDLE_KEY_GIVEN_NAME),
			family_name: optional(data, BUNDLE_KEY_FAMILY_NAME),
			profile_picture_uri,
			phone_number: optional(data, BUNDLE_KEY_PHONE_NUMBER),
		})
	}

	/// Encodes the credential back into the broker's payload shape.
	///
	/// Broker implementations and test doubles use this to build [`Credential::Custom`] values.
	pub fn into_credential(self) -> Credential {
		let mut data = BTreeMap::new();

		data.insert(BUNDLE_KEY_ID.into(), self.id);
		data.insert(BUNDLE_KEY_ID_TOKEN.into(), self.id_token.expose().to_owned());

		let hints = [
			(BUNDLE_KEY_DISPLAY_NAME, self.display_name),
			(BUNDLE_KEY_GIVEN_NAME, self.given_name),
			(BUNDLE_KEY_FAMILY_NAME, self.family_name),
			(BUNDLE_KEY_PROFILE_PICTURE_URI, self.profile_picture_uri.map(String::from)),
			(BUNDLE_KEY_PHONE_NUMBER, self.phone_number),
		];

		for (key, value) in hints {
			if let Some(value) = value {
				data.insert(key.into(), value);
			}
		}

		Credential::Custom { kind: Self::TYPE.into(), data }
	}
}

fn optional(data: &BTreeMap<String, String>, key: &str) -> Option<String> {
	data.get(key).map(|value| value.trim()).filter(|value| !value.is_empty()).map(str::to_owned)
}

// Structural check only; the signature is checked by the verifier.
fn check_compact_jwt(token: &str) -> Result<(), IdTokenParseError> {
	if token.chars().any(char::is_whitespace) {
		return Err(IdTokenParseError::MalformedToken { reason: "contains whitespace" });
	}

	let mut segments = token.split('.');
	let (Some(header), Some(payload), Some(signature), None) =
		(segments.next(), segments.next(), segments.next(), segments.next())
	else {
		return Err(IdTokenParseError::MalformedToken { reason: "expected three segments" });
	};

	if header.is_empty() || payload.is_empty() || signature.is_empty() {
		return Err(IdTokenParseError::MalformedToken { reason: "empty segment" });
	}

	let header = URL_SAFE_NO_PAD
		.decode(header)
		.map_err(|_| IdTokenParseError::MalformedToken { reason: "header is not base64url" })?;

	serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&header)
		.map_err(|_| IdTokenParseError::MalformedToken { reason: "header is not a JSON object" })?;

	Ok(())
}
