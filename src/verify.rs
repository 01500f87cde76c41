//! ID token verification against the identity provider's published signing keys.
//!
//! [`TokenVerifier`] is the seam the sign-in flow depends on: it answers with
//! [`VerifiedClaims`] or nothing, without telling the caller why a token was rejected.
//! [`GoogleTokenVerifier`] is the stock implementation. It downloads Google's key set on every
//! call (no cache, no shared mutable state), then checks signature, issuer, expiry, and
//! audience with `jsonwebtoken`. [`GoogleTokenVerifier::try_verify`] keeps the typed reason for
//! callers that want diagnostics.

// crates.io
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::Error as JwtError};
// self
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestHttpClient};
use crate::{
	_prelude::*,
	error::TransportError,
	http::KeySetClient,
	obs,
};

/// Google's JWKS endpoint for ID token signing keys.
pub const GOOGLE_KEYS_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/certs";
/// Issuer values Google places in ID tokens.
pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Boxed future returned by [`TokenVerifier::verify`].
pub type VerifyFuture<'a> = Pin<Box<dyn Future<Output = Option<VerifiedClaims>> + 'a + Send>>;

/// Validates raw ID tokens for a given audience.
///
/// Implementations must be re-entrant: the flow may verify tokens for several concurrent
/// attempts through the same instance.
pub trait TokenVerifier
where
	Self: Send + Sync,
{
	/// Returns the token's claims when it is authentic, unexpired, issued by a trusted issuer,
	/// and addressed to `audience`; `None` otherwise.
	fn verify<'a>(&'a self, id_token: &'a str, audience: &'a str) -> VerifyFuture<'a>;
}

/// Claims extracted from a token that passed verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedClaims {
	/// Stable account identifier (`sub`).
	pub subject: String,
	/// Token issuer (`iss`).
	pub issuer: String,
	/// Audience the token was verified against (`aud`).
	pub audience: String,
	/// Account e-mail address.
	pub email: Option<String>,
	/// Whether the provider verified the e-mail address.
	pub email_verified: Option<bool>,
	/// Given name.
	pub given_name: Option<String>,
	/// Family name.
	pub family_name: Option<String>,
	/// Nonce echoed back by the provider.
	pub nonce: Option<String>,
	/// Expiry instant (`exp`).
	#[serde(with = "time::serde::timestamp")]
	pub expires_at: OffsetDateTime,
}

/// Reasons [`GoogleTokenVerifier::try_verify`] rejects a token.
#[derive(Debug, ThisError)]
pub enum VerificationError {
	/// The caller passed an empty audience.
	#[error("Expected audience is empty.")]
	EmptyAudience,
	/// The token header cannot be decoded.
	#[error("ID token header is malformed.")]
	MalformedHeader {
		/// Underlying decoding failure.
		#[source]
		source: JwtError,
	},
	/// The token is signed with an algorithm other than RS256.
	#[error("ID token uses unsupported algorithm {algorithm:?}.")]
	UnsupportedAlgorithm {
		/// Algorithm declared by the token header.
		algorithm: Algorithm,
	},
	/// The token header carries no key ID.
	#[error("ID token header has no key ID.")]
	MissingKeyId,
	/// No published key matches the token's key ID.
	#[error("No signing key matches key ID `{kid}`.")]
	UnknownKey {
		/// Key ID from the token header.
		kid: String,
	},
	/// The published key cannot be used for verification.
	#[error("Signing key `{kid}` is unusable.")]
	InvalidKey {
		/// Key ID from the token header.
		kid: String,
		/// Underlying key conversion failure.
		#[source]
		source: JwtError,
	},
	/// The key set could not be fetched.
	#[error(transparent)]
	KeySet(#[from] TransportError),
	/// Signature, issuer, expiry, or audience validation failed.
	#[error("ID token was rejected.")]
	Rejected {
		/// Underlying validation failure.
		#[source]
		source: JwtError,
	},
	/// The `exp` claim is outside the representable range.
	#[error("ID token expiry is out of range.")]
	ExpiryOutOfRange,
}

/// Verifies Google-issued ID tokens by fetching Google's signing keys on every call.
#[derive(Debug)]
pub struct GoogleTokenVerifier<K>
where
	K: ?Sized + KeySetClient,
{
	key_client: Arc<K>,
	keys_endpoint: String,
	issuers: Vec<String>,
	leeway: Duration,
}
impl<K> GoogleTokenVerifier<K>
where
	K: ?Sized + KeySetClient,
{
	const DEFAULT_LEEWAY: Duration = Duration::seconds(60);

	/// Creates a verifier that fetches keys through the provided transport.
	pub fn with_key_client(key_client: impl Into<Arc<K>>) -> Self {
		Self {
			key_client: key_client.into(),
			keys_endpoint: GOOGLE_KEYS_ENDPOINT.to_owned(),
			issuers: GOOGLE_ISSUERS.iter().map(|issuer| (*issuer).to_owned()).collect(),
			leeway: Self::DEFAULT_LEEWAY,
		}
	}

	/// Overrides the JWKS endpoint (defaults to [`GOOGLE_KEYS_ENDPOINT`]).
	pub fn with_keys_endpoint(mut self, endpoint: Url) -> Self {
		self.keys_endpoint = endpoint.into();

		self
	}

	/// Overrides the accepted issuers (defaults to [`GOOGLE_ISSUERS`]).
	pub fn with_issuers<I, S>(mut self, issuers: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.issuers = issuers.into_iter().map(Into::into).collect();

		self
	}

	/// Overrides the clock-skew allowance applied to `exp` (defaults to 60 seconds).
	pub fn with_leeway(mut self, leeway: Duration) -> Self {
		self.leeway = if leeway.is_negative() { Duration::ZERO } else { leeway };

		self
	}

	/// JWKS endpoint in use.
	pub fn keys_endpoint(&self) -> &str {
		&self.keys_endpoint
	}

	/// Verifies `id_token` for `audience`, reporting why it was rejected.
	pub async fn try_verify(
		&self,
		id_token: &str,
		audience: &str,
	) -> Result<VerifiedClaims, VerificationError> {
		if audience.is_empty() {
			return Err(VerificationError::EmptyAudience);
		}

		let header = jsonwebtoken::decode_header(id_token)
			.map_err(|source| VerificationError::MalformedHeader { source })?;

		if header.alg != Algorithm::RS256 {
			return Err(VerificationError::UnsupportedAlgorithm { algorithm: header.alg });
		}

		let kid = header.kid.ok_or(VerificationError::MissingKeyId)?;
		let key_set = self.key_client.fetch_key_set(&self.keys_endpoint).await?;
		let jwk =
			key_set.find(&kid).ok_or_else(|| VerificationError::UnknownKey { kid: kid.clone() })?;
		let key = DecodingKey::from_jwk(jwk)
			.map_err(|source| VerificationError::InvalidKey { kid: kid.clone(), source })?;
		let data = jsonwebtoken::decode::<RawClaims>(id_token, &key, &self.validation(audience))
			.map_err(|source| VerificationError::Rejected { source })?;

		data.claims.into_verified(audience)
	}

	fn validation(&self, audience: &str) -> Validation {
		let mut validation = Validation::new(Algorithm::RS256);

		validation.set_audience(&[audience]);
		validation.set_issuer(&self.issuers);
		validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
		validation.leeway = u64::try_from(self.leeway.whole_seconds()).unwrap_or(0);

		validation
	}
}
#[cfg(feature = "reqwest")]
impl GoogleTokenVerifier<ReqwestHttpClient> {
	/// Creates a verifier backed by a freshly built reqwest client.
	///
	/// Fails with [`ConfigError::HttpClientBuild`] when the TLS backend cannot be initialized.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().build()?;

		Ok(Self::with_key_client(ReqwestHttpClient::with_client(client)))
	}
}
impl<K> TokenVerifier for GoogleTokenVerifier<K>
where
	K: ?Sized + KeySetClient,
{
	fn verify<'a>(&'a self, id_token: &'a str, audience: &'a str) -> VerifyFuture<'a> {
		Box::pin(async move {
			match self.try_verify(id_token, audience).await {
				Ok(claims) => Some(claims),
				Err(e) => {
					obs::log_verification_rejected(&e);

					None
				},
			}
		})
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AudienceClaim {
	One(String),
	Many(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientBool {
	Bool(bool),
	Text(String),
}
impl LenientBool {
	fn value(self) -> Option<bool> {
		match self {
			LenientBool::Bool(value) => Some(value),
			LenientBool::Text(text) => text.parse().ok(),
		}
	}
}

#[derive(Deserialize)]
struct RawClaims {
	sub: String,
	iss: String,
	aud: AudienceClaim,
	exp: i64,
	#[serde(default)]
	email: Option<String>,
	#[serde(default)]
	email_verified: Option<LenientBool>,
	#[serde(default)]
	given_name: Option<String>,
	#[serde(default)]
	family_name: Option<String>,
	#[serde(default)]
	nonce: Option<String>,
}
impl RawClaims {
	fn into_verified(self, audience: &str) -> Result<VerifiedClaims, VerificationError> {
		let expires_at = OffsetDateTime::from_unix_timestamp(self.exp)
			.map_err(|_| VerificationError::ExpiryOutOfRange)?;
		// `jsonwebtoken` already matched `audience` against the claim.
		let audience = match self.aud {
			AudienceClaim::One(value) => value,
			AudienceClaim::Many(values) => values
				.into_iter()
				.find(|value| value == audience)
				.unwrap_or_else(|| audience.to_owned()),
		};

		Ok(VerifiedClaims {
			subject: self.sub,
			issuer: self.iss,
			audience,
			email: self.email,
			email_verified: self.email_verified.and_then(LenientBool::value),
			given_name: self.given_name,
			family_name: self.family_name,
			nonce: self.nonce,
			expires_at,
		})
	}
}
