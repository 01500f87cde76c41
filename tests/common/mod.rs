//! Shared doubles and signed-token fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, sync::Arc};
// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use serde_json::{Value, json};
use time::OffsetDateTime;
// self
use google_sign_in::{
	credential::{
		Credential, CredentialBroker, CredentialError, CredentialFuture, CredentialRequest,
		GoogleIdTokenCredential,
	},
	secret::Secret,
	url::Url,
	verify::{TokenVerifier, VerifiedClaims, VerifyFuture},
};

pub const CLIENT_ID: &str = "abc.apps.googleusercontent.com";
pub const GOOGLE_ISSUER: &str = "https://accounts.google.com";
pub const KEY_ID: &str = "test-key-1";
pub const JWKS: &str = include_str!("../fixtures/jwks.json");

const SIGNING_KEY_PEM: &[u8] = include_bytes!("../fixtures/signing_key.pem");
// {"alg":"RS256","kid":"test-key-1","typ":"JWT"}
const OPAQUE_HEADER: &str = "eyJhbGciOiJSUzI1NiIsImtpZCI6InRlc3Qta2V5LTEiLCJ0eXAiOiJKV1QifQ";

/// Structurally valid but unsigned token; only useful with verifier doubles.
pub fn opaque_token(signature: &str) -> String {
	format!("{OPAQUE_HEADER}.e30.{signature}")
}

/// Signs `claims` with the fixture RSA key under [`KEY_ID`].
pub fn sign(claims: &Value) -> String {
	sign_with_kid(claims, KEY_ID)
}

/// Signs `claims` with the fixture RSA key under an arbitrary key ID.
pub fn sign_with_kid(claims: &Value, kid: &str) -> String {
	let mut header = Header::new(Algorithm::RS256);

	header.kid = Some(kid.into());

	encode(header, claims)
}

/// Signs `claims` with the fixture RSA key and no key ID in the header.
pub fn sign_without_kid(claims: &Value) -> String {
	encode(Header::new(Algorithm::RS256), claims)
}

/// Claims shaped like a Google ID token, valid for one hour.
pub fn google_claims(aud: &str) -> Value {
	let now = OffsetDateTime::now_utc().unix_timestamp();

	json!({
		"iss": GOOGLE_ISSUER,
		"aud": aud,
		"sub": "u1",
		"email": "a@b.com",
		"email_verified": true,
		"given_name": "Ada",
		"nonce": "fixture-nonce",
		"iat": now,
		"exp": now + 3600,
	})
}

fn encode(header: Header, claims: &Value) -> String {
	let key =
		EncodingKey::from_rsa_pem(SIGNING_KEY_PEM).expect("Fixture signing key should load.");

	jsonwebtoken::encode(&header, claims, &key).expect("Fixture token should sign.")
}

/// Broker credential carrying `token` plus profile hints.
pub fn google_credential(token: &str) -> Credential {
	GoogleIdTokenCredential {
		id: "hint@b.com".into(),
		id_token: Secret::new(token),
		display_name: Some("Ada Lovelace".into()),
		given_name: Some("Hint".into()),
		family_name: Some("Lovelace".into()),
		profile_picture_uri: Some(
			Url::parse("https://lh3.example.com/a.png").expect("Fixture URL should parse."),
		),
		phone_number: None,
	}
	.into_credential()
}

/// Verified claims as a verifier double would return them.
pub fn verified_claims(aud: &str) -> VerifiedClaims {
	VerifiedClaims {
		subject: "u1".into(),
		issuer: GOOGLE_ISSUER.into(),
		audience: aud.into(),
		email: Some("a@b.com".into()),
		email_verified: Some(true),
		given_name: None,
		family_name: None,
		nonce: None,
		expires_at: OffsetDateTime::now_utc(),
	}
}

/// Broker double that replays scripted responses and records requests.
#[derive(Default)]
pub struct ScriptedBroker {
	responses: Mutex<VecDeque<Result<Credential, CredentialError>>>,
	clear_error: Option<CredentialError>,
	requests: Mutex<Vec<CredentialRequest>>,
	clears: Mutex<usize>,
}
impl ScriptedBroker {
	pub fn new<I>(responses: I) -> Arc<Self>
	where
		I: IntoIterator<Item = Result<Credential, CredentialError>>,
	{
		Arc::new(Self { responses: Mutex::new(responses.into_iter().collect()), ..Self::default() })
	}

	pub fn failing_clear(error: CredentialError) -> Arc<Self> {
		Arc::new(Self { clear_error: Some(error), ..Self::default() })
	}

	pub fn requests(&self) -> Vec<CredentialRequest> {
		self.requests.lock().clone()
	}

	pub fn clear_calls(&self) -> usize {
		*self.clears.lock()
	}
}
impl CredentialBroker for ScriptedBroker {
	fn get_credential<'a>(
		&'a self,
		request: &'a CredentialRequest,
	) -> CredentialFuture<'a, Credential> {
		self.requests.lock().push(request.clone());

		let response =
			self.responses.lock().pop_front().unwrap_or(Err(CredentialError::NoCredential));

		Box::pin(async move { response })
	}

	fn clear_credential_state(&self) -> CredentialFuture<'_, ()> {
		*self.clears.lock() += 1;

		let result = match &self.clear_error {
			Some(error) => Err(error.clone()),
			None => Ok(()),
		};

		Box::pin(async move { result })
	}
}

/// Verifier double returning fixed claims and recording its inputs.
#[derive(Default)]
pub struct StaticVerifier {
	claims: Option<VerifiedClaims>,
	calls: Mutex<Vec<(String, String)>>,
}
impl StaticVerifier {
	pub fn accepting(claims: VerifiedClaims) -> Arc<Self> {
		Arc::new(Self { claims: Some(claims), ..Self::default() })
	}

	pub fn rejecting() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn calls(&self) -> Vec<(String, String)> {
		self.calls.lock().clone()
	}
}
impl TokenVerifier for StaticVerifier {
	fn verify<'a>(&'a self, id_token: &'a str, audience: &'a str) -> VerifyFuture<'a> {
		self.calls.lock().push((id_token.to_owned(), audience.to_owned()));

		let claims = self.claims.clone();

		Box::pin(async move { claims })
	}
}
