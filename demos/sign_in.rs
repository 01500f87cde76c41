//! Demonstrates a full sign-in against a stand-in credential broker, with the stock Google
//! verifier pointed at a local JWKS endpoint, followed by a sign-out.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::json;
use time::OffsetDateTime;
// self
use google_sign_in::{
	GoogleSignIn, SignInResult,
	credential::{
		Credential, CredentialBroker, CredentialError, CredentialFuture, CredentialOption,
		CredentialRequest, GoogleIdTokenCredential,
	},
	http::ReqwestHttpClient,
	secret::Secret,
	url::Url,
	verify::GoogleTokenVerifier,
};

const SIGNING_KEY_PEM: &[u8] = include_bytes!("../tests/fixtures/signing_key.pem");
const JWKS: &str = include_str!("../tests/fixtures/jwks.json");
const CLIENT_ID: &str = "demo.apps.googleusercontent.com";

/// Plays the platform account picker: always "selects" the same account and signs a token for
/// whatever client ID and nonce it was asked for.
struct DemoBroker {
	signing_key: EncodingKey,
}
impl CredentialBroker for DemoBroker {
	fn get_credential<'a>(
		&'a self,
		request: &'a CredentialRequest,
	) -> CredentialFuture<'a, Credential> {
		Box::pin(async move {
			let Some(CredentialOption::GoogleId(option)) = request.options.first() else {
				return Err(CredentialError::Unsupported);
			};
			let now = OffsetDateTime::now_utc().unix_timestamp();
			let claims = json!({
				"iss": "https://accounts.google.com",
				"aud": option.server_client_id,
				"sub": "110169484474386276334",
				"email": "ada@example.com",
				"email_verified": true,
				"given_name": "Ada",
				"family_name": "Lovelace",
				"nonce": option.nonce,
				"iat": now,
				"exp": now + 3_600,
			});
			let mut header = Header::new(Algorithm::RS256);

			header.kid = Some("test-key-1".into());

			let id_token = jsonwebtoken::encode(&header, &claims, &self.signing_key)
				.map_err(|e| CredentialError::unknown(e.to_string()))?;

			Ok(GoogleIdTokenCredential {
				id: "ada@example.com".into(),
				id_token: Secret::new(id_token),
				display_name: Some("Ada Lovelace".into()),
				given_name: Some("Ada".into()),
				family_name: Some("Lovelace".into()),
				profile_picture_uri: None,
				phone_number: None,
			}
			.into_credential())
		})
	}

	fn clear_credential_state(&self) -> CredentialFuture<'_, ()> {
		Box::pin(async { Ok(()) })
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let certs_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth2/v3/certs");
			then.status(200).header("content-type", "application/json").body(JWKS);
		})
		.await;
	let verifier =
		GoogleTokenVerifier::<ReqwestHttpClient>::with_key_client(ReqwestHttpClient::default())
			.with_keys_endpoint(Url::parse(&server.url("/oauth2/v3/certs"))?);
	let broker = DemoBroker { signing_key: EncodingKey::from_rsa_pem(SIGNING_KEY_PEM)? };
	let sign_in = GoogleSignIn::builder()
		.server_client_id(CLIENT_ID)
		.credential_broker(Arc::new(broker))
		.token_verifier(Arc::new(verifier))
		.build()?;

	match sign_in.sign_in().await {
		SignInResult::Success(success) => println!(
			"Signed in as {} ({}), token {}.",
			success.display_name.as_deref().unwrap_or("unknown"),
			success.subject_id,
			success.id_token,
		),
		SignInResult::Failure { error_message } => println!("Sign-in failed: {error_message}."),
	}

	sign_in.sign_out().await?;

	println!("Signed out.");

	certs_mock.assert_async().await;

	Ok(())
}
