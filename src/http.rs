//! Transport primitives for fetching the identity provider's signing keys.
//!
//! [`KeySetClient`] is the verifier's only dependency on an HTTP stack. The default
//! [`ReqwestHttpClient`] performs a plain `GET` per call; nothing is cached, so concurrent
//! verifications never share mutable state. Custom transports can reuse [`parse_key_set`] to
//! get the same path-aware parse errors.

// crates.io
use jsonwebtoken::jwk::JwkSet;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`KeySetClient::fetch_key_set`].
pub type KeySetFuture<'a> =
	Pin<Box<dyn Future<Output = Result<JwkSet, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports able to download a JSON Web Key Set.
pub trait KeySetClient
where
	Self: 'static + Send + Sync,
{
	/// Downloads and parses the key set published at `endpoint`.
	fn fetch_key_set<'a>(&'a self, endpoint: &'a str) -> KeySetFuture<'a>;
}

/// Parses a JWKS document, keeping the JSON path of the first offending field.
pub fn parse_key_set(body: &[u8]) -> Result<JwkSet, TransportError> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| TransportError::KeySetParse { source })
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl std::ops::Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl KeySetClient for ReqwestHttpClient {
	fn fetch_key_set<'a>(&'a self, endpoint: &'a str) -> KeySetFuture<'a> {
		Box::pin(async move {
			let response = self.0.get(endpoint).send().await?;
			let status = response.status();

			if !status.is_success() {
				return Err(TransportError::Status { status: status.as_u16() });
			}

			let body = response.bytes().await?;

			parse_key_set(&body)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parse_key_set_reads_google_shape() {
		let body = br#"{"keys":[{"kty":"RSA","alg":"RS256","use":"sig","kid":"k1","n":"sXchDaQebHnPiGvyDOAT4saGEUetSyo9MKLOoWFsueri23bOdgWp4Dy1WlUzewbgBHod5pcM9H95GQRV3JDXboIRROSBigeC5yjU1hGzHHyXss8UDprecbAYxknTcQkhslANGRUZmdTOQ5qTRsLAt6BTYuyvVRdhS8exSZEy_c4gs_7svlJJQ4H9_NxsiIoLwAEk7-Q3UXERGYw_75IDrGA84-lA_-Ct4eTlXHBIY2EaV7t7LjJaynVJCpkv4LKjTTAumiGUIuQhrNhZLuF_RJLqHpM2kgWFLU7-VTdL1VbC2tejvcI2BlMkEpk1BzBZI0KQB0GaDWFLN-aEAw3vRw","e":"AQAB"}]}"#;
		let set = parse_key_set(body).expect("Google-style JWKS should parse.");

		assert_eq!(set.keys.len(), 1);
		assert!(set.find("k1").is_some());
		assert!(set.find("k2").is_none());
	}

	#[test]
	fn parse_key_set_reports_json_path() {
		let err = parse_key_set(br#"{"keys":[{"kty":"RSA","kid":7}]}"#)
			.expect_err("Malformed key must be rejected.");
		let TransportError::KeySetParse { source } = err else {
			panic!("Expected a key-set parse error.");
		};

		assert!(
			source.path().to_string().starts_with("keys[0]"),
			"Unexpected path: {}.",
			source.path()
		);
	}
}
