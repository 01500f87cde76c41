//! Sign-in configuration: validated client parameters plus a per-instance nonce.
//!
//! [`SignInConfig`] is immutable once built. Construct it through [`SignInConfig::new`],
//! [`SignInConfigBuilder`], or by converting deserialized [`SignInSettings`]; all three paths
//! reject a missing or malformed server client ID before any sign-in attempt can start.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
// self
use crate::{
	_prelude::*,
	credential::{CredentialRequest, GoogleIdOption},
	error::ConfigError,
};

const NONCE_BYTES: usize = 16;

/// Single-use random value embedded in the credential request.
///
/// Sixteen bytes from a cryptographically secure generator, encoded as unpadded base64url
/// (22 characters).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Nonce(String);
impl Nonce {
	/// Draws a fresh nonce.
	pub fn generate() -> Self {
		let mut bytes = [0_u8; NONCE_BYTES];

		rand::rng().fill_bytes(&mut bytes);

		Self(URL_SAFE_NO_PAD.encode(bytes))
	}

	/// Returns the encoded nonce.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for Nonce {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Debug for Nonce {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Nonce({})", self.0)
	}
}
impl Display for Nonce {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Serde-friendly sign-in settings, typically loaded from application configuration.
///
/// Missing boolean fields fall back to `true`, matching the builder defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignInSettings {
	/// OAuth client ID of the backend server (the token audience).
	pub server_client_id: Option<String>,
	/// Only offer accounts that previously authorized this client.
	pub filter_by_authorized_accounts: bool,
	/// Let the platform pick the account without prompting when exactly one matches.
	pub auto_select_enabled: bool,
}
impl SignInSettings {
	/// Validates the settings and produces a [`SignInConfig`] with a fresh nonce.
	pub fn into_config(self) -> Result<SignInConfig, ConfigError> {
		let server_client_id = self.server_client_id.ok_or(ConfigError::MissingServerClientId)?;

		validate_server_client_id(&server_client_id)?;

		Ok(SignInConfig {
			server_client_id,
			filter_by_authorized_accounts: self.filter_by_authorized_accounts,
			auto_select_enabled: self.auto_select_enabled,
			nonce: Nonce::generate(),
		})
	}
}
impl Default for SignInSettings {
	fn default() -> Self {
		Self {
			server_client_id: None,
			filter_by_authorized_accounts: true,
			auto_select_enabled: true,
		}
	}
}

/// Immutable parameters for sign-in attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignInConfig {
	server_client_id: String,
	filter_by_authorized_accounts: bool,
	auto_select_enabled: bool,
	nonce: Nonce,
}
impl SignInConfig {
	/// Builds a config with default flags for the provided server client ID.
	pub fn new(server_client_id: impl Into<String>) -> Result<Self, ConfigError> {
		Self::builder().server_client_id(server_client_id).build()
	}

	/// Creates an empty builder.
	pub fn builder() -> SignInConfigBuilder {
		SignInConfigBuilder::default()
	}

	/// Server client ID used as the expected token audience.
	pub fn server_client_id(&self) -> &str {
		&self.server_client_id
	}

	/// Whether only previously authorized accounts are offered.
	pub fn filter_by_authorized_accounts(&self) -> bool {
		self.filter_by_authorized_accounts
	}

	/// Whether the platform may auto-select a single matching account.
	pub fn auto_select_enabled(&self) -> bool {
		self.auto_select_enabled
	}

	/// Nonce generated for this config instance.
	pub fn nonce(&self) -> &Nonce {
		&self.nonce
	}

	/// Maps the config into the provider option understood by the credential broker.
	pub fn to_request_options(&self) -> GoogleIdOption {
		GoogleIdOption {
			server_client_id: self.server_client_id.clone(),
			filter_by_authorized_accounts: self.filter_by_authorized_accounts,
			auto_select_enabled: self.auto_select_enabled,
			nonce: self.nonce.as_str().to_owned(),
		}
	}

	/// Wraps [`to_request_options`](Self::to_request_options) into a broker request.
	pub fn to_credential_request(&self) -> CredentialRequest {
		CredentialRequest::new().with_option(self.to_request_options())
	}
}
impl TryFrom<SignInSettings> for SignInConfig {
	type Error = ConfigError;

	fn try_from(settings: SignInSettings) -> Result<Self, Self::Error> {
		settings.into_config()
	}
}

/// Builder for [`SignInConfig`] values.
#[derive(Clone, Debug, Default)]
pub struct SignInConfigBuilder {
	settings: SignInSettings,
}
impl SignInConfigBuilder {
	/// Seeds the builder from previously loaded settings.
	pub fn from_settings(settings: SignInSettings) -> Self {
		Self { settings }
	}

	/// Applies loaded settings on top of the builder.
	///
	/// Both flags are taken from `settings`. The server client ID is only replaced when
	/// `settings` carries one.
	pub fn settings(mut self, settings: SignInSettings) -> Self {
		let server_client_id = settings.server_client_id.or(self.settings.server_client_id.take());

		self.settings = SignInSettings { server_client_id, ..settings };

		self
	}

	/// Sets the server client ID (required).
	pub fn server_client_id(mut self, id: impl Into<String>) -> Self {
		self.settings.server_client_id = Some(id.into());

		self
	}

	/// Overrides the authorized-accounts filter (defaults to `true`).
	pub fn filter_by_authorized_accounts(mut self, filter: bool) -> Self {
		self.settings.filter_by_authorized_accounts = filter;

		self
	}

	/// Overrides auto-selection (defaults to `true`).
	pub fn auto_select_enabled(mut self, auto_select: bool) -> Self {
		self.settings.auto_select_enabled = auto_select;

		self
	}

	/// Validates the collected values and generates the nonce.
	pub fn build(self) -> Result<SignInConfig, ConfigError> {
		self.settings.into_config()
	}
}

fn validate_server_client_id(value: &str) -> Result<(), ConfigError> {
	if value.is_empty() {
		return Err(ConfigError::MissingServerClientId);
	}
	if value.chars().any(char::is_whitespace) {
		return Err(ConfigError::InvalidServerClientId { value: value.to_owned() });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashSet;
	// self
	use super::*;
	use crate::credential::CredentialOption;

	const CLIENT_ID: &str = "abc.apps.googleusercontent.com";

	#[test]
	fn nonce_is_22_url_safe_characters() {
		let nonce = Nonce::generate();

		assert_eq!(nonce.as_str().len(), 22);
		assert!(
			nonce.as_str().chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
			"Nonce must only use the base64url alphabet: {nonce}."
		);
	}

	#[test]
	fn nonces_do_not_repeat() {
		let seen = (0..512).map(|_| Nonce::generate()).collect::<HashSet<_>>();

		assert_eq!(seen.len(), 512);
	}

	#[test]
	fn each_config_gets_its_own_nonce() {
		let a = SignInConfig::new(CLIENT_ID).expect("Config fixture should build.");
		let b = SignInConfig::new(CLIENT_ID).expect("Config fixture should build.");

		assert_ne!(a.nonce(), b.nonce());
	}

	#[test]
	fn builder_defaults_and_overrides() {
		let config = SignInConfig::new(CLIENT_ID).expect("Config fixture should build.");

		assert!(config.filter_by_authorized_accounts());
		assert!(config.auto_select_enabled());

		let config = SignInConfig::builder()
			.server_client_id(CLIENT_ID)
			.filter_by_authorized_accounts(false)
			.auto_select_enabled(false)
			.build()
			.expect("Config with overrides should build.");

		assert_eq!(config.server_client_id(), CLIENT_ID);
		assert!(!config.filter_by_authorized_accounts());
		assert!(!config.auto_select_enabled());
	}

	#[test]
	fn builder_requires_server_client_id() {
		let err = SignInConfig::builder().build().expect_err("Missing client ID must fail.");

		assert!(matches!(err, ConfigError::MissingServerClientId));

		let err = SignInConfig::new("").expect_err("Empty client ID must fail.");

		assert!(matches!(err, ConfigError::MissingServerClientId));

		let err = SignInConfig::new("abc .apps").expect_err("Whitespace must be rejected.");

		assert!(matches!(err, ConfigError::InvalidServerClientId { .. }));
	}

	#[test]
	fn request_options_mirror_config() {
		let config = SignInConfig::builder()
			.server_client_id(CLIENT_ID)
			.auto_select_enabled(false)
			.build()
			.expect("Config fixture should build.");
		let options = config.to_request_options();

		assert_eq!(options.server_client_id, CLIENT_ID);
		assert!(options.filter_by_authorized_accounts);
		assert!(!options.auto_select_enabled);
		assert_eq!(options.nonce, config.nonce().as_str());
		assert_eq!(options, config.to_request_options());

		let request = config.to_credential_request();

		assert_eq!(request.options, vec![CredentialOption::GoogleId(options)]);
	}

	#[test]
	fn settings_keep_client_id_unless_they_carry_one() {
		let config = SignInConfig::builder()
			.server_client_id(CLIENT_ID)
			.auto_select_enabled(false)
			.settings(SignInSettings { filter_by_authorized_accounts: false, ..Default::default() })
			.build()
			.expect("Earlier client ID should survive settings without one.");

		assert_eq!(config.server_client_id(), CLIENT_ID);
		assert!(!config.filter_by_authorized_accounts());
		assert!(config.auto_select_enabled());

		let config = SignInConfig::builder()
			.server_client_id("old.apps.googleusercontent.com")
			.settings(SignInSettings {
				server_client_id: Some(CLIENT_ID.into()),
				..Default::default()
			})
			.build()
			.expect("Settings client ID should apply.");

		assert_eq!(config.server_client_id(), CLIENT_ID);
	}

	#[test]
	fn settings_deserialize_with_defaults() {
		let settings: SignInSettings =
			serde_json::from_str(r#"{"server_client_id":"abc.apps.googleusercontent.com"}"#)
				.expect("Settings should deserialize.");
		let config = SignInConfig::try_from(settings).expect("Settings should validate.");

		assert_eq!(config.server_client_id(), CLIENT_ID);
		assert!(config.filter_by_authorized_accounts());
		assert!(config.auto_select_enabled());

		let settings: SignInSettings = serde_json::from_str(r#"{"auto_select_enabled":false}"#)
			.expect("Settings should deserialize.");

		assert!(matches!(settings.into_config(), Err(ConfigError::MissingServerClientId)));
	}
}
