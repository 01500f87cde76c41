//! Google sign-in on top of an injected credential broker: ask the platform for an ID-token
//! credential, verify the token against Google's published signing keys, and hand callers one
//! normalized [`SignInResult`](result::SignInResult).

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod result;
pub mod secret;
pub mod verify;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use jsonwebtoken;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, parking_lot as _, tokio as _};

pub use client::{GoogleSignIn, GoogleSignInBuilder};
pub use config::{SignInConfig, SignInSettings};
pub use result::{SignInResult, SignInSuccess};
