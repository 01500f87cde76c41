// self
use crate::{_prelude::*, obs::FlowKind, verify::VerificationError};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by sign-in flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("google_sign_in.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a `warn` event for a failed attempt.
pub fn log_flow_failure(kind: FlowKind, reason: &'static str, message: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(flow = kind.as_str(), reason, "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, reason, message);
	}
}

/// Emits a `debug` event for a token the verifier refused.
pub fn log_verification_rejected(error: &VerificationError) {
	#[cfg(feature = "tracing")]
	{
		match std::error::Error::source(error) {
			Some(source) => tracing::debug!(%source, "{error}"),
			None => tracing::debug!("{error}"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}

/// Emits a `debug` event once a credential has been decoded, identified by fingerprint.
pub fn log_credential_decoded(fingerprint: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(token_fingerprint = fingerprint, "Decoded Google ID token credential.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = fingerprint;
	}
}
