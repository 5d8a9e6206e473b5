//! Response decoding: wire formats, the pluggable [`Codec`] seam, and typed decoding.

// std
use std::any;
// crates.io
use serde_json::Map;
// self
use crate::_prelude::*;

/// Serialization format spoken by the remote API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
	/// `application/json` (default).
	#[default]
	Json,
	/// `application/x-www-form-urlencoded`.
	Form,
}
impl WireFormat {
	/// Returns the lowercase format label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Json => "json",
			Self::Form => "form",
		}
	}

	/// MIME type advertised in `Accept` headers.
	pub fn media_type(self) -> &'static str {
		match self {
			Self::Json => "application/json",
			Self::Form => "application/x-www-form-urlencoded",
		}
	}
}
impl Display for WireFormat {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for WireFormat {
	type Err = CodecError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"json" => Ok(Self::Json),
			"form" | "urlencoded" => Ok(Self::Form),
			other => Err(CodecError::Other { message: format!("Unknown wire format `{other}`.") }),
		}
	}
}

/// Decoding failures.
#[derive(Debug, ThisError)]
pub enum CodecError {
	/// Body is not valid for the declared wire format.
	#[error("Response body is not valid {format}{}.", target_suffix(.target))]
	Syntax {
		/// Declared wire format.
		format: WireFormat,
		/// Requested deserialization target, when one was declared.
		target: Option<String>,
		/// Underlying parser failure.
		#[source]
		source: serde_json::Error,
	},
	/// Body parsed but does not match the requested target type.
	#[error("Response body does not match `{target}` at `{}`.", .source.path())]
	Target {
		/// Requested deserialization target.
		target: String,
		/// Path-aware deserialization failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Codec-specific failure without a typed source.
	#[error("{message}")]
	Other {
		/// Codec-supplied description.
		message: String,
	},
}

/// Turns raw response bodies into generic documents.
///
/// `target` carries the identifier of the type the caller will deserialize into (if any) so
/// codecs can pick a schema-specific strategy; the generic fallback receives `None`.
pub trait Codec
where
	Self: 'static + Send + Sync,
{
	/// Decodes `body` according to `format`.
	fn decode(
		&self,
		body: &[u8],
		target: Option<&str>,
		format: WireFormat,
	) -> Result<Value, CodecError>;
}

/// Default codec backed by `serde_json` and `url::form_urlencoded`.
///
/// Empty JSON bodies decode to [`Value::Null`]; form bodies decode to a string-valued object.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerdeCodec;
impl Codec for SerdeCodec {
	fn decode(
		&self,
		body: &[u8],
		target: Option<&str>,
		format: WireFormat,
	) -> Result<Value, CodecError> {
		match format {
			WireFormat::Json => decode_json(body).map_err(|source| CodecError::Syntax {
				format,
				target: target.map(ToOwned::to_owned),
				source,
			}),
			WireFormat::Form => Ok(decode_form(body)),
		}
	}
}

/// Decodes `body` into `T`, passing the type name to the codec as the target identifier.
pub fn decode_as<T>(codec: &dyn Codec, body: &[u8], format: WireFormat) -> Result<T, CodecError>
where
	T: DeserializeOwned,
{
	let target = any::type_name::<T>();
	let document = codec.decode(body, Some(target), format)?;

	serde_path_to_error::deserialize(document)
		.map_err(|source| CodecError::Target { target: target.to_owned(), source })
}

/// Generic JSON-to-document fallback used when no target type is declared.
pub fn decode_json(body: &[u8]) -> Result<Value, serde_json::Error> {
	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}

	serde_json::from_slice(body)
}

fn decode_form(body: &[u8]) -> Value {
	let map = url::form_urlencoded::parse(body)
		.map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
		.collect::<Map<_, _>>();

	Value::Object(map)
}

fn target_suffix(target: &Option<String>) -> String {
	target.as_ref().map(|target| format!(" for `{target}`")).unwrap_or_default()
}
