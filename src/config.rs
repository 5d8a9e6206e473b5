//! Construction inputs for one named OAuth client and their validation.

// crates.io
use oauth2::{ClientId, ClientSecret};
// self
use crate::{_prelude::*, auth::ClientName, codec::WireFormat, error::ConfigError};

/// Validated configuration of a named OAuth client.
///
/// One orchestrator serves exactly one configuration; the name partitions persisted tokens.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	name: ClientName,
	api_base_url: Url,
	client_id: ClientId,
	client_secret: Option<ClientSecret>,
	token_endpoint: Url,
	format: WireFormat,
}
impl ClientConfig {
	/// Starts a builder for the configuration called `name`.
	pub fn builder(name: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(name)
	}

	/// Configuration name.
	pub fn name(&self) -> &ClientName {
		&self.name
	}

	/// API base URL (always ends with `/`).
	pub fn api_base_url(&self) -> &Url {
		&self.api_base_url
	}

	/// OAuth client identifier.
	pub fn client_id(&self) -> &str {
		self.client_id.as_str()
	}

	/// OAuth client secret, if the client is confidential.
	pub fn client_secret(&self) -> Option<&str> {
		self.client_secret.as_ref().map(|secret| secret.secret().as_str())
	}

	/// Absolute token endpoint.
	pub fn token_endpoint(&self) -> &Url {
		&self.token_endpoint
	}

	/// Wire format of API and token responses.
	pub fn format(&self) -> WireFormat {
		self.format
	}

	/// Resolves `uri` against the API base URL; absolute URIs are kept as-is.
	///
	/// Relative paths extend the base path (`/users` under `https://api/v2/` is
	/// `https://api/v2/users`).
	pub fn resolve(&self, uri: &str) -> Result<Url, ConfigError> {
		resolve_against(&self.api_base_url, "request", uri)
	}
}

/// Builder for [`ClientConfig`].
#[derive(Clone, Debug)]
pub struct ClientConfigBuilder {
	name: String,
	api_base_url: Option<Url>,
	client_id: Option<String>,
	client_secret: Option<ClientSecret>,
	token_endpoint: Option<String>,
	format: WireFormat,
}
impl ClientConfigBuilder {
	/// Creates a builder seeded with the configuration name.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			api_base_url: None,
			client_id: None,
			client_secret: None,
			token_endpoint: None,
			format: WireFormat::default(),
		}
	}

	/// Sets the API base URL.
	pub fn api_base_url(mut self, url: Url) -> Self {
		self.api_base_url = Some(url);

		self
	}

	/// Sets the OAuth client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the OAuth client secret.
	pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
		self.client_secret = Some(ClientSecret::new(client_secret.into()));

		self
	}

	/// Sets the token endpoint, absolute or relative to the API base URL.
	pub fn token_endpoint(mut self, uri: impl Into<String>) -> Self {
		self.token_endpoint = Some(uri.into());

		self
	}

	/// Overrides the wire format (defaults to JSON).
	pub fn format(mut self, format: WireFormat) -> Self {
		self.format = format;

		self
	}

	/// Validates the inputs and produces the configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let name = ClientName::new(&self.name)?;
		let api_base_url = normalize_base(self.api_base_url.ok_or(ConfigError::MissingBaseUrl)?)?;
		let client_id = self
			.client_id
			.filter(|id| !id.trim().is_empty())
			.ok_or(ConfigError::MissingClientId)?;
		let token_endpoint = self.token_endpoint.ok_or(ConfigError::MissingTokenEndpoint)?;
		let token_endpoint = resolve_against(&api_base_url, "token endpoint", &token_endpoint)?;

		Ok(ClientConfig {
			name,
			api_base_url,
			client_id: ClientId::new(client_id),
			client_secret: self.client_secret,
			token_endpoint,
			format: self.format,
		})
	}
}

fn normalize_base(mut url: Url) -> Result<Url, ConfigError> {
	ensure_http_scheme("API base", &url)?;

	if url.cannot_be_a_base() {
		return Err(ConfigError::CannotBeABase { url: url.to_string() });
	}
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	Ok(url)
}

fn resolve_against(base: &Url, field: &'static str, uri: &str) -> Result<Url, ConfigError> {
	let resolved = match Url::parse(uri) {
		Ok(url) => url,
		Err(url::ParseError::RelativeUrlWithoutBase) => base
			.join(uri.trim_start_matches('/'))
			.map_err(|source| ConfigError::InvalidUrl { field, source })?,
		Err(source) => return Err(ConfigError::InvalidUrl { field, source }),
	};

	ensure_http_scheme(field, &resolved)?;

	Ok(resolved)
}

fn ensure_http_scheme(field: &'static str, url: &Url) -> Result<(), ConfigError> {
	if matches!(url.scheme(), "http" | "https") {
		Ok(())
	} else {
		Err(ConfigError::UnsupportedScheme { field, url: url.to_string() })
	}
}
