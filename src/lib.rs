//! OAuth 2.0 client-side token orchestration: pick the bearer for every outgoing API call,
//! acquire one when it is missing, and recover from expired credentials with a bounded
//! refresh-and-retry protocol.
//!
//! The [`orchestrator::Orchestrator`] classifies each [`request::Request`], resolves a token through
//! its [`cache::TokenCache`] (backed by a pluggable [`store::TokenStore`]), hands the wire request to
//! an [`http::HttpTransport`], and decodes the body through a [`codec::Codec`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod orchestrator;
pub mod request;
pub mod store;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::Hash,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use oauth2::http::{HeaderMap, HeaderName, HeaderValue, Method};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
