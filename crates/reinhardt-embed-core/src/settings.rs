//! Embedding settings
//!
//! Settings are plain serde structs, so they can live in the same TOML file as
//! the rest of the project configuration:
//!
//! ```toml
//! [embed]
//! query_param = "embed"
//! max_depth = 5
//! concurrent_items = true
//! request_timeout_secs = 10
//! ```

use crate::exception::{EmbedError, EmbedResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_query_param() -> String {
	"embed".to_string()
}

fn default_request_timeout_secs() -> u64 {
	30
}

fn default_method() -> String {
	"GET".to_string()
}

/// Settings shared by every serializer of a request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedSettings {
	/// Name of the repeatable query parameter holding embed paths
	#[serde(default = "default_query_param")]
	pub query_param: String,

	/// Maximum nesting depth of embedded serializers, unlimited when unset
	///
	/// Every nesting level consumes one segment of an embed path, so
	/// recursion always ends; the limit only caps how long a path may be.
	pub max_depth: Option<usize>,

	/// Render list items concurrently (output order is preserved)
	pub concurrent_items: bool,

	/// Timeout applied by the HTTP transport to each remote call
	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,

	/// HTTP method used by remote fields that do not declare one
	#[serde(default = "default_method")]
	pub default_method: String,
}

impl Default for EmbedSettings {
	fn default() -> Self {
		Self {
			query_param: default_query_param(),
			max_depth: None,
			concurrent_items: false,
			request_timeout_secs: default_request_timeout_secs(),
			default_method: default_method(),
		}
	}
}

/// Wrapper used to read the `[embed]` table of a settings file
#[derive(Deserialize)]
struct SettingsFile {
	#[serde(default)]
	embed: Option<EmbedSettings>,
}

impl EmbedSettings {
	/// Parse settings from TOML
	///
	/// Accepts either a document with an `[embed]` table or the bare keys.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_embed_core::EmbedSettings;
	///
	/// let settings = EmbedSettings::from_toml_str("[embed]\nmax_depth = 3\n").unwrap();
	/// assert_eq!(settings.max_depth, Some(3));
	/// assert_eq!(settings.query_param, "embed");
	/// ```
	pub fn from_toml_str(content: &str) -> EmbedResult<Self> {
		let table: toml::Table = toml::from_str(content)
			.map_err(|e| EmbedError::configuration(format!("Invalid settings: {}", e)))?;
		let has_embed_table = table.contains_key("embed");
		let value = toml::Value::Table(table);
		let settings = if has_embed_table {
			let file: SettingsFile = value
				.try_into()
				.map_err(|e| EmbedError::configuration(format!("Invalid settings: {}", e)))?;
			file.embed.unwrap_or_default()
		} else {
			value
				.try_into()
				.map_err(|e| EmbedError::configuration(format!("Invalid settings: {}", e)))?
		};
		settings.validate()?;
		Ok(settings)
	}

	/// Validate values that serde cannot check on its own
	pub fn validate(&self) -> EmbedResult<()> {
		if self.query_param.is_empty() {
			return Err(EmbedError::configuration("query_param must not be empty"));
		}
		if self.max_depth == Some(0) {
			return Err(EmbedError::configuration("max_depth must be at least 1"));
		}
		http::Method::from_bytes(self.default_method.to_ascii_uppercase().as_bytes())?;
		Ok(())
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}

	pub fn with_max_depth(mut self, max_depth: usize) -> Self {
		self.max_depth = Some(max_depth);
		self
	}

	pub fn with_concurrent_items(mut self, concurrent: bool) -> Self {
		self.concurrent_items = concurrent;
		self
	}

	pub fn with_query_param(mut self, name: impl Into<String>) -> Self {
		self.query_param = name.into();
		self
	}
}
