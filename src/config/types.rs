use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for one competition.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AwdConfig {
    /// Scoring server, host or full URL.
    pub server: String,
    /// Explicit scoring-server port; 80/443 are left implicit.
    #[serde(default)]
    pub port: Option<u16>,
    /// Headers merged into every submission request (auth token, match id).
    #[serde(default)]
    pub auth_headers: HashMap<String, String>,
    /// Global flag-submission template.
    pub submit: FlagSubmitConfig,
    /// Per-subject values referenced by `once` template fields.
    #[serde(default)]
    pub subjects: HashMap<String, SubjectEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SubjectEntry {
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct FlagSubmitConfig {
    /// Endpoint path appended to the normalized base URL.
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
    /// Send the body form-encoded instead of JSON.
    #[serde(default)]
    pub use_form: bool,
    /// Ordered field specifications merged into each submission.
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One templated submission field.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub part: FieldPart,
    /// Location tag string: any combination of `h` (header), `d` (body
    /// data), `p` (query param).
    pub location: String,
    /// Static default, only meaningful for `base` fields.
    #[serde(default)]
    pub value: Option<String>,
}

/// Valid markers for [`FieldSpec::location`].
pub const LOCATION_MARKERS: &str = "hdp";

impl FieldSpec {
    pub fn in_header(&self) -> bool {
        self.location.contains('h')
    }

    pub fn in_data(&self) -> bool {
        self.location.contains('d')
    }

    pub fn in_param(&self) -> bool {
        self.location.contains('p')
    }
}

/// Which layer of the submission template a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldPart {
    /// Static defaults shared by every submission.
    Base,
    /// Resolved per submission from the harvested flag or the subject
    /// entry.
    Once,
}
