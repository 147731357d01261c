//! Request types for the generation API.
//!
//! [`GenerationRequest`] is what the caller asks for. [`WireRequest`] is the JSON
//! body that actually goes to the API (or to a server action). Following the
//! Functional Core pattern, these are pure data types with no I/O.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{ErrorRecord, GenerationRecord};

/// The caller's declared intent for one generation job.
///
/// Schemas are stored in serialized form so that two schema objects producing
/// the same JSON Schema text compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub schema_json: Option<String>,
    pub extend_schema_json: Option<String>,
    pub variants: Option<Vec<String>>,
    pub steps: Option<Vec<String>>,
    pub id: Option<String>,
    /// Advisory model identifier, forwarded as-is.
    pub model: Option<String>,
}

impl GenerationRequest {
    /// Create a request with just a prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Set the base schema from a JSON Schema document.
    pub fn with_schema(mut self, schema: &serde_json::Value) -> Self {
        self.schema_json = Some(schema.to_string());
        self
    }

    /// Set the base schema to the JSON Schema of `T`.
    pub fn with_schema_for<T: JsonSchema>(mut self) -> Self {
        self.schema_json = Some(schema_json_for::<T>());
        self
    }

    /// Set the schema used to extend an existing component.
    pub fn with_extend_schema(mut self, schema: &serde_json::Value) -> Self {
        self.extend_schema_json = Some(schema.to_string());
        self
    }

    /// Set the variant list.
    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = Some(variants.into_iter().map(Into::into).collect());
        self
    }

    /// Set the revision steps.
    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps = Some(steps.into_iter().map(Into::into).collect());
        self
    }

    /// Set the caller-assigned correlation id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the advisory model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Returns true if the prompt is empty or whitespace.
    pub fn is_prompt_missing(&self) -> bool {
        self.prompt.trim().is_empty()
    }
}

/// Serialize the JSON Schema of `T`.
pub fn schema_json_for<T: JsonSchema>() -> String {
    schemars::schema_for!(T).as_value().to_string()
}

/// Schema wrapper as it appears on the wire: `{"schema": "<json schema text>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRef {
    pub schema: String,
}

/// JSON body sent to the generation API.
///
/// Absent fields are omitted rather than sent as `null`, since the API treats
/// an explicit `null` as an override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<SchemaRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extend: Option<SchemaRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl WireRequest {
    /// Build the initial wire body for a request.
    pub fn from_request(request: &GenerationRequest) -> Self {
        Self {
            prompt: request.prompt.clone(),
            base: request
                .schema_json
                .clone()
                .map(|schema| SchemaRef { schema }),
            extend: request
                .extend_schema_json
                .clone()
                .map(|schema| SchemaRef { schema }),
            variants: request.variants.clone(),
            steps: request.steps.clone(),
            id: request.id.clone(),
            model: request.model.clone(),
        }
    }

    /// Build the status-refresh body for a job the API already created.
    ///
    /// The API returns the current status for a known id instead of starting
    /// another job.
    pub fn refresh(&self, job_id: impl Into<String>) -> Self {
        Self {
            id: Some(job_id.into()),
            ..self.clone()
        }
    }
}

impl From<&GenerationRequest> for WireRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self::from_request(request)
    }
}

/// Error body of the tagged error form: `{"error": {"message": ..., "status": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// What a server action returns, discriminated by the presence of `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionResponse {
    Failure { error: ErrorBody },
    Success(GenerationRecord),
}

impl ActionResponse {
    /// Resolve into a record or an error. Server actions have no HTTP status,
    /// so the error never carries one.
    pub fn into_result(self) -> Result<GenerationRecord, ErrorRecord> {
        match self {
            ActionResponse::Success(record) => Ok(record),
            ActionResponse::Failure { error } => Err(ErrorRecord::new(
                error
                    .message
                    .unwrap_or_else(|| super::types::REQUEST_FAILED.to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationStatus;
    use serde_json::json;

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct LoginForm {
        email: String,
        remember_me: bool,
    }

    #[test]
    fn test_wire_request_omits_absent_fields() {
        let wire = WireRequest::from_request(&GenerationRequest::new("Build a login form"));
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(value, json!({ "prompt": "Build a login form" }));
    }

    #[test]
    fn test_wire_request_nests_schemas() {
        let schema = json!({ "type": "object" });
        let request = GenerationRequest::new("Form")
            .with_schema(&schema)
            .with_extend_schema(&schema)
            .with_variants(["dark", "compact"])
            .with_steps(["make it blue"]);

        let value = serde_json::to_value(WireRequest::from(&request)).unwrap();
        assert_eq!(value["base"]["schema"], json!(r#"{"type":"object"}"#));
        assert_eq!(value["extend"]["schema"], json!(r#"{"type":"object"}"#));
        assert_eq!(value["variants"], json!(["dark", "compact"]));
        assert_eq!(value["steps"], json!(["make it blue"]));
    }

    #[test]
    fn test_refresh_keeps_body_and_sets_job_id() {
        let wire = WireRequest::from_request(&GenerationRequest::new("Form").with_id("mine"));
        let refreshed = wire.refresh("x1");
        assert_eq!(refreshed.id.as_deref(), Some("x1"));
        assert_eq!(refreshed.prompt, "Form");
    }

    #[test]
    fn test_schema_for_type_is_stable() {
        let a = GenerationRequest::new("Form").with_schema_for::<LoginForm>();
        let b = GenerationRequest::new("Form").with_schema_for::<LoginForm>();
        assert_eq!(a.schema_json, b.schema_json);
        assert!(a.schema_json.unwrap().contains("remember_me"));
    }

    #[test]
    fn test_prompt_missing() {
        assert!(GenerationRequest::new("").is_prompt_missing());
        assert!(GenerationRequest::new("   ").is_prompt_missing());
        assert!(!GenerationRequest::new("Form").is_prompt_missing());
    }

    #[test]
    fn test_action_response_discriminates_on_error_key() {
        let failure: ActionResponse =
            serde_json::from_value(json!({ "error": { "message": "quota", "status": 429 } }))
                .unwrap();
        let err = failure.into_result().unwrap_err();
        assert_eq!(err.message, "quota");
        assert_eq!(err.status, None);

        let success: ActionResponse =
            serde_json::from_value(json!({ "id": "x1", "url": "https://cdn/x1", "status": "ready" }))
                .unwrap();
        let record = success.into_result().unwrap();
        assert_eq!(record.status, GenerationStatus::Completed);
    }
}
