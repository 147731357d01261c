//! Ready-made component kinds built on top of [`GenerationRequest`].
//!
//! Each preset fixes the prompt wording, wraps the caller's schema in the
//! shape the generated component expects, and supplies the initial state the
//! frame receives with `INIT`.

use schemars::JsonSchema;
use serde_json::{json, Map, Value};

use super::requests::GenerationRequest;
use crate::frame::FrameProps;

/// Message type a generated form posts when it is submitted.
pub const FORM_SUBMIT: &str = "FORM_SUBMIT";

/// Payload of a form submission, if `kind` is one.
pub fn form_submission<'a>(kind: &str, data: &'a Value) -> Option<&'a Value> {
    (kind == FORM_SUBMIT).then_some(data)
}

/// JSON Schema of `T` as a value, for the presets' `with_schema`.
pub fn schema_value_for<T: JsonSchema>() -> Value {
    schemars::schema_for!(T).as_value().clone()
}

/// A preset component.
pub trait Preset {
    /// The generation request this preset stands for.
    fn request(&self) -> GenerationRequest;

    /// Initial state sent to the frame.
    fn init_state(&self) -> Value {
        Value::Null
    }

    /// Class name of the embedding element.
    fn class_name(&self) -> Option<String> {
        None
    }

    /// Everything an embedding needs, ready for [`FrameProps::should_rerender`].
    fn props(&self) -> FrameProps {
        FrameProps {
            class_name: self.class_name(),
            init_state: self.init_state(),
            ..FrameProps::new(self.request())
        }
    }
}

/// Options every preset accepts.
#[derive(Debug, Clone, Default, PartialEq)]
struct Common {
    transformations: Vec<String>,
    locale: Option<String>,
}

impl Common {
    fn apply(&self, mut request: GenerationRequest) -> GenerationRequest {
        if !self.transformations.is_empty() {
            request = request.with_steps(self.transformations.iter().cloned());
        }
        if let Some(locale) = &self.locale {
            request = request.with_variants([locale.clone()]);
        }
        request
    }
}

/// Wrap `schema` as the `data` property of an object schema.
fn data_schema(schema: &Value) -> Value {
    json!({
        "type": "object",
        "properties": { "data": schema },
        "required": ["data"]
    })
}

macro_rules! common_builders {
    () => {
        /// Revision steps applied after the first generation.
        pub fn with_transformations<I, S>(mut self, transformations: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.common.transformations = transformations.into_iter().map(Into::into).collect();
            self
        }

        /// Locale, sent as the only variant.
        pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
            self.common.locale = Some(locale.into());
            self
        }
    };
}

/// A form for some subject, optionally bound to a data schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPreset {
    subject: String,
    description: Option<String>,
    schema: Option<Value>,
    method: Option<String>,
    action: Option<String>,
    common: Common,
}

impl FormPreset {
    /// A form "for" `subject`, e.g. "user signup".
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            description: None,
            schema: None,
            method: None,
            action: None,
            common: Common::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Schema of the submitted data.
    pub fn with_schema(mut self, schema: &Value) -> Self {
        self.schema = Some(schema.clone());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    common_builders!();

    pub fn prompt(&self) -> String {
        match &self.description {
            Some(description) => format!(
                "Create a form for {} and the following description {}",
                self.subject, description
            ),
            None => format!("Create a form for {}", self.subject),
        }
    }

    fn base_schema(&self) -> Value {
        let on_submit = json!({ "description": "onForm submit" });
        match &self.schema {
            Some(schema) => json!({
                "type": "object",
                "properties": { "onSubmit": on_submit, "schema": schema },
                "required": ["schema"]
            }),
            None => json!({
                "type": "object",
                "properties": {
                    "schema": { "not": {}, "description": "form schema" },
                    "props": {
                        "type": "object",
                        "description": "form props",
                        "properties": {
                            "onSubmit": on_submit,
                            "method": { "type": "string", "description": "form submit method" },
                            "action": { "type": "string", "description": "form submit action" }
                        }
                    }
                },
                "required": ["props"]
            }),
        }
    }
}

impl Preset for FormPreset {
    fn request(&self) -> GenerationRequest {
        self.common
            .apply(GenerationRequest::new(self.prompt()).with_schema(&self.base_schema()))
    }

    fn init_state(&self) -> Value {
        let mut state = Map::new();
        if let Some(method) = &self.method {
            state.insert("method".to_string(), json!(method));
        }
        if let Some(action) = &self.action {
            state.insert("action".to_string(), json!(action));
        }
        Value::Object(state)
    }
}

/// A chart over data described by a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPreset {
    schema: Value,
    data: Value,
    common: Common,
}

impl ChartPreset {
    pub const PROMPT: &'static str = "Generate a chart for the defined schema.";

    pub fn new(schema: &Value, data: Value) -> Self {
        Self {
            schema: schema.clone(),
            data,
            common: Common::default(),
        }
    }

    common_builders!();
}

impl Preset for ChartPreset {
    fn request(&self) -> GenerationRequest {
        self.common
            .apply(GenerationRequest::new(Self::PROMPT).with_schema(&data_schema(&self.schema)))
    }

    fn init_state(&self) -> Value {
        json!({ "data": self.data })
    }
}

/// An admin panel over data described by a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminPanelPreset {
    description: Option<String>,
    schema: Value,
    data: Value,
    common: Common,
}

impl AdminPanelPreset {
    pub fn new(schema: &Value) -> Self {
        Self {
            description: None,
            schema: schema.clone(),
            data: Value::Null,
            common: Common::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    common_builders!();

    pub fn prompt(&self) -> String {
        match &self.description {
            Some(description) => format!(
                "Generate an admin panel with the following description: {}",
                description
            ),
            None => "Generate an admin panel".to_string(),
        }
    }
}

impl Preset for AdminPanelPreset {
    fn request(&self) -> GenerationRequest {
        self.common
            .apply(GenerationRequest::new(self.prompt()).with_schema(&data_schema(&self.schema)))
    }

    fn init_state(&self) -> Value {
        json!({ "data": self.data })
    }
}

/// A free-form component: the description is the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptivePreset {
    description: String,
    schema: Option<Value>,
    class_name: Option<String>,
    common: Common,
}

impl AdaptivePreset {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            schema: None,
            class_name: None,
            common: Common::default(),
        }
    }

    pub fn with_schema(mut self, schema: &Value) -> Self {
        self.schema = Some(schema.clone());
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    common_builders!();
}

impl Preset for AdaptivePreset {
    fn request(&self) -> GenerationRequest {
        let mut request = GenerationRequest::new(&self.description);
        if let Some(schema) = &self.schema {
            request = request.with_schema(schema);
        }
        self.common.apply(request)
    }

    fn class_name(&self) -> Option<String> {
        self.class_name.clone()
    }
}
