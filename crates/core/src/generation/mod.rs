mod codec;
mod error;
mod params;
mod presets;
mod requests;
mod types;

pub use codec::{decode, encode, is_json_content_type, status_line};
pub use error::CodecError;
pub use params::{has_changed, schemas_equal};
pub use presets::{
    form_submission, schema_value_for, AdaptivePreset, AdminPanelPreset, ChartPreset, FormPreset,
    Preset, FORM_SUBMIT,
};
pub use requests::{
    schema_json_for, ActionResponse, ErrorBody, GenerationRequest, SchemaRef, WireRequest,
};
pub use types::{
    ClientState, ErrorRecord, GenerationRecord, GenerationStatus, PROMPT_FAILED, PROMPT_MISSING,
    REQUEST_FAILED, UNKNOWN_STATE,
};
