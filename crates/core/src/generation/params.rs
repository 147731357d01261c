//! Parameter change detection.
//!
//! Decides whether a new request supersedes the one currently being polled.
//! Only the parameters that shape the generated artifact take part: prompt,
//! schemas, variants, steps and the caller id. The advisory model does not.

use super::requests::GenerationRequest;

/// Returns true if `next` must start a new polling cycle.
///
/// Schemas are compared by their serialized JSON Schema text, so distinct
/// schema values that serialize identically are equal. A schema compared
/// against no schema is always a change. Sequences compare in order, and
/// duplicates count.
///
/// # Examples
///
/// ```
/// use shaper_core::generation::{has_changed, GenerationRequest};
///
/// let a = GenerationRequest::new("Build a login form");
/// assert!(has_changed(None, &a));
/// assert!(!has_changed(Some(&a), &a.clone()));
/// assert!(has_changed(Some(&a), &a.clone().with_id("retry-1")));
/// ```
pub fn has_changed(previous: Option<&GenerationRequest>, next: &GenerationRequest) -> bool {
    let Some(previous) = previous else {
        return true;
    };

    previous.prompt != next.prompt
        || previous.id != next.id
        || !schemas_equal(
            previous.schema_json.as_deref(),
            next.schema_json.as_deref(),
        )
        || !schemas_equal(
            previous.extend_schema_json.as_deref(),
            next.extend_schema_json.as_deref(),
        )
        || previous.variants != next.variants
        || previous.steps != next.steps
}

/// Compare two serialized schemas.
///
/// Both sides are re-parsed so that whitespace differences do not count as a
/// change. Text that does not parse is compared verbatim.
pub fn schemas_equal(previous: Option<&str>, next: Option<&str>) -> bool {
    match (previous, next) {
        (None, None) => true,
        (Some(a), Some(b)) if a == b => true,
        (Some(a), Some(b)) => {
            match (
                serde_json::from_str::<serde_json::Value>(a),
                serde_json::from_str::<serde_json::Value>(b),
            ) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde_json::json;

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct Contact {
        name: String,
        email: Option<String>,
    }

    fn base() -> GenerationRequest {
        GenerationRequest::new("Build a login form")
            .with_variants(["dark", "light"])
            .with_steps(["add a logo"])
    }

    #[test]
    fn test_no_previous_is_changed() {
        assert!(has_changed(None, &base()));
    }

    #[test]
    fn test_identical_requests_unchanged() {
        assert!(!has_changed(Some(&base()), &base()));
    }

    #[test]
    fn test_prompt_change() {
        let next = GenerationRequest {
            prompt: "Build a signup form".to_string(),
            ..base()
        };
        assert!(has_changed(Some(&base()), &next));
    }

    #[test]
    fn test_id_change_forces_new_cycle() {
        assert!(has_changed(Some(&base()), &base().with_id("retry")));
    }

    #[test]
    fn test_variant_order_matters() {
        let next = base().with_variants(["light", "dark"]);
        assert!(has_changed(Some(&base()), &next));
    }

    #[test]
    fn test_duplicate_steps_matter() {
        let next = base().with_steps(["add a logo", "add a logo"]);
        assert!(has_changed(Some(&base()), &next));
    }

    #[test]
    fn test_empty_list_differs_from_absent() {
        let previous = GenerationRequest::new("Form");
        let next = GenerationRequest::new("Form").with_variants(Vec::<String>::new());
        assert!(has_changed(Some(&previous), &next));
    }

    #[test]
    fn test_model_is_ignored() {
        let next = base().with_model("another-model");
        assert!(!has_changed(Some(&base()), &next));
    }

    #[test]
    fn test_distinct_schema_values_with_same_json_are_equal() {
        let a = json!({ "type": "object", "properties": { "email": { "type": "string" } } });
        let b = json!({ "properties": { "email": { "type": "string" } }, "type": "object" });
        let previous = base().with_schema(&a);
        let next = base().with_schema(&b);
        assert!(!has_changed(Some(&previous), &next));
    }

    #[test]
    fn test_typed_schemas_from_separate_generations_are_equal() {
        let previous = base().with_schema_for::<Contact>();
        let next = base().with_schema_for::<Contact>();
        assert!(!has_changed(Some(&previous), &next));
    }

    #[test]
    fn test_schema_against_no_schema_is_changed() {
        let previous = base().with_schema(&json!({ "type": "object" }));
        assert!(has_changed(Some(&previous), &base()));
        assert!(has_changed(Some(&base()), &previous));
    }

    #[test]
    fn test_schemas_equal_ignores_whitespace() {
        assert!(schemas_equal(
            Some(r#"{"type":"object"}"#),
            Some(r#"{ "type": "object" }"#)
        ));
        assert!(!schemas_equal(Some("{bad"), Some("{bad ")));
        assert!(schemas_equal(None, None));
    }
}
