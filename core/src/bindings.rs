//! Wire shapes of the story-schematics API and their validation rules.
//!
//! # Design
//! Every entity, form and parameter set is a plain serde struct carrying
//! `validator` constraints. Decoding is two steps: `serde_json` checks the
//! structure (UUIDs, language codes, ISO-8601 timestamps coerced to
//! `DateTime<Utc>`), then `Validate` checks the bounds. `parse` and
//! `parse_list` run both and are the only way response bodies enter the
//! crate.
//!
//! Field names follow the service's JSON exactly (`loglineID`, `createdAt`,
//! ...), so renames are spelled out instead of relying on `rename_all`.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::SchemaError;

/// URL-safe slug: lowercase alphanumerics separated by single dashes.
pub static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug pattern compiles"));

/// Language of a generated or stored document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Fr,
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A single unit of a story, representing an action through a sequence of
/// scenes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct Beat {
    /// Identifier of the beat within its story plan.
    #[validate(length(min = 1, max = 128))]
    pub key: String,
    #[validate(length(min = 1, max = 512))]
    pub title: String,
    #[validate(length(min = 1, max = 16384))]
    pub content: String,
}

/// An ordered outline of a story, one beat per story plan entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct BeatsSheet {
    pub id: Uuid,
    #[serde(rename = "loglineID")]
    pub logline_id: Uuid,
    #[serde(rename = "storyPlanID")]
    pub story_plan_id: Uuid,
    pub lang: Lang,
    #[validate(length(min = 1, max = 128), nested)]
    pub content: Vec<Beat>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// An unsaved beats sheet, as returned by the generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct BeatsSheetIdea {
    pub lang: Lang,
    #[validate(length(min = 1, max = 128), nested)]
    pub content: Vec<Beat>,
}

/// Projection of a beats sheet used by list results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct BeatsSheetPreview {
    pub id: Uuid,
    pub lang: Lang,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A brief summary of a story, used to quickly convey its essence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct Logline {
    pub id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 1024), regex(path = *SLUG_PATTERN))]
    pub slug: String,
    pub lang: Lang,
    #[validate(length(min = 1, max = 512))]
    pub name: String,
    #[validate(length(min = 1, max = 16384))]
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct LoglinePreview {
    #[validate(length(min = 1, max = 1024), regex(path = *SLUG_PATTERN))]
    pub slug: String,
    pub lang: Lang,
    #[validate(length(min = 1, max = 512))]
    pub name: String,
    #[validate(length(min = 1, max = 16384))]
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// An unsaved logline. Produced by the generator and accepted (and
/// returned) by the expand operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct LoglineIdea {
    pub lang: Lang,
    #[validate(length(min = 1, max = 512))]
    pub name: String,
    #[validate(length(min = 1, max = 16384))]
    pub content: String,
}

/// Expected shape of one beat in a story plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[validate(schema(function = "validate_scene_range"))]
pub struct BeatDefinition {
    #[validate(length(min = 1, max = 128))]
    pub key: String,
    #[validate(length(min = 1, max = 512))]
    pub name: String,
    #[serde(rename = "keyPoints")]
    #[validate(length(min = 1, max = 128), custom(function = "validate_key_points"))]
    pub key_points: Vec<String>,
    #[validate(length(min = 1, max = 8192))]
    pub purpose: String,
    #[serde(rename = "minScenes")]
    #[validate(range(min = 0, max = 10))]
    pub min_scenes: i32,
    #[serde(rename = "maxScenes")]
    #[validate(range(min = 0, max = 10))]
    pub max_scenes: i32,
}

/// A template describing the beats a story must go through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct StoryPlan {
    pub id: Uuid,
    #[validate(length(min = 1, max = 1024), regex(path = *SLUG_PATTERN))]
    pub slug: String,
    pub lang: Lang,
    #[validate(length(min = 1, max = 512))]
    pub name: String,
    #[validate(length(min = 1, max = 4096))]
    pub description: String,
    #[validate(length(min = 1, max = 128), nested)]
    pub beats: Vec<BeatDefinition>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct StoryPlanPreview {
    pub id: Uuid,
    #[validate(length(min = 1, max = 1024), regex(path = *SLUG_PATTERN))]
    pub slug: String,
    pub lang: Lang,
    #[validate(length(min = 1, max = 512))]
    pub name: String,
    #[validate(length(min = 1, max = 4096))]
    pub description: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct CreateBeatsSheetForm {
    pub lang: Lang,
    #[serde(rename = "loglineID")]
    pub logline_id: Uuid,
    #[serde(rename = "storyPlanID")]
    pub story_plan_id: Uuid,
    #[validate(length(min = 1, max = 128), nested)]
    pub content: Vec<Beat>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct GenerateBeatsSheetForm {
    pub lang: Lang,
    #[serde(rename = "loglineID")]
    pub logline_id: Uuid,
    #[serde(rename = "storyPlanID")]
    pub story_plan_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct RegenerateBeatForm {
    #[serde(rename = "beatsSheetID")]
    pub beats_sheet_id: Uuid,
    /// Keys of the beats to rewrite. The others are kept as-is.
    #[serde(rename = "regenerateKeys")]
    #[validate(custom(function = "validate_beat_keys"))]
    pub regenerate_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ExpandBeatForm {
    #[serde(rename = "beatsSheetID")]
    pub beats_sheet_id: Uuid,
    #[serde(rename = "targetKey")]
    #[validate(length(min = 1, max = 128))]
    pub target_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct CreateLoglineForm {
    #[validate(length(min = 1, max = 1024), regex(path = *SLUG_PATTERN))]
    pub slug: String,
    pub lang: Lang,
    #[validate(length(min = 1, max = 512))]
    pub name: String,
    #[validate(length(min = 1, max = 16384))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct GenerateLoglinesForm {
    pub lang: Lang,
    #[validate(range(min = 1, max = 10))]
    pub count: u32,
    #[validate(length(min = 1, max = 16384))]
    pub theme: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct CreateStoryPlanForm {
    #[validate(length(min = 1, max = 1024), regex(path = *SLUG_PATTERN))]
    pub slug: String,
    pub lang: Lang,
    #[validate(length(min = 1, max = 512))]
    pub name: String,
    #[validate(length(min = 1, max = 4096))]
    pub description: String,
    #[validate(length(min = 1, max = 128), nested)]
    pub beats: Vec<BeatDefinition>,
}

/// Replaces the story plan identified by `slug`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct UpdateStoryPlanForm {
    #[validate(length(min = 1, max = 1024), regex(path = *SLUG_PATTERN))]
    pub slug: String,
    pub lang: Lang,
    #[validate(length(min = 1, max = 512))]
    pub name: String,
    #[validate(length(min = 1, max = 4096))]
    pub description: String,
    #[validate(length(min = 1, max = 128), nested)]
    pub beats: Vec<BeatDefinition>,
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct GetBeatsSheetParams {
    #[serde(rename = "beatsSheetID")]
    pub beats_sheet_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct GetAllBeatsSheetsParams {
    #[serde(rename = "loglineID")]
    pub logline_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Looks a logline up by id or by slug. At least one should be set for the
/// lookup to mean anything; the server decides when both are.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct GetLoglineParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 1024), regex(path = *SLUG_PATTERN))]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct GetAllLoglinesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct GetStoryPlanParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 1024), regex(path = *SLUG_PATTERN))]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct GetAllStoryPlansParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

// ---------------------------------------------------------------------------
// Custom rules
// ---------------------------------------------------------------------------

fn validate_scene_range(definition: &BeatDefinition) -> Result<(), ValidationError> {
    if definition.min_scenes <= definition.max_scenes {
        return Ok(());
    }
    Err(ValidationError::new("scene_range")
        .with_message(Cow::Borrowed("minScenes must not exceed maxScenes")))
}

fn validate_key_points(points: &[String]) -> Result<(), ValidationError> {
    check_each_len(points, 512, "key_point_length")
}

fn validate_beat_keys(keys: &[String]) -> Result<(), ValidationError> {
    check_each_len(keys, 128, "beat_key_length")
}

fn check_each_len(values: &[String], max: usize, code: &'static str) -> Result<(), ValidationError> {
    let valid = values.iter().all(|v| {
        let len = v.chars().count();
        (1..=max).contains(&len)
    });
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new(code))
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode and validate a single JSON document.
pub fn parse<T>(body: &str) -> Result<T, SchemaError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_str(body)?;
    check::<T>(&value)?;
    Ok(value)
}

/// Decode and validate a JSON array, checking every element.
pub fn parse_list<T>(body: &str) -> Result<Vec<T>, SchemaError>
where
    T: DeserializeOwned + Validate,
{
    let values: Vec<T> = serde_json::from_str(body)?;
    for value in &values {
        check::<T>(value)?;
    }
    Ok(values)
}

/// Run the validation rules of `value`, naming the offending type on error.
pub fn check<T: Validate>(value: &T) -> Result<(), SchemaError> {
    value.validate().map_err(|errors| SchemaError::Invalid {
        entity: short_type_name::<T>(),
        errors,
    })
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "29f71c01-5ae1-4b01-b729-e17488538e15";

    fn beat_definition(min_scenes: i32, max_scenes: i32) -> BeatDefinition {
        BeatDefinition {
            key: "setup".to_string(),
            name: "Setup".to_string(),
            key_points: vec!["Introduce the hero".to_string()],
            purpose: "Ground the reader".to_string(),
            min_scenes,
            max_scenes,
        }
    }

    #[test]
    fn beats_sheet_coerces_created_at() {
        let body = format!(
            r#"{{"id":"{ID}","loglineID":"{ID}","storyPlanID":"{ID}","lang":"en",
            "content":[{{"key":"beat-1","title":"Introduction","content":"The protagonist is introduced."}}],
            "createdAt":"2022-01-01T00:00:00Z"}}"#
        );
        let sheet: BeatsSheet = parse(&body).unwrap();
        assert_eq!(sheet.created_at.to_rfc3339(), "2022-01-01T00:00:00+00:00");
        assert_eq!(sheet.lang, Lang::En);
        assert_eq!(sheet.content[0].key, "beat-1");
    }

    #[test]
    fn beats_sheet_rejects_empty_content() {
        let body = format!(
            r#"{{"id":"{ID}","loglineID":"{ID}","storyPlanID":"{ID}","lang":"en","content":[],
            "createdAt":"2022-01-01T00:00:00Z"}}"#
        );
        let err = parse::<BeatsSheet>(&body).unwrap_err();
        assert!(matches!(err, SchemaError::Invalid { entity: "BeatsSheet", .. }));
    }

    #[test]
    fn malformed_uuid_is_a_json_error() {
        let body = r#"{"id":"nope","lang":"en","createdAt":"2022-01-01T00:00:00Z"}"#;
        let err = parse::<BeatsSheetPreview>(body).unwrap_err();
        assert!(matches!(err, SchemaError::Json(_)));
    }

    #[test]
    fn unknown_lang_is_rejected() {
        let body = format!(r#"{{"id":"{ID}","lang":"de","createdAt":"2022-01-01T00:00:00Z"}}"#);
        assert!(parse::<BeatsSheetPreview>(&body).is_err());
    }

    #[test]
    fn slug_pattern() {
        for ok in ["a", "the-hero", "act-2-finale"] {
            assert!(SLUG_PATTERN.is_match(ok), "{ok}");
        }
        for bad in ["", "-lead", "trail-", "double--dash", "Upper", "space here"] {
            assert!(!SLUG_PATTERN.is_match(bad), "{bad}");
        }
    }

    #[test]
    fn scene_range_refinement() {
        assert!(check(&beat_definition(1, 3)).is_ok());
        assert!(check(&beat_definition(2, 2)).is_ok());
        assert!(check(&beat_definition(4, 3)).is_err());
        assert!(check(&beat_definition(0, 11)).is_err());
    }

    #[test]
    fn key_points_are_checked_individually() {
        let mut definition = beat_definition(0, 1);
        definition.key_points.push(String::new());
        assert!(check(&definition).is_err());
    }

    #[test]
    fn optional_params_validate_only_when_present() {
        assert!(check(&GetLoglineParams::default()).is_ok());
        let bad = GetLoglineParams {
            id: None,
            slug: Some("Not A Slug".to_string()),
        };
        assert!(check(&bad).is_err());

        assert!(check(&GetAllLoglinesParams { limit: None, offset: Some(7) }).is_ok());
        assert!(check(&GetAllLoglinesParams { limit: Some(0), offset: None }).is_err());
        assert!(check(&GetAllLoglinesParams { limit: Some(101), offset: None }).is_err());
    }

    #[test]
    fn generate_loglines_count_bounds() {
        let mut form = GenerateLoglinesForm {
            lang: Lang::Fr,
            count: 10,
            theme: "space opera".to_string(),
        };
        assert!(check(&form).is_ok());
        form.count = 11;
        assert!(check(&form).is_err());
    }

    #[test]
    fn forms_serialize_with_wire_names() {
        let form = RegenerateBeatForm {
            beats_sheet_id: Uuid::nil(),
            regenerate_keys: vec!["beat-1".to_string()],
        };
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["beatsSheetID"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["regenerateKeys"][0], "beat-1");
    }

    #[test]
    fn parse_list_checks_every_element() {
        let body = r#"[{"slug":"ok","lang":"en","name":"A","content":"B","createdAt":"2022-01-01T00:00:00Z"},
            {"slug":"Bad Slug","lang":"en","name":"A","content":"B","createdAt":"2022-01-01T00:00:00Z"}]"#;
        assert!(parse_list::<LoglinePreview>(body).is_err());
    }
}
