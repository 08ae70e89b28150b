use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

const DEFAULT_LIMIT: usize = 100;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Beat {
    pub key: String,
    pub title: String,
    pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BeatsSheet {
    pub id: Uuid,
    #[serde(rename = "loglineID")]
    pub logline_id: Uuid,
    #[serde(rename = "storyPlanID")]
    pub story_plan_id: Uuid,
    pub lang: String,
    pub content: Vec<Beat>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Logline {
    pub id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub slug: String,
    pub lang: String,
    pub name: String,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoglineIdea {
    pub lang: String,
    pub name: String,
    pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BeatDefinition {
    pub key: String,
    pub name: String,
    #[serde(rename = "keyPoints")]
    pub key_points: Vec<String>,
    pub purpose: String,
    #[serde(rename = "minScenes")]
    pub min_scenes: i32,
    #[serde(rename = "maxScenes")]
    pub max_scenes: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoryPlan {
    pub id: Uuid,
    pub slug: String,
    pub lang: String,
    pub name: String,
    pub description: String,
    pub beats: Vec<BeatDefinition>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateBeatsSheet {
    pub lang: String,
    #[serde(rename = "loglineID")]
    pub logline_id: Uuid,
    #[serde(rename = "storyPlanID")]
    pub story_plan_id: Uuid,
    pub content: Vec<Beat>,
}

#[derive(Deserialize)]
pub struct GenerateBeatsSheet {
    pub lang: String,
    #[serde(rename = "loglineID")]
    pub logline_id: Uuid,
    #[serde(rename = "storyPlanID")]
    pub story_plan_id: Uuid,
}

#[derive(Deserialize)]
pub struct RegenerateBeats {
    #[serde(rename = "beatsSheetID")]
    pub beats_sheet_id: Uuid,
    #[serde(rename = "regenerateKeys")]
    pub regenerate_keys: Vec<String>,
}

#[derive(Deserialize)]
pub struct ExpandBeat {
    #[serde(rename = "beatsSheetID")]
    pub beats_sheet_id: Uuid,
    #[serde(rename = "targetKey")]
    pub target_key: String,
}

#[derive(Deserialize)]
pub struct CreateLogline {
    pub slug: String,
    pub lang: String,
    pub name: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct GenerateLoglines {
    pub lang: String,
    pub count: usize,
    pub theme: String,
}

/// Body of both `PUT /story-plan` and `PATCH /story-plan`.
#[derive(Deserialize)]
pub struct StoryPlanForm {
    pub slug: String,
    pub lang: String,
    pub name: String,
    pub description: String,
    pub beats: Vec<BeatDefinition>,
}

#[derive(Deserialize)]
pub struct BeatsSheetQuery {
    #[serde(rename = "beatsSheetID")]
    pub beats_sheet_id: Uuid,
}

#[derive(Deserialize)]
pub struct BeatsSheetsQuery {
    #[serde(rename = "loglineID")]
    pub logline_id: Uuid,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Deserialize)]
pub struct LookupQuery {
    pub id: Option<Uuid>,
    pub slug: Option<String>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// In-memory state of the mock service. Lists keep insertion order.
#[derive(Default)]
pub struct Store {
    pub users: HashMap<String, Uuid>,
    pub loglines: Vec<Logline>,
    pub story_plans: Vec<StoryPlan>,
    pub beats_sheets: Vec<BeatsSheet>,
}

pub type Db = Arc<RwLock<Store>>;

type Reply<T> = Result<Json<T>, (StatusCode, String)>;

pub fn app() -> Router {
    app_with_store(Store::default())
}

/// Router over a pre-populated store.
pub fn app_with_store(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/beats-sheet", get(get_beats_sheet).put(create_beats_sheet))
        .route("/beats-sheets", get(list_beats_sheets))
        .route("/beats-sheet/generate", post(generate_beats_sheet))
        .route("/beats-sheet/regenerate", patch(regenerate_beats))
        .route("/beats-sheet/expand", patch(expand_beat))
        .route("/logline", get(get_logline).put(create_logline))
        .route("/loglines", get(list_loglines))
        .route("/loglines/generate", post(generate_loglines))
        .route("/logline/expand", post(expand_logline))
        .route(
            "/story-plan",
            get(get_story_plan).put(create_story_plan).patch(update_story_plan),
        )
        .route("/story-plans", get(list_story_plans))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Resolve the bearer token to a user, registering unknown tokens.
async fn authorize(db: &Db, headers: &HeaderMap) -> Result<Uuid, (StatusCode, String)> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or((StatusCode::UNAUTHORIZED, "missing bearer token".to_string()))?;
    let mut store = db.write().await;
    let user = *store
        .users
        .entry(token.to_string())
        .or_insert_with(Uuid::new_v4);
    Ok(user)
}

fn not_found(what: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("{what} not found"))
}

fn page<T>(items: impl Iterator<Item = T>, limit: Option<usize>, offset: Option<usize>) -> Vec<T> {
    items
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(DEFAULT_LIMIT))
        .collect()
}

// --- beats sheets ---

async fn create_beats_sheet(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateBeatsSheet>,
) -> Reply<BeatsSheet> {
    authorize(&db, &headers).await?;
    let mut store = db.write().await;
    let plan = store
        .story_plans
        .iter()
        .find(|p| p.id == input.story_plan_id)
        .ok_or_else(|| not_found("story plan"))?;
    if !store.loglines.iter().any(|l| l.id == input.logline_id) {
        return Err(not_found("logline"));
    }
    let expected: Vec<&str> = plan.beats.iter().map(|b| b.key.as_str()).collect();
    let actual: Vec<&str> = input.content.iter().map(|b| b.key.as_str()).collect();
    if expected != actual {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "beats do not match the story plan".to_string(),
        ));
    }
    let sheet = BeatsSheet {
        id: Uuid::new_v4(),
        logline_id: input.logline_id,
        story_plan_id: input.story_plan_id,
        lang: input.lang,
        content: input.content,
        created_at: Utc::now(),
    };
    store.beats_sheets.push(sheet.clone());
    debug!(id = %sheet.id, "beats sheet created");
    Ok(Json(sheet))
}

async fn get_beats_sheet(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<BeatsSheetQuery>,
) -> Reply<BeatsSheet> {
    authorize(&db, &headers).await?;
    let store = db.read().await;
    store
        .beats_sheets
        .iter()
        .find(|s| s.id == query.beats_sheet_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("beats sheet"))
}

async fn list_beats_sheets(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<BeatsSheetsQuery>,
) -> Reply<Vec<serde_json::Value>> {
    authorize(&db, &headers).await?;
    let store = db.read().await;
    let previews = store
        .beats_sheets
        .iter()
        .filter(|s| s.logline_id == query.logline_id)
        .map(|s| serde_json::json!({ "id": s.id, "lang": s.lang, "createdAt": s.created_at }));
    Ok(Json(page(previews, query.limit, query.offset)))
}

async fn generate_beats_sheet(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<GenerateBeatsSheet>,
) -> Reply<serde_json::Value> {
    authorize(&db, &headers).await?;
    let store = db.read().await;
    let logline = store
        .loglines
        .iter()
        .find(|l| l.id == input.logline_id)
        .ok_or_else(|| not_found("logline"))?;
    let plan = store
        .story_plans
        .iter()
        .find(|p| p.id == input.story_plan_id)
        .ok_or_else(|| not_found("story plan"))?;
    let content: Vec<Beat> = plan
        .beats
        .iter()
        .map(|b| Beat {
            key: b.key.clone(),
            title: b.name.clone(),
            content: format!("{}: {}", logline.name, b.purpose),
        })
        .collect();
    Ok(Json(serde_json::json!({ "lang": input.lang, "content": content })))
}

async fn regenerate_beats(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<RegenerateBeats>,
) -> Reply<BeatsSheet> {
    authorize(&db, &headers).await?;
    let mut store = db.write().await;
    let sheet = store
        .beats_sheets
        .iter_mut()
        .find(|s| s.id == input.beats_sheet_id)
        .ok_or_else(|| not_found("beats sheet"))?;
    for beat in sheet
        .content
        .iter_mut()
        .filter(|b| input.regenerate_keys.contains(&b.key))
    {
        beat.content = format!("{} (regenerated)", beat.content);
    }
    Ok(Json(sheet.clone()))
}

async fn expand_beat(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ExpandBeat>,
) -> Reply<Beat> {
    authorize(&db, &headers).await?;
    let store = db.read().await;
    let sheet = store
        .beats_sheets
        .iter()
        .find(|s| s.id == input.beats_sheet_id)
        .ok_or_else(|| not_found("beats sheet"))?;
    let beat = sheet
        .content
        .iter()
        .find(|b| b.key == input.target_key)
        .ok_or((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("no beat with key {}", input.target_key),
        ))?;
    Ok(Json(Beat {
        key: beat.key.clone(),
        title: beat.title.clone(),
        content: format!("{} In more detail.", beat.content),
    }))
}

// --- loglines ---

async fn create_logline(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateLogline>,
) -> Reply<Logline> {
    let user_id = authorize(&db, &headers).await?;
    let logline = Logline {
        id: Uuid::new_v4(),
        user_id,
        slug: input.slug,
        lang: input.lang,
        name: input.name,
        content: input.content,
        created_at: Utc::now(),
    };
    db.write().await.loglines.push(logline.clone());
    Ok(Json(logline))
}

async fn get_logline(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<LookupQuery>,
) -> Reply<Logline> {
    let user_id = authorize(&db, &headers).await?;
    let store = db.read().await;
    store
        .loglines
        .iter()
        .filter(|l| l.user_id == user_id)
        .find(|l| match (&query.id, &query.slug) {
            (Some(id), _) => l.id == *id,
            (None, Some(slug)) => &l.slug == slug,
            (None, None) => false,
        })
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("logline"))
}

async fn list_loglines(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Reply<Vec<serde_json::Value>> {
    let user_id = authorize(&db, &headers).await?;
    let store = db.read().await;
    let previews = store
        .loglines
        .iter()
        .filter(|l| l.user_id == user_id)
        .map(|l| {
            serde_json::json!({
                "slug": l.slug,
                "lang": l.lang,
                "name": l.name,
                "content": l.content,
                "createdAt": l.created_at,
            })
        });
    Ok(Json(page(previews, query.limit, query.offset)))
}

async fn generate_loglines(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<GenerateLoglines>,
) -> Reply<Vec<LoglineIdea>> {
    authorize(&db, &headers).await?;
    let ideas = (1..=input.count)
        .map(|n| LoglineIdea {
            lang: input.lang.clone(),
            name: format!("Idea {n}"),
            content: format!("A story about {} (take {n}).", input.theme),
        })
        .collect();
    Ok(Json(ideas))
}

async fn expand_logline(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<LoglineIdea>,
) -> Reply<LoglineIdea> {
    authorize(&db, &headers).await?;
    Ok(Json(LoglineIdea {
        content: format!("{} Told in three acts.", input.content),
        ..input
    }))
}

// --- story plans ---

async fn create_story_plan(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<StoryPlanForm>,
) -> Reply<StoryPlan> {
    authorize(&db, &headers).await?;
    let plan = StoryPlan {
        id: Uuid::new_v4(),
        slug: input.slug,
        lang: input.lang,
        name: input.name,
        description: input.description,
        beats: input.beats,
        created_at: Utc::now(),
    };
    db.write().await.story_plans.push(plan.clone());
    Ok(Json(plan))
}

/// Story plans are versioned: an update stores a new revision under the
/// same slug.
async fn update_story_plan(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<StoryPlanForm>,
) -> Reply<StoryPlan> {
    authorize(&db, &headers).await?;
    let mut store = db.write().await;
    if !store.story_plans.iter().any(|p| p.slug == input.slug) {
        return Err(not_found("story plan"));
    }
    let plan = StoryPlan {
        id: Uuid::new_v4(),
        slug: input.slug,
        lang: input.lang,
        name: input.name,
        description: input.description,
        beats: input.beats,
        created_at: Utc::now(),
    };
    store.story_plans.push(plan.clone());
    Ok(Json(plan))
}

async fn get_story_plan(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<LookupQuery>,
) -> Reply<StoryPlan> {
    authorize(&db, &headers).await?;
    let store = db.read().await;
    store
        .story_plans
        .iter()
        .rev()
        .find(|p| match (&query.id, &query.slug) {
            (Some(id), _) => p.id == *id,
            (None, Some(slug)) => &p.slug == slug,
            (None, None) => false,
        })
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("story plan"))
}

async fn list_story_plans(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Reply<Vec<serde_json::Value>> {
    authorize(&db, &headers).await?;
    let store = db.read().await;
    let previews = store.story_plans.iter().map(|p| {
        serde_json::json!({
            "id": p.id,
            "slug": p.slug,
            "lang": p.lang,
            "name": p.name,
            "description": p.description,
            "createdAt": p.created_at,
        })
    });
    Ok(Json(page(previews, query.limit, query.offset)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beats_sheet_serializes_wire_names() {
        let sheet = BeatsSheet {
            id: Uuid::nil(),
            logline_id: Uuid::nil(),
            story_plan_id: Uuid::nil(),
            lang: "en".to_string(),
            content: vec![Beat {
                key: "setup".to_string(),
                title: "Setup".to_string(),
                content: "It begins.".to_string(),
            }],
            created_at: DateTime::parse_from_rfc3339("2022-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_value(&sheet).unwrap();
        assert_eq!(json["loglineID"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["storyPlanID"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["createdAt"], "2022-01-01T00:00:00Z");
    }

    #[test]
    fn page_applies_offset_then_limit() {
        let items = page(1..=5, Some(2), Some(1));
        assert_eq!(items, vec![2, 3]);
        let items = page(1..=5, None, Some(4));
        assert_eq!(items, vec![5]);
        let items = page(1..=5, Some(3), Some(9));
        assert!(items.is_empty());
    }

    #[test]
    fn lookup_accepts_either_key() {
        let q: LookupQuery = serde_json::from_str(r#"{"slug":"the-heist"}"#).unwrap();
        assert!(q.id.is_none());
        assert_eq!(q.slug.as_deref(), Some("the-heist"));
    }

    #[test]
    fn generate_loglines_rejects_missing_theme() {
        let result: Result<GenerateLoglines, _> = serde_json::from_str(r#"{"lang":"en","count":2}"#);
        assert!(result.is_err());
    }
}
