//! Stateless HTTP request builder and response parser for the
//! story-schematics API.
//!
//! # Design
//! `StorySchematicsClient` holds only a `ClientConfig` and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! validates its input and produces an `HttpRequest`, and a `parse_*` method
//! that maps the status through the operation's `StatusRule`s and decodes
//! the body through the schema layer. The caller (or `StorySchematicsApi`)
//! executes the HTTP round-trip in between.

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::bindings::{
    self, Beat, BeatsSheet, BeatsSheetIdea, BeatsSheetPreview, CreateBeatsSheetForm,
    CreateLoglineForm, CreateStoryPlanForm, ExpandBeatForm, GenerateBeatsSheetForm,
    GenerateLoglinesForm, GetAllBeatsSheetsParams, GetAllLoglinesParams, GetAllStoryPlansParams,
    GetBeatsSheetParams, GetLoglineParams, GetStoryPlanParams, Logline, LoglineIdea,
    LoglinePreview, RegenerateBeatForm, StoryPlan, StoryPlanPreview, UpdateStoryPlanForm,
};
use crate::config::{ClientConfig, QueryParams};
use crate::error::ApiError;
use crate::headers::with_auth_headers;
use crate::http::{HttpRequest, HttpResponse};
use crate::status::Operation;

/// Synchronous, stateless client for the story-schematics API.
#[derive(Debug, Clone)]
pub struct StorySchematicsClient {
    config: ClientConfig,
}

impl StorySchematicsClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Beats sheets
    // -----------------------------------------------------------------------

    pub fn build_create_beats_sheet(
        &self,
        token: &str,
        form: &CreateBeatsSheetForm,
    ) -> Result<HttpRequest, ApiError> {
        self.build_with_body(Operation::CreateBeatsSheet, token, form)
    }

    pub fn parse_create_beats_sheet(&self, response: HttpResponse) -> Result<BeatsSheet, ApiError> {
        parse_one(Operation::CreateBeatsSheet, &response)
    }

    pub fn build_get_beats_sheet(
        &self,
        token: &str,
        params: &GetBeatsSheetParams,
    ) -> Result<HttpRequest, ApiError> {
        let mut query = QueryParams::new();
        query.set("beatsSheetID", params.beats_sheet_id);
        self.build_with_query(Operation::GetBeatsSheet, token, params, &query)
    }

    pub fn parse_get_beats_sheet(&self, response: HttpResponse) -> Result<BeatsSheet, ApiError> {
        parse_one(Operation::GetBeatsSheet, &response)
    }

    pub fn build_get_all_beats_sheets(
        &self,
        token: &str,
        params: &GetAllBeatsSheetsParams,
    ) -> Result<HttpRequest, ApiError> {
        let mut query = QueryParams::new();
        query
            .set("loglineID", params.logline_id)
            .set_count("limit", params.limit)
            .set_count("offset", params.offset);
        self.build_with_query(Operation::GetAllBeatsSheets, token, params, &query)
    }

    pub fn parse_get_all_beats_sheets(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<BeatsSheetPreview>, ApiError> {
        parse_many(Operation::GetAllBeatsSheets, &response)
    }

    pub fn build_generate_beats_sheet(
        &self,
        token: &str,
        form: &GenerateBeatsSheetForm,
    ) -> Result<HttpRequest, ApiError> {
        self.build_with_body(Operation::GenerateBeatsSheet, token, form)
    }

    pub fn parse_generate_beats_sheet(
        &self,
        response: HttpResponse,
    ) -> Result<BeatsSheetIdea, ApiError> {
        parse_one(Operation::GenerateBeatsSheet, &response)
    }

    pub fn build_regenerate_beats(
        &self,
        token: &str,
        form: &RegenerateBeatForm,
    ) -> Result<HttpRequest, ApiError> {
        self.build_with_body(Operation::RegenerateBeats, token, form)
    }

    pub fn parse_regenerate_beats(&self, response: HttpResponse) -> Result<BeatsSheet, ApiError> {
        parse_one(Operation::RegenerateBeats, &response)
    }

    pub fn build_expand_beat(&self, token: &str, form: &ExpandBeatForm) -> Result<HttpRequest, ApiError> {
        self.build_with_body(Operation::ExpandBeat, token, form)
    }

    pub fn parse_expand_beat(&self, response: HttpResponse) -> Result<Beat, ApiError> {
        parse_one(Operation::ExpandBeat, &response)
    }

    // -----------------------------------------------------------------------
    // Loglines
    // -----------------------------------------------------------------------

    pub fn build_create_logline(
        &self,
        token: &str,
        form: &CreateLoglineForm,
    ) -> Result<HttpRequest, ApiError> {
        self.build_with_body(Operation::CreateLogline, token, form)
    }

    pub fn parse_create_logline(&self, response: HttpResponse) -> Result<Logline, ApiError> {
        parse_one(Operation::CreateLogline, &response)
    }

    pub fn build_get_logline(
        &self,
        token: &str,
        params: &GetLoglineParams,
    ) -> Result<HttpRequest, ApiError> {
        let mut query = QueryParams::new();
        query
            .set_opt("id", params.id)
            .set_opt("slug", params.slug.as_deref());
        self.build_with_query(Operation::GetLogline, token, params, &query)
    }

    pub fn parse_get_logline(&self, response: HttpResponse) -> Result<Logline, ApiError> {
        parse_one(Operation::GetLogline, &response)
    }

    pub fn build_get_all_loglines(
        &self,
        token: &str,
        params: &GetAllLoglinesParams,
    ) -> Result<HttpRequest, ApiError> {
        let mut query = QueryParams::new();
        query
            .set_count("limit", params.limit)
            .set_count("offset", params.offset);
        self.build_with_query(Operation::GetAllLoglines, token, params, &query)
    }

    pub fn parse_get_all_loglines(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<LoglinePreview>, ApiError> {
        parse_many(Operation::GetAllLoglines, &response)
    }

    pub fn build_generate_loglines(
        &self,
        token: &str,
        form: &GenerateLoglinesForm,
    ) -> Result<HttpRequest, ApiError> {
        self.build_with_body(Operation::GenerateLoglines, token, form)
    }

    pub fn parse_generate_loglines(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<LoglineIdea>, ApiError> {
        parse_many(Operation::GenerateLoglines, &response)
    }

    pub fn build_expand_logline(&self, token: &str, form: &LoglineIdea) -> Result<HttpRequest, ApiError> {
        self.build_with_body(Operation::ExpandLogline, token, form)
    }

    pub fn parse_expand_logline(&self, response: HttpResponse) -> Result<LoglineIdea, ApiError> {
        parse_one(Operation::ExpandLogline, &response)
    }

    // -----------------------------------------------------------------------
    // Story plans
    // -----------------------------------------------------------------------

    pub fn build_create_story_plan(
        &self,
        token: &str,
        form: &CreateStoryPlanForm,
    ) -> Result<HttpRequest, ApiError> {
        self.build_with_body(Operation::CreateStoryPlan, token, form)
    }

    pub fn parse_create_story_plan(&self, response: HttpResponse) -> Result<StoryPlan, ApiError> {
        parse_one(Operation::CreateStoryPlan, &response)
    }

    pub fn build_update_story_plan(
        &self,
        token: &str,
        form: &UpdateStoryPlanForm,
    ) -> Result<HttpRequest, ApiError> {
        self.build_with_body(Operation::UpdateStoryPlan, token, form)
    }

    pub fn parse_update_story_plan(&self, response: HttpResponse) -> Result<StoryPlan, ApiError> {
        parse_one(Operation::UpdateStoryPlan, &response)
    }

    pub fn build_get_story_plan(
        &self,
        token: &str,
        params: &GetStoryPlanParams,
    ) -> Result<HttpRequest, ApiError> {
        let mut query = QueryParams::new();
        query
            .set_opt("id", params.id)
            .set_opt("slug", params.slug.as_deref());
        self.build_with_query(Operation::GetStoryPlan, token, params, &query)
    }

    pub fn parse_get_story_plan(&self, response: HttpResponse) -> Result<StoryPlan, ApiError> {
        parse_one(Operation::GetStoryPlan, &response)
    }

    pub fn build_get_all_story_plans(
        &self,
        token: &str,
        params: &GetAllStoryPlansParams,
    ) -> Result<HttpRequest, ApiError> {
        let mut query = QueryParams::new();
        query
            .set_count("limit", params.limit)
            .set_count("offset", params.offset);
        self.build_with_query(Operation::GetAllStoryPlans, token, params, &query)
    }

    pub fn parse_get_all_story_plans(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<StoryPlanPreview>, ApiError> {
        parse_many(Operation::GetAllStoryPlans, &response)
    }

    // -----------------------------------------------------------------------
    // Shared
    // -----------------------------------------------------------------------

    fn build_with_body<F>(&self, op: Operation, token: &str, form: &F) -> Result<HttpRequest, ApiError>
    where
        F: Serialize + Validate,
    {
        bindings::check(form)?;
        let body = serde_json::to_string(form).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: op.method(),
            url: self.config.api_path(op.path(), None)?.into(),
            headers: with_auth_headers(token, Vec::new()),
            body: Some(body),
        })
    }

    fn build_with_query<P>(
        &self,
        op: Operation,
        token: &str,
        params: &P,
        query: &QueryParams,
    ) -> Result<HttpRequest, ApiError>
    where
        P: Validate,
    {
        bindings::check(params)?;
        Ok(HttpRequest {
            method: op.method(),
            url: self.config.api_path(op.path(), Some(query))?.into(),
            headers: with_auth_headers(token, Vec::new()),
            body: None,
        })
    }
}

fn parse_one<T>(op: Operation, response: &HttpResponse) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    op.check(response)?;
    Ok(bindings::parse(response.body_text())?)
}

fn parse_many<T>(op: Operation, response: &HttpResponse) -> Result<Vec<T>, ApiError>
where
    T: DeserializeOwned + Validate,
{
    op.check(response)?;
    Ok(bindings::parse_list(response.body_text())?)
}
