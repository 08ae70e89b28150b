//! Resource operations: build, execute, parse.
//!
//! `StorySchematicsApi` pairs a `StorySchematicsClient` with an
//! `HttpTransport` and exposes one method per remote operation. Each call is
//! a single HTTP exchange; nothing is retried or cached here.

use tracing::{debug, warn};

use crate::bindings::{
    Beat, BeatsSheet, BeatsSheetIdea, BeatsSheetPreview, CreateBeatsSheetForm, CreateLoglineForm,
    CreateStoryPlanForm, ExpandBeatForm, GenerateBeatsSheetForm, GenerateLoglinesForm,
    GetAllBeatsSheetsParams, GetAllLoglinesParams, GetAllStoryPlansParams, GetBeatsSheetParams,
    GetLoglineParams, GetStoryPlanParams, Logline, LoglineIdea, LoglinePreview,
    RegenerateBeatForm, StoryPlan, StoryPlanPreview, UpdateStoryPlanForm,
};
use crate::client::StorySchematicsClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, HttpTransport, UreqTransport};
use crate::status::Operation;

#[derive(Debug, Clone)]
pub struct StorySchematicsApi<T = UreqTransport> {
    client: StorySchematicsClient,
    transport: T,
}

impl StorySchematicsApi<UreqTransport> {
    /// Client over the default blocking transport.
    pub fn connect(config: ClientConfig) -> Self {
        Self::new(config, UreqTransport::new())
    }
}

impl<T: HttpTransport> StorySchematicsApi<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            client: StorySchematicsClient::new(config),
            transport,
        }
    }

    pub fn client(&self) -> &StorySchematicsClient {
        &self.client
    }

    pub fn create_beats_sheet(
        &self,
        token: &str,
        form: &CreateBeatsSheetForm,
    ) -> Result<BeatsSheet, ApiError> {
        let request = self.client.build_create_beats_sheet(token, form)?;
        self.call(Operation::CreateBeatsSheet, &request, |c, r| c.parse_create_beats_sheet(r))
    }

    pub fn get_beats_sheet(
        &self,
        token: &str,
        params: &GetBeatsSheetParams,
    ) -> Result<BeatsSheet, ApiError> {
        let request = self.client.build_get_beats_sheet(token, params)?;
        self.call(Operation::GetBeatsSheet, &request, |c, r| c.parse_get_beats_sheet(r))
    }

    pub fn get_all_beats_sheets(
        &self,
        token: &str,
        params: &GetAllBeatsSheetsParams,
    ) -> Result<Vec<BeatsSheetPreview>, ApiError> {
        let request = self.client.build_get_all_beats_sheets(token, params)?;
        self.call(Operation::GetAllBeatsSheets, &request, |c, r| {
            c.parse_get_all_beats_sheets(r)
        })
    }

    pub fn generate_beats_sheet(
        &self,
        token: &str,
        form: &GenerateBeatsSheetForm,
    ) -> Result<BeatsSheetIdea, ApiError> {
        let request = self.client.build_generate_beats_sheet(token, form)?;
        self.call(Operation::GenerateBeatsSheet, &request, |c, r| {
            c.parse_generate_beats_sheet(r)
        })
    }

    pub fn regenerate_beats(
        &self,
        token: &str,
        form: &RegenerateBeatForm,
    ) -> Result<BeatsSheet, ApiError> {
        let request = self.client.build_regenerate_beats(token, form)?;
        self.call(Operation::RegenerateBeats, &request, |c, r| c.parse_regenerate_beats(r))
    }

    pub fn expand_beat(&self, token: &str, form: &ExpandBeatForm) -> Result<Beat, ApiError> {
        let request = self.client.build_expand_beat(token, form)?;
        self.call(Operation::ExpandBeat, &request, |c, r| c.parse_expand_beat(r))
    }

    pub fn create_logline(&self, token: &str, form: &CreateLoglineForm) -> Result<Logline, ApiError> {
        let request = self.client.build_create_logline(token, form)?;
        self.call(Operation::CreateLogline, &request, |c, r| c.parse_create_logline(r))
    }

    pub fn get_logline(&self, token: &str, params: &GetLoglineParams) -> Result<Logline, ApiError> {
        let request = self.client.build_get_logline(token, params)?;
        self.call(Operation::GetLogline, &request, |c, r| c.parse_get_logline(r))
    }

    pub fn get_all_loglines(
        &self,
        token: &str,
        params: &GetAllLoglinesParams,
    ) -> Result<Vec<LoglinePreview>, ApiError> {
        let request = self.client.build_get_all_loglines(token, params)?;
        self.call(Operation::GetAllLoglines, &request, |c, r| c.parse_get_all_loglines(r))
    }

    pub fn generate_loglines(
        &self,
        token: &str,
        form: &GenerateLoglinesForm,
    ) -> Result<Vec<LoglineIdea>, ApiError> {
        let request = self.client.build_generate_loglines(token, form)?;
        self.call(Operation::GenerateLoglines, &request, |c, r| c.parse_generate_loglines(r))
    }

    pub fn expand_logline(&self, token: &str, form: &LoglineIdea) -> Result<LoglineIdea, ApiError> {
        let request = self.client.build_expand_logline(token, form)?;
        self.call(Operation::ExpandLogline, &request, |c, r| c.parse_expand_logline(r))
    }

    pub fn create_story_plan(
        &self,
        token: &str,
        form: &CreateStoryPlanForm,
    ) -> Result<StoryPlan, ApiError> {
        let request = self.client.build_create_story_plan(token, form)?;
        self.call(Operation::CreateStoryPlan, &request, |c, r| c.parse_create_story_plan(r))
    }

    pub fn update_story_plan(
        &self,
        token: &str,
        form: &UpdateStoryPlanForm,
    ) -> Result<StoryPlan, ApiError> {
        let request = self.client.build_update_story_plan(token, form)?;
        self.call(Operation::UpdateStoryPlan, &request, |c, r| c.parse_update_story_plan(r))
    }

    pub fn get_story_plan(
        &self,
        token: &str,
        params: &GetStoryPlanParams,
    ) -> Result<StoryPlan, ApiError> {
        let request = self.client.build_get_story_plan(token, params)?;
        self.call(Operation::GetStoryPlan, &request, |c, r| c.parse_get_story_plan(r))
    }

    pub fn get_all_story_plans(
        &self,
        token: &str,
        params: &GetAllStoryPlansParams,
    ) -> Result<Vec<StoryPlanPreview>, ApiError> {
        let request = self.client.build_get_all_story_plans(token, params)?;
        self.call(Operation::GetAllStoryPlans, &request, |c, r| {
            c.parse_get_all_story_plans(r)
        })
    }

    fn call<R>(
        &self,
        op: Operation,
        request: &HttpRequest,
        parse: impl FnOnce(&StorySchematicsClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let response = self.transport.execute(request).inspect_err(|err| {
            warn!(operation = op.name(), url = %request.url, error = %err, "request failed");
        })?;
        let status = response.status;
        debug!(operation = op.name(), status, "response received");

        parse(&self.client, response).inspect_err(|err| {
            warn!(operation = op.name(), status, error = %err, "operation failed");
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpMethod;

    const ID: &str = "29f71c01-5ae1-4b01-b729-e17488538e15";

    fn config() -> ClientConfig {
        ClientConfig::new("http://localhost:3000").unwrap()
    }

    #[test]
    fn call_issues_the_built_request() {
        let seen = RefCell::new(Vec::new());
        let transport = |req: &HttpRequest| {
            seen.borrow_mut().push(req.clone());
            Ok::<_, TransportError>(HttpResponse::text(
                200,
                format!(
                    r#"{{"id":"{ID}","userID":"{ID}","slug":"the-heist","lang":"en",
                    "name":"The Heist","content":"A crew robs a casino.","createdAt":"2024-03-01T12:30:00Z"}}"#
                ),
            ))
        };
        let api = StorySchematicsApi::new(config(), &transport);

        let params = GetLoglineParams {
            id: None,
            slug: Some("the-heist".to_string()),
        };
        let logline = api.get_logline("token", &params).unwrap();
        assert_eq!(logline.slug, "the-heist");

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(seen[0].url, "http://localhost:3000/logline?slug=the-heist");
        assert_eq!(seen[0].header("Authorization"), Some("Bearer token"));
    }

    #[test]
    fn transport_failure_has_no_kind() {
        let transport =
            |_: &HttpRequest| Err::<HttpResponse, _>(TransportError("connection refused".to_string()));
        let api = StorySchematicsApi::new(config(), transport);
        let err = api
            .get_all_story_plans("token", &GetAllStoryPlansParams::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn invalid_params_skip_the_network() {
        let transport = |_: &HttpRequest| -> Result<HttpResponse, TransportError> {
            panic!("no request expected")
        };
        let api = StorySchematicsApi::new(config(), transport);
        let params = GetAllLoglinesParams {
            limit: Some(500),
            offset: None,
        };
        assert!(matches!(
            api.get_all_loglines("token", &params),
            Err(ApiError::Schema(_))
        ));
    }
}
