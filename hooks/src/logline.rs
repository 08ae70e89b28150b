//! Logline adapters.

use story_schematics_core::bindings::{
    CreateLoglineForm, GenerateLoglinesForm, GetAllLoglinesParams, GetLoglineParams, Logline,
    LoglineIdea, LoglinePreview,
};
use story_schematics_core::{ApiError, HttpTransport, StorySchematicsApi};

use crate::infinite::InfiniteQuery;
use crate::key::QueryKey;
use crate::query::{Mutation, Query};

const RESOURCE: &str = "logline";

pub const DEFAULT_LIST_LIMIT: u32 = 100;

pub struct CreateLogline<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
}

impl<'a, T> CreateLogline<'a, T> {
    pub fn new(api: &'a StorySchematicsApi<T>, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
        }
    }
}

impl<T: HttpTransport> Mutation for CreateLogline<'_, T> {
    type Input = CreateLoglineForm;
    type Output = Logline;

    fn key(&self) -> QueryKey {
        QueryKey::new(RESOURCE, "create")
    }

    fn mutate(&self, form: &CreateLoglineForm) -> Result<Logline, ApiError> {
        self.api.create_logline(&self.token, form)
    }
}

pub struct GetLogline<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
    params: GetLoglineParams,
}

impl<'a, T> GetLogline<'a, T> {
    pub fn new(
        api: &'a StorySchematicsApi<T>,
        token: impl Into<String>,
        params: GetLoglineParams,
    ) -> Self {
        Self {
            api,
            token: token.into(),
            params,
        }
    }
}

impl<T: HttpTransport> Query for GetLogline<'_, T> {
    type Output = Logline;

    fn key(&self) -> QueryKey {
        QueryKey::new(RESOURCE, "get")
            .with_params(&self.params)
            .with_token(&self.token)
    }

    /// Needs a token and something to look up.
    fn enabled(&self) -> bool {
        !self.token.is_empty()
            && (self.params.id.is_some() || self.params.slug.as_deref().is_some_and(|s| !s.is_empty()))
    }

    fn fetch_one(&self) -> Result<Logline, ApiError> {
        self.api.get_logline(&self.token, &self.params)
    }
}

pub struct GetAllLoglines<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
    params: GetAllLoglinesParams,
}

impl<'a, T> GetAllLoglines<'a, T> {
    pub fn new(
        api: &'a StorySchematicsApi<T>,
        token: impl Into<String>,
        params: GetAllLoglinesParams,
    ) -> Self {
        Self {
            api,
            token: token.into(),
            params,
        }
    }
}

impl<T: HttpTransport> InfiniteQuery for GetAllLoglines<'_, T> {
    type Item = LoglinePreview;

    fn key(&self) -> QueryKey {
        QueryKey::new(RESOURCE, "get all")
            .with_params(&self.params)
            .with_token(&self.token)
    }

    fn enabled(&self) -> bool {
        !self.token.is_empty()
    }

    fn initial_page_param(&self) -> u32 {
        self.params.offset.unwrap_or(0)
    }

    fn page_size(&self) -> u32 {
        self.params.limit.unwrap_or(DEFAULT_LIST_LIMIT)
    }

    fn fetch_page(&self, offset: u32) -> Result<Vec<LoglinePreview>, ApiError> {
        let params = GetAllLoglinesParams {
            offset: Some(offset),
            ..self.params.clone()
        };
        self.api.get_all_loglines(&self.token, &params)
    }
}

pub struct GenerateLoglines<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
}

impl<'a, T> GenerateLoglines<'a, T> {
    pub fn new(api: &'a StorySchematicsApi<T>, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
        }
    }
}

impl<T: HttpTransport> Mutation for GenerateLoglines<'_, T> {
    type Input = GenerateLoglinesForm;
    type Output = Vec<LoglineIdea>;

    fn key(&self) -> QueryKey {
        QueryKey::new(RESOURCE, "generate")
    }

    fn mutate(&self, form: &GenerateLoglinesForm) -> Result<Vec<LoglineIdea>, ApiError> {
        self.api.generate_loglines(&self.token, form)
    }
}

pub struct ExpandLogline<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
}

impl<'a, T> ExpandLogline<'a, T> {
    pub fn new(api: &'a StorySchematicsApi<T>, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
        }
    }
}

impl<T: HttpTransport> Mutation for ExpandLogline<'_, T> {
    type Input = LoglineIdea;
    type Output = LoglineIdea;

    fn key(&self) -> QueryKey {
        QueryKey::new(RESOURCE, "expand")
    }

    fn mutate(&self, idea: &LoglineIdea) -> Result<LoglineIdea, ApiError> {
        self.api.expand_logline(&self.token, idea)
    }
}

#[cfg(test)]
mod tests {
    use story_schematics_core::bindings::Lang;
    use story_schematics_core::{ClientConfig, HttpRequest, HttpResponse, TransportError};

    use super::*;
    use crate::query::{MutationState, MutationStatus};

    fn api() -> StorySchematicsApi {
        StorySchematicsApi::connect(ClientConfig::new("http://localhost:3000").unwrap())
    }

    #[test]
    fn get_needs_token_and_lookup() {
        let api = api();
        let by_slug = GetLoglineParams {
            id: None,
            slug: Some("the-heist".to_string()),
        };
        assert!(GetLogline::new(&api, "t", by_slug.clone()).enabled());
        assert!(!GetLogline::new(&api, "", by_slug).enabled());
        assert!(!GetLogline::new(&api, "t", GetLoglineParams::default()).enabled());
    }

    #[test]
    fn list_key_and_defaults() {
        let api = api();
        let list = GetAllLoglines::new(&api, "t", GetAllLoglinesParams::default());
        assert_eq!(
            list.key().to_string(),
            r#"["story-schematics service","logline","get all",{},{"token":"t"}]"#
        );
        assert_eq!(list.initial_page_param(), 0);
        assert_eq!(list.page_size(), 100);
        assert!(!GetAllLoglines::new(&api, "", GetAllLoglinesParams::default()).enabled());
    }

    #[test]
    fn generate_keeps_the_ideas() {
        let transport = |_: &HttpRequest| {
            Ok::<_, TransportError>(HttpResponse::text(
                200,
                r#"[{"lang":"fr","name":"Le casse","content":"Une bande braque un casino."}]"#,
            ))
        };
        let api = StorySchematicsApi::new(
            ClientConfig::new("http://localhost:3000").unwrap(),
            transport,
        );
        let mut generate = MutationState::new(GenerateLoglines::new(&api, "t"));
        assert_eq!(
            generate.key().to_string(),
            r#"["story-schematics service","logline","generate"]"#
        );

        let form = GenerateLoglinesForm {
            lang: Lang::Fr,
            count: 1,
            theme: "heist".to_string(),
        };
        assert_eq!(generate.mutate(&form).unwrap().len(), 1);
        assert_eq!(generate.status(), MutationStatus::Success);
        assert_eq!(generate.data().unwrap()[0].name, "Le casse");
    }
}
