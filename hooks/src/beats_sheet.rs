//! Beats sheet adapters.

use story_schematics_core::bindings::{
    Beat, BeatsSheet, BeatsSheetIdea, BeatsSheetPreview, CreateBeatsSheetForm, ExpandBeatForm,
    GenerateBeatsSheetForm, GetAllBeatsSheetsParams, GetBeatsSheetParams, RegenerateBeatForm,
};
use story_schematics_core::{ApiError, HttpTransport, StorySchematicsApi};

use crate::infinite::InfiniteQuery;
use crate::key::QueryKey;
use crate::query::{Mutation, Query};

const RESOURCE: &str = "beats sheet";

/// Page size used to step backwards when the caller set no limit.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

pub struct CreateBeatsSheet<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
}

impl<'a, T> CreateBeatsSheet<'a, T> {
    pub fn new(api: &'a StorySchematicsApi<T>, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
        }
    }
}

impl<T: HttpTransport> Mutation for CreateBeatsSheet<'_, T> {
    type Input = CreateBeatsSheetForm;
    type Output = BeatsSheet;

    fn key(&self) -> QueryKey {
        QueryKey::new(RESOURCE, "create")
    }

    fn mutate(&self, form: &CreateBeatsSheetForm) -> Result<BeatsSheet, ApiError> {
        self.api.create_beats_sheet(&self.token, form)
    }
}

pub struct GetBeatsSheet<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
    params: GetBeatsSheetParams,
}

impl<'a, T> GetBeatsSheet<'a, T> {
    pub fn new(
        api: &'a StorySchematicsApi<T>,
        token: impl Into<String>,
        params: GetBeatsSheetParams,
    ) -> Self {
        Self {
            api,
            token: token.into(),
            params,
        }
    }
}

impl<T: HttpTransport> Query for GetBeatsSheet<'_, T> {
    type Output = BeatsSheet;

    fn key(&self) -> QueryKey {
        QueryKey::new(RESOURCE, "get")
            .with_params(&self.params)
            .with_token(&self.token)
    }

    fn enabled(&self) -> bool {
        !self.token.is_empty() && !self.params.beats_sheet_id.is_nil()
    }

    fn fetch_one(&self) -> Result<BeatsSheet, ApiError> {
        self.api.get_beats_sheet(&self.token, &self.params)
    }
}

pub struct GetAllBeatsSheets<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
    params: GetAllBeatsSheetsParams,
}

impl<'a, T> GetAllBeatsSheets<'a, T> {
    pub fn new(
        api: &'a StorySchematicsApi<T>,
        token: impl Into<String>,
        params: GetAllBeatsSheetsParams,
    ) -> Self {
        Self {
            api,
            token: token.into(),
            params,
        }
    }
}

impl<T: HttpTransport> InfiniteQuery for GetAllBeatsSheets<'_, T> {
    type Item = BeatsSheetPreview;

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

    fn fetch_page(&self, offset: u32) -> Result<Vec<BeatsSheetPreview>, ApiError> {
        let params = GetAllBeatsSheetsParams {
            offset: Some(offset),
            ..self.params.clone()
        };
        self.api.get_all_beats_sheets(&self.token, &params)
    }
}

pub struct GenerateBeatsSheet<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
}

impl<'a, T> GenerateBeatsSheet<'a, T> {
    pub fn new(api: &'a StorySchematicsApi<T>, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
        }
    }
}

impl<T: HttpTransport> Mutation for GenerateBeatsSheet<'_, T> {
    type Input = GenerateBeatsSheetForm;
    type Output = BeatsSheetIdea;

    fn key(&self) -> QueryKey {
        QueryKey::new(RESOURCE, "generate")
    }

    fn mutate(&self, form: &GenerateBeatsSheetForm) -> Result<BeatsSheetIdea, ApiError> {
        self.api.generate_beats_sheet(&self.token, form)
    }
}

pub struct RegenerateBeats<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
}

impl<'a, T> RegenerateBeats<'a, T> {
    pub fn new(api: &'a StorySchematicsApi<T>, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
        }
    }
}

impl<T: HttpTransport> Mutation for RegenerateBeats<'_, T> {
    type Input = RegenerateBeatForm;
    type Output = BeatsSheet;

    fn key(&self) -> QueryKey {
        QueryKey::new(RESOURCE, "regenerate beats")
    }

    fn mutate(&self, form: &RegenerateBeatForm) -> Result<BeatsSheet, ApiError> {
        self.api.regenerate_beats(&self.token, form)
    }
}

pub struct ExpandBeat<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
}

impl<'a, T> ExpandBeat<'a, T> {
    pub fn new(api: &'a StorySchematicsApi<T>, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
        }
    }
}

impl<T: HttpTransport> Mutation for ExpandBeat<'_, T> {
    type Input = ExpandBeatForm;
    type Output = Beat;

    fn key(&self) -> QueryKey {
        QueryKey::new(RESOURCE, "expand beat")
    }

    fn mutate(&self, form: &ExpandBeatForm) -> Result<Beat, ApiError> {
        self.api.expand_beat(&self.token, form)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use story_schematics_core::{ClientConfig, HttpRequest, HttpResponse, TransportError};

    use super::*;
    use crate::infinite::InfiniteQueryState;
    use crate::query::{fetch_query, MutationState, MutationStatus};
    use crate::retry::RetryPolicy;

    const ID: &str = "29f71c01-5ae1-4b01-b729-e17488538e15";

    fn config() -> ClientConfig {
        ClientConfig::new("http://localhost:3000").unwrap()
    }

    fn preview(n: u32) -> String {
        format!(r#"{{"id":"{ID}","lang":"en","createdAt":"2024-03-0{n}T12:00:00Z"}}"#)
    }

    #[test]
    fn keys() {
        let api = StorySchematicsApi::connect(config());
        assert_eq!(
            CreateBeatsSheet::new(&api, "t").key().to_string(),
            r#"["story-schematics service","beats sheet","create"]"#
        );
        assert_eq!(
            ExpandBeat::new(&api, "t").key().to_string(),
            r#"["story-schematics service","beats sheet","expand beat"]"#
        );
        let get = GetBeatsSheet::new(
            &api,
            "t",
            GetBeatsSheetParams {
                beats_sheet_id: ID.parse().unwrap(),
            },
        );
        assert_eq!(
            get.key().to_string(),
            format!(
                r#"["story-schematics service","beats sheet","get",{{"beatsSheetID":"{ID}"}},{{"token":"t"}}]"#
            )
        );
    }

    #[test]
    fn get_needs_a_token() {
        let api = StorySchematicsApi::connect(config());
        let params = GetBeatsSheetParams {
            beats_sheet_id: ID.parse().unwrap(),
        };
        assert!(GetBeatsSheet::new(&api, "t", params.clone()).enabled());
        assert!(!GetBeatsSheet::new(&api, "", params).enabled());
    }

    #[test]
    fn list_pages_by_returned_length() {
        let offsets = RefCell::new(Vec::new());
        let transport = |req: &HttpRequest| {
            offsets.borrow_mut().push(req.url.clone());
            let body = match offsets.borrow().len() {
                1 => format!("[{},{}]", preview(1), preview(2)),
                _ => "[]".to_string(),
            };
            Ok::<_, TransportError>(HttpResponse::text(200, body))
        };
        let api = StorySchematicsApi::new(config(), &transport);
        let params = GetAllBeatsSheetsParams {
            logline_id: ID.parse().unwrap(),
            limit: Some(10),
            offset: None,
        };
        let mut list = InfiniteQueryState::new(GetAllBeatsSheets::new(&api, "t", params));

        assert_eq!(list.fetch_next_page().unwrap().map(<[_]>::len), Some(2));
        assert_eq!(list.fetch_next_page().unwrap().map(<[_]>::len), Some(0));
        assert_eq!(list.fetch_next_page().unwrap(), None);

        let urls = offsets.borrow();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0], format!("http://localhost:3000/beats-sheets?loglineID={ID}&limit=10"));
        assert_eq!(
            urls[1],
            format!("http://localhost:3000/beats-sheets?loglineID={ID}&limit=10&offset=2")
        );
    }

    #[test]
    fn previous_step_defaults_to_fifty() {
        let api = StorySchematicsApi::connect(config());
        let params = GetAllBeatsSheetsParams {
            logline_id: ID.parse().unwrap(),
            limit: None,
            offset: Some(70),
        };
        let list = GetAllBeatsSheets::new(&api, "t", params);
        assert_eq!(list.initial_page_param(), 70);
        assert_eq!(list.page_size(), DEFAULT_LIST_LIMIT);
    }

    #[test]
    fn not_found_is_not_retried() {
        let calls = RefCell::new(0);
        let transport = |_: &HttpRequest| {
            *calls.borrow_mut() += 1;
            Ok::<_, TransportError>(HttpResponse::empty(404))
        };
        let api = StorySchematicsApi::new(config(), &transport);
        let get = GetBeatsSheet::new(
            &api,
            "t",
            GetBeatsSheetParams {
                beats_sheet_id: ID.parse().unwrap(),
            },
        );
        let err = fetch_query(&get, &RetryPolicy::default()).unwrap_err();
        assert!(err.api().unwrap().is_not_found());
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn expand_beat_validation_error_is_kept() {
        let transport =
            |_: &HttpRequest| Ok::<_, TransportError>(HttpResponse::text(422, "unknown beat"));
        let api = StorySchematicsApi::new(config(), transport);
        let mut expand = MutationState::new(ExpandBeat::new(&api, "t"));
        let form = ExpandBeatForm {
            beats_sheet_id: ID.parse().unwrap(),
            target_key: "epilogue".to_string(),
        };
        assert!(expand.mutate(&form).unwrap_err().is_validation());
        assert_eq!(expand.status(), MutationStatus::Error);
        assert_eq!(
            expand.error().unwrap().to_string(),
            "validation: add details to beat: [422] unknown beat"
        );
    }
}
