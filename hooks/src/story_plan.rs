//! Story plan adapters.

use story_schematics_core::bindings::{
    CreateStoryPlanForm, GetAllStoryPlansParams, GetStoryPlanParams, StoryPlan, StoryPlanPreview,
    UpdateStoryPlanForm,
};
use story_schematics_core::{ApiError, HttpTransport, StorySchematicsApi};

use crate::infinite::InfiniteQuery;
use crate::key::QueryKey;
use crate::query::{Mutation, Query};

const RESOURCE: &str = "story plan";

pub const DEFAULT_LIST_LIMIT: u32 = 100;

pub struct CreateStoryPlan<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
}

impl<'a, T> CreateStoryPlan<'a, T> {
    pub fn new(api: &'a StorySchematicsApi<T>, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
        }
    }
}

impl<T: HttpTransport> Mutation for CreateStoryPlan<'_, T> {
    type Input = CreateStoryPlanForm;
    type Output = StoryPlan;

    fn key(&self) -> QueryKey {
        QueryKey::new(RESOURCE, "create")
    }

    fn mutate(&self, form: &CreateStoryPlanForm) -> Result<StoryPlan, ApiError> {
        self.api.create_story_plan(&self.token, form)
    }
}

pub struct UpdateStoryPlan<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
}

impl<'a, T> UpdateStoryPlan<'a, T> {
    pub fn new(api: &'a StorySchematicsApi<T>, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
        }
    }
}

impl<T: HttpTransport> Mutation for UpdateStoryPlan<'_, T> {
    type Input = UpdateStoryPlanForm;
    type Output = StoryPlan;

    fn key(&self) -> QueryKey {
        QueryKey::new(RESOURCE, "update")
    }

    fn mutate(&self, form: &UpdateStoryPlanForm) -> Result<StoryPlan, ApiError> {
        self.api.update_story_plan(&self.token, form)
    }
}

pub struct GetStoryPlan<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
    params: GetStoryPlanParams,
}

impl<'a, T> GetStoryPlan<'a, T> {
    pub fn new(
        api: &'a StorySchematicsApi<T>,
        token: impl Into<String>,
        params: GetStoryPlanParams,
    ) -> Self {
        Self {
            api,
            token: token.into(),
            params,
        }
    }
}

impl<T: HttpTransport> Query for GetStoryPlan<'_, T> {
    type Output = StoryPlan;

    fn key(&self) -> QueryKey {
        QueryKey::new(RESOURCE, "get")
            .with_params(&self.params)
            .with_token(&self.token)
    }

    fn enabled(&self) -> bool {
        !self.token.is_empty()
            && (self.params.id.is_some() || self.params.slug.as_deref().is_some_and(|s| !s.is_empty()))
    }

    fn fetch_one(&self) -> Result<StoryPlan, ApiError> {
        self.api.get_story_plan(&self.token, &self.params)
    }
}

pub struct GetAllStoryPlans<'a, T> {
    api: &'a StorySchematicsApi<T>,
    token: String,
    params: GetAllStoryPlansParams,
}

impl<'a, T> GetAllStoryPlans<'a, T> {
    pub fn new(
        api: &'a StorySchematicsApi<T>,
        token: impl Into<String>,
        params: GetAllStoryPlansParams,
    ) -> Self {
        Self {
            api,
            token: token.into(),
            params,
        }
    }
}

impl<T: HttpTransport> InfiniteQuery for GetAllStoryPlans<'_, T> {
    type Item = StoryPlanPreview;

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

    fn fetch_page(&self, offset: u32) -> Result<Vec<StoryPlanPreview>, ApiError> {
        let params = GetAllStoryPlansParams {
            offset: Some(offset),
            ..self.params.clone()
        };
        self.api.get_all_story_plans(&self.token, &params)
    }
}
