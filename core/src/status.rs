//! The service's HTTP surface as a table.
//!
//! # Design
//! Each `Operation` knows its method, path, diagnostic context and the
//! statuses it recognizes. `Operation::check` evaluates that table once per
//! response, so the resource operations share one status switch instead of
//! repeating it. Statuses an operation does not list fall through to
//! `Internal` like any other non-2xx.

use crate::error::{error_response_message, ApiError, ErrorKind};
use crate::http::{HttpMethod, HttpResponse};

/// How the message of a recognized status is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMessage {
    Fixed(&'static str),
    /// Rendered from the response by `error_response_message`.
    Diagnostic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRule {
    pub status: u16,
    pub kind: ErrorKind,
    pub message: RuleMessage,
}

impl StatusRule {
    const fn not_found(message: &'static str) -> Self {
        Self {
            status: 404,
            kind: ErrorKind::NotFound,
            message: RuleMessage::Fixed(message),
        }
    }
}

const UNAUTHORIZED: StatusRule = StatusRule {
    status: 401,
    kind: ErrorKind::Unauthorized,
    message: RuleMessage::Fixed("invalid credentials"),
};

const UNPROCESSABLE: StatusRule = StatusRule {
    status: 422,
    kind: ErrorKind::Validation,
    message: RuleMessage::Diagnostic,
};

const AUTH_ONLY: &[StatusRule] = &[UNAUTHORIZED];

const SOURCES_MISSING: &[StatusRule] = &[
    UNAUTHORIZED,
    StatusRule::not_found("the logline or story plan does not exist"),
];

const SOURCES_MISSING_OR_INVALID: &[StatusRule] = &[
    UNAUTHORIZED,
    StatusRule::not_found("the logline or story plan does not exist"),
    UNPROCESSABLE,
];

const BEATS_SHEET_MISSING: &[StatusRule] = &[
    UNAUTHORIZED,
    StatusRule::not_found("the beats sheet does not exist"),
];

const BEATS_SHEET_MISSING_OR_INVALID: &[StatusRule] = &[
    UNAUTHORIZED,
    StatusRule::not_found("the beats sheet does not exist"),
    UNPROCESSABLE,
];

const LOGLINE_MISSING: &[StatusRule] = &[UNAUTHORIZED, StatusRule::not_found("logline not found")];

const STORY_PLAN_MISSING: &[StatusRule] =
    &[UNAUTHORIZED, StatusRule::not_found("story plan not found")];

pub const BEATS_SHEET_PATH: &str = "/beats-sheet";
pub const BEATS_SHEETS_PATH: &str = "/beats-sheets";
pub const LOGLINE_PATH: &str = "/logline";
pub const LOGLINES_PATH: &str = "/loglines";
pub const STORY_PLAN_PATH: &str = "/story-plan";
pub const STORY_PLANS_PATH: &str = "/story-plans";

/// One remote operation of the story-schematics service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateBeatsSheet,
    GetBeatsSheet,
    GetAllBeatsSheets,
    GenerateBeatsSheet,
    RegenerateBeats,
    ExpandBeat,
    CreateLogline,
    GetLogline,
    GetAllLoglines,
    GenerateLoglines,
    ExpandLogline,
    CreateStoryPlan,
    UpdateStoryPlan,
    GetStoryPlan,
    GetAllStoryPlans,
}

impl Operation {
    pub const ALL: [Operation; 15] = [
        Operation::CreateBeatsSheet,
        Operation::GetBeatsSheet,
        Operation::GetAllBeatsSheets,
        Operation::GenerateBeatsSheet,
        Operation::RegenerateBeats,
        Operation::ExpandBeat,
        Operation::CreateLogline,
        Operation::GetLogline,
        Operation::GetAllLoglines,
        Operation::GenerateLoglines,
        Operation::ExpandLogline,
        Operation::CreateStoryPlan,
        Operation::UpdateStoryPlan,
        Operation::GetStoryPlan,
        Operation::GetAllStoryPlans,
    ];

    /// Stable snake_case identifier, used in logs and test vectors.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateBeatsSheet => "create_beats_sheet",
            Operation::GetBeatsSheet => "get_beats_sheet",
            Operation::GetAllBeatsSheets => "get_all_beats_sheets",
            Operation::GenerateBeatsSheet => "generate_beats_sheet",
            Operation::RegenerateBeats => "regenerate_beats",
            Operation::ExpandBeat => "expand_beat",
            Operation::CreateLogline => "create_logline",
            Operation::GetLogline => "get_logline",
            Operation::GetAllLoglines => "get_all_loglines",
            Operation::GenerateLoglines => "generate_loglines",
            Operation::ExpandLogline => "expand_logline",
            Operation::CreateStoryPlan => "create_story_plan",
            Operation::UpdateStoryPlan => "update_story_plan",
            Operation::GetStoryPlan => "get_story_plan",
            Operation::GetAllStoryPlans => "get_all_story_plans",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Prefix of diagnostic messages.
    pub fn context(&self) -> &'static str {
        match self {
            Operation::CreateBeatsSheet => "create beats sheet",
            Operation::GetBeatsSheet => "get beats sheet",
            Operation::GetAllBeatsSheets => "get all beats sheets",
            Operation::GenerateBeatsSheet => "generate beats sheet",
            Operation::RegenerateBeats => "regenerate beats sheet",
            Operation::ExpandBeat => "add details to beat",
            Operation::CreateLogline => "create logline",
            Operation::GetLogline => "get logline",
            Operation::GetAllLoglines => "get loglines",
            Operation::GenerateLoglines => "generate loglines",
            Operation::ExpandLogline => "expand logline",
            Operation::CreateStoryPlan => "create story plan",
            Operation::UpdateStoryPlan => "update story plan",
            Operation::GetStoryPlan => "get story plan",
            Operation::GetAllStoryPlans => "get all story plans",
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            Operation::CreateBeatsSheet | Operation::CreateLogline | Operation::CreateStoryPlan => {
                HttpMethod::Put
            }
            Operation::RegenerateBeats | Operation::ExpandBeat | Operation::UpdateStoryPlan => {
                HttpMethod::Patch
            }
            Operation::GenerateBeatsSheet
            | Operation::GenerateLoglines
            | Operation::ExpandLogline => HttpMethod::Post,
            Operation::GetBeatsSheet
            | Operation::GetAllBeatsSheets
            | Operation::GetLogline
            | Operation::GetAllLoglines
            | Operation::GetStoryPlan
            | Operation::GetAllStoryPlans => HttpMethod::Get,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Operation::CreateBeatsSheet | Operation::GetBeatsSheet => BEATS_SHEET_PATH,
            Operation::GetAllBeatsSheets => BEATS_SHEETS_PATH,
            Operation::GenerateBeatsSheet => "/beats-sheet/generate",
            Operation::RegenerateBeats => "/beats-sheet/regenerate",
            Operation::ExpandBeat => "/beats-sheet/expand",
            Operation::CreateLogline | Operation::GetLogline => LOGLINE_PATH,
            Operation::GetAllLoglines => LOGLINES_PATH,
            Operation::GenerateLoglines => "/loglines/generate",
            Operation::ExpandLogline => "/logline/expand",
            Operation::CreateStoryPlan | Operation::UpdateStoryPlan | Operation::GetStoryPlan => {
                STORY_PLAN_PATH
            }
            Operation::GetAllStoryPlans => STORY_PLANS_PATH,
        }
    }

    /// Statuses this operation maps to something other than `Internal`.
    pub fn rules(&self) -> &'static [StatusRule] {
        match self {
            Operation::CreateBeatsSheet => SOURCES_MISSING_OR_INVALID,
            Operation::GenerateBeatsSheet => SOURCES_MISSING,
            Operation::GetBeatsSheet | Operation::RegenerateBeats => BEATS_SHEET_MISSING,
            Operation::ExpandBeat => BEATS_SHEET_MISSING_OR_INVALID,
            Operation::GetLogline => LOGLINE_MISSING,
            Operation::UpdateStoryPlan | Operation::GetStoryPlan => STORY_PLAN_MISSING,
            Operation::GetAllBeatsSheets
            | Operation::CreateLogline
            | Operation::GetAllLoglines
            | Operation::GenerateLoglines
            | Operation::ExpandLogline
            | Operation::CreateStoryPlan
            | Operation::GetAllStoryPlans => AUTH_ONLY,
        }
    }

    /// Translate a response status into at most one error.
    pub fn check(&self, response: &HttpResponse) -> Result<(), ApiError> {
        if let Some(rule) = self.rules().iter().find(|r| r.status == response.status) {
            let message = match rule.message {
                RuleMessage::Fixed(message) => message.to_string(),
                RuleMessage::Diagnostic => error_response_message(self.context(), response),
            };
            return Err(ApiError::new(rule.kind, message));
        }
        if !response.is_success() {
            return Err(ApiError::Internal(error_response_message(
                self.context(),
                response,
            )));
        }
        Ok(())
    }
}
