use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::WorksheetSummary;

#[derive(Debug, Deserialize)]
pub(super) struct WorksheetLookup {
    #[serde(default)]
    pub(super) data: Vec<WorksheetSummary>,
}

#[derive(Debug, Serialize)]
pub(super) struct CliRequest<'a> {
    pub(super) worksheet_uuid: &'a str,
    pub(super) command: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub(super) autocomplete: bool,
}

/// Response of `POST /rest/cli/command`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CliResponse {
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub exception: Option<String>,
    #[serde(default)]
    pub structured_result: Option<StructuredResult>,
    #[serde(default)]
    pub completions: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredResult {
    /// Output token → object it names.
    #[serde(default)]
    pub refs: BTreeMap<String, RefTarget>,
    /// Raw `[name, param]` pairs; parsed by the terminal.
    #[serde(default)]
    pub ui_actions: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefTarget {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct HelpRequest<'a> {
    pub(super) message: &'a str,
}

/// Fields of the sign-up form, posted form-encoded.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SignupForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub affiliation: String,
    #[serde(rename = "g-recaptcha-response")]
    pub captcha_token: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignupOutcome {
    /// `302` from the server; the account was created.
    Created,
    /// Any other 2xx: the server re-rendered the form with errors.
    Rejected,
}
