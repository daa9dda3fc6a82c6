// Setup flow: collect url + token, probe the household, create one entry per household

use crate::api_client::TerminalApi;
use crate::entry_repo::{EntryRepo, EntryRepoError};
use crate::models::{ConfigEntry, ConnectionConfig, NewEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const STEP_USER: &str = "user";
pub const FIELD_URL: &str = "url";
pub const FIELD_TOKEN: &str = "token";
pub const ERROR_BASE: &str = "base";
pub const ABORT_ALREADY_CONFIGURED: &str = "already_configured";

#[derive(Debug, Clone, Deserialize)]
pub struct UserInput {
    pub url: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SetupOutcome {
    /// (Re)show the form, with errors keyed by field or `"base"`.
    Form {
        step_id: String,
        fields: Vec<String>,
        errors: BTreeMap<String, String>,
    },
    CreateEntry { entry: ConfigEntry },
    Abort { reason: String },
}

impl SetupOutcome {
    fn form(errors: BTreeMap<String, String>) -> Self {
        SetupOutcome::Form {
            step_id: STEP_USER.into(),
            fields: vec![FIELD_URL.into(), FIELD_TOKEN.into()],
            errors,
        }
    }

    fn form_error(key: &str) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(ERROR_BASE.to_string(), key.to_string());
        Self::form(errors)
    }

    fn already_configured() -> Self {
        SetupOutcome::Abort {
            reason: ABORT_ALREADY_CONFIGURED.into(),
        }
    }
}

pub struct SetupFlow<'a> {
    api: &'a TerminalApi,
    repo: &'a EntryRepo,
}

impl<'a> SetupFlow<'a> {
    pub fn new(api: &'a TerminalApi, repo: &'a EntryRepo) -> Self {
        Self { api, repo }
    }

    /// `None` shows the empty form. Credential problems come back as form errors;
    /// only storage failures are `Err`.
    pub async fn submit(&self, input: Option<UserInput>) -> anyhow::Result<SetupOutcome> {
        let Some(input) = input else {
            return Ok(SetupOutcome::form(BTreeMap::new()));
        };
        let connection = ConnectionConfig::new(&input.url, &input.token);
        if connection.base_url.is_empty() || connection.token.is_empty() {
            return Ok(SetupOutcome::form_error("cannot_connect"));
        }

        let household = match self
            .api
            .validate(&connection.base_url, &connection.token)
            .await
        {
            Ok(h) => h,
            Err(e) => {
                tracing::debug!(
                    operation = "setup",
                    url = %connection.base_url,
                    error = %e,
                    "setup probe failed"
                );
                return Ok(SetupOutcome::form_error(e.form_error()));
            }
        };

        if self.repo.find_by_unique_id(&household.id).await?.is_some() {
            return Ok(SetupOutcome::already_configured());
        }

        match self
            .repo
            .insert(NewEntry {
                unique_id: household.id,
                title: household.display_name,
                connection,
            })
            .await
        {
            Ok(entry) => {
                tracing::info!(
                    operation = "setup",
                    entry_id = %entry.entry_id,
                    household = %entry.title,
                    "config entry created"
                );
                Ok(SetupOutcome::CreateEntry { entry })
            }
            Err(EntryRepoError::AlreadyConfigured(_)) => Ok(SetupOutcome::already_configured()),
            Err(EntryRepoError::Db(e)) => Err(e.into()),
        }
    }
}
