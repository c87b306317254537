use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::StoreError;

/// Every user, keyed by username. This is also the persisted layout.
pub type RecordSet = BTreeMap<String, UserEntry>;

/// The persisted value for a single username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A user record along with the username it's stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct User {
    pub username: String,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }

    pub(crate) fn from_entry(username: &str, entry: &UserEntry) -> Self {
        Self {
            username: username.to_owned(),
            id: entry.id.clone(),
            name: entry.name.clone(),
            description: entry.description.clone(),
        }
    }

    /// First required field that's empty, checked in form order.
    pub(crate) fn missing_field(&self) -> Option<&'static str> {
        [
            ("username", &self.username),
            ("id", &self.id),
            ("name", &self.name),
        ]
        .into_iter()
        .find(|(_, value)| is_blank(value))
        .map(|(field, _)| field)
    }

    pub(crate) fn validate(&self) -> Result<(), StoreError> {
        require("username", &self.username)?;
        self.validate_fields()
    }

    pub(crate) fn validate_fields(&self) -> Result<(), StoreError> {
        require("id", &self.id)?;
        require("name", &self.name)
    }

    pub(crate) fn into_parts(self) -> (String, UserEntry) {
        (
            self.username,
            UserEntry {
                id: self.id,
                name: self.name,
                description: self.description,
            },
        )
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn require(field: &'static str, value: &str) -> Result<(), StoreError> {
    if is_blank(value) {
        Err(StoreError::Validation { field })
    } else {
        Ok(())
    }
}
