//! Field checks applied before a row is written.

use db::models::{
    company::{CreateCompany, UpdateCompany},
    deal::{CreateDeal, UpdateDeal},
    interaction::{CreateInteraction, UpdateInteraction},
    lead::{CreateLead, UpdateLead},
    task::{CreateTask, UpdateTask},
};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const MAX_NOTE_CHARS: usize = 4000;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError(format!("{field} is required")));
    }
    Ok(())
}

fn not_blank(field: &str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(value) => required(field, value),
        None => Ok(()),
    }
}

fn email(value: &str) -> Result<(), ValidationError> {
    if !EMAIL.is_match(value.trim()) {
        return Err(ValidationError("email must be a valid email address".to_string()));
    }
    Ok(())
}

fn note(value: Option<&str>) -> Result<(), ValidationError> {
    if value.is_some_and(|note| note.chars().count() > MAX_NOTE_CHARS) {
        return Err(ValidationError(format!(
            "note cannot exceed {MAX_NOTE_CHARS} characters"
        )));
    }
    Ok(())
}

impl Validate for CreateLead {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)?;
        required("email", &self.email)?;
        email(&self.email)?;
        required("phone", &self.phone)?;
        required("status", &self.status)?;
        required("client_domain", &self.client_domain)?;
        required("contact_platform", &self.contact_platform)?;
        required("location", &self.location)?;
        note(self.note.as_deref())
    }
}

impl Validate for UpdateLead {
    fn validate(&self) -> Result<(), ValidationError> {
        not_blank("name", self.name.as_deref())?;
        if let Some(value) = self.email.as_deref() {
            email(value)?;
        }
        not_blank("phone", self.phone.as_deref())?;
        not_blank("status", self.status.as_deref())?;
        not_blank("client_domain", self.client_domain.as_deref())?;
        not_blank("contact_platform", self.contact_platform.as_deref())?;
        not_blank("location", self.location.as_deref())?;
        note(self.note.as_ref().and_then(|n| n.as_deref()))
    }
}

impl Validate for CreateCompany {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)
    }
}

impl Validate for UpdateCompany {
    fn validate(&self) -> Result<(), ValidationError> {
        not_blank("name", self.name.as_deref())
    }
}

impl Validate for CreateInteraction {
    fn validate(&self) -> Result<(), ValidationError> {
        required("interaction_type", &self.interaction_type)
    }
}

impl Validate for UpdateInteraction {
    fn validate(&self) -> Result<(), ValidationError> {
        not_blank("interaction_type", self.interaction_type.as_deref())
    }
}

impl Validate for CreateDeal {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("stage", &self.stage)
    }
}

impl Validate for UpdateDeal {
    fn validate(&self) -> Result<(), ValidationError> {
        not_blank("title", self.title.as_deref())?;
        not_blank("stage", self.stage.as_deref())
    }
}

impl Validate for CreateTask {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)
    }
}

impl Validate for UpdateTask {
    fn validate(&self) -> Result<(), ValidationError> {
        not_blank("title", self.title.as_deref())
    }
}
