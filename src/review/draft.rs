use crate::api::{CallId, ContactFields, ExtractedInfo, ExtractedInfoId, ReviewPayload};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Placeholder sent when the reviewer leaves the notes empty
pub const DEFAULT_REVIEW_NOTES: &str = "No notes provided.";

/// One editable field of the extracted contact info
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    ClientName,
    CompanyName,
    ContactNumber,
    Email,
    ServiceInterest,
    ReviewNotes,
}

impl DraftField {
    pub const ALL: [DraftField; 6] = [
        DraftField::ClientName,
        DraftField::CompanyName,
        DraftField::ContactNumber,
        DraftField::Email,
        DraftField::ServiceInterest,
        DraftField::ReviewNotes,
    ];

    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::ClientName => "client_name",
            DraftField::CompanyName => "company_name",
            DraftField::ContactNumber => "contact_number",
            DraftField::Email => "email",
            DraftField::ServiceInterest => "service_interest",
            DraftField::ReviewNotes => "review_notes",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DraftField::ClientName => "Client Name",
            DraftField::CompanyName => "Company Name",
            DraftField::ContactNumber => "Contact Number",
            DraftField::Email => "Email",
            DraftField::ServiceInterest => "Service Interest",
            DraftField::ReviewNotes => "Review Notes",
        }
    }

    fn get(self, fields: &ContactFields) -> Option<&str> {
        match self {
            DraftField::ClientName => fields.client_name.as_deref(),
            DraftField::CompanyName => fields.company_name.as_deref(),
            DraftField::ContactNumber => fields.contact_number.as_deref(),
            DraftField::Email => fields.email.as_deref(),
            DraftField::ServiceInterest => fields.service_interest.as_deref(),
            DraftField::ReviewNotes => fields.review_notes.as_deref(),
        }
    }

    fn slot(self, fields: &mut ContactFields) -> &mut Option<String> {
        match self {
            DraftField::ClientName => &mut fields.client_name,
            DraftField::CompanyName => &mut fields.company_name,
            DraftField::ContactNumber => &mut fields.contact_number,
            DraftField::Email => &mut fields.email,
            DraftField::ServiceInterest => &mut fields.service_interest,
            DraftField::ReviewNotes => &mut fields.review_notes,
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown field '{0}' (expected one of client_name, company_name, contact_number, email, service_interest, review_notes)")]
pub struct UnknownField(pub String);

impl FromStr for DraftField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DraftField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Local, unsubmitted copy of a call's extracted info
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDraft {
    call_id: CallId,
    info_id: Option<ExtractedInfoId>,
    seed: ContactFields,
    fields: ContactFields,
}

impl ReviewDraft {
    /// Fresh draft for a call. No extracted info yet means every field is empty.
    pub fn seed(call_id: CallId, info: Option<&ExtractedInfo>) -> Self {
        let seed = info.map(|info| info.fields.clone()).unwrap_or_default();
        Self {
            call_id,
            info_id: info.map(|info| info.id.clone()),
            fields: seed.clone(),
            seed,
        }
    }

    pub fn call_id(&self) -> &CallId {
        &self.call_id
    }

    pub fn info_id(&self) -> Option<&ExtractedInfoId> {
        self.info_id.as_ref()
    }

    pub fn fields(&self) -> &ContactFields {
        &self.fields
    }

    pub fn get(&self, field: DraftField) -> Option<&str> {
        field.get(&self.fields)
    }

    /// Overwrite one field; an empty value clears it
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        *field.slot(&mut self.fields) = if value.is_empty() { None } else { Some(value) };
    }

    /// Whether any field differs from the server copy
    pub fn is_dirty(&self) -> bool {
        self.fields != self.seed
    }

    /// Request body for a transition.
    ///
    /// Notes given here win over the draft's own notes; when both are empty the
    /// placeholder is sent. `None` when there is no extracted info to submit.
    pub fn to_payload(&self, notes: Option<&str>) -> Option<ReviewPayload> {
        let id = self.info_id.clone()?;

        let notes = notes
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.get(DraftField::ReviewNotes).filter(|n| !n.trim().is_empty()))
            .unwrap_or(DEFAULT_REVIEW_NOTES)
            .to_string();

        let mut fields = self.fields.clone();
        fields.review_notes = Some(notes);

        Some(ReviewPayload {
            id,
            call_id: self.call_id.clone(),
            fields,
        })
    }
}
