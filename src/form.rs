//! Create-resource form view-model, shared by the Patient and Practitioner pages.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::client::{
    Address, ContactPoint, HumanName, Reference, ResourceClient, ResourceKind, ResourceRecord,
};
use crate::error::{ClientError, FormError, FormResult};
use crate::list::project_records;

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const GENDER: &str = "gender";
pub const BIRTH_DATE: &str = "birthDate";
pub const ADDRESS: &str = "address";
pub const PHONE: &str = "phone";
pub const EMAIL: &str = "email";

/// Values the gender field is expected to hold. Passed to the server verbatim.
pub const GENDERS: [&str; 3] = ["male", "female", "other"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
}

const fn required(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        required: true,
    }
}

const PRACTITIONER_FIELDS: &[FieldSpec] = &[
    required(FIRST_NAME, "First name"),
    required(LAST_NAME, "Last name"),
    required(GENDER, "Gender"),
    required(ADDRESS, "Address"),
    required(PHONE, "Phone"),
    required(EMAIL, "Email"),
];

const PATIENT_FIELDS: &[FieldSpec] = &[
    required(FIRST_NAME, "First name"),
    required(LAST_NAME, "Last name"),
    required(GENDER, "Gender"),
    required(BIRTH_DATE, "Birth date"),
    required(ADDRESS, "Address"),
    required(PHONE, "Phone"),
    required(EMAIL, "Email"),
];

/// Form fields collected for `kind`, in display order.
pub fn field_schema(kind: ResourceKind) -> &'static [FieldSpec] {
    match kind {
        ResourceKind::Patient => PATIENT_FIELDS,
        ResourceKind::Practitioner => PRACTITIONER_FIELDS,
    }
}

fn has_practitioner_selector(kind: ResourceKind) -> bool {
    kind == ResourceKind::Patient
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    kind: ResourceKind,
    values: BTreeMap<&'static str, String>,
    practitioner: Option<String>,
}

impl FormState {
    /// Every schema field blank, no practitioner selected.
    pub fn empty(kind: ResourceKind) -> Self {
        Self {
            kind,
            values: field_schema(kind)
                .iter()
                .map(|field| (field.name, String::new()))
                .collect(),
            practitioner: None,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Current value of `name`; empty for fields outside the schema.
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn practitioner(&self) -> Option<&str> {
        self.practitioner.as_deref()
    }

    /// Required fields that are blank, in schema order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        field_schema(self.kind)
            .iter()
            .filter(|field| field.required && self.get(field.name).trim().is_empty())
            .map(|field| field.name)
            .collect()
    }
}

/// Map form values onto the FHIR document shape the server expects.
pub fn build_payload(state: &FormState) -> ResourceRecord {
    let kind = state.kind();
    let is_patient = kind == ResourceKind::Patient;

    ResourceRecord {
        resource_type: kind.as_str().to_string(),
        id: None,
        name: vec![HumanName {
            family: Some(state.get(LAST_NAME).to_string()),
            given: vec![state.get(FIRST_NAME).to_string()],
        }],
        gender: Some(state.get(GENDER).to_string()),
        birth_date: is_patient.then(|| state.get(BIRTH_DATE).to_string()),
        address: vec![Address {
            line: vec![state.get(ADDRESS).to_string()],
        }],
        telecom: vec![
            ContactPoint::new("phone", state.get(PHONE)),
            ContactPoint::new("email", state.get(EMAIL)),
        ],
        general_practitioner: is_patient.then(|| {
            state
                .practitioner()
                .map(|id| Reference {
                    reference: Some(format!("Practitioner/{id}")),
                })
                .into_iter()
                .collect()
        }),
        extra: Default::default(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Success,
    Error,
}

/// Banner shown under the form after a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessage {
    pub status: MessageStatus,
    pub text: String,
}

impl FormMessage {
    fn success(text: String) -> Self {
        Self {
            status: MessageStatus::Success,
            text,
        }
    }

    fn error(text: String) -> Self {
        Self {
            status: MessageStatus::Error,
            text,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == MessageStatus::Success
    }
}

type CreatedCallback = Box<dyn FnMut(&ResourceRecord) + Send>;

pub struct ResourceForm<C: ResourceClient + ?Sized> {
    kind: ResourceKind,
    client: Arc<C>,
    state: FormState,
    message: Option<FormMessage>,
    practitioners: Vec<ResourceRecord>,
    on_created: Option<CreatedCallback>,
}

impl<C: ResourceClient + ?Sized> ResourceForm<C> {
    pub fn new(kind: ResourceKind, client: Arc<C>) -> Self {
        Self {
            kind,
            client,
            state: FormState::empty(kind),
            message: None,
            practitioners: Vec::new(),
            on_created: None,
        }
    }

    /// Called once per successful submit, after the form has been reset.
    pub fn on_created(mut self, callback: impl FnMut(&ResourceRecord) + Send + 'static) -> Self {
        self.on_created = Some(Box::new(callback));
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn message(&self) -> Option<&FormMessage> {
        self.message.as_ref()
    }

    /// Practitioners offered by the selector (Patient form only).
    pub fn practitioners(&self) -> &[ResourceRecord] {
        &self.practitioners
    }

    pub fn update_field(&mut self, name: &str, value: impl Into<String>) -> FormResult<()> {
        match self.state.values.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(FormError::UnknownField {
                kind: self.kind,
                name: name.to_string(),
            }),
        }
    }

    /// Select (or with `None`, clear) the patient's general practitioner.
    ///
    /// The id must belong to the list fetched by [`load_practitioners`](Self::load_practitioners).
    pub fn select_practitioner(&mut self, id: Option<&str>) -> FormResult<()> {
        if !has_practitioner_selector(self.kind) {
            return Err(FormError::PractitionerNotSupported(self.kind));
        }

        let Some(id) = id.filter(|id| !id.is_empty()) else {
            self.state.practitioner = None;
            return Ok(());
        };

        let known = self
            .practitioners
            .iter()
            .any(|practitioner| practitioner.id.as_deref() == Some(id));
        if !known {
            return Err(FormError::UnknownPractitioner(id.to_string()));
        }

        self.state.practitioner = Some(id.to_string());
        Ok(())
    }

    /// Fetch the practitioner selector options once. Failures leave the selector empty.
    pub async fn load_practitioners(&mut self) {
        if !has_practitioner_selector(self.kind) {
            return;
        }

        match self.client.get(ResourceKind::Practitioner).await {
            Ok(bundle) => {
                self.practitioners = project_records(bundle);
                tracing::debug!(
                    count = self.practitioners.len(),
                    "loaded practitioner options"
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch practitioners");
            }
        }
    }

    pub fn build_payload(&self) -> ResourceRecord {
        build_payload(&self.state)
    }

    /// Submit the form. The outcome is also left in [`message`](Self::message).
    pub async fn submit(&mut self) -> FormResult<ResourceRecord> {
        let missing = self.state.missing_required();
        if !missing.is_empty() {
            let err = FormError::MissingRequired(missing);
            self.message = Some(FormMessage::error(format!("Error: {err}")));
            return Err(err);
        }

        let payload = self.build_payload();
        match self.client.create(self.kind, &payload).await {
            Ok(created) => {
                let id = created.id.as_deref().unwrap_or("unknown");
                tracing::info!(kind = %self.kind, %id, "resource created");
                self.message = Some(FormMessage::success(format!(
                    "{} created successfully. ID: {id}",
                    self.kind
                )));
                self.state = FormState::empty(self.kind);
                if let Some(callback) = self.on_created.as_mut() {
                    callback(&created);
                }
                Ok(created)
            }
            Err(err) => {
                tracing::warn!(kind = %self.kind, error = %err, "create failed");
                self.message = Some(FormMessage::error(submit_error_text(&err)));
                Err(err.into())
            }
        }
    }
}

fn submit_error_text(err: &ClientError) -> String {
    match err {
        ClientError::Api { body, .. } => format!("Error: {body}"),
        ClientError::Transport(description) => format!("Connection error: {description}"),
        other => format!("Error: {other}"),
    }
}
