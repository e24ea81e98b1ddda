//! Command implementations behind the `fhirdesk` CLI.

use std::sync::Arc;
use std::time::Duration;

use crate::client::{ResourceClient, ResourceKind, ResourceRecord};
use crate::form::{
    ADDRESS, BIRTH_DATE, EMAIL, FIRST_NAME, GENDER, LAST_NAME, PHONE, ResourceForm,
};
use crate::list::{ListState, ResourceList, project_records};
use crate::page::ResourcePage;
use crate::table::{format_list, format_message, format_practitioner_options, format_records};

/// Field values for a create command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonInput {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub birth_date: Option<String>,
    pub practitioner: Option<String>,
}

impl PersonInput {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            (FIRST_NAME, self.first_name.as_str()),
            (LAST_NAME, self.last_name.as_str()),
            (GENDER, self.gender.as_str()),
            (ADDRESS, self.address.as_str()),
            (PHONE, self.phone.as_str()),
            (EMAIL, self.email.as_str()),
        ];
        if let Some(birth_date) = self.birth_date.as_deref() {
            fields.push((BIRTH_DATE, birth_date));
        }
        fields
    }
}

/// Parse a `name=value` search parameter.
pub fn parse_search_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got {raw:?}")),
    }
}

/// Fetch once and return the list as it would be shown, along with its final state.
pub async fn fetch_list<C>(client: Arc<C>, kind: ResourceKind) -> (ListState, String)
where
    C: ResourceClient + ?Sized,
{
    let list = ResourceList::new(kind, client);
    list.fetch().await;
    let state = list.snapshot();
    let rendered = format_list(kind, &state);
    (state, rendered)
}

pub async fn run_list<C>(
    client: Arc<C>,
    kind: ResourceKind,
) -> Result<(), Box<dyn std::error::Error>>
where
    C: ResourceClient + ?Sized,
{
    let (state, rendered) = fetch_list(client, kind).await;
    match state {
        ListState::Errored(message) => Err(message.into()),
        _ => {
            print!("{rendered}");
            Ok(())
        }
    }
}

/// Poll and reprint the list until Ctrl-C.
pub async fn run_watch<C>(
    client: Arc<C>,
    kind: ResourceKind,
    poll_interval: Duration,
) -> Result<(), Box<dyn std::error::Error>>
where
    C: ResourceClient + ?Sized + 'static,
{
    let page = ResourcePage::mount(kind, client, poll_interval).await;
    let mut updates = page.subscribe();
    println!(
        "Watching {} (refresh every {}s, Ctrl-C to stop)",
        kind.plural(),
        poll_interval.as_secs()
    );

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if !state.is_loading() {
                    print!("{}", format_list(kind, &state));
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }

    page.unmount().await;
    Ok(())
}

/// Fill and submit the create form for `kind`.
pub async fn run_create<C>(
    client: Arc<C>,
    kind: ResourceKind,
    input: &PersonInput,
) -> Result<ResourceRecord, Box<dyn std::error::Error>>
where
    C: ResourceClient + ?Sized,
{
    let mut form = ResourceForm::new(kind, client);
    for (name, value) in input.fields() {
        form.update_field(name, value)?;
    }
    if let Some(id) = input.practitioner.as_deref() {
        form.load_practitioners().await;
        if let Err(err) = form.select_practitioner(Some(id)) {
            eprint!("{}", format_practitioner_options(form.practitioners()));
            return Err(err.into());
        }
    }

    let result = form.submit().await;
    if let Some(message) = form.message() {
        if message.is_success() {
            println!("{}", format_message(message));
        } else {
            eprintln!("{}", format_message(message));
        }
    }
    Ok(result?)
}

pub async fn run_read<C>(
    client: Arc<C>,
    kind: ResourceKind,
    id: &str,
) -> Result<(), Box<dyn std::error::Error>>
where
    C: ResourceClient + ?Sized,
{
    let record = client.read(kind, id).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

pub async fn run_delete<C>(
    client: Arc<C>,
    kind: ResourceKind,
    id: &str,
) -> Result<(), Box<dyn std::error::Error>>
where
    C: ResourceClient + ?Sized,
{
    let outcome = client.delete(kind, id).await?;
    tracing::info!(%kind, %id, "resource deleted");
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

pub async fn run_search<C>(
    client: Arc<C>,
    kind: ResourceKind,
    params: &[(String, String)],
) -> Result<(), Box<dyn std::error::Error>>
where
    C: ResourceClient + ?Sized,
{
    let bundle = client.search(kind, params).await?;
    print!("{}", format_records(kind, &project_records(bundle)));
    Ok(())
}
