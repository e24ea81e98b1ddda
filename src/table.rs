use crate::client::{ResourceKind, ResourceRecord};
use crate::form::{
    ADDRESS, BIRTH_DATE, EMAIL, FIRST_NAME, FormMessage, GENDER, LAST_NAME, MessageStatus, PHONE,
    field_schema,
};
use crate::list::ListState;

const MISSING: &str = "N/A";
const ID_HEADER: &str = "ID";

/// Column headers for `kind`: the id, then the form fields in form order.
pub fn headers(kind: ResourceKind) -> Vec<&'static str> {
    std::iter::once(ID_HEADER)
        .chain(field_schema(kind).iter().map(|field| field.label))
        .collect()
}

/// One rendered table row, cells aligned with [`headers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    columns: Vec<(&'static str, String)>,
}

impl ListRow {
    pub fn cells(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(_, cell)| cell.as_str())
    }

    /// Cell under `header`, if the row has that column.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| *name == header)
            .map(|(_, cell)| cell.as_str())
    }
}

fn field_value<'a>(record: &'a ResourceRecord, field: &str) -> Option<&'a str> {
    match field {
        FIRST_NAME => record.given_name(),
        LAST_NAME => record.family_name(),
        GENDER => record.gender.as_deref(),
        BIRTH_DATE => record.birth_date.as_deref(),
        ADDRESS => record.first_address_line(),
        PHONE => record.telecom_value("phone"),
        EMAIL => record.telecom_value("email"),
        _ => None,
    }
}

pub fn row_for(kind: ResourceKind, record: &ResourceRecord) -> ListRow {
    let or_missing = |value: Option<&str>| {
        value
            .filter(|v| !v.is_empty())
            .unwrap_or(MISSING)
            .to_string()
    };

    let mut columns = vec![(ID_HEADER, or_missing(record.id.as_deref()))];
    columns.extend(
        field_schema(kind)
            .iter()
            .map(|field| (field.label, or_missing(field_value(record, field.name)))),
    );
    ListRow { columns }
}

pub fn format_records(kind: ResourceKind, records: &[ResourceRecord]) -> String {
    if records.is_empty() {
        return format!("No {} found.\n", kind.plural());
    }

    let headers = headers(kind);
    let rows: Vec<ListRow> = records.iter().map(|record| row_for(kind, record)).collect();
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    output.push_str(&format!("{} ({})\n", kind, rows.len()));
    push_line(&mut output, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_line(
        &mut output,
        &rule.iter().map(String::as_str).collect::<Vec<_>>(),
        &widths,
    );
    for row in &rows {
        push_line(&mut output, &row.cells().collect::<Vec<_>>(), &widths);
    }
    output
}

fn push_line(output: &mut String, cells: &[&str], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}", width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    output.push_str(line.trim_end());
    output.push('\n');
}

/// Id and "Given Family" of each practitioner a patient can be linked to.
pub fn format_practitioner_options(practitioners: &[ResourceRecord]) -> String {
    if practitioners.is_empty() {
        return format!("No {} found.\n", ResourceKind::Practitioner.plural());
    }

    let mut output = String::from("Available practitioners:\n");
    for practitioner in practitioners {
        let id = practitioner.id.as_deref().unwrap_or(MISSING);
        output.push_str(&format!("  {id}  {}\n", practitioner.display_name()));
    }
    output
}

/// Loading indicator, error banner or table; exactly one of them.
pub fn format_list(kind: ResourceKind, state: &ListState) -> String {
    match state {
        ListState::Loading => "Loading...\n".to_string(),
        ListState::Errored(message) => format!("{message}\n"),
        ListState::Populated(records) => format_records(kind, records),
    }
}

pub fn format_message(message: &FormMessage) -> String {
    match message.status {
        MessageStatus::Success => format!("[ok] {}", message.text),
        MessageStatus::Error => format!("[error] {}", message.text),
    }
}
