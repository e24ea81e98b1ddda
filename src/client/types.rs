use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The resource types this desk knows how to create and list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ResourceKind {
    Patient,
    Practitioner,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Patient => "Patient",
            ResourceKind::Practitioner => "Practitioner",
        }
    }

    /// Lower-case plural used in user-facing messages ("patients").
    pub fn plural(self) -> &'static str {
        match self {
            ResourceKind::Patient => "patients",
            ResourceKind::Practitioner => "practitioners",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "patient" => Ok(ResourceKind::Patient),
            "practitioner" => Ok(ResourceKind::Practitioner),
            other => Err(format!("unsupported resource type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HumanName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ContactPoint {
    pub fn new(system: &str, value: &str) -> Self {
        Self {
            system: Some(system.to_string()),
            value: Some(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// A Patient or Practitioner document as sent to and returned by the server.
///
/// Only the members the desk reads or writes are typed. Everything else the server sends
/// (`meta`, `text`, extensions) lands in `extra` and is written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Vec<HumanName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub address: Vec<Address>,
    #[serde(default)]
    pub telecom: Vec<ContactPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_practitioner: Option<Vec<Reference>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceRecord {
    pub fn given_name(&self) -> Option<&str> {
        self.name.first()?.given.first().map(String::as_str)
    }

    pub fn family_name(&self) -> Option<&str> {
        self.name.first()?.family.as_deref()
    }

    pub fn first_address_line(&self) -> Option<&str> {
        self.address.first()?.line.first().map(String::as_str)
    }

    /// Value of the first telecom entry with the given system.
    pub fn telecom_value(&self, system: &str) -> Option<&str> {
        self.telecom
            .iter()
            .find(|contact| contact.system.as_deref() == Some(system))
            .and_then(|contact| contact.value.as_deref())
    }

    /// "Given Family", skipping whichever part is missing.
    pub fn display_name(&self) -> String {
        [self.given_name(), self.family_name()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceRecord>,
}

/// Search/list envelope. A server with no matches may omit `entry` entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    pub fn from_records(records: Vec<ResourceRecord>) -> Self {
        Self {
            resource_type: Some("Bundle".to_string()),
            total: Some(records.len() as u64),
            entry: records
                .into_iter()
                .map(|resource| BundleEntry {
                    full_url: None,
                    resource: Some(resource),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_patient_resource() {
        let json = r#"{
            "resourceType":"Patient",
            "id":"123",
            "meta":{"versionId":"1"},
            "name":[{"family":"Doe","given":["John"]}],
            "gender":"male",
            "birthDate":"1990-01-01",
            "address":[{"line":["1 Main St"]}],
            "telecom":[{"system":"phone","value":"555"},{"system":"email","value":"j@d.org"}],
            "generalPractitioner":[{"reference":"Practitioner/42"}]
        }"#;
        let record: ResourceRecord = serde_json::from_str(json).expect("resource parse");
        assert_eq!(record.resource_type, "Patient");
        assert_eq!(record.id.as_deref(), Some("123"));
        assert_eq!(record.given_name(), Some("John"));
        assert_eq!(record.family_name(), Some("Doe"));
        assert_eq!(record.first_address_line(), Some("1 Main St"));
        assert_eq!(record.telecom_value("email"), Some("j@d.org"));
        assert_eq!(record.birth_date.as_deref(), Some("1990-01-01"));
        assert!(record.extra.contains_key("meta"));
    }

    #[test]
    fn unknown_members_survive_a_round_trip() {
        let json = r#"{"resourceType":"Practitioner","id":"7","active":true}"#;
        let record: ResourceRecord = serde_json::from_str(json).expect("resource parse");
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["active"], Value::Bool(true));
        assert!(value.get("generalPractitioner").is_none());
    }

    #[test]
    fn bundle_without_entry_is_empty() {
        let bundle: Bundle =
            serde_json::from_str(r#"{"resourceType":"Bundle","total":0}"#).expect("bundle parse");
        assert!(bundle.entry.is_empty());
    }

    #[test]
    fn display_name_skips_missing_parts() {
        let record = ResourceRecord {
            resource_type: "Patient".to_string(),
            name: vec![HumanName {
                family: Some("Doe".to_string()),
                given: vec![],
            }],
            ..Default::default()
        };
        assert_eq!(record.display_name(), "Doe");
    }

    #[test]
    fn resource_kind_parses_case_insensitively() {
        assert_eq!("patient".parse::<ResourceKind>(), Ok(ResourceKind::Patient));
        assert_eq!(
            "Practitioner".parse::<ResourceKind>(),
            Ok(ResourceKind::Practitioner)
        );
        assert!("Observation".parse::<ResourceKind>().is_err());
    }
}
