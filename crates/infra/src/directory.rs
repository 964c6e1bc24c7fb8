//! Contact directory snapshot adapter
//!
//! Reads the `contacts.json` document the external fetcher maintains. The
//! fetcher writes sentinel strings ("No Phone", "No Email", "No Birthday")
//! for fields the remote directory has no value for; those normalize to
//! absent here.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;
use wishbot_core::ContactDirectory;
use wishbot_domain::{Contact, ContactBook, Result, WishBotError};

const NO_PHONE: &str = "No Phone";
const NO_EMAIL: &str = "No Email";

/// Contact record as the fetcher writes it
#[derive(Debug, Deserialize)]
struct RawContact {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Phone")]
    phone: Option<String>,
    #[serde(rename = "Email")]
    email: Option<String>,
    #[serde(rename = "Birthday")]
    birthday: Option<RawBirthday>,
}

/// Birthday field: a structured date, or the fetcher's sentinel string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBirthday {
    Date { year: Option<i32>, month: u32, day: u32 },
    Sentinel(String),
}

/// File-backed contact directory
pub struct FileContactDirectory {
    path: PathBuf,
}

impl FileContactDirectory {
    /// Create a directory adapter over the given snapshot path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContactDirectory for FileContactDirectory {
    async fn fetch(&self) -> Result<ContactBook> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            WishBotError::ContactDirectoryUnavailable(format!(
                "Contacts file not found. Ensure you have fetched contacts first. ({}: {})",
                self.path.display(),
                e
            ))
        })?;

        let raw: HashMap<String, RawContact> = serde_json::from_str(&contents).map_err(|e| {
            WishBotError::ContactDirectoryUnavailable(format!(
                "Invalid contacts document {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let contacts: ContactBook =
            raw.into_iter().map(|(key, contact)| (key, normalize(contact))).collect();
        debug!(count = contacts.len(), "contact directory loaded");
        Ok(contacts)
    }
}

fn normalize(raw: RawContact) -> Contact {
    Contact {
        name: raw.name.unwrap_or_else(|| "Unknown".to_string()),
        phone: raw.phone.filter(|p| !p.is_empty() && p != NO_PHONE),
        email: raw.email.filter(|e| !e.is_empty() && e != NO_EMAIL),
        birthday: raw.birthday.and_then(|b| match b {
            RawBirthday::Date { year: Some(year), month, day } => {
                NaiveDate::from_ymd_opt(year, month, day)
            }
            // Year-less birthdays and sentinel strings carry no usable date.
            RawBirthday::Date { year: None, .. } | RawBirthday::Sentinel(_) => None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn load(json: &str) -> ContactBook {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        std::fs::write(&path, json).unwrap();
        let directory = FileContactDirectory::new(path);
        directory.fetch().await.unwrap()
    }

    #[tokio::test]
    async fn parses_a_full_contact() {
        let book = load(
            r#"{
                "people/c1": {
                    "Name": "Asha Rao",
                    "Phone": "+911234567890",
                    "Email": "asha@example.com",
                    "Birthday": {"year": 1990, "month": 1, "day": 1}
                }
            }"#,
        )
        .await;
        let contact = &book["people/c1"];
        assert_eq!(contact.name, "Asha Rao");
        assert_eq!(contact.phone.as_deref(), Some("+911234567890"));
        assert_eq!(contact.birthday, NaiveDate::from_ymd_opt(1990, 1, 1));
    }

    #[tokio::test]
    async fn sentinel_fields_normalize_to_absent() {
        let book = load(
            r#"{
                "people/c2": {
                    "Name": "Ravi",
                    "Phone": "No Phone",
                    "Email": "No Email",
                    "Birthday": "No Birthday"
                }
            }"#,
        )
        .await;
        let contact = &book["people/c2"];
        assert_eq!(contact.phone, None);
        assert_eq!(contact.email, None);
        assert_eq!(contact.birthday, None);
    }

    #[tokio::test]
    async fn yearless_birthday_is_absent() {
        let book =
            load(r#"{"people/c3": {"Name": "Maya", "Birthday": {"month": 6, "day": 12}}}"#).await;
        assert_eq!(book["people/c3"].birthday, None);
    }

    #[tokio::test]
    async fn missing_file_is_directory_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let directory = FileContactDirectory::new(dir.path().join("absent.json"));
        let err = directory.fetch().await.unwrap_err();
        assert!(matches!(err, WishBotError::ContactDirectoryUnavailable(_)));
    }
}
