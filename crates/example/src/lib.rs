//! Example crate demonstrating typescriptify usage.
//!
//! The models below derive `TypeScriptify`, so they can be registered with
//! `Converter::add::<T>()` (see the `generate-bindings` binary). The build
//! script produces the same bindings by scanning this file instead.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use typescriptify::TypeScriptify;

/// Fields shared by everything that has a display name.
#[derive(Serialize, Deserialize, TypeScriptify, Debug, Clone, PartialEq)]
pub struct HasName {
    pub name: String,
}

/// A postal address.
#[derive(Serialize, Deserialize, TypeScriptify, Debug, Clone, PartialEq)]
pub struct Address {
    pub city: String,
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    #[ts(json = "country,omitempty")]
    pub country: Option<String>,
}

/// Account state. Serialized as a plain string, so the class property is
/// typed `any`.
#[derive(Serialize, Deserialize, TypeScriptify, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Suspended,
}

/// A person in the address book.
#[derive(Serialize, Deserialize, TypeScriptify, Debug, Clone, PartialEq)]
pub struct Person {
    #[serde(flatten)]
    pub has_name: HasName,
    pub nickname: Option<String>,
    #[ts(ts_type = "Date", ts_transform = "new Date(__VALUE__)")]
    pub birthday: NaiveDate,
    pub addresses: Vec<Address>,
    pub status: Status,
    pub friends: Vec<Box<Person>>,
    pub tags: HashMap<String, String>,
    #[serde(skip)]
    pub cached_score: u32,
}

/// A page of search results.
#[derive(Serialize, Deserialize, TypeScriptify, Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub query: String,
    pub people: Vec<Person>,
    #[ts(json = "matrix")]
    pub relevance: Vec<Vec<f64>>,
    #[ts(ts_type = "string")]
    pub generated_at: DateTime<Utc>,
}
