//! Static registry of the five resource types: collection names, validator
//! schemas and declared cross-references, plus the read-side expansion
//! ("populate") of those references.

use serde_json::Value;
use uuid::Uuid;

use crate::schema::{self, Schema};
use crate::store::{Document, DocumentStore, StoreError};

/// A declared cross-reference: `field` holds the id of a document living in
/// `collection`, and is expanded to the full document on reads.
#[derive(Debug)]
pub struct ExpandRef {
    pub field: &'static str,
    pub collection: &'static str,
}

#[derive(Debug)]
pub struct ResourceSpec {
    /// Type name used in error bodies, e.g. "Game not found".
    pub type_name: &'static str,
    pub collection: &'static str,
    pub schema: &'static Schema,
    pub expand: &'static [ExpandRef],
    /// Whether documents get a `createdAt` stamp at creation.
    pub timestamps: bool,
}

pub static USERS: ResourceSpec = ResourceSpec {
    type_name: "User",
    collection: "users",
    schema: &schema::USER,
    expand: &[],
    timestamps: true,
};

pub static GAMES: ResourceSpec = ResourceSpec {
    type_name: "Game",
    collection: "games",
    schema: &schema::GAME,
    expand: &[ExpandRef { field: "developer", collection: "developers" }],
    timestamps: true,
};

pub static DEVELOPERS: ResourceSpec = ResourceSpec {
    type_name: "Developer",
    collection: "developers",
    schema: &schema::DEVELOPER,
    expand: &[],
    timestamps: false,
};

pub static CHARACTERS: ResourceSpec = ResourceSpec {
    type_name: "Character",
    collection: "characters",
    schema: &schema::CHARACTER,
    expand: &[ExpandRef { field: "firstAppearance", collection: "games" }],
    timestamps: false,
};

pub static REVIEWS: ResourceSpec = ResourceSpec {
    type_name: "Review",
    collection: "reviews",
    schema: &schema::REVIEW,
    expand: &[
        ExpandRef { field: "game", collection: "games" },
        ExpandRef { field: "user", collection: "users" },
    ],
    timestamps: true,
};

pub static ALL: &[&ResourceSpec] = &[&USERS, &GAMES, &DEVELOPERS, &CHARACTERS, &REVIEWS];

/// Collection names for store initialization.
pub fn collections() -> Vec<&'static str> {
    ALL.iter().map(|spec| spec.collection).collect()
}

/// Replaces each declared reference id in `doc` with the full referenced
/// document. A dangling or malformed reference is left as the raw id; there is
/// no cascade between collections to keep it consistent.
pub async fn expand_document(
    store: &dyn DocumentStore,
    spec: &ResourceSpec,
    doc: &mut Document,
) -> Result<(), StoreError> {
    for reference in spec.expand {
        let Some(Value::String(raw)) = doc.get(reference.field) else {
            continue;
        };
        let Ok(id) = raw.parse::<Uuid>() else {
            continue;
        };

        if let Some(full) = store.find_by_id(reference.collection, id).await? {
            doc.insert(reference.field.to_string(), Value::Object(full));
        }
    }
    Ok(())
}
