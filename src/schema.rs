//! Declarative payload validators, one per resource type.
//!
//! Each validator is a pure data table describing required/optional fields,
//! types, numeric bounds and enum sets. Validation runs before any record is
//! constructed or any storage write is attempted, and reports the first
//! violated rule in the same phrasing clients already match on, e.g.
//! `"rating" must be less than or equal to 5`.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug)]
pub struct Schema {
    pub type_name: &'static str,
    pub fields: &'static [Field],
}

#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub kind: Kind,
    pub required: bool,
    /// String default stamped onto the document at creation when the field is
    /// absent from the payload.
    pub default: Option<&'static str>,
}

#[derive(Debug)]
pub enum Kind {
    Str,
    Email,
    Date,
    Number {
        integer: bool,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// An id referencing a document in another collection.
    Reference,
    Enum(&'static [&'static str]),
    Array(&'static Kind),
    Object(&'static [Field]),
}

impl Schema {
    /// Checks a candidate payload, returning the first violated rule's message.
    pub fn validate(&self, payload: &Value) -> Result<(), String> {
        let object = payload
            .as_object()
            .ok_or_else(|| "\"value\" must be of type object".to_string())?;

        validate_fields(self.fields, object, None)
    }
}

fn validate_fields(
    fields: &[Field],
    object: &serde_json::Map<String, Value>,
    prefix: Option<&str>,
) -> Result<(), String> {
    for field in fields {
        let path = join_path(prefix, field.name);
        match object.get(field.name) {
            Some(value) => validate_kind(&path, &field.kind, value)?,
            None if field.required => return Err(format!("\"{}\" is required", path)),
            None => {}
        }
    }

    // Unknown keys are rejected, matching the strict schema-on-write posture
    for key in object.keys() {
        if !fields.iter().any(|f| f.name == key) {
            return Err(format!("\"{}\" is not allowed", join_path(prefix, key)));
        }
    }

    Ok(())
}

fn validate_kind(path: &str, kind: &Kind, value: &Value) -> Result<(), String> {
    match kind {
        Kind::Str => {
            if !value.is_string() {
                return Err(format!("\"{}\" must be a string", path));
            }
        }
        Kind::Email => {
            let ok = value
                .as_str()
                .map(|s| s.contains('@') && !s.starts_with('@') && !s.ends_with('@'))
                .unwrap_or(false);
            if !ok {
                return Err(format!("\"{}\" must be a valid email", path));
            }
        }
        Kind::Date => {
            let ok = value.as_str().map(is_date_like).unwrap_or(false);
            if !ok {
                return Err(format!("\"{}\" must be a valid date", path));
            }
        }
        Kind::Number { integer, min, max } => {
            let Some(n) = value.as_f64() else {
                return Err(format!("\"{}\" must be a number", path));
            };
            if *integer && n.fract() != 0.0 {
                return Err(format!("\"{}\" must be an integer", path));
            }
            if let Some(min) = min {
                if n < *min {
                    return Err(format!(
                        "\"{}\" must be greater than or equal to {}",
                        path, min
                    ));
                }
            }
            if let Some(max) = max {
                if n > *max {
                    return Err(format!("\"{}\" must be less than or equal to {}", path, max));
                }
            }
        }
        Kind::Reference => {
            let ok = value
                .as_str()
                .map(|s| s.parse::<Uuid>().is_ok())
                .unwrap_or(false);
            if !ok {
                return Err(format!("\"{}\" must be a valid id", path));
            }
        }
        Kind::Enum(allowed) => {
            let ok = value
                .as_str()
                .map(|s| allowed.contains(&s))
                .unwrap_or(false);
            if !ok {
                return Err(format!("\"{}\" must be one of [{}]", path, allowed.join(", ")));
            }
        }
        Kind::Array(inner) => {
            let Some(items) = value.as_array() else {
                return Err(format!("\"{}\" must be an array", path));
            };
            for (i, item) in items.iter().enumerate() {
                validate_kind(&format!("{}[{}]", path, i), inner, item)?;
            }
        }
        Kind::Object(fields) => {
            let Some(object) = value.as_object() else {
                return Err(format!("\"{}\" must be of type object", path));
            };
            validate_fields(fields, object, Some(path))?;
        }
    }

    Ok(())
}

fn join_path(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(p) => format!("{}.{}", p, name),
        None => name.to_string(),
    }
}

fn is_date_like(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok() || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

const fn required(name: &'static str, kind: Kind) -> Field {
    Field { name, kind, required: true, default: None }
}

const fn optional(name: &'static str, kind: Kind) -> Field {
    Field { name, kind, required: false, default: None }
}

const fn defaulted(name: &'static str, kind: Kind, default: &'static str) -> Field {
    Field { name, kind, required: false, default: Some(default) }
}

const NUMBER: Kind = Kind::Number { integer: false, min: None, max: None };

pub static USER: Schema = Schema {
    type_name: "User",
    fields: &[
        required("oauthId", Kind::Str),
        required("provider", Kind::Str),
        required("email", Kind::Email),
        required("name", Kind::Str),
        optional("avatar", Kind::Str),
        defaulted("role", Kind::Enum(&["user", "admin"]), "user"),
    ],
};

pub static GAME: Schema = Schema {
    type_name: "Game",
    fields: &[
        required("title", Kind::Str),
        optional("description", Kind::Str),
        optional("developer", Kind::Reference),
        optional("genres", Kind::Array(&Kind::Str)),
        optional("platforms", Kind::Array(&Kind::Str)),
        optional(
            "releaseDates",
            Kind::Array(&Kind::Object(&[
                optional("region", Kind::Str),
                optional("date", Kind::Date),
            ])),
        ),
        optional(
            "media",
            Kind::Object(&[
                optional("cover", Kind::Str),
                optional("screenshots", Kind::Array(&Kind::Str)),
                optional("trailerUrl", Kind::Str),
            ]),
        ),
        optional("price", NUMBER),
        optional("stock", NUMBER),
    ],
};

pub static DEVELOPER: Schema = Schema {
    type_name: "Developer",
    fields: &[
        required("name", Kind::Str),
        optional("foundedYear", NUMBER),
        optional("country", Kind::Str),
        optional("website", Kind::Str),
        optional("description", Kind::Str),
    ],
};

pub static CHARACTER: Schema = Schema {
    type_name: "Character",
    fields: &[
        required("name", Kind::Str),
        optional("bio", Kind::Str),
        // Reference to the Game of first appearance; the earlier free-text
        // revision of this field is retired.
        optional("firstAppearance", Kind::Reference),
        optional("abilities", Kind::Array(&Kind::Str)),
        optional("images", Kind::Array(&Kind::Str)),
    ],
};

pub static REVIEW: Schema = Schema {
    type_name: "Review",
    fields: &[
        required("game", Kind::Reference),
        required("user", Kind::Reference),
        required(
            "rating",
            Kind::Number { integer: true, min: Some(1.0), max: Some(5.0) },
        ),
        required("title", Kind::Str),
        optional("body", Kind::Str),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_valid_game() {
        let payload = json!({
            "title": "Chrono Drift",
            "description": "Time-bending racer",
            "genres": ["racing", "puzzle"],
            "platforms": ["pc"],
            "releaseDates": [{ "region": "EU", "date": "2024-03-01" }],
            "media": { "cover": "https://cdn.example/cover.png", "screenshots": [] },
            "price": 29.99,
            "stock": 100
        });
        assert!(GAME.validate(&payload).is_ok());
    }

    #[test]
    fn missing_required_field_reports_first_rule() {
        let err = GAME.validate(&json!({ "description": "no title" })).unwrap_err();
        assert_eq!(err, "\"title\" is required");
    }

    #[test]
    fn rating_bounds_are_enforced() {
        let base = |rating: serde_json::Value| {
            json!({
                "game": Uuid::new_v4().to_string(),
                "user": Uuid::new_v4().to_string(),
                "rating": rating,
                "title": "ok"
            })
        };

        let err = REVIEW.validate(&base(json!(6))).unwrap_err();
        assert_eq!(err, "\"rating\" must be less than or equal to 5");

        let err = REVIEW.validate(&base(json!(0))).unwrap_err();
        assert_eq!(err, "\"rating\" must be greater than or equal to 1");

        let err = REVIEW.validate(&base(json!(3.5))).unwrap_err();
        assert_eq!(err, "\"rating\" must be an integer");

        assert!(REVIEW.validate(&base(json!(5))).is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = DEVELOPER
            .validate(&json!({ "name": "Acme", "bogus": 1 }))
            .unwrap_err();
        assert_eq!(err, "\"bogus\" is not allowed");
    }

    #[test]
    fn nested_paths_appear_in_messages() {
        let err = GAME
            .validate(&json!({ "title": "X", "media": { "cover": 7 } }))
            .unwrap_err();
        assert_eq!(err, "\"media.cover\" must be a string");

        let err = GAME
            .validate(&json!({ "title": "X", "releaseDates": [{ "date": "soon" }] }))
            .unwrap_err();
        assert_eq!(err, "\"releaseDates[0].date\" must be a valid date");
    }

    #[test]
    fn references_must_be_ids() {
        let err = GAME
            .validate(&json!({ "title": "X", "developer": "not-an-id" }))
            .unwrap_err();
        assert_eq!(err, "\"developer\" must be a valid id");
    }

    #[test]
    fn user_email_and_role_rules() {
        let base = json!({
            "oauthId": "123",
            "provider": "google",
            "email": "player@example.com",
            "name": "Player One"
        });
        assert!(USER.validate(&base).is_ok());

        let mut bad_email = base.clone();
        bad_email["email"] = json!("nope");
        assert_eq!(
            USER.validate(&bad_email).unwrap_err(),
            "\"email\" must be a valid email"
        );

        let mut bad_role = base;
        bad_role["role"] = json!("owner");
        assert_eq!(
            USER.validate(&bad_role).unwrap_err(),
            "\"role\" must be one of [user, admin]"
        );
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert_eq!(
            GAME.validate(&json!([1, 2, 3])).unwrap_err(),
            "\"value\" must be of type object"
        );
    }
}
