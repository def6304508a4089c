//! Data models and their store operations.

pub mod category;
pub mod product;
pub mod restaurant;
pub mod user;

pub use category::{Category, CreateCategory, UpdateCategory};
pub use product::{CreateProduct, Nutrition, Product, UpdateProduct};
pub use restaurant::{Restaurant, UpdateRestaurant};
pub use user::{CreateUser, User};

use serde::{Deserialize, Deserializer};

/// Deserialize a field so that "key absent" and "key explicitly null" are
/// distinguishable: absent stays `None` (via `#[serde(default)]`), null
/// becomes `Some(None)`, and a value becomes `Some(Some(value))`.
///
/// Partial updates rely on this to tell "leave the field alone" apart from
/// "clear the field".
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "super::double_option")]
        note: Option<Option<String>>,
    }

    #[test]
    fn absent_field_is_none() {
        let payload: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.note, None);
    }

    #[test]
    fn explicit_null_is_some_none() {
        let payload: Payload = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(payload.note, Some(None));
    }

    #[test]
    fn value_is_some_some() {
        let payload: Payload = serde_json::from_str(r#"{"note": "hi"}"#).unwrap();
        assert_eq!(payload.note, Some(Some("hi".to_string())));
    }
}
