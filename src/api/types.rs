//! PetFriends API data types
//!
//! Request payloads, typed pet records and the uniform response envelope.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::common::{Error, Result};

/// Account credentials used to obtain an auth key
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Same account with a different password
    pub fn with_password(&self, password: impl Into<String>) -> Self {
        Self {
            email: self.email.clone(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Opaque auth key issued by `GET api/key`
#[derive(Clone, PartialEq, Eq)]
pub struct AuthKey(String);

impl AuthKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthKey(***)")
    }
}

/// Which pets a listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum PetFilter {
    /// Every pet on the service
    #[default]
    All,
    /// Only pets owned by the authenticated caller
    MyPets,
}

impl PetFilter {
    /// Value of the `filter` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            PetFilter::All => "",
            PetFilter::MyPets => "my_pets",
        }
    }
}

impl FromStr for PetFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "all" => Ok(PetFilter::All),
            "my_pets" | "mine" => Ok(PetFilter::MyPets),
            other => Err(Error::Config(format!(
                "Unknown pet filter '{}'. Supported filters: 'all', 'my_pets'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for PetFilter {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Editable pet attributes sent on create and update
///
/// Nothing is validated locally; the service rejects bad names and ages
/// with 400.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PetFields {
    pub name: String,
    pub animal_type: String,
    pub age: i64,
}

impl PetFields {
    pub fn new(name: impl Into<String>, animal_type: impl Into<String>, age: i64) -> Self {
        Self {
            name: name.into(),
            animal_type: animal_type.into(),
            age,
        }
    }
}

/// A pet record as returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub animal_type: String,
    /// The service reports age as either a string or a number
    #[serde(default, deserialize_with = "string_or_number")]
    pub age: String,
    #[serde(default)]
    pub pet_photo: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub created_at: Option<String>,
}

impl Pet {
    pub fn has_photo(&self) -> bool {
        !self.pet_photo.is_empty()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_string_or_number(deserializer)?.unwrap_or_default())
}

fn optional_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Status code and parsed body of one API call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// Build a response envelope from a raw status and body text
    ///
    /// Empty bodies become an empty object. Non-JSON bodies are kept as a
    /// string on error statuses (the service answers 403 with HTML) and are
    /// rejected on success statuses.
    pub fn decode(status: u16, text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self {
                status,
                body: Value::Object(Default::default()),
            });
        }

        match serde_json::from_str::<Value>(text) {
            Ok(body) => Ok(Self { status, body }),
            Err(_) if !(200..300).contains(&status) => Ok(Self {
                status,
                body: Value::String(text.to_string()),
            }),
            Err(e) => Err(Error::malformed(status, format!("body is not JSON: {}", e))),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Top-level body field, if the body is an object containing it
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.as_object().and_then(|obj| obj.get(name))
    }

    /// Top-level body field as a string
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// The `key` field of an authentication response
    pub fn auth_key(&self) -> Result<AuthKey> {
        self.str_field("key")
            .map(AuthKey::new)
            .ok_or_else(|| Error::UnexpectedBody("response has no 'key' field".to_string()))
    }

    /// The `pets` sequence of a listing response
    pub fn pets(&self) -> Result<Vec<Pet>> {
        let pets = self
            .field("pets")
            .ok_or_else(|| Error::UnexpectedBody("response has no 'pets' field".to_string()))?;
        Ok(serde_json::from_value(pets.clone())?)
    }

    /// The body as a single pet record
    pub fn pet(&self) -> Result<Pet> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// Whether a listing response contains a pet with this id
    pub fn contains_pet(&self, pet_id: &str) -> Result<bool> {
        Ok(self.pets()?.iter().any(|pet| pet.id == pet_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json_body() {
        let resp = ApiResponse::decode(200, r#"{"key": "abc123"}"#).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.auth_key().unwrap().as_str(), "abc123");
    }

    #[test]
    fn test_decode_empty_body() {
        let resp = ApiResponse::decode(200, "").unwrap();
        assert_eq!(resp.body, json!({}));
        assert!(resp.field("anything").is_none());
    }

    #[test]
    fn test_decode_html_error_page_keeps_status() {
        let resp = ApiResponse::decode(403, "<html><body>Forbidden</body></html>").unwrap();
        assert_eq!(resp.status, 403);
        assert!(!resp.is_success());
        assert!(resp.body.as_str().unwrap().contains("Forbidden"));
        assert!(matches!(resp.auth_key(), Err(Error::UnexpectedBody(_))));
    }

    #[test]
    fn test_decode_non_json_success_is_malformed() {
        let err = ApiResponse::decode(200, "OK").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { status: 200, .. }));
    }

    #[test]
    fn test_pets_accepts_string_and_numeric_age() {
        let resp = ApiResponse::decode(
            200,
            r#"{"pets": [
                {"id": "a1", "name": "Барбоскин", "animal_type": "двортерьер", "age": "4", "pet_photo": ""},
                {"id": "b2", "name": "Мурзик", "animal_type": "Котэ", "age": 5, "pet_photo": "data:image/jpeg;base64,AA==", "created_at": 1700000000.5}
            ]}"#,
        )
        .unwrap();

        let pets = resp.pets().unwrap();
        assert_eq!(pets.len(), 2);
        assert_eq!(pets[0].age, "4");
        assert!(!pets[0].has_photo());
        assert_eq!(pets[1].age, "5");
        assert!(pets[1].has_photo());
        assert_eq!(pets[1].created_at.as_deref(), Some("1700000000.5"));

        assert!(resp.contains_pet("b2").unwrap());
        assert!(!resp.contains_pet("zz").unwrap());
    }

    #[test]
    fn test_pets_missing_field() {
        let resp = ApiResponse::decode(200, r#"{"message": "nope"}"#).unwrap();
        assert!(matches!(resp.pets(), Err(Error::UnexpectedBody(_))));
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("".parse::<PetFilter>().unwrap(), PetFilter::All);
        assert_eq!("all".parse::<PetFilter>().unwrap(), PetFilter::All);
        assert_eq!("my_pets".parse::<PetFilter>().unwrap(), PetFilter::MyPets);
        assert_eq!("mine".parse::<PetFilter>().unwrap(), PetFilter::MyPets);
        assert_eq!(PetFilter::MyPets.as_query(), "my_pets");
        assert_eq!(PetFilter::All.as_query(), "");
        assert!("others".parse::<PetFilter>().is_err());
    }

    #[test]
    fn test_secrets_are_not_debug_printed() {
        let creds = Credentials::new("owner@example.com", "hunter2");
        assert!(!format!("{:?}", creds).contains("hunter2"));
        assert!(!format!("{:?}", AuthKey::new("abc123")).contains("abc123"));
        assert_eq!(creds.with_password("666").password(), "666");
    }
}
