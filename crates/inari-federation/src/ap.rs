//!
//! The slice of ActivityPub the signature verification needs
//!

use serde::{Deserialize, Deserializer, Serialize};
use sonic_rs::Value;

/// Payload whose author can be checked against the signing key
pub trait SignedPayload {
    /// ID of the actor that claims to have authored this payload
    fn actor(&self) -> &str;
}

/// ActivityPub activity
///
/// Only the fields relevant for authentication are typed, the rest is kept as raw JSON
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Activity {
    #[serde(default, rename = "@context")]
    pub context: Value,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(deserialize_with = "first_id")]
    pub actor: String,
    #[serde(default)]
    pub object: Value,
    #[serde(default)]
    pub to: Value,
}

impl SignedPayload for Activity {
    fn actor(&self) -> &str {
        &self.actor
    }
}

/// Actor document
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    pub public_key: PublicKey,
}

/// Public key of an actor
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKey {
    pub id: String,
    #[serde(deserialize_with = "first_id")]
    pub owner: String,
    pub public_key_pem: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdOrObject {
    Id(String),
    Object { id: String },
    Many(Vec<IdOrObject>),
}

impl IdOrObject {
    fn into_first(self) -> Option<String> {
        match self {
            Self::Id(id) | Self::Object { id } => Some(id),
            Self::Many(many) => many.into_iter().find_map(Self::into_first),
        }
    }
}

/// Accept a plain ID, an embedded object or a list of either and take the first ID
fn first_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    IdOrObject::deserialize(deserializer)?
        .into_first()
        .ok_or_else(|| serde::de::Error::custom("expected at least one ID"))
}

#[cfg(test)]
mod test {
    use super::{Activity, Actor};

    #[test]
    fn actor_as_string() {
        let activity: Activity = sonic_rs::from_str(
            r#"{"@context":"https://www.w3.org/ns/activitystreams","type":"Follow","actor":"https://a.example/users/alice","object":"https://b.example/users/bob"}"#,
        )
        .unwrap();

        assert_eq!(activity.actor, "https://a.example/users/alice");
        assert_eq!(activity.r#type.as_deref(), Some("Follow"));
    }

    #[test]
    fn actor_as_object() {
        let activity: Activity = sonic_rs::from_str(
            r#"{"actor":{"id":"https://a.example/users/alice","type":"Person"}}"#,
        )
        .unwrap();
        assert_eq!(activity.actor, "https://a.example/users/alice");

        let activity: Activity =
            sonic_rs::from_str(r#"{"actor":["https://a.example/users/alice"]}"#).unwrap();
        assert_eq!(activity.actor, "https://a.example/users/alice");
    }

    #[test]
    fn missing_actor() {
        assert!(sonic_rs::from_str::<Activity>(r#"{"type":"Follow"}"#).is_err());
        assert!(sonic_rs::from_str::<Activity>(r#"{"actor":[]}"#).is_err());
    }

    #[test]
    fn actor_document() {
        let actor: Actor = sonic_rs::from_str(
            r#"{
                "@context": ["https://www.w3.org/ns/activitystreams", "https://w3id.org/security/v1"],
                "id": "https://a.example/users/alice",
                "type": "Person",
                "publicKey": {
                    "id": "https://a.example/users/alice#main-key",
                    "owner": "https://a.example/users/alice",
                    "publicKeyPem": "-----BEGIN PUBLIC KEY-----\n-----END PUBLIC KEY-----\n"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(actor.public_key.id, "https://a.example/users/alice#main-key");
        assert_eq!(actor.public_key.owner, actor.id);
    }
}
