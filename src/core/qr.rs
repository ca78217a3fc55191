use crate::utils::error::{Result, ZooError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Marker stored in the `type` field of every payload this application generates.
pub const APP_MARKER: &str = "zoo-tracker";
pub const PAYLOAD_VERSION: &str = "1.0";

pub const ACTION_VIEW_ANIMAL: &str = "view_animal";
pub const ACTION_ADD_TO_CHECKLIST: &str = "add_to_checklist";
pub const ACTION_SHARE_LOCATION: &str = "share_location";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrPayload {
    #[serde(rename = "type")]
    pub marker: String,
    pub version: String,
    pub action: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    pub timestamp: i64,
}

impl QrPayload {
    pub fn new(action: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            marker: APP_MARKER.to_string(),
            version: PAYLOAD_VERSION.to_string(),
            action: action.into(),
            data,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn view_animal(animal_id: &str) -> Self {
        Self::new(ACTION_VIEW_ANIMAL, object([("animal_id", Value::from(animal_id))]))
    }

    pub fn add_to_checklist(species_id: &str, checklist_id: Option<&str>) -> Self {
        let mut data = object([("species_id", Value::from(species_id))]);
        if let Some(checklist_id) = checklist_id {
            data.insert("checklist_id".to_string(), Value::from(checklist_id));
        }
        Self::new(ACTION_ADD_TO_CHECKLIST, data)
    }

    pub fn share_location(latitude: f64, longitude: f64, label: Option<&str>) -> Self {
        let mut data = object([
            ("latitude", Value::from(latitude)),
            ("longitude", Value::from(longitude)),
        ]);
        if let Some(label) = label {
            data.insert("label".to_string(), Value::from(label));
        }
        Self::new(ACTION_SHARE_LOCATION, data)
    }

    /// Parses generated payloads; arbitrary text or foreign JSON is rejected.
    pub fn decode(raw: &str) -> Result<Self> {
        let payload: Self = serde_json::from_str(raw.trim())?;
        if payload.marker != APP_MARKER {
            return Err(ZooError::Qr {
                message: format!(
                    "payload marker '{}' does not belong to this app",
                    payload.marker
                ),
            });
        }
        Ok(payload)
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn object<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// What the scanner screen should do with a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum QrOutcome {
    ViewAnimal {
        animal_id: String,
    },
    AddToChecklist {
        species_id: String,
        checklist_id: Option<String>,
    },
    ShareLocation {
        latitude: f64,
        longitude: f64,
        label: Option<String>,
    },
    /// An app payload whose action is known but whose data lacks a field.
    MalformedAction {
        action: String,
        missing: &'static str,
    },
    UnknownAction {
        action: String,
    },
    /// Opening requires confirmation from the user.
    OpenUrl {
        url: String,
    },
    NavigateToAnimal {
        animal_id: String,
    },
    OfferSpeciesChecklist {
        species_id: String,
    },
    Unhandled {
        raw: String,
        format: String,
    },
}

impl QrOutcome {
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Self::OpenUrl { .. } | Self::OfferSpeciesChecklist { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            Self::ViewAnimal { animal_id } => format!("View animal {}", animal_id),
            Self::AddToChecklist {
                species_id,
                checklist_id,
            } => match checklist_id {
                Some(checklist) => format!("Add species {} to checklist {}", species_id, checklist),
                None => format!("Add species {} to a checklist", species_id),
            },
            Self::ShareLocation {
                latitude,
                longitude,
                label,
            } => format!(
                "Shared location {}: {:.6}, {:.6}",
                label.as_deref().unwrap_or("(unnamed)"),
                latitude,
                longitude
            ),
            Self::MalformedAction { action, missing } => {
                format!("QR action '{}' is missing '{}'", action, missing)
            }
            Self::UnknownAction { action } => format!("Unknown action: {}", action),
            Self::OpenUrl { url } => format!("Open link {}?", url),
            Self::NavigateToAnimal { animal_id } => format!("Open animal {}", animal_id),
            Self::OfferSpeciesChecklist { species_id } => {
                format!("Add species {} to a checklist?", species_id)
            }
            Self::Unhandled { raw, format } => format!("Scanned {} ({})", raw, format),
        }
    }
}

fn text_field(data: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match data.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn number_field(data: &Map<String, Value>, key: &str) -> Option<f64> {
    match data.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn dispatch_action(action: &str, data: &Map<String, Value>) -> QrOutcome {
    let malformed = |missing| QrOutcome::MalformedAction {
        action: action.to_string(),
        missing,
    };

    match action {
        ACTION_VIEW_ANIMAL => match text_field(data, &["animal_id", "animalId"]) {
            Some(animal_id) => QrOutcome::ViewAnimal { animal_id },
            None => malformed("animal_id"),
        },
        ACTION_ADD_TO_CHECKLIST => match text_field(data, &["species_id", "speciesId"]) {
            Some(species_id) => QrOutcome::AddToChecklist {
                species_id,
                checklist_id: text_field(data, &["checklist_id", "checklistId"]),
            },
            None => malformed("species_id"),
        },
        ACTION_SHARE_LOCATION => {
            match (number_field(data, "latitude"), number_field(data, "longitude")) {
                (Some(latitude), Some(longitude)) => QrOutcome::ShareLocation {
                    latitude,
                    longitude,
                    label: text_field(data, &["label", "name"]),
                },
                (None, _) => malformed("latitude"),
                (_, None) => malformed("longitude"),
            }
        }
        other => QrOutcome::UnknownAction {
            action: other.to_string(),
        },
    }
}

fn is_web_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}

/// Routes a scanned payload. First match wins: app payload, web URL,
/// foreign JSON with an animal or species reference, raw text.
pub fn dispatch(raw: &str, format: &str) -> QrOutcome {
    let trimmed = raw.trim();
    let parsed: Option<Map<String, Value>> = match serde_json::from_str(trimmed) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    };

    if let Some(map) = &parsed {
        if map.get("type").and_then(Value::as_str) == Some(APP_MARKER) {
            let action = map.get("action").and_then(Value::as_str).unwrap_or_default();
            let empty = Map::new();
            let data = map.get("data").and_then(Value::as_object).unwrap_or(&empty);
            tracing::debug!("app payload with action '{}'", action);
            return dispatch_action(action, data);
        }
    }

    if is_web_url(trimmed) {
        return QrOutcome::OpenUrl {
            url: trimmed.to_string(),
        };
    }

    if let Some(map) = &parsed {
        if let Some(animal_id) = text_field(map, &["animal_id", "animalId"]) {
            return QrOutcome::NavigateToAnimal { animal_id };
        }
        if let Some(species_id) = text_field(map, &["species_id", "speciesId"]) {
            return QrOutcome::OfferSpeciesChecklist { species_id };
        }
    }

    QrOutcome::Unhandled {
        raw: raw.to_string(),
        format: format.to_string(),
    }
}
