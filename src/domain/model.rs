use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

fn default_status() -> String {
    "active".to_string()
}

/// 動物資料列，enclosure_id 在實務上必填但結構上可以為空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub species_id: Option<String>,
    #[serde(default)]
    pub enclosure_id: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub arrival_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: String,
    pub common_name: String,
    #[serde(default)]
    pub scientific_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enclosure {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub area_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Animal row with its species and enclosure relations resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalDetails {
    #[serde(flatten)]
    pub animal: Animal,
    #[serde(default)]
    pub species: Option<Species>,
    #[serde(default)]
    pub enclosure: Option<Enclosure>,
}

/// Payload for creating an animal with its initial enclosure.
#[derive(Debug, Clone, Serialize)]
pub struct NewAnimal {
    pub id: String,
    pub name: String,
    pub species_id: Option<String>,
    pub enclosure_id: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewAnimal {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            species_id: None,
            enclosure_id: None,
            status: default_status(),
            sex: None,
            birth_date: None,
            arrival_date: None,
            notes: None,
        }
    }

    pub fn in_enclosure(mut self, enclosure_id: impl Into<String>) -> Self {
        self.enclosure_id = Some(enclosure_id.into());
        self
    }

    pub fn of_species(mut self, species_id: impl Into<String>) -> Self {
        self.species_id = Some(species_id.into());
        self
    }
}

/// History ledger row as inserted. Null fields are serialized explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRelocationRecord {
    pub animal_id: String,
    pub from_enclosure_id: Option<String>,
    pub to_enclosure_id: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelocationRecord {
    pub id: String,
    pub animal_id: String,
    #[serde(default)]
    pub from_enclosure_id: Option<String>,
    pub to_enclosure_id: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: String,
    pub name: String,
}

/// 歷史紀錄加上動物與兩個圍欄的顯示名稱
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelocationEntry {
    #[serde(flatten)]
    pub record: RelocationRecord,
    #[serde(default)]
    pub animal: Option<NamedRef>,
    #[serde(default)]
    pub from_enclosure: Option<NamedRef>,
    #[serde(default)]
    pub to_enclosure: Option<NamedRef>,
}

impl RelocationEntry {
    pub fn animal_label(&self) -> &str {
        self.animal
            .as_ref()
            .map(|a| a.name.as_str())
            .unwrap_or(&self.record.animal_id)
    }

    pub fn from_label(&self) -> &str {
        match (&self.from_enclosure, &self.record.from_enclosure_id) {
            (Some(enclosure), _) => &enclosure.name,
            (None, Some(id)) => id,
            (None, None) => "-",
        }
    }

    pub fn to_label(&self) -> &str {
        self.to_enclosure
            .as_ref()
            .map(|e| e.name.as_str())
            .unwrap_or(&self.record.to_enclosure_id)
    }
}

/// Explicit caller identity, passed into every backend call.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub user_id: Option<String>,
    pub access_token: Option<String>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            access_token: Some(access_token.into()),
        }
    }

    pub fn user_label(&self) -> &str {
        self.user_id.as_deref().unwrap_or("anonymous")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_animal_details_from_joined_row() {
        let row = json!({
            "id": "A101",
            "name": "Zuri",
            "species_id": "giraffe",
            "enclosure_id": "Savanna-2",
            "status": "in treatment",
            "birth_date": "2019-04-02",
            "species": {
                "id": "giraffe",
                "common_name": "Giraffe",
                "scientific_name": "Giraffa camelopardalis"
            },
            "enclosure": {"id": "Savanna-2", "name": "Savanna 2", "area_id": "africa"}
        });

        let details: AnimalDetails = serde_json::from_value(row).unwrap();
        assert_eq!(details.animal.enclosure_id.as_deref(), Some("Savanna-2"));
        assert_eq!(details.animal.status, "in treatment");
        assert_eq!(details.species.unwrap().common_name, "Giraffe");
        assert_eq!(details.enclosure.unwrap().name, "Savanna 2");
    }

    #[test]
    fn test_status_defaults_to_active() {
        let animal: Animal = serde_json::from_value(json!({"id": "A1", "name": "Kito"})).unwrap();
        assert_eq!(animal.status, "active");
        assert!(animal.enclosure_id.is_none());
    }

    #[test]
    fn test_new_record_serializes_null_source() {
        let record = NewRelocationRecord {
            animal_id: "A202".to_string(),
            from_enclosure_id: None,
            to_enclosure_id: "Quarantine-2".to_string(),
            notes: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["from_enclosure_id"], serde_json::Value::Null);
        assert_eq!(value["notes"], serde_json::Value::Null);
    }

    #[test]
    fn test_entry_labels_fall_back_to_ids() {
        let entry: RelocationEntry = serde_json::from_value(json!({
            "id": "m1",
            "animal_id": "A101",
            "from_enclosure_id": null,
            "to_enclosure_id": "Savanna-2",
            "notes": null,
            "created_at": "2026-03-01T09:30:00+00:00",
            "animal": null,
            "from_enclosure": null,
            "to_enclosure": {"id": "Savanna-2", "name": "Savanna 2"}
        }))
        .unwrap();

        assert_eq!(entry.animal_label(), "A101");
        assert_eq!(entry.from_label(), "-");
        assert_eq!(entry.to_label(), "Savanna 2");
    }
}
