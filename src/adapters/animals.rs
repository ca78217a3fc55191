use crate::adapters::backend::{eq, param, BackendClient};
use crate::domain::model::{AnimalDetails, NewAnimal, SessionContext};
use crate::domain::ports::AnimalRegistry;
use crate::utils::error::{Result, ZooError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub const ANIMALS_TABLE: &str = "animals";

/// Projection used whenever an animal is returned with its relations.
pub const ANIMAL_DETAILS_SELECT: &str =
    "*,species(id,common_name,scientific_name),enclosure:enclosures(id,name,area_id,description)";

#[derive(Debug, Deserialize)]
struct EnclosureAssignment {
    enclosure_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RestAnimalRegistry {
    client: BackendClient,
}

impl RestAnimalRegistry {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

fn single_row<T>(rows: Vec<T>, animal_id: &str) -> Result<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| ZooError::not_found("animal", animal_id))
}

#[async_trait]
impl AnimalRegistry for RestAnimalRegistry {
    async fn get_current_enclosure(
        &self,
        ctx: &SessionContext,
        animal_id: &str,
    ) -> Result<Option<String>> {
        let query = vec![eq("id", animal_id), param("select", "enclosure_id")];
        let rows: Vec<EnclosureAssignment> = self.client.select(ctx, ANIMALS_TABLE, &query).await?;
        Ok(single_row(rows, animal_id)?.enclosure_id)
    }

    async fn set_current_enclosure(
        &self,
        ctx: &SessionContext,
        animal_id: &str,
        enclosure_id: &str,
    ) -> Result<AnimalDetails> {
        let query = vec![eq("id", animal_id), param("select", ANIMAL_DETAILS_SELECT)];
        let rows: Vec<AnimalDetails> = self
            .client
            .update(ctx, ANIMALS_TABLE, &query, &json!({ "enclosure_id": enclosure_id }))
            .await?;
        single_row(rows, animal_id)
    }

    async fn restore_enclosure(
        &self,
        ctx: &SessionContext,
        animal_id: &str,
        enclosure_id: Option<&str>,
    ) -> Result<()> {
        let query = vec![eq("id", animal_id)];
        self.client
            .update_minimal(ctx, ANIMALS_TABLE, &query, &json!({ "enclosure_id": enclosure_id }))
            .await
    }

    async fn get_animal(&self, ctx: &SessionContext, animal_id: &str) -> Result<AnimalDetails> {
        let query = vec![eq("id", animal_id), param("select", ANIMAL_DETAILS_SELECT)];
        let rows: Vec<AnimalDetails> = self.client.select(ctx, ANIMALS_TABLE, &query).await?;
        single_row(rows, animal_id)
    }

    async fn create_animal(
        &self,
        ctx: &SessionContext,
        animal: &NewAnimal,
    ) -> Result<AnimalDetails> {
        let query = vec![param("select", ANIMAL_DETAILS_SELECT)];
        let rows: Vec<AnimalDetails> = self
            .client
            .insert_returning(ctx, ANIMALS_TABLE, &query, animal)
            .await?;
        rows.into_iter().next().ok_or_else(|| ZooError::Backend {
            status: 201,
            code: None,
            message: format!("Animal {} was not returned after insert", animal.id),
        })
    }
}
