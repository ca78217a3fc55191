use crate::adapters::backend::{eq, param, BackendClient};
use crate::domain::model::{Enclosure, SessionContext};
use crate::domain::ports::EnclosureDirectory;
use crate::utils::error::Result;
use async_trait::async_trait;

pub const ENCLOSURES_TABLE: &str = "enclosures";

#[derive(Debug, Clone)]
pub struct RestEnclosureDirectory {
    client: BackendClient,
}

impl RestEnclosureDirectory {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EnclosureDirectory for RestEnclosureDirectory {
    async fn list_enclosures(
        &self,
        ctx: &SessionContext,
        area_id: Option<&str>,
    ) -> Result<Vec<Enclosure>> {
        let mut query = vec![
            param("select", "id,name,area_id,description"),
            param("order", "name.asc"),
        ];
        if let Some(area_id) = area_id {
            query.push(eq("area_id", area_id));
        }
        self.client.select(ctx, ENCLOSURES_TABLE, &query).await
    }
}
