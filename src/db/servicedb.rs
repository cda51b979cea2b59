use async_trait::async_trait;
use uuid::Uuid;

use crate::models::servicemodel::Service;

#[async_trait]
pub trait ServiceCatalogExt {
    async fn get_service(&self, service_id: Uuid) -> Result<Option<Service>, sqlx::Error>;
}

#[async_trait]
impl ServiceCatalogExt for super::db::DBClient {
    async fn get_service(&self, service_id: Uuid) -> Result<Option<Service>, sqlx::Error> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(service_id)
            .fetch_optional(&self.pool)
            .await
    }
}
