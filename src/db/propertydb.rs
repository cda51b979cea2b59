use async_trait::async_trait;
use uuid::Uuid;

use crate::models::propertymodel::Property;

#[async_trait]
pub trait PropertyExt {
    async fn get_property(&self, property_id: Uuid) -> Result<Option<Property>, sqlx::Error>;
}

#[async_trait]
impl PropertyExt for super::db::DBClient {
    async fn get_property(&self, property_id: Uuid) -> Result<Option<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await
    }
}
