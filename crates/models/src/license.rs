use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::business;
use crate::errors;

/// License directory entry. Soft-deletes independently of the business
/// rows that link it; a set `removed` suppresses the status projection
/// on business detail reads without touching the business row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "license")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub business_id: Option<Uuid>,
    pub license_key: String,
    pub status: String,
    pub issued: Option<DateTimeWithTimeZone>,
    pub expired: Option<DateTimeWithTimeZone>,
    pub removed: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Business,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Business => Entity::belongs_to(business::Entity)
                .from(Column::BusinessId)
                .to(business::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(
    db: &DatabaseConnection,
    business_id: Option<Uuid>,
    license_key: &str,
    status: &str,
    issued: Option<DateTimeWithTimeZone>,
    expired: Option<DateTimeWithTimeZone>,
) -> Result<Model, errors::ModelError> {
    if license_key.trim().is_empty() { return Err(errors::ModelError::Validation("license_key required".into())); }
    if status.trim().is_empty() { return Err(errors::ModelError::Validation("status required".into())); }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        business_id: Set(business_id),
        license_key: Set(license_key.to_string()),
        status: Set(status.to_string()),
        issued: Set(issued),
        expired: Set(expired),
        removed: Set(None),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn soft_delete(db: &DatabaseConnection, id: Uuid) -> Result<(), errors::ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id).one(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?.ok_or_else(|| errors::ModelError::Validation("license not found".into()))?.into();
    found.removed = Set(Some(Utc::now().into()));
    found.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(())
}
