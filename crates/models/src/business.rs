use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::{customer, product};

/// The central business record: links a customer and a product, carries
/// an optional license link, and soft-deletes via `removed`.
///
/// Invariant maintained by the service layer: a row with `removed` set
/// always has `license_id` cleared (deregistration happens before the
/// soft-delete write).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "business")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub license_id: Option<Uuid>,
    pub created: DateTimeWithTimeZone,
    pub updated: DateTimeWithTimeZone,
    pub removed: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Customer,
    Product,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Customer => Entity::belongs_to(customer::Entity)
                .from(Column::CustomerId)
                .to(customer::Column::Id)
                .into(),
            Relation::Product => Entity::belongs_to(product::Entity)
                .from(Column::ProductId)
                .to(product::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Insert a new business row. Input fields are copied verbatim; the id,
/// both timestamps, and the cleared `removed` marker are server-assigned.
pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    customer_id: Uuid,
    product_id: Uuid,
    license_id: Option<Uuid>,
) -> Result<Model, errors::ModelError> {
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        customer_id: Set(customer_id),
        product_id: Set(product_id),
        license_id: Set(license_id),
        created: Set(now),
        updated: Set(now),
        removed: Set(None),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
