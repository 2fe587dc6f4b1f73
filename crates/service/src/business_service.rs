//! Business record lifecycle and query logic.
//!
//! Customer, product, and license rows are consumed read-only as join
//! targets; the only entity mutated here is `business`.

use chrono::{Timelike, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use models::{business, customer, license, product};

use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Listing filters; the zero value selects every live row.
#[derive(Clone, Debug, Default)]
pub struct BusinessFilter {
    /// Substring match on `name`, anywhere in the string. Case-sensitive
    /// under the default PostgreSQL collation.
    pub name: Option<String>,
    /// Restrict to rows with no license link.
    pub available: bool,
}

/// Partial update; absent fields leave the row untouched.
#[derive(Clone, Debug, Default)]
pub struct BusinessUpdate {
    pub name: Option<String>,
    pub customer_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    /// Outer `None` leaves the link as-is, `Some(None)` clears it.
    pub license_id: Option<Option<Uuid>>,
}

/// One listing row: the business columns plus the denormalized customer
/// and product fields. Dangling references surface as `None`.
#[derive(Clone, Debug, FromQueryResult, Serialize)]
pub struct BusinessListItem {
    pub id: Uuid,
    pub name: String,
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub license_id: Option<Uuid>,
    pub created: DateTimeWithTimeZone,
    pub updated: DateTimeWithTimeZone,
    pub removed: Option<DateTimeWithTimeZone>,
    pub customer_name: Option<String>,
    pub product_name: Option<String>,
    pub product_version: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BusinessPage {
    pub items: Vec<BusinessListItem>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u64,
}

/// Detail row: listing fields plus the license projection.
#[derive(Clone, Debug, Serialize)]
pub struct BusinessDetail {
    pub id: Uuid,
    pub name: String,
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub license_id: Option<Uuid>,
    pub created: DateTimeWithTimeZone,
    pub updated: DateTimeWithTimeZone,
    pub removed: Option<DateTimeWithTimeZone>,
    pub customer_name: Option<String>,
    pub product_name: Option<String>,
    pub product_version: Option<String>,
    pub license_key: Option<String>,
    pub license_status: Option<String>,
    pub license_issued: Option<DateTimeWithTimeZone>,
    pub license_expired: Option<DateTimeWithTimeZone>,
}

/// Raw joined row for the detail query; carries the license's own
/// soft-delete marker so suppression can run after the fetch.
#[derive(Debug, FromQueryResult)]
struct BusinessDetailRow {
    id: Uuid,
    name: String,
    customer_id: Uuid,
    product_id: Uuid,
    license_id: Option<Uuid>,
    created: DateTimeWithTimeZone,
    updated: DateTimeWithTimeZone,
    removed: Option<DateTimeWithTimeZone>,
    customer_name: Option<String>,
    product_name: Option<String>,
    product_version: Option<String>,
    license_key: Option<String>,
    license_status: Option<String>,
    license_issued: Option<DateTimeWithTimeZone>,
    license_expired: Option<DateTimeWithTimeZone>,
    license_removed: Option<DateTimeWithTimeZone>,
}

impl BusinessDetailRow {
    /// Post-fetch projection: a soft-deleted license reads as if no
    /// license fields were joined, while the business row itself
    /// (including its still-set `license_id`) is untouched.
    fn into_detail(self) -> BusinessDetail {
        let suppressed = self.license_removed.is_some();
        BusinessDetail {
            id: self.id,
            name: self.name,
            customer_id: self.customer_id,
            product_id: self.product_id,
            license_id: self.license_id,
            created: self.created,
            updated: self.updated,
            removed: self.removed,
            customer_name: self.customer_name,
            product_name: self.product_name,
            product_version: self.product_version,
            license_key: if suppressed { None } else { self.license_key },
            license_status: if suppressed { None } else { self.license_status },
            license_issued: if suppressed { None } else { self.license_issued },
            license_expired: if suppressed { None } else { self.license_expired },
        }
    }
}

/// Truncate to whole seconds in UTC; downstream consumers of the public
/// contract expect no sub-second component on `updated`.
fn truncate_to_second(ts: DateTimeWithTimeZone) -> DateTimeWithTimeZone {
    let utc = ts.with_timezone(&Utc);
    utc.with_nanosecond(0).unwrap_or(utc).into()
}

/// Create a business record.
pub async fn create_business(
    db: &DatabaseConnection,
    name: &str,
    customer_id: Uuid,
    product_id: Uuid,
    license_id: Option<Uuid>,
) -> Result<business::Model, ServiceError> {
    let created = business::create(db, name, customer_id, product_id, license_id).await?;
    info!(id = %created.id, "business_created");
    Ok(created)
}

/// Paginated listing of live business rows with denormalized customer
/// and product fields.
///
/// The total is counted over the filtered set before the page window is
/// applied; `total_pages` is `ceil(total / per_page)` and `0` for an
/// empty result.
pub async fn list_businesses(
    db: &DatabaseConnection,
    opts: Pagination,
    filter: &BusinessFilter,
) -> Result<BusinessPage, ServiceError> {
    let (page_idx, per_page) = opts.normalize();

    let mut query = business::Entity::find()
        .join(JoinType::LeftJoin, business::Relation::Customer.def())
        .join(JoinType::LeftJoin, business::Relation::Product.def())
        .column_as(customer::Column::Name, "customer_name")
        .column_as(product::Column::Name, "product_name")
        .column_as(product::Column::Version, "product_version")
        .filter(business::Column::Removed.is_null())
        .order_by_desc(business::Column::Created)
        // id tiebreak keeps the order deterministic across equal timestamps
        .order_by_desc(business::Column::Id);

    if let Some(name) = filter.name.as_deref() {
        query = query.filter(business::Column::Name.contains(name));
    }
    if filter.available {
        query = query.filter(business::Column::LicenseId.is_null());
    }

    let paginator = query.into_model::<BusinessListItem>().paginate(db, per_page);
    let counts = paginator
        .num_items_and_pages()
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    let items = paginator
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    Ok(BusinessPage {
        items,
        total: counts.number_of_items,
        page: page_idx as u32 + 1,
        total_pages: counts.number_of_pages,
    })
}

/// Fetch one live business with customer, product, and license joined.
///
/// Soft-deleted and absent ids are indistinguishable: both yield `None`.
/// The license is joined over its `business_id` back-reference and its
/// projection is suppressed when the license row is itself soft-deleted.
pub async fn get_business_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<BusinessDetail>, ServiceError> {
    let row = business::Entity::find_by_id(id)
        .filter(business::Column::Removed.is_null())
        .join(JoinType::LeftJoin, business::Relation::Customer.def())
        .join(JoinType::LeftJoin, business::Relation::Product.def())
        .join_rev(JoinType::LeftJoin, license::Relation::Business.def())
        .column_as(customer::Column::Name, "customer_name")
        .column_as(product::Column::Name, "product_name")
        .column_as(product::Column::Version, "product_version")
        .column_as(license::Column::LicenseKey, "license_key")
        .column_as(license::Column::Status, "license_status")
        .column_as(license::Column::Issued, "license_issued")
        .column_as(license::Column::Expired, "license_expired")
        .column_as(license::Column::Removed, "license_removed")
        .into_model::<BusinessDetailRow>()
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(row.map(BusinessDetailRow::into_detail))
}

/// Fetch the live row or fail. The authoritative existence check for
/// write paths; never sees soft-deleted rows and performs no joins.
pub async fn find_business(db: &DatabaseConnection, id: Uuid) -> Result<business::Model, ServiceError> {
    business::Entity::find_by_id(id)
        .filter(business::Column::Removed.is_null())
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::NotFound(format!("business id {id} not found")))
}

/// Shallow-merge a partial update over the live row.
pub async fn update_business(
    db: &DatabaseConnection,
    id: Uuid,
    patch: BusinessUpdate,
) -> Result<business::Model, ServiceError> {
    let mut am: business::ActiveModel = find_business(db, id).await?.into();
    if let Some(name) = patch.name { am.name = Set(name); }
    if let Some(c) = patch.customer_id { am.customer_id = Set(c); }
    if let Some(p) = patch.product_id { am.product_id = Set(p); }
    if let Some(l) = patch.license_id { am.license_id = Set(l); }
    am.updated = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(updated)
}

/// Soft-delete a business.
///
/// Two separate statements, not one transaction: the license link is
/// cleared first, then the row is marked removed. A failure between the
/// writes leaves a live unlicensed row, never a removed row still
/// holding a license; concurrent readers can observe that intermediate
/// state.
pub async fn remove_business(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let found = find_business(db, id).await?;

    let mut am: business::ActiveModel = found.into();
    am.license_id = Set(None);
    am.updated = Set(Utc::now().into());
    let deregistered = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;

    let mut am: business::ActiveModel = deregistered.into();
    am.removed = Set(Some(Utc::now().into()));
    am.updated = Set(Utc::now().into());
    am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(%id, "business_soft_deleted");
    Ok(())
}

/// Link a license to a business.
///
/// Looks the row up without the removed filter, so a soft-deleted
/// business can still be (re)licensed (see DESIGN.md). The returned row
/// has `updated` normalized to whole-second precision; the stored value
/// keeps sub-seconds.
pub async fn register_license(
    db: &DatabaseConnection,
    id: Uuid,
    license_id: Uuid,
) -> Result<business::Model, ServiceError> {
    let found = business::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::Other(format!("business with id {id} not found")))?;

    let mut am: business::ActiveModel = found.into();
    am.license_id = Set(Some(license_id));
    am.updated = Set(Utc::now().into());
    let saved = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(%id, %license_id, "license_registered");

    Ok(business::Model {
        updated: truncate_to_second(saved.updated),
        ..saved
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn truncate_drops_subsecond_component_and_forces_utc() {
        let ts = chrono::FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 12, 30, 45)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let out = truncate_to_second(ts);
        assert_eq!(out.timestamp_subsec_nanos(), 0);
        assert_eq!(out.offset().local_minus_utc(), 0);
        assert_eq!(out.timestamp(), ts.timestamp());
    }

    #[test]
    fn suppression_nulls_license_fields_but_keeps_link() {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let license_id = Uuid::new_v4();
        let row = BusinessDetailRow {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            customer_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            license_id: Some(license_id),
            created: now,
            updated: now,
            removed: None,
            customer_name: Some("Acme Corp".into()),
            product_name: Some("Widget".into()),
            product_version: Some("1.0.0".into()),
            license_key: Some("KEY-1".into()),
            license_status: Some("active".into()),
            license_issued: Some(now),
            license_expired: None,
            license_removed: Some(now),
        };
        let detail = row.into_detail();
        assert_eq!(detail.license_id, Some(license_id));
        assert!(detail.license_key.is_none());
        assert!(detail.license_status.is_none());
        assert!(detail.license_issued.is_none());
        assert!(detail.license_expired.is_none());
        assert_eq!(detail.customer_name.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn no_suppression_when_license_is_live() {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let row = BusinessDetailRow {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            customer_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            license_id: Some(Uuid::new_v4()),
            created: now,
            updated: now,
            removed: None,
            customer_name: None,
            product_name: None,
            product_version: None,
            license_key: Some("KEY-1".into()),
            license_status: Some("active".into()),
            license_issued: None,
            license_expired: None,
            license_removed: None,
        };
        let detail = row.into_detail();
        assert_eq!(detail.license_status.as_deref(), Some("active"));
        assert_eq!(detail.license_key.as_deref(), Some("KEY-1"));
    }

    async fn seed_refs(db: &sea_orm::DatabaseConnection) -> anyhow::Result<(models::customer::Model, models::product::Model)> {
        let c = models::customer::create(db, &format!("svc_customer_{}", Uuid::new_v4())).await?;
        let p = models::product::create(db, &format!("svc_product_{}", Uuid::new_v4()), "3.2.1").await?;
        Ok((c, p))
    }

    #[tokio::test]
    async fn business_crud_service() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let (c, p) = seed_refs(&db).await?;
        let name = format!("svc_biz_{}", Uuid::new_v4());
        let b = create_business(&db, &name, c.id, p.id, None).await?;
        assert_eq!(b.name, name);
        assert!(b.removed.is_none());

        let found = find_business(&db, b.id).await?;
        assert_eq!(found.id, b.id);

        let detail = get_business_by_id(&db, b.id).await?.unwrap();
        assert_eq!(detail.customer_name.as_deref(), Some(c.name.as_str()));
        assert_eq!(detail.product_name.as_deref(), Some(p.name.as_str()));
        assert_eq!(detail.product_version.as_deref(), Some("3.2.1"));
        assert!(detail.license_key.is_none());

        // shallow merge: only the patched field and `updated` move
        let patched = update_business(
            &db,
            b.id,
            BusinessUpdate { name: Some("NewName".into()), ..Default::default() },
        )
        .await?;
        assert_eq!(patched.name, "NewName");
        assert_eq!(patched.customer_id, b.customer_id);
        assert_eq!(patched.product_id, b.product_id);
        assert_eq!(patched.license_id, b.license_id);
        assert_eq!(patched.created, b.created);
        assert!(patched.updated >= b.updated);

        remove_business(&db, b.id).await?;
        let raw = business::Entity::find_by_id(b.id).one(&db).await?.unwrap();
        assert!(raw.removed.is_some());
        assert!(raw.license_id.is_none());
        assert!(matches!(
            find_business(&db, b.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(get_business_by_id(&db, b.id).await?.is_none());

        business::Entity::delete_by_id(b.id).exec(&db).await?;
        models::product::Entity::delete_by_id(p.id).exec(&db).await?;
        models::customer::Entity::delete_by_id(c.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_business_fails_not_found() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let res = update_business(&db, Uuid::new_v4(), BusinessUpdate::default()).await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_and_pagination() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let (c, p) = seed_refs(&db).await?;
        // unique marker scopes the listing to this test's rows
        let marker = format!("mk{}", Uuid::new_v4().simple());

        let b1 = create_business(&db, &format!("{marker}_first"), c.id, p.id, None).await?;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let b2 = create_business(&db, &format!("{marker}_second"), c.id, p.id, Some(Uuid::new_v4())).await?;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let b3 = create_business(&db, &format!("{marker}_gone"), c.id, p.id, None).await?;
        remove_business(&db, b3.id).await?;

        let scoped = BusinessFilter { name: Some(marker.clone()), available: false };
        let page = list_businesses(&db, Pagination { page: 1, per_page: 10 }, &scoped).await?;
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items.len(), 2);
        assert!(page.items.iter().all(|i| i.removed.is_none()));
        assert!(page.items.iter().all(|i| i.customer_name.is_some() && i.product_name.is_some()));
        // created DESC: the later row comes first
        assert_eq!(page.items[0].id, b2.id);
        assert_eq!(page.items[1].id, b1.id);

        let available = BusinessFilter { name: Some(marker.clone()), available: true };
        let page = list_businesses(&db, Pagination { page: 1, per_page: 10 }, &available).await?;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, b1.id);
        assert!(page.items[0].license_id.is_none());

        let named = BusinessFilter { name: Some(format!("{marker}_sec")), available: false };
        let page = list_businesses(&db, Pagination { page: 1, per_page: 10 }, &named).await?;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, b2.id);

        // window smaller than the filtered set
        let page1 = list_businesses(&db, Pagination { page: 1, per_page: 1 }, &scoped).await?;
        assert_eq!(page1.total, 2);
        assert_eq!(page1.total_pages, 2);
        assert_eq!(page1.items.len(), 1);
        assert_eq!(page1.page, 1);
        let page2 = list_businesses(&db, Pagination { page: 2, per_page: 1 }, &scoped).await?;
        assert_eq!(page2.items.len(), 1);
        assert_ne!(page1.items[0].id, page2.items[0].id);

        // empty result: zero pages
        let none = BusinessFilter { name: Some(format!("{marker}_nothing")), available: false };
        let page = list_businesses(&db, Pagination::default(), &none).await?;
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());

        for id in [b1.id, b2.id, b3.id] {
            business::Entity::delete_by_id(id).exec(&db).await?;
        }
        models::product::Entity::delete_by_id(p.id).exec(&db).await?;
        models::customer::Entity::delete_by_id(c.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn license_projection_follows_license_soft_delete() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let (c, p) = seed_refs(&db).await?;
        let b = create_business(&db, &format!("svc_lic_{}", Uuid::new_v4()), c.id, p.id, None).await?;
        let l = models::license::create(
            &db,
            Some(b.id),
            &format!("KEY-{}", Uuid::new_v4().simple()),
            "active",
            Some(Utc::now().into()),
            None,
        )
        .await?;
        let b = register_license(&db, b.id, l.id).await?;
        assert_eq!(b.license_id, Some(l.id));

        let detail = get_business_by_id(&db, b.id).await?.unwrap();
        assert_eq!(detail.license_status.as_deref(), Some("active"));
        assert_eq!(detail.license_key.as_deref(), Some(l.license_key.as_str()));
        assert!(detail.license_issued.is_some());

        models::license::soft_delete(&db, l.id).await?;

        let detail = get_business_by_id(&db, b.id).await?.unwrap();
        assert_eq!(detail.license_id, Some(l.id));
        assert!(detail.license_key.is_none());
        assert!(detail.license_status.is_none());
        assert!(detail.license_issued.is_none());
        assert!(detail.license_expired.is_none());

        models::license::Entity::delete_by_id(l.id).exec(&db).await?;
        business::Entity::delete_by_id(b.id).exec(&db).await?;
        models::product::Entity::delete_by_id(p.id).exec(&db).await?;
        models::customer::Entity::delete_by_id(c.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn register_license_links_and_truncates_updated() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let (c, p) = seed_refs(&db).await?;
        let b = create_business(&db, &format!("svc_reg_{}", Uuid::new_v4()), c.id, p.id, None).await?;

        let license_id = Uuid::new_v4();
        let linked = register_license(&db, b.id, license_id).await?;
        assert_eq!(linked.license_id, Some(license_id));
        assert_eq!(linked.updated.timestamp_subsec_nanos(), 0);

        // distinct failure kind from the find-based paths
        let missing = register_license(&db, Uuid::new_v4(), license_id).await;
        assert!(matches!(missing, Err(ServiceError::Other(_))));

        // a soft-deleted business can still be re-licensed
        remove_business(&db, b.id).await?;
        let relinked = register_license(&db, b.id, license_id).await?;
        assert_eq!(relinked.license_id, Some(license_id));
        assert!(relinked.removed.is_some());

        business::Entity::delete_by_id(b.id).exec(&db).await?;
        models::product::Entity::delete_by_id(p.id).exec(&db).await?;
        models::customer::Entity::delete_by_id(c.id).exec(&db).await?;
        Ok(())
    }
}
