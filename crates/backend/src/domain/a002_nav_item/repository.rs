use chrono::Utc;
use contracts::domain::a002_nav_item::aggregate::{NavItem, NavItemId, NavTarget};
use contracts::domain::common::{AggregateId, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, Set,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "nav_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub label: String,
    pub linked_page_id: Option<String>,
    pub external_url: Option<String>,
    pub nav_group: String,
    pub order_index: i32,
    pub visible: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for NavItem {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let id = NavItemId::from_string(&m.id).map_err(DbErr::Custom)?;
        let target = NavTarget::from_parts(m.linked_page_id.as_deref(), m.external_url.as_deref())
            .map_err(DbErr::Custom)?
            .ok_or_else(|| DbErr::Custom(format!("Nav item {} has no link target", m.id)))?;

        Ok(NavItem {
            id,
            label: m.label,
            target,
            nav_group: m.nav_group,
            order_index: m.order_index,
            visible: m.visible,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
                version: m.version,
            },
        })
    }
}

fn into_items(models: Vec<Model>) -> Result<Vec<NavItem>, DbErr> {
    models.into_iter().map(NavItem::try_from).collect()
}

fn ordered() -> Select<Entity> {
    Entity::find()
        .order_by_asc(Column::OrderIndex)
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
}

/// Все пункты: по группе, затем по (order_index, created_at, id)
pub async fn list_all<C: ConnectionTrait>(conn: &C) -> Result<Vec<NavItem>, DbErr> {
    into_items(
        Entity::find()
            .order_by_asc(Column::NavGroup)
            .order_by_asc(Column::OrderIndex)
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(conn)
            .await?,
    )
}

pub async fn list_by_group<C: ConnectionTrait>(
    conn: &C,
    nav_group: &str,
) -> Result<Vec<NavItem>, DbErr> {
    into_items(
        ordered()
            .filter(Column::NavGroup.eq(nav_group))
            .all(conn)
            .await?,
    )
}

pub async fn count_in_group<C: ConnectionTrait>(conn: &C, nav_group: &str) -> Result<u64, DbErr> {
    Entity::find()
        .filter(Column::NavGroup.eq(nav_group))
        .count(conn)
        .await
}

pub async fn count<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    Entity::find().count(conn).await
}

pub async fn get_by_id<C: ConnectionTrait>(
    conn: &C,
    id: NavItemId,
) -> Result<Option<NavItem>, DbErr> {
    Entity::find_by_id(id.as_string())
        .one(conn)
        .await?
        .map(NavItem::try_from)
        .transpose()
}

fn active_model(item: &NavItem) -> ActiveModel {
    ActiveModel {
        id: Set(item.id.as_string()),
        label: Set(item.label.clone()),
        linked_page_id: Set(item.target.linked_page_id().map(|p| p.as_string())),
        external_url: Set(item.target.external_url().map(str::to_string)),
        nav_group: Set(item.nav_group.clone()),
        order_index: Set(item.order_index),
        visible: Set(item.visible),
        created_at: Set(item.metadata.created_at),
        updated_at: Set(item.metadata.updated_at),
        version: Set(item.metadata.version),
    }
}

pub async fn insert<C: ConnectionTrait>(conn: &C, item: &NavItem) -> Result<(), DbErr> {
    active_model(item).insert(conn).await?;
    Ok(())
}

pub async fn update<C: ConnectionTrait>(conn: &C, item: &NavItem) -> Result<(), DbErr> {
    let mut active = active_model(item);
    active.created_at = ActiveValue::NotSet;
    active.update(conn).await?;
    Ok(())
}

pub async fn set_order_index<C: ConnectionTrait>(
    conn: &C,
    id: NavItemId,
    order_index: i32,
) -> Result<(), DbErr> {
    Entity::update_many()
        .col_expr(Column::OrderIndex, Expr::value(order_index))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.as_string()))
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn delete<C: ConnectionTrait>(conn: &C, id: NavItemId) -> Result<bool, DbErr> {
    let result = Entity::delete_by_id(id.as_string()).exec(conn).await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use contracts::domain::a001_page::aggregate::PageId;

    fn external(label: &str, group: &str, order_index: i32) -> NavItem {
        NavItem::new_for_insert(
            label.into(),
            NavTarget::External {
                external_url: format!("/{}", label.to_lowercase()),
            },
            group.into(),
            order_index,
            true,
        )
    }

    #[tokio::test]
    async fn test_group_listing_is_ordered_by_index() {
        let db = connect_in_memory().await;
        insert(&db, &external("Second", "header", 1)).await.unwrap();
        insert(&db, &external("First", "header", 0)).await.unwrap();
        insert(&db, &external("Legal", "footer", 0)).await.unwrap();

        let labels: Vec<_> = list_by_group(&db, "header")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.label)
            .collect();
        assert_eq!(labels, vec!["First", "Second"]);
        assert_eq!(count_in_group(&db, "footer").await.unwrap(), 1);
        assert_eq!(count(&db).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_link_target_roundtrip() {
        let db = connect_in_memory().await;
        let page_id = PageId::new_v4();
        let item = NavItem::new_for_insert(
            "About".into(),
            NavTarget::Page {
                linked_page_id: page_id,
            },
            "header".into(),
            0,
            true,
        );
        insert(&db, &item).await.unwrap();

        let loaded = get_by_id(&db, item.id).await.unwrap().unwrap();
        assert_eq!(loaded.target.linked_page_id(), Some(page_id));
        assert_eq!(loaded.target.external_url(), None);
    }

    #[tokio::test]
    async fn test_both_targets_rejected_by_schema() {
        let db = connect_in_memory().await;
        let item = external("Both", "header", 0);
        let mut active = active_model(&item);
        active.linked_page_id = Set(Some(PageId::new_v4().as_string()));
        assert!(active.insert(&db).await.is_err());
    }

    #[tokio::test]
    async fn test_set_order_index() {
        let db = connect_in_memory().await;
        let item = external("Only", "header", 5);
        insert(&db, &item).await.unwrap();
        set_order_index(&db, item.id, 0).await.unwrap();
        assert_eq!(
            get_by_id(&db, item.id).await.unwrap().unwrap().order_index,
            0
        );
    }
}
