use contracts::domain::a001_page::aggregate::{Page, PageId, PageType};
use contracts::domain::common::{AggregateId, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_name = "type")]
    pub page_type: String,
    pub parent_id: Option<String>,
    pub visible: bool,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Page {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let id = PageId::from_string(&m.id).map_err(DbErr::Custom)?;
        let parent_id = m
            .parent_id
            .as_deref()
            .map(PageId::from_string)
            .transpose()
            .map_err(DbErr::Custom)?;

        // неизвестный тип трактуется как защищённый
        let page_type = PageType::from_code(&m.page_type).unwrap_or_else(|| {
            tracing::warn!(
                "Page {} has unknown type '{}', treating it as system",
                m.id,
                m.page_type
            );
            PageType::System
        });

        Ok(Page {
            id,
            title: m.title,
            slug: m.slug,
            page_type,
            parent_id,
            visible: m.visible,
            meta_description: m.meta_description,
            meta_keywords: m.meta_keywords,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
                version: m.version,
            },
        })
    }
}

fn into_pages(models: Vec<Model>) -> Result<Vec<Page>, DbErr> {
    models.into_iter().map(Page::try_from).collect()
}

pub async fn list_all<C: ConnectionTrait>(conn: &C) -> Result<Vec<Page>, DbErr> {
    into_pages(Entity::find().all(conn).await?)
}

pub async fn count<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    Entity::find().count(conn).await
}

pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: PageId) -> Result<Option<Page>, DbErr> {
    Entity::find_by_id(id.as_string())
        .one(conn)
        .await?
        .map(Page::try_from)
        .transpose()
}

pub async fn get_by_slug<C: ConnectionTrait>(conn: &C, slug: &str) -> Result<Option<Page>, DbErr> {
    Entity::find()
        .filter(Column::Slug.eq(slug))
        .one(conn)
        .await?
        .map(Page::try_from)
        .transpose()
}

pub async fn list_children<C: ConnectionTrait>(
    conn: &C,
    parent_id: PageId,
) -> Result<Vec<Page>, DbErr> {
    into_pages(
        Entity::find()
            .filter(Column::ParentId.eq(parent_id.as_string()))
            .all(conn)
            .await?,
    )
}

pub async fn insert<C: ConnectionTrait>(conn: &C, page: &Page) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(page.id.as_string()),
        title: Set(page.title.clone()),
        slug: Set(page.slug.clone()),
        page_type: Set(page.page_type.code().to_string()),
        parent_id: Set(page.parent_id.map(|p| p.as_string())),
        visible: Set(page.visible),
        meta_description: Set(page.meta_description.clone()),
        meta_keywords: Set(page.meta_keywords.clone()),
        created_at: Set(page.metadata.created_at),
        updated_at: Set(page.metadata.updated_at),
        version: Set(page.metadata.version),
    };
    active.insert(conn).await?;
    Ok(())
}

pub async fn update<C: ConnectionTrait>(conn: &C, page: &Page) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(page.id.as_string()),
        title: Set(page.title.clone()),
        slug: Set(page.slug.clone()),
        page_type: Set(page.page_type.code().to_string()),
        parent_id: Set(page.parent_id.map(|p| p.as_string())),
        visible: Set(page.visible),
        meta_description: Set(page.meta_description.clone()),
        meta_keywords: Set(page.meta_keywords.clone()),
        updated_at: Set(page.metadata.updated_at),
        version: Set(page.metadata.version),
        created_at: ActiveValue::NotSet,
    };
    active.update(conn).await?;
    Ok(())
}

pub async fn delete<C: ConnectionTrait>(conn: &C, id: PageId) -> Result<bool, DbErr> {
    let result = Entity::delete_by_id(id.as_string()).exec(conn).await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use contracts::domain::a001_page::aggregate::PageDto;
    use sea_orm::{DatabaseBackend, Statement};

    #[tokio::test]
    async fn test_insert_and_load_roundtrip_keeps_type_and_parent() {
        let db = connect_in_memory().await;
        let parent = Page::new_custom(&PageDto::new("Parent", "parent")).unwrap();
        let mut child = Page::new_custom(&PageDto::new("Child", "parent/child")).unwrap();
        child.parent_id = Some(parent.id);

        insert(&db, &parent).await.unwrap();
        insert(&db, &child).await.unwrap();

        let loaded = get_by_slug(&db, "parent/child").await.unwrap().unwrap();
        assert_eq!(loaded.id, child.id);
        assert_eq!(loaded.parent_id, Some(parent.id));
        assert_eq!(loaded.page_type, PageType::Custom);
        assert_eq!(count(&db).await.unwrap(), 2);
        assert_eq!(list_children(&db, parent.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_slug_column_is_unique() {
        let db = connect_in_memory().await;
        insert(&db, &Page::new_custom(&PageDto::new("A", "promo")).unwrap())
            .await
            .unwrap();
        let duplicate = insert(&db, &Page::new_custom(&PageDto::new("B", "promo")).unwrap()).await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_unknown_type_loads_as_protected() {
        let db = connect_in_memory().await;
        let page = Page::new_custom(&PageDto::new("Legacy", "legacy")).unwrap();
        insert(&db, &page).await.unwrap();
        db.execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE pages SET type = 'landing' WHERE id = ?",
            [page.id.as_string().into()],
        ))
        .await
        .unwrap();

        let loaded = get_by_id(&db, page.id).await.unwrap().unwrap();
        assert!(loaded.page_type.is_protected());
    }

    #[tokio::test]
    async fn test_delete_reports_missing_rows() {
        let db = connect_in_memory().await;
        let page = Page::new_custom(&PageDto::new("Tmp", "tmp")).unwrap();
        insert(&db, &page).await.unwrap();
        assert!(delete(&db, page.id).await.unwrap());
        assert!(!delete(&db, page.id).await.unwrap());
    }
}
