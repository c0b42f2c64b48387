//! Generic repository over a sea-orm entity.
//!
//! Every driver error is translated into [`DatabaseError`] here; raw
//! `DbErr` values never cross this boundary. Entities with soft-delete
//! columns implement [`SoftDelete`] and get flag-based deletes, everything
//! else is removed physically.

use std::marker::PhantomData;

use sea_orm::{
    sea_query::Expr, ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DbConn,
    EntityTrait, FromQueryResult, IntoActiveModel, Iterable, PaginatorTrait, PrimaryKeyToColumn,
    PrimaryKeyTrait, QueryFilter, Value,
};
use serde::Serialize;

use crate::application::error::DatabaseError;

/// One page of results plus the envelope arithmetic the list endpoints
/// return.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub items_per_page: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

/// Entities carrying `is_deleted` / `deleted_at` / `deleted_by` columns.
/// Default read paths exclude flagged rows via [`SoftDelete::not_deleted`].
pub trait SoftDelete: EntityTrait {
    fn is_deleted_column() -> Self::Column;
    fn deleted_at_column() -> Self::Column;
    fn deleted_by_column() -> Self::Column;

    fn not_deleted() -> Condition {
        Condition::all().add(Self::is_deleted_column().eq(false))
    }
}

pub struct Repository<E: EntityTrait> {
    db: DbConn,
    entity_name: &'static str,
    _entity: PhantomData<E>,
}

impl<E: EntityTrait> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Repository {
            db: self.db.clone(),
            entity_name: self.entity_name,
            _entity: PhantomData,
        }
    }
}

impl<E> Repository<E>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i64>,
{
    pub fn new(db: DbConn, entity_name: &'static str) -> Self {
        Repository {
            db,
            entity_name,
            _entity: PhantomData,
        }
    }

    pub fn db(&self) -> &DbConn {
        &self.db
    }

    pub fn entity_name(&self) -> &'static str {
        self.entity_name
    }

    pub async fn create<A>(&self, model: A) -> Result<E::Model, DatabaseError>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        model
            .insert(&self.db)
            .await
            .map_err(|e| DatabaseError::classify(self.entity_name, e))
    }

    /// Fetch by primary key or fail with `NotFound` naming the entity.
    pub async fn find_by_id(&self, id: i64) -> Result<E::Model, DatabaseError> {
        self.try_find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(self.entity_name, id))
    }

    pub async fn try_find_by_id(&self, id: i64) -> Result<Option<E::Model>, DatabaseError> {
        E::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::classify(self.entity_name, e))
    }

    pub async fn find_all(&self) -> Result<Vec<E::Model>, DatabaseError> {
        E::find()
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::classify(self.entity_name, e))
    }

    pub async fn find_many(&self, cond: Condition) -> Result<Vec<E::Model>, DatabaseError> {
        E::find()
            .filter(cond)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::classify(self.entity_name, e))
    }

    /// First match or `NotFound`.
    pub async fn find_one(&self, cond: Condition) -> Result<E::Model, DatabaseError> {
        self.try_find_one(cond)
            .await?
            .ok_or_else(|| DatabaseError::not_found(self.entity_name, "no matching record"))
    }

    pub async fn try_find_one(&self, cond: Condition) -> Result<Option<E::Model>, DatabaseError> {
        E::find()
            .filter(cond)
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::classify(self.entity_name, e))
    }

    /// Apply the active model to the row with the given primary key.
    pub async fn update_by_id<A>(&self, id: i64, mut model: A) -> Result<E::Model, DatabaseError>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A>,
    {
        for key in E::PrimaryKey::iter() {
            model.set(key.into_column(), Value::from(id));
        }
        model
            .update(&self.db)
            .await
            .map_err(|e| DatabaseError::classify(self.entity_name, e))
    }

    pub async fn update_many(
        &self,
        cond: Condition,
        sets: Vec<(E::Column, Value)>,
    ) -> Result<u64, DatabaseError> {
        let mut query = E::update_many().filter(cond);
        for (column, value) in sets {
            query = query.col_expr(column, Expr::value(value));
        }
        let result = query
            .exec(&self.db)
            .await
            .map_err(|e| DatabaseError::classify(self.entity_name, e))?;
        Ok(result.rows_affected)
    }

    /// Physical delete by primary key. `NotFound` when nothing matched.
    pub async fn hard_delete_by_id(&self, id: i64) -> Result<(), DatabaseError> {
        let result = E::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| DatabaseError::classify(self.entity_name, e))?;
        if result.rows_affected == 0 {
            return Err(DatabaseError::not_found(self.entity_name, id));
        }
        Ok(())
    }

    pub async fn hard_delete_many(&self, cond: Condition) -> Result<u64, DatabaseError> {
        let result = E::delete_many()
            .filter(cond)
            .exec(&self.db)
            .await
            .map_err(|e| DatabaseError::classify(self.entity_name, e))?;
        Ok(result.rows_affected)
    }

    pub async fn count(&self, cond: Condition) -> Result<u64, DatabaseError> {
        E::find()
            .filter(cond)
            .count(&self.db)
            .await
            .map_err(|e| DatabaseError::classify(self.entity_name, e))
    }

    pub async fn exists(&self, cond: Condition) -> Result<bool, DatabaseError> {
        Ok(self.count(cond).await? > 0)
    }

    /// Filtered find + count composed into a page envelope. `page` is
    /// one-based; out-of-range pages come back empty with the arithmetic
    /// intact.
    pub async fn paginate(
        &self,
        cond: Condition,
        page: u64,
        per_page: u64,
    ) -> Result<Page<E::Model>, DatabaseError> {
        let page = page.max(1);
        let per_page = per_page.max(1);

        let paginator = E::find().filter(cond).paginate(&self.db, per_page);
        let totals = paginator
            .num_items_and_pages()
            .await
            .map_err(|e| DatabaseError::classify(self.entity_name, e))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| DatabaseError::classify(self.entity_name, e))?;

        Ok(Page {
            items,
            total_items: totals.number_of_items,
            items_per_page: per_page,
            total_pages: totals.number_of_pages,
            current_page: page,
        })
    }
}

impl<E> Repository<E>
where
    E: SoftDelete,
    E::Model: FromQueryResult + Send + Sync,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i64>,
{
    /// Flag-based delete. The row stays retrievable when explicitly asked
    /// for; default read paths filter on [`SoftDelete::not_deleted`].
    pub async fn delete_by_id(
        &self,
        id: i64,
        deleted_by: Option<i64>,
    ) -> Result<(), DatabaseError> {
        let cond = Condition::all()
            .add(self.pk_eq(id))
            .add(E::is_deleted_column().eq(false));
        let affected = self.soft_delete_where(cond, deleted_by).await?;
        if affected == 0 {
            return Err(DatabaseError::not_found(self.entity_name, id));
        }
        Ok(())
    }

    pub async fn delete_many(
        &self,
        cond: Condition,
        deleted_by: Option<i64>,
    ) -> Result<u64, DatabaseError> {
        let cond = cond.add(E::is_deleted_column().eq(false));
        self.soft_delete_where(cond, deleted_by).await
    }

    async fn soft_delete_where(
        &self,
        cond: Condition,
        deleted_by: Option<i64>,
    ) -> Result<u64, DatabaseError> {
        self.update_many(
            cond,
            vec![
                (E::is_deleted_column(), Value::from(true)),
                (E::deleted_at_column(), Value::from(chrono::Utc::now())),
                (E::deleted_by_column(), Value::from(deleted_by)),
            ],
        )
        .await
    }

    fn pk_eq(&self, id: i64) -> sea_orm::sea_query::SimpleExpr {
        let mut expr = None;
        for key in E::PrimaryKey::iter() {
            expr = Some(key.into_column().eq(id));
        }
        // Every entity here has exactly one primary-key column.
        expr.unwrap_or_else(|| Expr::value(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_serializes_envelope_fields() {
        let page = Page {
            items: vec![1, 2, 3],
            total_items: 13,
            items_per_page: 5,
            total_pages: 3,
            current_page: 2,
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["total_items"], 13);
        assert_eq!(json["items_per_page"], 5);
        assert_eq!(json["total_pages"], 3);
        assert_eq!(json["current_page"], 2);
        assert_eq!(json["items"].as_array().unwrap().len(), 3);
    }
}
