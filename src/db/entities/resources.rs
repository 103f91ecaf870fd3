//! The studio app's `Resource` table (poses, backgrounds, models...).
//!
//! The app owns this table and generates string ids on its side, so ids are
//! made here too and `createdAt` is left to the column default.
#![allow(missing_docs)]

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, QueryFilter, QueryOrder,
    TransactionTrait,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "Resource")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub name: String,
    pub prompt: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Fresh primary key for a new row.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// All resources with the given natural key, in insertion order.
pub async fn by_key<C: ConnectionTrait>(
    db: &C,
    kind: &str,
    name: &str,
) -> Result<Vec<Model>, DbErr> {
    Entity::find()
        .filter(Column::Kind.eq(kind))
        .filter(Column::Name.eq(name))
        .order_by_asc(Expr::cust("rowid"))
        .all(db)
        .await
}

/// What [upsert] did.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UpsertOutcome {
    /// No row had the key, this one was inserted.
    Created(String),
    /// The first row with the key had its thumbnail replaced.
    Updated(String),
}

impl UpsertOutcome {
    /// Row id either way.
    pub fn id(&self) -> &str {
        match self {
            UpsertOutcome::Created(id) | UpsertOutcome::Updated(id) => id,
        }
    }
}

/// Find-or-create by `(kind, name)`.
///
/// An existing row only gets its thumbnail changed, the prompt it already has is kept.
pub async fn upsert(
    db: &DatabaseConnection,
    kind: &str,
    name: &str,
    prompt: &str,
    thumbnail: &str,
) -> Result<UpsertOutcome, DbErr> {
    let txn = db.begin().await?;
    let existing = Entity::find()
        .filter(Column::Kind.eq(kind))
        .filter(Column::Name.eq(name))
        .order_by_asc(Expr::cust("rowid"))
        .one(&txn)
        .await?;

    let outcome = match existing {
        Some(model) => {
            let id = model.id.clone();
            let mut active: ActiveModel = model.into();
            active.thumbnail = Set(Some(thumbnail.to_string()));
            active.update(&txn).await?;
            UpsertOutcome::Updated(id)
        }
        None => {
            let model = ActiveModel {
                id: Set(new_id()),
                kind: Set(kind.to_string()),
                name: Set(name.to_string()),
                prompt: Set(Some(prompt.to_string())),
                thumbnail: Set(Some(thumbnail.to_string())),
            }
            .insert(&txn)
            .await?;
            UpsertOutcome::Created(model.id)
        }
    };
    txn.commit().await?;
    Ok(outcome)
}
