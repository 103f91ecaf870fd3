use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Resource::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Resource::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Resource::Type).string().not_null())
                    .col(ColumnDef::new(Resource::Name).string().not_null())
                    .col(ColumnDef::new(Resource::Prompt).text().null())
                    .col(ColumnDef::new(Resource::Thumbnail).string().null())
                    .col(
                        ColumnDef::new(Resource::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_resource_type_name")
                    .table(Resource::Table)
                    .col(Resource::Type)
                    .col(Resource::Name)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Resource::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Resource {
    #[sea_orm(iden = "Resource")]
    Table,
    Id,
    Type,
    Name,
    Prompt,
    Thumbnail,
    #[sea_orm(iden = "createdAt")]
    CreatedAt,
}
