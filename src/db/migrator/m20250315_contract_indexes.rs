use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Owner-scoped listing filters on lawyer_id
        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_lawyer_id")
                    .table(Contracts::Table)
                    .col(Contracts::LawyerId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_contracts_lawyer_id")
                    .table(Contracts::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Contracts {
    Table,
    LawyerId,
}
