use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bus::Table)
                    .if_not_exists()
                    .col(pk_auto(Bus::Id))
                    .col(string_len(Bus::Route, 100).not_null().unique_key())
                    .col(integer(Bus::TotalSeats).not_null())
                    .to_owned(),
            )
            .await?;

        // Seed the fixed route set
        let insert = Query::insert()
            .into_table(Bus::Table)
            .columns([Bus::Route, Bus::TotalSeats])
            .values_panic(["Trichy → Chennai".into(), 5.into()])
            .values_panic(["Trichy → Coimbatore".into(), 5.into()])
            .values_panic(["Trichy → Madurai".into(), 5.into()])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bus::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Bus {
    Table,
    Id,
    Route,
    TotalSeats,
}
