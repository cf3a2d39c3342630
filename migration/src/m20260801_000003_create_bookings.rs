use sea_orm_migration::{prelude::*, schema::*};

use super::m20260801_000001_create_customers::Customer;
use super::m20260801_000002_create_buses::Bus;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(integer(Booking::CustomerId).not_null())
                    .col(integer(Booking::BusId).not_null())
                    .col(integer(Booking::SeatNumber).not_null())
                    .col(date(Booking::TravelDate).not_null())
                    .col(date(Booking::BookingDate).not_null())
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_customer")
                            .from(Booking::Table, Booking::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_bus")
                            .from(Booking::Table, Booking::BusId)
                            .to(Bus::Table, Bus::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A seat on a given route and travel date is held by at most one booking
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_bus_date_seat")
                    .table(Booking::Table)
                    .col(Booking::BusId)
                    .col(Booking::TravelDate)
                    .col(Booking::SeatNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    Table,
    Id,
    CustomerId,
    BusId,
    SeatNumber,
    TravelDate,
    BookingDate,
    CreatedAt,
}
