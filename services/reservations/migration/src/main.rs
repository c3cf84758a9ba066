use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(slotbook_reservations_migration::Migrator).await;
}
