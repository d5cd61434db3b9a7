use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Profiles)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AccessTokens)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Groups)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Mentees)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(GroupHistories)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Meetings)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Attendances)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Announcements)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // At most one attendance row per (meeting, mentee); writes upsert on this pair.
        manager
            .create_index(
                Index::create()
                    .name("idx_attendances_meeting_mentee")
                    .table(Attendances)
                    .col(crate::entities::attendances::Column::MeetingId)
                    .col(crate::entities::attendances::Column::MenteeId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Announcements).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Attendances).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Meetings).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupHistories).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Mentees).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccessTokens).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
