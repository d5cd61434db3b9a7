use sea_orm::entity::prelude::*;

/// Per-mentee attendance for one meeting. The migration adds a unique index
/// on (meeting_id, mentee_id); writes go through an upsert on that pair.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attendances")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub meeting_id: i32,

    pub mentee_id: i32,

    /// Hadir, Sakit, Izin, or Alpa
    pub status: String,

    pub notes: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::meetings::Entity",
        from = "Column::MeetingId",
        to = "super::meetings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Meetings,
    #[sea_orm(
        belongs_to = "super::mentees::Entity",
        from = "Column::MenteeId",
        to = "super::mentees::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Mentees,
}

impl Related<super::meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl Related<super::mentees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mentees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
