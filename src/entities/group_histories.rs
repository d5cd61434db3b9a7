use sea_orm::entity::prelude::*;

/// Append-only log of mentee membership changes. One row is written every
/// time a mentee's `group_id` changes, including release on group deletion
/// (where `to_group_id` is null).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "group_histories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub mentee_id: i32,

    pub from_group_id: Option<i32>,

    pub to_group_id: Option<i32>,

    /// The user who performed the move.
    pub moved_by: i32,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::mentees::Entity",
        from = "Column::MenteeId",
        to = "super::mentees::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Mentees,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::MovedBy",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::mentees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mentees.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
