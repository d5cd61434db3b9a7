use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "mentees")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// A mentee belongs to at most one group at a time.
    pub group_id: Option<i32>,

    pub full_name: String,

    /// Canonical label: Ikhwan or Akhwat
    pub gender: String,

    /// Aktif, Non-Aktif, or Lulus
    pub status: String,

    pub deleted_at: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Groups,
    #[sea_orm(has_many = "super::group_histories::Entity")]
    GroupHistories,
    #[sea_orm(has_many = "super::attendances::Entity")]
    Attendances,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::group_histories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupHistories.def()
    }
}

impl Related<super::attendances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
