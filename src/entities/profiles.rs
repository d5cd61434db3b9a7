use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub user_id: i32,

    pub full_name: String,

    /// Canonical label: Ikhwan or Akhwat
    pub gender: String,

    pub nickname: Option<String>,

    pub birth_date: Option<String>,

    pub phone_number: Option<String>,

    pub address: Option<String>,

    pub job: Option<String>,

    /// Relative path under the public storage dir.
    pub profile_picture: Option<String>,

    pub status: String,

    pub status_note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
