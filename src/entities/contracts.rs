use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub company_name: String,

    /// Company tax id (INN), unique across all contracts
    #[sea_orm(unique)]
    pub inn: String,

    pub director: String,

    #[sea_orm(column_type = "Text")]
    pub address: String,

    pub end_date: DateTimeUtc,

    /// Last derived status; corrected whenever the record is observed
    pub status: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub comments: Option<String>,

    pub has_nd: bool,

    /// JSON array of history entries, oldest first
    pub history: Json,

    pub lawyer_id: i32,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::LawyerId",
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
