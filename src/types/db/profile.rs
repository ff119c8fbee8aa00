use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(unique)]
    pub phone: String,
    /// Coarse self-declared type ("tenant" or "owner"); the authoritative
    /// roles are the role_assignments rows
    pub role_hint: String,
    pub is_approved: bool,
    pub approved_at: Option<i64>,
    pub approved_by: Option<String>,
    pub is_deactivated: bool,
    pub deactivation_reason: Option<String>,
    pub deactivated_at: Option<i64>,
    pub deactivated_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
