use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "navigation_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub name: String,
    pub display_name: String,
    pub url_name: Option<String>,
    pub parent_id: Option<String>,
    pub item_order: i32,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Parent,
    #[sea_orm(has_many = "super::role_navigation_item::Entity")]
    RoleNavigationItem,
}

impl Related<super::role_navigation_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoleNavigationItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
