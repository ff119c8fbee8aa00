use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "role_navigation_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(indexed)]
    pub role_id: String,
    pub navigation_item_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id",
        on_delete = "Cascade"
    )]
    Role,
    #[sea_orm(
        belongs_to = "super::navigation_item::Entity",
        from = "Column::NavigationItemId",
        to = "super::navigation_item::Column::Id",
        on_delete = "Cascade"
    )]
    NavigationItem,
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl Related<super::navigation_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NavigationItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
