use sea_orm::entity::prelude::*;

// Group and value labels are denormalized snapshots; they must keep
// rendering even if the source variant value is later edited or deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "order_item_variants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub order_item_id: Uuid,
    pub group_label: String,
    pub value_label: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order_items::Entity",
        from = "Column::OrderItemId",
        to = "super::order_items::Column::Id"
    )]
    OrderItems,
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
