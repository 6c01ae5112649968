use sea_orm::entity::prelude::*;

// No foreign key to orders or order items; linkage to an order is heuristic
// (see services::upload_service).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "uploaded_files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Option<Uuid>,
    pub cart_id: Option<Uuid>,
    pub storage_path: String,
    pub file_name: String,
    pub mime_type: String,
    pub uploaded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
