pub mod addresses;
pub mod audit_logs;
pub mod cart;
pub mod cart_variants;
pub mod order_item_variants;
pub mod order_items;
pub mod orders;
pub mod payment_methods;
pub mod products;
pub mod shipping_methods;
pub mod uploaded_files;

pub use addresses::Entity as Addresses;
pub use audit_logs::Entity as AuditLogs;
pub use cart::Entity as Cart;
pub use cart_variants::Entity as CartVariants;
pub use order_item_variants::Entity as OrderItemVariants;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use payment_methods::Entity as PaymentMethods;
pub use products::Entity as Products;
pub use shipping_methods::Entity as ShippingMethods;
pub use uploaded_files::Entity as UploadedFiles;
