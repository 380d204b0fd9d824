pub mod event_repo;
pub mod invoice_repo;
pub mod member_repo;
pub mod product_repo;
pub mod settings_repo;
pub mod subscription_repo;
