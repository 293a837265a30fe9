//! Repository layer: one zero-sized struct per table group, each method
//! taking the pool (or an open transaction) as its first argument.

pub mod cash_out_repo;
pub mod category_repo;
pub mod client_repo;
pub mod dashboard_repo;
pub mod delivery_repo;
pub mod image_repo;
pub mod order_repo;
pub mod payment_method_repo;
pub mod product_repo;
pub mod role_repo;
pub mod session_repo;
pub mod subcategory_repo;
pub mod subscription_plan_repo;
pub mod subscription_repo;
pub mod user_repo;
pub mod vendor_note_repo;
pub mod vendor_repo;
pub mod wallet_repo;

pub use cash_out_repo::CashOutRepo;
pub use category_repo::CategoryRepo;
pub use client_repo::ClientRepo;
pub use dashboard_repo::DashboardRepo;
pub use delivery_repo::DeliveryRepo;
pub use image_repo::ImageRepo;
pub use order_repo::OrderRepo;
pub use payment_method_repo::PaymentMethodRepo;
pub use product_repo::ProductRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use subcategory_repo::SubcategoryRepo;
pub use subscription_plan_repo::SubscriptionPlanRepo;
pub use subscription_repo::SubscriptionRepo;
pub use user_repo::UserRepo;
pub use vendor_note_repo::VendorNoteRepo;
pub use vendor_repo::VendorRepo;
pub use wallet_repo::WalletRepo;
