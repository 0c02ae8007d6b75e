pub mod auth;
pub mod drive_store;
pub mod sheets_client;

pub use auth::ServiceAccountAuth;
pub use drive_store::DriveStore;
pub use sheets_client::SheetsClient;
