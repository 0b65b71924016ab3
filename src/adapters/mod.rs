// Adapters layer: concrete clients for the commerce API, the spreadsheet API and the dry-run preview.

pub mod commerce;
pub mod google_auth;
pub mod http;
pub mod preview;
pub mod sheets;

pub use commerce::{WixClient, WixClientConfig};
pub use google_auth::{ServiceAccountAuth, StaticToken, TokenProvider};
pub use preview::CsvPreview;
pub use sheets::GoogleSheetsClient;
