pub mod store;
pub mod types;

pub use store::{get_store_path, load_store, save_store, ListingStore};
pub use types::{Dealer, Listing};
