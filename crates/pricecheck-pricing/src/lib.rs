pub mod error;
mod http;
pub mod quote;
pub mod reference;
pub(crate) mod retry;
pub mod source;
pub mod types;

pub use error::PricingError;
pub use quote::QuoteClient;
pub use reference::ReferenceClient;
pub use source::{QuoteSource, ReferenceSource};
pub use types::{PriceQuote, ReferencePrice};
