//! ofxkit-core: normalization of raw OFX field values (amounts and dates).
//!
//! The tag-tree parser that walks an OFX document is expected to call into
//! this crate once per raw field and keep the normalized value.

pub mod amount;
pub mod datetime;
pub mod error;
pub mod factory;
pub mod zone;

pub use amount::create_amount_from_str;
pub use datetime::{DateTimeNormalizer, OfxTimestamp, create_datetime_from_str};
pub use error::{NormalizeError, Result};
pub use factory::{ChronoInstantFactory, InstantFactory};
pub use zone::Zone;
