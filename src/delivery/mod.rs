//! File delivery
//!
//! The [`DeliveryDispatcher`] picks the configured [`DeliveryStrategy`] from a
//! [`StrategyRegistry`], sets the metadata headers and hands over the file.
//!
//! Built-in strategies:
//! - `readfile`: stream the whole file
//! - `range`: honour a single `Range` request
//! - `x-sendfile`: delegate to a fronting server via `X-Sendfile`
//! - `x-accel-redirect`: delegate to nginx via `X-Accel-Redirect`

mod dispatcher;
mod error;
mod range;
mod sink;
mod strategy;

pub use dispatcher::{apply_metadata_headers, content_disposition, DeliveryDispatcher};
pub use error::DeliveryError;
pub use range::{ByteRange, RangeStrategy};
pub use sink::ResponseSink;
pub use strategy::{
    DeliveryStrategy, ReadfileStrategy, StrategyRegistry, XAccelRedirectStrategy,
    XSendfileStrategy, DEFAULT_X_ACCEL_PREFIX, RANGE, READFILE, STREAM_CHUNK_SIZE,
    X_ACCEL_REDIRECT, X_SENDFILE,
};
