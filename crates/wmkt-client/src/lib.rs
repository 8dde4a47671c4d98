pub mod auth;
pub mod client;
pub mod error;
pub mod feeds;
pub mod orders;
pub mod poll;
pub mod signer;
pub mod types;
pub mod verify;
pub mod workflow;

pub use auth::AccessToken;
pub use client::{ClientOptions, MarketplaceClient};
pub use error::MarketplaceError;
pub use feeds::FeedPayload;
pub use orders::{OrderQuery, TrackingInfo};
pub use poll::{FeedOutcome, FeedStatusReport, FixedDelay, PollDelay, PollPolicy};
pub use signer::{RequestSigner, SignedHeaders};
pub use types::{FeedId, FeedKind, FeedStatus, Order, OrderLine};
pub use workflow::{
    run_listing_sequence, run_order_sequence, run_seller_sequence, RunOptions, RunReport, Step,
    StepOutcome, StepStatus,
};
