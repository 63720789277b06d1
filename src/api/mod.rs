// Venue-facing adapters: tick feed normalization and the REST client
pub mod feed;
pub mod venue;

pub use feed::{parse_message, run_feed, FeedMessage};
pub use venue::VenueClient;
