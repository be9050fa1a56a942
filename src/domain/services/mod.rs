mod response_extractor;
mod tier_resolver;

pub use response_extractor::ResponseExtractor;
pub use tier_resolver::TierResolver;
