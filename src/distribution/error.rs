use thiserror::Error;

/// Errors produced by the distribution-service client.
#[derive(Debug, Error)]
pub enum DistributionError {
    /// The service could not be reached at all.
    #[error("distribution service unavailable: {source}")]
    Unavailable {
        #[source]
        source: anyhow::Error,
    },

    /// The service answered, but carried no entry for the requested
    /// product/depot pair.
    #[error("no metadata for product {product_id}, depot {depot_id}")]
    ProductMetadataMissing { product_id: u32, depot_id: u32 },

    /// A file transfer could not be completed.
    #[error("transfer of {remote_path} failed: {source}")]
    Transport {
        remote_path: String,
        #[source]
        source: anyhow::Error,
    },
}
