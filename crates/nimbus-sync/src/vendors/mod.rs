//! Per-vendor pipeline implementations.

pub mod aws;
pub mod azure;
pub mod gcp;
pub mod huawei;
pub mod tcloud;

pub use aws::AwsPipeline;
pub use azure::AzurePipeline;
pub use gcp::GcpPipeline;
pub use huawei::HuaWeiPipeline;
pub use tcloud::TCloudPipeline;
