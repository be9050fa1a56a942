mod api_server;

pub use api_server::{router, ApiError, ApiServer, ApiState};

// Request and response shapes, for clients and integration tests
pub use api_server::{
    CompleteRequest, CompletionResponse, ExtractRequest, ExtractResponse, RequestOptions,
    ResolveQuery, ResolveResponse, ResolvedConfig, VisionRequest,
};
