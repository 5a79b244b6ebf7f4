//! Pipeline stages and outcomes

use std::fmt;

use axum::response::Response;

/// Step of the access pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Authenticating,
    Decoding,
    CheckingExpiration,
    CheckingContextBinding,
    Locating,
    Dispatching,
    Served,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Authenticating => "authenticating",
            PipelineStage::Decoding => "decoding",
            PipelineStage::CheckingExpiration => "checking_expiration",
            PipelineStage::CheckingContextBinding => "checking_context_binding",
            PipelineStage::Locating => "locating",
            PipelineStage::Dispatching => "dispatching",
            PipelineStage::Served => "served",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful result of handling a request
#[derive(Debug)]
pub enum AccessOutcome {
    /// The request carried no token; the host handles it as usual
    NotInvolved,
    /// The resource was delivered; the response is final
    Served(Response),
}

impl AccessOutcome {
    pub fn is_served(&self) -> bool {
        matches!(self, AccessOutcome::Served(_))
    }
}
