//! The seam between the batch driver and whatever computes melting data.

use std::future::Future;

use unatherm_core::ThermoParams;

use crate::error::RemoteError;

/// Parsed fields plus the cleaned-up text they were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub params: ThermoParams,
    pub result_text: String,
}

/// One request/response cycle per sequence. Implementations hold a single
/// stateful session and are driven by one caller at a time.
pub trait MeltingService {
    fn compute(
        &mut self,
        sequence: &str,
    ) -> impl Future<Output = Result<ServiceResponse, RemoteError>> + Send;
}
