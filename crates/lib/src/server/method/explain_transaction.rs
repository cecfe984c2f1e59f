use crate::{
    explain::{upstream::ExplainUpstream, ExplainRateLimiter},
    SkittyError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ExplainTransactionRequest {
    pub transaction_data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ExplainTransactionResponse {
    pub explanation: String,
}

pub async fn explain_transaction(
    request: ExplainTransactionRequest,
) -> Result<ExplainTransactionResponse, SkittyError> {
    if request.transaction_data.is_null() {
        return Err(SkittyError::ValidationError(
            "Missing transaction_data in body".to_string(),
        ));
    }

    // quota check precedes any upstream work
    ExplainRateLimiter::check_explain_limit().await?;

    let upstream = ExplainUpstream::from_config()?;
    let explanation = upstream.explain(&request.transaction_data).await?;
    Ok(ExplainTransactionResponse { explanation })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::config_mock::ConfigMockBuilder;
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn test_null_body_rejected_before_quota() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let request = ExplainTransactionRequest { transaction_data: serde_json::Value::Null };
        let result = explain_transaction(request).await;
        assert!(matches!(result, Err(SkittyError::ValidationError(_))));
    }
}
