//! ML prediction endpoints

use super::{ApiClient, error::ClientError, request::ApiRequest};
use taskdash_core::ml::{
    BatchCompletionTimePrediction, BatchCompletionTimeRequest, CompletionTimePrediction,
    CompletionTimeRequest, MlHealth, PriorityPrediction, PriorityRequest,
};

impl ApiClient {
    /// Estimate how many hours a task will take
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn predict_completion_time(
        &self,
        request: &CompletionTimeRequest,
    ) -> Result<CompletionTimePrediction, ClientError> {
        self.fetch(
            ApiRequest::post("/ml/predict/completion-time")
                .json(request)?
                .fallback_message("Prediction failed"),
        )
        .await
    }

    /// Suggest a priority from a task's text
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn predict_priority(
        &self,
        request: &PriorityRequest,
    ) -> Result<PriorityPrediction, ClientError> {
        self.fetch(
            ApiRequest::post("/ml/predict/priority")
                .json(request)?
                .fallback_message("Prediction failed"),
        )
        .await
    }

    /// Estimate completion time for several tasks at once
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn predict_batch(
        &self,
        request: &BatchCompletionTimeRequest,
    ) -> Result<BatchCompletionTimePrediction, ClientError> {
        self.fetch(
            ApiRequest::post("/ml/predict/batch")
                .json(request)?
                .fallback_message("Prediction failed"),
        )
        .await
    }

    /// Model-serving health
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn ml_health(&self) -> Result<MlHealth, ClientError> {
        self.fetch(ApiRequest::get("/ml/health")).await
    }
}
