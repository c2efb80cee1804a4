use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pasargis_core::error::IngestError;
use serde::Serialize;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
    pub help: Option<String>,
    pub zip_entries: Option<Vec<String>>,
    pub extracted_items: Option<Vec<String>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: None,
            help: None,
            zip_entries: None,
            extracted_items: None,
        }
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    zip_entries: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extracted_items: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
            detail: self.detail,
            help: self.help,
            zip_entries: self.zip_entries,
            extracted_items: self.extracted_items,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        let status = match &err {
            IngestError::LayerNotFound { .. } => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %err, "Request failed");
        } else {
            tracing::warn!(error = %err, "Request rejected");
        }

        let mut api_error = Self::new(status, err.to_string());
        api_error.help = err.help().map(str::to_string);
        api_error.detail = match &err {
            IngestError::InvalidGeoJson { reason }
            | IngestError::ArchiveOpen { reason }
            | IngestError::InvalidConversionOutput { reason } => Some(reason.clone()),
            IngestError::ConverterUnavailable { path } => Some(path.display().to_string()),
            IngestError::Task(_) | IngestError::Io(_) => {
                Some(err.to_string())
            }
            other => other.tool_output().map(str::to_string),
        };

        if let IngestError::GeodatabaseNotFound {
            zip_entries,
            extracted_items,
        } = err
        {
            api_error.zip_entries = Some(zip_entries);
            api_error.extracted_items = Some(extracted_items);
        }

        api_error
    }
}
