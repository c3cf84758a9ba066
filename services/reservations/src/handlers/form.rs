use axum::Form;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ReservationsServiceError;

/// Form fields from either an `application/x-www-form-urlencoded` or a
/// `multipart/form-data` body.
///
/// Any other content type, or none, reads as an empty form so handlers still
/// decide between `Unauthenticated` and `MissingData` themselves. A body that
/// fails to parse is rejected as `MissingData`. When a field repeats, the
/// first value wins.
pub struct FormBody<T>(pub T);

impl<S, T> FromRequest<S> for FormBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ReservationsServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let fields = if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| {
                    tracing::debug!(error = %e, "urlencoded body rejected");
                    ReservationsServiceError::MissingData
                })?;
            fields
        } else if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await.map_err(|e| {
                tracing::debug!(error = %e, "multipart body rejected");
                ReservationsServiceError::MissingData
            })?;
            multipart_fields(multipart).await?
        } else {
            Vec::new()
        };

        decode(fields).map(FormBody)
    }
}

/// Text parts only; file uploads are skipped.
async fn multipart_fields(
    mut multipart: Multipart,
) -> Result<Vec<(String, String)>, ReservationsServiceError> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!(error = %e, "multipart field unreadable");
        ReservationsServiceError::MissingData
    })? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if field.file_name().is_some() {
            continue;
        }
        let value = field.text().await.map_err(|e| {
            tracing::debug!(error = %e, field = %name, "multipart field unreadable");
            ReservationsServiceError::MissingData
        })?;
        fields.push((name, value));
    }
    Ok(fields)
}

fn decode<T: DeserializeOwned>(
    fields: Vec<(String, String)>,
) -> Result<T, ReservationsServiceError> {
    let mut map = Map::new();
    for (name, value) in fields {
        map.entry(name).or_insert(Value::String(value));
    }
    serde_json::from_value(Value::Object(map)).map_err(|e| {
        tracing::debug!(error = %e, "form fields do not match request shape");
        ReservationsServiceError::MissingData
    })
}
