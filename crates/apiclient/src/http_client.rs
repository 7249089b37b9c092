// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reqwest`-backed [`RecordApiClient`], authenticated via a session cookie
//! set by a prior `/auth/login` call.

use std::collections::BTreeMap;

use async_trait::async_trait;
use oj_core::{RecordId, RecordSnapshot};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use tracing::instrument;

use crate::client::{CreateRecordRequest, FindRecordsQuery, RecordApiClient};
use crate::error::ApiClientError;

pub struct HttpRecordApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRecordApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Authenticate against `/auth/login`, establishing the session cookie
    /// subsequent requests rely on.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiClientError> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        Self::into_api_result(response).await.map(|_| ())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn into_api_result(response: Response) -> Result<serde_json::Value, ApiClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiClientError::Auth,
            StatusCode::NOT_FOUND => ApiClientError::NotFound,
            StatusCode::CONFLICT => ApiClientError::Conflict(body),
            s if s.is_client_error() => ApiClientError::Validation {
                status: s.as_u16(),
                body,
            },
            s => ApiClientError::Transient {
                status: s.as_u16(),
                body,
            },
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, ApiClientError> {
        let value = Self::into_api_result(response).await?;
        serde_json::from_value(value).map_err(ApiClientError::Decode)
    }

    async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<RecordSnapshot, ApiClientError> {
        let response = self.http.patch(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl RecordApiClient for HttpRecordApiClient {
    #[instrument(skip(self))]
    async fn get_record(&self, id: &RecordId) -> Result<RecordSnapshot, ApiClientError> {
        let response = self
            .http
            .get(self.url(&format!("/records/{id}")))
            .send()
            .await?;
        Self::decode(response).await
    }

    #[instrument(skip(self, query))]
    async fn find_records(
        &self,
        query: &FindRecordsQuery,
    ) -> Result<Vec<RecordSnapshot>, ApiClientError> {
        let response = self
            .http
            .post(self.url("/records/find"))
            .json(query)
            .send()
            .await?;
        Self::decode(response).await
    }

    #[instrument(skip(self, request))]
    async fn create_record(
        &self,
        request: CreateRecordRequest,
    ) -> Result<RecordSnapshot, ApiClientError> {
        let response = self
            .http
            .post(self.url("/records"))
            .json(&request)
            .send()
            .await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn update_record_status(
        &self,
        id: &RecordId,
        status: &str,
    ) -> Result<RecordSnapshot, ApiClientError> {
        self.patch(
            &format!("/records/{id}/status"),
            &serde_json::json!({ "status": status }),
        )
        .await
    }

    #[instrument(skip(self, data))]
    async fn update_record_data(
        &self,
        id: &RecordId,
        data: BTreeMap<String, serde_json::Value>,
    ) -> Result<RecordSnapshot, ApiClientError> {
        self.patch(&format!("/records/{id}/data"), &serde_json::json!({ "data": data }))
            .await
    }

    #[instrument(skip(self))]
    async fn append_context_info(
        &self,
        id: &RecordId,
        note: &str,
    ) -> Result<RecordSnapshot, ApiClientError> {
        let response = self
            .http
            .post(self.url(&format!("/records/{id}/context")))
            .json(&serde_json::json!({ "note": note }))
            .send()
            .await?;
        Self::decode(response).await
    }
}
