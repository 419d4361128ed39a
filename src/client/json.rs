// This file is part of the terraform-provider-pfptmeta project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use reqwest::{Method, Response};
use serde::{de::DeserializeOwned, Serialize};

use super::{Client, ClientError, Query, Result};

fn encode<B: Serialize + ?Sized>(entity: &'static str, body: &B) -> Result<Vec<u8>> {
    serde_json::to_vec(body).map_err(|source| ClientError::Serialize { entity, source })
}

async fn decode<R: DeserializeOwned>(
    entity: &'static str,
    method: &Method,
    response: Response,
) -> Result<R> {
    let url = response.url().to_string();
    let body = response
        .bytes()
        .await
        .map_err(|source| ClientError::Transport {
            method: method.clone(),
            url,
            source,
        })?;
    serde_json::from_slice(&body).map_err(|source| ClientError::Deserialize { entity, source })
}

impl Client {
    /// GET `path` and parse the body as `entity`.
    pub async fn get_json<R: DeserializeOwned>(
        &self,
        entity: &'static str,
        path: &str,
        query: Option<&Query<'_>>,
    ) -> Result<R> {
        let response = self.get(path, query).await?;
        decode(entity, &Method::GET, response).await
    }

    /// POST `body` to `path` and parse the answer as `entity`.
    pub async fn post_json<B, R>(&self, entity: &'static str, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.post(path, encode(entity, body)?).await?;
        decode(entity, &Method::POST, response).await
    }

    /// POST `body` to an action endpoint (`add_users`, ...), ignoring the answer.
    pub async fn post_action<B>(&self, entity: &'static str, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.post(path, encode(entity, body)?).await.map(drop)
    }

    /// PUT `body` to `path` and parse the answer as `entity`.
    pub async fn put_json<B, R>(&self, entity: &'static str, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.put(path, encode(entity, body)?).await?;
        decode(entity, &Method::PUT, response).await
    }

    /// PATCH `path` with a merge patch and parse the answer as `entity`.
    pub async fn patch_json<B, R>(&self, entity: &'static str, path: &str, patch: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.patch(path, encode(entity, patch)?).await?;
        decode(entity, &Method::PATCH, response).await
    }

    /// DELETE `path`, ignoring the response body.
    pub async fn delete_object(&self, path: &str) -> Result<()> {
        self.delete(path, None).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::client::tests::{mount_token_endpoint, test_client};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        id: String,
        name: String,
    }

    #[tokio::test]
    async fn post_sends_body_and_parses_answer() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("POST"))
            .and(path("/v1/groups"))
            .and(body_json(json!({"name": "admins"})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"id": "grp-1", "name": "admins"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let group: Named = client
            .post_json("group", "v1/groups", &json!({"name": "admins"}))
            .await
            .unwrap();

        assert_eq!(
            group,
            Named {
                id: "grp-1".into(),
                name: "admins".into()
            }
        );
    }

    #[tokio::test]
    async fn unexpected_body_names_the_entity() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/metaports/mp-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 12})))
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let err = client
            .get_json::<Named>("metaport", "v1/metaports/mp-1", None)
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("could not parse metaport response"));
    }
}
