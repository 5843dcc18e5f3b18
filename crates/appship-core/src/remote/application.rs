use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};

use super::{RemoteClient, RemoteError, status_error};
use crate::archive::Archive;
use crate::types::BearerToken;

const ARCHIVE_FIELD: &str = "file";
const ARCHIVE_MIME: &str = "application/zip";

impl RemoteClient {
    /// Wipe the application's deployed state. Success is HTTP 200 only.
    pub async fn clear(&self, clear_url: &Url, token: &BearerToken) -> Result<(), RemoteError> {
        tracing::debug!(url = %clear_url, "Clearing remote application state");

        let response = self
            .http()
            .delete(clear_url.clone())
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| RemoteError::transport(clear_url, e))?;

        if response.status() != StatusCode::OK {
            return Err(status_error(clear_url, response).await);
        }
        Ok(())
    }

    /// Upload the archive as the single `file` field of a multipart POST.
    ///
    /// Takes the archive by value; the buffer is released once the request
    /// body has been sent.
    pub async fn upload(
        &self,
        deploy_url: &Url,
        token: &BearerToken,
        archive: Archive,
        file_name: &str,
    ) -> Result<(), RemoteError> {
        tracing::debug!(url = %deploy_url, size_bytes = archive.len(), "Uploading archive");

        let part = Part::bytes(archive.into_bytes())
            .file_name(file_name.to_string())
            .mime_str(ARCHIVE_MIME)
            .map_err(RemoteError::Request)?;
        let form = Form::new().part(ARCHIVE_FIELD, part);

        let response = self
            .http()
            .post(deploy_url.clone())
            .bearer_auth(token.expose())
            .multipart(form)
            .send()
            .await
            .map_err(|e| RemoteError::transport(deploy_url, e))?;

        if response.status() != StatusCode::OK {
            return Err(status_error(deploy_url, response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::build_archive_blocking;
    use mockito::Matcher;
    use std::time::Duration;
    use tempfile::TempDir;

    fn client() -> RemoteClient {
        RemoteClient::new(Duration::from_secs(5)).unwrap()
    }

    fn url(server: &mockito::Server, path: &str) -> Url {
        Url::parse(&format!("{}{}", server.url(), path)).unwrap()
    }

    fn sample_archive() -> (TempDir, Archive) {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("index.html"), "hello").unwrap();
        let archive = build_archive_blocking(tmp.path(), None).unwrap();
        (tmp, archive)
    }

    #[tokio::test]
    async fn clear_sends_bearer_delete() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/v1/applications/demo/clear")
            .match_header("authorization", "Bearer tok-1")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        client()
            .clear(
                &url(&server, "/api/v1/applications/demo/clear"),
                &BearerToken::new("tok-1"),
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn clear_reports_401() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/v1/applications/demo/clear")
            .with_status(401)
            .with_body(r#"{"message":"token expired"}"#)
            .create_async()
            .await;

        let err = client()
            .clear(
                &url(&server, "/api/v1/applications/demo/clear"),
                &BearerToken::new("tok-1"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.to_string().contains("token expired"));
    }

    #[tokio::test]
    async fn upload_sends_multipart_file_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/applications/demo/deploy")
            .match_header("authorization", "Bearer tok-2")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::Regex(
                r#"name="file"; filename="demo.zip""#.to_string(),
            ))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let (_tmp, archive) = sample_archive();
        client()
            .upload(
                &url(&server, "/api/v1/applications/demo/deploy"),
                &BearerToken::new("tok-2"),
                archive,
                "demo.zip",
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upload_reports_server_rejection() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/applications/demo/deploy")
            .with_status(422)
            .with_body(r#"{"message":"archive missing manifest"}"#)
            .create_async()
            .await;

        let (_tmp, archive) = sample_archive();
        let err = client()
            .upload(
                &url(&server, "/api/v1/applications/demo/deploy"),
                &BearerToken::new("tok-2"),
                archive,
                "demo.zip",
            )
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(err.to_string().contains("archive missing manifest"));
    }
}
