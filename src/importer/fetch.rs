use std::time::Duration;

use super::error::FetchError;

/// Downloads photo bytes from their canonical URL.
#[rocket::async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Clone)]
pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("album-server/0.1")
            .build()?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[rocket::async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let bytes = response.bytes().await?;
        log::trace!("fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[tokio::test]
    async fn returns_body_bytes() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/media/photo.jpg")
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body([0xFFu8, 0xD8, 0xFF, 0xE0])
            .create_async()
            .await;

        let fetcher = HttpImageFetcher::with_client(reqwest::Client::new());
        let bytes = fetcher
            .fetch(&format!("{}/media/photo.jpg", server.url()))
            .await
            .expect("fetch");

        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/media/gone.jpg")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = HttpImageFetcher::with_client(reqwest::Client::new());
        let err = fetcher
            .fetch(&format!("{}/media/gone.jpg", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status(StatusCode::NOT_FOUND)));
    }
}
