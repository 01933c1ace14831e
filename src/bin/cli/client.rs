use bookmarket::dto::{
    AdminStatsDto, AuthResponseDto, BookQueryDto, CreateBookDto, CreateExchangeDto, CreateReviewDto,
    ExchangeDirection, RatingSummaryDto, ReviewQueryDto, SigninDto, SignupDto, UpdateBookDto,
    UpdateExchangeStatusDto, WishlistEntryDto, WishlistStatusDto,
};
use bookmarket::models::{Book, ExchangeRequest, ExchangeStatus, Review, User, WishlistItem};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Error type for CLI client operations
#[derive(Debug)]
pub enum ClientError {
    /// Server returned an error status with a message body
    Server { status: reqwest::StatusCode, message: String },
    /// Network/connection/request error
    Request(reqwest::Error),
    /// The command needs a session but none is saved
    NotSignedIn,
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status.as_u16(), message)
            }
            ClientError::Request(err) => write!(f, "{}", err),
            ClientError::NotSignedIn => write!(f, "Not signed in. Run `bookmarket-cli auth signin` first"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Request(err) => Some(err),
            ClientError::Server { .. } | ClientError::NotSignedIn => None,
        }
    }
}

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt {
    /// Checks for error status and extracts the server's error message body
    async fn check(self) -> Result<reqwest::Response, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<serde_json::Value>().await {
            Ok(body) => body.get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }
}

/// HTTP client wrapper for communicating with the Bookmarket server
pub struct BookmarketClient {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    /// Bearer token of the saved session, if any
    token: Option<String>,
    /// The underlying HTTP client
    client: Client,
}

impl BookmarketClient {
    /// Creates a new BookmarketClient
    ///
    /// ### Arguments
    ///
    /// * `base_url` - The base URL of the Bookmarket server
    /// * `token` - The session token to send with authenticated requests
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the bearer token, failing early when there is none
    fn authed(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_ref().ok_or(ClientError::NotSignedIn)?;
        Ok(request.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    async fn send_empty(request: RequestBuilder) -> Result<(), ClientError> {
        request.send().await.map_err(ClientError::Request)?.check().await?;
        Ok(())
    }

    // ── Auth endpoints ───────────────────────────────────────────────

    /// Registers a new user
    pub async fn signup(&self, username: String, email: String, password: String) -> Result<User, ClientError> {
        let dto = SignupDto { username, email, password };
        Self::send(self.client.post(self.url("/auth/signup")).json(&dto)).await
    }

    /// Signs in and returns the new session
    pub async fn signin(&self, email: String, password: String) -> Result<AuthResponseDto, ClientError> {
        let dto = SigninDto { email, password };
        Self::send(self.client.post(self.url("/auth/signin")).json(&dto)).await
    }

    /// Ends the current session on the server
    pub async fn signout(&self) -> Result<(), ClientError> {
        Self::send_empty(self.authed(self.client.post(self.url("/auth/signout")))?).await
    }

    /// Gets the signed-in user
    pub async fn me(&self) -> Result<User, ClientError> {
        Self::send(self.authed(self.client.get(self.url("/auth/me")))?).await
    }

    // ── Book endpoints ───────────────────────────────────────────────

    /// Lists books with optional filters
    pub async fn list_books(&self, query: &BookQueryDto) -> Result<Vec<Book>, ClientError> {
        Self::send(self.client.get(self.url("/books")).query(query)).await
    }

    /// Gets a specific book by ID
    pub async fn get_book(&self, id: &str) -> Result<Book, ClientError> {
        Self::send(self.client.get(self.url(&format!("/books/{}", id)))).await
    }

    /// Lists a new book for the signed-in user
    pub async fn create_book(&self, dto: &CreateBookDto) -> Result<Book, ClientError> {
        Self::send(self.authed(self.client.post(self.url("/books")))?.json(dto)).await
    }

    /// Changes the given fields of a listing
    pub async fn update_book(&self, id: &str, dto: &UpdateBookDto) -> Result<Book, ClientError> {
        let request = self.client.put(self.url(&format!("/books/{}", id)));
        Self::send(self.authed(request)?.json(dto)).await
    }

    /// Deletes a listing
    pub async fn delete_book(&self, id: &str) -> Result<(), ClientError> {
        let request = self.client.delete(self.url(&format!("/books/{}", id)));
        Self::send_empty(self.authed(request)?).await
    }

    /// Gets the average rating of a book
    pub async fn book_rating(&self, id: &str) -> Result<RatingSummaryDto, ClientError> {
        Self::send(self.client.get(self.url(&format!("/books/{}/rating", id)))).await
    }

    /// Lists the genres of available books
    pub async fn list_genres(&self) -> Result<Vec<String>, ClientError> {
        Self::send(self.client.get(self.url("/genres"))).await
    }

    // ── Review endpoints ─────────────────────────────────────────────

    /// Lists reviews, optionally for one book and/or by one user
    pub async fn list_reviews(&self, query: &ReviewQueryDto) -> Result<Vec<Review>, ClientError> {
        Self::send(self.client.get(self.url("/reviews")).query(query)).await
    }

    /// Reviews a book as the signed-in user
    pub async fn create_review(&self, book_id: String, rating: i32, comment: String) -> Result<Review, ClientError> {
        let dto = CreateReviewDto { book_id, rating, comment };
        Self::send(self.authed(self.client.post(self.url("/reviews")))?.json(&dto)).await
    }

    // ── Wishlist endpoints ───────────────────────────────────────────

    /// Lists the signed-in user's wishlist
    pub async fn list_wishlist(&self) -> Result<Vec<WishlistEntryDto>, ClientError> {
        Self::send(self.authed(self.client.get(self.url("/wishlist")))?).await
    }

    /// Checks whether a book is on the wishlist
    pub async fn wishlist_status(&self, book_id: &str) -> Result<WishlistStatusDto, ClientError> {
        let request = self.client.get(self.url(&format!("/wishlist/{}", book_id)));
        Self::send(self.authed(request)?).await
    }

    /// Adds a book to the wishlist
    pub async fn add_to_wishlist(&self, book_id: &str) -> Result<WishlistItem, ClientError> {
        let request = self.client.post(self.url(&format!("/wishlist/{}", book_id)));
        Self::send(self.authed(request)?).await
    }

    /// Removes a book from the wishlist
    pub async fn remove_from_wishlist(&self, book_id: &str) -> Result<(), ClientError> {
        let request = self.client.delete(self.url(&format!("/wishlist/{}", book_id)));
        Self::send_empty(self.authed(request)?).await
    }

    // ── Exchange endpoints ───────────────────────────────────────────

    /// Lists the signed-in user's exchange requests
    pub async fn list_exchanges(&self, direction: ExchangeDirection) -> Result<Vec<ExchangeRequest>, ClientError> {
        let path = match direction {
            ExchangeDirection::All => "/exchanges",
            ExchangeDirection::Sent => "/exchanges/sent",
            ExchangeDirection::Received => "/exchanges/received",
        };
        Self::send(self.authed(self.client.get(self.url(path)))?).await
    }

    /// Gets one exchange request
    pub async fn get_exchange(&self, id: &str) -> Result<ExchangeRequest, ClientError> {
        let request = self.client.get(self.url(&format!("/exchanges/{}", id)));
        Self::send(self.authed(request)?).await
    }

    /// Proposes an exchange
    pub async fn create_exchange(
        &self,
        requested_book_id: String,
        offered_book_id: String,
        message: Option<String>,
    ) -> Result<ExchangeRequest, ClientError> {
        let dto = CreateExchangeDto { requested_book_id, offered_book_id, message };
        Self::send(self.authed(self.client.post(self.url("/exchanges")))?.json(&dto)).await
    }

    /// Moves an exchange request to a new status
    pub async fn update_exchange_status(&self, id: &str, status: ExchangeStatus) -> Result<ExchangeRequest, ClientError> {
        let dto = UpdateExchangeStatusDto { status };
        let request = self.client.put(self.url(&format!("/exchanges/{}/status", id)));
        Self::send(self.authed(request)?.json(&dto)).await
    }

    // ── Admin endpoints ──────────────────────────────────────────────

    /// Gets the admin dashboard numbers
    pub async fn admin_stats(&self) -> Result<AdminStatsDto, ClientError> {
        Self::send(self.authed(self.client.get(self.url("/admin/stats")))?).await
    }

    /// Lists every user
    pub async fn admin_users(&self) -> Result<Vec<User>, ClientError> {
        Self::send(self.authed(self.client.get(self.url("/admin/users")))?).await
    }

    /// Lists every exchange request
    pub async fn admin_exchanges(&self) -> Result<Vec<ExchangeRequest>, ClientError> {
        Self::send(self.authed(self.client.get(self.url("/admin/exchanges")))?).await
    }
}
