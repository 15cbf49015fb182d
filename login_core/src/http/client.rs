use super::error::{Error, Result};
use crate::auth::{Authenticator, Credentials, User};
use url::Url;

/// Where the login endpoint lives.
pub const PATH: &str = "/api/v1/login";

/// Signs in by posting credentials to a server's login endpoint.
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    /// The server to connect to. Should only be the protocol and domain, e.g.
    /// `https://auth.your-domain.com`.
    server: String,

    /// Shared HTTP client, so repeated attempts can reuse connections.
    http: reqwest::Client,
}

impl HttpAuthenticator {
    /// Construct a new authenticator for the given server.
    pub fn new(server: impl Into<String>) -> Self {
        Self::with_client(server, reqwest::Client::new())
    }

    /// Construct a new authenticator that shares an existing HTTP client.
    pub fn with_client(server: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            server: server.into(),
            http,
        }
    }

    /// Where login requests go.
    ///
    /// ## Errors
    ///
    /// `Error::UrlParse` if the server isn't a valid base URL.
    pub fn login_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.server)?.join(PATH)?)
    }

    /// Convert an HTTP response into a user record, interpreting errors in a
    /// standard way.
    ///
    /// ## Errors
    ///
    /// - `Ok(..)` if the server returned a success (2xx) or a client error
    ///   (4xx). Rejected credentials come back as a record with a message and
    ///   no token.
    /// - `Error::Server` if the server returned a server error (5xx)
    /// - `Error::Unexpected` if the server returned something else
    /// - `Error::Http` if the request failed or the body wasn't a user record
    async fn handle_response(req: reqwest::RequestBuilder) -> Result<User> {
        let resp = req.send().await?;

        let status = resp.status();

        if status.is_success() || status.is_client_error() {
            Ok(resp.json().await?)
        } else if status.is_server_error() {
            Err(Error::Server(status))
        } else {
            Err(Error::Unexpected(status))
        }
    }
}

impl Authenticator for HttpAuthenticator {
    type Error = Error;

    async fn sign_in(&self, credentials: &Credentials) -> Result<User> {
        let url = self.login_url()?;

        tracing::debug!(%url, username = %credentials.username, "posting credentials");

        Self::handle_response(self.http.post(url).json(credentials)).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::next;
    use crate::LoginViewModel;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        task::JoinHandle,
    };

    /// Answer a single request with a canned JSON response. Gives back the
    /// server address and a handle that resolves to the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            request
        });

        (format!("http://{addr}"), handle)
    }

    /// Read one request, headers and body.
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        loop {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..read]);

            if let Some(end) = buf.windows(4).position(|window| window == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|len| len.trim().parse::<usize>().ok())
                    .unwrap_or(0);

                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }

        String::from_utf8(buf).unwrap()
    }

    fn authenticator(server: String) -> HttpAuthenticator {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();

        HttpAuthenticator::with_client(server, http)
    }

    fn alice() -> Credentials {
        Credentials {
            username: "alice".to_string(),
            password: "abc123".to_string(),
        }
    }

    #[test_log::test(tokio::test)]
    async fn success_decodes_user() {
        let (server, request) =
            serve_once("200 OK", r#"{"token": "abc", "name": "Alice"}"#).await;

        let user = authenticator(server).sign_in(&alice()).await.unwrap();

        assert_eq!(user.token(), Some("abc"));
        assert_eq!(user.name.as_deref(), Some("Alice"));

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /api/v1/login "));
        assert!(request.ends_with(r#"{"username":"alice","password":"abc123"}"#));
    }

    #[test_log::test(tokio::test)]
    async fn client_error_decodes_rejection() {
        let (server, _request) =
            serve_once("401 Unauthorized", r#"{"message": "Invalid password"}"#).await;

        let user = authenticator(server).sign_in(&alice()).await.unwrap();

        assert_eq!(user.token(), None);
        assert_eq!(user.message.as_deref(), Some("Invalid password"));
    }

    #[test_log::test(tokio::test)]
    async fn server_error_is_an_error() {
        let (server, _request) = serve_once("502 Bad Gateway", "{}").await;

        let result = authenticator(server).sign_in(&alice()).await;

        assert!(matches!(
            result,
            Err(Error::Server(status)) if status == reqwest::StatusCode::BAD_GATEWAY
        ));
    }

    #[test_log::test(tokio::test)]
    async fn redirect_is_unexpected() {
        let (server, _request) = serve_once("302 Found", "{}").await;

        let result = authenticator(server).sign_in(&alice()).await;

        assert!(matches!(
            result,
            Err(Error::Unexpected(status)) if status == reqwest::StatusCode::FOUND
        ));
    }

    #[test_log::test(tokio::test)]
    async fn rejection_message_reaches_server_error() {
        let (server, _request) =
            serve_once("401 Unauthorized", r#"{"message": "Invalid password"}"#).await;

        let vm = LoginViewModel::new(authenticator(server));
        let mut errors = vm.output().server_error();

        vm.input().user_name("alice");
        vm.input().password("abc123");
        vm.input().sign_in_did_tap();

        assert_eq!(next(&mut errors).await, "Invalid password");
    }

    #[test]
    fn joins_login_path() {
        let auth = HttpAuthenticator::new("https://auth.example.com");

        assert_eq!(
            auth.login_url().unwrap().as_str(),
            "https://auth.example.com/api/v1/login"
        );
    }

    #[test]
    fn replaces_any_existing_path() {
        let auth = HttpAuthenticator::new("https://auth.example.com/somewhere/else");

        assert_eq!(
            auth.login_url().unwrap().as_str(),
            "https://auth.example.com/api/v1/login"
        );
    }

    #[test_log::test(tokio::test)]
    async fn bad_server_fails_before_sending() {
        let auth = HttpAuthenticator::new("not a url");

        let result = auth
            .sign_in(&Credentials {
                username: "alice".to_string(),
                password: "abc123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(Error::UrlParse(_))));
    }

    #[test]
    fn errors_read_well() {
        assert_eq!(
            Error::Server(reqwest::StatusCode::BAD_GATEWAY).to_string(),
            "The server had a problem (502 Bad Gateway)"
        );
    }
}
