//! Tests for TeraboxClient with mocked HTTP responses.

use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;
use terabox_relay::{resolve_surl, RelayError, ShareApi, ShareCredentials, TeraboxClient};

fn client(server: &Server) -> TeraboxClient {
    TeraboxClient::with_base_url(&server.url(), Duration::from_secs(5)).unwrap()
}

fn credentials() -> ShareCredentials {
    ShareCredentials {
        uk: "4400".to_string(),
        shareid: "9900".to_string(),
        sign: "s1gn".to_string(),
        timestamp: "1700000000".to_string(),
    }
}

mod share_info {
    use super::*;

    #[tokio::test]
    async fn sends_listing_parameters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/shorturlinfo")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("app_id".into(), "250528".into()),
                Matcher::UrlEncoded("shorturl".into(), "abc".into()),
                Matcher::UrlEncoded("root".into(), "1".into()),
                Matcher::UrlEncoded("dir".into(), "/Movies".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("num".into(), "1000".into()),
                Matcher::UrlEncoded("order".into(), "name".into()),
                Matcher::UrlEncoded("desc".into(), "0".into()),
            ]))
            .match_header("referer", Matcher::Any)
            .match_header("origin", Matcher::Any)
            .with_header("content-type", "text/html")
            .with_body(
                json!({
                    "errno": 0,
                    "share_title": "Movies",
                    "uk": 4400,
                    "shareid": 9900,
                    "sign": "s1gn",
                    "timestamp": 1700000000,
                    "list": [
                        {"server_filename": "a.mkv", "size": 10, "fs_id": 1, "isdir": 0, "path": "/Movies/a.mkv"},
                        {"server_filename": "Extras", "size": 0, "fs_id": 2, "isdir": 1, "path": "/Movies/Extras"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let listing = client(&server)
            .fetch_share_info("abc", "/Movies")
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(listing.is_ok());
        assert_eq!(listing.share_title.as_deref(), Some("Movies"));
        assert_eq!(listing.list.len(), 2);
        assert!(listing.list[1].is_dir());
        assert_eq!(listing.credentials(), credentials());
    }

    #[tokio::test]
    async fn returns_provider_errors_untouched() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/shorturlinfo")
            .match_query(Matcher::Any)
            .with_body(json!({"errno": 2, "errmsg": "share expired"}).to_string())
            .create_async()
            .await;

        let listing = client(&server).fetch_share_info("abc", "/").await.unwrap();

        assert_eq!(listing.errno, 2);
        assert_eq!(listing.errmsg.as_deref(), Some("share expired"));
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/shorturlinfo")
            .match_query(Matcher::Any)
            .with_body("<html>blocked</html>")
            .create_async()
            .await;

        let result = client(&server).fetch_share_info("abc", "/").await;
        assert!(matches!(result, Err(RelayError::JsonError(_))));
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        let client =
            TeraboxClient::with_base_url("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let result = client.fetch_share_info("abc", "/").await;
        assert!(matches!(result, Err(RelayError::HttpError(_))));
    }
}

mod download_link {
    use super::*;

    #[tokio::test]
    async fn returns_first_link() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/download")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("uk".into(), "4400".into()),
                Matcher::UrlEncoded("shareid".into(), "9900".into()),
                Matcher::UrlEncoded("sign".into(), "s1gn".into()),
                Matcher::UrlEncoded("timestamp".into(), "1700000000".into()),
                Matcher::UrlEncoded("fid_list".into(), "[42]".into()),
            ]))
            .with_body(
                json!({
                    "errno": 0,
                    "dlink": [{"url": "https://d.terabox.com/file/42"}, {"url": "https://other"}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let url = client(&server)
            .fetch_download_link(&credentials(), "42")
            .await;

        mock.assert_async().await;
        assert_eq!(url.as_deref(), Some("https://d.terabox.com/file/42"));
    }

    #[tokio::test]
    async fn provider_error_yields_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/download")
            .match_query(Matcher::Any)
            .with_body(json!({"errno": 112, "dlink": []}).to_string())
            .create_async()
            .await;

        assert!(client(&server)
            .fetch_download_link(&credentials(), "42")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn empty_link_list_yields_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/download")
            .match_query(Matcher::Any)
            .with_body(json!({"errno": 0, "dlink": []}).to_string())
            .create_async()
            .await;

        assert!(client(&server)
            .fetch_download_link(&credentials(), "42")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn malformed_body_yields_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/download")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("oops")
            .create_async()
            .await;

        assert!(client(&server)
            .fetch_download_link(&credentials(), "42")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn transport_failure_yields_none() {
        let client =
            TeraboxClient::with_base_url("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        assert!(client
            .fetch_download_link(&credentials(), "42")
            .await
            .is_none());
    }
}

mod link_resolution {
    use super::*;

    #[tokio::test]
    async fn direct_match_skips_network() {
        let client =
            TeraboxClient::with_base_url("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let surl = resolve_surl(&client, "https://www.terabox.com/s/1Direct")
            .await
            .unwrap();
        assert_eq!(surl, "1Direct");
    }

    #[tokio::test]
    async fn follows_redirect_to_share_page() {
        let mut server = Server::new_async().await;
        let target = format!("{}/sharing/link?surl=Redirected1", server.url());
        server
            .mock("GET", "/go/xyz")
            .with_status(302)
            .with_header("location", target.as_str())
            .create_async()
            .await;
        server
            .mock("GET", "/sharing/link")
            .match_query(Matcher::Any)
            .with_body("<html></html>")
            .create_async()
            .await;

        let surl = resolve_surl(&client(&server), &format!("{}/go/xyz", server.url()))
            .await
            .unwrap();
        assert_eq!(surl, "Redirected1");
    }

    #[tokio::test]
    async fn redirect_without_token_is_invalid() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/landing")
            .with_body("<html></html>")
            .create_async()
            .await;

        let result = resolve_surl(&client(&server), &format!("{}/landing", server.url())).await;
        assert!(matches!(result, Err(RelayError::InvalidShareUrl(_))));
    }

    #[tokio::test]
    async fn redirect_transport_failure_is_surfaced() {
        let client =
            TeraboxClient::with_base_url("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let result = resolve_surl(&client, "http://127.0.0.1:1/short/abc").await;
        assert!(matches!(result, Err(RelayError::Redirect(_))));
    }
}
