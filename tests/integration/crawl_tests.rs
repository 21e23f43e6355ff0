//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, including the CSV report.

use linkloom::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use linkloom::crawler::run_crawl;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HEADER: &str = "page_url,h1,first_paragraph,outgoing_link_urls,image_urls";

/// Creates a test configuration crawling `base_url` and reporting into `dir`
fn create_test_config(base_url: &str, dir: &TempDir, max_concurrency: u32, max_pages: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url: base_url.to_string(),
            max_concurrency,
            max_pages,
            request_timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: Some("https://example.com/contact".to_string()),
        },
        output: OutputConfig {
            report_path: dir.path().join("report.csv").display().to_string(),
        },
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

/// Host and port of the mock server, as used in normalized keys
fn server_key(server: &MockServer) -> String {
    server.uri().trim_start_matches("http://").to_string()
}

fn read_report(config: &Config) -> Vec<String> {
    std::fs::read_to_string(Path::new(&config.output.report_path))
        .expect("report should exist")
        .lines()
        .map(String::from)
        .collect()
}

#[tokio::test]
async fn test_two_page_site_with_cross_host_link() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let port = url::Url::parse(&base_url).unwrap().port().unwrap();

    // Same server reached under another host name: must never be fetched
    let cross_host = format!("http://localhost:{}/elsewhere", port);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<html><body>
                <h1>Home</h1>
                <main><p>Welcome home.</p></main>
                <a href="/p1">relative</a>
                <a href="{base}/p1">absolute</a>
                <a href="{cross}">other host</a>
                <img src="/logo.png">
            </body></html>"#,
            base = base_url,
            cross = cross_host
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(html(&format!(
            r#"<h1>Page One</h1><p>First, second.</p><a href="{}/">home</a>"#,
            base_url
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(html("<h1>Nope</h1>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &dir, 3, 10);
    let outcome = run_crawl(config.clone()).await.expect("crawl should succeed");

    let key = server_key(&server);
    let p1_key = format!("{}/p1", key);
    assert_eq!(
        outcome.pages.keys().cloned().collect::<Vec<_>>(),
        vec![key.clone(), p1_key.clone()]
    );
    assert!(outcome.failures.is_empty());

    let home = &outcome.pages[&key];
    assert_eq!(home.url, base_url);
    assert_eq!(home.h1, "Home");
    assert_eq!(home.first_paragraph, "Welcome home.");
    assert_eq!(
        home.outgoing_links,
        vec![
            format!("{}/p1", base_url),
            format!("{}/p1", base_url),
            cross_host.clone(),
        ]
    );
    assert_eq!(home.image_urls, vec![format!("{}/logo.png", base_url)]);

    let lines = read_report(&config);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], HEADER);
    assert_eq!(
        lines[1],
        format!(
            "{key},Home,Welcome home.,{base}/p1;{base}/p1;{cross},{base}/logo.png",
            key = key,
            base = base_url,
            cross = cross_host
        )
    );
    assert_eq!(
        lines[2],
        format!(
            "{key},Page One,\"First, second.\",{base}/,",
            key = p1_key,
            base = base_url
        )
    );
}

#[tokio::test]
async fn test_failed_seed_writes_header_only_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 2, 10);
    let outcome = run_crawl(config.clone())
        .await
        .expect("a failed seed is not a failed crawl");

    assert!(outcome.pages.is_empty());
    assert_eq!(outcome.statistics.pages_failed, 1);
    assert_eq!(read_report(&config), vec![HEADER.to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_page_limit_with_single_slot() {
    let server = MockServer::start().await;

    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&links))
        .mount(&server)
        .await;
    for i in 0..20 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(html(&format!("<h1>Page {}</h1>{}", i, links)))
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 1, 5);
    let outcome = run_crawl(config.clone()).await.unwrap();

    assert_eq!(outcome.pages.len(), 5);
    assert_eq!(read_report(&config).len(), 6);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_each_page_fetched_once_under_concurrency() {
    let server = MockServer::start().await;

    let base_url = server.uri();
    let links: String = (0..10)
        .map(|i| {
            format!(
                r#"<a href="/p{i}">p{i}</a><a href="{base}/p{i}">again</a><a href="{base}/p{i}/">slash</a>"#,
                i = i,
                base = base_url
            )
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&links))
        .expect(1)
        .mount(&server)
        .await;
    for i in 0..10 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(html(&format!(r#"{}<a href="/">home</a>"#, links)))
            .expect(1)
            .mount(&server)
            .await;
        // Trailing slash is a distinct key and a distinct resource
        Mock::given(method("GET"))
            .and(path(format!("/p{}/", i)))
            .respond_with(html("<h1>Slash</h1>"))
            .expect(1)
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &dir, 8, 100);
    let outcome = run_crawl(config).await.unwrap();

    assert_eq!(outcome.pages.len(), 21);
    assert!(outcome.failures.is_empty());
}

#[tokio::test]
async fn test_non_html_page_is_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/doc.pdf">pdf</a><a href="/p1">p1</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(html("<h1>P1</h1>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 2, 10);
    let outcome = run_crawl(config.clone()).await.unwrap();

    let pdf_key = format!("{}/doc.pdf", server_key(&server));
    assert_eq!(outcome.pages.len(), 2);
    assert!(!outcome.pages.contains_key(&pdf_key));
    assert!(outcome.failures[&pdf_key].contains("application/pdf"));
    assert_eq!(read_report(&config).len(), 3);
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/old">old</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/new", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html("<h1>Moved</h1>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 2, 10);
    let outcome = run_crawl(config).await.unwrap();

    // Recorded under the URL that was requested
    let old = &outcome.pages[&format!("{}/old", server_key(&server))];
    assert_eq!(old.h1, "Moved");
    assert_eq!(old.url, format!("{}/old", server.uri()));
}

#[tokio::test]
async fn test_redirect_to_other_host_is_not_followed() {
    let server = MockServer::start().await;
    let port = url::Url::parse(&server.uri()).unwrap().port().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<h1>Home</h1><a href="/go">go</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(ResponseTemplate::new(302).insert_header(
            "location",
            format!("http://localhost:{}/ext", port).as_str(),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ext"))
        .respond_with(html("<h1>other host</h1>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 2, 10);
    let outcome = run_crawl(config.clone()).await.unwrap();

    let go_key = format!("{}/go", server_key(&server));
    assert_eq!(outcome.pages.len(), 1);
    assert!(!outcome.pages.contains_key(&go_key));
    assert!(outcome.failures[&go_key].contains("leaves the host"));
    assert_eq!(read_report(&config).len(), 2);
}

#[tokio::test]
async fn test_user_agent_header_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact)",
        ))
        .respond_with(html("<h1>Hello</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 1, 10);
    let outcome = run_crawl(config).await.unwrap();

    assert_eq!(outcome.pages.len(), 1);
}

#[tokio::test]
async fn test_unwritable_report_path_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<h1>Hello</h1>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), &dir, 1, 10);
    config.output.report_path = dir
        .path()
        .join("missing")
        .join("report.csv")
        .display()
        .to_string();

    let result = run_crawl(config).await;
    assert!(matches!(result, Err(linkloom::LinkloomError::Output(_))));
}
