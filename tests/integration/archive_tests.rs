//! Integration tests for the archive service
//!
//! These tests use wiremock to stand in for the remote archives and drive
//! the real HTTP fetcher, adapters and cache end-to-end.

use archive_tree::cache::DEFAULT_TTL;
use archive_tree::config::{Config, HttpConfig};
use archive_tree::crawler::{build_http_client, HttpFetcher};
use archive_tree::sources::adapter_for;
use archive_tree::{Archive, ArchiveError, FetchCache, NodeKind};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEXT_MARKER: &str = "%EC%B5%9C%EC%A2%85%EC%A0%95%EB%B3%B4";

/// Creates a configuration pointing both archives at the mock server
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.sources.itkc_base_url = base_url.to_string();
    config.sources.sillok_base_url = base_url.to_string();
    config.http.timeout_secs = 5;
    config
}

fn open(source: &str, server: &MockServer) -> Archive {
    let config = create_test_config(&server.uri());
    let cache = Arc::new(FetchCache::in_memory(DEFAULT_TTL));
    Archive::open(source, &config, cache).expect("Failed to open archive")
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn tree_entry(id: &str, title: &str, leaf: bool) -> String {
    let data_url = if leaf {
        format!("/dir/node?dataId={}&amp;gubun={}", id, TEXT_MARKER)
    } else {
        format!("/dir/item?dataId={}", id)
    };
    format!(
        r#"<li data-dataid="{}" data-url="{}"><span title="{}">{}</span></li>"#,
        id, data_url, title, title
    )
}

fn bt_leaf(title: &str, body: &str, original: &str) -> String {
    format!(
        r#"<html><body>
        <div class="text_body_tit">{}</div>
        <div class="text_body ">{}</div>
        <div class="text_body ori">{}</div>
        </body></html>"#,
        title, body, original
    )
}

/// Mounts a listing for `data_id` in the BT series
async fn mount_listing(server: &MockServer, data_id: &str, entries: &[String]) {
    Mock::given(method("GET"))
        .and(path("/dir/treeAjax"))
        .and(query_param("itemId", "BT"))
        .and(query_param("dataId", data_id))
        .respond_with(html(format!("<ul>{}</ul>", entries.concat())))
        .mount(server)
        .await;
}

async fn mount_bt_leaf(server: &MockServer, data_id: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/dir/node"))
        .and(query_param("dataId", data_id))
        .and(query_param("viewSync", "OT"))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_itkc_series_root() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dir/treeAjax"))
        .and(query_param("itemId", "BT"))
        .and(query_param("gubun", "book"))
        .and(query_param("depth", "1"))
        .respond_with(html(
            r#"<ul>
            <li data-dataid="ITKC_BT_1300A"><span title="국역 연려실기술 | 이긍익">국역 연려실기술(燃藜室記述)</span></li>
            <li data-dataid="ITKC_BT_0001A"><span title="국역 고려사절요 | 김종서">국역 고려사절요(高麗史節要)</span></li>
            </ul>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let archive = open("itkc-bt", &mock_server);
    let page = archive.list_children("BT").await.unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page.nodes[0].id, "ITKC_BT_1300A");
    assert_eq!(page.nodes[0].title, "국역 연려실기술");
    assert_eq!(page.nodes[0].variant_title.as_deref(), Some("燃藜室記述"));
    assert_eq!(page.nodes[1].attribution.as_deref(), Some("김종서"));
    assert!(page.nodes.iter().all(|n| n.kind == NodeKind::Container));
}

#[tokio::test]
async fn test_enumerate_and_resolve_volume() {
    let mock_server = MockServer::start().await;

    mount_listing(
        &mock_server,
        "V",
        &[tree_entry("A", "제1권", false), tree_entry("B", "제2권", false)],
    )
    .await;
    mount_listing(
        &mock_server,
        "A",
        &[tree_entry("L1", "첫째 기사", true), tree_entry("L2", "둘째 기사", true)],
    )
    .await;
    mount_listing(&mock_server, "B", &[tree_entry("L3", "셋째 기사", true)]).await;

    mount_bt_leaf(&mock_server, "L1", bt_leaf("첫째 기사", "번역<br>둘째 줄", "原文")).await;
    mount_bt_leaf(&mock_server, "L2", bt_leaf("둘째 기사", "번역", "原文")).await;
    mount_bt_leaf(&mock_server, "L3", bt_leaf("셋째 기사", "번역", "原文")).await;

    let archive = open("itkc-bt", &mock_server);

    let leaves = archive.enumerate_leaves("V").await.unwrap();
    let ids: Vec<&str> = leaves.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["L1", "L2", "L3"]);
    assert_eq!(leaves[2].parent_id.as_deref(), Some("B"));

    let resolved = archive.resolve_leaves(&leaves).await.unwrap();
    assert_eq!(resolved.len(), 3);

    let (node, document) = &resolved[0];
    assert_eq!(node.id, "L1");
    assert_eq!(document.title, "첫째 기사");
    assert_eq!(document.primary_text, "번역\n둘째 줄");
    assert_eq!(document.secondary_text.as_deref(), Some("原文"));
    assert_eq!(document.tags, vec!["ko", "lzh"]);
}

#[tokio::test]
async fn test_repeated_listing_served_from_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dir/treeAjax"))
        .and(query_param("dataId", "V"))
        .respond_with(html(format!("<ul>{}</ul>", tree_entry("L1", "기사", true))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let archive = open("itkc-bt", &mock_server);

    let first = archive.list_children("V").await.unwrap();
    let second = archive.list_children("V").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.nodes[0].kind, NodeKind::Leaf);
}

#[tokio::test]
async fn test_concurrent_leaf_requests_share_one_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dir/node"))
        .and(query_param("dataId", "L1"))
        .respond_with(
            html(bt_leaf("기사", "번역", "原文")).set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let archive = open("itkc-bt", &mock_server);

    let (a, b, c, d) = tokio::join!(
        archive.fetch_leaf("L1"),
        archive.fetch_leaf("L1"),
        archive.fetch_leaf("L1"),
        archive.fetch_leaf("L1"),
    );

    let a = a.unwrap();
    assert_eq!(a, b.unwrap());
    assert_eq!(a, c.unwrap());
    assert_eq!(a, d.unwrap());
}

#[tokio::test]
async fn test_shared_cache_keeps_servers_apart() {
    let primary = MockServer::start().await;
    let mirror = MockServer::start().await;

    for (server, text) in [(&primary, "본관 번역"), (&mirror, "미러 번역")] {
        Mock::given(method("GET"))
            .and(path("/dir/node"))
            .and(query_param("dataId", "L1"))
            .respond_with(html(bt_leaf("기사", text, "原文")))
            .expect(1)
            .mount(server)
            .await;
    }

    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    let fetcher = Arc::new(HttpFetcher::with_client(client, Duration::from_secs(5)));
    let cache = Arc::new(FetchCache::in_memory(DEFAULT_TTL));

    let archive_on = |server: &MockServer| {
        let adapter = adapter_for("itkc-bt", &create_test_config(&server.uri())).unwrap();
        Archive::new(adapter, fetcher.clone(), cache.clone())
    };
    let first = archive_on(&primary);
    let second = archive_on(&mirror);

    for _ in 0..2 {
        assert_eq!(first.fetch_leaf("L1").await.unwrap().primary_text, "본관 번역");
        assert_eq!(second.fetch_leaf("L1").await.unwrap().primary_text, "미러 번역");
    }
}

#[tokio::test]
async fn test_http_error_is_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dir/node"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&mock_server)
        .await;

    let archive = open("itkc-bt", &mock_server);

    for _ in 0..2 {
        let err = archive.fetch_leaf("missing").await.unwrap_err();
        assert!(matches!(err, ArchiveError::Network { status: Some(404), .. }));
    }
}

#[tokio::test]
async fn test_changed_markup_is_malformed() {
    let mock_server = MockServer::start().await;

    mount_bt_leaf(
        &mock_server,
        "L1",
        "<html><body><div class=\"new_layout\">본문</div></body></html>".to_string(),
    )
    .await;

    let archive = open("itkc-bt", &mock_server);
    let err = archive.fetch_leaf("L1").await.unwrap_err();

    assert!(matches!(err, ArchiveError::MalformedMarkup { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_collection_leaf_with_glyph_image() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dir/node"))
        .and(query_param("dataId", "ITKC_MO_0001A_0010"))
        .respond_with(html(
            r#"<html><body>
            <div class="text_body_tit mt10 ori">山居<br>卷一 ○ 詩</div>
            <div class="text_body ori">山<img class="newchar" src="/images/newchar/KC01783.gif">子<br>落葉</div>
            </body></html>"#
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    let archive = open("itkc-mo", &mock_server);
    let document = archive.fetch_leaf("ITKC_MO_0001A_0010").await.unwrap();

    assert_eq!(document.title, "山居");
    assert_eq!(document.primary_text, "山楸子\n落葉");
    assert_eq!(document.tags, vec!["lzh"]);
}

#[tokio::test]
async fn test_sillok_month_to_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/inspectionMonthList.do"))
        .and(query_param("id", "kaa_10107"))
        .respond_with(html(
            r#"<ul class="ins_list">
            <li><a href="/id/kaa_10107017_001">태조가 왕위에 오르다</a></li>
            </ul>"#
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/id/kaa_10107017_001"))
        .respond_with(html(
            r#"<html><body>
            <h3 class="search_tit">태조가 왕위에 오르다</h3>
            <span class="tit_loc">태조 1년 7월 17일</span>
            <div class="ins_left_in"><div class="ins_view_pd"><p class="paragraph">태조가 즉위하였다.<sup>1)</sup></p></div></div>
            <div class="ins_right_in"><div class="ins_view_pd"><p class="paragraph">太祖卽位。</p></div></div>
            </body></html>"#
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    let archive = open("sillok", &mock_server);

    let leaves = archive.enumerate_leaves("kaa_10107").await.unwrap();
    assert_eq!(leaves.len(), 1);

    let resolved = archive.resolve_leaves(&leaves).await.unwrap();
    let document = &resolved[0].1;
    assert_eq!(document.primary_text, "태조가 즉위하였다.");
    assert_eq!(document.secondary_text.as_deref(), Some("太祖卽位。"));
    assert_eq!(document.tags, vec!["ko", "lzh", "태조 1년 7월 17일"]);
}
