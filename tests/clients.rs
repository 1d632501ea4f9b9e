use bioetl::{
    config::Settings,
    sources::{
        chembl::{ChemblClient, Entity},
        crossref::CrossrefClient,
        iuphar::IupharClient,
        openalex::OpenAlexClient,
        pubmed::PubmedClient,
    },
};
use serde_json::json;
use wiremock::{
    matchers::{method, path, path_regex, query_param},
    Mock, MockServer, Request, ResponseTemplate,
};

fn settings(server: &MockServer) -> Settings {
    let uri = server.uri();
    Settings {
        chembl_base_url: format!("{uri}/chembl/api/data"),
        pubmed_base_url: uri.clone(),
        crossref_base_url: uri.clone(),
        openalex_base_url: uri.clone(),
        iuphar_base_url: uri,
        batch_size: 2,
        request_delay_ms: 0,
        http_timeout_secs: 5,
        ..Settings::default()
    }
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn has_offset(req: &Request) -> bool {
    req.url.query_pairs().any(|(key, _)| key == "offset")
}

fn assay_page(ids: &[&str], next: Option<&str>) -> serde_json::Value {
    json!({
        "assays": ids.iter().map(|id| json!({ "assay_chembl_id": id })).collect::<Vec<_>>(),
        "page_meta": { "next": next },
    })
}

#[tokio::test]
async fn chembl_batches_ids_and_follows_next_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chembl/api/data/assay.json"))
        .and(query_param("assay_chembl_id__in", "CHEMBL1,CHEMBL2"))
        .and(query_param("limit", "2"))
        .and(|req: &Request| !has_offset(req))
        .respond_with(ResponseTemplate::new(200).set_body_json(assay_page(
            &["CHEMBL1"],
            Some("/chembl/api/data/assay.json?assay_chembl_id__in=CHEMBL1,CHEMBL2&limit=2&offset=1"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/chembl/api/data/assay.json"))
        .and(query_param("assay_chembl_id__in", "CHEMBL1,CHEMBL2"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assay_page(&["CHEMBL2"], None)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/chembl/api/data/assay.json"))
        .and(query_param("assay_chembl_id__in", "CHEMBL3"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assay_page(&["CHEMBL3"], None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChemblClient::new(&settings(&server)).unwrap();
    let items = client
        .fetch(Entity::Assay, &ids(&["CHEMBL1", "CHEMBL2", "CHEMBL3"]))
        .await
        .unwrap();

    let fetched: Vec<&str> = items
        .iter()
        .filter_map(|item| item["assay_chembl_id"].as_str())
        .collect();
    assert_eq!(fetched, ["CHEMBL1", "CHEMBL2", "CHEMBL3"]);
}

#[tokio::test]
async fn chembl_errors_propagate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chembl/api/data/assay.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = ChemblClient::new(&settings(&server)).unwrap();
    let err = client
        .fetch(Entity::Assay, &ids(&["CHEMBL1"]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("503"), "{err}");
}

#[tokio::test]
async fn chembl_not_found_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chembl/api/data/assay.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = ChemblClient::new(&settings(&server)).unwrap();
    assert!(client.fetch(Entity::Assay, &ids(&["CHEMBL1"])).await.is_err());
}

#[tokio::test]
async fn crossref_skips_unknown_and_failing_dois() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/works/10\.1(%2F|/)good$"))
        .and(query_param("mailto", Settings::default().contact_email))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": { "DOI": "10.1/good", "title": ["Good paper"] }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/works/10\.1(%2F|/)flaky$"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/works/10\.1(%2F|/)missing$"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = CrossrefClient::new(&settings(&server)).unwrap();
    let records = client
        .fetch(&ids(&["10.1/flaky", "10.1/missing", "10.1/good"]))
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("doi"), Some("10.1/good"));
    assert_eq!(records[0].get("title"), Some("Good paper"));
}

fn filter_of(req: &Request) -> Option<String> {
    req.url
        .query_pairs()
        .find(|(key, _)| key == "filter")
        .map(|(_, value)| value.into_owned())
}

#[tokio::test]
async fn openalex_chunks_dois_then_pmids() {
    let server = MockServer::start().await;
    let work = |id: &str| json!({ "results": [{ "id": id, "title": "A work" }] });
    Mock::given(method("GET"))
        .and(path("/works"))
        .and(|req: &Request| filter_of(req).is_some_and(|f| f.starts_with("doi:")))
        .respond_with(ResponseTemplate::new(200).set_body_json(work("https://openalex.org/W1")))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .and(|req: &Request| filter_of(req).as_deref() == Some("pmid:111|222"))
        .respond_with(ResponseTemplate::new(200).set_body_json(work("https://openalex.org/W2")))
        .expect(1)
        .mount(&server)
        .await;

    let dois: Vec<String> = (0..51).map(|n| format!("10.1/{n}")).collect();
    let client = OpenAlexClient::new(&settings(&server)).unwrap();
    let records = client.fetch(&dois, &ids(&["111", "222"])).await.unwrap();

    let openalex_ids: Vec<Option<&str>> = records.iter().map(|r| r.get("openalex_id")).collect();
    assert_eq!(
        openalex_ids,
        [
            Some("https://openalex.org/W1"),
            Some("https://openalex.org/W1"),
            Some("https://openalex.org/W2"),
        ]
    );

    let requests = server.received_requests().await.unwrap();
    let filters: Vec<String> = requests.iter().filter_map(filter_of).collect();
    assert_eq!(filters.len(), 3);
    assert_eq!(filters[0].matches('|').count(), 49);
    assert_eq!(filters[1], "doi:10.1/50");
    assert_eq!(filters[2], "pmid:111|222");
}

#[tokio::test]
async fn openalex_failed_chunk_keeps_other_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .and(|req: &Request| filter_of(req).is_some_and(|f| f.starts_with("doi:")))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .and(|req: &Request| filter_of(req).is_some_and(|f| f.starts_with("pmid:")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": "https://openalex.org/W9", "ids": { "pmid": "111" } }]
        })))
        .mount(&server)
        .await;

    let client = OpenAlexClient::new(&settings(&server)).unwrap();
    let records = client
        .fetch(&ids(&["10.1/a"]), &ids(&["111"]))
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("openalex_id"), Some("https://openalex.org/W9"));
}

#[tokio::test]
async fn iuphar_keeps_target_when_gene_lookup_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/targets"))
        .and(query_param("accession", "P00533"))
        .and(query_param("database", "UniProt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "targetId": 1797, "name": "EGFR", "type": "Catalytic receptor" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/targets/1797/geneProteinInformation"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = IupharClient::new(&settings(&server)).unwrap();
    let records = client.fetch(&ids(&["P00533"])).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("iuphar_target_id"), Some("1797"));
    assert_eq!(records[0].get("gene_symbol"), None);
}

#[tokio::test]
async fn pubmed_failed_chunk_yields_no_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let client = PubmedClient::new(&settings(&server)).unwrap();
    let records = client.fetch(&ids(&["12345"])).await.unwrap();
    assert!(records.is_empty());
}
