//! PubMed ingestion utilities leveraging E-utilities `efetch`.

use std::time::Duration;

use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use super::http_client;
use crate::{
    config::Settings,
    error::{EtlError, EtlResult},
    model::{Source, SourceRecord},
};

const SERVICE: &str = "pubmed";
/// efetch accepts up to 200 ids per GET request.
const EFETCH_CHUNK: usize = 200;

/// Inline formatting inside titles and abstracts that would otherwise split
/// text nodes.
static INLINE_MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</?(i|b|u|sup|sub|em|strong|mml:[A-Za-z]+)(\s[^>]*)?/?>").expect("valid regex")
});

pub struct PubmedClient {
    client: Client,
    base_url: String,
    tool: String,
    email: String,
    delay: Duration,
}

impl PubmedClient {
    pub fn new(settings: &Settings) -> EtlResult<Self> {
        Ok(Self {
            client: http_client(settings)?,
            base_url: settings.pubmed_base_url.trim_end_matches('/').to_string(),
            tool: settings.tool_name.clone(),
            email: settings.contact_email.clone(),
            delay: settings.request_delay(),
        })
    }

    #[instrument(skip(self, pmids), fields(ids = pmids.len()))]
    pub async fn fetch(&self, pmids: &[String]) -> EtlResult<Vec<SourceRecord>> {
        let mut output = Vec::new();
        for chunk in pmids.chunks(EFETCH_CHUNK) {
            match self.fetch_chunk(chunk).await {
                Ok(records) => output.extend(records),
                Err(err) => warn!(error = %err, ids = chunk.len(), "efetch chunk skipped"),
            }
            sleep(self.delay).await; // be nice to E-utilities
        }
        info!(count = output.len(), "fetched pubmed records");
        Ok(output)
    }

    async fn fetch_chunk(&self, chunk: &[String]) -> EtlResult<Vec<SourceRecord>> {
        let ids = chunk.join(",");
        let url = format!("{}/efetch.fcgi", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("db", "pubmed"),
                ("rettype", "abstract"),
                ("retmode", "xml"),
                ("id", ids.as_str()),
                ("tool", self.tool.as_str()),
                ("email", self.email.as_str()),
            ])
            .send()
            .await
            .map_err(|err| EtlError::http(SERVICE, err))?;
        if !resp.status().is_success() {
            return Err(EtlError::http(SERVICE, format!("HTTP {}", resp.status())));
        }
        let xml = resp.text().await.map_err(|err| EtlError::http(SERVICE, err))?;
        parse_articles(&xml)
    }
}

/// Parse an efetch `PubmedArticleSet` document.
pub fn parse_articles(xml: &str) -> EtlResult<Vec<SourceRecord>> {
    let cleaned = INLINE_MARKUP.replace_all(xml, "");
    let article_set: PubmedArticleSet =
        from_str(&cleaned).map_err(|err| EtlError::parse(SERVICE, err))?;
    Ok(article_set
        .articles
        .into_iter()
        .map(PubmedArticle::into_record)
        .collect())
}

#[derive(Debug, Default, Deserialize)]
struct PubmedArticleSet {
    #[serde(rename = "PubmedArticle", default)]
    articles: Vec<PubmedArticle>,
}

#[derive(Debug, Deserialize)]
struct PubmedArticle {
    #[serde(rename = "MedlineCitation")]
    citation: MedlineCitation,
    #[serde(rename = "PubmedData")]
    pubmed_data: Option<PubmedData>,
}

impl PubmedArticle {
    fn into_record(self) -> SourceRecord {
        let mut record = SourceRecord::new(Source::Pubmed);
        let article = self.citation.article;
        record.set("pmid", Some(self.citation.pmid.value));
        record.set("title", article.title.map(|t| t.value));

        let abstract_text = article.abstract_section.map(|abs| {
            abs.text
                .into_iter()
                .filter_map(|t| t.value)
                .collect::<Vec<_>>()
                .join(" ")
        });
        record.set("abstract", abstract_text);

        let doi = self
            .pubmed_data
            .and_then(|data| data.article_ids)
            .and_then(|list| {
                list.ids
                    .into_iter()
                    .find(|id| id.id_type.eq_ignore_ascii_case("doi"))
                    .map(|id| id.value)
            })
            .or_else(|| {
                article
                    .elocation_ids
                    .into_iter()
                    .find(|id| id.id_type.eq_ignore_ascii_case("doi"))
                    .map(|id| id.value)
            });
        record.set("doi", doi);

        let article_year = article.article_date.and_then(|d| d.year).map(|y| y.value);
        if let Some(journal) = article.journal {
            record.set("journal", journal.title.map(|t| t.value));
            if let Some(issue) = journal.issue {
                record.set("volume", issue.volume.map(|t| t.value));
                record.set("issue", issue.issue.map(|t| t.value));
                let year = issue.pub_date.and_then(|d| {
                    d.year
                        .map(|y| y.value)
                        .or_else(|| d.medline_date.map(|m| m.value.chars().take(4).collect()))
                });
                record.set("year", year.or(article_year.clone()));
            }
        }
        if record.get("year").is_none() {
            record.set("year", article_year);
        }

        let first_page = article
            .pagination
            .and_then(|p| p.medline_pgn)
            .and_then(|p| p.value.split('-').next().map(|s| s.trim().to_string()));
        record.set("first_page", first_page);

        let authors = article
            .author_list
            .map(|list| {
                list.authors
                    .into_iter()
                    .filter_map(Author::formatted)
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .unwrap_or_default();
        record.set("authors", Some(authors));
        record
    }
}

#[derive(Debug, Deserialize)]
struct MedlineCitation {
    #[serde(rename = "PMID")]
    pmid: TextNode,
    #[serde(rename = "Article")]
    article: Article,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(rename = "Journal")]
    journal: Option<Journal>,
    #[serde(rename = "ArticleTitle")]
    title: Option<TextNode>,
    #[serde(rename = "Pagination")]
    pagination: Option<Pagination>,
    #[serde(rename = "ELocationID", default)]
    elocation_ids: Vec<ArticleId>,
    #[serde(rename = "Abstract")]
    abstract_section: Option<Abstract>,
    #[serde(rename = "AuthorList")]
    author_list: Option<AuthorList>,
    #[serde(rename = "ArticleDate")]
    article_date: Option<ArticleDate>,
}

#[derive(Debug, Deserialize)]
struct Journal {
    #[serde(rename = "JournalIssue")]
    issue: Option<JournalIssue>,
    #[serde(rename = "Title")]
    title: Option<TextNode>,
}

#[derive(Debug, Deserialize)]
struct JournalIssue {
    #[serde(rename = "Volume")]
    volume: Option<TextNode>,
    #[serde(rename = "Issue")]
    issue: Option<TextNode>,
    #[serde(rename = "PubDate")]
    pub_date: Option<PubDate>,
}

#[derive(Debug, Deserialize)]
struct PubDate {
    #[serde(rename = "Year")]
    year: Option<TextNode>,
    #[serde(rename = "MedlineDate")]
    medline_date: Option<TextNode>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(rename = "MedlinePgn")]
    medline_pgn: Option<TextNode>,
}

#[derive(Debug, Deserialize)]
struct Abstract {
    #[serde(rename = "AbstractText", default)]
    text: Vec<AbstractText>,
}

#[derive(Debug, Deserialize)]
struct AbstractText {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthorList {
    #[serde(rename = "Author", default)]
    authors: Vec<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(rename = "ForeName")]
    forename: Option<TextNode>,
    #[serde(rename = "LastName")]
    lastname: Option<TextNode>,
    #[serde(rename = "CollectiveName")]
    collective: Option<TextNode>,
}

impl Author {
    fn formatted(self) -> Option<String> {
        match (
            self.forename.map(|n| n.value),
            self.lastname.map(|n| n.value),
        ) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (None, Some(last)) => Some(last),
            _ => self.collective.map(|n| n.value),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArticleDate {
    #[serde(rename = "Year")]
    year: Option<TextNode>,
}

#[derive(Debug, Deserialize)]
struct PubmedData {
    #[serde(rename = "ArticleIdList")]
    article_ids: Option<ArticleIdList>,
}

#[derive(Debug, Deserialize)]
struct ArticleIdList {
    #[serde(rename = "ArticleId", default)]
    ids: Vec<ArticleId>,
}

#[derive(Debug, Deserialize)]
struct ArticleId {
    #[serde(rename = "@IdType", alias = "@EIdType", default)]
    id_type: String,
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    value: String,
}
