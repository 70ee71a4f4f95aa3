//! End-to-end pipeline tests against a synthetic upstream and an in-memory store.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use cpn_indexer_pipeline::fetcher::Fetcher;
use cpn_indexer_pipeline::transformer::DocumentTransformer;
use cpn_indexer_pipeline::{
    run_local_files, LocalFilesRun, Orchestrator, PipelineError, RunPlan,
};
use cpn_indexer_repository::{SearchEngineClient, SearchError};
use cpn_indexer_shared::{Batch, BulkResponse, IndexTarget, Page, Record, WriteMode};

/// Upstream serving `per_page` records per page out of `total` records.
struct SyntheticUpstream {
    total: usize,
    per_page: usize,
    fail_on_page: Option<u32>,
    empty_page: Option<u32>,
    calls: Mutex<Vec<(Option<String>, u32)>>,
}

impl SyntheticUpstream {
    fn new(total: usize, per_page: usize) -> Self {
        Self {
            total,
            per_page,
            fail_on_page: None,
            empty_page: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn page_count(&self) -> u32 {
        self.total.div_ceil(self.per_page) as u32
    }

    fn calls(&self) -> Vec<(Option<String>, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for SyntheticUpstream {
    async fn fetch(&self, locale: Option<&str>, page: u32) -> Result<Page, PipelineError> {
        self.calls
            .lock()
            .unwrap()
            .push((locale.map(str::to_string), page));

        if self.fail_on_page == Some(page) {
            return Err(PipelineError::fetch("connection reset by peer"));
        }

        let records = if self.empty_page == Some(page) {
            Vec::new()
        } else {
            let start = (page as usize - 1) * self.per_page;
            let end = (start + self.per_page).min(self.total);
            (start..end)
                .map(|i| {
                    let mut record = Record::new(i as u64 + 1)
                        .with_body(format!("<p>Partner <b>{}</b></p>", i + 1))
                        .with_field("name", format!("Partner {}", i + 1));
                    if let Some(locale) = locale {
                        record = record.with_locale(locale);
                    }
                    record
                })
                .collect()
        };

        Ok(Page::new(records, page, self.page_count(), self.total as u64))
    }
}

#[derive(Default)]
struct StoreState {
    indices: HashMap<String, BTreeMap<String, Value>>,
    bulk_calls: Vec<(String, usize)>,
    deletes: Vec<String>,
}

/// In-memory store with create/overwrite item semantics.
#[derive(Default)]
struct InMemoryStore {
    state: Mutex<StoreState>,
    reject_bulk: bool,
    reject_delete: bool,
}

impl InMemoryStore {
    fn documents(&self, index: &str) -> BTreeMap<String, Value> {
        self.state
            .lock()
            .unwrap()
            .indices
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    fn bulk_calls(&self) -> Vec<(String, usize)> {
        self.state.lock().unwrap().bulk_calls.clone()
    }

    fn deletes(&self) -> Vec<String> {
        self.state.lock().unwrap().deletes.clone()
    }
}

#[async_trait]
impl SearchEngineClient for InMemoryStore {
    async fn bulk(
        &self,
        target: &IndexTarget,
        batch: &Batch,
        mode: WriteMode,
    ) -> Result<BulkResponse, SearchError> {
        if self.reject_bulk {
            return Err(SearchError::bulk_index("status 400: malformed request"));
        }

        let mut state = self.state.lock().unwrap();
        state
            .bulk_calls
            .push((target.name().to_string(), batch.len()));
        let index = state.indices.entry(target.name().to_string()).or_default();

        let mut errors = false;
        let mut items = Vec::new();
        for doc in batch.documents() {
            let status = if mode == WriteMode::Create && index.contains_key(&doc.id) {
                errors = true;
                409
            } else {
                index.insert(doc.id.clone(), doc.to_source()?);
                201
            };
            items.push(json!({ (mode.action()): { "_id": doc.id, "status": status } }));
        }

        Ok(BulkResponse::from_body(
            json!({ "took": 1, "errors": errors, "items": items }),
        ))
    }

    async fn delete_indices(&self, pattern: &str) -> Result<(), SearchError> {
        if self.reject_delete {
            return Err(SearchError::delete("status 403: forbidden"));
        }

        let mut state = self.state.lock().unwrap();
        state.deletes.push(pattern.to_string());
        match pattern.strip_suffix('*') {
            Some(prefix) => state.indices.retain(|name, _| !name.starts_with(prefix)),
            None => {
                state.indices.remove(pattern);
            }
        }
        Ok(())
    }
}

fn transformer() -> DocumentTransformer {
    DocumentTransformer::new("https://partners.example.com", "partners/", "partners")
}

#[tokio::test]
async fn test_scenario_twelve_records_three_pages() {
    let upstream = SyntheticUpstream::new(12, 4);
    let store = Arc::new(InMemoryStore::default());
    let plan = RunPlan::per_locale(&["en"], "cpn-", "partners", false).unwrap();

    let orchestrator = Orchestrator::new(upstream, transformer(), store.clone(), WriteMode::Create)
        .with_post_count(5);
    let summary = orchestrator.run(&plan).await.unwrap();

    assert_eq!(summary.submissions(), 3);
    assert_eq!(summary.uploaded_count, 12);
    assert!(!summary.has_item_errors());
    assert_eq!(summary.indices(), vec!["cpn-partners-en"]);
    assert_eq!(summary.locales[0].pages, 3);

    let sizes: Vec<usize> = store.bulk_calls().iter().map(|(_, n)| *n).collect();
    assert_eq!(sizes, vec![5, 5, 2]);

    let docs = store.documents("cpn-partners-en");
    assert_eq!(docs.len(), 12);
    assert_eq!(docs["7"]["body"], "Partner 7");
    assert_eq!(docs["7"]["locale"], "en");
    assert_eq!(docs["7"]["base_url"], "https://partners.example.com/");
}

#[tokio::test]
async fn test_pagination_calls_each_page_once_in_order() {
    let upstream = SyntheticUpstream::new(10, 2);
    let store = Arc::new(InMemoryStore::default());
    let plan = RunPlan::per_locale(&["en"], "cpn-", "partners", false).unwrap();

    let orchestrator = Orchestrator::new(upstream, transformer(), store, WriteMode::Create);
    orchestrator.run(&plan).await.unwrap();

    let pages: Vec<u32> = orchestrator_calls(&orchestrator);
    assert_eq!(pages, vec![1, 2, 3, 4, 5]);
}

fn orchestrator_calls(orchestrator: &Orchestrator<SyntheticUpstream>) -> Vec<u32> {
    orchestrator
        .fetcher()
        .calls()
        .into_iter()
        .map(|(_, page)| page)
        .collect()
}

#[tokio::test]
async fn test_single_page_upstream() {
    let upstream = SyntheticUpstream::new(3, 10);
    let store = Arc::new(InMemoryStore::default());
    let plan = RunPlan::per_locale(&["en"], "cpn-", "partners", false).unwrap();

    let orchestrator = Orchestrator::new(upstream, transformer(), store.clone(), WriteMode::Create);
    let summary = orchestrator.run(&plan).await.unwrap();

    assert_eq!(orchestrator_calls(&orchestrator), vec![1]);
    assert_eq!(summary.submissions(), 1);
    assert_eq!(summary.uploaded_count, 3);
}

#[tokio::test]
async fn test_empty_upstream_submits_nothing() {
    let upstream = SyntheticUpstream::new(0, 10);
    let store = Arc::new(InMemoryStore::default());
    let plan = RunPlan::per_locale(&["en"], "cpn-", "partners", false).unwrap();

    let orchestrator = Orchestrator::new(upstream, transformer(), store.clone(), WriteMode::Create);
    let summary = orchestrator.run(&plan).await.unwrap();

    assert_eq!(orchestrator_calls(&orchestrator), vec![1]);
    assert_eq!(summary.submissions(), 0);
    assert_eq!(summary.uploaded_count, 0);
    assert!(store.bulk_calls().is_empty());
}

#[tokio::test]
async fn test_locales_run_in_sequence_into_separate_indices() {
    let upstream = SyntheticUpstream::new(4, 4);
    let store = Arc::new(InMemoryStore::default());
    let plan = RunPlan::per_locale(&["en", "de"], "cpn-", "partners", false).unwrap();

    let orchestrator = Orchestrator::new(upstream, transformer(), store.clone(), WriteMode::Create)
        .with_post_count(3);
    let summary = orchestrator.run(&plan).await.unwrap();

    let calls = orchestrator.fetcher().calls();
    assert_eq!(
        calls,
        vec![(Some("en".to_string()), 1), (Some("de".to_string()), 1)]
    );
    assert_eq!(summary.indices(), vec!["cpn-partners-en", "cpn-partners-de"]);
    assert_eq!(summary.uploaded_count, 8);
    assert_eq!(summary.submissions(), 4);
    assert_eq!(
        store.bulk_calls(),
        vec![
            ("cpn-partners-en".to_string(), 3),
            ("cpn-partners-en".to_string(), 1),
            ("cpn-partners-de".to_string(), 3),
            ("cpn-partners-de".to_string(), 1),
        ]
    );
    assert_eq!(store.documents("cpn-partners-de")["1"]["locale"], "de");
}

#[tokio::test]
async fn test_fetch_failure_aborts_run() {
    let mut upstream = SyntheticUpstream::new(15, 3);
    upstream.fail_on_page = Some(2);
    let store = Arc::new(InMemoryStore::default());
    let plan = RunPlan::per_locale(&["en", "de"], "cpn-", "partners", false).unwrap();

    let orchestrator = Orchestrator::new(upstream, transformer(), store.clone(), WriteMode::Create)
        .with_post_count(2);
    let result = orchestrator.run(&plan).await;

    assert!(matches!(result, Err(PipelineError::FetchError(_))));
    // Page 1 filled one full batch; its trailing document was never flushed.
    assert_eq!(store.bulk_calls(), vec![("cpn-partners-en".to_string(), 2)]);
    assert_eq!(orchestrator_calls(&orchestrator), vec![1, 2]);
}

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[tokio::test]
async fn test_abort_reports_unsubmitted_documents() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut upstream = SyntheticUpstream::new(15, 3);
    upstream.fail_on_page = Some(2);
    let store = Arc::new(InMemoryStore::default());
    let plan = RunPlan::per_locale(&["en"], "cpn-", "partners", false).unwrap();

    let orchestrator = Orchestrator::new(upstream, transformer(), store, WriteMode::Create)
        .with_post_count(2);
    assert!(orchestrator.run(&plan).await.is_err());

    let text = logs.text();
    let aborted = text
        .lines()
        .find(|line| line.contains("Run aborted"))
        .expect("abort event logged");
    assert!(aborted.contains("stage=fetching"));
    assert!(aborted.contains("page=2"));
    assert!(aborted.contains("pending=1"));
}

#[tokio::test]
async fn test_empty_middle_page_without_total_aborts_run() {
    struct NoTotalUpstream;

    #[async_trait]
    impl Fetcher for NoTotalUpstream {
        async fn fetch(&self, _locale: Option<&str>, page: u32) -> Result<Page, PipelineError> {
            let records = if page == 1 {
                vec![Record::new(1u64)]
            } else {
                Vec::new()
            };
            // Upstream omitted `total`; only the page count signals more data.
            Ok(Page::new(records.clone(), page, 3, records.len() as u64))
        }
    }

    let store = Arc::new(InMemoryStore::default());
    let plan = RunPlan::per_locale(&["en"], "cpn-", "partners", false).unwrap();

    let orchestrator = Orchestrator::new(NoTotalUpstream, transformer(), store.clone(), WriteMode::Create);
    let result = orchestrator.run(&plan).await;

    assert!(matches!(result, Err(PipelineError::DataAnomaly(_))));
    assert!(store.bulk_calls().is_empty());
}

#[tokio::test]
async fn test_unexpectedly_empty_page_aborts_run() {
    let mut upstream = SyntheticUpstream::new(9, 3);
    upstream.empty_page = Some(2);
    let store = Arc::new(InMemoryStore::default());
    let plan = RunPlan::per_locale(&["en"], "cpn-", "partners", false).unwrap();

    let orchestrator = Orchestrator::new(upstream, transformer(), store, WriteMode::Create);
    let result = orchestrator.run(&plan).await;

    assert!(matches!(result, Err(PipelineError::DataAnomaly(_))));
    assert_eq!(orchestrator_calls(&orchestrator), vec![1, 2]);
}

#[tokio::test]
async fn test_bulk_rejection_aborts_run() {
    let upstream = SyntheticUpstream::new(12, 4);
    let store = Arc::new(InMemoryStore {
        reject_bulk: true,
        ..Default::default()
    });
    let plan = RunPlan::per_locale(&["en"], "cpn-", "partners", false).unwrap();

    let orchestrator = Orchestrator::new(upstream, transformer(), store, WriteMode::Create)
        .with_post_count(2);
    let result = orchestrator.run(&plan).await;

    assert!(matches!(
        result,
        Err(PipelineError::SearchError(SearchError::BulkIndexError(_)))
    ));
    assert_eq!(orchestrator_calls(&orchestrator), vec![1]);
}

#[tokio::test]
async fn test_delete_failure_aborts_before_any_write() {
    let upstream = SyntheticUpstream::new(4, 4);
    let store = Arc::new(InMemoryStore {
        reject_delete: true,
        ..Default::default()
    });
    let plan = RunPlan::per_locale(&["en"], "cpn-", "partners", true).unwrap();

    let orchestrator = Orchestrator::new(upstream, transformer(), store.clone(), WriteMode::Create);
    let result = orchestrator.run(&plan).await;

    assert!(matches!(
        result,
        Err(PipelineError::SearchError(SearchError::DeleteError(_)))
    ));
    assert!(orchestrator.fetcher().calls().is_empty());
    assert!(store.bulk_calls().is_empty());
}

#[tokio::test]
async fn test_item_failures_do_not_abort() {
    let store = Arc::new(InMemoryStore::default());
    let plan = RunPlan::per_locale(&["en"], "cpn-", "partners", false).unwrap();

    let first = Orchestrator::new(SyntheticUpstream::new(4, 4), transformer(), store.clone(), WriteMode::Create);
    first.run(&plan).await.unwrap();

    // Without a reset, create semantics reject every existing id per item.
    let second = Orchestrator::new(SyntheticUpstream::new(4, 4), transformer(), store.clone(), WriteMode::Create);
    let summary = second.run(&plan).await.unwrap();

    assert!(summary.has_item_errors());
    assert_eq!(summary.uploaded_count, 4);
    assert_eq!(summary.responses[0].body["items"][0]["create"]["status"], 409);
}

#[tokio::test]
async fn test_delete_then_index_is_idempotent() {
    let store = Arc::new(InMemoryStore::default());
    let plan = RunPlan::per_locale(&["en", "de"], "cpn-", "partners", true).unwrap();

    let first = Orchestrator::new(SyntheticUpstream::new(7, 3), transformer(), store.clone(), WriteMode::Create)
        .with_post_count(2);
    let first_summary = first.run(&plan).await.unwrap();
    let after_first = (store.documents("cpn-partners-en"), store.documents("cpn-partners-de"));

    let second = Orchestrator::new(SyntheticUpstream::new(7, 3), transformer(), store.clone(), WriteMode::Create)
        .with_post_count(2);
    let second_summary = second.run(&plan).await.unwrap();
    let after_second = (store.documents("cpn-partners-en"), store.documents("cpn-partners-de"));

    assert_eq!(after_first.0.len(), 7);
    assert_eq!(after_first, after_second);
    assert!(!first_summary.has_item_errors());
    assert!(!second_summary.has_item_errors());
    assert_eq!(store.deletes(), vec!["cpn-*", "cpn-*"]);
}

#[tokio::test]
async fn test_transform_failure_aborts_run() {
    struct BadBodyUpstream;

    #[async_trait]
    impl Fetcher for BadBodyUpstream {
        async fn fetch(&self, _locale: Option<&str>, page: u32) -> Result<Page, PipelineError> {
            let records = vec![Record::new(1u64).with_body(json!(["not", "markup"]))];
            Ok(Page::new(records, page, 1, 1))
        }
    }

    let store = Arc::new(InMemoryStore::default());
    let plan = RunPlan::per_locale(&["en"], "cpn-", "partners", false).unwrap();

    let orchestrator = Orchestrator::new(BadBodyUpstream, transformer(), store.clone(), WriteMode::Create);
    let result = orchestrator.run(&plan).await;

    assert!(matches!(result, Err(PipelineError::TransformError(_))));
    assert!(store.bulk_calls().is_empty());
}

#[tokio::test]
async fn test_zero_post_count_rejected_before_io() {
    let store = Arc::new(InMemoryStore::default());
    let plan = RunPlan::per_locale(&["en"], "cpn-", "partners", true).unwrap();

    let orchestrator = Orchestrator::new(SyntheticUpstream::new(4, 4), transformer(), store.clone(), WriteMode::Create)
        .with_post_count(0);
    let result = orchestrator.run(&plan).await;

    assert!(matches!(result, Err(PipelineError::ConfigError(_))));
    assert!(store.deletes().is_empty());
    assert!(orchestrator.fetcher().calls().is_empty());
}

#[tokio::test]
async fn test_local_files_overwrite_by_file_name() {
    let dir = tempfile::tempdir().unwrap();
    for (name, title) in [("index", "Home"), ("install", "Install"), ("usage", "Usage")] {
        std::fs::write(
            dir.path().join(format!("{}.fjson", name)),
            json!({ "title": title, "body": format!("<h1>{}</h1>", title) }).to_string(),
        )
        .unwrap();
    }

    let store = Arc::new(InMemoryStore::default());
    let run = LocalFilesRun {
        path: dir.path().to_path_buf(),
        files: None,
        index: "test-index".to_string(),
        delete_index: true,
        post_count: 2,
        base_url: "https://docs.example.com".to_string(),
        doc_url: "guide/".to_string(),
        category: "docs".to_string(),
    };

    let first = run_local_files(store.clone(), &run).await.unwrap();
    let second = run_local_files(store.clone(), &run).await.unwrap();

    assert_eq!(first.uploaded_count, 3);
    assert_eq!(first.submissions(), 2);
    assert!(!second.has_item_errors());
    assert_eq!(store.deletes(), vec!["test-index", "test-index"]);

    let docs = store.documents("test-index");
    assert_eq!(docs.len(), 3);
    assert_eq!(docs["install"]["body"], "Install");
    assert_eq!(docs["install"]["category"], "docs");
    assert_eq!(docs["install"]["base_url"], "https://docs.example.com/");
}

#[tokio::test]
async fn test_local_files_explicit_list_missing_file_aborts() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.fjson"), "{}").unwrap();

    let store = Arc::new(InMemoryStore::default());
    let run = LocalFilesRun {
        path: dir.path().to_path_buf(),
        files: Some(vec!["index".to_string(), "missing".to_string()]),
        index: "test-index".to_string(),
        delete_index: false,
        post_count: 5,
        base_url: String::new(),
        doc_url: String::new(),
        category: String::new(),
    };

    let result = run_local_files(store.clone(), &run).await;

    assert!(matches!(result, Err(PipelineError::FetchError(_))));
    assert!(store.bulk_calls().is_empty());
}
