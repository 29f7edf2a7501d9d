//! End-to-end tests for the flush protocol and durability across restart.
//!
//! Covers the write-batching guarantee (many mutations, one backend write),
//! best-effort partial flush with retry, and reopening a fresh dataset over
//! the same backend state — both in-memory and file-based.

use docgraph::backend::DocumentBackend;
use docgraph::{Dataset, Error, FileBackend, JsonCodec, MemoryBackend, Result, Triple};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const G1: &str = "http://example.org/g1";
const G2: &str = "http://example.org/g2";

fn json_codec() -> Box<JsonCodec> {
    Box::new(JsonCodec::new())
}

/// Backend wrapper counting committed writes (creates + updates)
#[derive(Debug, Clone)]
struct CountingBackend {
    inner: MemoryBackend,
    writes: Arc<AtomicUsize>,
}

impl CountingBackend {
    fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl DocumentBackend for CountingBackend {
    fn exists(&self, id: &str) -> Result<bool> {
        self.inner.exists(id)
    }

    fn create(&self, id: &str, bytes: &[u8]) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.create(id, bytes)
    }

    fn read(&self, id: &str) -> Result<Vec<u8>> {
        self.inner.read(id)
    }

    fn update(&self, id: &str, bytes: &[u8]) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update(id, bytes)
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id)
    }

    fn list(&self) -> Result<Vec<String>> {
        self.inner.list()
    }
}

/// Backend wrapper that fails writes for a chosen set of document ids
#[derive(Debug, Clone)]
struct FaultyBackend {
    inner: MemoryBackend,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl FaultyBackend {
    fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            failing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn fail_writes_for(&self, id: &str) {
        self.failing.lock().insert(id.to_string());
    }

    fn heal(&self) {
        self.failing.lock().clear();
    }

    fn check(&self, id: &str) -> Result<()> {
        if self.failing.lock().contains(id) {
            return Err(Error::backend(format!("injected write failure: {}", id)));
        }
        Ok(())
    }
}

impl DocumentBackend for FaultyBackend {
    fn exists(&self, id: &str) -> Result<bool> {
        self.inner.exists(id)
    }

    fn create(&self, id: &str, bytes: &[u8]) -> Result<()> {
        self.check(id)?;
        self.inner.create(id, bytes)
    }

    fn read(&self, id: &str) -> Result<Vec<u8>> {
        self.inner.read(id)
    }

    fn update(&self, id: &str, bytes: &[u8]) -> Result<()> {
        self.check(id)?;
        self.inner.update(id, bytes)
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id)
    }

    fn list(&self) -> Result<Vec<String>> {
        self.inner.list()
    }
}

#[test]
fn durability_across_reopen_memory() {
    let backend = MemoryBackend::new();
    let expected: Vec<Triple> = vec![
        Triple::new("s1", "p1", "o1"),
        Triple::new("s2", "p2", "o2"),
    ];

    {
        let mut ds = Dataset::open(backend.clone(), json_codec()).unwrap();
        ds.create_graph(G1).unwrap();
        ds.graph_mut(G1)
            .unwrap()
            .extend(expected.iter().cloned());
        ds.flush().unwrap();
    }

    let mut reopened = Dataset::open(backend, json_codec()).unwrap();
    assert!(reopened.has_graph(G1));
    let graph = reopened.graph(G1).unwrap();
    assert_eq!(graph.len(), expected.len());
    for triple in &expected {
        assert!(graph.contains(triple));
    }
}

#[test]
fn durability_across_reopen_file() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut ds = Dataset::open(FileBackend::new(dir.path()), json_codec()).unwrap();
        ds.create_graph(G1).unwrap();
        ds.create_graph(G2).unwrap();
        ds.graph_mut(G1).unwrap().insert(Triple::new("s", "p", "o"));
        ds.flush().unwrap();
    }

    let mut reopened = Dataset::open(FileBackend::new(dir.path()), json_codec()).unwrap();
    let mut uris = reopened.graph_uris();
    uris.sort();
    assert_eq!(uris, vec![G1.to_string(), G2.to_string()]);
    assert_eq!(reopened.graph(G1).unwrap().len(), 1);
    assert!(reopened.graph(G2).unwrap().is_empty());
}

#[test]
fn two_mutations_one_backend_write() {
    let backend = CountingBackend::new();
    let mut ds = Dataset::open(backend.clone(), json_codec()).unwrap();

    ds.create_graph(G1).unwrap();
    ds.graph_mut(G1).unwrap().insert(Triple::new("s1", "p1", "o1"));
    ds.graph_mut(G1).unwrap().insert(Triple::new("s2", "p2", "o2"));
    ds.flush().unwrap();

    // One write carrying the final set, not one per mutation
    assert_eq!(backend.write_count(), 1);
    let stored = backend.read(&ds.registry().document_id_for(G1)).unwrap();
    let decoded: Vec<Triple> = serde_json::from_slice(&stored).unwrap();
    assert_eq!(decoded.len(), 2);
}

#[test]
fn flush_without_changes_writes_nothing() {
    let backend = CountingBackend::new();
    let mut ds = Dataset::open(backend.clone(), json_codec()).unwrap();

    ds.create_graph(G1).unwrap();
    ds.flush().unwrap();
    assert_eq!(backend.write_count(), 1);

    // Read-only access stays clean
    ds.graph(G1).unwrap();
    ds.flush().unwrap();
    assert_eq!(backend.write_count(), 1);
}

#[test]
fn partial_flush_failure_commits_the_rest() {
    let backend = FaultyBackend::new();
    let mut ds = Dataset::open(backend.clone(), json_codec()).unwrap();

    ds.create_graph(G1).unwrap();
    ds.create_graph(G2).unwrap();
    ds.graph_mut(G1).unwrap().insert(Triple::new("a", "p", "1"));
    ds.graph_mut(G2).unwrap().insert(Triple::new("b", "p", "2"));

    let failing_id = ds.registry().document_id_for(G2);
    backend.fail_writes_for(&failing_id);

    let err = ds.flush().unwrap_err();
    match &err {
        Error::FlushPartialFailure { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].0, failing_id);
        }
        other => panic!("expected FlushPartialFailure, got {:?}", other),
    }

    // The healthy document committed and stays committed
    let g1_id = ds.registry().document_id_for(G1);
    assert!(backend.exists(&g1_id).unwrap());
    assert!(!backend.exists(&failing_id).unwrap());

    // Dirty state reflects what actually committed
    assert!(!ds.is_dirty(G1));
    assert!(ds.is_dirty(G2));

    // The failed document stays pending and a later flush retries it
    backend.heal();
    ds.flush().unwrap();
    assert!(backend.exists(&failing_id).unwrap());
    assert!(!ds.is_dirty(G2));

    let triples = serde_json::from_slice::<Vec<Triple>>(&backend.read(&failing_id).unwrap())
        .unwrap();
    assert_eq!(triples, vec![Triple::new("b", "p", "2")]);
}

#[test]
fn scenario_register_assign_flush_reopen() {
    // spec example: register g1, assign two triples, flush, reopen, expect
    // exactly those two triples (order-independent)
    let backend = MemoryBackend::new();

    {
        let mut ds = Dataset::open(backend.clone(), json_codec()).unwrap();
        ds.create_graph("http://example.org/g1").unwrap();
        let g = ds.graph_mut("http://example.org/g1").unwrap();
        g.insert(Triple::new("s1", "p1", "o1"));
        g.insert(Triple::new("s2", "p2", "o2"));
        ds.flush().unwrap();
    }

    let mut reopened = Dataset::open(backend, json_codec()).unwrap();
    let g = reopened.graph("http://example.org/g1").unwrap();
    let got: HashSet<&Triple> = g.iter().collect();
    let expected = [Triple::new("s1", "p1", "o1"), Triple::new("s2", "p2", "o2")];
    assert_eq!(got, expected.iter().collect::<HashSet<_>>());
}

#[test]
fn remove_graph_is_durable() {
    let backend = MemoryBackend::new();

    {
        let mut ds = Dataset::open(backend.clone(), json_codec()).unwrap();
        ds.create_graph(G1).unwrap();
        ds.create_graph(G2).unwrap();
        ds.flush().unwrap();
        ds.remove_graph(G2).unwrap();
    }

    let reopened = Dataset::open(backend, json_codec()).unwrap();
    assert!(reopened.has_graph(G1));
    assert!(!reopened.has_graph(G2));
}
