// app/provider.rs
// Remote state shared by every view: schema list, active schema, API spec and metadata catalog

use crate::catalog::client::{load_catalog, sort_catalog, CatalogSource};
use crate::catalog::models::*;
use crate::error::FetchError;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Completion of one background fetch.
#[derive(Debug)]
pub enum FetchEvent {
    SchemasLoaded(Result<Vec<SchemaId>, FetchError>),
    SpecLoaded {
        token: u64,
        profile: SchemaId,
        result: Result<ApiSpecification, FetchError>,
    },
    CatalogLoaded(Result<Vec<MetadataRecord>, FetchError>),
}

/// A fetch the state wants started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Schemas,
    Spec { token: u64, profile: SchemaId },
    Catalog,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub schemas: Vec<SchemaId>,
    pub active_schema: Option<SchemaId>,
    pub spec: Option<ApiSpecification>,
    pub catalog: Vec<MetadataRecord>,
    spec_token: u64,
    catalog_requested: bool,
}

impl AppState {
    pub fn start(&mut self) -> Vec<FetchRequest> {
        vec![FetchRequest::Schemas]
    }

    /// Switches the active schema. Every switch issues a fresh spec token; the
    /// catalog is requested only on the first switch.
    pub fn set_active_schema(&mut self, schema: &str) -> Vec<FetchRequest> {
        if self.active_schema.as_deref() == Some(schema) {
            return Vec::new();
        }
        self.active_schema = Some(schema.to_string());
        self.spec_token += 1;
        let mut requests = vec![FetchRequest::Spec {
            token: self.spec_token,
            profile: schema.to_string(),
        }];
        if !self.catalog_requested {
            self.catalog_requested = true;
            requests.push(FetchRequest::Catalog);
        }
        requests
    }

    pub fn apply(&mut self, event: FetchEvent) -> Vec<FetchRequest> {
        match event {
            FetchEvent::SchemasLoaded(Ok(schemas)) => {
                tracing::info!(count = schemas.len(), "schema list loaded");
                self.schemas = schemas;
                match (self.active_schema.is_none(), self.schemas.first().cloned()) {
                    (true, Some(first)) => self.set_active_schema(&first),
                    _ => Vec::new(),
                }
            }
            FetchEvent::SchemasLoaded(Err(e)) => {
                tracing::error!(error = %e, "Error fetching schema list");
                Vec::new()
            }
            FetchEvent::SpecLoaded { token, profile, result } => {
                if token != self.spec_token {
                    tracing::debug!(%profile, token, latest = self.spec_token, "discarding stale spec response");
                    return Vec::new();
                }
                match result {
                    Ok(spec) => {
                        tracing::info!(%profile, "API spec loaded");
                        self.spec = Some(spec);
                    }
                    Err(e) => tracing::error!(%profile, error = %e, "Error fetching API spec"),
                }
                Vec::new()
            }
            FetchEvent::CatalogLoaded(Ok(mut records)) => {
                sort_catalog(&mut records);
                self.catalog = records;
                Vec::new()
            }
            FetchEvent::CatalogLoaded(Err(e)) => {
                tracing::error!(error = %e, "Error fetching metadata catalog");
                Vec::new()
            }
        }
    }

    pub fn latest_spec_token(&self) -> u64 {
        self.spec_token
    }

    pub fn record(&self, schema_name: &str) -> Option<&MetadataRecord> {
        self.catalog.iter().find(|r| r.schema_name == schema_name)
    }
}

/// Owns [`AppState`] and runs its fetches as tokio tasks. Results come back
/// over a channel and are applied by the owner, never by the tasks.
pub struct Provider {
    source: Arc<dyn CatalogSource>,
    tx: UnboundedSender<FetchEvent>,
    rx: UnboundedReceiver<FetchEvent>,
    pub state: AppState,
}

impl Provider {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            source,
            tx,
            rx,
            state: AppState::default(),
        }
    }

    pub fn start(&mut self) {
        let requests = self.state.start();
        self.dispatch(requests);
    }

    pub fn select_schema(&mut self, schema: &str) {
        let requests = self.state.set_active_schema(schema);
        self.dispatch(requests);
    }

    /// Applies every completed fetch without waiting. Returns whether anything arrived.
    pub fn drain(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.rx.try_recv() {
            self.handle(event);
            changed = true;
        }
        changed
    }

    /// Waits for the next completed fetch and applies it.
    pub async fn next_event(&mut self) -> bool {
        match self.rx.recv().await {
            Some(event) => {
                self.handle(event);
                true
            }
            None => false,
        }
    }

    fn handle(&mut self, event: FetchEvent) {
        let requests = self.state.apply(event);
        self.dispatch(requests);
    }

    fn dispatch(&self, requests: Vec<FetchRequest>) {
        for request in requests {
            let source = Arc::clone(&self.source);
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let event = match request {
                    FetchRequest::Schemas => FetchEvent::SchemasLoaded(source.fetch_schemas().await),
                    FetchRequest::Spec { token, profile } => {
                        let result = source.fetch_spec(&profile).await;
                        FetchEvent::SpecLoaded { token, profile, result }
                    }
                    FetchRequest::Catalog => FetchEvent::CatalogLoaded(load_catalog(source.as_ref()).await),
                };
                // the receiver only goes away on shutdown
                let _ = tx.send(event);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str) -> MetadataRecord {
        MetadataRecord {
            schema_name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn first_schema_is_auto_selected() {
        let mut state = AppState::default();
        assert_eq!(state.start(), vec![FetchRequest::Schemas]);
        let requests = state.apply(FetchEvent::SchemasLoaded(Ok(vec!["a".into(), "b".into()])));
        assert_eq!(state.active_schema.as_deref(), Some("a"));
        assert_eq!(
            requests,
            vec![
                FetchRequest::Spec {
                    token: 1,
                    profile: "a".into()
                },
                FetchRequest::Catalog
            ]
        );
    }

    #[test]
    fn catalog_is_requested_once() {
        let mut state = AppState::default();
        state.set_active_schema("a");
        let requests = state.set_active_schema("b");
        assert_eq!(
            requests,
            vec![FetchRequest::Spec {
                token: 2,
                profile: "b".into()
            }]
        );
        assert!(state.set_active_schema("b").is_empty());
    }

    #[test]
    fn stale_spec_responses_are_dropped() {
        let mut state = AppState::default();
        state.set_active_schema("a");
        state.set_active_schema("b");
        state.apply(FetchEvent::SpecLoaded {
            token: 2,
            profile: "b".into(),
            result: Ok(ApiSpecification(json!({"info": {"title": "b"}}))),
        });
        // "a" completes after "b"
        state.apply(FetchEvent::SpecLoaded {
            token: 1,
            profile: "a".into(),
            result: Ok(ApiSpecification(json!({"info": {"title": "a"}}))),
        });
        assert_eq!(state.spec.as_ref().and_then(|s| s.title()), Some("b"));
    }

    #[test]
    fn catalog_is_sorted_on_arrival() {
        let mut state = AppState::default();
        state.apply(FetchEvent::CatalogLoaded(Ok(vec![record("b"), record("B"), record("a")])));
        let names: Vec<&str> = state.catalog.iter().map(|r| r.schema_name.as_str()).collect();
        assert_eq!(names, vec!["B", "a", "b"]);
    }

    #[test]
    fn empty_schema_list_selects_nothing() {
        let mut state = AppState::default();
        assert!(state.apply(FetchEvent::SchemasLoaded(Ok(vec![]))).is_empty());
        assert!(state.active_schema.is_none());
    }

    fn decode_error() -> FetchError {
        FetchError::Decode {
            url: "https://example.org/schemas".into(),
            source: serde_json::from_str::<serde_json::Value>("x").unwrap_err(),
        }
    }

    #[test]
    fn failed_schema_list_leaves_nothing_selected() {
        let mut state = AppState::default();
        assert!(state.apply(FetchEvent::SchemasLoaded(Err(decode_error()))).is_empty());
        assert!(state.schemas.is_empty());
        assert!(state.active_schema.is_none());
    }

    #[test]
    fn failed_spec_keeps_previous_spec() {
        let mut state = AppState::default();
        state.set_active_schema("a");
        state.apply(FetchEvent::SpecLoaded {
            token: 1,
            profile: "a".into(),
            result: Ok(ApiSpecification(json!({"info": {"title": "a"}}))),
        });
        state.set_active_schema("b");
        let requests = state.apply(FetchEvent::SpecLoaded {
            token: state.latest_spec_token(),
            profile: "b".into(),
            result: Err(decode_error()),
        });
        assert!(requests.is_empty());
        assert_eq!(state.active_schema.as_deref(), Some("b"));
        assert_eq!(state.spec.as_ref().and_then(|s| s.title()), Some("a"));
    }

    #[test]
    fn failed_catalog_stays_empty() {
        let mut state = AppState::default();
        state.set_active_schema("a");
        assert!(state.apply(FetchEvent::CatalogLoaded(Err(decode_error()))).is_empty());
        assert!(state.catalog.is_empty());
        assert!(state.record("a").is_none());
    }
}
