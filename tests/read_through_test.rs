//! Integration tests for the ReadThrough registry
//!
//! Covers TTL expiry, coalescing, invalidation driven by mutation events and
//! typed resource lookup through the public API.

use readthrough::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Producto {
    pub id: u32,
    pub nombre: String,
}

fn test_config() -> AppConfig {
    AppConfig::from_toml_str(
        r#"
        [cache]
        default_ttl_ms = 5000
        sentinel_values = ["todos"]

        [cache.resources.colores]
        ttl_ms = 2000
        invalidated_by = ["productos"]

        [cache.resources.estadisticas]
        invalidated_by = ["ventas"]
        "#,
    )
    .expect("valid test config")
}

/// Fake REST endpoint counting how often it is hit
#[derive(Clone, Default)]
struct FakeApi {
    calls: Arc<AtomicUsize>,
}

impl FakeApi {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn list<T: Send + 'static>(
        &self,
        value: T,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn std::future::Future<Output = anyhow::Result<T>> + Send>> + use<T> {
        let calls = Arc::clone(&self.calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(25)).await;
                Ok(value)
            })
        }
    }
}

fn productos(n: u32) -> Vec<Producto> {
    (1..=n)
        .map(|id| Producto {
            id,
            nombre: format!("Producto {}", id),
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_categories_scenario() {
    let mut readthrough = ReadThrough::new(test_config()).unwrap();
    let categorias = readthrough.register::<Vec<String>>("categorias").unwrap();
    let api = FakeApi::default();
    let start = tokio::time::Instant::now();
    let no_params = || Vec::<(&str, ParamValue)>::new();

    let first = categorias
        .load("categorias", no_params(), api.list(vec!["General".to_string()]), LoadOptions::new())
        .await
        .unwrap();
    assert_eq!(*first, vec!["General"]);

    tokio::time::advance(Duration::from_millis(3000) - start.elapsed()).await;
    categorias
        .load("categorias", no_params(), api.list(Vec::new()), LoadOptions::new())
        .await
        .unwrap();
    assert_eq!(api.calls(), 1);

    tokio::time::advance(Duration::from_millis(6000) - start.elapsed()).await;
    let refreshed = categorias
        .load("categorias", no_params(), api.list(Vec::new()), LoadOptions::new())
        .await
        .unwrap();
    assert!(refreshed.is_empty());
    assert_eq!(api.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_colors_scenario_fetches_once() {
    let mut readthrough = ReadThrough::new(test_config()).unwrap();
    let colores = readthrough.register::<Vec<String>>("colores").unwrap();
    let api = FakeApi::default();

    let loads = (0..5).map(|_| {
        colores.load(
            "colores",
            vec![("productId", 42)],
            api.list(vec!["rojo".to_string()]),
            LoadOptions::new(),
        )
    });
    let results = futures::future::join_all(loads).await;

    assert_eq!(api.calls(), 1);
    let first = results[0].as_ref().unwrap();
    for result in &results {
        assert!(Arc::ptr_eq(first, result.as_ref().unwrap()));
    }
}

#[tokio::test(start_paused = true)]
async fn test_resource_ttl_from_config() {
    let mut readthrough = ReadThrough::new(test_config()).unwrap();
    let colores = readthrough.register::<Vec<String>>("colores").unwrap();
    let productos_cache = readthrough.register::<Vec<Producto>>("productos").unwrap();

    assert_eq!(colores.store().ttl(), Duration::from_millis(2000));
    assert_eq!(productos_cache.store().ttl(), Duration::from_millis(5000));
}

#[tokio::test(start_paused = true)]
async fn test_mutation_invalidates_dependents() {
    let mut readthrough = ReadThrough::new(test_config()).unwrap();
    let productos_cache = readthrough.register::<Vec<Producto>>("productos").unwrap();
    let colores = readthrough.register::<Vec<String>>("colores").unwrap();
    let estadisticas = readthrough.register::<u64>("estadisticas").unwrap();
    let api = FakeApi::default();

    let query = ListQuery::new().page(1).filter("estado", "todos");
    productos_cache
        .load_query("productos", &query, api.list(productos(3)), LoadOptions::new())
        .await
        .unwrap();
    colores
        .load("colores", vec![("productId", 1)], api.list(vec!["azul".to_string()]), LoadOptions::new())
        .await
        .unwrap();
    estadisticas
        .load("estadisticas", vec![("periodo", "mes")], api.list(10), LoadOptions::new())
        .await
        .unwrap();
    assert_eq!(readthrough.cached_entries(), 3);

    // Updating a product invalidates products and colors, not statistics
    readthrough.notify_mutation(EventType::Update, "productos", Some("1"));
    assert_eq!(productos_cache.store().len(), 0);
    assert_eq!(colores.store().len(), 0);
    assert_eq!(estadisticas.store().len(), 1);

    // Same query, sentinel stripped, must refetch
    let reloaded = productos_cache
        .load("productos", vec![("page", 1)], api.list(productos(4)), LoadOptions::new())
        .await
        .unwrap();
    assert_eq!(reloaded.len(), 4);
    assert_eq!(api.calls(), 4);

    readthrough.emit(&MutationEvent::created("ventas"));
    assert_eq!(estadisticas.store().len(), 0);
}

#[tokio::test]
async fn test_unrelated_mutation_is_a_noop() {
    let mut readthrough = ReadThrough::new(test_config()).unwrap();
    let categorias = readthrough.register::<Vec<String>>("categorias").unwrap();
    let api = FakeApi::default();

    categorias
        .load("categorias", Vec::<(&str, ParamValue)>::new(), api.list(Vec::new()), LoadOptions::new())
        .await
        .unwrap();
    readthrough.notify_mutation(EventType::Delete, "clientes", None);
    assert_eq!(categorias.store().len(), 1);
    assert_eq!(readthrough.invalidate("categorias").unwrap(), 1);
    assert_eq!(readthrough.invalidate("categorias").unwrap(), 0);
}

#[tokio::test]
async fn test_failed_fetch_is_retried() {
    let mut readthrough = ReadThrough::new(test_config()).unwrap();
    let ventas = readthrough.register::<u32>("ventas").unwrap();
    let attempts = Arc::new(AtomicUsize::new(0));

    for expected in [Err(()), Ok(12)] {
        let attempts = Arc::clone(&attempts);
        let result = ventas
            .load(
                "ventas",
                vec![("page", 1)],
                move || async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    match expected {
                        Ok(total) => Ok(total),
                        Err(()) => Err(anyhow::anyhow!("HTTP 503")),
                    }
                },
                LoadOptions::new(),
            )
            .await;

        match expected {
            Ok(total) => assert_eq!(*result.unwrap(), total),
            Err(()) => {
                let err = result.unwrap_err();
                assert!(err.to_string().contains("HTTP 503"));
            }
        }
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_registered_cache_only_loads_its_kind() {
    let mut readthrough = ReadThrough::new(test_config()).unwrap();
    let colores = readthrough.register::<Vec<String>>("colores").unwrap();
    let api = FakeApi::default();

    let err = colores
        .load("tallas", vec![("productId", 1)], api.list(Vec::new()), LoadOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CacheError::KindMismatch { .. }));
    assert_eq!(api.calls(), 0);
    assert_eq!(readthrough.cached_entries(), 0);
}

#[test]
fn test_registry_lookup() {
    let mut readthrough = ReadThrough::new(test_config()).unwrap();
    let registered = readthrough.register::<Vec<Producto>>("productos").unwrap();

    let found = readthrough.resource::<Vec<Producto>>("productos").unwrap();
    assert!(Arc::ptr_eq(&registered, &found));

    assert!(matches!(
        readthrough.resource::<Vec<String>>("productos"),
        Err(ReadThroughError::TypeMismatch { .. })
    ));
    assert!(matches!(
        readthrough.resource::<Vec<Producto>>("clientes"),
        Err(ReadThroughError::ResourceNotFound(_))
    ));
    assert!(matches!(
        readthrough.register::<Vec<Producto>>("productos"),
        Err(ReadThroughError::ResourceAlreadyRegistered(_))
    ));
    assert!(matches!(
        readthrough.register::<u32>("bad:kind"),
        Err(ReadThroughError::InvalidKey(_))
    ));

    assert_eq!(readthrough.resource_kinds(), vec!["productos"]);
    assert_eq!(readthrough.signals().callback_count(), 1);

    readthrough.unregister("productos").unwrap();
    assert!(readthrough.resource_kinds().is_empty());
    assert_eq!(readthrough.signals().callback_count(), 0);
    assert!(matches!(
        readthrough.unregister("productos"),
        Err(ReadThroughError::ResourceNotFound(_))
    ));
}

#[test]
fn test_callback_limit_surfaces_on_register() {
    let mut config = test_config();
    config.signal.max_callbacks = 1;
    let mut readthrough = ReadThrough::new(config).unwrap();

    readthrough.register::<u32>("ventas").unwrap();
    assert!(matches!(
        readthrough.register::<u32>("clientes"),
        Err(ReadThroughError::Signal(SignalError::TooManyCallbacks(1)))
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = test_config();
    config.cache.default_ttl_ms = 0;
    assert!(matches!(
        ReadThrough::new(config),
        Err(ReadThroughError::Config(ConfigError::Invalid(_)))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_clear_all_and_sweeper() {
    let mut readthrough = ReadThrough::new(test_config()).unwrap();
    let colores = readthrough.register::<Vec<String>>("colores").unwrap();
    let categorias = readthrough.register::<Vec<String>>("categorias").unwrap();
    let api = FakeApi::default();

    for id in 1..=3 {
        colores
            .load("colores", vec![("productId", id)], api.list(Vec::new()), LoadOptions::new())
            .await
            .unwrap();
    }
    categorias
        .load("categorias", Vec::<(&str, ParamValue)>::new(), api.list(Vec::new()), LoadOptions::new())
        .await
        .unwrap();
    assert_eq!(readthrough.cached_entries(), 4);

    let sweeper = readthrough
        .spawn_sweeper(Some(Duration::from_millis(1000)))
        .expect("interval given");

    // Colors expire after 2s, categories after 5s
    tokio::time::sleep(Duration::from_millis(3100)).await;
    assert_eq!(colores.store().len(), 0);
    assert_eq!(categorias.store().len(), 1);

    sweeper.abort();
    assert_eq!(readthrough.clear_all(), 1);
    assert_eq!(readthrough.cached_entries(), 0);
}

#[test]
fn test_no_sweeper_without_interval() {
    let readthrough = ReadThrough::new(test_config()).unwrap();
    assert!(readthrough.spawn_sweeper(None).is_none());
    assert!(readthrough.spawn_sweeper(Some(Duration::ZERO)).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_falls_back_to_configured_sweep() {
    let mut config = test_config();
    config.cache.sweep_interval_ms = 500;
    let mut readthrough = ReadThrough::new(config).unwrap();
    let colores = readthrough.register::<Vec<String>>("colores").unwrap();
    let api = FakeApi::default();

    colores
        .load("colores", vec![("productId", 7)], api.list(Vec::new()), LoadOptions::new())
        .await
        .unwrap();

    let sweeper = readthrough
        .spawn_sweeper(Some(Duration::ZERO))
        .expect("configured interval used");
    tokio::time::sleep(Duration::from_millis(2600)).await;
    assert!(!sweeper.is_finished());
    assert_eq!(colores.store().len(), 0);
    sweeper.abort();
}
