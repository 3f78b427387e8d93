//! Catalog demo
//!
//! Caches categories, product colors and product listings in front of a
//! simulated REST backend, then reports a product update and shows the
//! dependent caches being refetched.

use readthrough::prelude::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Categoria {
    pub id: u32,
    pub nombre: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Color {
    pub id: u32,
    pub nombre: String,
    pub hex: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Producto {
    pub id: u32,
    pub nombre: String,
    pub stock: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultPage<T> {
    pub items: Vec<T>,
    pub total: u32,
}

/// Stand-in for the REST client: answers with canned JSON after a delay
#[derive(Clone, Default)]
struct Backend {
    requests: Arc<AtomicUsize>,
}

impl Backend {
    async fn get(&self, path: String) -> anyhow::Result<String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(40)).await;
        println!("  -> GET {}", path);

        let body = if path.starts_with("/categorias") {
            r#"[{"id":1,"nombre":"General"},{"id":2,"nombre":"Ropa"}]"#
        } else if path.starts_with("/colores") {
            r##"[{"id":1,"nombre":"Rojo","hex":"#ff0000"},{"id":2,"nombre":"Azul","hex":"#0000ff"}]"##
        } else if path.starts_with("/productos") {
            r#"{"items":[{"id":1,"nombre":"Camisa","stock":12},{"id":2,"nombre":"Pantalon","stock":0}],"total":2}"#
        } else {
            anyhow::bail!("404 Not Found: {}", path);
        };
        Ok(body.to_string())
    }

    /// Request handed to the cache; owns its own handle on the backend
    fn list<T>(&self, path: &str) -> impl Future<Output = anyhow::Result<T>> + Send + 'static + use<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let backend = self.clone();
        let path = path.to_string();
        async move {
            let body = backend.get(path).await?;
            Ok(serde_json::from_str(&body)?)
        }
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig {
        cache: CacheConfig::new(300_000)
            .with_resource("categorias", ResourceConfig::with_ttl(600_000))
            .with_resource(
                "colores",
                ResourceConfig::with_ttl(120_000).invalidated_by(["productos"]),
            )
            .with_resource("productos", ResourceConfig::with_ttl(30_000)),
        signal: SignalConfig::default(),
    };

    let mut readthrough = ReadThrough::new(config)?;
    let categorias = readthrough.register::<Vec<Categoria>>("categorias")?;
    let colores = readthrough.register::<Vec<Color>>("colores")?;
    let productos = readthrough.register::<ResultPage<Producto>>("productos")?;
    let backend = Backend::default();

    println!("Loading categories twice at once:");
    let (a, b) = tokio::join!(
        categorias.load(
            "categorias",
            Vec::<(&str, ParamValue)>::new(),
            || backend.list::<Vec<Categoria>>("/categorias"),
            LoadOptions::new(),
        ),
        categorias.load(
            "categorias",
            Vec::<(&str, ParamValue)>::new(),
            || backend.list::<Vec<Categoria>>("/categorias"),
            LoadOptions::new(),
        ),
    );
    let (a, b) = (a?, b?);
    println!("  {} categories, shared: {}", a.len(), Arc::ptr_eq(&a, &b));

    println!("Loading colors of product 42:");
    let product_colors = colores
        .load(
            "colores",
            vec![("productId", 42)],
            || backend.list::<Vec<Color>>("/colores?productId=42"),
            LoadOptions::new(),
        )
        .await?;
    for color in product_colors.iter() {
        println!("  {} {}", color.nombre, color.hex);
    }

    println!("Listing products with an 'all states' filter:");
    let query = ListQuery::new()
        .page(1)
        .page_size(20)
        .filter("estado", "todos")
        .sort("nombre", SortOrder::Asc);
    let page = productos
        .load_query(
            "productos",
            &query,
            || backend.list::<ResultPage<Producto>>("/productos?page=1"),
            LoadOptions::new(),
        )
        .await?;
    println!("  {} of {} products", page.items.len(), page.total);

    println!("Same listing without the filter is a cache hit:");
    let plain = ListQuery::new().page(1).page_size(20).sort("nombre", SortOrder::Asc);
    productos
        .load_query(
            "productos",
            &plain,
            || backend.list::<ResultPage<Producto>>("/productos?page=1"),
            LoadOptions::new(),
        )
        .await?;
    println!("  backend requests so far: {}", backend.requests());

    println!("Product 2 updated, reloading:");
    readthrough.notify_mutation(EventType::Update, "productos", Some("2"));
    productos
        .load_query(
            "productos",
            &plain,
            || backend.list::<ResultPage<Producto>>("/productos?page=1"),
            LoadOptions::new(),
        )
        .await?;
    colores
        .load(
            "colores",
            vec![("productId", 42)],
            || backend.list::<Vec<Color>>("/colores?productId=42"),
            LoadOptions::new(),
        )
        .await?;
    println!("  backend requests so far: {}", backend.requests());

    println!("Unknown endpoint errors are not cached:");
    if let Err(err) = productos
        .load(
            "productos",
            vec![("page", 99)],
            || backend.list::<ResultPage<Producto>>("/desconocido"),
            LoadOptions::new(),
        )
        .await
    {
        println!("  {}", err);
    }

    println!("Cached entries: {}", readthrough.cached_entries());
    Ok(())
}
