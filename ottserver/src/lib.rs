//! # ottserver - Serveur web haut niveau basé sur Axum
//!
//! Cette crate fournit une abstraction simple pour créer le serveur HTTP
//! d'OTTGate avec Axum.
//!
//! ## Fonctionnalités
//!
//! - 🚀 **API de haut niveau** : assemblage du router à partir des crates métier
//! - 📚 **Documentation OpenAPI** : génération automatique de Swagger UI
//! - ⚡ **Arrêt gracieux** : gestion propre de l'arrêt sur Ctrl+C
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use ottserver::ServerBuilder;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut server = ServerBuilder::new("MyServer")
//!         .http_port(8080)
//!         .build();
//!
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await;
//!     server.wait().await;
//! }
//! ```

pub mod server;

pub use server::{Server, ServerBuilder, ServerInfo};
