//! Entry point bundling every resource client over one transport.

use std::sync::Arc;

use crate::collection::CollectionApiClient;
use crate::config::ConnectionConfig;
use crate::cursor::CursorApiClient;
use crate::database::DatabaseApiClient;
use crate::document::DocumentApiClient;
use crate::error::Result;
use crate::graph::GraphApiClient;
use crate::transport::{HttpApiTransport, Transport};

/// All resource clients, sharing one transport.
///
/// Cloning is cheap and every clone talks through the same transport, so a
/// client can be handed to concurrent tasks freely.
#[derive(Debug)]
pub struct ArangoClient<T: Transport> {
    pub collection: CollectionApiClient<T>,
    pub cursor: CursorApiClient<T>,
    pub database: DatabaseApiClient<T>,
    pub document: DocumentApiClient<T>,
    pub graph: GraphApiClient<T>,
}

impl<T: Transport> Clone for ArangoClient<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            cursor: self.cursor.clone(),
            database: self.database.clone(),
            document: self.document.clone(),
            graph: self.graph.clone(),
        }
    }
}

impl<T: Transport> ArangoClient<T> {
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    pub fn from_shared(transport: Arc<T>) -> Self {
        Self {
            collection: CollectionApiClient::new(Arc::clone(&transport)),
            cursor: CursorApiClient::new(Arc::clone(&transport)),
            database: DatabaseApiClient::new(Arc::clone(&transport)),
            document: DocumentApiClient::new(Arc::clone(&transport)),
            graph: GraphApiClient::new(transport),
        }
    }
}

impl ArangoClient<HttpApiTransport> {
    /// Connects over HTTP with basic auth.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        Ok(Self::new(HttpApiTransport::new(config)?))
    }
}
