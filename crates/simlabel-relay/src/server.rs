use std::{
    future::Future,
    net::SocketAddr,
    path::PathBuf,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::{mpsc, Mutex};

use crate::{
    protocol::{self, RelayMessage},
    store::LabelStore,
    RelayError,
};

/// Address the relay listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Host name or IP address.
    pub host: String,
    /// TCP port; 0 picks a free one.
    pub port: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8053,
        }
    }
}

struct TrackedClient {
    id: u64,
    tx: mpsc::UnboundedSender<RelayMessage>,
}

/// State shared by every connection.
pub(crate) struct RelayState {
    store: LabelStore,
    client: Mutex<Option<TrackedClient>>,
    next_id: AtomicU64,
}

impl RelayState {
    pub(crate) fn new(store: LabelStore) -> Self {
        Self {
            store,
            client: Mutex::new(None),
            next_id: AtomicU64::new(0),
        }
    }

    /// Make a new connection the tracked client, replacing the previous one.
    pub(crate) async fn register(&self) -> (u64, mpsc::UnboundedReceiver<RelayMessage>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();

        let previous = self.client.lock().await.replace(TrackedClient { id, tx });
        match previous {
            Some(old) => log::info!("client {id} connected, replacing client {}", old.id),
            None => log::info!("client {id} connected"),
        }
        (id, rx)
    }

    /// Forget the connection if it is still the tracked client.
    pub(crate) async fn unregister(&self, id: u64) {
        let mut client = self.client.lock().await;
        if client.as_ref().is_some_and(|c| c.id == id) {
            *client = None;
        }
        log::info!("client {id} disconnected");
    }

    pub(crate) async fn tracked_client(&self) -> Option<u64> {
        self.client.lock().await.as_ref().map(|c| c.id)
    }

    pub(crate) async fn send(&self, msg: RelayMessage) -> Result<(), RelayError> {
        let client = self.client.lock().await;
        let tracked = client.as_ref().ok_or(RelayError::NoClient)?;
        tracked
            .tx
            .send(msg)
            .map_err(|_| RelayError::ClientDisconnected(tracked.id))
    }

    /// Act on one decoded message. Returns the saved path for data messages.
    pub(crate) fn dispatch(&self, id: u64, msg: RelayMessage) -> Result<Option<PathBuf>, RelayError> {
        match msg {
            RelayMessage::Data(payload) => Ok(Some(self.store.save(&payload)?)),
            RelayMessage::Log(line) => {
                log::info!("client {id}: {line}");
                Ok(None)
            }
        }
    }

    /// Decode and dispatch one websocket message. Returns false when the peer closed.
    ///
    /// Dispatch runs on the blocking pool since saving writes to disk.
    pub(crate) async fn on_message(self: &Arc<Self>, id: u64, msg: Message) -> bool {
        let decoded = match msg {
            Message::Text(text) => protocol::parse_text(&text),
            Message::Binary(bytes) => protocol::decode_frame(&bytes),
            Message::Close(_) => return false,
            Message::Ping(_) | Message::Pong(_) => return true,
        };

        let result = match decoded {
            Ok(msg) => {
                let state = Arc::clone(self);
                tokio::task::spawn_blocking(move || state.dispatch(id, msg))
                    .await
                    .unwrap_or_else(|e| Err(RelayError::Io(e.into())))
            }
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            log::error!("client {id}: {e}");
        }
        true
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<RelayState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<RelayState>) {
    let (id, mut rx) = state.register().await;
    let mut outbound_open = true;

    loop {
        tokio::select! {
            inbound = socket.recv() => match inbound {
                Some(Ok(msg)) => {
                    if !state.on_message(id, msg).await {
                        break;
                    }
                }
                Some(Err(e)) => {
                    log::warn!("client {id}: {e}");
                    break;
                }
                None => break,
            },
            outbound = rx.recv(), if outbound_open => match outbound {
                Some(msg) => {
                    if let Err(e) = socket.send(Message::Text(protocol::encode_text(&msg))).await {
                        log::warn!("client {id}: failed to send: {e}");
                        break;
                    }
                }
                // replaced by a newer connection
                None => outbound_open = false,
            },
        }
    }

    state.unregister(id).await;
}

/// Sends messages to whichever client is currently tracked.
#[derive(Clone)]
pub struct RelayHandle {
    state: Arc<RelayState>,
}

impl RelayHandle {
    /// Queue a message for the tracked client.
    ///
    /// # Errors
    ///
    /// Fails when no client is connected.
    pub async fn send(&self, msg: RelayMessage) -> Result<(), RelayError> {
        self.state.send(msg).await
    }

    /// Id of the tracked client, if any.
    pub async fn tracked_client(&self) -> Option<u64> {
        self.state.tracked_client().await
    }
}

/// Websocket server receiving label sessions on `/`.
pub struct RelayServer {
    listener: tokio::net::TcpListener,
    state: Arc<RelayState>,
}

impl RelayServer {
    /// Bind the listening socket.
    pub async fn bind(config: &RelayConfig, store: LabelStore) -> Result<Self, RelayError> {
        let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
        Ok(Self {
            listener,
            state: Arc::new(RelayState::new(store)),
        })
    }

    /// The bound address.
    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.listener.local_addr()?)
    }

    /// A handle to reach the tracked client.
    pub fn handle(&self) -> RelayHandle {
        RelayHandle {
            state: self.state.clone(),
        }
    }

    /// Serve connections until `shutdown` completes.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), RelayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = Router::new()
            .route("/", get(ws_handler))
            .with_state(self.state);

        log::info!("relay listening on ws://{}", self.listener.local_addr()?);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        log::info!("relay stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use simlabel_io::{FileFormat, FileSaver};

    fn state(dir: &std::path::Path) -> RelayState {
        let saver = FileSaver::new(dir, FileFormat::Json).unwrap();
        RelayState::new(LabelStore::new(saver))
    }

    #[tokio::test]
    async fn newest_client_is_tracked() -> Result<(), RelayError> {
        let tmp_dir = tempfile::tempdir()?;
        let state = state(tmp_dir.path());

        let (first, mut rx_first) = state.register().await;
        let (second, mut rx_second) = state.register().await;
        assert_ne!(first, second);
        assert_eq!(state.tracked_client().await, Some(second));

        state.send(RelayMessage::Log("hello".to_string())).await?;
        assert_eq!(
            rx_second.recv().await,
            Some(RelayMessage::Log("hello".to_string()))
        );
        // the replaced client's outbound channel is closed
        assert_eq!(rx_first.recv().await, None);

        // a stale disconnect does not drop the tracked client
        state.unregister(first).await;
        assert_eq!(state.tracked_client().await, Some(second));
        state.unregister(second).await;
        assert_eq!(state.tracked_client().await, None);
        Ok(())
    }

    #[tokio::test]
    async fn send_without_client() -> Result<(), RelayError> {
        let tmp_dir = tempfile::tempdir()?;
        let state = state(tmp_dir.path());
        let res = state.send(RelayMessage::Log("x".to_string())).await;
        assert!(matches!(res, Err(RelayError::NoClient)));
        Ok(())
    }

    #[test]
    fn data_messages_are_saved() -> Result<(), RelayError> {
        let tmp_dir = tempfile::tempdir()?;
        let state = state(tmp_dir.path());

        let saved = state.dispatch(0, RelayMessage::Data(json!({"a": 1})))?;
        let path = saved.ok_or(RelayError::NoClient)?;
        assert!(path.exists());
        assert!(state.store.meta_path().exists());

        assert_eq!(state.dispatch(0, RelayMessage::Log("note".to_string()))?, None);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_messages_keep_connection() -> Result<(), RelayError> {
        let tmp_dir = tempfile::tempdir()?;
        let state = Arc::new(state(tmp_dir.path()));

        assert!(state.on_message(0, Message::Text("no separator".to_string())).await);
        assert!(state.on_message(0, Message::Binary(vec![1, 0])).await);
        assert!(!state.store.meta_path().exists());
        assert!(state.on_message(0, Message::Text("DAT:::{\"b\": 2}".to_string())).await);
        assert!(state.store.meta_path().exists());
        assert!(!state.on_message(0, Message::Close(None)).await);
        Ok(())
    }

    #[tokio::test]
    async fn bind_and_shutdown() -> Result<(), RelayError> {
        let tmp_dir = tempfile::tempdir()?;
        let saver = FileSaver::new(tmp_dir.path(), FileFormat::Yaml)?;
        let config = RelayConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };

        let server = RelayServer::bind(&config, LabelStore::new(saver)).await?;
        let addr = server.local_addr()?;
        assert_ne!(addr.port(), 0);

        let handle = server.handle();
        assert_eq!(handle.tracked_client().await, None);

        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let task = tokio::spawn(server.serve(async move {
            let _ = stop_rx.await;
        }));

        let _ = stop_tx.send(());
        tokio::time::timeout(std::time::Duration::from_secs(5), task)
            .await
            .map_err(|e| RelayError::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, e)))?
            .map_err(|e| RelayError::Io(std::io::Error::other(e)))??;
        Ok(())
    }
}
