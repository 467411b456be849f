use axum::Router;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{client::IntoClientRequest, handshake::client::Response},
};
use url::Url;

/// Spawns the Axum app on a random local port
pub async fn spawn_server(app: Router) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    addr
}

/// Connects to `/ws/{path}?token=...`
pub async fn connect_ws(
    addr: &str,
    path: &str,
    token: &str,
) -> Result<
    (WebSocketStream<MaybeTlsStream<TcpStream>>, Response),
    tokio_tungstenite::tungstenite::Error,
> {
    let url = Url::parse(&format!("ws://{addr}/ws/{path}?token={token}")).unwrap();

    let req = url.to_string().into_client_request().unwrap();
    connect_async(req).await
}
