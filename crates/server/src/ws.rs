//! WebSocket echo. Frames are returned as-is: no sanitization and no length
//! check, unlike every other entry point.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::Response,
};
use codeviz_proto::ws_echo;
use tracing::{debug, error};

pub(crate) async fn upgrade(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(echo)
}

async fn echo(mut socket: WebSocket) {
    while let Some(frame) = socket.recv().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Ping(_) | Message::Pong(_)) => continue,
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => {
                error!("WebSocket: expected a text frame");
                break;
            }
            Err(e) => {
                error!(error = %e, "WebSocket receive failed");
                break;
            }
        };
        if let Err(e) = socket.send(Message::Text(ws_echo(&text))).await {
            error!(error = %e, "WebSocket send failed");
            break;
        }
    }
    debug!("websocket session closed");
}
