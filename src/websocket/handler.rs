use crate::{
    game::{GameError, GameRoom},
    websocket::messages::{ClientMessage, ServerMessage},
    AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::{
    sync::{broadcast::error::RecvError, mpsc},
    task::JoinHandle,
};
use uuid::Uuid;

/// Per-connection view of which game this socket is playing
struct Connection {
    player_id: Uuid,
    room: Option<Arc<GameRoom>>,
    /// Forwards room events to this socket
    forward_task: Option<JoinHandle<()>>,
}

impl Connection {
    fn new() -> Self {
        Self {
            player_id: Uuid::new_v4(),
            room: None,
            forward_task: None,
        }
    }

    async fn leave(&mut self) {
        if let Some(task) = self.forward_task.take() {
            task.abort();
        }
        if let Some(room) = self.room.take() {
            room.leave(self.player_id).await;
            tracing::info!("Player {} left game {}", self.player_id, room.game_id());
        }
    }
}

/// WebSocket upgrade handler
pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(100);

    tracing::info!("WebSocket connection established");

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Handle incoming messages from the client
    let mut recv_task = tokio::spawn(async move {
        let mut connection = Connection::new();

        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        if let Err(e) =
                            handle_client_message(client_msg, &state, &tx, &mut connection).await
                        {
                            tracing::error!("Error handling message: {}", e);
                            let error_msg = ServerMessage::Error {
                                message: e.to_string(),
                            };
                            let _ = tx.send(error_msg).await;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse message: {}", e);
                        let error_msg = ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        };
                        let _ = tx.send(error_msg).await;
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Client {} disconnected", connection.player_id);
                    break;
                }
                _ => {}
            }
        }

        connection.leave().await;
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            // Let the receive side notice the closed socket and leave the game
            let _ = (&mut recv_task).await;
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    tracing::info!("WebSocket connection closed");
}

/// Handle individual client messages
async fn handle_client_message(
    msg: ClientMessage,
    state: &AppState,
    tx: &mpsc::Sender<ServerMessage>,
    connection: &mut Connection,
) -> anyhow::Result<()> {
    match msg {
        ClientMessage::JoinGame {
            game_id,
            player_id,
            name,
            color,
        } => {
            let name = name.trim();
            if name.is_empty() {
                anyhow::bail!("name must not be empty");
            }
            let room = state
                .game(&game_id)
                .ok_or_else(|| anyhow::anyhow!("game {} not found", game_id))?;

            connection.leave().await;
            if let Some(id) = player_id {
                connection.player_id = id;
            }

            // Subscribe before joining so this player sees their own join
            let mut events = room.subscribe();
            let player = room.join(connection.player_id, name, &color).await?;
            tracing::info!(
                "Player {} ({}) joined game {} ({} players)",
                player.name,
                player.id,
                game_id,
                room.player_count().await
            );

            let forward_tx = tx.clone();
            connection.forward_task = Some(tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(event) => {
                            if forward_tx.send(event.into()).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!("Connection lagged, skipped {} room events", skipped);
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }));

            tx.send(ServerMessage::Joined { player }).await?;
            tx.send(ServerMessage::GameState(room.snapshot().await)).await?;
            connection.room = Some(room);
        }
        ClientMessage::SubmitSelection { positions } => {
            let room = connection
                .room
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("join a game before submitting selections"))?;

            tracing::debug!(
                "Player {} submitting selection: {:?}",
                connection.player_id,
                positions
            );

            match room.submit_selection(connection.player_id, positions).await {
                // The room broadcast delivers the find to everyone, this player included
                Ok(Some(_)) => {}
                Ok(None) => tx.send(ServerMessage::NoMatch).await?,
                Err(e) if e.is_selection_error() => {
                    tx.send(ServerMessage::InvalidSelection {
                        reason: e.to_string(),
                    })
                    .await?
                }
                Err(GameError::AlreadyFound { .. }) => tx.send(ServerMessage::NoMatch).await?,
                Err(e) => return Err(e.into()),
            }
        }
        ClientMessage::LeaveGame => {
            connection.leave().await;
        }
    }

    Ok(())
}
