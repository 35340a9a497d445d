use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use urx::commands::AckResponse;
use urx::packets::{extract_lines, to_line, Command, CommandResponse, Reply, Request};
use urx::ControllerErrorCode;

use crate::robot::SimRobot;

/// One arm shared by every client connection.
pub type SharedRobot = Arc<Mutex<SimRobot>>;

/// Controller cycle time.
const MOTION_TICK: Duration = Duration::from_millis(8);

/// Accepts clients forever, one task per connection.
pub async fn serve(listener: TcpListener, robot: SharedRobot) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("Simulator listening on {}", listener.local_addr()?);
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                continue;
            }
        };
        info!("Client connected from {}", addr);

        let robot = Arc::clone(&robot);
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, robot).await {
                warn!("Error handling client {}: {:?}", addr, e);
            }
            info!("Client {} disconnected", addr);
        });
    }
}

/// Integrates velocity commands at the controller cycle rate so the pose
/// moves between client requests.
pub fn spawn_motion_clock(robot: SharedRobot) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(MOTION_TICK);
        loop {
            tick.tick().await;
            robot.lock().await.advance(Instant::now());
        }
    })
}

async fn handle_client(mut socket: TcpStream, robot: SharedRobot) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut buffer = vec![0; 1024];
    let mut temp_buffer = Vec::new();

    loop {
        let n = socket.read(&mut buffer).await?;
        if n == 0 {
            return Ok(());
        }
        temp_buffer.extend_from_slice(&buffer[..n]);

        for line in extract_lines(&mut temp_buffer) {
            let (reply, done) = match serde_json::from_str::<Request>(&line) {
                Ok(request) => {
                    debug!("Received: {}", line);
                    let response = robot.lock().await.handle(&request.command, Instant::now());
                    (Reply::to(&request, response), request.command == Command::Disconnect)
                }
                Err(e) => {
                    warn!("Failed to parse command {:?}: {}", line, e);
                    let unknown = AckResponse::error(ControllerErrorCode::UnknownCommand.id());
                    let reply = Reply {
                        sequence_id: sequence_id_of(&line),
                        response: CommandResponse::Unknown(unknown),
                    };
                    (reply, false)
                }
            };

            socket.write_all(to_line(&reply)?.as_bytes()).await?;
            if done {
                socket.shutdown().await?;
                return Ok(());
            }
        }
    }
}

/// Sequence id of a line that is JSON but not a known command.
fn sequence_id_of(line: &str) -> Option<u32> {
    let value = serde_json::from_str::<serde_json::Value>(line).ok()?;
    u32::try_from(value.get("SequenceID")?.as_u64()?).ok()
}
