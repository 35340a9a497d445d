use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{split, AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

pub use crate::commands::*;
pub use crate::packets::*;
pub use crate::{LinkError, Vector6};

use super::{Connector, RobotHandle, UrxDriverConfig};

/// TCP client for the controller's command interface.
///
/// Cloning is cheap and every clone shares one connection. Requests are
/// serialized: each one writes a single line stamped with a fresh sequence
/// id and waits for the response echoing it.
#[derive(Debug, Clone)]
pub struct UrxDriver {
    pub config: UrxDriverConfig,
    writer: Arc<Mutex<WriteHalf<TcpStream>>>,
    response_tx: broadcast::Sender<Reply>,
    next_sequence: Arc<AtomicU32>,
    request_lock: Arc<Mutex<()>>,
    connected: Arc<AtomicBool>,
    reader: Arc<JoinHandle<()>>,
}

impl UrxDriver {
    /// Opens the TCP connection, starts the response reader and checks that
    /// the peer answers a status request.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if the configuration does not validate.
    /// - `Disconnected` if no connection could be made within the configured retries.
    /// - any request error from the initial status query.
    pub async fn connect(config: UrxDriverConfig) -> Result<UrxDriver, LinkError> {
        config.validate()?;
        let stream = connect_with_retries(&config.connection_url(), config.connect_retries).await?;
        let (read_half, write_half) = split(stream);

        let (response_tx, _rx) = broadcast::channel(100);
        let connected = Arc::new(AtomicBool::new(true));
        let reader = tokio::spawn(read_responses(read_half, response_tx.clone(), connected.clone()));

        let driver = Self {
            config,
            writer: Arc::new(Mutex::new(write_half)),
            response_tx,
            next_sequence: Arc::new(AtomicU32::new(1)),
            request_lock: Arc::new(Mutex::new(())),
            connected,
            reader: Arc::new(reader),
        };

        if let Err(e) = driver.request(Command::GetStatus).await {
            driver.shutdown_io().await;
            return Err(e);
        }
        info!("Connected to controller at {}", driver.config.connection_url());
        Ok(driver)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn give_sequence_id(&self) -> u32 {
        self.next_sequence.fetch_add(1, Ordering::Relaxed)
    }

    /// Sends `command` and waits for its response.
    ///
    /// A response with a non-zero `ErrorID` is returned as `LinkError::Controller`.
    /// Replies carrying another request's sequence id are skipped, so an
    /// answer that arrives after its request timed out is never taken for
    /// the next one.
    pub async fn request(&self, command: Command) -> Result<CommandResponse, LinkError> {
        if !self.is_connected() {
            return Err(LinkError::Disconnected);
        }
        let _guard = self.request_lock.lock().await;
        let mut responses = self.response_tx.subscribe();
        let name = command.name();
        let sequence_id = self.give_sequence_id();
        self.send_packet(&Request::new(sequence_id, command)).await?;

        let wait = async {
            loop {
                match responses.recv().await {
                    Ok(reply) if reply.sequence_id.is_some_and(|id| id != sequence_id) => debug!(
                        "Ignoring late {} #{:?} while waiting for {} #{}",
                        reply.response.name(),
                        reply.sequence_id,
                        name,
                        sequence_id
                    ),
                    Ok(Reply { response: CommandResponse::Unknown(_), .. }) => {
                        return Err(LinkError::UnexpectedResponse(format!(
                            "controller did not understand {}",
                            name
                        )))
                    }
                    Ok(reply) if reply.response.name() == name => return Ok(reply.response),
                    Ok(other) => debug!("Ignoring {} while waiting for {}", other.response.name(), name),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Response channel lagged, skipped {} messages", skipped)
                    }
                    Err(broadcast::error::RecvError::Closed) => return Err(LinkError::Disconnected),
                }
            }
        };

        let response = timeout(Duration::from_millis(self.config.request_timeout_ms), wait)
            .await
            .map_err(|_| LinkError::Timeout(name))??;

        match response.error_id() {
            0 => Ok(response),
            error_id => Err(LinkError::from_error_id(error_id)),
        }
    }

    async fn send_packet(&self, request: &Request) -> Result<(), LinkError> {
        let line = to_line(request)?;
        let mut stream = self.writer.lock().await;
        if let Err(e) = stream.write_all(line.as_bytes()).await {
            self.connected.store(false, Ordering::Release);
            return Err(LinkError::FailedToSend(e.to_string()));
        }
        debug!("Sent: {}", line.trim_end());
        Ok(())
    }

    /// Sends `Disconnect` and tears the connection down. The connection is
    /// closed even if the controller does not acknowledge.
    pub async fn disconnect(&self) -> Result<(), LinkError> {
        let result = self.request(Command::Disconnect).await.map(|_| ());
        self.shutdown_io().await;
        info!("Disconnected from controller at {}", self.config.connection_url());
        result
    }

    async fn shutdown_io(&self) {
        self.connected.store(false, Ordering::Release);
        let _ = self.writer.lock().await.shutdown().await;
        self.reader.abort();
    }
}

fn expect_ack(response: CommandResponse) -> Result<(), LinkError> {
    match response {
        CommandResponse::WriteDigitalOutput(_)
        | CommandResponse::MoveLinear(_)
        | CommandResponse::MoveJointRelative(_)
        | CommandResponse::SpeedLinear(_)
        | CommandResponse::SpeedJoint(_)
        | CommandResponse::Stop(_)
        | CommandResponse::SetCsys(_)
        | CommandResponse::Disconnect(_) => Ok(()),
        other => Err(unexpected(&other)),
    }
}

fn unexpected(response: &CommandResponse) -> LinkError {
    LinkError::UnexpectedResponse(response.name().to_string())
}

impl RobotHandle for UrxDriver {
    async fn is_running(&self) -> Result<bool, LinkError> {
        match self.request(Command::GetStatus).await? {
            CommandResponse::GetStatus(r) => Ok(r.running),
            other => Err(unexpected(&other)),
        }
    }

    async fn get_pose(&self) -> Result<Vector6, LinkError> {
        match self.request(Command::ReadPose).await? {
            CommandResponse::ReadPose(r) => Ok(r.pose.to_array()),
            other => Err(unexpected(&other)),
        }
    }

    async fn get_joints(&self) -> Result<Vector6, LinkError> {
        match self.request(Command::ReadJoints).await? {
            CommandResponse::ReadJoints(r) => Ok(r.joints.to_array()),
            other => Err(unexpected(&other)),
        }
    }

    async fn get_digital_output_bits(&self) -> Result<u32, LinkError> {
        match self.request(Command::ReadDigitalOutputs).await? {
            CommandResponse::ReadDigitalOutputs(r) => Ok(r.bits),
            other => Err(unexpected(&other)),
        }
    }

    async fn set_digital_output(&self, index: u8, value: bool) -> Result<(), LinkError> {
        let command = Command::WriteDigitalOutput(WriteDigitalOutput::new(index, value));
        expect_ack(self.request(command).await?)
    }

    async fn move_linear(
        &self,
        vector: Vector6,
        velocity: f64,
        acceleration: f64,
        tool_frame: bool,
        wait: bool,
    ) -> Result<(), LinkError> {
        let command = Command::MoveLinear(MoveLinear::new(vector, velocity, acceleration, tool_frame, wait));
        expect_ack(self.request(command).await?)
    }

    async fn move_joint_relative(
        &self,
        vector: Vector6,
        velocity: f64,
        acceleration: f64,
        wait: bool,
    ) -> Result<(), LinkError> {
        let command = Command::MoveJointRelative(MoveJointRelative::new(vector, velocity, acceleration, wait));
        expect_ack(self.request(command).await?)
    }

    async fn move_linear_velocity(
        &self,
        vector: Vector6,
        acceleration: f64,
        min_time: f64,
        tool_frame: bool,
    ) -> Result<(), LinkError> {
        let command = Command::SpeedLinear(SpeedLinear::new(vector, acceleration, min_time, tool_frame));
        expect_ack(self.request(command).await?)
    }

    async fn move_joint_velocity(&self, vector: Vector6, acceleration: f64, min_time: f64) -> Result<(), LinkError> {
        let command = Command::SpeedJoint(SpeedJoint::new(vector, acceleration, min_time));
        expect_ack(self.request(command).await?)
    }

    async fn stop(&self) -> Result<(), LinkError> {
        expect_ack(self.request(Command::Stop(Stop::default())).await?)
    }

    async fn set_coordinate_frame(&self, transform: Vector6) -> Result<(), LinkError> {
        expect_ack(self.request(Command::SetCsys(SetCsys::new(transform))).await?)
    }

    async fn get_coordinate_frame(&self) -> Result<Vector6, LinkError> {
        match self.request(Command::ReadCsys).await? {
            CommandResponse::ReadCsys(r) => Ok(r.transform),
            other => Err(unexpected(&other)),
        }
    }

    async fn close(self) -> Result<(), LinkError> {
        self.disconnect().await
    }
}

/// Connects to endpoints of the form `host` or `host:port`.
#[derive(Debug, Clone)]
pub struct UrxConnector {
    pub default_port: u16,
    pub request_timeout_ms: u64,
    pub connect_retries: u32,
}

impl Default for UrxConnector {
    fn default() -> Self {
        let config = UrxDriverConfig::default();
        Self {
            default_port: config.port,
            request_timeout_ms: config.request_timeout_ms,
            connect_retries: config.connect_retries,
        }
    }
}

impl Connector for UrxConnector {
    type Handle = UrxDriver;

    async fn connect(&self, endpoint: &str) -> Result<UrxDriver, LinkError> {
        let mut config = UrxDriverConfig::from_endpoint(endpoint, self.default_port)?;
        config.request_timeout_ms = self.request_timeout_ms;
        config.connect_retries = self.connect_retries;
        UrxDriver::connect(config).await
    }
}

async fn connect_with_retries(addr: &str, retries: u32) -> Result<TcpStream, LinkError> {
    for attempt in 0..retries {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                warn!("Failed to connect to {} (attempt {}): {}", addr, attempt + 1, e);
                if attempt + 1 < retries {
                    sleep(Duration::from_millis(500)).await;
                }
            }
        }
    }
    Err(LinkError::Disconnected)
}

async fn read_responses(
    mut reader: ReadHalf<TcpStream>,
    response_tx: broadcast::Sender<Reply>,
    connected: Arc<AtomicBool>,
) {
    let mut buf = vec![0; 2048];
    let mut temp = Vec::new();

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => {
                debug!("Controller closed the connection");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                warn!("Reading from controller failed: {}", e);
                break;
            }
        };

        temp.extend_from_slice(&buf[..n]);
        for line in extract_lines(&mut temp) {
            match serde_json::from_str::<Reply>(&line) {
                Ok(reply) => {
                    debug!("Received: {}", line);
                    // no subscriber simply means nobody is waiting
                    let _ = response_tx.send(reply);
                }
                Err(e) => warn!("Invalid response line {:?}: {}", line, e),
            }
        }
    }
    connected.store(false, Ordering::Release);
}
