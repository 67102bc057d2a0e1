//! Line-framed JSON over TCP. One request per connection: read a frame, answer with one JSON
//! object plus `\n`, close.

use std::{future::Future, io, net::SocketAddr, sync::Arc, time::Duration};

use serde_json::Value;
use tokio::{
	io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader},
	net::{TcpListener, TcpStream},
	time,
};

use autofind_domain::Reply;
use autofind_service::CatalogService;

pub const NO_DATA_RECEIVED: &str = "no data received";
pub const PAYLOAD_TOO_LARGE: &str = "payload too large";
pub const INVALID_JSON: &str = "invalid JSON";

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
	pub max_frame_bytes: usize,
	pub read_timeout: Option<Duration>,
}
impl From<&autofind_config::Service> for ServerOptions {
	fn from(cfg: &autofind_config::Service) -> Self {
		Self {
			max_frame_bytes: cfg.max_frame_bytes,
			read_timeout: cfg.read_timeout_ms.map(Duration::from_millis),
		}
	}
}

#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
	/// Nothing but whitespace before the terminator.
	Empty,
	TooLarge,
	Payload(Vec<u8>),
}

/// Accepts connections until `shutdown` resolves. Each connection runs on its own task and
/// in-flight tasks are left to finish.
pub async fn serve<F>(
	listener: TcpListener,
	service: Arc<CatalogService>,
	options: ServerOptions,
	shutdown: F,
) where
	F: Future<Output = ()>,
{
	tokio::pin!(shutdown);

	loop {
		tokio::select! {
			_ = &mut shutdown => {
				tracing::info!("Shutdown requested. No longer accepting connections.");

				return;
			},
			accepted = listener.accept() => match accepted {
				Ok((stream, peer)) => {
					let service = service.clone();

					tokio::spawn(async move {
						if let Err(err) = handle_connection(stream, peer, &service, options).await {
							tracing::warn!(%peer, error = %err, "Connection failed.");
						}
					});
				},
				Err(err) => {
					tracing::warn!(error = %err, "Failed to accept connection.");

					time::sleep(ACCEPT_BACKOFF).await;
				},
			},
		}
	}
}

pub async fn handle_connection(
	mut stream: TcpStream,
	peer: SocketAddr,
	service: &CatalogService,
	options: ServerOptions,
) -> io::Result<()> {
	let (reader, mut writer) = stream.split();
	let read = read_frame(reader, options.max_frame_bytes);
	let frame = match options.read_timeout {
		Some(timeout) => match time::timeout(timeout, read).await {
			Ok(frame) => frame?,
			Err(_) => {
				tracing::info!(%peer, ?timeout, "Client did not finish its request in time.");

				return Ok(());
			},
		},
		None => read.await?,
	};
	let reply = respond(service, frame).await;

	if let Reply::Ok { results, .. } = &reply {
		tracing::info!(%peer, results = results.len(), "Sending search results.");
	}

	write_reply(&mut writer, &reply).await
}

/// Reads bytes up to the first `\n` or end of stream, whichever comes first.
pub async fn read_frame<R>(reader: R, max_frame_bytes: usize) -> io::Result<Frame>
where
	R: AsyncRead + Unpin,
{
	let limit = u64::try_from(max_frame_bytes).unwrap_or(u64::MAX).saturating_add(1);
	let mut reader = BufReader::new(reader.take(limit));
	let mut frame = Vec::new();

	reader.read_until(b'\n', &mut frame).await?;

	if frame.last() == Some(&b'\n') {
		frame.pop();
	}
	if frame.len() > max_frame_bytes {
		return Ok(Frame::TooLarge);
	}
	if frame.iter().all(u8::is_ascii_whitespace) {
		return Ok(Frame::Empty);
	}

	Ok(Frame::Payload(frame))
}

pub async fn respond(service: &CatalogService, frame: Frame) -> Reply {
	let payload = match frame {
		Frame::Empty => return Reply::error(NO_DATA_RECEIVED),
		Frame::TooLarge => return Reply::error(PAYLOAD_TOO_LARGE),
		Frame::Payload(payload) => payload,
	};
	let criteria = match serde_json::from_slice::<Value>(&payload) {
		Ok(Value::Object(criteria)) => criteria,
		Ok(_) | Err(_) => return Reply::error(INVALID_JSON),
	};

	match service.search(&criteria).await {
		Ok(listings) => Reply::ok(listings),
		Err(err) => {
			tracing::error!(error = %err, "Catalog query failed.");

			Reply::error(format!("query error: {err}"))
		},
	}
}

pub async fn write_reply<W>(writer: &mut W, reply: &Reply) -> io::Result<()>
where
	W: AsyncWrite + Unpin,
{
	let mut body = serde_json::to_vec(reply)?;

	body.push(b'\n');
	writer.write_all(&body).await?;
	writer.shutdown().await
}
