use super::Cache;
use super::Request;
use super::Service;
use super::protocol;
use crate::HELPER_CACHE_SIZE;
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio::net::TcpStream;

/// the helper loop: accept one connection, read one request, answer it,
/// close. strictly serial; parallelism is many helper processes, not
/// threads. a malformed or broken connection is logged and dropped,
/// and the master retries.
pub fn run(game: &str, port: u16) -> anyhow::Result<()> {
    let mut service = Service::load(game);
    let mut cache = Cache::new(HELPER_CACHE_SIZE);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        log::info!("helper for {} listening on {}", game, port);
        loop {
            let (mut stream, peer) = listener.accept().await?;
            if let Err(e) = answer(&mut stream, &mut service, &mut cache).await {
                log::warn!("dropped request from {}: {}", peer, e);
            }
        }
    })
}

/// serve one request over one connection, consulting the response cache
pub async fn answer(
    stream: &mut TcpStream,
    service: &mut Service,
    cache: &mut Cache,
) -> std::io::Result<()> {
    let key = Bytes::from(protocol::read_frame(stream).await?);
    let payload = match cache.get(&key) {
        Some(hit) => {
            log::debug!("cache hit ({} bytes)", key.len());
            hit
        }
        None => {
            let request = protocol::decode::<Request>(&key)?;
            let response = service.serve(&request);
            let payload = protocol::encode(&response);
            cache.put(key, payload.clone());
            payload
        }
    };
    protocol::write_frame(stream, &payload).await
}
