use super::Request;
use super::Response;
use super::Service;
use super::protocol;
use crate::HELPER_RETRIES;
use bytes::Bytes;
use futures::future::join_all;
use std::time::Duration;
use tokio::net::TcpStream;

/// fans a batch of scoring work out to helper processes, or services it
/// in-process when none are configured. a batch does not return until
/// every request has a response, matched to its request by position;
/// helpers are free to finish in any order.
pub enum Dispatcher {
    /// no helpers: serve every request synchronously, in order
    Serial(Box<Service>),
    /// round-robin over helper endpoints
    Remote {
        runtime: tokio::runtime::Runtime,
        endpoints: Vec<String>,
    },
}

impl Dispatcher {
    pub fn serial(service: Service) -> Self {
        log::info!("dispatcher running serial, in-process");
        Self::Serial(Box::new(service))
    }

    pub fn remote(ports: &[u16]) -> Self {
        assert!(!ports.is_empty(), "remote dispatcher with no helpers");
        let endpoints = ports
            .iter()
            .map(|p| format!("127.0.0.1:{}", p))
            .collect::<Vec<String>>();
        log::info!("dispatcher fanning out to {:?}", endpoints);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("build dispatcher runtime");
        Self::Remote { runtime, endpoints }
    }

    pub fn dispatch(&mut self, requests: &[Request]) -> Vec<Response> {
        match self {
            Self::Serial(service) => requests.iter().map(|r| service.serve(r)).collect(),
            Self::Remote { runtime, endpoints } => {
                let endpoints: &[String] = endpoints;
                let payloads = requests.iter().map(protocol::encode).collect::<Vec<Bytes>>();
                runtime.block_on(join_all(
                    payloads
                        .iter()
                        .zip(requests.iter())
                        .enumerate()
                        .map(|(i, (payload, request))| exchange(endpoints, i, payload, request)),
                ))
            }
        }
    }
}

/// one request's lifecycle: try its assigned endpoint a few times (the
/// helper's response cache makes a retry cheap), then fall over to the
/// next endpoint. the round cannot complete until every request has a
/// response, so this never gives up.
async fn exchange(
    endpoints: &[String],
    index: usize,
    payload: &Bytes,
    request: &Request,
) -> Response {
    let mut slot = index;
    loop {
        let endpoint = &endpoints[slot % endpoints.len()];
        for _ in 0..HELPER_RETRIES {
            match attempt(endpoint, payload, request).await {
                Ok(response) => return response,
                Err(e) => {
                    log::warn!("helper {} failed: {}", endpoint, e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
        log::warn!("falling over from helper {}", endpoint);
        slot += 1;
    }
}

async fn attempt(
    endpoint: &str,
    payload: &Bytes,
    request: &Request,
) -> std::io::Result<Response> {
    let mut stream = TcpStream::connect(endpoint).await?;
    protocol::write_frame(&mut stream, payload).await?;
    let frame = protocol::read_frame(&mut stream).await?;
    let response = protocol::decode::<Response>(&frame)?;
    let matches = matches!(
        (request, &response),
        (Request::ScoreNexts { .. }, Response::ScoreNexts(_))
            | (Request::ImproveSegment { .. }, Response::ImproveSegment(_))
    );
    match matches {
        true => Ok(response),
        false => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "response kind does not match request",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HELPER_CACHE_SIZE;
    use crate::console::Emulator;
    use crate::console::Input;
    use crate::console::Sim;
    use crate::helper::Cache;
    use crate::helper::server;
    use crate::motifs::Motifs;
    use crate::objective::Objective;
    use crate::objective::Objectives;

    fn service(game: &str) -> Service {
        let mut objectives = Objectives::default();
        objectives.insert(Objective::new(vec![0x10, 0x11]), 1.0);
        let mut motifs = Motifs::default();
        motifs.add_inputs(&vec![Input::from(Input::RIGHT); 20], 0);
        Service::new(Emulator::new(Box::new(Sim::new(game))), objectives, motifs)
    }

    fn requests(game: &str) -> Vec<Request> {
        let state = Emulator::new(Box::new(Sim::new(game))).save();
        (0..4u8)
            .map(|i| Request::ScoreNexts {
                state: state.clone(),
                next: vec![Input::from(i | Input::RIGHT); 10],
                futures: vec![vec![Input::from(Input::RIGHT); 30], vec![Input::from(0); 30]],
            })
            .collect()
    }

    #[test]
    fn serial_matches_remote() {
        let game = "dispatch-equiv";
        let requests = requests(game);
        let serial = Dispatcher::serial(service(game)).dispatch(&requests);
        // one real helper over loopback
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let local = tokio::task::LocalSet::new();
        let remote = local.block_on(&runtime, async {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            let expected = requests.len();
            let helper = tokio::task::spawn_local(async move {
                let mut service = service(game);
                let mut cache = Cache::new(HELPER_CACHE_SIZE);
                for _ in 0..expected {
                    let (mut stream, _) = listener.accept().await.unwrap();
                    server::answer(&mut stream, &mut service, &mut cache).await.unwrap();
                }
            });
            let endpoints = vec![format!("127.0.0.1:{}", port)];
            let payloads = requests.iter().map(protocol::encode).collect::<Vec<Bytes>>();
            let responses = join_all(
                payloads
                    .iter()
                    .zip(requests.iter())
                    .enumerate()
                    .map(|(i, (payload, request))| exchange(&endpoints, i, payload, request)),
            )
            .await;
            helper.await.unwrap();
            responses
        });
        assert_eq!(serial, remote);
    }

    #[test]
    fn serial_dispatch_answers_in_order() {
        let game = "dispatch-order";
        let requests = requests(game);
        let mut dispatcher = Dispatcher::serial(service(game));
        let first = dispatcher.dispatch(&requests);
        let second = dispatcher.dispatch(&requests);
        assert_eq!(first.len(), requests.len());
        assert_eq!(first, second);
    }
}
