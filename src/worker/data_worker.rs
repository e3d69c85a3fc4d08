use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, trace, warn};

use crate::core::DataPoint;
use crate::error::{VizError, VizResult};

use super::point_index::PointIndex;
use super::protocol::{DataQuery, DataRequest, DataResponse, QueryKind, SelectionResult};

const WORKER_NAME: &str = "data";

/// Coordinator-side handle to the data worker thread.
///
/// Every submitted query is stamped with the next request id for its kind;
/// [`is_latest`](Self::is_latest) tells whether a response still answers the
/// most recent question of that kind.
#[derive(Debug)]
pub struct DataWorkerBridge {
    sender: Sender<DataRequest>,
    responses: Receiver<DataResponse>,
    handle: Option<JoinHandle<()>>,
    latest_ids: [u64; QueryKind::ALL.len()],
    in_flight: usize,
}

impl DataWorkerBridge {
    pub fn spawn() -> VizResult<Self> {
        let (sender, inbox) = crossbeam_channel::unbounded();
        let (outbox, responses) = crossbeam_channel::unbounded();

        let handle = thread::Builder::new()
            .name("matrix-viz-data".to_owned())
            .spawn(move || DataWorker::new(outbox).run(&inbox))
            .map_err(|e| VizError::worker(WORKER_NAME, format!("failed to spawn thread: {e}")))?;

        Ok(Self {
            sender,
            responses,
            handle: Some(handle),
            latest_ids: [0; QueryKind::ALL.len()],
            in_flight: 0,
        })
    }

    /// Replaces the resident point set.
    pub fn load_points(&self, points: Vec<DataPoint>, generation: u64) -> VizResult<()> {
        self.send(DataRequest::Init { generation, points })
    }

    /// Sends `query` and returns the request id it was stamped with.
    pub fn submit(&mut self, query: DataQuery, generation: u64) -> VizResult<u64> {
        let slot = query.kind().slot();
        let request_id = self.latest_ids[slot] + 1;
        self.send(query.into_request(request_id, generation))?;
        self.latest_ids[slot] = request_id;
        self.in_flight += 1;
        Ok(request_id)
    }

    #[must_use]
    pub fn is_latest(&self, kind: QueryKind, request_id: u64) -> bool {
        self.latest_ids[kind.slot()] == request_id
    }

    /// Number of queries of `kind` issued so far.
    #[must_use]
    pub fn requests_sent(&self, kind: QueryKind) -> u64 {
        self.latest_ids[kind.slot()]
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Drains pending responses without blocking.
    pub fn poll(&mut self) -> VizResult<Vec<DataResponse>> {
        let mut drained = Vec::new();
        loop {
            match self.responses.try_recv() {
                Ok(response) => drained.push(self.accept(response)?),
                Err(TryRecvError::Empty) => return Ok(drained),
                Err(TryRecvError::Disconnected) => {
                    return Err(VizError::worker(WORKER_NAME, "worker exited unexpectedly"));
                }
            }
        }
    }

    /// Waits up to `timeout` for the next response.
    pub fn recv_timeout(&mut self, timeout: Duration) -> VizResult<Option<DataResponse>> {
        match self.responses.recv_timeout(timeout) {
            Ok(response) => self.accept(response).map(Some),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(VizError::worker(WORKER_NAME, "worker exited unexpectedly"))
            }
        }
    }

    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.sender.send(DataRequest::Shutdown);
        if handle.join().is_err() {
            warn!("data worker panicked before shutdown");
        }
    }

    fn send(&self, request: DataRequest) -> VizResult<()> {
        self.sender
            .send(request)
            .map_err(|_| VizError::worker(WORKER_NAME, "worker channel closed"))
    }

    fn accept(&mut self, response: DataResponse) -> VizResult<DataResponse> {
        if let DataResponse::Failed { message } = response {
            return Err(VizError::worker(WORKER_NAME, message));
        }
        self.in_flight = self.in_flight.saturating_sub(1);
        Ok(response)
    }
}

impl Drop for DataWorkerBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct DataWorker {
    outbox: Sender<DataResponse>,
    index: PointIndex,
    generation: u64,
}

impl DataWorker {
    fn new(outbox: Sender<DataResponse>) -> Self {
        Self {
            outbox,
            index: PointIndex::build(Vec::new()),
            generation: 0,
        }
    }

    fn run(mut self, inbox: &Receiver<DataRequest>) {
        for request in inbox {
            let response = match request {
                DataRequest::Shutdown => break,
                DataRequest::Init { generation, points } => {
                    self.index = PointIndex::build(points);
                    self.generation = generation;
                    debug!(generation, points = self.index.len(), "data worker indexed points");
                    continue;
                }
                query => self.answer(query),
            };
            let Some(response) = response else {
                continue;
            };
            if self.outbox.send(response).is_err() {
                break;
            }
        }
        debug!(generation = self.generation, "data worker exited");
    }

    fn answer(&self, request: DataRequest) -> Option<DataResponse> {
        trace!(?request, "data worker query");
        let response = match request {
            DataRequest::GetClosestPoint {
                request_id,
                generation,
                point,
                scale,
                tolerance_px,
            } => DataResponse::GetClosestPoint {
                request_id,
                generation,
                closest_point: self.index.closest(point, scale, tolerance_px),
            },
            DataRequest::GetClickPoint {
                request_id,
                generation,
                point,
                scale,
                tolerance_px,
            } => DataResponse::GetClickPoint {
                request_id,
                generation,
                closest_point: self.index.closest(point, scale, tolerance_px),
            },
            DataRequest::SelectBox {
                request_id,
                generation,
                bounds,
            } => DataResponse::SelectBox {
                request_id,
                generation,
                selection: SelectionResult {
                    indices: self.index.select_box(bounds),
                },
            },
            DataRequest::SelectLasso {
                request_id,
                generation,
                polygon,
            } => {
                if polygon.len() % 2 != 0 {
                    return Some(DataResponse::Failed {
                        message: format!(
                            "lasso polygon has odd coordinate count {}",
                            polygon.len()
                        ),
                    });
                }
                DataResponse::SelectLasso {
                    request_id,
                    generation,
                    selection: SelectionResult {
                        indices: self.index.select_lasso(&polygon),
                    },
                }
            }
            DataRequest::Init { .. } | DataRequest::Shutdown => return None,
        };
        Some(response)
    }
}
