//! Messages exchanged with the render and data workers.
//!
//! Every message is a `{ "type": ..., ...payload }` object. Queries carry a
//! `requestId` (monotonic per query kind) and the specification `generation`
//! they were issued against; workers echo both so the coordinator can drop
//! superseded responses.

use serde::{Deserialize, Serialize};

use crate::core::{CanvasSize, DataPoint, PixelScale, ViewportSnapshot};
use crate::spec::Specification;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderMessage {
    Init { size: CanvasSize },
    Resize { width: u32, height: u32 },
    Specification { specification: Box<Specification> },
    Viewport { viewport: ViewportSnapshot },
    Highlight { indices: Vec<usize> },
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderEvent {
    Tick { frame: u64, instances: usize },
    Failed { message: String },
}

/// Query kinds that expect a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryKind {
    GetClosestPoint,
    GetClickPoint,
    SelectBox,
    SelectLasso,
}

impl QueryKind {
    pub const ALL: [QueryKind; 4] = [
        QueryKind::GetClosestPoint,
        QueryKind::GetClickPoint,
        QueryKind::SelectBox,
        QueryKind::SelectLasso,
    ];

    #[must_use]
    pub(crate) fn slot(self) -> usize {
        match self {
            Self::GetClosestPoint => 0,
            Self::GetClickPoint => 1,
            Self::SelectBox => 2,
            Self::SelectLasso => 3,
        }
    }
}

/// Query payload before it is stamped with a request id.
///
/// Point queries carry the view's [`PixelScale`] so the worker measures
/// distance on screen, where `tolerance_px` applies.
#[derive(Debug, Clone, PartialEq)]
pub enum DataQuery {
    ClosestPoint {
        point: DataPoint,
        scale: PixelScale,
        tolerance_px: f64,
    },
    ClickPoint {
        point: DataPoint,
        scale: PixelScale,
        tolerance_px: f64,
    },
    SelectBox { bounds: [f64; 4] },
    SelectLasso { polygon: Vec<f64> },
}

impl DataQuery {
    #[must_use]
    pub fn kind(&self) -> QueryKind {
        match self {
            Self::ClosestPoint { .. } => QueryKind::GetClosestPoint,
            Self::ClickPoint { .. } => QueryKind::GetClickPoint,
            Self::SelectBox { .. } => QueryKind::SelectBox,
            Self::SelectLasso { .. } => QueryKind::SelectLasso,
        }
    }

    pub(crate) fn into_request(self, request_id: u64, generation: u64) -> DataRequest {
        match self {
            Self::ClosestPoint {
                point,
                scale,
                tolerance_px,
            } => DataRequest::GetClosestPoint {
                request_id,
                generation,
                point,
                scale,
                tolerance_px,
            },
            Self::ClickPoint {
                point,
                scale,
                tolerance_px,
            } => DataRequest::GetClickPoint {
                request_id,
                generation,
                point,
                scale,
                tolerance_px,
            },
            Self::SelectBox { bounds } => DataRequest::SelectBox {
                request_id,
                generation,
                bounds,
            },
            Self::SelectLasso { polygon } => DataRequest::SelectLasso {
                request_id,
                generation,
                polygon,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DataRequest {
    Init {
        generation: u64,
        points: Vec<DataPoint>,
    },
    GetClosestPoint {
        request_id: u64,
        generation: u64,
        point: DataPoint,
        scale: PixelScale,
        tolerance_px: f64,
    },
    GetClickPoint {
        request_id: u64,
        generation: u64,
        point: DataPoint,
        scale: PixelScale,
        tolerance_px: f64,
    },
    SelectBox {
        request_id: u64,
        generation: u64,
        bounds: [f64; 4],
    },
    SelectLasso {
        request_id: u64,
        generation: u64,
        polygon: Vec<f64>,
    },
    Shutdown,
}

/// Nearest resident point to a query position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosestPoint {
    pub index: usize,
    pub point: DataPoint,
    /// On-screen distance to the query position, in pixels.
    pub distance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DataResponse {
    GetClosestPoint {
        request_id: u64,
        generation: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        closest_point: Option<ClosestPoint>,
    },
    GetClickPoint {
        request_id: u64,
        generation: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        closest_point: Option<ClosestPoint>,
    },
    SelectBox {
        request_id: u64,
        generation: u64,
        selection: SelectionResult,
    },
    SelectLasso {
        request_id: u64,
        generation: u64,
        selection: SelectionResult,
    },
    Failed {
        message: String,
    },
}

impl DataResponse {
    /// Kind, request id and generation of a query response; `None` for failures.
    #[must_use]
    pub fn correlation(&self) -> Option<(QueryKind, u64, u64)> {
        match self {
            Self::GetClosestPoint {
                request_id,
                generation,
                ..
            } => Some((QueryKind::GetClosestPoint, *request_id, *generation)),
            Self::GetClickPoint {
                request_id,
                generation,
                ..
            } => Some((QueryKind::GetClickPoint, *request_id, *generation)),
            Self::SelectBox {
                request_id,
                generation,
                ..
            } => Some((QueryKind::SelectBox, *request_id, *generation)),
            Self::SelectLasso {
                request_id,
                generation,
                ..
            } => Some((QueryKind::SelectLasso, *request_id, *generation)),
            Self::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ClosestPoint, DataQuery, DataRequest, DataResponse, QueryKind, RenderEvent};
    use crate::core::{DataPoint, PixelScale};

    #[test]
    fn hover_request_carries_per_axis_scale() {
        let request = DataRequest::GetClosestPoint {
            request_id: 4,
            generation: 2,
            point: DataPoint::new(500.0, 0.5),
            scale: PixelScale::new(0.5, 500.0),
            tolerance_px: 5.0,
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["scale"], serde_json::json!({"x": 0.5, "y": 500.0}));
        assert_eq!(json["tolerancePx"], serde_json::json!(5.0));
    }

    #[test]
    fn missing_closest_point_is_omitted_from_json() {
        let response = DataResponse::GetClosestPoint {
            request_id: 3,
            generation: 1,
            closest_point: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"type": "getClosestPoint", "requestId": 3, "generation": 1})
        );
    }

    #[test]
    fn selection_response_parses_from_worker_json() {
        let response: DataResponse = serde_json::from_value(serde_json::json!({
            "type": "selectLasso",
            "requestId": 7,
            "generation": 2,
            "selection": {"indices": [1, 4]}
        }))
        .expect("parse");
        assert_eq!(response.correlation(), Some((QueryKind::SelectLasso, 7, 2)));
    }

    #[test]
    fn click_point_round_trips_with_payload() {
        let response = DataResponse::GetClickPoint {
            request_id: 1,
            generation: 1,
            closest_point: Some(ClosestPoint {
                index: 2,
                point: DataPoint::new(1.0, 2.0),
                distance: 0.5,
            }),
        };
        let json = serde_json::to_string(&response).expect("serialize");
        assert!(json.contains("\"closestPoint\""));
        let back: DataResponse = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, response);
    }

    #[test]
    fn query_kind_matches_request_type() {
        let request = DataQuery::SelectBox {
            bounds: [0.0, 0.0, 1.0, 1.0],
        }
        .into_request(4, 9);
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["type"], "selectBox");
        assert_eq!(json["requestId"], 4);
    }

    #[test]
    fn render_tick_uses_type_tag() {
        let json = serde_json::to_value(RenderEvent::Tick {
            frame: 2,
            instances: 10,
        })
        .expect("serialize");
        assert_eq!(json["type"], "tick");
    }
}
