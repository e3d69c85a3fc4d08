use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::VizResult;
use crate::interaction::SelectionKind;
use crate::render::OverlaySink;
use crate::spec::SpecificationValidator;
use crate::worker::{DataResponse, QueryKind, RenderEvent, SelectionResult};

use super::{Visualization, VizEvent};

impl<S: OverlaySink, V: SpecificationValidator> Visualization<S, V> {
    /// Drains both workers without blocking and dispatches the resulting events.
    ///
    /// Returns the number of events dispatched. A worker failure poisons the
    /// visualization and is returned as [`VizError::WorkerFailed`](crate::VizError).
    pub fn poll_workers(&mut self) -> VizResult<usize> {
        self.ensure_usable()?;
        let mut dispatched = 0;

        let ticks = self.render.poll();
        for event in self.poison_on_failure(ticks)? {
            if let RenderEvent::Tick { frame, instances } = event {
                dispatched += self.events.dispatch(&VizEvent::FrameRendered { frame, instances });
            }
        }

        let responses = self.data.poll();
        for response in self.poison_on_failure(responses)? {
            dispatched += self.handle_data_response(response)?;
        }
        Ok(dispatched)
    }

    /// Waits up to `timeout` for every outstanding data query to be answered,
    /// then drains both workers.
    pub fn flush(&mut self, timeout: Duration) -> VizResult<usize> {
        self.ensure_usable()?;
        let deadline = Instant::now() + timeout;
        let mut dispatched = 0;

        while self.data.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                debug!(in_flight = self.data.in_flight(), "flush timed out");
                break;
            }
            let received = self.data.recv_timeout(remaining);
            match self.poison_on_failure(received)? {
                Some(response) => dispatched += self.handle_data_response(response)?,
                None => break,
            }
        }

        dispatched += self.poll_workers()?;
        Ok(dispatched)
    }

    fn is_current(&self, kind: QueryKind, request_id: u64, generation: u64) -> bool {
        if !self.data.is_latest(kind, request_id) {
            return false;
        }
        !self.config.fence_stale_responses || generation == self.generation
    }

    fn handle_data_response(&mut self, response: DataResponse) -> VizResult<usize> {
        let Some((kind, request_id, generation)) = response.correlation() else {
            return Ok(0);
        };
        if !self.is_current(kind, request_id, generation) {
            trace!(?kind, request_id, generation, "dropping stale response");
            return Ok(0);
        }

        match response {
            DataResponse::GetClosestPoint { closest_point, .. } => Ok(closest_point
                .map_or(0, |closest| self.events.dispatch(&VizEvent::PointHovered(closest)))),
            DataResponse::GetClickPoint { closest_point, .. } => {
                let Some(closest) = closest_point else {
                    return Ok(0);
                };
                if self.config.highlight_on_click {
                    self.highlights.toggle(closest.index);
                    self.push_highlights()?;
                }
                Ok(self.events.dispatch(&VizEvent::PointClicked(closest)))
            }
            DataResponse::SelectBox { selection, .. } => {
                self.finish_selection(SelectionKind::Box, selection)
            }
            DataResponse::SelectLasso { selection, .. } => {
                self.finish_selection(SelectionKind::Lasso, selection)
            }
            DataResponse::Failed { .. } => Ok(0),
        }
    }

    fn finish_selection(
        &mut self,
        kind: SelectionKind,
        selection: SelectionResult,
    ) -> VizResult<usize> {
        debug!(?kind, selected = selection.indices.len(), "selection resolved");
        if self.config.highlight_on_select {
            self.highlights.replace_with(selection.indices.iter().copied());
            self.push_highlights()?;
        }
        Ok(self
            .events
            .dispatch(&VizEvent::OnSelectionEnd { kind, selection }))
    }
}
