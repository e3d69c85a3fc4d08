use crate::error::VizResult;
use crate::render::{OverlayFrame, OverlaySink};

/// No-op overlay sink used by tests and headless hosts.
///
/// It still validates frame content and keeps the last frame so tests can
/// inspect projected ticks, labels and selection outlines.
#[derive(Debug, Default)]
pub struct NullOverlaySink {
    pub frames_drawn: usize,
    pub last_frame: Option<OverlayFrame>,
}

impl OverlaySink for NullOverlaySink {
    fn draw(&mut self, frame: &OverlayFrame) -> VizResult<()> {
        frame.validate()?;
        self.frames_drawn += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}
