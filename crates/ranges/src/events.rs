use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::RangeId;

/// Notifications emitted while ranges are moved. Body drags emit `Moving`
/// per update between `MoveStarted` and `Moved`; edge drags emit only the
/// start and end of the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RangeEvent {
    MoveStarted { id: RangeId },
    Moving { id: RangeId },
    Moved { id: RangeId },
}

impl RangeEvent {
    pub fn id(&self) -> RangeId {
        match self {
            Self::MoveStarted { id } | Self::Moving { id } | Self::Moved { id } => *id,
        }
    }
}

pub(crate) fn event_channel() -> (Sender<RangeEvent>, Receiver<RangeEvent>) {
    unbounded()
}
