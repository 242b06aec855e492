use tracing::warn;

use crate::backend::QueryBackend;

use super::{PanelAction, PanelController, PanelMessage, PanelRejection, PanelTask};

/// Runs one task against `backend` and returns the message that reports its
/// completion. Failures are carried inside the message, never raised.
pub async fn perform<B>(backend: &B, task: PanelTask) -> PanelMessage
where
    B: QueryBackend + ?Sized,
{
    match task {
        PanelTask::Compile(ticket) => PanelMessage::CompileFinished {
            sequence: ticket.sequence,
            result: backend.compile(ticket.request).await,
        },
        PanelTask::Execute(ticket) => PanelMessage::ExecuteFinished {
            sequence: ticket.sequence,
            result: backend.execute(ticket.request).await,
        },
    }
}

/// Applies `action` and, when it produces a task, awaits the backend and
/// feeds the result back before returning.
pub async fn dispatch<B>(
    panel: &mut PanelController,
    backend: &B,
    action: PanelAction,
) -> Result<(), PanelRejection>
where
    B: QueryBackend + ?Sized,
{
    let Some(task) = panel.update(action)? else {
        return Ok(());
    };
    let finished = perform(backend, task).await;
    panel.update(finished)?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedAction {
    pub index: usize,
    pub rejection: PanelRejection,
}

/// Replays a recorded session in order. Rejected actions leave the panel
/// untouched and are reported back instead of aborting the replay.
pub async fn replay<B>(
    panel: &mut PanelController,
    backend: &B,
    actions: Vec<PanelAction>,
) -> Vec<RejectedAction>
where
    B: QueryBackend + ?Sized,
{
    let mut rejected = Vec::new();
    for (index, action) in actions.into_iter().enumerate() {
        if let Err(rejection) = dispatch(panel, backend, action).await {
            warn!(index, %rejection, "session action rejected");
            rejected.push(RejectedAction { index, rejection });
        }
    }
    rejected
}

/// Replays a session without a backend. Compile and execute tasks are
/// dropped, so only the selection side of the panel advances.
pub fn replay_offline(
    panel: &mut PanelController,
    actions: Vec<PanelAction>,
) -> Vec<RejectedAction> {
    let mut rejected = Vec::new();
    for (index, action) in actions.into_iter().enumerate() {
        if let Err(rejection) = panel.update(action) {
            warn!(index, %rejection, "session action rejected");
            rejected.push(RejectedAction { index, rejection });
        }
    }
    rejected
}
