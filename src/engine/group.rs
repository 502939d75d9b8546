use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};

use super::result::TaskResult;

/// One outcome per task in a group; join faults (panics, aborts) surface as
/// error strings rather than aborting the group.
pub type TaskOutcome = Result<TaskResult, String>;

enum GroupTasks {
    Running(Vec<JoinHandle<TaskResult>>),
    Drained(Vec<TaskOutcome>),
}

/// Handles for the tasks spawned by one `start` call.
///
/// Abort handles live outside the join mutex so cancellation and
/// completion checks never wait behind a caller that is joining the group.
pub(crate) struct TaskGroup {
    aborts: Vec<AbortHandle>,
    tasks: Mutex<GroupTasks>,
}

impl TaskGroup {
    pub(crate) fn new(handles: Vec<JoinHandle<TaskResult>>) -> Self {
        let aborts = handles.iter().map(|handle| handle.abort_handle()).collect();
        Self {
            aborts,
            tasks: Mutex::new(GroupTasks::Running(handles)),
        }
    }

    /// True once every task reached a terminal state or was aborted.
    pub(crate) fn all_finished(&self) -> bool {
        self.aborts.iter().all(|abort| abort.is_finished())
    }

    /// Best-effort cancellation of every unfinished task.
    pub(crate) fn cancel(&self) {
        for abort in &self.aborts {
            if !abort.is_finished() {
                abort.abort();
            }
        }
    }

    /// Wait for every task and return the outcomes. Later calls return the
    /// cached outcomes without re-joining.
    pub(crate) async fn join_all(&self) -> Vec<TaskOutcome> {
        let mut tasks = self.tasks.lock().await;
        let outcomes = match std::mem::replace(&mut *tasks, GroupTasks::Drained(Vec::new())) {
            GroupTasks::Running(handles) => futures::future::join_all(handles)
                .await
                .into_iter()
                .map(|joined| {
                    joined.map_err(|e| {
                        if e.is_cancelled() {
                            "task cancelled".to_string()
                        } else {
                            format!("task panicked: {}", e)
                        }
                    })
                })
                .collect(),
            GroupTasks::Drained(outcomes) => outcomes,
        };
        *tasks = GroupTasks::Drained(outcomes.clone());
        outcomes
    }
}
