use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Lifecycle status of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Lobby is open; players join, nothing has started.
    Waiting,
    /// A question is live and accepting answers.
    Active,
    /// Gameplay is suspended, either manually or because results are shown.
    Paused,
    /// The quiz ran out of questions or the host ended it.
    Finished,
    /// A full restart was signalled; the session is about to be replaced.
    Restarting,
}

/// Host-issued commands that drive the session lifecycle.
///
/// `advanceQuestion` maps to either [`SessionCommand::NextQuestion`] or
/// [`SessionCommand::FinishQuiz`] depending on whether a next question
/// exists; the service layer makes that call because the machine itself does
/// not know the question count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Open the first question from the lobby.
    Start,
    /// Move to the next question.
    NextQuestion,
    /// Advance past the last question into the final standings.
    FinishQuiz,
    /// Suspend the countdown manually.
    Pause,
    /// Resume a paused question with its remaining time.
    Resume,
    /// Show per-question results; blocks further answers.
    RevealResults,
    /// Show the intermediate leaderboard.
    RevealLeaderboard,
    /// Force the session to finished.
    End,
    /// Soft restart: scores and answers reset, players stay attached.
    Restart,
    /// Hard restart: signal clients, then replace the session entirely.
    FullRestart,
    /// Internal: the replacement session is in place after a full restart.
    ResetComplete,
}

/// Error returned when a command cannot be applied in the current status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {command:?} cannot be applied while {from:?}")]
pub struct InvalidTransition {
    /// Status the session was in when the command arrived.
    pub from: SessionStatus,
    /// The rejected command.
    pub command: SessionCommand,
}

/// Lifecycle state machine owned by each [`Session`](super::session::Session).
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    status: SessionStatus,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self {
            status: SessionStatus::Waiting,
        }
    }
}

impl SessionStateMachine {
    /// Fresh machine in the waiting (lobby) status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Apply `command`, returning the new status or rejecting the transition.
    pub fn apply(&mut self, command: SessionCommand) -> Result<SessionStatus, InvalidTransition> {
        let next = self.compute_transition(command)?;
        self.status = next;
        Ok(next)
    }

    /// Compute the status `command` would lead to without mutating anything.
    fn compute_transition(
        &self,
        command: SessionCommand,
    ) -> Result<SessionStatus, InvalidTransition> {
        use SessionCommand as Cmd;
        use SessionStatus as St;

        // Nothing but a restart is valid once the session has finished.
        let next = match (self.status, command) {
            (St::Waiting, Cmd::Start) => St::Active,
            (St::Active | St::Paused, Cmd::NextQuestion) => St::Active,
            (St::Active | St::Paused, Cmd::FinishQuiz) => St::Finished,
            (St::Active, Cmd::Pause) => St::Paused,
            (St::Paused, Cmd::Resume) => St::Active,
            (St::Active | St::Paused, Cmd::RevealResults) => St::Paused,
            (St::Active | St::Paused, Cmd::RevealLeaderboard) => St::Paused,
            (St::Active | St::Paused, Cmd::End) => St::Finished,
            (St::Active | St::Paused | St::Finished, Cmd::Restart) => St::Waiting,
            (St::Waiting | St::Active | St::Paused | St::Finished, Cmd::FullRestart) => {
                St::Restarting
            }
            (St::Restarting, Cmd::ResetComplete) => St::Waiting,
            (from, command) => return Err(InvalidTransition { from, command }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(sm: &mut SessionStateMachine, command: SessionCommand) -> SessionStatus {
        sm.apply(command).unwrap()
    }

    #[test]
    fn initial_status_is_waiting() {
        assert_eq!(SessionStateMachine::new().status(), SessionStatus::Waiting);
    }

    #[test]
    fn full_happy_path_through_a_quiz() {
        let mut sm = SessionStateMachine::new();

        assert_eq!(apply(&mut sm, SessionCommand::Start), SessionStatus::Active);
        assert_eq!(apply(&mut sm, SessionCommand::Pause), SessionStatus::Paused);
        assert_eq!(apply(&mut sm, SessionCommand::Resume), SessionStatus::Active);
        assert_eq!(
            apply(&mut sm, SessionCommand::RevealResults),
            SessionStatus::Paused
        );
        assert_eq!(
            apply(&mut sm, SessionCommand::RevealLeaderboard),
            SessionStatus::Paused
        );
        assert_eq!(
            apply(&mut sm, SessionCommand::NextQuestion),
            SessionStatus::Active
        );
        assert_eq!(
            apply(&mut sm, SessionCommand::FinishQuiz),
            SessionStatus::Finished
        );
        assert_eq!(
            apply(&mut sm, SessionCommand::Restart),
            SessionStatus::Waiting
        );
    }

    #[test]
    fn cannot_start_twice() {
        let mut sm = SessionStateMachine::new();
        apply(&mut sm, SessionCommand::Start);
        let err = sm.apply(SessionCommand::Start).unwrap_err();
        assert_eq!(err.from, SessionStatus::Active);
        assert_eq!(err.command, SessionCommand::Start);
    }

    #[test]
    fn cannot_resume_while_active() {
        let mut sm = SessionStateMachine::new();
        apply(&mut sm, SessionCommand::Start);
        assert!(sm.apply(SessionCommand::Resume).is_err());
    }

    #[test]
    fn finished_only_accepts_restarts() {
        let mut sm = SessionStateMachine::new();
        apply(&mut sm, SessionCommand::Start);
        apply(&mut sm, SessionCommand::End);
        assert_eq!(sm.status(), SessionStatus::Finished);

        assert!(sm.apply(SessionCommand::NextQuestion).is_err());
        assert!(sm.apply(SessionCommand::Pause).is_err());
        assert!(sm.apply(SessionCommand::RevealResults).is_err());
        assert!(sm.apply(SessionCommand::End).is_err());

        assert_eq!(
            sm.apply(SessionCommand::Restart).unwrap(),
            SessionStatus::Waiting
        );
    }

    #[test]
    fn full_restart_passes_through_restarting() {
        let mut sm = SessionStateMachine::new();
        apply(&mut sm, SessionCommand::Start);
        assert_eq!(
            apply(&mut sm, SessionCommand::FullRestart),
            SessionStatus::Restarting
        );
        // Only the internal reset completes the cycle.
        assert!(sm.apply(SessionCommand::Start).is_err());
        assert_eq!(
            apply(&mut sm, SessionCommand::ResetComplete),
            SessionStatus::Waiting
        );
    }

    #[test]
    fn commands_are_rejected_in_the_lobby() {
        let mut sm = SessionStateMachine::new();
        assert!(sm.apply(SessionCommand::Pause).is_err());
        assert!(sm.apply(SessionCommand::NextQuestion).is_err());
        assert!(sm.apply(SessionCommand::End).is_err());
        assert!(sm.apply(SessionCommand::Restart).is_err());
    }
}
