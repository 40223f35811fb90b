use crate::domain::model::CommandBatch;
use crate::domain::ports::GeometrySession;
use crate::utils::error::{Result, TranslateError};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorState {
    Idle,
    Pending { total: usize },
    Applying { index: usize, total: usize },
    Succeeded { applied: usize },
    Failed { index: usize, command: String },
}

/// 最近一次完整套用成功的批次
#[derive(Debug, Clone)]
pub struct AppliedBatch {
    pub commands: CommandBatch,
    pub applied_at: DateTime<Utc>,
}

/// 依序將指令套用到幾何工作階段，遇到第一個失敗即停止。
///
/// 已套用的指令不會回滾；失敗後的建構狀態就是引擎當下的狀態。
#[derive(Debug)]
pub struct CommandExecutor {
    state: ExecutorState,
    last_applied: Option<AppliedBatch>,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self {
            state: ExecutorState::Idle,
            last_applied: None,
        }
    }

    pub fn state(&self) -> &ExecutorState {
        &self.state
    }

    pub fn last_applied(&self) -> Option<&AppliedBatch> {
        self.last_applied.as_ref()
    }

    pub fn apply<S>(&mut self, session: &mut S, batch: &CommandBatch) -> Result<usize>
    where
        S: GeometrySession + ?Sized,
    {
        if !session.is_ready() {
            return Err(TranslateError::SessionNotReady);
        }
        if batch.is_empty() {
            return Err(TranslateError::EmptyBatch);
        }

        let total = batch.len();
        self.state = ExecutorState::Pending { total };
        tracing::debug!("Applying batch of {} commands", total);

        for (index, command) in batch.iter().enumerate() {
            self.state = ExecutorState::Applying { index, total };

            if !session.evaluate(command) {
                tracing::warn!(
                    "Command {}/{} rejected by geometry engine: {}",
                    index + 1,
                    total,
                    command
                );
                self.state = ExecutorState::Failed {
                    index,
                    command: command.to_string(),
                };
                return Err(TranslateError::CommandRejected {
                    index,
                    command: command.to_string(),
                });
            }
        }

        self.state = ExecutorState::Succeeded { applied: total };
        self.last_applied = Some(AppliedBatch {
            commands: batch.clone(),
            applied_at: Utc::now(),
        });
        tracing::info!("✅ Applied {} commands", total);
        Ok(total)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 記錄每一條嘗試過的指令；可指定某條指令失敗
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSession {
        pub ready: bool,
        pub fail_on: Option<String>,
        pub attempted: Vec<String>,
    }

    impl RecordingSession {
        pub fn ready() -> Self {
            Self {
                ready: true,
                ..Self::default()
            }
        }

        pub fn failing_on(command: &str) -> Self {
            Self {
                ready: true,
                fail_on: Some(command.to_string()),
                ..Self::default()
            }
        }
    }

    impl GeometrySession for RecordingSession {
        fn is_ready(&self) -> bool {
            self.ready
        }

        fn evaluate(&mut self, command: &str) -> bool {
            self.attempted.push(command.to_string());
            self.fail_on.as_deref() != Some(command)
        }
    }

    fn batch(lines: &[&str]) -> CommandBatch {
        CommandBatch::sanitized(lines)
    }

    #[test]
    fn test_applies_all_commands_in_order() {
        let mut session = RecordingSession::ready();
        let mut executor = CommandExecutor::new();
        let commands = batch(&["A = (0, 0)", "B = (3, 4)", "Segment(A, B)"]);

        let applied = executor.apply(&mut session, &commands).unwrap();

        assert_eq!(applied, 3);
        assert_eq!(session.attempted, commands.as_slice());
        assert_eq!(executor.state(), &ExecutorState::Succeeded { applied: 3 });
        assert_eq!(executor.last_applied().unwrap().commands, commands);
    }

    #[test]
    fn test_stops_at_first_failure_without_rollback() {
        let mut session = RecordingSession::failing_on("Circle(A, B, C, D)");
        let mut executor = CommandExecutor::new();
        let commands = batch(&["A = (0, 0)", "Circle(A, B, C, D)", "B = (1, 1)"]);

        let err = executor.apply(&mut session, &commands).unwrap_err();

        assert_eq!(session.attempted, vec!["A = (0, 0)", "Circle(A, B, C, D)"]);
        match err {
            TranslateError::CommandRejected { index, command } => {
                assert_eq!(index, 1);
                assert_eq!(command, "Circle(A, B, C, D)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            executor.state(),
            &ExecutorState::Failed {
                index: 1,
                command: "Circle(A, B, C, D)".to_string()
            }
        );
        assert!(executor.last_applied().is_none());
    }

    #[test]
    fn test_failed_batch_keeps_previous_record() {
        let mut session = RecordingSession::failing_on("bad");
        let mut executor = CommandExecutor::new();
        executor.apply(&mut session, &batch(&["A = (1, 1)"])).unwrap();

        assert!(executor.apply(&mut session, &batch(&["bad"])).is_err());

        assert_eq!(
            executor.last_applied().unwrap().commands.as_slice(),
            ["A = (1, 1)"]
        );
    }

    #[test]
    fn test_requires_ready_session() {
        let mut session = RecordingSession::default();
        let mut executor = CommandExecutor::new();

        let err = executor.apply(&mut session, &batch(&["A = (0, 0)"])).unwrap_err();

        assert!(matches!(err, TranslateError::SessionNotReady));
        assert!(session.attempted.is_empty());
        assert_eq!(executor.state(), &ExecutorState::Idle);
    }

    #[test]
    fn test_rejects_empty_batch() {
        let mut session = RecordingSession::ready();
        let mut executor = CommandExecutor::new();

        let err = executor.apply(&mut session, &CommandBatch::default()).unwrap_err();

        assert!(matches!(err, TranslateError::EmptyBatch));
    }
}
