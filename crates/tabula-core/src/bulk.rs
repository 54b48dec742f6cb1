// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use std::fmt;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

use crate::{RequestId, RowId};

/// Selections above this size are expected to be processed in chunks.
pub const LARGE_SELECTION_THRESHOLD: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionVariant {
    #[default]
    Default,
    Destructive,
    Outline,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Select,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub kind: InputKind,
    pub placeholder: Option<String>,
    pub options: Vec<String>,
}

impl InputSpec {
    pub fn text(placeholder: &str) -> Self {
        Self {
            kind: InputKind::Text,
            placeholder: Some(placeholder.to_owned()),
            options: Vec::new(),
        }
    }

    pub fn select<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: InputKind::Select,
            placeholder: None,
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn date() -> Self {
        Self {
            kind: InputKind::Date,
            placeholder: Some("YYYY-MM-DD".to_owned()),
            options: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkAction {
    pub id: String,
    pub label: String,
    pub variant: ActionVariant,
    /// Confirmation prompt; `Some` gates execution behind a confirm dialog.
    pub confirmation: Option<String>,
    /// Input prompt; takes precedence over `confirmation`.
    pub input: Option<InputSpec>,
    pub icon: Option<String>,
}

impl BulkAction {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_owned(),
            label: label.to_owned(),
            variant: ActionVariant::Default,
            confirmation: None,
            input: None,
            icon: None,
        }
    }

    pub fn with_variant(mut self, variant: ActionVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_confirmation(mut self, message: &str) -> Self {
        self.confirmation = Some(message.to_owned());
        self
    }

    pub fn with_input(mut self, input: InputSpec) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_owned());
        self
    }

    pub fn requires_confirmation(&self) -> bool {
        self.confirmation.is_some()
    }

    pub fn requires_input(&self) -> bool {
        self.input.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionCatalog {
    actions: Vec<BulkAction>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// export, batch-update, print and delete.
    pub fn with_builtins() -> Self {
        Self {
            actions: vec![
                BulkAction::new("export", "Export").with_icon("download"),
                BulkAction::new("batch-update", "Batch update")
                    .with_variant(ActionVariant::Secondary)
                    .with_input(InputSpec::text("New value"))
                    .with_icon("edit"),
                BulkAction::new("print", "Print")
                    .with_variant(ActionVariant::Outline)
                    .with_icon("printer"),
                BulkAction::new("delete", "Delete")
                    .with_variant(ActionVariant::Destructive)
                    .with_confirmation("Delete the selected rows? This cannot be undone.")
                    .with_icon("trash"),
            ],
        }
    }

    pub fn push(&mut self, action: BulkAction) -> Result<()> {
        if action.id.trim().is_empty() {
            bail!("bulk action id cannot be empty");
        }
        if self.get(&action.id).is_some() {
            bail!(
                "bulk action `{}` is already registered -- pick a different id",
                action.id
            );
        }
        self.actions.push(action);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&BulkAction> {
        self.actions.iter().find(|action| action.id == id)
    }

    pub fn actions(&self) -> &[BulkAction] {
        &self.actions
    }
}

/// Work handed to the host while the orchestrator is `Executing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub id: RequestId,
    pub action_id: String,
    pub selected: Vec<RowId>,
    pub input: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrchestratorState {
    #[default]
    Idle,
    ConfirmPending {
        action_id: String,
    },
    InputPending {
        action_id: String,
        value: String,
    },
    Executing {
        request: ExecutionRequest,
        from_dialog: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkCommand {
    Trigger { action_id: String },
    SetInput(String),
    Confirm,
    Submit,
    Dismiss,
    Complete {
        request_id: RequestId,
        outcome: std::result::Result<(), String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkRejection {
    Busy,
    UnknownAction(String),
    NothingSelected,
    NoPendingDialog,
    InputRequired,
    StaleRequest(RequestId),
}

impl fmt::Display for BulkRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("a bulk action is already running"),
            Self::UnknownAction(id) => write!(f, "unknown bulk action `{id}`"),
            Self::NothingSelected => f.write_str("select at least one row first"),
            Self::NoPendingDialog => f.write_str("no bulk action is waiting for input"),
            Self::InputRequired => f.write_str("enter a value before submitting"),
            Self::StaleRequest(id) => write!(f, "bulk request {id} is no longer running"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkEvent {
    ConfirmOpened {
        action_id: String,
        message: String,
    },
    InputOpened {
        action_id: String,
        input: InputSpec,
    },
    DialogClosed {
        action_id: String,
    },
    Started(ExecutionRequest),
    Succeeded {
        request_id: RequestId,
        action_id: String,
    },
    Failed {
        request_id: RequestId,
        action_id: String,
        error: String,
    },
    Rejected(BulkRejection),
}

/// Host side of a bulk action.
pub trait BulkActionHandler {
    fn on_action(&mut self, action_id: &str, selected: &[RowId], input: Option<&str>)
    -> Result<()>;
}

impl<F> BulkActionHandler for F
where
    F: FnMut(&str, &[RowId], Option<&str>) -> Result<()>,
{
    fn on_action(
        &mut self,
        action_id: &str,
        selected: &[RowId],
        input: Option<&str>,
    ) -> Result<()> {
        self(action_id, selected, input)
    }
}

/// Result of an execution run off the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub request_id: RequestId,
    pub outcome: std::result::Result<(), String>,
}

impl ExecutionReport {
    pub fn into_command(self) -> BulkCommand {
        BulkCommand::Complete {
            request_id: self.request_id,
            outcome: self.outcome,
        }
    }
}

/// Runs `handler` for `request` on a worker thread and reports back over
/// `tx`. Feed the report to the orchestrator with
/// [`ExecutionReport::into_command`].
pub fn spawn_execution<F>(
    request: ExecutionRequest,
    handler: F,
    tx: Sender<ExecutionReport>,
) -> JoinHandle<()>
where
    F: FnOnce(&str, &[RowId], Option<&str>) -> Result<()> + Send + 'static,
{
    std::thread::spawn(move || {
        let outcome = handler(
            &request.action_id,
            &request.selected,
            request.input.as_deref(),
        )
        .map_err(|error| format!("{error:#}"));
        let report = ExecutionReport {
            request_id: request.id,
            outcome,
        };
        if tx.send(report).is_err() {
            warn!(request = %request.id, "bulk report channel closed");
        }
    })
}

/// Dialog flow and single-flight guard for one toolbar instance.
#[derive(Debug, Clone)]
pub struct BulkActionOrchestrator {
    catalog: ActionCatalog,
    state: OrchestratorState,
    next_request: u64,
    last_error: Option<String>,
    threshold: usize,
}

impl BulkActionOrchestrator {
    pub fn new(catalog: ActionCatalog) -> Self {
        Self {
            catalog,
            state: OrchestratorState::Idle,
            next_request: 1,
            last_error: None,
            threshold: LARGE_SELECTION_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &OrchestratorState {
        &self.state
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.state, OrchestratorState::Executing { .. })
    }

    pub fn pending_request(&self) -> Option<&ExecutionRequest> {
        match &self.state {
            OrchestratorState::Executing { request, .. } => Some(request),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn should_chunk(&self, selected_count: usize) -> bool {
        selected_count > self.threshold
    }

    /// Banner text for large selections. Informational only.
    pub fn large_selection_warning(&self, selected_count: usize) -> Option<String> {
        self.should_chunk(selected_count).then(|| {
            format!(
                "{selected_count} rows selected. Actions on more than {} rows run in chunks.",
                self.threshold
            )
        })
    }

    pub fn dispatch(&mut self, command: BulkCommand, selected: &[RowId]) -> Vec<BulkEvent> {
        match command {
            BulkCommand::Trigger { action_id } => self.trigger(&action_id, selected),
            BulkCommand::SetInput(value) => match &mut self.state {
                OrchestratorState::InputPending { value: current, .. } => {
                    *current = value;
                    Vec::new()
                }
                _ => reject(BulkRejection::NoPendingDialog),
            },
            BulkCommand::Confirm => self.confirm(selected),
            BulkCommand::Submit => self.submit(selected),
            BulkCommand::Dismiss => self.dismiss(),
            BulkCommand::Complete {
                request_id,
                outcome,
            } => self.complete(request_id, outcome),
        }
    }

    /// Completes the pending request by calling `handler` inline. Handler
    /// errors are captured, never propagated.
    pub fn run_with<H>(&mut self, handler: &mut H) -> Vec<BulkEvent>
    where
        H: BulkActionHandler + ?Sized,
    {
        let Some(request) = self.pending_request().cloned() else {
            return Vec::new();
        };
        let outcome = handler
            .on_action(
                &request.action_id,
                &request.selected,
                request.input.as_deref(),
            )
            .map_err(|error| format!("{error:#}"));
        self.complete(request.id, outcome)
    }

    /// Trigger followed by an inline run when the action needs no dialog.
    pub fn execute_with<H>(
        &mut self,
        action_id: &str,
        selected: &[RowId],
        handler: &mut H,
    ) -> Vec<BulkEvent>
    where
        H: BulkActionHandler + ?Sized,
    {
        let mut events = self.trigger(action_id, selected);
        if matches!(events.last(), Some(BulkEvent::Started(_))) {
            events.extend(self.run_with(handler));
        }
        events
    }

    fn trigger(&mut self, action_id: &str, selected: &[RowId]) -> Vec<BulkEvent> {
        if self.is_processing() {
            debug!(action = action_id, "bulk trigger ignored while processing");
            return reject(BulkRejection::Busy);
        }
        let Some(action) = self.catalog.get(action_id).cloned() else {
            return reject(BulkRejection::UnknownAction(action_id.to_owned()));
        };
        if selected.is_empty() {
            return reject(BulkRejection::NothingSelected);
        }

        let mut events = self.close_dialog();
        if let Some(input) = action.input {
            debug!(action = action_id, "bulk input dialog opened");
            self.state = OrchestratorState::InputPending {
                action_id: action.id.clone(),
                value: String::new(),
            };
            events.push(BulkEvent::InputOpened {
                action_id: action.id,
                input,
            });
        } else if let Some(message) = action.confirmation {
            debug!(action = action_id, "bulk confirm dialog opened");
            self.state = OrchestratorState::ConfirmPending {
                action_id: action.id.clone(),
            };
            events.push(BulkEvent::ConfirmOpened {
                action_id: action.id,
                message,
            });
        } else {
            events.push(self.start(action.id, selected, None, false));
        }
        events
    }

    fn confirm(&mut self, selected: &[RowId]) -> Vec<BulkEvent> {
        let OrchestratorState::ConfirmPending { action_id } = &self.state else {
            return reject(BulkRejection::NoPendingDialog);
        };
        if selected.is_empty() {
            return reject(BulkRejection::NothingSelected);
        }
        let action_id = action_id.clone();
        vec![self.start(action_id, selected, None, true)]
    }

    fn submit(&mut self, selected: &[RowId]) -> Vec<BulkEvent> {
        let OrchestratorState::InputPending { action_id, value } = &self.state else {
            return reject(BulkRejection::NoPendingDialog);
        };
        if value.trim().is_empty() {
            return reject(BulkRejection::InputRequired);
        }
        if selected.is_empty() {
            return reject(BulkRejection::NothingSelected);
        }
        let action_id = action_id.clone();
        let input = value.trim().to_owned();
        vec![self.start(action_id, selected, Some(input), true)]
    }

    fn dismiss(&mut self) -> Vec<BulkEvent> {
        if self.is_processing() {
            return reject(BulkRejection::Busy);
        }
        self.close_dialog()
    }

    fn complete(
        &mut self,
        request_id: RequestId,
        outcome: std::result::Result<(), String>,
    ) -> Vec<BulkEvent> {
        let matches_pending = self
            .pending_request()
            .is_some_and(|request| request.id == request_id);
        if !matches_pending {
            return reject(BulkRejection::StaleRequest(request_id));
        }
        let OrchestratorState::Executing {
            request,
            from_dialog,
        } = std::mem::take(&mut self.state)
        else {
            return reject(BulkRejection::StaleRequest(request_id));
        };

        let mut events = Vec::with_capacity(2);
        if from_dialog {
            events.push(BulkEvent::DialogClosed {
                action_id: request.action_id.clone(),
            });
        }
        match outcome {
            Ok(()) => {
                info!(request = %request.id, action = %request.action_id, "bulk action finished");
                self.last_error = None;
                events.push(BulkEvent::Succeeded {
                    request_id: request.id,
                    action_id: request.action_id,
                });
            }
            Err(error) => {
                warn!(
                    request = %request.id,
                    action = %request.action_id,
                    error = %error,
                    "bulk action failed"
                );
                self.last_error = Some(error.clone());
                events.push(BulkEvent::Failed {
                    request_id: request.id,
                    action_id: request.action_id,
                    error,
                });
            }
        }
        events
    }

    fn start(
        &mut self,
        action_id: String,
        selected: &[RowId],
        input: Option<String>,
        from_dialog: bool,
    ) -> BulkEvent {
        let request = ExecutionRequest {
            id: RequestId::new(self.next_request),
            action_id,
            selected: selected.to_vec(),
            input,
        };
        self.next_request += 1;
        info!(
            request = %request.id,
            action = %request.action_id,
            rows = request.selected.len(),
            "bulk action started"
        );
        self.state = OrchestratorState::Executing {
            request: request.clone(),
            from_dialog,
        };
        BulkEvent::Started(request)
    }

    fn close_dialog(&mut self) -> Vec<BulkEvent> {
        match std::mem::take(&mut self.state) {
            OrchestratorState::ConfirmPending { action_id }
            | OrchestratorState::InputPending { action_id, .. } => {
                debug!(action = %action_id, "bulk dialog closed");
                vec![BulkEvent::DialogClosed { action_id }]
            }
            OrchestratorState::Idle => Vec::new(),
            executing @ OrchestratorState::Executing { .. } => {
                self.state = executing;
                Vec::new()
            }
        }
    }
}

impl Default for BulkActionOrchestrator {
    fn default() -> Self {
        Self::new(ActionCatalog::with_builtins())
    }
}

fn reject(rejection: BulkRejection) -> Vec<BulkEvent> {
    vec![BulkEvent::Rejected(rejection)]
}

#[cfg(test)]
mod tests {
    use super::{
        ActionCatalog, BulkAction, BulkActionOrchestrator, BulkCommand, BulkEvent, BulkRejection,
        ExecutionReport, OrchestratorState, spawn_execution,
    };
    use crate::{RequestId, RowId};
    use anyhow::{Result, anyhow};
    use std::sync::mpsc;

    fn rows(count: i64) -> Vec<RowId> {
        (1..=count).map(RowId::new).collect()
    }

    #[derive(Default)]
    struct Counting {
        calls: Vec<(String, usize, Option<String>)>,
    }

    impl Counting {
        fn handle(&mut self, action_id: &str, selected: &[RowId], input: Option<&str>) -> Result<()> {
            self.calls
                .push((action_id.to_owned(), selected.len(), input.map(str::to_owned)));
            Ok(())
        }
    }

    #[test]
    fn builtins_cover_the_four_actions() {
        let catalog = ActionCatalog::with_builtins();
        let ids = catalog
            .actions()
            .iter()
            .map(|action| action.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["export", "batch-update", "print", "delete"]);
        assert!(catalog.get("delete").is_some_and(|action| action.requires_confirmation()));
        assert!(catalog.get("batch-update").is_some_and(|action| action.requires_input()));
    }

    #[test]
    fn duplicate_custom_action_is_rejected() {
        let mut catalog = ActionCatalog::with_builtins();
        assert!(catalog.push(BulkAction::new("archive", "Archive")).is_ok());
        let error = catalog
            .push(BulkAction::new("export", "Export again"))
            .expect_err("duplicate id");
        assert!(error.to_string().contains("already registered"));
    }

    #[test]
    fn immediate_action_runs_once() {
        let mut orchestrator = BulkActionOrchestrator::default();
        let mut counting = Counting::default();
        let mut handler = |id: &str, selected: &[RowId], input: Option<&str>| {
            counting.handle(id, selected, input)
        };
        let events = orchestrator.execute_with("export", &rows(3), &mut handler);
        assert!(matches!(events[0], BulkEvent::Started(_)));
        assert!(matches!(events[1], BulkEvent::Succeeded { .. }));
        assert!(!orchestrator.is_processing());
        assert_eq!(counting.calls, vec![("export".to_owned(), 3, None)]);
    }

    #[test]
    fn trigger_while_processing_never_reaches_handler() {
        let mut orchestrator = BulkActionOrchestrator::default();
        let started = orchestrator.dispatch(
            BulkCommand::Trigger {
                action_id: "print".to_owned(),
            },
            &rows(2),
        );
        assert!(matches!(started[0], BulkEvent::Started(_)));
        assert!(orchestrator.is_processing());

        let mut calls = 0;
        let mut handler = |_: &str, _: &[RowId], _: Option<&str>| -> Result<()> {
            calls += 1;
            Ok(())
        };
        for _ in 0..3 {
            let events = orchestrator.execute_with("export", &rows(2), &mut handler);
            assert_eq!(events, vec![BulkEvent::Rejected(BulkRejection::Busy)]);
        }
        let finished = orchestrator.run_with(&mut handler);
        assert!(matches!(finished[0], BulkEvent::Succeeded { .. }));
        assert_eq!(calls, 1);
    }

    #[test]
    fn dismissing_confirm_discards_action() {
        let mut orchestrator = BulkActionOrchestrator::default();
        let opened = orchestrator.dispatch(
            BulkCommand::Trigger {
                action_id: "delete".to_owned(),
            },
            &rows(5),
        );
        assert!(matches!(opened[0], BulkEvent::ConfirmOpened { .. }));

        let closed = orchestrator.dispatch(BulkCommand::Dismiss, &rows(5));
        assert_eq!(
            closed,
            vec![BulkEvent::DialogClosed {
                action_id: "delete".to_owned()
            }]
        );
        let mut calls = 0;
        let mut handler = |_: &str, _: &[RowId], _: Option<&str>| -> Result<()> {
            calls += 1;
            Ok(())
        };
        assert!(orchestrator.run_with(&mut handler).is_empty());
        assert_eq!(calls, 0);
        assert_eq!(orchestrator.state(), &OrchestratorState::Idle);
    }

    #[test]
    fn confirm_then_complete_closes_dialog() {
        let mut orchestrator = BulkActionOrchestrator::default();
        orchestrator.dispatch(
            BulkCommand::Trigger {
                action_id: "delete".to_owned(),
            },
            &rows(2),
        );
        let started = orchestrator.dispatch(BulkCommand::Confirm, &rows(2));
        let BulkEvent::Started(request) = &started[0] else {
            panic!("expected Started, got {started:?}");
        };
        let done = orchestrator.dispatch(
            BulkCommand::Complete {
                request_id: request.id,
                outcome: Ok(()),
            },
            &[],
        );
        assert_eq!(
            done[0],
            BulkEvent::DialogClosed {
                action_id: "delete".to_owned()
            }
        );
        assert!(matches!(done[1], BulkEvent::Succeeded { .. }));
    }

    #[test]
    fn input_action_requires_value() {
        let mut orchestrator = BulkActionOrchestrator::default();
        let opened = orchestrator.dispatch(
            BulkCommand::Trigger {
                action_id: "batch-update".to_owned(),
            },
            &rows(4),
        );
        assert!(matches!(opened[0], BulkEvent::InputOpened { .. }));
        assert_eq!(
            orchestrator.dispatch(BulkCommand::Submit, &rows(4)),
            vec![BulkEvent::Rejected(BulkRejection::InputRequired)]
        );

        orchestrator.dispatch(BulkCommand::SetInput("  Won ".to_owned()), &rows(4));
        let started = orchestrator.dispatch(BulkCommand::Submit, &rows(4));
        let BulkEvent::Started(request) = &started[0] else {
            panic!("expected Started, got {started:?}");
        };
        assert_eq!(request.input.as_deref(), Some("Won"));
        assert_eq!(request.selected.len(), 4);
    }

    #[test]
    fn handler_failure_is_captured_and_clears_guard() {
        let mut orchestrator = BulkActionOrchestrator::default();
        let mut handler =
            |_: &str, _: &[RowId], _: Option<&str>| -> Result<()> { Err(anyhow!("export service down")) };
        let events = orchestrator.execute_with("export", &rows(1), &mut handler);
        assert!(matches!(
            &events[1],
            BulkEvent::Failed { error, .. } if error == "export service down"
        ));
        assert!(!orchestrator.is_processing());
        assert_eq!(orchestrator.last_error(), Some("export service down"));

        let mut ok = |_: &str, _: &[RowId], _: Option<&str>| -> Result<()> { Ok(()) };
        orchestrator.execute_with("export", &rows(1), &mut ok);
        assert_eq!(orchestrator.last_error(), None);
    }

    #[test]
    fn empty_and_unknown_triggers_are_rejected() {
        let mut orchestrator = BulkActionOrchestrator::default();
        assert_eq!(
            orchestrator.dispatch(
                BulkCommand::Trigger {
                    action_id: "export".to_owned()
                },
                &[]
            ),
            vec![BulkEvent::Rejected(BulkRejection::NothingSelected)]
        );
        assert_eq!(
            orchestrator.dispatch(
                BulkCommand::Trigger {
                    action_id: "launch".to_owned()
                },
                &rows(1)
            ),
            vec![BulkEvent::Rejected(BulkRejection::UnknownAction(
                "launch".to_owned()
            ))]
        );
        assert_eq!(
            orchestrator.dispatch(BulkCommand::Confirm, &rows(1)),
            vec![BulkEvent::Rejected(BulkRejection::NoPendingDialog)]
        );
    }

    #[test]
    fn new_trigger_supersedes_open_dialog() {
        let mut orchestrator = BulkActionOrchestrator::default();
        orchestrator.dispatch(
            BulkCommand::Trigger {
                action_id: "delete".to_owned(),
            },
            &rows(1),
        );
        let events = orchestrator.dispatch(
            BulkCommand::Trigger {
                action_id: "export".to_owned(),
            },
            &rows(1),
        );
        assert_eq!(
            events[0],
            BulkEvent::DialogClosed {
                action_id: "delete".to_owned()
            }
        );
        assert!(matches!(events[1], BulkEvent::Started(_)));
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut orchestrator = BulkActionOrchestrator::default();
        orchestrator.dispatch(
            BulkCommand::Trigger {
                action_id: "export".to_owned(),
            },
            &rows(1),
        );
        let events = orchestrator.dispatch(
            BulkCommand::Complete {
                request_id: RequestId::new(99),
                outcome: Ok(()),
            },
            &[],
        );
        assert_eq!(
            events,
            vec![BulkEvent::Rejected(BulkRejection::StaleRequest(
                RequestId::new(99)
            ))]
        );
        assert!(orchestrator.is_processing());
    }

    #[test]
    fn large_selection_warning_is_strictly_above_threshold() {
        let orchestrator = BulkActionOrchestrator::default();
        assert!(orchestrator.large_selection_warning(1000).is_none());
        let warning = orchestrator
            .large_selection_warning(1001)
            .expect("warning above threshold");
        assert!(warning.contains("1001 rows selected"));
        assert!(orchestrator.should_chunk(1001));
        assert!(!orchestrator.should_chunk(1000));
    }

    #[test]
    fn spawned_execution_reports_over_channel() -> Result<()> {
        let mut orchestrator = BulkActionOrchestrator::default();
        orchestrator.dispatch(
            BulkCommand::Trigger {
                action_id: "export".to_owned(),
            },
            &rows(3),
        );
        let request = orchestrator
            .pending_request()
            .cloned()
            .expect("request pending");
        let (tx, rx) = mpsc::channel::<ExecutionReport>();
        let worker = spawn_execution(
            request,
            |_, selected, _| {
                if selected.len() == 3 {
                    Err(anyhow!("quota exceeded"))
                } else {
                    Ok(())
                }
            },
            tx,
        );
        worker
            .join()
            .map_err(|_| anyhow!("bulk worker panicked"))?;
        let report = rx.recv()?;
        let events = orchestrator.dispatch(report.into_command(), &[]);
        assert!(matches!(
            &events[0],
            BulkEvent::Failed { error, .. } if error == "quota exceeded"
        ));
        Ok(())
    }
}
