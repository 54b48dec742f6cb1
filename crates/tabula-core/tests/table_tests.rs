// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use tabula_core::{
    BulkCommand, BulkEvent, CellValue, CheckState, ColumnId, MemoryLayoutStore, PageItem,
    PointerPosition, RowId, RowValues, SortClick, SortDirection, TableCommand, TableConfig,
    TableController, TableEvent, TableRow,
};
use tabula_testkit::{
    Opportunity, RecordingHandler, opportunity_columns, sample_opportunities,
    sample_subscriptions, subscription_columns, tracking_registry,
};
use time::macros::date;

fn pipeline(rows: usize) -> Result<TableController<Opportunity>> {
    let (_, registry) = tracking_registry();
    TableController::new(
        "opportunities",
        opportunity_columns(),
        sample_opportunities(rows),
        registry,
        TableConfig::default(),
    )
}

fn header_click(column: &str, click: SortClick) -> TableCommand {
    TableCommand::ClickHeader {
        column_id: ColumnId::from(column),
        click,
    }
}

#[test]
fn multi_sort_orders_by_priority_then_tiebreaker() -> Result<()> {
    let mut table = pipeline(120)?;
    table.dispatch(header_click("stage", SortClick::Plain));
    table.dispatch(header_click("amount", SortClick::Additive));
    table.dispatch(header_click("amount", SortClick::Additive));

    let entries = table.sort().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].column_id.as_str(), "stage");
    assert_eq!(entries[1].direction, SortDirection::Desc);

    let rows = table.display_rows();
    for pair in rows.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        assert!(left.stage.to_lowercase() <= right.stage.to_lowercase());
        if left.stage == right.stage {
            match (left.amount_cents, right.amount_cents) {
                (Some(left), Some(right)) => assert!(left >= right),
                (None, Some(_)) => panic!("null amount sorted before a value"),
                _ => {}
            }
        }
    }
    Ok(())
}

#[test]
fn plain_click_replaces_multi_sort() -> Result<()> {
    let mut table = pipeline(10)?;
    table.dispatch(header_click("stage", SortClick::Plain));
    table.dispatch(header_click("amount", SortClick::Additive));
    table.dispatch(header_click("owner", SortClick::Plain));
    let ids = table
        .sort()
        .entries()
        .iter()
        .map(|entry| entry.column_id.as_str().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["owner"]);
    Ok(())
}

#[test]
fn removing_top_sort_compacts_priorities() -> Result<()> {
    let mut table = pipeline(10)?;
    table.dispatch(header_click("stage", SortClick::Plain));
    table.dispatch(header_click("amount", SortClick::Additive));
    table.dispatch(header_click("stage", SortClick::Additive));
    table.dispatch(header_click("stage", SortClick::Additive));
    let entries = table.sort().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].column_id.as_str(), "amount");
    assert_eq!(entries[0].priority, 0);
    Ok(())
}

#[test]
fn pagination_window_follows_current_page() -> Result<()> {
    let mut table = pipeline(500)?;
    table.dispatch(TableCommand::GoToPage(10));
    let view = table.view();
    assert_eq!(view.total_pages, 20);
    assert_eq!(
        view.pages,
        vec![
            PageItem::Page(1),
            PageItem::Gap,
            PageItem::Page(8),
            PageItem::Page(9),
            PageItem::Page(10),
            PageItem::Page(11),
            PageItem::Page(12),
            PageItem::Gap,
            PageItem::Page(20),
        ]
    );
    assert_eq!(view.rows.len(), 25);
    assert_eq!(view.rows[0].id, table.display_rows()[225].row_id());
    Ok(())
}

#[test]
fn page_and_all_checkboxes_are_independent() -> Result<()> {
    let mut table = pipeline(60)?;
    table.dispatch(TableCommand::SelectPage);
    let summary = table.view().selection;
    assert_eq!(summary.page, CheckState::Checked);
    assert_eq!(summary.all, CheckState::Indeterminate);

    table.dispatch(TableCommand::NextPage);
    let summary = table.view().selection;
    assert_eq!(summary.page, CheckState::Unchecked);
    assert_eq!(summary.selected_count, 25);

    table.dispatch(TableCommand::SelectAll);
    assert_eq!(table.view().selection.all, CheckState::Checked);
    table.dispatch(TableCommand::InvertSelection);
    assert!(table.selected().is_empty());
    Ok(())
}

#[test]
fn large_selection_banner_switches_at_threshold() -> Result<()> {
    let mut table = pipeline(1001)?;
    table.dispatch(TableCommand::SelectAll);
    assert!(table.view().banner.is_some());
    table.dispatch(TableCommand::ToggleRow(RowId::new(1001)));
    assert_eq!(table.selected().len(), 1000);
    assert!(table.view().banner.is_none());
    Ok(())
}

#[test]
fn delete_flow_runs_handler_once_after_confirm() -> Result<()> {
    let mut table = pipeline(30)?;
    table.dispatch(TableCommand::SelectPage);
    let opened = table.dispatch(TableCommand::Bulk(BulkCommand::Trigger {
        action_id: "delete".to_owned(),
    }));
    assert!(matches!(
        opened[0],
        TableEvent::Bulk(BulkEvent::ConfirmOpened { .. })
    ));

    let mut handler = RecordingHandler::new();
    assert!(table.run_bulk_with(&mut handler).is_empty());
    assert_eq!(handler.call_count(), 0);

    table.dispatch(TableCommand::Bulk(BulkCommand::Confirm));
    let retry = table.dispatch(TableCommand::Bulk(BulkCommand::Trigger {
        action_id: "export".to_owned(),
    }));
    assert!(matches!(
        retry[0],
        TableEvent::Bulk(BulkEvent::Rejected(_))
    ));

    let done = table.run_bulk_with(&mut handler);
    assert_eq!(handler.call_count(), 1);
    assert_eq!(handler.calls[0].selected.len(), 25);
    assert!(
        done.iter()
            .any(|event| matches!(event, TableEvent::Bulk(BulkEvent::Succeeded { .. })))
    );
    assert!(!table.bulk().is_processing());
    Ok(())
}

#[test]
fn failing_bulk_action_surfaces_error() -> Result<()> {
    let mut table = pipeline(5)?;
    table.dispatch(TableCommand::SelectAll);
    table.dispatch(TableCommand::Bulk(BulkCommand::Trigger {
        action_id: "print".to_owned(),
    }));
    let mut handler = RecordingHandler::failing("printer offline");
    let events = table.run_bulk_with(&mut handler);
    assert!(events.iter().any(|event| matches!(
        event,
        TableEvent::Bulk(BulkEvent::Failed { error, .. }) if error == "printer offline"
    )));
    assert_eq!(table.view().last_error.as_deref(), Some("printer offline"));
    Ok(())
}

#[test]
fn reorder_and_resize_never_leak_listeners() -> Result<()> {
    let (tracker, registry) = tracking_registry();
    let mut table = TableController::new(
        "opportunities",
        opportunity_columns(),
        sample_opportunities(5),
        registry,
        TableConfig::default(),
    )?;
    let position = PointerPosition {
        x: 0,
        target_left: 0,
        target_width: 100,
    };
    for _ in 0..20 {
        table.dispatch(TableCommand::DragStart(ColumnId::from("amount")));
        table.dispatch(TableCommand::DragOver {
            column_id: ColumnId::from("stage"),
            position,
        });
        table.dispatch(TableCommand::DragEnd);
        table.dispatch(TableCommand::ResizePress {
            column_id: ColumnId::from("owner"),
            pointer_x: 0,
        });
        table.dispatch(TableCommand::ResizeMove { pointer_x: 40 });
        table.dispatch(TableCommand::ResizeRelease);
    }
    assert_eq!(tracker.active_count(), 0);
    assert_eq!(tracker.attached_total(), 40);

    table.dispatch(TableCommand::DragStart(ColumnId::from("amount")));
    drop(table);
    assert_eq!(tracker.active_count(), 0);
    Ok(())
}

#[test]
fn edits_flow_back_into_rows() -> Result<()> {
    let mut table = pipeline(3)?;
    let events = table.dispatch(TableCommand::EditCell {
        row_id: RowId::new(2),
        column_id: ColumnId::from("close_date"),
        raw: "2026-06-30".to_owned(),
    });
    assert!(matches!(events[0], TableEvent::CellEdited { .. }));
    assert_eq!(table.rows()[1].close_date, Some(date!(2026 - 06 - 30)));

    let rejected = table.dispatch(TableCommand::EditCell {
        row_id: RowId::new(2),
        column_id: ColumnId::from("account"),
        raw: "   ".to_owned(),
    });
    assert!(matches!(
        &rejected[0],
        TableEvent::EditRejected { message, .. } if message == "account is required"
    ));

    let read_only = table.dispatch(TableCommand::EditCell {
        row_id: RowId::new(2),
        column_id: ColumnId::from("owner"),
        raw: "Someone".to_owned(),
    });
    assert!(matches!(read_only[0], TableEvent::EditRejected { .. }));
    Ok(())
}

#[test]
fn layout_survives_a_new_controller() -> Result<()> {
    let store = MemoryLayoutStore::new();
    let mut table = pipeline(5)?;
    table.dispatch(TableCommand::MoveColumn {
        column_id: ColumnId::from("amount"),
        delta: -5,
    });
    table.dispatch(TableCommand::ToggleColumn(ColumnId::from("phone")));
    table.dispatch(header_click("amount", SortClick::Plain));
    table.save_layout(&store)?;

    let mut restored = pipeline(5)?;
    assert!(restored.load_layout(&store)?);
    let view = restored.view();
    assert_eq!(view.headers[0].id.as_str(), "amount");
    assert!(view.headers.iter().all(|header| header.id.as_str() != "phone"));
    assert_eq!(restored.sort(), table.sort());
    Ok(())
}

#[test]
fn subscriptions_render_every_builtin_type() -> Result<()> {
    let (_, registry) = tracking_registry();
    let table = TableController::new(
        "subscriptions",
        subscription_columns(),
        sample_subscriptions(3),
        registry,
        TableConfig::default(),
    )?;
    let view = table.view();
    let row = &view.rows[0];
    assert_eq!(row.cells.len(), 7);
    assert!(row.cells[2].starts_with('$'));
    assert!(row.cells[5] == "yes" || row.cells[5] == "no");
    assert!(row.cells[6].ends_with('%'));
    assert!(
        table.rows()[0].value("health") != CellValue::Null,
        "health column resolves"
    );
    Ok(())
}
