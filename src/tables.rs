use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::summary::Summary,
    quantity::{cost::Cost, energy::WattHours},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn savings_cell(savings: Cost) -> Cell {
    Cell::new(savings).set_alignment(CellAlignment::Right).fg(if savings >= Cost::ONE_CENT {
        Color::Green
    } else if savings > -Cost::ONE_CENT {
        Color::DarkYellow
    } else {
        Color::Red
    })
}

fn energy_cell(energy: WattHours) -> Cell {
    Cell::new(energy).set_alignment(CellAlignment::Right)
}

pub fn build_summary_table(summary: &Summary) -> Table {
    let mut table = new_table();
    table.set_header(vec!["", "Without battery", "With battery"]);
    table.add_row(vec![
        Cell::new("Bought"),
        energy_cell(summary.consumed),
        energy_cell(summary.bought),
    ]);
    table.add_row(vec![
        Cell::new("Sold"),
        energy_cell(summary.produced),
        energy_cell(summary.sold),
    ]);
    table.add_row(vec![
        Cell::new("Cost"),
        Cell::new(summary.cost_without_battery).set_alignment(CellAlignment::Right),
        Cell::new(summary.cost_with_battery).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Revenue"),
        Cell::new(summary.revenue_without_battery).set_alignment(CellAlignment::Right),
        Cell::new(summary.revenue_with_battery).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Net cost").add_attribute(Attribute::Bold),
        Cell::new(summary.net_cost_without_battery()).set_alignment(CellAlignment::Right),
        Cell::new(summary.net_cost_with_battery()).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Savings").add_attribute(Attribute::Bold),
        Cell::new(""),
        savings_cell(summary.savings()),
    ]);
    table.add_row(vec![
        Cell::new("Charged / discharged").add_attribute(Attribute::Dim),
        Cell::new(""),
        Cell::new(format!("{} / {}", summary.charged, summary.discharged))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Cycles").add_attribute(Attribute::Dim),
        Cell::new(""),
        Cell::new(format!("{:.2}", summary.cycles_elapsed)).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Usable capacity").add_attribute(Attribute::Dim),
        Cell::new(""),
        energy_cell(summary.usable_capacity),
    ]);
    if let Some(exhausted_at) = summary.exhausted_at {
        table.add_row(vec![
            Cell::new("Exhausted at").fg(Color::Red),
            Cell::new(""),
            Cell::new(exhausted_at).fg(Color::Red),
        ]);
    }
    table
}

/// Compare the simulations of different nominal capacities.
pub fn build_sweep_table(runs: &[(WattHours, Summary)]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Capacity", "Steps", "Bought", "Sold", "Net cost", "Savings", "Cycles", "Usable", "Exhausted",
    ]);
    for (capacity, summary) in runs {
        table.add_row(vec![
            energy_cell(*capacity).add_attribute(Attribute::Bold),
            Cell::new(summary.n_records).set_alignment(CellAlignment::Right),
            energy_cell(summary.bought),
            energy_cell(summary.sold),
            Cell::new(summary.net_cost_with_battery()).set_alignment(CellAlignment::Right),
            savings_cell(summary.savings()),
            Cell::new(format!("{:.2}", summary.cycles_elapsed)).set_alignment(CellAlignment::Right),
            energy_cell(summary.usable_capacity).add_attribute(Attribute::Dim),
            summary.exhausted_at.map_or_else(
                || Cell::new("no").fg(Color::Green),
                |exhausted_at| Cell::new(exhausted_at).fg(Color::Red),
            ),
        ]);
    }
    table
}
