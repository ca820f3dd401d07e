use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use skillmacro::simulation::analysis::PercentileSummary;
use skillmacro::simulation::timeline::AttackTimeline;
use skillmacro::simulation::{Contribution, ANALYSIS_LABELS};
use std::collections::BTreeMap;

const POWER_LABELS: [&str; 4] = ["Boss", "Normal", "Boss (survival)", "Farming"];

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn right_align(table: &mut Table, from: usize, to: usize) {
    for i in from..=to {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn print_powers(powers: &[f64; 4]) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Power").add_attribute(Attribute::Bold),
        Cell::new("Score").fg(Color::Cyan),
    ]);
    for (label, value) in POWER_LABELS.iter().zip(powers) {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(format!("{:.0}", value)).fg(Color::Cyan),
        ]);
    }
    right_align(&mut table, 1, 1);
    println!("\n{}", table);
}

pub fn print_analysis(analysis: &[PercentileSummary; 4]) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Expected").fg(Color::Cyan),
        Cell::new("Min").fg(Color::Red),
        Cell::new("P25"),
        Cell::new("P50"),
        Cell::new("P75"),
        Cell::new("Max").fg(Color::Green),
        Cell::new("Std"),
    ]);
    for (label, s) in ANALYSIS_LABELS.iter().zip(analysis) {
        table.add_row(vec![
            Cell::new(label).add_attribute(Attribute::Bold),
            Cell::new(format!("{:.0}", s.value)).fg(Color::Cyan),
            Cell::new(format!("{:.0}", s.min)).fg(Color::Red),
            Cell::new(format!("{:.0}", s.p25)),
            Cell::new(format!("{:.0}", s.p50)),
            Cell::new(format!("{:.0}", s.p75)),
            Cell::new(format!("{:.0}", s.max)).fg(Color::Green),
            Cell::new(format!("{:.1}", s.std)),
        ]);
    }
    right_align(&mut table, 1, 7);
    println!("\n{}", table);
}

pub fn print_contributions(timeline: &AttackTimeline, contributions: &[Contribution]) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Source").add_attribute(Attribute::Bold),
        Cell::new("Damage"),
        Cell::new("Share").fg(Color::Cyan),
    ]);
    for c in contributions {
        table.add_row(vec![
            Cell::new(timeline.source_id(c.source)),
            Cell::new(format!("{:.0}", c.total)),
            Cell::new(format!("{:.1}%", c.percent)).fg(Color::Cyan),
        ]);
    }
    right_align(&mut table, 1, 2);
    println!("\n{}", table);
}

/// Uses per skill, split by how they were queued.
pub fn print_usage(timeline: &AttackTimeline) {
    let mut counts: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
    for used in &timeline.skills {
        let entry = counts.entry(used.slot).or_default();
        if used.combo.is_some() {
            entry.1 += 1;
        } else {
            entry.0 += 1;
        }
    }

    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Slot").add_attribute(Attribute::Bold),
        Cell::new("Skill"),
        Cell::new("Alone"),
        Cell::new("In Combo"),
    ]);
    for (slot, (alone, combo)) in counts {
        let id = timeline
            .slot_ids
            .get(slot)
            .and_then(|s| s.as_deref())
            .unwrap_or("?");
        table.add_row(vec![
            Cell::new(slot),
            Cell::new(id),
            Cell::new(alone),
            Cell::new(combo),
        ]);
    }
    right_align(&mut table, 2, 3);
    println!("\n{}", table);
}
