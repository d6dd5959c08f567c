// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flowchart text generation for the reference and farmer schedules.
//!
//! Output is Mermaid `flowchart TD` syntax. Generation is deterministic:
//! the same schedule always yields byte-identical text.

use std::fmt::Write;
use std::sync::LazyLock;

use rakan_core::envelope::UserScheduleDay;
use regex::Regex;

use crate::node_id::hlt_to_node_id;
use crate::reference::ScheduleDay;

/// Style applied to the day the user picked.
pub const SELECTED_CLASS: &str = "selected";

/// Style applied to the farmer's current day.
pub const CURRENT_DAY_CLASS: &str = "currentDay";

/// Click callback name attached to every day node.
pub const DAY_CLICK_HANDLER: &str = "handleDayNodeClick";

const EDGE_LABEL: &str = "Performed Activity";

static SELECTED_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?[ \t]*class\s+d_\d+\s+selected\n?").unwrap());

fn header(out: &mut String, with_current_day: bool) {
    out.push_str("flowchart TD\n");
    out.push_str("  classDef selected fill:#d9ead3ff,stroke:#333\n");
    if with_current_day {
        out.push_str("  classDef currentDay fill:#fce5cdff,stroke:#333,stroke-width:2px\n");
    }
}

/// Mermaid labels are double-quoted; embedded quotes use the entity form.
fn label(text: &str) -> String {
    text.replace('"', "#quot;")
}

fn day_node(out: &mut String, node: &str, text: &str) {
    let _ = writeln!(out, "  {node}[\"{}\"]", label(text));
    let _ = writeln!(out, "  click {node} {DAY_CLICK_HANDLER}");
}

fn activity_node(out: &mut String, day: &str, id: &str, text: &str) {
    let _ = writeln!(out, "  {id}[\"{}\"]", label(text));
    let _ = writeln!(out, "  {day} -->|{EDGE_LABEL}| {id}");
}

/// Renders the reference schedule.
///
/// A day with several activities gets one node per activity, suffixed by
/// position (`<activityId>_<i>`). Otherwise a single node named by the
/// activity id carries the comma-joined activity names.
pub fn reference_flowchart(days: &[ScheduleDay]) -> String {
    let mut out = String::new();
    header(&mut out, false);

    for day in days {
        let node = hlt_to_node_id(day.hlt);
        day_node(&mut out, &node, &format!("Day {}", day.hlt));

        if day.activity.len() > 1 {
            for (i, activity) in day.activity.iter().enumerate() {
                activity_node(&mut out, &node, &format!("{}_{i}", day.activity_id), activity);
            }
        } else {
            activity_node(
                &mut out,
                &node,
                &day.activity_id.to_string(),
                &day.activity.join(", "),
            );
        }
    }
    out
}

/// Renders a farmer's schedule, or `None` when the schedule is empty.
///
/// Day labels include the activity date. The day whose `hlt` equals the
/// reported `currentDayHlt` is assigned the `currentDay` class.
pub fn farmer_flowchart(days: &[UserScheduleDay]) -> Option<String> {
    if days.is_empty() {
        return None;
    }

    let mut out = String::new();
    header(&mut out, true);

    for day in days {
        let node = hlt_to_node_id(day.hlt);
        let text = if day.activity_date.is_empty() {
            format!("Day {}", day.hlt)
        } else {
            format!("Day {} ({})", day.hlt, day.activity_date)
        };
        day_node(&mut out, &node, &text);

        // Position-suffixed ids when the parallel id list is unusable.
        let ids_usable = day.activity_ids.len() == day.activities.len();
        match day.activities.as_slice() {
            [] => {}
            [only] => {
                let id = match day.activity_ids.first() {
                    Some(id) if ids_usable => id.to_string(),
                    _ => format!("{node}_a0"),
                };
                activity_node(&mut out, &node, &id, only);
            }
            many => {
                for (i, activity) in many.iter().enumerate() {
                    let id = if ids_usable {
                        format!("{}_{i}", day.activity_ids[i])
                    } else {
                        format!("{node}_a{i}")
                    };
                    activity_node(&mut out, &node, &id, activity);
                }
            }
        }
    }

    if let Some(current) = days.iter().find(|d| d.hlt == d.current_day_hlt) {
        let _ = writeln!(
            out,
            "  class {} {CURRENT_DAY_CLASS}",
            hlt_to_node_id(current.hlt)
        );
    }
    Some(out)
}

/// Moves the `selected` highlight to the day `hlt`.
///
/// Every prior `class d_<n> selected` directive is removed before the new
/// one is appended, so repeated calls never accumulate directives.
pub fn mark_selected(text: &str, hlt: i64) -> String {
    let mut cleaned = SELECTED_DIRECTIVE.replace_all(text, "\n").into_owned();
    while cleaned.ends_with("\n\n") {
        cleaned.pop();
    }
    if !cleaned.ends_with('\n') {
        cleaned.push('\n');
    }
    let _ = writeln!(
        cleaned,
        "  class {} {SELECTED_CLASS}",
        hlt_to_node_id(hlt)
    );
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_days() -> Vec<ScheduleDay> {
        vec![
            ScheduleDay {
                hlt: 1,
                next_hlt: 2,
                activity: vec!["Plant".into()],
                activity_id: 10,
            },
            ScheduleDay {
                hlt: 2,
                next_hlt: 2,
                activity: vec!["Water".into(), "Fertilize".into()],
                activity_id: 20,
            },
        ]
    }

    fn farmer_day(hlt: i64, current: i64) -> UserScheduleDay {
        UserScheduleDay {
            hlt,
            activities: vec!["A".into()],
            activity_ids: vec![1],
            current_day_hlt: current,
            activity_date: "2024-01-01".into(),
        }
    }

    #[test]
    fn reference_chart_contains_expected_nodes_and_edges() {
        let text = reference_flowchart(&reference_days());
        assert!(text.starts_with("flowchart TD\n"));
        assert!(text.contains("classDef selected fill:#d9ead3ff,stroke:#333"));
        assert!(text.contains("d_1[\"Day 1\"]"));
        assert!(text.contains("click d_1 handleDayNodeClick"));
        assert!(text.contains("10[\"Plant\"]"));
        assert!(text.contains("d_1 -->|Performed Activity| 10"));
        assert!(text.contains("20_0[\"Water\"]"));
        assert!(text.contains("20_1[\"Fertilize\"]"));
        assert!(text.contains("d_2 -->|Performed Activity| 20_0"));
        assert!(text.contains("d_2 -->|Performed Activity| 20_1"));
    }

    #[test]
    fn negative_days_use_marker_prefix() {
        let days = vec![ScheduleDay {
            hlt: -3,
            next_hlt: 0,
            activity: vec!["Plough".into()],
            activity_id: 5,
        }];
        let text = reference_flowchart(&days);
        assert!(text.contains("d_993[\"Day -3\"]"));
        assert!(text.contains("d_993 -->|Performed Activity| 5"));
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(
            reference_flowchart(&reference_days()),
            reference_flowchart(&reference_days())
        );
    }

    #[test]
    fn farmer_chart_marks_current_day() {
        let text = farmer_flowchart(&[farmer_day(0, 0)]).unwrap();
        assert!(text.contains("classDef currentDay"));
        assert!(text.contains("d_0[\"Day 0 (2024-01-01)\"]"));
        assert!(text.contains("1[\"A\"]"));
        assert!(text.contains("class d_0 currentDay"));
    }

    #[test]
    fn farmer_chart_without_current_day_has_no_assignment() {
        let text = farmer_flowchart(&[farmer_day(3, 9)]).unwrap();
        assert!(!text.contains("class d_3 currentDay"));
    }

    #[test]
    fn empty_farmer_schedule_is_unavailable() {
        assert!(farmer_flowchart(&[]).is_none());
    }

    #[test]
    fn mismatched_activity_ids_fall_back_to_positions() {
        let day = UserScheduleDay {
            hlt: 4,
            activities: vec!["X".into(), "Y".into()],
            activity_ids: vec![7],
            current_day_hlt: 0,
            activity_date: String::new(),
        };
        let text = farmer_flowchart(&[day]).unwrap();
        assert!(text.contains("d_4_a0[\"X\"]"));
        assert!(text.contains("d_4 -->|Performed Activity| d_4_a1"));
    }

    #[test]
    fn labels_escape_quotes() {
        let days = vec![ScheduleDay {
            hlt: 0,
            next_hlt: 0,
            activity: vec!["Say \"hi\"".into()],
            activity_id: 1,
        }];
        assert!(reference_flowchart(&days).contains("1[\"Say #quot;hi#quot;\"]"));
    }

    #[test]
    fn mark_selected_replaces_previous_highlight() {
        let base = reference_flowchart(&reference_days());
        let once = mark_selected(&base, 1);
        assert!(once.ends_with("  class d_1 selected\n"));

        let twice = mark_selected(&once, 2);
        assert!(!twice.contains("class d_1 selected"));
        assert_eq!(twice.matches("selected\n").count(), 1);
        assert!(twice.ends_with("  class d_2 selected\n"));
        // classDef line is untouched
        assert!(twice.contains("classDef selected fill:#d9ead3ff,stroke:#333"));
    }

    #[test]
    fn mark_selected_handles_negative_days() {
        let text = mark_selected("flowchart TD\n", -5);
        assert!(text.contains("class d_995 selected"));
    }
}
