//! Read-only review of the draft
//!
//! Counts per level and a fully expanded outline with every key resolved to
//! display text.

use super::state::WizardState;
use gqm_i18n::{resolve_display, Translator};
use gqm_model::{MetricDraft, PlanBasics};
use serde::Serialize;
use std::fmt::Write as _;

/// One line of the expanded outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineLine {
    /// Objectives at 0, measurements at 3
    pub depth: usize,
    pub label: String,
}

/// Summary shown at the review step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub basics: PlanBasics,
    pub goal_statement: String,
    pub objectives: usize,
    pub questions: usize,
    pub metrics: usize,
    pub measurements: usize,
    pub outline: Vec<OutlineLine>,
}

fn metric_label(metric: &MetricDraft, t: &dyn Translator) -> String {
    let name = resolve_display(&metric.name, t);
    if metric.mnemonic.trim().is_empty() {
        name
    } else {
        format!("{name} ({})", metric.mnemonic.trim())
    }
}

impl ReviewSummary {
    /// Summary of `state`, or `None` before basics are set
    #[must_use]
    pub fn build(state: &WizardState, t: &dyn Translator) -> Option<Self> {
        let basics = state.basics()?.clone();
        let mut summary = Self {
            goal_statement: basics.goal.statement(),
            basics,
            objectives: state.objectives().len(),
            questions: 0,
            metrics: 0,
            measurements: 0,
            outline: Vec::new(),
        };

        for objective in state.objectives() {
            summary.outline.push(OutlineLine {
                depth: 0,
                label: resolve_display(&objective.title, t),
            });
            for question in &objective.questions {
                summary.questions += 1;
                summary.outline.push(OutlineLine {
                    depth: 1,
                    label: resolve_display(&question.text, t),
                });
                for metric in &question.metrics {
                    summary.metrics += 1;
                    summary.outline.push(OutlineLine {
                        depth: 2,
                        label: metric_label(metric, t),
                    });
                    for m in &metric.measurements {
                        summary.measurements += 1;
                        summary.outline.push(OutlineLine {
                            depth: 3,
                            label: format!(
                                "{}: {} ({}, {})",
                                m.acronym.trim(),
                                resolve_display(&m.entity, t),
                                resolve_display(&m.unit, t),
                                t.translate(m.scale.label_key(), Some(m.scale.as_str())),
                            ),
                        });
                    }
                }
            }
        }
        Some(summary)
    }

    /// Outline as indented text
    #[must_use]
    pub fn render_outline(&self) -> String {
        let mut out = String::new();
        for line in &self.outline {
            let _ = writeln!(out, "{}- {}", "  ".repeat(line.depth), line.label);
        }
        out
    }
}
