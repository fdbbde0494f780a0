//! Expand/collapse state of the plan tree
//!
//! Expansion is keyed by [`NodePath`], built from persisted ids, so two
//! nodes at the same position under different parents never share state.
//! Nothing here talks to a collaborator.

use crate::path::NodePath;
use gqm_i18n::{resolve_display_str, Translator};
use gqm_model::Plan;
use serde::Serialize;
use std::collections::HashSet;

/// One visible row of the rendered tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRow {
    pub path: NodePath,
    pub depth: usize,
    pub label: String,
    pub child_count: usize,
    pub expanded: bool,
}

/// Set of expanded nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeView {
    expanded: HashSet<NodePath>,
}

fn is_leaf(path: &NodePath) -> bool {
    matches!(path, NodePath::Measurement { .. })
}

/// Every expandable node of `plan`
fn branches(plan: &Plan) -> Vec<NodePath> {
    let mut paths = Vec::new();
    for o in &plan.objectives {
        paths.push(NodePath::objective(o.id.clone()));
        for q in &o.questions {
            paths.push(NodePath::question(o.id.clone(), q.id.clone()));
            for m in &q.metrics {
                paths.push(NodePath::metric(o.id.clone(), q.id.clone(), m.id.clone()));
            }
        }
    }
    paths
}

impl TreeView {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn is_expanded(&self, path: &NodePath) -> bool {
        self.expanded.contains(path)
    }

    /// Flip a node; returns whether it is now expanded
    ///
    /// Measurements have no children and stay collapsed.
    pub fn toggle(&mut self, path: &NodePath) -> bool {
        if is_leaf(path) {
            return false;
        }
        if self.expanded.remove(path) {
            false
        } else {
            self.expanded.insert(path.clone());
            true
        }
    }

    pub fn expand(&mut self, path: NodePath) {
        if !is_leaf(&path) {
            self.expanded.insert(path);
        }
    }

    pub fn collapse(&mut self, path: &NodePath) {
        self.expanded.remove(path);
    }

    pub fn expand_all(&mut self, plan: &Plan) {
        self.expanded.extend(branches(plan));
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Forget nodes that no longer exist in `plan`
    pub fn retain_existing(&mut self, plan: &Plan) {
        self.expanded.retain(|path| path.exists_in(plan));
    }

    #[inline]
    #[must_use]
    pub fn expanded_count(&self) -> usize {
        self.expanded.len()
    }

    /// Visible rows in display order, labels resolved through `t`
    #[must_use]
    pub fn rows(&self, plan: &Plan, t: &dyn Translator) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        for o in &plan.objectives {
            let path = NodePath::objective(o.id.clone());
            let open = self.is_expanded(&path);
            rows.push(TreeRow {
                label: resolve_display_str(&o.objective_title, t),
                depth: 0,
                child_count: o.questions.len(),
                expanded: open,
                path,
            });
            if !open {
                continue;
            }
            for q in &o.questions {
                let path = NodePath::question(o.id.clone(), q.id.clone());
                let open = self.is_expanded(&path);
                rows.push(TreeRow {
                    label: resolve_display_str(&q.question_text, t),
                    depth: 1,
                    child_count: q.metrics.len(),
                    expanded: open,
                    path,
                });
                if !open {
                    continue;
                }
                for m in &q.metrics {
                    let path = NodePath::metric(o.id.clone(), q.id.clone(), m.id.clone());
                    let open = self.is_expanded(&path);
                    rows.push(TreeRow {
                        label: resolve_display_str(&m.metric_name, t),
                        depth: 2,
                        child_count: m.measurements.len(),
                        expanded: open,
                        path,
                    });
                    if !open {
                        continue;
                    }
                    for s in &m.measurements {
                        rows.push(TreeRow {
                            path: NodePath::measurement(
                                o.id.clone(),
                                q.id.clone(),
                                m.id.clone(),
                                s.id.clone(),
                            ),
                            depth: 3,
                            label: format!(
                                "{}: {}",
                                s.measurement_acronym,
                                resolve_display_str(&s.measurement_entity, t)
                            ),
                            child_count: 0,
                            expanded: false,
                        });
                    }
                }
            }
        }
        rows
    }
}
