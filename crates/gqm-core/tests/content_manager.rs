//! Content manager against the in-memory store
//!
//! - Failed deletes leave the plan untouched and raise a banner
//! - CRUD round trip addressed by ancestor ids
//! - Confirmation flow, tree pruning and plan duplication

use gqm_catalog::Catalog;
use gqm_core::{ContentError, ContentManager, NodePath, PlanStore, StoreError};
use gqm_editors::{EditorError, NodeEditor};
use gqm_model::{Field, FieldIssue, ObjectiveDraft, PlanId, QuestionDraft, Text};
use gqm_test_utils::{english, measurement, metric, seeded_plan, RecordingPlanStore, StoreOp};
use pretty_assertions::assert_eq;
use std::sync::Arc;

async fn manager() -> (Arc<RecordingPlanStore>, ContentManager) {
    let store = Arc::new(RecordingPlanStore::new());
    let plan = seeded_plan(store.as_ref()).await;
    let manager = ContentManager::open(&plan.id, store.clone(), english())
        .await
        .unwrap();
    (store, manager)
}

#[tokio::test]
async fn failed_delete_keeps_objectives_and_sets_banner() {
    let (store, mut manager) = manager().await;
    let before = manager.plan().objectives.clone();
    let id = before[0].id.clone();

    store.fail_on(
        StoreOp::DeleteObjective,
        StoreError::Unavailable("connection refused".into()),
    );
    let result = manager.delete_objective(&id).await;

    assert!(matches!(
        result,
        Err(ContentError::Store(StoreError::Unavailable(_)))
    ));
    assert_eq!(manager.plan().objectives, before);
    assert!(manager
        .banner()
        .is_some_and(|b| b.contains("connection refused")));

    store.heal();
    manager.request_delete(NodePath::objective(id)).unwrap();
    manager.confirm_delete().await.unwrap();
    assert!(manager.plan().objectives.is_empty());
    assert_eq!(manager.banner(), None);
    assert_eq!(store.count(StoreOp::DeleteObjective), 2);
}

#[tokio::test]
async fn crud_round_trip_by_ancestor_ids() {
    let (store, mut manager) = manager().await;

    manager
        .add_objective(&ObjectiveDraft::new(Text::literal("Ship faster")))
        .await
        .unwrap();
    let objective = manager.plan().objectives[1].id.clone();

    manager
        .add_question(
            &objective,
            &QuestionDraft::new(Text::literal("How long does a change take?")),
        )
        .await
        .unwrap();
    let question = manager.plan().objectives[1].questions[0].id.clone();

    manager
        .add_metric(&objective, &question, &metric("Cycle time", &["CST"]))
        .await
        .unwrap();
    let metric_id = manager.plan().objectives[1].questions[0].metrics[0].id.clone();

    manager
        .add_measurement(&objective, &question, &metric_id, &measurement("CEN"))
        .await
        .unwrap();
    assert_eq!(manager.plan().counts(), [2, 2, 2, 4]);

    manager
        .update_question(
            &objective,
            &question,
            &QuestionDraft::new(Text::literal("How long does a release take?")),
        )
        .await
        .unwrap();
    let updated = &manager.plan().objectives[1].questions[0];
    assert_eq!(updated.question_text, "How long does a release take?");
    assert_eq!(updated.metrics.len(), 1, "children survive an update");

    manager
        .request_delete(NodePath::metric(objective.clone(), question.clone(), metric_id))
        .unwrap();
    manager.cancel_delete();
    assert_eq!(manager.pending_delete(), None);
    assert_eq!(manager.plan().counts()[2], 2);

    manager
        .request_delete(NodePath::question(objective.clone(), question))
        .unwrap();
    manager.confirm_delete().await.unwrap();
    assert_eq!(manager.plan().counts(), [2, 1, 1, 2]);
    assert_eq!(store.count(StoreOp::DeleteQuestion), 1);
}

#[tokio::test]
async fn duplicate_acronym_is_rejected_before_any_request() {
    let (store, mut manager) = manager().await;
    let o = &manager.plan().objectives[0];
    let q = &o.questions[0];
    let m = &q.metrics[0];
    let (objective, question, metric_id) = (o.id.clone(), q.id.clone(), m.id.clone());

    let err = manager
        .add_measurement(&objective, &question, &metric_id, &measurement("SDT"))
        .await
        .unwrap_err();

    let ContentError::Invalid(errors) = err else {
        panic!("expected a validation error");
    };
    assert!(matches!(
        errors.get(Field::MeasurementAcronym),
        Some(FieldIssue::DuplicateAcronym { .. })
    ));
    assert_eq!(store.count(StoreOp::AddMeasurement), 0);
}

#[tokio::test]
async fn duplicate_objective_title_is_rejected() {
    let (store, mut manager) = manager().await;
    let existing = manager.plan().objectives[0].objective_title.clone();

    let err = manager
        .add_objective(&ObjectiveDraft::new(Text::literal(format!(" {existing} "))))
        .await
        .unwrap_err();

    let ContentError::Invalid(errors) = err else {
        panic!("expected a validation error");
    };
    assert!(matches!(
        errors.get(Field::ObjectiveTitle),
        Some(FieldIssue::Duplicate { .. })
    ));
    assert_eq!(store.count(StoreOp::AddObjective), 0);
}

#[tokio::test]
async fn tree_forgets_deleted_nodes() {
    let (_store, mut manager) = manager().await;
    let plan = manager.plan().clone();
    manager.tree_mut().expand_all(&plan);
    assert_eq!(manager.tree().expanded_count(), 3);
    assert_eq!(manager.rows().len(), 5);

    let id = plan.objectives[0].id.clone();
    manager.delete_objective(&id).await.unwrap();
    assert_eq!(manager.tree().expanded_count(), 0);
    assert!(manager.rows().is_empty());
}

#[tokio::test]
async fn editors_open_prefilled_from_persisted_nodes() {
    let (_store, manager) = manager().await;
    let o = &manager.plan().objectives[0];
    let q = &o.questions[0];
    let m = &q.metrics[0];

    let editor = manager
        .metric_editor(Catalog::builtin(), &o.id, &q.id, Some(&m.id))
        .unwrap();
    assert!(editor.is_open());
    assert_eq!(editor.form().name, Text::literal("Lead Time"));
    assert_eq!(editor.measurements().len(), 2);

    let missing = manager.question_editor(Catalog::builtin(), &o.id, Some(&"nope".into()));
    assert!(matches!(missing, Err(ContentError::NotFound(_))));
}

#[tokio::test]
async fn metric_edit_persists_measurement_changes() {
    let (store, mut manager) = manager().await;
    let o = &manager.plan().objectives[0];
    let q = &o.questions[0];
    let m = &q.metrics[0];
    let (objective, question, metric_id) = (o.id.clone(), q.id.clone(), m.id.clone());
    let sdt = m.measurements[0].id.clone();

    let mut editor = manager
        .metric_editor(Catalog::builtin(), &objective, &question, Some(&metric_id))
        .unwrap();
    editor.next().unwrap();
    editor.remove_measurement(1).unwrap();
    editor.open_measurement_editor(None).unwrap();
    editor.measurement_editor().select("DEF").unwrap();
    editor.commit_measurement().unwrap();
    editor.open_measurement_editor(Some(0)).unwrap();
    editor.measurement_editor().set_unit("timestamp");
    editor.commit_measurement().unwrap();
    let draft = editor.create().unwrap();

    manager
        .update_metric(&objective, &question, &metric_id, &draft)
        .await
        .unwrap();

    let persisted = manager
        .plan()
        .metric(&objective, &question, &metric_id)
        .unwrap();
    let acronyms: Vec<&str> = persisted
        .measurements
        .iter()
        .map(|m| m.measurement_acronym.as_str())
        .collect();
    assert_eq!(acronyms, vec!["SDT", "DEF"]);
    assert_eq!(persisted.measurements[0].id, sdt);
    assert_eq!(persisted.measurements[0].measurement_unit, "timestamp");
    assert!(!gqm_model::has_key_prefix(&persisted.measurements[1].measurement_entity));
    assert_eq!(manager.plan().counts(), [1, 1, 1, 2]);
    assert_eq!(store.count(StoreOp::UpdateMetric), 1);
}

#[tokio::test]
async fn metric_edit_without_measurements_is_rejected() {
    let (store, mut manager) = manager().await;
    let o = &manager.plan().objectives[0];
    let q = &o.questions[0];
    let (objective, question, metric_id) = (o.id.clone(), q.id.clone(), q.metrics[0].id.clone());

    let err = manager
        .update_metric(&objective, &question, &metric_id, &metric("Lead Time", &[]))
        .await
        .unwrap_err();

    let ContentError::Invalid(errors) = err else {
        panic!("expected a validation error");
    };
    assert_eq!(errors.get(Field::Measurements), Some(&FieldIssue::AtLeastOne));
    assert_eq!(store.count(StoreOp::UpdateMetric), 0);
    assert_eq!(manager.plan().counts(), [1, 1, 1, 2]);
}

#[tokio::test]
async fn catalog_entries_already_in_the_plan_are_not_offered() {
    let (_store, manager) = manager().await;
    let o = &manager.plan().objectives[0];
    assert_eq!(o.objective_title, "Improve product quality");

    let mut editor = manager.objective_editor(Catalog::builtin(), None).unwrap();
    assert!(editor
        .predefined_options()
        .iter()
        .all(|option| option.title.raw() != "objective.improveQuality"));
    assert_eq!(
        editor.predefined_options().len(),
        Catalog::builtin().objectives().len() - 1
    );
    assert!(matches!(
        editor.select("objective.improveQuality"),
        Err(EditorError::UnknownOption(_))
    ));
}

#[tokio::test]
async fn duplicate_plan_persists_a_copy() {
    let (store, mut manager) = manager().await;
    let original = manager.plan().clone();

    let copy = manager.duplicate_plan(None).await.unwrap();

    assert_ne!(copy.id, original.id);
    assert_eq!(copy.plan_name, "Q1 Plan (copy)");
    assert_eq!(copy.counts(), original.counts());
    assert_eq!(store.inner().len(), 2);
    assert_eq!(manager.plan().id, original.id);
}

#[tokio::test]
async fn opening_an_unknown_plan_fails() {
    let store: Arc<dyn PlanStore> = Arc::new(RecordingPlanStore::new());
    let result = ContentManager::open(&PlanId::new("missing"), store, english()).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}
