//! Built-in catalog tables
//!
//! Every text field is a translation key; the English strings live in
//! `locales/en.yaml`. Mnemonics, acronyms and formulas are literal.

use gqm_model::{
    ControlRange, MeasurementDraft, MeasurementScale, MetricDraft, ObjectiveDraft, QuestionDraft,
    Text, TranslationKey,
};

fn k(raw: &'static str) -> Text {
    Text::Key(TranslationKey::from_static(raw))
}

pub(crate) fn objectives() -> Vec<ObjectiveDraft> {
    [
        "objective.improveQuality",
        "objective.reduceCosts",
        "objective.increaseProductivity",
        "objective.improveCustomerSatisfaction",
        "objective.reduceTimeToMarket",
        "objective.improvePredictability",
    ]
    .into_iter()
    .map(|key| ObjectiveDraft::new(k(key)))
    .collect()
}

pub(crate) fn questions() -> Vec<QuestionDraft> {
    [
        "questions.defectRate",
        "questions.defectEscape",
        "questions.deliverySpeed",
        "questions.deliveryPredictability",
        "questions.teamThroughput",
        "questions.reworkEffort",
        "questions.customerComplaints",
        "questions.costPerFeature",
        "questions.estimateAccuracy",
        "questions.testCoverage",
    ]
    .into_iter()
    .map(|key| QuestionDraft::new(k(key)))
    .collect()
}

struct MeasurementRow {
    entity: &'static str,
    acronym: &'static str,
    properties: &'static str,
    unit: &'static str,
    scale: MeasurementScale,
    procedure: &'static str,
    frequency: &'static str,
}

const MEASUREMENTS: &[MeasurementRow] = &[
    MeasurementRow {
        entity: "entities.workItem",
        acronym: "SDT",
        properties: "measurements.properties.startDate",
        unit: "units.date",
        scale: MeasurementScale::Continuous,
        procedure: "measurements.procedures.boardTransition",
        frequency: "analysis.frequency.perItem",
    },
    MeasurementRow {
        entity: "entities.workItem",
        acronym: "EDT",
        properties: "measurements.properties.endDate",
        unit: "units.date",
        scale: MeasurementScale::Continuous,
        procedure: "measurements.procedures.boardTransition",
        frequency: "analysis.frequency.perItem",
    },
    MeasurementRow {
        entity: "entities.release",
        acronym: "DEF",
        properties: "measurements.properties.defectCount",
        unit: "units.defects",
        scale: MeasurementScale::Discrete,
        procedure: "measurements.procedures.issueTrackerQuery",
        frequency: "analysis.frequency.perRelease",
    },
    MeasurementRow {
        entity: "entities.codebase",
        acronym: "KLC",
        properties: "measurements.properties.size",
        unit: "units.kloc",
        scale: MeasurementScale::Continuous,
        procedure: "measurements.procedures.staticAnalysis",
        frequency: "analysis.frequency.perRelease",
    },
    MeasurementRow {
        entity: "entities.sprint",
        acronym: "DON",
        properties: "measurements.properties.completedItems",
        unit: "units.items",
        scale: MeasurementScale::Discrete,
        procedure: "measurements.procedures.boardTransition",
        frequency: "analysis.frequency.perSprint",
    },
    MeasurementRow {
        entity: "entities.sprint",
        acronym: "CMT",
        properties: "measurements.properties.committedItems",
        unit: "units.items",
        scale: MeasurementScale::Discrete,
        procedure: "measurements.procedures.sprintPlanning",
        frequency: "analysis.frequency.perSprint",
    },
    MeasurementRow {
        entity: "entities.workItem",
        acronym: "EFF",
        properties: "measurements.properties.effort",
        unit: "units.hours",
        scale: MeasurementScale::Continuous,
        procedure: "measurements.procedures.timesheet",
        frequency: "analysis.frequency.weekly",
    },
    MeasurementRow {
        entity: "entities.customer",
        acronym: "CMP",
        properties: "measurements.properties.complaints",
        unit: "units.tickets",
        scale: MeasurementScale::Discrete,
        procedure: "measurements.procedures.supportDesk",
        frequency: "analysis.frequency.monthly",
    },
];

fn measurement(row: &MeasurementRow) -> MeasurementDraft {
    MeasurementDraft {
        entity: k(row.entity),
        acronym: row.acronym.to_string(),
        properties: k(row.properties),
        unit: k(row.unit),
        scale: row.scale,
        procedure: k(row.procedure),
        frequency: k(row.frequency),
        responsible: None,
    }
}

pub(crate) fn measurements() -> Vec<MeasurementDraft> {
    MEASUREMENTS.iter().map(measurement).collect()
}

fn measurement_by_acronym(acronym: &str) -> Option<MeasurementDraft> {
    MEASUREMENTS
        .iter()
        .find(|row| row.acronym == acronym)
        .map(measurement)
}

struct MetricRow {
    key: &'static str,
    mnemonic: &'static str,
    formula: &'static str,
    range: (f64, f64),
    procedure: &'static str,
    frequency: &'static str,
    measurements: &'static [&'static str],
}

const METRICS: &[MetricRow] = &[
    MetricRow {
        key: "leadTime",
        mnemonic: "LDT",
        formula: "EDT - SDT",
        range: (0.0, 30.0),
        procedure: "analysis.procedure.trendChart",
        frequency: "analysis.frequency.weekly",
        measurements: &["SDT", "EDT"],
    },
    MetricRow {
        key: "defectDensity",
        mnemonic: "DD",
        formula: "DEF / KLC",
        range: (0.0, 5.0),
        procedure: "analysis.procedure.controlChart",
        frequency: "analysis.frequency.perRelease",
        measurements: &["DEF", "KLC"],
    },
    MetricRow {
        key: "throughput",
        mnemonic: "THR",
        formula: "DON",
        range: (5.0, 50.0),
        procedure: "analysis.procedure.trendChart",
        frequency: "analysis.frequency.perSprint",
        measurements: &["DON"],
    },
    MetricRow {
        key: "commitmentReliability",
        mnemonic: "CRL",
        formula: "DON / CMT",
        range: (0.8, 1.0),
        procedure: "analysis.procedure.controlChart",
        frequency: "analysis.frequency.perSprint",
        measurements: &["DON", "CMT"],
    },
    MetricRow {
        key: "reworkEffort",
        mnemonic: "RWK",
        formula: "sum(EFF where rework)",
        range: (0.0, 40.0),
        procedure: "analysis.procedure.paretoChart",
        frequency: "analysis.frequency.monthly",
        measurements: &["EFF"],
    },
    MetricRow {
        key: "complaintRate",
        mnemonic: "CPR",
        formula: "CMP per month",
        range: (0.0, 10.0),
        procedure: "analysis.procedure.trendChart",
        frequency: "analysis.frequency.monthly",
        measurements: &["CMP"],
    },
];

pub(crate) fn metrics() -> Vec<MetricDraft> {
    METRICS
        .iter()
        .map(|row| {
            let name = TranslationKey::parse(format!("metrics.{}.name", row.key));
            let description = TranslationKey::parse(format!("metrics.{}.description", row.key));
            MetricDraft {
                name: name.map_or_else(|_| Text::literal(row.key), Text::Key),
                description: description.map_or_else(|_| Text::literal(row.key), Text::Key),
                mnemonic: row.mnemonic.to_string(),
                formula: row.formula.to_string(),
                control_range: ControlRange {
                    min: row.range.0,
                    max: row.range.1,
                },
                analysis_procedure: k(row.procedure),
                analysis_frequency: k(row.frequency),
                analysis_responsible: String::new(),
                measurements: row
                    .measurements
                    .iter()
                    .filter_map(|a| measurement_by_acronym(a))
                    .collect(),
            }
        })
        .collect()
}
