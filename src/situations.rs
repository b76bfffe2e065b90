use std::collections::{BTreeMap, HashMap};

use crate::model::{FormationRow, Situation, SituationRow};
use crate::stats::safe_div;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SideTotals {
    pub shots: f64,
    pub goals: f64,
    pub xg: f64,
}

impl SideTotals {
    fn add(&mut self, shots: f64, goals: f64, xg: f64) {
        self.shots += shots;
        self.goals += goals;
        self.xg += xg;
    }

    pub fn xg_per_shot(&self) -> f64 {
        safe_div(self.xg, self.shots)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SituationSplit {
    pub situation: Situation,
    pub for_side: SideTotals,
    pub against: SideTotals,
}

/// Created and conceded rows keyed by situation. Known situations come first in their
/// fixed order, unknown tags follow alphabetically (the `Situation` ordering).
pub fn merge_situations(created: &[SituationRow], conceded: &[SituationRow]) -> Vec<SituationSplit> {
    let mut merged: BTreeMap<Situation, (SideTotals, SideTotals)> = BTreeMap::new();
    for row in created {
        merged
            .entry(Situation::from_tag(&row.situation))
            .or_default()
            .0
            .add(row.shots, row.goals, row.xg);
    }
    for row in conceded {
        merged
            .entry(Situation::from_tag(&row.situation))
            .or_default()
            .1
            .add(row.shots, row.goals, row.xg);
    }
    merged
        .into_iter()
        .map(|(situation, (for_side, against))| SituationSplit {
            situation,
            for_side,
            against,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMetric {
    Shots,
    Goals,
    Xg,
}

impl SplitMetric {
    pub fn label(self) -> &'static str {
        match self {
            SplitMetric::Shots => "Shots",
            SplitMetric::Goals => "Goals",
            SplitMetric::Xg => "xG",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SplitMetric::Shots => SplitMetric::Goals,
            SplitMetric::Goals => SplitMetric::Xg,
            SplitMetric::Xg => SplitMetric::Shots,
        }
    }

    fn pick(self, totals: &SideTotals) -> f64 {
        match self {
            SplitMetric::Shots => totals.shots,
            SplitMetric::Goals => totals.goals,
            SplitMetric::Xg => totals.xg,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MirroredBar {
    pub label: String,
    /// Value for the team, always >= 0.
    pub for_value: f64,
    /// Value against the team, negated so it draws below the axis.
    pub against_value: f64,
    pub for_xg_per_shot: f64,
    pub against_xg_per_shot: f64,
}

pub fn mirrored_series(splits: &[SituationSplit], metric: SplitMetric) -> Vec<MirroredBar> {
    splits
        .iter()
        .map(|split| MirroredBar {
            label: split.situation.label().to_string(),
            for_value: metric.pick(&split.for_side),
            against_value: -metric.pick(&split.against),
            for_xg_per_shot: split.for_side.xg_per_shot(),
            against_xg_per_shot: split.against.xg_per_shot(),
        })
        .collect()
}

/// Share of the team's xG that came from set pieces (corners, set plays, direct free kicks).
pub fn set_piece_xg_share(splits: &[SituationSplit]) -> f64 {
    let total: f64 = splits.iter().map(|s| s.for_side.xg).sum();
    let set_piece: f64 = splits
        .iter()
        .filter(|s| s.situation.is_set_piece())
        .map(|s| s.for_side.xg)
        .sum();
    safe_div(set_piece, total)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormationSplit {
    pub formation: String,
    pub minutes: f64,
    pub for_side: SideTotals,
    pub against: SideTotals,
}

/// Formation usage merged across both endpoints, most-used shape first.
pub fn merge_formations(
    created: &[FormationRow],
    conceded: &[FormationRow],
) -> Vec<FormationSplit> {
    let mut merged: HashMap<&str, FormationSplit> = HashMap::new();
    for row in created {
        let entry = merged
            .entry(row.formation.as_str())
            .or_insert_with(|| empty_formation(row));
        entry.minutes = entry.minutes.max(row.minutes);
        entry.for_side.add(row.shots, row.goals, row.xg);
    }
    for row in conceded {
        let entry = merged
            .entry(row.formation.as_str())
            .or_insert_with(|| empty_formation(row));
        entry.minutes = entry.minutes.max(row.minutes);
        entry.against.add(row.shots, row.goals, row.xg);
    }
    let mut out: Vec<FormationSplit> = merged.into_values().collect();
    out.sort_by(|a, b| {
        b.minutes
            .total_cmp(&a.minutes)
            .then_with(|| a.formation.cmp(&b.formation))
    });
    out
}

fn empty_formation(row: &FormationRow) -> FormationSplit {
    FormationSplit {
        formation: row.formation.clone(),
        minutes: 0.0,
        for_side: SideTotals::default(),
        against: SideTotals::default(),
    }
}
