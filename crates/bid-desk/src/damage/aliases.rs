use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Canonical names for every field the describer may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Field {
    Component,
    DamageNarrative,
    SeverityScore,
    RepairApproach,
    PartsToReplace,
    PartsToInspect,
    CostAed,
    CostEur,
    LaborHours,
    LocationRecommendation,
    Roadworthy,
    RiskFlags,
    AffectedParts,
    PartName,
    Reason,
    Evidence,
    Confidence,
    Suspicion,
    InspectionMethod,
    PartsCost,
    LaborCost,
    TotalCost,
    ExchangeRate,
    HoursRange,
    LineItems,
    LineItemName,
    Hours,
    RangeLow,
    RangeMid,
    RangeHigh,
}

static ALIAS_TABLE: OnceLock<HashMap<Field, Vec<String>>> = OnceLock::new();

fn alias_table() -> &'static HashMap<Field, Vec<String>> {
    ALIAS_TABLE.get_or_init(|| {
        // Preference order: more specific names first, German before English.
        const FIELD_ALIASES: &[(Field, &[&str])] = &[
            (
                Field::Component,
                &["hauptbauteil", "bauteil", "main_component", "component", "komponente"],
            ),
            (
                Field::DamageNarrative,
                &[
                    "schadensanalyse",
                    "schadensbeschreibung",
                    "damage_analysis",
                    "damage_narrative",
                    "damage_description",
                    "beschreibung",
                    "description",
                ],
            ),
            (
                Field::SeverityScore,
                &["schweregrad_score", "schweregrad", "severity_score", "severity"],
            ),
            (
                Field::RepairApproach,
                &["reparaturweg", "reparaturansatz", "repair_approach", "repair_method"],
            ),
            (
                Field::PartsToReplace,
                &["teile_zu_ersetzen", "zu_ersetzende_teile", "parts_to_replace"],
            ),
            (
                Field::PartsToInspect,
                &["teile_zu_pruefen", "zu_pruefende_teile", "parts_to_inspect"],
            ),
            (
                Field::CostAed,
                &[
                    "kosten_schaetzung_aed",
                    "kosten_aed",
                    "cost_estimate_aed",
                    "cost_aed",
                    "costs_aed",
                ],
            ),
            (
                Field::CostEur,
                &[
                    "kosten_schaetzung_eur",
                    "kosten_eur",
                    "cost_estimate_eur",
                    "cost_eur",
                    "costs_eur",
                ],
            ),
            (
                Field::LaborHours,
                &[
                    "arbeitsstunden_schaetzung",
                    "arbeitsstunden",
                    "labor_hours_estimate",
                    "labor_hours",
                ],
            ),
            (
                Field::LocationRecommendation,
                &[
                    "standort_tipp",
                    "standortempfehlung",
                    "location_recommendation",
                    "location_tip",
                ],
            ),
            (
                Field::Roadworthy,
                &["fahrbereit", "fahrbereitschaft", "roadworthy", "drivable"],
            ),
            (
                Field::RiskFlags,
                &["risiko_flags", "risikohinweise", "risk_flags", "risks"],
            ),
            (Field::AffectedParts, &["betroffene_teile", "affected_parts"]),
            (
                Field::PartName,
                &["teil", "teilname", "bauteil", "part_name", "part", "name"],
            ),
            (Field::Reason, &["grund", "begruendung", "reason"]),
            (Field::Evidence, &["beleg", "evidenz", "hinweis", "evidence"]),
            (Field::Confidence, &["konfidenz", "sicherheit", "confidence"]),
            (Field::Suspicion, &["verdacht", "suspicion"]),
            (
                Field::InspectionMethod,
                &["pruefmethode", "inspection_method", "methode", "method"],
            ),
            (
                Field::PartsCost,
                &["teile_range", "teile_spanne", "parts_range", "teile", "parts"],
            ),
            (
                Field::LaborCost,
                &["arbeit_range", "arbeit_spanne", "labor_range", "arbeit", "labor"],
            ),
            (
                Field::TotalCost,
                &["gesamt_range", "gesamt_spanne", "total_range", "gesamt", "total"],
            ),
            (
                Field::ExchangeRate,
                &["wechselkurs", "exchange_rate_used", "exchange_rate"],
            ),
            (
                Field::HoursRange,
                &["stunden_range", "stunden_spanne", "hours_range", "stunden", "hours"],
            ),
            (
                Field::LineItems,
                &["positionen", "arbeitsschritte", "line_items", "items"],
            ),
            (
                Field::LineItemName,
                &["bezeichnung", "taetigkeit", "name", "task"],
            ),
            (Field::Hours, &["stunden", "hours"]),
            (Field::RangeLow, &["low", "niedrig", "min", "von"]),
            (Field::RangeMid, &["mid", "mittel", "typisch", "expected"]),
            (Field::RangeHigh, &["high", "hoch", "max", "bis"]),
        ];

        let mut table = HashMap::with_capacity(FIELD_ALIASES.len());
        for (field, aliases) in FIELD_ALIASES {
            table.insert(*field, aliases.iter().map(|alias| normalize_key(alias)).collect());
        }
        table
    })
}

/// Folds casing, umlauts and separators so `Teile zu prüfen` matches `teile_zu_pruefen`.
pub(crate) fn normalize_key(key: &str) -> String {
    let mut normalized = String::with_capacity(key.len());
    for c in key.trim().chars().flat_map(char::to_lowercase) {
        match c {
            'ä' => normalized.push_str("ae"),
            'ö' => normalized.push_str("oe"),
            'ü' => normalized.push_str("ue"),
            'ß' => normalized.push_str("ss"),
            c if c.is_alphanumeric() => normalized.push(c),
            _ => {}
        }
    }
    normalized
}

/// Describer object indexed by normalized key. The first spelling of a key wins.
pub(crate) struct AliasedObject<'a> {
    entries: HashMap<String, &'a Value>,
}

impl<'a> AliasedObject<'a> {
    pub(crate) fn new(object: &'a Map<String, Value>) -> Self {
        let mut entries = HashMap::with_capacity(object.len());
        for (key, value) in object {
            entries.entry(normalize_key(key)).or_insert(value);
        }
        Self { entries }
    }

    pub(crate) fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(Self::new)
    }

    /// First non-empty value among the field's aliases.
    pub(crate) fn get(&self, field: Field) -> Option<&'a Value> {
        self.find_map(field, |value| Some(value))
    }

    /// First alias whose value `convert` accepts.
    pub(crate) fn find_map<T>(
        &self,
        field: Field,
        mut convert: impl FnMut(&'a Value) -> Option<T>,
    ) -> Option<T> {
        alias_table()
            .get(&field)?
            .iter()
            .filter_map(|alias| self.entries.get(alias).copied())
            .filter(|value| !is_blank(value))
            .find_map(|value| convert(value))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_key_folds_umlauts_and_separators() {
        assert_eq!(normalize_key("Teile zu prüfen"), "teilezupruefen");
        assert_eq!(normalize_key("teile_zu_pruefen"), "teilezupruefen");
        assert_eq!(normalize_key("severityScore"), "severityscore");
        assert_eq!(normalize_key(" KOSTEN-SCHÄTZUNG-AED "), "kostenschaetzungaed");
    }

    #[test]
    fn more_specific_alias_wins_when_both_present() {
        let value = json!({ "gesamt": 800, "gesamt_range": { "low": 700, "mid": 800, "high": 950 } });
        let object = AliasedObject::from_value(&value).expect("object");
        assert!(object.get(Field::TotalCost).expect("total").is_object());
    }

    #[test]
    fn blank_values_fall_through_to_next_alias() {
        let value = json!({ "bauteil": "", "component": "Front bumper" });
        let object = AliasedObject::from_value(&value).expect("object");
        assert_eq!(
            object.get(Field::Component).and_then(Value::as_str),
            Some("Front bumper")
        );
    }

    #[test]
    fn find_map_skips_values_that_do_not_convert() {
        let value = json!({ "schweregrad": "hoch", "severity_score": 7 });
        let object = AliasedObject::from_value(&value).expect("object");
        assert_eq!(object.find_map(Field::SeverityScore, Value::as_f64), Some(7.0));
    }

    #[test]
    fn every_field_has_aliases() {
        let table = alias_table();
        for field in [Field::Component, Field::RangeHigh, Field::LineItems, Field::ExchangeRate] {
            assert!(table.get(&field).is_some_and(|aliases| !aliases.is_empty()));
        }
    }
}
