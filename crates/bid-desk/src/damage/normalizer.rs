use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

use super::aliases::{AliasedObject, Field};
use super::report::{
    AedCostEstimate, CostRange, DamageReport, EurCostEstimate, LaborHoursEstimate, LaborLineItem,
    PartInspection, PartReplacement, Roadworthiness, SeverityLevel,
};
use super::DamageReportError;
use crate::valuation::ExchangeRate;

pub const DEFAULT_SEVERITY_SCORE: u8 = 5;
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Maps a parsed describer object onto the strict report shape.
pub fn normalize_value(value: &Value, rate: ExchangeRate) -> Result<DamageReport, DamageReportError> {
    let object = AliasedObject::from_value(value).ok_or(DamageReportError::NoJsonFound)?;

    let severity_score = severity_score(&object);
    let parts_to_replace = parts_to_replace(&object);
    let parts_to_inspect = parts_to_inspect(&object);
    let cost_aed = object
        .get(Field::CostAed)
        .map(aed_estimate)
        .unwrap_or_default();
    let cost_eur = eur_estimate(object.get(Field::CostEur), &cost_aed, rate);

    let mut affected_parts = string_set(object.get(Field::AffectedParts));
    if affected_parts.is_empty() {
        affected_parts = parts_to_replace
            .iter()
            .map(|part| part.part_name.clone())
            .chain(parts_to_inspect.iter().map(|part| part.part_name.clone()))
            .collect();
    }

    Ok(DamageReport {
        component: text(&object, Field::Component),
        damage_narrative: text(&object, Field::DamageNarrative),
        severity_score,
        severity: SeverityLevel::from_score(f64::from(severity_score)),
        repair_approach: text(&object, Field::RepairApproach),
        parts_to_replace,
        parts_to_inspect,
        estimated_repair_cost: cost_eur.total_range.mid,
        cost_aed,
        cost_eur,
        labor_hours_estimate: object.get(Field::LaborHours).and_then(labor_hours),
        location_recommendation: text(&object, Field::LocationRecommendation),
        roadworthy: object
            .get(Field::Roadworthy)
            .map(roadworthiness)
            .unwrap_or_default(),
        risk_flags: string_set(object.get(Field::RiskFlags)),
        affected_parts,
        severity_breakdown: None,
    })
}

/// Integer score in 1..=10. Fractions truncate; missing, zero or garbage become 5.
fn severity_score(object: &AliasedObject<'_>) -> u8 {
    let score = object
        .find_map(Field::SeverityScore, number)
        .map(f64::trunc)
        .filter(|score| *score != 0.0);

    match score {
        Some(score) => score.clamp(1.0, 10.0) as u8,
        None => {
            debug!("describer sent no usable severity score, using midpoint");
            DEFAULT_SEVERITY_SCORE
        }
    }
}

fn text(object: &AliasedObject<'_>, field: Field) -> String {
    object.find_map(field, value_text).unwrap_or_default()
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(value_text)
                .filter(|item| !item.is_empty())
                .collect::<Vec<_>>()
                .join("; ");
            Some(joined).filter(|joined| !joined.is_empty())
        }
        _ => None,
    }
}

/// Numbers, or strings such as `"1,200 AED"` / `"1.250,50"`.
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_lenient_number(text),
        _ => None,
    }
    .filter(|number| number.is_finite())
}

/// Reads the first number in free text. `"3/10"` is 3, `"7 von 10"` is 7.
fn parse_lenient_number(raw: &str) -> Option<f64> {
    let (start, end) = *numeric_spans(raw).first()?;
    parse_number_token(&raw[start..end])
}

/// `"1500-2500 AED"` or `"1.500 bis 2.500"` as a low/high pair.
fn text_range(raw: &str) -> Option<(f64, f64)> {
    let spans = numeric_spans(raw);
    let [(first_start, first_end), (second_start, second_end), ..] = spans.as_slice() else {
        return None;
    };
    let gap = raw[*first_end..*second_start].trim().to_lowercase();
    if !RANGE_SEPARATORS.contains(&gap.as_str()) {
        return None;
    }
    Some((
        parse_number_token(&raw[*first_start..*first_end])?,
        parse_number_token(&raw[*second_start..*second_end])?,
    ))
}

const RANGE_SEPARATORS: &[&str] = &["-", "\u{2013}", "bis", "to"];

/// Byte spans of digit runs with inner `.`/`,` separators. Only the first
/// span may carry a leading minus.
fn numeric_spans(raw: &str) -> Vec<(usize, usize)> {
    let bytes = raw.as_bytes();
    let mut spans = Vec::new();
    let mut index = 0;

    while index < bytes.len() {
        if !bytes[index].is_ascii_digit() {
            index += 1;
            continue;
        }

        let mut start = index;
        let signed = start > 0
            && bytes[start - 1] == b'-'
            && (start == 1 || !bytes[start - 2].is_ascii_digit());
        if spans.is_empty() && signed {
            start -= 1;
        }

        while index < bytes.len()
            && (bytes[index].is_ascii_digit() || matches!(bytes[index], b'.' | b','))
        {
            index += 1;
        }

        let mut end = index;
        while end > start && matches!(bytes[end - 1], b'.' | b',') {
            end -= 1;
        }
        spans.push((start, end));
    }

    spans
}

fn parse_number_token(token: &str) -> Option<f64> {
    let cleaned = match (token.rfind('.'), token.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => token.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => token.replace(',', ""),
        (None, Some(_)) if is_thousands_grouped(token, ',') => token.replace(',', ""),
        (None, Some(_)) => token.replace(',', "."),
        (Some(_), None) if is_thousands_grouped(token, '.') => token.replace('.', ""),
        _ => token.to_string(),
    };

    cleaned.parse::<f64>().ok()
}

/// `1.500`, `12.500.000`: a non-zero head of 1-3 digits, then groups of three.
fn is_thousands_grouped(text: &str, separator: char) -> bool {
    let mut groups = text.trim_start_matches('-').split(separator);
    let head_ok = groups
        .next()
        .is_some_and(|head| (1..=3).contains(&head.len()) && !head.starts_with('0'));
    head_ok && groups.all(|group| group.len() == 3)
}

/// Accepts a scalar, a `"low-high"` string, a `{low, mid, high}` object or a
/// `[low, high]` pair.
/// Returns the ordered range and the scalar when one was given.
fn cost_range(value: &Value) -> Option<(CostRange, Option<f64>)> {
    let (low, mid, high) = match value {
        Value::String(text) => match text_range(text) {
            Some((low, high)) => (Some(low), None, Some(high)),
            None => return scalar_range(value),
        },
        Value::Number(_) => return scalar_range(value),
        Value::Object(_) => {
            let object = AliasedObject::from_value(value)?;
            (
                object.find_map(Field::RangeLow, number),
                object.find_map(Field::RangeMid, number),
                object.find_map(Field::RangeHigh, number),
            )
        }
        Value::Array(items) => {
            let numbers: Vec<f64> = items.iter().filter_map(number).collect();
            match numbers.as_slice() {
                [low, high] => (Some(*low), None, Some(*high)),
                [low, mid, high, ..] => (Some(*low), Some(*mid), Some(*high)),
                [single] => (Some(*single), None, None),
                [] => (None, None, None),
            }
        }
        _ => (None, None, None),
    };

    let low = low.or(mid).or(high)?;
    let high = high.or(mid).unwrap_or(low);
    let mid = mid.unwrap_or((low + high) / 2.0);

    let mut ordered = [low.max(0.0), mid.max(0.0), high.max(0.0)];
    ordered.sort_by(f64::total_cmp);
    Some((
        CostRange {
            low: ordered[0],
            mid: ordered[1],
            high: ordered[2],
        },
        None,
    ))
}

fn scalar_range(value: &Value) -> Option<(CostRange, Option<f64>)> {
    let scalar = number(value)?.max(0.0);
    Some((CostRange::flat(scalar), Some(scalar)))
}

fn add_ranges(left: CostRange, right: CostRange) -> CostRange {
    CostRange {
        low: left.low + right.low,
        mid: left.mid + right.mid,
        high: left.high + right.high,
    }
}

fn aed_estimate(value: &Value) -> AedCostEstimate {
    let Some(object) = AliasedObject::from_value(value) else {
        // bare number: the describer only sent a total
        let (total_range, scalar) = cost_range(value).unwrap_or_default();
        return AedCostEstimate {
            total_range,
            total: scalar.unwrap_or(total_range.mid),
            ..AedCostEstimate::default()
        };
    };

    let parts = object.find_map(Field::PartsCost, cost_range);
    let labor = object.find_map(Field::LaborCost, cost_range);
    let total = object.find_map(Field::TotalCost, cost_range).or_else(|| {
        let parts = parts.map(|(range, _)| range).unwrap_or_default();
        let labor = labor.map(|(range, _)| range).unwrap_or_default();
        let sum = add_ranges(parts, labor);
        Some((sum, None)).filter(|_| !sum.is_zero())
    });

    let (parts_range, parts_scalar) = parts.unwrap_or_default();
    let (labor_range, labor_scalar) = labor.unwrap_or_default();
    let (total_range, total_scalar) = total.unwrap_or_default();

    AedCostEstimate {
        parts_range,
        labor_range,
        total_range,
        parts: parts_scalar.unwrap_or(parts_range.mid),
        labor: labor_scalar.unwrap_or(labor_range.mid),
        total: total_scalar.unwrap_or(total_range.mid),
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Uses the describer's EUR figures when present, otherwise converts the AED total.
fn eur_estimate(value: Option<&Value>, aed: &AedCostEstimate, rate: ExchangeRate) -> EurCostEstimate {
    let object = value.and_then(AliasedObject::from_value);
    let quoted_rate = object
        .as_ref()
        .and_then(|object| object.find_map(Field::ExchangeRate, number))
        .filter(|rate| *rate > 0.0);
    let rate_used = quoted_rate.unwrap_or_else(|| rate.aed_per_eur());

    let quoted_total = match &object {
        Some(object) => object.find_map(Field::TotalCost, cost_range),
        None => value.and_then(cost_range),
    }
    .map(|(range, _)| range)
    .filter(|range| !range.is_zero());

    let total_range = quoted_total.unwrap_or_else(|| {
        let converted = aed.total_range.scaled(1.0 / rate_used);
        CostRange {
            low: round_cents(converted.low),
            mid: round_cents(converted.mid),
            high: round_cents(converted.high),
        }
    });

    EurCostEstimate {
        total_range,
        exchange_rate_used: rate_used,
    }
}

fn confidence(object: &AliasedObject<'_>) -> f64 {
    let raw = object
        .find_map(Field::Confidence, number)
        .unwrap_or(DEFAULT_CONFIDENCE);
    let scaled = if raw > 1.0 && raw <= 100.0 {
        raw / 100.0
    } else {
        raw
    };
    scaled.clamp(0.0, 1.0)
}

fn list(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn parts_to_replace(object: &AliasedObject<'_>) -> Vec<PartReplacement> {
    list(object.get(Field::PartsToReplace))
        .iter()
        .filter_map(|entry| {
            if let Some(name) = entry.as_str() {
                return Some(PartReplacement {
                    part_name: name.trim().to_string(),
                    reason: String::new(),
                    evidence: String::new(),
                    confidence: DEFAULT_CONFIDENCE,
                })
                .filter(|part| !part.part_name.is_empty());
            }
            let part = AliasedObject::from_value(entry)?;
            let part_name = text(&part, Field::PartName);
            if part_name.is_empty() {
                return None;
            }
            Some(PartReplacement {
                part_name,
                reason: text(&part, Field::Reason),
                evidence: text(&part, Field::Evidence),
                confidence: confidence(&part),
            })
        })
        .collect()
}

fn parts_to_inspect(object: &AliasedObject<'_>) -> Vec<PartInspection> {
    list(object.get(Field::PartsToInspect))
        .iter()
        .filter_map(|entry| {
            if let Some(name) = entry.as_str() {
                return Some(PartInspection {
                    part_name: name.trim().to_string(),
                    suspicion: String::new(),
                    inspection_method: String::new(),
                    confidence: DEFAULT_CONFIDENCE,
                })
                .filter(|part| !part.part_name.is_empty());
            }
            let part = AliasedObject::from_value(entry)?;
            let part_name = text(&part, Field::PartName);
            if part_name.is_empty() {
                return None;
            }
            Some(PartInspection {
                part_name,
                suspicion: text(&part, Field::Suspicion),
                inspection_method: text(&part, Field::InspectionMethod),
                confidence: confidence(&part),
            })
        })
        .collect()
}

fn labor_hours(value: &Value) -> Option<LaborHoursEstimate> {
    let Some(object) = AliasedObject::from_value(value) else {
        return cost_range(value).map(|(hours_range, _)| LaborHoursEstimate {
            hours_range,
            line_items: Vec::new(),
        });
    };

    let line_items: Vec<LaborLineItem> = list(object.get(Field::LineItems))
        .iter()
        .filter_map(AliasedObject::from_value)
        .filter_map(|item| {
            let name = text(&item, Field::LineItemName);
            let hours = item.find_map(Field::Hours, number)?.max(0.0);
            Some(LaborLineItem { name, hours })
        })
        .collect();

    let hours_range = object
        .find_map(Field::HoursRange, cost_range)
        .map(|(range, _)| range)
        .or_else(|| {
            let sum: f64 = line_items.iter().map(|item| item.hours).sum();
            Some(CostRange::flat(sum)).filter(|_| !line_items.is_empty())
        })?;

    Some(LaborHoursEstimate {
        hours_range,
        line_items,
    })
}

fn roadworthiness(value: &Value) -> Roadworthiness {
    match value {
        Value::Bool(true) => Roadworthiness::Yes,
        Value::Bool(false) => Roadworthiness::No,
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "yes" | "ja" | "true" | "y" | "j" => Roadworthiness::Yes,
            "no" | "nein" | "false" | "n" => Roadworthiness::No,
            _ => Roadworthiness::Unknown,
        },
        _ => Roadworthiness::Unknown,
    }
}

fn string_set(value: Option<&Value>) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    match value {
        Some(Value::Array(items)) => {
            for item in items.iter().filter_map(value_text) {
                set.insert(item);
            }
        }
        Some(Value::String(text)) => {
            for item in text.split([',', ';']) {
                set.insert(item.trim().to_string());
            }
        }
        _ => {}
    }
    set.retain(|item| !item.is_empty());
    set
}
