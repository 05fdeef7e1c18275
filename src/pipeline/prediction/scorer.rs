//! Rule-based cardiovascular risk scorer.
//!
//! Additive points over fixed clinical thresholds. Deterministic, no I/O,
//! and total over its input: every missing feature just skips its rule.

use crate::models::RiskLevel;

use super::types::{round2, ModelInput, RiskAssessment, RiskFeatures};

/// Domain label appended to the risk level in `risk_type`.
pub const RISK_DOMAIN: &str = "Cardiovascular Risk";

const AGE_ADVANCED: f64 = 60.0;
const AGE_MIDDLE: f64 = 40.0;
const BMI_OBESE: f64 = 30.0;
const BMI_OVERWEIGHT: f64 = 25.0;
const SYSTOLIC_HIGH: f64 = 140.0;
const DIASTOLIC_HIGH: f64 = 90.0;
const GLUCOSE_HIGH: f64 = 126.0;
const EXERCISE_FREQUENCY_LOW: f64 = 2.0;

const LOW_RISK_EXPLANATION: &str =
    "Low risk profile. Continue maintaining healthy lifestyle habits.";

/// Score the merged model input.
pub fn score(input: &ModelInput) -> RiskAssessment {
    score_features(&input.features)
}

pub fn score_features(features: &RiskFeatures) -> RiskAssessment {
    let mut points = 0.0;
    let mut factors: Vec<&'static str> = Vec::new();

    if let Some(age) = features.age {
        if age > AGE_ADVANCED {
            points += 20.0;
            factors.push("Advanced age");
        } else if age > AGE_MIDDLE {
            points += 10.0;
        }
    }

    if let Some(bmi) = features.effective_bmi() {
        if bmi > BMI_OBESE {
            points += 15.0;
            factors.push("Obesity");
        } else if bmi > BMI_OVERWEIGHT {
            points += 8.0;
            factors.push("Overweight");
        }
    }

    let systolic_high = features.systolic.is_some_and(|v| v > SYSTOLIC_HIGH);
    let diastolic_high = features.diastolic.is_some_and(|v| v > DIASTOLIC_HIGH);
    if systolic_high || diastolic_high {
        points += 20.0;
        factors.push("High blood pressure");
    }

    if features.glucose.is_some_and(|v| v > GLUCOSE_HIGH) {
        points += 25.0;
        factors.push("High blood glucose");
    }

    // String answers count when they read "yes" in any case with
    // surrounding whitespace ignored, so "Yes" and " YES " both score.
    if features.smoking == Some(true) {
        points += 15.0;
        factors.push("Smoking");
    }

    let exercises_rarely = features
        .exercise
        .as_deref()
        .is_some_and(|e| e.eq_ignore_ascii_case("rarely"));
    let exercises_infrequently = features
        .exercise_frequency
        .is_some_and(|f| f < EXERCISE_FREQUENCY_LOW);
    if exercises_rarely || exercises_infrequently {
        points += 10.0;
        factors.push("Low physical activity");
    }

    let score = round2(f64::min(points, 100.0).max(0.0));
    let level = RiskLevel::from_score(score);

    let explanation = if factors.is_empty() {
        LOW_RISK_EXPLANATION.to_string()
    } else {
        format!(
            "Risk factors identified: {}. Consider lifestyle modifications and regular monitoring.",
            factors.join(", ")
        )
    };

    RiskAssessment {
        risk_type: format!("{} {RISK_DOMAIN}", level.as_str()),
        score,
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use uuid::Uuid;

    use super::*;
    use crate::models::FormValues;

    fn input(values: Value) -> ModelInput {
        let values: FormValues = values.as_object().cloned().unwrap();
        ModelInput::from_values(Uuid::new_v4(), values)
    }

    #[test]
    fn empty_input_is_low_risk_zero() {
        let result = score(&input(json!({})));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.risk_type, "Low Cardiovascular Risk");
        assert_eq!(result.explanation, LOW_RISK_EXPLANATION);
    }

    #[test]
    fn worked_example_scores_ninety() {
        let result = score(&input(json!({
            "systolic": 150,
            "diastolic": 95,
            "glucose": 130,
            "smoking": true,
            "exerciseFrequency": 1,
            "age": 65
        })));
        assert_eq!(result.score, 90.0);
        assert_eq!(result.risk_type, "High Cardiovascular Risk");
        assert_eq!(
            result.explanation,
            "Risk factors identified: Advanced age, High blood pressure, High blood glucose, \
             Smoking, Low physical activity. Consider lifestyle modifications and regular monitoring."
        );
    }

    #[test]
    fn stacked_rules_clamp_at_one_hundred() {
        // 20 + 15 + 20 + 25 + 15 + 10 = 105
        let result = score(&input(json!({
            "age": 70,
            "bmi": 35,
            "systolic": 160,
            "glucose": 200,
            "smoking": "yes",
            "exercise": "rarely"
        })));
        assert_eq!(result.score, 100.0);
        assert_eq!(result.risk_type, "High Cardiovascular Risk");
        assert!(result.explanation.contains("Obesity"));
    }

    #[test]
    fn middle_age_adds_points_without_label() {
        let result = score(&input(json!({"age": 45})));
        assert_eq!(result.score, 10.0);
        assert_eq!(result.explanation, LOW_RISK_EXPLANATION);
    }

    #[test]
    fn derived_bmi_matches_explicit_bmi() {
        let derived = score(&input(json!({"weight": 90, "height": 180})));
        let explicit = score(&input(json!({"bmi": 27.78})));
        assert_eq!(derived.score, 8.0);
        assert_eq!(derived, explicit);
        assert!(derived.explanation.contains("Overweight"));
    }

    #[test]
    fn diastolic_alone_triggers_blood_pressure_rule() {
        let result = score(&input(json!({"systolic": 120, "diastolic": 95})));
        assert_eq!(result.score, 20.0);
        assert!(result.explanation.contains("High blood pressure"));
    }

    #[test]
    fn thresholds_are_strict() {
        let result = score(&input(json!({
            "age": 40,
            "bmi": 25,
            "systolic": 140,
            "diastolic": 90,
            "glucose": 126,
            "exerciseFrequency": 2
        })));
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn moderate_band() {
        // glucose 25 + blood pressure 20 = 45
        let result = score(&input(json!({"glucose": 140, "systolic": 150})));
        assert_eq!(result.score, 45.0);
        assert_eq!(result.risk_type, "Moderate Cardiovascular Risk");
    }

    #[test]
    fn non_smoker_answers_score_nothing() {
        assert_eq!(score(&input(json!({"smoking": "no"}))).score, 0.0);
        assert_eq!(score(&input(json!({"smoking": false}))).score, 0.0);
    }

    #[test]
    fn smoking_yes_ignores_case_and_padding() {
        assert_eq!(score(&input(json!({"smoking": "Yes"}))).score, 15.0);
        assert_eq!(score(&input(json!({"smoking": " YES "}))).score, 15.0);
        assert_eq!(score(&input(json!({"smoking": "yesterday"}))).score, 0.0);
    }

    #[test]
    fn string_numbers_from_forms_are_scored() {
        let result = score(&input(json!({"glucose": "130", "age": "65"})));
        assert_eq!(result.score, 45.0);
    }

    #[test]
    fn key_order_does_not_matter() {
        let pairs = [
            ("age", json!(65)),
            ("systolic", json!(150)),
            ("glucose", json!(130)),
            ("smoking", json!(true)),
            ("exerciseFrequency", json!(1)),
            ("weight", json!(90)),
            ("height", json!(180)),
        ];
        let forward: FormValues = pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect();
        let reverse: FormValues = pairs.iter().rev().cloned().map(|(k, v)| (k.to_string(), v)).collect();
        let pid = Uuid::new_v4();
        assert_eq!(
            score(&ModelInput::from_values(pid, forward)),
            score(&ModelInput::from_values(pid, reverse))
        );
    }

    #[test]
    fn score_always_within_bounds() {
        let ages = [None, Some(30), Some(50), Some(90)];
        let glucoses = [None, Some(90), Some(300)];
        let smoking = [None, Some(true), Some(false)];
        for age in ages {
            for glucose in glucoses {
                for smokes in smoking {
                    let mut values = FormValues::new();
                    values.insert("bmi".into(), json!(40));
                    values.insert("systolic".into(), json!(180));
                    values.insert("exercise".into(), json!("rarely"));
                    if let Some(a) = age {
                        values.insert("age".into(), json!(a));
                    }
                    if let Some(g) = glucose {
                        values.insert("glucose".into(), json!(g));
                    }
                    if let Some(s) = smokes {
                        values.insert("smoking".into(), json!(s));
                    }
                    let result = score(&ModelInput::from_values(Uuid::nil(), values));
                    assert!((0.0..=100.0).contains(&result.score));
                }
            }
        }
    }
}
