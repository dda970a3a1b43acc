use crate::calories::round_half_up;
use crate::errors::AppError;
use crate::models::{
    BmiCategory, BmiReading, Gender, Goals, HeightUnit, Metabolics, Profile, WeightUnit,
};
use crate::store::{GOALS_KEY, KeyValueStore, PROFILE_KEY};
use tracing::info;

const KG_PER_LB: f64 = 0.453592;
const M_PER_FT: f64 = 0.3048;

pub fn compute_metabolics(profile: &Profile) -> Metabolics {
    let offset = match profile.gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    let bmr = round_half_up(
        10.0 * profile.weight_kg() + 6.25 * profile.height_cm() - 5.0 * profile.age_years() + offset,
    );
    let tdee = round_half_up(bmr * profile.activity_factor());
    Metabolics {
        bmr: bmr as i64,
        tdee: tdee as i64,
    }
}

pub fn load_profile<S: KeyValueStore>(store: &S) -> Profile {
    store.get(PROFILE_KEY, Profile::default())
}

pub fn save_profile<S: KeyValueStore>(store: &mut S, profile: &Profile) -> Result<Metabolics, AppError> {
    let profile = Profile {
        name: profile.name.trim().to_string(),
        ..profile.clone()
    };
    store.set(PROFILE_KEY, &profile)?;
    let metabolics = compute_metabolics(&profile);
    info!(bmr = metabolics.bmr, tdee = metabolics.tdee, "profile saved");
    Ok(metabolics)
}

pub fn load_goals<S: KeyValueStore>(store: &S) -> Goals {
    store.get(GOALS_KEY, Goals::default())
}

pub fn save_goals<S: KeyValueStore>(store: &mut S, goals: Goals) -> Result<Goals, AppError> {
    let goals = goals.normalized();
    store.set(GOALS_KEY, &goals)?;
    info!(burn = goals.burn, workouts = goals.workouts, cals = goals.cals, "goals saved");
    Ok(goals)
}

/// Returns `None` unless both measurements are present and positive.
pub fn compute_bmi(
    weight: Option<f64>,
    weight_unit: WeightUnit,
    height: Option<f64>,
    height_unit: HeightUnit,
) -> Option<BmiReading> {
    let weight = weight.filter(|w| w.is_finite() && *w > 0.0)?;
    let height = height.filter(|h| h.is_finite() && *h > 0.0)?;

    let kg = match weight_unit {
        WeightUnit::Kg => weight,
        WeightUnit::Lb => weight * KG_PER_LB,
    };
    let meters = match height_unit {
        HeightUnit::Cm => height / 100.0,
        HeightUnit::M => height,
        HeightUnit::Ft => height * M_PER_FT,
    };

    let value = kg / (meters * meters);
    let category = if value < 18.5 {
        BmiCategory::Underweight
    } else if value < 25.0 {
        BmiCategory::Normal
    } else if value < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    };
    Some(BmiReading { value, category })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStore;

    fn profile(gender: Gender, age: f64, weight: f64, height: f64, activity: f64) -> Profile {
        Profile {
            name: String::new(),
            gender,
            age,
            weight,
            height,
            activity,
        }
    }

    fn mifflin(p: &Profile) -> i64 {
        let offset = if p.gender == Gender::Male { 5.0 } else { -161.0 };
        (10.0 * p.weight + 6.25 * p.height - 5.0 * p.age + offset + 0.5).floor() as i64
    }

    #[test]
    fn default_male_profile() {
        let p = profile(Gender::Male, 25.0, 70.0, 170.0, 1.375);
        let m = compute_metabolics(&p);
        // 700 + 1062.5 - 125 + 5 = 1642.5
        assert_eq!(m.bmr, 1643);
        assert_eq!(m.tdee, 2259);
    }

    #[test]
    fn formula_holds_across_profiles() {
        let profiles = [
            profile(Gender::Female, 25.0, 70.0, 170.0, 1.2),
            profile(Gender::Female, 42.0, 58.5, 162.0, 1.55),
            profile(Gender::Male, 33.0, 88.0, 184.0, 1.725),
            profile(Gender::Male, 61.0, 74.2, 171.0, 1.9),
        ];
        for p in &profiles {
            let m = compute_metabolics(p);
            let bmr = mifflin(p);
            assert_eq!(m.bmr, bmr, "{p:?}");
            assert_eq!(m.tdee, (bmr as f64 * p.activity + 0.5).floor() as i64, "{p:?}");
        }
        // 700 + 1062.5 - 125 - 161 = 1476.5
        assert_eq!(compute_metabolics(&profiles[0]).bmr, 1477);
    }

    #[test]
    fn malformed_profile_uses_defaults() {
        let p = profile(Gender::Male, f64::NAN, 0.0, -5.0, f64::NAN);
        assert_eq!(compute_metabolics(&p), compute_metabolics(&Profile::default()));
    }

    #[test]
    fn profile_save_replaces_wholesale() {
        let mut store = JsonStore::new();
        let p = Profile {
            name: "  Sam Rivera ".into(),
            gender: Gender::Female,
            ..Profile::default()
        };
        save_profile(&mut store, &p).unwrap();
        let loaded = load_profile(&store);
        assert_eq!(loaded.name, "Sam Rivera");
        assert_eq!(loaded.gender, Gender::Female);
    }

    #[test]
    fn goals_fall_back_and_normalize() {
        let mut store = JsonStore::new();
        assert_eq!(load_goals(&store), Goals::default());

        let saved = save_goals(
            &mut store,
            Goals {
                burn: 2000.0,
                workouts: 0.0,
                cals: 12_000.0,
            },
        )
        .unwrap();
        assert_eq!(saved.workouts, 4.0);
        assert_eq!(load_goals(&store), saved);
    }

    #[test]
    fn bmi_in_metric_and_imperial_units() {
        let reading = compute_bmi(Some(70.0), WeightUnit::Kg, Some(175.0), HeightUnit::Cm).unwrap();
        assert!((reading.value - 22.857).abs() < 0.01);
        assert_eq!(reading.category, BmiCategory::Normal);

        let reading = compute_bmi(Some(220.0), WeightUnit::Lb, Some(5.5), HeightUnit::Ft).unwrap();
        assert_eq!(reading.category, BmiCategory::Obese);

        let reading = compute_bmi(Some(50.0), WeightUnit::Kg, Some(1.8), HeightUnit::M).unwrap();
        assert_eq!(reading.category, BmiCategory::Underweight);
    }

    #[test]
    fn bmi_requires_both_values() {
        assert!(compute_bmi(None, WeightUnit::Kg, Some(170.0), HeightUnit::Cm).is_none());
        assert!(compute_bmi(Some(70.0), WeightUnit::Kg, Some(0.0), HeightUnit::Cm).is_none());
    }
}
