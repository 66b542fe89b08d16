//! Body composition calculations module
//!
//! Estimates BMI, BMR/TDEE, lean body mass and the smart-scale composition
//! metrics (fat, water, bone, muscle, protein, visceral fat, ideal weight)
//! from height, weight, age and gender.
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: Every calculation is deterministic with no side effects
//! 2. **Fitted, Not Fixed**: The regressions come from a fitness-tracker algorithm
//!    and keep its discontinuities and overrides exactly
//! 3. **Clamped Outputs**: Bounded metrics always end in their domain range
//! 4. **No Validation**: Inputs are checked at the system boundary, not here

use serde::{Deserialize, Serialize};

// ============================================================================
// Input Types
// ============================================================================

/// Gender used by the composition regressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Resolve a free-form label. Only the exact label `"male"` is male,
    /// anything else is treated as female.
    pub fn from_label(label: &str) -> Self {
        if label == "male" {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activity level for TDEE calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    #[default]
    Sedentary,
    /// Light exercise 1-3 days/week
    LightlyActive,
    /// Moderate exercise 3-5 days/week
    ModeratelyActive,
    /// Hard exercise 6-7 days/week
    VeryActive,
    /// Very hard exercise, physical job
    ExtraActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    /// Get the activity multiplier for TDEE calculation
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    /// Find the level whose multiplier matches `factor`
    pub fn from_multiplier(factor: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| (level.multiplier() - factor).abs() < 1e-9)
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little or no exercise",
            ActivityLevel::LightlyActive => "Light exercise 1-3 days/week",
            ActivityLevel::ModeratelyActive => "Moderate exercise 3-5 days/week",
            ActivityLevel::VeryActive => "Hard exercise 6-7 days/week",
            ActivityLevel::ExtraActive => "Very hard exercise or physical job",
        }
    }
}

/// Algorithm variant for metrics that have two published formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormulaVariant {
    /// Mi Fit compatible formula
    #[default]
    Original,
    /// Legacy guessed formula
    Alternate,
}

/// One measurement to run through the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementInput {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age_years: u32,
    pub gender: Gender,
    pub activity_factor: f64,
}

/// Variant selection for a full calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CalculationOptions {
    #[serde(default)]
    pub protein: FormulaVariant,
    #[serde(default)]
    pub ideal_weight: FormulaVariant,
}

/// Complete engine output for one measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub bmi: f64,
    pub gender: Gender,
    pub bmr: f64,
    pub tdee: f64,
    pub lean_body_mass: f64,
    pub fat_percentage: f64,
    pub water_percentage: f64,
    pub bone_mass: f64,
    pub muscle_mass: f64,
    pub protein_percentage: f64,
    pub visceral_fat: f64,
    pub ideal_weight: f64,
}

// ============================================================================
// Domain Ranges
// ============================================================================

pub const FAT_PERCENTAGE_RANGE: (f64, f64) = (5.0, 75.0);
pub const WATER_PERCENTAGE_RANGE: (f64, f64) = (35.0, 75.0);
pub const BONE_MASS_RANGE: (f64, f64) = (0.5, 8.0);
pub const MUSCLE_MASS_RANGE: (f64, f64) = (10.0, 120.0);
pub const PROTEIN_PERCENTAGE_RANGE: (f64, f64) = (5.0, 32.0);
pub const VISCERAL_FAT_RANGE: (f64, f64) = (1.0, 50.0);
pub const IDEAL_WEIGHT_RANGE: (f64, f64) = (5.5, 198.0);

/// Readings whose BMI is at or below this are scale noise, not a person
pub const MEANINGFUL_BMI_THRESHOLD: f64 = 12.0;

/// Bound `value` to `[minimum, maximum]`
pub fn clamp(value: f64, minimum: f64, maximum: f64) -> f64 {
    if value < minimum {
        minimum
    } else if value > maximum {
        maximum
    } else {
        value
    }
}

fn clamp_to(value: f64, range: (f64, f64)) -> f64 {
    clamp(value, range.0, range.1)
}

// ============================================================================
// BMI, BMR and Lean Body Mass
// ============================================================================

/// Calculate BMI from weight and height
///
/// Formula: BMI = weight(kg) / height(m)²
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Whether a scale reading looks like a person standing on it
pub fn is_meaningful_weight(weight_kg: f64, height_cm: f64) -> bool {
    calculate_bmi(weight_kg, height_cm) > MEANINGFUL_BMI_THRESHOLD
}

/// Calculate BMR using the revised Harris-Benedict equation
///
/// Men: BMR = 88.362 + 13.397 × weight(kg) + 4.799 × height(cm) - 5.677 × age(y)
/// Women: BMR = 447.593 + 9.247 × weight(kg) + 3.098 × height(cm) - 4.330 × age(y)
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age_years: u32, gender: Gender) -> f64 {
    let age = f64::from(age_years);
    match gender {
        Gender::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age,
        Gender::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age,
    }
}

/// Calculate `(bmr, tdee)` where TDEE = BMR × activity factor
pub fn calculate_bmr_tdee(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    gender: Gender,
    activity_factor: f64,
) -> (f64, f64) {
    let bmr = calculate_bmr(weight_kg, height_cm, age_years, gender);
    (bmr, bmr * activity_factor)
}

/// Calculate lean body mass (kg) with the Boer regression
pub fn calculate_lean_body_mass(weight_kg: f64, height_cm: f64, gender: Gender) -> f64 {
    match gender {
        Gender::Male => 0.32810 * weight_kg + 0.33929 * height_cm - 29.5336,
        Gender::Female => 0.29569 * weight_kg + 0.41813 * height_cm - 43.2933,
    }
}

// ============================================================================
// Fat and Water
// ============================================================================

fn fat_lbm_offset(age_years: u32, gender: Gender) -> f64 {
    match gender {
        Gender::Female if age_years <= 49 => 9.25,
        Gender::Female => 7.25,
        Gender::Male => 0.8,
    }
}

fn fat_coefficient(weight_kg: f64, height_cm: f64, gender: Gender) -> f64 {
    let tall_bonus = if height_cm > 160.0 { 1.03 } else { 1.0 };
    match gender {
        Gender::Male if weight_kg < 61.0 => 0.98,
        Gender::Female if weight_kg > 60.0 => 0.96 * tall_bonus,
        Gender::Female if weight_kg < 50.0 => 1.02 * tall_bonus,
        _ => 1.0,
    }
}

/// Apply the fat percentage ceiling override and clamp.
///
/// Anything strictly above 63 saturates at 75.
pub fn cap_fat_percentage(raw: f64) -> f64 {
    let capped = if raw > 63.0 { 75.0 } else { raw };
    clamp_to(capped, FAT_PERCENTAGE_RANGE)
}

/// Estimate body fat percentage from lean body mass
pub fn calculate_fat_percentage(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    gender: Gender,
) -> f64 {
    let lbm = calculate_lean_body_mass(weight_kg, height_cm, gender);
    let offset = fat_lbm_offset(age_years, gender);
    let coefficient = fat_coefficient(weight_kg, height_cm, gender);

    let raw = (1.0 - ((lbm - offset) * coefficient) / weight_kg) * 100.0;
    cap_fat_percentage(raw)
}

/// Estimate body water percentage from fat percentage
pub fn calculate_water_percentage(fat_percentage: f64) -> f64 {
    let water = (100.0 - fat_percentage) * 0.7;
    let coefficient = if water <= 50.0 { 1.02 } else { 0.98 };

    let adjusted = water * coefficient;
    let capped = if adjusted >= 65.0 { 75.0 } else { adjusted };
    clamp_to(capped, WATER_PERCENTAGE_RANGE)
}

// ============================================================================
// Bone, Muscle and Protein
// ============================================================================

/// Estimate bone mass (kg) from lean body mass
pub fn calculate_bone_mass(weight_kg: f64, height_cm: f64, gender: Gender) -> f64 {
    let base = match gender {
        Gender::Female => 0.245691014,
        Gender::Male => 0.18016894,
    };
    let lbm = calculate_lean_body_mass(weight_kg, height_cm, gender);

    let mut bone = -(base - lbm * 0.05158);
    if bone > 2.2 {
        bone += 0.1;
    } else {
        bone -= 0.1;
    }

    let ceiling = match gender {
        Gender::Female => 5.1,
        Gender::Male => 5.2,
    };
    if bone > ceiling {
        bone = 8.0;
    }

    clamp_to(bone, BONE_MASS_RANGE)
}

/// Estimate muscle mass (kg) as what remains after fat and bone
pub fn calculate_muscle_mass(
    weight_kg: f64,
    gender: Gender,
    fat_percentage: f64,
    bone_mass: f64,
) -> f64 {
    let muscle = weight_kg - fat_percentage * 0.01 * weight_kg - bone_mass;

    let ceiling = match gender {
        Gender::Female => 84.0,
        Gender::Male => 93.5,
    };
    let capped = if muscle >= ceiling { 120.0 } else { muscle };
    clamp_to(capped, MUSCLE_MASS_RANGE)
}

fn floor_hundredths(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}

/// Estimate protein percentage.
///
/// The alternate variant floors each term to two decimals before subtracting.
pub fn calculate_protein_percentage(
    weight_kg: f64,
    muscle_mass: f64,
    fat_percentage: f64,
    water_percentage: f64,
    bone_mass: f64,
    variant: FormulaVariant,
) -> f64 {
    let protein = match variant {
        FormulaVariant::Original => (muscle_mass / weight_kg) * 100.0 - water_percentage,
        FormulaVariant::Alternate => {
            100.0
                - floor_hundredths(fat_percentage)
                - floor_hundredths(water_percentage)
                - floor_hundredths(bone_mass / weight_kg * 100.0)
        }
    };
    clamp_to(protein, PROTEIN_PERCENTAGE_RANGE)
}

// ============================================================================
// Visceral Fat and Ideal Weight
// ============================================================================

fn raw_visceral_fat(weight_kg: f64, height_cm: f64, age_years: u32, gender: Gender) -> f64 {
    let (w, h, a) = (weight_kg, height_cm, f64::from(age_years));
    match gender {
        Gender::Female => {
            if w > -(13.0 - h * 0.5) {
                let subsub = (h * 1.45 + h * 0.1158 * h) - 120.0;
                let sub = w * 500.0 / subsub;
                (sub - 6.0) + a * 0.07
            } else {
                let sub = 0.691 - 0.0024 * h - 0.0024 * h;
                -((h * 0.027) - sub * w) + a * 0.07 - a
            }
        }
        Gender::Male => {
            if h < w * 1.6 {
                let sub = -((h * 0.4) - h * h * 0.0826);
                (w * 305.0) / (sub + 48.0) - 2.9 + a * 0.15
            } else {
                let sub = 0.765 - 0.0015 * h;
                -((h * 0.143) - w * sub) + a * 0.15 - 5.0
            }
        }
    }
}

/// Estimate the visceral fat index.
///
/// Each gender has two regressions split on a height/weight line; values jump
/// at the split.
pub fn calculate_visceral_fat(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    gender: Gender,
) -> f64 {
    clamp_to(
        raw_visceral_fat(weight_kg, height_cm, age_years, gender),
        VISCERAL_FAT_RANGE,
    )
}

/// Calculate ideal weight (kg)
pub fn calculate_ideal_weight(height_cm: f64, gender: Gender, variant: FormulaVariant) -> f64 {
    match variant {
        FormulaVariant::Original => match gender {
            Gender::Female => (height_cm - 70.0) * 0.6,
            Gender::Male => (height_cm - 80.0) * 0.7,
        },
        FormulaVariant::Alternate => {
            clamp_to((22.0 * height_cm * height_cm) / 10000.0, IDEAL_WEIGHT_RANGE)
        }
    }
}

// ============================================================================
// Full Pipeline
// ============================================================================

/// Run every formula for one measurement
pub fn calculate_body_composition(
    input: &MeasurementInput,
    options: &CalculationOptions,
) -> MetricsRecord {
    let fat_percentage = calculate_fat_percentage(
        input.weight_kg,
        input.height_cm,
        input.age_years,
        input.gender,
    );
    compose(input, options, fat_percentage)
}

/// Run the pipeline with an externally predicted fat percentage in place of
/// the intrinsic estimate. The prediction is clamped to the fat range.
pub fn calculate_body_composition_with_fat(
    input: &MeasurementInput,
    options: &CalculationOptions,
    predicted_fat_percentage: f64,
) -> MetricsRecord {
    compose(
        input,
        options,
        clamp_to(predicted_fat_percentage, FAT_PERCENTAGE_RANGE),
    )
}

fn compose(
    input: &MeasurementInput,
    options: &CalculationOptions,
    fat_percentage: f64,
) -> MetricsRecord {
    let MeasurementInput {
        height_cm,
        weight_kg,
        age_years,
        gender,
        activity_factor,
    } = *input;

    let bmi = calculate_bmi(weight_kg, height_cm);
    let (bmr, tdee) = calculate_bmr_tdee(weight_kg, height_cm, age_years, gender, activity_factor);
    let lean_body_mass = calculate_lean_body_mass(weight_kg, height_cm, gender);
    let water_percentage = calculate_water_percentage(fat_percentage);
    let bone_mass = calculate_bone_mass(weight_kg, height_cm, gender);
    let muscle_mass = calculate_muscle_mass(weight_kg, gender, fat_percentage, bone_mass);
    let protein_percentage = calculate_protein_percentage(
        weight_kg,
        muscle_mass,
        fat_percentage,
        water_percentage,
        bone_mass,
        options.protein,
    );

    MetricsRecord {
        bmi,
        gender,
        bmr,
        tdee,
        lean_body_mass,
        fat_percentage,
        water_percentage,
        bone_mass,
        muscle_mass,
        protein_percentage,
        visceral_fat: calculate_visceral_fat(weight_kg, height_cm, age_years, gender),
        ideal_weight: calculate_ideal_weight(height_cm, gender, options.ideal_weight),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn within(range: (f64, f64), value: f64) -> bool {
        value >= range.0 && value <= range.1
    }

    fn male_reference() -> MeasurementInput {
        MeasurementInput {
            height_cm: 166.0,
            weight_kg: 77.7,
            age_years: 25,
            gender: Gender::Male,
            activity_factor: 1.55,
        }
    }

    // =========================================================================
    // Gender / Activity Tests
    // =========================================================================

    #[rstest]
    #[case("male", Gender::Male)]
    #[case("female", Gender::Female)]
    #[case("Male", Gender::Female)]
    #[case("", Gender::Female)]
    fn test_gender_from_label(#[case] label: &str, #[case] expected: Gender) {
        assert_eq!(Gender::from_label(label), expected);
    }

    #[test]
    fn test_activity_level_round_trip_through_multiplier() {
        for level in ActivityLevel::ALL {
            assert_eq!(ActivityLevel::from_multiplier(level.multiplier()), Some(level));
        }
        assert_eq!(ActivityLevel::from_multiplier(1.3), None);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(3.0, 5.0, 75.0), 5.0);
        assert_eq!(clamp(80.0, 5.0, 75.0), 75.0);
        assert_eq!(clamp(40.0, 5.0, 75.0), 40.0);
        assert_eq!(clamp(75.0, 5.0, 75.0), 75.0);
    }

    // =========================================================================
    // BMI / BMR / LBM Tests
    // =========================================================================

    #[test]
    fn test_bmi_calculation() {
        let bmi = calculate_bmi(77.7, 166.0);
        assert!((bmi - 28.20).abs() < 0.01);
    }

    #[test]
    fn test_meaningful_weight_threshold() {
        // 166cm: BMI 12 sits at ~33.07kg
        assert!(!is_meaningful_weight(0.5, 166.0));
        assert!(!is_meaningful_weight(33.0, 166.0));
        assert!(is_meaningful_weight(34.0, 166.0));
    }

    #[test]
    fn test_bmr_tdee_male() {
        let (bmr, tdee) = calculate_bmr_tdee(77.7, 166.0, 25, Gender::Male, 1.55);
        assert!((bmr - 1784.018).abs() < 0.01);
        assert!((tdee - bmr * 1.55).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_female() {
        // 447.593 + 9.247*60 + 3.098*165 - 4.330*30
        let bmr = calculate_bmr(60.0, 165.0, 30, Gender::Female);
        assert!((bmr - 1383.683).abs() < 0.01);
    }

    #[test]
    fn test_bmr_may_go_negative_for_extreme_age() {
        let bmr = calculate_bmr(1.0, 10.0, 200, Gender::Male);
        assert!(bmr < 0.0);
    }

    #[test]
    fn test_lean_body_mass() {
        let male = calculate_lean_body_mass(77.7, 166.0, Gender::Male);
        assert!((male - 52.28191).abs() < 1e-6);

        let female = calculate_lean_body_mass(55.0, 160.0, Gender::Female);
        assert!((female - 39.87045).abs() < 1e-6);
    }

    // =========================================================================
    // Fat / Water Tests
    // =========================================================================

    #[test]
    fn test_fat_override_boundary() {
        assert_eq!(cap_fat_percentage(63.01), 75.0);
        assert_eq!(cap_fat_percentage(63.0), 63.0);
        assert_eq!(cap_fat_percentage(2.0), 5.0);
        assert_eq!(cap_fat_percentage(120.0), 75.0);
    }

    #[rstest]
    #[case(77.7, 166.0, 25, Gender::Male, 33.742716)]
    #[case(55.0, 160.0, 30, Gender::Female, 44.326455)]
    #[case(45.0, 150.0, 60, Gender::Female, 42.240233)]
    fn test_fat_percentage_reference_values(
        #[case] weight: f64,
        #[case] height: f64,
        #[case] age: u32,
        #[case] gender: Gender,
        #[case] expected: f64,
    ) {
        let fat = calculate_fat_percentage(weight, height, age, gender);
        assert!((fat - expected).abs() < 1e-4, "got {fat}");
    }

    #[test]
    fn test_fat_coefficient_bands() {
        assert_eq!(fat_coefficient(60.0, 170.0, Gender::Male), 0.98);
        assert_eq!(fat_coefficient(61.0, 170.0, Gender::Male), 1.0);
        assert!((fat_coefficient(65.0, 165.0, Gender::Female) - 0.96 * 1.03).abs() < 1e-12);
        assert_eq!(fat_coefficient(65.0, 160.0, Gender::Female), 0.96);
        assert!((fat_coefficient(45.0, 161.0, Gender::Female) - 1.02 * 1.03).abs() < 1e-12);
        assert_eq!(fat_coefficient(55.0, 170.0, Gender::Female), 1.0);
    }

    #[test]
    fn test_fat_offset_by_age() {
        assert_eq!(fat_lbm_offset(49, Gender::Female), 9.25);
        assert_eq!(fat_lbm_offset(50, Gender::Female), 7.25);
        assert_eq!(fat_lbm_offset(80, Gender::Male), 0.8);
    }

    #[test]
    fn test_water_percentage() {
        // (100 - 33.742716) * 0.7 = 46.38 -> *1.02
        let water = calculate_water_percentage(33.74271557271557);
        assert!((water - 47.307701).abs() < 1e-5);

        // Lean bodies push water above 50 and use the 0.98 coefficient
        let water = calculate_water_percentage(20.0);
        assert!((water - 56.0 * 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_water_override_saturates_at_ceiling() {
        // 95 * 0.7 * 0.98 = 65.17 -> override to 75
        assert_eq!(calculate_water_percentage(5.0), 75.0);
        // Very fat bodies fall to the floor
        assert_eq!(calculate_water_percentage(75.0), 35.0);
    }

    // =========================================================================
    // Bone / Muscle / Protein Tests
    // =========================================================================

    #[test]
    fn test_bone_mass() {
        let bone = calculate_bone_mass(77.7, 166.0, Gender::Male);
        assert!((bone - 2.616532).abs() < 1e-5);

        // Below the 2.2 threshold 0.1 is subtracted
        let bone = calculate_bone_mass(55.0, 160.0, Gender::Female);
        assert!((bone - 1.710827).abs() < 1e-5);
    }

    #[test]
    fn test_bone_mass_ceiling_override() {
        // lbm ~ 120 -> bone ~ 6.1, above the male 5.2 ceiling
        assert_eq!(calculate_bone_mass(250.0, 200.0, Gender::Male), 8.0);
    }

    #[test]
    fn test_muscle_mass() {
        let muscle = calculate_muscle_mass(77.7, Gender::Male, 33.74271557271557, 2.6165319778);
        assert!((muscle - 48.865378).abs() < 1e-5);
    }

    #[test]
    fn test_muscle_mass_override() {
        assert_eq!(calculate_muscle_mass(100.0, Gender::Female, 10.0, 6.0), 120.0);
        assert_eq!(calculate_muscle_mass(100.0, Gender::Male, 5.0, 1.5), 120.0);
        assert_eq!(calculate_muscle_mass(20.0, Gender::Male, 75.0, 1.0), 10.0);
    }

    #[test]
    fn test_protein_variants() {
        let (w, m, f, wa, b) = (77.7, 48.8653780222, 33.74271557271557, 47.30770108108108, 2.6165319778);

        let original = calculate_protein_percentage(w, m, f, wa, b, FormulaVariant::Original);
        assert!((original - 15.582103).abs() < 1e-5);

        // 100 - 33.74 - 47.30 - 3.36
        let alternate = calculate_protein_percentage(w, m, f, wa, b, FormulaVariant::Alternate);
        assert!((alternate - 15.6).abs() < 1e-9);
    }

    #[test]
    fn test_protein_alternate_floors_each_term() {
        // One floor at the end would give 29.33; per term: 100 - 20.33 - 40.33 - 10.0
        let protein = calculate_protein_percentage(
            10.0,
            5.0,
            20.333,
            40.333,
            1.0,
            FormulaVariant::Alternate,
        );
        assert!((protein - 29.34).abs() < 1e-9);
    }

    // =========================================================================
    // Visceral Fat / Ideal Weight Tests
    // =========================================================================

    #[test]
    fn test_visceral_fat_female_discontinuity() {
        // 160cm: split line at weight == 160 * 0.5 - 13 == 67
        let at_line = raw_visceral_fat(67.0, 160.0, 30, Gender::Female);
        let above_line = raw_visceral_fat(67.001, 160.0, 30, Gender::Female);

        // At the line the lower-branch regression applies (strict >)
        let sub = 0.691 - 0.0024 * 160.0 - 0.0024 * 160.0;
        let lower = -((160.0 * 0.027) - sub * 67.0) + 30.0 * 0.07 - 30.0;
        assert_eq!(at_line, lower);

        let subsub = (160.0 * 1.45 + 160.0 * 0.1158 * 160.0) - 120.0;
        let upper = (67.001 * 500.0 / subsub - 6.0) + 30.0 * 0.07;
        assert_eq!(above_line, upper);

        assert!((above_line - at_line).abs() > 5.0);
        assert_eq!(calculate_visceral_fat(67.0, 160.0, 30, Gender::Female), 1.0);
        assert!((calculate_visceral_fat(67.001, 160.0, 30, Gender::Female) - 6.98923).abs() < 1e-4);
    }

    #[test]
    fn test_visceral_fat_male_branches() {
        assert!((calculate_visceral_fat(77.7, 166.0, 25, Gender::Male) - 15.1052).abs() < 1e-4);
        assert!((calculate_visceral_fat(120.0, 170.0, 40, Gender::Male) - 18.561696).abs() < 1e-4);
        assert!((calculate_visceral_fat(70.0, 180.0, 40, Gender::Male) - 9.91).abs() < 1e-4);
    }

    #[test]
    fn test_ideal_weight_original() {
        let male = calculate_ideal_weight(166.0, Gender::Male, FormulaVariant::Original);
        assert!((male - 60.2).abs() < 1e-9);

        let female = calculate_ideal_weight(166.0, Gender::Female, FormulaVariant::Original);
        assert!((female - 57.6).abs() < 1e-9);
    }

    #[test]
    fn test_ideal_weight_alternate_ignores_gender() {
        let male = calculate_ideal_weight(166.0, Gender::Male, FormulaVariant::Alternate);
        let female = calculate_ideal_weight(166.0, Gender::Female, FormulaVariant::Alternate);
        assert_eq!(male, female);
        assert!((male - 60.6232).abs() < 1e-9);
        assert_eq!(calculate_ideal_weight(400.0, Gender::Male, FormulaVariant::Alternate), 198.0);
    }

    // =========================================================================
    // Pipeline Tests
    // =========================================================================

    #[test]
    fn test_full_pipeline_reference() {
        let record = calculate_body_composition(&male_reference(), &CalculationOptions::default());

        assert_eq!(record.gender, Gender::Male);
        assert!((record.bmi - 28.197).abs() < 0.001);
        assert!((record.lean_body_mass - 52.28191).abs() < 1e-6);
        assert!((record.fat_percentage - 33.742716).abs() < 1e-5);
        assert!((record.water_percentage - 47.307701).abs() < 1e-5);
        assert!((record.bone_mass - 2.616532).abs() < 1e-5);
        assert!((record.muscle_mass - 48.865378).abs() < 1e-5);
        assert!((record.protein_percentage - 15.582103).abs() < 1e-5);
        assert!((record.visceral_fat - 15.1052).abs() < 1e-4);
        assert!((record.ideal_weight - 60.2).abs() < 1e-9);
    }

    #[test]
    fn test_pipeline_variants_are_independent() {
        let options = CalculationOptions {
            protein: FormulaVariant::Alternate,
            ideal_weight: FormulaVariant::Original,
        };
        let record = calculate_body_composition(&male_reference(), &options);
        assert!((record.protein_percentage - 15.6).abs() < 1e-9);
        assert!((record.ideal_weight - 60.2).abs() < 1e-9);
    }

    #[test]
    fn test_predicted_fat_feeds_downstream_metrics() {
        let input = male_reference();
        let options = CalculationOptions::default();
        let record = calculate_body_composition_with_fat(&input, &options, 20.0);

        assert_eq!(record.fat_percentage, 20.0);
        assert_eq!(record.water_percentage, calculate_water_percentage(20.0));
        let bone = calculate_bone_mass(77.7, 166.0, Gender::Male);
        assert_eq!(record.muscle_mass, calculate_muscle_mass(77.7, Gender::Male, 20.0, bone));

        let out_of_range = calculate_body_composition_with_fat(&input, &options, 90.0);
        assert_eq!(out_of_range.fat_percentage, 75.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Property: bounded metrics never leave their clamp range
        #[test]
        fn prop_bounded_metrics_in_range(
            height in 50.0f64..300.0,
            weight in 20.0f64..500.0,
            age in 1u32..150,
            male in any::<bool>(),
            level in 0usize..5,
            protein_alt in any::<bool>(),
        ) {
            let input = MeasurementInput {
                height_cm: height,
                weight_kg: weight,
                age_years: age,
                gender: if male { Gender::Male } else { Gender::Female },
                activity_factor: ActivityLevel::ALL[level].multiplier(),
            };
            let options = CalculationOptions {
                protein: if protein_alt { FormulaVariant::Alternate } else { FormulaVariant::Original },
                ideal_weight: FormulaVariant::Alternate,
            };
            let r = calculate_body_composition(&input, &options);

            prop_assert!(within(FAT_PERCENTAGE_RANGE, r.fat_percentage));
            prop_assert!(within(WATER_PERCENTAGE_RANGE, r.water_percentage));
            prop_assert!(within(BONE_MASS_RANGE, r.bone_mass));
            prop_assert!(within(MUSCLE_MASS_RANGE, r.muscle_mass));
            prop_assert!(within(PROTEIN_PERCENTAGE_RANGE, r.protein_percentage));
            prop_assert!(within(VISCERAL_FAT_RANGE, r.visceral_fat));
            prop_assert!(within(IDEAL_WEIGHT_RANGE, r.ideal_weight));
        }

        /// Property: identical inputs give bit-identical records
        #[test]
        fn prop_calculation_is_idempotent(
            height in 100.0f64..220.0,
            weight in 30.0f64..200.0,
            age in 1u32..100,
            male in any::<bool>(),
        ) {
            let input = MeasurementInput {
                height_cm: height,
                weight_kg: weight,
                age_years: age,
                gender: if male { Gender::Male } else { Gender::Female },
                activity_factor: 1.375,
            };
            let options = CalculationOptions::default();
            let first = calculate_body_composition(&input, &options);
            let second = calculate_body_composition(&input, &options);

            prop_assert_eq!(first.fat_percentage.to_bits(), second.fat_percentage.to_bits());
            prop_assert_eq!(first.visceral_fat.to_bits(), second.visceral_fat.to_bits());
            prop_assert_eq!(first.protein_percentage.to_bits(), second.protein_percentage.to_bits());
            prop_assert_eq!(first, second);
        }

        /// Property: TDEE > BMR whenever BMR is positive
        #[test]
        fn prop_tdee_scales_bmr(
            weight in 40.0f64..150.0,
            height in 140.0f64..210.0,
            age in 18u32..80,
            level in 0usize..5,
        ) {
            let factor = ActivityLevel::ALL[level].multiplier();
            let (bmr, tdee) = calculate_bmr_tdee(weight, height, age, Gender::Female, factor);
            prop_assert!(bmr > 0.0);
            prop_assert!(tdee > bmr);
        }
    }
}
