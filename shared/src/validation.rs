//! Input validation functions
//!
//! The body composition engine trusts its inputs; everything that reaches it
//! goes through these checks first. Request types additionally derive
//! `validator::Validate` for field ranges.

use crate::body_composition::ActivityLevel;
use chrono::{NaiveDate, Utc};

/// Validate weight value (in kg)
pub fn validate_weight(weight_kg: f64) -> Result<(), String> {
    if weight_kg.is_nan() || weight_kg.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight_kg < 20.0 {
        return Err("Weight must be at least 20 kg".to_string());
    }
    if weight_kg > 500.0 {
        return Err("Weight must be at most 500 kg".to_string());
    }
    Ok(())
}

/// Validate height value (in cm)
/// Valid range: 50-300 cm (covers infants to tallest recorded humans)
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    if height_cm.is_nan() || height_cm.is_infinite() {
        return Err("Height must be a valid number".to_string());
    }
    if height_cm < 50.0 {
        return Err("Height must be at least 50 cm".to_string());
    }
    if height_cm > 300.0 {
        return Err("Height must be at most 300 cm".to_string());
    }
    Ok(())
}

/// Validate age in whole years
pub fn validate_age(age_years: u32) -> Result<(), String> {
    if age_years < 1 {
        return Err("Age must be at least 1 year".to_string());
    }
    if age_years > 150 {
        return Err("Age cannot exceed 150 years".to_string());
    }
    Ok(())
}

/// Validate that an activity factor is one of the supported multipliers
pub fn validate_activity_factor(factor: f64) -> Result<ActivityLevel, String> {
    ActivityLevel::from_multiplier(factor).ok_or_else(|| {
        let allowed: Vec<String> = ActivityLevel::ALL
            .iter()
            .map(|level| level.multiplier().to_string())
            .collect();
        format!("Activity factor must be one of: {}", allowed.join(", "))
    })
}

/// Parse a date of birth, accepting `dd/mm/yyyy` and ISO `yyyy-mm-dd`
pub fn parse_date_of_birth(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|_| format!("Invalid date of birth '{}', expected dd/mm/yyyy", value))
}

/// Age in whole years on a given day, `None` if born after `today`
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    today.years_since(date_of_birth)
}

/// Age in whole years as of today (UTC)
pub fn age_from_date_of_birth(date_of_birth: NaiveDate) -> Option<u32> {
    age_on(date_of_birth, Utc::now().date_naive())
}

/// Validate date of birth
/// Must not be in the future, and age must be between 1 and 150 years
pub fn validate_date_of_birth(dob: NaiveDate) -> Result<u32, String> {
    if dob > Utc::now().date_naive() {
        return Err("Date of birth cannot be in the future".to_string());
    }

    let age = age_from_date_of_birth(dob).ok_or_else(|| "Invalid date of birth".to_string())?;
    validate_age(age)?;
    Ok(age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_validate_weight() {
        assert!(validate_weight(70.0).is_ok());
        assert!(validate_weight(19.9).is_err());
        assert!(validate_weight(500.1).is_err());
        assert!(validate_weight(f64::NAN).is_err());
        assert!(validate_weight(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_height() {
        assert!(validate_height_cm(166.0).is_ok());
        assert!(validate_height_cm(0.0).is_err());
        assert!(validate_height_cm(301.0).is_err());
        assert!(validate_height_cm(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_age() {
        assert!(validate_age(25).is_ok());
        assert!(validate_age(0).is_err());
        assert!(validate_age(151).is_err());
    }

    #[rstest]
    #[case(1.2, ActivityLevel::Sedentary)]
    #[case(1.375, ActivityLevel::LightlyActive)]
    #[case(1.55, ActivityLevel::ModeratelyActive)]
    #[case(1.725, ActivityLevel::VeryActive)]
    #[case(1.9, ActivityLevel::ExtraActive)]
    fn test_activity_factor_accepted(#[case] factor: f64, #[case] level: ActivityLevel) {
        assert_eq!(validate_activity_factor(factor), Ok(level));
    }

    #[test]
    fn test_activity_factor_rejected() {
        let err = validate_activity_factor(1.5).unwrap_err();
        assert!(err.contains("1.55"));
    }

    #[rstest]
    #[case("15/03/1999", 1999, 3, 15)]
    #[case("1999-03-15", 1999, 3, 15)]
    #[case(" 01/01/2000 ", 2000, 1, 1)]
    fn test_parse_date_of_birth(
        #[case] input: &str,
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
    ) {
        let expected = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        assert_eq!(parse_date_of_birth(input), Ok(expected));
    }

    #[test]
    fn test_parse_date_of_birth_rejects_garbage() {
        assert!(parse_date_of_birth("31/02/2000").is_err());
        assert!(parse_date_of_birth("yesterday").is_err());
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        let dob = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        let day_before = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let birthday = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

        assert_eq!(age_on(dob, day_before), Some(24));
        assert_eq!(age_on(dob, birthday), Some(25));
        assert_eq!(age_on(birthday, dob), None);
    }

    #[test]
    fn test_validate_date_of_birth() {
        let today = Utc::now().date_naive();
        assert!(validate_date_of_birth(today + chrono::Duration::days(1)).is_err());
        assert!(validate_date_of_birth(today).is_err());

        let dob = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        assert!(validate_date_of_birth(dob).unwrap() >= 30);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: every weight in the accepted band validates
        #[test]
        fn prop_weight_band_accepted(weight in 20.0f64..=500.0) {
            prop_assert!(validate_weight(weight).is_ok());
        }

        /// Property: formatting then parsing a date of birth is lossless
        #[test]
        fn prop_date_of_birth_parses_back(days in 0i64..40_000) {
            let dob = NaiveDate::from_ymd_opt(1920, 1, 1).unwrap() + chrono::Duration::days(days);
            let text = dob.format("%d/%m/%Y").to_string();
            prop_assert_eq!(parse_date_of_birth(&text), Ok(dob));
        }
    }
}
