use clap::Args;

use crate::models::scholarship::{AcademicStatus, EligibilityCheckRequest};

pub const MIN_BIRTH_YEAR: i64 = 1996;
pub const MAX_BIRTH_YEAR: i64 = 2010;
pub const MAX_GPA: f64 = 4.5;

/// The check form. Ranges are enforced here, at parse time; the request is
/// not validated again before it is sent.
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Academic status
    #[arg(long = "status", value_enum)]
    pub academic_status: AcademicStatus,

    /// School year (1-4)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub grade: u8,

    /// Year of birth (1996-2010)
    #[arg(long, value_parser = clap::value_parser!(i32).range(MIN_BIRTH_YEAR..=MAX_BIRTH_YEAR))]
    pub birth_year: i32,

    /// Grade point average on a 4.5 scale
    #[arg(long, value_parser = parse_gpa)]
    pub gpa: f64,

    /// Income bracket (1-10)
    #[arg(long = "income", value_parser = clap::value_parser!(u8).range(1..=10))]
    pub income_level: u8,
}

impl CheckArgs {
    pub fn to_request(&self) -> EligibilityCheckRequest {
        EligibilityCheckRequest {
            academic_status: self.academic_status,
            grade: self.grade,
            birth_year: self.birth_year,
            gpa: self.gpa,
            income_level: self.income_level,
        }
    }
}

fn parse_gpa(raw: &str) -> Result<f64, String> {
    let gpa: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if !(0.0..=MAX_GPA).contains(&gpa) {
        return Err(format!("GPA must be between 0.0 and {MAX_GPA}"));
    }
    Ok(gpa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: CheckArgs,
    }

    fn parse(extra: &[&str]) -> Result<CheckArgs, clap::Error> {
        let mut argv = vec!["check"];
        argv.extend_from_slice(extra);
        Harness::try_parse_from(argv).map(|h| h.args)
    }

    const VALID: [&str; 10] = [
        "--status", "enrolled", "--grade", "2", "--birth-year", "2003", "--gpa", "3.0",
        "--income", "5",
    ];

    #[test]
    fn test_valid_form_builds_request() {
        let request = parse(&VALID).unwrap().to_request();
        assert_eq!(request.academic_status, AcademicStatus::Enrolled);
        assert_eq!(request.grade, 2);
        assert_eq!(request.birth_year, 2003);
        assert_eq!(request.gpa, 3.0);
        assert_eq!(request.income_level, 5);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let with = |flag: &str, value: &str| {
            let mut argv = VALID.to_vec();
            let pos = argv.iter().position(|a| *a == flag).unwrap();
            argv[pos + 1] = value;
            parse(&argv)
        };
        assert!(with("--grade", "5").is_err());
        assert!(with("--grade", "0").is_err());
        assert!(with("--gpa", "4.6").is_err());
        assert!(with("--gpa", "-0.1").is_err());
        assert!(with("--income", "11").is_err());
        assert!(with("--birth-year", "1995").is_err());
        assert!(with("--birth-year", "2011").is_err());
        assert!(with("--status", "graduated").is_err());
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        assert_eq!(parse_gpa("4.5"), Ok(4.5));
        assert_eq!(parse_gpa("0"), Ok(0.0));
        assert!(parse_gpa("abc").is_err());
    }

    #[test]
    fn test_every_field_is_required() {
        let argv: Vec<&str> = VALID[2..].to_vec();
        assert!(parse(&argv).is_err());
    }
}
